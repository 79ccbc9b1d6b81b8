use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// One descriptor file, tagged with the name of the directory holding it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeBlob {
    pub path: String,
    pub label: String,
    pub bytes: Vec<u8>,
}

impl TreeBlob {
    pub fn new(
        path: impl Into<String>,
        label: impl Into<String>,
        bytes: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            path: path.into(),
            label: label.into(),
            bytes: bytes.into(),
        }
    }
}

/// The graph input, detached from the filesystem.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GraphTree {
    pub channels: Vec<TreeBlob>,
    pub edges: Vec<TreeBlob>,
}

/// Reads `<root>/channels` and `<root>/edges` into a [`GraphTree`].
pub fn read_tree(root: &Path) -> Result<GraphTree> {
    Ok(GraphTree {
        channels: read_tree_dir(&root.join("channels"))?,
        edges: read_tree_dir(&root.join("edges"))?,
    })
}

/// Collects every `*.json` file below `dir`, sorted by path. A missing
/// directory yields no blobs.
pub fn read_tree_dir(dir: &Path) -> Result<Vec<TreeBlob>> {
    if !dir.exists() {
        tracing::debug!(dir = %dir.display(), "graph directory missing, treating as empty");
        return Ok(Vec::new());
    }

    let mut paths = Vec::new();
    let mut queue: VecDeque<PathBuf> = VecDeque::new();
    queue.push_back(dir.to_path_buf());

    while let Some(current) = queue.pop_front() {
        for entry in fs::read_dir(&current)
            .with_context(|| format!("failed reading graph directory {}", current.display()))?
        {
            let entry = entry?;
            let path = entry.path();
            // Directory symlinks are not descended into; file symlinks count.
            if entry.file_type()?.is_dir() {
                queue.push_back(path);
            } else if path.is_file()
                && path.extension().and_then(|value| value.to_str()) == Some("json")
            {
                paths.push(path);
            }
        }
    }
    paths.sort();

    let mut blobs = Vec::with_capacity(paths.len());
    for path in paths {
        let label = path
            .parent()
            .and_then(Path::file_name)
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_default();
        let bytes = fs::read(&path)
            .with_context(|| format!("failed reading graph file {}", path.display()))?;
        blobs.push(TreeBlob {
            path: path.display().to_string(),
            label,
            bytes,
        });
    }

    Ok(blobs)
}
