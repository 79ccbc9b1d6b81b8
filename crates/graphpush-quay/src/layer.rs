use std::io::Read;
use std::path::{Component, Path, PathBuf};

use anyhow::{Context, Result};
use flate2::read::GzDecoder;
use graphpush_core::ReleaseMetadata;

/// Looks for the packaged release metadata inside a gzip-compressed tar
/// layer. Returns `None` when the layer does not carry the file.
pub fn extract_release_metadata(layer: &[u8]) -> Result<Option<ReleaseMetadata>> {
    let wanted = Path::new(ReleaseMetadata::ARCHIVE_PATH);
    let mut archive = tar::Archive::new(GzDecoder::new(layer));
    for entry in archive
        .entries()
        .context("failed reading layer archive entries")?
    {
        let mut entry = entry.context("failed reading layer archive entry")?;
        let path = entry
            .path()
            .context("layer archive entry has an invalid path")?;
        if normalize_entry_path(&path).as_path() != wanted {
            continue;
        }

        let mut content = Vec::new();
        entry
            .read_to_end(&mut content)
            .with_context(|| format!("failed reading {}", ReleaseMetadata::ARCHIVE_PATH))?;
        let metadata = ReleaseMetadata::from_json_slice(&content)
            .with_context(|| format!("failed parsing {}", ReleaseMetadata::ARCHIVE_PATH))?;
        return Ok(Some(metadata));
    }

    Ok(None)
}

fn normalize_entry_path(path: &Path) -> PathBuf {
    path.components()
        .filter(|component| !matches!(component, Component::CurDir))
        .collect()
}
