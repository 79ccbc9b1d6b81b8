use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use graphpush_core::{GraphError, ValidationError};
use serde_json::{json, Value};

use super::*;

static TEST_GRAPH_ROOT_COUNTER: AtomicU64 = AtomicU64::new(0);

#[test]
fn node_in_two_channels_gets_sorted_channels_metadata() {
    let tree = GraphTree {
        channels: vec![
            node_blob("stable", "4.1.0"),
            node_blob("fast", "4.1.0"),
        ],
        edges: Vec::new(),
    };

    let nodes = load_graph(&tree).expect("graph must load");
    let node = nodes.get("4.1.0").expect("node must exist");
    assert_eq!(node.channels.len(), 2);
    assert_eq!(
        node.metadata
            .get("io.openshift.upgrades.graph.release.channels")
            .and_then(Value::as_str),
        Some("fast,stable")
    );
}

#[test]
fn first_descriptor_wins_for_base_fields() {
    let tree = GraphTree {
        channels: vec![
            TreeBlob::new(
                "channels/fast/4.1.0.json",
                "fast",
                r#"{"version": "4.1.0", "payload": "quay.io/a/b@sha256:first", "metadata": {"url": "first"}}"#,
            ),
            TreeBlob::new(
                "channels/stable/4.1.0.json",
                "stable",
                r#"{"version": "4.1.0", "payload": "quay.io/a/b@sha256:second", "metadata": {"url": "second"}}"#,
            ),
        ],
        edges: Vec::new(),
    };

    let nodes = load_graph(&tree).expect("graph must load");
    let node = nodes.get("4.1.0").expect("node must exist");
    assert_eq!(node.payload, "quay.io/a/b@sha256:first");
    assert_eq!(node.metadata.get("url"), Some(&json!("first")));
    assert_eq!(node.release_channels(), "fast,stable");
}

#[test]
fn non_string_metadata_values_are_kept() {
    let tree = GraphTree {
        channels: vec![TreeBlob::new(
            "channels/stable/4.1.0.json",
            "stable",
            r#"{"version": "4.1.0", "payload": "quay.io/a/b@sha256:00", "metadata": {"url": "x", "errata": 123, "extra": {"nested": true}}}"#,
        )],
        edges: Vec::new(),
    };

    let nodes = load_graph(&tree).expect("graph must load");
    let node = nodes.get("4.1.0").expect("node must exist");
    assert_eq!(node.metadata.get("errata"), Some(&json!(123)));
    assert_eq!(node.metadata.get("extra"), Some(&json!({"nested": true})));
    assert_eq!(node.release_channels(), "stable");
}

#[test]
fn edges_populate_target_previous_sets() {
    let tree = GraphTree {
        channels: vec![
            node_blob("stable", "4.1.0"),
            node_blob("stable", "4.1.1"),
            node_blob("stable", "4.1.2"),
        ],
        edges: vec![
            edge_blob("4.1.0", "4.1.2", &["stable"]),
            edge_blob("4.1.1", "4.1.2", &["stable"]),
        ],
    };

    let nodes = load_graph(&tree).expect("graph must load");
    let previous: Vec<&str> = nodes["4.1.2"].previous.iter().map(String::as_str).collect();
    assert_eq!(previous, vec!["4.1.0", "4.1.1"]);
    assert!(nodes["4.1.0"].previous.is_empty());
}

#[test]
fn duplicate_edge_is_rejected_regardless_of_channels() {
    let tree = GraphTree {
        channels: vec![
            node_blob("stable", "4.1.0"),
            node_blob("stable", "4.1.1"),
            node_blob("fast", "4.1.0"),
            node_blob("fast", "4.1.1"),
        ],
        edges: vec![
            edge_blob("4.1.0", "4.1.1", &["fast", "stable"]),
            edge_blob("4.1.0", "4.1.1", &["stable"]),
        ],
    };

    let err = load_graph(&tree).expect_err("must reject duplicate edge");
    assert!(matches!(
        err,
        GraphError::Validation(ValidationError::DuplicateEdge { ref from, ref to })
            if from == "4.1.0" && to == "4.1.1"
    ));
    assert!(err.to_string().contains("4.1.0 -> 4.1.1"));
}

#[test]
fn edge_channels_must_equal_endpoint_intersection() {
    let tree = GraphTree {
        channels: vec![
            node_blob("stable", "4.1.0"),
            node_blob("fast", "4.1.0"),
            node_blob("fast", "4.1.1"),
        ],
        edges: vec![edge_blob("4.1.0", "4.1.1", &["fast", "stable"])],
    };

    let err = load_graph(&tree).expect_err("must reject channel mismatch");
    let GraphError::Validation(ValidationError::EdgeChannelMismatch {
        edge_channels,
        node_channels,
        ..
    }) = &err
    else {
        panic!("expected channel mismatch, got {err:?}");
    };
    assert_eq!(edge_channels, &vec!["fast".to_string(), "stable".to_string()]);
    assert_eq!(node_channels, &vec!["fast".to_string()]);
}

#[test]
fn edge_with_subset_of_shared_channels_is_rejected() {
    let tree = GraphTree {
        channels: vec![
            node_blob("stable", "4.1.0"),
            node_blob("fast", "4.1.0"),
            node_blob("stable", "4.1.1"),
            node_blob("fast", "4.1.1"),
        ],
        edges: vec![edge_blob("4.1.0", "4.1.1", &["fast"])],
    };

    let err = load_graph(&tree).expect_err("must reject partial channel set");
    assert!(err.to_string().contains("differ from node channels"));
}

#[test]
fn edge_to_unknown_version_is_rejected() {
    let tree = GraphTree {
        channels: vec![node_blob("stable", "4.1.0")],
        edges: vec![edge_blob("4.1.0", "4.9.9", &["stable"])],
    };

    let err = load_graph(&tree).expect_err("must reject unknown endpoint");
    assert!(matches!(
        err,
        GraphError::Validation(ValidationError::UnknownVersion { ref version, .. })
            if version == "4.9.9"
    ));
}

#[test]
fn invalid_json_reports_path() {
    let tree = GraphTree {
        channels: vec![TreeBlob::new("channels/stable/broken.json", "stable", "{not json")],
        edges: Vec::new(),
    };

    let err = load_graph(&tree).expect_err("must reject invalid json");
    assert!(matches!(err, GraphError::Load { .. }));
    assert!(err
        .to_string()
        .contains("failed to load JSON from channels/stable/broken.json"));
}

#[test]
fn node_missing_payload_is_a_load_error() {
    let tree = GraphTree {
        channels: vec![TreeBlob::new(
            "channels/stable/4.1.0.json",
            "stable",
            r#"{"version": "4.1.0"}"#,
        )],
        edges: Vec::new(),
    };

    let err = load_graph(&tree).expect_err("must reject node without payload");
    assert!(matches!(err, GraphError::Load { .. }));
}

#[test]
fn read_tree_collects_json_files_by_parent_directory() {
    let root = test_graph_root();
    write_file(&root.join("channels/stable/b.json"), &node_json("4.1.1"));
    write_file(&root.join("channels/stable/a.json"), &node_json("4.1.0"));
    write_file(&root.join("channels/fast/a.json"), &node_json("4.1.0"));
    write_file(&root.join("channels/stable/README.md"), "ignored");
    write_file(
        &root.join("edges/4.1.0-4.1.1.json"),
        r#"{"from": "4.1.0", "to": "4.1.1", "channels": ["stable"]}"#,
    );

    let tree = read_tree(&root).expect("tree must read");
    let labels: Vec<&str> = tree.channels.iter().map(|blob| blob.label.as_str()).collect();
    assert_eq!(labels, vec!["fast", "stable", "stable"]);
    assert_eq!(tree.edges.len(), 1);
    assert_eq!(tree.edges[0].label, "edges");

    let nodes = load_graph(&tree).expect("graph must load");
    assert_eq!(nodes["4.1.0"].release_channels(), "fast,stable");
    assert_eq!(nodes["4.1.1"].release_channels(), "stable");
    assert!(nodes["4.1.1"].previous.contains("4.1.0"));

    let _ = fs::remove_dir_all(&root);
}

#[cfg(unix)]
#[test]
fn read_tree_follows_symlinked_descriptors() {
    let root = test_graph_root();
    let shared = root.join("shared/4.1.0.json");
    write_file(&shared, &node_json("4.1.0"));
    fs::create_dir_all(root.join("channels/stable")).expect("must create channel dir");
    std::os::unix::fs::symlink(&shared, root.join("channels/stable/4.1.0.json"))
        .expect("must create symlink");
    std::os::unix::fs::symlink(
        root.join("shared/missing.json"),
        root.join("channels/stable/dangling.json"),
    )
    .expect("must create dangling symlink");

    let tree = read_tree(&root).expect("tree must read");
    assert_eq!(tree.channels.len(), 1);
    assert_eq!(tree.channels[0].label, "stable");

    let nodes = load_graph(&tree).expect("graph must load");
    assert_eq!(nodes["4.1.0"].release_channels(), "stable");

    let _ = fs::remove_dir_all(&root);
}

#[test]
fn read_tree_treats_missing_directories_as_empty() {
    let root = test_graph_root();
    fs::create_dir_all(&root).expect("must create root");

    let tree = read_tree(&root).expect("tree must read");
    assert_eq!(tree, GraphTree::default());

    let _ = fs::remove_dir_all(&root);
}

fn node_json(version: &str) -> String {
    format!(
        r#"{{"version": "{version}", "payload": "quay.io/openshift-release-dev/ocp-release@sha256:{version}"}}"#
    )
}

fn node_blob(channel: &str, version: &str) -> TreeBlob {
    TreeBlob::new(
        format!("channels/{channel}/{version}.json"),
        channel,
        node_json(version),
    )
}

fn edge_blob(from: &str, to: &str, channels: &[&str]) -> TreeBlob {
    let channels = serde_json::to_string(channels).expect("channels must serialize");
    TreeBlob::new(
        format!("edges/{from}-{to}.json"),
        "edges",
        format!(r#"{{"from": "{from}", "to": "{to}", "channels": {channels}}}"#),
    )
}

fn write_file(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("must create parent directory");
    }
    fs::write(path, content).expect("must write file");
}

fn test_graph_root() -> PathBuf {
    let mut path = std::env::temp_dir();
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system time")
        .as_nanos();
    let counter = TEST_GRAPH_ROOT_COUNTER.fetch_add(1, Ordering::SeqCst);
    path.push(format!(
        "graphpush-loader-tests-{}-{}-{}",
        std::process::id(),
        nanos,
        counter
    ));
    path
}
