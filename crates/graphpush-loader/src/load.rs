use std::collections::{BTreeMap, BTreeSet};

use graphpush_core::{EdgeRecord, GraphError, Node, NodeRecord, ValidationError};
use serde::de::DeserializeOwned;

use crate::tree::{GraphTree, TreeBlob};

pub type NodeMap = BTreeMap<String, Node>;

pub fn load_graph(tree: &GraphTree) -> Result<NodeMap, GraphError> {
    let mut nodes = load_nodes(&tree.channels)?;
    load_edges(&tree.edges, &mut nodes)?;
    tracing::debug!(
        nodes = nodes.len(),
        edges = tree.edges.len(),
        "loaded upgrade graph"
    );
    Ok(nodes)
}

/// Builds nodes from channel descriptors; each blob's label is its channel.
///
/// The first descriptor seen for a version supplies the node's fields; later
/// ones only add channel membership.
pub fn load_nodes(blobs: &[TreeBlob]) -> Result<NodeMap, GraphError> {
    let mut nodes = NodeMap::new();
    for blob in blobs {
        let record: NodeRecord = parse_blob(blob)?;
        if let Some(existing) = nodes.get_mut(&record.version) {
            existing.channels.insert(blob.label.clone());
            continue;
        }
        let version = record.version.clone();
        nodes.insert(version, Node::from_record(record, &blob.label));
    }

    for node in nodes.values_mut() {
        node.stamp_channels_metadata();
    }
    Ok(nodes)
}

/// Attaches edges to their target nodes as predecessors.
///
/// Quay labels cannot express per-channel edges, so an edge must appear
/// once and its channels must equal the channels both endpoints share.
pub fn load_edges(blobs: &[TreeBlob], nodes: &mut NodeMap) -> Result<(), GraphError> {
    let mut seen: BTreeSet<(String, String)> = BTreeSet::new();
    for blob in blobs {
        let edge: EdgeRecord = parse_blob(blob)?;
        if !seen.insert((edge.from.clone(), edge.to.clone())) {
            return Err(ValidationError::DuplicateEdge {
                from: edge.from,
                to: edge.to,
            }
            .into());
        }

        let from_channels = &endpoint(nodes, &edge.from, blob)?.channels;
        let to_channels = &endpoint(nodes, &edge.to, blob)?.channels;
        let node_channels: BTreeSet<String> =
            from_channels.intersection(to_channels).cloned().collect();
        if edge.channels != node_channels {
            return Err(ValidationError::EdgeChannelMismatch {
                from: edge.from,
                to: edge.to,
                edge_channels: edge.channels.into_iter().collect(),
                node_channels: node_channels.into_iter().collect(),
            }
            .into());
        }

        if let Some(to_node) = nodes.get_mut(&edge.to) {
            to_node.previous.insert(edge.from);
        }
    }
    Ok(())
}

fn endpoint<'a>(
    nodes: &'a NodeMap,
    version: &str,
    blob: &TreeBlob,
) -> Result<&'a Node, GraphError> {
    nodes.get(version).ok_or_else(|| {
        ValidationError::UnknownVersion {
            version: version.to_string(),
            path: blob.path.clone(),
        }
        .into()
    })
}

fn parse_blob<T: DeserializeOwned>(blob: &TreeBlob) -> Result<T, GraphError> {
    serde_json::from_slice(&blob.bytes).map_err(|source| GraphError::Load {
        path: blob.path.clone(),
        source,
    })
}
