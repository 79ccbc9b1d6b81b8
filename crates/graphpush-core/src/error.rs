use thiserror::Error;

#[derive(Debug, Error)]
pub enum GraphError {
    #[error("failed to load JSON from {path}: {source}")]
    Load {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("no release metadata in any of the {layers} layers of {version}")]
    MetadataNotFound { version: String, layers: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("duplicate edges for {from} -> {to} (Quay labels do not support channel granularity)")]
    DuplicateEdge { from: String, to: String },
    #[error(
        "edge {from} -> {to} channels {edge_channels:?} differ from node channels {node_channels:?} (Quay labels do not support channel granularity)"
    )]
    EdgeChannelMismatch {
        from: String,
        to: String,
        edge_channels: Vec<String>,
        node_channels: Vec<String>,
    },
    #[error("edge in {path} references unknown version '{version}'")]
    UnknownVersion { version: String, path: String },
    #[error("non-{registry} pullspec: {pullspec}")]
    ForeignPullspec { pullspec: String, registry: String },
    #[error("pullspec is not digest-pinned (missing '@'): {pullspec}")]
    MalformedPullspec { pullspec: String },
    #[error("blob {digest} digest mismatch: downloaded content hashes to {actual}")]
    BlobDigestMismatch { digest: String, actual: String },
}
