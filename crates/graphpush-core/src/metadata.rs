use serde::Deserialize;

/// The release image's self-declared metadata, packaged inside one of its
/// layers at [`ReleaseMetadata::ARCHIVE_PATH`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ReleaseMetadata {
    #[serde(default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub previous: Vec<String>,
}

impl ReleaseMetadata {
    pub const ARCHIVE_PATH: &'static str = "release-manifests/release-metadata";

    pub fn from_json_slice(bytes: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(bytes)
    }
}
