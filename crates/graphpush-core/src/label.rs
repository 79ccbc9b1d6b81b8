use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

pub const LABEL_MEDIA_TYPE: &str = "text/plain";

/// The label vocabulary this tool owns on a release manifest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LabelKey {
    ReleaseChannels,
    PreviousAdd,
    PreviousRemove,
    NextAdd,
    NextRemove,
}

impl LabelKey {
    const DEPRECATED: [LabelKey; 2] = [LabelKey::NextAdd, LabelKey::NextRemove];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::ReleaseChannels => "io.openshift.upgrades.graph.release.channels",
            Self::PreviousAdd => "io.openshift.upgrades.graph.previous.add",
            Self::PreviousRemove => "io.openshift.upgrades.graph.previous.remove",
            Self::NextAdd => "io.openshift.upgrades.graph.next.add",
            Self::NextRemove => "io.openshift.upgrades.graph.next.remove",
        }
    }

    /// Key without the shared `io.openshift.upgrades.graph.` prefix.
    pub fn short_name(self) -> &'static str {
        match self {
            Self::ReleaseChannels => "release.channels",
            Self::PreviousAdd => "previous.add",
            Self::PreviousRemove => "previous.remove",
            Self::NextAdd => "next.add",
            Self::NextRemove => "next.remove",
        }
    }

    pub fn parse(input: &str) -> Option<Self> {
        match input {
            "io.openshift.upgrades.graph.release.channels" => Some(Self::ReleaseChannels),
            "io.openshift.upgrades.graph.previous.add" => Some(Self::PreviousAdd),
            "io.openshift.upgrades.graph.previous.remove" => Some(Self::PreviousRemove),
            "io.openshift.upgrades.graph.next.add" => Some(Self::NextAdd),
            "io.openshift.upgrades.graph.next.remove" => Some(Self::NextRemove),
            _ => None,
        }
    }

    pub fn is_deprecated(self) -> bool {
        Self::DEPRECATED.contains(&self)
    }
}

/// A label as reported by the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    pub key: String,
    #[serde(default)]
    pub value: String,
    #[serde(default = "default_media_type")]
    pub media_type: String,
}

/// Request body for creating a label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewLabel {
    pub media_type: String,
    pub key: String,
    pub value: String,
}

impl NewLabel {
    pub fn text(key: LabelKey, value: impl Into<String>) -> Self {
        Self {
            media_type: LABEL_MEDIA_TYPE.to_string(),
            key: key.as_str().to_string(),
            value: value.into(),
        }
    }
}

fn default_media_type() -> String {
    LABEL_MEDIA_TYPE.to_string()
}

/// Joins a set into the byte-stable label form: sorted, comma-separated.
pub fn join_sorted<'a, I>(values: I) -> String
where
    I: IntoIterator<Item = &'a String>,
{
    let sorted: BTreeSet<&str> = values.into_iter().map(String::as_str).collect();
    sorted.into_iter().collect::<Vec<_>>().join(",")
}

/// Splits a label value back into a set, dropping empty pieces.
pub fn split_label_value(value: &str) -> BTreeSet<String> {
    value
        .split(',')
        .filter(|piece| !piece.is_empty())
        .map(str::to_string)
        .collect()
}
