use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::label::{join_sorted, LabelKey};

/// One node descriptor file under `channels/<channel>/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub version: String,
    pub payload: String,
    #[serde(default)]
    pub metadata: Option<BTreeMap<String, Value>>,
}

/// One edge descriptor file under `edges/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeRecord {
    pub from: String,
    pub to: String,
    pub channels: BTreeSet<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub version: String,
    pub payload: String,
    pub channels: BTreeSet<String>,
    pub previous: BTreeSet<String>,
    pub metadata: BTreeMap<String, Value>,
}

impl Node {
    pub fn from_record(record: NodeRecord, channel: &str) -> Self {
        Self {
            version: record.version,
            payload: record.payload,
            channels: BTreeSet::from([channel.to_string()]),
            previous: BTreeSet::new(),
            metadata: record.metadata.unwrap_or_default(),
        }
    }

    /// Stores the sorted channel list under the release-channels metadata key.
    pub fn stamp_channels_metadata(&mut self) {
        let value = join_sorted(&self.channels);
        self.metadata.insert(
            LabelKey::ReleaseChannels.as_str().to_string(),
            Value::String(value),
        );
    }

    /// Desired value of the release-channels label.
    pub fn release_channels(&self) -> String {
        self.metadata
            .get(LabelKey::ReleaseChannels.as_str())
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| join_sorted(&self.channels))
    }

    pub fn has_declared_previous(&self) -> bool {
        !self.previous.is_empty()
    }
}
