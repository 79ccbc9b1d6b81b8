use std::collections::BTreeMap;

use anyhow::Result;
use graphpush_core::{Label, LabelKey, NewLabel, Node, ReleaseMetadata};

/// Labels currently on a manifest, keyed by label key.
pub type LabelSet = BTreeMap<String, Label>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationOutcome {
    Applied,
    /// No credential was configured; the mutation was only logged.
    DryRun,
}

/// Read and write access to the labels on a node's release manifest.
pub trait LabelRegistry {
    fn get_labels(&self, node: &Node) -> Result<LabelSet>;

    /// The release image's own metadata, including the predecessor versions
    /// it was published with.
    fn get_release_metadata(&self, node: &Node) -> Result<ReleaseMetadata>;

    fn post_label(&mut self, node: &Node, label: &NewLabel) -> Result<MutationOutcome>;

    fn delete_label(&mut self, node: &Node, key: LabelKey) -> Result<MutationOutcome>;
}
