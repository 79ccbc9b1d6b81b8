use std::collections::BTreeSet;

use anyhow::Result;
use graphpush_core::{join_sorted, split_label_value, LabelKey, Node};
use graphpush_quay::LabelSet;

/// `previous.remove` value meaning "drop every published predecessor".
pub const REMOVE_ALL_PREVIOUS: &str = "*";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanStep {
    Warn(String),
    Note(String),
    Delete(LabelKey),
    Create { key: LabelKey, value: String },
}

impl PlanStep {
    pub fn is_mutation(&self) -> bool {
        matches!(self, Self::Delete(_) | Self::Create { .. })
    }
}

/// Ordered decisions for one node. Notes precede the mutations they explain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodePlan {
    pub version: String,
    pub steps: Vec<PlanStep>,
}

impl NodePlan {
    fn new(version: &str) -> Self {
        Self {
            version: version.to_string(),
            steps: Vec::new(),
        }
    }

    pub fn mutations(&self) -> impl Iterator<Item = &PlanStep> {
        self.steps.iter().filter(|step| step.is_mutation())
    }

    pub fn mutation_count(&self) -> usize {
        self.mutations().count()
    }

    pub fn is_noop(&self) -> bool {
        self.mutation_count() == 0
    }

    fn warn(&mut self, message: String) {
        self.steps.push(PlanStep::Warn(message));
    }

    fn note(&mut self, message: String) {
        self.steps.push(PlanStep::Note(message));
    }

    fn delete(&mut self, key: LabelKey) {
        self.steps.push(PlanStep::Delete(key));
    }

    fn create(&mut self, key: LabelKey, value: String) {
        self.steps.push(PlanStep::Create { key, value });
    }

    /// Replaces a label whose current value no longer matches. An empty
    /// `value` leaves the label absent.
    fn replace(&mut self, labels: &LabelSet, key: LabelKey, value: String) {
        if labels.contains_key(key.as_str()) {
            self.delete(key);
        }
        if !value.is_empty() {
            self.create(key, value);
        }
    }
}

/// Computes the label mutations that bring `node`'s manifest in line with the
/// declared graph.
///
/// `published_previous` yields the predecessor versions baked into the
/// release image. It is only called when a decision depends on it, and at
/// most once.
pub fn plan_node<F>(node: &Node, labels: &LabelSet, published_previous: F) -> Result<NodePlan>
where
    F: FnOnce() -> Result<BTreeSet<String>>,
{
    let mut plan = NodePlan::new(&node.version);

    let channels = node.release_channels();
    match labels.get(LabelKey::ReleaseChannels.as_str()) {
        Some(label) if label.value == channels => {}
        Some(label) => {
            plan.warn(format!(
                "label mismatch for {}: {} != {}",
                node.version, label.value, channels
            ));
            plan.delete(LabelKey::ReleaseChannels);
            plan.create(LabelKey::ReleaseChannels, channels);
        }
        None => plan.create(LabelKey::ReleaseChannels, channels),
    }

    for key in labels.keys().filter_map(|key| LabelKey::parse(key)) {
        if key.is_deprecated() {
            plan.delete(key);
        }
    }

    if node.has_declared_previous() {
        let published = published_previous()?;

        let want_removed: BTreeSet<String> =
            published.difference(&node.previous).cloned().collect();
        reconcile_set(&mut plan, node, labels, LabelKey::PreviousRemove, &want_removed);

        let want_added: BTreeSet<String> =
            node.previous.difference(&published).cloned().collect();
        reconcile_set(&mut plan, node, labels, LabelKey::PreviousAdd, &want_added);
    } else {
        if labels.contains_key(LabelKey::PreviousAdd.as_str()) {
            plan.note(format!(
                "{} had previous additions, but we want no incoming edges",
                node.version
            ));
            plan.delete(LabelKey::PreviousAdd);
        }

        let current = label_value(labels, LabelKey::PreviousRemove);
        if current != REMOVE_ALL_PREVIOUS && !published_previous()?.is_empty() {
            plan.note(format!(
                "replacing {} previous remove '{}' with {}",
                node.version, current, REMOVE_ALL_PREVIOUS
            ));
            plan.replace(
                labels,
                LabelKey::PreviousRemove,
                REMOVE_ALL_PREVIOUS.to_string(),
            );
        }
    }

    Ok(plan)
}

fn reconcile_set(
    plan: &mut NodePlan,
    node: &Node,
    labels: &LabelSet,
    key: LabelKey,
    wanted: &BTreeSet<String>,
) {
    let current = split_label_value(label_value(labels, key));
    if &current == wanted {
        return;
    }

    plan.note(format!(
        "changing {} {} from {:?} to {:?}",
        node.version,
        key.short_name(),
        current,
        wanted
    ));
    plan.replace(labels, key, join_sorted(wanted));
}

fn label_value(labels: &LabelSet, key: LabelKey) -> &str {
    labels
        .get(key.as_str())
        .map(|label| label.value.as_str())
        .unwrap_or_default()
}
