use std::collections::BTreeSet;

use anyhow::Result;
use graphpush_core::{NewLabel, Node};
use graphpush_loader::NodeMap;
use graphpush_quay::{LabelRegistry, MutationOutcome};

use crate::plan::{plan_node, NodePlan, PlanStep};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApplyStats {
    pub applied: usize,
    pub dry_run: usize,
}

impl ApplyStats {
    fn record(&mut self, outcome: MutationOutcome) {
        match outcome {
            MutationOutcome::Applied => self.applied += 1,
            MutationOutcome::DryRun => self.dry_run += 1,
        }
    }

    fn merge(&mut self, other: ApplyStats) {
        self.applied += other.applied;
        self.dry_run += other.dry_run;
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncSummary {
    pub nodes: usize,
    pub stats: ApplyStats,
}

impl SyncSummary {
    pub fn summary_line(&self) -> String {
        let ApplyStats { applied, dry_run } = self.stats;
        let subject = format!("synced {} {}", self.nodes, plural(self.nodes, "node"));
        match (applied, dry_run) {
            (0, 0) => format!("{subject}: labels already up to date"),
            (applied, 0) => format!(
                "{subject}: {applied} label {} applied",
                plural(applied, "mutation")
            ),
            (0, dry_run) => format!(
                "{subject}: {dry_run} label {} planned (dry run)",
                plural(dry_run, "mutation")
            ),
            (applied, dry_run) => format!(
                "{subject}: {applied} label {} applied, {dry_run} skipped (dry run)",
                plural(applied, "mutation")
            ),
        }
    }
}

fn plural(count: usize, noun: &str) -> String {
    if count == 1 {
        noun.to_string()
    } else {
        format!("{noun}s")
    }
}

/// Logs each decision in `plan` and performs its mutations in order. The
/// first failing call aborts; earlier mutations stay applied.
pub fn apply_plan<R: LabelRegistry>(
    registry: &mut R,
    node: &Node,
    plan: &NodePlan,
) -> Result<ApplyStats> {
    let mut stats = ApplyStats::default();
    for step in &plan.steps {
        match step {
            PlanStep::Warn(message) => tracing::warn!("{message}"),
            PlanStep::Note(message) => tracing::info!("{message}"),
            PlanStep::Delete(key) => stats.record(registry.delete_label(node, *key)?),
            PlanStep::Create { key, value } => {
                let label = NewLabel::text(*key, value.clone());
                stats.record(registry.post_label(node, &label)?);
            }
        }
    }
    Ok(stats)
}

pub fn sync_node<R: LabelRegistry>(registry: &mut R, node: &Node) -> Result<ApplyStats> {
    let labels = registry.get_labels(node)?;
    let plan = plan_node(node, &labels, || {
        let metadata = registry.get_release_metadata(node)?;
        Ok(metadata.previous.into_iter().collect::<BTreeSet<String>>())
    })?;
    if plan.is_noop() {
        tracing::debug!(version = %node.version, "labels up to date");
    }
    apply_plan(registry, node, &plan)
}

/// Reconciles every node in version order, one at a time.
pub fn sync_graph<R: LabelRegistry>(registry: &mut R, nodes: &NodeMap) -> Result<SyncSummary> {
    let mut summary = SyncSummary::default();
    for node in nodes.values() {
        let stats = sync_node(registry, node)?;
        summary.stats.merge(stats);
        summary.nodes += 1;
    }
    Ok(summary)
}
