mod apply;
mod plan;

pub use apply::{apply_plan, sync_graph, sync_node, ApplyStats, SyncSummary};
pub use plan::{plan_node, NodePlan, PlanStep, REMOVE_ALL_PREVIOUS};
