mod client;
mod layer;
mod registry;

pub use client::{QuayClient, QuayConfig, DEFAULT_TIMEOUT};
pub use layer::extract_release_metadata;
pub use registry::{LabelRegistry, LabelSet, MutationOutcome};
