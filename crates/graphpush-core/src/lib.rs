mod error;
mod label;
mod metadata;
mod node;
mod pullspec;

pub use error::{GraphError, ValidationError};
pub use label::{join_sorted, split_label_value, Label, LabelKey, NewLabel, LABEL_MEDIA_TYPE};
pub use metadata::ReleaseMetadata;
pub use node::{EdgeRecord, Node, NodeRecord};
pub use pullspec::{Pullspec, DEFAULT_REGISTRY};
