//! Domain layer: the node forest and its tree surgery
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod arena;
pub mod class;
pub mod dispatch;
pub mod error;
pub mod metadata;
pub mod mutation;
pub mod tree;
pub mod value;

pub use arena::{Forest, NodeEntry, NodeId, SubtreeIterator, DEFAULT_NODE_NAME, DEFAULT_ROOT_NAME};
pub use class::{GroupType, NodeClass};
pub use dispatch::{TreeArg, TreeOp, TreeOutcome};
pub use error::{DomainError, DomainResult};
pub use metadata::{MergeMode, MetadataBundle, SharedBundle, METADATA_KEY};
pub use tree::Tree;
pub use value::Value;
