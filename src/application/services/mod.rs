//! Application services
//!
//! Services orchestrate domain logic and write through the container boundary.

pub mod codec;
pub mod persistence;

pub use codec::{
    deserialize_node, read_group_type, resolve_class, serialize_node, ClassHooks,
    ConstructorArgs, GroupCodec, CLASS_ATTR, GROUP_TYPE_ATTR, METADATA_GROUP,
};
pub use persistence::{open_tree, read_tree, tree_names, write_branch, write_tree};
