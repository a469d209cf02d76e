//! Container boundary trait
//!
//! Serialization only needs named sub-groups, attributes, and group
//! enumeration in creation order. Backends implement [`Group`] on a cheap
//! handle type, the way an HDF5 binding hands out group objects.

use crate::domain::Value;
use crate::infrastructure::error::{ContainerError, ContainerResult};

/// A group in a hierarchical container.
pub trait Group: Sized {
    /// Base name of the group (empty for the file-level group).
    fn name(&self) -> String;

    /// Full `/`-delimited location, for messages.
    fn location(&self) -> String;

    /// Create a new, empty sub-group. Fails if `name` is taken.
    fn create_group(&self, name: &str) -> ContainerResult<Self>;

    /// Open an existing sub-group.
    fn group(&self, name: &str) -> ContainerResult<Option<Self>>;

    /// All sub-groups in creation order.
    fn groups(&self) -> ContainerResult<Vec<Self>>;

    /// Set (or overwrite) an attribute.
    fn set_attr(&self, key: &str, value: Value) -> ContainerResult<()>;

    fn attr(&self, key: &str) -> ContainerResult<Option<Value>>;

    /// All attributes of the group.
    fn attrs(&self) -> ContainerResult<Vec<(String, Value)>>;
}

/// Reject names that cannot address a single group.
pub fn validate_group_name(name: &str) -> ContainerResult<()> {
    if name.is_empty() || name == "." || name == ".." || name.contains('/') || name.contains('\\') {
        return Err(ContainerError::InvalidName(name.to_string()));
    }
    Ok(())
}
