//! Infrastructure layer: container backends
//!
//! This layer implements the group/attribute boundary that serialization writes through.

pub mod directory;
pub mod error;
pub mod memory;
pub mod traits;

pub use directory::DirGroup;
pub use error::{ContainerError, ContainerResult};
pub use memory::MemoryGroup;
pub use traits::Group;
