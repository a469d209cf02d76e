//! emdtree: singly-rooted trees of named nodes with shared metadata
//! bundles, tree surgery (add, get, cut, graft) and group/attribute
//! container persistence.
//!
//! Layers, inner to outer:
//! - [`domain`]: the node forest, trees, metadata and the `tree` dispatch
//! - [`infrastructure`]: container backends (in-memory and directory)
//! - [`application`]: per-node codec and whole-tree persistence
//! - [`cli`]: the `emdtree` command

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod tree_traits;
pub mod util;
