//! Metadata bundles: named key/value dictionaries attached to nodes.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::error::DomainError;
use crate::domain::value::Value;

/// Child key under which a node's bundles are stored; never a node name.
pub const METADATA_KEY: &str = "_metadata";

/// Handle to a bundle that may be attached to several nodes at once.
///
/// Grafting with [`MergeMode::Keep`] shares the handle, so a change made
/// through one node is visible through every node holding it.
pub type SharedBundle = Rc<RefCell<MetadataBundle>>;

/// A named key/value dictionary.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MetadataBundle {
    pub name: String,
    entries: BTreeMap<String, Value>,
}

impl MetadataBundle {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: BTreeMap::new(),
        }
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert or overwrite an entry, returning the previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.entries.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.entries.remove(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.entries.keys()
    }

    pub fn entries(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Independent duplicate, detached from any sharing.
    pub fn copy(&self) -> Self {
        self.clone()
    }

    pub fn into_shared(self) -> SharedBundle {
        Rc::new(RefCell::new(self))
    }
}

/// How the metadata of a grafted branch's old root is carried to the new root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MergeMode {
    /// Attach the same bundle instances to the new root.
    #[default]
    #[serde(alias = "true")]
    Keep,
    /// Carry nothing over.
    #[serde(alias = "false")]
    Discard,
    /// Attach independent duplicates.
    Copy,
}

impl MergeMode {
    /// Apply the mode to one bundle of the old root.
    pub fn transfer(&self, bundle: &SharedBundle) -> Option<SharedBundle> {
        match self {
            MergeMode::Keep => Some(Rc::clone(bundle)),
            MergeMode::Discard => None,
            MergeMode::Copy => Some(bundle.borrow().copy().into_shared()),
        }
    }
}

impl From<bool> for MergeMode {
    fn from(keep: bool) -> Self {
        if keep {
            MergeMode::Keep
        } else {
            MergeMode::Discard
        }
    }
}

impl FromStr for MergeMode {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "true" | "keep" => Ok(MergeMode::Keep),
            "false" | "discard" => Ok(MergeMode::Discard),
            "copy" => Ok(MergeMode::Copy),
            other => Err(DomainError::InvalidArgument(format!(
                "metadata merge mode must be one of true, false, copy; got {:?}",
                other
            ))),
        }
    }
}

impl fmt::Display for MergeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MergeMode::Keep => "keep",
            MergeMode::Discard => "discard",
            MergeMode::Copy => "copy",
        };
        write!(f, "{}", s)
    }
}
