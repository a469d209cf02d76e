//! Single entry point over show / add / get / cut / graft.

use std::fmt;

use tracing::instrument;

use crate::domain::arena::{Forest, NodeId};
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::metadata::MergeMode;

pub const TREE_OPTIONS: [&str; 5] = ["show", "add", "get", "cut", "graft"];

/// A loosely typed argument, as passed to [`TreeOp::from_arg`] or as the
/// value of a named option in [`TreeOp::from_options`].
#[derive(Debug, Clone, PartialEq)]
pub enum TreeArg {
    Flag(bool),
    Node(NodeId),
    Path(String),
    Mode(MergeMode),
    Graft(NodeId, MergeMode),
}

impl TreeArg {
    fn kind(&self) -> &'static str {
        match self {
            TreeArg::Flag(_) => "a flag",
            TreeArg::Node(_) => "a node",
            TreeArg::Path(_) => "a path",
            TreeArg::Mode(_) => "a merge mode",
            TreeArg::Graft(..) => "a (node, merge mode) pair",
        }
    }
}

impl From<bool> for TreeArg {
    fn from(b: bool) -> Self {
        TreeArg::Flag(b)
    }
}

impl From<NodeId> for TreeArg {
    fn from(id: NodeId) -> Self {
        TreeArg::Node(id)
    }
}

impl From<&str> for TreeArg {
    fn from(s: &str) -> Self {
        TreeArg::Path(s.to_string())
    }
}

impl From<MergeMode> for TreeArg {
    fn from(mode: MergeMode) -> Self {
        TreeArg::Mode(mode)
    }
}

impl From<(NodeId, MergeMode)> for TreeArg {
    fn from((id, mode): (NodeId, MergeMode)) -> Self {
        TreeArg::Graft(id, mode)
    }
}

/// One validated tree operation.
#[derive(Debug, Clone, PartialEq)]
pub enum TreeOp {
    Show { from_root: bool },
    Add(NodeId),
    Get(String),
    Cut(MergeMode),
    Graft { target: NodeId, mode: MergeMode },
}

impl TreeOp {
    /// Pick the operation from the argument's type: flag shows, node adds,
    /// path gets.
    pub fn from_arg(arg: TreeArg) -> DomainResult<Self> {
        match arg {
            TreeArg::Flag(from_root) => Ok(TreeOp::Show { from_root }),
            TreeArg::Node(id) => Ok(TreeOp::Add(id)),
            TreeArg::Path(path) => Ok(TreeOp::Get(path)),
            other => Err(DomainError::type_mismatch(
                "a flag, a node or a path",
                other.kind(),
            )),
        }
    }

    /// Build the operation from named options; at most one may be given.
    /// No option at all shows the branch below the node.
    pub fn from_options<K, I>(options: I) -> DomainResult<Self>
    where
        K: AsRef<str>,
        I: IntoIterator<Item = (K, TreeArg)>,
    {
        let mut options: Vec<(K, TreeArg)> = options.into_iter().collect();
        if options.len() > 1 {
            return Err(DomainError::InvalidArgument(format!(
                "tree accepts at most 1 option; received {}",
                options.len()
            )));
        }
        let Some((key, value)) = options.pop() else {
            return Ok(TreeOp::Show { from_root: false });
        };
        Self::from_option(key.as_ref(), value)
    }

    fn from_option(key: &str, value: TreeArg) -> DomainResult<Self> {
        match (key, value) {
            ("show", TreeArg::Flag(from_root)) => Ok(TreeOp::Show { from_root }),
            ("add", TreeArg::Node(id)) => Ok(TreeOp::Add(id)),
            ("get", TreeArg::Path(path)) => Ok(TreeOp::Get(path)),
            ("cut", TreeArg::Flag(keep)) => Ok(TreeOp::Cut(MergeMode::from(keep))),
            ("cut", TreeArg::Mode(mode)) => Ok(TreeOp::Cut(mode)),
            ("cut", TreeArg::Path(mode)) => Ok(TreeOp::Cut(mode.parse()?)),
            ("graft", TreeArg::Node(target)) => Ok(TreeOp::Graft {
                target,
                mode: MergeMode::Keep,
            }),
            ("graft", TreeArg::Graft(target, mode)) => Ok(TreeOp::Graft { target, mode }),
            (key, value) if TREE_OPTIONS.contains(&key) => Err(DomainError::type_mismatch(
                expected_for(key),
                format!("{} for option '{}'", value.kind(), key),
            )),
            (key, _) => Err(DomainError::InvalidArgument(format!(
                "invalid option '{}'; must be one of {}",
                key,
                TREE_OPTIONS.join(", ")
            ))),
        }
    }
}

fn expected_for(key: &str) -> &'static str {
    match key {
        "show" => "a flag",
        "add" => "a node",
        "get" => "a path",
        "cut" => "a flag or a merge mode",
        _ => "a node or a (node, merge mode) pair",
    }
}

/// What a [`Forest::tree`] call produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeOutcome {
    /// Rendered tree text
    Shown(String),
    Added,
    Found(NodeId),
    /// Root of the tree a cut or grafted branch now lives in
    NewRoot(NodeId),
}

impl fmt::Display for TreeOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TreeOp::Show { from_root } => write!(f, "show(from_root={})", from_root),
            TreeOp::Add(id) => write!(f, "add({})", id),
            TreeOp::Get(path) => write!(f, "get({:?})", path),
            TreeOp::Cut(mode) => write!(f, "cut({})", mode),
            TreeOp::Graft { target, mode } => write!(f, "graft({}, {})", target, mode),
        }
    }
}

impl Forest {
    /// Run one tree operation on `id`.
    #[instrument(level = "debug", skip(self, op), fields(op = %op))]
    pub fn tree(&mut self, id: NodeId, op: TreeOp) -> DomainResult<TreeOutcome> {
        match op {
            TreeOp::Show { from_root } => self.show(id, from_root).map(TreeOutcome::Shown),
            TreeOp::Add(node) => self.add_child(id, node).map(|_| TreeOutcome::Added),
            TreeOp::Get(path) => self.get_child(id, &path).map(TreeOutcome::Found),
            TreeOp::Cut(mode) => self.cut(id, mode).map(TreeOutcome::NewRoot),
            TreeOp::Graft { target, mode } => {
                self.graft(id, target, mode).map(TreeOutcome::NewRoot)
            }
        }
    }
}
