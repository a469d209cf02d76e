use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use generational_arena::{Arena, Index};
use tracing::instrument;

use crate::domain::class::NodeClass;
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::metadata::{MetadataBundle, SharedBundle};
use crate::domain::tree::Tree;

pub const DEFAULT_NODE_NAME: &str = "node";
pub const DEFAULT_ROOT_NAME: &str = "root";

/// Handle to a node stored in a [`Forest`].
///
/// Handles are generational: once a node is discarded its handle stops
/// resolving, even if the slot is reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(Index);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (slot, generation) = self.0.into_raw_parts();
        write!(f, "#{}.{}", slot, generation)
    }
}

/// Node payload in the arena.
#[derive(Debug)]
pub struct NodeEntry {
    /// Name, unique among siblings
    pub(crate) name: String,
    /// Concrete class; decides the group-type tag
    pub(crate) class: NodeClass,
    /// Index of the parent node, None for roots and free-standing nodes
    pub(crate) parent: Option<NodeId>,
    /// Children keyed by name
    pub(crate) children: Tree,
    /// Metadata bundles keyed by name
    pub(crate) metadata: BTreeMap<String, SharedBundle>,
}

impl NodeEntry {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn class(&self) -> NodeClass {
        self.class
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &Tree {
        &self.children
    }

    pub fn metadata(&self) -> &BTreeMap<String, SharedBundle> {
        &self.metadata
    }
}

/// Arena holding every node of any number of trees.
///
/// Ownership flows strictly parent -> child through each node's [`Tree`].
/// The upward link is a plain parent index, so the root and the path of a
/// node are derived by walking it and can never go stale after a graft.
#[derive(Debug, Default)]
pub struct Forest {
    arena: Arena<NodeEntry>,
}

impl Forest {
    pub fn new() -> Self {
        Self::default()
    }

    fn insert(&mut self, name: String, class: NodeClass) -> NodeId {
        NodeId(self.arena.insert(NodeEntry {
            name,
            class,
            parent: None,
            children: Tree::new(),
            metadata: BTreeMap::new(),
        }))
    }

    /// Create a free-standing, unrooted node.
    #[instrument(level = "trace", skip_all)]
    pub fn new_node(&mut self, name: impl Into<String>) -> NodeId {
        self.insert(name.into(), NodeClass::Node)
    }

    /// Create a root: rooted at itself, with the empty path.
    #[instrument(level = "trace", skip_all)]
    pub fn new_root(&mut self, name: impl Into<String>) -> NodeId {
        self.insert(name.into(), NodeClass::Root)
    }

    /// Create a node of the given class.
    pub fn new_of_class(&mut self, class: NodeClass, name: impl Into<String>) -> NodeId {
        self.insert(name.into(), class)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.arena.contains(id.0)
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    pub fn node(&self, id: NodeId) -> DomainResult<&NodeEntry> {
        self.arena
            .get(id.0)
            .ok_or_else(|| DomainError::type_mismatch("a live node", format!("stale handle {}", id)))
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> DomainResult<&mut NodeEntry> {
        self.arena
            .get_mut(id.0)
            .ok_or_else(|| DomainError::type_mismatch("a live node", format!("stale handle {}", id)))
    }

    pub fn name(&self, id: NodeId) -> DomainResult<&str> {
        Ok(&self.node(id)?.name)
    }

    pub fn class(&self, id: NodeId) -> DomainResult<NodeClass> {
        Ok(self.node(id)?.class)
    }

    pub fn parent(&self, id: NodeId) -> DomainResult<Option<NodeId>> {
        Ok(self.node(id)?.parent)
    }

    pub fn children(&self, id: NodeId) -> DomainResult<&Tree> {
        Ok(&self.node(id)?.children)
    }

    /// Topmost ancestor (the node itself when it has no parent).
    pub fn top(&self, id: NodeId) -> DomainResult<NodeId> {
        let mut current = id;
        while let Some(parent) = self.node(current)?.parent {
            current = parent;
        }
        Ok(current)
    }

    /// The root of the tree `id` belongs to, or None if it is unrooted.
    #[instrument(level = "trace", skip(self))]
    pub fn root(&self, id: NodeId) -> DomainResult<Option<NodeId>> {
        let top = self.top(id)?;
        match self.node(top)?.class {
            NodeClass::Root => Ok(Some(top)),
            NodeClass::Node => Ok(None),
        }
    }

    pub fn is_rooted(&self, id: NodeId) -> DomainResult<bool> {
        Ok(self.root(id)?.is_some())
    }

    /// `/`-delimited address from the root: `""` for a root, `"/a/b"` below
    /// it, None when unrooted.
    #[instrument(level = "trace", skip(self))]
    pub fn path(&self, id: NodeId) -> DomainResult<Option<String>> {
        if !self.is_rooted(id)? {
            return Ok(None);
        }
        let mut segments = Vec::new();
        let mut current = id;
        while let Some(parent) = self.node(current)?.parent {
            segments.push(self.node(current)?.name.as_str());
            current = parent;
        }
        segments.reverse();
        Ok(Some(segments.iter().map(|s| format!("/{}", s)).collect()))
    }

    /// Whether `id` is `ancestor` or lies below it.
    pub fn is_descendant_of(&self, id: NodeId, ancestor: NodeId) -> DomainResult<bool> {
        let mut current = Some(id);
        while let Some(node) = current {
            if node == ancestor {
                return Ok(true);
            }
            current = self.node(node)?.parent;
        }
        Ok(false)
    }

    // ------------------------------------------------------------
    // metadata
    // ------------------------------------------------------------

    pub fn metadata(&self, id: NodeId) -> DomainResult<&BTreeMap<String, SharedBundle>> {
        Ok(&self.node(id)?.metadata)
    }

    pub fn metadata_bundle(&self, id: NodeId, name: &str) -> DomainResult<Option<SharedBundle>> {
        Ok(self.node(id)?.metadata.get(name).map(Rc::clone))
    }

    /// Attach a bundle under its own name, replacing any bundle of that name.
    pub fn set_metadata(&mut self, id: NodeId, bundle: MetadataBundle) -> DomainResult<SharedBundle> {
        let shared = bundle.into_shared();
        self.attach_metadata(id, Rc::clone(&shared))?;
        Ok(shared)
    }

    /// Attach an existing (possibly shared) bundle handle.
    pub fn attach_metadata(&mut self, id: NodeId, bundle: SharedBundle) -> DomainResult<()> {
        let name = bundle.borrow().name.clone();
        self.node_mut(id)?.metadata.insert(name, bundle);
        Ok(())
    }

    pub fn remove_metadata(&mut self, id: NodeId, name: &str) -> DomainResult<Option<SharedBundle>> {
        Ok(self.node_mut(id)?.metadata.remove(name))
    }

    // ------------------------------------------------------------
    // traversal
    // ------------------------------------------------------------

    /// Pre-order traversal of the subtree starting at `id`.
    pub fn iter_subtree(&self, id: NodeId) -> SubtreeIterator<'_> {
        SubtreeIterator::new(self, id)
    }

    /// Drop a free-standing node and everything below it from the arena.
    #[instrument(level = "debug", skip(self))]
    pub fn discard(&mut self, id: NodeId) -> DomainResult<usize> {
        if self.node(id)?.parent.is_some() {
            return Err(DomainError::InvalidArgument(format!(
                "cannot discard '{}': it is still attached to a parent",
                self.node(id)?.name
            )));
        }
        let doomed: Vec<NodeId> = self.iter_subtree(id).map(|(idx, _)| idx).collect();
        for idx in &doomed {
            self.arena.remove(idx.0);
        }
        Ok(doomed.len())
    }

    /// Top-level listing of a node's tree, one child per line with its class.
    pub fn summary(&self, id: NodeId) -> DomainResult<String> {
        let node = self.node(id)?;
        let mut out = format!(
            "{}( A {} called '{}', containing the following top-level objects in its tree:\n",
            node.class, node.class, node.name
        );
        for (key, child) in node.children.entries() {
            out.push_str(&format!("    {} \t\t ({})\n", key, self.node(child)?.class));
        }
        out.push(')');
        Ok(out)
    }
}

pub struct SubtreeIterator<'a> {
    forest: &'a Forest,
    stack: Vec<NodeId>,
}

impl<'a> SubtreeIterator<'a> {
    fn new(forest: &'a Forest, start: NodeId) -> Self {
        let mut stack = Vec::new();
        if forest.contains(start) {
            stack.push(start);
        }
        Self { forest, stack }
    }
}

impl<'a> Iterator for SubtreeIterator<'a> {
    type Item = (NodeId, &'a NodeEntry);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(current) = self.stack.pop() {
            if let Ok(node) = self.forest.node(current) {
                // Push children in reverse order for left-to-right traversal
                let children: Vec<NodeId> = node.children.entries().map(|(_, id)| id).collect();
                self.stack.extend(children.into_iter().rev());
                return Some((current, node));
            }
        }
        None
    }
}
