//! Tree surgery: attaching, resolving, grafting and cutting branches.

use tracing::{debug, instrument, warn};

use crate::domain::arena::{Forest, NodeId};
use crate::domain::class::NodeClass;
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::metadata::{MergeMode, SharedBundle, METADATA_KEY};

impl Forest {
    /// Store `node` in `owner`'s tree under `key`; the node takes `key` as its name.
    ///
    /// `node` must be a live, free-standing, unrooted node. A child already
    /// stored under `key` is displaced and left free-standing. The metadata
    /// key is reserved and never accepted.
    #[instrument(level = "debug", skip(self))]
    pub fn set_child(&mut self, owner: NodeId, key: &str, node: NodeId) -> DomainResult<()> {
        self.node(owner)?;
        if key == METADATA_KEY {
            return Err(DomainError::InvalidArgument(format!(
                "'{}' is reserved for metadata and cannot name a child",
                key
            )));
        }
        let entry = self.node(node)?;
        if self.is_rooted(node)? {
            return Err(DomainError::AlreadyRooted(entry.name.clone()));
        }
        if entry.parent.is_some() {
            return Err(DomainError::InvalidArgument(format!(
                "'{}' is already a child of another node",
                entry.name
            )));
        }
        if self.is_descendant_of(owner, node)? {
            return Err(DomainError::InvalidArgument(format!(
                "cannot attach '{}' below itself",
                entry.name
            )));
        }

        let displaced = self.node_mut(owner)?.children.insert(key.to_string(), node);
        if let Some(old) = displaced {
            warn!(key, "displacing existing child");
            self.node_mut(old)?.parent = None;
        }
        let entry = self.node_mut(node)?;
        entry.name = key.to_string();
        entry.parent = Some(owner);
        Ok(())
    }

    /// Remove the top-level child `key` from `owner`'s tree.
    ///
    /// The removed node keeps its subtree and becomes free-standing.
    #[instrument(level = "debug", skip(self))]
    pub fn delete_child(&mut self, owner: NodeId, key: &str) -> DomainResult<NodeId> {
        let removed = self.node_mut(owner)?.children.remove(key)?;
        self.node_mut(removed)?.parent = None;
        Ok(removed)
    }

    /// Add the unrooted `node` as a child of the rooted `parent`.
    ///
    /// To move an already rooted branch use [`Forest::graft`].
    #[instrument(level = "debug", skip(self))]
    pub fn add_child(&mut self, parent: NodeId, node: NodeId) -> DomainResult<()> {
        if !self.is_rooted(parent)? {
            return Err(DomainError::Unrooted(format!(
                "can't add objects to the unrooted node '{}'",
                self.name(parent)?
            )));
        }
        let name = self.name(node)?.to_string();
        self.set_child(parent, &name, node)?;
        debug!(path = ?self.path(node)?, "added node");
        Ok(())
    }

    /// Resolve a `/`-delimited child path.
    ///
    /// Relative paths start at `id`; a leading `/` starts at its root.
    #[instrument(level = "trace", skip(self))]
    pub fn get_child(&self, id: NodeId, path: &str) -> DomainResult<NodeId> {
        if path.starts_with('/') {
            let root = self.root(id)?.ok_or_else(|| {
                DomainError::Unrooted(format!(
                    "can't resolve the absolute path {:?} from an unrooted node",
                    path
                ))
            })?;
            self.children(root)?.get(self, path)
        } else {
            self.children(id)?.get(self, path)
        }
    }

    /// Move the branch starting at `id` below `target`, carrying the old
    /// root's metadata to the new root according to `mode`.
    ///
    /// Returns the root of the tree the branch now lives in. Every check
    /// runs before the branch is detached, so a failed graft changes nothing.
    #[instrument(level = "debug", skip(self))]
    pub fn graft(&mut self, id: NodeId, target: NodeId, mode: MergeMode) -> DomainResult<NodeId> {
        let old_root = self.root(id)?.ok_or_else(|| {
            DomainError::Unrooted(format!(
                "can't graft the unrooted node '{}'; add it instead",
                self.name(id).unwrap_or_default()
            ))
        })?;
        let new_root = self.root(target)?.ok_or_else(|| {
            DomainError::Unrooted(format!(
                "can't graft onto the unrooted node '{}'",
                self.name(target).unwrap_or_default()
            ))
        })?;
        let parent = match self.parent(id)? {
            Some(parent) => parent,
            None => {
                return Err(DomainError::InvalidArgument(format!(
                    "'{}' is a root and cannot be grafted",
                    self.name(id)?
                )))
            }
        };
        if self.is_descendant_of(target, id)? {
            return Err(DomainError::InvalidArgument(format!(
                "cannot graft '{}' onto its own branch",
                self.name(id)?
            )));
        }

        let name = self.name(id)?.to_string();
        self.delete_child(parent, &name)?;
        self.add_child(target, id)?;

        let carried: Vec<SharedBundle> = self
            .metadata(old_root)?
            .values()
            .filter_map(|bundle| mode.transfer(bundle))
            .collect();
        for bundle in carried {
            self.attach_metadata(new_root, bundle)?;
        }
        debug!(%mode, path = ?self.path(id)?, "grafted branch");
        Ok(new_root)
    }

    /// Split the branch starting at `id` off into a new tree whose root is
    /// named after it. Returns the new root.
    #[instrument(level = "debug", skip(self))]
    pub fn cut(&mut self, id: NodeId, mode: MergeMode) -> DomainResult<NodeId> {
        // validate before allocating the new root
        if !self.is_rooted(id)? {
            return Err(DomainError::Unrooted(format!(
                "can't cut the unrooted node '{}'",
                self.name(id)?
            )));
        }
        if self.class(id)? == NodeClass::Root {
            return Err(DomainError::InvalidArgument(format!(
                "'{}' is a root and cannot be cut",
                self.name(id)?
            )));
        }
        let name = self.name(id)?.to_string();
        let new_root = self.new_root(name);
        self.graft(id, new_root, mode)
    }

    /// Render the branch below `id`, or the whole tree when `from_root` is set.
    pub fn show(&self, id: NodeId, from_root: bool) -> DomainResult<String> {
        let start = if from_root {
            self.root(id)?.ok_or_else(|| {
                DomainError::Unrooted(format!(
                    "can't display the unrooted node '{}' from its root",
                    self.name(id).unwrap_or_default()
                ))
            })?
        } else {
            id
        };
        Ok(self.children(start)?.render(self))
    }
}
