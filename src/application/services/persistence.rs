//! Whole-tree persistence on top of the per-node codec.
//!
//! A container file may hold any number of trees, one top-level group per
//! root. Writing walks a node's tree depth-first and calls
//! [`serialize_node`] per node; reading does the reverse and re-attaches
//! children with [`Forest::add_child`], so a tree read back satisfies the
//! same invariants as one built by hand.

use tracing::{debug, info, instrument};

use crate::application::error::ApplicationResult;
use crate::application::services::codec::{deserialize_node, serialize_node, METADATA_GROUP};
use crate::domain::{DomainError, Forest, NodeClass, NodeId};
use crate::infrastructure::Group;

/// Write the whole tree that `id` belongs to as a new top-level group of
/// `file`, returning the root's group.
///
/// A node without a root is first wrapped: the topmost node above it goes
/// into a fresh root of the same name, so the whole unrooted branch lands
/// in the file as a tree of its own.
#[instrument(level = "debug", skip(forest, file), fields(file = %file.location()))]
pub fn write_tree<G: Group>(forest: &mut Forest, id: NodeId, file: &G) -> ApplicationResult<G> {
    let root = match forest.root(id)? {
        Some(root) => root,
        None => {
            let top = forest.top(id)?;
            let name = forest.name(top)?.to_string();
            let root = forest.new_root(name);
            forest.add_child(root, top)?;
            debug!("wrapped unrooted node in a new root");
            root
        }
    };
    let grp = write_branch(forest, root, file)?;
    info!(location = %grp.location(), "wrote tree");
    Ok(grp)
}

/// Write `id` and everything below it as a new sub-group of `parent`.
pub fn write_branch<G: Group>(forest: &Forest, id: NodeId, parent: &G) -> ApplicationResult<G> {
    let grp = serialize_node(forest, id, parent)?;
    for (_, child) in forest.children(id)?.entries() {
        write_branch(forest, child, &grp)?;
    }
    Ok(grp)
}

/// Rebuild the tree stored in `group` (one of the file's top-level groups).
///
/// Returns the node rebuilt from `group`. If that group holds a plain node
/// rather than a root, it is wrapped in a fresh root of the same name.
#[instrument(level = "debug", skip(forest, group), fields(location = %group.location()))]
pub fn read_tree<G: Group>(forest: &mut Forest, group: &G) -> ApplicationResult<NodeId> {
    let top = deserialize_node(forest, group)?;
    if forest.class(top)? != NodeClass::Root {
        let name = forest.name(top)?.to_string();
        let root = forest.new_root(name);
        forest.add_child(root, top)?;
    }
    read_children(forest, top, group)?;
    info!(nodes = forest.iter_subtree(top).count(), "read tree");
    Ok(top)
}

fn read_children<G: Group>(forest: &mut Forest, parent: NodeId, group: &G) -> ApplicationResult<()> {
    for child_group in group.groups()? {
        if child_group.name() == METADATA_GROUP {
            continue;
        }
        let child = deserialize_node(forest, &child_group)?;
        if forest.class(child)? == NodeClass::Root {
            return Err(DomainError::InvalidGroupType(format!(
                "{}: a root can only be stored at the top of a tree",
                child_group.location()
            ))
            .into());
        }
        forest.add_child(parent, child)?;
        read_children(forest, child, &child_group)?;
    }
    Ok(())
}

/// Names of the trees stored in `file`.
pub fn tree_names<G: Group>(file: &G) -> ApplicationResult<Vec<String>> {
    Ok(file.groups()?.iter().map(|g| g.name()).collect())
}

/// Read the tree called `name` from `file`, or the only tree if `name` is
/// None.
pub fn open_tree<G: Group>(forest: &mut Forest, file: &G, name: Option<&str>) -> ApplicationResult<NodeId> {
    let group = match name {
        Some(name) => file
            .group(name)?
            .ok_or_else(|| DomainError::KeyNotFound(name.to_string()))?,
        None => {
            let mut groups = file.groups()?;
            match groups.len() {
                1 => groups.remove(0),
                0 => {
                    return Err(DomainError::InvalidArgument(format!(
                        "{} holds no trees",
                        file.location()
                    ))
                    .into())
                }
                n => {
                    return Err(DomainError::InvalidArgument(format!(
                        "{} holds {} trees ({}); choose one by name",
                        file.location(),
                        n,
                        tree_names(file)?.join(", ")
                    ))
                    .into())
                }
            }
        }
    };
    read_tree(forest, &group)
}
