//! Per-node EMD (de)serialization.
//!
//! `serialize_node` writes one node (tags plus metadata) and does not
//! recurse; the tree walk lives in [`super::persistence`] so that node
//! classes with their own payload can write it between the tag step and
//! the metadata step.

use tracing::{debug, instrument};

use crate::application::error::ApplicationResult;
use crate::domain::{
    DomainError, Forest, GroupType, MetadataBundle, NodeClass, NodeId, Value, METADATA_KEY,
};
use crate::infrastructure::Group;

/// Attribute holding the group's EMD type.
pub const GROUP_TYPE_ATTR: &str = "emd_group_type";
/// Attribute holding the class a node group was written from.
pub const CLASS_ATTR: &str = "emd_class";
/// Sub-group holding a node's metadata bundles.
pub const METADATA_GROUP: &str = METADATA_KEY;

const RESERVED_ATTRS: [&str; 2] = [GROUP_TYPE_ATTR, CLASS_ATTR];

/// Read and validate the group-type tag of `group`.
pub fn read_group_type<G: Group>(group: &G) -> ApplicationResult<GroupType> {
    match group.attr(GROUP_TYPE_ATTR)? {
        Some(Value::Text(raw)) => Ok(raw.parse::<GroupType>()?),
        Some(other) => Err(DomainError::InvalidGroupType(format!(
            "{}: {} tag is {}, not text",
            group.location(),
            GROUP_TYPE_ATTR,
            other.kind()
        ))
        .into()),
        None => Err(DomainError::InvalidGroupType(format!(
            "{} is not a valid EMD group: no {} tag",
            group.location(),
            GROUP_TYPE_ATTR
        ))
        .into()),
    }
}

fn tag<G: Group>(group: &G, group_type: GroupType) -> ApplicationResult<()> {
    group.set_attr(GROUP_TYPE_ATTR, Value::from(group_type.as_str()))?;
    Ok(())
}

// ============================================================
// METADATA BUNDLES
// ============================================================

/// Types that round-trip through a container group.
pub trait GroupCodec: Sized {
    /// Write `self` as a new sub-group of `parent` and return that group.
    fn serialize<G: Group>(&self, parent: &G) -> ApplicationResult<G>;

    /// Rebuild a value from a group written by [`GroupCodec::serialize`].
    fn deserialize<G: Group>(group: &G) -> ApplicationResult<Self>;
}

impl GroupCodec for MetadataBundle {
    fn serialize<G: Group>(&self, parent: &G) -> ApplicationResult<G> {
        let grp = parent.create_group(&self.name)?;
        tag(&grp, GroupType::Metadata)?;
        for (key, value) in self.entries() {
            if RESERVED_ATTRS.contains(&key.as_str()) {
                return Err(DomainError::InvalidArgument(format!(
                    "metadata key {:?} in bundle '{}' is reserved",
                    key, self.name
                ))
                .into());
            }
            grp.set_attr(key, value.clone())?;
        }
        Ok(grp)
    }

    fn deserialize<G: Group>(group: &G) -> ApplicationResult<Self> {
        let group_type = read_group_type(group)?;
        if group_type != GroupType::Metadata {
            return Err(DomainError::InvalidGroupType(format!(
                "{} is a {} group, not metadata",
                group.location(),
                group_type
            ))
            .into());
        }
        let mut bundle = MetadataBundle::new(group.name());
        for (key, value) in group.attrs()? {
            if !RESERVED_ATTRS.contains(&key.as_str()) {
                bundle.insert(key, value);
            }
        }
        Ok(bundle)
    }
}

// ============================================================
// NODE CLASS HOOKS
// ============================================================

/// Arguments needed to construct a node of some class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstructorArgs {
    pub name: String,
}

/// Per-class reconstruction hooks, dispatched exhaustively over [`NodeClass`].
pub trait ClassHooks {
    /// Extract the constructor arguments from a node group.
    fn constructor_args<G: Group>(&self, group: &G) -> ApplicationResult<ConstructorArgs>;

    /// Fill structural data into a freshly constructed node.
    fn populate<G: Group>(&self, forest: &mut Forest, id: NodeId, group: &G) -> ApplicationResult<()>;
}

impl ClassHooks for NodeClass {
    fn constructor_args<G: Group>(&self, group: &G) -> ApplicationResult<ConstructorArgs> {
        match self {
            // plain nodes and roots carry nothing but their name
            NodeClass::Node | NodeClass::Root => Ok(ConstructorArgs { name: group.name() }),
        }
    }

    fn populate<G: Group>(&self, _forest: &mut Forest, _id: NodeId, _group: &G) -> ApplicationResult<()> {
        match self {
            NodeClass::Node | NodeClass::Root => Ok(()),
        }
    }
}

/// Pick the class a node group was written from.
pub fn resolve_class<G: Group>(group: &G) -> ApplicationResult<NodeClass> {
    let group_type = read_group_type(group)?;
    if !group_type.is_node() {
        return Err(DomainError::InvalidGroupType(format!(
            "{} is a {} group, not a node",
            group.location(),
            group_type
        ))
        .into());
    }
    match group.attr(CLASS_ATTR)? {
        Some(Value::Text(name)) => NodeClass::from_class_name(&name).ok_or_else(|| {
            DomainError::InvalidGroupType(format!(
                "{}: no node class named {:?}",
                group.location(),
                name
            ))
            .into()
        }),
        Some(other) => Err(DomainError::InvalidGroupType(format!(
            "{}: {} tag is {}, not text",
            group.location(),
            CLASS_ATTR,
            other.kind()
        ))
        .into()),
        None => NodeClass::for_group_type(group_type)
            .ok_or_else(|| DomainError::InvalidGroupType(group_type.to_string()).into()),
    }
}

// ============================================================
// NODES
// ============================================================

/// Write node `id` as a new sub-group of `parent`: tags first, then a
/// `_metadata` group if the node carries any bundles. Children are not
/// written.
#[instrument(level = "debug", skip(forest, parent), fields(parent = %parent.location()))]
pub fn serialize_node<G: Group>(forest: &Forest, id: NodeId, parent: &G) -> ApplicationResult<G> {
    let node = forest.node(id)?;
    let grp = parent.create_group(node.name())?;
    tag(&grp, node.class().group_type())?;
    grp.set_attr(CLASS_ATTR, Value::from(node.class().class_name()))?;

    if !node.metadata().is_empty() {
        let grp_metadata = grp.create_group(METADATA_GROUP)?;
        tag(&grp_metadata, GroupType::MetadataBundle)?;
        for (key, bundle) in node.metadata() {
            let bundle = bundle.borrow();
            if bundle.name == *key {
                bundle.serialize(&grp_metadata)?;
            } else {
                // write under the key the node knows it by
                let mut renamed = bundle.copy();
                renamed.name = key.clone();
                renamed.serialize(&grp_metadata)?;
            }
        }
    }
    debug!(location = %grp.location(), "wrote node");
    Ok(grp)
}

/// Rebuild a single node from `group`.
///
/// The node comes back without parent or children. A root is rooted at
/// itself by construction; any other class comes back unrooted.
#[instrument(level = "debug", skip(forest, group), fields(location = %group.location()))]
pub fn deserialize_node<G: Group>(forest: &mut Forest, group: &G) -> ApplicationResult<NodeId> {
    let class = resolve_class(group)?;
    let args = class.constructor_args(group)?;
    let id = forest.new_of_class(class, args.name);
    class.populate(forest, id, group)?;

    if let Some(grp_metadata) = group.group(METADATA_GROUP)? {
        for md in grp_metadata.groups()? {
            forest.set_metadata(id, MetadataBundle::deserialize(&md)?)?;
        }
    }
    Ok(id)
}
