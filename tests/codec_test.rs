//! Integration tests for per-node serialization through the in-memory container.

use emdtree::application::services::{
    deserialize_node, serialize_node, GroupCodec, CLASS_ATTR, GROUP_TYPE_ATTR, METADATA_GROUP,
};
use emdtree::application::ApplicationError;
use emdtree::domain::{DomainError, Forest, MetadataBundle, NodeClass, Value};
use emdtree::infrastructure::{Group, MemoryGroup};
use emdtree::util::testing::init_test_setup;

// ============================================================
// Round trip
// ============================================================

#[test]
fn given_node_with_bundles_when_round_tripped_then_name_and_bundles_match_and_unrooted() {
    init_test_setup();
    let mut forest = Forest::new();
    let node = forest.new_node("sample");
    forest
        .set_metadata(
            node,
            MetadataBundle::new("calibration")
                .with("pixel_size", 0.5)
                .with("units", "nm")
                .with("shape", vec![256, 256]),
        )
        .unwrap();
    forest
        .set_metadata(node, MetadataBundle::new("microscope").with("kv", 300))
        .unwrap();
    let file = MemoryGroup::new_file();

    let grp = serialize_node(&forest, node, &file).unwrap();
    let restored = deserialize_node(&mut forest, &grp).unwrap();

    assert_ne!(restored, node);
    assert_eq!(forest.name(restored).unwrap(), "sample");
    assert_eq!(forest.class(restored).unwrap(), NodeClass::Node);
    assert!(!forest.is_rooted(restored).unwrap());
    let names: Vec<&String> = forest.metadata(restored).unwrap().keys().collect();
    assert_eq!(names, vec!["calibration", "microscope"]);
    for name in ["calibration", "microscope"] {
        let original = forest.metadata_bundle(node, name).unwrap().unwrap();
        let copy = forest.metadata_bundle(restored, name).unwrap().unwrap();
        assert_eq!(*original.borrow(), *copy.borrow());
    }
}

#[test]
fn given_root_when_round_tripped_then_comes_back_as_its_own_root() {
    let mut forest = Forest::new();
    let root = forest.new_root("R");
    let file = MemoryGroup::new_file();

    let grp = serialize_node(&forest, root, &file).unwrap();
    let restored = deserialize_node(&mut forest, &grp).unwrap();

    assert_eq!(forest.class(restored).unwrap(), NodeClass::Root);
    assert_eq!(forest.root(restored).unwrap(), Some(restored));
}

// ============================================================
// Written layout
// ============================================================

#[test]
fn given_node_when_serialized_then_group_carries_type_and_class_tags() {
    let mut forest = Forest::new();
    let node = forest.new_node("x");
    forest.set_metadata(node, MetadataBundle::new("md")).unwrap();
    let file = MemoryGroup::new_file();

    let grp = serialize_node(&forest, node, &file).unwrap();

    assert_eq!(grp.attr(GROUP_TYPE_ATTR).unwrap(), Some(Value::from("node")));
    assert_eq!(grp.attr(CLASS_ATTR).unwrap(), Some(Value::from("Node")));
    let md = grp.group(METADATA_GROUP).unwrap().unwrap();
    assert_eq!(
        md.attr(GROUP_TYPE_ATTR).unwrap(),
        Some(Value::from("metadatabundle"))
    );
    let bundle = md.group("md").unwrap().unwrap();
    assert_eq!(bundle.attr(GROUP_TYPE_ATTR).unwrap(), Some(Value::from("metadata")));
}

#[test]
fn given_node_without_bundles_when_serialized_then_no_metadata_group() {
    let mut forest = Forest::new();
    let node = forest.new_node("bare");
    let file = MemoryGroup::new_file();

    let grp = serialize_node(&forest, node, &file).unwrap();

    assert!(grp.group(METADATA_GROUP).unwrap().is_none());
    let restored = deserialize_node(&mut forest, &grp).unwrap();
    assert!(forest.metadata(restored).unwrap().is_empty());
}

#[test]
fn given_bundle_when_round_tripped_directly_then_equal() {
    let file = MemoryGroup::new_file();
    let bundle = MetadataBundle::new("md").with("flag", true).with("n", 3);

    let grp = bundle.serialize(&file).unwrap();
    let restored = MetadataBundle::deserialize(&grp).unwrap();

    assert_eq!(restored, bundle);
}

// ============================================================
// Rejected input
// ============================================================

#[test]
fn given_untagged_group_when_deserialized_then_invalid_group_type() {
    let file = MemoryGroup::new_file();
    let grp = file.create_group("plain").unwrap();
    let mut forest = Forest::new();

    let err = deserialize_node(&mut forest, &grp).unwrap_err();

    assert!(matches!(
        err,
        ApplicationError::Domain(DomainError::InvalidGroupType(_))
    ));
}

#[test]
fn given_unknown_class_tag_when_deserialized_then_invalid_group_type() {
    let file = MemoryGroup::new_file();
    let grp = file.create_group("odd").unwrap();
    grp.set_attr(GROUP_TYPE_ATTR, Value::from("node")).unwrap();
    grp.set_attr(CLASS_ATTR, Value::from("DiffractionSlice")).unwrap();
    let mut forest = Forest::new();

    let err = deserialize_node(&mut forest, &grp).unwrap_err();

    assert!(matches!(
        err,
        ApplicationError::Domain(DomainError::InvalidGroupType(msg)) if msg.contains("DiffractionSlice")
    ));
}

#[test]
fn given_bad_group_type_value_when_deserialized_then_invalid_group_type() {
    let file = MemoryGroup::new_file();
    let grp = file.create_group("odd").unwrap();
    grp.set_attr(GROUP_TYPE_ATTR, Value::from("array")).unwrap();
    let mut forest = Forest::new();

    let err = deserialize_node(&mut forest, &grp).unwrap_err();

    assert!(matches!(
        err,
        ApplicationError::Domain(DomainError::InvalidGroupType(_))
    ));
}
