//! Tests for dependency resolution and merging.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use pretty_assertions::assert_eq;

use crate::ast::{
    Attribute, AttributeValue, Constant, Definitions, ExtendedAttribute, InterfaceDefinition, Operation,
};
use crate::reader::{InMemoryReader, ReadError};

use super::{DependencyResolver, InterfaceMerger, InterfacesInfo, Resolution, ResolveError};

fn lookup(interface_name: &str, files: &[&str]) -> HashMap<String, Vec<PathBuf>> {
    let mut lookup = HashMap::new();
    lookup.insert(interface_name.to_string(), files.iter().map(PathBuf::from).collect());
    lookup
}

fn node_definitions() -> Definitions {
    Definitions::new().with_interface(
        InterfaceDefinition::new("Node").with_operation(Operation::new("appendChild", "Node")),
    )
}

fn operation_names(interface: &InterfaceDefinition) -> Vec<&str> {
    interface.operations.iter().map(|op| op.name.as_str()).collect()
}

fn merged_node(resolution: Resolution) -> InterfaceDefinition {
    let definitions = resolution.into_merged().expect("expected merged definitions");
    definitions.interface("Node").cloned().expect("Node missing after merge")
}

#[test]
fn test_unregistered_interface_is_skipped() {
    let resolver = DependencyResolver::new(HashMap::<String, Vec<PathBuf>>::new(), InMemoryReader::new());

    let resolution = resolver
        .resolve(node_definitions(), "Node", Path::new("Node.idl"))
        .unwrap();
    assert!(resolution.is_skipped());
}

#[test]
fn test_missing_target_interface() {
    let resolver = DependencyResolver::new(lookup("Element", &[]), InMemoryReader::new());

    let err = resolver
        .resolve(node_definitions(), "Element", Path::new("idl/Element.idl"))
        .unwrap_err();
    match &err {
        ResolveError::InterfaceNotFound { interface, file } => {
            assert_eq!(interface, "Element");
            assert_eq!(file, Path::new("idl/Element.idl"));
        }
        other => panic!("Expected InterfaceNotFound, got {:?}", other),
    }
    assert!(err.to_string().contains("idl/Element.idl"));
}

#[test]
fn test_registered_without_dependencies_is_unchanged() {
    let resolver = DependencyResolver::new(lookup("Node", &[]), InMemoryReader::new());

    let resolution = resolver
        .resolve(node_definitions(), "Node", Path::new("Node.idl"))
        .unwrap();
    assert_eq!(resolution, Resolution::Merged(node_definitions()));
}

#[test]
fn test_partial_interface_merge() {
    let reader = InMemoryReader::new().with_file(
        "deps/NodeExtras.idl",
        Definitions::new().with_interface(
            InterfaceDefinition::new("Node")
                .partial()
                .with_operation(Operation::new("extra", "void")),
        ),
    );
    let resolver = DependencyResolver::new(lookup("Node", &["deps/NodeExtras.idl"]), reader);

    let node = merged_node(
        resolver
            .resolve(node_definitions(), "Node", Path::new("Node.idl"))
            .unwrap(),
    );

    assert_eq!(operation_names(&node), vec!["appendChild", "extra"]);
    assert_eq!(
        node.operations[1].extended_attributes.value_of(ExtendedAttribute::ImplementedBy),
        Some("NodeExtras")
    );
    // The target's own members are not tagged.
    assert!(!node.operations[0]
        .extended_attributes
        .contains(ExtendedAttribute::ImplementedBy));
}

#[test]
fn test_exception_target_is_never_merged() {
    let definitions = Definitions::new().with_interface(InterfaceDefinition::new("DOMError").exception());
    let reader = InMemoryReader::new().with_file(
        "deps/DOMErrorExtras.idl",
        Definitions::new().with_interface(
            InterfaceDefinition::new("DOMError")
                .partial()
                .with_attribute(Attribute::new("code", "unsigned short")),
        ),
    );
    let resolver = DependencyResolver::new(lookup("DOMError", &["deps/DOMErrorExtras.idl"]), reader);

    let resolution = resolver
        .resolve(definitions.clone(), "DOMError", Path::new("DOMError.idl"))
        .unwrap();
    assert_eq!(resolution, Resolution::Merged(definitions));
}

#[test]
fn test_exception_target_ignores_unreadable_dependencies() {
    let definitions = Definitions::new().with_interface(InterfaceDefinition::new("DOMError").exception());
    let resolver = DependencyResolver::new(
        lookup("DOMError", &["deps/DoesNotExist.idl"]),
        InMemoryReader::new(),
    );

    assert!(resolver
        .resolve(definitions, "DOMError", Path::new("DOMError.idl"))
        .is_ok());
}

#[test]
fn test_partial_for_other_interface_is_rejected() {
    let reader = InMemoryReader::new().with_file(
        "deps/FooPartial.idl",
        Definitions::new().with_interface(InterfaceDefinition::new("Foo").partial()),
    );
    let resolver = DependencyResolver::new(lookup("Node", &["deps/FooPartial.idl"]), reader);

    let err = resolver
        .resolve(node_definitions(), "Node", Path::new("Node.idl"))
        .unwrap_err();
    match err {
        ResolveError::InvalidPartialInterface {
            dependency,
            partial,
            target,
        } => {
            assert_eq!(dependency, PathBuf::from("deps/FooPartial.idl"));
            assert_eq!(partial, "Foo");
            assert_eq!(target, "Node");
        }
        other => panic!("Expected InvalidPartialInterface, got {:?}", other),
    }
}

#[test]
fn test_implemented_interface_with_other_name_is_merged() {
    let reader = InMemoryReader::new().with_file(
        "deps/ParentNode.idl",
        Definitions::new().with_interface(
            InterfaceDefinition::new("ParentNode")
                .with_attribute(Attribute::new("children", "HTMLCollection").read_only())
                .with_operation(Operation::new("querySelector", "Element")),
        ),
    );
    let resolver = DependencyResolver::new(lookup("Node", &["deps/ParentNode.idl"]), reader);

    let node = merged_node(
        resolver
            .resolve(node_definitions(), "Node", Path::new("Node.idl"))
            .unwrap(),
    );
    assert_eq!(node.attributes.len(), 1);
    assert_eq!(operation_names(&node), vec!["appendChild", "querySelector"]);
    assert!(!node.is_partial);
}

#[test]
fn test_dependencies_merge_in_sorted_order() {
    let reader = InMemoryReader::new()
        .with_file(
            "deps/B.idl",
            Definitions::new().with_interface(
                InterfaceDefinition::new("Node")
                    .partial()
                    .with_operation(Operation::new("fromB", "void")),
            ),
        )
        .with_file(
            "deps/A.idl",
            Definitions::new().with_interface(
                InterfaceDefinition::new("Node")
                    .partial()
                    .with_operation(Operation::new("fromA", "void")),
            ),
        );
    let resolver = DependencyResolver::new(lookup("Node", &["deps/B.idl", "deps/A.idl"]), reader);

    let node = merged_node(
        resolver
            .resolve(node_definitions(), "Node", Path::new("Node.idl"))
            .unwrap(),
    );
    assert_eq!(operation_names(&node), vec!["appendChild", "fromA", "fromB"]);
}

#[test]
fn test_missing_dependency_file_propagates_read_error() {
    let resolver = DependencyResolver::new(lookup("Node", &["deps/Gone.idl"]), InMemoryReader::new());

    let err = resolver
        .resolve(node_definitions(), "Node", Path::new("Node.idl"))
        .unwrap_err();
    assert!(matches!(err, ResolveError::Read(ReadError::NotFound(_))));
}

#[test]
fn test_interfaces_info_lookup() {
    let mut info = InterfacesInfo::new();
    info.insert("Node", vec![PathBuf::from("deps/NodeExtras.idl")]);

    let json = serde_json::to_string(&info).unwrap();
    assert_eq!(json, r#"{"Node":{"dependencies_full_paths":["deps/NodeExtras.idl"]}}"#);

    let reader = InMemoryReader::new().with_file(
        "deps/NodeExtras.idl",
        Definitions::new().with_interface(InterfaceDefinition::new("Node").partial()),
    );
    let resolver = DependencyResolver::new(info, reader);
    assert!(!resolver
        .resolve(node_definitions(), "Node", Path::new("Node.idl"))
        .unwrap()
        .is_skipped());
}

// ============================================================
// Member merge
// ============================================================

#[test]
fn test_whitelisted_attributes_propagate_to_every_member() {
    let dependency = InterfaceDefinition::new("NodeAudio")
        .partial()
        .with_extended_attribute(ExtendedAttribute::Conditional, AttributeValue::value("WEB_AUDIO"))
        .with_extended_attribute(ExtendedAttribute::RuntimeEnabled, AttributeValue::value("Audio"))
        .with_extended_attribute(ExtendedAttribute::CheckSecurity, AttributeValue::Present)
        .with_attribute(Attribute::new("volume", "double"))
        .with_constant(Constant::new("MAX", "long", "10"))
        .with_operation(Operation::new("play", "void"));

    let mut merger = InterfaceMerger::new(InterfaceDefinition::new("Node"));
    merger.merge_dependency(dependency, "NodeAudio");
    let node = merger.finish();

    let members = [
        &node.attributes[0].extended_attributes,
        &node.constants[0].extended_attributes,
        &node.operations[0].extended_attributes,
    ];
    for attrs in members {
        assert_eq!(attrs.value_of(ExtendedAttribute::Conditional), Some("WEB_AUDIO"));
        assert_eq!(attrs.value_of(ExtendedAttribute::RuntimeEnabled), Some("Audio"));
        assert!(!attrs.contains(ExtendedAttribute::CheckSecurity));
        assert_eq!(attrs.value_of(ExtendedAttribute::ImplementedBy), Some("NodeAudio"));
    }
    // Interface-level attributes of the dependency never reach the target interface.
    assert!(node.extended_attributes.is_empty());
}

#[test]
fn test_member_local_attribute_wins_over_propagated() {
    let dependency = InterfaceDefinition::new("Node")
        .partial()
        .with_extended_attribute(ExtendedAttribute::RuntimeEnabled, AttributeValue::value("Interface"))
        .with_operation(
            Operation::new("local", "void")
                .with_extended_attribute(ExtendedAttribute::RuntimeEnabled, AttributeValue::value("Member")),
        )
        .with_operation(Operation::new("inherited", "void"));

    let mut merger = InterfaceMerger::new(InterfaceDefinition::new("Node"));
    merger.merge_dependency(dependency, "NodeFeature");
    let node = merger.finish();

    assert_eq!(
        node.operations[0].extended_attributes.value_of(ExtendedAttribute::RuntimeEnabled),
        Some("Member")
    );
    assert_eq!(
        node.operations[1].extended_attributes.value_of(ExtendedAttribute::RuntimeEnabled),
        Some("Interface")
    );
}

#[test]
fn test_implemented_as_overrides_basename() {
    let dependency = InterfaceDefinition::new("WindowTimers")
        .with_extended_attribute(ExtendedAttribute::ImplementedAs, AttributeValue::value("DOMWindowTimers"))
        .with_operation(Operation::new("setTimeout", "long"));

    let mut merger = InterfaceMerger::new(InterfaceDefinition::new("Window"));
    merger.merge_dependency(dependency, "WindowTimers");
    let window = merger.finish();

    let attrs = &window.operations[0].extended_attributes;
    assert_eq!(attrs.value_of(ExtendedAttribute::ImplementedBy), Some("DOMWindowTimers"));
    // [ImplementedAs] is not copied onto members.
    assert!(!attrs.contains(ExtendedAttribute::ImplementedAs));
}

#[test]
fn test_legacy_base_class_dependency_is_not_tagged() {
    let dependency = InterfaceDefinition::new("Node")
        .partial()
        .with_extended_attribute(ExtendedAttribute::LegacyImplementedInBaseClass, AttributeValue::Present)
        .with_extended_attribute(ExtendedAttribute::Conditional, AttributeValue::value("LEGACY"))
        .with_operation(Operation::new("old", "void"));

    let mut merger = InterfaceMerger::new(InterfaceDefinition::new("Node"));
    merger.merge_dependency(dependency, "NodeLegacy");
    let node = merger.finish();

    let attrs = &node.operations[0].extended_attributes;
    assert!(!attrs.contains(ExtendedAttribute::ImplementedBy));
    assert_eq!(attrs.value_of(ExtendedAttribute::Conditional), Some("LEGACY"));
}

#[test]
fn test_unrecognized_interface_attributes_do_not_travel() {
    let mut dependency = InterfaceDefinition::new("Node")
        .partial()
        .with_operation(Operation::new("f", "void"));
    dependency
        .extended_attributes
        .insert_named("Experimental", AttributeValue::Present);

    let mut merger = InterfaceMerger::new(InterfaceDefinition::new("Node"));
    merger.merge_dependency(dependency, "NodeExperimental");
    let node = merger.finish();

    assert!(node.operations[0].extended_attributes.unrecognized().is_empty());
}

#[test]
fn test_merged_count_includes_empty_dependencies() {
    let mut merger = InterfaceMerger::new(InterfaceDefinition::new("Node"));
    merger.merge_dependency(InterfaceDefinition::new("Node").partial(), "Empty");
    merger.merge_dependency(InterfaceDefinition::new("Mixin"), "Mixin");

    assert_eq!(merger.merged_count(), 2);
    assert_eq!(merger.target().member_count(), 0);
}
