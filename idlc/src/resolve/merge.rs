//! Merging dependency interfaces into a target interface.

use tracing::debug;

use crate::ast::{AttributeValue, ExtendedAttribute, ExtendedAttributes, InterfaceDefinition, Member};

/// Interface-level attributes that move onto each merged member.
///
/// Moving an attribute from an interface to its members changes its scope:
/// `[RuntimeEnabled]` on a dependency gates each contributed member rather
/// than the target interface. Nothing outside this list travels.
pub const DEPENDENCY_EXTENDED_ATTRIBUTES: [ExtendedAttribute; 3] = [
    ExtendedAttribute::Conditional,
    ExtendedAttribute::PerContextEnabled,
    ExtendedAttribute::RuntimeEnabled,
];

/// Owns a target interface while dependencies are merged into it.
///
/// Members are moved out of each dependency and appended to the target's
/// lists in the order dependencies are handed in.
#[derive(Debug)]
pub struct InterfaceMerger {
    target: InterfaceDefinition,
    merged: usize,
}

impl InterfaceMerger {
    pub fn new(target: InterfaceDefinition) -> Self {
        Self { target, merged: 0 }
    }

    /// The interface being built.
    pub fn target(&self) -> &InterfaceDefinition {
        &self.target
    }

    /// Number of dependency interfaces merged so far.
    pub fn merged_count(&self) -> usize {
        self.merged
    }

    /// Merge one dependency interface declared in the file `basename`.
    ///
    /// Members are tagged `[ImplementedBy]` with the dependency's
    /// `[ImplementedAs]` value, falling back to `basename`, unless the
    /// dependency is marked `[LegacyImplementedInBaseClass]`.
    pub fn merge_dependency(&mut self, dependency: InterfaceDefinition, basename: &str) {
        let propagated = dependency
            .extended_attributes
            .restricted_to(&DEPENDENCY_EXTENDED_ATTRIBUTES);

        // [ImplementedAs] names a class on interfaces but a function on
        // members, so it is translated rather than copied.
        // TODO: drop the legacy branch once no declaration uses LegacyImplementedInBaseClass.
        let implemented_by = if dependency
            .extended_attributes
            .contains(ExtendedAttribute::LegacyImplementedInBaseClass)
        {
            None
        } else {
            Some(
                dependency
                    .extended_attributes
                    .value_of(ExtendedAttribute::ImplementedAs)
                    .unwrap_or(basename)
                    .to_string(),
            )
        };

        debug!(
            "merging `{}` ({} members) into `{}`, implemented by {}",
            dependency.name,
            dependency.member_count(),
            self.target.name,
            implemented_by.as_deref().unwrap_or("<base class>"),
        );

        let implemented_by = implemented_by.as_deref();
        merge_members(dependency.attributes, &mut self.target.attributes, &propagated, implemented_by);
        merge_members(dependency.constants, &mut self.target.constants, &propagated, implemented_by);
        merge_members(dependency.operations, &mut self.target.operations, &propagated, implemented_by);
        self.merged += 1;
    }

    /// Release the merged interface.
    pub fn finish(self) -> InterfaceDefinition {
        self.target
    }
}

fn merge_members<M: Member>(
    source: Vec<M>,
    target: &mut Vec<M>,
    propagated: &ExtendedAttributes,
    implemented_by: Option<&str>,
) {
    target.reserve(source.len());
    for mut member in source {
        let attributes = member.extended_attributes_mut();
        attributes.extend_absent(propagated);
        if let Some(class_name) = implemented_by {
            attributes.insert(ExtendedAttribute::ImplementedBy, AttributeValue::value(class_name));
        }
        target.push(member);
    }
}
