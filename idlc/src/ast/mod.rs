//! In-memory form of parsed interface declarations.
//!
//! The external parser hands over a [`Definitions`] bundle per declaration
//! file. The merger mutates the target interface in place (appending
//! members and annotations) and the overload planner then annotates its
//! operations. After that the structure is read-only.

pub mod extended_attributes;
pub mod types;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::overload::{OverloadGroup, OverloadInfo};

pub use extended_attributes::{AttributeValue, ExtendedAttribute, ExtendedAttributes};
pub use types::TypeCategory;

/// Everything declared in one declaration file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Definitions {
    /// Interfaces and exceptions, keyed by name, in declaration order.
    #[serde(default)]
    pub interfaces: IndexMap<String, InterfaceDefinition>,
}

impl Definitions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an interface, replacing any previous one with the same name.
    pub fn insert(&mut self, interface: InterfaceDefinition) {
        self.interfaces.insert(interface.name.clone(), interface);
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with_interface(mut self, interface: InterfaceDefinition) -> Self {
        self.insert(interface);
        self
    }

    pub fn interface(&self, name: &str) -> Option<&InterfaceDefinition> {
        self.interfaces.get(name)
    }

    pub fn interface_mut(&mut self, name: &str) -> Option<&mut InterfaceDefinition> {
        self.interfaces.get_mut(name)
    }
}

/// An interface (or exception) declaration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InterfaceDefinition {
    pub name: String,
    /// `partial interface Foo`: only extends another declaration of `Foo`.
    #[serde(default)]
    pub is_partial: bool,
    /// Exceptions never take part in dependency merging.
    #[serde(default)]
    pub is_exception: bool,
    #[serde(default)]
    pub extended_attributes: ExtendedAttributes,
    #[serde(default)]
    pub attributes: Vec<Attribute>,
    #[serde(default)]
    pub constants: Vec<Constant>,
    #[serde(default)]
    pub operations: Vec<Operation>,
}

impl InterfaceDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn partial(mut self) -> Self {
        self.is_partial = true;
        self
    }

    pub fn exception(mut self) -> Self {
        self.is_exception = true;
        self
    }

    pub fn with_extended_attribute(mut self, key: ExtendedAttribute, value: AttributeValue) -> Self {
        self.extended_attributes.insert(key, value);
        self
    }

    pub fn with_attribute(mut self, attribute: Attribute) -> Self {
        self.attributes.push(attribute);
        self
    }

    pub fn with_constant(mut self, constant: Constant) -> Self {
        self.constants.push(constant);
        self
    }

    pub fn with_operation(mut self, operation: Operation) -> Self {
        self.operations.push(operation);
        self
    }

    /// Total number of attributes, constants and operations.
    pub fn member_count(&self) -> usize {
        self.attributes.len() + self.constants.len() + self.operations.len()
    }
}

/// Behaviour shared by attributes, constants and operations.
pub trait Member {
    fn name(&self) -> &str;
    fn extended_attributes(&self) -> &ExtendedAttributes;
    fn extended_attributes_mut(&mut self) -> &mut ExtendedAttributes;
}

macro_rules! impl_member {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Member for $ty {
                fn name(&self) -> &str {
                    &self.name
                }

                fn extended_attributes(&self) -> &ExtendedAttributes {
                    &self.extended_attributes
                }

                fn extended_attributes_mut(&mut self) -> &mut ExtendedAttributes {
                    &mut self.extended_attributes
                }
            }
        )*
    };
}

impl_member!(Attribute, Constant, Operation);

/// An attribute member (`attribute DOMString title;`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    pub name: String,
    pub idl_type: String,
    #[serde(default)]
    pub is_read_only: bool,
    #[serde(default)]
    pub is_static: bool,
    #[serde(default)]
    pub extended_attributes: ExtendedAttributes,
}

impl Attribute {
    pub fn new(name: impl Into<String>, idl_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            idl_type: idl_type.into(),
            is_read_only: false,
            is_static: false,
            extended_attributes: ExtendedAttributes::new(),
        }
    }

    pub fn read_only(mut self) -> Self {
        self.is_read_only = true;
        self
    }

    pub fn with_extended_attribute(mut self, key: ExtendedAttribute, value: AttributeValue) -> Self {
        self.extended_attributes.insert(key, value);
        self
    }
}

/// A constant member (`const unsigned short ELEMENT_NODE = 1;`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Constant {
    pub name: String,
    pub idl_type: String,
    pub value: String,
    #[serde(default)]
    pub extended_attributes: ExtendedAttributes,
}

impl Constant {
    pub fn new(name: impl Into<String>, idl_type: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            idl_type: idl_type.into(),
            value: value.into(),
            extended_attributes: ExtendedAttributes::new(),
        }
    }

    pub fn with_extended_attribute(mut self, key: ExtendedAttribute, value: AttributeValue) -> Self {
        self.extended_attributes.insert(key, value);
        self
    }
}

/// An operation member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    pub name: String,
    /// Return type.
    pub idl_type: String,
    #[serde(default)]
    pub arguments: Vec<Argument>,
    #[serde(default)]
    pub is_static: bool,
    #[serde(default)]
    pub extended_attributes: ExtendedAttributes,
    /// Set by the overload planner on every variant of an overload group.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overload: Option<OverloadInfo>,
    /// Set by the overload planner on the last-declared variant only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overload_group: Option<OverloadGroup>,
}

impl Operation {
    pub fn new(name: impl Into<String>, return_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            idl_type: return_type.into(),
            arguments: Vec::new(),
            is_static: false,
            extended_attributes: ExtendedAttributes::new(),
            overload: None,
            overload_group: None,
        }
    }

    pub fn with_argument(mut self, argument: Argument) -> Self {
        self.arguments.push(argument);
        self
    }

    pub fn into_static(mut self) -> Self {
        self.is_static = true;
        self
    }

    pub fn with_extended_attribute(mut self, key: ExtendedAttribute, value: AttributeValue) -> Self {
        self.extended_attributes.insert(key, value);
        self
    }

    /// Whether the final argument accepts a variable-length tail.
    pub fn is_variadic(&self) -> bool {
        self.arguments.last().is_some_and(|arg| arg.is_variadic)
    }

    /// Arguments that are neither optional nor variadic.
    pub fn required_argument_count(&self) -> usize {
        self.arguments
            .iter()
            .filter(|arg| !(arg.is_optional || arg.is_variadic))
            .count()
    }

    /// Arguments that are not optional (a variadic tail counts).
    pub fn required_or_variadic_argument_count(&self) -> usize {
        self.arguments.iter().filter(|arg| !arg.is_optional).count()
    }

    /// Whether this operation is overloaded on its interface.
    pub fn is_overloaded(&self) -> bool {
        self.overload.is_some()
    }

    /// Whether this operation gets its own method registration entry.
    ///
    /// An overload group registers a single entry, on its first variant.
    pub fn emits_method_configuration(&self) -> bool {
        self.overload.as_ref().map_or(true, |info| info.index == 1)
    }
}

/// An operation argument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Argument {
    pub name: String,
    pub idl_type: String,
    pub type_category: TypeCategory,
    #[serde(default)]
    pub is_optional: bool,
    #[serde(default)]
    pub is_variadic: bool,
    #[serde(default)]
    pub is_nullable: bool,
    /// Only meaningful for the string category.
    #[serde(default)]
    pub uses_strict_type_checking: bool,
    #[serde(default)]
    pub extended_attributes: ExtendedAttributes,
}

impl Argument {
    /// A required argument, categorised from its type name.
    pub fn new(name: impl Into<String>, idl_type: impl Into<String>) -> Self {
        let idl_type = idl_type.into();
        Self {
            name: name.into(),
            type_category: TypeCategory::classify(&idl_type),
            is_nullable: idl_type.trim_end().ends_with('?'),
            idl_type,
            is_optional: false,
            is_variadic: false,
            uses_strict_type_checking: false,
            extended_attributes: ExtendedAttributes::new(),
        }
    }

    pub fn optional(mut self) -> Self {
        self.is_optional = true;
        self
    }

    pub fn variadic(mut self) -> Self {
        self.is_variadic = true;
        self
    }

    pub fn nullable(mut self) -> Self {
        self.is_nullable = true;
        self
    }

    pub fn strict(mut self) -> Self {
        self.uses_strict_type_checking = true;
        self
    }

    pub fn with_category(mut self, category: TypeCategory) -> Self {
        self.type_category = category;
        self
    }

    /// The interface name a wrapper argument refers to (nullable marker stripped).
    pub fn base_type(&self) -> &str {
        let idl_type = self.idl_type.trim();
        idl_type.strip_suffix('?').unwrap_or(idl_type)
    }
}
