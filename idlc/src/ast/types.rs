//! Argument type classification.
//!
//! Overload planning only needs to know which runtime check (if any) can
//! tell an argument apart, so types are sorted into four buckets rather
//! than resolved against a full type table.

use serde::{Deserialize, Serialize};

/// The category of an argument type, as far as overload dispatch cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeCategory {
    /// `DOMString`.
    String,
    /// `T[]` or `sequence<T>`.
    ArrayOrSequence,
    /// A reference to another interface-typed object.
    Wrapper,
    /// Numbers, booleans, enums and everything else with no runtime check.
    OtherScalar,
}

/// IDL types that never name a wrapper.
const NON_WRAPPER_TYPES: &[&str] = &[
    "any",
    "boolean",
    "byte",
    "octet",
    "short",
    "unsigned short",
    "long",
    "unsigned long",
    "long long",
    "unsigned long long",
    "float",
    "unrestricted float",
    "double",
    "unrestricted double",
    "DOMTimeStamp",
    "Date",
    "object",
    "void",
    "ByteString",
    "ScalarValueString",
];

impl TypeCategory {
    /// Classify an IDL type name.
    ///
    /// A trailing `?` (nullable marker) is ignored. Enumerations cannot be
    /// recognized by name alone; callers that know a type is an enum
    /// should use [`TypeCategory::OtherScalar`] directly.
    pub fn classify(idl_type: &str) -> TypeCategory {
        let idl_type = idl_type.trim();
        let idl_type = idl_type.strip_suffix('?').unwrap_or(idl_type);

        if idl_type.ends_with("[]") || (idl_type.starts_with("sequence<") && idl_type.ends_with('>')) {
            return TypeCategory::ArrayOrSequence;
        }
        if idl_type == "DOMString" {
            return TypeCategory::String;
        }
        if NON_WRAPPER_TYPES.contains(&idl_type) {
            return TypeCategory::OtherScalar;
        }
        TypeCategory::Wrapper
    }
}
