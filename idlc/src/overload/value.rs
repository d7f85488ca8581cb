//! Call-time argument values, as seen by a resolution expression.

/// A runtime argument value.
///
/// Only the distinctions a resolution expression can observe are modelled.
#[derive(Debug, Clone, PartialEq)]
pub enum RuntimeValue {
    Undefined,
    Null,
    Boolean(bool),
    Number(f64),
    String(String),
    Array(Vec<RuntimeValue>),
    /// A script object; `interfaces` lists the wrapper types it is an instance of.
    Object { interfaces: Vec<String> },
}

impl RuntimeValue {
    pub fn string(value: impl Into<String>) -> Self {
        RuntimeValue::String(value.into())
    }

    /// A plain object that wraps no interface.
    pub fn object() -> Self {
        RuntimeValue::Object { interfaces: Vec::new() }
    }

    /// An object wrapping an instance of `interface`.
    pub fn wrapper(interface: impl Into<String>) -> Self {
        RuntimeValue::Object {
            interfaces: vec![interface.into()],
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, RuntimeValue::Null)
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, RuntimeValue::Undefined)
    }

    pub fn is_string(&self) -> bool {
        matches!(self, RuntimeValue::String(_))
    }

    pub fn is_array(&self) -> bool {
        matches!(self, RuntimeValue::Array(_))
    }

    /// Arrays are objects too.
    pub fn is_object(&self) -> bool {
        matches!(self, RuntimeValue::Object { .. } | RuntimeValue::Array(_))
    }

    /// Whether this value wraps an instance of `interface`.
    pub fn is_instance_of(&self, interface: &str) -> bool {
        match self {
            RuntimeValue::Object { interfaces } => interfaces.iter().any(|name| name == interface),
            _ => false,
        }
    }
}
