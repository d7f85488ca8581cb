//! Resolution expressions.
//!
//! A resolution expression is an OR of ANDs. Each term of the OR is an
//! arity clause: it accepts one argument count and, for the arguments that
//! count covers, checks whatever the argument's type category allows to
//! be checked at runtime.
//!
//! This is a length-plus-leading-types heuristic, not the full effective
//! overload set algorithm: variants that share an argument count and have
//! indistinguishable types at every checked position are ambiguous, and
//! the first declared one wins at dispatch. Operations that combine
//! optional arguments with a variadic tail are not handled specially.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ast::{Argument, Operation, TypeCategory};

use super::value::RuntimeValue;

/// The runtime check for one argument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "check", rename_all = "snake_case")]
pub enum TypeCheck {
    /// String with strict type checking: null, undefined, a string or any
    /// (stringifiable) object.
    StrictString,
    /// An array.
    Array,
    /// An instance of a wrapper type, or null when nullable.
    Wrapper { interface: String, nullable: bool },
}

impl TypeCheck {
    /// The check an argument gets, if its category allows one.
    pub fn for_argument(argument: &Argument) -> Option<TypeCheck> {
        match argument.type_category {
            TypeCategory::String if argument.uses_strict_type_checking => Some(TypeCheck::StrictString),
            TypeCategory::ArrayOrSequence => Some(TypeCheck::Array),
            TypeCategory::Wrapper => Some(TypeCheck::Wrapper {
                interface: argument.base_type().to_string(),
                nullable: argument.is_nullable,
            }),
            TypeCategory::String | TypeCategory::OtherScalar => None,
        }
    }

    pub fn accepts(&self, value: &RuntimeValue) -> bool {
        match self {
            TypeCheck::StrictString => {
                value.is_null() || value.is_undefined() || value.is_string() || value.is_object()
            }
            TypeCheck::Array => value.is_array(),
            TypeCheck::Wrapper { interface, nullable } => {
                (*nullable && value.is_null()) || value.is_instance_of(interface)
            }
        }
    }

    fn render(&self, index: usize, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = format!("args[{}]", index);
        match self {
            TypeCheck::StrictString => write!(
                f,
                "isNull({v}) || isUndefined({v}) || isString({v}) || isObject({v})",
                v = value
            ),
            TypeCheck::Array => write!(f, "isArray({})", value),
            TypeCheck::Wrapper { interface, nullable } => {
                if *nullable {
                    write!(f, "isNull({}) || ", value)?;
                }
                write!(f, "{}.hasInstance({})", interface, value)
            }
        }
    }
}

/// A type check at one argument position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArgumentCheck {
    pub index: usize,
    #[serde(flatten)]
    pub kind: TypeCheck,
}

/// One accepted argument count and the checks that go with it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArityClause {
    pub argument_count: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub checks: Vec<ArgumentCheck>,
}

impl ArityClause {
    /// The clause accepting exactly the arguments in `prefix`.
    pub fn for_prefix(prefix: &[Argument]) -> Self {
        let checks = prefix
            .iter()
            .enumerate()
            .filter_map(|(index, argument)| {
                TypeCheck::for_argument(argument).map(|kind| ArgumentCheck { index, kind })
            })
            .collect();
        Self {
            argument_count: prefix.len(),
            checks,
        }
    }

    pub fn matches(&self, args: &[RuntimeValue]) -> bool {
        args.len() == self.argument_count
            && self
                .checks
                .iter()
                .all(|check| args.get(check.index).is_some_and(|value| check.kind.accepts(value)))
    }
}

impl fmt::Display for ArityClause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(argc == {})", self.argument_count)?;
        for check in &self.checks {
            f.write_str(" && (")?;
            check.kind.render(check.index, f)?;
            f.write_str(")")?;
        }
        Ok(())
    }
}

/// The disjunction of arity clauses selecting one overload variant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResolutionExpr {
    pub clauses: Vec<ArityClause>,
}

impl ResolutionExpr {
    /// Build the expression for `operation`.
    ///
    /// There is one clause per way of omitting a suffix of trailing
    /// optional arguments, plus one for the full argument list unless the
    /// operation is variadic.
    pub fn for_operation(operation: &Operation) -> Self {
        let arguments = &operation.arguments;
        let mut clauses: Vec<ArityClause> = arguments
            .iter()
            .enumerate()
            .filter(|(_, argument)| argument.is_optional)
            .map(|(index, _)| ArityClause::for_prefix(&arguments[..index]))
            .collect();
        if !operation.is_variadic() {
            clauses.push(ArityClause::for_prefix(arguments));
        }
        Self { clauses }
    }

    /// Evaluate against the actual call arguments.
    ///
    /// An expression without clauses matches nothing.
    pub fn matches(&self, args: &[RuntimeValue]) -> bool {
        self.clauses.iter().any(|clause| clause.matches(args))
    }

    /// Argument counts accepted by some clause, in clause order.
    pub fn argument_counts(&self) -> impl Iterator<Item = usize> + '_ {
        self.clauses.iter().map(|clause| clause.argument_count)
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }
}

impl fmt::Display for ResolutionExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.clauses.is_empty() {
            return f.write_str("false");
        }
        for (i, clause) in self.clauses.iter().enumerate() {
            if i > 0 {
                f.write_str(" || ")?;
            }
            write!(f, "({})", clause)?;
        }
        Ok(())
    }
}
