//! Overload annotations and call-time dispatch.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ast::Operation;

use super::expression::ResolutionExpr;
use super::value::RuntimeValue;

/// Per-variant overload annotation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverloadInfo {
    /// 1-based position within the overload group, in declaration order.
    pub index: usize,
    /// When this variant is selected.
    pub resolution: ResolutionExpr,
}

/// Group-level metadata, attached to the last-declared variant.
///
/// The emitter produces one dispatch function per group from this.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverloadGroup {
    pub name: String,
    pub is_static: bool,
    /// Positions of the variants in the interface's operation list.
    pub variants: Vec<usize>,
    /// Fewest non-optional, non-variadic arguments over all variants.
    pub min_required_arguments: usize,
}

/// Why a call could not be dispatched to a variant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    #[error("{name}: {required} argument(s) required, but only {provided} present")]
    NotEnoughArguments {
        name: String,
        required: usize,
        provided: usize,
    },

    #[error("{name}: no overload matches the {provided} argument(s) provided")]
    NoMatchingOverload { name: String, provided: usize },
}

impl OverloadGroup {
    /// The variants, in declaration order.
    pub fn variants<'a>(&'a self, operations: &'a [Operation]) -> impl Iterator<Item = &'a Operation> + 'a {
        self.variants
            .iter()
            .filter_map(move |&position| operations.get(position))
    }

    /// Select the variant a call with `args` invokes.
    ///
    /// Too few arguments for any variant is reported first. Otherwise the
    /// first variant whose resolution expression matches wins, and the
    /// position of that variant in `operations` is returned.
    pub fn dispatch(&self, operations: &[Operation], args: &[RuntimeValue]) -> Result<usize, DispatchError> {
        if args.len() < self.min_required_arguments {
            return Err(DispatchError::NotEnoughArguments {
                name: self.name.clone(),
                required: self.min_required_arguments,
                provided: args.len(),
            });
        }

        for &position in &self.variants {
            let Some(info) = operations.get(position).and_then(|op| op.overload.as_ref()) else {
                continue;
            };
            if info.resolution.matches(args) {
                return Ok(position);
            }
        }

        Err(DispatchError::NoMatchingOverload {
            name: self.name.clone(),
            provided: args.len(),
        })
    }
}
