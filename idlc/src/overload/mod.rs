//! Overload planning for merged interfaces.
//!
//! Operations sharing a name (and staticness) on one interface form an
//! overload group. The bindings need a single entry point per group that
//! picks a variant from the actual call, so the planner annotates:
//!
//! 1. every variant with its 1-based index and a resolution expression
//! 2. the last-declared variant with the group as a whole, since that is
//!    where the emitter knows the full group and emits the dispatcher once
//!
//! Names declared only once get no annotation.
//!
//! # Module Structure
//!
//! - [`expression`] - Resolution expressions and their evaluation
//! - [`group`] - Overload annotations and dispatch
//! - [`value`] - Call-time argument values

mod expression;
mod group;
mod value;


use rustc_hash::FxHashMap;
use tracing::debug;

use crate::ast::Operation;

pub use expression::{ArgumentCheck, ArityClause, ResolutionExpr, TypeCheck};
pub use group::{DispatchError, OverloadGroup, OverloadInfo};
pub use value::RuntimeValue;

/// Plan overloads for instance operations, then for static operations.
///
/// The two passes are independent: an instance and a static operation
/// with the same name never share a group.
pub fn plan_overloads(operations: &mut [Operation]) {
    plan_overloads_by_staticness(operations, false);
    plan_overloads_by_staticness(operations, true);
}

/// Plan overloads among the operations whose `is_static` equals `is_static`.
///
/// Works in place so positions recorded in [`OverloadGroup::variants`]
/// index straight into `operations`. Planning again replaces earlier
/// annotations.
pub fn plan_overloads_by_staticness(operations: &mut [Operation], is_static: bool) {
    let mut counts: FxHashMap<String, usize> = FxHashMap::default();
    for operation in operations.iter_mut().filter(|op| op.is_static == is_static) {
        operation.overload = None;
        operation.overload_group = None;
        *counts.entry(operation.name.clone()).or_default() += 1;
    }
    counts.retain(|_, count| *count > 1);
    if counts.is_empty() {
        return;
    }

    // Index includes the variant itself: push first, then number it.
    let mut groups: FxHashMap<String, Vec<usize>> = FxHashMap::default();
    for (position, operation) in operations.iter_mut().enumerate() {
        if operation.is_static != is_static || !counts.contains_key(&operation.name) {
            continue;
        }
        let variants = groups.entry(operation.name.clone()).or_default();
        variants.push(position);
        operation.overload = Some(OverloadInfo {
            index: variants.len(),
            resolution: ResolutionExpr::for_operation(operation),
        });
    }

    for (name, variants) in groups {
        let min_required_arguments = variants
            .iter()
            .map(|&position| operations[position].required_argument_count())
            .min()
            .unwrap_or(0);
        let Some(&last) = variants.last() else {
            continue;
        };

        debug!(
            "overload group `{}`{}: {} variants, {} required argument(s)",
            name,
            if is_static { " (static)" } else { "" },
            variants.len(),
            min_required_arguments
        );

        operations[last].overload_group = Some(OverloadGroup {
            name,
            is_static,
            variants,
            min_required_arguments,
        });
    }
}
