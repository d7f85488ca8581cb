//! Interface definition compiler front-end.
//!
//! Takes an interface declaration together with its dependency
//! declarations (partial interfaces and implemented interfaces) and
//! produces one merged interface, then plans overload resolution for each
//! group of same-named operations so a code emitter can generate one
//! dispatcher per group.
//!
//! ```text
//! ┌──────────┐    ┌────────────────┐    ┌─────────────────┐    ┌─────────┐
//! │  parser  │───►│ resolve (merge)│───►│ overload (plan) │───►│ emitter │
//! └──────────┘    └────────────────┘    └─────────────────┘    └─────────┘
//! ```
//!
//! The parser and the emitter are external; [`reader`] is the seam to the
//! parser and the serialized [`ast::Definitions`] is the seam to the emitter.

pub mod ast;
pub mod config;
pub mod driver;
pub mod overload;
pub mod reader;
pub mod resolve;

pub use ast::{Argument, Attribute, Constant, Definitions, InterfaceDefinition, Operation};
pub use config::Config;
pub use driver::{CompilationDriver, CompileOutcome, CompileReport, CompiledUnit, DriverError};
pub use overload::{plan_overloads, OverloadGroup, OverloadInfo, ResolutionExpr};
pub use reader::{DeclarationReader, InMemoryReader, JsonReader};
pub use resolve::{DependencyLookup, DependencyResolver, InterfacesInfo, Resolution, ResolveError};
