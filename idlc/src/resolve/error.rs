//! Dependency resolution errors.

use std::path::PathBuf;

use thiserror::Error;

use crate::reader::ReadError;

/// Errors that abort dependency resolution for one interface.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// The declaration file does not define its expected interface.
    ///
    /// Each declaration file `Foo.idl` must contain the interface or
    /// exception `Foo` unless it is only a dependency of another interface.
    #[error("could not find interface or exception `{interface}` in {}", file.display())]
    InterfaceNotFound { interface: String, file: PathBuf },

    /// A dependency file declares a partial interface for another name.
    #[error(
        "{} is not a partial interface of `{target}` (it extends `{partial}`); \
         the dependency scan registered it under the wrong interface",
        dependency.display()
    )]
    InvalidPartialInterface {
        dependency: PathBuf,
        partial: String,
        target: String,
    },

    #[error(transparent)]
    Read(#[from] ReadError),
}
