//! Interface dependency resolution.
//!
//! An interface's dependencies are `partial interface` declarations of the
//! same name and interfaces it implements (mixes in), each in its own
//! declaration file. This module reads those files and merges their
//! members into the target interface, producing one complete definition.
//!
//! It also decides whether a declaration file gets bindings at all: files
//! absent from the dependency scan are pure dependencies and are skipped.
//!
//! # Module Structure
//!
//! - [`merge`] - Member merging and attribute propagation
//! - [`error`] - Resolution errors

mod error;
mod merge;

#[cfg(test)]
mod tests;

use std::collections::HashMap;
use std::fs;
use std::hash::BuildHasher;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::ast::{Definitions, InterfaceDefinition};
use crate::reader::{DeclarationReader, ReadError};

pub use error::ResolveError;
pub use merge::{InterfaceMerger, DEPENDENCY_EXTENDED_ATTRIBUTES};

/// Maps an interface name to the declaration files it depends on.
///
/// The returned list need not be sorted; the resolver sorts it.
pub trait DependencyLookup {
    fn dependencies(&self, interface_name: &str) -> Option<&[PathBuf]>;
}

impl<S: BuildHasher> DependencyLookup for HashMap<String, Vec<PathBuf>, S> {
    fn dependencies(&self, interface_name: &str) -> Option<&[PathBuf]> {
        self.get(interface_name).map(Vec::as_slice)
    }
}

impl<L: DependencyLookup + ?Sized> DependencyLookup for &L {
    fn dependencies(&self, interface_name: &str) -> Option<&[PathBuf]> {
        (**self).dependencies(interface_name)
    }
}

/// Per-interface output of the dependency scan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfaceInfo {
    #[serde(default)]
    pub dependencies_full_paths: Vec<PathBuf>,
}

/// The dependency scan's output for a whole build, keyed by interface name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InterfacesInfo {
    interfaces: HashMap<String, InterfaceInfo>,
}

impl InterfacesInfo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the scan output from a JSON file.
    pub fn load(path: &Path) -> Result<Self, ReadError> {
        let source = fs::read_to_string(path).map_err(|source| ReadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&source).map_err(|source| ReadError::Decode {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Register an interface and its dependency files.
    pub fn insert(&mut self, interface_name: impl Into<String>, dependencies: Vec<PathBuf>) {
        self.interfaces.insert(
            interface_name.into(),
            InterfaceInfo {
                dependencies_full_paths: dependencies,
            },
        );
    }

    pub fn len(&self) -> usize {
        self.interfaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.interfaces.is_empty()
    }
}

impl DependencyLookup for InterfacesInfo {
    fn dependencies(&self, interface_name: &str) -> Option<&[PathBuf]> {
        self.interfaces
            .get(interface_name)
            .map(|info| info.dependencies_full_paths.as_slice())
    }
}

/// Outcome of a successful resolution.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// The definitions, with the target interface fully merged.
    Merged(Definitions),
    /// The interface is not registered for generation.
    Skipped,
}

impl Resolution {
    pub fn is_skipped(&self) -> bool {
        matches!(self, Resolution::Skipped)
    }

    pub fn into_merged(self) -> Option<Definitions> {
        match self {
            Resolution::Merged(definitions) => Some(definitions),
            Resolution::Skipped => None,
        }
    }
}

/// Resolves and merges interface dependencies.
#[derive(Debug)]
pub struct DependencyResolver<L, R> {
    lookup: L,
    reader: R,
}

impl<L: DependencyLookup, R: DeclarationReader> DependencyResolver<L, R> {
    pub fn new(lookup: L, reader: R) -> Self {
        Self { lookup, reader }
    }

    pub fn lookup(&self) -> &L {
        &self.lookup
    }

    pub fn reader(&self) -> &R {
        &self.reader
    }

    /// Merge the dependencies of `target_name` into `definitions`.
    ///
    /// `definitions` is the parsed content of `source`, the declaration
    /// file expected to define `target_name`. Ownership passes through
    /// the resolver and comes back in [`Resolution::Merged`].
    pub fn resolve(
        &self,
        mut definitions: Definitions,
        target_name: &str,
        source: &Path,
    ) -> Result<Resolution, ResolveError> {
        let Some(dependency_files) = self.lookup.dependencies(target_name) else {
            debug!("`{}` has no dependency entry, skipping", target_name);
            return Ok(Resolution::Skipped);
        };

        let target = definitions
            .interface_mut(target_name)
            .ok_or_else(|| ResolveError::InterfaceNotFound {
                interface: target_name.to_string(),
                file: source.to_path_buf(),
            })?;

        if target.is_exception {
            return Ok(Resolution::Merged(definitions));
        }

        let merged = merge_interface_dependencies(std::mem::take(target), dependency_files, &self.reader)?;
        *target = merged;
        Ok(Resolution::Merged(definitions))
    }
}

/// Merge every interface declared in `dependency_files` into `target`.
///
/// Files are processed in sorted order so the merged member order does
/// not depend on how the dependency list was enumerated.
pub fn merge_interface_dependencies<R: DeclarationReader + ?Sized>(
    target: InterfaceDefinition,
    dependency_files: &[PathBuf],
    reader: &R,
) -> Result<InterfaceDefinition, ResolveError> {
    let mut files: Vec<&Path> = dependency_files.iter().map(PathBuf::as_path).collect();
    files.sort_by(|a, b| a.as_os_str().cmp(b.as_os_str()));

    let mut merger = InterfaceMerger::new(target);
    for file in files {
        let basename = file
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        let definitions = reader.read(file)?;

        for dependency in definitions.interfaces.into_values() {
            if dependency.is_partial && dependency.name != merger.target().name {
                return Err(ResolveError::InvalidPartialInterface {
                    dependency: file.to_path_buf(),
                    partial: dependency.name,
                    target: merger.target().name.clone(),
                });
            }
            merger.merge_dependency(dependency, &basename);
        }
    }

    debug!(
        "merged {} dependency interfaces into `{}`",
        merger.merged_count(),
        merger.target().name
    );
    Ok(merger.finish())
}
