//! Compilation driver.
//!
//! A compilation unit is one declaration file. For each unit the driver:
//! 1. Reads the parsed definitions (the interface name is the file stem)
//! 2. Resolves and merges the interface's dependencies
//! 3. Plans overloads on the merged interface
//!
//! Units share nothing, so a failing unit never affects another one; the
//! driver only decides whether to keep going after a failure.
//!
//! # Example
//!
//! ```ignore
//! use idlc::driver::CompilationDriver;
//! use idlc::reader::JsonReader;
//! use idlc::resolve::InterfacesInfo;
//!
//! let info = InterfacesInfo::load(Path::new("out/interfaces_info.json"))?;
//! let driver = CompilationDriver::new(info, JsonReader::new());
//! let report = driver.compile_all(&[PathBuf::from("idl/Node.json")]);
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::ast::{Definitions, InterfaceDefinition};
use crate::overload::plan_overloads;
use crate::reader::{DeclarationReader, ReadError};
use crate::resolve::{DependencyLookup, DependencyResolver, ResolveError};

/// Errors that fail a single compilation unit.
#[derive(Debug, Error)]
pub enum DriverError {
    #[error(transparent)]
    Read(#[from] ReadError),

    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error("cannot derive an interface name from {}", path.display())]
    InvalidUnitPath { path: PathBuf },

    #[error("failed to serialize `{interface}`: {source}")]
    Serialize {
        interface: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A unit that produced a merged, overload-planned interface.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledUnit {
    /// The unit's declaration file.
    pub source: PathBuf,
    /// The interface the unit defines.
    pub interface_name: String,
    /// All definitions of the unit, with the target interface merged.
    pub definitions: Definitions,
}

impl CompiledUnit {
    /// The merged target interface.
    pub fn interface(&self) -> Option<&InterfaceDefinition> {
        self.definitions.interface(&self.interface_name)
    }

    pub fn to_json(&self, pretty: bool) -> Result<String, DriverError> {
        let result = if pretty {
            serde_json::to_string_pretty(&self.definitions)
        } else {
            serde_json::to_string(&self.definitions)
        };
        result.map_err(|source| DriverError::Serialize {
            interface: self.interface_name.clone(),
            source,
        })
    }

    /// Write `<interface>.json` into `output_dir`, creating it if needed.
    pub fn write_to(&self, output_dir: &Path, pretty: bool) -> Result<PathBuf, DriverError> {
        let path = output_dir.join(format!("{}.json", self.interface_name));
        let json = self.to_json(pretty)?;
        fs::create_dir_all(output_dir)
            .and_then(|()| fs::write(&path, json))
            .map_err(|source| DriverError::Write {
                path: path.clone(),
                source,
            })?;
        Ok(path)
    }
}

/// Outcome of compiling one unit.
#[derive(Debug)]
pub enum CompileOutcome {
    Generated(CompiledUnit),
    /// The unit is only a dependency of other interfaces.
    Skipped,
    Failed(DriverError),
}

impl CompileOutcome {
    pub fn is_generated(&self) -> bool {
        matches!(self, CompileOutcome::Generated(_))
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, CompileOutcome::Skipped)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, CompileOutcome::Failed(_))
    }
}

/// Outcomes of a multi-unit run, in the order units were compiled.
#[derive(Debug, Default)]
pub struct CompileReport {
    pub units: Vec<(PathBuf, CompileOutcome)>,
    /// Units not attempted because an earlier one failed.
    pub not_attempted: Vec<PathBuf>,
}

impl CompileReport {
    pub fn generated(&self) -> impl Iterator<Item = &CompiledUnit> {
        self.units.iter().filter_map(|(_, outcome)| match outcome {
            CompileOutcome::Generated(unit) => Some(unit),
            _ => None,
        })
    }

    pub fn failures(&self) -> impl Iterator<Item = (&Path, &DriverError)> {
        self.units.iter().filter_map(|(path, outcome)| match outcome {
            CompileOutcome::Failed(err) => Some((path.as_path(), err)),
            _ => None,
        })
    }

    pub fn skipped_count(&self) -> usize {
        self.units.iter().filter(|(_, outcome)| outcome.is_skipped()).count()
    }

    pub fn has_failures(&self) -> bool {
        self.units.iter().any(|(_, outcome)| outcome.is_failed())
    }
}

/// Drives compilation of declaration files.
#[derive(Debug)]
pub struct CompilationDriver<L, R> {
    resolver: DependencyResolver<L, R>,
    fail_fast: bool,
}

impl<L: DependencyLookup, R: DeclarationReader> CompilationDriver<L, R> {
    pub fn new(lookup: L, reader: R) -> Self {
        Self {
            resolver: DependencyResolver::new(lookup, reader),
            fail_fast: true,
        }
    }

    /// Whether to stop at the first failing unit (the default).
    pub fn with_fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = fail_fast;
        self
    }

    /// Compile one unit.
    pub fn compile_unit(&self, path: &Path) -> CompileOutcome {
        match self.try_compile_unit(path) {
            Ok(Some(unit)) => CompileOutcome::Generated(unit),
            Ok(None) => CompileOutcome::Skipped,
            Err(err) => CompileOutcome::Failed(err),
        }
    }

    fn try_compile_unit(&self, path: &Path) -> Result<Option<CompiledUnit>, DriverError> {
        let interface_name = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .filter(|stem| !stem.is_empty())
            .ok_or_else(|| DriverError::InvalidUnitPath {
                path: path.to_path_buf(),
            })?
            .to_string();

        let definitions = self.resolver.reader().read(path)?;
        let Some(mut definitions) = self
            .resolver
            .resolve(definitions, &interface_name, path)?
            .into_merged()
        else {
            return Ok(None);
        };

        if let Some(interface) = definitions.interface_mut(&interface_name) {
            plan_overloads(&mut interface.operations);
        }

        Ok(Some(CompiledUnit {
            source: path.to_path_buf(),
            interface_name,
            definitions,
        }))
    }

    /// Compile every unit in `paths`, in sorted path order.
    ///
    /// With fail-fast on, the run stops at the first failure and the
    /// remaining units are listed in [`CompileReport::not_attempted`].
    pub fn compile_all(&self, paths: &[PathBuf]) -> CompileReport {
        let mut paths = paths.to_vec();
        paths.sort();
        paths.dedup();

        let mut report = CompileReport::default();
        let mut remaining = paths.into_iter();
        for path in remaining.by_ref() {
            let outcome = self.compile_unit(&path);
            match &outcome {
                CompileOutcome::Generated(unit) => {
                    let members = unit.interface().map_or(0, InterfaceDefinition::member_count);
                    info!("compiled `{}` ({} members)", unit.interface_name, members);
                }
                CompileOutcome::Skipped => {
                    debug!("skipped {}: not registered for generation", path.display());
                }
                CompileOutcome::Failed(err) => {
                    warn!("{} failed: {}", path.display(), err);
                }
            }

            let failed = outcome.is_failed();
            report.units.push((path, outcome));
            if failed && self.fail_fast {
                break;
            }
        }
        report.not_attempted.extend(remaining);
        report
    }
}
