//! Reading parsed declaration files.
//!
//! The textual parser lives outside this crate. It hands definitions over
//! either in memory or as JSON bundles on disk (one bundle per declaration
//! file, the same shape as [`Definitions`]).

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::ast::Definitions;

/// Errors that can occur while reading a declaration file.
#[derive(Debug, Error)]
pub enum ReadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed definitions in {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("no definitions registered for {0}")]
    NotFound(PathBuf),
}

/// Turns a dependency identifier into a parsed definitions bundle.
///
/// Implementations must be deterministic: reading the same path twice in
/// one run yields structurally identical definitions.
pub trait DeclarationReader {
    fn read(&self, path: &Path) -> Result<Definitions, ReadError>;
}

impl<R: DeclarationReader + ?Sized> DeclarationReader for &R {
    fn read(&self, path: &Path) -> Result<Definitions, ReadError> {
        (**self).read(path)
    }
}

/// Reads JSON-serialized definitions bundles from disk.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonReader;

impl JsonReader {
    pub fn new() -> Self {
        JsonReader
    }
}

impl DeclarationReader for JsonReader {
    fn read(&self, path: &Path) -> Result<Definitions, ReadError> {
        let source = fs::read_to_string(path).map_err(|source| ReadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&source).map_err(|source| ReadError::Decode {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Serves definitions registered ahead of time, keyed by path.
#[derive(Debug, Clone, Default)]
pub struct InMemoryReader {
    files: HashMap<PathBuf, Definitions>,
}

impl InMemoryReader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the definitions a path should read as.
    pub fn insert(&mut self, path: impl Into<PathBuf>, definitions: Definitions) {
        self.files.insert(path.into(), definitions);
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with_file(mut self, path: impl Into<PathBuf>, definitions: Definitions) -> Self {
        self.insert(path, definitions);
        self
    }
}

impl DeclarationReader for InMemoryReader {
    fn read(&self, path: &Path) -> Result<Definitions, ReadError> {
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| ReadError::NotFound(path.to_path_buf()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::InterfaceDefinition;

    #[test]
    fn test_in_memory_reader_returns_copies() {
        let reader = InMemoryReader::new().with_file(
            "deps/NodeExtras.idl",
            Definitions::new().with_interface(InterfaceDefinition::new("Node").partial()),
        );

        let first = reader.read(Path::new("deps/NodeExtras.idl")).unwrap();
        let second = reader.read(Path::new("deps/NodeExtras.idl")).unwrap();
        assert_eq!(first, second);
        assert!(matches!(
            reader.read(Path::new("deps/Missing.idl")),
            Err(ReadError::NotFound(_))
        ));
    }

    #[test]
    fn test_json_reader_reports_path_on_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Broken.json");
        fs::write(&path, "{ not json").unwrap();

        let err = JsonReader::new().read(&path).unwrap_err();
        assert!(matches!(err, ReadError::Decode { .. }));
        assert!(err.to_string().contains("Broken.json"));
    }
}
