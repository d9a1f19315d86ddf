//! Reading presentations and compiled systems from disk or stdin.

use std::fs;
use std::io::{self, Read};
use std::path::Path;

use wordfsa_core::{Presentation, SerializedError, SerializedSystem};
use wordfsa_rws::{BuildError, MAGIC, ModuleError, RewritingSystem};

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to read '{path}': {source}")]
    Read { path: String, source: io::Error },
    #[error("failed to read stdin: {0}")]
    Stdin(io::Error),
    #[error("{path}: {source}")]
    Record {
        path: String,
        source: SerializedError,
    },
    #[error("{path}: {source}")]
    Module { path: String, source: ModuleError },
    #[error("{path}: {source}")]
    Build { path: String, source: BuildError },
}

/// Read a presentation record. `-` reads stdin.
pub fn load_presentation(path: &Path) -> Result<Presentation, LoadError> {
    let text = if path.as_os_str() == "-" {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .map_err(LoadError::Stdin)?;
        buf
    } else {
        fs::read_to_string(path).map_err(|source| LoadError::Read {
            path: path.display().to_string(),
            source,
        })?
    };
    Presentation::from_json(&text).map_err(|source| LoadError::Record {
        path: display_name(path),
        source,
    })
}

/// Read a compiled system, either a binary module (by its magic) or a
/// serialized JSON record.
pub fn load_system(path: &Path) -> Result<RewritingSystem, LoadError> {
    let bytes = fs::read(path).map_err(|source| LoadError::Read {
        path: path.display().to_string(),
        source,
    })?;
    let name = display_name(path);

    if bytes.starts_with(&MAGIC) {
        return RewritingSystem::from_bytes(&bytes)
            .map_err(|source| LoadError::Module { path: name, source });
    }

    let Ok(text) = std::str::from_utf8(&bytes) else {
        // Neither JSON nor a module; report the module error.
        return RewritingSystem::from_bytes(&bytes)
            .map_err(|source| LoadError::Module { path: name, source });
    };
    let record = SerializedSystem::from_json(text).map_err(|source| LoadError::Record {
        path: name.clone(),
        source,
    })?;
    RewritingSystem::from_serialized(&record).map_err(|source| LoadError::Build { path: name, source })
}

fn display_name(path: &Path) -> String {
    if path.as_os_str() == "-" {
        "<stdin>".to_owned()
    } else {
        path.display().to_string()
    }
}
