//! Compiled program library
//!
//! Programs for the strip's VM are stored as `<name>.lspb` files in a single
//! directory. Requests name a program without its extension.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// File extension of compiled programs
pub const PROGRAM_EXTENSION: &str = "lspb";

/// Errors raised while looking up a program
#[derive(Debug, thiserror::Error)]
pub enum ProgramError {
    #[error("Invalid program name: {0:?}")]
    InvalidName(String),

    #[error("Program not found: {0}")]
    NotFound(String),

    #[error("Failed to read program {name}: {source}")]
    Io {
        name: String,
        #[source]
        source: io::Error,
    },
}

/// Directory of compiled programs.
#[derive(Debug, Clone)]
pub struct ProgramLibrary {
    dir: PathBuf,
}

impl ProgramLibrary {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    /// Names of available programs, sorted. An unreadable directory lists
    /// nothing.
    pub fn list(&self) -> Vec<String> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(err) => {
                log::debug!("Cannot list {}: {}", self.dir.display(), err);
                return Vec::new();
            }
        };

        let mut names: Vec<String> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_file())
            .filter(|path| path.extension().is_some_and(|ext| ext == PROGRAM_EXTENSION))
            .filter_map(|path| path.file_stem().and_then(|s| s.to_str()).map(String::from))
            .collect();
        names.sort();
        names
    }

    /// Read the bytecode of program `name`.
    ///
    /// # Errors
    /// `InvalidName` for names that could escape the directory,
    /// `NotFound` for unknown programs, `Io` if the file cannot be read.
    pub fn load(&self, name: &str) -> Result<Vec<u8>, ProgramError> {
        validate_name(name)?;
        if !self.list().iter().any(|n| n == name) {
            return Err(ProgramError::NotFound(name.to_string()));
        }

        let path = self.dir.join(format!("{}.{}", name, PROGRAM_EXTENSION));
        let bytecode = fs::read(&path).map_err(|source| ProgramError::Io {
            name: name.to_string(),
            source,
        })?;

        log::info!("Read program {} ({} bytes)", name, bytecode.len());
        Ok(bytecode)
    }
}

fn validate_name(name: &str) -> Result<(), ProgramError> {
    if name.is_empty() || name.contains("..") || name.contains(['/', '\\']) {
        return Err(ProgramError::InvalidName(name.to_string()));
    }
    Ok(())
}
