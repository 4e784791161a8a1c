//! `.env`-style key/value source.
//!
//! Parsing (`#` comments, `KEY=value`, surrounding quotes) is delegated to
//! `dotenvy`, but values are collected into an owned map instead of being
//! exported into the process environment.

use std::collections::HashMap;
use std::io::Read;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum EnvFileError {
    /// The file is missing or unreadable.
    #[error("could not load env file {path}: {source}")]
    Load {
        path: PathBuf,
        #[source]
        source: dotenvy::Error,
    },

    /// A line could not be parsed.
    #[error("invalid line in env source: {0}")]
    Parse(#[source] dotenvy::Error),
}

/// Immutable key/value snapshot of an env file.
#[derive(Clone, Debug, Default)]
pub struct EnvFile {
    vars: HashMap<String, String>,
}

impl EnvFile {
    /// Loads `path`. A missing file is an error.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, EnvFileError> {
        let path = path.as_ref();
        let iter = dotenvy::from_filename_iter(path).map_err(|source| EnvFileError::Load {
            path: path.to_path_buf(),
            source,
        })?;

        let mut vars = HashMap::new();
        for item in iter {
            let (k, v) = item.map_err(EnvFileError::Parse)?;
            vars.insert(k, v);
        }
        debug!(path = %path.display(), keys = vars.len(), "env file loaded");
        Ok(Self { vars })
    }

    /// Parses env-file content from any reader.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, EnvFileError> {
        let mut vars = HashMap::new();
        for item in dotenvy::from_read_iter(reader) {
            let (k, v) = item.map_err(EnvFileError::Parse)?;
            vars.insert(k, v);
        }
        Ok(Self { vars })
    }

    /// Returns the value for `key`, or `default` when absent.
    pub fn get(&self, key: &str, default: &str) -> String {
        self.vars
            .get(key)
            .cloned()
            .unwrap_or_else(|| default.to_string())
    }

    pub fn get_opt(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.vars.contains_key(key)
    }
}

impl FromIterator<(String, String)> for EnvFile {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            vars: iter.into_iter().collect(),
        }
    }
}
