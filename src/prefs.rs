//! Client-local preferences persisted across UI reloads.
//!
//! This blob holds UI preferences only (locale at minimum). It is never an
//! authority over session or message content, which stays server-owned.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

pub const DEFAULT_LOCALE: &str = "en";

#[derive(Debug, Error)]
pub enum PrefsError {
    #[error("I/O error while {operation} at {path}: {source}")]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize preferences for {path}: {source}")]
    JsonSerialize {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to format current UTC timestamp as RFC3339: {0}")]
    ClockFormat(#[source] time::error::Format),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prefs {
    pub locale: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl Default for Prefs {
    fn default() -> Self {
        Self {
            locale: DEFAULT_LOCALE.to_string(),
            updated_at: None,
        }
    }
}

impl Prefs {
    /// Loads preferences from `path`. A missing file yields the defaults;
    /// a corrupt file is discarded and also yields the defaults, since
    /// preferences are never worth failing startup over. Read errors other
    /// than not-found still surface.
    pub fn load(path: &Path) -> Result<Self, PrefsError> {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(source) if source.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(PrefsError::Io {
                    operation: "reading preferences",
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        let mut prefs: Prefs = match serde_json::from_str(&raw) {
            Ok(prefs) => prefs,
            Err(error) => {
                log::debug!("discarding corrupt preferences at {}: {error}", path.display());
                return Ok(Self::default());
            }
        };

        if prefs
            .updated_at
            .as_deref()
            .is_some_and(|value| OffsetDateTime::parse(value, &Rfc3339).is_err())
        {
            prefs.updated_at = None;
        }

        Ok(prefs)
    }

    /// Stamps `updated_at` with the current UTC time and writes the blob,
    /// creating parent directories as needed.
    pub fn save(&mut self, path: &Path) -> Result<(), PrefsError> {
        let now = OffsetDateTime::now_utc()
            .format(&Rfc3339)
            .map_err(PrefsError::ClockFormat)?;
        self.updated_at = Some(now);

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| PrefsError::Io {
                operation: "creating preferences directory",
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let serialized =
            serde_json::to_string_pretty(self).map_err(|source| PrefsError::JsonSerialize {
                path: path.to_path_buf(),
                source,
            })?;
        fs::write(path, serialized).map_err(|source| PrefsError::Io {
            operation: "writing preferences",
            path: path.to_path_buf(),
            source,
        })
    }
}
