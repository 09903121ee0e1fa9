#![forbid(unsafe_code)]

//! Where the schema table comes from.
//!
//! By default the compiled-in table is used. Setting `NUMER_SCHEMA_PATH`
//! points the registry at a JSON file with the same layout instead.

use std::path::PathBuf;

use crate::schema::{SchemaRegistry, SchemaResult};

/// Environment variable naming an external schema document.
pub const ENV_SCHEMA_PATH: &str = "NUMER_SCHEMA_PATH";

/// Schema source selection.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RegistryConfig {
    /// External schema file. `None` selects the bundled table.
    pub schema_path: Option<PathBuf>,
}

impl RegistryConfig {
    /// Read the configuration from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_env_with(|key| std::env::var(key).ok())
    }

    /// Read the configuration using a custom environment lookup (for tests).
    #[must_use]
    pub fn from_env_with<F>(get_env: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let schema_path = get_env(ENV_SCHEMA_PATH)
            .map(|value| value.trim().to_owned())
            .filter(|value| !value.is_empty())
            .map(PathBuf::from);
        Self { schema_path }
    }

    #[must_use]
    pub fn with_schema_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.schema_path = Some(path.into());
        self
    }

    /// Build the registry this configuration selects.
    pub fn load(&self) -> SchemaResult<SchemaRegistry> {
        match &self.schema_path {
            Some(path) => {
                crate::debug!(path = %path.display(), "loading external schema table");
                SchemaRegistry::load(path)
            }
            None => SchemaRegistry::bundled(),
        }
    }
}
