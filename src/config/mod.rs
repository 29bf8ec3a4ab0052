//! Configuration management.
//!
//! Settings are merged from multiple sources with priority:
//! 1. Default values (hardcoded)
//! 2. Config file named by the `CONFIG_PATH` environment variable
//! 3. Local override file (`config/local`)
//! 4. Environment variables with the `BOOKSHELF` prefix (highest priority)

mod server;
mod storage;


pub use server::*;
pub use storage::*;

use std::env;

use config::{Config, Environment, File};
use serde::Deserialize;

use crate::Result;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Settings {
    /// HTTP listener configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Persisted collection location
    #[serde(default)]
    pub storage: StorageConfig,
}

impl Settings {
    /// Loads and merges configuration from all sources.
    pub fn load() -> Result<Self> {
        let mut builder = Config::builder();

        if let Ok(path) = env::var("CONFIG_PATH") {
            builder = builder.add_source(File::with_name(&path).required(true));
        }

        builder = builder.add_source(File::with_name("config/local").required(false));

        builder = builder.add_source(
            Environment::with_prefix("BOOKSHELF")
                .separator("__")
                .ignore_empty(true)
                .try_parsing(true),
        );

        let settings: Settings = builder.build()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Validates cross-field configuration consistency.
    pub fn validate(&self) -> Result<()> {
        self.storage.validate()?;
        Ok(())
    }
}
