use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;

use crate::Error;
use crate::Result;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct StorageConfig {
    /// File holding the serialized book collection
    #[serde(default = "default_data_file")]
    pub data_file: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_file: default_data_file(),
        }
    }
}

impl StorageConfig {
    /// # Errors
    /// Returns `Error::InvalidConfig` if `data_file` does not name a file.
    pub fn validate(&self) -> Result<()> {
        if self.data_file.file_name().is_none() {
            return Err(Error::InvalidConfig(
                "storage.data_file must name a file".into(),
            ));
        }
        Ok(())
    }
}

fn default_data_file() -> PathBuf {
    PathBuf::from("books.json")
}
