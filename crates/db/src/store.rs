// crates/db/src/store.rs
//! Picks the project store the server runs against.

use std::path::PathBuf;
use std::sync::Arc;

use proslide_core::paths;
use proslide_core::ProjectGateway;
use serde::{Deserialize, Serialize};

use crate::{Database, DbResult, JsonFileStore};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Single JSON data file.
    #[default]
    File,
    /// SQLite document store.
    Sqlite,
}

impl std::str::FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "file" | "json" => Ok(Self::File),
            "sqlite" | "db" => Ok(Self::Sqlite),
            other => Err(format!("Invalid storage backend '{other}'. Valid options: file, sqlite")),
        }
    }
}

impl std::fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::File => "file",
            Self::Sqlite => "sqlite",
        })
    }
}

#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub backend: StorageBackend,
    pub data_file: PathBuf,
    /// `None` means the default cache location.
    pub db_path: Option<PathBuf>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::File,
            data_file: paths::default_data_file(),
            db_path: None,
        }
    }
}

pub async fn open_store(config: &StoreConfig) -> DbResult<Arc<dyn ProjectGateway>> {
    match config.backend {
        StorageBackend::File => {
            tracing::info!(path = %config.data_file.display(), "Using JSON data file store");
            Ok(Arc::new(JsonFileStore::new(config.data_file.clone())))
        }
        StorageBackend::Sqlite => {
            let db = match &config.db_path {
                Some(path) => Database::new(path).await?,
                None => Database::open_default().await?,
            };
            Ok(Arc::new(db))
        }
    }
}
