// crates/db/src/json_file.rs
//! The project collection as a single pretty-printed JSON array on disk.
//!
//! Reads never fail: a missing, unreadable or malformed file is an empty
//! collection. Writes keep the previous file as `<file>.bak` and replace the
//! data file through a temp file + rename.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use proslide_core::paths::backup_path;
use proslide_core::{GatewayError, ProjectGateway, ProjectRow};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::{DbError, DbResult};

#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn read_rows(&self) -> Vec<ProjectRow> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(b) => b,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "Data file not found, starting empty");
                return Vec::new();
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Failed to read data file");
                return Vec::new();
            }
        };

        match serde_json::from_slice::<Vec<ProjectRow>>(&bytes) {
            Ok(rows) => rows,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Data file is not a JSON array of rows");
                Vec::new()
            }
        }
    }

    pub async fn write_rows(&self, rows: &[ProjectRow]) -> DbResult<()> {
        let body = serde_json::to_vec_pretty(rows)?;
        let _guard = self.write_lock.lock().await;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        match tokio::fs::copy(&self.path, backup_path(&self.path)).await {
            Ok(_) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => warn!(path = %self.path.display(), error = %e, "Failed to back up data file"),
        }

        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, &body)
            .await
            .map_err(|source| DbError::DataFile {
                path: tmp.clone(),
                source,
            })?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|source| DbError::DataFile {
                path: self.path.clone(),
                source,
            })?;

        info!(path = %self.path.display(), rows = rows.len(), "Wrote data file");
        Ok(())
    }
}

#[async_trait]
impl ProjectGateway for JsonFileStore {
    async fn load_all(&self) -> Result<Vec<ProjectRow>, GatewayError> {
        Ok(self.read_rows().await)
    }

    async fn replace_all(&self, rows: &[ProjectRow]) -> Result<(), GatewayError> {
        Ok(self.write_rows(rows).await?)
    }
}
