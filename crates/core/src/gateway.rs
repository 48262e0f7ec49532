// crates/core/src/gateway.rs
//! Persistence gateway: the load-all / replace-all boundary between the
//! working set (or dashboard) and wherever the project collection lives.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::GatewayError;
use crate::row::ProjectRow;

/// Remote or local project collection.
///
/// `replace_all` is a full replace: whatever was stored before is discarded.
#[async_trait]
pub trait ProjectGateway: Send + Sync {
    async fn load_all(&self) -> Result<Vec<ProjectRow>, GatewayError>;

    async fn replace_all(&self, rows: &[ProjectRow]) -> Result<(), GatewayError>;
}

/// In-process collection, used by tests and dry runs.
#[derive(Debug, Default)]
pub struct MemoryGateway {
    rows: Mutex<Vec<ProjectRow>>,
    failing: bool,
}

impl MemoryGateway {
    pub fn new(rows: Vec<ProjectRow>) -> Self {
        Self {
            rows: Mutex::new(rows),
            failing: false,
        }
    }

    /// A gateway whose every call fails as if the store were unreachable.
    pub fn failing() -> Self {
        Self {
            rows: Mutex::new(Vec::new()),
            failing: true,
        }
    }

    pub fn snapshot(&self) -> Vec<ProjectRow> {
        self.rows.lock().map(|r| r.clone()).unwrap_or_default()
    }

    fn check(&self) -> Result<(), GatewayError> {
        if self.failing {
            Err(GatewayError::unreachable("memory gateway configured to fail"))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl ProjectGateway for MemoryGateway {
    async fn load_all(&self) -> Result<Vec<ProjectRow>, GatewayError> {
        self.check()?;
        self.rows
            .lock()
            .map(|r| r.clone())
            .map_err(|e| GatewayError::Storage(format!("lock poisoned: {e}")))
    }

    async fn replace_all(&self, rows: &[ProjectRow]) -> Result<(), GatewayError> {
        self.check()?;
        let mut stored = self
            .rows
            .lock()
            .map_err(|e| GatewayError::Storage(format!("lock poisoned: {e}")))?;
        *stored = rows.to_vec();
        Ok(())
    }
}
