// crates/server/src/remote.rs
//! Client side of the REST API: a [`ProjectGateway`] backed by a running
//! server, and the dashboard poller that turns it into snapshots.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use proslide_core::{DashboardSnapshot, GatewayError, ProjectGateway, ProjectRow};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::routes::projects::SaveResponse;

/// Per-request timeout for the remote gateway.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// `GET`/`POST /api/projects` on a ProSlide server.
#[derive(Debug, Clone)]
pub struct RemoteProjects {
    client: reqwest::Client,
    endpoint: String,
}

impl RemoteProjects {
    /// `base_url` is the server root, e.g. `http://127.0.0.1:5000`.
    pub fn new(base_url: &str) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| GatewayError::unreachable(e.to_string()))?;
        Ok(Self {
            client,
            endpoint: format!("{}/api/projects", base_url.trim_end_matches('/')),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ProjectGateway for RemoteProjects {
    async fn load_all(&self) -> Result<Vec<ProjectRow>, GatewayError> {
        let response = self
            .client
            .get(&self.endpoint)
            .send()
            .await
            .map_err(|e| GatewayError::unreachable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::rejected(status.as_u16(), body));
        }

        response
            .json::<Vec<ProjectRow>>()
            .await
            .map_err(|e| GatewayError::Decode(e.to_string()))
    }

    async fn replace_all(&self, rows: &[ProjectRow]) -> Result<(), GatewayError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(rows)
            .send()
            .await
            .map_err(|e| GatewayError::unreachable(e.to_string()))?;

        let status = response.status();
        let reply = response.json::<SaveResponse>().await;
        match reply {
            Ok(SaveResponse { success: true, .. }) if status.is_success() => Ok(()),
            Ok(SaveResponse { message, .. }) => Err(GatewayError::rejected(
                status.as_u16(),
                message.unwrap_or_else(|| "save rejected".to_string()),
            )),
            Err(e) if status.is_success() => Err(GatewayError::Decode(e.to_string())),
            Err(_) => Err(GatewayError::rejected(status.as_u16(), status.to_string())),
        }
    }
}

/// Owner of a running dashboard poller.
///
/// Dropping the handle cancels the task; [`PollerHandle::shutdown`] also
/// waits for it to finish.
#[derive(Debug)]
pub struct PollerHandle {
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
    snapshots: watch::Receiver<Option<DashboardSnapshot>>,
}

impl PollerHandle {
    /// Receiver that sees every published snapshot; `None` until the first
    /// successful poll.
    pub fn subscribe(&self) -> watch::Receiver<Option<DashboardSnapshot>> {
        self.snapshots.clone()
    }

    pub fn latest(&self) -> Option<DashboardSnapshot> {
        self.snapshots.borrow().clone()
    }

    /// Cancel polling and wait for the task to exit. Consumes the handle, so
    /// teardown happens once.
    pub async fn shutdown(mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                tracing::warn!(error = %e, "Dashboard poller task ended abnormally");
            }
        }
    }
}

impl Drop for PollerHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Poll `gateway` every `every`, publishing a fresh [`DashboardSnapshot`] per
/// successful fetch. The first poll runs immediately.
///
/// A failed fetch is logged and the previous snapshot stays published. A
/// fetch still in flight when the poller is cancelled is discarded.
pub fn spawn_poller<G>(gateway: Arc<G>, every: Duration) -> PollerHandle
where
    G: ProjectGateway + ?Sized + 'static,
{
    let (tx, rx) = watch::channel(None);
    let cancel = CancellationToken::new();
    let token = cancel.clone();

    let task = tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = token.cancelled() => break,
                _ = interval.tick() => {}
            }

            let result = tokio::select! {
                _ = token.cancelled() => break,
                result = gateway.load_all() => result,
            };

            match result {
                Ok(rows) => {
                    let snapshot = DashboardSnapshot::from_rows(&rows);
                    tracing::debug!(
                        total = snapshot.kpis.total,
                        completed = snapshot.kpis.completed,
                        "Dashboard refreshed"
                    );
                    tx.send_replace(Some(snapshot));
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Dashboard poll failed, keeping previous snapshot");
                }
            }
        }

        tracing::debug!("Dashboard poller stopped");
    });

    PollerHandle {
        cancel,
        task: Some(task),
        snapshots: rx,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_joins_base_url() {
        let remote = RemoteProjects::new("http://localhost:5000/").unwrap();
        assert_eq!(remote.endpoint(), "http://localhost:5000/api/projects");
    }

    #[tokio::test]
    async fn test_unreachable_server() {
        // port 9 (discard) on localhost is closed in test environments
        let remote = RemoteProjects::new("http://127.0.0.1:9").unwrap();
        assert!(matches!(
            remote.load_all().await,
            Err(GatewayError::Unreachable { .. })
        ));
    }
}
