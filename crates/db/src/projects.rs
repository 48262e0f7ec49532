// crates/db/src/projects.rs
//! Project collection queries on [`Database`].

use async_trait::async_trait;
use proslide_core::{GatewayError, ProjectGateway, ProjectRow};

use crate::{Database, DbError, DbResult};

impl Database {
    /// All stored rows in save order.
    pub async fn load_projects(&self) -> DbResult<Vec<ProjectRow>> {
        let docs: Vec<(String,)> = sqlx::query_as("SELECT doc FROM projects ORDER BY position")
            .fetch_all(self.pool())
            .await?;

        docs.into_iter()
            .map(|(doc,)| serde_json::from_str::<ProjectRow>(&doc).map_err(DbError::from))
            .collect()
    }

    /// Discard every stored row and insert `rows`, in one transaction.
    pub async fn replace_projects(&self, rows: &[ProjectRow]) -> DbResult<()> {
        let docs = rows
            .iter()
            .map(serde_json::to_string)
            .collect::<Result<Vec<_>, _>>()?;

        let mut tx = self.pool().begin().await?;
        sqlx::query("DELETE FROM projects").execute(&mut *tx).await?;
        for (position, doc) in docs.iter().enumerate() {
            sqlx::query("INSERT INTO projects (position, doc) VALUES (?, ?)")
                .bind(position as i64)
                .bind(doc)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;

        tracing::debug!(rows = rows.len(), "Replaced project documents");
        Ok(())
    }
}

#[async_trait]
impl ProjectGateway for Database {
    async fn load_all(&self) -> Result<Vec<ProjectRow>, GatewayError> {
        Ok(self.load_projects().await?)
    }

    async fn replace_all(&self, rows: &[ProjectRow]) -> Result<(), GatewayError> {
        Ok(self.replace_projects(rows).await?)
    }
}
