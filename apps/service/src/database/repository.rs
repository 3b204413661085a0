use anyhow::Result;
use async_trait::async_trait;
use hostwatch::{HostState, HostStatus};
use libsql::params;

use super::models::{StoredStatus, unix_now};
use super::pool::{LibsqlManager, LibsqlPool};

/// Persistence of the monitored host set and last known statuses
#[async_trait]
pub trait Database: Send + Sync {
    /// Add a host to the monitored set (no-op if already present)
    async fn add_host(&self, host: &str) -> Result<()>;

    /// Remove a host from the monitored set, keeping its last status
    async fn remove_host(&self, host: &str) -> Result<()>;

    async fn has_host(&self, host: &str) -> Result<bool>;

    /// Record a transition as the host's last known status
    async fn set_status(&self, status: &HostStatus) -> Result<()>;

    /// Every monitored host with its last known status, oldest first
    async fn load_statuses(&self) -> Result<Vec<StoredStatus>>;
}

/// LibSQL database implementation
pub struct DatabaseImpl {
    pool: LibsqlPool,
}

impl DatabaseImpl {
    pub fn new_from_pool(pool: LibsqlPool) -> Self {
        Self { pool }
    }

    async fn get_conn(&self) -> Result<deadpool::managed::Object<LibsqlManager>> {
        Ok(self.pool.get().await?)
    }
}

#[async_trait]
impl Database for DatabaseImpl {
    async fn add_host(&self, host: &str) -> Result<()> {
        let conn = self.get_conn().await?;
        conn.execute(
            "INSERT INTO monitored_hosts (host, added_at) VALUES (?, ?) ON CONFLICT(host) DO NOTHING",
            params![host, unix_now()],
        )
        .await?;
        Ok(())
    }

    async fn remove_host(&self, host: &str) -> Result<()> {
        let conn = self.get_conn().await?;
        conn.execute("DELETE FROM monitored_hosts WHERE host = ?", params![host]).await?;
        Ok(())
    }

    async fn has_host(&self, host: &str) -> Result<bool> {
        let conn = self.get_conn().await?;
        let mut rows =
            conn.query("SELECT 1 FROM monitored_hosts WHERE host = ?", params![host]).await?;
        Ok(rows.next().await?.is_some())
    }

    async fn set_status(&self, status: &HostStatus) -> Result<()> {
        let conn = self.get_conn().await?;
        let reason = status.reason.as_ref().map(ToString::to_string);

        conn.execute(
            "INSERT INTO host_status (host, status, reason, updated_at) VALUES (?, ?, ?, ?)
             ON CONFLICT(host) DO UPDATE SET
                status = excluded.status,
                reason = excluded.reason,
                updated_at = excluded.updated_at",
            params![status.host.as_str(), status.state().to_string(), reason, unix_now()],
        )
        .await?;
        Ok(())
    }

    async fn load_statuses(&self) -> Result<Vec<StoredStatus>> {
        let conn = self.get_conn().await?;
        let mut rows = conn
            .query(
                "SELECT h.host, s.status, s.reason
                 FROM monitored_hosts h
                 LEFT JOIN host_status s ON s.host = h.host
                 ORDER BY h.added_at, h.host",
                (),
            )
            .await?;

        let mut statuses = Vec::new();
        while let Some(row) = rows.next().await? {
            let status: Option<String> = row.get(1)?;

            statuses.push(StoredStatus {
                host: row.get(0)?,
                status: status.as_deref().and_then(parse_state),
                reason: row.get(2)?,
            });
        }

        Ok(statuses)
    }
}

fn parse_state(raw: &str) -> Option<HostState> {
    match raw {
        "up" => Some(HostState::Up),
        "down" => Some(HostState::Down),
        _ => None,
    }
}
