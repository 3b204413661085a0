use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use hostwatch::{AdapterError, HostStatus, Loader, StartSender};
use tracing::{info, warn};

use crate::database::Database;

/// Pause between two queued start commands so a large host set does not
/// probe in lockstep
const LOAD_PACING: Duration = Duration::from_millis(10);

/// Boot loader restoring the stored host set and merging the static hosts
pub struct StoreLoader {
    database: Option<Arc<dyn Database>>,
    static_hosts: Vec<String>,
}

impl StoreLoader {
    pub fn new(database: Option<Arc<dyn Database>>, static_hosts: Vec<String>) -> Self {
        Self { database, static_hosts }
    }
}

#[async_trait]
impl Loader for StoreLoader {
    async fn load(&self, start: StartSender) -> Result<(), AdapterError> {
        let mut queued = 0usize;

        if let Some(database) = &self.database {
            let stored = database.load_statuses().await?;
            info!(count = stored.len(), "BOOT loading stored hosts");

            for entry in &stored {
                if entry.status.is_none() {
                    info!(host = %entry.host, "no stored status, assuming UP");
                }
                start.send(entry.to_command()).await?;
                queued += 1;
                tokio::time::sleep(LOAD_PACING).await;
            }
        }

        for token in &self.static_hosts {
            let command = HostStatus::from_token(token);

            if let Some(database) = &self.database {
                match database.has_host(&command.host).await {
                    Ok(true) => continue,
                    Ok(false) => {
                        if let Err(e) = database.add_host(&command.host).await {
                            warn!(host = %command.host, "failed to store static host: {e:#}");
                        }
                    }
                    Err(e) => warn!(host = %command.host, "failed to look up static host: {e:#}"),
                }
            }

            start.send(command).await?;
            queued += 1;
            tokio::time::sleep(LOAD_PACING).await;
        }

        info!(queued, "BOOT ready");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::StoredStatus;
    use crate::database::open_database;
    use anyhow::{Result, bail};
    use hostwatch::Command;
    use tokio::sync::mpsc;

    async fn collect(loader: StoreLoader) -> Vec<HostStatus> {
        let (tx, mut rx) = mpsc::channel(32);
        loader.load(StartSender::new(tx)).await.unwrap();

        let mut commands = Vec::new();
        while let Some(command) = rx.recv().await {
            match command {
                Command::Start(status) => commands.push(status),
                Command::Stop(status) => panic!("loader sent a stop for {}", status.host),
            }
        }
        commands
    }

    /// Store whose host lookups always fail
    struct BrokenLookups;

    #[async_trait]
    impl Database for BrokenLookups {
        async fn add_host(&self, _host: &str) -> Result<()> {
            Ok(())
        }

        async fn remove_host(&self, _host: &str) -> Result<()> {
            Ok(())
        }

        async fn has_host(&self, _host: &str) -> Result<bool> {
            bail!("database is locked")
        }

        async fn set_status(&self, _status: &HostStatus) -> Result<()> {
            Ok(())
        }

        async fn load_statuses(&self) -> Result<Vec<StoredStatus>> {
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn test_failed_lookup_still_queues_static_hosts() {
        let loader = StoreLoader::new(Some(Arc::new(BrokenLookups)), vec!["a.example".into(), "b.example".into()]);
        let commands = collect(loader).await;
        assert_eq!(commands, vec![HostStatus::new("a.example"), HostStatus::new("b.example")]);
    }

    #[tokio::test]
    async fn test_static_hosts_without_store() {
        let loader = StoreLoader::new(None, vec!["a.example".into(), "b.example down".into()]);
        let commands = collect(loader).await;
        assert_eq!(commands, vec![HostStatus::new("a.example"), HostStatus::seeded("b.example", true)]);
    }

    #[tokio::test]
    async fn test_stored_hosts_come_first_and_are_not_duplicated() {
        let dir = tempfile::tempdir().unwrap();
        let database = open_database(&dir.path().join("store.db")).await.unwrap();

        database.add_host("stored.example").await.unwrap();
        database.set_status(&HostStatus::down("stored.example", None)).await.unwrap();
        database.add_host("fresh.example").await.unwrap();

        let loader = StoreLoader::new(
            Some(database.clone()),
            vec!["stored.example".into(), "static.example".into()],
        );
        let commands = collect(loader).await;

        // Stored hosts first, then the static host that was not stored yet
        assert_eq!(commands.len(), 3);
        assert!(commands[..2].contains(&HostStatus::seeded("stored.example", true)));
        assert!(commands[..2].contains(&HostStatus::new("fresh.example")));
        assert_eq!(commands[2], HostStatus::new("static.example"));
        assert!(database.has_host("static.example").await.unwrap());
    }
}
