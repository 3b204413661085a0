use std::sync::Arc;

use async_trait::async_trait;
use hostwatch::{AdapterError, HostStatus, Notifier, NotifyReceiver};
use tracing::{error, info, warn};

use crate::database::Database;
use crate::hub::HubClient;

/// Logs every transition, records it in the store and forwards it to the
/// hub. A failing sink is logged and the event is still handed to the others.
pub struct ServiceNotifier {
    database: Option<Arc<dyn Database>>,
    hub: Option<HubClient>,
}

impl ServiceNotifier {
    pub fn new(database: Option<Arc<dyn Database>>, hub: Option<HubClient>) -> Self {
        Self { database, hub }
    }

    async fn handle(&self, event: &HostStatus) {
        if event.down {
            warn!(host = %event.host, "{event}");
        } else {
            info!(host = %event.host, "{event}");
        }

        if let Some(database) = &self.database {
            if let Err(e) = database.set_status(event).await {
                error!(host = %event.host, "failed to persist status: {e:#}");
            }
        }

        if let Some(hub) = &self.hub {
            if let Err(e) = hub.publish(event).await {
                error!(host = %event.host, "failed to publish to hub: {e:#}");
            }
        }
    }
}

#[async_trait]
impl Notifier for ServiceNotifier {
    async fn notify(&self, mut events: NotifyReceiver) -> Result<(), AdapterError> {
        while let Some(event) = events.recv().await {
            self.handle(&event).await;
        }
        Ok(())
    }
}
