//! HTTP admin endpoint, the runtime source of start and stop commands.
//!
//! `PUT /{host}` (or any method other than DELETE) registers a host,
//! `DELETE /{host}` unregisters it. `GET /health` and `GET /status` are
//! reserved and matched first.
pub mod error;
pub mod routes;

use std::net::SocketAddr;
use std::sync::Arc;

use actix_web::{App, HttpServer, web};
use async_trait::async_trait;
use hostwatch::{AdapterError, Receiver, StartSender, StopSender};
use tracing::info;

use crate::database::Database;
use crate::dns::DnsChecker;

const WORKERS: usize = 2;

/// Shared state of the admin handlers
pub struct AdminState {
    pub start: StartSender,
    pub stop: StopSender,
    pub database: Option<Arc<dyn Database>>,
    /// DNS preflight run before a host is registered, when enabled
    pub dns: Option<DnsChecker>,
}

pub struct AdminReceiver {
    listen: SocketAddr,
    database: Option<Arc<dyn Database>>,
    dns: Option<DnsChecker>,
}

impl AdminReceiver {
    pub fn new(listen: SocketAddr, database: Option<Arc<dyn Database>>, dns: Option<DnsChecker>) -> Self {
        Self { listen, database, dns }
    }
}

#[async_trait]
impl Receiver for AdminReceiver {
    async fn receive(&self, start: StartSender, stop: StopSender) -> Result<(), AdapterError> {
        let state = web::Data::new(AdminState {
            start,
            stop,
            database: self.database.clone(),
            dns: self.dns.clone(),
        });

        let server = HttpServer::new(move || App::new().app_data(state.clone()).configure(routes::routes))
            .workers(WORKERS)
            .disable_signals()
            .bind(self.listen)?
            .run();

        info!(listen = %self.listen, "admin endpoint listening");
        server.await?;
        Ok(())
    }
}
