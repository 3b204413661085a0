use actix_web::{HttpResponse, Responder, delete, get, route, web};
use hostwatch::{HostStatus, Target};
use serde::Serialize;
use tracing::info;

use super::AdminState;
use super::error::AdminError;

macros_utils::routes! {
    route health_route,
    route status_route,
    route remove_host_route,
    route add_host_route,
}

#[derive(Debug, Serialize)]
struct StatusEntry {
    host: String,
    down: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<String>,
}

#[derive(Debug, Serialize)]
struct StatusResponse {
    data: Vec<StatusEntry>,
}

/// Paths served by the endpoint itself, never host keys
const RESERVED_PATHS: [&str; 2] = ["health", "status"];

/// Host key from the request path, everything after the leading slash
fn host_key(path: web::Path<String>) -> Result<String, AdminError> {
    let host = path.into_inner();
    let host = host.trim();
    if host.is_empty() {
        return Err(AdminError::MissingHost);
    }
    if RESERVED_PATHS.contains(&host) {
        return Err(AdminError::ReservedHost(host.to_string()));
    }
    Ok(host.to_string())
}

/// Health check route
/// This route returns no content, the response status is enough.
#[get("/health")]
pub async fn health_route() -> impl Responder {
    HttpResponse::Ok()
}

/// Last known status of every stored host
#[get("/status")]
pub async fn status_route(state: web::Data<AdminState>) -> Result<HttpResponse, AdminError> {
    let database = state.database.as_ref().ok_or(AdminError::StoreDisabled)?;
    let stored = database.load_statuses().await.map_err(AdminError::Store)?;

    let data = stored
        .into_iter()
        .map(|entry| StatusEntry {
            down: entry.to_command().down,
            host: entry.host,
            reason: entry.reason,
        })
        .collect();

    Ok(HttpResponse::Ok().json(StatusResponse { data }))
}

#[delete("/{host:.*}")]
pub async fn remove_host_route(
    state: web::Data<AdminState>,
    path: web::Path<String>,
) -> Result<HttpResponse, AdminError> {
    let host = host_key(path)?;

    if let Some(database) = &state.database {
        database.remove_host(&host).await.map_err(AdminError::Store)?;
    }
    state.stop.send(HostStatus::new(host.as_str())).await.map_err(|_| AdminError::PoolUnavailable)?;

    info!(host = %host, "host removed through admin endpoint");
    Ok(HttpResponse::Ok().finish())
}

/// Register a host. A trailing `" down"` (`%20down`) seeds it as down.
#[route("/{host:.*}", method = "GET", method = "POST", method = "PUT", method = "PATCH")]
pub async fn add_host_route(
    state: web::Data<AdminState>,
    path: web::Path<String>,
) -> Result<HttpResponse, AdminError> {
    let command = HostStatus::from_token(&host_key(path)?);
    if command.host.is_empty() {
        return Err(AdminError::MissingHost);
    }
    if RESERVED_PATHS.contains(&command.host.as_str()) {
        return Err(AdminError::ReservedHost(command.host));
    }
    Target::parse(&command.host)?;

    if let Some(dns) = &state.dns {
        dns.check(&command.host).await.map_err(AdminError::Dns)?;
    }
    if let Some(database) = &state.database {
        database.add_host(&command.host).await.map_err(AdminError::Store)?;
    }

    info!(host = %command.host, down = command.down, "host added through admin endpoint");
    state.start.send(command).await.map_err(|_| AdminError::PoolUnavailable)?;
    Ok(HttpResponse::Ok().finish())
}
