use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AdminError {
    #[error("missing host on request")]
    MissingHost,
    #[error("{0} is a reserved path, not a host")]
    ReservedHost(String),
    #[error("{0}")]
    InvalidTarget(#[from] hostwatch::ProbeError),
    #[error("{0:#}")]
    Dns(anyhow::Error),
    #[error("status store error: {0:#}")]
    Store(anyhow::Error),
    #[error("status store is not configured")]
    StoreDisabled,
    #[error("monitoring pool is not accepting commands")]
    PoolUnavailable,
}

impl ResponseError for AdminError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::MissingHost | Self::ReservedHost(_) | Self::InvalidTarget(_) | Self::Dns(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::StoreDisabled | Self::PoolUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).body(self.to_string())
    }
}
