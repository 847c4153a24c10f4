use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use compclub_config::ConfigError;
use compclub_database::DatabaseError;
use compclub_telemetry::TelemetryError;
use compclub_volunteering::Error;
use serde::Serialize;
use tracing::{error, warn};

#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    Volunteering(#[from] Error),
    #[error("invalid request body: {0}")]
    Json(#[from] JsonRejection),
    #[error("invalid path: {0}")]
    Path(#[from] PathRejection),
    #[error("invalid query: {0}")]
    Query(#[from] QueryRejection),
    #[error("missing or malformed x-compclub-user header")]
    Unauthenticated,
    #[error("user {0} has no volunteer record")]
    UnknownUser(i32),
    #[error("only staff may do this")]
    Forbidden,
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("database error: {0}")]
    Database(#[from] DatabaseError),
    #[error("{0}")]
    Config(#[from] ConfigError),
    #[error("telemetry error: {0}")]
    Telemetry(#[from] TelemetryError),
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Volunteering(Error::Validation(_)) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Volunteering(Error::NotFound { .. }) => StatusCode::NOT_FOUND,
            Self::Volunteering(Error::Transport(_)) => StatusCode::BAD_GATEWAY,
            Self::Json(rejection) => rejection.status(),
            Self::Path(rejection) => rejection.status(),
            Self::Query(rejection) => rejection.status(),
            Self::Unauthenticated | Self::UnknownUser(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::Volunteering(Error::Store(_))
            | Self::Io(_)
            | Self::Database(_)
            | Self::Config(_)
            | Self::Telemetry(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(%status, "request failed: {self}");
        } else {
            warn!(%status, "request rejected: {self}");
        }
        (
            status,
            Json(ErrorBody {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}
