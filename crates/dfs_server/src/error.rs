use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use dfs_domain::ErrorKind;

/// Everything a handler can fail with. Serialized as `{kind, message}`.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Operation(#[from] dfs_domain::Error),

    #[error("Missing query parameter: {0}")]
    MissingParameter(&'static str),

    #[error(transparent)]
    InvalidQuery(#[from] axum::extract::rejection::QueryRejection),

    #[error("Missing multipart field: {0}")]
    MissingField(&'static str),

    #[error("Invalid multipart body: {0}")]
    Multipart(#[from] axum::extract::multipart::MultipartError),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    fn into_operation_error(self) -> dfs_domain::Error {
        match self {
            Error::Operation(error) => error,
            other => dfs_domain::Error::invalid_argument(other.to_string()),
        }
    }
}

pub fn status_of(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::InvalidArgument | ErrorKind::NotADirectory | ErrorKind::NotAFile => {
            StatusCode::BAD_REQUEST
        }
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::AlreadyExists => StatusCode::CONFLICT,
        ErrorKind::IoFailure => StatusCode::INTERNAL_SERVER_ERROR,
        ErrorKind::ClusterUnavailable => StatusCode::SERVICE_UNAVAILABLE,
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let error = self.into_operation_error();
        let status = status_of(error.kind);
        if status.is_server_error() {
            tracing::warn!(kind = %error.kind, message = %error.message, "Request failed");
        } else {
            tracing::debug!(kind = %error.kind, message = %error.message, "Request rejected");
        }
        (status, Json(error)).into_response()
    }
}
