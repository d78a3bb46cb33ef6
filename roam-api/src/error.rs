use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use roam_core::CoreError;
use serde_json::json;

#[derive(Debug)]
pub enum AppError {
    Authentication(String),
    Core(CoreError),
    Internal(anyhow::Error),
}

impl AppError {
    pub fn internal<E: Into<anyhow::Error>>(err: E) -> Self {
        Self::Internal(err.into())
    }
}

impl From<CoreError> for AppError {
    fn from(err: CoreError) -> Self {
        Self::Core(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::Authentication(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::Core(CoreError::Validation(msg)) => (StatusCode::BAD_REQUEST, msg),
            AppError::Core(CoreError::NotFound(msg)) => (StatusCode::NOT_FOUND, msg),
            AppError::Core(CoreError::Forbidden(msg)) => (StatusCode::FORBIDDEN, msg),
            AppError::Core(CoreError::Conflict(msg)) => (StatusCode::CONFLICT, msg),
            AppError::Core(CoreError::Dependency(msg)) => {
                tracing::error!("Dependency failure: {}", msg);
                (StatusCode::BAD_GATEWAY, "Upstream dependency failed".to_string())
            }
            AppError::Internal(err) => {
                tracing::error!("Internal Server Error: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn core_errors_map_to_their_status_codes() {
        assert_eq!(
            status_of(CoreError::Validation("bad".into()).into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(CoreError::NotFound("missing".into()).into()),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(CoreError::Forbidden("no".into()).into()),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            status_of(CoreError::Conflict("again".into()).into()),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(CoreError::Dependency("down".into()).into()),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            status_of(AppError::Authentication("who".into())),
            StatusCode::UNAUTHORIZED
        );
    }
}
