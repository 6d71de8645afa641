use application::{ApplicationError, FieldViolation};
use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use domain::RepositoryError;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<FieldViolation>>,
}

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: ErrorBody,
}

impl ApiError {
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorBody {
                code,
                message: message.into(),
                fields: None,
            },
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "BAD_REQUEST", message)
    }

    /// 细节只写日志，不返回给客户端
    pub fn internal_server_error(detail: impl std::fmt::Display) -> Self {
        tracing::error!(error = %detail, "request failed with internal error");
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "INTERNAL_ERROR",
            "internal server error",
        )
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn code(&self) -> &'static str {
        self.body.code
    }
}

impl From<ApplicationError> for ApiError {
    fn from(error: ApplicationError) -> Self {
        use application::ApplicationError as AppErr;

        match error {
            AppErr::Validation(errors) => {
                let mut api = ApiError::new(
                    StatusCode::BAD_REQUEST,
                    "VALIDATION_ERROR",
                    format!("validation failed: {errors}"),
                );
                api.body.fields = Some(errors.fields().to_vec());
                api
            }
            AppErr::NotFound { resource } => ApiError::new(
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
                format!("{resource} not found"),
            ),
            AppErr::Unauthorized => ApiError::unauthorized("invalid email or password"),
            AppErr::InvalidToken => ApiError::new(
                StatusCode::FORBIDDEN,
                "INVALID_TOKEN",
                "invalid or expired token",
            ),
            AppErr::Forbidden => ApiError::new(
                StatusCode::FORBIDDEN,
                "FORBIDDEN",
                "not allowed to modify this resource",
            ),
            AppErr::Conflict(message) => ApiError::new(StatusCode::BAD_REQUEST, "CONFLICT", message),
            AppErr::Repository(repo_err) => match repo_err {
                RepositoryError::NotFound => ApiError::new(
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    "requested resource not found",
                ),
                RepositoryError::Conflict => {
                    ApiError::new(StatusCode::BAD_REQUEST, "CONFLICT", "resource already exists")
                }
                err @ RepositoryError::Storage { .. } => ApiError::internal_server_error(err),
            },
            err @ (AppErr::Password(_) | AppErr::Token(_) | AppErr::Infrastructure(_)) => {
                ApiError::internal_server_error(err)
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::new(StatusCode::BAD_REQUEST, "INVALID_JSON", rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::bad_request(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}
