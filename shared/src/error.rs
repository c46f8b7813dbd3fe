use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    EntityNotFound(String),
    #[error("{0}")]
    SlotConflict(String),
    #[error("status cannot change from {from} to {to}")]
    InvalidTransition { from: String, to: String },
    #[error("{0}")]
    ValidationError(#[from] garde::Report),
    #[error("{0}")]
    InvalidRequest(String),
    #[error("transaction failed")]
    TransactionError(#[source] sqlx::Error),
    #[error("database operation failed")]
    SpecificOperationError(#[source] sqlx::Error),
    #[error("No rows affected: {0}")]
    NoRowsAffectedError(String),
    #[error("{0}")]
    ConversionEntityError(String),
    #[error("staff identity is required")]
    UnauthenticatedError,
    #[error("{0}")]
    ForbiddenOperation(String),
}

impl AppError {
    /// 保存処理の失敗か。true ならリクエスト自体は正しいので再試行してよい
    pub fn is_persistence(&self) -> bool {
        matches!(
            self,
            AppError::TransactionError(_)
                | AppError::SpecificOperationError(_)
                | AppError::NoRowsAffectedError(_)
                | AppError::ConversionEntityError(_)
        )
    }

    fn kind(&self) -> &'static str {
        match self {
            AppError::EntityNotFound(_) => "NotFound",
            AppError::SlotConflict(_) => "SlotConflict",
            AppError::InvalidTransition { .. } => "InvalidTransition",
            AppError::ValidationError(_) | AppError::InvalidRequest(_) => "ValidationError",
            AppError::UnauthenticatedError => "Unauthenticated",
            AppError::ForbiddenOperation(_) => "Forbidden",
            _ => "PersistenceError",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status_code = match &self {
            AppError::EntityNotFound(_) => StatusCode::NOT_FOUND,
            AppError::SlotConflict(_) | AppError::InvalidTransition { .. } => StatusCode::CONFLICT,
            AppError::ValidationError(_) | AppError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            AppError::UnauthenticatedError => StatusCode::UNAUTHORIZED,
            AppError::ForbiddenOperation(_) => StatusCode::FORBIDDEN,
            e => {
                tracing::error!(
                    error.cause_chain = ?e,
                    error.message = %e,
                    "Unexpected error happened"
                );
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        // 永続化エラーの詳細はクライアントに返さない
        let message = if self.is_persistence() {
            "try again later".to_string()
        } else {
            self.to_string()
        };
        let body = json!({ "error": self.kind(), "message": message });
        (status_code, Json(body)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
