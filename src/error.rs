use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

use crate::utils::session::Flash;

#[derive(Debug, Error)]
pub enum AppError {
    /// Bad input shape, rejected before any write (400)
    #[error("{0}")]
    Validation(String),

    /// No signed-in identity or wrong credentials (401)
    #[error("{0}")]
    Unauthenticated(String),

    /// Signed in, but the role does not allow it (403)
    #[error("{0}")]
    Forbidden(String),

    /// Missing row (404)
    #[error("{0}")]
    NotFound(String),

    /// Payment gateway failure or malformed reply (502)
    #[error("{0}")]
    Gateway(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::Unauthenticated(_) => "UNAUTHENTICATED",
            AppError::Forbidden(_) => "FORBIDDEN",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Gateway(_) => "GATEWAY_ERROR",
            AppError::Database(_) => "DATABASE_ERROR",
            AppError::Migration(_) => "MIGRATION_ERROR",
            AppError::Config(_) => "CONFIGURATION_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Message safe to show to the person making the request.
    pub fn public_message(&self) -> String {
        match self {
            AppError::Validation(msg)
            | AppError::Unauthenticated(msg)
            | AppError::Forbidden(msg)
            | AppError::NotFound(msg)
            | AppError::Gateway(msg) => msg.clone(),
            _ => "Something went wrong. Please try again.".to_string(),
        }
    }

    /// The flash message an interactive page shows for this error.
    pub fn flash(&self) -> Flash {
        match self {
            AppError::Unauthenticated(msg) => Flash::warning(msg.clone()),
            AppError::Validation(_)
            | AppError::Forbidden(_)
            | AppError::NotFound(_)
            | AppError::Gateway(_) => Flash::error(self.public_message()),
            _ => Flash::danger(self.public_message()),
        }
    }

    pub fn is_server_error(&self) -> bool {
        self.status_code().is_server_error()
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Gateway(_) => StatusCode::BAD_GATEWAY,
            AppError::Database(_)
            | AppError::Migration(_)
            | AppError::Config(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            log::error!("{} ({}): {:?}", status, self.error_code(), self);
        }

        HttpResponse::build(status).json(json!({
            "status": "error",
            "error": self.public_message(),
            "error_code": self.error_code(),
        }))
    }
}

pub type AppResult<T> = Result<T, AppError>;

fn has_sqlstate(err: &sqlx::Error, code: &str) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().as_deref() == Some(code),
        _ => false,
    }
}

/// True when a Postgres error is a unique-constraint violation (SQLSTATE 23505).
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    has_sqlstate(err, "23505")
}

/// True when Postgres rejected an arithmetic result as out of range (SQLSTATE 22003).
pub fn is_numeric_overflow(err: &sqlx::Error) -> bool {
    has_sqlstate(err, "22003")
}
