use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")] Database(#[from] sea_orm::DbErr),

    #[error("{0}")] Validation(String),

    #[error("{0}")] NotFound(String),

    #[error("{0}")] AlreadyProcessed(String),

    #[error("Insufficient balance")]
    InsufficientFunds,

    #[error("{0}")] InvalidReference(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Account is inactive")]
    AccountInactive,

    #[error("{0}")] Forbidden(String),

    #[error("Internal error: {0}")] Internal(String),
}

#[derive(serde::Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(serde::Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

impl AppError {
    pub fn to_error_response(&self) -> ErrorResponse {
        let (code, message) = match self {
            AppError::Database(e) => ("DATABASE_ERROR", e.to_string()),
            AppError::Validation(msg) => ("VALIDATION_ERROR", msg.clone()),
            AppError::NotFound(msg) => ("NOT_FOUND", msg.clone()),
            AppError::AlreadyProcessed(msg) => ("ALREADY_PROCESSED", msg.clone()),
            AppError::InsufficientFunds =>
                ("INSUFFICIENT_FUNDS", "Insufficient balance".to_string()),
            AppError::InvalidReference(msg) => ("INVALID_REFERENCE", msg.clone()),
            AppError::InvalidCredentials =>
                ("INVALID_CREDENTIALS", "Invalid credentials".to_string()),
            AppError::AccountInactive => ("ACCOUNT_INACTIVE", "Account is inactive".to_string()),
            AppError::Forbidden(msg) => ("FORBIDDEN", msg.clone()),
            AppError::Internal(msg) => ("INTERNAL_ERROR", msg.clone()),
        };

        ErrorResponse {
            error: ErrorDetail {
                code: code.to_string(),
                message,
            },
        }
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            AppError::NotFound(_) => axum::http::StatusCode::NOT_FOUND,
            AppError::AlreadyProcessed(_) => axum::http::StatusCode::CONFLICT,
            | AppError::Validation(_)
            | AppError::InsufficientFunds
            | AppError::InvalidReference(_) => axum::http::StatusCode::BAD_REQUEST,
            AppError::InvalidCredentials => axum::http::StatusCode::UNAUTHORIZED,
            AppError::AccountInactive | AppError::Forbidden(_) => axum::http::StatusCode::FORBIDDEN,
            _ => axum::http::StatusCode::INTERNAL_SERVER_ERROR,
        };

        let response = self.to_error_response();
        (status, axum::Json(response)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err = AppError::Validation("Minimum deposit is 3000".to_string());
        let response = err.to_error_response();
        assert_eq!(response.error.code, "VALIDATION_ERROR");
        assert_eq!(response.error.message, "Minimum deposit is 3000");

        let err = AppError::InsufficientFunds;
        assert_eq!(err.to_error_response().error.code, "INSUFFICIENT_FUNDS");
    }

    #[test]
    fn test_already_processed_carries_current_status() {
        let err = AppError::AlreadyProcessed("Deposit is already approved".to_string());
        assert_eq!(err.to_string(), "Deposit is already approved");
    }
}
