// src/application/error_handling.rs
//
// Error Handling for Commands
//
// ARCHITECTURE:
// - Maps internal errors to user-friendly responses
// - Provides consistent error format for the UI
// - Validation messages are shown verbatim next to the form
// - Internal errors are logged, not exposed

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Standard error response for UI
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error_type: ErrorType,
    pub message: String,
    pub details: Option<String>,
}

/// Error categories for UI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorType {
    /// Rejected user input (400)
    Validation,

    /// Resource not found (404)
    NotFound,

    /// Signed-in user required (401)
    Unauthenticated,

    /// Backend, network or player failure (502)
    ExternalService,

    /// Other/unknown error (500)
    Internal,
}

impl ErrorResponse {
    pub fn from_app_error(error: AppError) -> Self {
        if error.is_remote() {
            log::warn!("remote failure: {}", error);
        }

        match error {
            AppError::Validation(validation) => Self::validation(validation.to_string()),

            AppError::Domain(domain_error) => Self::validation(domain_error.to_string()),

            AppError::NotFound => Self::not_found("Resource"),

            AppError::Unauthenticated => Self {
                success: false,
                error_type: ErrorType::Unauthenticated,
                message: "Please sign in to continue".to_string(),
                details: None,
            },

            AppError::Backend { status, message } => Self {
                success: false,
                error_type: ErrorType::ExternalService,
                message,
                details: Some(format!("status {}", status)),
            },

            AppError::Http(_) => Self {
                success: false,
                error_type: ErrorType::ExternalService,
                message: "Could not reach the server".to_string(),
                details: None,
            },

            AppError::Player(message) => Self {
                success: false,
                error_type: ErrorType::ExternalService,
                message: "Player error".to_string(),
                details: Some(message),
            },

            other => {
                log::error!("internal error: {:?}", other);

                Self {
                    success: false,
                    error_type: ErrorType::Internal,
                    message: "Something went wrong".to_string(),
                    details: None,
                }
            }
        }
    }

    pub fn validation(message: String) -> Self {
        Self {
            success: false,
            error_type: ErrorType::Validation,
            message,
            details: None,
        }
    }

    pub fn not_found(resource: &str) -> Self {
        Self {
            success: false,
            error_type: ErrorType::NotFound,
            message: format!("{} not found", resource),
            details: None,
        }
    }
}

/// Helper trait to convert Results to serialized ErrorResponse strings
pub trait ToErrorResponse<T> {
    fn to_error_response(self) -> Result<T, String>;
}

impl<T> ToErrorResponse<T> for Result<T, AppError> {
    fn to_error_response(self) -> Result<T, String> {
        self.map_err(|e| {
            let error_response = ErrorResponse::from_app_error(e);
            serde_json::to_string(&error_response).unwrap_or_else(|_| "Internal error".to_string())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ValidationError;

    #[test]
    fn test_not_found_error() {
        let error = ErrorResponse::from_app_error(AppError::NotFound);
        assert_eq!(error.error_type, ErrorType::NotFound);
        assert_eq!(error.message, "Resource not found");
    }

    #[test]
    fn test_validation_message_is_verbatim() {
        let error = ErrorResponse::from_app_error(AppError::Validation(
            ValidationError::PasswordTooShort { min: 6 },
        ));
        assert_eq!(error.error_type, ErrorType::Validation);
        assert_eq!(error.message, "Password must be at least 6 characters");
    }

    #[test]
    fn test_backend_message_surfaced() {
        let error = ErrorResponse::from_app_error(AppError::Backend {
            status: 400,
            message: "Invalid login credentials".to_string(),
        });
        assert_eq!(error.error_type, ErrorType::ExternalService);
        assert_eq!(error.message, "Invalid login credentials");
        assert_eq!(error.details.as_deref(), Some("status 400"));
    }

    #[test]
    fn test_internal_errors_hidden() {
        let error = ErrorResponse::from_app_error(AppError::Other("stack trace".to_string()));
        assert_eq!(error.error_type, ErrorType::Internal);
        assert!(!error.message.contains("stack trace"));
    }

    #[test]
    fn test_result_conversion_serializes() {
        let result: Result<(), AppError> = Err(AppError::Unauthenticated);
        let message = result.to_error_response().unwrap_err();
        let parsed: ErrorResponse = serde_json::from_str(&message).unwrap();
        assert_eq!(parsed.error_type, ErrorType::Unauthenticated);
        assert!(!parsed.success);
    }
}
