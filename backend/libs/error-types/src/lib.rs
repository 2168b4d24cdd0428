//! Unified error types for the matching-platform core.
//!
//! This library provides standardized error handling shared by every module
//! of `core-service`, ensuring consistent error reporting, logging, and
//! client responses.
//!
//! # Design Principles
//!
//! 1. **Type Safety**: Strongly typed errors prevent runtime surprises
//! 2. **Context Preservation**: Errors carry context for debugging
//! 3. **GDPR Compliance**: No PII in error messages
//! 4. **HTTP Integration**: Maps cleanly to the spec's error taxonomy (§7)
//! 5. **Observability**: Structured logging with tracing

use std::fmt;
use thiserror::Error;
use uuid::Uuid;

pub mod database;
pub mod validation;
pub mod auth;
pub mod http;

// Re-export common types
pub use database::DatabaseError;
pub use validation::ValidationError;
pub use auth::AuthError;

/// Core service error type used across all Nova services
///
/// # Example
/// ```rust
/// use error_types::ServiceError;
///
/// fn process_user(id: Uuid) -> Result<User, ServiceError> {
///     let user = db.get_user(id)
///         .await
///         .map_err(|e| ServiceError::NotFound {
///             resource: "user",
///             id: id.to_string(),
///         })?;
///     Ok(user)
/// }
/// ```
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Resource not found
    #[error("Resource not found: {resource}")]
    NotFound {
        resource: &'static str,
        id: String,
    },

    /// Invalid input provided
    #[error("Invalid input: {message}")]
    InvalidInput {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Authentication required
    #[error("Authentication required")]
    Unauthenticated {
        #[source]
        source: Option<AuthError>,
    },

    /// Permission denied
    #[error("Permission denied")]
    PermissionDenied {
        action: String,
        resource: String,
    },

    /// Database operation failed
    #[error("Database error")]
    Database {
        #[from]
        source: DatabaseError,
    },

    /// Validation failed
    #[error("Validation failed")]
    Validation {
        #[from]
        source: ValidationError,
    },

    /// External service error
    #[error("External service error: {service}")]
    ExternalService {
        service: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimitExceeded {
        limit: u32,
        window_seconds: u32,
    },

    /// Internal server error (catch-all)
    #[error("Internal server error")]
    Internal {
        #[source]
        source: anyhow::Error,
    },

    /// Conflict (e.g., duplicate resource)
    #[error("Conflict: {message}")]
    Conflict {
        message: String,
    },

    /// Timeout
    #[error("Operation timed out")]
    Timeout {
        operation: String,
        timeout_ms: u64,
    },

    /// Circuit breaker open
    #[error("Service temporarily unavailable")]
    CircuitBreakerOpen {
        service: String,
    },

    /// Swipe rejected for lack of credits (§4.2 `NO_CREDIT`)
    #[error("Not enough credits")]
    NoCredit {
        required: i32,
        available: i32,
    },
}

impl ServiceError {
    /// Log error with appropriate level and context
    pub fn log(&self) {
        match self {
            Self::NotFound { .. } | Self::InvalidInput { .. } => {
                tracing::debug!(error = ?self, "Client error");
            }
            Self::Unauthenticated { .. } | Self::PermissionDenied { .. } => {
                tracing::warn!(error = ?self, "Authorization failure");
            }
            Self::RateLimitExceeded { .. } => {
                tracing::info!(error = ?self, "Rate limit hit");
            }
            Self::Database { .. } | Self::Internal { .. } => {
                tracing::error!(error = ?self, "Server error");
            }
            Self::ExternalService { .. } | Self::Timeout { .. } | Self::CircuitBreakerOpen { .. } => {
                tracing::warn!(error = ?self, "Dependency issue");
            }
            _ => {
                tracing::info!(error = ?self, "Service error");
            }
        }
    }

    /// Create internal error from any error type
    pub fn internal<E: Into<anyhow::Error>>(error: E) -> Self {
        Self::Internal {
            source: error.into(),
        }
    }
}

/// Result type alias for Service operations
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Error context extension trait for adding context to Results
pub trait ErrorContext<T> {
    /// Add context to an error
    fn context<C>(self, context: C) -> ServiceResult<T>
    where
        C: fmt::Display + Send + Sync + 'static;

    /// Add lazy context (only evaluated on error)
    fn with_context<C, F>(self, f: F) -> ServiceResult<T>
    where
        C: fmt::Display + Send + Sync + 'static,
        F: FnOnce() -> C;
}

impl<T, E> ErrorContext<T> for Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn context<C>(self, context: C) -> ServiceResult<T>
    where
        C: fmt::Display + Send + Sync + 'static,
    {
        self.map_err(|e| {
            ServiceError::internal(anyhow::anyhow!("{}: {}", context, e))
        })
    }

    fn with_context<C, F>(self, f: F) -> ServiceResult<T>
    where
        C: fmt::Display + Send + Sync + 'static,
        F: FnOnce() -> C,
    {
        self.map_err(|e| {
            ServiceError::internal(anyhow::anyhow!("{}: {}", f(), e))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_to_http_conversion() {
        use crate::http::HttpErrorResponse;

        let error = ServiceError::NotFound {
            resource: "user",
            id: "123".to_string(),
        };

        let response: HttpErrorResponse = error.into();
        assert_eq!(response.status, 404);
        assert_eq!(response.message, "user not found");
    }

    #[test]
    fn test_no_pii_in_error_messages() {
        let error = ServiceError::NotFound {
            resource: "user",
            id: "user@example.com".to_string(), // PII in id field
        };

        // Error message should not contain the ID (PII)
        let message = error.to_string();
        assert!(!message.contains("user@example.com"));
        assert_eq!(message, "Resource not found: user");
    }

    #[test]
    fn test_error_context() {
        fn failing_operation() -> Result<(), std::io::Error> {
            Err(std::io::Error::new(std::io::ErrorKind::NotFound, "file not found"))
        }

        let result: ServiceResult<()> = failing_operation()
            .context("Failed to load configuration");

        assert!(result.is_err());
        let error = result.unwrap_err();
        matches!(error, ServiceError::Internal { .. });
    }
}