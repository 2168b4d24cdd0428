//! Domain error type for the matching-platform core.
//!
//! `CoreError` is the single error enum every module (`feed`, `swipe`,
//! `conversation`, `auth`, `realtime`) returns. It maps 1:1 onto the
//! taxonomy of spec §7 and converts into `error_types::ServiceError` at the
//! HTTP edge, reusing that shared crate's `HttpErrorResponse` JSON shape.

use actix_web::{HttpResponse, ResponseError};
use error_types::http::HttpErrorResponse;
use error_types::ServiceError;
use thiserror::Error;

pub type CoreResult<T> = Result<T, CoreError>;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("authentication required")]
    Unauthenticated,

    #[error("forbidden")]
    Forbidden,

    #[error("not found: {0}")]
    NotFound(&'static str),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("rate limited")]
    RateLimited { retry_after_secs: u32 },

    #[error("not enough credits")]
    NoCredit { required: i32, available: i32 },

    #[error("upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("internal error")]
    Internal(#[from] anyhow::Error),

    // --- Swipe-specific rejections (§4.2) ---
    #[error("self target")]
    SelfTarget,
    #[error("duplicate like")]
    DuplicateLike,
    #[error("rewind window expired")]
    RewindExpired,
    #[error("already matched")]
    AlreadyMatched,

    // --- Conversation-specific rejections (§4.3) ---
    #[error("actor not in match")]
    NotInMatch,
    #[error("empty message payload")]
    EmptyMessage,
    #[error("image sends not enabled on both sides")]
    ImageNotEnabled,
    #[error("message blocked by moderation")]
    ContentBlocked,
    #[error("match does not have enough messages to enable images")]
    NotEnoughMessages,
}

impl From<sqlx::Error> for CoreError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => CoreError::NotFound("resource"),
            sqlx::Error::Database(db_err) => {
                if db_err.is_unique_violation() {
                    CoreError::Conflict(db_err.message().to_string())
                } else if db_err.is_foreign_key_violation() {
                    CoreError::NotFound("referenced resource")
                } else {
                    tracing::error!(error = %err, "database error");
                    CoreError::Internal(anyhow::anyhow!("database error"))
                }
            }
            _ => {
                tracing::error!(error = %err, "database error");
                CoreError::Internal(anyhow::anyhow!("database error"))
            }
        }
    }
}

impl From<CoreError> for ServiceError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(message) => ServiceError::InvalidInput {
                message,
                source: None,
            },
            CoreError::Unauthenticated => ServiceError::Unauthenticated { source: None },
            CoreError::Forbidden => ServiceError::PermissionDenied {
                action: String::new(),
                resource: String::new(),
            },
            CoreError::NotFound(resource) => ServiceError::NotFound {
                resource,
                id: String::new(),
            },
            CoreError::Conflict(message) => ServiceError::Conflict { message },
            CoreError::DuplicateLike => ServiceError::Conflict {
                message: "already liked".into(),
            },
            CoreError::RateLimited { retry_after_secs } => ServiceError::RateLimitExceeded {
                limit: 0,
                window_seconds: retry_after_secs,
            },
            CoreError::NoCredit { required, available } => {
                ServiceError::NoCredit { required, available }
            }
            CoreError::UpstreamUnavailable(service) => ServiceError::ExternalService {
                service,
                source: Box::new(std::io::Error::new(
                    std::io::ErrorKind::Other,
                    "upstream unavailable",
                )),
            },
            CoreError::Internal(source) => ServiceError::Internal { source },
            CoreError::SelfTarget => ServiceError::InvalidInput {
                message: "cannot target yourself".into(),
                source: None,
            },
            CoreError::RewindExpired => ServiceError::Conflict {
                message: "rewind window expired".into(),
            },
            CoreError::AlreadyMatched => ServiceError::Conflict {
                message: "already matched".into(),
            },
            CoreError::NotInMatch => ServiceError::PermissionDenied {
                action: "message".into(),
                resource: "match".into(),
            },
            CoreError::EmptyMessage => ServiceError::InvalidInput {
                message: "message payload is empty".into(),
                source: None,
            },
            CoreError::ImageNotEnabled => ServiceError::Conflict {
                message: "image sends not enabled on both sides".into(),
            },
            CoreError::ContentBlocked => ServiceError::InvalidInput {
                message: "message blocked by moderation".into(),
                source: None,
            },
            CoreError::NotEnoughMessages => ServiceError::Conflict {
                message: "not enough messages to enable images".into(),
            },
        }
    }
}

impl ResponseError for CoreError {
    fn error_response(&self) -> HttpResponse {
        let service_error: ServiceError = clone_for_response(self);
        service_error.log();
        let body: HttpErrorResponse = service_error.into();
        HttpResponse::build(
            actix_web::http::StatusCode::from_u16(body.status)
                .unwrap_or(actix_web::http::StatusCode::INTERNAL_SERVER_ERROR),
        )
        .json(body)
    }
}

/// `ServiceError` isn't `Clone` (it wraps `anyhow::Error`), so rebuild an
/// equivalent value from the error's own `Display` text for the handful of
/// variants that need it at the response boundary.
fn clone_for_response(err: &CoreError) -> ServiceError {
    match err {
        CoreError::Validation(m) => ServiceError::InvalidInput {
            message: m.clone(),
            source: None,
        },
        CoreError::Unauthenticated => ServiceError::Unauthenticated { source: None },
        CoreError::Forbidden => ServiceError::PermissionDenied {
            action: String::new(),
            resource: String::new(),
        },
        CoreError::NotFound(r) => ServiceError::NotFound {
            resource: r,
            id: String::new(),
        },
        CoreError::Conflict(m) => ServiceError::Conflict { message: m.clone() },
        CoreError::DuplicateLike => ServiceError::Conflict {
            message: "already liked".into(),
        },
        CoreError::RateLimited { retry_after_secs } => ServiceError::RateLimitExceeded {
            limit: 0,
            window_seconds: *retry_after_secs,
        },
        CoreError::NoCredit { required, available } => ServiceError::NoCredit {
            required: *required,
            available: *available,
        },
        CoreError::UpstreamUnavailable(service) => ServiceError::ExternalService {
            service: service.clone(),
            source: Box::new(std::io::Error::new(
                std::io::ErrorKind::Other,
                "upstream unavailable",
            )),
        },
        CoreError::Internal(_) => ServiceError::internal(anyhow::anyhow!("internal error")),
        CoreError::SelfTarget => ServiceError::InvalidInput {
            message: "cannot target yourself".into(),
            source: None,
        },
        CoreError::RewindExpired => ServiceError::Conflict {
            message: "rewind window expired".into(),
        },
        CoreError::AlreadyMatched => ServiceError::Conflict {
            message: "already matched".into(),
        },
        CoreError::NotInMatch => ServiceError::PermissionDenied {
            action: "message".into(),
            resource: "match".into(),
        },
        CoreError::EmptyMessage => ServiceError::InvalidInput {
            message: "message payload is empty".into(),
            source: None,
        },
        CoreError::ImageNotEnabled => ServiceError::Conflict {
            message: "image sends not enabled on both sides".into(),
        },
        CoreError::ContentBlocked => ServiceError::InvalidInput {
            message: "message blocked by moderation".into(),
            source: None,
        },
        CoreError::NotEnoughMessages => ServiceError::Conflict {
            message: "not enough messages to enable images".into(),
        },
    }
}
