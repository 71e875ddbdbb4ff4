use std::fmt;

use axum::http::StatusCode;

/// Every failure the catalog core can report.
///
/// Each variant maps onto exactly one HTTP status class through
/// [`AppError::status_code`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppError {
    /// Missing or placeholder credentials. Raised before any network call.
    Config(String),
    /// The token endpoint rejected the credentials or returned an unusable token.
    Auth {
        status: Option<u16>,
        reason: String,
    },
    /// Non-2xx from a data endpoint, a transport failure, or a failed aggregation.
    Upstream {
        status: Option<u16>,
        reason: String,
    },
    /// The requested external or local ID does not exist.
    NotFound(String),
    /// Malformed user input.
    BadRequest(String),
    MethodNotAllowed,
    /// Failures inside this service, such as a page that cannot be rendered.
    Internal(String),
}

impl AppError {
    pub fn auth(status: Option<u16>, reason: impl Into<String>) -> Self {
        AppError::Auth {
            status,
            reason: reason.into(),
        }
    }

    pub fn upstream(status: Option<u16>, reason: impl Into<String>) -> Self {
        AppError::Upstream {
            status,
            reason: reason.into(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            AppError::Config(_)
            | AppError::Auth { .. }
            | AppError::Upstream { .. }
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The upstream HTTP status carried by the error, if any.
    pub fn upstream_status(&self) -> Option<u16> {
        match self {
            AppError::Auth { status, .. } | AppError::Upstream { status, .. } => *status,
            _ => None,
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(msg) => write!(f, "configuration error: {}", msg),
            AppError::Auth {
                status: Some(s),
                reason,
            } => write!(f, "spotify authentication failed (status {}): {}", s, reason),
            AppError::Auth {
                status: None,
                reason,
            } => write!(f, "spotify authentication failed: {}", reason),
            AppError::Upstream {
                status: Some(s),
                reason,
            } => write!(f, "upstream request failed (status {}): {}", s, reason),
            AppError::Upstream {
                status: None,
                reason,
            } => write!(f, "upstream request failed: {}", reason),
            AppError::NotFound(what) => write!(f, "not found: {}", what),
            AppError::BadRequest(msg) => write!(f, "bad request: {}", msg),
            AppError::MethodNotAllowed => write!(f, "method not allowed"),
            AppError::Internal(msg) => write!(f, "internal error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        let status = err.status().map(|s| s.as_u16());
        let reason = if err.is_timeout() {
            format!("request timed out: {}", err)
        } else {
            err.to_string()
        };
        AppError::Upstream { status, reason }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::upstream(None, format!("malformed response: {}", err))
    }
}
