use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Failure of a single call to a third-party service.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("{0} API key not configured")]
    MissingCredential(&'static str),
    #[error("upstream rejected credentials ({status}): {body}")]
    Unauthorized { status: StatusCode, body: String },
    #[error("upstream quota exceeded: {body}")]
    RateLimited { body: String },
    #[error("upstream could not process the request: {body}")]
    Unprocessable { body: String },
    #[error("upstream error ({status}): {body}")]
    Status { status: StatusCode, body: String },
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("unexpected upstream payload: {0}")]
    Decode(String),
}

impl UpstreamError {
    /// Classifies a non-success upstream response.
    pub fn from_status(status: StatusCode, body: String) -> Self {
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Self::Unauthorized { status, body },
            StatusCode::TOO_MANY_REQUESTS => Self::RateLimited { body },
            StatusCode::UNPROCESSABLE_ENTITY => Self::Unprocessable { body },
            _ => Self::Status { status, body },
        }
    }

    /// Status returned by the upstream, if it answered at all.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Unauthorized { status, .. } | Self::Status { status, .. } => Some(*status),
            Self::RateLimited { .. } => Some(StatusCode::TOO_MANY_REQUESTS),
            Self::Unprocessable { .. } => Some(StatusCode::UNPROCESSABLE_ENTITY),
            _ => None,
        }
    }

    pub fn body(&self) -> Option<&str> {
        match self {
            Self::Unauthorized { body, .. }
            | Self::RateLimited { body }
            | Self::Unprocessable { body }
            | Self::Status { body, .. } => Some(body),
            _ => None,
        }
    }

    /// Case-insensitive search over the rendered error and upstream body.
    pub fn mentions(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        self.to_string().to_lowercase().contains(&needle)
    }
}

/// `"API error: 404 Not Found"`
pub fn status_line(status: StatusCode) -> String {
    format!(
        "API error: {} {}",
        status.as_u16(),
        status.canonical_reason().unwrap_or_default()
    )
    .trim_end()
    .to_string()
}

/// Error returned by the HTTP routes.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    NotConfigured(String),
    #[error("{message}")]
    Upstream {
        status: StatusCode,
        message: String,
        details: Option<String>,
    },
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Internal(String),
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotConfigured(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Upstream { status, .. } => *status,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let details = match &self {
            Self::Upstream { details, .. } => details.clone(),
            _ => None,
        };
        let body = ErrorBody {
            error: self.to_string(),
            details,
        };
        (status, Json(body)).into_response()
    }
}

/// Unreadable JSON bodies answer with the usual `{error}` payload.
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}
