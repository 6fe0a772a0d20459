//! Typed-error-to-status-code mapping (spec §7).
//!
//! Internal error details go to logs; clients see a documented status code
//! and a safe message only.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use rag_agent::AgentError;
use rag_cache::CacheError;
use rag_embed::EmbedError;
use rag_retrieve::RetrieveError;
use rag_store::StoreError;
use serde::Serialize;
use tracing::{debug, error, warn};

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    retry_after_secs: Option<u64>,
}

/// The HTTP surface's single error type: every handler returns
/// `Result<_, HttpError>` and this converts to a response via
/// [`IntoResponse`].
#[derive(Debug)]
pub struct HttpError {
    status: StatusCode,
    message: String,
    retry_after_secs: Option<u64>,
}

impl HttpError {
    #[must_use]
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            retry_after_secs: None,
        }
    }

    #[must_use]
    pub const fn not_found(message: String) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message,
            retry_after_secs: None,
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.message,
            retry_after_secs: self.retry_after_secs,
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<RetrieveError> for HttpError {
    fn from(err: RetrieveError) -> Self {
        match err {
            RetrieveError::Validation(msg) => Self::new(StatusCode::BAD_REQUEST, msg),
            RetrieveError::Store(e) => e.into(),
            RetrieveError::Cache(e) => e.into(),
            RetrieveError::Embed(e) => e.into(),
        }
    }
}

impl From<StoreError> for HttpError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(msg) => Self::not_found(msg),
            StoreError::Validation(msg) => Self::new(StatusCode::BAD_REQUEST, msg),
            StoreError::DimensionMismatch { expected, actual } => {
                error!(expected, actual, "dimension mismatch reached the store layer");
                Self::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal error".to_string(),
                )
            }
            StoreError::UnknownProvider(p) => {
                Self::new(StatusCode::BAD_REQUEST, format!("unknown provider: {p}"))
            }
            StoreError::StoreUnavailable(msg) => {
                warn!(error = %msg, "store unavailable");
                let mut e = Self::new(StatusCode::SERVICE_UNAVAILABLE, "store unavailable".to_string());
                e.retry_after_secs = Some(5);
                e
            }
        }
    }
}

impl From<CacheError> for HttpError {
    fn from(err: CacheError) -> Self {
        warn!(error = %err, "cache layer error");
        let mut e = Self::new(StatusCode::SERVICE_UNAVAILABLE, "cache unavailable".to_string());
        e.retry_after_secs = Some(1);
        e
    }
}

impl From<EmbedError> for HttpError {
    fn from(err: EmbedError) -> Self {
        match err {
            EmbedError::InvalidInput(msg) => Self::new(StatusCode::BAD_REQUEST, msg),
            EmbedError::RateLimited => {
                warn!("embedding provider rate limit exhausted retries");
                let mut e = Self::new(
                    StatusCode::SERVICE_UNAVAILABLE,
                    "embedding provider unavailable".to_string(),
                );
                e.retry_after_secs = Some(2);
                e
            }
            EmbedError::Upstream(msg) => {
                warn!(error = %msg, "embedding provider upstream error");
                Self::new(StatusCode::BAD_GATEWAY, "embedding provider error".to_string())
            }
            EmbedError::Cancelled => {
                debug!("embedding call cancelled");
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, "request cancelled".to_string())
            }
            EmbedError::ClientClosed => {
                error!("embedding client used after close()");
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, "internal error".to_string())
            }
        }
    }
}

impl From<AgentError> for HttpError {
    fn from(err: AgentError) -> Self {
        match err {
            AgentError::Cancelled => {
                debug!("turn cancelled");
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, "request cancelled".to_string())
            }
            AgentError::Timeout(msg) => {
                warn!(reason = %msg, "turn exceeded its deadline");
                let mut e = Self::new(StatusCode::SERVICE_UNAVAILABLE, "request timed out".to_string());
                e.retry_after_secs = Some(5);
                e
            }
            AgentError::ToolBudgetExceeded { .. } | AgentError::UnknownTool(_) | AgentError::InvalidArguments { .. } => {
                Self::new(StatusCode::BAD_REQUEST, err.to_string())
            }
            AgentError::SessionNotFound(id) => Self::not_found(format!("session not found: {id}")),
            AgentError::Llm(msg) => {
                warn!(error = %msg, "LLM provider error");
                Self::new(StatusCode::BAD_GATEWAY, "LLM provider error".to_string())
            }
            AgentError::Retrieve(e) => e.into(),
            AgentError::Store(e) => e.into(),
        }
    }
}
