use thiserror::Error;

/// Top-level error type for the `pdflow-api` crate.
///
/// Covers request construction, the shared HTTP client (transport and
/// non-2xx statuses), and response decoding. Operations never retry or
/// recover locally; every variant reaches the caller unchanged.
#[derive(Debug, Error)]
pub enum Error {
    // ── Request construction ────────────────────────────────────────
    /// A path identifier was empty or contained a reserved URL character.
    #[error("Invalid {field}: {reason}")]
    InvalidIdentifier { field: &'static str, reason: String },

    /// Update was called with a connection that carries no `id`.
    #[error("Connection id is required to update a connection")]
    MissingConnectionId,

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ── Authentication ──────────────────────────────────────────────
    /// API token rejected (HTTP 401).
    #[error("Invalid API token")]
    InvalidApiKey,

    /// Token is valid but lacks access to the resource (HTTP 403).
    #[error("Forbidden: {message}")]
    Forbidden { message: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[source] reqwest::Error),

    /// Request timed out.
    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    /// TLS setup or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    /// Rate limited by the API. Surfaced as-is; nothing here waits or retries.
    #[error("Rate limited{}", reset_suffix(.reset_secs))]
    RateLimited { reset_secs: Option<u64> },

    // ── API ─────────────────────────────────────────────────────────
    /// Structured error from the REST API (any other non-2xx status).
    #[error("API error (HTTP {status}): {message}")]
    Api {
        status: u16,
        message: String,
        code: Option<i64>,
        errors: Vec<String>,
    },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },

    /// Request body could not be serialized.
    #[error("Serialization error: {0}")]
    Serialization(#[source] serde_json::Error),
}

fn reset_suffix(reset_secs: &Option<u64>) -> String {
    reset_secs.map_or_else(String::new, |s| format!(" -- limit resets in {s}s"))
}

impl Error {
    /// Returns `true` if this is a "not found" error.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Transport(e) => e.status() == Some(reqwest::StatusCode::NOT_FOUND),
            Self::Api { status: 404, .. } => true,
            _ => false,
        }
    }

    /// Returns `true` if this is a transient error a caller may choose to retry.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Timeout { .. } | Self::RateLimited { .. } => true,
            Self::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Extract the numeric API error code, if available.
    pub fn api_error_code(&self) -> Option<i64> {
        match self {
            Self::Api { code, .. } => *code,
            _ => None,
        }
    }
}
