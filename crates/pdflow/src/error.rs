//! CLI error types with miette diagnostics.
//!
//! Maps `pdflow_api::Error` variants into user-facing errors with actionable
//! help text and stable exit codes.

use miette::Diagnostic;
use thiserror::Error;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const PERMISSION: i32 = 5;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
    pub const RATE_LIMITED: i32 = 9;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not reach the PagerDuty API")]
    #[diagnostic(
        code(pdflow::connection_failed),
        help("Check network access and the API URL (--api-url or the profile's api_url).")
    )]
    ConnectionFailed {
        #[source]
        source: pdflow_api::Error,
    },

    #[error("Request timed out after {timeout_secs}s")]
    #[diagnostic(code(pdflow::timeout), help("Raise the limit with --timeout <SECONDS>."))]
    Timeout { timeout_secs: u64 },

    #[error("TLS error: {message}")]
    #[diagnostic(
        code(pdflow::tls_error),
        help("Configure ca_cert in your profile, or use --insecure (-k) against test servers.")
    )]
    Tls { message: String },

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed")]
    #[diagnostic(
        code(pdflow::auth_failed),
        help("Verify your API key (--api-key, PDFLOW_API_KEY, or the profile's api_key).")
    )]
    AuthFailed,

    #[error("Permission denied: {message}")]
    #[diagnostic(
        code(pdflow::permission_denied),
        help("The API key is valid but cannot access this resource.")
    )]
    PermissionDenied { message: String },

    #[error("No API key configured for profile '{profile}'")]
    #[diagnostic(
        code(pdflow::no_credentials),
        help(
            "Configure a profile with: pdflow config init --key <KEY>\n\
             Or set the PDFLOW_API_KEY environment variable."
        )
    )]
    NoCredentials { profile: String },

    // ── API ──────────────────────────────────────────────────────────
    #[error("Not found: {message}")]
    #[diagnostic(
        code(pdflow::not_found),
        help("Run: pdflow connections list <INTEGRATION> to see available connections")
    )]
    NotFound { message: String },

    #[error("Rate limited by the API")]
    #[diagnostic(code(pdflow::rate_limited), help("{hint}"))]
    RateLimited { hint: String },

    #[error("API error (HTTP {status}): {message}")]
    #[diagnostic(code(pdflow::api_error), help("{details}"))]
    Api {
        status: u16,
        message: String,
        details: String,
    },

    #[error("Unexpected response from the API")]
    #[diagnostic(code(pdflow::decode_error))]
    Decode {
        #[source]
        source: pdflow_api::Error,
    },

    // ── Input ────────────────────────────────────────────────────────
    #[error("Invalid {field}: {reason}")]
    #[diagnostic(code(pdflow::validation))]
    Validation { field: String, reason: String },

    #[error(transparent)]
    #[diagnostic(code(pdflow::config))]
    Config(#[from] pdflow_config::ConfigError),

    #[error("Failed to render output: {0}")]
    #[diagnostic(code(pdflow::output))]
    Output(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON payload: {0}")]
    #[diagnostic(code(pdflow::json), help("Check the JSON file contents and try again."))]
    Json(#[from] serde_json::Error),
}

impl CliError {
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } | Self::Tls { .. } => exit_code::CONNECTION,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::AuthFailed | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::PermissionDenied { .. } => exit_code::PERMISSION,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::RateLimited { .. } => exit_code::RATE_LIMITED,
            Self::Validation { .. } | Self::Json(_) => exit_code::USAGE,
            Self::Api { .. }
            | Self::Decode { .. }
            | Self::Config(_)
            | Self::Output(_)
            | Self::Io(_) => exit_code::GENERAL,
        }
    }
}

impl From<pdflow_api::Error> for CliError {
    fn from(err: pdflow_api::Error) -> Self {
        use pdflow_api::Error as Api;

        if err.is_not_found() {
            return Self::NotFound {
                message: err.to_string(),
            };
        }

        match err {
            Api::InvalidApiKey => Self::AuthFailed,
            Api::Forbidden { message } => Self::PermissionDenied { message },
            Api::Timeout { timeout_secs } => Self::Timeout { timeout_secs },
            Api::Tls(message) => Self::Tls { message },
            Api::RateLimited { reset_secs } => Self::RateLimited {
                hint: reset_secs.map_or_else(
                    || "Wait a moment and try again.".to_owned(),
                    |s| format!("The limit resets in {s}s."),
                ),
            },
            Api::Api {
                status,
                message,
                errors,
                ..
            } => Self::Api {
                status,
                message,
                details: errors.join("\n"),
            },
            Api::InvalidIdentifier { field, reason } => Self::Validation {
                field: field.into(),
                reason,
            },
            Api::MissingConnectionId => Self::Validation {
                field: "connection".into(),
                reason: "a connection ID is required".into(),
            },
            Api::InvalidUrl(e) => Self::Validation {
                field: "api_url".into(),
                reason: e.to_string(),
            },
            source @ Api::Transport(_) => Self::ConnectionFailed { source },
            source @ (Api::Deserialization { .. } | Api::Serialization(_)) => {
                Self::Decode { source }
            }
        }
    }
}
