use reqwest::header::HeaderValue;
use secrecy::{ExposeSecret, SecretString};

use crate::Error;

/// Credentials attached to every request as the `Authorization` header.
///
/// Only static header injection lives here; obtaining or refreshing
/// tokens is up to the caller.
#[derive(Debug, Clone)]
pub enum Credentials {
    /// REST API key, sent as `Token token=<key>`.
    ApiToken(SecretString),
    /// OAuth access token obtained elsewhere, sent as `Bearer <token>`.
    Bearer(SecretString),
}

impl Credentials {
    /// Build the sensitive `Authorization` header value.
    pub(crate) fn header_value(&self) -> Result<HeaderValue, Error> {
        let raw = match self {
            Self::ApiToken(key) => format!("Token token={}", key.expose_secret()),
            Self::Bearer(token) => format!("Bearer {}", token.expose_secret()),
        };
        let mut value = HeaderValue::from_str(&raw).map_err(|_| Error::InvalidApiKey)?;
        value.set_sensitive(true);
        Ok(value)
    }
}
