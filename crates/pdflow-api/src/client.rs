// Entry point tying the resource modules to a shared HTTP client.
//
// Endpoint families are implemented as inherent methods in their own
// modules (see `workflows::connections`) so this file stays focused on
// construction.

use crate::auth::Credentials;
use crate::error::Error;
use crate::http::{DEFAULT_BASE_URL, HttpClient, RestClient};
use crate::transport::TransportConfig;

/// Async client for the PagerDuty REST API.
///
/// Generic over the [`HttpClient`] it delegates to; the default is the
/// reqwest-backed [`RestClient`]. Holds no state of its own, so a single
/// instance can be shared across tasks behind an `Arc`.
#[derive(Debug, Clone)]
pub struct PagerDutyClient<H = RestClient> {
    http: H,
}

impl PagerDutyClient<RestClient> {
    /// Client for the production API authenticated with a REST API key.
    pub fn from_api_key(
        api_key: secrecy::SecretString,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        Self::with_base_url(DEFAULT_BASE_URL, &Credentials::ApiToken(api_key), transport)
    }

    /// Client for an arbitrary API root (EU service region, test servers).
    pub fn with_base_url(
        base_url: &str,
        credentials: &Credentials,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        Ok(Self::new(RestClient::new(base_url, credentials, transport)?))
    }
}

impl<H: HttpClient> PagerDutyClient<H> {
    /// Wrap any [`HttpClient`] implementation.
    pub fn new(http: H) -> Self {
        Self { http }
    }

    pub fn http(&self) -> &H {
        &self.http
    }
}
