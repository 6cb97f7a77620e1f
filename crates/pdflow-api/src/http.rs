// Shared HTTP client boundary.
//
// Resource modules only see the `HttpClient` trait: four verbs that return a
// raw successful response, plus `decode_json`. `RestClient` is the
// reqwest-backed implementation; status-code interpretation lives here and
// nowhere else.

use std::future::Future;

use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, trace, warn};
use url::Url;

use crate::auth::Credentials;
use crate::error::Error;
use crate::transport::TransportConfig;

/// Production REST API root.
pub const DEFAULT_BASE_URL: &str = "https://api.pagerduty.com/";

// ── Error response shape from the REST API ───────────────────────────

#[derive(serde::Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(serde::Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    code: Option<i64>,
    #[serde(default)]
    errors: Vec<String>,
}

// ── Raw response ─────────────────────────────────────────────────────

/// A successful (2xx) response body, not yet decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// Decode a response body into `T`.
///
/// On failure the error keeps the full body and a short preview in the
/// message.
pub fn decode_json<T: DeserializeOwned>(resp: &ApiResponse) -> Result<T, Error> {
    serde_json::from_str(&resp.body).map_err(|e| {
        let preview: String = resp.body.chars().take(200).collect();
        Error::Deserialization {
            message: format!("{e} (body preview: {preview:?})"),
            body: resp.body.clone(),
        }
    })
}

// ── Trait ────────────────────────────────────────────────────────────

/// The four verbs every resource module is written against.
///
/// Paths are absolute API paths (`/workflows/...`), optionally carrying an
/// already-encoded query string. Implementations turn non-2xx statuses into
/// errors, so an `Ok` response is always a success. Implementations must be
/// safe to share between tasks.
pub trait HttpClient: Send + Sync {
    fn get(&self, path: &str) -> impl Future<Output = Result<ApiResponse, Error>> + Send;

    fn post<B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> impl Future<Output = Result<ApiResponse, Error>> + Send;

    fn patch<B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> impl Future<Output = Result<ApiResponse, Error>> + Send;

    fn delete(&self, path: &str) -> impl Future<Output = Result<ApiResponse, Error>> + Send;
}

// ── reqwest implementation ───────────────────────────────────────────

/// reqwest-backed [`HttpClient`] for the PagerDuty REST API.
#[derive(Debug, Clone)]
pub struct RestClient {
    http: reqwest::Client,
    base_url: Url,
    timeout_secs: u64,
}

impl RestClient {
    /// Build from credentials and transport config.
    ///
    /// Injects `Authorization` and the v2 `Accept` header on every request.
    pub fn new(
        base_url: &str,
        credentials: &Credentials,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let http = transport.build_client(Some(credentials))?;
        Ok(Self {
            http,
            base_url: Self::normalize_base_url(base_url)?,
            timeout_secs: transport.timeout.as_secs(),
        })
    }

    /// Wrap an existing `reqwest::Client` (caller manages auth headers).
    pub fn from_reqwest(base_url: &str, http: reqwest::Client) -> Result<Self, Error> {
        Ok(Self {
            http,
            base_url: Self::normalize_base_url(base_url)?,
            timeout_secs: TransportConfig::default().timeout.as_secs(),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Ensure the base path ends with `/` so relative joins append.
    fn normalize_base_url(raw: &str) -> Result<Url, Error> {
        let mut url = Url::parse(raw)?;
        let path = url.path().trim_end_matches('/').to_owned();
        url.set_path(&format!("{path}/"));
        Ok(url)
    }

    // ── URL builder ──────────────────────────────────────────────────

    /// Join an API path (leading `/` optional, query allowed) onto the base URL.
    fn url(&self, path: &str) -> Result<Url, Error> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }

    // ── Response handling ────────────────────────────────────────────

    fn transport_error(&self, err: reqwest::Error) -> Error {
        if err.is_timeout() {
            Error::Timeout {
                timeout_secs: self.timeout_secs,
            }
        } else {
            Error::Transport(err)
        }
    }

    async fn send(&self, req: reqwest::RequestBuilder) -> Result<ApiResponse, Error> {
        let resp = req.send().await.map_err(|e| self.transport_error(e))?;
        let status = resp.status();
        let headers = resp.headers().clone();
        let body = resp.text().await.map_err(|e| self.transport_error(e))?;
        trace!(status = status.as_u16(), bytes = body.len(), "response received");

        if status.is_success() {
            Ok(ApiResponse::new(status.as_u16(), body))
        } else {
            Err(parse_error(status, &headers, body))
        }
    }
}

/// Encode a request body as JSON.
fn encode_body<B: Serialize>(body: &B) -> Result<Vec<u8>, Error> {
    serde_json::to_vec(body).map_err(Error::Serialization)
}

fn json_content_type() -> HeaderValue {
    HeaderValue::from_static("application/json")
}

fn parse_error(status: reqwest::StatusCode, headers: &HeaderMap, raw: String) -> Error {
    let envelope = serde_json::from_str::<ErrorEnvelope>(&raw).ok();

    match status.as_u16() {
        401 => Error::InvalidApiKey,
        403 => Error::Forbidden {
            message: envelope
                .and_then(|e| e.error.message)
                .unwrap_or_else(|| status.to_string()),
        },
        429 => {
            let reset_secs = headers
                .get("ratelimit-reset")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse().ok());
            warn!(?reset_secs, "rate limited by API");
            Error::RateLimited { reset_secs }
        }
        code => match envelope {
            Some(ErrorEnvelope { error }) => Error::Api {
                status: code,
                message: error.message.unwrap_or_else(|| status.to_string()),
                code: error.code,
                errors: error.errors,
            },
            None => Error::Api {
                status: code,
                message: if raw.is_empty() { status.to_string() } else { raw },
                code: None,
                errors: Vec::new(),
            },
        },
    }
}

impl HttpClient for RestClient {
    async fn get(&self, path: &str) -> Result<ApiResponse, Error> {
        let url = self.url(path)?;
        debug!("GET {url}");
        self.send(self.http.get(url)).await
    }

    async fn post<B: Serialize + Sync>(&self, path: &str, body: &B) -> Result<ApiResponse, Error> {
        let url = self.url(path)?;
        let body = encode_body(body)?;
        debug!("POST {url}");
        self.send(self.http.post(url).header(CONTENT_TYPE, json_content_type()).body(body))
            .await
    }

    async fn patch<B: Serialize + Sync>(&self, path: &str, body: &B) -> Result<ApiResponse, Error> {
        let url = self.url(path)?;
        let body = encode_body(body)?;
        debug!("PATCH {url}");
        self.send(self.http.patch(url).header(CONTENT_TYPE, json_content_type()).body(body))
            .await
    }

    async fn delete(&self, path: &str) -> Result<ApiResponse, Error> {
        let url = self.url(path)?;
        debug!("DELETE {url}");
        self.send(self.http.delete(url)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, serde::Deserialize)]
    struct Named {
        name: String,
    }

    #[test]
    fn base_url_gets_trailing_slash() {
        let client =
            RestClient::from_reqwest("https://api.pagerduty.com", reqwest::Client::new())
                .expect("valid url");
        assert_eq!(client.base_url().as_str(), "https://api.pagerduty.com/");

        let nested = RestClient::from_reqwest("http://127.0.0.1:8080/pd/", reqwest::Client::new())
            .expect("valid url");
        assert_eq!(nested.base_url().as_str(), "http://127.0.0.1:8080/pd/");
    }

    #[test]
    fn url_keeps_base_path_and_query() {
        let client = RestClient::from_reqwest("http://127.0.0.1:8080/pd", reqwest::Client::new())
            .expect("valid url");
        let url = client
            .url("/workflows/integrations/INT1/connections?limit=10")
            .expect("joinable path");
        assert_eq!(
            url.as_str(),
            "http://127.0.0.1:8080/pd/workflows/integrations/INT1/connections?limit=10"
        );
    }

    #[test]
    fn decode_json_success() {
        let resp = ApiResponse::new(200, r#"{"name":"Slack"}"#);
        let named: Named = decode_json(&resp).expect("valid json");
        assert_eq!(named.name, "Slack");
    }

    #[test]
    fn decode_json_keeps_body_on_failure() {
        let resp = ApiResponse::new(200, "<html>gateway</html>");
        let err = decode_json::<Named>(&resp).expect_err("not json");
        match err {
            Error::Deserialization { message, body } => {
                assert!(message.contains("body preview"));
                assert_eq!(body, "<html>gateway</html>");
            }
            other => panic!("expected Deserialization, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn unencodable_body_fails_before_sending() {
        use std::collections::BTreeMap;

        // JSON object keys must be strings.
        let body: BTreeMap<(u8, u8), u8> = BTreeMap::from([((1, 2), 3)]);
        let client = RestClient::from_reqwest("http://127.0.0.1:9/", reqwest::Client::new())
            .expect("valid url");

        let err = client.post("/workflows", &body).await.expect_err("tuple keys");
        assert!(matches!(err, Error::Serialization(_)), "got {err:?}");

        let err = client.patch("/workflows", &body).await.expect_err("tuple keys");
        assert!(matches!(err, Error::Serialization(_)), "got {err:?}");
    }

    #[test]
    fn parse_error_envelope() {
        let raw = r#"{"error":{"message":"Invalid Input Provided","code":2001,"errors":["Name cannot be empty."]}}"#;
        let err = parse_error(
            reqwest::StatusCode::BAD_REQUEST,
            &HeaderMap::new(),
            raw.to_owned(),
        );
        match err {
            Error::Api {
                status,
                message,
                code,
                errors,
            } => {
                assert_eq!(status, 400);
                assert_eq!(message, "Invalid Input Provided");
                assert_eq!(code, Some(2001));
                assert_eq!(errors, vec!["Name cannot be empty.".to_owned()]);
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[test]
    fn parse_error_plain_body_and_status_mapping() {
        let err = parse_error(
            reqwest::StatusCode::BAD_GATEWAY,
            &HeaderMap::new(),
            "upstream down".to_owned(),
        );
        assert!(matches!(err, Error::Api { status: 502, ref message, code: None, .. } if message == "upstream down"));

        let err = parse_error(reqwest::StatusCode::UNAUTHORIZED, &HeaderMap::new(), String::new());
        assert!(matches!(err, Error::InvalidApiKey));

        let mut headers = HeaderMap::new();
        headers.insert("ratelimit-reset", reqwest::header::HeaderValue::from_static("7"));
        let err = parse_error(reqwest::StatusCode::TOO_MANY_REQUESTS, &headers, String::new());
        assert!(matches!(err, Error::RateLimited { reset_secs: Some(7) }));
    }
}
