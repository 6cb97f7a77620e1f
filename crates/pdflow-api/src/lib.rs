// pdflow-api: async Rust client for PagerDuty workflow integration connections

pub mod auth;
pub mod client;
pub mod error;
pub mod http;
pub mod transport;
pub mod workflows;

pub use auth::Credentials;
pub use client::PagerDutyClient;
pub use error::Error;
pub use http::{ApiResponse, DEFAULT_BASE_URL, HttpClient, RestClient, decode_json};
pub use transport::{TlsMode, TransportConfig};
pub use workflows::types::{
    ApiReference, ConnectionHealth, ConnectionTeam, ListConnectionsOptions,
    ListConnectionsResponse, WorkflowIntegrationConnection,
};
