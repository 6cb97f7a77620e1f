//! Wire types for `/workflows/integrations/{id}/connections`.
//!
//! Field names are snake_case exactly as the REST API sends them. Optional
//! fields are omitted from request bodies when unset, never sent as `null`.

use std::collections::HashMap;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use serde_json::Value;

// ── Shared references ────────────────────────────────────────────────

/// Reference to another API object (`{ "id": ..., "type": ... }`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiReference {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(rename = "self", default, skip_serializing_if = "Option::is_none")]
    pub self_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html_url: Option<String>,
}

// ── Connections ──────────────────────────────────────────────────────

/// Health of a connection as last probed by the service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionHealth {
    #[serde(default)]
    pub is_healthy: bool,
    #[serde(default)]
    pub health_message: String,
    /// ISO 8601 date-time.
    #[serde(default)]
    pub last_checked_at: String,
}

impl ConnectionHealth {
    /// `last_checked_at` parsed as RFC 3339, if present and well-formed.
    pub fn last_checked(&self) -> Option<DateTime<FixedOffset>> {
        DateTime::parse_from_rfc3339(&self.last_checked_at).ok()
    }
}

/// Team a connection is shared with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionTeam {
    #[serde(default)]
    pub team_id: String,
    #[serde(rename = "type", default)]
    pub kind: String,
}

impl ConnectionTeam {
    pub fn new(team_id: impl Into<String>) -> Self {
        Self {
            team_id: team_id.into(),
            kind: "team_reference".into(),
        }
    }
}

/// A configured link between a workflow integration and an external system.
///
/// `name` is the only field required on create/update. `id`, `created_at`
/// and `created_by` are assigned by the server.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkflowIntegrationConnection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub integration_id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_id_label: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub scopes: Vec<String>,
    /// Tri-state: `None` leaves the server's value alone.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_default: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub health: Option<ConnectionHealth>,
    /// Integration-specific settings; values are arbitrary JSON.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub configuration: HashMap<String, Value>,
    /// Write-only credentials for the external system. The API does not
    /// echo these back.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub secrets: HashMap<String, Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub teams: Vec<ConnectionTeam>,
    /// ISO 8601 date-time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<ApiReference>,
}

impl WorkflowIntegrationConnection {
    /// A connection carrying only the required `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Copy with the server-assigned fields cleared, as sent on create.
    pub fn without_server_fields(&self) -> Self {
        Self {
            id: None,
            created_at: None,
            created_by: None,
            ..self.clone()
        }
    }

    /// `created_at` parsed as RFC 3339, if present and well-formed.
    pub fn created(&self) -> Option<DateTime<FixedOffset>> {
        self.created_at
            .as_deref()
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
    }
}

// ── Listing ──────────────────────────────────────────────────────────

/// Query options for listing connections.
///
/// Unset, zero and empty values are left out of the query string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListConnectionsOptions {
    pub limit: Option<u32>,
    /// Opaque token from a previous page's `next_cursor`.
    pub cursor: Option<String>,
    /// Filter by connection name.
    pub name: Option<String>,
}

impl ListConnectionsOptions {
    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_cursor(mut self, cursor: impl Into<String>) -> Self {
        self.cursor = Some(cursor.into());
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Non-empty parameters in wire order: `limit`, `cursor`, `name`.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::with_capacity(3);
        if let Some(limit) = self.limit.filter(|l| *l > 0) {
            pairs.push(("limit", limit.to_string()));
        }
        if let Some(cursor) = self.cursor.as_deref().filter(|c| !c.is_empty()) {
            pairs.push(("cursor", cursor.to_owned()));
        }
        if let Some(name) = self.name.as_deref().filter(|n| !n.is_empty()) {
            pairs.push(("name", name.to_owned()));
        }
        pairs
    }

    /// URL-encoded query string without the leading `?` (may be empty).
    pub fn to_query(&self) -> String {
        url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.query_pairs())
            .finish()
    }
}

/// One page of connections.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListConnectionsResponse {
    #[serde(default)]
    pub limit: u32,
    /// `None` or empty once the last page has been returned.
    #[serde(default)]
    pub next_cursor: Option<String>,
    #[serde(default)]
    pub connections: Vec<WorkflowIntegrationConnection>,
}

impl ListConnectionsResponse {
    /// Whether the server reported another page.
    pub fn has_more(&self) -> bool {
        self.next_cursor.as_deref().is_some_and(|c| !c.is_empty())
    }

    /// Options for fetching the next page, keeping `limit` and `name` from
    /// `current`. Returns `None` on the last page. Nothing is fetched.
    pub fn next_page(&self, current: &ListConnectionsOptions) -> Option<ListConnectionsOptions> {
        let cursor = self.next_cursor.as_deref().filter(|c| !c.is_empty())?;
        Some(ListConnectionsOptions {
            cursor: Some(cursor.to_owned()),
            ..current.clone()
        })
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn query_omits_unset_and_zero_fields() {
        assert_eq!(ListConnectionsOptions::default().to_query(), "");

        let opts = ListConnectionsOptions {
            limit: Some(0),
            cursor: Some(String::new()),
            name: Some(String::new()),
        };
        assert_eq!(opts.to_query(), "");

        let opts = ListConnectionsOptions::default().with_limit(10).with_name("foo");
        assert_eq!(opts.to_query(), "limit=10&name=foo");
    }

    #[test]
    fn query_encodes_reserved_characters() {
        let opts = ListConnectionsOptions::default()
            .with_cursor("a+b/c==")
            .with_name("Jira & Slack");
        assert_eq!(opts.to_query(), "cursor=a%2Bb%2Fc%3D%3D&name=Jira+%26+Slack");
    }

    #[test]
    fn minimal_connection_serializes_name_only() {
        let value = serde_json::to_value(WorkflowIntegrationConnection::new("Slack")).expect("serialize");
        assert_eq!(value, json!({ "name": "Slack" }));
    }

    #[test]
    fn is_default_false_is_sent() {
        let conn = WorkflowIntegrationConnection {
            is_default: Some(false),
            ..WorkflowIntegrationConnection::new("Slack")
        };
        let value = serde_json::to_value(&conn).expect("serialize");
        assert_eq!(value, json!({ "name": "Slack", "is_default": false }));
    }

    #[test]
    fn full_connection_decodes() {
        let body = json!({
            "id": "PCONN01",
            "type": "workflow_integration_connection",
            "integration_id": "PINT001",
            "name": "Production Slack",
            "service_url": "https://slack.com",
            "external_id": "T0123",
            "external_id_label": "Workspace",
            "scopes": ["chat:write", "channels:read"],
            "is_default": true,
            "health": {
                "is_healthy": false,
                "health_message": "token revoked",
                "last_checked_at": "2024-06-15T10:30:00Z"
            },
            "configuration": { "channel": "#ops", "retries": 3, "nested": { "on": true } },
            "teams": [{ "team_id": "PTEAM01", "type": "team_reference" }],
            "created_at": "2024-06-01T08:00:00Z",
            "created_by": { "id": "PUSER01", "type": "user_reference" }
        });

        let conn: WorkflowIntegrationConnection = serde_json::from_value(body).expect("decode");

        assert_eq!(conn.id.as_deref(), Some("PCONN01"));
        assert_eq!(conn.kind.as_deref(), Some("workflow_integration_connection"));
        assert_eq!(conn.scopes, vec!["chat:write", "channels:read"]);
        assert_eq!(conn.is_default, Some(true));
        let health = conn.health.as_ref().expect("health");
        assert!(!health.is_healthy);
        assert!(health.last_checked().is_some());
        assert_eq!(conn.configuration["retries"], json!(3));
        assert_eq!(conn.configuration["nested"], json!({ "on": true }));
        assert!(conn.secrets.is_empty());
        assert_eq!(conn.teams, vec![ConnectionTeam::new("PTEAM01")]);
        assert!(conn.created().is_some());
        assert_eq!(
            conn.created_by.as_ref().map(|r| r.kind.as_str()),
            Some("user_reference")
        );
    }

    #[test]
    fn sparse_references_decode_to_empty_strings() {
        let body = json!({
            "id": "PCONN01",
            "teams": [{ "team_id": "PTEAM01" }],
            "created_by": { "id": "PUSER01" }
        });

        let conn: WorkflowIntegrationConnection = serde_json::from_value(body).expect("decode");

        assert_eq!(conn.name, "");
        assert_eq!(conn.teams[0].team_id, "PTEAM01");
        assert_eq!(conn.teams[0].kind, "");
        let creator = conn.created_by.expect("created_by");
        assert_eq!(creator.id, "PUSER01");
        assert_eq!(creator.kind, "");
    }

    #[test]
    fn create_body_drops_server_fields() {
        let conn = WorkflowIntegrationConnection {
            id: Some("PCONN01".into()),
            created_at: Some("2024-06-01T08:00:00Z".into()),
            service_url: Some("https://slack.com".into()),
            ..WorkflowIntegrationConnection::new("Slack")
        };
        let value = serde_json::to_value(conn.without_server_fields()).expect("serialize");
        assert_eq!(value, json!({ "name": "Slack", "service_url": "https://slack.com" }));
    }

    #[test]
    fn next_page_carries_cursor_and_filters() {
        let current = ListConnectionsOptions::default().with_limit(25).with_name("slack");
        let page = ListConnectionsResponse {
            limit: 25,
            next_cursor: Some("abc".into()),
            connections: Vec::new(),
        };

        assert!(page.has_more());
        let next = page.next_page(&current).expect("more pages");
        assert_eq!(next.to_query(), "limit=25&cursor=abc&name=slack");
    }

    #[test]
    fn last_page_has_no_next() {
        let null_cursor: ListConnectionsResponse =
            serde_json::from_value(json!({ "limit": 25, "next_cursor": null, "connections": [] }))
                .expect("decode");
        let empty_cursor: ListConnectionsResponse =
            serde_json::from_value(json!({ "limit": 25, "next_cursor": "", "connections": [] }))
                .expect("decode");

        for page in [null_cursor, empty_cursor] {
            assert!(!page.has_more());
            assert_eq!(page.next_page(&ListConnectionsOptions::default()), None);
        }
    }
}
