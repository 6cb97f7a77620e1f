// Workflow integration connection endpoints.
//
// Each method is one request/response exchange: build the path, hand it to
// the shared HTTP client, decode. Nothing is cached or retried and the cursor
// on a list page is never followed automatically.

use crate::error::Error;
use crate::http::{HttpClient, decode_json};
use crate::PagerDutyClient;

use super::types::{ListConnectionsOptions, ListConnectionsResponse, WorkflowIntegrationConnection};

// ── Paths ────────────────────────────────────────────────────────────

/// Reject identifiers that would produce a malformed or redirected path.
fn check_segment(field: &'static str, value: &str) -> Result<(), Error> {
    if value.is_empty() {
        return Err(Error::InvalidIdentifier {
            field,
            reason: "must not be empty".into(),
        });
    }
    if let Some(c) = value.chars().find(|c| matches!(c, '/' | '\\' | '?' | '#')) {
        return Err(Error::InvalidIdentifier {
            field,
            reason: format!("must not contain {c:?}"),
        });
    }
    if is_dot_segment(value) {
        return Err(Error::InvalidIdentifier {
            field,
            reason: format!("must not be a relative path segment ({value:?})"),
        });
    }
    Ok(())
}

/// `.` or `..`, including the `%2e` spellings URL joining resolves.
fn is_dot_segment(value: &str) -> bool {
    let decoded = value.to_ascii_lowercase().replace("%2e", ".");
    matches!(decoded.as_str(), "." | "..")
}

fn collection_path(integration_id: &str) -> Result<String, Error> {
    check_segment("integration id", integration_id)?;
    Ok(format!("/workflows/integrations/{integration_id}/connections"))
}

fn resource_path(integration_id: &str, connection_id: &str) -> Result<String, Error> {
    let base = collection_path(integration_id)?;
    check_segment("connection id", connection_id)?;
    Ok(format!("{base}/{connection_id}"))
}

fn list_path(integration_id: &str, options: &ListConnectionsOptions) -> Result<String, Error> {
    let path = collection_path(integration_id)?;
    let query = options.to_query();
    if query.is_empty() {
        Ok(path)
    } else {
        Ok(format!("{path}?{query}"))
    }
}

// ── Operations ───────────────────────────────────────────────────────

impl<H: HttpClient> PagerDutyClient<H> {
    /// Fetch one page of an integration's connections.
    ///
    /// Use [`ListConnectionsResponse::next_page`] to build the options for
    /// the following call.
    pub async fn list_connections(
        &self,
        integration_id: &str,
        options: &ListConnectionsOptions,
    ) -> Result<ListConnectionsResponse, Error> {
        let resp = self.http().get(&list_path(integration_id, options)?).await?;
        decode_json(&resp)
    }

    /// Create a connection. `id`, `created_at` and `created_by` on the input
    /// are not sent.
    pub async fn create_connection(
        &self,
        integration_id: &str,
        connection: &WorkflowIntegrationConnection,
    ) -> Result<WorkflowIntegrationConnection, Error> {
        let path = collection_path(integration_id)?;
        let body = connection.without_server_fields();
        let resp = self.http().post(&path, &body).await?;
        decode_json(&resp)
    }

    pub async fn get_connection(
        &self,
        integration_id: &str,
        connection_id: &str,
    ) -> Result<WorkflowIntegrationConnection, Error> {
        let resp = self
            .http()
            .get(&resource_path(integration_id, connection_id)?)
            .await?;
        decode_json(&resp)
    }

    /// Update a connection in place. The target is `connection.id`, which
    /// must be set; otherwise [`Error::MissingConnectionId`] is returned
    /// without sending anything.
    pub async fn update_connection(
        &self,
        integration_id: &str,
        connection: &WorkflowIntegrationConnection,
    ) -> Result<WorkflowIntegrationConnection, Error> {
        let connection_id = connection
            .id
            .as_deref()
            .filter(|id| !id.is_empty())
            .ok_or(Error::MissingConnectionId)?;
        let path = resource_path(integration_id, connection_id)?;
        let resp = self.http().patch(&path, connection).await?;
        decode_json(&resp)
    }

    pub async fn delete_connection(
        &self,
        integration_id: &str,
        connection_id: &str,
    ) -> Result<(), Error> {
        self.http()
            .delete(&resource_path(integration_id, connection_id)?)
            .await?;
        Ok(())
    }
}
