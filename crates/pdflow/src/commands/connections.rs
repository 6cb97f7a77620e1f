//! Connection command handlers.

use owo_colors::OwoColorize;
use tabled::Tabled;

use pdflow_api::{ListConnectionsOptions, PagerDutyClient, WorkflowIntegrationConnection};

use crate::cli::{ConnectionsArgs, ConnectionsCommand, GlobalOpts, OutputFormat};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct ConnectionRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Default")]
    default: String,
    #[tabled(rename = "Health")]
    health: String,
    #[tabled(rename = "Service URL")]
    service_url: String,
}

impl From<&WorkflowIntegrationConnection> for ConnectionRow {
    fn from(c: &WorkflowIntegrationConnection) -> Self {
        Self {
            id: c.id.clone().unwrap_or_default(),
            name: c.name.clone(),
            default: c.is_default.map(|d| d.to_string()).unwrap_or_default(),
            health: health_label(c).to_owned(),
            service_url: c.service_url.clone().unwrap_or_default(),
        }
    }
}

fn health_label(c: &WorkflowIntegrationConnection) -> &'static str {
    match c.health {
        Some(ref h) if h.is_healthy => "healthy",
        Some(_) => "unhealthy",
        None => "",
    }
}

fn connection_id(c: &WorkflowIntegrationConnection) -> String {
    c.id.clone().unwrap_or_default()
}

// ── Detail view ─────────────────────────────────────────────────────

fn detail(c: &WorkflowIntegrationConnection, color: bool) -> String {
    let mut lines = Vec::new();
    let mut field = |label: &str, value: &str| {
        if !value.is_empty() {
            lines.push(format!("{label:<18} {value}"));
        }
    };

    field("ID", c.id.as_deref().unwrap_or_default());
    field("Name", &c.name);
    field("Type", c.kind.as_deref().unwrap_or_default());
    field("Integration", c.integration_id.as_deref().unwrap_or_default());
    field("Service URL", c.service_url.as_deref().unwrap_or_default());
    field("External ID", c.external_id.as_deref().unwrap_or_default());
    field("External Label", c.external_id_label.as_deref().unwrap_or_default());
    field("Scopes", &c.scopes.join(", "));
    field(
        "Default",
        &c.is_default.map(|d| d.to_string()).unwrap_or_default(),
    );

    if let Some(ref h) = c.health {
        let label = health_label(c);
        let status = match (color, h.is_healthy) {
            (false, _) => label.to_owned(),
            (true, true) => label.green().to_string(),
            (true, false) => label.red().to_string(),
        };
        field("Health", &status);
        field("Health Message", &h.health_message);
        let checked = h
            .last_checked()
            .map_or_else(|| h.last_checked_at.clone(), |t| t.to_rfc2822());
        field("Last Checked", &checked);
    }

    let mut config_keys: Vec<&str> = c.configuration.keys().map(String::as_str).collect();
    config_keys.sort_unstable();
    field("Configuration", &config_keys.join(", "));

    let teams: Vec<&str> = c.teams.iter().map(|t| t.team_id.as_str()).collect();
    field("Teams", &teams.join(", "));

    let created = c
        .created()
        .map(|t| t.to_rfc2822())
        .or_else(|| c.created_at.clone())
        .unwrap_or_default();
    field("Created", &created);
    field(
        "Created By",
        c.created_by.as_ref().map(|r| r.id.as_str()).unwrap_or_default(),
    );

    lines.join("\n")
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    client: &PagerDutyClient,
    args: ConnectionsArgs,
    format: &OutputFormat,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let color = output::should_color(&global.color);

    match args.command {
        ConnectionsCommand::List {
            integration,
            limit,
            cursor,
            name,
        } => {
            let opts = ListConnectionsOptions {
                limit,
                cursor,
                name,
            };
            let page = client.list_connections(&integration, &opts).await?;
            let out = output::render_list(
                format,
                &page.connections,
                |c| ConnectionRow::from(c),
                connection_id,
            )?;
            output::print_output(&out, global.quiet);

            if let Some(cursor) = page.next_cursor.as_deref().filter(|_| page.has_more()) {
                output::print_status(&format!("More results: --cursor {cursor}"), global.quiet);
            }
            Ok(())
        }

        ConnectionsCommand::Get {
            integration,
            connection,
        } => {
            let conn = client.get_connection(&integration, &connection).await?;
            let out = output::render_single(
                format,
                &conn,
                |c| detail(c, color),
                connection_id,
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConnectionsCommand::Create { integration, spec } => {
            let body = util::build_connection(&spec)?;
            let created = client.create_connection(&integration, &body).await?;
            let out = output::render_single(
                format,
                &created,
                |c| detail(c, color),
                connection_id,
            )?;
            output::print_output(&out, global.quiet);
            output::print_status("Connection created", global.quiet);
            Ok(())
        }

        ConnectionsCommand::Update {
            integration,
            connection,
            spec,
        } => {
            let mut body = util::build_connection(&spec)?;
            body.id = Some(connection);
            let updated = client.update_connection(&integration, &body).await?;
            let out = output::render_single(
                format,
                &updated,
                |c| detail(c, color),
                connection_id,
            )?;
            output::print_output(&out, global.quiet);
            output::print_status("Connection updated", global.quiet);
            Ok(())
        }

        ConnectionsCommand::Delete {
            integration,
            connection,
        } => {
            client.delete_connection(&integration, &connection).await?;
            output::print_status("Connection deleted", global.quiet);
            Ok(())
        }
    }
}
