//! Shared helpers for command handlers.

use std::path::Path;

use serde_json::Value;

use pdflow_api::{ConnectionTeam, WorkflowIntegrationConnection};

use crate::cli::ConnectionSpec;
use crate::error::CliError;

/// Read and parse a JSON file for `--from-file` flags.
pub fn read_json_file<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, CliError> {
    let contents = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&contents)?)
}

/// Split `KEY=VALUE`; VALUE becomes JSON when it parses as JSON, else a string.
pub fn parse_key_value(field: &str, raw: &str) -> Result<(String, Value), CliError> {
    let (key, value) = raw.split_once('=').ok_or_else(|| CliError::Validation {
        field: field.into(),
        reason: format!("expected KEY=VALUE, got '{raw}'"),
    })?;
    if key.is_empty() {
        return Err(CliError::Validation {
            field: field.into(),
            reason: format!("empty key in '{raw}'"),
        });
    }
    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_owned()));
    Ok((key.to_owned(), value))
}

/// Assemble a connection body from `--from-file` plus flag overrides.
///
/// The result always has a non-empty `name`.
pub fn build_connection(spec: &ConnectionSpec) -> Result<WorkflowIntegrationConnection, CliError> {
    let mut conn = match spec.from_file {
        Some(ref path) => read_json_file::<WorkflowIntegrationConnection>(path)?,
        None => WorkflowIntegrationConnection::default(),
    };

    if let Some(ref name) = spec.name {
        conn.name.clone_from(name);
    }
    if spec.service_url.is_some() {
        conn.service_url.clone_from(&spec.service_url);
    }
    if spec.external_id.is_some() {
        conn.external_id.clone_from(&spec.external_id);
    }
    if spec.external_id_label.is_some() {
        conn.external_id_label.clone_from(&spec.external_id_label);
    }
    if !spec.scopes.is_empty() {
        conn.scopes.clone_from(&spec.scopes);
    }
    if spec.default.is_some() {
        conn.is_default = spec.default;
    }
    if !spec.teams.is_empty() {
        conn.teams = spec.teams.iter().map(ConnectionTeam::new).collect();
    }
    for raw in &spec.configuration {
        let (key, value) = parse_key_value("config", raw)?;
        conn.configuration.insert(key, value);
    }
    for raw in &spec.secrets {
        let (key, value) = parse_key_value("secret", raw)?;
        conn.secrets.insert(key, value);
    }

    if conn.name.trim().is_empty() {
        return Err(CliError::Validation {
            field: "name".into(),
            reason: "a connection name is required (--name or \"name\" in --from-file)".into(),
        });
    }
    Ok(conn)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn key_value_parses_json_or_string() {
        assert_eq!(
            parse_key_value("config", "retries=3").expect("kv"),
            ("retries".to_owned(), json!(3))
        );
        assert_eq!(
            parse_key_value("config", "channel=#ops").expect("kv"),
            ("channel".to_owned(), json!("#ops"))
        );
        assert_eq!(
            parse_key_value("config", "url=https://x.io/a=b").expect("kv"),
            ("url".to_owned(), json!("https://x.io/a=b"))
        );
        assert!(parse_key_value("config", "novalue").is_err());
        assert!(parse_key_value("config", "=1").is_err());
    }

    #[test]
    fn flags_build_connection() {
        let spec = ConnectionSpec {
            name: Some("Slack".into()),
            scopes: vec!["chat:write".into()],
            default: Some(false),
            teams: vec!["PTEAM01".into()],
            configuration: vec!["channel=#ops".into()],
            secrets: vec!["bot_token=xoxb".into()],
            ..ConnectionSpec::default()
        };

        let conn = build_connection(&spec).expect("connection");

        assert_eq!(conn.name, "Slack");
        assert_eq!(conn.is_default, Some(false));
        assert_eq!(conn.teams, vec![ConnectionTeam::new("PTEAM01")]);
        assert_eq!(conn.configuration["channel"], json!("#ops"));
        assert_eq!(conn.secrets["bot_token"], json!("xoxb"));
    }

    #[test]
    fn flags_override_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("conn.json");
        std::fs::write(
            &path,
            r#"{"name":"From File","service_url":"https://a.example","configuration":{"x":1}}"#,
        )
        .expect("write");

        let spec = ConnectionSpec {
            from_file: Some(path),
            name: Some("Override".into()),
            ..ConnectionSpec::default()
        };
        let conn = build_connection(&spec).expect("connection");

        assert_eq!(conn.name, "Override");
        assert_eq!(conn.service_url.as_deref(), Some("https://a.example"));
        assert_eq!(conn.configuration["x"], json!(1));
    }

    #[test]
    fn name_is_required() {
        let err = build_connection(&ConnectionSpec::default()).expect_err("no name");
        assert!(matches!(err, CliError::Validation { ref field, .. } if field == "name"));
    }
}
