//! CLI configuration: a thin wrapper around `pdflow_config` shared types.
//!
//! Adds resolution that respects `GlobalOpts` flag overrides
//! (--api-url, --api-key, --timeout, --insecure).

use std::time::Duration;

use secrecy::SecretString;
use clap::ValueEnum;
use tracing::{debug, warn};

use pdflow_api::{Credentials, PagerDutyClient, TlsMode, TransportConfig};

use crate::cli::{GlobalOpts, OutputFormat};
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use pdflow_config::{
    Config, ConfigError, Profile, config_path, load_config, load_config_or_default, save_config,
};

// ── CLI-specific helpers ────────────────────────────────────────────

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// Everything needed to build a client, after flag overrides.
#[derive(Debug)]
pub struct ResolvedProfile {
    pub api_url: String,
    pub api_key: SecretString,
    pub transport: TransportConfig,
}

/// Merge a profile (possibly empty) with global flags.
///
/// Flag overrides take priority over profile values.
pub fn resolve_profile(
    profile: &Profile,
    profile_name: &str,
    config: &Config,
    global: &GlobalOpts,
) -> Result<ResolvedProfile, CliError> {
    // 1. API root (flag > env > profile > default)
    let api_url = match global.api_url.as_deref() {
        Some(raw) => raw
            .parse::<url::Url>()
            .map_err(|_| CliError::Validation {
                field: "api-url".into(),
                reason: format!("invalid URL: {raw}"),
            })?
            .to_string(),
        None => profile.api_url()?.to_string(),
    };

    // 2. API key (flag > profile chain)
    let api_key = match global.api_key {
        Some(ref key) => SecretString::from(key.clone()),
        None => pdflow_config::resolve_api_key(profile, profile_name).map_err(|e| match e {
            ConfigError::NoCredentials { profile } => CliError::NoCredentials { profile },
            other => CliError::Config(other),
        })?,
    };

    // 3. Transport (profile, then flags)
    let mut transport = profile.transport(&config.defaults);
    if global.insecure {
        transport = transport.with_tls(TlsMode::DangerAcceptInvalid);
    }
    if let Some(secs) = global.timeout {
        transport = transport.with_timeout(Duration::from_secs(secs));
    }

    Ok(ResolvedProfile {
        api_url,
        api_key,
        transport,
    })
}

/// Output format: `--output` / `PDFLOW_OUTPUT`, then `defaults.output`,
/// then table.
pub fn output_format(global: &GlobalOpts, config: &Config) -> OutputFormat {
    if let Some(ref format) = global.output {
        return format.clone();
    }
    OutputFormat::from_str(&config.defaults.output, true).unwrap_or_else(|_| {
        warn!(output = %config.defaults.output, "unknown defaults.output, using table");
        OutputFormat::Table
    })
}

/// Build an API client from the loaded config, active profile and flags.
pub fn build_client(global: &GlobalOpts, cfg: &Config) -> Result<PagerDutyClient, CliError> {
    let profile_name = active_profile_name(global, cfg);
    let empty = Profile::default();
    let profile = cfg
        .profile(Some(&profile_name))
        .map_or(&empty, |(_, profile)| profile);

    let resolved = resolve_profile(profile, &profile_name, cfg, global)?;
    debug!(profile = %profile_name, api_url = %resolved.api_url, "resolved profile");

    Ok(PagerDutyClient::with_base_url(
        &resolved.api_url,
        &Credentials::ApiToken(resolved.api_key),
        &resolved.transport,
    )?)
}
