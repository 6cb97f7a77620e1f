//! Shared configuration for pdflow.
//!
//! TOML profiles, API key resolution (flag + env + plaintext), and
//! translation to `pdflow_api::TransportConfig`. The CLI layers its
//! flag overrides on top of what this crate resolves.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use pdflow_api::{DEFAULT_BASE_URL, TlsMode, TransportConfig};

/// Environment variable consulted when a profile names no other source.
pub const API_KEY_ENV: &str = "PDFLOW_API_KEY";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no API key configured for profile '{profile}'")]
    NoCredentials { profile: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named API profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

impl Config {
    /// The profile named by `name`, falling back to `default_profile`.
    pub fn profile(&self, name: Option<&str>) -> Option<(&str, &Profile)> {
        let name = name.or(self.default_profile.as_deref())?;
        self.profiles
            .get_key_value(name)
            .map(|(k, v)| (k.as_str(), v))
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default)]
    pub insecure: bool,

    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            insecure: false,
            timeout: default_timeout(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_timeout() -> u64 {
    30
}

/// A named API profile.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Profile {
    /// REST API root (defaults to `https://api.pagerduty.com/`).
    pub api_url: Option<String>,

    /// API key (plaintext; prefer `api_key_env`).
    pub api_key: Option<String>,

    /// Environment variable name containing the API key.
    pub api_key_env: Option<String>,

    /// Path to custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    /// Override insecure TLS setting.
    pub insecure: Option<bool>,

    /// Override timeout (seconds).
    pub timeout: Option<u64>,
}

impl Profile {
    /// Validated API root for this profile.
    pub fn api_url(&self) -> Result<url::Url, ConfigError> {
        let raw = self.api_url.as_deref().unwrap_or(DEFAULT_BASE_URL);
        raw.parse().map_err(|_| ConfigError::Validation {
            field: "api_url".into(),
            reason: format!("invalid URL: {raw}"),
        })
    }

    /// Transport settings for this profile, falling back to `defaults`.
    pub fn transport(&self, defaults: &Defaults) -> TransportConfig {
        let tls = if self.insecure.unwrap_or(defaults.insecure) {
            TlsMode::DangerAcceptInvalid
        } else if let Some(ref ca_path) = self.ca_cert {
            TlsMode::CustomCa(ca_path.clone())
        } else {
            TlsMode::System
        };

        TransportConfig::default()
            .with_tls(tls)
            .with_timeout(Duration::from_secs(self.timeout.unwrap_or(defaults.timeout)))
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "pdflow", "pdflow").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("pdflow");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load config from `path` (missing file is fine), then `PDFLOW_*` env.
///
/// Nested keys use a double underscore: `PDFLOW_DEFAULTS__TIMEOUT=10`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    debug!(path = %path.display(), "loading config");

    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("PDFLOW_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if the file doesn't exist or is invalid.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_path();
    save_config_to(cfg, &path)?;
    Ok(path)
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Credential resolution ───────────────────────────────────────────

/// Resolve an API key from the process environment and the profile.
pub fn resolve_api_key(profile: &Profile, profile_name: &str) -> Result<SecretString, ConfigError> {
    resolve_api_key_with(profile, profile_name, |name| std::env::var(name).ok())
}

/// Resolve an API key with a custom environment lookup.
///
/// Order: the profile's `api_key_env` variable, then [`API_KEY_ENV`],
/// then the plaintext `api_key`.
pub fn resolve_api_key_with(
    profile: &Profile,
    profile_name: &str,
    env: impl Fn(&str) -> Option<String>,
) -> Result<SecretString, ConfigError> {
    // 1. Profile's api_key_env → env var lookup
    if let Some(ref env_name) = profile.api_key_env {
        if let Some(val) = env(env_name).filter(|v| !v.is_empty()) {
            return Ok(SecretString::from(val));
        }
    }

    // 2. Well-known env var
    if let Some(val) = env(API_KEY_ENV).filter(|v| !v.is_empty()) {
        return Ok(SecretString::from(val));
    }

    // 3. Plaintext in config
    if let Some(ref key) = profile.api_key {
        return Ok(SecretString::from(key.clone()));
    }

    Err(ConfigError::NoCredentials {
        profile: profile_name.into(),
    })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use secrecy::ExposeSecret;

    use super::*;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn load_profiles_from_toml() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
default_profile = "eu"

[defaults]
timeout = 12

[profiles.eu]
api_url = "https://api.eu.pagerduty.com"
api_key_env = "PD_EU_KEY"
"#,
        )
        .expect("write config");

        let cfg = load_config_from(&path).expect("load");
        let (name, profile) = cfg.profile(None).expect("default profile");

        assert_eq!(name, "eu");
        assert_eq!(cfg.defaults.timeout, 12);
        assert_eq!(cfg.defaults.output, "table");
        assert_eq!(
            profile.api_url().expect("url").as_str(),
            "https://api.eu.pagerduty.com/"
        );
        let transport = profile.transport(&cfg.defaults);
        assert_eq!(transport.timeout, Duration::from_secs(12));
        assert!(matches!(transport.tls, TlsMode::System));
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cfg = load_config_from(&dir.path().join("absent.toml")).expect("load");

        assert_eq!(cfg.default_profile.as_deref(), Some("default"));
        assert!(cfg.profiles.is_empty());
        assert!(cfg.profile(None).is_none());
    }

    #[test]
    fn save_then_load_keeps_profiles() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("config.toml");

        let mut cfg = Config::default();
        cfg.profiles.insert(
            "default".into(),
            Profile {
                api_key: Some("plain-key".into()),
                insecure: Some(true),
                ..Profile::default()
            },
        );
        save_config_to(&cfg, &path).expect("save");

        let loaded = load_config_from(&path).expect("load");
        let (_, profile) = loaded.profile(Some("default")).expect("profile");
        assert_eq!(profile.api_key.as_deref(), Some("plain-key"));
        assert!(matches!(
            profile.transport(&loaded.defaults).tls,
            TlsMode::DangerAcceptInvalid
        ));
    }

    #[test]
    fn api_url_defaults_to_production() {
        let url = Profile::default().api_url().expect("default url");
        assert_eq!(url.as_str(), DEFAULT_BASE_URL);

        let bad = Profile {
            api_url: Some("not a url".into()),
            ..Profile::default()
        };
        assert!(matches!(bad.api_url(), Err(ConfigError::Validation { .. })));
    }

    #[test]
    fn api_key_resolution_order() {
        let profile = Profile {
            api_key: Some("plaintext".into()),
            api_key_env: Some("TEAM_KEY".into()),
            ..Profile::default()
        };

        let key = resolve_api_key_with(&profile, "p", |name| {
            (name == "TEAM_KEY").then(|| "from-profile-env".to_owned())
        })
        .expect("key");
        assert_eq!(key.expose_secret(), "from-profile-env");

        let key = resolve_api_key_with(&profile, "p", |name| {
            (name == API_KEY_ENV).then(|| "from-global-env".to_owned())
        })
        .expect("key");
        assert_eq!(key.expose_secret(), "from-global-env");

        let key = resolve_api_key_with(&profile, "p", no_env).expect("key");
        assert_eq!(key.expose_secret(), "plaintext");
    }

    #[test]
    fn missing_api_key_names_profile() {
        let err = resolve_api_key_with(&Profile::default(), "ops", no_env).expect_err("no key");
        assert!(matches!(err, ConfigError::NoCredentials { ref profile } if profile == "ops"));
    }
}
