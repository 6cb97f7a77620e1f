//! Clap derive structures for the `pdflow` CLI.
//!
//! Defines the command tree, global flags, and shared types.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// pdflow -- manage PagerDuty workflow integration connections
#[derive(Debug, Parser)]
#[command(
    name = "pdflow",
    version,
    about = "Manage PagerDuty workflow integration connections from the command line",
    long_about = "Create, inspect, update and remove the connections that link\n\
        PagerDuty workflow integrations to external systems.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Config profile to use
    #[arg(long, short = 'p', env = "PDFLOW_PROFILE", global = true)]
    pub profile: Option<String>,

    /// REST API root (overrides profile)
    #[arg(long, env = "PDFLOW_API_URL", global = true)]
    pub api_url: Option<String>,

    /// REST API key
    #[arg(long, env = "PDFLOW_API_KEY", global = true, hide_env_values = true)]
    pub api_key: Option<String>,

    /// Output format [default: the profile's `defaults.output`, else table]
    #[arg(long, short = 'o', env = "PDFLOW_OUTPUT", global = true)]
    pub output: Option<OutputFormat>,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Accept invalid TLS certificates
    #[arg(long, short = 'k', env = "PDFLOW_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "PDFLOW_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Manage workflow integration connections
    #[command(alias = "conn", alias = "c")]
    Connections(ConnectionsArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Connections ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConnectionsArgs {
    #[command(subcommand)]
    pub command: ConnectionsCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConnectionsCommand {
    /// List one page of an integration's connections
    #[command(alias = "ls")]
    List {
        /// Workflow integration ID
        integration: String,

        /// Page size
        #[arg(long, short = 'l')]
        limit: Option<u32>,

        /// Cursor from a previous page
        #[arg(long)]
        cursor: Option<String>,

        /// Filter by connection name
        #[arg(long)]
        name: Option<String>,
    },

    /// Show a single connection
    Get {
        /// Workflow integration ID
        integration: String,
        /// Connection ID
        connection: String,
    },

    /// Create a connection
    Create {
        /// Workflow integration ID
        integration: String,

        #[command(flatten)]
        spec: ConnectionSpec,
    },

    /// Replace a connection's fields
    Update {
        /// Workflow integration ID
        integration: String,
        /// Connection ID
        connection: String,

        #[command(flatten)]
        spec: ConnectionSpec,
    },

    /// Delete a connection
    #[command(alias = "rm")]
    Delete {
        /// Workflow integration ID
        integration: String,
        /// Connection ID
        connection: String,
    },
}

/// Connection fields for create/update. Flags override values read
/// from `--from-file`.
#[derive(Debug, Default, Args)]
pub struct ConnectionSpec {
    /// Read the connection body from a JSON file
    #[arg(long, short = 'f')]
    pub from_file: Option<PathBuf>,

    /// Display name
    #[arg(long)]
    pub name: Option<String>,

    /// External service URL
    #[arg(long)]
    pub service_url: Option<String>,

    /// External system identifier
    #[arg(long)]
    pub external_id: Option<String>,

    /// Label for the external identifier
    #[arg(long)]
    pub external_id_label: Option<String>,

    /// Authorization scope (repeatable)
    #[arg(long = "scope")]
    pub scopes: Vec<String>,

    /// Mark as the integration's default connection
    #[arg(long, value_name = "BOOL")]
    pub default: Option<bool>,

    /// Team ID to share the connection with (repeatable)
    #[arg(long = "team")]
    pub teams: Vec<String>,

    /// Configuration entry KEY=VALUE; VALUE is parsed as JSON when possible (repeatable)
    #[arg(long = "config", value_name = "KEY=VALUE")]
    pub configuration: Vec<String>,

    /// Secret entry KEY=VALUE (repeatable)
    #[arg(long = "secret", value_name = "KEY=VALUE")]
    pub secrets: Vec<String>,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the config file location
    Path,

    /// Show the effective configuration (secrets redacted)
    Show,

    /// Create or replace a profile
    Init {
        /// API root for this profile
        #[arg(long = "url")]
        url: Option<String>,

        /// Store this API key in plaintext
        #[arg(long = "key", conflicts_with = "key_env")]
        key: Option<String>,

        /// Read the API key from this environment variable
        #[arg(long = "key-env")]
        key_env: Option<String>,

        /// Make this the default profile
        #[arg(long)]
        set_default: bool,
    },
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: clap_complete::Shell,
}
