use std::ffi::OsString;

use clap::{Args, CommandFactory, FromArgMatches, Parser, Subcommand, ValueEnum};
use serde::Deserialize;

use crate::error::ServerError;

#[derive(Parser)]
#[command(name = "datayoinker", about = "Zero-friction publish/retrieve data relay")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Parse `argv` like `Cli::try_parse_from`, except that an env var which
    /// is set but empty counts as unset.
    pub fn try_parse_args<I, T>(argv: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let cmd = Cli::command().mut_subcommand("serve", |serve| {
            let blank: Vec<clap::Id> = serve
                .get_arguments()
                .filter(|arg| {
                    arg.get_env()
                        .and_then(std::env::var_os)
                        .is_some_and(|value| value.is_empty())
                })
                .map(|arg| arg.get_id().clone())
                .collect();
            blank
                .into_iter()
                .fold(serve, |serve, id| serve.mut_arg(id, |arg| arg.env(None::<&'static str>)))
        });
        let mut matches = cmd.try_get_matches_from(argv)?;
        Cli::from_arg_matches_mut(&mut matches)
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP server
    Serve(ServeArgs),
}

/// Flags and env vars override the TOML file; the file overrides defaults.
#[derive(Args, Clone, Debug, Default)]
pub struct ServeArgs {
    /// Optional TOML config file
    #[arg(long, env = "YOINK_CONFIG")]
    pub config: Option<String>,

    /// Listening port
    #[arg(long, env = "DATAYOINKER_PORT")]
    pub port: Option<u16>,

    /// SQLite database file
    #[arg(long, env = "DB_PATH")]
    pub db_path: Option<String>,

    /// Storage backend
    #[arg(long, env = "YOINK_STORAGE", value_enum)]
    pub storage: Option<StorageKind>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum StorageKind {
    /// Durable, one SQLite file.
    #[default]
    Sqlite,
    /// Process memory; lost on restart.
    Memory,
}

// ---- TOML Config ----

#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_db_path")]
    pub db_path: String,
    #[serde(default)]
    pub storage: StorageKind,
    /// Per-request deadline; 408 after it.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// How long in-flight requests may drain after Ctrl+C.
    #[serde(default = "default_shutdown_grace_secs")]
    pub shutdown_grace_secs: u64,
}

fn default_port() -> u16 {
    3333
}
fn default_db_path() -> String {
    "yoink.db".to_string()
}
fn default_request_timeout_secs() -> u64 {
    20
}
fn default_shutdown_grace_secs() -> u64 {
    5
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            db_path: default_db_path(),
            storage: StorageKind::default(),
            request_timeout_secs: default_request_timeout_secs(),
            shutdown_grace_secs: default_shutdown_grace_secs(),
        }
    }
}

impl ServerConfig {
    pub fn load(path: &str) -> Result<Self, ServerError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ServerError::Config { context: "read", detail: format!("'{path}': {e}") })?;
        Self::parse(&content)
            .map_err(|e| ServerError::Config { context: "parse", detail: format!("'{path}': {e}") })
    }

    pub fn parse(toml_str: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(toml_str)
    }

    /// Build the effective config from CLI/env and the optional file.
    pub fn resolve(args: &ServeArgs) -> Result<Self, ServerError> {
        let mut config = match &args.config {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        if let Some(port) = args.port {
            config.port = port;
        }
        if let Some(db_path) = &args.db_path {
            config.db_path = db_path.clone();
        }
        if let Some(storage) = args.storage {
            config.storage = storage;
        }
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ServerError> {
        if self.request_timeout_secs == 0 {
            return Err(ServerError::Config {
                context: "validate",
                detail: "request_timeout_secs must be at least 1".into(),
            });
        }
        if self.storage == StorageKind::Sqlite && self.db_path.is_empty() {
            return Err(ServerError::Config {
                context: "validate",
                detail: "db_path is empty".into(),
            });
        }
        Ok(())
    }
}
