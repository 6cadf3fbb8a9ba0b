// Configuration module entry point
// Layers defaults, an optional TOML file, environment variables and CLI flags

mod state;
mod types;

use std::net::{IpAddr, SocketAddr};

use crate::cli::Cli;
use crate::error::ServeError;

// Re-export public types
pub use state::AppState;
pub use types::{Config, HttpConfig, LoggingConfig, ServerConfig};

/// Config file looked up in the working directory when `--config` is absent
pub const DEFAULT_CONFIG_FILE: &str = "corsserve";

/// Environment variable prefix, e.g. `CORSSERVE_SERVER__PORT=9000`
pub const ENV_PREFIX: &str = "CORSSERVE";

pub const DEFAULT_PORT: u16 = 8000;

impl Config {
    /// Load configuration for the given command line.
    ///
    /// Precedence, lowest first: built-in defaults, config file, environment, CLI flags.
    pub fn load(cli: &Cli) -> Result<Self, ServeError> {
        let file = match cli.config.as_deref() {
            Some(path) => config::File::with_name(path).required(true),
            None => config::File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };

        let settings = Self::builder_with_defaults()?
            .add_source(file)
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("server.port", cli.port.map(i64::from))?
            .set_override_option("server.host", cli.host.clone())?
            .set_override_option(
                "server.root_directory",
                cli.root
                    .as_ref()
                    .map(|p| p.to_string_lossy().into_owned()),
            )?
            .set_override_option("logging.access_log", cli.no_access_log.then_some(false))?
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    /// Configuration made of built-in defaults only
    pub fn defaults() -> Result<Self, ServeError> {
        Ok(Self::builder_with_defaults()?.build()?.try_deserialize()?)
    }

    fn builder_with_defaults(
    ) -> Result<config::ConfigBuilder<config::builder::DefaultState>, config::ConfigError> {
        config::Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", i64::from(DEFAULT_PORT))?
            .set_default("server.root_directory", ".")?
            .set_default("server.connection_timeout", 30)?
            .set_default("logging.access_log", true)?
            .set_default("logging.access_log_format", "common")?
            .set_default(
                "http.server_name",
                concat!("corsserve/", env!("CARGO_PKG_VERSION")),
            )?
            .set_default("http.index_files", vec!["index.html", "index.htm"])?
            .set_default("http.directory_listing", true)
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, ServeError> {
        let ip: IpAddr = self.server.host.parse().map_err(|e| {
            ServeError::InvalidAddress(format!("'{}': {e}", self.server.host))
        })?;
        Ok(SocketAddr::new(ip, self.server.port))
    }
}
