// Configuration module entry point
// Loads the server configuration once at startup and validates the site layout

mod state;
mod types;

use std::net::SocketAddr;

use crate::error::StartupError;

// Re-export public types
pub use state::AppState;
pub use types::Config;

/// Optional configuration file looked up in the working directory (without extension)
pub const CONFIG_FILE: &str = "spa-server";

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_ROOT_DIR: &str = "docchat_flutter/build/web";
pub const DEFAULT_INDEX_FILE: &str = "index.html";

impl Config {
    /// Load configuration from the default file, falling back to built-in constants
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from(CONFIG_FILE)
    }

    /// Load configuration from specified file path (without extension)
    /// A missing file is not an error; every key has a default
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .set_default("server.host", DEFAULT_HOST)?
            .set_default("server.port", i64::from(DEFAULT_PORT))?
            .set_default("site.root_dir", DEFAULT_ROOT_DIR)?
            .set_default("site.index_file", DEFAULT_INDEX_FILE)?
            .set_default("site.spa_fallback", true)?
            .set_default(
                "site.build_hint",
                "Please run 'cd docchat_flutter && flutter build web' first.",
            )?
            .set_default("http.server_name", concat!("spa-server/", env!("CARGO_PKG_VERSION")))?
            .set_default("logging.access_log", true)?
            .set_default("logging.access_log_format", "common")?
            .set_default("performance.keep_alive", true)?
            .set_default("performance.idle_timeout", 60)?
            .build()?;

        settings.try_deserialize()
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, StartupError> {
        let addr = format!("{}:{}", self.server.host, self.server.port);
        addr.parse()
            .map_err(|source| StartupError::InvalidAddress { addr, source })
    }

    /// Everything that has to hold before the runtime is built
    pub fn validate(&self) -> Result<(), StartupError> {
        if self.server.workers == Some(0) {
            return Err(StartupError::NoWorkers);
        }
        self.validate_site()
    }

    /// Verify the build output before any socket is bound.
    ///
    /// The root directory must exist. With SPA fallback enabled the root
    /// document must exist too, since every miss is answered with it.
    pub fn validate_site(&self) -> Result<(), StartupError> {
        if !self.site.root_dir.is_dir() {
            return Err(StartupError::MissingRoot {
                dir: self.site.root_dir.clone(),
            });
        }

        if self.site.spa_fallback && !self.site.index_path().is_file() {
            return Err(StartupError::MissingIndex {
                path: self.site.index_path(),
            });
        }

        Ok(())
    }
}
