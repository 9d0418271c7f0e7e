//! Service configuration.
//!
//! Startup configuration comes from an optional `config` file plus
//! `COMPANION__*` environment variables. Sessions receive a plain
//! [`CompanionConfig`] value and never read either source themselves.

mod companion_config;
mod loader;
mod static_config;

use serde::Deserialize;

pub use companion_config::CompanionConfig;
pub use loader::load_app_config;
pub use static_config::ServerConfig;

use companion_config::default_companion;
use static_config::default_server;

/// Everything the service reads at startup
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_server")]
    pub server: ServerConfig,

    #[serde(default = "default_companion")]
    pub companion: CompanionConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: default_server(),
            companion: default_companion(),
        }
    }
}
