//! Configuration loading from files and environment variables.

use config::{Config, Environment, File};

use crate::error::{ServiceError, ServiceResult};

use super::AppConfig;

/// Load configuration from `config.{toml,yaml,json}` (optional) and
/// `COMPANION_*` env vars, e.g. `COMPANION_SERVER__PORT=9000`.
pub fn load_app_config() -> ServiceResult<AppConfig> {
    let config: AppConfig = Config::builder()
        .add_source(File::with_name("config").required(false))
        .add_source(
            Environment::with_prefix("COMPANION")
                .separator("__")
                .try_parsing(true),
        )
        .build()
        .map_err(|e| ServiceError::Config {
            message: format!("Failed to build config: {}", e),
        })?
        .try_deserialize()
        .map_err(|e| ServiceError::Config {
            message: format!("Failed to deserialize config: {}", e),
        })?;

    config.companion.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_sources_yield_defaults() {
        let config: AppConfig = Config::builder()
            .build()
            .and_then(|c| c.try_deserialize())
            .unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.bind_addr(), "0.0.0.0:8080");
        assert_eq!(config.companion.settle_ms, 3500);
    }

    #[test]
    fn test_overrides_apply() {
        let config: AppConfig = Config::builder()
            .set_override("server.port", 9001)
            .and_then(|b| b.set_override("companion.stretch_every", 3))
            .and_then(|b| b.build())
            .and_then(|c| c.try_deserialize())
            .unwrap();
        assert_eq!(config.server.port, 9001);
        assert_eq!(config.companion.stretch_every, 3);
        tokio_test::assert_ok!(config.companion.validate());
    }
}
