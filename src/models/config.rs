use config::{Config, Environment, File, FileFormat};
use serde::Deserialize;
use thiserror::Error;
use validator::{Validate, ValidationErrors};

/// Upload size limit applied when the configuration does not set one.
pub const DEFAULT_MAX_UPLOAD_KB: u64 = 2048;

/// Configuration options for the catalog service.
///
/// Loaded from `config/default.yaml`, an optional `config/{APP_ENV}.yaml`
/// overlay and `APP_*` environment variables, in that order.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ServerConfig {
    #[validate(length(min = 1))]
    pub bind_address: String,
    #[validate(range(min = 1))]
    pub port: u16,
    #[validate(length(min = 1))]
    pub database_url: String,
    /// Public web root; uploaded images land in `<public_dir>/images/products`.
    #[validate(length(min = 1))]
    pub public_dir: String,
    #[validate(length(min = 1))]
    pub templates_dir: String,
    /// Signing key for the session, identity and flash cookies.
    #[validate(length(min = 64))]
    pub secret: String,
    /// Base URL of the external auth service that owns login and registration.
    #[validate(url)]
    #[serde(default)]
    pub auth_service_url: Option<String>,
    #[validate(range(min = 1))]
    #[serde(default = "default_max_upload_kb")]
    pub max_upload_kb: u64,
}

fn default_max_upload_kb() -> u64 {
    DEFAULT_MAX_UPLOAD_KB
}

#[derive(Debug, Error)]
pub enum ServerConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
    #[error("invalid configuration: {0}")]
    Invalid(#[from] ValidationErrors),
}

impl ServerConfig {
    /// Load and validate the configuration for the current environment.
    pub fn load() -> Result<Self, ServerConfigError> {
        let app_env = std::env::var("APP_ENV").unwrap_or_else(|_| "local".to_string());

        let settings = Config::builder()
            .add_source(File::new("config/default.yaml", FileFormat::Yaml).required(false))
            .add_source(File::new(&format!("config/{app_env}.yaml"), FileFormat::Yaml).required(false))
            .add_source(Environment::with_prefix("APP").try_parsing(true))
            .build()?;

        let server_config: ServerConfig = settings.try_deserialize()?;
        server_config.validate()?;
        Ok(server_config)
    }

    /// Upload size limit in bytes.
    pub fn max_upload_bytes(&self) -> u64 {
        self.max_upload_kb.saturating_mul(1024)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ServerConfig {
        ServerConfig {
            bind_address: "127.0.0.1".into(),
            port: 8080,
            database_url: "app.db".into(),
            public_dir: "public".into(),
            templates_dir: "templates".into(),
            secret: "x".repeat(64),
            auth_service_url: None,
            max_upload_kb: DEFAULT_MAX_UPLOAD_KB,
        }
    }

    #[test]
    fn accepts_sample_config() {
        assert!(sample().validate().is_ok());
        assert_eq!(sample().max_upload_bytes(), 2048 * 1024);
    }

    #[test]
    fn rejects_short_secret_and_bad_auth_url() {
        let mut config = sample();
        config.secret = "short".into();
        config.auth_service_url = Some("not a url".into());
        let errors = config.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("secret"));
        assert!(fields.contains_key("auth_service_url"));
    }
}
