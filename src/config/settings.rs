use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;

use crate::retention::{AutomationSettings, RetentionSettings};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub clinic: ClinicConfig,
    #[serde(default)]
    pub retention: RetentionConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub cors_origins: Vec<String>,
    /// Maximum request body size in bytes
    #[serde(default = "default_body_limit")]
    pub body_limit: usize,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiConfig {
    pub key: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClinicConfig {
    /// Display name inserted as `{clinicName}`
    #[serde(default = "default_clinic_name")]
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RetentionConfig {
    /// JSON file with template overrides merged over the defaults at startup
    #[serde(default)]
    pub templates_file: Option<String>,
    /// Messages kept in the outbox before the oldest is evicted
    #[serde(default = "default_outbox_capacity")]
    pub outbox_capacity: usize,
    #[serde(default)]
    pub automation: AutomationSettings,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8082
}

fn default_body_limit() -> usize {
    1024 * 1024 // 1 MiB
}

fn default_clinic_name() -> String {
    "Clínica Odontológica".to_string()
}

fn default_outbox_capacity() -> usize {
    1000
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        // Load .env file if exists
        let _ = dotenvy::dotenv();

        Self::load(environment())
    }

    fn load(environment: Environment) -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let builder = Config::builder()
            // Start with default values
            .set_default("server.host", default_host())?
            .set_default("server.port", i64::from(default_port()))?
            .set_default("clinic.name", default_clinic_name())?
            .set_default("retention.outbox_capacity", default_outbox_capacity() as i64)?
            // Load config file if exists
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Load from environment variables
            .add_source(environment);

        builder.build()?.try_deserialize()
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Initial console settings derived from configuration
    pub fn retention_settings(&self) -> RetentionSettings {
        RetentionSettings::new(self.clinic.name.clone(), self.retention.automation.clone())
    }
}

/// RETENTION__SERVER__PORT, RETENTION__API__KEY, RETENTION__CLINIC__NAME, etc.
///
/// Sections and keys are split on `__` because keys such as
/// `outbox_capacity` contain a single `_`.
fn environment() -> Environment {
    Environment::with_prefix("RETENTION")
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
        .list_separator(",")
        .with_list_parse_key("server.cors_origins")
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: vec![],
            body_limit: default_body_limit(),
        }
    }
}

impl Default for ClinicConfig {
    fn default() -> Self {
        Self {
            name: default_clinic_name(),
        }
    }
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            templates_file: None,
            outbox_capacity: default_outbox_capacity(),
            automation: AutomationSettings::default(),
        }
    }
}
