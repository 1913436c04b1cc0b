mod settings;

pub use settings::{ApiConfig, ClinicConfig, RetentionConfig, ServerConfig, Settings};
