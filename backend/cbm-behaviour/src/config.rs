use serde::Deserialize;
use std::env;

#[derive(Debug, Clone, Deserialize)]
pub struct BehaviourConfig {
    pub capture: CaptureSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CaptureSettings {
    /// Content-store reads attempted during a regrade before giving up.
    pub regrade_retry_attempts: usize,
    pub regrade_retry_backoff_ms: u64,
    /// Deployment cap on the free-text fields a question may declare. It only
    /// tightens `FREE_TEXT_FIELDS_LIMIT`, which question validation enforces.
    pub max_free_text_fields: usize,
}

impl Default for CaptureSettings {
    fn default() -> Self {
        Self {
            regrade_retry_attempts: 3,
            regrade_retry_backoff_ms: 20,
            max_free_text_fields: 10,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    pub filter: String,
    pub json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            filter: "cbm_behaviour=debug".to_string(),
            json: false,
        }
    }
}

impl BehaviourConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenvy::dotenv().ok();

        // Determine environment (defaults to dev)
        let env = env::var("APP_ENV").unwrap_or_else(|_| "dev".to_string());

        let capture = CaptureSettings::default();
        let logging = LoggingSettings::default();

        // Defaults, then config/<env>.toml, then APP__SECTION__KEY overrides
        let settings = config::Config::builder()
            .set_default(
                "capture.regrade_retry_attempts",
                capture.regrade_retry_attempts as i64,
            )?
            .set_default(
                "capture.regrade_retry_backoff_ms",
                capture.regrade_retry_backoff_ms as i64,
            )?
            .set_default(
                "capture.max_free_text_fields",
                capture.max_free_text_fields as i64,
            )?
            .set_default("logging.filter", logging.filter)?
            .set_default("logging.json", logging.json)?
            .add_source(config::File::with_name(&format!("config/{}", env)).required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }
}
