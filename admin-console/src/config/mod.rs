use crate::ui::format::DateStyle;
use crate::ui::i18n::Locale;
use chrono::FixedOffset;
use console_core::observability::LogFormat;
use secrecy::Secret;
use serde::Deserialize;
use std::path::PathBuf;

#[derive(Deserialize, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub backend: BackendSettings,
    #[serde(default)]
    pub console: ConsoleSettings,
    #[serde(default)]
    pub telemetry: TelemetrySettings,
}

#[derive(Deserialize, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    /// Directory served under `/static`.
    #[serde(default = "default_static_dir")]
    pub static_dir: String,
    #[serde(default = "default_session_inactivity_minutes")]
    pub session_inactivity_minutes: i64,
    /// Set to true in production with HTTPS.
    #[serde(default)]
    pub secure_cookies: bool,
}

/// Longest accepted session inactivity window: one year.
pub const MAX_SESSION_INACTIVITY_MINUTES: i64 = 365 * 24 * 60;

/// Display offsets must stay within a day of UTC.
const MAX_UTC_OFFSET_MINUTES: i32 = 24 * 60 - 1;

impl ServerSettings {
    pub fn session_inactivity(&self) -> time::Duration {
        time::Duration::minutes(
            self.session_inactivity_minutes
                .clamp(1, MAX_SESSION_INACTIVITY_MINUTES),
        )
    }
}

fn default_static_dir() -> String {
    "admin-console/static".to_string()
}

fn default_session_inactivity_minutes() -> i64 {
    24 * 60
}

#[derive(Deserialize, Clone)]
pub struct BackendSettings {
    /// Base URL of the REST API, e.g. `http://localhost:3001/api`.
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Optional service token sent as a bearer credential on every call.
    #[serde(default)]
    pub api_token: Option<Secret<String>>,
}

fn default_timeout_secs() -> u64 {
    10
}

#[derive(Deserialize, Clone, Debug)]
pub struct ConsoleSettings {
    #[serde(default = "default_items_per_page")]
    pub items_per_page: usize,
    #[serde(default)]
    pub locale: Locale,
    /// Lifetime of banners on the list screens.
    #[serde(default = "default_alert_dismiss_ms")]
    pub alert_dismiss_ms: u64,
    /// Lifetime of banners on the standalone add/edit pages.
    #[serde(default = "default_form_alert_dismiss_ms")]
    pub form_alert_dismiss_ms: u64,
    /// Offset from UTC, in minutes, to show timestamps in (420 for
    /// Bangkok). Unset shows each timestamp in the zone it was sent with.
    #[serde(default)]
    pub utc_offset_minutes: Option<i32>,
}

impl ConsoleSettings {
    pub fn date_style(&self) -> DateStyle {
        let offset = self
            .utc_offset_minutes
            .and_then(|m| m.checked_mul(60))
            .and_then(FixedOffset::east_opt);
        DateStyle::new(self.locale, offset)
    }
}

impl Default for ConsoleSettings {
    fn default() -> Self {
        Self {
            items_per_page: default_items_per_page(),
            locale: Locale::default(),
            alert_dismiss_ms: default_alert_dismiss_ms(),
            form_alert_dismiss_ms: default_form_alert_dismiss_ms(),
            utc_offset_minutes: None,
        }
    }
}

fn default_items_per_page() -> usize {
    5
}

fn default_alert_dismiss_ms() -> u64 {
    3000
}

fn default_form_alert_dismiss_ms() -> u64 {
    5000
}

#[derive(Deserialize, Clone, Debug)]
pub struct TelemetrySettings {
    #[serde(default = "default_service_name")]
    pub service_name: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub log_format: LogFormat,
    /// OTLP gRPC collector, e.g. `http://tempo:4317`. Export is off when unset.
    #[serde(default)]
    pub otlp_endpoint: Option<String>,
}

impl Default for TelemetrySettings {
    fn default() -> Self {
        Self {
            service_name: default_service_name(),
            log_level: default_log_level(),
            log_format: LogFormat::default(),
            otlp_endpoint: None,
        }
    }
}

fn default_service_name() -> String {
    "admin-console".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Load `config/base.yaml`, then apply `APP_*` environment overrides
/// (`APP_BACKEND__BASE_URL`, `APP_CONSOLE__LOCALE`, ...).
pub fn get_configuration() -> Result<Settings, config::ConfigError> {
    let configuration_directory = match std::env::var("APP_CONFIG_DIR") {
        Ok(dir) => PathBuf::from(dir),
        Err(_) => {
            let base_path = std::env::current_dir()
                .map_err(|e| config::ConfigError::Foreign(Box::new(e)))?;

            // Works both from the workspace root and from inside the crate
            if base_path.ends_with("admin-console") {
                base_path.join("config")
            } else {
                base_path.join("admin-console").join("config")
            }
        }
    };

    let settings = config::Config::builder()
        .add_source(config::File::from(configuration_directory.join("base.yaml")).required(true))
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    let settings = settings.try_deserialize::<Settings>()?;
    settings.validate()?;
    Ok(settings)
}

impl Settings {
    pub fn validate(&self) -> Result<(), config::ConfigError> {
        let minutes = self.server.session_inactivity_minutes;
        if !(1..=MAX_SESSION_INACTIVITY_MINUTES).contains(&minutes) {
            return Err(config::ConfigError::Message(format!(
                "server.session_inactivity_minutes must be 1-{MAX_SESSION_INACTIVITY_MINUTES}, got {minutes}"
            )));
        }

        if self.console.items_per_page == 0 {
            return Err(config::ConfigError::Message(
                "console.items_per_page must be greater than 0".to_string(),
            ));
        }

        if let Some(offset) = self.console.utc_offset_minutes {
            if !(-MAX_UTC_OFFSET_MINUTES..=MAX_UTC_OFFSET_MINUTES).contains(&offset) {
                return Err(config::ConfigError::Message(format!(
                    "console.utc_offset_minutes must be within ±{MAX_UTC_OFFSET_MINUTES}, got {offset}"
                )));
            }
        }

        Ok(())
    }
}
