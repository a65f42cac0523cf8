use std::{fs, sync::OnceLock};

use serde::{Deserialize, Serialize};

use crate::{quill_log, services::*};

pub const CONFIG_FILE: &str = "Quill.toml";

pub static APP_CONFIG: OnceLock<AppConfig> = OnceLock::new();

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub settings: Settings,
    #[serde(default)]
    pub required_env: RequiredEnv,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct RequiredEnv {
    #[serde(default)]
    pub variables: Vec<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Settings {
    #[serde(default = "default_environment")]
    pub environment: String,

    #[serde(default)]
    pub jwt: JwtSettings,

    #[serde(default)]
    pub pagination: PaginationSettings,

    #[serde(default)]
    pub database: DatabaseSettings,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct JwtSettings {
    #[serde(default = "default_token_leeway_secs")]
    pub token_leeway_secs: u64,
}

/// Bounds applied to client supplied `limit`/`page` query values.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct PaginationSettings {
    #[serde(default = "default_max_limit")]
    pub max_limit: i64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DatabaseSettings {
    #[serde(default = "default_max_pool_size")]
    pub max_pool_size: usize,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            environment: default_environment(),
            jwt: JwtSettings::default(),
            pagination: PaginationSettings::default(),
            database: DatabaseSettings::default(),
        }
    }
}

impl Default for JwtSettings {
    fn default() -> Self {
        JwtSettings {
            token_leeway_secs: default_token_leeway_secs(),
        }
    }
}

impl Default for PaginationSettings {
    fn default() -> Self {
        PaginationSettings { max_limit: default_max_limit() }
    }
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        DatabaseSettings {
            max_pool_size: default_max_pool_size(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

fn default_environment() -> String {
    "prod".to_string()
}

fn default_token_leeway_secs() -> u64 {
    5
}

fn default_max_limit() -> i64 {
    100
}

fn default_max_pool_size() -> usize {
    32
}

fn default_request_timeout_secs() -> u64 {
    10
}

impl AppConfig {
    pub fn load_from_file(path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&contents)?;
        Ok(config)
    }
}

/// Settings from the loaded config, or the defaults when bootstrap has not run.
pub fn settings() -> Settings {
    match APP_CONFIG.get() {
        Some(config) => config.settings.clone(),
        None => Settings::default(),
    }
}

pub async fn bootstrap() {
    dotenv::dotenv().ok();

    logger::setup_panic_hook();
    quill_log!(Info, "Starting bootstrap process");

    quill_log!(Debug, format!("Loading configuration from {}", CONFIG_FILE));
    let config = AppConfig::load_from_file(CONFIG_FILE).unwrap_or_else(|e| {
        quill_log!(Error, format!("Failed to load {}: {}", CONFIG_FILE, e));
        std::process::exit(1);
    });

    validate_required_env_vars(&config);

    let _ = APP_CONFIG.set(config);

    if let Some(config) = APP_CONFIG.get() {
        quill_log!(Info, format!("Environment: {}", config.settings.environment));
    }

    quill_log!(Debug, "Initializing database connection pool");
    if let Err(e) = crate::database::db::init_connection_pool() {
        quill_log!(Error, format!("Failed to initialize database connection pool: {}", e.log_message()));
        std::process::exit(1);
    }

    quill_log!(Info, "Bootstrap complete");
}

fn validate_required_env_vars(config: &AppConfig) {
    let invalid_vars = missing_env_vars(&config.required_env.variables);

    if !invalid_vars.is_empty() {
        quill_log!(Error, format!("Environment vars {} are missing or empty", invalid_vars.join(", ")));
        std::process::exit(1);
    }

    if !config.required_env.variables.is_empty() {
        quill_log!(Info, format!("All {} required environment variables are set", config.required_env.variables.len()));
    }
}

fn missing_env_vars(variables: &[String]) -> Vec<String> {
    variables
        .iter()
        .filter(|var| match std::env::var(var) {
            Ok(value) => value.trim().is_empty(),
            Err(_) => true,
        })
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_falls_back_to_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config.settings.environment, "prod");
        assert_eq!(config.settings.pagination.max_limit, 100);
        assert_eq!(config.settings.database.request_timeout_secs, 10);
        assert!(config.required_env.variables.is_empty());
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            [settings]
            environment = "dev"

            [settings.pagination]
            max_limit = 25

            [required_env]
            variables = ["DATABASE_URL", "JWT_SECRET"]
            "#,
        )
        .unwrap();

        assert_eq!(config.settings.environment, "dev");
        assert_eq!(config.settings.pagination.max_limit, 25);
        assert_eq!(config.settings.database.max_pool_size, 32);
        assert_eq!(config.settings.jwt.token_leeway_secs, 5);
        assert_eq!(config.required_env.variables.len(), 2);
    }

    #[test]
    fn reports_unset_variables() {
        let missing = missing_env_vars(&["QUILL_TEST_SURELY_UNSET_VAR".to_string()]);
        assert_eq!(missing, vec!["QUILL_TEST_SURELY_UNSET_VAR".to_string()]);
    }
}
