use secrecy::Secret;
use serde::Deserialize;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;

#[derive(Debug, Clone, Deserialize)]
pub struct AdaConfig {
    #[serde(flatten)]
    pub common: core_config::Config,
    pub environment: Environment,
    pub service_name: String,
    pub service_version: String,
    pub log_level: String,
    pub otlp_endpoint: Option<String>,
    pub store: StoreConfig,
    pub session: SessionConfig,
    pub ai_dm: AiDmConfig,
    pub security: SecurityConfig,
    pub rate_limit: RateLimitConfig,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Dev,
    Prod,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Memory,
    Redis,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    pub redis_url: Option<Secret<String>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    pub ttl_seconds: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AiDmConfig {
    /// Most recent log entries handed to the narrator each turn.
    pub history_window: usize,
    pub max_action_length: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SecurityConfig {
    /// `*` mirrors whatever origin the browser sends.
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitConfig {
    pub login_attempts: u32,
    pub login_window_seconds: u64,
    pub register_attempts: u32,
    pub register_window_seconds: u64,
}

impl AdaConfig {
    pub fn from_env() -> Result<Self, AppError> {
        let common_config = core_config::Config::load()?;

        let env_str = env::var("ENVIRONMENT").unwrap_or_else(|_| "dev".to_string());
        let environment: Environment = env_str
            .parse()
            .map_err(|e: String| AppError::ConfigError(anyhow::anyhow!(e)))?;

        let is_prod = environment == Environment::Prod;

        let backend: StoreBackend = get_env("STORE_BACKEND", Some("memory"), false)?
            .parse()
            .map_err(|e: String| AppError::ConfigError(anyhow::anyhow!(e)))?;

        let redis_url = match backend {
            StoreBackend::Redis => Some(Secret::new(get_env("REDIS_URL", None, is_prod)?)),
            StoreBackend::Memory => env::var("REDIS_URL").ok().map(Secret::new),
        };

        let config = AdaConfig {
            common: common_config,
            environment: environment.clone(),
            service_name: get_env("SERVICE_NAME", Some("ada-service"), false)?,
            service_version: get_env("SERVICE_VERSION", Some(env!("CARGO_PKG_VERSION")), false)?,
            log_level: get_env("LOG_LEVEL", Some("info"), false)?,
            otlp_endpoint: env::var("OTLP_ENDPOINT").ok().filter(|s| !s.trim().is_empty()),
            store: StoreConfig { backend, redis_url },
            session: SessionConfig {
                ttl_seconds: parse_env("SESSION_TTL_SECONDS", "604800", is_prod)?,
            },
            ai_dm: AiDmConfig {
                history_window: parse_env("AI_DM_HISTORY_WINDOW", "12", false)?,
                max_action_length: parse_env("AI_DM_MAX_ACTION_LENGTH", "2000", false)?,
            },
            security: SecurityConfig {
                allowed_origins: get_env("ALLOWED_ORIGINS", Some("*"), is_prod)?
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect(),
            },
            rate_limit: RateLimitConfig {
                login_attempts: parse_env("LOGIN_RATE_LIMIT", "10", false)?,
                login_window_seconds: parse_env("LOGIN_RATE_WINDOW_SECONDS", "60", false)?,
                register_attempts: parse_env("REGISTER_RATE_LIMIT", "5", false)?,
                register_window_seconds: parse_env("REGISTER_RATE_WINDOW_SECONDS", "3600", false)?,
            },
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), AppError> {
        if self.common.port == 0 {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "PORT must be greater than 0"
            )));
        }

        if self.session.ttl_seconds == 0 {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "SESSION_TTL_SECONDS must be positive"
            )));
        }

        if self.ai_dm.history_window == 0 || self.ai_dm.max_action_length == 0 {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "AI_DM_HISTORY_WINDOW and AI_DM_MAX_ACTION_LENGTH must be positive"
            )));
        }

        if self.store.backend == StoreBackend::Redis && self.store.redis_url.is_none() {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "REDIS_URL is required when STORE_BACKEND=redis"
            )));
        }

        if self.environment == Environment::Prod {
            if self.security.allowed_origins.iter().any(|o| o == "*") {
                return Err(AppError::ConfigError(anyhow::anyhow!(
                    "Wildcard CORS origin not allowed in production"
                )));
            }

            if self.store.backend == StoreBackend::Memory {
                tracing::warn!("In-memory store in production: data is lost on restart");
            }
        }

        Ok(())
    }
}

fn get_env(key: &str, default: Option<&str>, is_prod: bool) -> Result<String, AppError> {
    match env::var(key) {
        Ok(val) => Ok(val),
        Err(_) => {
            if is_prod {
                Err(AppError::ConfigError(anyhow::anyhow!(format!(
                    "{} is required in production but not set",
                    key
                ))))
            } else if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(AppError::ConfigError(anyhow::anyhow!(format!(
                    "{} is required but not set",
                    key
                ))))
            }
        }
    }
}

fn parse_env<T>(key: &str, default: &str, is_prod: bool) -> Result<T, AppError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    get_env(key, Some(default), is_prod)?
        .trim()
        .parse()
        .map_err(|e: T::Err| AppError::ConfigError(anyhow::anyhow!("{}: {}", key, e)))
}

impl std::str::FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "dev" => Ok(Environment::Dev),
            "prod" => Ok(Environment::Prod),
            _ => Err(format!("Invalid environment: {}", s)),
        }
    }
}

impl std::str::FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "memory" => Ok(StoreBackend::Memory),
            "redis" => Ok(StoreBackend::Redis),
            _ => Err(format!("Invalid store backend: {}", s)),
        }
    }
}

impl AdaConfig {
    /// Development defaults with an in-memory store, used by tests and local runs.
    pub fn local() -> Self {
        AdaConfig {
            common: core_config::Config::default(),
            environment: Environment::Dev,
            service_name: "ada-service".to_string(),
            service_version: env!("CARGO_PKG_VERSION").to_string(),
            log_level: "info".to_string(),
            otlp_endpoint: None,
            store: StoreConfig {
                backend: StoreBackend::Memory,
                redis_url: None,
            },
            session: SessionConfig {
                ttl_seconds: 604_800,
            },
            ai_dm: AiDmConfig {
                history_window: 12,
                max_action_length: 2000,
            },
            security: SecurityConfig {
                allowed_origins: vec!["*".to_string()],
            },
            rate_limit: RateLimitConfig {
                login_attempts: 10,
                login_window_seconds: 60,
                register_attempts: 5,
                register_window_seconds: 3600,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_environment_case_insensitively() {
        assert_eq!("PROD".parse::<Environment>().unwrap(), Environment::Prod);
        assert!("staging".parse::<Environment>().is_err());
    }

    #[test]
    fn redis_backend_requires_url() {
        let mut config = AdaConfig::local();
        config.store.backend = StoreBackend::Redis;
        assert!(config.validate().is_err());

        config.store.redis_url = Some(Secret::new("redis://localhost:6379".to_string()));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn production_rejects_wildcard_origin() {
        let mut config = AdaConfig::local();
        config.environment = Environment::Prod;
        assert!(config.validate().is_err());

        config.security.allowed_origins = vec!["https://ada.example".to_string()];
        assert!(config.validate().is_ok());
    }
}
