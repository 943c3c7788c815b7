use crate::workflows::matching::{MatchConfig, MatchConfigError};
use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_DRAFT_DIR: &str = ".spacematch/drafts";
const DEFAULT_QUIET_MS: u64 = 1_000;

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub intake: IntakeConfig,
    pub matching: MatchConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let draft_dir = env::var("APP_DRAFT_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_DRAFT_DIR));
        let quiet_ms = match env::var("APP_DRAFT_QUIET_MS") {
            Ok(raw) => raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|ms| *ms > 0)
                .ok_or(ConfigError::InvalidQuietPeriod)?,
            Err(_) => DEFAULT_QUIET_MS,
        };

        let matching = match env::var("APP_MATCH_CONFIG") {
            Ok(path) => load_match_config(PathBuf::from(path))?,
            Err(_) => MatchConfig::default(),
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            intake: IntakeConfig {
                draft_dir,
                autosave_quiet: Duration::from_millis(quiet_ms),
            },
            matching,
        })
    }
}

fn load_match_config(path: PathBuf) -> Result<MatchConfig, ConfigError> {
    let raw = std::fs::read_to_string(&path).map_err(|source| ConfigError::MatchConfigRead {
        path: path.clone(),
        source,
    })?;
    let config: MatchConfig =
        serde_json::from_str(&raw).map_err(|source| ConfigError::MatchConfigParse {
            path: path.clone(),
            source,
        })?;
    config.validate().map_err(ConfigError::MatchConfigInvalid)?;
    Ok(config)
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing and metrics controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Where application drafts are mirrored and how long autosave waits after the last edit.
#[derive(Debug, Clone)]
pub struct IntakeConfig {
    pub draft_dir: PathBuf,
    pub autosave_quiet: Duration,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost {
        source: std::net::AddrParseError,
    },
    InvalidQuietPeriod,
    MatchConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },
    MatchConfigParse {
        path: PathBuf,
        source: serde_json::Error,
    },
    MatchConfigInvalid(MatchConfigError),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidQuietPeriod => {
                write!(f, "APP_DRAFT_QUIET_MS must be a positive number of milliseconds")
            }
            ConfigError::MatchConfigRead { path, .. } => {
                write!(f, "unable to read match config at {}", path.display())
            }
            ConfigError::MatchConfigParse { path, source } => {
                write!(f, "match config at {} is not valid JSON: {source}", path.display())
            }
            ConfigError::MatchConfigInvalid(err) => write!(f, "match config rejected: {err}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidPort | ConfigError::InvalidQuietPeriod => None,
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::MatchConfigRead { source, .. } => Some(source),
            ConfigError::MatchConfigParse { source, .. } => Some(source),
            ConfigError::MatchConfigInvalid(err) => Some(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::io::Write;
    use std::sync::{Mutex, OnceLock};

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn reset_env() {
        env::remove_var("APP_ENV");
        env::remove_var("APP_HOST");
        env::remove_var("APP_PORT");
        env::remove_var("APP_LOG_LEVEL");
        env::remove_var("APP_DRAFT_DIR");
        env::remove_var("APP_DRAFT_QUIET_MS");
        env::remove_var("APP_MATCH_CONFIG");
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.telemetry.log_level, "info");
        assert_eq!(config.intake.draft_dir, PathBuf::from(DEFAULT_DRAFT_DIR));
        assert_eq!(config.intake.autosave_quiet, Duration::from_secs(1));
        assert_eq!(config.matching, MatchConfig::default());
    }

    #[test]
    fn accepts_localhost_host() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_HOST", "localhost");
        let config = AppConfig::load().expect("config loads");
        let addr = config.server.socket_addr().expect("localhost resolves");
        assert_eq!(addr, SocketAddr::new(IpAddr::from([127, 0, 0, 1]), 3000));
        reset_env();
    }

    #[test]
    fn rejects_zero_quiet_period() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_DRAFT_QUIET_MS", "0");
        let result = AppConfig::load();
        reset_env();
        assert!(matches!(result, Err(ConfigError::InvalidQuietPeriod)));
    }

    #[test]
    fn loads_match_config_from_file() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        let mut custom = MatchConfig::default();
        custom.size_decay_distance = 8;
        write!(file, "{}", serde_json::to_string(&custom).expect("serialize"))
            .expect("write config");
        env::set_var("APP_MATCH_CONFIG", file.path());

        let config = AppConfig::load();
        reset_env();

        assert_eq!(config.expect("config loads").matching.size_decay_distance, 8);
    }

    #[test]
    fn rejects_invalid_match_config() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        let mut custom = MatchConfig::default();
        custom.neutral_credit = 1.5;
        write!(file, "{}", serde_json::to_string(&custom).expect("serialize"))
            .expect("write config");
        env::set_var("APP_MATCH_CONFIG", file.path());

        let result = AppConfig::load();
        reset_env();

        assert!(matches!(result, Err(ConfigError::MatchConfigInvalid(_))));
    }
}
