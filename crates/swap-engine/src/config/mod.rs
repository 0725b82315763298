use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};

use crate::workflows::swap::{ScoringAlgorithm, DEFAULT_MINIMUM_SUBMIT_SCORE};

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
    pub proposal: ProposalConfig,
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

        let scoring = match env::var("SWAP_SCORING_ALGORITHM") {
            Ok(raw) => ScoringAlgorithm::parse(&raw)
                .ok_or(ConfigError::UnknownScoringAlgorithm { value: raw })?,
            Err(_) => ScoringAlgorithm::default(),
        };

        let minimum_submit_score = match env::var("SWAP_MIN_SUBMIT_SCORE") {
            Ok(raw) => parse_submit_threshold(&raw)?,
            Err(_) => DEFAULT_MINIMUM_SUBMIT_SCORE,
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            proposal: ProposalConfig {
                scoring,
                minimum_submit_score,
            },
        })
    }
}

fn parse_submit_threshold(raw: &str) -> Result<u8, ConfigError> {
    raw.trim()
        .parse::<u8>()
        .ok()
        .filter(|value| *value <= 100)
        .ok_or_else(|| ConfigError::InvalidSubmitThreshold {
            value: raw.to_string(),
        })
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

/// Scoring strategy and submission threshold applied to every new swap session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProposalConfig {
    pub scoring: ScoringAlgorithm,
    pub minimum_submit_score: u8,
}

impl Default for ProposalConfig {
    fn default() -> Self {
        Self {
            scoring: ScoringAlgorithm::default(),
            minimum_submit_score: DEFAULT_MINIMUM_SUBMIT_SCORE,
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    UnknownScoringAlgorithm { value: String },
    InvalidSubmitThreshold { value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::UnknownScoringAlgorithm { value } => write!(
                f,
                "SWAP_SCORING_ALGORITHM '{}' must be one of: variety, ratio",
                value
            ),
            ConfigError::InvalidSubmitThreshold { value } => write!(
                f,
                "SWAP_MIN_SUBMIT_SCORE '{}' must be an integer between 0 and 100",
                value
            ),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::UnknownScoringAlgorithm { .. }
            | ConfigError::InvalidSubmitThreshold { .. } => None,
        }
    }
}
