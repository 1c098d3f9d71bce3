use std::{env, str::FromStr};

use anyhow::anyhow;
use serde::{Deserialize, Serialize};

use crate::managers::{scan::ScanPolicy, session::SessionPolicy};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GlobalConfig {
    pub server: ServerConfig,
    pub attendance: AttendanceConfig,
    pub rate_limit: RateLimitConfig,
    pub directory: DirectoryConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors_allowed_origins: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AttendanceConfig {
    pub lateness_threshold_minutes: i64,
    pub min_session_minutes: i64,
    pub max_session_minutes: i64,
    pub max_code_attempts: u32,
    pub expiry_sweep_interval_secs: u64,
    /// Tolerated drift between a client-reported scan time and server time.
    pub max_scan_skew_secs: i64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RateLimitConfig {
    pub requests_per_minute: u32,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DirectoryConfig {
    /// JSON array of user profiles loaded at startup.
    pub seed_path: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            cors_allowed_origins: vec!["http://localhost:3000".to_string()],
        }
    }
}

impl Default for AttendanceConfig {
    fn default() -> Self {
        Self {
            lateness_threshold_minutes: 15,
            min_session_minutes: 1,
            max_session_minutes: 120,
            max_code_attempts: 5,
            expiry_sweep_interval_secs: 60,
            max_scan_skew_secs: 120,
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            requests_per_minute: 120,
        }
    }
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            attendance: AttendanceConfig::default(),
            rate_limit: RateLimitConfig::default(),
            directory: DirectoryConfig { seed_path: None },
        }
    }
}

impl AttendanceConfig {
    pub fn session_policy(&self) -> SessionPolicy {
        SessionPolicy {
            min_duration_minutes: self.min_session_minutes,
            max_duration_minutes: self.max_session_minutes,
            max_code_attempts: self.max_code_attempts,
        }
    }

    pub fn scan_policy(&self) -> ScanPolicy {
        ScanPolicy {
            lateness_threshold_minutes: self.lateness_threshold_minutes,
            max_clock_skew_secs: self.max_scan_skew_secs,
        }
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.min_session_minutes < 1 || self.min_session_minutes > self.max_session_minutes {
            return Err(anyhow!(
                "Session duration bounds [{}, {}] are invalid",
                self.min_session_minutes,
                self.max_session_minutes
            ));
        }
        if self.max_code_attempts == 0 {
            return Err(anyhow!("MAX_CODE_ATTEMPTS must be at least 1"));
        }
        if self.lateness_threshold_minutes < 0 {
            return Err(anyhow!("LATENESS_THRESHOLD_MINUTES cannot be negative"));
        }
        if self.max_scan_skew_secs < 0 {
            return Err(anyhow!("SCAN_CLOCK_SKEW_SECS cannot be negative"));
        }
        Ok(())
    }
}

fn env_parse<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow!("Invalid value for {}: {}", key, e)),
        Err(_) => Ok(default),
    }
}

impl GlobalConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let defaults = GlobalConfig::default();

        let port = match env::var("PORT").or_else(|_| env::var("SERVER_PORT")) {
            Ok(raw) => raw
                .trim()
                .parse()
                .map_err(|e| anyhow!("Invalid value for PORT: {}", e))?,
            Err(_) => defaults.server.port,
        };

        let config = GlobalConfig {
            server: ServerConfig {
                host: env::var("SERVER_HOST").unwrap_or(defaults.server.host),
                port,
                cors_allowed_origins: env::var("CORS_ALLOWED_ORIGINS")
                    .map(|origins| {
                        origins
                            .split(',')
                            .map(|s| s.trim().to_string())
                            .filter(|s| !s.is_empty())
                            .collect()
                    })
                    .unwrap_or(defaults.server.cors_allowed_origins),
            },
            attendance: AttendanceConfig {
                lateness_threshold_minutes: env_parse(
                    "LATENESS_THRESHOLD_MINUTES",
                    defaults.attendance.lateness_threshold_minutes,
                )?,
                min_session_minutes: env_parse(
                    "MIN_SESSION_MINUTES",
                    defaults.attendance.min_session_minutes,
                )?,
                max_session_minutes: env_parse(
                    "MAX_SESSION_MINUTES",
                    defaults.attendance.max_session_minutes,
                )?,
                max_code_attempts: env_parse(
                    "MAX_CODE_ATTEMPTS",
                    defaults.attendance.max_code_attempts,
                )?,
                expiry_sweep_interval_secs: env_parse(
                    "EXPIRY_SWEEP_INTERVAL_SECS",
                    defaults.attendance.expiry_sweep_interval_secs,
                )?,
                max_scan_skew_secs: env_parse(
                    "SCAN_CLOCK_SKEW_SECS",
                    defaults.attendance.max_scan_skew_secs,
                )?,
            },
            rate_limit: RateLimitConfig {
                requests_per_minute: env_parse(
                    "RATE_LIMIT_PER_MINUTE",
                    defaults.rate_limit.requests_per_minute,
                )?,
            },
            directory: DirectoryConfig {
                seed_path: env::var("USER_DIRECTORY_PATH").ok(),
            },
        };

        config.attendance.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_policy() {
        let config = AttendanceConfig::default();
        assert!(config.validate().is_ok());

        let session = config.session_policy();
        assert_eq!(session.min_duration_minutes, 1);
        assert_eq!(session.max_duration_minutes, 120);
        assert_eq!(config.scan_policy().lateness_threshold_minutes, 15);
        assert_eq!(config.scan_policy().max_clock_skew_secs, 120);
    }

    #[test]
    fn inverted_duration_bounds_are_rejected() {
        let config = AttendanceConfig {
            min_session_minutes: 90,
            max_session_minutes: 30,
            ..AttendanceConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn negative_skew_is_rejected() {
        let config = AttendanceConfig {
            max_scan_skew_secs: -1,
            ..AttendanceConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
