//! Configuration types, read from the environment.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::error::ConfigError;

/// Read and parse `key`; unset or empty yields `default`.
pub(crate) fn parse_var<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => {
            raw.trim()
                .parse()
                .map_err(|e: T::Err| ConfigError::InvalidValue {
                    key: key.to_string(),
                    message: format!("'{raw}': {e}"),
                })
        }
        _ => Ok(default),
    }
}

/// How visitors can reach the team; shown in summaries and the farewell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactConfig {
    pub email: String,
    pub phone: String,
}

impl Default for ContactConfig {
    fn default() -> Self {
        Self {
            email: "contact@example.com".to_string(),
            phone: "+91 98765 43210".to_string(),
        }
    }
}

impl ContactConfig {
    /// `CONTACT_EMAIL`, `CONTACT_PHONE`.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            email: std::env::var("CONTACT_EMAIL").unwrap_or(defaults.email),
            phone: std::env::var("CONTACT_PHONE").unwrap_or(defaults.phone),
        }
    }
}

/// Dialog engine configuration.
#[derive(Debug, Clone)]
pub struct DialogConfig {
    pub contact: ContactConfig,
    /// Pause between accepting the email and showing the main fork.
    pub fork_delay: Duration,
}

impl Default for DialogConfig {
    fn default() -> Self {
        Self {
            contact: ContactConfig::default(),
            fork_delay: Duration::from_millis(600),
        }
    }
}

impl DialogConfig {
    /// `LEADBOT_FORK_DELAY_MS` plus the contact variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let fork_delay_ms: u64 = parse_var("LEADBOT_FORK_DELAY_MS", 600)?;
        Ok(Self {
            contact: ContactConfig::from_env(),
            fork_delay: Duration::from_millis(fork_delay_ms),
        })
    }
}

/// Which origins may call the HTTP surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CorsPolicy {
    Disabled,
    Any,
    Origins(Vec<String>),
}

impl CorsPolicy {
    /// Parse `CORS_ORIGINS`: empty disables, `*` allows any, otherwise a
    /// comma-separated origin list.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.is_empty() {
            return Self::Disabled;
        }
        if raw == "*" {
            return Self::Any;
        }
        let origins: Vec<String> = raw
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        if origins.is_empty() {
            Self::Disabled
        } else {
            Self::Origins(origins)
        }
    }
}

/// Lead backend HTTP server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub db_path: PathBuf,
    pub upload_dir: PathBuf,
    pub cors: CorsPolicy,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 5000,
            db_path: PathBuf::from("./data/leadbot.db"),
            upload_dir: PathBuf::from("./uploads/cvs"),
            cors: CorsPolicy::Disabled,
        }
    }
}

impl ServerConfig {
    /// `PORT`, `LEADBOT_DB_PATH`, `LEADBOT_UPLOAD_DIR`, `CORS_ORIGINS`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            port: parse_var("PORT", defaults.port)?,
            db_path: std::env::var("LEADBOT_DB_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.db_path),
            upload_dir: std::env::var("LEADBOT_UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.upload_dir),
            cors: CorsPolicy::parse(&std::env::var("CORS_ORIGINS").unwrap_or_default()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cors_policy_parsing() {
        assert_eq!(CorsPolicy::parse(""), CorsPolicy::Disabled);
        assert_eq!(CorsPolicy::parse("  "), CorsPolicy::Disabled);
        assert_eq!(CorsPolicy::parse(" , "), CorsPolicy::Disabled);
        assert_eq!(CorsPolicy::parse("*"), CorsPolicy::Any);
        assert_eq!(
            CorsPolicy::parse("https://a.example, https://b.example"),
            CorsPolicy::Origins(vec![
                "https://a.example".to_string(),
                "https://b.example".to_string()
            ])
        );
    }

    #[test]
    fn defaults() {
        let server = ServerConfig::default();
        assert_eq!(server.port, 5000);
        assert_eq!(server.cors, CorsPolicy::Disabled);

        let dialog = DialogConfig::default();
        assert_eq!(dialog.fork_delay, Duration::from_millis(600));
        assert!(!dialog.contact.email.is_empty());
    }

    #[test]
    fn parse_var_reports_bad_values() {
        // A key no other test touches.
        let key = "LEADBOT_TEST_PARSE_VAR";
        assert_eq!(parse_var::<u16>(key, 7).unwrap(), 7);

        unsafe { std::env::set_var(key, "80") };
        assert_eq!(parse_var::<u16>(key, 7).unwrap(), 80);

        unsafe { std::env::set_var(key, "eighty") };
        let err = parse_var::<u16>(key, 7).unwrap_err();
        assert!(err.to_string().contains(key));

        unsafe { std::env::remove_var(key) };
    }
}
