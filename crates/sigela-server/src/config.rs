//! Server configuration from environment variables.

use std::env;
use std::fmt;

/// Minimum length of the session signing secret, in bytes.
pub const MIN_SECRET_LEN: usize = 16;
/// Longest accepted session lifetime (one year).
pub const MAX_SESSION_TTL_HOURS: u64 = 24 * 365;

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Which persistence collaborator to run against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

/// Server configuration.
#[derive(Clone)]
pub struct ServerConfig {
    /// Server port to listen on.
    pub port: u16,
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
    /// Log output format.
    pub log_format: LogFormat,
    /// CORS allowed origins (comma-separated or "*" for all).
    pub cors_allowed_origins: String,
    /// HMAC secret used to sign session tokens.
    pub jwt_secret: String,
    /// Session lifetime in hours; also the cookie max-age.
    pub session_ttl_hours: u64,
    /// Whether the session cookie carries the `Secure` attribute.
    pub cookie_secure: bool,
    /// Persistence collaborator.
    pub store_backend: StoreBackend,
    /// Password of the seeded identities when running on the memory backend.
    pub demo_password: Option<String>,
}

impl ServerConfig {
    /// Configuration with defaults for everything but the signing secret.
    pub fn new(jwt_secret: impl Into<String>) -> Self {
        Self {
            port: 3000,
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            cors_allowed_origins: "http://localhost:5173".to_string(),
            jwt_secret: jwt_secret.into(),
            session_ttl_hours: 7 * 24,
            cookie_secure: false,
            store_backend: StoreBackend::Postgres,
            demo_password: None,
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Required:
    /// - `JWT_SECRET`: Session signing secret (at least 16 bytes)
    ///
    /// Optional:
    /// - `PORT`: Server port (default: 3000)
    /// - `LOG_LEVEL`: Logging level (default: "info")
    /// - `LOG_FORMAT`: "pretty" or "json" (default: "pretty")
    /// - `CORS_ALLOWED_ORIGINS`: Allowed CORS origins (default: "http://localhost:5173")
    /// - `SESSION_TTL_HOURS`: Session lifetime, 1 to 8760 (default: 168)
    /// - `COOKIE_SECURE`: Mark the session cookie Secure (default: false)
    /// - `STORE_BACKEND`: "postgres" or "memory" (default: "postgres")
    /// - `DEMO_PASSWORD`: Required with the memory backend
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|name| env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_vars<F>(var: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let jwt_secret =
            var("JWT_SECRET").ok_or_else(|| ConfigError::MissingEnvVar("JWT_SECRET".to_string()))?;
        if jwt_secret.len() < MIN_SECRET_LEN {
            return Err(ConfigError::InvalidValue {
                name: "JWT_SECRET".to_string(),
                reason: format!("must be at least {} bytes", MIN_SECRET_LEN),
            });
        }

        let mut config = Self::new(jwt_secret);

        if let Some(port) = var("PORT") {
            config.port = parse_var("PORT", &port)?;
        }
        if let Some(level) = var("LOG_LEVEL") {
            config.log_level = level;
        }
        if let Some(format) = var("LOG_FORMAT") {
            config.log_format = match format.to_lowercase().as_str() {
                "pretty" | "text" => LogFormat::Pretty,
                "json" => LogFormat::Json,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        name: "LOG_FORMAT".to_string(),
                        reason: format!("expected \"pretty\" or \"json\", got {:?}", format),
                    });
                }
            };
        }
        if let Some(origins) = var("CORS_ALLOWED_ORIGINS") {
            config.cors_allowed_origins = origins;
        }
        if let Some(ttl) = var("SESSION_TTL_HOURS") {
            config.session_ttl_hours = parse_var("SESSION_TTL_HOURS", &ttl)?;
            if !(1..=MAX_SESSION_TTL_HOURS).contains(&config.session_ttl_hours) {
                return Err(ConfigError::InvalidValue {
                    name: "SESSION_TTL_HOURS".to_string(),
                    reason: format!("must be between 1 and {}", MAX_SESSION_TTL_HOURS),
                });
            }
        }
        if let Some(secure) = var("COOKIE_SECURE") {
            config.cookie_secure = parse_bool("COOKIE_SECURE", &secure)?;
        }
        if let Some(backend) = var("STORE_BACKEND") {
            config.store_backend = match backend.to_lowercase().as_str() {
                "postgres" => StoreBackend::Postgres,
                "memory" => StoreBackend::Memory,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        name: "STORE_BACKEND".to_string(),
                        reason: format!("expected \"postgres\" or \"memory\", got {:?}", backend),
                    });
                }
            };
        }
        config.demo_password = var("DEMO_PASSWORD");
        if config.store_backend == StoreBackend::Memory && config.demo_password.is_none() {
            return Err(ConfigError::MissingEnvVar("DEMO_PASSWORD".to_string()));
        }

        Ok(config)
    }

    /// Get the socket address for the server.
    pub fn socket_addr(&self) -> std::net::SocketAddr {
        std::net::SocketAddr::from(([0, 0, 0, 0], self.port))
    }
}

impl fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerConfig")
            .field("port", &self.port)
            .field("log_level", &self.log_level)
            .field("log_format", &self.log_format)
            .field("cors_allowed_origins", &self.cors_allowed_origins)
            .field("session_ttl_hours", &self.session_ttl_hours)
            .field("cookie_secure", &self.cookie_secure)
            .field("store_backend", &self.store_backend)
            .finish_non_exhaustive()
    }
}

fn parse_var<T: std::str::FromStr>(name: &str, raw: &str) -> Result<T, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
        name: name.to_string(),
        reason: format!("cannot parse {:?}", raw),
    })
}

fn parse_bool(name: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(true),
        "0" | "false" | "no" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            name: name.to_string(),
            reason: format!("expected a boolean, got {:?}", raw),
        }),
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Required environment variable is missing.
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    /// Invalid environment variable value.
    #[error("invalid value for environment variable {name}: {reason}")]
    InvalidValue { name: String, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_default_values() {
        let config = ServerConfig::from_vars(vars(&[("JWT_SECRET", "0123456789abcdef")])).unwrap();

        assert_eq!(config.port, 3000);
        assert_eq!(config.log_level, "info");
        assert_eq!(config.log_format, LogFormat::Pretty);
        assert_eq!(config.cors_allowed_origins, "http://localhost:5173");
        assert_eq!(config.session_ttl_hours, 168);
        assert!(!config.cookie_secure);
        assert_eq!(config.store_backend, StoreBackend::Postgres);
    }

    #[test]
    fn test_secret_is_required() {
        let err = ServerConfig::from_vars(vars(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(ref v) if v == "JWT_SECRET"));

        let err = ServerConfig::from_vars(vars(&[("JWT_SECRET", "short")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn test_overrides() {
        let config = ServerConfig::from_vars(vars(&[
            ("JWT_SECRET", "0123456789abcdef"),
            ("PORT", "8080"),
            ("LOG_FORMAT", "json"),
            ("SESSION_TTL_HOURS", "12"),
            ("COOKIE_SECURE", "true"),
        ]))
        .unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.session_ttl_hours, 12);
        assert!(config.cookie_secure);
    }

    #[test]
    fn test_session_ttl_upper_bound() {
        let config = ServerConfig::from_vars(vars(&[
            ("JWT_SECRET", "0123456789abcdef"),
            ("SESSION_TTL_HOURS", "8760"),
        ]))
        .unwrap();
        assert_eq!(config.session_ttl_hours, MAX_SESSION_TTL_HOURS);

        let err = ServerConfig::from_vars(vars(&[
            ("JWT_SECRET", "0123456789abcdef"),
            ("SESSION_TTL_HOURS", "8761"),
        ]))
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue { ref name, .. } if name == "SESSION_TTL_HOURS"
        ));
    }

    #[test]
    fn test_memory_backend_needs_demo_password() {
        let err = ServerConfig::from_vars(vars(&[
            ("JWT_SECRET", "0123456789abcdef"),
            ("STORE_BACKEND", "memory"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(ref v) if v == "DEMO_PASSWORD"));
    }

    #[test]
    fn test_invalid_values() {
        for (name, value) in [
            ("PORT", "http"),
            ("SESSION_TTL_HOURS", "0"),
            ("SESSION_TTL_HOURS", "8761"),
            ("SESSION_TTL_HOURS", "10000000000"),
            ("COOKIE_SECURE", "maybe"),
            ("STORE_BACKEND", "sqlserver"),
        ] {
            let result =
                ServerConfig::from_vars(vars(&[("JWT_SECRET", "0123456789abcdef"), (name, value)]));
            assert!(result.is_err(), "{}={} should be rejected", name, value);
        }
    }

    #[test]
    fn test_debug_hides_secret() {
        let config = ServerConfig::new("super-secret-signing-key");
        assert!(!format!("{:?}", config).contains("super-secret"));
    }
}
