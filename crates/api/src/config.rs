//! Application configuration

use std::collections::HashSet;
use std::env;

/// Hosts that serve the platform itself rather than a storefront
pub const DEFAULT_MAIN_DOMAINS: &[&str] = &["zynkart.store", "localhost:3000", "www.zynkart.store"];

/// Main-domain pages reachable without a session
pub const DEFAULT_PUBLIC_ROUTES: &[&str] = &["/", "/pricing", "/about", "/contact", "/terms", "/privacy"];

/// Main-domain pages that only make sense without a session
pub const DEFAULT_AUTH_ROUTES: &[&str] = &[
    "/sign-in",
    "/sign-up",
    "/forgot-password",
    "/reset-password",
    "/verify-email",
];

pub const DEFAULT_SIGN_IN_PATH: &str = "/sign-in";
pub const DEFAULT_LOGIN_REDIRECT: &str = "/merchant/stores";

/// Cookie names whose presence marks a session (plain and `__Secure-` prefixed)
pub const DEFAULT_SESSION_COOKIE_NAMES: &[&str] = &[
    "better-auth.session_token",
    "__Secure-better-auth.session_token",
];

/// Static routing data consumed by the tenant router.
///
/// Built once at startup and shared read-only; nothing mutates it per request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteTable {
    /// Exact-match host allow-list. No suffix or wildcard matching.
    pub main_domains: HashSet<String>,
    pub public_routes: HashSet<String>,
    pub auth_routes: HashSet<String>,
    pub sign_in_path: String,
    pub default_login_redirect: String,
    pub session_cookie_names: Vec<String>,
}

impl Default for RouteTable {
    fn default() -> Self {
        Self {
            main_domains: to_set(DEFAULT_MAIN_DOMAINS),
            public_routes: to_set(DEFAULT_PUBLIC_ROUTES),
            auth_routes: to_set(DEFAULT_AUTH_ROUTES),
            sign_in_path: DEFAULT_SIGN_IN_PATH.to_string(),
            default_login_redirect: DEFAULT_LOGIN_REDIRECT.to_string(),
            session_cookie_names: DEFAULT_SESSION_COOKIE_NAMES
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl RouteTable {
    pub fn with_main_domains<I, S>(mut self, hosts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.main_domains = hosts.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_public_routes<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.public_routes = paths.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_auth_routes<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.auth_routes = paths.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_sign_in_path(mut self, path: impl Into<String>) -> Self {
        self.sign_in_path = path.into();
        self
    }

    pub fn with_default_login_redirect(mut self, path: impl Into<String>) -> Self {
        self.default_login_redirect = path.into();
        self
    }

    pub fn with_session_cookie_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.session_cookie_names = names.into_iter().map(Into::into).collect();
        self
    }

    /// Load overrides from the environment, keeping defaults for unset variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut table = Self::default();

        if let Some(hosts) = list_var("MAIN_DOMAINS") {
            if hosts.is_empty() {
                return Err(ConfigError::Invalid {
                    var: "MAIN_DOMAINS",
                    reason: "at least one host is required".to_string(),
                });
            }
            table = table.with_main_domains(hosts);
        }
        if let Some(paths) = list_var("PUBLIC_ROUTES") {
            table = table.with_public_routes(validate_paths("PUBLIC_ROUTES", paths)?);
        }
        if let Some(paths) = list_var("AUTH_ROUTES") {
            table = table.with_auth_routes(validate_paths("AUTH_ROUTES", paths)?);
        }
        if let Ok(path) = env::var("SIGN_IN_PATH") {
            table = table.with_sign_in_path(validate_path("SIGN_IN_PATH", path)?);
        }
        if let Ok(path) = env::var("DEFAULT_LOGIN_REDIRECT") {
            table = table.with_default_login_redirect(validate_path("DEFAULT_LOGIN_REDIRECT", path)?);
        }
        if let Some(names) = list_var("SESSION_COOKIE_NAMES") {
            if names.is_empty() {
                return Err(ConfigError::Invalid {
                    var: "SESSION_COOKIE_NAMES",
                    reason: "at least one cookie name is required".to_string(),
                });
            }
            table = table.with_session_cookie_names(names);
        }

        Ok(table)
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    // Server
    pub bind_address: String,
    pub log_format: LogFormat,

    // Database
    pub database_url: String,
    pub database_max_connections: u32,

    // Payments
    pub paystack_secret_key: String,

    // Tenant routing
    pub routes: RouteTable,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            // Server
            bind_address: env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:3000".to_string()),
            log_format: match env::var("LOG_FORMAT").as_deref() {
                Ok("json") => LogFormat::Json,
                Ok("pretty") | Err(_) => LogFormat::Pretty,
                Ok(other) => {
                    return Err(ConfigError::Invalid {
                        var: "LOG_FORMAT",
                        reason: format!("expected 'pretty' or 'json', got '{}'", other),
                    })
                }
            },

            // Database
            database_url: env::var("DATABASE_URL")
                .map_err(|_| ConfigError::Missing("DATABASE_URL"))?,
            database_max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                .unwrap_or_else(|_| "5".to_string())
                .parse()
                .unwrap_or(5),

            // Payments
            paystack_secret_key: {
                let key = env::var("PAYSTACK_SECRET_KEY")
                    .map_err(|_| ConfigError::Missing("PAYSTACK_SECRET_KEY"))?;
                if key.trim().is_empty() {
                    return Err(ConfigError::Invalid {
                        var: "PAYSTACK_SECRET_KEY",
                        reason: "must not be empty".to_string(),
                    });
                }
                key
            },

            routes: RouteTable::from_env()?,
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),
    #[error("Invalid value for {var}: {reason}")]
    Invalid { var: &'static str, reason: String },
}

fn to_set(items: &[&str]) -> HashSet<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Comma-separated list variable; `None` when unset
fn list_var(name: &str) -> Option<Vec<String>> {
    let raw = env::var(name).ok()?;
    Some(
        raw.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
    )
}

fn validate_path(var: &'static str, path: String) -> Result<String, ConfigError> {
    if path.starts_with('/') {
        Ok(path)
    } else {
        Err(ConfigError::Invalid {
            var,
            reason: format!("path '{}' must start with '/'", path),
        })
    }
}

fn validate_paths(var: &'static str, paths: Vec<String>) -> Result<Vec<String>, ConfigError> {
    paths.into_iter().map(|p| validate_path(var, p)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    // Mutex to ensure config tests run serially (they modify shared env vars)
    static CONFIG_TEST_MUTEX: Mutex<()> = Mutex::new(());

    const ROUTING_VARS: &[&str] = &[
        "MAIN_DOMAINS",
        "PUBLIC_ROUTES",
        "AUTH_ROUTES",
        "SIGN_IN_PATH",
        "DEFAULT_LOGIN_REDIRECT",
        "SESSION_COOKIE_NAMES",
    ];

    fn setup_minimal_config() {
        env::set_var("DATABASE_URL", "postgres://test");
        env::set_var("PAYSTACK_SECRET_KEY", "sk_test_config");
    }

    fn cleanup_config() {
        env::remove_var("DATABASE_URL");
        env::remove_var("PAYSTACK_SECRET_KEY");
        env::remove_var("LOG_FORMAT");
        for var in ROUTING_VARS {
            env::remove_var(var);
        }
    }

    #[test]
    fn test_default_route_table() {
        let table = RouteTable::default();
        assert!(table.main_domains.contains("zynkart.store"));
        assert!(table.main_domains.contains("localhost:3000"));
        assert!(table.main_domains.contains("www.zynkart.store"));
        assert_eq!(table.main_domains.len(), 3);
        assert!(table.public_routes.contains("/"));
        assert!(table.auth_routes.contains("/sign-in"));
        assert_eq!(table.sign_in_path, "/sign-in");
        assert_eq!(table.default_login_redirect, "/merchant/stores");
    }

    #[test]
    fn test_missing_required_vars() {
        let _lock = CONFIG_TEST_MUTEX.lock().unwrap();
        cleanup_config();

        match Config::from_env() {
            Err(ConfigError::Missing("DATABASE_URL")) => {}
            other => panic!("Expected Missing DATABASE_URL, got: {:?}", other),
        }

        env::set_var("DATABASE_URL", "postgres://test");
        match Config::from_env() {
            Err(ConfigError::Missing("PAYSTACK_SECRET_KEY")) => {}
            other => panic!("Expected Missing PAYSTACK_SECRET_KEY, got: {:?}", other),
        }

        env::set_var("PAYSTACK_SECRET_KEY", "   ");
        assert!(matches!(
            Config::from_env(),
            Err(ConfigError::Invalid {
                var: "PAYSTACK_SECRET_KEY",
                ..
            })
        ));

        cleanup_config();
    }

    #[test]
    fn test_defaults_when_unset() {
        let _lock = CONFIG_TEST_MUTEX.lock().unwrap();
        cleanup_config();
        setup_minimal_config();

        let config = Config::from_env().unwrap();
        assert_eq!(config.bind_address, "0.0.0.0:3000");
        assert_eq!(config.log_format, LogFormat::Pretty);
        assert_eq!(config.database_max_connections, 5);
        assert_eq!(config.routes, RouteTable::default());

        cleanup_config();
    }

    #[test]
    fn test_route_overrides() {
        let _lock = CONFIG_TEST_MUTEX.lock().unwrap();
        cleanup_config();
        setup_minimal_config();

        env::set_var("MAIN_DOMAINS", "zynkart.store, staging.zynkart.store");
        env::set_var("PUBLIC_ROUTES", "/,/blog");
        env::set_var("DEFAULT_LOGIN_REDIRECT", "/merchant");
        env::set_var("LOG_FORMAT", "json");

        let config = Config::from_env().unwrap();
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.routes.main_domains.len(), 2);
        assert!(config.routes.main_domains.contains("staging.zynkart.store"));
        assert!(!config.routes.main_domains.contains("localhost:3000"));
        assert!(config.routes.public_routes.contains("/blog"));
        assert_eq!(config.routes.default_login_redirect, "/merchant");
        // Untouched lists keep their defaults
        assert!(config.routes.auth_routes.contains("/sign-up"));

        cleanup_config();
    }

    #[test]
    fn test_invalid_route_overrides() {
        let _lock = CONFIG_TEST_MUTEX.lock().unwrap();
        cleanup_config();
        setup_minimal_config();

        env::set_var("AUTH_ROUTES", "/sign-in,sign-up");
        assert!(matches!(
            Config::from_env(),
            Err(ConfigError::Invalid {
                var: "AUTH_ROUTES",
                ..
            })
        ));
        env::remove_var("AUTH_ROUTES");

        env::set_var("MAIN_DOMAINS", " , ");
        assert!(matches!(
            Config::from_env(),
            Err(ConfigError::Invalid {
                var: "MAIN_DOMAINS",
                ..
            })
        ));
        env::remove_var("MAIN_DOMAINS");

        env::set_var("LOG_FORMAT", "xml");
        assert!(matches!(
            Config::from_env(),
            Err(ConfigError::Invalid {
                var: "LOG_FORMAT",
                ..
            })
        ));

        cleanup_config();
    }
}
