//! Application configuration loaded from environment variables.

use std::env;
use std::str::FromStr;

use inkwell_core::domain::normalize_email;
use inkwell_infra::{DatabaseConfig, JwtConfig};

use crate::telemetry::TelemetryConfig;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database: Option<DatabaseConfig>,
    pub jwt: JwtConfig,
    /// Normalized emails granted the admin role at registration.
    pub admin_emails: Vec<String>,
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let database = Self::database_url(&lookup).map(|url| {
            let mut config = DatabaseConfig::new(url);
            if let Some(max) = parse(&lookup, "DB_MAX_CONNECTIONS") {
                config.max_connections = max;
            }
            if let Some(min) = parse(&lookup, "DB_MIN_CONNECTIONS") {
                config.min_connections = min;
            }
            config.run_migrations = lookup("DB_RUN_MIGRATIONS").is_some_and(|v| is_truthy(&v));
            config
        });

        let defaults = JwtConfig::default();
        let jwt = JwtConfig {
            secret: lookup("JWT_SECRET").unwrap_or(defaults.secret),
            expiration_hours: parse(&lookup, "JWT_EXPIRATION_HOURS")
                .unwrap_or(defaults.expiration_hours),
            issuer: lookup("JWT_ISSUER").unwrap_or(defaults.issuer),
        };

        let admin_emails = lookup("ADMIN_EMAILS")
            .map(|list| {
                list.split(',')
                    .filter_map(|email| normalize_email(email).ok())
                    .collect()
            })
            .unwrap_or_default();

        Self {
            host: lookup("HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            port: parse(&lookup, "PORT").unwrap_or(8080),
            database,
            jwt,
            admin_emails,
            telemetry: TelemetryConfig::from_lookup(&lookup),
        }
    }

    /// `DATABASE_URL`, or a URL assembled from the `DB_*` settings.
    fn database_url(lookup: &impl Fn(&str) -> Option<String>) -> Option<String> {
        if let Some(url) = lookup("DATABASE_URL").filter(|u| !u.trim().is_empty()) {
            return Some(url);
        }

        let host = lookup("DB_HOST")?;
        let name = lookup("DB_NAME")?;
        let user = lookup("DB_USER").unwrap_or_else(|| "postgres".to_string());
        let password = lookup("DB_PASS").unwrap_or_default();
        let port = parse(lookup, "DB_PORT").unwrap_or(5432);

        Some(DatabaseConfig::postgres_url(&host, port, &user, &password, &name))
    }
}

fn parse<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    lookup(key).and_then(|v| v.trim().parse().ok())
}

fn is_truthy(value: &str) -> bool {
    matches!(value.trim().to_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(pairs: &[(&str, &str)]) -> AppConfig {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults_without_environment() {
        let config = config_from(&[]);

        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 8080);
        assert!(config.database.is_none());
        assert!(config.jwt.uses_default_secret());
        assert!(config.admin_emails.is_empty());
    }

    #[test]
    fn test_database_from_discrete_settings() {
        let config = config_from(&[
            ("DB_HOST", "db"),
            ("DB_USER", "blog"),
            ("DB_PASS", "secret"),
            ("DB_NAME", "inkwell"),
            ("DB_RUN_MIGRATIONS", "true"),
        ]);

        let database = config.database.unwrap();
        assert_eq!(database.url, "postgres://blog:secret@db:5432/inkwell");
        assert!(database.run_migrations);
    }

    #[test]
    fn test_database_url_takes_precedence() {
        let config = config_from(&[
            ("DATABASE_URL", "postgres://u:p@localhost/app"),
            ("DB_HOST", "ignored"),
            ("DB_NAME", "ignored"),
            ("DB_MAX_CONNECTIONS", "5"),
        ]);

        let database = config.database.unwrap();
        assert_eq!(database.url, "postgres://u:p@localhost/app");
        assert_eq!(database.max_connections, 5);
        assert!(!database.run_migrations);
    }

    #[test]
    fn test_numeric_settings_parse_into_their_own_types() {
        let config = config_from(&[
            ("PORT", " 9000 "),
            ("JWT_EXPIRATION_HOURS", "48"),
            ("DATABASE_URL", "postgres://u:p@localhost/app"),
            ("DB_MIN_CONNECTIONS", "2"),
            ("DB_MAX_CONNECTIONS", "not-a-number"),
        ]);

        assert_eq!(config.port, 9000);
        assert_eq!(config.jwt.expiration_hours, 48);
        let database = config.database.unwrap();
        assert_eq!(database.min_connections, 2);
        assert_eq!(database.max_connections, DatabaseConfig::new(String::new()).max_connections);
    }

    #[test]
    fn test_admin_emails_are_normalized() {
        let config = config_from(&[("ADMIN_EMAILS", "Boss@Example.COM, ,ops@example.com")]);

        assert_eq!(config.admin_emails, vec!["Boss@example.com", "ops@example.com"]);
    }
}
