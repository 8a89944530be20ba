//! Configuration management

use config::builder::{ConfigBuilder, DefaultState};
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::constants::{CONFIG_ENV_PREFIX, DEFAULT_ADMIN_ROLE};
use crate::error::AppError;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub app: AppSettings,
    pub database: DatabaseSettings,
    pub keycloak: KeycloakSettings,
    #[serde(default)]
    pub security: SecuritySettings,
    pub smtp: SmtpSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppSettings {
    pub env: String,
    pub host: String,
    pub port: u16,
    pub name: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub run_migrations: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct KeycloakSettings {
    /// Base URL of the identity provider, e.g. `http://localhost:8080`.
    pub url: String,
    /// Realm the admin credentials authenticate against.
    pub admin_realm: String,
    pub admin_client_id: String,
    pub admin_username: String,
    pub admin_password: String,
    /// Realm role that grants access to `/api/**`. Compared upper-cased.
    pub required_admin_role: String,
    /// Realm whose tokens are accepted by the API. Falls back to `admin_realm`.
    pub token_realm: Option<String>,
    pub timeout_seconds: u64,
}

impl KeycloakSettings {
    pub fn token_realm(&self) -> &str {
        self.token_realm.as_deref().unwrap_or(&self.admin_realm)
    }

    pub fn issuer(&self) -> String {
        format!(
            "{}/realms/{}",
            crate::utils::normalize_base_url(&self.url),
            self.token_realm()
        )
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct SecuritySettings {
    /// Shared HS256 secret. When set, tokens are verified with it instead of
    /// the identity provider's JWKS (local development and tests).
    pub jwt_secret: Option<String>,
    /// Expected `iss` claim. Defaults to the token realm's issuer URL.
    pub issuer: Option<String>,
    #[serde(default)]
    pub skip_issuer_check: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SmtpSettings {
    /// Empty host switches the notifier to log-only mode.
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    pub from: String,
    pub starttls: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingSettings {
    pub level: String,
    pub json: bool,
    /// Directory for daily rolling log files. Stdout only when absent.
    pub directory: Option<String>,
}

impl AppConfig {
    pub fn load() -> Result<Self, AppError> {
        let env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".into());
        let builder = Self::defaults(Config::builder())?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(
                Environment::with_prefix(CONFIG_ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );
        Self::build(builder)
    }

    fn build(builder: ConfigBuilder<DefaultState>) -> Result<Self, AppError> {
        Ok(builder.build()?.try_deserialize()?)
    }

    fn defaults(builder: ConfigBuilder<DefaultState>) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        builder
            .set_default("app.env", "development")?
            .set_default("app.host", "127.0.0.1")?
            .set_default("app.port", 8081)?
            .set_default("app.name", "multirealm-server")?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 1)?
            .set_default("database.run_migrations", true)?
            .set_default("keycloak.url", "http://localhost:8080")?
            .set_default("keycloak.admin_realm", "master")?
            .set_default("keycloak.admin_client_id", "admin-cli")?
            .set_default("keycloak.required_admin_role", DEFAULT_ADMIN_ROLE)?
            .set_default("keycloak.timeout_seconds", 15)?
            .set_default("smtp.host", "")?
            .set_default("smtp.port", 587)?
            .set_default("smtp.from", "no-reply@example.com")?
            .set_default("smtp.starttls", true)?
            .set_default("logging.level", "info")?
            .set_default("logging.json", true)
    }

    /// Authority a caller needs for the administrative routes.
    pub fn required_admin_authority(&self) -> String {
        format!(
            "{}{}",
            crate::constants::AUTHORITY_PREFIX,
            self.keycloak.required_admin_role.to_uppercase()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn try_load_from(toml: &str) -> Result<AppConfig, AppError> {
        let builder = AppConfig::defaults(Config::builder())
            .unwrap()
            .add_source(File::from_str(toml, config::FileFormat::Toml));
        AppConfig::build(builder)
    }

    fn load_from(toml: &str) -> AppConfig {
        try_load_from(toml).unwrap()
    }

    const MINIMAL: &str = r#"
        [database]
        url = "postgres://localhost/multirealm"

        [keycloak]
        admin_username = "admin"
        admin_password = "secret"
    "#;

    #[test]
    fn test_defaults_fill_optional_sections() {
        let config = load_from(MINIMAL);
        assert_eq!(config.app.port, 8081);
        assert_eq!(config.keycloak.admin_realm, "master");
        assert_eq!(config.keycloak.required_admin_role, "admin");
        assert!(config.smtp.host.is_empty());
        assert!(config.security.jwt_secret.is_none());
    }

    #[test]
    fn test_required_admin_authority_is_upper_cased() {
        let mut config = load_from(MINIMAL);
        config.keycloak.required_admin_role = "Org-Admin".into();
        assert_eq!(config.required_admin_authority(), "ROLE_ORG-ADMIN");
    }

    #[test]
    fn test_token_realm_falls_back_to_admin_realm() {
        let mut config = load_from(MINIMAL);
        assert_eq!(config.keycloak.token_realm(), "master");
        assert_eq!(config.keycloak.issuer(), "http://localhost:8080/realms/master");

        config.keycloak.token_realm = Some("operators".into());
        config.keycloak.url = "http://kc:8080/".into();
        assert_eq!(config.keycloak.issuer(), "http://kc:8080/realms/operators");
    }

    #[test]
    fn test_missing_credentials_is_config_error() {
        let result = try_load_from("[database]\nurl = \"postgres://localhost/multirealm\"\n");
        assert!(matches!(result, Err(AppError::ConfigError(_))));
    }
}
