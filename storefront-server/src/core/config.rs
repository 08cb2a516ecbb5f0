use crate::auth::JwtConfig;
use crate::auth::jwt::MIN_SECRET_LEN;
use crate::catalog::sessions::DEFAULT_MAX_SESSIONS;
use crate::data_transfer::MAX_BATCH_SIZE;
use shared::error::{AppError, AppResult, ErrorCode};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Server configuration
///
/// # Environment variables
///
/// | Variable | Default | Meaning |
/// |----------|---------|---------|
/// | WORK_DIR | ./data | Working directory (database, logs) |
/// | DATABASE_PATH | `{WORK_DIR}/storefront.db` | SQLite file |
/// | HTTP_PORT | 3000 | HTTP listen port |
/// | ENVIRONMENT | development | development / staging / production |
/// | LOG_LEVEL | info | tracing filter when RUST_LOG is unset |
/// | LOG_JSON | false | JSON console logs |
/// | CATALOG_PAGE_SIZE | 24 | Items per catalog page |
/// | SESSION_TTL_SECS | 1800 | Idle catalog session lifetime |
/// | MAX_CATALOG_SESSIONS | 10000 | Live catalog sessions before the idlest is evicted |
/// | IMPORT_BATCH_SIZE | 500 | Writes per import transaction (max 500) |
/// | CHAT_BOT_TOKEN / CHAT_ID | unset | Staff chat; notifications off when unset |
/// | CHAT_API_BASE | https://api.telegram.org | Chat bot API base URL |
/// | JWT_SECRET | random in development | Identity provider signing secret |
/// | JWT_ISSUER / JWT_AUDIENCE | storefront-idp / storefront | Expected token claims |
/// | REQUEST_TIMEOUT_MS | 30000 | Per-request timeout |
#[derive(Debug, Clone)]
pub struct Config {
    pub work_dir: String,
    pub database_path: Option<String>,
    pub http_port: u16,
    pub environment: String,
    pub log_level: String,
    pub log_json: bool,
    pub catalog_page_size: usize,
    pub session_ttl_secs: u64,
    pub max_catalog_sessions: usize,
    pub import_batch_size: usize,
    pub chat_bot_token: Option<String>,
    pub chat_id: Option<String>,
    pub chat_api_base: String,
    pub jwt: JwtConfig,
    pub request_timeout_ms: u64,
}

fn parsed<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T {
    match lookup(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!(key, value = %raw, "Ignoring unparseable config value");
            default
        }),
        None => default,
    }
}

impl Config {
    /// Load from the process environment
    pub fn from_env() -> AppResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from any key/value source
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> AppResult<Self> {
        let text = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let environment = text("ENVIRONMENT").unwrap_or_else(|| "development".into());
        let issuer = text("JWT_ISSUER").unwrap_or_else(|| "storefront-idp".into());
        let audience = text("JWT_AUDIENCE").unwrap_or_else(|| "storefront".into());

        let jwt = match text("JWT_SECRET") {
            Some(secret) if secret.len() >= MIN_SECRET_LEN => JwtConfig {
                secret,
                expiration_minutes: parsed(&lookup, "JWT_EXPIRATION_MINUTES", 1440),
                issuer,
                audience,
            },
            Some(_) => {
                return Err(AppError::with_message(
                    ErrorCode::ConfigError,
                    format!("JWT_SECRET must be at least {MIN_SECRET_LEN} characters"),
                ));
            }
            None if environment == "production" => {
                return Err(AppError::with_message(
                    ErrorCode::ConfigError,
                    "JWT_SECRET must be set in production",
                ));
            }
            None => {
                tracing::warn!("JWT_SECRET not set, using a random development secret");
                JwtConfig::ephemeral(issuer, audience)
            }
        };

        Ok(Self {
            work_dir: text("WORK_DIR").unwrap_or_else(|| "./data".into()),
            database_path: text("DATABASE_PATH"),
            http_port: parsed(&lookup, "HTTP_PORT", 3000),
            log_level: text("LOG_LEVEL").unwrap_or_else(|| "info".into()),
            log_json: parsed(&lookup, "LOG_JSON", false),
            catalog_page_size: parsed(&lookup, "CATALOG_PAGE_SIZE", 24usize).max(1),
            session_ttl_secs: parsed(&lookup, "SESSION_TTL_SECS", 1800),
            max_catalog_sessions: parsed(&lookup, "MAX_CATALOG_SESSIONS", DEFAULT_MAX_SESSIONS),
            import_batch_size: parsed(&lookup, "IMPORT_BATCH_SIZE", MAX_BATCH_SIZE).clamp(1, MAX_BATCH_SIZE),
            chat_bot_token: text("CHAT_BOT_TOKEN"),
            chat_id: text("CHAT_ID"),
            chat_api_base: text("CHAT_API_BASE").unwrap_or_else(|| "https://api.telegram.org".into()),
            request_timeout_ms: parsed(&lookup, "REQUEST_TIMEOUT_MS", 30_000),
            environment,
            jwt,
        })
    }

    /// Development defaults with a fixed secret, for tests
    pub fn for_tests(work_dir: impl Into<String>) -> Self {
        Self {
            work_dir: work_dir.into(),
            database_path: None,
            http_port: 0,
            environment: "development".into(),
            log_level: "debug".into(),
            log_json: false,
            catalog_page_size: 24,
            session_ttl_secs: 1800,
            max_catalog_sessions: DEFAULT_MAX_SESSIONS,
            import_batch_size: MAX_BATCH_SIZE,
            chat_bot_token: None,
            chat_id: None,
            chat_api_base: "http://127.0.0.1:9".into(),
            jwt: JwtConfig {
                secret: "test-secret-test-secret-test-secret".into(),
                expiration_minutes: 60,
                issuer: "storefront-idp".into(),
                audience: "storefront".into(),
            },
            request_timeout_ms: 30_000,
        }
    }

    pub fn database_path(&self) -> PathBuf {
        self.database_path
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(&self.work_dir).join("storefront.db"))
    }

    pub fn log_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("logs")
    }

    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> AppResult<Config> {
        let map: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        Config::from_lookup(|k| map.get(k).cloned())
    }

    #[test]
    fn defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.http_port, 3000);
        assert_eq!(config.catalog_page_size, 24);
        assert_eq!(config.import_batch_size, 500);
        assert!(config.chat_bot_token.is_none());
        assert!(config.is_development());
        assert_eq!(config.database_path(), PathBuf::from("./data").join("storefront.db"));
    }

    #[test]
    fn overrides_and_clamping() {
        let config = load(&[
            ("HTTP_PORT", "8080"),
            ("IMPORT_BATCH_SIZE", "5000"),
            ("CATALOG_PAGE_SIZE", "0"),
            ("LOG_JSON", "true"),
            ("DATABASE_PATH", "/tmp/shop.db"),
            ("CHAT_BOT_TOKEN", "  "),
        ])
        .unwrap();
        assert_eq!(config.http_port, 8080);
        assert_eq!(config.import_batch_size, 500);
        assert_eq!(config.catalog_page_size, 1);
        assert!(config.log_json);
        assert_eq!(config.database_path(), PathBuf::from("/tmp/shop.db"));
        assert!(config.chat_bot_token.is_none());
    }

    #[test]
    fn jwt_secret_rules() {
        let err = load(&[("JWT_SECRET", "short")]).unwrap_err();
        assert_eq!(err.code, ErrorCode::ConfigError);

        let err = load(&[("ENVIRONMENT", "production")]).unwrap_err();
        assert_eq!(err.code, ErrorCode::ConfigError);

        let config = load(&[
            ("ENVIRONMENT", "production"),
            ("JWT_SECRET", "0123456789abcdef0123456789abcdef"),
        ])
        .unwrap();
        assert!(config.is_production());
        assert_eq!(config.jwt.audience, "storefront");
    }
}
