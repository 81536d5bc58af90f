use std::path::PathBuf;

use crate::auth::JwtConfig;
use crate::core::ServerError;

/// Server configuration
///
/// # Environment variables
///
/// | Variable | Default | Meaning |
/// |----------|---------|---------|
/// | WORK_DIR | ./data | database and log root |
/// | HTTP_PORT | 3000 | HTTP listen port |
/// | ENVIRONMENT | development | development / staging / production |
/// | TELEGRAM_BOT_TOKEN | - | bot token for sign-in verification |
/// | TELEGRAM_AUTH_MAX_AGE_SECS | 86400 | max age of `auth_date` |
/// | ADMIN_TELEGRAM_IDS | - | comma-separated platform admins |
/// | REQUEST_TIMEOUT_MS | 30000 | per-request timeout |
/// | LOG_LEVEL | info | tracing max level |
/// | LOG_DIR | - | daily rolling log files when set |
///
/// JWT settings are read by [`JwtConfig::from_env`].
#[derive(Debug, Clone)]
pub struct Config {
    pub work_dir: String,
    pub http_port: u16,
    pub environment: String,
    pub jwt: JwtConfig,
    pub telegram_bot_token: Option<String>,
    pub telegram_auth_max_age_secs: i64,
    /// Telegram user ids treated as platform admins
    pub admin_telegram_ids: Vec<i64>,
    pub request_timeout_ms: u64,
    pub log_level: String,
    pub log_dir: Option<String>,
}

impl Config {
    /// Load from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        Self {
            work_dir: std::env::var("WORK_DIR").unwrap_or_else(|_| "./data".into()),
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            jwt: JwtConfig::from_env(),
            telegram_bot_token: std::env::var("TELEGRAM_BOT_TOKEN")
                .ok()
                .filter(|t| !t.trim().is_empty()),
            telegram_auth_max_age_secs: std::env::var("TELEGRAM_AUTH_MAX_AGE_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(86_400),
            admin_telegram_ids: std::env::var("ADMIN_TELEGRAM_IDS")
                .map(|v| parse_id_list(&v))
                .unwrap_or_default(),
            request_timeout_ms: std::env::var("REQUEST_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(30_000),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_dir: std::env::var("LOG_DIR").ok().filter(|d| !d.is_empty()),
        }
    }

    /// Override the work dir and port, commonly for tests
    pub fn with_overrides(work_dir: impl Into<String>, http_port: u16) -> Self {
        let mut config = Self::from_env();
        config.work_dir = work_dir.into();
        config.http_port = http_port;
        config
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    pub fn database_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("database")
    }

    pub fn database_path(&self) -> PathBuf {
        self.database_dir().join("craft.redb")
    }

    pub fn ensure_work_dir_structure(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(self.database_dir())?;
        if let Some(dir) = &self.log_dir {
            std::fs::create_dir_all(dir)?;
        }
        Ok(())
    }

    /// Reject settings that are only tolerable outside production
    pub fn validate(&self) -> Result<(), ServerError> {
        if self.is_production() && self.jwt.is_ephemeral() {
            return Err(ServerError::Config(
                "JWT_SECRET must be set (at least 32 characters) in production".into(),
            ));
        }
        if self.telegram_bot_token.is_none() {
            tracing::warn!("TELEGRAM_BOT_TOKEN not set, Telegram sign-in is disabled");
        }
        if self.telegram_auth_max_age_secs <= 0 {
            return Err(ServerError::Config(
                "TELEGRAM_AUTH_MAX_AGE_SECS must be positive".into(),
            ));
        }
        Ok(())
    }

    pub fn is_admin_telegram_id(&self, telegram_id: i64) -> bool {
        self.admin_telegram_ids.contains(&telegram_id)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

fn parse_id_list(raw: &str) -> Vec<i64> {
    raw.split(',')
        .filter_map(|part| {
            let part = part.trim();
            if part.is_empty() {
                return None;
            }
            let parsed = part.parse().ok();
            if parsed.is_none() {
                tracing::warn!(value = part, "Ignoring malformed ADMIN_TELEGRAM_IDS entry");
            }
            parsed
        })
        .collect()
}
