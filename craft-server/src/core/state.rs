//! Server State
//!
//! Shared by every handler through axum's `State` extractor. All fields are
//! cheap to clone (`Arc` or handle types).

use std::sync::Arc;

use crate::auth::{JwtService, TelegramVerifier};
use crate::core::{Config, Result};
use crate::db::Storage;

#[derive(Clone, Debug)]
pub struct ServerState {
    pub config: Arc<Config>,
    pub storage: Storage,
    pub jwt_service: Arc<JwtService>,
    pub telegram: Arc<TelegramVerifier>,
}

impl ServerState {
    /// Build state from already opened storage
    pub fn with_storage(config: Config, storage: Storage) -> Self {
        let jwt_service = Arc::new(JwtService::with_config(config.jwt.clone()));
        let telegram = Arc::new(TelegramVerifier::new(
            config.telegram_bot_token.clone(),
            config.telegram_auth_max_age_secs,
        ));
        Self {
            config: Arc::new(config),
            storage,
            jwt_service,
            telegram,
        }
    }

    /// Open the database under the work dir and build state
    pub fn initialize(config: &Config) -> Result<Self> {
        let path = config.database_path();
        let storage = Storage::open(&path)?;
        tracing::info!(path = %path.display(), "Database opened");
        Ok(Self::with_storage(config.clone(), storage))
    }

    /// Whether a Telegram account is configured as an admin
    pub fn is_admin_telegram_id(&self, telegram_id: i64) -> bool {
        self.config.is_admin_telegram_id(telegram_id)
    }
}
