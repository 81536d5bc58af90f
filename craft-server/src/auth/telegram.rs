//! Telegram sign-in verification
//!
//! Two flavours share one check:
//!
//! - **Login Widget**: JSON callback fields, `secret = SHA256(bot_token)`
//! - **Mini-App `initData`**: URL-encoded query string,
//!   `secret = HMAC_SHA256(key = "WebAppData", bot_token)`
//!
//! In both cases the data-check string is every received field except
//! `hash`, as `key=value`, sorted by key and joined with `\n`; the payload is
//! genuine iff `hex(HMAC_SHA256(secret, data_check_string)) == hash`.

use std::collections::BTreeMap;

use ring::hmac;
use serde_json::Value;
use sha2::{Digest, Sha256};
use thiserror::Error;

use shared::error::{AppError, ErrorCode};
use shared::models::{TelegramLoginPayload, TelegramUser};

const WEB_APP_KEY: &[u8] = b"WebAppData";

#[derive(Debug, Error, PartialEq)]
pub enum TelegramAuthError {
    #[error("Telegram sign-in is not configured")]
    NotConfigured,

    #[error("missing field: {0}")]
    MissingField(&'static str),

    #[error("malformed payload: {0}")]
    Malformed(String),

    #[error("signature mismatch")]
    InvalidSignature,

    #[error("auth_date is too old")]
    Expired,
}

impl From<TelegramAuthError> for AppError {
    fn from(err: TelegramAuthError) -> Self {
        let code = match err {
            TelegramAuthError::NotConfigured => ErrorCode::TelegramNotConfigured,
            TelegramAuthError::MissingField(_) | TelegramAuthError::Malformed(_) => {
                ErrorCode::InvalidRequest
            }
            TelegramAuthError::InvalidSignature => ErrorCode::TelegramSignatureInvalid,
            TelegramAuthError::Expired => ErrorCode::TelegramAuthExpired,
        };
        AppError::with_message(code, err.to_string())
    }
}

/// Verifies Telegram payloads against the bot token
#[derive(Clone)]
pub struct TelegramVerifier {
    bot_token: Option<String>,
    max_age_secs: i64,
}

impl std::fmt::Debug for TelegramVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramVerifier")
            .field("configured", &self.bot_token.is_some())
            .field("max_age_secs", &self.max_age_secs)
            .finish()
    }
}

impl TelegramVerifier {
    pub fn new(bot_token: Option<String>, max_age_secs: i64) -> Self {
        Self {
            bot_token,
            max_age_secs,
        }
    }

    fn bot_token(&self) -> Result<&str, TelegramAuthError> {
        self.bot_token
            .as_deref()
            .ok_or(TelegramAuthError::NotConfigured)
    }

    /// Verify a Login Widget callback
    pub fn verify_login(
        &self,
        payload: &TelegramLoginPayload,
        now_secs: i64,
    ) -> Result<TelegramUser, TelegramAuthError> {
        let bot_token = self.bot_token()?;
        let fields = login_fields(payload)?;
        let key = login_key(bot_token);
        verify_fields(&key, &fields, &payload.hash)?;
        self.check_age(payload.auth_date, now_secs)?;
        Ok(TelegramUser::from(payload))
    }

    /// Verify a Mini-App `initData` string
    pub fn verify_init_data(
        &self,
        init_data: &str,
        now_secs: i64,
    ) -> Result<TelegramUser, TelegramAuthError> {
        let bot_token = self.bot_token()?;
        let mut fields: BTreeMap<String, String> = url::form_urlencoded::parse(init_data.as_bytes())
            .into_owned()
            .collect();
        let hash = fields
            .remove("hash")
            .ok_or(TelegramAuthError::MissingField("hash"))?;

        let key = web_app_key(bot_token);
        verify_fields(&key, &fields, &hash)?;

        let auth_date = fields
            .get("auth_date")
            .ok_or(TelegramAuthError::MissingField("auth_date"))?
            .parse::<i64>()
            .map_err(|e| TelegramAuthError::Malformed(format!("auth_date: {e}")))?;
        self.check_age(auth_date, now_secs)?;

        let user_json = fields
            .get("user")
            .ok_or(TelegramAuthError::MissingField("user"))?;
        serde_json::from_str(user_json)
            .map_err(|e| TelegramAuthError::Malformed(format!("user: {e}")))
    }

    fn check_age(&self, auth_date: i64, now_secs: i64) -> Result<(), TelegramAuthError> {
        if now_secs - auth_date > self.max_age_secs {
            return Err(TelegramAuthError::Expired);
        }
        Ok(())
    }
}

/// `key=value` lines sorted by key, joined with `\n`
pub fn data_check_string(fields: &BTreeMap<String, String>) -> String {
    fields
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Hex signature a genuine Login Widget payload carries
pub fn sign_login_fields(bot_token: &str, fields: &BTreeMap<String, String>) -> String {
    sign(&login_key(bot_token), fields)
}

/// Hex signature a genuine Mini-App `initData` carries
pub fn sign_init_data_fields(bot_token: &str, fields: &BTreeMap<String, String>) -> String {
    sign(&web_app_key(bot_token), fields)
}

/// Flatten the callback into string fields, without `hash`
pub fn login_fields(
    payload: &TelegramLoginPayload,
) -> Result<BTreeMap<String, String>, TelegramAuthError> {
    let value = serde_json::to_value(payload)
        .map_err(|e| TelegramAuthError::Malformed(e.to_string()))?;
    let Value::Object(map) = value else {
        return Err(TelegramAuthError::Malformed("expected an object".into()));
    };

    let mut fields = BTreeMap::new();
    for (key, value) in map {
        if key == "hash" {
            continue;
        }
        let text = match value {
            Value::Null => continue,
            Value::String(s) => s,
            other => other.to_string(),
        };
        fields.insert(key, text);
    }
    Ok(fields)
}

fn login_key(bot_token: &str) -> hmac::Key {
    let secret = Sha256::digest(bot_token.as_bytes());
    hmac::Key::new(hmac::HMAC_SHA256, &secret)
}

fn web_app_key(bot_token: &str) -> hmac::Key {
    let outer = hmac::Key::new(hmac::HMAC_SHA256, WEB_APP_KEY);
    let secret = hmac::sign(&outer, bot_token.as_bytes());
    hmac::Key::new(hmac::HMAC_SHA256, secret.as_ref())
}

fn sign(key: &hmac::Key, fields: &BTreeMap<String, String>) -> String {
    hex::encode(hmac::sign(key, data_check_string(fields).as_bytes()))
}

fn verify_fields(
    key: &hmac::Key,
    fields: &BTreeMap<String, String>,
    hash: &str,
) -> Result<(), TelegramAuthError> {
    let expected = hex::decode(hash).map_err(|_| TelegramAuthError::InvalidSignature)?;
    hmac::verify(key, data_check_string(fields).as_bytes(), &expected)
        .map_err(|_| TelegramAuthError::InvalidSignature)
}
