//! User Repository

use crate::db::Storage;
use crate::db::storage::USERS_TABLE;
use shared::error::{AppError, ErrorCode};
use shared::models::{TelegramUser, User, UserRole, UserUpdate};
use shared::util::snowflake_id;

use super::{RepoResult, found};

#[derive(Clone)]
pub struct UserRepository {
    storage: Storage,
}

impl UserRepository {
    pub fn new(storage: Storage) -> Self {
        Self { storage }
    }

    pub fn find_by_id(&self, id: i64) -> RepoResult<Option<User>> {
        Ok(self.storage.get(USERS_TABLE, id)?)
    }

    pub fn get(&self, id: i64) -> RepoResult<User> {
        found(self.find_by_id(id)?, ErrorCode::UserNotFound)
    }

    /// Create or refresh the account behind a verified Telegram identity
    ///
    /// Username and avatar follow Telegram on every sign-in; the display
    /// name is only set on creation so profile edits survive.
    pub fn upsert_telegram(&self, tg: &TelegramUser, is_admin: bool, now: i64) -> RepoResult<User> {
        let txn = self.storage.begin_write()?;

        let existing = match self.storage.user_id_for_telegram_txn(&txn, tg.id)? {
            Some(id) => self.storage.get_txn::<User>(&txn, USERS_TABLE, id)?,
            None => None,
        };

        let user = match existing {
            Some(mut user) => {
                if let Some(username) = &tg.username {
                    user.username = username.clone();
                }
                if tg.photo_url.is_some() {
                    user.avatar_url = tg.photo_url.clone();
                }
                if is_admin {
                    user.role = UserRole::Admin;
                } else if user.role == UserRole::Admin {
                    user.role = UserRole::Buyer;
                }
                user
            }
            None => {
                let user = User {
                    id: snowflake_id(),
                    telegram_id: Some(tg.id),
                    username: tg
                        .username
                        .clone()
                        .unwrap_or_else(|| format!("tg{}", tg.id)),
                    display_name: tg.display_name(),
                    avatar_url: tg.photo_url.clone(),
                    role: if is_admin { UserRole::Admin } else { UserRole::Buyer },
                    wallet_address: None,
                    created_at: now,
                };
                self.storage.link_telegram(&txn, tg.id, user.id)?;
                tracing::info!(user_id = user.id, telegram_id = tg.id, "Created user from Telegram sign-in");
                user
            }
        };

        self.storage.put(&txn, USERS_TABLE, user.id, &user)?;
        txn.commit()?;
        Ok(user)
    }

    /// Apply a profile update
    ///
    /// Only admins may grant the admin role.
    pub fn update(&self, id: i64, update: UserUpdate, is_admin: bool) -> RepoResult<User> {
        if update.role == Some(UserRole::Admin) && !is_admin {
            return Err(AppError::new(ErrorCode::AdminRequired).into());
        }

        let txn = self.storage.begin_write()?;
        let mut user = found(
            self.storage.get_txn::<User>(&txn, USERS_TABLE, id)?,
            ErrorCode::UserNotFound,
        )?;

        if let Some(name) = update.display_name {
            let name = name.trim();
            if name.is_empty() {
                return Err(AppError::validation("displayName must not be empty").into());
            }
            user.display_name = name.to_string();
        }
        if let Some(avatar) = update.avatar_url {
            user.avatar_url = non_blank(avatar);
        }
        if let Some(wallet) = update.wallet_address {
            user.wallet_address = non_blank(wallet);
        }
        if let Some(role) = update.role {
            user.role = role;
        }

        self.storage.put(&txn, USERS_TABLE, user.id, &user)?;
        txn.commit()?;
        Ok(user)
    }
}

fn non_blank(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tg(id: i64, username: Option<&str>) -> TelegramUser {
        TelegramUser {
            id,
            first_name: Some("Мария".into()),
            last_name: None,
            username: username.map(str::to_string),
            photo_url: None,
        }
    }

    #[test]
    fn telegram_upsert_is_idempotent() {
        let repo = UserRepository::new(Storage::open_in_memory().unwrap());

        let first = repo.upsert_telegram(&tg(900, Some("maria")), false, 1).unwrap();
        let second = repo.upsert_telegram(&tg(900, Some("maria_new")), false, 2).unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.username, "maria_new");
        assert_eq!(second.display_name, "Мария");
        assert_eq!(second.created_at, 1);
        assert_eq!(repo.get(first.id).unwrap().username, "maria_new");
    }

    #[test]
    fn admin_role_follows_admin_list() {
        let repo = UserRepository::new(Storage::open_in_memory().unwrap());
        let admin = repo.upsert_telegram(&tg(1, None), true, 1).unwrap();
        assert_eq!(admin.role, UserRole::Admin);
        assert_eq!(admin.username, "tg1");

        let demoted = repo.upsert_telegram(&tg(1, None), false, 2).unwrap();
        assert_eq!(demoted.role, UserRole::Buyer);
    }

    #[test]
    fn profile_update_rules() {
        let repo = UserRepository::new(Storage::open_in_memory().unwrap());
        let user = repo.upsert_telegram(&tg(5, Some("seller")), false, 1).unwrap();

        let updated = repo
            .update(
                user.id,
                UserUpdate {
                    display_name: Some("  Лавка Марии ".into()),
                    wallet_address: Some("UQBx...wallet".into()),
                    role: Some(UserRole::Seller),
                    ..Default::default()
                },
                false,
            )
            .unwrap();
        assert_eq!(updated.display_name, "Лавка Марии");
        assert_eq!(updated.role, UserRole::Seller);

        let err: AppError = repo
            .update(
                user.id,
                UserUpdate {
                    role: Some(UserRole::Admin),
                    ..Default::default()
                },
                false,
            )
            .unwrap_err()
            .into();
        assert_eq!(err.code, ErrorCode::AdminRequired);

        let err: AppError = repo.get(12345).unwrap_err().into();
        assert_eq!(err.code, ErrorCode::UserNotFound);
    }
}
