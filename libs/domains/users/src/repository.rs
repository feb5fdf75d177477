use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{UserError, UserResult};
use crate::models::{NewUser, ResetCode, UpdateUser, User};

/// Repository trait for account persistence and recovery codes
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, new: NewUser) -> UserResult<User>;

    async fn get_by_id(&self, id: Uuid) -> UserResult<Option<User>>;

    /// Account plus its password hash, for credential checks
    async fn get_auth_by_email(&self, email: &str) -> UserResult<Option<(User, String)>>;

    async fn get_password_hash(&self, id: Uuid) -> UserResult<Option<String>>;

    /// Page of accounts with the total count. Active accounts sort
    /// before deactivated ones, newest first within each group.
    async fn list<'a>(
        &self,
        offset: u64,
        limit: u64,
        search: Option<&'a str>,
    ) -> UserResult<(Vec<User>, u64)>;

    async fn update(&self, id: Uuid, input: UpdateUser) -> UserResult<User>;

    async fn set_password(&self, id: Uuid, password_hash: String) -> UserResult<()>;

    async fn set_account_options(
        &self,
        id: Uuid,
        is_active: bool,
        is_mod: bool,
    ) -> UserResult<User>;

    async fn insert_reset_code(&self, code: ResetCode) -> UserResult<ResetCode>;

    async fn get_reset_code(&self, code: &str) -> UserResult<Option<ResetCode>>;

    /// Marks the code used and swaps the owner's password in one unit.
    async fn consume_reset_code(&self, code: &str, password_hash: String) -> UserResult<User>;
}

/// In-memory implementation of UserRepository (for development/testing)
#[derive(Debug, Default, Clone)]
pub struct InMemoryUserRepository {
    users: Arc<RwLock<HashMap<Uuid, (User, String)>>>,
    codes: Arc<RwLock<HashMap<String, ResetCode>>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, new: NewUser) -> UserResult<User> {
        let mut users = self.users.write().await;

        let email_taken = users
            .values()
            .any(|(u, _)| u.email.eq_ignore_ascii_case(&new.email));
        if email_taken {
            return Err(UserError::AlreadyExists);
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::now_v7(),
            email: new.email,
            name: new.name,
            last_name: new.last_name,
            is_mod: false,
            is_admin: false,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        users.insert(user.id, (user.clone(), new.password_hash));

        tracing::info!(user_id = %user.id, "Created user");
        Ok(user)
    }

    async fn get_by_id(&self, id: Uuid) -> UserResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.get(&id).map(|(u, _)| u.clone()))
    }

    async fn get_auth_by_email(&self, email: &str) -> UserResult<Option<(User, String)>> {
        let users = self.users.read().await;
        Ok(users
            .values()
            .find(|(u, _)| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn get_password_hash(&self, id: Uuid) -> UserResult<Option<String>> {
        let users = self.users.read().await;
        Ok(users.get(&id).map(|(_, hash)| hash.clone()))
    }

    async fn list<'a>(
        &self,
        offset: u64,
        limit: u64,
        search: Option<&'a str>,
    ) -> UserResult<(Vec<User>, u64)> {
        let users = self.users.read().await;

        let needle = search.map(str::to_lowercase);
        let mut matching: Vec<User> = users
            .values()
            .map(|(u, _)| u.clone())
            .filter(|u| match &needle {
                Some(n) => {
                    u.name.to_lowercase().contains(n) || u.email.to_lowercase().contains(n)
                }
                None => true,
            })
            .collect();

        matching.sort_by(|a, b| {
            b.is_active
                .cmp(&a.is_active)
                .then(b.created_at.cmp(&a.created_at))
        });

        let total = matching.len() as u64;
        let page = matching
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect();

        Ok((page, total))
    }

    async fn update(&self, id: Uuid, input: UpdateUser) -> UserResult<User> {
        let mut users = self.users.write().await;

        let (user, _) = users
            .get_mut(&id)
            .ok_or_else(|| UserError::NotFound("Usuario no encontrado".to_string()))?;

        if let Some(name) = input.name {
            user.name = name;
        }
        if let Some(last_name) = input.last_name {
            user.last_name = last_name;
        }
        user.updated_at = Utc::now();
        Ok(user.clone())
    }

    async fn set_password(&self, id: Uuid, password_hash: String) -> UserResult<()> {
        let mut users = self.users.write().await;

        let entry = users
            .get_mut(&id)
            .ok_or_else(|| UserError::NotFound("Usuario no encontrado".to_string()))?;
        entry.1 = password_hash;
        entry.0.updated_at = Utc::now();
        Ok(())
    }

    async fn set_account_options(
        &self,
        id: Uuid,
        is_active: bool,
        is_mod: bool,
    ) -> UserResult<User> {
        let mut users = self.users.write().await;

        let (user, _) = users
            .get_mut(&id)
            .ok_or_else(|| UserError::NotFound("Usuario no encontrado".to_string()))?;
        user.is_active = is_active;
        user.is_mod = is_mod;
        user.updated_at = Utc::now();
        Ok(user.clone())
    }

    async fn insert_reset_code(&self, code: ResetCode) -> UserResult<ResetCode> {
        let mut codes = self.codes.write().await;
        codes.insert(code.code.clone(), code.clone());
        Ok(code)
    }

    async fn get_reset_code(&self, code: &str) -> UserResult<Option<ResetCode>> {
        let codes = self.codes.read().await;
        Ok(codes.get(code).cloned())
    }

    async fn consume_reset_code(&self, code: &str, password_hash: String) -> UserResult<User> {
        let mut codes = self.codes.write().await;
        let reset = codes
            .get_mut(code)
            .ok_or_else(|| UserError::NotFound("Código de seguridad no encontrado".to_string()))?;
        reset.is_used = true;
        let user_id = reset.user_id;
        drop(codes);

        let mut users = self.users.write().await;
        let entry = users
            .get_mut(&user_id)
            .ok_or_else(|| UserError::NotFound("Usuario no encontrado".to_string()))?;
        entry.1 = password_hash;
        entry.0.updated_at = Utc::now();
        Ok(entry.0.clone())
    }
}
