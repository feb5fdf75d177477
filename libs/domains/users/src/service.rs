use chrono::{Duration, Utc};
use rand::Rng;
use regex::Regex;
use std::sync::Arc;
use std::sync::LazyLock;
use uuid::Uuid;
use validator::Validate;

use crate::error::{UserError, UserResult};
use crate::models::{
    AccountRole, AccountSettings, ChangePassword, LoginUser, NewUser, RegisterUser, ResetCode,
    ResetPasswordConfirm, UpdateUser, User,
};
use crate::password::{hash_password, verify_password};
use crate::repository::UserRepository;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email regex")
});

/// Recovery codes stay valid for one hour.
const RESET_CODE_TTL_HOURS: i64 = 1;

fn check_passwords_match(password: &str, confirm: &str) -> UserResult<()> {
    if password != confirm {
        return Err(UserError::Validation(
            "Las contraseñas no coinciden".to_string(),
        ));
    }
    Ok(())
}

/// Service layer for accounts, credentials and password recovery
#[derive(Clone)]
pub struct UserService<R: UserRepository> {
    repository: Arc<R>,
}

impl<R: UserRepository> UserService<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    pub async fn register(&self, input: RegisterUser) -> UserResult<User> {
        input
            .validate()
            .map_err(|e| UserError::Validation(e.to_string()))?;
        check_passwords_match(&input.password, &input.password_confirm)?;

        let password_hash = hash_password(&input.password)?;
        self.repository
            .create(NewUser {
                email: input.email,
                password_hash,
                name: input.name,
                last_name: input.last_name,
            })
            .await
    }

    pub async fn login(&self, input: LoginUser) -> UserResult<User> {
        input
            .validate()
            .map_err(|e| UserError::Validation(e.to_string()))?;

        let (user, password_hash) = self
            .repository
            .get_auth_by_email(&input.email)
            .await?
            .ok_or_else(|| UserError::NotFound("Usuario no encontrado".to_string()))?;

        if !verify_password(&input.password, &password_hash) {
            return Err(UserError::Unauthorized("Contraseña incorrecta".to_string()));
        }

        Ok(user)
    }

    pub async fn get_user(&self, id: Uuid) -> UserResult<User> {
        self.repository
            .get_by_id(id)
            .await?
            .ok_or_else(|| UserError::NotFound("Usuario no encontrado".to_string()))
    }

    pub async fn list_users(
        &self,
        offset: u64,
        limit: u64,
        search: Option<&str>,
    ) -> UserResult<(Vec<User>, u64)> {
        self.repository.list(offset, limit, search).await
    }

    /// Profile update, allowed for the owner or an admin.
    pub async fn update_profile(
        &self,
        id: Uuid,
        actor_id: Uuid,
        actor_is_admin: bool,
        input: UpdateUser,
    ) -> UserResult<User> {
        if id != actor_id && !actor_is_admin {
            return Err(UserError::Unauthorized(
                "No tienes permisos para realizar esta acción".to_string(),
            ));
        }

        input
            .validate()
            .map_err(|e| UserError::Validation(e.to_string()))?;

        self.repository.update(id, input).await
    }

    pub async fn change_password(&self, id: Uuid, input: ChangePassword) -> UserResult<()> {
        input
            .validate()
            .map_err(|e| UserError::Validation(e.to_string()))?;
        check_passwords_match(&input.password, &input.password_confirm)?;

        if input.current_password == input.password {
            return Err(UserError::Validation(
                "La nueva contraseña no puede ser igual a la actual".to_string(),
            ));
        }

        let current_hash = self
            .repository
            .get_password_hash(id)
            .await?
            .ok_or_else(|| UserError::NotFound("Usuario no encontrado".to_string()))?;

        if !verify_password(&input.current_password, &current_hash) {
            return Err(UserError::Validation("Contraseña incorrecta".to_string()));
        }

        let new_hash = hash_password(&input.password)?;
        self.repository.set_password(id, new_hash).await
    }

    pub async fn change_account_options(
        &self,
        id: Uuid,
        settings: AccountSettings,
    ) -> UserResult<User> {
        self.repository
            .set_account_options(id, settings.is_active, settings.role == AccountRole::Mod)
            .await
    }

    /// Issues a recovery code for the account behind `email`. The code
    /// itself reaches the user out of band; it is never part of the
    /// HTTP response.
    pub async fn reset_password_send(&self, email: &str) -> UserResult<ResetCode> {
        if email.is_empty() {
            return Err(UserError::Validation(
                "Correo electrónico es obligatorio".to_string(),
            ));
        }
        if !EMAIL_RE.is_match(email) {
            return Err(UserError::Validation(
                "Correo electrónico incorrecto".to_string(),
            ));
        }

        let (user, _) = self
            .repository
            .get_auth_by_email(email)
            .await?
            .ok_or_else(|| UserError::NotFound("Usuario no encontrado".to_string()))?;

        let code = format!("{:08X}", rand::rng().random::<u32>());
        let now = Utc::now();
        let reset = self
            .repository
            .insert_reset_code(ResetCode {
                id: Uuid::now_v7(),
                code,
                user_id: user.id,
                expired_at: now + Duration::hours(RESET_CODE_TTL_HOURS),
                is_used: false,
                created_at: now,
            })
            .await?;

        tracing::info!(user_id = %user.id, "Issued password recovery code");
        Ok(reset)
    }

    pub async fn reset_password_validate(&self, code: &str) -> UserResult<ResetCode> {
        if code.is_empty() {
            return Err(UserError::Validation(
                "Código de seguridad es obligatorio".to_string(),
            ));
        }

        let reset = self
            .repository
            .get_reset_code(code)
            .await?
            .ok_or_else(|| {
                UserError::NotFound("Código de seguridad no encontrado".to_string())
            })?;

        if reset.is_used {
            return Err(UserError::Validation(
                "Código de seguridad ya utilizado".to_string(),
            ));
        }
        if reset.expired_at < Utc::now() {
            return Err(UserError::Unauthorized(
                "Código de seguridad expirado".to_string(),
            ));
        }

        Ok(reset)
    }

    pub async fn reset_password_confirm(
        &self,
        code: &str,
        input: ResetPasswordConfirm,
    ) -> UserResult<User> {
        input
            .validate()
            .map_err(|e| UserError::Validation(e.to_string()))?;
        check_passwords_match(&input.new_password, &input.new_password_confirm)?;

        self.reset_password_validate(code).await?;

        let new_hash = hash_password(&input.new_password)?;
        self.repository.consume_reset_code(code, new_hash).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::InMemoryUserRepository;

    fn register_input(email: &str) -> RegisterUser {
        RegisterUser {
            email: email.to_string(),
            name: "María".to_string(),
            last_name: "Pérez".to_string(),
            password: "secreto-123".to_string(),
            password_confirm: "secreto-123".to_string(),
        }
    }

    #[tokio::test]
    async fn register_then_login() {
        let service = UserService::new(InMemoryUserRepository::new());
        service.register(register_input("maria@example.com")).await.unwrap();

        let user = service
            .login(LoginUser {
                email: "maria@example.com".to_string(),
                password: "secreto-123".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(user.email, "maria@example.com");
        assert!(user.is_active);
    }

    #[tokio::test]
    async fn wrong_password_is_unauthorized() {
        let service = UserService::new(InMemoryUserRepository::new());
        service.register(register_input("maria@example.com")).await.unwrap();

        let result = service
            .login(LoginUser {
                email: "maria@example.com".to_string(),
                password: "otra-cosa-123".to_string(),
            })
            .await;

        assert!(matches!(result, Err(UserError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn mismatched_confirmation_is_rejected() {
        let service = UserService::new(InMemoryUserRepository::new());

        let result = service
            .register(RegisterUser {
                password_confirm: "diferente-123".to_string(),
                ..register_input("maria@example.com")
            })
            .await;

        assert!(matches!(result, Err(UserError::Validation(_))));
    }

    #[tokio::test]
    async fn non_admin_cannot_update_other_profiles() {
        let service = UserService::new(InMemoryUserRepository::new());
        let target = service.register(register_input("a@example.com")).await.unwrap();
        let actor = service.register(register_input("b@example.com")).await.unwrap();

        let result = service
            .update_profile(target.id, actor.id, false, UpdateUser::default())
            .await;

        assert!(matches!(result, Err(UserError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn reset_code_full_cycle() {
        let service = UserService::new(InMemoryUserRepository::new());
        service.register(register_input("maria@example.com")).await.unwrap();

        let reset = service.reset_password_send("maria@example.com").await.unwrap();
        assert_eq!(reset.code.len(), 8);

        service.reset_password_validate(&reset.code).await.unwrap();

        service
            .reset_password_confirm(
                &reset.code,
                ResetPasswordConfirm {
                    new_password: "renovada-456".to_string(),
                    new_password_confirm: "renovada-456".to_string(),
                },
            )
            .await
            .unwrap();

        // Old password no longer works, the new one does
        assert!(service
            .login(LoginUser {
                email: "maria@example.com".to_string(),
                password: "secreto-123".to_string(),
            })
            .await
            .is_err());
        assert!(service
            .login(LoginUser {
                email: "maria@example.com".to_string(),
                password: "renovada-456".to_string(),
            })
            .await
            .is_ok());

        // Codes are single use
        let result = service.reset_password_validate(&reset.code).await;
        assert!(matches!(result, Err(UserError::Validation(_))));
    }

    #[tokio::test]
    async fn new_password_must_differ() {
        let service = UserService::new(InMemoryUserRepository::new());
        let user = service.register(register_input("maria@example.com")).await.unwrap();

        let result = service
            .change_password(
                user.id,
                ChangePassword {
                    current_password: "secreto-123".to_string(),
                    password: "secreto-123".to_string(),
                    password_confirm: "secreto-123".to_string(),
                },
            )
            .await;

        assert!(matches!(result, Err(UserError::Validation(_))));
    }
}
