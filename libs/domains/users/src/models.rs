use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Account as exposed to clients, never carries the password hash.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub last_name: String,
    pub is_mod: bool,
    pub is_admin: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Role claims issued into JWTs. Admin implies every other role check.
    pub fn roles(&self) -> Vec<String> {
        if self.is_admin {
            vec!["admin".to_string()]
        } else if self.is_mod {
            vec!["mod".to_string()]
        } else {
            Vec::new()
        }
    }
}

/// New account ready for insertion, password already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub name: String,
    pub last_name: String,
}

/// DTO for registration
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterUser {
    #[validate(email(message = "Correo electrónico incorrecto"))]
    pub email: String,
    #[validate(length(min = 2, max = 150, message = "Nombre es requerido"))]
    pub name: String,
    #[validate(length(min = 2, max = 150, message = "Apellido es requerido"))]
    pub last_name: String,
    #[validate(length(min = 8, message = "La contraseña debe tener al menos 8 caracteres"))]
    pub password: String,
    pub password_confirm: String,
}

/// DTO for login
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct LoginUser {
    #[validate(email(message = "Correo electrónico incorrecto"))]
    pub email: String,
    #[validate(length(min = 1, message = "Contraseña es requerida"))]
    pub password: String,
}

/// DTO for profile updates
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUser {
    #[validate(length(min = 2, max = 150, message = "Nombre es requerido"))]
    pub name: Option<String>,
    #[validate(length(min = 2, max = 150, message = "Apellido es requerido"))]
    pub last_name: Option<String>,
}

/// DTO for an authenticated password change
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChangePassword {
    #[validate(length(min = 1, message = "Contraseña es requerida"))]
    pub current_password: String,
    #[validate(length(min = 8, message = "La contraseña debe tener al menos 8 caracteres"))]
    pub password: String,
    pub password_confirm: String,
}

/// Role assignable from the admin account panel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum AccountRole {
    Client,
    Mod,
}

/// DTO for the admin account toggle
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AccountSettings {
    pub is_active: bool,
    pub role: AccountRole,
}

/// DTO for confirming a password reset
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordConfirm {
    #[validate(length(min = 8, message = "La contraseña debe tener al menos 8 caracteres"))]
    pub new_password: String,
    pub new_password_confirm: String,
}

/// Single-use password recovery code
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResetCode {
    pub id: Uuid,
    pub code: String,
    pub user_id: Uuid,
    pub expired_at: DateTime<Utc>,
    pub is_used: bool,
    pub created_at: DateTime<Utc>,
}
