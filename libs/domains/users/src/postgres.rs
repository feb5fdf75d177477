use async_trait::async_trait;
use chrono::Utc;
use database::BaseRepository;
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::sea_query::Expr;
use sea_orm::ActiveValue::Set;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, IntoActiveModel,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, SqlErr, TransactionTrait,
};
use uuid::Uuid;

use crate::entity::{reset_password, user};
use crate::error::{UserError, UserResult};
use crate::models::{NewUser, ResetCode, UpdateUser, User};
use crate::repository::UserRepository;

pub struct PgUserRepository {
    base: BaseRepository<user::Entity>,
}

impl PgUserRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    async fn find_model(&self, id: Uuid, context: &str) -> UserResult<user::Model> {
        self.base
            .find_by_id(id)
            .await
            .map_err(|e| {
                tracing::error!("Database error fetching user: {:?}", e);
                UserError::Internal(context.to_string())
            })?
            .ok_or_else(|| UserError::NotFound("Usuario no encontrado".to_string()))
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn create(&self, new: NewUser) -> UserResult<User> {
        let now = Utc::now();
        let active_model = user::ActiveModel {
            id: Set(Uuid::now_v7()),
            email: Set(new.email),
            password_hash: Set(new.password_hash),
            name: Set(new.name),
            last_name: Set(new.last_name),
            is_mod: Set(false),
            is_admin: Set(false),
            is_active: Set(true),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };

        let model = self.base.insert(active_model).await.map_err(|e| {
            if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
                UserError::AlreadyExists
            } else {
                tracing::error!("Database error creating user: {:?}", e);
                UserError::Internal("Error al intentar crear el usuario".to_string())
            }
        })?;

        tracing::info!(user_id = %model.id, "Created user");
        Ok(model.into())
    }

    async fn get_by_id(&self, id: Uuid) -> UserResult<Option<User>> {
        let model = self.base.find_by_id(id).await.map_err(|e| {
            tracing::error!("Database error fetching user: {:?}", e);
            UserError::Internal("Error al intentar obtener el usuario".to_string())
        })?;

        Ok(model.map(Into::into))
    }

    async fn get_auth_by_email(&self, email: &str) -> UserResult<Option<(User, String)>> {
        let model = user::Entity::find()
            .filter(user::Column::Email.eq(email))
            .one(self.base.db())
            .await
            .map_err(|e| {
                tracing::error!("Database error fetching user: {:?}", e);
                UserError::Internal("Error al intentar obtener al usuario".to_string())
            })?;

        Ok(model.map(|m| {
            let hash = m.password_hash.clone();
            (m.into(), hash)
        }))
    }

    async fn get_password_hash(&self, id: Uuid) -> UserResult<Option<String>> {
        let model = self.base.find_by_id(id).await.map_err(|e| {
            tracing::error!("Database error fetching user: {:?}", e);
            UserError::Internal("Error al intentar obtener el usuario".to_string())
        })?;

        Ok(model.map(|m| m.password_hash))
    }

    async fn list<'a>(
        &self,
        offset: u64,
        limit: u64,
        search: Option<&'a str>,
    ) -> UserResult<(Vec<User>, u64)> {
        let mut query = user::Entity::find();
        if let Some(term) = search {
            // ILIKE; LIKE is case-sensitive on Postgres
            let pattern = format!("%{term}%");
            query = query.filter(
                Condition::any()
                    .add(Expr::col((user::Entity, user::Column::Name)).ilike(pattern.clone()))
                    .add(Expr::col((user::Entity, user::Column::Email)).ilike(pattern)),
            );
        }

        let internal = |e| {
            tracing::error!("Database error listing users: {:?}", e);
            UserError::Internal("Error al intentar obtener los usuarios".to_string())
        };

        let total = query.clone().count(self.base.db()).await.map_err(internal)?;

        let models = query
            .order_by_desc(user::Column::IsActive)
            .order_by_desc(user::Column::CreatedAt)
            .offset(offset)
            .limit(limit)
            .all(self.base.db())
            .await
            .map_err(internal)?;

        Ok((models.into_iter().map(Into::into).collect(), total))
    }

    async fn update(&self, id: Uuid, input: UpdateUser) -> UserResult<User> {
        let model = self
            .find_model(id, "Error al intentar obtener el usuario")
            .await?;

        let mut active_model = model.into_active_model();
        if let Some(name) = input.name {
            active_model.name = Set(name);
        }
        if let Some(last_name) = input.last_name {
            active_model.last_name = Set(last_name);
        }
        active_model.updated_at = Set(Utc::now().into());

        let updated = self.base.update(active_model).await.map_err(|e| {
            tracing::error!("Database error updating user: {:?}", e);
            UserError::Internal("Error al intentar actualizar el usuario".to_string())
        })?;

        Ok(updated.into())
    }

    async fn set_password(&self, id: Uuid, password_hash: String) -> UserResult<()> {
        let model = self
            .find_model(id, "Error al intentar cambiar la contraseña")
            .await?;

        let mut active_model = model.into_active_model();
        active_model.password_hash = Set(password_hash);
        active_model.updated_at = Set(Utc::now().into());

        self.base.update(active_model).await.map_err(|e| {
            tracing::error!("Database error changing password: {:?}", e);
            UserError::Internal("Error al intentar cambiar la contraseña".to_string())
        })?;

        Ok(())
    }

    async fn set_account_options(
        &self,
        id: Uuid,
        is_active: bool,
        is_mod: bool,
    ) -> UserResult<User> {
        let model = self
            .find_model(id, "Error al intentar cambiar la cuenta")
            .await?;

        let mut active_model = model.into_active_model();
        active_model.is_active = Set(is_active);
        active_model.is_mod = Set(is_mod);
        active_model.updated_at = Set(Utc::now().into());

        let updated = self.base.update(active_model).await.map_err(|e| {
            tracing::error!("Database error changing account options: {:?}", e);
            UserError::Internal("Error al intentar cambiar la cuenta".to_string())
        })?;

        Ok(updated.into())
    }

    async fn insert_reset_code(&self, code: ResetCode) -> UserResult<ResetCode> {
        let active_model: reset_password::ActiveModel = code.into();

        let model = active_model
            .insert(self.base.db())
            .await
            .map_err(|e| {
                tracing::error!("Database error creating reset code: {:?}", e);
                UserError::Internal(
                    "Error al crear el código de seguridad para el reset de la contraseña"
                        .to_string(),
                )
            })?;

        Ok(model.into())
    }

    async fn get_reset_code(&self, code: &str) -> UserResult<Option<ResetCode>> {
        let model = reset_password::Entity::find()
            .filter(reset_password::Column::Code.eq(code))
            .one(self.base.db())
            .await
            .map_err(|e| {
                tracing::error!("Database error fetching reset code: {:?}", e);
                UserError::Internal(
                    "Error al validar el código de seguridad para el reset de la contraseña"
                        .to_string(),
                )
            })?;

        Ok(model.map(Into::into))
    }

    async fn consume_reset_code(&self, code: &str, password_hash: String) -> UserResult<User> {
        let internal = |e| {
            tracing::error!("Database error resetting password: {:?}", e);
            UserError::Internal("Error al resetear la contraseña".to_string())
        };

        let txn = self.base.db().begin().await.map_err(internal)?;

        let reset = reset_password::Entity::find()
            .filter(reset_password::Column::Code.eq(code))
            .one(&txn)
            .await
            .map_err(internal)?
            .ok_or_else(|| UserError::NotFound("Código de seguridad no encontrado".to_string()))?;

        let user_id = reset.user_id;
        let mut reset_active = reset.into_active_model();
        reset_active.is_used = Set(true);
        reset_active.update(&txn).await.map_err(internal)?;

        let user_model = user::Entity::find_by_id(user_id)
            .one(&txn)
            .await
            .map_err(internal)?
            .ok_or_else(|| UserError::NotFound("Usuario no encontrado".to_string()))?;

        let mut user_active = user_model.into_active_model();
        user_active.password_hash = Set(password_hash);
        user_active.updated_at = Set(Utc::now().into());
        let updated = user_active.update(&txn).await.map_err(internal)?;

        txn.commit().await.map_err(internal)?;

        tracing::info!(user_id = %user_id, "Password reset through recovery code");
        Ok(updated.into())
    }
}
