use async_trait::async_trait;
use database::BaseRepository;
use sea_orm::{DatabaseConnection, EntityTrait, QueryOrder, SqlErr};
use uuid::Uuid;

use crate::entity;
use crate::error::{UnityError, UnityResult};
use crate::models::{CreateUnity, Unity, UpdateUnity};
use crate::repository::UnityRepository;

pub struct PgUnityRepository {
    base: BaseRepository<entity::Entity>,
}

impl PgUnityRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }
}

#[async_trait]
impl UnityRepository for PgUnityRepository {
    async fn create(&self, input: CreateUnity) -> UnityResult<Unity> {
        let active_model: entity::ActiveModel = Unity::new(input).into();

        let model = self.base.insert(active_model).await.map_err(|e| {
            if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
                UnityError::AlreadyExists
            } else {
                tracing::error!("Database error creating unity: {:?}", e);
                UnityError::Internal("Error al intentar crear una unidad".to_string())
            }
        })?;

        tracing::info!(unity_id = %model.id, "Created unity");
        Ok(model.into())
    }

    async fn get_by_id(&self, id: Uuid) -> UnityResult<Option<Unity>> {
        let model = self.base.find_by_id(id).await.map_err(|e| {
            tracing::error!("Database error fetching unity: {:?}", e);
            UnityError::Internal("Error al intentar obtener la unidad".to_string())
        })?;

        Ok(model.map(Into::into))
    }

    async fn list(&self) -> UnityResult<Vec<Unity>> {
        let models = entity::Entity::find()
            .order_by_desc(entity::Column::CreatedAt)
            .all(self.base.db())
            .await
            .map_err(|e| {
                tracing::error!("Database error listing unities: {:?}", e);
                UnityError::Internal("Error al intentar obtener las unidades".to_string())
            })?;

        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn update(&self, id: Uuid, input: UpdateUnity) -> UnityResult<Unity> {
        let model = self
            .base
            .find_by_id(id)
            .await
            .map_err(|e| {
                tracing::error!("Database error fetching unity: {:?}", e);
                UnityError::Internal("Error al intentar obtener la unidad".to_string())
            })?
            .ok_or(UnityError::NotFound)?;

        let mut unity: Unity = model.into();
        unity.apply_update(input);

        let active_model: entity::ActiveModel = unity.into();
        let updated = self.base.update(active_model).await.map_err(|e| {
            if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
                UnityError::AlreadyExists
            } else {
                tracing::error!("Database error updating unity: {:?}", e);
                UnityError::Internal("Error al intentar actualizar la unidad".to_string())
            }
        })?;

        Ok(updated.into())
    }

    async fn delete(&self, id: Uuid) -> UnityResult<Unity> {
        let model = self
            .base
            .find_by_id(id)
            .await
            .map_err(|e| {
                tracing::error!("Database error fetching unity: {:?}", e);
                UnityError::Internal("Error al intentar obtener la unidad".to_string())
            })?
            .ok_or(UnityError::NotFound)?;

        let unity: Unity = model.into();

        self.base.delete_by_id(id).await.map_err(|e| {
            tracing::error!("Database error deleting unity: {:?}", e);
            UnityError::Internal("Error al intentar eliminar la unidad".to_string())
        })?;

        tracing::info!(unity_id = %id, "Deleted unity");
        Ok(unity)
    }
}
