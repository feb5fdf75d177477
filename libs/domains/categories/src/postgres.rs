use async_trait::async_trait;
use database::BaseRepository;
use sea_orm::ActiveValue::Set;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, SqlErr};
use uuid::Uuid;

use crate::entity;
use crate::error::{CategoryError, CategoryResult};
use crate::models::{Category, CreateCategory, UpdateCategory};
use crate::repository::CategoryRepository;

pub struct PgCategoryRepository {
    base: BaseRepository<entity::Entity>,
}

impl PgCategoryRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }
}

#[async_trait]
impl CategoryRepository for PgCategoryRepository {
    async fn create(&self, user_id: Uuid, input: CreateCategory) -> CategoryResult<Category> {
        let active_model: entity::ActiveModel = Category::new(user_id, input).into();

        let model = self.base.insert(active_model).await.map_err(|e| {
            if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
                CategoryError::AlreadyExists
            } else {
                tracing::error!("Database error creating category: {:?}", e);
                CategoryError::Internal("Error al intentar crear la categoría".to_string())
            }
        })?;

        tracing::info!(category_id = %model.id, "Created category");
        Ok(model.into())
    }

    async fn get_by_id(&self, id: Uuid) -> CategoryResult<Option<Category>> {
        let model = entity::Entity::find_by_id(id)
            .filter(entity::Column::Active.eq(true))
            .one(self.base.db())
            .await
            .map_err(|e| {
                tracing::error!("Database error fetching category: {:?}", e);
                CategoryError::Internal("Error al intentar obtener la categoría".to_string())
            })?;

        Ok(model.map(Into::into))
    }

    async fn list(&self) -> CategoryResult<Vec<Category>> {
        let models = entity::Entity::find()
            .order_by_desc(entity::Column::CreatedAt)
            .all(self.base.db())
            .await
            .map_err(|e| {
                tracing::error!("Database error listing categories: {:?}", e);
                CategoryError::Internal("Error al intentar obtener las categorías".to_string())
            })?;

        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn update(&self, id: Uuid, input: UpdateCategory) -> CategoryResult<Category> {
        let model = self
            .base
            .find_by_id(id)
            .await
            .map_err(|e| {
                tracing::error!("Database error fetching category: {:?}", e);
                CategoryError::Internal("Error al intentar obtener la categoría".to_string())
            })?
            .ok_or(CategoryError::NotFound)?;

        let mut category: Category = model.into();
        category.apply_update(input);

        let active_model: entity::ActiveModel = category.into();
        let updated = self.base.update(active_model).await.map_err(|e| {
            if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
                CategoryError::AlreadyExists
            } else {
                tracing::error!("Database error updating category: {:?}", e);
                CategoryError::Internal("Error al intentar actualizar la categoría".to_string())
            }
        })?;

        Ok(updated.into())
    }

    async fn delete(&self, id: Uuid) -> CategoryResult<Category> {
        let model = self
            .base
            .find_by_id(id)
            .await
            .map_err(|e| {
                tracing::error!("Database error fetching category: {:?}", e);
                CategoryError::Internal("Error al intentar obtener la categoría".to_string())
            })?
            .ok_or(CategoryError::NotFound)?;

        let category: Category = model.into();

        self.base.delete_by_id(id).await.map_err(|e| {
            tracing::error!("Database error deleting category: {:?}", e);
            CategoryError::Internal("Error al intentar eliminar la categoría".to_string())
        })?;

        tracing::info!(category_id = %id, "Deleted category");
        Ok(category)
    }
}
