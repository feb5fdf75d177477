use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::error::{CategoryError, CategoryResult};
use crate::models::{Category, CreateCategory, UpdateCategory};
use crate::repository::CategoryRepository;

/// Service layer for Category business logic
#[derive(Clone)]
pub struct CategoryService<R: CategoryRepository> {
    repository: Arc<R>,
}

impl<R: CategoryRepository> CategoryService<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    pub async fn create_category(
        &self,
        user_id: Uuid,
        input: CreateCategory,
    ) -> CategoryResult<Category> {
        input
            .validate()
            .map_err(|e| CategoryError::Validation(e.to_string()))?;

        self.repository.create(user_id, input).await
    }

    pub async fn get_category(&self, id: Uuid) -> CategoryResult<Category> {
        self.repository
            .get_by_id(id)
            .await?
            .ok_or(CategoryError::NotFound)
    }

    pub async fn list_categories(&self) -> CategoryResult<Vec<Category>> {
        self.repository.list().await
    }

    pub async fn update_category(
        &self,
        id: Uuid,
        input: UpdateCategory,
    ) -> CategoryResult<Category> {
        input
            .validate()
            .map_err(|e| CategoryError::Validation(e.to_string()))?;

        self.repository.update(id, input).await
    }

    pub async fn delete_category(&self, id: Uuid) -> CategoryResult<Category> {
        self.repository.delete(id).await
    }
}
