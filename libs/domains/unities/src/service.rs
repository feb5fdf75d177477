use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::error::{UnityError, UnityResult};
use crate::models::{CreateUnity, Unity, UpdateUnity};
use crate::repository::UnityRepository;

/// Service layer for Unity business logic
#[derive(Clone)]
pub struct UnityService<R: UnityRepository> {
    repository: Arc<R>,
}

impl<R: UnityRepository> UnityService<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    pub async fn create_unity(&self, input: CreateUnity) -> UnityResult<Unity> {
        input
            .validate()
            .map_err(|e| UnityError::Validation(e.to_string()))?;

        self.repository.create(input).await
    }

    pub async fn get_unity(&self, id: Uuid) -> UnityResult<Unity> {
        self.repository
            .get_by_id(id)
            .await?
            .ok_or(UnityError::NotFound)
    }

    pub async fn list_unities(&self) -> UnityResult<Vec<Unity>> {
        self.repository.list().await
    }

    pub async fn update_unity(&self, id: Uuid, input: UpdateUnity) -> UnityResult<Unity> {
        input
            .validate()
            .map_err(|e| UnityError::Validation(e.to_string()))?;

        self.repository.update(id, input).await
    }

    pub async fn delete_unity(&self, id: Uuid) -> UnityResult<Unity> {
        self.repository.delete(id).await
    }
}
