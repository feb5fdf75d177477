use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{UnityError, UnityResult};
use crate::models::{CreateUnity, Unity, UpdateUnity};

/// Repository trait for Unity persistence
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UnityRepository: Send + Sync {
    async fn create(&self, input: CreateUnity) -> UnityResult<Unity>;

    async fn get_by_id(&self, id: Uuid) -> UnityResult<Option<Unity>>;

    /// All unities, newest first
    async fn list(&self) -> UnityResult<Vec<Unity>>;

    async fn update(&self, id: Uuid, input: UpdateUnity) -> UnityResult<Unity>;

    /// Delete and return the removed unity
    async fn delete(&self, id: Uuid) -> UnityResult<Unity>;
}

/// In-memory implementation of UnityRepository (for development/testing)
#[derive(Debug, Default, Clone)]
pub struct InMemoryUnityRepository {
    unities: Arc<RwLock<HashMap<Uuid, Unity>>>,
}

impl InMemoryUnityRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UnityRepository for InMemoryUnityRepository {
    async fn create(&self, input: CreateUnity) -> UnityResult<Unity> {
        let mut unities = self.unities.write().await;

        let name_exists = unities
            .values()
            .any(|u| u.name.to_lowercase() == input.name.to_lowercase());
        if name_exists {
            return Err(UnityError::AlreadyExists);
        }

        let unity = Unity::new(input);
        unities.insert(unity.id, unity.clone());

        tracing::info!(unity_id = %unity.id, "Created unity");
        Ok(unity)
    }

    async fn get_by_id(&self, id: Uuid) -> UnityResult<Option<Unity>> {
        let unities = self.unities.read().await;
        Ok(unities.get(&id).cloned())
    }

    async fn list(&self) -> UnityResult<Vec<Unity>> {
        let unities = self.unities.read().await;
        let mut result: Vec<Unity> = unities.values().cloned().collect();
        result.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(result)
    }

    async fn update(&self, id: Uuid, input: UpdateUnity) -> UnityResult<Unity> {
        let mut unities = self.unities.write().await;

        if let Some(ref new_name) = input.name {
            let name_exists = unities
                .values()
                .any(|u| u.id != id && u.name.to_lowercase() == new_name.to_lowercase());
            if name_exists {
                return Err(UnityError::AlreadyExists);
            }
        }

        let unity = unities.get_mut(&id).ok_or(UnityError::NotFound)?;
        unity.apply_update(input);
        Ok(unity.clone())
    }

    async fn delete(&self, id: Uuid) -> UnityResult<Unity> {
        let mut unities = self.unities.write().await;
        unities.remove(&id).ok_or(UnityError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(name: &str) -> CreateUnity {
        CreateUnity {
            name: name.to_string(),
            description: None,
        }
    }

    #[tokio::test]
    async fn create_and_get() {
        let repo = InMemoryUnityRepository::new();
        let unity = repo.create(input("Kilogramo")).await.unwrap();

        let fetched = repo.get_by_id(unity.id).await.unwrap();
        assert_eq!(fetched.unwrap().name, "Kilogramo");
    }

    #[tokio::test]
    async fn duplicate_name_conflicts() {
        let repo = InMemoryUnityRepository::new();
        repo.create(input("Docena")).await.unwrap();

        let result = repo.create(input("docena")).await;
        assert!(matches!(result, Err(UnityError::AlreadyExists)));
    }

    #[tokio::test]
    async fn delete_missing_is_not_found() {
        let repo = InMemoryUnityRepository::new();
        assert!(matches!(
            repo.delete(Uuid::now_v7()).await,
            Err(UnityError::NotFound)
        ));
    }
}
