use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{CategoryError, CategoryResult};
use crate::models::{Category, CreateCategory, UpdateCategory};

/// Repository trait for Category persistence
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    async fn create(&self, user_id: Uuid, input: CreateCategory) -> CategoryResult<Category>;

    /// Public lookup: only active categories are visible by id
    async fn get_by_id(&self, id: Uuid) -> CategoryResult<Option<Category>>;

    /// All categories, newest first
    async fn list(&self) -> CategoryResult<Vec<Category>>;

    async fn update(&self, id: Uuid, input: UpdateCategory) -> CategoryResult<Category>;

    /// Delete and return the removed category
    async fn delete(&self, id: Uuid) -> CategoryResult<Category>;
}

/// In-memory implementation of CategoryRepository (for development/testing)
#[derive(Debug, Default, Clone)]
pub struct InMemoryCategoryRepository {
    categories: Arc<RwLock<HashMap<Uuid, Category>>>,
}

impl InMemoryCategoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CategoryRepository for InMemoryCategoryRepository {
    async fn create(&self, user_id: Uuid, input: CreateCategory) -> CategoryResult<Category> {
        let mut categories = self.categories.write().await;

        let name_exists = categories
            .values()
            .any(|c| c.name.to_lowercase() == input.name.to_lowercase());
        if name_exists {
            return Err(CategoryError::AlreadyExists);
        }

        let category = Category::new(user_id, input);
        categories.insert(category.id, category.clone());

        tracing::info!(category_id = %category.id, "Created category");
        Ok(category)
    }

    async fn get_by_id(&self, id: Uuid) -> CategoryResult<Option<Category>> {
        let categories = self.categories.read().await;
        Ok(categories.get(&id).filter(|c| c.active).cloned())
    }

    async fn list(&self) -> CategoryResult<Vec<Category>> {
        let categories = self.categories.read().await;
        let mut result: Vec<Category> = categories.values().cloned().collect();
        result.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(result)
    }

    async fn update(&self, id: Uuid, input: UpdateCategory) -> CategoryResult<Category> {
        let mut categories = self.categories.write().await;

        if let Some(ref new_name) = input.name {
            let name_exists = categories
                .values()
                .any(|c| c.id != id && c.name.to_lowercase() == new_name.to_lowercase());
            if name_exists {
                return Err(CategoryError::AlreadyExists);
            }
        }

        let category = categories.get_mut(&id).ok_or(CategoryError::NotFound)?;
        category.apply_update(input);
        Ok(category.clone())
    }

    async fn delete(&self, id: Uuid) -> CategoryResult<Category> {
        let mut categories = self.categories.write().await;
        categories.remove(&id).ok_or(CategoryError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(name: &str) -> CreateCategory {
        CreateCategory {
            name: name.to_string(),
            description: None,
        }
    }

    #[tokio::test]
    async fn create_and_get() {
        let repo = InMemoryCategoryRepository::new();
        let category = repo.create(Uuid::now_v7(), input("Sillas")).await.unwrap();

        let fetched = repo.get_by_id(category.id).await.unwrap();
        assert_eq!(fetched.unwrap().name, "Sillas");
    }

    #[tokio::test]
    async fn duplicate_name_conflicts() {
        let repo = InMemoryCategoryRepository::new();
        repo.create(Uuid::now_v7(), input("Mesas")).await.unwrap();

        let result = repo.create(Uuid::now_v7(), input("mesas")).await;
        assert!(matches!(result, Err(CategoryError::AlreadyExists)));
    }

    #[tokio::test]
    async fn inactive_category_hidden_by_id() {
        let repo = InMemoryCategoryRepository::new();
        let category = repo.create(Uuid::now_v7(), input("Lámparas")).await.unwrap();

        repo.update(
            category.id,
            UpdateCategory {
                active: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        assert!(repo.get_by_id(category.id).await.unwrap().is_none());
        // Still present in the full listing
        assert_eq!(repo.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn delete_returns_removed_row() {
        let repo = InMemoryCategoryRepository::new();
        let category = repo.create(Uuid::now_v7(), input("Camas")).await.unwrap();

        let deleted = repo.delete(category.id).await.unwrap();
        assert_eq!(deleted.id, category.id);
        assert!(matches!(
            repo.delete(category.id).await,
            Err(CategoryError::NotFound)
        ));
    }
}
