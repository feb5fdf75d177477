use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::error::{ShippingError, ShippingResult};
use crate::models::{CreateShippingAddress, ShippingAddress, UpdateShippingAddress};
use crate::repository::ShippingRepository;

/// Service layer for ShippingAddress business logic
#[derive(Clone)]
pub struct ShippingService<R: ShippingRepository> {
    repository: Arc<R>,
}

impl<R: ShippingRepository> ShippingService<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    pub async fn create_address(
        &self,
        user_id: Uuid,
        input: CreateShippingAddress,
    ) -> ShippingResult<ShippingAddress> {
        input
            .validate()
            .map_err(|e| ShippingError::Validation(e.to_string()))?;

        self.repository.create(user_id, input).await
    }

    pub async fn get_address(&self, id: Uuid, user_id: Uuid) -> ShippingResult<ShippingAddress> {
        self.repository
            .get_by_id(id, user_id)
            .await?
            .ok_or(ShippingError::NotFound)
    }

    pub async fn list_addresses(&self, user_id: Uuid) -> ShippingResult<Vec<ShippingAddress>> {
        self.repository.list_by_user(user_id).await
    }

    pub async fn update_address(
        &self,
        id: Uuid,
        user_id: Uuid,
        input: UpdateShippingAddress,
    ) -> ShippingResult<ShippingAddress> {
        input
            .validate()
            .map_err(|e| ShippingError::Validation(e.to_string()))?;

        self.repository.update(id, user_id, input).await
    }

    pub async fn delete_address(&self, id: Uuid, user_id: Uuid) -> ShippingResult<ShippingAddress> {
        self.repository.delete(id, user_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::MockShippingRepository;

    #[tokio::test]
    async fn get_missing_address_is_not_found() {
        let mut mock_repo = MockShippingRepository::new();
        mock_repo.expect_get_by_id().returning(|_, _| Ok(None));

        let service = ShippingService::new(mock_repo);
        let result = service.get_address(Uuid::now_v7(), Uuid::now_v7()).await;

        assert!(matches!(result, Err(ShippingError::NotFound)));
    }

    #[tokio::test]
    async fn create_rejects_invalid_state() {
        let service = ShippingService::new(MockShippingRepository::new());

        let result = service
            .create_address(
                Uuid::now_v7(),
                CreateShippingAddress {
                    alias: "Casa".to_string(),
                    name: "María".to_string(),
                    last_name: "Pérez".to_string(),
                    email: "maria@example.com".to_string(),
                    phone: "04141234567".to_string(),
                    address_line_1: "Av. Libertador, Edificio Sol, Piso 3".to_string(),
                    country: "Venezuela".to_string(),
                    state: "Texas".to_string(),
                    city: "Caracas".to_string(),
                },
            )
            .await;

        assert!(matches!(result, Err(ShippingError::Validation(_))));
    }
}
