use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::error::{OrderError, OrderResult};
use crate::models::{CreateOrder, Order};
use crate::repository::OrderRepository;

/// Service layer for Order business logic
#[derive(Clone)]
pub struct OrderService<R: OrderRepository> {
    repository: Arc<R>,
}

impl<R: OrderRepository> OrderService<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    pub async fn create_order(&self, user_id: Uuid, input: CreateOrder) -> OrderResult<Order> {
        input
            .validate()
            .map_err(|e| OrderError::Validation(e.to_string()))?;

        self.repository.create(Order::new(user_id, input)).await
    }

    /// Own orders, or the whole book for moderators
    pub async fn list_orders(&self, user_id: Uuid, is_mod: bool) -> OrderResult<Vec<Order>> {
        let orders = if is_mod {
            self.repository.list_all().await?
        } else {
            self.repository.list_for_user(user_id).await?
        };

        if orders.is_empty() {
            return Err(OrderError::NotFound("No se encontraron órdenes".to_string()));
        }

        Ok(orders)
    }

    /// Fetch one order; non-moderators only see their own
    pub async fn get_order(&self, id: &str, user_id: Uuid, is_mod: bool) -> OrderResult<Order> {
        let order = self
            .repository
            .get_by_id(id)
            .await?
            .filter(|o| is_mod || o.user_id == user_id)
            .ok_or_else(|| OrderError::NotFound("La orden no existe".to_string()))?;

        Ok(order)
    }
}
