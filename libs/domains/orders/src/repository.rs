use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{OrderError, OrderResult};
use crate::models::Order;

/// Repository trait for Order persistence.
///
/// `create` must persist the order, its items and the coupon usage
/// increment (when a coupon is attached) as one atomic unit.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OrderRepository: Send + Sync {
    async fn create(&self, order: Order) -> OrderResult<Order>;

    async fn get_by_id(&self, id: &str) -> OrderResult<Option<Order>>;

    /// A user's orders, newest first
    async fn list_for_user(&self, user_id: Uuid) -> OrderResult<Vec<Order>>;

    /// Every order, newest first (moderation)
    async fn list_all(&self) -> OrderResult<Vec<Order>>;
}

/// In-memory implementation of OrderRepository (for development/testing)
#[derive(Debug, Default, Clone)]
pub struct InMemoryOrderRepository {
    orders: Arc<RwLock<HashMap<String, Order>>>,
    coupon_uses: Arc<RwLock<HashMap<Uuid, i32>>>,
}

impl InMemoryOrderRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Times a coupon was redeemed through order creation
    pub async fn coupon_uses(&self, coupon_id: Uuid) -> i32 {
        self.coupon_uses
            .read()
            .await
            .get(&coupon_id)
            .copied()
            .unwrap_or(0)
    }

    fn newest_first(mut orders: Vec<Order>) -> Vec<Order> {
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        orders
    }
}

#[async_trait]
impl OrderRepository for InMemoryOrderRepository {
    async fn create(&self, order: Order) -> OrderResult<Order> {
        let mut orders = self.orders.write().await;

        if orders.contains_key(&order.id) {
            return Err(OrderError::AlreadyExists);
        }

        if let Some(coupon_id) = order.coupon_id {
            *self.coupon_uses.write().await.entry(coupon_id).or_insert(0) += 1;
        }

        orders.insert(order.id.clone(), order.clone());
        tracing::info!(order_id = %order.id, "Created order");
        Ok(order)
    }

    async fn get_by_id(&self, id: &str) -> OrderResult<Option<Order>> {
        let orders = self.orders.read().await;
        Ok(orders.get(id).cloned())
    }

    async fn list_for_user(&self, user_id: Uuid) -> OrderResult<Vec<Order>> {
        let orders = self.orders.read().await;
        Ok(Self::newest_first(
            orders
                .values()
                .filter(|o| o.user_id == user_id)
                .cloned()
                .collect(),
        ))
    }

    async fn list_all(&self) -> OrderResult<Vec<Order>> {
        let orders = self.orders.read().await;
        Ok(Self::newest_first(orders.values().cloned().collect()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CreateOrder, OrderLine};

    fn order(id: &str, user_id: Uuid, coupon_id: Option<Uuid>) -> Order {
        Order::new(
            user_id,
            CreateOrder {
                id: id.to_string(),
                coupon_id,
                shipping_address_id: Uuid::now_v7(),
                products: vec![OrderLine {
                    id: Uuid::now_v7(),
                    name: "Silla".to_string(),
                    price: 10.0,
                    category_id: Uuid::now_v7(),
                    quantity: 1,
                }],
                subtotal: 10.0,
                discount: 0.0,
                tax: 0.0,
                total: 10.0,
            },
        )
    }

    #[tokio::test]
    async fn create_and_fetch() {
        let repo = InMemoryOrderRepository::new();
        let user_id = Uuid::now_v7();
        repo.create(order("ORD-20250707183547475003", user_id, None))
            .await
            .unwrap();

        let fetched = repo
            .get_by_id("ORD-20250707183547475003")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(fetched.user_id, user_id);
        assert_eq!(fetched.items.len(), 1);
    }

    #[tokio::test]
    async fn duplicate_reference_conflicts() {
        let repo = InMemoryOrderRepository::new();
        let user_id = Uuid::now_v7();
        repo.create(order("ORD-20250707183547475003", user_id, None))
            .await
            .unwrap();

        let result = repo
            .create(order("ORD-20250707183547475003", user_id, None))
            .await;
        assert!(matches!(result, Err(OrderError::AlreadyExists)));
    }

    #[tokio::test]
    async fn coupon_usage_counted_with_create() {
        let repo = InMemoryOrderRepository::new();
        let coupon_id = Uuid::now_v7();
        repo.create(order(
            "ORD-20250707183547475003",
            Uuid::now_v7(),
            Some(coupon_id),
        ))
        .await
        .unwrap();

        assert_eq!(repo.coupon_uses(coupon_id).await, 1);
    }

    #[tokio::test]
    async fn listing_scopes_by_user() {
        let repo = InMemoryOrderRepository::new();
        let alice = Uuid::now_v7();
        let bob = Uuid::now_v7();
        repo.create(order("ORD-20250707183547475001", alice, None))
            .await
            .unwrap();
        repo.create(order("ORD-20250707183547475002", bob, None))
            .await
            .unwrap();

        assert_eq!(repo.list_for_user(alice).await.unwrap().len(), 1);
        assert_eq!(repo.list_all().await.unwrap().len(), 2);
    }
}
