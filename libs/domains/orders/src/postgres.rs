use async_trait::async_trait;
use database::BaseRepository;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ExprTrait, QueryFilter,
    QueryOrder, SqlErr, TransactionTrait,
};
use std::collections::HashMap;
use uuid::Uuid;

use crate::entity::{item, order};
use crate::error::{OrderError, OrderResult};
use crate::models::{Order, OrderItem};
use crate::repository::OrderRepository;
use domain_coupons::entity as coupon_entity;

pub struct PgOrderRepository {
    base: BaseRepository<order::Entity>,
}

impl PgOrderRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Loads and attaches the item lines for the given orders.
    async fn attach_items(&self, orders: &mut [Order]) -> OrderResult<()> {
        if orders.is_empty() {
            return Ok(());
        }

        let ids: Vec<String> = orders.iter().map(|o| o.id.clone()).collect();
        let items = item::Entity::find()
            .filter(item::Column::OrderId.is_in(ids))
            .all(self.base.db())
            .await
            .map_err(|e| {
                tracing::error!("Database error fetching order items: {:?}", e);
                OrderError::Internal("Error al intentar obtener las órdenes".to_string())
            })?;

        let mut by_order: HashMap<String, Vec<OrderItem>> = HashMap::new();
        for model in items {
            by_order
                .entry(model.order_id.clone())
                .or_default()
                .push(model.into());
        }

        for order in orders.iter_mut() {
            order.items = by_order.remove(&order.id).unwrap_or_default();
        }

        Ok(())
    }
}

#[async_trait]
impl OrderRepository for PgOrderRepository {
    async fn create(&self, order: Order) -> OrderResult<Order> {
        let txn = self.base.db().begin().await.map_err(|e| {
            tracing::error!("Database error starting transaction: {:?}", e);
            OrderError::Internal("Error al intentar crear la orden".to_string())
        })?;

        let items = order.items.clone();
        let coupon_id = order.coupon_id;
        let active_model: order::ActiveModel = order.into();

        let model = active_model.insert(&txn).await.map_err(|e| {
            if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
                OrderError::AlreadyExists
            } else {
                tracing::error!("Database error creating order: {:?}", e);
                OrderError::Internal("Error al intentar crear la orden".to_string())
            }
        })?;

        let item_models: Vec<item::ActiveModel> =
            items.iter().cloned().map(Into::into).collect();
        item::Entity::insert_many(item_models)
            .exec(&txn)
            .await
            .map_err(|e| {
                tracing::error!("Database error creating order items: {:?}", e);
                OrderError::Internal("Error al intentar crear la orden".to_string())
            })?;

        // Coupon redemption is part of the same atomic unit as the order
        if let Some(coupon_id) = coupon_id {
            let result = coupon_entity::Entity::update_many()
                .col_expr(
                    coupon_entity::Column::TimesUsed,
                    Expr::col(coupon_entity::Column::TimesUsed).add(1),
                )
                .filter(coupon_entity::Column::Id.eq(coupon_id))
                .exec(&txn)
                .await
                .map_err(|e| {
                    tracing::error!("Database error updating coupon usage: {:?}", e);
                    OrderError::Internal("Error al intentar crear la orden".to_string())
                })?;

            if result.rows_affected == 0 {
                return Err(OrderError::NotFound("Cupón no encontrado".to_string()));
            }
        }

        txn.commit().await.map_err(|e| {
            tracing::error!("Database error committing order create: {:?}", e);
            OrderError::Internal("Error al intentar crear la orden".to_string())
        })?;

        tracing::info!(order_id = %model.id, "Created order");
        let mut order: Order = model.into();
        order.items = items;
        Ok(order)
    }

    async fn get_by_id(&self, id: &str) -> OrderResult<Option<Order>> {
        let model = order::Entity::find_by_id(id)
            .one(self.base.db())
            .await
            .map_err(|e| {
                tracing::error!("Database error fetching order: {:?}", e);
                OrderError::Internal("Error al intentar obtener la orden".to_string())
            })?;

        match model {
            None => Ok(None),
            Some(model) => {
                let mut orders = vec![Order::from(model)];
                self.attach_items(&mut orders).await?;
                Ok(orders.pop())
            }
        }
    }

    async fn list_for_user(&self, user_id: Uuid) -> OrderResult<Vec<Order>> {
        let models = order::Entity::find()
            .filter(order::Column::UserId.eq(user_id))
            .order_by_desc(order::Column::CreatedAt)
            .all(self.base.db())
            .await
            .map_err(|e| {
                tracing::error!("Database error listing orders: {:?}", e);
                OrderError::Internal("Error al intentar obtener las órdenes".to_string())
            })?;

        let mut orders: Vec<Order> = models.into_iter().map(Into::into).collect();
        self.attach_items(&mut orders).await?;
        Ok(orders)
    }

    async fn list_all(&self) -> OrderResult<Vec<Order>> {
        let models = order::Entity::find()
            .order_by_desc(order::Column::CreatedAt)
            .all(self.base.db())
            .await
            .map_err(|e| {
                tracing::error!("Database error listing orders: {:?}", e);
                OrderError::Internal("Error al intentar obtener las órdenes".to_string())
            })?;

        let mut orders: Vec<Order> = models.into_iter().map(Into::into).collect();
        self.attach_items(&mut orders).await?;
        Ok(orders)
    }
}
