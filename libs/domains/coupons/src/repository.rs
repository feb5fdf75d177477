use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{CouponError, CouponResult};
use crate::models::{Coupon, CreateCoupon, UpdateCoupon};

/// Repository trait for Coupon persistence
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CouponRepository: Send + Sync {
    async fn create(&self, input: CreateCoupon) -> CouponResult<Coupon>;

    async fn get_by_id(&self, id: Uuid) -> CouponResult<Option<Coupon>>;

    /// Raw lookup by code, no redemption gate applied
    async fn get_by_code(&self, code: &str) -> CouponResult<Option<Coupon>>;

    /// All coupons, soonest-expiring first, then newest first
    async fn list(&self) -> CouponResult<Vec<Coupon>>;

    async fn update(&self, id: Uuid, input: UpdateCoupon) -> CouponResult<Coupon>;

    /// Delete and return the removed coupon
    async fn delete(&self, id: Uuid) -> CouponResult<Coupon>;

    /// Bump the redemption counter by one
    async fn increment_times_used(&self, id: Uuid) -> CouponResult<()>;
}

/// In-memory implementation of CouponRepository (for development/testing)
#[derive(Debug, Default, Clone)]
pub struct InMemoryCouponRepository {
    coupons: Arc<RwLock<HashMap<Uuid, Coupon>>>,
}

impl InMemoryCouponRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CouponRepository for InMemoryCouponRepository {
    async fn create(&self, input: CreateCoupon) -> CouponResult<Coupon> {
        let mut coupons = self.coupons.write().await;

        if coupons.values().any(|c| c.code == input.code) {
            return Err(CouponError::AlreadyExists);
        }

        let coupon = Coupon::new(input);
        coupons.insert(coupon.id, coupon.clone());

        tracing::info!(coupon_id = %coupon.id, code = %coupon.code, "Created coupon");
        Ok(coupon)
    }

    async fn get_by_id(&self, id: Uuid) -> CouponResult<Option<Coupon>> {
        let coupons = self.coupons.read().await;
        Ok(coupons.get(&id).cloned())
    }

    async fn get_by_code(&self, code: &str) -> CouponResult<Option<Coupon>> {
        let coupons = self.coupons.read().await;
        Ok(coupons.values().find(|c| c.code == code).cloned())
    }

    async fn list(&self) -> CouponResult<Vec<Coupon>> {
        let coupons = self.coupons.read().await;
        let mut result: Vec<Coupon> = coupons.values().cloned().collect();
        result.sort_by(|a, b| {
            b.expires_at
                .cmp(&a.expires_at)
                .then(b.created_at.cmp(&a.created_at))
        });
        Ok(result)
    }

    async fn update(&self, id: Uuid, input: UpdateCoupon) -> CouponResult<Coupon> {
        let mut coupons = self.coupons.write().await;

        let coupon = coupons
            .get_mut(&id)
            .ok_or_else(|| CouponError::NotFound("Cupón no encontrado".to_string()))?;
        coupon.apply_update(input);
        Ok(coupon.clone())
    }

    async fn delete(&self, id: Uuid) -> CouponResult<Coupon> {
        let mut coupons = self.coupons.write().await;
        coupons
            .remove(&id)
            .ok_or_else(|| CouponError::NotFound("Cupón no encontrado".to_string()))
    }

    async fn increment_times_used(&self, id: Uuid) -> CouponResult<()> {
        let mut coupons = self.coupons.write().await;

        let coupon = coupons
            .get_mut(&id)
            .ok_or_else(|| CouponError::NotFound("Cupón no encontrado".to_string()))?;
        coupon.times_used += 1;
        Ok(())
    }
}
