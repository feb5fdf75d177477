use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::error::{CouponError, CouponResult};
use crate::models::{Coupon, CouponKind, CreateCoupon, UpdateCoupon};
use crate::repository::CouponRepository;

/// Service layer for Coupon business logic
#[derive(Clone)]
pub struct CouponService<R: CouponRepository> {
    repository: Arc<R>,
}

impl<R: CouponRepository> CouponService<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    pub async fn create_coupon(&self, input: CreateCoupon) -> CouponResult<Coupon> {
        input
            .validate()
            .map_err(|e| CouponError::Validation(e.to_string()))?;

        if input.kind == CouponKind::Percentage && input.discount > 100.0 {
            return Err(CouponError::Validation(
                "El cupón es de tipo % por lo tanto el descuento debe estar entre 0% y 100.0%"
                    .to_string(),
            ));
        }

        self.repository.create(input).await
    }

    /// Lookup by code through the redemption gate: expired, inactive or
    /// exhausted coupons report not found even though the row exists.
    pub async fn redeem_coupon(&self, code: &str) -> CouponResult<Coupon> {
        let coupon = self
            .repository
            .get_by_code(code)
            .await?
            .ok_or_else(|| CouponError::NotFound(format!("Cupón con código {code} no existe")))?;

        if let Some(reason) = coupon.redemption_block(Utc::now()) {
            return Err(CouponError::NotFound(reason));
        }

        Ok(coupon)
    }

    pub async fn list_coupons(&self) -> CouponResult<Vec<Coupon>> {
        self.repository.list().await
    }

    pub async fn update_coupon(&self, id: Uuid, input: UpdateCoupon) -> CouponResult<Coupon> {
        input
            .validate()
            .map_err(|e| CouponError::Validation(e.to_string()))?;

        self.repository.update(id, input).await
    }

    pub async fn delete_coupon(&self, id: Uuid) -> CouponResult<Coupon> {
        self.repository.delete(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::{InMemoryCouponRepository, MockCouponRepository};
    use chrono::Duration;

    fn input(code: &str) -> CreateCoupon {
        CreateCoupon {
            code: code.to_string(),
            description: None,
            discount: 15.0,
            active: true,
            kind: CouponKind::Percentage,
            usage_limit: None,
            min_purchase: None,
            valid_categories: None,
            expires_at: None,
        }
    }

    #[tokio::test]
    async fn percentage_over_100_is_rejected() {
        let service = CouponService::new(MockCouponRepository::new());

        let result = service
            .create_coupon(CreateCoupon {
                discount: 150.0,
                ..input("GRANDE")
            })
            .await;

        assert!(matches!(result, Err(CouponError::Validation(_))));
    }

    #[tokio::test]
    async fn fixed_discount_over_100_is_allowed() {
        let mut mock_repo = MockCouponRepository::new();
        mock_repo
            .expect_create()
            .returning(|input| Ok(Coupon::new(input)));

        let service = CouponService::new(mock_repo);
        let coupon = service
            .create_coupon(CreateCoupon {
                discount: 150.0,
                kind: CouponKind::Fixed,
                ..input("FIJO150")
            })
            .await
            .unwrap();

        assert_eq!(coupon.discount, 150.0);
    }

    #[tokio::test]
    async fn missing_code_reports_not_found() {
        let service = CouponService::new(InMemoryCouponRepository::new());

        let result = service.redeem_coupon("NADA").await;
        match result {
            Err(CouponError::NotFound(msg)) => {
                assert_eq!(msg, "Cupón con código NADA no existe");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[tokio::test]
    async fn expired_coupon_is_unreachable() {
        let service = CouponService::new(InMemoryCouponRepository::new());
        service
            .create_coupon(CreateCoupon {
                expires_at: Some(Utc::now() - Duration::days(1)),
                ..input("VIEJO")
            })
            .await
            .unwrap();

        let result = service.redeem_coupon("VIEJO").await;
        match result {
            Err(CouponError::NotFound(msg)) => {
                assert_eq!(msg, "Cupón con código VIEJO ha expirado");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[tokio::test]
    async fn inactive_coupon_is_unreachable() {
        let service = CouponService::new(InMemoryCouponRepository::new());
        service
            .create_coupon(CreateCoupon {
                active: false,
                ..input("PAUSADO")
            })
            .await
            .unwrap();

        let result = service.redeem_coupon("PAUSADO").await;
        match result {
            Err(CouponError::NotFound(msg)) => {
                assert_eq!(msg, "Cupón con código PAUSADO no está activo");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[tokio::test]
    async fn exhausted_coupon_is_unreachable() {
        let repo = InMemoryCouponRepository::new();
        let service = CouponService::new(repo.clone());
        let coupon = service
            .create_coupon(CreateCoupon {
                usage_limit: Some(2),
                ..input("LIMITADO")
            })
            .await
            .unwrap();

        repo.increment_times_used(coupon.id).await.unwrap();
        assert!(service.redeem_coupon("LIMITADO").await.is_ok());

        repo.increment_times_used(coupon.id).await.unwrap();
        let result = service.redeem_coupon("LIMITADO").await;
        match result {
            Err(CouponError::NotFound(msg)) => {
                assert_eq!(msg, "Cupón con código LIMITADO ha alcanzado su límite de uso");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }
}
