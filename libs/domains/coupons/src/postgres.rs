use async_trait::async_trait;
use database::BaseRepository;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, ExprTrait, QueryFilter, QueryOrder, SqlErr,
};
use uuid::Uuid;

use crate::entity;
use crate::error::{CouponError, CouponResult};
use crate::models::{Coupon, CreateCoupon, UpdateCoupon};
use crate::repository::CouponRepository;

pub struct PgCouponRepository {
    base: BaseRepository<entity::Entity>,
}

impl PgCouponRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }
}

#[async_trait]
impl CouponRepository for PgCouponRepository {
    async fn create(&self, input: CreateCoupon) -> CouponResult<Coupon> {
        let active_model: entity::ActiveModel = Coupon::new(input).into();

        let model = self.base.insert(active_model).await.map_err(|e| {
            if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
                CouponError::AlreadyExists
            } else {
                tracing::error!("Database error creating coupon: {:?}", e);
                CouponError::Internal("Error al intentar crear el cupón".to_string())
            }
        })?;

        tracing::info!(coupon_id = %model.id, code = %model.code, "Created coupon");
        Ok(model.into())
    }

    async fn get_by_id(&self, id: Uuid) -> CouponResult<Option<Coupon>> {
        let model = self.base.find_by_id(id).await.map_err(|e| {
            tracing::error!("Database error fetching coupon: {:?}", e);
            CouponError::Internal("Error al intentar obtener el cupón".to_string())
        })?;

        Ok(model.map(Into::into))
    }

    async fn get_by_code(&self, code: &str) -> CouponResult<Option<Coupon>> {
        let model = entity::Entity::find()
            .filter(entity::Column::Code.eq(code))
            .one(self.base.db())
            .await
            .map_err(|e| {
                tracing::error!("Database error fetching coupon: {:?}", e);
                CouponError::Internal("Error al intentar obtener el cupón".to_string())
            })?;

        Ok(model.map(Into::into))
    }

    async fn list(&self) -> CouponResult<Vec<Coupon>> {
        let models = entity::Entity::find()
            .order_by_desc(entity::Column::ExpiresAt)
            .order_by_desc(entity::Column::CreatedAt)
            .all(self.base.db())
            .await
            .map_err(|e| {
                tracing::error!("Database error listing coupons: {:?}", e);
                CouponError::Internal("Error al intentar obtener cupones".to_string())
            })?;

        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn update(&self, id: Uuid, input: UpdateCoupon) -> CouponResult<Coupon> {
        let model = self
            .base
            .find_by_id(id)
            .await
            .map_err(|e| {
                tracing::error!("Database error fetching coupon: {:?}", e);
                CouponError::Internal("Error al intentar obtener el cupón".to_string())
            })?
            .ok_or_else(|| CouponError::NotFound("Cupón no encontrado".to_string()))?;

        let mut coupon: Coupon = model.into();
        coupon.apply_update(input);

        let active_model: entity::ActiveModel = coupon.into();
        let updated = self.base.update(active_model).await.map_err(|e| {
            tracing::error!("Database error updating coupon: {:?}", e);
            CouponError::Internal("Error al intentar actualizar el cupón".to_string())
        })?;

        Ok(updated.into())
    }

    async fn delete(&self, id: Uuid) -> CouponResult<Coupon> {
        let model = self
            .base
            .find_by_id(id)
            .await
            .map_err(|e| {
                tracing::error!("Database error fetching coupon: {:?}", e);
                CouponError::Internal("Error al intentar obtener el cupón".to_string())
            })?
            .ok_or_else(|| CouponError::NotFound("Cupón no encontrado".to_string()))?;

        let coupon: Coupon = model.into();

        self.base.delete_by_id(id).await.map_err(|e| {
            tracing::error!("Database error deleting coupon: {:?}", e);
            CouponError::Internal("Error al intentar eliminar el cupón".to_string())
        })?;

        tracing::info!(coupon_id = %id, "Deleted coupon");
        Ok(coupon)
    }

    async fn increment_times_used(&self, id: Uuid) -> CouponResult<()> {
        let result = entity::Entity::update_many()
            .col_expr(
                entity::Column::TimesUsed,
                Expr::col(entity::Column::TimesUsed).add(1),
            )
            .filter(entity::Column::Id.eq(id))
            .exec(self.base.db())
            .await
            .map_err(|e| {
                tracing::error!("Database error updating coupon usage: {:?}", e);
                CouponError::Internal("Error al intentar actualizar el cupón".to_string())
            })?;

        if result.rows_affected == 0 {
            return Err(CouponError::NotFound("Cupón no encontrado".to_string()));
        }

        Ok(())
    }
}
