use sea_orm::entity::prelude::*;
use sea_orm::ActiveValue::Set;
use serde::{Deserialize, Serialize};

use crate::models::CouponKind;

/// Sea-ORM entity for the coupons table
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "coupons")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub code: String,
    pub description: Option<String>,
    pub discount: f64,
    pub active: bool,
    pub kind: CouponKind,
    pub usage_limit: Option<i32>,
    pub times_used: i32,
    pub min_purchase: Option<f64>,
    /// JSON array of category ids
    pub valid_categories: Json,
    pub expires_at: Option<DateTimeWithTimeZone>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for crate::models::Coupon {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            code: model.code,
            description: model.description,
            discount: model.discount,
            active: model.active,
            kind: model.kind,
            usage_limit: model.usage_limit,
            times_used: model.times_used,
            min_purchase: model.min_purchase,
            valid_categories: serde_json::from_value(model.valid_categories)
                .unwrap_or_default(),
            expires_at: model.expires_at.map(Into::into),
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        }
    }
}

impl From<crate::models::Coupon> for ActiveModel {
    fn from(coupon: crate::models::Coupon) -> Self {
        ActiveModel {
            id: Set(coupon.id),
            code: Set(coupon.code),
            description: Set(coupon.description),
            discount: Set(coupon.discount),
            active: Set(coupon.active),
            kind: Set(coupon.kind),
            usage_limit: Set(coupon.usage_limit),
            times_used: Set(coupon.times_used),
            min_purchase: Set(coupon.min_purchase),
            valid_categories: Set(serde_json::json!(coupon.valid_categories)),
            expires_at: Set(coupon.expires_at.map(Into::into)),
            created_at: Set(coupon.created_at.into()),
            updated_at: Set(coupon.updated_at.into()),
        }
    }
}
