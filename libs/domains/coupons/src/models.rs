use chrono::{DateTime, Utc};
use sea_orm::{DeriveActiveEnum, EnumIter};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// How a coupon's discount is applied
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    ToSchema,
    EnumIter,
    DeriveActiveEnum,
    strum::Display,
)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "coupon_kind")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum CouponKind {
    /// Discount is a percentage of the subtotal (0..=100)
    #[sea_orm(string_value = "percentage")]
    Percentage,
    /// Discount is a fixed amount
    #[sea_orm(string_value = "fixed")]
    Fixed,
}

/// Discount coupon
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Coupon {
    pub id: Uuid,
    /// Unique redemption code
    pub code: String,
    pub description: Option<String>,
    pub discount: f64,
    pub active: bool,
    pub kind: CouponKind,
    /// Maximum number of redemptions, unlimited when absent
    pub usage_limit: Option<i32>,
    pub times_used: i32,
    pub min_purchase: Option<f64>,
    /// Category ids the coupon is restricted to, empty means all
    pub valid_categories: Vec<String>,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// DTO for creating a coupon
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCoupon {
    #[validate(length(min = 2, max = 50, message = "Código es requerido"))]
    pub code: String,
    #[validate(length(max = 255))]
    pub description: Option<String>,
    #[validate(range(min = 0.0, message = "Descuento no puede ser menor a 0"))]
    pub discount: f64,
    pub active: bool,
    pub kind: CouponKind,
    pub usage_limit: Option<i32>,
    #[validate(range(min = 0.0, message = "No puede ser menor que 0"))]
    pub min_purchase: Option<f64>,
    #[validate(length(max = 10, message = "No pueden ser más de 10 categorías"))]
    pub valid_categories: Option<Vec<String>>,
    pub expires_at: Option<DateTime<Utc>>,
}

/// DTO for updating a coupon. The code itself is immutable.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCoupon {
    #[validate(length(max = 255))]
    pub description: Option<String>,
    #[validate(range(min = 0.0, message = "Descuento no puede ser menor a 0"))]
    pub discount: Option<f64>,
    pub active: Option<bool>,
    pub kind: Option<CouponKind>,
    pub usage_limit: Option<i32>,
    #[validate(range(min = 0.0, message = "No puede ser menor que 0"))]
    pub min_purchase: Option<f64>,
    #[validate(length(max = 10, message = "No pueden ser más de 10 categorías"))]
    pub valid_categories: Option<Vec<String>>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl Coupon {
    pub fn new(input: CreateCoupon) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            code: input.code,
            description: input.description,
            discount: input.discount,
            active: input.active,
            kind: input.kind,
            usage_limit: input.usage_limit,
            times_used: 0,
            min_purchase: input.min_purchase,
            valid_categories: input.valid_categories.unwrap_or_default(),
            expires_at: input.expires_at,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply_update(&mut self, update: UpdateCoupon) {
        if let Some(description) = update.description {
            self.description = Some(description);
        }
        if let Some(discount) = update.discount {
            self.discount = discount;
        }
        if let Some(active) = update.active {
            self.active = active;
        }
        if let Some(kind) = update.kind {
            self.kind = kind;
        }
        if let Some(usage_limit) = update.usage_limit {
            self.usage_limit = Some(usage_limit);
        }
        if let Some(min_purchase) = update.min_purchase {
            self.min_purchase = Some(min_purchase);
        }
        if let Some(valid_categories) = update.valid_categories {
            self.valid_categories = valid_categories;
        }
        if let Some(expires_at) = update.expires_at {
            self.expires_at = Some(expires_at);
        }
        self.updated_at = Utc::now();
    }

    /// Redemption gate: why this coupon cannot be used right now, if anything.
    pub fn redemption_block(&self, now: DateTime<Utc>) -> Option<String> {
        if let Some(expires_at) = self.expires_at {
            if expires_at < now {
                return Some(format!("Cupón con código {} ha expirado", self.code));
            }
        }
        if !self.active {
            return Some(format!("Cupón con código {} no está activo", self.code));
        }
        if let Some(limit) = self.usage_limit {
            if limit <= self.times_used {
                return Some(format!(
                    "Cupón con código {} ha alcanzado su límite de uso",
                    self.code
                ));
            }
        }
        None
    }
}
