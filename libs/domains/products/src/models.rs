use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// Maximum number of images a product may carry.
pub const PRODUCT_IMAGE_LIMIT: usize = 5;

/// Catalog product. `display_order` is dense across all products:
/// for N products the values are exactly {1..N}.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,
    /// Unique URL slug derived from the name
    pub slug: String,
    pub name: String,
    pub description: String,
    pub price: f64,
    /// Optional promotional price; 0/None means unset
    pub second_price: Option<f64>,
    pub stock: i32,
    pub free_shipping: bool,
    pub video_id: Option<String>,
    pub display_order: i32,
    pub user_id: Uuid,
    pub category_id: Uuid,
    pub unity_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Images ordered by their own display_order
    #[serde(default)]
    pub images: Vec<ProductImage>,
}

/// Image attached to a product; `display_order` is dense within the
/// parent product's image set.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductImage {
    pub id: Uuid,
    pub product_id: Uuid,
    /// Object-storage key of the uploaded file
    pub storage_key: String,
    pub display_order: i32,
    pub created_at: DateTime<Utc>,
}

/// DTO for creating a product
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateProduct {
    #[validate(length(min = 2, max = 255, message = "Nombre es requerido"))]
    pub name: String,
    #[validate(custom(function = validate_description))]
    pub description: String,
    #[validate(range(min = 0.0, message = "El precio no puede ser menor a 0"))]
    pub price: f64,
    pub second_price: Option<f64>,
    #[serde(default = "default_stock")]
    pub stock: i32,
    #[serde(default)]
    pub free_shipping: bool,
    pub video_id: Option<String>,
    pub category_id: Uuid,
    pub unity_id: Uuid,
}

fn default_stock() -> i32 {
    1
}

/// min 2 / max 800 with distinct messages; validator 0.20 cannot express
/// two `length` validators on one field, so this mirrors them by hand.
fn validate_description(description: &str) -> Result<(), ValidationError> {
    let length = description.chars().count();
    if length < 2 {
        return Err(ValidationError::new("length").with_message("Mínimo 2 caracteres".into()));
    }
    if length > 800 {
        return Err(ValidationError::new("length").with_message("Máximo 800 caracteres".into()));
    }
    Ok(())
}

/// DTO for updating a product; a name change regenerates the slug
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProduct {
    #[validate(length(min = 2, max = 255, message = "Nombre es requerido"))]
    pub name: Option<String>,
    #[validate(custom(function = validate_description))]
    pub description: Option<String>,
    #[validate(range(min = 0.0, message = "El precio no puede ser menor a 0"))]
    pub price: Option<f64>,
    pub second_price: Option<f64>,
    pub stock: Option<i32>,
    pub free_shipping: Option<bool>,
    pub video_id: Option<String>,
    pub category_id: Option<Uuid>,
    pub unity_id: Option<Uuid>,
}

/// One (id, displayOrder) pair of a bulk reorder request
#[derive(Debug, Clone, Copy, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReorderItem {
    pub id: Uuid,
    pub display_order: i32,
}

/// Target position for a single-item manual move
#[derive(Debug, Clone, Copy, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MoveProduct {
    pub display_order: i32,
}

/// One requested cart line
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub product_id: Uuid,
    pub quantity: i32,
}

/// Cart line after stock validation. Invalid lines carry a reason and
/// the stock actually available; valid lines attach the product snapshot.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ValidatedCartItem {
    pub product_id: Uuid,
    pub quantity: i32,
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available_stock: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product: Option<Product>,
}

/// Mass price adjustment across the whole catalog
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChangePrices {
    #[validate(range(min = 0.000001, message = "El porcentaje debe ser mayor a 0"))]
    pub percentage: f64,
    /// true raises prices, false lowers them
    pub increment: bool,
}

/// DTO for registering uploaded images against a product
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateImages {
    pub storage_keys: Vec<String>,
}

/// Catalog listing filters, already resolved from query parameters.
#[derive(Debug, Clone, Default)]
pub struct ProductFilters {
    pub offset: u64,
    pub limit: u64,
    pub search: Option<String>,
    pub categories_ids: Option<Vec<Uuid>>,
    pub unities_ids: Option<Vec<Uuid>>,
    /// [min, max]; matches price, or a non-null non-zero second_price
    pub price_range: Option<(f64, f64)>,
    pub in_stock_only: bool,
}

impl Product {
    pub fn new(user_id: Uuid, slug: String, display_order: i32, input: CreateProduct) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            slug,
            name: input.name,
            description: input.description,
            price: input.price,
            second_price: input.second_price,
            stock: input.stock,
            free_shipping: input.free_shipping,
            video_id: input.video_id,
            display_order,
            user_id,
            category_id: input.category_id,
            unity_id: input.unity_id,
            created_at: now,
            updated_at: now,
            images: Vec::new(),
        }
    }

    /// Applies the non-slug fields of an update. Returns true when the
    /// name changed, signalling the caller to regenerate the slug.
    pub fn apply_update(&mut self, update: UpdateProduct) -> bool {
        let mut name_changed = false;
        if let Some(name) = update.name {
            if name != self.name {
                name_changed = true;
            }
            self.name = name;
        }
        if let Some(description) = update.description {
            self.description = description;
        }
        if let Some(price) = update.price {
            self.price = price;
        }
        if let Some(second_price) = update.second_price {
            self.second_price = Some(second_price);
        }
        if let Some(stock) = update.stock {
            self.stock = stock;
        }
        if let Some(free_shipping) = update.free_shipping {
            self.free_shipping = free_shipping;
        }
        if let Some(video_id) = update.video_id {
            self.video_id = Some(video_id);
        }
        if let Some(category_id) = update.category_id {
            self.category_id = category_id;
        }
        if let Some(unity_id) = update.unity_id {
            self.unity_id = unity_id;
        }
        self.updated_at = Utc::now();
        name_changed
    }
}

impl ProductImage {
    pub fn new(product_id: Uuid, storage_key: String, display_order: i32) -> Self {
        Self {
            id: Uuid::now_v7(),
            product_id,
            storage_key,
            display_order,
            created_at: Utc::now(),
        }
    }
}

/// Checks the per-product image cap before registering `incoming` new
/// images against `existing` stored ones.
pub fn image_quota_error(existing: usize, incoming: usize) -> Option<String> {
    if existing >= PRODUCT_IMAGE_LIMIT {
        return Some(format!(
            "Alcanzaste el límite de {PRODUCT_IMAGE_LIMIT} imágenes por producto"
        ));
    }
    if existing + incoming > PRODUCT_IMAGE_LIMIT {
        let remaining = PRODUCT_IMAGE_LIMIT - existing;
        let noun = if remaining == 1 { "imagen" } else { "imágenes" };
        return Some(format!(
            "Solo puedes subir {remaining} {noun} más antes de alcanzar el límite de {PRODUCT_IMAGE_LIMIT}"
        ));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quota_allows_up_to_the_limit() {
        assert!(image_quota_error(0, 5).is_none());
        assert!(image_quota_error(3, 2).is_none());
    }

    #[test]
    fn quota_rejects_when_full() {
        let message = image_quota_error(5, 1).unwrap();
        assert_eq!(message, "Alcanzaste el límite de 5 imágenes por producto");
    }

    #[test]
    fn quota_reports_remaining_slots() {
        assert_eq!(
            image_quota_error(4, 2).unwrap(),
            "Solo puedes subir 1 imagen más antes de alcanzar el límite de 5"
        );
        assert_eq!(
            image_quota_error(2, 4).unwrap(),
            "Solo puedes subir 3 imágenes más antes de alcanzar el límite de 5"
        );
    }

    #[test]
    fn name_change_flags_slug_regeneration() {
        let input = CreateProduct {
            name: "Silla de madera".to_string(),
            description: "Una silla".to_string(),
            price: 100.0,
            second_price: None,
            stock: 1,
            free_shipping: false,
            video_id: None,
            category_id: Uuid::now_v7(),
            unity_id: Uuid::now_v7(),
        };
        let mut product = Product::new(Uuid::now_v7(), "silla-de-madera".to_string(), 1, input);

        let unchanged = product.apply_update(UpdateProduct {
            price: Some(120.0),
            ..Default::default()
        });
        assert!(!unchanged);

        let changed = product.apply_update(UpdateProduct {
            name: Some("Mesa de madera".to_string()),
            ..Default::default()
        });
        assert!(changed);
    }
}
