use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// Client-supplied order references: `ORD-` followed by 20 digits.
static ORDER_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^ORD-\d{20}$").expect("valid order id regex"));

/// Placed order. The id is a client-generated `ORD-` reference, and the
/// monetary breakdown is a snapshot taken at checkout time.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    pub user_id: Uuid,
    pub coupon_id: Option<Uuid>,
    pub shipping_address_id: Uuid,
    pub subtotal: f64,
    pub discount: f64,
    pub tax: f64,
    pub total: f64,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub items: Vec<OrderItem>,
}

/// One purchased line; price is the unit price at checkout
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub id: Uuid,
    pub order_id: String,
    pub product_id: Uuid,
    pub quantity: i32,
    pub price: f64,
}

/// One checkout line as submitted by the client
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    pub id: Uuid,
    #[validate(length(min = 1, message = "Nombre del producto es requerido"))]
    pub name: String,
    #[validate(range(min = 0.000001, message = "El precio debe ser mayor a 0"))]
    pub price: f64,
    pub category_id: Uuid,
    #[validate(range(min = 1, message = "La cantidad debe ser mayor a 0"))]
    pub quantity: i32,
}

/// DTO for placing an order
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrder {
    #[validate(custom(function = validate_order_id))]
    pub id: String,
    pub coupon_id: Option<Uuid>,
    pub shipping_address_id: Uuid,
    #[validate(length(min = 1, message = "La orden debe contener al menos un producto"))]
    #[validate(nested)]
    pub products: Vec<OrderLine>,
    #[validate(range(min = 0.000001, message = "El subtotal debe ser mayor a 0"))]
    pub subtotal: f64,
    #[serde(default)]
    #[validate(range(min = 0.0, message = "El descuento no puede ser menor a 0"))]
    pub discount: f64,
    #[serde(default)]
    #[validate(range(min = 0.0, message = "El impuesto no puede ser menor a 0"))]
    pub tax: f64,
    #[validate(range(min = 0.000001, message = "El total debe ser mayor a 0"))]
    pub total: f64,
}

fn validate_order_id(id: &str) -> Result<(), ValidationError> {
    if ORDER_ID_RE.is_match(id) {
        return Ok(());
    }
    Err(ValidationError::new("order_id").with_message("Id de orden inválido".into()))
}

impl Order {
    pub fn new(user_id: Uuid, input: CreateOrder) -> Self {
        let items = input
            .products
            .iter()
            .map(|line| OrderItem {
                id: Uuid::now_v7(),
                order_id: input.id.clone(),
                product_id: line.id,
                quantity: line.quantity,
                price: line.price,
            })
            .collect();

        Self {
            id: input.id,
            user_id,
            coupon_id: input.coupon_id,
            shipping_address_id: input.shipping_address_id,
            subtotal: input.subtotal,
            discount: input.discount,
            tax: input.tax,
            total: input.total,
            created_at: Utc::now(),
            items,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(id: &str) -> CreateOrder {
        CreateOrder {
            id: id.to_string(),
            coupon_id: None,
            shipping_address_id: Uuid::now_v7(),
            products: vec![OrderLine {
                id: Uuid::now_v7(),
                name: "Silla".to_string(),
                price: 1.5,
                category_id: Uuid::now_v7(),
                quantity: 2,
            }],
            subtotal: 3.0,
            discount: 0.0,
            tax: 0.0,
            total: 3.0,
        }
    }

    #[test]
    fn accepts_well_formed_order_ids() {
        assert!(input("ORD-20250707183547475003").validate().is_ok());
    }

    #[test]
    fn rejects_malformed_order_ids() {
        assert!(input("ORD-123").validate().is_err());
        assert!(input("ORDER-20250707183547475003").validate().is_err());
        assert!(input("ORD-2025070718354747500x").validate().is_err());
    }

    #[test]
    fn rejects_empty_product_list() {
        let mut order = input("ORD-20250707183547475003");
        order.products.clear();
        assert!(order.validate().is_err());
    }

    #[test]
    fn new_order_snapshots_lines() {
        let order = Order::new(Uuid::now_v7(), input("ORD-20250707183547475003"));
        assert_eq!(order.items.len(), 1);
        assert_eq!(order.items[0].order_id, order.id);
        assert_eq!(order.items[0].quantity, 2);
    }
}
