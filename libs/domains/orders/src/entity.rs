//! Sea-ORM entities for the orders and order_items tables.

pub mod order {
    use sea_orm::entity::prelude::*;
    use sea_orm::ActiveValue::Set;
    use serde::{Deserialize, Serialize};

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
    #[sea_orm(table_name = "orders")]
    pub struct Model {
        /// Client-generated ORD- reference
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: String,
        pub user_id: Uuid,
        pub coupon_id: Option<Uuid>,
        pub shipping_address_id: Uuid,
        pub subtotal: f64,
        pub discount: f64,
        pub tax: f64,
        pub total: f64,
        pub created_at: DateTimeWithTimeZone,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(has_many = "super::item::Entity")]
        Items,
    }

    impl Related<super::item::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Items.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}

    /// Items are loaded separately and attached by the repository.
    impl From<Model> for crate::models::Order {
        fn from(model: Model) -> Self {
            Self {
                id: model.id,
                user_id: model.user_id,
                coupon_id: model.coupon_id,
                shipping_address_id: model.shipping_address_id,
                subtotal: model.subtotal,
                discount: model.discount,
                tax: model.tax,
                total: model.total,
                created_at: model.created_at.into(),
                items: Vec::new(),
            }
        }
    }

    impl From<crate::models::Order> for ActiveModel {
        fn from(order: crate::models::Order) -> Self {
            ActiveModel {
                id: Set(order.id),
                user_id: Set(order.user_id),
                coupon_id: Set(order.coupon_id),
                shipping_address_id: Set(order.shipping_address_id),
                subtotal: Set(order.subtotal),
                discount: Set(order.discount),
                tax: Set(order.tax),
                total: Set(order.total),
                created_at: Set(order.created_at.into()),
            }
        }
    }
}

pub mod item {
    use sea_orm::entity::prelude::*;
    use sea_orm::ActiveValue::Set;
    use serde::{Deserialize, Serialize};

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
    #[sea_orm(table_name = "order_items")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: Uuid,
        pub order_id: String,
        pub product_id: Uuid,
        pub quantity: i32,
        pub price: f64,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(
            belongs_to = "super::order::Entity",
            from = "Column::OrderId",
            to = "super::order::Column::Id"
        )]
        Order,
    }

    impl Related<super::order::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Order.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}

    impl From<Model> for crate::models::OrderItem {
        fn from(model: Model) -> Self {
            Self {
                id: model.id,
                order_id: model.order_id,
                product_id: model.product_id,
                quantity: model.quantity,
                price: model.price,
            }
        }
    }

    impl From<crate::models::OrderItem> for ActiveModel {
        fn from(item: crate::models::OrderItem) -> Self {
            ActiveModel {
                id: Set(item.id),
                order_id: Set(item.order_id),
                product_id: Set(item.product_id),
                quantity: Set(item.quantity),
                price: Set(item.price),
            }
        }
    }
}
