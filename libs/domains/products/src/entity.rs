//! Sea-ORM entities for the products and product_images tables.

pub mod product {
    use sea_orm::entity::prelude::*;
    use sea_orm::ActiveValue::Set;
    use serde::{Deserialize, Serialize};

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
    #[sea_orm(table_name = "products")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: Uuid,
        #[sea_orm(unique)]
        pub slug: String,
        pub name: String,
        pub description: String,
        pub price: f64,
        pub second_price: Option<f64>,
        pub stock: i32,
        pub free_shipping: bool,
        pub video_id: Option<String>,
        pub display_order: i32,
        pub user_id: Uuid,
        pub category_id: Uuid,
        pub unity_id: Uuid,
        pub created_at: DateTimeWithTimeZone,
        pub updated_at: DateTimeWithTimeZone,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(has_many = "super::image::Entity")]
        Images,
    }

    impl Related<super::image::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Images.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}

    /// Images are loaded separately and attached by the repository.
    impl From<Model> for crate::models::Product {
        fn from(model: Model) -> Self {
            Self {
                id: model.id,
                slug: model.slug,
                name: model.name,
                description: model.description,
                price: model.price,
                second_price: model.second_price,
                stock: model.stock,
                free_shipping: model.free_shipping,
                video_id: model.video_id,
                display_order: model.display_order,
                user_id: model.user_id,
                category_id: model.category_id,
                unity_id: model.unity_id,
                created_at: model.created_at.into(),
                updated_at: model.updated_at.into(),
                images: Vec::new(),
            }
        }
    }

    impl From<crate::models::Product> for ActiveModel {
        fn from(product: crate::models::Product) -> Self {
            ActiveModel {
                id: Set(product.id),
                slug: Set(product.slug),
                name: Set(product.name),
                description: Set(product.description),
                price: Set(product.price),
                second_price: Set(product.second_price),
                stock: Set(product.stock),
                free_shipping: Set(product.free_shipping),
                video_id: Set(product.video_id),
                display_order: Set(product.display_order),
                user_id: Set(product.user_id),
                category_id: Set(product.category_id),
                unity_id: Set(product.unity_id),
                created_at: Set(product.created_at.into()),
                updated_at: Set(product.updated_at.into()),
            }
        }
    }
}

pub mod image {
    use sea_orm::entity::prelude::*;
    use sea_orm::ActiveValue::Set;
    use serde::{Deserialize, Serialize};

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
    #[sea_orm(table_name = "product_images")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: Uuid,
        pub product_id: Uuid,
        pub storage_key: String,
        pub display_order: i32,
        pub created_at: DateTimeWithTimeZone,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(
            belongs_to = "super::product::Entity",
            from = "Column::ProductId",
            to = "super::product::Column::Id"
        )]
        Product,
    }

    impl Related<super::product::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Product.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}

    impl From<Model> for crate::models::ProductImage {
        fn from(model: Model) -> Self {
            Self {
                id: model.id,
                product_id: model.product_id,
                storage_key: model.storage_key,
                display_order: model.display_order,
                created_at: model.created_at.into(),
            }
        }
    }

    impl From<crate::models::ProductImage> for ActiveModel {
        fn from(image: crate::models::ProductImage) -> Self {
            ActiveModel {
                id: Set(image.id),
                product_id: Set(image.product_id),
                storage_key: Set(image.storage_key),
                display_order: Set(image.display_order),
                created_at: Set(image.created_at.into()),
            }
        }
    }
}
