use sea_orm::entity::prelude::*;
use sea_orm::ActiveValue::Set;
use serde::{Deserialize, Serialize};

/// Sea-ORM entity for the shipping_addresses table
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "shipping_addresses")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub alias: String,
    pub name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub address_line_1: String,
    pub country: String,
    pub state: String,
    pub city: String,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for crate::models::ShippingAddress {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            alias: model.alias,
            name: model.name,
            last_name: model.last_name,
            email: model.email,
            phone: model.phone,
            address_line_1: model.address_line_1,
            country: model.country,
            state: model.state,
            city: model.city,
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        }
    }
}

impl From<crate::models::ShippingAddress> for ActiveModel {
    fn from(address: crate::models::ShippingAddress) -> Self {
        ActiveModel {
            id: Set(address.id),
            user_id: Set(address.user_id),
            alias: Set(address.alias),
            name: Set(address.name),
            last_name: Set(address.last_name),
            email: Set(address.email),
            phone: Set(address.phone),
            address_line_1: Set(address.address_line_1),
            country: Set(address.country),
            state: Set(address.state),
            city: Set(address.city),
            created_at: Set(address.created_at.into()),
            updated_at: Set(address.updated_at.into()),
        }
    }
}
