/// Sea-ORM entity for the users table
pub mod user {
    use sea_orm::entity::prelude::*;
    use serde::{Deserialize, Serialize};

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
    #[sea_orm(table_name = "users")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: Uuid,
        #[sea_orm(unique)]
        pub email: String,
        pub password_hash: String,
        pub name: String,
        pub last_name: String,
        pub is_mod: bool,
        pub is_admin: bool,
        pub is_active: bool,
        pub created_at: DateTimeWithTimeZone,
        pub updated_at: DateTimeWithTimeZone,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}

    impl From<Model> for crate::models::User {
        fn from(model: Model) -> Self {
            Self {
                id: model.id,
                email: model.email,
                name: model.name,
                last_name: model.last_name,
                is_mod: model.is_mod,
                is_admin: model.is_admin,
                is_active: model.is_active,
                created_at: model.created_at.into(),
                updated_at: model.updated_at.into(),
            }
        }
    }

}

/// Sea-ORM entity for the reset_passwords table
pub mod reset_password {
    use sea_orm::entity::prelude::*;
    use sea_orm::ActiveValue::Set;
    use serde::{Deserialize, Serialize};

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
    #[sea_orm(table_name = "reset_passwords")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: Uuid,
        #[sea_orm(unique)]
        pub code: String,
        pub user_id: Uuid,
        pub expired_at: DateTimeWithTimeZone,
        pub is_used: bool,
        pub created_at: DateTimeWithTimeZone,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}

    impl From<Model> for crate::models::ResetCode {
        fn from(model: Model) -> Self {
            Self {
                id: model.id,
                code: model.code,
                user_id: model.user_id,
                expired_at: model.expired_at.into(),
                is_used: model.is_used,
                created_at: model.created_at.into(),
            }
        }
    }

    impl From<crate::models::ResetCode> for ActiveModel {
        fn from(code: crate::models::ResetCode) -> Self {
            ActiveModel {
                id: Set(code.id),
                code: Set(code.code),
                user_id: Set(code.user_id),
                expired_at: Set(code.expired_at.into()),
                is_used: Set(code.is_used),
                created_at: Set(code.created_at.into()),
            }
        }
    }
}
