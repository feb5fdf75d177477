use sea_orm_migration::sea_query::extension::postgres::Type;
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_type(
                Type::create()
                    .as_enum(CouponKind::Enum)
                    .values([CouponKind::Percentage, CouponKind::Fixed])
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Coupons::Table)
                    .if_not_exists()
                    .col(pk_uuid(Coupons::Id))
                    .col(string_uniq(Coupons::Code))
                    .col(string_null(Coupons::Description))
                    .col(double(Coupons::Discount))
                    .col(boolean(Coupons::Active).default(true))
                    .col(
                        ColumnDef::new(Coupons::Kind)
                            .enumeration(
                                CouponKind::Enum,
                                [CouponKind::Percentage, CouponKind::Fixed],
                            )
                            .not_null()
                            .default("percentage"),
                    )
                    .col(integer_null(Coupons::UsageLimit))
                    .col(integer(Coupons::TimesUsed).default(0))
                    .col(double_null(Coupons::MinPurchase))
                    .col(json(Coupons::ValidCategories).default("[]"))
                    .col(timestamp_with_time_zone_null(Coupons::ExpiresAt))
                    .col(
                        timestamp_with_time_zone(Coupons::CreatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        timestamp_with_time_zone(Coupons::UpdatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ShippingAddresses::Table)
                    .if_not_exists()
                    .col(pk_uuid(ShippingAddresses::Id))
                    .col(uuid(ShippingAddresses::UserId))
                    .col(string(ShippingAddresses::Alias))
                    .col(string(ShippingAddresses::Name))
                    .col(string(ShippingAddresses::LastName))
                    .col(string(ShippingAddresses::Email))
                    .col(string(ShippingAddresses::Phone))
                    .col(string(ShippingAddresses::AddressLine1))
                    .col(string(ShippingAddresses::Country))
                    .col(string(ShippingAddresses::State))
                    .col(string(ShippingAddresses::City))
                    .col(
                        timestamp_with_time_zone(ShippingAddresses::CreatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        timestamp_with_time_zone(ShippingAddresses::UpdatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_shipping_addresses_user_id")
                            .from(ShippingAddresses::Table, ShippingAddresses::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_shipping_addresses_user_id")
                    .table(ShippingAddresses::Table)
                    .col(ShippingAddresses::UserId)
                    .to_owned(),
            )
            .await?;

        // Order ids are client-supplied ORD- references, not UUIDs
        manager
            .create_table(
                Table::create()
                    .table(Orders::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Orders::Id).string().not_null().primary_key())
                    .col(uuid(Orders::UserId))
                    .col(uuid_null(Orders::CouponId))
                    .col(uuid(Orders::ShippingAddressId))
                    .col(double(Orders::Subtotal))
                    .col(double(Orders::Discount).default(0))
                    .col(double(Orders::Tax).default(0))
                    .col(double(Orders::Total))
                    .col(
                        timestamp_with_time_zone(Orders::CreatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_orders_user_id")
                            .from(Orders::Table, Orders::UserId)
                            .to(Users::Table, Users::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_orders_coupon_id")
                            .from(Orders::Table, Orders::CouponId)
                            .to(Coupons::Table, Coupons::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_orders_shipping_address_id")
                            .from(Orders::Table, Orders::ShippingAddressId)
                            .to(ShippingAddresses::Table, ShippingAddresses::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_orders_user_id")
                    .table(Orders::Table)
                    .col(Orders::UserId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(OrderItems::Table)
                    .if_not_exists()
                    .col(pk_uuid(OrderItems::Id))
                    .col(string(OrderItems::OrderId))
                    .col(uuid(OrderItems::ProductId))
                    .col(integer(OrderItems::Quantity))
                    .col(double(OrderItems::Price))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_order_items_order_id")
                            .from(OrderItems::Table, OrderItems::OrderId)
                            .to(Orders::Table, Orders::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_order_items_product_id")
                            .from(OrderItems::Table, OrderItems::ProductId)
                            .to(Products::Table, Products::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_order_items_order_id")
                    .table(OrderItems::Table)
                    .col(OrderItems::OrderId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(OrderItems::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Orders::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(ShippingAddresses::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Coupons::Table).to_owned())
            .await?;

        manager
            .drop_type(Type::drop().name(CouponKind::Enum).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum Coupons {
    Table,
    Id,
    Code,
    Description,
    Discount,
    Active,
    Kind,
    UsageLimit,
    TimesUsed,
    MinPurchase,
    ValidCategories,
    ExpiresAt,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum CouponKind {
    #[sea_orm(iden = "coupon_kind")]
    Enum,
    #[sea_orm(iden = "percentage")]
    Percentage,
    #[sea_orm(iden = "fixed")]
    Fixed,
}

#[derive(DeriveIden)]
enum ShippingAddresses {
    Table,
    Id,
    UserId,
    Alias,
    Name,
    LastName,
    Email,
    Phone,
    AddressLine1,
    Country,
    State,
    City,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Orders {
    Table,
    Id,
    UserId,
    CouponId,
    ShippingAddressId,
    Subtotal,
    Discount,
    Tax,
    Total,
    CreatedAt,
}

#[derive(DeriveIden)]
enum OrderItems {
    Table,
    Id,
    OrderId,
    ProductId,
    Quantity,
    Price,
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Products {
    Table,
    Id,
}
