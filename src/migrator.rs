use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_users_table::Migration),
            Box::new(m20240101_000002_create_clients_table::Migration),
            Box::new(m20240101_000003_create_inventory_items_table::Migration),
            Box::new(m20240101_000004_create_service_orders_table::Migration),
            Box::new(m20240101_000005_create_order_lines_tables::Migration),
        ]
    }
}

mod m20240101_000001_create_users_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000001_create_users_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Users::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Users::Id).uuid().primary_key().not_null())
                        .col(
                            ColumnDef::new(Users::Username)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Users::PasswordHash).string().not_null())
                        .col(ColumnDef::new(Users::Name).string().not_null())
                        .col(ColumnDef::new(Users::Role).string().not_null())
                        .col(ColumnDef::new(Users::CreatedAt).timestamp().not_null())
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Users::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Users {
        Table,
        Id,
        Username,
        PasswordHash,
        Name,
        Role,
        CreatedAt,
    }
}

mod m20240101_000002_create_clients_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000002_create_clients_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Clients::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Clients::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Clients::Name).string().not_null())
                        .col(ColumnDef::new(Clients::Phone).string().null())
                        .col(ColumnDef::new(Clients::Email).string().null())
                        .col(ColumnDef::new(Clients::Document).string().null())
                        .col(ColumnDef::new(Clients::Vehicles).string().null())
                        .col(ColumnDef::new(Clients::Notes).string().null())
                        .col(ColumnDef::new(Clients::CreatedAt).timestamp().not_null())
                        .col(ColumnDef::new(Clients::UpdatedAt).timestamp().null())
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Clients::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Clients {
        Table,
        Id,
        Name,
        Phone,
        Email,
        Document,
        Vehicles,
        Notes,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240101_000003_create_inventory_items_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000003_create_inventory_items_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(InventoryItems::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(InventoryItems::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(InventoryItems::Sku).string().not_null())
                        .col(
                            ColumnDef::new(InventoryItems::Description)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InventoryItems::Quantity)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(InventoryItems::MinQuantity)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(InventoryItems::UnitPrice)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(InventoryItems::Location).string().null())
                        .col(ColumnDef::new(InventoryItems::Supplier).string().null())
                        .col(
                            ColumnDef::new(InventoryItems::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .col(ColumnDef::new(InventoryItems::UpdatedAt).timestamp().null())
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(InventoryItems::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum InventoryItems {
        Table,
        Id,
        Sku,
        Description,
        Quantity,
        MinQuantity,
        UnitPrice,
        Location,
        Supplier,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240101_000004_create_service_orders_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000004_create_service_orders_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(ServiceOrders::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(ServiceOrders::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(ServiceOrders::Code).string().not_null())
                        .col(ColumnDef::new(ServiceOrders::ClientId).uuid().not_null())
                        .col(ColumnDef::new(ServiceOrders::Vehicle).string().not_null())
                        .col(
                            ColumnDef::new(ServiceOrders::Description)
                                .string()
                                .not_null(),
                        )
                        .col(ColumnDef::new(ServiceOrders::Status).string().not_null())
                        .col(ColumnDef::new(ServiceOrders::Notes).string().null())
                        .col(
                            ColumnDef::new(ServiceOrders::LaborTotal)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(ServiceOrders::PartsTotal)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(ServiceOrders::Discount)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(ServiceOrders::AdditionalFees)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(ServiceOrders::Total)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(ServiceOrders::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .col(ColumnDef::new(ServiceOrders::UpdatedAt).timestamp().null())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_service_orders_client")
                                .from(ServiceOrders::Table, ServiceOrders::ClientId)
                                .to(Clients::Table, Clients::Id),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(ServiceOrders::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum ServiceOrders {
        Table,
        Id,
        Code,
        ClientId,
        Vehicle,
        Description,
        Status,
        Notes,
        LaborTotal,
        PartsTotal,
        Discount,
        AdditionalFees,
        Total,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum Clients {
        Table,
        Id,
    }
}

mod m20240101_000005_create_order_lines_tables {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000005_create_order_lines_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(OrderLabor::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(OrderLabor::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(OrderLabor::OrderId).uuid().not_null())
                        .col(ColumnDef::new(OrderLabor::Description).string().not_null())
                        .col(ColumnDef::new(OrderLabor::Hours).decimal().not_null())
                        .col(ColumnDef::new(OrderLabor::Rate).decimal().not_null())
                        .col(ColumnDef::new(OrderLabor::LineTotal).decimal().not_null())
                        .col(ColumnDef::new(OrderLabor::Position).integer().not_null())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_order_labor_order")
                                .from(OrderLabor::Table, OrderLabor::OrderId)
                                .to(ServiceOrders::Table, ServiceOrders::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(OrderParts::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(OrderParts::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(OrderParts::OrderId).uuid().not_null())
                        .col(ColumnDef::new(OrderParts::InventoryItemId).uuid().null())
                        .col(ColumnDef::new(OrderParts::Description).string().not_null())
                        .col(ColumnDef::new(OrderParts::Quantity).integer().not_null())
                        .col(ColumnDef::new(OrderParts::UnitPrice).decimal().not_null())
                        .col(ColumnDef::new(OrderParts::LineTotal).decimal().not_null())
                        .col(ColumnDef::new(OrderParts::Position).integer().not_null())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_order_parts_order")
                                .from(OrderParts::Table, OrderParts::OrderId)
                                .to(ServiceOrders::Table, ServiceOrders::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(OrderParts::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(OrderLabor::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum OrderLabor {
        Table,
        Id,
        OrderId,
        Description,
        Hours,
        Rate,
        LineTotal,
        Position,
    }

    #[derive(DeriveIden)]
    enum OrderParts {
        Table,
        Id,
        OrderId,
        InventoryItemId,
        Description,
        Quantity,
        UnitPrice,
        LineTotal,
        Position,
    }

    #[derive(DeriveIden)]
    enum ServiceOrders {
        Table,
        Id,
    }
}
