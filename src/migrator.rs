use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_purchase_orders_table::Migration),
            Box::new(m20240101_000002_create_approval_workflow_tables::Migration),
            Box::new(m20240101_000003_create_approval_actions_table::Migration),
            Box::new(m20240101_000004_create_suppliers_table::Migration),
        ]
    }
}

// Migration implementations

mod m20240101_000001_create_purchase_orders_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000001_create_purchase_orders_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(PurchaseOrders::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(PurchaseOrders::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(PurchaseOrders::PoNumber).string().not_null())
                        .col(
                            ColumnDef::new(PurchaseOrders::OrganizationId)
                                .uuid()
                                .not_null(),
                        )
                        .col(ColumnDef::new(PurchaseOrders::SupplierId).uuid().null())
                        .col(
                            ColumnDef::new(PurchaseOrders::WorkflowStatus)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseOrders::TransactionStatus)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseOrders::RequiresApproval)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(
                            ColumnDef::new(PurchaseOrders::ApprovalTier)
                                .small_integer()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseOrders::TotalAmount)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(PurchaseOrders::Currency).string().not_null())
                        .col(
                            ColumnDef::new(PurchaseOrders::ProcurementMetadata)
                                .json()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseOrders::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseOrders::UpdatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            // Useful indexes
            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_purchase_orders_organization_id")
                        .table(PurchaseOrders::Table)
                        .col(PurchaseOrders::OrganizationId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_purchase_orders_workflow_status")
                        .table(PurchaseOrders::Table)
                        .col(PurchaseOrders::WorkflowStatus)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(PurchaseOrders::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum PurchaseOrders {
        Table,
        Id,
        PoNumber,
        OrganizationId,
        SupplierId,
        WorkflowStatus,
        TransactionStatus,
        RequiresApproval,
        ApprovalTier,
        TotalAmount,
        Currency,
        ProcurementMetadata,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240101_000002_create_approval_workflow_tables {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000002_create_approval_workflow_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(ApprovalWorkflows::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(ApprovalWorkflows::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ApprovalWorkflows::OrganizationId)
                                .uuid()
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(ApprovalWorkflows::Name).string().not_null())
                        .col(
                            ColumnDef::new(ApprovalWorkflows::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ApprovalWorkflows::UpdatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(ApprovalWorkflowFields::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(ApprovalWorkflowFields::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ApprovalWorkflowFields::WorkflowId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ApprovalWorkflowFields::FieldName)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ApprovalWorkflowFields::FieldValue)
                                .string()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_approval_workflow_fields_workflow_id")
                        .table(ApprovalWorkflowFields::Table)
                        .col(ApprovalWorkflowFields::WorkflowId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(
                    Table::drop()
                        .table(ApprovalWorkflowFields::Table)
                        .to_owned(),
                )
                .await?;
            manager
                .drop_table(Table::drop().table(ApprovalWorkflows::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum ApprovalWorkflows {
        Table,
        Id,
        OrganizationId,
        Name,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    pub(super) enum ApprovalWorkflowFields {
        Table,
        Id,
        WorkflowId,
        FieldName,
        FieldValue,
    }
}

mod m20240101_000003_create_approval_actions_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000003_create_approval_actions_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(ApprovalActions::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(ApprovalActions::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ApprovalActions::PurchaseOrderId)
                                .uuid()
                                .not_null(),
                        )
                        .col(ColumnDef::new(ApprovalActions::Action).string().not_null())
                        .col(
                            ColumnDef::new(ApprovalActions::PerformedBy)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ApprovalActions::ApprovalTier)
                                .small_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ApprovalActions::PoNumber)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ApprovalActions::TotalAmount)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(ApprovalActions::Comments).string().null())
                        .col(
                            ColumnDef::new(ApprovalActions::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_approval_actions_purchase_order_id")
                        .table(ApprovalActions::Table)
                        .col(ApprovalActions::PurchaseOrderId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(ApprovalActions::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum ApprovalActions {
        Table,
        Id,
        PurchaseOrderId,
        Action,
        PerformedBy,
        ApprovalTier,
        PoNumber,
        TotalAmount,
        Comments,
        CreatedAt,
    }
}

mod m20240101_000004_create_suppliers_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000004_create_suppliers_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Suppliers::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Suppliers::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Suppliers::OrganizationId).uuid().not_null())
                        .col(ColumnDef::new(Suppliers::Name).string().not_null())
                        .col(ColumnDef::new(Suppliers::ContactEmail).string().null())
                        .col(ColumnDef::new(Suppliers::ContactPhone).string().null())
                        .col(ColumnDef::new(Suppliers::CreatedAt).timestamp().not_null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_suppliers_organization_id")
                        .table(Suppliers::Table)
                        .col(Suppliers::OrganizationId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Suppliers::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Suppliers {
        Table,
        Id,
        OrganizationId,
        Name,
        ContactEmail,
        ContactPhone,
        CreatedAt,
    }
}
