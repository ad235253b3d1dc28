use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
pub enum Pockets {
    Table,
    Id,
    OwnerId,
    Name,
    Kind,
    GoalMinor,
    TargetPeriod,
}

#[derive(Iden)]
pub enum Instruments {
    Table,
    Id,
    OwnerId,
    Issuer,
    Kind,
    Last4,
    DisplayName,
    CreditLimitMinor,
}

// Records deliberately carry no foreign keys to pockets/instruments:
// deleting either must leave existing records in place (the references
// degrade gracefully at derivation time).
#[derive(Iden)]
pub enum Records {
    Table,
    Id,
    OwnerId,
    Kind,
    AmountMinor,
    Category,
    Payment,
    PocketId,
    LinkedTransferId,
    Note,
    CreatedAt,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Pockets::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Pockets::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Pockets::OwnerId).string().not_null())
                    .col(ColumnDef::new(Pockets::Name).string().not_null())
                    .col(ColumnDef::new(Pockets::Kind).string().not_null())
                    .col(ColumnDef::new(Pockets::GoalMinor).big_integer())
                    .col(ColumnDef::new(Pockets::TargetPeriod).string())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-pockets-owner_id")
                    .table(Pockets::Table)
                    .col(Pockets::OwnerId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Instruments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Instruments::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Instruments::OwnerId).string().not_null())
                    .col(ColumnDef::new(Instruments::Issuer).string().not_null())
                    .col(ColumnDef::new(Instruments::Kind).string().not_null())
                    .col(ColumnDef::new(Instruments::Last4).string().not_null())
                    .col(ColumnDef::new(Instruments::DisplayName).string().not_null())
                    .col(ColumnDef::new(Instruments::CreditLimitMinor).big_integer())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-instruments-owner_id")
                    .table(Instruments::Table)
                    .col(Instruments::OwnerId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Records::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Records::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Records::OwnerId).string().not_null())
                    .col(ColumnDef::new(Records::Kind).string().not_null())
                    .col(ColumnDef::new(Records::AmountMinor).big_integer().not_null())
                    .col(ColumnDef::new(Records::Category).string().not_null())
                    .col(ColumnDef::new(Records::Payment).string())
                    .col(ColumnDef::new(Records::PocketId).string())
                    .col(ColumnDef::new(Records::LinkedTransferId).string())
                    .col(ColumnDef::new(Records::Note).string())
                    .col(ColumnDef::new(Records::CreatedAt).timestamp().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-records-owner_id-created_at")
                    .table(Records::Table)
                    .col(Records::OwnerId)
                    .col(Records::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-records-pocket_id")
                    .table(Records::Table)
                    .col(Records::PocketId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Records::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Instruments::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Pockets::Table).to_owned())
            .await
    }
}
