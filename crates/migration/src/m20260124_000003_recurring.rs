use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
pub enum RecurringRules {
    Table,
    Id,
    OwnerId,
    Kind,
    AmountMinor,
    Category,
    Payment,
    Frequency,
    DayOfMonth,
    IsActive,
    LastExecutedAt,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(RecurringRules::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(RecurringRules::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(RecurringRules::OwnerId).string().not_null())
                    .col(ColumnDef::new(RecurringRules::Kind).string().not_null())
                    .col(
                        ColumnDef::new(RecurringRules::AmountMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(RecurringRules::Category).string().not_null())
                    .col(ColumnDef::new(RecurringRules::Payment).string())
                    .col(ColumnDef::new(RecurringRules::Frequency).string().not_null())
                    .col(
                        ColumnDef::new(RecurringRules::DayOfMonth)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(RecurringRules::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(RecurringRules::LastExecutedAt).timestamp())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-recurring_rules-owner_id")
                    .table(RecurringRules::Table)
                    .col(RecurringRules::OwnerId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(RecurringRules::Table).to_owned())
            .await
    }
}
