//! Create `items` table with FK to `users`.
//!
//! `available` is advisory and read at booking-creation time only.
//! `request_id` points at the item request the listing answers, when any.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Items::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Items::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(string_len(Items::Name, 128).not_null())
                    .col(text(Items::Description).not_null())
                    .col(boolean(Items::Available).not_null())
                    .col(big_integer(Items::OwnerId).not_null())
                    .col(ColumnDef::new(Items::RequestId).big_integer().null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_item_owner")
                            .from(Items::Table, Items::OwnerId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Items::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Items { Table, Id, Name, Description, Available, OwnerId, RequestId }

#[derive(DeriveIden)]
enum Users { Table, Id }
