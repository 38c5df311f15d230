//! Create `bookings` table with FKs to `items` and `users`.
//!
//! Status is persisted by name (WAITING/APPROVED/REJECTED).
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Bookings::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Bookings::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(big_integer(Bookings::ItemId).not_null())
                    .col(big_integer(Bookings::BookerId).not_null())
                    .col(timestamp_with_time_zone(Bookings::StartDate).not_null())
                    .col(timestamp_with_time_zone(Bookings::EndDate).not_null())
                    .col(string_len(Bookings::Status, 16).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_booking_item")
                            .from(Bookings::Table, Bookings::ItemId)
                            .to(Items::Table, Items::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_booking_booker")
                            .from(Bookings::Table, Bookings::BookerId)
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
            .drop_table(Table::drop().table(Bookings::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Bookings { Table, Id, ItemId, BookerId, StartDate, EndDate, Status }

#[derive(DeriveIden)]
enum Items { Table, Id }

#[derive(DeriveIden)]
enum Users { Table, Id }
