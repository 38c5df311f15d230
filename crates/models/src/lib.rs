pub mod booking;
pub mod db;
pub mod errors;
pub mod item;
pub mod user;

#[cfg(test)]
mod db_tests {
    use chrono::{Duration, Utc};
    use migration::MigratorTrait;
    use sea_orm::{ActiveModelTrait, Set};

    use crate::{booking, db, item, user};

    #[tokio::test]
    async fn booking_round_trip_against_live_db() {
        let db = match db::connect().await {
            Ok(db) => db,
            Err(e) => {
                eprintln!("skip: cannot connect to db: {}", e);
                return;
            }
        };
        if let Err(e) = migration::Migrator::up(&db, None).await {
            eprintln!("skip: migrate up failed: {}", e);
            return;
        }

        let owner = user::ActiveModel {
            email: Set(format!("owner+{}@example.com", Utc::now().timestamp_micros())),
            name: Set("Owner".into()),
            ..Default::default()
        }
        .insert(&db)
        .await
        .expect("insert owner");
        let booker = user::ActiveModel {
            email: Set(format!("booker+{}@example.com", Utc::now().timestamp_micros())),
            name: Set("Booker".into()),
            ..Default::default()
        }
        .insert(&db)
        .await
        .expect("insert booker");
        let drill = item::ActiveModel {
            name: Set("drill".into()),
            description: Set("cordless drill".into()),
            available: Set(true),
            owner_id: Set(owner.id),
            request_id: Set(None),
            ..Default::default()
        }
        .insert(&db)
        .await
        .expect("insert item");

        let start = Utc::now() + Duration::hours(1);
        let end = Utc::now() + Duration::days(1);
        let created = booking::create(&db, drill.id, booker.id, start, end, "WAITING")
            .await
            .expect("create booking");
        assert!(created.id > 0);
        assert_eq!(created.status, "WAITING");

        let updated = booking::set_status(&db, created.id, "APPROVED")
            .await
            .expect("set status");
        assert_eq!(updated.status, "APPROVED");

        let found = booking::find_by_id(&db, created.id)
            .await
            .expect("find booking")
            .expect("booking exists");
        assert_eq!(found.status, "APPROVED");
        assert!(user::exists(&db, booker.id).await.expect("exists"));

        if let Err(e) = migration::Migrator::down(&db, None).await {
            eprintln!("cleanup: migrate down failed: {}", e);
        }
    }
}
