use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, JoinType, Order, QueryFilter, QueryOrder,
    QuerySelect, RelationTrait,
};

use crate::domain::{
    Booking, BookingStatus, ItemRef, NewBooking, PartyRole, StateFilter, UserRef,
};
use crate::errors::BookingError;
use crate::pagination::PageRequest;
use crate::repository::BookingRepository;

pub struct SeaOrmBookingRepository {
    pub db: DatabaseConnection,
}

impl SeaOrmBookingRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn to_domain(m: models::booking::Model) -> Result<Booking, BookingError> {
    Ok(Booking {
        id: m.id,
        item_id: m.item_id,
        booker_id: m.booker_id,
        start: m.start_date.with_timezone(&Utc),
        end: m.end_date.with_timezone(&Utc),
        status: BookingStatus::from_stored(&m.status)?,
    })
}

fn repo_err(e: sea_orm::DbErr) -> BookingError {
    BookingError::Repository(e.to_string())
}

#[async_trait]
impl BookingRepository for SeaOrmBookingRepository {
    async fn find_user(&self, id: i64) -> Result<Option<UserRef>, BookingError> {
        let res = models::user::find_by_id(&self.db, id)
            .await
            .map_err(|e| BookingError::Repository(e.to_string()))?;
        Ok(res.map(|u| UserRef {
            id: u.id,
            email: u.email,
            name: u.name,
        }))
    }

    async fn user_exists(&self, id: i64) -> Result<bool, BookingError> {
        models::user::exists(&self.db, id)
            .await
            .map_err(|e| BookingError::Repository(e.to_string()))
    }

    async fn find_item(&self, id: i64) -> Result<Option<ItemRef>, BookingError> {
        let res = models::item::find_by_id(&self.db, id)
            .await
            .map_err(|e| BookingError::Repository(e.to_string()))?;
        Ok(res.map(|i| ItemRef {
            id: i.id,
            name: i.name,
            available: i.available,
            owner_id: i.owner_id,
            request_id: i.request_id,
        }))
    }

    async fn find_booking(&self, id: i64) -> Result<Option<Booking>, BookingError> {
        let res = models::booking::find_by_id(&self.db, id)
            .await
            .map_err(|e| BookingError::Repository(e.to_string()))?;
        res.map(to_domain).transpose()
    }

    async fn insert_booking(&self, new: NewBooking) -> Result<Booking, BookingError> {
        let created = models::booking::create(
            &self.db,
            new.item_id,
            new.booker_id,
            new.start,
            new.end,
            BookingStatus::Waiting.as_str(),
        )
        .await
        .map_err(|e| BookingError::Repository(e.to_string()))?;
        to_domain(created)
    }

    async fn update_status(&self, id: i64, status: BookingStatus) -> Result<Booking, BookingError> {
        let updated = models::booking::set_status(&self.db, id, status.as_str())
            .await
            .map_err(|e| match e {
                models::errors::ModelError::Validation(msg) => BookingError::NotFound(msg),
                models::errors::ModelError::Db(msg) => BookingError::Repository(msg),
            })?;
        to_domain(updated)
    }

    async fn list_by_role(
        &self,
        role: PartyRole,
        user_id: i64,
        filter: StateFilter,
        now: DateTime<Utc>,
        page: PageRequest,
    ) -> Result<Vec<Booking>, BookingError> {
        let mut query = match role {
            PartyRole::Booker => models::booking::Entity::find()
                .filter(models::booking::Column::BookerId.eq(user_id)),
            PartyRole::Owner => models::booking::Entity::find()
                .join(JoinType::InnerJoin, models::booking::Relation::Item.def())
                .filter(models::item::Column::OwnerId.eq(user_id)),
        };
        query = match filter {
            StateFilter::All => query,
            StateFilter::Current => query
                .filter(models::booking::Column::StartDate.lte(now))
                .filter(models::booking::Column::EndDate.gt(now)),
            StateFilter::Future => query.filter(models::booking::Column::StartDate.gt(now)),
            StateFilter::Past => query.filter(models::booking::Column::EndDate.lt(now)),
            StateFilter::Waiting => query
                .filter(models::booking::Column::Status.eq(BookingStatus::Waiting.as_str())),
            StateFilter::Rejected => query
                .filter(models::booking::Column::Status.eq(BookingStatus::Rejected.as_str())),
        };
        let order = if filter.ascending() { Order::Asc } else { Order::Desc };
        let (page_idx, limit) = page.normalize();
        let rows = query
            .order_by(models::booking::Column::StartDate, order)
            .offset(page_idx * limit)
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(repo_err)?;
        rows.into_iter().map(to_domain).collect()
    }

    async fn last_for_item(
        &self,
        item_id: i64,
        now: DateTime<Utc>,
    ) -> Result<Option<Booking>, BookingError> {
        let res = models::booking::Entity::find()
            .filter(models::booking::Column::ItemId.eq(item_id))
            .filter(models::booking::Column::StartDate.lte(now))
            .order_by_desc(models::booking::Column::StartDate)
            .one(&self.db)
            .await
            .map_err(repo_err)?;
        res.map(to_domain).transpose()
    }

    async fn next_for_item(
        &self,
        item_id: i64,
        now: DateTime<Utc>,
    ) -> Result<Option<Booking>, BookingError> {
        let res = models::booking::Entity::find()
            .filter(models::booking::Column::ItemId.eq(item_id))
            .filter(models::booking::Column::StartDate.gt(now))
            .order_by_asc(models::booking::Column::StartDate)
            .one(&self.db)
            .await
            .map_err(repo_err)?;
        res.map(to_domain).transpose()
    }

    async fn last_completed_by_user(
        &self,
        user_id: i64,
        item_id: i64,
        now: DateTime<Utc>,
    ) -> Result<Option<Booking>, BookingError> {
        let res = models::booking::Entity::find()
            .filter(models::booking::Column::BookerId.eq(user_id))
            .filter(models::booking::Column::ItemId.eq(item_id))
            .filter(models::booking::Column::EndDate.lt(now))
            .order_by_desc(models::booking::Column::EndDate)
            .one(&self.db)
            .await
            .map_err(repo_err)?;
        res.map(to_domain).transpose()
    }
}
