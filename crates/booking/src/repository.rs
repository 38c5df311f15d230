use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{
    Booking, BookingStatus, ItemRef, NewBooking, PartyRole, StateFilter, UserRef,
};
use crate::errors::BookingError;
use crate::pagination::PageRequest;

/// Persistence abstraction consumed by the booking lifecycle.
///
/// Temporal predicates take `now` as a parameter so they stay deterministic
/// under test; the service passes the wall clock.
#[async_trait]
pub trait BookingRepository: Send + Sync {
    async fn find_user(&self, id: i64) -> Result<Option<UserRef>, BookingError>;
    async fn user_exists(&self, id: i64) -> Result<bool, BookingError>;
    async fn find_item(&self, id: i64) -> Result<Option<ItemRef>, BookingError>;
    async fn find_booking(&self, id: i64) -> Result<Option<Booking>, BookingError>;

    /// Insert a new booking in WAITING status; the store assigns the id.
    async fn insert_booking(&self, new: NewBooking) -> Result<Booking, BookingError>;
    async fn update_status(&self, id: i64, status: BookingStatus) -> Result<Booking, BookingError>;

    /// Bookings where `user_id` plays `role`, constrained by `filter`
    /// against `now`, ordered by start (most-recent-first; soonest-first for
    /// the future bucket) and cut to `page`.
    async fn list_by_role(
        &self,
        role: PartyRole,
        user_id: i64,
        filter: StateFilter,
        now: DateTime<Utc>,
        page: PageRequest,
    ) -> Result<Vec<Booking>, BookingError>;

    /// Most recent booking of the item whose start is at or before `now`.
    async fn last_for_item(
        &self,
        item_id: i64,
        now: DateTime<Utc>,
    ) -> Result<Option<Booking>, BookingError>;

    /// Earliest booking of the item whose start is after `now`.
    async fn next_for_item(
        &self,
        item_id: i64,
        now: DateTime<Utc>,
    ) -> Result<Option<Booking>, BookingError>;

    /// Most recent booking by `user_id` of `item_id` that ended before
    /// `now`. Gates comment permission in the item collaborator.
    async fn last_completed_by_user(
        &self,
        user_id: i64,
        item_id: i64,
        now: DateTime<Utc>,
    ) -> Result<Option<Booking>, BookingError>;
}

/// Simple in-memory mock repository for tests and doc examples
pub mod mock {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicI64, Ordering};
    use std::sync::Mutex;

    use super::*;

    #[derive(Default)]
    pub struct MockBookingRepository {
        users: Mutex<HashMap<i64, UserRef>>,
        items: Mutex<HashMap<i64, ItemRef>>,
        bookings: Mutex<Vec<Booking>>,
        next_id: AtomicI64,
    }

    impl MockBookingRepository {
        fn assign_id(&self) -> i64 {
            self.next_id.fetch_add(1, Ordering::SeqCst) + 1
        }

        pub fn add_user(&self, email: &str, name: &str) -> UserRef {
            let user = UserRef {
                id: self.assign_id(),
                email: email.to_string(),
                name: name.to_string(),
            };
            self.users.lock().unwrap().insert(user.id, user.clone());
            user
        }

        pub fn add_item(&self, owner_id: i64, name: &str, available: bool) -> ItemRef {
            let item = ItemRef {
                id: self.assign_id(),
                name: name.to_string(),
                available,
                owner_id,
                request_id: None,
            };
            self.items.lock().unwrap().insert(item.id, item.clone());
            item
        }

        fn plays_role(&self, booking: &Booking, role: PartyRole, user_id: i64) -> bool {
            match role {
                PartyRole::Booker => booking.booker_id == user_id,
                PartyRole::Owner => self
                    .items
                    .lock()
                    .unwrap()
                    .get(&booking.item_id)
                    .map(|item| item.owner_id == user_id)
                    .unwrap_or(false),
            }
        }
    }

    #[async_trait]
    impl BookingRepository for MockBookingRepository {
        async fn find_user(&self, id: i64) -> Result<Option<UserRef>, BookingError> {
            Ok(self.users.lock().unwrap().get(&id).cloned())
        }

        async fn user_exists(&self, id: i64) -> Result<bool, BookingError> {
            Ok(self.users.lock().unwrap().contains_key(&id))
        }

        async fn find_item(&self, id: i64) -> Result<Option<ItemRef>, BookingError> {
            Ok(self.items.lock().unwrap().get(&id).cloned())
        }

        async fn find_booking(&self, id: i64) -> Result<Option<Booking>, BookingError> {
            Ok(self
                .bookings
                .lock()
                .unwrap()
                .iter()
                .find(|b| b.id == id)
                .cloned())
        }

        async fn insert_booking(&self, new: NewBooking) -> Result<Booking, BookingError> {
            let booking = Booking {
                id: self.assign_id(),
                item_id: new.item_id,
                booker_id: new.booker_id,
                start: new.start,
                end: new.end,
                status: BookingStatus::Waiting,
            };
            self.bookings.lock().unwrap().push(booking.clone());
            Ok(booking)
        }

        async fn update_status(
            &self,
            id: i64,
            status: BookingStatus,
        ) -> Result<Booking, BookingError> {
            let mut bookings = self.bookings.lock().unwrap();
            let booking = bookings
                .iter_mut()
                .find(|b| b.id == id)
                .ok_or_else(|| BookingError::not_found("booking", id))?;
            booking.status = status;
            Ok(booking.clone())
        }

        async fn list_by_role(
            &self,
            role: PartyRole,
            user_id: i64,
            filter: StateFilter,
            now: DateTime<Utc>,
            page: PageRequest,
        ) -> Result<Vec<Booking>, BookingError> {
            let mut selected: Vec<Booking> = self
                .bookings
                .lock()
                .unwrap()
                .iter()
                .filter(|b| self.plays_role(b, role, user_id))
                .filter(|b| filter.matches(b, now))
                .cloned()
                .collect();
            if filter.ascending() {
                selected.sort_by_key(|b| b.start);
            } else {
                selected.sort_by_key(|b| std::cmp::Reverse(b.start));
            }
            let (page_idx, limit) = page.normalize();
            Ok(selected
                .into_iter()
                .skip((page_idx * limit) as usize)
                .take(limit as usize)
                .collect())
        }

        async fn last_for_item(
            &self,
            item_id: i64,
            now: DateTime<Utc>,
        ) -> Result<Option<Booking>, BookingError> {
            Ok(self
                .bookings
                .lock()
                .unwrap()
                .iter()
                .filter(|b| b.item_id == item_id && b.start <= now)
                .max_by_key(|b| b.start)
                .cloned())
        }

        async fn next_for_item(
            &self,
            item_id: i64,
            now: DateTime<Utc>,
        ) -> Result<Option<Booking>, BookingError> {
            Ok(self
                .bookings
                .lock()
                .unwrap()
                .iter()
                .filter(|b| b.item_id == item_id && b.start > now)
                .min_by_key(|b| b.start)
                .cloned())
        }

        async fn last_completed_by_user(
            &self,
            user_id: i64,
            item_id: i64,
            now: DateTime<Utc>,
        ) -> Result<Option<Booking>, BookingError> {
            Ok(self
                .bookings
                .lock()
                .unwrap()
                .iter()
                .filter(|b| b.booker_id == user_id && b.item_id == item_id && b.end < now)
                .max_by_key(|b| b.end)
                .cloned())
        }
    }
}
