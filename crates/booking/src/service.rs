use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info, instrument};

use crate::domain::{Booking, BookingRequest, BookingStatus, NewBooking, PartyRole, StateFilter};
use crate::errors::BookingError;
use crate::pagination::PageRequest;
use crate::repository::BookingRepository;

/// Booking lifecycle service independent of the transport layer.
///
/// Every mutating operation writes through to the store synchronously and
/// re-reads the row before returning, so callers always see
/// storage-assigned fields. The read-branch-write inside [`decide`] relies
/// on the store's transactional isolation; the service itself holds no
/// shared mutable state.
///
/// [`decide`]: BookingService::decide
pub struct BookingService<R: BookingRepository> {
    repo: Arc<R>,
}

impl<R: BookingRepository> BookingService<R> {
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    /// Create a booking request for an item, in WAITING status.
    ///
    /// # Examples
    /// ```
    /// use booking::domain::{BookingRequest, BookingStatus};
    /// use booking::repository::mock::MockBookingRepository;
    /// use booking::service::BookingService;
    /// use std::sync::Arc;
    /// let repo = Arc::new(MockBookingRepository::default());
    /// let owner = repo.add_user("owner@example.com", "Owner");
    /// let booker = repo.add_user("booker@example.com", "Booker");
    /// let drill = repo.add_item(owner.id, "drill", true);
    /// let svc = BookingService::new(repo);
    /// let request = BookingRequest {
    ///     item_id: drill.id,
    ///     start: chrono::Utc::now() + chrono::Duration::hours(1),
    ///     end: chrono::Utc::now() + chrono::Duration::days(1),
    /// };
    /// let created = tokio_test::block_on(svc.add_booking(booker.id, request)).unwrap();
    /// assert_eq!(created.status, BookingStatus::Waiting);
    /// ```
    #[instrument(skip(self, request), fields(item_id = request.item_id))]
    pub async fn add_booking(
        &self,
        user_id: i64,
        request: BookingRequest,
    ) -> Result<Booking, BookingError> {
        self.repo
            .find_user(user_id)
            .await?
            .ok_or_else(|| BookingError::not_found("user", user_id))?;
        if request.start >= request.end {
            debug!(start = %request.start, end = %request.end, "rejecting degenerate interval");
            return Err(BookingError::InvalidInterval);
        }
        let item = self
            .repo
            .find_item(request.item_id)
            .await?
            .ok_or_else(|| BookingError::not_found("item", request.item_id))?;
        if item.owner_id == user_id {
            debug!("user attempted to book their own item");
            return Err(BookingError::Forbidden("cannot book own item".into()));
        }
        if !item.available {
            return Err(BookingError::ItemUnavailable);
        }
        let created = self
            .repo
            .insert_booking(NewBooking {
                item_id: request.item_id,
                booker_id: user_id,
                start: request.start,
                end: request.end,
            })
            .await?;
        info!(booking_id = created.id, "booking created");
        // re-read to surface storage-assigned fields
        self.repo
            .find_booking(created.id)
            .await?
            .ok_or_else(|| BookingError::not_found("booking", created.id))
    }

    /// Approve or reject a waiting booking. Only the item owner may decide.
    ///
    /// A second approval of an APPROVED booking is an
    /// [`BookingError::InvalidTransition`]; rejection carries no such guard
    /// and overwrites any prior status.
    #[instrument(skip(self))]
    pub async fn decide(
        &self,
        booking_id: i64,
        user_id: i64,
        approve: bool,
    ) -> Result<Booking, BookingError> {
        if !self.repo.user_exists(user_id).await? {
            return Err(BookingError::not_found("user", user_id));
        }
        let booking = self
            .repo
            .find_booking(booking_id)
            .await?
            .ok_or_else(|| BookingError::not_found("booking", booking_id))?;
        let item = self
            .repo
            .find_item(booking.item_id)
            .await?
            .ok_or_else(|| BookingError::not_found("item", booking.item_id))?;
        if item.owner_id != user_id {
            debug!("decision attempted by someone other than the item owner");
            return Err(BookingError::Forbidden(
                "only the item owner may approve or reject a booking".into(),
            ));
        }
        let next = if approve {
            if booking.status == BookingStatus::Approved {
                debug!("booking is already approved");
                return Err(BookingError::InvalidTransition);
            }
            BookingStatus::Approved
        } else {
            BookingStatus::Rejected
        };
        self.repo.update_status(booking_id, next).await?;
        info!(booking_id, status = %next, "booking decided");
        self.repo
            .find_booking(booking_id)
            .await?
            .ok_or_else(|| BookingError::not_found("booking", booking_id))
    }

    /// Fetch one booking; visible to the booker and the item owner only.
    #[instrument(skip(self))]
    pub async fn get_booking(
        &self,
        booking_id: i64,
        user_id: i64,
    ) -> Result<Booking, BookingError> {
        if !self.repo.user_exists(user_id).await? {
            return Err(BookingError::not_found("user", user_id));
        }
        let booking = self
            .repo
            .find_booking(booking_id)
            .await?
            .ok_or_else(|| BookingError::not_found("booking", booking_id))?;
        let item = self
            .repo
            .find_item(booking.item_id)
            .await?
            .ok_or_else(|| BookingError::not_found("item", booking.item_id))?;
        if user_id != booking.booker_id && user_id != item.owner_id {
            return Err(BookingError::Forbidden(
                "only the booker or the item owner may view this booking".into(),
            ));
        }
        Ok(booking)
    }

    /// Bookings requested by the user, bucketed by `state`.
    #[instrument(skip(self))]
    pub async fn list_for_booker(
        &self,
        user_id: i64,
        state: &str,
        from: u32,
        size: u32,
    ) -> Result<Vec<Booking>, BookingError> {
        self.list(PartyRole::Booker, user_id, state, from, size).await
    }

    /// Bookings placed on the user's items, bucketed by `state`.
    #[instrument(skip(self))]
    pub async fn list_for_owner(
        &self,
        user_id: i64,
        state: &str,
        from: u32,
        size: u32,
    ) -> Result<Vec<Booking>, BookingError> {
        self.list(PartyRole::Owner, user_id, state, from, size).await
    }

    async fn list(
        &self,
        role: PartyRole,
        user_id: i64,
        state: &str,
        from: u32,
        size: u32,
    ) -> Result<Vec<Booking>, BookingError> {
        if !self.repo.user_exists(user_id).await? {
            return Err(BookingError::not_found("user", user_id));
        }
        let filter: StateFilter = state.parse()?;
        let page = PageRequest::new(from, size);
        self.repo
            .list_by_role(role, user_id, filter, Utc::now(), page)
            .await
    }

    /// Most recent booking of the item that has already started.
    pub async fn last_booking_for_item(
        &self,
        item_id: i64,
    ) -> Result<Option<Booking>, BookingError> {
        self.repo.last_for_item(item_id, Utc::now()).await
    }

    /// Earliest upcoming booking of the item.
    pub async fn next_booking_for_item(
        &self,
        item_id: i64,
    ) -> Result<Option<Booking>, BookingError> {
        self.repo.next_for_item(item_id, Utc::now()).await
    }

    /// Most recent finished booking by the user for the item; the item
    /// collaborator uses this to decide whether the user may comment.
    pub async fn last_completed_booking(
        &self,
        user_id: i64,
        item_id: i64,
    ) -> Result<Option<Booking>, BookingError> {
        self.repo
            .last_completed_by_user(user_id, item_id, Utc::now())
            .await
    }

    /// Same lookup with an explicit clock, for callers that already hold a
    /// consistent `now` across several queries.
    pub async fn last_completed_booking_at(
        &self,
        user_id: i64,
        item_id: i64,
        now: DateTime<Utc>,
    ) -> Result<Option<Booking>, BookingError> {
        self.repo.last_completed_by_user(user_id, item_id, now).await
    }
}
