use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::BookingError;

/// Booking lifecycle status, persisted by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BookingStatus {
    Waiting,
    Approved,
    Rejected,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Waiting => "WAITING",
            BookingStatus::Approved => "APPROVED",
            BookingStatus::Rejected => "REJECTED",
        }
    }

    /// Parse the stored column value; anything else means corrupt storage.
    pub fn from_stored(s: &str) -> Result<Self, BookingError> {
        match s {
            "WAITING" => Ok(BookingStatus::Waiting),
            "APPROVED" => Ok(BookingStatus::Approved),
            "REJECTED" => Ok(BookingStatus::Rejected),
            other => Err(BookingError::Repository(format!(
                "unknown booking status in store: {}",
                other
            ))),
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Temporal/status bucket selecting which bookings a listing returns.
///
/// Parsed from the case-sensitive wire strings
/// `ALL/CURRENT/FUTURE/PAST/WAITING/REJECTED`; anything else is
/// [`BookingError::InvalidState`], never a silent empty result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateFilter {
    All,
    Current,
    Future,
    Past,
    Waiting,
    Rejected,
}

impl StateFilter {
    /// Predicate evaluated against `now`; the single dispatch point shared
    /// by the in-memory repository and the tests.
    pub fn matches(&self, booking: &Booking, now: DateTime<Utc>) -> bool {
        match self {
            StateFilter::All => true,
            StateFilter::Current => booking.start <= now && booking.end > now,
            StateFilter::Future => booking.start > now,
            StateFilter::Past => booking.end < now,
            StateFilter::Waiting => booking.status == BookingStatus::Waiting,
            StateFilter::Rejected => booking.status == BookingStatus::Rejected,
        }
    }

    /// The future bucket lists soonest-first; every other bucket lists
    /// most-recent-first.
    pub fn ascending(&self) -> bool {
        matches!(self, StateFilter::Future)
    }
}

impl FromStr for StateFilter {
    type Err = BookingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ALL" => Ok(StateFilter::All),
            "CURRENT" => Ok(StateFilter::Current),
            "FUTURE" => Ok(StateFilter::Future),
            "PAST" => Ok(StateFilter::Past),
            "WAITING" => Ok(StateFilter::Waiting),
            "REJECTED" => Ok(StateFilter::Rejected),
            other => Err(BookingError::InvalidState(other.to_string())),
        }
    }
}

/// Which side of a booking a user is on when listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartyRole {
    /// The user who requested the booking.
    Booker,
    /// The owner of the booked item.
    Owner,
}

/// Read-only user view (business view, independent of the entity layer).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRef {
    pub id: i64,
    pub email: String,
    pub name: String,
}

/// Read-only item view; only the fields the booking core consults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRef {
    pub id: i64,
    pub name: String,
    pub available: bool,
    pub owner_id: i64,
    pub request_id: Option<i64>,
}

/// A persisted booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    pub id: i64,
    pub item_id: i64,
    pub booker_id: i64,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub status: BookingStatus,
}

/// Caller input for a new booking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingRequest {
    pub item_id: i64,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// Repository insert input; the store assigns the id and every booking
/// starts out WAITING.
#[derive(Debug, Clone)]
pub struct NewBooking {
    pub item_id: i64,
    pub booker_id: i64,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}
