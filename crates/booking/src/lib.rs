//! Booking lifecycle core for the item-sharing service.
//! - State machine and authorization for approving/rejecting bookings.
//! - Temporal bucket queries (ALL/CURRENT/FUTURE/PAST/WAITING/REJECTED).
//! - Repository abstraction with an in-memory mock and a sea-orm backend.

pub mod domain;
pub mod errors;
pub mod pagination;
pub mod repo;
pub mod repository;
pub mod service;

pub use errors::BookingError;
pub use service::BookingService;
