//! # Booking Engine
//!
//! This crate owns the booking lifecycle for the reservation platform:
//! availability resolution, booking creation and status transitions,
//! payment-proof attachment, and the revenue rollups behind the operator
//! dashboard.

/// Revenue rollups and dashboard aggregates.
mod analytics;
pub use analytics::*;

/// Blocked-date resolution for a catalog item.
mod availability;
pub use availability::*;

/// Narrow read interface over the catalog collaborator.
mod catalog;
pub use catalog::*;

/// Booking reference generation.
mod reference;
pub use reference::*;

/// Booking database operations and the creation/transition rules.
mod service;
pub use service::*;

/// The booking status state machine.
mod status;
pub use status::*;

/// Booking records, request types, and errors.
mod types;
pub use types::*;
