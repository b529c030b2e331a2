//! # Web Handlers
//!
//! HTTP request handlers for the reservation platform: availability,
//! booking lifecycle, operator analytics, and in-app notifications.

/// Operator dashboard handlers.
pub mod analytics_handlers;
/// Availability and booking lifecycle handlers.
pub mod booking_handlers;
/// In-app notification handlers.
pub mod notification_handlers;
/// Shared response envelope types.
pub mod types;

pub use analytics_handlers::*;
pub use booking_handlers::*;
pub use notification_handlers::*;
pub use types::ApiResponse;
