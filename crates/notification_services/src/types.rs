use auth_services::Role;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Errors raised by the notification services.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    /// Database errors while writing or reading notification rows.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Simple email service (SES) errors.
    #[error("AWS SES error: {0}")]
    SesError(String),

    /// The notification does not exist or belongs to another user.
    #[error("Notification not found")]
    NotFound,
}

impl actix_web::ResponseError for NotifyError {
    fn error_response(&self) -> actix_web::HttpResponse {
        use actix_web::HttpResponse;

        match self {
            NotifyError::NotFound => HttpResponse::NotFound().json(serde_json::json!({
                "error": "notification_not_found",
                "message": "Notification not found"
            })),
            NotifyError::Database(_) | NotifyError::SesError(_) => {
                HttpResponse::InternalServerError().json(serde_json::json!({
                    "error": "internal_error",
                    "message": "An internal error occurred"
                }))
            }
        }
    }
}

/// A persistent in-app notification.
#[derive(Debug, Clone, Serialize)]
pub struct Notification {
    /// Unique identifier of the notification.
    pub id: Uuid,
    /// The account this notification belongs to.
    pub user_id: Uuid,
    /// Human-readable message text.
    pub message: String,
    /// Frontend route the notification links to.
    pub link: Option<String>,
    /// Whether the user has read the notification.
    pub read: bool,
    /// When the notification was created.
    pub created_at: DateTime<Utc>,
}

/// Who a fan-out should reach: a specific account, whole roles, or both.
#[derive(Debug, Clone, Default)]
pub struct Recipients {
    /// A single account, typically the booking owner.
    pub user: Option<Uuid>,
    /// Every account holding one of these roles.
    pub roles: Vec<Role>,
}

impl Recipients {
    /// Targets one account.
    pub fn user(user_id: Uuid) -> Self {
        Self {
            user: Some(user_id),
            roles: Vec::new(),
        }
    }

    /// Targets every account holding one of the given roles.
    pub fn roles(roles: impl Into<Vec<Role>>) -> Self {
        Self {
            user: None,
            roles: roles.into(),
        }
    }

}

/// An event pushed to connected live sessions.
#[derive(Debug, Clone, Serialize)]
pub struct LiveEvent {
    /// Event name, e.g. `new-booking` or `booking-updated`.
    pub event: String,
    /// JSON payload delivered with the event.
    pub payload: serde_json::Value,
}

impl LiveEvent {
    /// Creates an event with the given name and payload.
    pub fn new(event: impl Into<String>, payload: serde_json::Value) -> Self {
        Self {
            event: event.into(),
            payload,
        }
    }
}
