use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::status::BookingStatus;

/// The two rentable resource types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemType {
    /// A rentable vehicle.
    Vehicle,
    /// A multi-day tour.
    Tour,
}

impl ItemType {
    /// Storage representation of the item type.
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemType::Vehicle => "vehicle",
            ItemType::Tour => "tour",
        }
    }

    /// Parses a stored item type string.
    pub fn parse(s: &str) -> Option<ItemType> {
        match s {
            "vehicle" => Some(ItemType::Vehicle),
            "tour" => Some(ItemType::Tour),
            _ => None,
        }
    }

    /// Prefix used in booking references quoted back to customers.
    pub fn reference_prefix(&self) -> &'static str {
        match self {
            ItemType::Vehicle => "VEH",
            ItemType::Tour => "TOUR",
        }
    }
}

/// How the customer takes possession of a vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryMethod {
    /// Customer picks the vehicle up.
    Pickup,
    /// Vehicle is dropped off at a customer-chosen location.
    Dropoff,
}

impl DeliveryMethod {
    /// Storage representation of the delivery method.
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryMethod::Pickup => "pickup",
            DeliveryMethod::Dropoff => "dropoff",
        }
    }

    /// Parses a stored delivery method string.
    pub fn parse(s: &str) -> Option<DeliveryMethod> {
        match s {
            "pickup" => Some(DeliveryMethod::Pickup),
            "dropoff" => Some(DeliveryMethod::Dropoff),
            _ => None,
        }
    }
}

/// Geocoordinates for a drop-off location.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Coordinates {
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lng: f64,
}

/// A booking record as stored in the database.
#[derive(Debug, Clone, Serialize)]
pub struct Booking {
    /// Unique identifier for the booking.
    pub id: Uuid,
    /// Human-readable reference quoted back to the customer. Unique and
    /// immutable once set.
    pub booking_reference: String,
    /// Owning account, when the booking was made while signed in.
    pub user_id: Option<Uuid>,
    /// Which resource type the booking is for.
    pub item_type: ItemType,
    /// The booked catalog item.
    pub item_id: Uuid,
    /// Denormalized display name of the item at booking time.
    pub item_name: String,
    /// Contact first name (guest-supplied or from the account).
    pub first_name: String,
    /// Contact last name.
    pub last_name: String,
    /// Contact email address.
    pub email: String,
    /// Contact phone number (may be empty).
    pub phone: String,
    /// First day of the stay.
    pub start_date: NaiveDate,
    /// Last day of the stay, inclusive. Never before `start_date`.
    pub end_date: NaiveDate,
    /// Number of guests, at least one.
    pub number_of_guests: i32,
    /// Free-text requests from the customer.
    pub special_requests: Option<String>,
    /// Pickup or drop-off.
    pub delivery_method: Option<DeliveryMethod>,
    /// Pickup location, when the delivery method is pickup.
    pub pickup_location: Option<String>,
    /// Drop-off location, when the delivery method is drop-off.
    pub dropoff_location: Option<String>,
    /// Geocoordinates of the drop-off location.
    pub dropoff_coordinates: Option<Coordinates>,
    /// Stored total for the stay. Pricing computation is external.
    pub total_price: f64,
    /// Amount the customer claims to have paid.
    pub amount_paid: f64,
    /// Claimed payment reference. Never validated by this service.
    pub payment_reference: Option<String>,
    /// Path to the uploaded payment proof image.
    pub payment_proof_url: Option<String>,
    /// Lifecycle status.
    pub status: BookingStatus,
    /// Whether the customer agreed to the terms. Required at creation.
    pub agreed_to_terms: bool,
    /// Operator notes attached on status changes.
    pub admin_notes: Option<String>,
    /// Operator who last changed the status.
    pub processed_by: Option<Uuid>,
    /// When the booking was created.
    pub created_at: DateTime<Utc>,
    /// When the booking was last updated.
    pub updated_at: DateTime<Utc>,
}

/// Request structure for creating a booking. Contact fields are required
/// for guests and derived from the account for signed-in requesters.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateBookingRequest {
    /// Which resource type is being booked.
    pub item_type: ItemType,

    /// The catalog item to book.
    pub item_id: Uuid,

    /// Display name of the item; resolved from the catalog when absent.
    #[serde(default)]
    pub item_name: Option<String>,

    /// First day of the stay.
    pub start_date: NaiveDate,

    /// Last day of the stay; defaults to `start_date`.
    #[serde(default)]
    pub end_date: Option<NaiveDate>,

    /// Number of guests; defaults to 1.
    #[serde(default)]
    #[validate(range(min = 1, message = "At least one guest is required"))]
    pub number_of_guests: Option<i32>,

    /// Guest contact first name.
    #[serde(default)]
    pub first_name: Option<String>,

    /// Guest contact last name.
    #[serde(default)]
    pub last_name: Option<String>,

    /// Guest contact email.
    #[serde(default)]
    #[validate(email(message = "Please enter a valid email"))]
    pub email: Option<String>,

    /// Contact phone number.
    #[serde(default)]
    pub phone: Option<String>,

    /// Free-text requests from the customer.
    #[serde(default)]
    #[validate(length(max = 500, message = "Special requests are limited to 500 characters"))]
    pub special_requests: Option<String>,

    /// Pickup or drop-off.
    #[serde(default)]
    pub delivery_method: Option<DeliveryMethod>,

    /// Pickup location string.
    #[serde(default)]
    pub pickup_location: Option<String>,

    /// Drop-off location string.
    #[serde(default)]
    pub dropoff_location: Option<String>,

    /// Geocoordinates of the drop-off location.
    #[serde(default)]
    pub dropoff_coordinates: Option<Coordinates>,

    /// Stored total for the stay.
    #[serde(default)]
    #[validate(range(min = 0.0, message = "Total price cannot be negative"))]
    pub total_price: Option<f64>,

    /// Amount the customer claims to have paid.
    #[serde(default)]
    #[validate(range(min = 0.0, message = "Amount paid cannot be negative"))]
    pub amount_paid: Option<f64>,

    /// Claimed payment reference.
    #[serde(default)]
    pub payment_reference: Option<String>,

    /// Path to an already-uploaded proof image.
    #[serde(default)]
    pub payment_proof_url: Option<String>,

    /// Consent flag; must be true.
    #[serde(default)]
    pub agreed_to_terms: bool,
}

/// Request structure for an operator status transition.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateStatusRequest {
    /// Target status for the booking.
    pub status: BookingStatus,

    /// Notes shown to the customer in status emails.
    #[serde(default)]
    #[validate(length(max = 1000, message = "Admin notes are limited to 1000 characters"))]
    pub admin_notes: Option<String>,
}

/// Request structure for attaching a payment proof image.
#[derive(Debug, Deserialize, Validate)]
pub struct PaymentProofRequest {
    /// Stored path of the uploaded image.
    #[validate(length(min = 1, message = "No file uploaded"))]
    pub payment_proof_url: String,
}

/// Normalizes the stay dates: a missing end date collapses to the start
/// date, and an end date before the start date is rejected.
pub fn normalize_stay(
    start_date: NaiveDate,
    end_date: Option<NaiveDate>,
) -> Result<(NaiveDate, NaiveDate), BookingError> {
    let end_date = end_date.unwrap_or(start_date);
    if end_date < start_date {
        return Err(BookingError::Validation(
            "End date cannot be before start date".to_string(),
        ));
    }
    Ok((start_date, end_date))
}

/// Custom error type for booking operations.
#[derive(Debug, thiserror::Error)]
pub enum BookingError {
    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Missing or malformed required field.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Booking not found.
    #[error("Booking not found")]
    NotFound,

    /// The catalog item does not exist or is not marked available.
    #[error("Selected item is not available")]
    ItemUnavailable,

    /// Another non-terminal booking already occupies the requested dates.
    #[error("The selected dates are no longer available")]
    DatesUnavailable,

    /// The requested status change is not a legal transition.
    #[error("Cannot change booking status from {from} to {to}")]
    IllegalTransition {
        /// Current status of the booking.
        from: BookingStatus,
        /// Requested target status.
        to: BookingStatus,
    },
}

impl actix_web::ResponseError for BookingError {
    fn error_response(&self) -> actix_web::HttpResponse {
        use actix_web::HttpResponse;

        match self {
            BookingError::Validation(msg) => HttpResponse::BadRequest().json(serde_json::json!({
                "error": "validation_error",
                "message": msg
            })),
            BookingError::NotFound => HttpResponse::NotFound().json(serde_json::json!({
                "error": "booking_not_found",
                "message": "Booking not found"
            })),
            BookingError::ItemUnavailable => HttpResponse::BadRequest().json(serde_json::json!({
                "error": "item_unavailable",
                "message": "Selected item is not available"
            })),
            BookingError::DatesUnavailable => HttpResponse::Conflict().json(serde_json::json!({
                "error": "dates_unavailable",
                "message": "The selected dates are no longer available"
            })),
            BookingError::IllegalTransition { from, to } => {
                HttpResponse::Conflict().json(serde_json::json!({
                    "error": "illegal_transition",
                    "message": format!("Cannot change booking status from {} to {}", from, to)
                }))
            }
            BookingError::Database(_) => {
                HttpResponse::InternalServerError().json(serde_json::json!({
                    "error": "internal_error",
                    "message": "An internal error occurred"
                }))
            }
        }
    }
}
