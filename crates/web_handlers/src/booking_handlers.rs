use actix_web::{HttpResponse, web};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use auth_services::middleware::{AuthenticatedUser, MaybeUser, OperatorUser};
use booking_engine::{
    AvailabilityService, BookingError, BookingService, CreateBookingRequest, PaymentProofRequest,
    UpdateStatusRequest,
};
use notification_services::{EmailNotifier, NotificationFanout};

use crate::types::ApiResponse;

/// Returns the calendar dates already claimed for a catalog item, as a
/// sorted array of ISO dates. Public: no authentication required.
pub async fn get_availability(
    pool: web::Data<PgPool>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, BookingError> {
    let service = AvailabilityService::new(pool.get_ref().clone());
    let blocked = service.blocked_dates(&path).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::new(blocked)))
}

/// Creates a booking. Guests supply contact fields in the body;
/// signed-in requesters have them taken from their account. Fan-out and
/// the confirmation email run after the response is committed.
pub async fn create_booking(
    pool: web::Data<PgPool>,
    fanout: web::Data<NotificationFanout>,
    emails: web::Data<EmailNotifier>,
    requester: MaybeUser,
    request: web::Json<CreateBookingRequest>,
) -> Result<HttpResponse, BookingError> {
    request
        .validate()
        .map_err(|e| BookingError::Validation(format!("Validation error: {}", e)))?;

    let service = BookingService::new(pool.get_ref().clone());
    let booking = service.create(requester.0.as_ref(), &request).await?;

    let fanout = fanout.clone();
    let emails = emails.clone();
    let created = booking.clone();
    tokio::spawn(async move {
        fanout.booking_created(&created).await;
        if let Err(err) = emails.send_booking_confirmation(&created).await {
            log::error!(
                "Failed to send confirmation email for {}: {}",
                created.booking_reference,
                err
            );
        }
    });

    Ok(HttpResponse::Created().json(ApiResponse::new(booking)))
}

/// Lists every booking, newest first. Operator only.
pub async fn get_all_bookings(
    pool: web::Data<PgPool>,
    _operator: OperatorUser,
) -> Result<HttpResponse, BookingError> {
    let service = BookingService::new(pool.get_ref().clone());
    let bookings = service.find_all().await?;

    Ok(HttpResponse::Ok().json(ApiResponse::new(bookings)))
}

/// Lists the bookings owned by the signed-in account, newest first.
pub async fn get_my_bookings(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, BookingError> {
    let service = BookingService::new(pool.get_ref().clone());
    let bookings = service.find_for_user(&user.0.user_id).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::new(bookings)))
}

/// Applies an operator status transition and fans the change out to the
/// booking owner and operator dashboards.
pub async fn update_booking_status(
    pool: web::Data<PgPool>,
    fanout: web::Data<NotificationFanout>,
    emails: web::Data<EmailNotifier>,
    operator: OperatorUser,
    path: web::Path<Uuid>,
    request: web::Json<UpdateStatusRequest>,
) -> Result<HttpResponse, BookingError> {
    request
        .validate()
        .map_err(|e| BookingError::Validation(format!("Validation error: {}", e)))?;

    let service = BookingService::new(pool.get_ref().clone());
    let booking = service
        .transition(
            &path,
            request.status,
            request.admin_notes.as_deref(),
            &operator.0.user_id,
        )
        .await?;

    let fanout = fanout.clone();
    let emails = emails.clone();
    let updated = booking.clone();
    tokio::spawn(async move {
        fanout.booking_status_changed(&updated).await;
        if let Err(err) = emails.send_status_update(&updated).await {
            log::error!(
                "Failed to send status email for {}: {}",
                updated.booking_reference,
                err
            );
        }
    });

    Ok(HttpResponse::Ok().json(ApiResponse::new(booking)))
}

/// Attaches a payment proof image to a booking and alerts operators.
/// Works for guests too, so no authentication is enforced.
pub async fn upload_payment_proof(
    pool: web::Data<PgPool>,
    fanout: web::Data<NotificationFanout>,
    _requester: MaybeUser,
    path: web::Path<Uuid>,
    request: web::Json<PaymentProofRequest>,
) -> Result<HttpResponse, BookingError> {
    request
        .validate()
        .map_err(|e| BookingError::Validation(format!("Validation error: {}", e)))?;

    let service = BookingService::new(pool.get_ref().clone());
    let booking = service
        .set_payment_proof(&path, &request.payment_proof_url)
        .await?;

    let fanout = fanout.clone();
    let updated = booking.clone();
    tokio::spawn(async move {
        fanout.payment_proof_uploaded(&updated).await;
    });

    Ok(HttpResponse::Ok().json(ApiResponse::new(booking)))
}
