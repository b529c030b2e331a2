use actix_web::{HttpResponse, web};
use sqlx::PgPool;

use auth_services::middleware::OperatorUser;
use booking_engine::{AnalyticsService, BookingError};

use crate::types::ApiResponse;

/// Returns the operator dashboard: headline figures, the four revenue
/// series, the most-booked items, and the five most recent bookings.
/// Computed fresh on every request.
pub async fn get_dashboard(
    pool: web::Data<PgPool>,
    _operator: OperatorUser,
) -> Result<HttpResponse, BookingError> {
    let service = AnalyticsService::new(pool.get_ref().clone());
    let dashboard = service.dashboard().await?;

    Ok(HttpResponse::Ok().json(ApiResponse::new(dashboard)))
}
