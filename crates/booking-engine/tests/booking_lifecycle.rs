//! End-to-end lifecycle test: create, confirm, check availability,
//! complete, and verify the revenue rollup. Requires a running PostgreSQL
//! instance with the migrations applied, so it is ignored by default:
//!
//! ```text
//! DATABASE_URL=postgres://localhost/reservations cargo test -- --ignored
//! ```

use booking_engine::{
    AnalyticsService, AvailabilityService, BookingService, BookingStatus, CreateBookingRequest,
    ItemType,
};
use chrono::{NaiveDate, Utc};
use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

async fn connect() -> sqlx::PgPool {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for ignored tests");
    PgPoolOptions::new()
        .max_connections(4)
        .connect(&url)
        .await
        .expect("failed to connect to test database")
}

async fn seed_tour(pool: &sqlx::PgPool) -> Uuid {
    let id = Uuid::new_v4();
    sqlx::query(
        "INSERT INTO catalog_items (id, item_type, name, is_available) VALUES ($1, 'tour', $2, TRUE)",
    )
    .bind(id)
    .bind(format!("Lifecycle Test Tour {id}"))
    .execute(pool)
    .await
    .expect("failed to seed catalog item");
    id
}

async fn seed_operator(pool: &sqlx::PgPool) -> Uuid {
    let id = Uuid::new_v4();
    sqlx::query(
        "INSERT INTO users (id, first_name, last_name, email, role) VALUES ($1, 'Olive', 'Operator', $2, 'admin')",
    )
    .bind(id)
    .bind(format!("operator-{id}@example.com"))
    .execute(pool)
    .await
    .expect("failed to seed operator");
    id
}

#[tokio::test]
#[ignore]
async fn a_booking_flows_from_creation_to_completed_revenue() {
    let pool = connect().await;
    let item_id = seed_tour(&pool).await;
    let operator = seed_operator(&pool).await;

    let start = NaiveDate::from_ymd_opt(2031, 3, 10).unwrap();
    let end = NaiveDate::from_ymd_opt(2031, 3, 12).unwrap();

    let request = CreateBookingRequest {
        item_type: ItemType::Tour,
        item_id,
        item_name: None,
        first_name: Some("Lena".to_string()),
        last_name: Some("Cruz".to_string()),
        email: Some("lena@example.com".to_string()),
        phone: None,
        start_date: start,
        end_date: Some(end),
        number_of_guests: Some(3),
        special_requests: None,
        delivery_method: None,
        pickup_location: None,
        dropoff_location: None,
        dropoff_coordinates: None,
        total_price: Some(475.0),
        amount_paid: None,
        payment_reference: None,
        payment_proof_url: None,
        agreed_to_terms: true,
    };

    let bookings = BookingService::new(pool.clone());
    let booking = bookings.create(None, &request).await.unwrap();
    assert_eq!(booking.status, BookingStatus::Pending);

    // The pending booking already blocks its three stay dates.
    let availability = AvailabilityService::new(pool.clone());
    let blocked = availability.blocked_dates(&item_id).await.unwrap();
    for day in [start, NaiveDate::from_ymd_opt(2031, 3, 11).unwrap(), end] {
        assert!(blocked.contains(&day), "{day} should be blocked");
    }

    let confirmed = bookings
        .transition(
            &booking.id,
            BookingStatus::Confirmed,
            Some("Deposit verified"),
            &operator,
        )
        .await
        .unwrap();
    assert_eq!(confirmed.status, BookingStatus::Confirmed);

    // Completing without notes keeps the notes from the confirmation.
    let completed = bookings
        .transition(&booking.id, BookingStatus::Completed, None, &operator)
        .await
        .unwrap();
    assert_eq!(completed.status, BookingStatus::Completed);
    assert_eq!(completed.admin_notes.as_deref(), Some("Deposit verified"));

    // The completed booking is attributed to today's revenue bucket.
    let analytics = AnalyticsService::new(pool.clone());
    let dashboard = analytics.dashboard().await.unwrap();

    let today = Utc::now().date_naive().format("%Y-%m-%d").to_string();
    let bucket = dashboard
        .revenue_trend
        .daily
        .iter()
        .find(|point| point.label == today)
        .expect("today's bucket should exist");
    assert!(
        bucket.revenue >= 475.0,
        "today's bucket should include the booking's total: {}",
        bucket.revenue
    );
    assert!(dashboard.summary.total_revenue >= 475.0);
}
