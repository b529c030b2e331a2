//! Concurrency test for booking creation. Requires a running PostgreSQL
//! instance with the migrations applied, so it is ignored by default:
//!
//! ```text
//! DATABASE_URL=postgres://localhost/reservations cargo test -- --ignored
//! ```

use booking_engine::{BookingService, CreateBookingRequest, ItemType};
use chrono::NaiveDate;
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

async fn seed_vehicle(pool: &sqlx::PgPool) -> Uuid {
    let id = Uuid::new_v4();
    sqlx::query(
        "INSERT INTO catalog_items (id, item_type, name, is_available) VALUES ($1, 'vehicle', $2, TRUE)",
    )
    .bind(id)
    .bind(format!("Race Test Vehicle {id}"))
    .execute(pool)
    .await
    .expect("failed to seed catalog item");
    id
}

fn guest_request(item_id: Uuid, start: NaiveDate, end: NaiveDate) -> CreateBookingRequest {
    CreateBookingRequest {
        item_type: ItemType::Vehicle,
        item_id,
        item_name: None,
        first_name: Some("Race".to_string()),
        last_name: Some("Tester".to_string()),
        email: Some("race@example.com".to_string()),
        phone: None,
        start_date: start,
        end_date: Some(end),
        number_of_guests: Some(2),
        special_requests: None,
        delivery_method: None,
        pickup_location: None,
        dropoff_location: None,
        dropoff_coordinates: None,
        total_price: Some(250.0),
        amount_paid: None,
        payment_reference: None,
        payment_proof_url: None,
        agreed_to_terms: true,
    }
}

#[tokio::test]
#[ignore]
async fn concurrent_overlapping_creations_admit_at_most_one() {
    let pool = connect().await;
    let item_id = seed_vehicle(&pool).await;

    let start = NaiveDate::from_ymd_opt(2030, 7, 1).unwrap();
    let end = NaiveDate::from_ymd_opt(2030, 7, 5).unwrap();

    let first = guest_request(item_id, start, end);
    // Partially overlapping window on the same item.
    let second = guest_request(
        item_id,
        NaiveDate::from_ymd_opt(2030, 7, 4).unwrap(),
        NaiveDate::from_ymd_opt(2030, 7, 8).unwrap(),
    );

    let service_a = BookingService::new(pool.clone());
    let service_b = BookingService::new(pool.clone());

    let (left, right) = tokio::join!(
        service_a.create(None, &first),
        service_b.create(None, &second)
    );

    let successes = [&left, &right].iter().filter(|r| r.is_ok()).count();
    assert_eq!(
        successes, 1,
        "exactly one of two overlapping creations must win: {left:?} / {right:?}"
    );
}
