use auth_services::AuthContext;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::info;
use uuid::Uuid;

use crate::catalog::CatalogGateway;
use crate::reference::generate_reference;
use crate::status::BookingStatus;
use crate::types::*;

/// Service owning booking creation, listing, status transitions, and
/// payment-proof attachment.
pub struct BookingService {
    pool: PgPool,
}

impl BookingService {
    /// Creates a new instance with the provided database connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates a booking in `pending` status.
    ///
    /// The overlap check and the insert run in one transaction holding an
    /// advisory lock on the item, so two concurrent creations for
    /// overlapping dates on the same item cannot both succeed.
    pub async fn create(
        &self,
        requester: Option<&AuthContext>,
        request: &CreateBookingRequest,
    ) -> Result<Booking, BookingError> {
        if !request.agreed_to_terms {
            return Err(BookingError::Validation(
                "You must agree to the terms and conditions".to_string(),
            ));
        }

        let catalog = CatalogGateway::new(self.pool.clone());
        let item = catalog
            .find_item(request.item_type, &request.item_id)
            .await?
            .filter(|item| item.is_available)
            .ok_or(BookingError::ItemUnavailable)?;

        let (first_name, last_name, email) = match requester {
            Some(user) => (
                user.first_name.clone(),
                user.last_name.clone(),
                user.email.clone(),
            ),
            None => (
                require_field(&request.first_name, "First name is required")?,
                require_field(&request.last_name, "Last name is required")?,
                require_field(&request.email, "Email is required")?,
            ),
        };
        let phone = request.phone.clone().unwrap_or_default();

        let (start_date, end_date) = normalize_stay(request.start_date, request.end_date)?;
        let item_name = request.item_name.clone().unwrap_or(item.name);
        let booking_reference = generate_reference(request.item_type);

        let mut tx = self.pool.begin().await?;

        // Serializes creations per item so the overlap check below cannot
        // race a concurrent insert.
        sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1))")
            .bind(request.item_id.to_string())
            .execute(&mut *tx)
            .await?;

        let occupying: Vec<&str> = BookingStatus::OCCUPYING.iter().map(|s| s.as_str()).collect();
        let row = sqlx::query(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM bookings
                WHERE item_id = $1
                  AND status = ANY($2)
                  AND start_date <= $4
                  AND end_date >= $3
            ) AS taken
            "#,
        )
        .bind(request.item_id)
        .bind(&occupying)
        .bind(start_date)
        .bind(end_date)
        .fetch_one(&mut *tx)
        .await?;

        if row.get::<bool, _>("taken") {
            return Err(BookingError::DatesUnavailable);
        }

        let row = sqlx::query(
            r#"
            INSERT INTO bookings (
                booking_reference, user_id, item_type, item_id, item_name,
                first_name, last_name, email, phone,
                start_date, end_date, number_of_guests, special_requests,
                delivery_method, pickup_location, dropoff_location,
                dropoff_lat, dropoff_lng,
                total_price, amount_paid, payment_reference, payment_proof_url,
                agreed_to_terms
            ) VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13,
                $14, $15, $16, $17, $18, $19, $20, $21, $22, $23
            )
            RETURNING *
            "#,
        )
        .bind(&booking_reference)
        .bind(requester.map(|user| user.user_id))
        .bind(request.item_type.as_str())
        .bind(request.item_id)
        .bind(&item_name)
        .bind(&first_name)
        .bind(&last_name)
        .bind(&email)
        .bind(&phone)
        .bind(start_date)
        .bind(end_date)
        .bind(request.number_of_guests.unwrap_or(1))
        .bind(&request.special_requests)
        .bind(request.delivery_method.map(|m| m.as_str()))
        .bind(&request.pickup_location)
        .bind(&request.dropoff_location)
        .bind(request.dropoff_coordinates.map(|c| c.lat))
        .bind(request.dropoff_coordinates.map(|c| c.lng))
        .bind(request.total_price.unwrap_or(0.0))
        .bind(request.amount_paid.unwrap_or(0.0))
        .bind(&request.payment_reference)
        .bind(&request.payment_proof_url)
        .bind(request.agreed_to_terms)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        let booking = map_booking(&row)?;
        info!(
            "Created booking {} for item {}",
            booking.booking_reference, booking.item_id
        );
        Ok(booking)
    }

    /// Gets every booking, newest first. Operator-facing.
    pub async fn find_all(&self) -> Result<Vec<Booking>, BookingError> {
        let rows = sqlx::query("SELECT * FROM bookings ORDER BY created_at DESC")
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(map_booking).collect()
    }

    /// Gets the bookings owned by an account, newest first.
    pub async fn find_for_user(&self, user_id: &Uuid) -> Result<Vec<Booking>, BookingError> {
        let rows = sqlx::query("SELECT * FROM bookings WHERE user_id = $1 ORDER BY created_at DESC")
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(map_booking).collect()
    }

    /// Gets a single booking by id.
    pub async fn find_by_id(&self, booking_id: &Uuid) -> Result<Booking, BookingError> {
        let row = sqlx::query("SELECT * FROM bookings WHERE id = $1")
            .bind(booking_id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => map_booking(&row),
            None => Err(BookingError::NotFound),
        }
    }

    /// Applies an operator status transition, recording notes and the
    /// acting operator. Illegal transitions are rejected, never coerced.
    pub async fn transition(
        &self,
        booking_id: &Uuid,
        target: BookingStatus,
        admin_notes: Option<&str>,
        operator: &Uuid,
    ) -> Result<Booking, BookingError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query("SELECT status FROM bookings WHERE id = $1 FOR UPDATE")
            .bind(booking_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(BookingError::NotFound)?;

        let current = parse_status(&row.get::<String, _>("status"))?;
        if !current.can_transition_to(target) {
            return Err(BookingError::IllegalTransition {
                from: current,
                to: target,
            });
        }

        // A transition without notes keeps notes from an earlier transition.
        let row = sqlx::query(
            r#"
            UPDATE bookings
            SET status = $2, admin_notes = COALESCE($3, admin_notes),
                processed_by = $4, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(booking_id)
        .bind(target.as_str())
        .bind(admin_notes)
        .bind(operator)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        let booking = map_booking(&row)?;
        info!(
            "Booking {} moved {} -> {}",
            booking.booking_reference, current, target
        );
        Ok(booking)
    }

    /// Attaches a payment proof image. Leaves the status untouched.
    pub async fn set_payment_proof(
        &self,
        booking_id: &Uuid,
        payment_proof_url: &str,
    ) -> Result<Booking, BookingError> {
        if payment_proof_url.is_empty() {
            return Err(BookingError::Validation("No file uploaded".to_string()));
        }

        let row = sqlx::query(
            r#"
            UPDATE bookings
            SET payment_proof_url = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(booking_id)
        .bind(payment_proof_url)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => map_booking(&row),
            None => Err(BookingError::NotFound),
        }
    }
}

fn require_field(value: &Option<String>, message: &str) -> Result<String, BookingError> {
    value
        .as_ref()
        .filter(|v| !v.trim().is_empty())
        .cloned()
        .ok_or_else(|| BookingError::Validation(message.to_string()))
}

fn parse_status(raw: &str) -> Result<BookingStatus, BookingError> {
    BookingStatus::parse(raw).ok_or_else(|| {
        BookingError::Database(sqlx::Error::Protocol(format!(
            "unknown booking status: {raw}"
        )))
    })
}

/// Maps a `bookings` row into a [`Booking`].
pub(crate) fn map_booking(row: &PgRow) -> Result<Booking, BookingError> {
    let item_type_raw: String = row.get("item_type");
    let item_type = ItemType::parse(&item_type_raw).ok_or_else(|| {
        BookingError::Database(sqlx::Error::Protocol(format!(
            "unknown item type: {item_type_raw}"
        )))
    })?;

    let status = parse_status(&row.get::<String, _>("status"))?;

    let delivery_method = row
        .get::<Option<String>, _>("delivery_method")
        .as_deref()
        .and_then(DeliveryMethod::parse);

    let dropoff_coordinates = match (
        row.get::<Option<f64>, _>("dropoff_lat"),
        row.get::<Option<f64>, _>("dropoff_lng"),
    ) {
        (Some(lat), Some(lng)) => Some(Coordinates { lat, lng }),
        _ => None,
    };

    Ok(Booking {
        id: row.get("id"),
        booking_reference: row.get("booking_reference"),
        user_id: row.get("user_id"),
        item_type,
        item_id: row.get("item_id"),
        item_name: row.get("item_name"),
        first_name: row.get("first_name"),
        last_name: row.get("last_name"),
        email: row.get("email"),
        phone: row.get("phone"),
        start_date: row.get("start_date"),
        end_date: row.get("end_date"),
        number_of_guests: row.get("number_of_guests"),
        special_requests: row.get("special_requests"),
        delivery_method,
        pickup_location: row.get("pickup_location"),
        dropoff_location: row.get("dropoff_location"),
        dropoff_coordinates,
        total_price: row.get("total_price"),
        amount_paid: row.get("amount_paid"),
        payment_reference: row.get("payment_reference"),
        payment_proof_url: row.get("payment_proof_url"),
        status,
        agreed_to_terms: row.get("agreed_to_terms"),
        admin_notes: row.get("admin_notes"),
        processed_by: row.get("processed_by"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}
