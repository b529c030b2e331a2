use std::sync::Arc;

use auth_services::Role;
use booking_engine::Booking;
use sqlx::PgPool;
use tracing::error;

use crate::broadcaster::LiveBroadcaster;
use crate::directory::RecipientDirectory;
use crate::store::NotificationStore;
use crate::types::{LiveEvent, NotifyError, Recipients};

const OPERATOR_BOOKINGS_LINK: &str = "/owner/manage-bookings";
const MY_BOOKINGS_LINK: &str = "/my-bookings";

fn created_message(booking: &Booking) -> String {
    format!(
        "New booking {} for {}",
        booking.booking_reference, booking.item_name
    )
}

fn status_message(booking: &Booking) -> String {
    format!(
        "Your booking {} has been {}",
        booking.booking_reference, booking.status
    )
}

fn payment_proof_message(booking: &Booking) -> String {
    format!(
        "Payment proof uploaded for booking {}",
        booking.booking_reference
    )
}

/// Fans a booking event out to its three surfaces: persistent rows,
/// connected live sessions, and (elsewhere) email.
///
/// Every public method is best-effort. Fan-out runs after the booking
/// write has committed, so a failure here is logged and swallowed rather
/// than surfaced to the request that triggered it.
pub struct NotificationFanout {
    store: NotificationStore,
    directory: Arc<dyn RecipientDirectory>,
    broadcaster: Arc<LiveBroadcaster>,
}

impl NotificationFanout {
    /// Creates a fan-out over the given store, directory, and broadcaster.
    pub fn new(
        pool: PgPool,
        directory: Arc<dyn RecipientDirectory>,
        broadcaster: Arc<LiveBroadcaster>,
    ) -> Self {
        Self {
            store: NotificationStore::new(pool),
            directory,
            broadcaster,
        }
    }

    /// Notifies operators that a booking was created.
    pub async fn booking_created(&self, booking: &Booking) {
        let event = LiveEvent::new("new-booking", to_payload(booking));
        let channels = operator_channels();

        self.best_effort(
            "booking_created",
            &Recipients::roles([Role::Admin, Role::Employee]),
            &created_message(booking),
            Some(OPERATOR_BOOKINGS_LINK),
            &channels,
            &event,
        )
        .await;
    }

    /// Notifies the booking owner of a status change and refreshes
    /// operator dashboards. Guest bookings have no account to store a
    /// notification for; those only produce the live event.
    pub async fn booking_status_changed(&self, booking: &Booking) {
        let event = LiveEvent::new("booking-updated", to_payload(booking));

        let mut channels = operator_channels();
        let recipients = match booking.user_id {
            Some(owner) => {
                channels.push(owner.to_string());
                Recipients::user(owner)
            }
            None => Recipients::default(),
        };

        self.best_effort(
            "booking_status_changed",
            &recipients,
            &status_message(booking),
            Some(MY_BOOKINGS_LINK),
            &channels,
            &event,
        )
        .await;
    }

    /// Notifies operators that a payment proof was attached.
    pub async fn payment_proof_uploaded(&self, booking: &Booking) {
        let event = LiveEvent::new("payment-proof-uploaded", to_payload(booking));
        let channels = operator_channels();

        self.best_effort(
            "payment_proof_uploaded",
            &Recipients::roles([Role::Admin, Role::Employee]),
            &payment_proof_message(booking),
            Some(OPERATOR_BOOKINGS_LINK),
            &channels,
            &event,
        )
        .await;
    }

    async fn best_effort(
        &self,
        what: &str,
        recipients: &Recipients,
        message: &str,
        link: Option<&str>,
        channels: &[String],
        event: &LiveEvent,
    ) {
        if let Err(err) = self
            .notify(recipients, message, link, channels, event)
            .await
        {
            error!("Fan-out {} failed: {}", what, err);
        }
    }

    /// Generic dispatch: resolves the recipients, stores one notification
    /// row per account, and pushes the live event to the given channels.
    ///
    /// The booking wrappers above use this; collaborator events (messages,
    /// reviews, account and catalog activity) go through the same path.
    pub async fn notify(
        &self,
        recipients: &Recipients,
        message: &str,
        link: Option<&str>,
        channels: &[String],
        event: &LiveEvent,
    ) -> Result<(), NotifyError> {
        let users = self.directory.resolve(recipients).await?;
        self.store.insert_for_users(&users, message, link).await?;

        for channel in channels {
            self.broadcaster.publish(channel, event);
        }

        Ok(())
    }
}

fn operator_channels() -> Vec<String> {
    vec![
        Role::Admin.channel().to_string(),
        Role::Employee.channel().to_string(),
    ]
}

fn to_payload(booking: &Booking) -> serde_json::Value {
    serde_json::to_value(booking).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use booking_engine::{BookingStatus, DeliveryMethod, ItemType};
    use chrono::{NaiveDate, Utc};
    use uuid::Uuid;

    fn booking() -> Booking {
        Booking {
            id: Uuid::new_v4(),
            booking_reference: "VEH-000123-ABCD".to_string(),
            user_id: None,
            item_type: ItemType::Vehicle,
            item_id: Uuid::new_v4(),
            item_name: "Blue Hiace".to_string(),
            first_name: "Ana".to_string(),
            last_name: "Reyes".to_string(),
            email: "ana@example.com".to_string(),
            phone: String::new(),
            start_date: NaiveDate::from_ymd_opt(2025, 7, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2025, 7, 3).unwrap(),
            number_of_guests: 2,
            special_requests: None,
            delivery_method: Some(DeliveryMethod::Pickup),
            pickup_location: None,
            dropoff_location: None,
            dropoff_coordinates: None,
            total_price: 300.0,
            amount_paid: 0.0,
            payment_reference: None,
            payment_proof_url: None,
            status: BookingStatus::Confirmed,
            agreed_to_terms: true,
            admin_notes: None,
            processed_by: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn messages_carry_the_reference_and_item() {
        let booking = booking();
        assert_eq!(
            created_message(&booking),
            "New booking VEH-000123-ABCD for Blue Hiace"
        );
        assert_eq!(
            status_message(&booking),
            "Your booking VEH-000123-ABCD has been confirmed"
        );
        assert_eq!(
            payment_proof_message(&booking),
            "Payment proof uploaded for booking VEH-000123-ABCD"
        );
    }

    #[test]
    fn operator_channels_cover_both_operator_roles() {
        assert_eq!(operator_channels(), vec!["admin", "employee"]);
    }

    struct EmptyDirectory;

    #[async_trait::async_trait]
    impl crate::directory::RecipientDirectory for EmptyDirectory {
        async fn resolve(&self, _: &Recipients) -> Result<Vec<Uuid>, crate::types::NotifyError> {
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn notify_pushes_a_custom_event_to_its_channels() {
        // A lazy pool never connects; nothing below touches the database.
        let pool = sqlx::postgres::PgPoolOptions::new()
            .connect_lazy("postgres://localhost/unused")
            .unwrap();
        let broadcaster = Arc::new(LiveBroadcaster::new());
        let fanout = NotificationFanout::new(pool, Arc::new(EmptyDirectory), broadcaster.clone());

        let session_id = Uuid::new_v4();
        let mut rx = broadcaster.connect(session_id);
        broadcaster.subscribe(&session_id, "admin");

        fanout
            .notify(
                &Recipients::default(),
                "A new review was posted",
                Some("/owner/manage-reviews"),
                &[Role::Admin.channel().to_string()],
                &LiveEvent::new("new-review", serde_json::json!({"rating": 5})),
            )
            .await
            .unwrap();

        let received = rx.try_recv().unwrap();
        assert_eq!(received.event, "new-review");
        assert_eq!(received.payload["rating"], 5);
    }
}
