use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_ses::Client as SesClient;
use booking_engine::{Booking, BookingStatus};

use crate::types::NotifyError;

/// Sends one email. A trait so handlers and the fan-out can be tested
/// without AWS credentials.
#[async_trait]
pub trait EmailService: Send + Sync {
    /// Sends an email with both HTML and plain-text bodies.
    async fn send(
        &self,
        to: &str,
        subject: &str,
        html_body: &str,
        text_body: &str,
    ) -> Result<(), NotifyError>;
}

/// Email delivery over AWS SES.
#[derive(Debug, Clone)]
pub struct SesEmailService {
    client: SesClient,
    from_email: String,
}

impl SesEmailService {
    /// Creates a new instance with the AWS client initialized from the
    /// ambient credentials and the `FROM_EMAIL` environment variable.
    pub async fn new() -> Result<Self, NotifyError> {
        let config = aws_config::defaults(BehaviorVersion::latest()).load().await;
        let client = SesClient::new(&config);

        let from_email = std::env::var("FROM_EMAIL")
            .unwrap_or_else(|_| "noreply@dorayd-travel.example.com".to_string());

        Ok(Self { client, from_email })
    }
}

#[async_trait]
impl EmailService for SesEmailService {
    async fn send(
        &self,
        to: &str,
        subject: &str,
        html_body: &str,
        text_body: &str,
    ) -> Result<(), NotifyError> {
        let subject_content = aws_sdk_ses::types::Content::builder()
            .data(subject)
            .build()
            .map_err(|e| {
                log::error!("❌ Failed to build subject content: {}", e);
                NotifyError::SesError(format!("Failed to build subject: {}", e))
            })?;

        let html_content = aws_sdk_ses::types::Content::builder()
            .data(html_body)
            .build()
            .map_err(|e| {
                log::error!("❌ Failed to build HTML content: {}", e);
                NotifyError::SesError(format!("Failed to build HTML body: {}", e))
            })?;

        let text_content = aws_sdk_ses::types::Content::builder()
            .data(text_body)
            .build()
            .map_err(|e| {
                log::error!("❌ Failed to build text content: {}", e);
                NotifyError::SesError(format!("Failed to build text body: {}", e))
            })?;

        let body = aws_sdk_ses::types::Body::builder()
            .html(html_content)
            .text(text_content)
            .build();

        let message = aws_sdk_ses::types::Message::builder()
            .subject(subject_content)
            .body(body)
            .build();

        let destination = aws_sdk_ses::types::Destination::builder()
            .to_addresses(to)
            .build();

        let result = self
            .client
            .send_email()
            .source(&self.from_email)
            .destination(destination)
            .message(message)
            .send()
            .await;

        match result {
            Ok(output) => {
                log::info!("✅ Email sent to {}: {}", to, output.message_id());
                Ok(())
            }
            Err(e) => {
                log::error!("❌ AWS SES error: {:#?}", e);
                let error_msg = if let Some(service_error) = e.as_service_error() {
                    format!("AWS SES service error: {:?}", service_error)
                } else {
                    format!("AWS SES error: {}", e)
                };
                Err(NotifyError::SesError(error_msg))
            }
        }
    }
}

/// Email service that records sent messages instead of delivering them.
#[derive(Debug, Default)]
pub struct MockEmailService {
    /// Messages captured as `(to, subject)` pairs.
    pub sent: std::sync::Mutex<Vec<(String, String)>>,
}

#[async_trait]
impl EmailService for MockEmailService {
    async fn send(
        &self,
        to: &str,
        subject: &str,
        _html_body: &str,
        _text_body: &str,
    ) -> Result<(), NotifyError> {
        self.sent
            .lock()
            .expect("mock lock poisoned")
            .push((to.to_string(), subject.to_string()));
        Ok(())
    }
}

struct StatusCopy {
    subject: &'static str,
    headline: &'static str,
    lede: &'static str,
}

// Only decisions the customer must act on get an email. Pending already
// produced a confirmation; completed and cancelled are visible in-app.
const STATUS_COPY: &[(BookingStatus, StatusCopy)] = &[
    (
        BookingStatus::Confirmed,
        StatusCopy {
            subject: "Your booking is confirmed",
            headline: "Booking Confirmed!",
            lede: "Great news! Your booking has been confirmed:",
        },
    ),
    (
        BookingStatus::Rejected,
        StatusCopy {
            subject: "Update on your booking",
            headline: "Booking Update",
            lede: "We are sorry, but we could not accommodate your booking:",
        },
    ),
];

fn status_copy(status: BookingStatus) -> Option<&'static StatusCopy> {
    STATUS_COPY
        .iter()
        .find(|(candidate, _)| *candidate == status)
        .map(|(_, copy)| copy)
}

/// Customer-facing booking emails rendered from a [`Booking`].
pub struct EmailNotifier {
    service: std::sync::Arc<dyn EmailService>,
}

impl EmailNotifier {
    /// Creates a notifier over the given delivery service.
    pub fn new(service: std::sync::Arc<dyn EmailService>) -> Self {
        Self { service }
    }

    /// Sends the receipt email after a booking is created.
    pub async fn send_booking_confirmation(&self, booking: &Booking) -> Result<(), NotifyError> {
        let subject = format!("We received your booking {}", booking.booking_reference);
        let html_body = render_html(
            "Booking Received",
            &format!(
                "Thank you, {}! We have received your booking and our team \
                 will review it shortly:",
                booking.first_name
            ),
            booking,
        );
        let text_body = render_text(
            &format!(
                "Thank you, {}! We have received your booking and our team \
                 will review it shortly.",
                booking.first_name
            ),
            booking,
        );

        self.service
            .send(&booking.email, &subject, &html_body, &text_body)
            .await
    }

    /// Sends the status decision email, if the new status warrants one.
    pub async fn send_status_update(&self, booking: &Booking) -> Result<(), NotifyError> {
        let Some(copy) = status_copy(booking.status) else {
            return Ok(());
        };

        let subject = format!("{}: {}", copy.subject, booking.booking_reference);
        let html_body = render_html(copy.headline, copy.lede, booking);
        let text_body = render_text(copy.lede, booking);

        self.service
            .send(&booking.email, &subject, &html_body, &text_body)
            .await
    }
}

fn render_html(headline: &str, lede: &str, booking: &Booking) -> String {
    let notes = match &booking.admin_notes {
        Some(notes) if !notes.is_empty() => format!(
            r#"<div style="background-color: #fff3cd; padding: 15px; border-radius: 5px; border-left: 4px solid #ffc107;">
                <strong>Notes from our team:</strong><br>
                {notes}
            </div>"#
        ),
        _ => String::new(),
    };

    format!(
        r#"
        <div style="font-family: Arial, sans-serif; line-height: 1.6; max-width: 600px; margin: 0 auto;">
            <div style="background-color: #f8f9fa; padding: 20px; text-align: center;">
                <h1 style="color: #007bff; margin: 0;">DoRayd Travel &amp; Tours</h1>
            </div>
            <div style="padding: 30px 20px;">
                <h2 style="color: #333;">{headline}</h2>
                <p>Dear {first_name},</p>
                <p>{lede}</p>
                <div style="background-color: #e9ecef; padding: 15px; border-radius: 5px; margin: 20px 0;">
                    <p style="margin: 0;"><strong>Reference:</strong> {reference}</p>
                    <p style="margin: 0;"><strong>Item:</strong> {item_name}</p>
                    <p style="margin: 0;"><strong>Dates:</strong> {start} to {end}</p>
                </div>
                {notes}
                <p>If you have any questions, please reply to this email or contact us directly.</p>
                <p>Thank you for choosing DoRayd Travel &amp; Tours!</p>
            </div>
            <div style="background-color: #f8f9fa; padding: 15px; text-align: center; font-size: 12px; color: #666;">
                © DoRayd Travel &amp; Tours. All rights reserved.
            </div>
        </div>
        "#,
        headline = headline,
        first_name = booking.first_name,
        lede = lede,
        reference = booking.booking_reference,
        item_name = booking.item_name,
        start = booking.start_date,
        end = booking.end_date,
        notes = notes,
    )
}

fn render_text(lede: &str, booking: &Booking) -> String {
    format!(
        "Dear {},\n\n{}\n\nReference: {}\nItem: {}\nDates: {} to {}\n\n\
         Thank you for choosing DoRayd Travel & Tours!",
        booking.first_name,
        lede,
        booking.booking_reference,
        booking.item_name,
        booking.start_date,
        booking.end_date,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use booking_engine::{DeliveryMethod, ItemType};
    use chrono::{NaiveDate, Utc};
    use std::sync::Arc;
    use uuid::Uuid;

    fn booking(status: BookingStatus) -> Booking {
        Booking {
            id: Uuid::new_v4(),
            booking_reference: "TOUR-000042-Z9XK".to_string(),
            user_id: Some(Uuid::new_v4()),
            item_type: ItemType::Tour,
            item_id: Uuid::new_v4(),
            item_name: "Island Hopping".to_string(),
            first_name: "Miguel".to_string(),
            last_name: "Santos".to_string(),
            email: "miguel@example.com".to_string(),
            phone: String::new(),
            start_date: NaiveDate::from_ymd_opt(2025, 8, 10).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2025, 8, 12).unwrap(),
            number_of_guests: 4,
            special_requests: None,
            delivery_method: Some(DeliveryMethod::Pickup),
            pickup_location: None,
            dropoff_location: None,
            dropoff_coordinates: None,
            total_price: 1200.0,
            amount_paid: 0.0,
            payment_reference: None,
            payment_proof_url: None,
            status,
            agreed_to_terms: true,
            admin_notes: Some("Bring sunscreen".to_string()),
            processed_by: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn only_confirmed_and_rejected_have_status_copy() {
        assert!(status_copy(BookingStatus::Confirmed).is_some());
        assert!(status_copy(BookingStatus::Rejected).is_some());
        assert!(status_copy(BookingStatus::Pending).is_none());
        assert!(status_copy(BookingStatus::Completed).is_none());
        assert!(status_copy(BookingStatus::Cancelled).is_none());
    }

    #[tokio::test]
    async fn confirmation_email_goes_to_the_booking_contact() {
        let mock = Arc::new(MockEmailService::default());
        let notifier = EmailNotifier::new(mock.clone());

        notifier
            .send_booking_confirmation(&booking(BookingStatus::Pending))
            .await
            .unwrap();

        let sent = mock.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, "miguel@example.com");
        assert!(sent[0].1.contains("TOUR-000042-Z9XK"));
    }

    #[tokio::test]
    async fn status_update_is_skipped_for_statuses_without_copy() {
        let mock = Arc::new(MockEmailService::default());
        let notifier = EmailNotifier::new(mock.clone());

        notifier
            .send_status_update(&booking(BookingStatus::Completed))
            .await
            .unwrap();
        notifier
            .send_status_update(&booking(BookingStatus::Confirmed))
            .await
            .unwrap();

        let sent = mock.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].1.starts_with("Your booking is confirmed"));
    }

    #[test]
    fn admin_notes_are_rendered_when_present() {
        let html = render_html("Booking Update", "lede", &booking(BookingStatus::Rejected));
        assert!(html.contains("Bring sunscreen"));
        assert!(html.contains("Notes from our team"));
    }
}
