//! Server-sent events endpoint pushing booking activity to signed-in
//! clients.

use actix_web::{HttpResponse, web};
use futures_util::stream;
use uuid::Uuid;

use auth_services::middleware::AuthenticatedUser;
use notification_services::LiveBroadcaster;

/// Opens a `text/event-stream` connection for the signed-in user.
///
/// Every session is subscribed to its role channel and to its own
/// user-id channel, so operators see all booking activity and customers
/// see updates to their own bookings. When the client goes away the
/// stream is dropped and the broadcaster prunes the session on the next
/// publish.
pub async fn live_events(
    broadcaster: web::Data<LiveBroadcaster>,
    user: AuthenticatedUser,
) -> HttpResponse {
    let session_id = Uuid::new_v4();
    let receiver = broadcaster.connect(session_id);

    broadcaster.subscribe(&session_id, user.0.role.channel());
    broadcaster.subscribe(&session_id, &user.0.user_id.to_string());

    log::info!(
        "📡 Live session {} opened for {} ({})",
        session_id,
        user.0.email,
        user.0.role.as_str()
    );

    let stream = stream::unfold(receiver, |mut receiver| async move {
        let event = receiver.recv().await?;
        let chunk = format!("event: {}\ndata: {}\n\n", event.event, event.payload);
        Some((
            Ok::<_, actix_web::Error>(web::Bytes::from(chunk)),
            receiver,
        ))
    });

    HttpResponse::Ok()
        .content_type("text/event-stream")
        .insert_header(("Cache-Control", "no-cache"))
        .streaming(stream)
}
