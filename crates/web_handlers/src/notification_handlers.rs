use actix_web::{HttpResponse, web};
use sqlx::PgPool;
use uuid::Uuid;

use auth_services::middleware::AuthenticatedUser;
use notification_services::{NotificationStore, NotifyError};

use crate::types::ApiResponse;

/// Lists the signed-in user's notifications, newest first.
pub async fn get_my_notifications(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, NotifyError> {
    let store = NotificationStore::new(pool.get_ref().clone());
    let notifications = store.find_for_user(&user.0.user_id).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::new(notifications)))
}

/// Marks one of the signed-in user's notifications as read. Somebody
/// else's notification id reports 404 rather than leaking its existence.
pub async fn mark_notification_read(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, NotifyError> {
    let store = NotificationStore::new(pool.get_ref().clone());
    let notification = store.mark_read(&path, &user.0.user_id).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::new(notification)))
}

/// Marks all of the signed-in user's notifications as read.
pub async fn mark_all_notifications_read(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, NotifyError> {
    let store = NotificationStore::new(pool.get_ref().clone());
    let updated = store.mark_all_read(&user.0.user_id).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::new(serde_json::json!({
        "updated": updated
    }))))
}
