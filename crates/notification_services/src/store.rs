use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::types::{Notification, NotifyError};

/// Persistence for in-app notifications.
pub struct NotificationStore {
    pool: PgPool,
}

impl NotificationStore {
    /// Creates a new instance with the provided database connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Inserts one notification row per recipient in a single statement.
    pub async fn insert_for_users(
        &self,
        user_ids: &[Uuid],
        message: &str,
        link: Option<&str>,
    ) -> Result<(), NotifyError> {
        if user_ids.is_empty() {
            return Ok(());
        }

        sqlx::query(
            r#"
            INSERT INTO notifications (user_id, message, link)
            SELECT user_id, $2, $3 FROM UNNEST($1::uuid[]) AS user_id
            "#,
        )
        .bind(user_ids)
        .bind(message)
        .bind(link)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Gets a user's notifications, newest first.
    pub async fn find_for_user(&self, user_id: &Uuid) -> Result<Vec<Notification>, NotifyError> {
        let rows = sqlx::query(
            r#"
            SELECT id, user_id, message, link, read, created_at
            FROM notifications
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(map_notification).collect())
    }

    /// Marks one notification as read. Scoped to the owner: marking
    /// somebody else's notification reports [`NotifyError::NotFound`].
    pub async fn mark_read(
        &self,
        notification_id: &Uuid,
        user_id: &Uuid,
    ) -> Result<Notification, NotifyError> {
        let row = sqlx::query(
            r#"
            UPDATE notifications
            SET read = TRUE
            WHERE id = $1 AND user_id = $2
            RETURNING id, user_id, message, link, read, created_at
            "#,
        )
        .bind(notification_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(map_notification(&row)),
            None => Err(NotifyError::NotFound),
        }
    }

    /// Marks all of a user's notifications as read. Returns the count of
    /// rows that changed.
    pub async fn mark_all_read(&self, user_id: &Uuid) -> Result<u64, NotifyError> {
        let result = sqlx::query(
            "UPDATE notifications SET read = TRUE WHERE user_id = $1 AND read = FALSE",
        )
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}

fn map_notification(row: &sqlx::postgres::PgRow) -> Notification {
    Notification {
        id: row.get("id"),
        user_id: row.get("user_id"),
        message: row.get("message"),
        link: row.get("link"),
        read: row.get("read"),
        created_at: row.get("created_at"),
    }
}
