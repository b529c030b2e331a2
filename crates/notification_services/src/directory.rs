use async_trait::async_trait;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::types::{NotifyError, Recipients};

/// Resolves a [`Recipients`] spec into concrete account ids.
///
/// A trait so the fan-out can be exercised in tests without a database.
#[async_trait]
pub trait RecipientDirectory: Send + Sync {
    /// Returns the account ids the spec targets, deduplicated, with the
    /// directly named user (if any) first.
    async fn resolve(&self, recipients: &Recipients) -> Result<Vec<Uuid>, NotifyError>;
}

/// Directory backed by the `users` table.
pub struct PgRecipientDirectory {
    pool: PgPool,
}

impl PgRecipientDirectory {
    /// Creates a new instance with the provided database connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RecipientDirectory for PgRecipientDirectory {
    async fn resolve(&self, recipients: &Recipients) -> Result<Vec<Uuid>, NotifyError> {
        let mut resolved: Vec<Uuid> = recipients.user.into_iter().collect();

        if !recipients.roles.is_empty() {
            let roles: Vec<&str> = recipients.roles.iter().map(|role| role.as_str()).collect();
            let rows = sqlx::query("SELECT id FROM users WHERE role = ANY($1)")
                .bind(&roles)
                .fetch_all(&self.pool)
                .await?;
            resolved.extend(rows.into_iter().map(|row| row.get::<Uuid, _>("id")));
        }

        Ok(dedupe_recipients(resolved))
    }
}

/// Removes duplicate ids while preserving first-seen order, so a booking
/// owner who is also an operator gets a single notification.
pub fn dedupe_recipients(ids: Vec<Uuid>) -> Vec<Uuid> {
    let mut seen = std::collections::HashSet::new();
    ids.into_iter().filter(|id| seen.insert(*id)).collect()
}
