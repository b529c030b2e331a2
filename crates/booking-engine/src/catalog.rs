use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::types::{BookingError, ItemType};

/// A catalog entry as seen by the booking engine.
#[derive(Debug, Clone)]
pub struct CatalogItem {
    /// Unique identifier of the item.
    pub id: Uuid,
    /// Resource type of the item.
    pub item_type: ItemType,
    /// Display name of the item.
    pub name: String,
    /// Whether the item is currently offered for booking.
    pub is_available: bool,
}

/// Narrow read interface over the catalog collaborator. Catalog CRUD is
/// managed elsewhere; bookings only need existence, availability, and the
/// display name.
pub struct CatalogGateway {
    pool: PgPool,
}

impl CatalogGateway {
    /// Creates a new instance with the provided database connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Looks up a non-archived catalog item of the given type.
    pub async fn find_item(
        &self,
        item_type: ItemType,
        item_id: &Uuid,
    ) -> Result<Option<CatalogItem>, BookingError> {
        let row = sqlx::query(
            r#"
            SELECT id, item_type, name, is_available
            FROM catalog_items
            WHERE id = $1 AND item_type = $2 AND archived = FALSE
            "#,
        )
        .bind(item_id)
        .bind(item_type.as_str())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|row| CatalogItem {
            id: row.get("id"),
            item_type,
            name: row.get("name"),
            is_available: row.get("is_available"),
        }))
    }
}
