use std::collections::BTreeSet;

use chrono::NaiveDate;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::status::BookingStatus;
use crate::types::BookingError;

/// Expands inclusive `[start, end]` date ranges into the union of their
/// calendar dates, de-duplicated and sorted.
pub fn expand_date_ranges<I>(ranges: I) -> BTreeSet<NaiveDate>
where
    I: IntoIterator<Item = (NaiveDate, NaiveDate)>,
{
    let mut blocked = BTreeSet::new();

    for (start, end) in ranges {
        let mut day = start;
        while day <= end {
            blocked.insert(day);
            day = match day.succ_opt() {
                Some(next) => next,
                None => break,
            };
        }
    }

    blocked
}

/// Resolves which calendar dates are already claimed for a catalog item.
///
/// Read-only: an unknown item simply yields an empty set. The availability
/// answer alone does not guard against concurrent creations; the booking
/// service re-checks overlap inside its insert transaction.
pub struct AvailabilityService {
    pool: PgPool,
}

impl AvailabilityService {
    /// Creates a new instance with the provided database connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Returns the set of dates blocked by pending or confirmed bookings
    /// for the given item.
    pub async fn blocked_dates(&self, item_id: &Uuid) -> Result<BTreeSet<NaiveDate>, BookingError> {
        let occupying: Vec<&str> = BookingStatus::OCCUPYING.iter().map(|s| s.as_str()).collect();

        let rows = sqlx::query(
            r#"
            SELECT start_date, end_date
            FROM bookings
            WHERE item_id = $1 AND status = ANY($2)
            "#,
        )
        .bind(item_id)
        .bind(&occupying)
        .fetch_all(&self.pool)
        .await?;

        let ranges = rows.into_iter().map(|row| {
            (
                row.get::<NaiveDate, _>("start_date"),
                row.get::<NaiveDate, _>("end_date"),
            )
        });

        Ok(expand_date_ranges(ranges))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn a_three_day_stay_blocks_exactly_three_dates() {
        let blocked = expand_date_ranges([(date(2025, 3, 10), date(2025, 3, 12))]);

        let expected: BTreeSet<NaiveDate> =
            [date(2025, 3, 10), date(2025, 3, 11), date(2025, 3, 12)]
                .into_iter()
                .collect();
        assert_eq!(blocked, expected);
    }

    #[test]
    fn a_single_day_stay_blocks_one_date() {
        let blocked = expand_date_ranges([(date(2025, 6, 1), date(2025, 6, 1))]);
        assert_eq!(blocked.len(), 1);
        assert!(blocked.contains(&date(2025, 6, 1)));
    }

    #[test]
    fn overlapping_stays_are_unioned_and_deduplicated() {
        let blocked = expand_date_ranges([
            (date(2025, 3, 10), date(2025, 3, 12)),
            (date(2025, 3, 11), date(2025, 3, 14)),
        ]);

        assert_eq!(blocked.len(), 5);
        assert_eq!(blocked.first(), Some(&date(2025, 3, 10)));
        assert_eq!(blocked.last(), Some(&date(2025, 3, 14)));
    }

    #[test]
    fn no_bookings_means_no_blocked_dates() {
        let blocked = expand_date_ranges(std::iter::empty());
        assert!(blocked.is_empty());
    }
}
