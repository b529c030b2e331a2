use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use serde::Serialize;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::service::map_booking;
use crate::types::{Booking, BookingError, ItemType};

/// One time bucket of a revenue series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RevenuePoint {
    /// Bucket label, e.g. `2025-06-01`, `Jun 25`, `Q2 2025`, `2025`.
    pub label: String,
    /// Summed `total_price` of completed bookings in the bucket.
    pub revenue: f64,
}

/// A completed booking reduced to what the rollups need.
#[derive(Debug, Clone)]
pub struct CompletedSale {
    /// When the booking was created; revenue is attributed to this instant.
    pub created_at: DateTime<Utc>,
    /// Stored total for the stay.
    pub total_price: f64,
}

/// Headline figures for the operator dashboard.
#[derive(Debug, Serialize)]
pub struct DashboardSummary {
    /// Sum of `total_price` over all completed bookings.
    pub total_revenue: f64,
    /// Month-over-month revenue growth percentage.
    pub revenue_growth: f64,
    /// Count of completed bookings.
    pub total_bookings: i64,
    /// Average revenue per completed booking.
    pub avg_revenue_per_booking: f64,
    /// Completed bookings as a percentage of all bookings.
    pub conversion_rate: f64,
    /// Active (non-archived) vehicles in the catalog.
    pub total_vehicles: i64,
    /// Active (non-archived) tours in the catalog.
    pub total_tours: i64,
    /// Bookings awaiting review.
    pub pending_bookings: i64,
}

/// The four revenue series.
#[derive(Debug, Serialize)]
pub struct RevenueTrend {
    /// Per-day buckets over the trailing 30 days.
    pub daily: Vec<RevenuePoint>,
    /// Per-month buckets over the trailing 12 months.
    pub monthly: Vec<RevenuePoint>,
    /// Per-quarter buckets over the full history.
    pub quarterly: Vec<RevenuePoint>,
    /// Per-year buckets over the full history.
    pub yearly: Vec<RevenuePoint>,
}

/// A frequently booked catalog item.
#[derive(Debug, Serialize)]
pub struct PopularItem {
    /// The catalog item.
    pub item_id: Uuid,
    /// Display name of the item.
    pub name: String,
    /// Count of completed or confirmed bookings.
    pub booking_count: i64,
}

/// Top-5 most-booked items per resource type.
#[derive(Debug, Serialize)]
pub struct PopularItems {
    /// Most-booked vehicles.
    pub vehicles: Vec<PopularItem>,
    /// Most-booked tours.
    pub tours: Vec<PopularItem>,
}

/// The full dashboard payload. Recomputed fresh on every request.
#[derive(Debug, Serialize)]
pub struct DashboardAnalytics {
    /// Headline figures.
    pub summary: DashboardSummary,
    /// The four revenue series.
    pub revenue_trend: RevenueTrend,
    /// Most-booked items per resource type.
    pub popular: PopularItems,
    /// The five most recent bookings of any status.
    pub recent_bookings: Vec<Booking>,
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Revenue per day over the 30 days trailing `now`, chronologically
/// ascending. Days without completed bookings produce no bucket.
pub fn daily_revenue(sales: &[CompletedSale], now: DateTime<Utc>) -> Vec<RevenuePoint> {
    let cutoff = now - Duration::days(30);
    let mut buckets: BTreeMap<NaiveDate, f64> = BTreeMap::new();

    for sale in sales.iter().filter(|sale| sale.created_at >= cutoff) {
        *buckets.entry(sale.created_at.date_naive()).or_insert(0.0) += sale.total_price;
    }

    buckets
        .into_iter()
        .map(|(day, revenue)| RevenuePoint {
            label: day.format("%Y-%m-%d").to_string(),
            revenue,
        })
        .collect()
}

/// Revenue per calendar month over the trailing 12 months.
pub fn monthly_revenue(sales: &[CompletedSale], now: DateTime<Utc>) -> Vec<RevenuePoint> {
    let cutoff = now - Duration::days(365);
    let mut buckets: BTreeMap<(i32, u32), f64> = BTreeMap::new();

    for sale in sales.iter().filter(|sale| sale.created_at >= cutoff) {
        let key = (sale.created_at.year(), sale.created_at.month());
        *buckets.entry(key).or_insert(0.0) += sale.total_price;
    }

    buckets
        .into_iter()
        .map(|((year, month), revenue)| {
            let label = NaiveDate::from_ymd_opt(year, month, 1)
                .expect("valid month start")
                .format("%b %y")
                .to_string();
            RevenuePoint { label, revenue }
        })
        .collect()
}

/// Revenue per fiscal quarter (ceiling of month / 3) over the full history.
pub fn quarterly_revenue(sales: &[CompletedSale]) -> Vec<RevenuePoint> {
    let mut buckets: BTreeMap<(i32, u32), f64> = BTreeMap::new();

    for sale in sales {
        let quarter = sale.created_at.month().div_ceil(3);
        let key = (sale.created_at.year(), quarter);
        *buckets.entry(key).or_insert(0.0) += sale.total_price;
    }

    buckets
        .into_iter()
        .map(|((year, quarter), revenue)| RevenuePoint {
            label: format!("Q{} {}", quarter, year),
            revenue,
        })
        .collect()
}

/// Revenue per calendar year over the full history.
pub fn yearly_revenue(sales: &[CompletedSale]) -> Vec<RevenuePoint> {
    let mut buckets: BTreeMap<i32, f64> = BTreeMap::new();

    for sale in sales {
        *buckets.entry(sale.created_at.year()).or_insert(0.0) += sale.total_price;
    }

    buckets
        .into_iter()
        .map(|(year, revenue)| RevenuePoint {
            label: year.to_string(),
            revenue,
        })
        .collect()
}

/// Splits completed revenue into the current and prior calendar months
/// relative to `now`.
pub fn month_window_totals(sales: &[CompletedSale], now: DateTime<Utc>) -> (f64, f64) {
    let current_start = now
        .date_naive()
        .with_day(1)
        .expect("first of month is valid");
    let prior_start = if current_start.month() == 1 {
        NaiveDate::from_ymd_opt(current_start.year() - 1, 12, 1)
    } else {
        NaiveDate::from_ymd_opt(current_start.year(), current_start.month() - 1, 1)
    }
    .expect("first of month is valid");

    let mut current = 0.0;
    let mut prior = 0.0;
    for sale in sales {
        let day = sale.created_at.date_naive();
        if day >= current_start {
            current += sale.total_price;
        } else if day >= prior_start {
            prior += sale.total_price;
        }
    }

    (current, prior)
}

/// Month-over-month growth percentage. A month that starts from zero and
/// earns anything counts as 100% growth; two zero months count as 0%.
pub fn revenue_growth(current: f64, prior: f64) -> f64 {
    if prior > 0.0 {
        round2((current - prior) / prior * 100.0)
    } else if current > 0.0 {
        100.0
    } else {
        0.0
    }
}

/// Completed bookings as a percentage of all bookings, any status.
pub fn conversion_rate(completed: i64, total: i64) -> f64 {
    if total > 0 {
        round2(completed as f64 / total as f64 * 100.0)
    } else {
        0.0
    }
}

/// Average revenue per completed booking.
pub fn average_revenue(total_revenue: f64, completed: i64) -> f64 {
    if completed > 0 {
        round2(total_revenue / completed as f64)
    } else {
        0.0
    }
}

/// Read-only service producing the operator dashboard. Either returns a
/// complete payload or an error; never a partial aggregate.
pub struct AnalyticsService {
    pool: PgPool,
}

impl AnalyticsService {
    /// Creates a new instance with the provided database connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Computes the full dashboard payload as of now.
    pub async fn dashboard(&self) -> Result<DashboardAnalytics, BookingError> {
        let now = Utc::now();
        let sales = self.completed_sales().await?;

        let counts = sqlx::query(
            r#"
            SELECT
                COUNT(*) AS total,
                COUNT(*) FILTER (WHERE status = 'pending') AS pending,
                COUNT(*) FILTER (WHERE status = 'completed') AS completed
            FROM bookings
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        let total: i64 = counts.get("total");
        let pending: i64 = counts.get("pending");
        let completed: i64 = counts.get("completed");

        let catalog = sqlx::query(
            r#"
            SELECT
                COUNT(*) FILTER (WHERE item_type = 'vehicle') AS vehicles,
                COUNT(*) FILTER (WHERE item_type = 'tour') AS tours
            FROM catalog_items
            WHERE archived = FALSE
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        let total_revenue: f64 = sales.iter().map(|sale| sale.total_price).sum();
        let (current_month, prior_month) = month_window_totals(&sales, now);

        let summary = DashboardSummary {
            total_revenue,
            revenue_growth: revenue_growth(current_month, prior_month),
            total_bookings: completed,
            avg_revenue_per_booking: average_revenue(total_revenue, completed),
            conversion_rate: conversion_rate(completed, total),
            total_vehicles: catalog.get("vehicles"),
            total_tours: catalog.get("tours"),
            pending_bookings: pending,
        };

        let revenue_trend = RevenueTrend {
            daily: daily_revenue(&sales, now),
            monthly: monthly_revenue(&sales, now),
            quarterly: quarterly_revenue(&sales),
            yearly: yearly_revenue(&sales),
        };

        let popular = PopularItems {
            vehicles: self.popular_items(ItemType::Vehicle).await?,
            tours: self.popular_items(ItemType::Tour).await?,
        };

        let recent_bookings = self.recent_bookings().await?;

        Ok(DashboardAnalytics {
            summary,
            revenue_trend,
            popular,
            recent_bookings,
        })
    }

    async fn completed_sales(&self) -> Result<Vec<CompletedSale>, BookingError> {
        let rows =
            sqlx::query("SELECT created_at, total_price FROM bookings WHERE status = 'completed'")
                .fetch_all(&self.pool)
                .await?;

        Ok(rows
            .into_iter()
            .map(|row| CompletedSale {
                created_at: row.get("created_at"),
                total_price: row.get("total_price"),
            })
            .collect())
    }

    /// Top five most-booked items of one type, ranked by the count of
    /// completed or confirmed bookings. Ties fall back to storage order.
    async fn popular_items(&self, item_type: ItemType) -> Result<Vec<PopularItem>, BookingError> {
        let rows = sqlx::query(
            r#"
            SELECT b.item_id, c.name, COUNT(*) AS booking_count
            FROM bookings b
            JOIN catalog_items c ON c.id = b.item_id
            WHERE b.item_type = $1 AND b.status IN ('completed', 'confirmed')
            GROUP BY b.item_id, c.name
            ORDER BY booking_count DESC
            LIMIT 5
            "#,
        )
        .bind(item_type.as_str())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| PopularItem {
                item_id: row.get("item_id"),
                name: row.get("name"),
                booking_count: row.get("booking_count"),
            })
            .collect())
    }

    async fn recent_bookings(&self) -> Result<Vec<Booking>, BookingError> {
        let rows = sqlx::query("SELECT * FROM bookings ORDER BY created_at DESC LIMIT 5")
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(map_booking).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sale(y: i32, m: u32, d: u32, price: f64) -> CompletedSale {
        CompletedSale {
            created_at: Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap(),
            total_price: price,
        }
    }

    #[test]
    fn growth_is_100_percent_from_a_zero_prior_month() {
        assert_eq!(revenue_growth(5000.0, 0.0), 100.0);
    }

    #[test]
    fn growth_is_zero_when_both_months_are_zero() {
        assert_eq!(revenue_growth(0.0, 0.0), 0.0);
    }

    #[test]
    fn growth_is_the_percentage_delta_otherwise() {
        assert_eq!(revenue_growth(1500.0, 1000.0), 50.0);
        assert_eq!(revenue_growth(500.0, 1000.0), -50.0);
    }

    #[test]
    fn conversion_rate_is_completed_over_total() {
        assert_eq!(conversion_rate(3, 10), 30.0);
        assert_eq!(conversion_rate(0, 0), 0.0);
    }

    #[test]
    fn average_revenue_handles_no_completed_bookings() {
        assert_eq!(average_revenue(900.0, 3), 300.0);
        assert_eq!(average_revenue(0.0, 0), 0.0);
    }

    #[test]
    fn daily_buckets_sum_same_day_sales_and_window_to_30_days() {
        let now = Utc.with_ymd_and_hms(2025, 6, 15, 0, 0, 0).unwrap();
        let sales = vec![
            sale(2025, 6, 1, 400.0),
            sale(2025, 6, 1, 100.0),
            sale(2025, 6, 10, 250.0),
            // Outside the trailing 30 days.
            sale(2025, 4, 1, 999.0),
        ];

        let series = daily_revenue(&sales, now);

        assert_eq!(
            series,
            vec![
                RevenuePoint {
                    label: "2025-06-01".to_string(),
                    revenue: 500.0
                },
                RevenuePoint {
                    label: "2025-06-10".to_string(),
                    revenue: 250.0
                },
            ]
        );
    }

    #[test]
    fn monthly_buckets_are_labelled_and_windowed() {
        let now = Utc.with_ymd_and_hms(2025, 6, 15, 0, 0, 0).unwrap();
        let sales = vec![
            sale(2025, 3, 5, 100.0),
            sale(2025, 3, 20, 200.0),
            sale(2025, 6, 1, 50.0),
            // More than a year back.
            sale(2023, 6, 1, 777.0),
        ];

        let series = monthly_revenue(&sales, now);

        assert_eq!(series.len(), 2);
        assert_eq!(series[0].label, "Mar 25");
        assert_eq!(series[0].revenue, 300.0);
        assert_eq!(series[1].label, "Jun 25");
    }

    #[test]
    fn quarters_use_the_ceiling_of_month_over_three() {
        let sales = vec![
            sale(2025, 1, 10, 100.0), // Q1
            sale(2025, 3, 10, 100.0), // Q1
            sale(2025, 4, 10, 100.0), // Q2
            sale(2024, 12, 10, 100.0), // Q4 of the prior year
        ];

        let series = quarterly_revenue(&sales);

        assert_eq!(
            series
                .iter()
                .map(|point| point.label.as_str())
                .collect::<Vec<_>>(),
            vec!["Q4 2024", "Q1 2025", "Q2 2025"]
        );
        assert_eq!(series[1].revenue, 200.0);
    }

    #[test]
    fn yearly_buckets_cover_the_full_history() {
        let sales = vec![
            sale(2023, 6, 1, 100.0),
            sale(2025, 1, 1, 300.0),
            sale(2025, 12, 31, 200.0),
        ];

        let series = yearly_revenue(&sales);

        assert_eq!(series.len(), 2);
        assert_eq!(series[0].label, "2023");
        assert_eq!(series[1].label, "2025");
        assert_eq!(series[1].revenue, 500.0);
    }

    #[test]
    fn month_window_totals_split_on_calendar_boundaries() {
        let now = Utc.with_ymd_and_hms(2025, 6, 15, 0, 0, 0).unwrap();
        let sales = vec![
            sale(2025, 6, 2, 1500.0),  // current month
            sale(2025, 5, 30, 1000.0), // prior month
            sale(2025, 4, 30, 400.0),  // older, ignored
        ];

        let (current, prior) = month_window_totals(&sales, now);
        assert_eq!(current, 1500.0);
        assert_eq!(prior, 1000.0);
        assert_eq!(revenue_growth(current, prior), 50.0);
    }
}
