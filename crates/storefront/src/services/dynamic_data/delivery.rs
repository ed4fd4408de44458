//! Delivery date prediction from city cutoff times and warehouse calendars.
//!
//! The working start date is "now" in the city's timezone, pushed forward a
//! day once the cutoff has passed, plus the city's base lead-days for
//! out-of-stock products. Each schedule is either a recurring weekly pattern
//! or an explicit date list; the earliest qualifying date across schedules
//! wins. Anything unresolvable (unknown timezone, malformed schedule rows)
//! degrades to the "inquire" fallback instead of failing the batch.

use std::collections::{BTreeSet, HashMap, HashSet};

use chrono::{Datelike, Days, NaiveDate, NaiveTime, Utc, Weekday};
use chrono_tz::Tz;

use basalt_core::{CityId, DeliveryRecord, ProductId, StockRecord, WarehouseId};

use crate::models::catalog::ScheduleRow;

use super::source::{DataSourceError, ProductDataSource};

/// How far ahead a weekly pattern is scanned for a matching weekday.
const WEEKLY_LOOKAHEAD_DAYS: u64 = 14;

/// Cutoff applied when a city has none configured.
const DEFAULT_CUTOFF: NaiveTime = match NaiveTime::from_hms_opt(16, 0, 0) {
    Some(time) => time,
    None => NaiveTime::MIN,
};

/// Lead-days applied when a city has none configured.
const DEFAULT_LEAD_DAYS: i32 = 3;

/// Timezone applied when a city has none configured.
const DEFAULT_TIMEZONE: Tz = chrono_tz::Europe::Berlin;

/// A parsed delivery schedule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliverySchedule {
    /// Restricts the schedule to one warehouse when set.
    pub warehouse_id: Option<WarehouseId>,
    pub pattern: DeliveryPattern,
}

/// The two schedule shapes, sharing one "next date" operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryPattern {
    /// Recurring weekly pattern of ISO weekday numbers (1 = Monday).
    Weekly(BTreeSet<u32>),
    /// Explicit list of calendar dates.
    Dates(Vec<NaiveDate>),
}

impl DeliveryPattern {
    /// The earliest date matching this pattern at or after `start`.
    ///
    /// Weekly patterns scan forward a bounded window; explicit-date patterns
    /// pick the earliest listed date that has not passed.
    #[must_use]
    pub fn next_occurrence_on_or_after(&self, start: NaiveDate) -> Option<NaiveDate> {
        match self {
            Self::Weekly(days) => (0..WEEKLY_LOOKAHEAD_DAYS)
                .filter_map(|offset| start.checked_add_days(Days::new(offset)))
                .find(|date| days.contains(&date.weekday().number_from_monday())),
            Self::Dates(dates) => dates.iter().copied().filter(|date| *date >= start).min(),
        }
    }
}

/// Resolve delivery records for the batch, given the stock map.
///
/// An unknown city yields an empty map; the orchestrator then defaults every
/// product to "inquire".
///
/// # Errors
///
/// Returns `DataSourceError` if the city or schedule store cannot be queried.
pub async fn resolve_delivery<S: ProductDataSource>(
    source: &S,
    product_ids: &[ProductId],
    city_id: CityId,
    stock_by_product: &HashMap<ProductId, StockRecord>,
) -> Result<HashMap<ProductId, DeliveryRecord>, DataSourceError> {
    let Some(city) = source.city(city_id).await? else {
        return Ok(HashMap::new());
    };

    let tz = match city.timezone.as_deref() {
        None => DEFAULT_TIMEZONE,
        Some(name) => match name.parse::<Tz>() {
            Ok(tz) => tz,
            Err(_) => {
                tracing::warn!(%city_id, timezone = name, "unrecognized city timezone");
                return Ok(HashMap::new());
            }
        },
    };

    let rows = source.delivery_schedules(city_id).await?;
    let schedules: Vec<DeliverySchedule> = rows.iter().filter_map(parse_schedule).collect();

    let now = Utc::now().with_timezone(&tz);
    let cutoff = city.cutoff_time.unwrap_or(DEFAULT_CUTOFF);
    let lead_days =
        u64::try_from(city.delivery_base_days.unwrap_or(DEFAULT_LEAD_DAYS)).unwrap_or(0);

    Ok(compute_delivery_dates(
        product_ids,
        stock_by_product,
        &schedules,
        now.date_naive(),
        now.time(),
        cutoff,
        lead_days,
    ))
}

/// Parse a raw schedule row; `None` skips the row.
fn parse_schedule(row: &ScheduleRow) -> Option<DeliverySchedule> {
    let pattern = if row.delivery_mode == "specific_dates" {
        let raw = row.specific_dates.as_deref()?;
        let entries: Vec<String> = serde_json::from_str(raw).ok()?;
        let dates = entries
            .iter()
            .filter_map(|entry| NaiveDate::parse_from_str(entry, "%Y-%m-%d").ok())
            .collect();
        DeliveryPattern::Dates(dates)
    } else {
        let raw = row.delivery_days.as_deref()?;
        let days: BTreeSet<u32> = serde_json::from_str::<Vec<u32>>(raw)
            .ok()?
            .into_iter()
            .filter(|day| (1..=7).contains(day))
            .collect();
        DeliveryPattern::Weekly(days)
    };

    Some(DeliverySchedule {
        warehouse_id: row.warehouse_id,
        pattern,
    })
}

/// First date dispatch can happen: today, or tomorrow once the cutoff has
/// passed, plus the base lead-days for on-order products.
fn working_start_date(
    today: NaiveDate,
    now_time: NaiveTime,
    cutoff: NaiveTime,
    on_order: bool,
    lead_days: u64,
) -> NaiveDate {
    let mut start = today;
    if now_time > cutoff {
        start = start.checked_add_days(Days::new(1)).unwrap_or(start);
    }
    if on_order {
        start = start.checked_add_days(Days::new(lead_days)).unwrap_or(start);
    }
    start
}

/// Minimum qualifying date across schedules.
///
/// With a non-empty candidate set only schedules bound to one of those
/// warehouses apply; with an empty set (out of stock) every schedule applies.
fn earliest_delivery(
    schedules: &[DeliverySchedule],
    candidates: &HashSet<WarehouseId>,
    start: NaiveDate,
) -> Option<NaiveDate> {
    schedules
        .iter()
        .filter(|schedule| {
            candidates.is_empty()
                || schedule
                    .warehouse_id
                    .is_some_and(|warehouse| candidates.contains(&warehouse))
        })
        .filter_map(|schedule| schedule.pattern.next_occurrence_on_or_after(start))
        .min()
}

fn compute_delivery_dates(
    product_ids: &[ProductId],
    stock_by_product: &HashMap<ProductId, StockRecord>,
    schedules: &[DeliverySchedule],
    today: NaiveDate,
    now_time: NaiveTime,
    cutoff: NaiveTime,
    lead_days: u64,
) -> HashMap<ProductId, DeliveryRecord> {
    let mut deliveries = HashMap::with_capacity(product_ids.len());

    for &product_id in product_ids {
        let stock = stock_by_product.get(&product_id);
        let in_stock = stock.is_some_and(StockRecord::in_stock);

        let candidates: HashSet<WarehouseId> = if in_stock {
            stock
                .map(|record| {
                    record
                        .allocations
                        .iter()
                        .map(|allocation| allocation.warehouse_id)
                        .collect()
                })
                .unwrap_or_default()
        } else {
            HashSet::new()
        };

        let start = working_start_date(today, now_time, cutoff, !in_stock, lead_days);

        let mut record = if in_stock {
            DeliveryRecord::inquire()
        } else {
            DeliveryRecord::on_order()
        };
        if let Some(date) = earliest_delivery(schedules, &candidates, start) {
            record = DeliveryRecord {
                date: Some(date),
                text: format_delivery_text(date, today),
            };
        }

        deliveries.insert(product_id, record);
    }

    deliveries
}

/// Human-readable offset: "today", "tomorrow", a weekday name inside the
/// week, a short day.month string beyond that.
fn format_delivery_text(date: NaiveDate, today: NaiveDate) -> String {
    match (date - today).num_days() {
        0 => "today".to_owned(),
        1 => "tomorrow".to_owned(),
        2..=6 => weekday_name(date.weekday()).to_owned(),
        _ => date.format("%d.%m").to_string(),
    }
}

const fn weekday_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use basalt_core::WarehouseAllocation;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn weekly(warehouse_id: Option<i32>, days: &[u32]) -> DeliverySchedule {
        DeliverySchedule {
            warehouse_id: warehouse_id.map(WarehouseId::new),
            pattern: DeliveryPattern::Weekly(days.iter().copied().collect()),
        }
    }

    fn in_stock_at(warehouse_id: i32, quantity: i64) -> StockRecord {
        StockRecord {
            total_available: quantity,
            allocations: vec![WarehouseAllocation {
                warehouse_id: WarehouseId::new(warehouse_id),
                warehouse_name: "test".to_owned(),
                available: quantity,
            }],
        }
    }

    #[test]
    fn test_weekly_next_occurrence_can_be_start_day() {
        // 2025-09-03 is a Wednesday
        let pattern = DeliveryPattern::Weekly([1, 3, 5].into_iter().collect());
        assert_eq!(
            pattern.next_occurrence_on_or_after(date(2025, 9, 3)),
            Some(date(2025, 9, 3))
        );
    }

    #[test]
    fn test_weekly_scans_forward() {
        // Thursday start, Mon/Wed/Fri pattern -> Friday
        let pattern = DeliveryPattern::Weekly([1, 3, 5].into_iter().collect());
        assert_eq!(
            pattern.next_occurrence_on_or_after(date(2025, 9, 4)),
            Some(date(2025, 9, 5))
        );
    }

    #[test]
    fn test_weekly_empty_pattern_never_matches() {
        let pattern = DeliveryPattern::Weekly(BTreeSet::new());
        assert_eq!(pattern.next_occurrence_on_or_after(date(2025, 9, 3)), None);
    }

    #[test]
    fn test_dates_pattern_picks_earliest_upcoming_even_unsorted() {
        let pattern = DeliveryPattern::Dates(vec![
            date(2025, 9, 20),
            date(2025, 9, 10),
            date(2025, 9, 1),
        ]);
        assert_eq!(
            pattern.next_occurrence_on_or_after(date(2025, 9, 5)),
            Some(date(2025, 9, 10))
        );
    }

    #[test]
    fn test_dates_pattern_exhausted() {
        let pattern = DeliveryPattern::Dates(vec![date(2025, 9, 1)]);
        assert_eq!(pattern.next_occurrence_on_or_after(date(2025, 9, 5)), None);
    }

    #[test]
    fn test_working_start_before_cutoff_is_today() {
        let start = working_start_date(date(2025, 9, 2), time(15, 0), time(16, 0), false, 3);
        assert_eq!(start, date(2025, 9, 2));
    }

    #[test]
    fn test_working_start_after_cutoff_is_tomorrow() {
        let start = working_start_date(date(2025, 9, 2), time(17, 0), time(16, 0), false, 3);
        assert_eq!(start, date(2025, 9, 3));
    }

    #[test]
    fn test_working_start_on_order_adds_lead_days() {
        let start = working_start_date(date(2025, 9, 2), time(15, 0), time(16, 0), true, 3);
        assert_eq!(start, date(2025, 9, 5));
    }

    #[test]
    fn test_on_order_start_never_earlier_than_lead_days() {
        // Past cutoff and on order: both shifts stack
        let start = working_start_date(date(2025, 9, 2), time(17, 0), time(16, 0), true, 3);
        assert_eq!(start, date(2025, 9, 6));
        assert!(start >= date(2025, 9, 2).checked_add_days(Days::new(3)).unwrap());
    }

    #[test]
    fn test_restricted_schedule_requires_candidate_warehouse() {
        let schedules = vec![weekly(Some(1), &[3]), weekly(Some(2), &[4])];
        let candidates: HashSet<WarehouseId> = [WarehouseId::new(2)].into_iter().collect();

        // Wednesday start: warehouse 1 delivers Wednesdays but isn't a
        // candidate; warehouse 2 delivers Thursdays.
        let result = earliest_delivery(&schedules, &candidates, date(2025, 9, 3));
        assert_eq!(result, Some(date(2025, 9, 4)));
    }

    #[test]
    fn test_unrestricted_schedule_skipped_when_in_stock() {
        // A schedule without a warehouse only applies to out-of-stock lookups.
        let schedules = vec![weekly(None, &[3])];
        let candidates: HashSet<WarehouseId> = [WarehouseId::new(1)].into_iter().collect();

        assert_eq!(earliest_delivery(&schedules, &candidates, date(2025, 9, 3)), None);
    }

    #[test]
    fn test_empty_candidate_set_considers_all_schedules() {
        let schedules = vec![weekly(Some(1), &[3]), weekly(None, &[2])];
        let result = earliest_delivery(&schedules, &HashSet::new(), date(2025, 9, 3));
        // Wednesday start: warehouse-1 schedule matches same day
        assert_eq!(result, Some(date(2025, 9, 3)));
    }

    #[test]
    fn test_cutoff_scenario_in_stock_tuesday_evening() {
        // City cutoff 16:00, now 17:00 on Tuesday 2025-09-02, product in
        // stock at warehouse 5 with a Mon/Wed/Fri weekly schedule: the
        // working start date is Wednesday and delivery lands that Wednesday.
        let today = date(2025, 9, 2);
        let stock: HashMap<ProductId, StockRecord> =
            [(ProductId::new(42), in_stock_at(5, 8))].into_iter().collect();
        let schedules = vec![weekly(Some(5), &[1, 3, 5])];

        let deliveries = compute_delivery_dates(
            &[ProductId::new(42)],
            &stock,
            &schedules,
            today,
            time(17, 0),
            time(16, 0),
            3,
        );

        let record = deliveries.get(&ProductId::new(42)).unwrap();
        assert_eq!(record.date, Some(date(2025, 9, 3)));
        assert_eq!(record.text, "tomorrow");
    }

    #[test]
    fn test_out_of_stock_carries_on_order_without_schedule() {
        let deliveries = compute_delivery_dates(
            &[ProductId::new(1)],
            &HashMap::new(),
            &[],
            date(2025, 9, 2),
            time(10, 0),
            time(16, 0),
            3,
        );

        let record = deliveries.get(&ProductId::new(1)).unwrap();
        assert_eq!(record.date, None);
        assert_eq!(record.text, "on order");
    }

    #[test]
    fn test_out_of_stock_date_respects_lead_days() {
        // Daily deliveries; on-order products still wait out the lead-time.
        let today = date(2025, 9, 2);
        let schedules = vec![weekly(None, &[1, 2, 3, 4, 5, 6, 7])];

        let deliveries = compute_delivery_dates(
            &[ProductId::new(1)],
            &HashMap::new(),
            &schedules,
            today,
            time(10, 0),
            time(16, 0),
            3,
        );

        let record = deliveries.get(&ProductId::new(1)).unwrap();
        assert_eq!(record.date, Some(date(2025, 9, 5)));
        assert!(record.date.unwrap() >= today.checked_add_days(Days::new(3)).unwrap());
    }

    #[test]
    fn test_in_stock_without_matching_schedule_is_inquire() {
        let stock: HashMap<ProductId, StockRecord> =
            [(ProductId::new(1), in_stock_at(9, 2))].into_iter().collect();

        let deliveries = compute_delivery_dates(
            &[ProductId::new(1)],
            &stock,
            &[],
            date(2025, 9, 2),
            time(10, 0),
            time(16, 0),
            3,
        );

        assert_eq!(
            deliveries.get(&ProductId::new(1)).unwrap(),
            &DeliveryRecord::inquire()
        );
    }

    #[test]
    fn test_format_delivery_text_tiers() {
        let today = date(2025, 9, 2);
        assert_eq!(format_delivery_text(today, today), "today");
        assert_eq!(format_delivery_text(date(2025, 9, 3), today), "tomorrow");
        // 2025-09-05 is a Friday, three days out
        assert_eq!(format_delivery_text(date(2025, 9, 5), today), "Friday");
        assert_eq!(format_delivery_text(date(2025, 9, 15), today), "15.09");
    }

    #[test]
    fn test_parse_schedule_weekly() {
        let row = ScheduleRow {
            warehouse_id: Some(WarehouseId::new(3)),
            delivery_mode: "weekly".to_owned(),
            delivery_days: Some("[1, 3, 5]".to_owned()),
            specific_dates: None,
        };

        let schedule = parse_schedule(&row).unwrap();
        assert_eq!(schedule.warehouse_id, Some(WarehouseId::new(3)));
        assert_eq!(
            schedule.pattern,
            DeliveryPattern::Weekly([1, 3, 5].into_iter().collect())
        );
    }

    #[test]
    fn test_parse_schedule_specific_dates() {
        let row = ScheduleRow {
            warehouse_id: None,
            delivery_mode: "specific_dates".to_owned(),
            delivery_days: None,
            specific_dates: Some(r#"["2025-09-10", "2025-09-20"]"#.to_owned()),
        };

        let schedule = parse_schedule(&row).unwrap();
        assert_eq!(
            schedule.pattern,
            DeliveryPattern::Dates(vec![date(2025, 9, 10), date(2025, 9, 20)])
        );
    }

    #[test]
    fn test_parse_schedule_rejects_malformed_rows() {
        let row = ScheduleRow {
            warehouse_id: None,
            delivery_mode: "weekly".to_owned(),
            delivery_days: Some("not json".to_owned()),
            specific_dates: None,
        };
        assert!(parse_schedule(&row).is_none());

        let row = ScheduleRow {
            warehouse_id: None,
            delivery_mode: "weekly".to_owned(),
            delivery_days: None,
            specific_dates: None,
        };
        assert!(parse_schedule(&row).is_none());
    }

    #[test]
    fn test_parse_schedule_drops_invalid_weekday_numbers() {
        let row = ScheduleRow {
            warehouse_id: None,
            delivery_mode: "weekly".to_owned(),
            delivery_days: Some("[0, 3, 8]".to_owned()),
            specific_dates: None,
        };

        let schedule = parse_schedule(&row).unwrap();
        assert_eq!(
            schedule.pattern,
            DeliveryPattern::Weekly([3].into_iter().collect())
        );
    }
}
