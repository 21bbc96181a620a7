use crate::types::{GeoShare, MonthlyTotal, PassengerRecord, SummaryStats};
use crate::util::month_start;
use chrono::NaiveDate;
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Sum passenger counts per (airline, month-start).
///
/// The result is sorted by airline, then month, so it does not depend on
/// the input order. Months without records for an airline produce no row.
pub fn aggregate_monthly(data: &[PassengerRecord]) -> Vec<MonthlyTotal> {
    let mut map: HashMap<(&str, NaiveDate), u64> = HashMap::new();
    for r in data {
        let key = (r.operating_airline.as_str(), month_start(r.date));
        let total = map.entry(key).or_insert(0);
        *total = total.saturating_add(r.passenger_count);
    }

    let mut rows: Vec<MonthlyTotal> = map
        .into_iter()
        .map(|((airline, month), passengers)| MonthlyTotal {
            airline: airline.to_string(),
            month,
            passengers,
        })
        .collect();
    rows.sort_by(|a, b| a.airline.cmp(&b.airline).then(a.month.cmp(&b.month)));
    debug!(records = data.len(), groups = rows.len(), "monthly aggregation done");
    rows
}

/// Sorted, de-duplicated airline names.
pub fn airlines(monthly: &[MonthlyTotal]) -> Vec<String> {
    let mut names: Vec<String> = monthly
        .iter()
        .map(|m| m.airline.as_str())
        .collect::<HashSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect();
    names.sort();
    names
}

/// All monthly rows for one airline, oldest first.
pub fn airline_series(monthly: &[MonthlyTotal], airline: &str) -> Vec<MonthlyTotal> {
    let mut rows: Vec<MonthlyTotal> = monthly
        .iter()
        .filter(|m| m.airline == airline)
        .cloned()
        .collect();
    rows.sort_by_key(|m| m.month);
    rows
}

/// Earliest and latest month of a series, or `None` when it is empty.
pub fn date_bounds(series: &[MonthlyTotal]) -> Option<(NaiveDate, NaiveDate)> {
    let min = series.iter().map(|m| m.month).min()?;
    let max = series.iter().map(|m| m.month).max()?;
    Some((min, max))
}

/// Rows of `airline` with `lo <= month <= hi`, oldest first.
pub fn filter_range(
    monthly: &[MonthlyTotal],
    airline: &str,
    lo: NaiveDate,
    hi: NaiveDate,
) -> Vec<MonthlyTotal> {
    airline_series(monthly, airline)
        .into_iter()
        .filter(|m| lo <= m.month && m.month <= hi)
        .collect()
}

/// Passenger totals per GEO Summary category over all raw records, largest
/// first. Records without a category are left out.
pub fn geo_split(data: &[PassengerRecord]) -> Vec<GeoShare> {
    let mut map: HashMap<&str, u64> = HashMap::new();
    for r in data {
        if let Some(geo) = r.geo_summary.as_deref() {
            let total = map.entry(geo).or_insert(0);
            *total = total.saturating_add(r.passenger_count);
        }
    }
    let total = map.values().fold(0u64, |acc, v| acc.saturating_add(*v));

    let mut rows: Vec<GeoShare> = map
        .into_iter()
        .map(|(category, passengers)| GeoShare {
            category: category.to_string(),
            passengers,
            share_pct: if total == 0 {
                0.0
            } else {
                passengers as f64 / total as f64 * 100.0
            },
        })
        .collect();
    rows.sort_by(|a, b| match b.passengers.cmp(&a.passengers) {
        Ordering::Equal => a.category.cmp(&b.category),
        other => other,
    });
    rows
}

pub fn generate_summary(data: &[PassengerRecord], monthly: &[MonthlyTotal]) -> SummaryStats {
    SummaryStats {
        total_passengers: data
            .iter()
            .fold(0u64, |acc, r| acc.saturating_add(r.passenger_count)),
        first_date: data.iter().map(|r| r.date).min(),
        last_date: data.iter().map(|r| r.date).max(),
        total_airlines: airlines(monthly).len(),
        monthly_rows: monthly.len(),
    }
}
