use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tabled::Tabled;

pub const COL_DATE: &str = "Activity Period Start Date";
pub const COL_PASSENGERS: &str = "Passenger Count";
pub const COL_AIRLINE: &str = "Operating Airline";
pub const COL_GEO: &str = "GEO Summary";

pub const REQUIRED_COLUMNS: [&str; 4] = [COL_DATE, COL_PASSENGERS, COL_AIRLINE, COL_GEO];

/// One CSV row as read from disk. Every field stays textual until the loader
/// validates it; extra columns in the file are ignored.
#[derive(Debug, Deserialize)]
pub struct RawRow {
    #[serde(rename = "Activity Period Start Date")]
    pub activity_period_start: Option<String>,
    #[serde(rename = "Passenger Count")]
    pub passenger_count: Option<String>,
    #[serde(rename = "Operating Airline")]
    pub operating_airline: Option<String>,
    #[serde(rename = "GEO Summary")]
    pub geo_summary: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PassengerRecord {
    pub date: NaiveDate,
    pub operating_airline: String,
    pub passenger_count: u64,
    pub geo_summary: Option<String>,
}

/// Passenger total for one airline in one calendar month. `month` is always
/// the first day of the month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyTotal {
    pub airline: String,
    pub month: NaiveDate,
    pub passengers: u64,
}

/// Input point handed to a forecaster.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeriesPoint {
    pub timestamp: NaiveDate,
    pub value: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ForecastPoint {
    pub timestamp: NaiveDate,
    pub point: f64,
    pub lower: f64,
    pub upper: f64,
}

/// Decomposition of a fitted seasonal model, for display only.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeasonalComponents {
    pub level: f64,
    pub trend: f64,
    /// Offsets indexed by calendar month, January first.
    pub yearly: [f64; 12],
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeoShare {
    pub category: String,
    pub passengers: u64,
    pub share_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryStats {
    pub total_passengers: u64,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
    pub total_airlines: usize,
    pub monthly_rows: usize,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct TrendRow {
    #[serde(rename = "Month")]
    #[tabled(rename = "Month")]
    pub month: String,
    #[serde(rename = "PassengerCount")]
    #[tabled(rename = "PassengerCount")]
    pub passengers: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct ForecastRow {
    #[serde(rename = "Month")]
    #[tabled(rename = "Month")]
    pub month: String,
    #[serde(rename = "Forecast")]
    #[tabled(rename = "Forecast")]
    pub point: String,
    #[serde(rename = "Lower")]
    #[tabled(rename = "Lower")]
    pub lower: String,
    #[serde(rename = "Upper")]
    #[tabled(rename = "Upper")]
    pub upper: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct SeasonalityRow {
    #[serde(rename = "Month")]
    #[tabled(rename = "Month")]
    pub month: String,
    #[serde(rename = "SeasonalEffect")]
    #[tabled(rename = "SeasonalEffect")]
    pub effect: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct GeoShareRow {
    #[serde(rename = "GeoSummary")]
    #[tabled(rename = "GeoSummary")]
    pub category: String,
    #[serde(rename = "PassengerCount")]
    #[tabled(rename = "PassengerCount")]
    pub passengers: String,
    #[serde(rename = "Share")]
    #[tabled(rename = "Share")]
    pub share: String,
}
