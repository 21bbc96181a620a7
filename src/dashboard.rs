use crate::error::Result;
use crate::forecast::{forecast_airline, ForecastOutcome, ForecastSettings, Forecaster};
use crate::loader::{self, LoadReport};
use crate::reports;
use crate::types::{GeoShare, MonthlyTotal, PassengerRecord, SummaryStats};
use chrono::NaiveDate;
use std::path::Path;
use tracing::{info, instrument};

/// Everything derived from one load of the source file. Never mutated;
/// a reload builds a new one.
#[derive(Debug, Clone)]
pub struct Dataset {
    records: Vec<PassengerRecord>,
    monthly: Vec<MonthlyTotal>,
    airlines: Vec<String>,
    report: LoadReport,
}

impl Dataset {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let (records, report) = loader::load_and_clean(path)?;
        Ok(Self::from_records(records, report))
    }

    pub fn from_records(records: Vec<PassengerRecord>, report: LoadReport) -> Self {
        let monthly = reports::aggregate_monthly(&records);
        let airlines = reports::airlines(&monthly);
        info!(airlines = airlines.len(), months = monthly.len(), "dataset ready");
        Self {
            records,
            monthly,
            airlines,
            report,
        }
    }

    pub fn records(&self) -> &[PassengerRecord] {
        &self.records
    }

    pub fn monthly(&self) -> &[MonthlyTotal] {
        &self.monthly
    }

    pub fn airlines(&self) -> &[String] {
        &self.airlines
    }

    pub fn load_report(&self) -> &LoadReport {
        &self.report
    }
}

/// What the operator has picked. A `None` range means the airline's full
/// history.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub airline: String,
    pub range: Option<(NaiveDate, NaiveDate)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AirlineView {
    pub airline: String,
    /// First and last month on record for the airline.
    pub bounds: Option<(NaiveDate, NaiveDate)>,
    /// Monthly totals inside the selected range.
    pub trend: Vec<MonthlyTotal>,
    /// Forecast from the full history, independent of the range.
    pub forecast: ForecastOutcome,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Overview {
    pub geo_split: Vec<GeoShare>,
    pub summary: SummaryStats,
}

#[instrument(skip(dataset, settings, forecaster), fields(airline = %selection.airline))]
pub fn airline_view(
    dataset: &Dataset,
    selection: &Selection,
    settings: &ForecastSettings,
    forecaster: &mut dyn Forecaster,
) -> AirlineView {
    let history = reports::airline_series(dataset.monthly(), &selection.airline);
    let bounds = reports::date_bounds(&history);

    let trend = match selection.range.or(bounds) {
        Some((lo, hi)) => reports::filter_range(dataset.monthly(), &selection.airline, lo, hi),
        None => Vec::new(),
    };
    let forecast = forecast_airline(&history, settings, forecaster);

    AirlineView {
        airline: selection.airline.clone(),
        bounds,
        trend,
        forecast,
    }
}

pub fn overview(dataset: &Dataset) -> Overview {
    Overview {
        geo_split: reports::geo_split(dataset.records()),
        summary: reports::generate_summary(dataset.records(), dataset.monthly()),
    }
}
