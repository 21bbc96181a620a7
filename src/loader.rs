use crate::error::{DashboardError, Result};
use crate::types::{PassengerRecord, RawRow, REQUIRED_COLUMNS};
use crate::util::{non_blank, parse_count_safe, parse_date_safe};
use csv::{ReaderBuilder, Trim};
use std::collections::BTreeMap;
use std::fmt;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info, instrument, warn};

/// Why a row was left out of the dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RejectReason {
    MalformedRow,
    MissingDate,
    UnparseableDate,
    MissingPassengerCount,
    InvalidPassengerCount,
    MissingAirline,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RejectReason::MalformedRow => "malformed row",
            RejectReason::MissingDate => "missing date",
            RejectReason::UnparseableDate => "unparseable date",
            RejectReason::MissingPassengerCount => "missing passenger count",
            RejectReason::InvalidPassengerCount => "invalid passenger count",
            RejectReason::MissingAirline => "missing operating airline",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadReport {
    pub total_rows: usize,
    pub accepted_rows: usize,
    pub rejected: BTreeMap<RejectReason, usize>,
}

impl LoadReport {
    pub fn rejected_rows(&self) -> usize {
        self.rejected.values().sum()
    }

    fn reject(&mut self, line: usize, reason: RejectReason) {
        debug!(line, %reason, "row rejected");
        *self.rejected.entry(reason).or_insert(0) += 1;
    }
}

/// Load and validate the passenger statistics CSV at `path`.
///
/// A missing or unreadable file is an error; bad rows are not. Those are
/// dropped and tallied in the returned [`LoadReport`].
#[instrument(skip_all, fields(path = %path.as_ref().display()))]
pub fn load_and_clean<P: AsRef<Path>>(path: P) -> Result<(Vec<PassengerRecord>, LoadReport)> {
    let file = std::fs::File::open(path.as_ref())?;
    load_from_reader(file)
}

pub fn load_from_reader<R: Read>(reader: R) -> Result<(Vec<PassengerRecord>, LoadReport)> {
    let mut rdr = ReaderBuilder::new()
        .flexible(true)
        .trim(Trim::Headers)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    for col in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h.trim() == col) {
            return Err(DashboardError::MissingColumn(col.to_string()));
        }
    }

    let mut report = LoadReport::default();
    let mut records = Vec::new();

    for (idx, result) in rdr.deserialize::<RawRow>().enumerate() {
        // Header is line 1.
        let line = idx + 2;
        report.total_rows += 1;
        let row = match result {
            Ok(r) => r,
            Err(_) => {
                report.reject(line, RejectReason::MalformedRow);
                continue;
            }
        };

        let date = match non_blank(row.activity_period_start.as_deref()) {
            None => {
                report.reject(line, RejectReason::MissingDate);
                continue;
            }
            Some(s) => match parse_date_safe(s) {
                Some(d) => d,
                None => {
                    report.reject(line, RejectReason::UnparseableDate);
                    continue;
                }
            },
        };

        let passenger_count = match non_blank(row.passenger_count.as_deref()) {
            None => {
                report.reject(line, RejectReason::MissingPassengerCount);
                continue;
            }
            Some(s) => match parse_count_safe(s) {
                Some(v) => v,
                None => {
                    report.reject(line, RejectReason::InvalidPassengerCount);
                    continue;
                }
            },
        };

        let Some(operating_airline) = non_blank(row.operating_airline.as_deref()) else {
            report.reject(line, RejectReason::MissingAirline);
            continue;
        };

        records.push(PassengerRecord {
            date,
            operating_airline: operating_airline.to_string(),
            passenger_count,
            geo_summary: non_blank(row.geo_summary.as_deref()).map(str::to_string),
        });
    }

    report.accepted_rows = records.len();
    if report.rejected_rows() > 0 {
        warn!(
            rejected = report.rejected_rows(),
            total = report.total_rows,
            reasons = ?report.rejected,
            "rows dropped during validation"
        );
    }
    info!(accepted = report.accepted_rows, total = report.total_rows, "dataset loaded");
    Ok((records, report))
}
