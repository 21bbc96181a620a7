use crate::error::Result;
use crate::types::{
    ForecastPoint, ForecastRow, GeoShare, GeoShareRow, MonthlyTotal, SeasonalComponents,
    SeasonalityRow, TrendRow,
};
use crate::util::{format_int, format_number, month_label};
use serde::Serialize;
use std::path::Path;
use tabled::{settings::Style, Table, Tabled};

const MONTH_NAMES: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

pub fn write_csv<T: Serialize, P: AsRef<Path>>(path: P, rows: &[T]) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    for r in rows {
        wtr.serialize(r)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_json<T: Serialize, P: AsRef<Path>>(path: P, value: &T) -> Result<()> {
    let s = serde_json::to_string_pretty(value)?;
    std::fs::write(path, s)?;
    Ok(())
}

/// Render at most `max_rows` rows as a markdown table.
pub fn render_rows<T>(rows: &[T], max_rows: usize) -> String
where
    T: Tabled + Clone,
{
    let slice: Vec<T> = rows.iter().take(max_rows).cloned().collect();
    if slice.is_empty() {
        return "(no rows)".to_string();
    }
    Table::new(slice).with(Style::markdown()).to_string()
}

pub fn preview_table_rows<T>(rows: &[T], max_rows: usize)
where
    T: Tabled + Clone,
{
    println!("{}\n", render_rows(rows, max_rows));
}

pub fn trend_rows(trend: &[MonthlyTotal]) -> Vec<TrendRow> {
    trend
        .iter()
        .map(|m| TrendRow {
            month: month_label(m.month),
            passengers: format_int(m.passengers),
        })
        .collect()
}

pub fn forecast_rows(points: &[ForecastPoint]) -> Vec<ForecastRow> {
    points
        .iter()
        .map(|p| ForecastRow {
            month: month_label(p.timestamp),
            point: format_number(p.point, 0),
            lower: format_number(p.lower, 0),
            upper: format_number(p.upper, 0),
        })
        .collect()
}

pub fn seasonality_rows(components: &SeasonalComponents) -> Vec<SeasonalityRow> {
    MONTH_NAMES
        .iter()
        .zip(components.yearly.iter())
        .map(|(name, effect)| SeasonalityRow {
            month: name.to_string(),
            effect: format_number(*effect, 0),
        })
        .collect()
}

pub fn geo_rows(split: &[GeoShare]) -> Vec<GeoShareRow> {
    split
        .iter()
        .map(|g| GeoShareRow {
            category: g.category.clone(),
            passengers: format_int(g.passengers),
            share: format!("{}%", format_number(g.share_pct, 1)),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn renders_empty_state() {
        let rows: Vec<TrendRow> = Vec::new();
        assert_eq!(render_rows(&rows, 10), "(no rows)");
    }

    #[test]
    fn renders_markdown_preview() {
        let rows = trend_rows(&[
            MonthlyTotal {
                airline: "X".into(),
                month: ymd(2021, 6, 1),
                passengers: 1234567,
            },
            MonthlyTotal {
                airline: "X".into(),
                month: ymd(2021, 7, 1),
                passengers: 42,
            },
        ]);
        let table = render_rows(&rows, 1);
        assert!(table.contains("| Month"));
        assert!(table.contains("2021-06"));
        assert!(table.contains("1,234,567"));
        assert!(!table.contains("2021-07"));
    }

    #[test]
    fn formats_geo_shares() {
        let rows = geo_rows(&[GeoShare {
            category: "Domestic".into(),
            passengers: 7500,
            share_pct: 75.0,
        }]);
        assert_eq!(rows[0].passengers, "7,500");
        assert_eq!(rows[0].share, "75.0%");
    }

    #[test]
    fn exports_csv_and_json() {
        let dir = tempfile::tempdir().unwrap();
        let csv_path = dir.path().join("forecast.csv");
        let points = [ForecastPoint {
            timestamp: ymd(2021, 7, 1),
            point: 10.0,
            lower: 8.0,
            upper: 12.0,
        }];
        write_csv(&csv_path, &points).unwrap();
        let written = std::fs::read_to_string(&csv_path).unwrap();
        assert!(written.starts_with("timestamp,point,lower,upper"));
        assert!(written.contains("2021-07-01,10.0,8.0,12.0"));

        let json_path = dir.path().join("points.json");
        write_json(&json_path, &points).unwrap();
        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&json_path).unwrap()).unwrap();
        assert_eq!(json[0]["timestamp"], "2021-07-01");
    }
}
