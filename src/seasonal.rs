//! Additive Holt-Winters with a calendar-aligned yearly season.
//!
//! Observations are placed on a contiguous monthly grid (gaps are linearly
//! interpolated) and seasonal slots are keyed by calendar month, so the
//! January offset always applies to January regardless of where the series
//! starts. Smoothing parameters are picked by grid search on the in-sample
//! one-step-ahead squared error; prediction intervals widen with
//! `sqrt(h)` from the one-step residual standard deviation.

use crate::error::ForecastError;
use crate::forecast::Forecaster;
use crate::types::{ForecastPoint, SeasonalComponents, SeriesPoint};
use crate::util::{add_months, month_start, months_between};
use chrono::{Datelike, NaiveDate};
use tracing::debug;

const PERIOD: usize = 12;

const ALPHAS: [f64; 9] = [0.1, 0.2, 0.3, 0.4, 0.5, 0.6, 0.7, 0.8, 0.9];
const BETAS: [f64; 5] = [0.01, 0.05, 0.1, 0.2, 0.3];
const GAMMAS: [f64; 6] = [0.05, 0.1, 0.2, 0.3, 0.5, 0.7];

#[derive(Debug, Clone)]
pub struct SeasonalForecaster {
    yearly_seasonality: bool,
    interval_width: f64,
    state: Option<FittedState>,
}

#[derive(Debug, Clone)]
struct FittedState {
    start: NaiveDate,
    level: f64,
    trend: f64,
    seasonal: [f64; PERIOD],
    fitted: Vec<f64>,
    residual_std: f64,
}

/// Result of one smoothing pass with fixed parameters.
struct Pass {
    sse: f64,
    level: f64,
    trend: f64,
    seasonal: [f64; PERIOD],
    fitted: Vec<f64>,
    scored: usize,
}

impl SeasonalForecaster {
    /// `interval_width` is the coverage of the prediction interval, e.g.
    /// `0.8` for an 80% band.
    pub fn new(yearly_seasonality: bool, interval_width: f64) -> Result<Self, ForecastError> {
        if !(0.0 < interval_width && interval_width < 1.0) {
            return Err(ForecastError::InvalidParameter {
                name: "interval_width".to_string(),
                reason: "must be between 0 and 1 (exclusive)".to_string(),
            });
        }
        Ok(Self {
            yearly_seasonality,
            interval_width,
            state: None,
        })
    }

    /// Two-sided standard normal quantile for the configured coverage.
    fn z_score(&self) -> f64 {
        normal_quantile(0.5 + self.interval_width / 2.0)
    }
}

/// Inverse of the standard normal CDF for `0 < p < 1`, using Acklam's
/// rational approximation (relative error below 1.2e-9).
fn normal_quantile(p: f64) -> f64 {
    const A: [f64; 6] = [
        -3.969683028665376e1,
        2.209460984245205e2,
        -2.759285104469687e2,
        1.383577518672690e2,
        -3.066479806614716e1,
        2.506628277459239,
    ];
    const B: [f64; 5] = [
        -5.447609879822406e1,
        1.615858368580409e2,
        -1.556989798598866e2,
        6.680131188771972e1,
        -1.328068155288572e1,
    ];
    const C: [f64; 6] = [
        -7.784894002430293e-3,
        -3.223964580411365e-1,
        -2.400758277161838,
        -2.549732539343734,
        4.374664141464968,
        2.938163982698783,
    ];
    const D: [f64; 4] = [
        7.784695709041462e-3,
        3.224671290700398e-1,
        2.445134137142996,
        3.754408661907416,
    ];
    const P_LOW: f64 = 0.02425;

    let tail = |q: f64| {
        (((((C[0] * q + C[1]) * q + C[2]) * q + C[3]) * q + C[4]) * q + C[5])
            / ((((D[0] * q + D[1]) * q + D[2]) * q + D[3]) * q + 1.0)
    };

    if p < P_LOW {
        tail((-2.0 * p.ln()).sqrt())
    } else if p <= 1.0 - P_LOW {
        let q = p - 0.5;
        let r = q * q;
        (((((A[0] * r + A[1]) * r + A[2]) * r + A[3]) * r + A[4]) * r + A[5]) * q
            / (((((B[0] * r + B[1]) * r + B[2]) * r + B[3]) * r + B[4]) * r + 1.0)
    } else {
        -tail((-2.0 * (1.0 - p).ln()).sqrt())
    }
}

fn season_of(start: NaiveDate, i: usize) -> usize {
    (start.month0() as usize + i) % PERIOD
}

/// Lay the series out on a gap-free monthly grid starting at the first
/// observation's month. Missing months are linearly interpolated.
fn to_monthly_grid(series: &[SeriesPoint]) -> Result<(NaiveDate, Vec<f64>), ForecastError> {
    let first = series.first().ok_or(ForecastError::InsufficientData {
        required: 1,
        actual: 0,
    })?;
    let start = month_start(first.timestamp);

    let mut known: Vec<(usize, f64)> = Vec::with_capacity(series.len());
    let mut prev: Option<i64> = None;
    for p in series {
        if !p.value.is_finite() {
            return Err(ForecastError::NonFinite(format!(
                "value at {} is not finite",
                p.timestamp
            )));
        }
        let idx = months_between(start, p.timestamp);
        match prev {
            Some(last) if idx == last => return Err(ForecastError::DuplicateTimestamp(p.timestamp)),
            Some(last) if idx < last => return Err(ForecastError::UnorderedTimestamps(p.timestamp)),
            _ => {}
        }
        prev = Some(idx);
        known.push((idx as usize, p.value));
    }

    let len = known.last().map(|(i, _)| i + 1).unwrap_or(0);
    let mut grid = vec![0.0; len];
    for pair in known.windows(2) {
        let (i0, v0) = pair[0];
        let (i1, v1) = pair[1];
        let span = (i1 - i0) as f64;
        for i in i0..i1 {
            grid[i] = v0 + (v1 - v0) * (i - i0) as f64 / span;
        }
    }
    if let Some(&(i, v)) = known.last() {
        grid[i] = v;
    }
    Ok((start, grid))
}

fn holt_winters_pass(start: NaiveDate, data: &[f64], alpha: f64, beta: f64, gamma: f64) -> Pass {
    let first_avg = data[..PERIOD].iter().sum::<f64>() / PERIOD as f64;
    let second_avg = data[PERIOD..2 * PERIOD].iter().sum::<f64>() / PERIOD as f64;

    let mut level = first_avg;
    let mut trend = (second_avg - first_avg) / PERIOD as f64;
    let mut seasonal = [0.0; PERIOD];
    let mut fitted = Vec::with_capacity(data.len());
    for (i, &y) in data.iter().enumerate().take(PERIOD) {
        seasonal[season_of(start, i)] = y - first_avg;
        fitted.push(y);
    }

    let mut sse = 0.0;
    for (i, &y) in data.iter().enumerate().skip(PERIOD) {
        let s = season_of(start, i);
        let prev_level = level;
        let prev_seasonal = seasonal[s];
        let one_step = level + trend + prev_seasonal;
        fitted.push(one_step);
        sse += (y - one_step).powi(2);

        level = alpha * (y - prev_seasonal) + (1.0 - alpha) * (level + trend);
        trend = beta * (level - prev_level) + (1.0 - beta) * trend;
        seasonal[s] = gamma * (y - level) + (1.0 - gamma) * prev_seasonal;
    }

    Pass {
        sse,
        level,
        trend,
        seasonal,
        fitted,
        scored: data.len() - PERIOD,
    }
}

fn holt_pass(data: &[f64], alpha: f64, beta: f64) -> Pass {
    let mut level = data[0];
    let mut trend = data[1] - data[0];
    let mut fitted = Vec::with_capacity(data.len());
    fitted.push(data[0]);

    let mut sse = 0.0;
    for &y in &data[1..] {
        let one_step = level + trend;
        fitted.push(one_step);
        sse += (y - one_step).powi(2);

        let prev_level = level;
        level = alpha * y + (1.0 - alpha) * (level + trend);
        trend = beta * (level - prev_level) + (1.0 - beta) * trend;
    }

    Pass {
        sse,
        level,
        trend,
        seasonal: [0.0; PERIOD],
        fitted,
        scored: data.len() - 1,
    }
}

impl Forecaster for SeasonalForecaster {
    fn fit(&mut self, series: &[SeriesPoint]) -> Result<(), ForecastError> {
        self.state = None;
        if series.len() < 3 {
            return Err(ForecastError::InsufficientData {
                required: 3,
                actual: series.len(),
            });
        }
        let (start, grid) = to_monthly_grid(series)?;

        // Two full cycles are needed to seed the seasonal offsets.
        let seasonal = self.yearly_seasonality && grid.len() >= 2 * PERIOD;
        if self.yearly_seasonality && !seasonal {
            debug!(months = grid.len(), "too short for yearly seasonality, fitting trend only");
        }

        let mut best: Option<(Pass, (f64, f64, f64))> = None;
        for &alpha in &ALPHAS {
            for &beta in &BETAS {
                let gammas: &[f64] = if seasonal { &GAMMAS } else { &[0.0] };
                for &gamma in gammas {
                    let pass = if seasonal {
                        holt_winters_pass(start, &grid, alpha, beta, gamma)
                    } else {
                        holt_pass(&grid, alpha, beta)
                    };
                    if !pass.sse.is_finite() {
                        continue;
                    }
                    if best.as_ref().map_or(true, |(b, _)| pass.sse < b.sse) {
                        best = Some((pass, (alpha, beta, gamma)));
                    }
                }
            }
        }

        let (pass, (alpha, beta, gamma)) = best.ok_or_else(|| {
            ForecastError::NonFinite("no parameter combination produced a finite fit".to_string())
        })?;
        let residual_std = (pass.sse / pass.scored.max(1) as f64).sqrt();
        if !(residual_std.is_finite() && pass.level.is_finite() && pass.trend.is_finite()) {
            return Err(ForecastError::NonFinite("fitted state diverged".to_string()));
        }
        debug!(alpha, beta, gamma, residual_std, months = grid.len(), "model fitted");

        self.state = Some(FittedState {
            start,
            level: pass.level,
            trend: pass.trend,
            seasonal: pass.seasonal,
            fitted: pass.fitted,
            residual_std,
        });
        Ok(())
    }

    /// Fitted values for every historical month followed by `horizon`
    /// future months.
    fn predict(&self, horizon: usize) -> Result<Vec<ForecastPoint>, ForecastError> {
        let state = self.state.as_ref().ok_or(ForecastError::NotFitted)?;
        let z = self.z_score();
        let n = state.fitted.len();
        let month_at = |i: usize| {
            add_months(state.start, i as u32)
                .ok_or_else(|| ForecastError::NonFinite(format!("month offset {i} out of range")))
        };

        let mut out = Vec::with_capacity(n + horizon);
        let band = z * state.residual_std;
        for (i, &point) in state.fitted.iter().enumerate() {
            out.push(ForecastPoint {
                timestamp: month_at(i)?,
                point,
                lower: point - band,
                upper: point + band,
            });
        }
        for h in 1..=horizon {
            let i = n - 1 + h;
            let seasonal = state.seasonal[season_of(state.start, i)];
            let point = state.level + h as f64 * state.trend + seasonal;
            let band = z * state.residual_std * (h as f64).sqrt();
            out.push(ForecastPoint {
                timestamp: month_at(i)?,
                point,
                lower: point - band,
                upper: point + band,
            });
        }
        Ok(out)
    }

    fn components(&self) -> Option<SeasonalComponents> {
        self.state.as_ref().map(|s| SeasonalComponents {
            level: s.level,
            trend: s.trend,
            yearly: s.seasonal,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn monthly(start: NaiveDate, values: &[f64]) -> Vec<SeriesPoint> {
        values
            .iter()
            .enumerate()
            .map(|(i, &value)| SeriesPoint {
                timestamp: add_months(start, i as u32).unwrap(),
                value,
            })
            .collect()
    }

    #[test]
    fn rejects_bad_interval_width() {
        assert!(SeasonalForecaster::new(true, 1.0).is_err());
        assert!(SeasonalForecaster::new(true, 0.0).is_err());
    }

    #[test]
    fn z_score_tracks_interval_width() {
        let z = |width| SeasonalForecaster::new(true, width).unwrap().z_score();
        assert!((z(0.80) - 1.2816).abs() < 1e-3);
        assert!((z(0.85) - 1.4395).abs() < 1e-3);
        assert!((z(0.89) - 1.5982).abs() < 1e-3);
        assert!((z(0.95) - 1.9600).abs() < 1e-3);
        assert!((z(0.99) - 2.5758).abs() < 1e-3);
        assert!((normal_quantile(0.001) + 3.0902).abs() < 1e-3);
        assert!((normal_quantile(0.5)).abs() < 1e-12);
    }

    #[test]
    fn predict_before_fit_fails() {
        let model = SeasonalForecaster::new(true, 0.8).unwrap();
        assert_eq!(model.predict(3), Err(ForecastError::NotFitted));
        assert!(model.components().is_none());
    }

    #[test]
    fn rejects_duplicate_and_unordered_timestamps() {
        let mut model = SeasonalForecaster::new(true, 0.8).unwrap();
        let mut series = monthly(ymd(2020, 1, 1), &[1.0, 2.0, 3.0, 4.0]);
        series[2].timestamp = ymd(2020, 2, 15);
        assert_eq!(
            model.fit(&series),
            Err(ForecastError::DuplicateTimestamp(ymd(2020, 2, 15)))
        );

        let mut series = monthly(ymd(2020, 1, 1), &[1.0, 2.0, 3.0, 4.0]);
        series.swap(1, 2);
        assert!(matches!(
            model.fit(&series),
            Err(ForecastError::UnorderedTimestamps(_))
        ));
    }

    #[test]
    fn rejects_non_finite_values() {
        let mut model = SeasonalForecaster::new(false, 0.8).unwrap();
        let series = monthly(ymd(2020, 1, 1), &[1.0, f64::NAN, 3.0]);
        assert!(matches!(model.fit(&series), Err(ForecastError::NonFinite(_))));
    }

    #[test]
    fn interpolates_missing_months() {
        let point = |timestamp, value| SeriesPoint { timestamp, value };
        let series = vec![
            point(ymd(2020, 1, 1), 10.0),
            point(ymd(2020, 4, 1), 40.0),
            point(ymd(2020, 5, 1), 50.0),
        ];
        let (start, grid) = to_monthly_grid(&series).unwrap();
        assert_eq!(start, ymd(2020, 1, 1));
        assert_eq!(grid, vec![10.0, 20.0, 30.0, 40.0, 50.0]);
    }

    #[test]
    fn linear_trend_is_extrapolated() {
        let values: Vec<f64> = (0..30).map(|i| 100.0 + 10.0 * i as f64).collect();
        let mut model = SeasonalForecaster::new(false, 0.8).unwrap();
        model.fit(&monthly(ymd(2019, 1, 1), &values)).unwrap();
        let out = model.predict(6).unwrap();
        assert_eq!(out.len(), 36);

        let future = &out[30..];
        assert_eq!(future[0].timestamp, ymd(2021, 7, 1));
        assert_eq!(future[5].timestamp, ymd(2021, 12, 1));
        assert!((future[0].point - 400.0).abs() < 1e-6);
        assert!((future[5].point - 450.0).abs() < 1e-6);
    }

    #[test]
    fn seasonal_pattern_carries_into_forecast() {
        // Peak in April, trough in October.
        let values: Vec<f64> = (0..48)
            .map(|i| 1000.0 + 200.0 * ((i as f64) * std::f64::consts::PI / 6.0).sin())
            .collect();
        let mut model = SeasonalForecaster::new(true, 0.8).unwrap();
        model.fit(&monthly(ymd(2018, 1, 1), &values)).unwrap();
        let future = &model.predict(12).unwrap()[48..];

        let april = future.iter().find(|p| p.timestamp.month() == 4).unwrap();
        let october = future.iter().find(|p| p.timestamp.month() == 10).unwrap();
        assert!(april.point > october.point + 200.0);

        let components = model.components().unwrap();
        assert!(components.yearly[3] > 0.0);
        assert!(components.yearly[9] < 0.0);
    }

    #[test]
    fn intervals_are_ordered_and_widen() {
        let values: Vec<f64> = (0..36)
            .map(|i| 500.0 + 5.0 * i as f64 + if i % 2 == 0 { 15.0 } else { -15.0 })
            .collect();
        let mut model = SeasonalForecaster::new(true, 0.8).unwrap();
        model.fit(&monthly(ymd(2019, 1, 1), &values)).unwrap();
        let out = model.predict(6).unwrap();
        for p in &out {
            assert!(p.lower <= p.point && p.point <= p.upper);
        }
        let first = &out[36];
        let last = &out[41];
        assert!(last.upper - last.lower >= first.upper - first.lower);
    }
}
