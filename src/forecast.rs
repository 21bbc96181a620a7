use crate::error::ForecastError;
use crate::types::{ForecastPoint, MonthlyTotal, SeasonalComponents, SeriesPoint};
use tracing::{info, instrument, warn};

/// A time-series model that can be fitted on monthly history and asked for
/// future periods.
pub trait Forecaster {
    /// Fit on points ordered by strictly increasing timestamp.
    fn fit(&mut self, series: &[SeriesPoint]) -> Result<(), ForecastError>;

    /// Predictions aligned to month start. Implementations may include
    /// fitted values for historical months ahead of the `horizon` future
    /// ones.
    fn predict(&self, horizon: usize) -> Result<Vec<ForecastPoint>, ForecastError>;

    fn components(&self) -> Option<SeasonalComponents> {
        None
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForecastSettings {
    /// Number of future months to predict.
    pub horizon: usize,
    /// Fewest monthly points for which a forecast is attempted.
    pub min_history: usize,
}

impl Default for ForecastSettings {
    fn default() -> Self {
        Self {
            horizon: 6,
            min_history: 24,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForecastResult {
    pub points: Vec<ForecastPoint>,
    pub components: Option<SeasonalComponents>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ForecastOutcome {
    /// Not enough monthly history; the model was not run.
    InsufficientData { required: usize, actual: usize },
    /// The model failed to fit or predict.
    Unavailable { reason: String },
    Ready(ForecastResult),
}

/// Forecast the next `settings.horizon` months of an airline's monthly
/// series.
///
/// `series` should be the airline's full history, not a date-range slice.
/// Only predictions strictly after the last historical month are returned.
#[instrument(skip_all, fields(months = series.len(), horizon = settings.horizon))]
pub fn forecast_airline(
    series: &[MonthlyTotal],
    settings: &ForecastSettings,
    forecaster: &mut dyn Forecaster,
) -> ForecastOutcome {
    if series.is_empty() || series.len() < settings.min_history {
        info!(required = settings.min_history, "not enough history to forecast");
        return ForecastOutcome::InsufficientData {
            required: settings.min_history.max(1),
            actual: series.len(),
        };
    }

    let mut points: Vec<SeriesPoint> = series
        .iter()
        .map(|m| SeriesPoint {
            timestamp: m.month,
            value: m.passengers as f64,
        })
        .collect();
    points.sort_by_key(|p| p.timestamp);

    match run_forecast(&points, settings.horizon, forecaster) {
        Ok(result) => ForecastOutcome::Ready(result),
        Err(e) => {
            warn!(error = %e, "forecast unavailable");
            ForecastOutcome::Unavailable {
                reason: e.to_string(),
            }
        }
    }
}

fn run_forecast(
    points: &[SeriesPoint],
    horizon: usize,
    forecaster: &mut dyn Forecaster,
) -> Result<ForecastResult, ForecastError> {
    let Some(last) = points.last().map(|p| p.timestamp) else {
        return Err(ForecastError::InsufficientData {
            required: 1,
            actual: 0,
        });
    };

    forecaster.fit(points)?;
    let future: Vec<ForecastPoint> = forecaster
        .predict(horizon)?
        .into_iter()
        .filter(|p| p.timestamp > last)
        .take(horizon)
        .collect();
    if future.len() < horizon {
        warn!(expected = horizon, got = future.len(), "model returned a short forecast");
    }

    Ok(ForecastResult {
        points: future,
        components: forecaster.components(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seasonal::SeasonalForecaster;
    use crate::util::add_months;
    use chrono::NaiveDate;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn series(airline: &str, start: NaiveDate, values: &[u64]) -> Vec<MonthlyTotal> {
        values
            .iter()
            .enumerate()
            .map(|(i, &passengers)| MonthlyTotal {
                airline: airline.to_string(),
                month: add_months(start, i as u32).unwrap(),
                passengers,
            })
            .collect()
    }

    /// Records calls and echoes the history back as fitted values, followed
    /// by a flat future.
    #[derive(Default)]
    struct EchoForecaster {
        fit_calls: usize,
        history: Vec<SeriesPoint>,
    }

    impl Forecaster for EchoForecaster {
        fn fit(&mut self, series: &[SeriesPoint]) -> Result<(), ForecastError> {
            self.fit_calls += 1;
            self.history = series.to_vec();
            Ok(())
        }

        fn predict(&self, horizon: usize) -> Result<Vec<ForecastPoint>, ForecastError> {
            let last = self.history.last().ok_or(ForecastError::NotFitted)?;
            let past = self.history.iter().map(|p| ForecastPoint {
                timestamp: p.timestamp,
                point: p.value,
                lower: p.value,
                upper: p.value,
            });
            let future = (1..=horizon).map(|h| ForecastPoint {
                timestamp: add_months(last.timestamp, h as u32).unwrap(),
                point: last.value,
                lower: last.value - 1.0,
                upper: last.value + 1.0,
            });
            Ok(past.chain(future).collect())
        }
    }

    struct FailingForecaster;

    impl Forecaster for FailingForecaster {
        fn fit(&mut self, _series: &[SeriesPoint]) -> Result<(), ForecastError> {
            Err(ForecastError::NonFinite("did not converge".to_string()))
        }

        fn predict(&self, _horizon: usize) -> Result<Vec<ForecastPoint>, ForecastError> {
            Err(ForecastError::NotFitted)
        }
    }

    #[test]
    fn short_history_skips_the_model() {
        let history = series("X", ymd(2020, 1, 1), &[10; 10]);
        let mut model = EchoForecaster::default();
        let outcome = forecast_airline(&history, &ForecastSettings::default(), &mut model);
        assert_eq!(
            outcome,
            ForecastOutcome::InsufficientData {
                required: 24,
                actual: 10
            }
        );
        assert_eq!(model.fit_calls, 0);
    }

    #[test]
    fn empty_history_is_insufficient() {
        let mut model = EchoForecaster::default();
        let settings = ForecastSettings {
            horizon: 6,
            min_history: 0,
        };
        let outcome = forecast_airline(&[], &settings, &mut model);
        assert!(matches!(outcome, ForecastOutcome::InsufficientData { actual: 0, .. }));
        assert_eq!(model.fit_calls, 0);
    }

    #[test]
    fn historical_fits_are_discarded() {
        let mut history = series("X", ymd(2019, 1, 1), &[5; 24]);
        history.reverse();
        let mut model = EchoForecaster::default();
        let outcome = forecast_airline(&history, &ForecastSettings::default(), &mut model);

        let result = match outcome {
            ForecastOutcome::Ready(result) => result,
            other => panic!("expected a forecast, got {other:?}"),
        };
        assert_eq!(model.fit_calls, 1);
        // Input was handed over in ascending order.
        assert!(model.history.windows(2).all(|w| w[0].timestamp < w[1].timestamp));
        assert_eq!(result.points.len(), 6);
        let last = ymd(2020, 12, 1);
        assert!(result.points.iter().all(|p| p.timestamp > last));
        assert_eq!(result.points[0].timestamp, ymd(2021, 1, 1));
    }

    #[test]
    fn model_failure_is_reported_not_raised() {
        let history = series("X", ymd(2019, 1, 1), &[5; 30]);
        let settings = ForecastSettings::default();
        let outcome = forecast_airline(&history, &settings, &mut FailingForecaster);
        match outcome {
            ForecastOutcome::Unavailable { reason } => assert!(reason.contains("did not converge")),
            other => panic!("expected Unavailable, got {other:?}"),
        }
    }

    #[test]
    fn thirty_months_forecast_six_more() {
        let values: Vec<u64> = (0..30).map(|i| 100 + 10 * i).collect();
        let history = series("X", ymd(2019, 1, 1), &values);
        let mut model = SeasonalForecaster::new(true, 0.8).unwrap();
        let outcome = forecast_airline(&history, &ForecastSettings::default(), &mut model);

        let result = match outcome {
            ForecastOutcome::Ready(result) => result,
            other => panic!("expected a forecast, got {other:?}"),
        };
        let stamps: Vec<NaiveDate> = result.points.iter().map(|p| p.timestamp).collect();
        assert_eq!(
            stamps,
            vec![
                ymd(2021, 7, 1),
                ymd(2021, 8, 1),
                ymd(2021, 9, 1),
                ymd(2021, 10, 1),
                ymd(2021, 11, 1),
                ymd(2021, 12, 1),
            ]
        );
        for p in &result.points {
            assert!(p.lower <= p.point && p.point <= p.upper);
        }
        assert!(result.components.is_some());
    }

    #[test]
    fn configurable_horizon_and_threshold() {
        let history = series("X", ymd(2020, 1, 1), &[7; 12]);
        let settings = ForecastSettings {
            horizon: 3,
            min_history: 12,
        };
        let mut model = EchoForecaster::default();
        let outcome = forecast_airline(&history, &settings, &mut model);
        let ForecastOutcome::Ready(result) = outcome else {
            panic!("expected a forecast");
        };
        assert_eq!(result.points.len(), 3);
        assert_eq!(result.points[2].timestamp, ymd(2021, 3, 1));
    }
}
