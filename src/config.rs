use crate::forecast::ForecastSettings;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::warn;

pub const DEFAULT_CSV: &str = "Air_Traffic_Passenger_Statistics.csv";

/// Runtime settings, read from the environment (and a `.env` file if present).
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub csv_path: PathBuf,
    pub output_dir: PathBuf,
    pub forecast: ForecastSettings,
    pub interval_width: f64,
    pub yearly_seasonality: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            csv_path: PathBuf::from(DEFAULT_CSV),
            output_dir: PathBuf::from("."),
            forecast: ForecastSettings::default(),
            interval_width: 0.8,
            yearly_seasonality: true,
        }
    }
}

impl Settings {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from any key lookup; unset keys keep their defaults and
    /// unparseable values are logged and ignored.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let interval_width = parse_or("FORECAST_INTERVAL_WIDTH", &lookup, defaults.interval_width);
        Self {
            csv_path: lookup("PASSENGER_CSV").map(PathBuf::from).unwrap_or(defaults.csv_path),
            output_dir: lookup("OUTPUT_DIR").map(PathBuf::from).unwrap_or(defaults.output_dir),
            forecast: ForecastSettings {
                horizon: parse_or("FORECAST_HORIZON", &lookup, defaults.forecast.horizon),
                min_history: parse_or(
                    "FORECAST_MIN_HISTORY",
                    &lookup,
                    defaults.forecast.min_history,
                ),
            },
            interval_width: if 0.0 < interval_width && interval_width < 1.0 {
                interval_width
            } else {
                warn!(interval_width, "FORECAST_INTERVAL_WIDTH out of range, using default");
                defaults.interval_width
            },
            yearly_seasonality: parse_or(
                "FORECAST_YEARLY_SEASONALITY",
                &lookup,
                defaults.yearly_seasonality,
            ),
        }
    }
}

fn parse_or<T, F>(key: &str, lookup: &F, default: T) -> T
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => default,
        Some(raw) => match raw.trim().parse() {
            Ok(v) => v,
            Err(_) => {
                warn!(key, value = %raw, "invalid setting, using default");
                default
            }
        },
    }
}
