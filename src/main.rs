// Entry point and high-level CLI flow.
//
// - Option [1] loads and validates the passenger CSV, printing diagnostics.
// - Option [2] picks an airline and date range, then shows the monthly
//   trend and a forecast built from the airline's full history.
// - Option [3] shows the domestic/international split and summary stats.
// Each option works on the dataset from the latest successful load.
mod config;
mod dashboard;
mod error;
mod forecast;
mod loader;
mod output;
mod reports;
mod seasonal;
mod types;
mod util;

use chrono::NaiveDate;
use config::Settings;
use dashboard::{Dataset, Selection};
use forecast::ForecastOutcome;
use seasonal::SeasonalForecaster;
use std::io::{self, Write};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Print `prompt` and read one trimmed line from stdin.
fn read_line(prompt: &str) -> String {
    print!("{prompt}");
    let _ = io::stdout().flush();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).ok();
    buf.trim().to_string()
}

fn read_choice() -> String {
    read_line("Enter choice: ")
}

/// Returns `true` if the user chose `Y`, `false` if they chose `N`.
fn prompt_back_to_menu() -> bool {
    loop {
        match read_line("Back to Report Selection (Y/N): ").to_uppercase().as_str() {
            "Y" => return true,
            "N" => return false,
            _ => println!("Invalid choice. Please enter Y or N."),
        }
    }
}

/// Handle option [1]: load and validate the CSV file.
fn handle_load(settings: &Settings) -> Option<Dataset> {
    match Dataset::load(&settings.csv_path) {
        Ok(dataset) => {
            let report = dataset.load_report();
            println!(
                "Processing dataset... ({} rows read, {} accepted)",
                util::format_int(report.total_rows),
                util::format_int(report.accepted_rows)
            );
            if report.rejected_rows() > 0 {
                println!(
                    "Note: {} rows skipped due to validation errors:",
                    util::format_int(report.rejected_rows())
                );
                for (reason, count) in &report.rejected {
                    println!("  - {}: {}", reason, util::format_int(*count));
                }
            }
            println!(
                "{} airlines, {} airline-months.\n",
                util::format_int(dataset.airlines().len()),
                util::format_int(dataset.monthly().len())
            );
            Some(dataset)
        }
        Err(e) => {
            error!(error = %e, path = %settings.csv_path.display(), "load failed");
            eprintln!("Failed to load file: {}\n", e);
            None
        }
    }
}

/// Resolve operator input (a list number or an exact name) to an airline.
fn pick_airline(dataset: &Dataset) -> Option<String> {
    println!("Airlines:");
    for (i, name) in dataset.airlines().iter().enumerate() {
        println!("  [{}] {}", i + 1, name);
    }
    let input = read_line("Select airline (number or name): ");
    if let Ok(n) = input.parse::<usize>() {
        return n.checked_sub(1).and_then(|i| dataset.airlines().get(i)).cloned();
    }
    dataset
        .airlines()
        .iter()
        .find(|a| a.eq_ignore_ascii_case(&input))
        .cloned()
}

/// Ask for a month range inside `bounds`; blank answers keep the bound.
fn pick_range(bounds: (NaiveDate, NaiveDate)) -> (NaiveDate, NaiveDate) {
    let (min, max) = bounds;
    println!(
        "Data available {} to {}.",
        util::month_label(min),
        util::month_label(max)
    );
    let ask = |label: &str, default: NaiveDate| loop {
        let prompt = format!(
            "{label} month (YYYY-MM, blank for {}): ",
            util::month_label(default)
        );
        let input = read_line(&prompt);
        if input.is_empty() {
            return default;
        }
        match util::parse_month_input(&input) {
            Some(d) => return d.clamp(min, max),
            None => println!("Invalid month. Please use YYYY-MM."),
        }
    };
    let lo = ask("Start", min);
    let hi = ask("End", max);
    (lo, hi)
}

fn export<T: serde::Serialize>(settings: &Settings, file: &str, rows: &[T]) {
    let path = settings.output_dir.join(file);
    match output::write_csv(&path, rows) {
        Ok(()) => println!("(Full table exported to {})\n", path.display()),
        Err(e) => eprintln!("Write error: {}", e),
    }
}

/// Handle option [2]: airline trend and forecast.
fn handle_airline(dataset: &Dataset, settings: &Settings) {
    let Some(airline) = pick_airline(dataset) else {
        println!("Unknown airline.\n");
        return;
    };
    let bounds = reports::date_bounds(&reports::airline_series(dataset.monthly(), &airline));
    let selection = Selection {
        range: bounds.map(pick_range),
        airline,
    };

    let model = SeasonalForecaster::new(settings.yearly_seasonality, settings.interval_width);
    let mut model = match model {
        Ok(m) => m,
        Err(e) => {
            eprintln!("Forecast model misconfigured: {}\n", e);
            return;
        }
    };
    let view = dashboard::airline_view(dataset, &selection, &settings.forecast, &mut model);

    println!("\nMonthly Passenger Count for {}\n", view.airline);
    output::preview_table_rows(&output::trend_rows(&view.trend), 24);
    export(settings, "monthly_trend.csv", &view.trend);

    println!("Forecast: Next {} Months Passenger Count\n", settings.forecast.horizon);
    match &view.forecast {
        ForecastOutcome::InsufficientData { required, actual } => {
            println!(
                "Not enough data to generate a reliable forecast ({} of {} months).\n",
                actual, required
            );
        }
        ForecastOutcome::Unavailable { reason } => {
            println!("Forecast unavailable: {}\n", reason);
        }
        ForecastOutcome::Ready(result) => {
            let rows = output::forecast_rows(&result.points);
            output::preview_table_rows(&rows, rows.len());
            export(settings, "forecast.csv", &result.points);
            if let Some(components) = &result.components {
                println!(
                    "Seasonality components (level {}, trend {}/month)\n",
                    util::format_number(components.level, 0),
                    util::format_number(components.trend, 1)
                );
                output::preview_table_rows(&output::seasonality_rows(components), 12);
            }
        }
    }
}

/// Handle option [3]: traffic split and summary stats.
fn handle_overview(dataset: &Dataset, settings: &Settings) {
    let overview = dashboard::overview(dataset);

    println!("Domestic vs International Traffic Split\n");
    output::preview_table_rows(&output::geo_rows(&overview.geo_split), 10);
    export(settings, "traffic_split.csv", &overview.geo_split);

    let summary = &overview.summary;
    println!("Summary Stats (summary.json):");
    println!("Total Passengers: {}", util::format_int(summary.total_passengers));
    match (summary.first_date, summary.last_date) {
        (Some(first), Some(last)) => println!("Data Range: {} → {}\n", first, last),
        _ => println!("Data Range: (empty)\n"),
    }
    if let Err(e) = output::write_json(settings.output_dir.join("summary.json"), summary) {
        eprintln!("Write error: {}", e);
    }
}

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "passenger_dashboard=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let settings = Settings::from_env();
    info!(?settings, "passenger dashboard starting");

    let mut dataset: Option<Dataset> = None;
    loop {
        println!("Passenger Dashboard:");
        println!("[1] Load the file");
        println!("[2] Airline trend & forecast");
        println!("[3] Traffic split & summary\n");
        let choice = read_choice();
        match choice.as_str() {
            "1" => {
                if let Some(fresh) = handle_load(&settings) {
                    dataset = Some(fresh);
                }
            }
            "2" | "3" => {
                let Some(ds) = dataset.as_ref() else {
                    println!("Error: No data loaded. Please load the CSV file first (option 1).\n");
                    continue;
                };
                println!();
                if choice == "2" {
                    handle_airline(ds, &settings);
                } else {
                    handle_overview(ds, &settings);
                }
                if !prompt_back_to_menu() {
                    println!("Exiting the program.");
                    break;
                }
            }
            _ => {
                println!("Invalid choice. Please enter 1, 2 or 3.\n");
            }
        }
    }
}
