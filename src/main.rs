use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use axum_prometheus::PrometheusMetricLayer;
use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand};
use metrics_exporter_prometheus::PrometheusHandle;
use mietcheck::config::AppConfig;
use mietcheck::error::AppError;
use mietcheck::rentcap::domain::{RentCapInput, RentCapResult};
use mietcheck::rentcap::{evaluate, RegionTable, RegionTableImporter};
use mietcheck::telemetry;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
struct AppState {
    readiness: Arc<AtomicBool>,
    metrics: Arc<PrometheusHandle>,
}

#[derive(Parser, Debug)]
#[command(
    name = "Mietcheck",
    about = "Run the Mietpreisbremse check service or a one-off rent cap check",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Run a single rent cap check and print the report
    Check(CheckArgs),
}

#[derive(Args, Debug, Default)]
struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    port: Option<u16>,
}

#[derive(Args, Debug)]
struct CheckArgs {
    /// Postal code of the unit (five digits)
    #[arg(long)]
    postal_code: String,
    /// City name, echoed into the report
    #[arg(long, default_value = "")]
    city: String,
    /// Monthly net cold rent in EUR
    #[arg(long)]
    cold_rent: f64,
    /// Living area in square metres
    #[arg(long)]
    living_area: f64,
    /// Construction year of the building
    #[arg(long, default_value_t = 2000)]
    construction_year: i32,
    /// The unit was first occupied after 2014-10-01
    #[arg(long)]
    first_occupancy_after_2014: bool,
    /// The unit was comprehensively modernised before the tenancy
    #[arg(long)]
    comprehensively_modernised: bool,
    /// The prior tenant's rent in EUR, when known
    #[arg(long)]
    prior_rent: Option<f64>,
    /// Tenancy start date (YYYY-MM-DD), bounds the refund window
    #[arg(long, value_parser = parse_date)]
    tenancy_start: Option<NaiveDate>,
    /// Evaluation date for the check (defaults to today)
    #[arg(long, value_parser = parse_date)]
    today: Option<NaiveDate>,
    /// CSV file overriding the built-in region table
    #[arg(long)]
    region_table: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
struct RentCapCheckRequest {
    postal_code: String,
    #[serde(default)]
    city: String,
    #[serde(default)]
    cold_rent: f64,
    #[serde(default)]
    living_area: f64,
    #[serde(default)]
    construction_year: Option<i32>,
    #[serde(default)]
    first_occupancy_after_2014: bool,
    #[serde(default)]
    comprehensively_modernised: bool,
    #[serde(default)]
    prior_rent_known: bool,
    #[serde(default)]
    prior_rent: f64,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    tenancy_start: Option<NaiveDate>,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    today: Option<NaiveDate>,
}

impl RentCapCheckRequest {
    fn into_parts(self) -> (RentCapInput, Option<NaiveDate>) {
        let defaults = RentCapInput::default();
        let input = RentCapInput {
            postal_code: self.postal_code,
            city: self.city,
            cold_rent: self.cold_rent,
            living_area: self.living_area,
            construction_year: self
                .construction_year
                .unwrap_or(defaults.construction_year),
            first_occupancy_after_2014: self.first_occupancy_after_2014,
            comprehensively_modernised: self.comprehensively_modernised,
            prior_rent_known: self.prior_rent_known,
            prior_rent: self.prior_rent,
            tenancy_start: self.tenancy_start,
        };

        (input, self.today)
    }
}

#[derive(Debug, Serialize)]
struct RentCapCheckResponse {
    status: CheckStatus,
    today: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<RentCapResult>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum CheckStatus {
    Complete,
    Incomplete,
}

#[tokio::main]
async fn main() {
    if let Err(err) = run_cli().await {
        eprintln!("application error: {err}");
        std::process::exit(1);
    }
}

async fn run_cli() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => run_server(args).await,
        Command::Check(args) => run_check(args),
    }
}

fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

fn deserialize_optional_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    opt.map(|value| parse_date(&value).map_err(serde::de::Error::custom))
        .transpose()
}

fn load_region_table(path: Option<&PathBuf>) -> Result<RegionTable, AppError> {
    match path {
        Some(path) => {
            info!(path = %path.display(), "loading region table override");
            Ok(RegionTableImporter::from_path(path)?)
        }
        None => Ok(RegionTable::standard()),
    }
}

async fn run_server(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let regions = Arc::new(load_region_table(config.regions.table_path.as_ref())?);
    info!(postal_codes = regions.len(), "region table loaded");

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let app = Router::new()
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .route("/api/v1/rentcap/check", post(rentcap_check_endpoint))
        .layer(Extension(state))
        .layer(prometheus_layer)
        .with_state(regions);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "rent cap check service ready");

    axum::serve(listener, app).await?;
    Ok(())
}

fn run_check(args: CheckArgs) -> Result<(), AppError> {
    let CheckArgs {
        postal_code,
        city,
        cold_rent,
        living_area,
        construction_year,
        first_occupancy_after_2014,
        comprehensively_modernised,
        prior_rent,
        tenancy_start,
        today,
        region_table,
    } = args;

    let regions = load_region_table(region_table.as_ref())?;
    let today = today.unwrap_or_else(|| Local::now().date_naive());
    let input = RentCapInput {
        postal_code,
        city,
        cold_rent,
        living_area,
        construction_year,
        first_occupancy_after_2014,
        comprehensively_modernised,
        prior_rent_known: prior_rent.is_some(),
        prior_rent: prior_rent.unwrap_or(0.0),
        tenancy_start,
    };

    match evaluate(&input, &regions, today) {
        Some(result) => render_check_report(&result, today),
        None => {
            println!("Insufficient data: postal code, cold rent, and living area are required.")
        }
    }

    Ok(())
}

async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

async fn rentcap_check_endpoint(
    State(regions): State<Arc<RegionTable>>,
    Json(payload): Json<RentCapCheckRequest>,
) -> Json<RentCapCheckResponse> {
    let (input, today) = payload.into_parts();
    let today = today.unwrap_or_else(|| Local::now().date_naive());
    let result = evaluate(&input, &regions, today);

    let status = if result.is_some() {
        CheckStatus::Complete
    } else {
        CheckStatus::Incomplete
    };

    Json(RentCapCheckResponse {
        status,
        today,
        result,
    })
}

fn render_check_report(result: &RentCapResult, today: NaiveDate) {
    let location = if result.city.is_empty() {
        result.postal_code.clone()
    } else {
        format!("{} {}", result.postal_code, result.city)
    };
    println!("Rent cap check for {location} (evaluated {today})");

    match result.cap_valid_until {
        Some(until) if result.in_capped_region => {
            println!("Region status: designated capped area (ordinance valid until {until})");
        }
        _ => println!("Region status: no rent cap designation"),
    }

    if result.exemptions.is_empty() {
        println!("\nExemptions: none");
    } else {
        println!("\nExemptions");
        for exemption in &result.exemptions {
            println!("- {}: {}", exemption.kind.label(), exemption.detail);
        }
    }

    println!("\nFigures");
    println!(
        "- Rent: {:.2} EUR/m2 (local comparison rent {:.2} EUR/m2)",
        result.rent_per_sqm, result.comparison_rent_per_sqm
    );
    println!(
        "- Maximum legal rent: {:.2} EUR/m2, {:.2} EUR/month",
        result.max_legal_rent_per_sqm, result.max_legal_rent
    );
    println!(
        "- Overage: {:.2} EUR/month ({:.1}% above comparison rent)",
        result.overage, result.overage_percent
    );

    if result.overcharged {
        println!("\nRefund claim");
        println!("- Eligible months: {} (statutory cap 30)", result.refund_months);
        println!("- Total claim: {:.2} EUR", result.refund_total);
    }

    println!("\nRecommendation: {}", result.recommendation.label());
}
