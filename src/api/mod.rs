mod render;

use std::any::Any;
use std::error::Error;
use std::net::SocketAddr;

use axum::{
    Router,
    extract::{
        Json, Query,
        rejection::{JsonRejection, QueryRejection},
    },
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use chrono::{Datelike, Local, Utc};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tower_http::{catch_panic::CatchPanicLayer, cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info, warn};

use crate::core::{
    GoalSolveConfig, GoalSolveResult, GoalType, Profile, ProjectionError, ProjectionInput,
    ProjectionResult, SavingsPolicy, project, solve_goal,
};

pub use render::{render_projection, render_solve};

const INDEX_HTML: &str = include_str!("../../web/index.html");
const APP_JS: &str = include_str!("../../web/app.js");

pub const MIN_CURRENT_AGE: u32 = 20;
pub const MAX_CURRENT_AGE: u32 = 70;
pub const MAX_RETIREMENT_AGE: u32 = 80;
pub const MAX_ANNUAL_INCOME: i64 = 100_000_000;
pub const MAX_INCOME_GROWTH_RATE: f64 = 30.0;
pub const MAX_CURRENT_SAVINGS: i64 = 10_000_000_000_000;
pub const MIN_START_YEAR: i32 = 1900;
pub const MAX_START_YEAR: i32 = 2200;

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CliGoalType {
    #[serde(alias = "savingsRate", alias = "savings_rate")]
    SavingsRate,
    Income,
}

impl From<CliGoalType> for GoalType {
    fn from(value: CliGoalType) -> Self {
        match value {
            CliGoalType::SavingsRate => GoalType::RequiredSavingsRate,
            CliGoalType::Income => GoalType::RequiredIncome,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "nestegg",
    about = "Year-by-year net worth projection under income tax, resident tax and social insurance"
)]
pub struct Cli {
    #[arg(long, global = true, help = "Emit logs as JSON lines")]
    pub log_json: bool,
    #[arg(long, global = true, env = "NESTEGG_LOG", default_value = "info")]
    pub log_level: String,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serve the HTTP API and browser form
    Serve {
        #[arg(long, env = "NESTEGG_PORT", default_value_t = 8080)]
        port: u16,
    },
    /// Print a year-by-year projection
    Project {
        #[command(flatten)]
        profile: ProfileArgs,
        #[arg(long, help = "Print the full result as JSON")]
        json: bool,
    },
    /// Find the savings rate or starting income needed to reach a target
    Solve {
        #[command(flatten)]
        profile: ProfileArgs,
        #[command(flatten)]
        goal: GoalArgs,
        #[arg(long, help = "Print the full result as JSON")]
        json: bool,
    },
}

#[derive(Args, Debug, Clone, PartialEq)]
pub struct ProfileArgs {
    #[arg(long, default_value_t = 30)]
    pub current_age: u32,
    #[arg(long, default_value_t = 65)]
    pub retirement_age: u32,
    #[arg(long, default_value_t = 5_000_000, help = "Gross annual income")]
    pub current_annual_income: i64,
    #[arg(
        long,
        default_value_t = 2.0,
        allow_hyphen_values = true,
        help = "Annual income growth in percent, e.g. 2"
    )]
    pub income_growth_rate: f64,
    #[arg(long, default_value_t = 1_000_000)]
    pub current_savings: i64,
    #[arg(long, default_value_t = 20.0, help = "Share of net income saved, in percent")]
    pub savings_rate: f64,
    #[arg(long, help = "Calendar year of the first simulated year; defaults to this year")]
    pub start_year: Option<i32>,
}

#[derive(Args, Debug, Clone, PartialEq)]
pub struct GoalArgs {
    #[arg(long, value_enum)]
    pub goal: CliGoalType,
    #[arg(long)]
    pub target_assets: i64,
    #[arg(long)]
    pub search_min: Option<f64>,
    #[arg(long)]
    pub search_max: Option<f64>,
    #[arg(long)]
    pub tolerance: Option<f64>,
    #[arg(long)]
    pub max_iterations: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct SimulatePayload {
    current_age: Option<u32>,
    retirement_age: Option<u32>,
    current_annual_income: Option<i64>,
    income_growth_rate: Option<f64>,
    current_savings: Option<i64>,
    savings_rate: Option<f64>,
    start_year: Option<i32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SolvePayload {
    #[serde(flatten)]
    profile: SimulatePayload,
    goal: CliGoalType,
    target_assets: i64,
    #[serde(default)]
    search_min: Option<f64>,
    #[serde(default)]
    search_max: Option<f64>,
    #[serde(default)]
    tolerance: Option<f64>,
    #[serde(default)]
    max_iterations: Option<u32>,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    timestamp: String,
}

pub fn default_profile_args() -> ProfileArgs {
    ProfileArgs {
        current_age: 30,
        retirement_age: 65,
        current_annual_income: 5_000_000,
        income_growth_rate: 2.0,
        current_savings: 1_000_000,
        savings_rate: 20.0,
        start_year: None,
    }
}

fn current_year() -> i32 {
    Local::now().year()
}

/// Range checks the engines leave to their caller.
pub fn build_input(args: ProfileArgs) -> Result<ProjectionInput, ProjectionError> {
    if !(MIN_CURRENT_AGE..=MAX_CURRENT_AGE).contains(&args.current_age) {
        return Err(ProjectionError::range(
            "currentAge",
            format!("must be between {MIN_CURRENT_AGE} and {MAX_CURRENT_AGE}"),
        ));
    }

    if args.retirement_age <= args.current_age {
        return Err(ProjectionError::InvalidPeriod {
            current_age: args.current_age,
            retirement_age: args.retirement_age,
        });
    }

    if args.retirement_age > MAX_RETIREMENT_AGE {
        return Err(ProjectionError::range(
            "retirementAge",
            format!("must be at most {MAX_RETIREMENT_AGE}"),
        ));
    }

    if args.current_annual_income <= 0 || args.current_annual_income > MAX_ANNUAL_INCOME {
        return Err(ProjectionError::range(
            "currentAnnualIncome",
            format!("must be between 1 and {MAX_ANNUAL_INCOME}"),
        ));
    }

    if !args.income_growth_rate.is_finite()
        || args.income_growth_rate <= -100.0
        || args.income_growth_rate > MAX_INCOME_GROWTH_RATE
    {
        return Err(ProjectionError::range(
            "incomeGrowthRate",
            format!("must be greater than -100 and at most {MAX_INCOME_GROWTH_RATE}"),
        ));
    }

    if !(0..=MAX_CURRENT_SAVINGS).contains(&args.current_savings) {
        return Err(ProjectionError::range(
            "currentSavings",
            format!("must be between 0 and {MAX_CURRENT_SAVINGS}"),
        ));
    }

    let start_year = args.start_year.unwrap_or_else(current_year);
    if !(MIN_START_YEAR..=MAX_START_YEAR).contains(&start_year) {
        return Err(ProjectionError::range(
            "startYear",
            format!("must be between {MIN_START_YEAR} and {MAX_START_YEAR}"),
        ));
    }

    if !args.savings_rate.is_finite() || !(0.0..=100.0).contains(&args.savings_rate) {
        return Err(ProjectionError::range(
            "savingsRate",
            "must be between 0 and 100",
        ));
    }

    Ok(ProjectionInput {
        profile: Profile {
            current_age: args.current_age,
            retirement_age: args.retirement_age,
            current_annual_income: args.current_annual_income,
            income_growth_rate: args.income_growth_rate,
            current_savings: args.current_savings,
        },
        savings: SavingsPolicy {
            savings_rate: args.savings_rate,
        },
        start_year,
    })
}

pub fn build_goal_config(args: &GoalArgs) -> Result<GoalSolveConfig, ProjectionError> {
    let mut config = match args.goal {
        CliGoalType::SavingsRate => GoalSolveConfig::savings_rate(args.target_assets),
        CliGoalType::Income => GoalSolveConfig::income(args.target_assets),
    };
    if let Some(v) = args.search_min {
        config.search_min = v;
    }
    if let Some(v) = args.search_max {
        config.search_max = v;
    }
    if let Some(v) = args.tolerance {
        config.tolerance = v;
    }
    if let Some(v) = args.max_iterations {
        config.max_iterations = v;
    }

    // A solved income must itself pass `build_input`.
    if args.goal == CliGoalType::Income && config.search_max > MAX_ANNUAL_INCOME as f64 {
        return Err(ProjectionError::range(
            "searchMax",
            format!("income search must stay at or below {MAX_ANNUAL_INCOME}"),
        ));
    }
    Ok(config)
}

fn profile_args_from_payload(payload: SimulatePayload) -> ProfileArgs {
    let mut args = default_profile_args();

    if let Some(v) = payload.current_age {
        args.current_age = v;
    }
    if let Some(v) = payload.retirement_age {
        args.retirement_age = v;
    }
    if let Some(v) = payload.current_annual_income {
        args.current_annual_income = v;
    }
    if let Some(v) = payload.income_growth_rate {
        args.income_growth_rate = v;
    }
    if let Some(v) = payload.current_savings {
        args.current_savings = v;
    }
    if let Some(v) = payload.savings_rate {
        args.savings_rate = v;
    }
    if let Some(v) = payload.start_year {
        args.start_year = Some(v);
    }

    args
}

fn solve_request_from_payload(
    payload: SolvePayload,
) -> Result<(ProjectionInput, GoalSolveConfig), ProjectionError> {
    let input = build_input(profile_args_from_payload(payload.profile))?;
    let config = build_goal_config(&GoalArgs {
        goal: payload.goal,
        target_assets: payload.target_assets,
        search_min: payload.search_min,
        search_max: payload.search_max,
        tolerance: payload.tolerance,
        max_iterations: payload.max_iterations,
    })?;
    Ok((input, config))
}

pub async fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    match cli.command {
        Command::Serve { port } => run_http_server(port).await?,
        Command::Project { profile, json } => {
            let result = project(&build_input(profile)?)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                print!("{}", render_projection(&result));
            }
        }
        Command::Solve {
            profile,
            goal,
            json,
        } => {
            let input = build_input(profile)?;
            let result = solve_goal(&input, build_goal_config(&goal)?)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                print!("{}", render_solve(&result));
            }
        }
    }
    Ok(())
}

pub fn router() -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/index.html", get(index_handler))
        .route("/app.js", get(app_js_handler))
        .route("/api/health", get(health_handler))
        .route(
            "/api/simulate",
            get(simulate_get_handler).post(simulate_post_handler),
        )
        .route("/api/solve", post(solve_handler))
        .fallback(not_found_handler)
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

pub async fn run_http_server(port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "projection API listening");
    info!("local access: http://127.0.0.1:{port}/");

    axum::serve(listener, router()).await
}

async fn index_handler() -> impl IntoResponse {
    with_cache_control(Html(INDEX_HTML))
}

async fn app_js_handler() -> impl IntoResponse {
    with_cache_control((
        [(
            header::CONTENT_TYPE,
            "application/javascript; charset=utf-8",
        )],
        APP_JS,
    ))
}

async fn health_handler() -> Response {
    json_response(
        StatusCode::OK,
        HealthResponse {
            status: "ok",
            timestamp: Utc::now().to_rfc3339(),
        },
    )
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn simulate_get_handler(payload: Result<Query<SimulatePayload>, QueryRejection>) -> Response {
    match payload {
        Ok(Query(payload)) => simulate_handler_impl(payload),
        Err(rejection) => bad_request(&format!("Invalid query string: {rejection}")),
    }
}

async fn simulate_post_handler(payload: Result<Json<SimulatePayload>, JsonRejection>) -> Response {
    match payload {
        Ok(Json(payload)) => simulate_handler_impl(payload),
        Err(rejection) => bad_request(&format!("Invalid JSON payload: {rejection}")),
    }
}

fn simulate_handler_impl(payload: SimulatePayload) -> Response {
    let result = build_input(profile_args_from_payload(payload)).and_then(|input| project(&input));
    match result {
        Ok(result) => {
            log_projection(&result);
            json_response(StatusCode::OK, result)
        }
        Err(err) => rejection_response(&err),
    }
}

async fn solve_handler(payload: Result<Json<SolvePayload>, JsonRejection>) -> Response {
    let payload = match payload {
        Ok(Json(payload)) => payload,
        Err(rejection) => return bad_request(&format!("Invalid JSON payload: {rejection}")),
    };

    let result = solve_request_from_payload(payload)
        .and_then(|(input, config)| solve_goal(&input, config));
    match result {
        Ok(result) => {
            log_solve(&result);
            json_response(StatusCode::OK, result)
        }
        Err(err) => rejection_response(&err),
    }
}

fn log_projection(result: &ProjectionResult) {
    info!(
        years = result.summary.total_years,
        final_age = result.summary.final_age,
        final_total_assets = result.summary.final_total_assets,
        "projection completed"
    );
}

fn log_solve(result: &GoalSolveResult) {
    info!(
        goal = ?result.config.goal_type,
        feasible = result.feasible,
        converged = result.converged,
        iterations = result.iterations.len(),
        "goal solve completed"
    );
}

fn handle_panic(_payload: Box<dyn Any + Send + 'static>) -> Response {
    error!("request handler panicked");
    error_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
}

fn with_cache_control<R: IntoResponse>(response: R) -> Response {
    let mut response = response.into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        header::HeaderValue::from_static("no-store"),
    );
    response
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    with_cache_control((status, Json(body)))
}

fn rejection_response(err: &ProjectionError) -> Response {
    bad_request(&err.to_string())
}

fn bad_request(msg: &str) -> Response {
    warn!(reason = msg, "rejected request");
    error_response(StatusCode::BAD_REQUEST, msg)
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}

#[cfg(test)]
fn profile_args_from_json(json: &str) -> Result<ProfileArgs, String> {
    let payload = serde_json::from_str::<SimulatePayload>(json)
        .map_err(|e| format!("Invalid API JSON payload: {e}"))?;
    Ok(profile_args_from_payload(payload))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use serde_json::Value;
    use tower::ServiceExt;

    fn sample_args() -> ProfileArgs {
        ProfileArgs {
            start_year: Some(2024),
            ..default_profile_args()
        }
    }

    async fn send(request: Request<Body>) -> (StatusCode, Value) {
        let resp = router().oneshot(request).await.expect("router is infallible");
        let status = resp.status();
        assert_eq!(
            resp.headers().get(header::CACHE_CONTROL).map(|v| v.as_bytes()),
            Some(&b"no-store"[..])
        );
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .expect("body should be readable");
        let json = serde_json::from_slice(&bytes).expect("body should be JSON");
        (status, json)
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .expect("valid request")
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .body(Body::empty())
            .expect("valid request")
    }

    #[test]
    fn build_input_accepts_defaults() {
        let input = build_input(sample_args()).expect("defaults are valid");
        assert_eq!(input.profile.current_age, 30);
        assert_eq!(input.profile.retirement_age, 65);
        assert_eq!(input.start_year, 2024);
    }

    #[test]
    fn build_input_defaults_start_year_to_this_year() {
        let mut args = sample_args();
        args.start_year = None;
        let input = build_input(args).expect("valid input");
        assert_eq!(input.start_year, current_year());
    }

    #[test]
    fn build_input_rejects_out_of_range_ages() {
        for age in [19, 71] {
            let mut args = sample_args();
            args.current_age = age;
            let err = build_input(args).expect_err("must reject current age");
            assert!(err.to_string().contains("currentAge"));
        }

        let mut args = sample_args();
        args.retirement_age = 81;
        let err = build_input(args).expect_err("must reject retirement age above 80");
        assert!(err.to_string().contains("retirementAge"));

        let mut args = sample_args();
        args.retirement_age = args.current_age;
        let err = build_input(args).expect_err("must reject empty period");
        assert_eq!(
            err,
            ProjectionError::InvalidPeriod {
                current_age: 30,
                retirement_age: 30
            }
        );

        let mut args = sample_args();
        args.retirement_age = 81;
        assert!(matches!(
            build_input(args),
            Err(ProjectionError::InvalidRange {
                field: "retirementAge",
                ..
            })
        ));
    }

    #[test]
    fn build_input_rejects_income_outside_bounds() {
        for income in [0, -1, MAX_ANNUAL_INCOME + 1] {
            let mut args = sample_args();
            args.current_annual_income = income;
            let err = build_input(args).expect_err("must reject income");
            assert!(err.to_string().contains("currentAnnualIncome"));
        }

        let mut args = sample_args();
        args.current_annual_income = MAX_ANNUAL_INCOME;
        assert!(build_input(args).is_ok());
    }

    #[test]
    fn build_input_rejects_savings_rate_and_balance() {
        let mut args = sample_args();
        args.savings_rate = 100.1;
        let err = build_input(args).expect_err("must reject savings rate");
        assert!(err.to_string().contains("savingsRate"));

        let mut args = sample_args();
        args.current_savings = -1;
        let err = build_input(args).expect_err("must reject negative savings");
        assert!(err.to_string().contains("currentSavings"));

        let mut args = sample_args();
        args.income_growth_rate = -100.0;
        let err = build_input(args).expect_err("must reject growth <= -100");
        assert!(err.to_string().contains("incomeGrowthRate"));
    }

    #[test]
    fn build_input_bounds_growth_savings_and_start_year() {
        for growth in [MAX_INCOME_GROWTH_RATE + 0.1, 100.0, f64::NAN, f64::INFINITY] {
            let mut args = sample_args();
            args.income_growth_rate = growth;
            let err = build_input(args).expect_err("must reject growth");
            assert!(err.to_string().contains("incomeGrowthRate"), "{growth}");
        }

        for savings in [MAX_CURRENT_SAVINGS + 1, i64::MAX - 10] {
            let mut args = sample_args();
            args.current_savings = savings;
            let err = build_input(args).expect_err("must reject savings");
            assert!(err.to_string().contains("currentSavings"));
        }

        for year in [MIN_START_YEAR - 1, MAX_START_YEAR + 1, i32::MAX, i32::MIN] {
            let mut args = sample_args();
            args.start_year = Some(year);
            let err = build_input(args).expect_err("must reject start year");
            assert!(err.to_string().contains("startYear"), "{year}");
        }

        let mut args = sample_args();
        args.income_growth_rate = MAX_INCOME_GROWTH_RATE;
        args.current_savings = MAX_CURRENT_SAVINGS;
        args.start_year = Some(MIN_START_YEAR);
        assert!(build_input(args).is_ok());
    }

    #[test]
    fn largest_accepted_input_projects_without_overflow() {
        let args = ProfileArgs {
            current_age: MIN_CURRENT_AGE,
            retirement_age: MAX_RETIREMENT_AGE,
            current_annual_income: MAX_ANNUAL_INCOME,
            income_growth_rate: MAX_INCOME_GROWTH_RATE,
            current_savings: MAX_CURRENT_SAVINGS,
            savings_rate: 100.0,
            start_year: Some(MAX_START_YEAR),
        };
        let result = project(&build_input(args).expect("bounds are inclusive"))
            .expect("largest input stays representable");
        assert_eq!(result.yearly_records.len(), 60);
        assert_eq!(result.yearly_records[59].year, MAX_START_YEAR + 59);
        assert!(result.summary.final_total_assets > MAX_CURRENT_SAVINGS);
        assert!(result.summary.total_tax_paid > 0);
    }

    #[test]
    fn income_goal_cannot_search_above_income_limit() {
        let goal = |goal, search_max| GoalArgs {
            goal,
            target_assets: 1,
            search_min: None,
            search_max: Some(search_max),
            tolerance: None,
            max_iterations: None,
        };

        let err = build_goal_config(&goal(CliGoalType::Income, 1e30))
            .expect_err("must reject income search above the limit");
        assert!(matches!(
            err,
            ProjectionError::InvalidRange {
                field: "searchMax",
                ..
            }
        ));
        assert!(build_goal_config(&goal(CliGoalType::Income, MAX_ANNUAL_INCOME as f64)).is_ok());
        assert!(build_goal_config(&goal(CliGoalType::SavingsRate, 100.0)).is_ok());
    }

    #[test]
    fn profile_args_from_json_overlays_defaults() {
        let json = r#"{
          "currentAge": 40,
          "currentAnnualIncome": 6000000,
          "incomeGrowthRate": 0,
          "savingsRate": 25,
          "startYear": 2030
        }"#;
        let args = profile_args_from_json(json).expect("json should parse");
        assert_eq!(args.current_age, 40);
        assert_eq!(args.retirement_age, 65);
        assert_eq!(args.current_annual_income, 6_000_000);
        assert_eq!(args.income_growth_rate, 0.0);
        assert_eq!(args.current_savings, 1_000_000);
        assert_eq!(args.savings_rate, 25.0);
        assert_eq!(args.start_year, Some(2030));
    }

    #[test]
    fn goal_config_overrides_only_given_fields() {
        let config = build_goal_config(&GoalArgs {
            goal: CliGoalType::Income,
            target_assets: 10,
            search_min: None,
            search_max: Some(20_000_000.0),
            tolerance: None,
            max_iterations: Some(12),
        })
        .expect("bounds are within range");
        assert_eq!(config.goal_type, GoalType::RequiredIncome);
        assert_eq!(config.search_min, GoalSolveConfig::income(10).search_min);
        assert_eq!(config.search_max, 20_000_000.0);
        assert_eq!(config.max_iterations, 12);
    }

    #[test]
    fn cli_parses_project_subcommand() {
        let cli = Cli::try_parse_from([
            "nestegg",
            "project",
            "--current-age",
            "35",
            "--income-growth-rate",
            "-1.5",
            "--json",
        ])
        .expect("cli should parse");
        match cli.command {
            Command::Project { profile, json } => {
                assert!(json);
                assert_eq!(profile.current_age, 35);
                assert_eq!(profile.income_growth_rate, -1.5);
                assert_eq!(profile.retirement_age, 65);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn cli_requires_goal_for_solve() {
        assert!(Cli::try_parse_from(["nestegg", "solve", "--target-assets", "1"]).is_err());
        let cli = Cli::try_parse_from([
            "nestegg",
            "solve",
            "--goal",
            "savings-rate",
            "--target-assets",
            "30000000",
        ])
        .expect("cli should parse");
        assert!(matches!(cli.command, Command::Solve { .. }));
    }

    #[test]
    fn projection_serialization_uses_wire_names() {
        let result = project(&build_input(sample_args()).expect("valid")).expect("projects");
        let json = serde_json::to_string(&result).expect("result should serialize");
        for key in [
            "\"input\"",
            "\"yearlyRecords\"",
            "\"summary\"",
            "\"finalTotalAssets\"",
            "\"totalTaxPaid\"",
            "\"salaryDeduction\"",
            "\"socialInsurance\"",
            "\"netIncome\"",
            "\"savingsContribution\"",
            "\"totalAssets\"",
            "\"startYear\"",
        ] {
            assert!(json.contains(key), "missing {key}");
        }
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let (status, body) = send(get("/api/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert!(body["timestamp"].is_string());
    }

    #[tokio::test]
    async fn simulate_post_returns_projection() {
        let (status, body) = send(post_json(
            "/api/simulate",
            serde_json::json!({
                "currentAge": 30,
                "retirementAge": 65,
                "currentAnnualIncome": 5_000_000,
                "incomeGrowthRate": 2,
                "currentSavings": 1_000_000,
                "savingsRate": 20,
                "startYear": 2024
            }),
        ))
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["summary"]["totalYears"], 35);
        assert_eq!(body["summary"]["finalAge"], 65);
        assert_eq!(body["summary"]["finalTotalAssets"], 38_465_080);
        assert_eq!(body["yearlyRecords"].as_array().map(Vec::len), Some(35));
        assert_eq!(body["yearlyRecords"][0]["year"], 2024);
        assert_eq!(body["yearlyRecords"][0]["tax"]["netIncome"], 3_883_633);
        assert_eq!(body["input"]["profile"]["currentAge"], 30);
    }

    #[tokio::test]
    async fn simulate_get_reads_query_string() {
        let (status, body) = send(get(
            "/api/simulate?currentAge=55&retirementAge=60&currentAnnualIncome=7000000&incomeGrowthRate=0&currentSavings=10000000&savingsRate=35&startYear=2024",
        ))
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["summary"]["totalYears"], 5);
        assert_eq!(body["summary"]["finalTotalAssets"], 19_235_180);
    }

    #[tokio::test]
    async fn simulate_rejects_invalid_input_without_projecting() {
        let (status, body) = send(post_json(
            "/api/simulate",
            serde_json::json!({ "currentAge": 50, "retirementAge": 45 }),
        ))
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(
            body["error"]
                .as_str()
                .is_some_and(|msg| msg.contains("retirement age (45)"))
        );
    }

    #[tokio::test]
    async fn simulate_rejects_values_that_would_overflow() {
        for payload in [
            serde_json::json!({
                "currentAge": 20,
                "retirementAge": 80,
                "currentAnnualIncome": 100_000_000,
                "incomeGrowthRate": 100,
                "savingsRate": 100
            }),
            serde_json::json!({ "currentSavings": i64::MAX - 10 }),
            serde_json::json!({ "startYear": i32::MAX }),
        ] {
            let (status, body) = send(post_json("/api/simulate", payload)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert!(body["error"].is_string());
        }
    }

    #[tokio::test]
    async fn solve_rejects_income_search_above_limit() {
        let (status, body) = send(post_json(
            "/api/solve",
            serde_json::json!({
                "goal": "income",
                "targetAssets": 1_000_000_000,
                "searchMax": 1e20
            }),
        ))
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(
            body["error"]
                .as_str()
                .is_some_and(|msg| msg.contains("searchMax"))
        );
    }

    #[tokio::test]
    async fn simulate_rejects_malformed_json() {
        let request = Request::builder()
            .method("POST")
            .uri("/api/simulate")
            .header("content-type", "application/json")
            .body(Body::from("{\"currentAge\": \"thirty\"}"))
            .expect("valid request");
        let (status, body) = send(request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn solve_returns_required_savings_rate() {
        let (status, body) = send(post_json(
            "/api/solve",
            serde_json::json!({
                "currentAge": 30,
                "retirementAge": 40,
                "currentAnnualIncome": 5_000_000,
                "incomeGrowthRate": 0,
                "currentSavings": 0,
                "startYear": 2024,
                "goal": "savings-rate",
                "targetAssets": 9_709_080
            }),
        ))
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["feasible"], true);
        let rate = body["solvedValue"].as_f64().expect("rate expected");
        assert!((rate - 25.0).abs() <= 0.01, "got {rate}");
    }

    #[tokio::test]
    async fn solve_rejects_invalid_search_bounds() {
        let (status, body) = send(post_json(
            "/api/solve",
            serde_json::json!({
                "goal": "savings-rate",
                "targetAssets": 1,
                "searchMin": 50,
                "searchMax": 10
            }),
        ))
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(
            body["error"]
                .as_str()
                .is_some_and(|msg| msg.contains("search_max"))
        );
    }

    #[tokio::test]
    async fn unknown_route_is_json_404() {
        let (status, body) = send(get("/api/nope")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Not found");
    }

    #[tokio::test]
    async fn index_serves_form() {
        let resp = router()
            .oneshot(get("/"))
            .await
            .expect("router is infallible");
        assert_eq!(resp.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .expect("body should be readable");
        let html = String::from_utf8_lossy(&bytes);
        assert!(html.contains("<form"));
    }
}
