use axum::{
    Router,
    extract::{Json, Query},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::core::{
    EngineError, EngineResult, GoalInput, GoalResult, PaymentTiming, ProjectionInput,
    ProjectionResult, RateConvention, ScheduleYear, project, project_step_up,
    solve_required_contribution, yearly_schedule, yearly_schedule_step_up,
};

mod cli;

pub use cli::{Cli, Command, GoalArgs, ProjectArgs, ServeArgs};
use cli::{CliPaymentTiming, CliRateConvention};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
enum ApiRateConvention {
    #[serde(alias = "simple", alias = "division")]
    Nominal,
    #[serde(alias = "compound", alias = "compounded")]
    Effective,
}

impl From<ApiRateConvention> for CliRateConvention {
    fn from(value: ApiRateConvention) -> Self {
        match value {
            ApiRateConvention::Nominal => CliRateConvention::Nominal,
            ApiRateConvention::Effective => CliRateConvention::Effective,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
enum ApiPaymentTiming {
    #[serde(alias = "ordinary", alias = "endOfPeriod", alias = "end_of_period")]
    End,
    #[serde(alias = "due", alias = "startOfPeriod", alias = "start_of_period")]
    Start,
}

impl From<ApiPaymentTiming> for CliPaymentTiming {
    fn from(value: ApiPaymentTiming) -> Self {
        match value {
            ApiPaymentTiming::End => CliPaymentTiming::End,
            ApiPaymentTiming::Start => CliPaymentTiming::Start,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProjectionMode {
    Level,
    StepUp,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ProjectPayload {
    #[serde(alias = "monthly", alias = "monthlyAmount")]
    contribution: Option<f64>,
    #[serde(alias = "annualReturn", alias = "returnRate")]
    rate: Option<f64>,
    #[serde(alias = "inflationRate")]
    inflation: Option<f64>,
    #[serde(alias = "horizonYears")]
    years: Option<f64>,
    periods_per_year: Option<u32>,
    #[serde(alias = "stepUpPercent")]
    step_up: Option<f64>,
    rate_convention: Option<ApiRateConvention>,
    timing: Option<ApiPaymentTiming>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct GoalPayload {
    #[serde(alias = "targetAmount", alias = "targetValueToday")]
    target: Option<f64>,
    #[serde(alias = "horizonYears")]
    years: Option<f64>,
    #[serde(alias = "annualReturn", alias = "returnRate")]
    rate: Option<f64>,
    #[serde(alias = "inflationRate")]
    inflation: Option<f64>,
    periods_per_year: Option<u32>,
    rate_convention: Option<ApiRateConvention>,
    timing: Option<ApiPaymentTiming>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectResponse {
    mode: ProjectionMode,
    rate_convention: RateConvention,
    payment_timing: PaymentTiming,
    periods_per_year: u32,
    result: ProjectionResult,
    schedule_years: Vec<ScheduleYear>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalResponse {
    rate_convention: RateConvention,
    payment_timing: PaymentTiming,
    periods_per_year: u32,
    result: GoalResult,
    schedule_years: Vec<ScheduleYear>,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

pub fn build_project_response(
    input: &ProjectionInput,
    mode: ProjectionMode,
) -> EngineResult<ProjectResponse> {
    let (result, schedule_years) = match mode {
        ProjectionMode::Level => (project(input)?, yearly_schedule(input)?),
        ProjectionMode::StepUp => (project_step_up(input)?, yearly_schedule_step_up(input)?),
    };
    Ok(ProjectResponse {
        mode,
        rate_convention: input.rate_convention,
        payment_timing: input.payment_timing,
        periods_per_year: input.periods_per_year,
        result,
        schedule_years,
    })
}

/// Solves the goal and attaches the growth table of the solved contribution.
pub fn build_goal_response(goal: &GoalInput) -> EngineResult<GoalResponse> {
    let result = solve_required_contribution(goal)?;
    let schedule_years =
        yearly_schedule(&goal.projection_for(result.required_periodic_contribution))?;
    Ok(GoalResponse {
        rate_convention: goal.rate_convention,
        payment_timing: goal.payment_timing,
        periods_per_year: goal.periods_per_year,
        result,
        schedule_years,
    })
}

pub async fn run_http_server(port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "SIP projection API listening");
    info!("Local access: http://127.0.0.1:{port}/api/project");

    axum::serve(listener, router()).await
}

fn router() -> Router {
    Router::new()
        .route(
            "/api/project",
            get(project_get_handler).post(project_post_handler),
        )
        .route(
            "/api/step-up",
            get(step_up_get_handler).post(step_up_post_handler),
        )
        .route("/api/goal", get(goal_get_handler).post(goal_post_handler))
        .fallback(not_found_handler)
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn project_get_handler(Query(payload): Query<ProjectPayload>) -> Response {
    project_handler_impl(payload, ProjectionMode::Level)
}

async fn project_post_handler(Json(payload): Json<ProjectPayload>) -> Response {
    project_handler_impl(payload, ProjectionMode::Level)
}

async fn step_up_get_handler(Query(payload): Query<ProjectPayload>) -> Response {
    project_handler_impl(payload, ProjectionMode::StepUp)
}

async fn step_up_post_handler(Json(payload): Json<ProjectPayload>) -> Response {
    project_handler_impl(payload, ProjectionMode::StepUp)
}

async fn goal_get_handler(Query(payload): Query<GoalPayload>) -> Response {
    goal_handler_impl(payload)
}

async fn goal_post_handler(Json(payload): Json<GoalPayload>) -> Response {
    goal_handler_impl(payload)
}

fn project_handler_impl(payload: ProjectPayload, mode: ProjectionMode) -> Response {
    let input = projection_input_from_payload(payload);
    info!(?mode, years = input.horizon_years, "projection request");
    match build_project_response(&input, mode) {
        Ok(response) => json_response(StatusCode::OK, response),
        Err(err) => engine_error_response(err),
    }
}

fn goal_handler_impl(payload: GoalPayload) -> Response {
    let goal = goal_input_from_payload(payload);
    info!(years = goal.horizon_years, "goal request");
    match build_goal_response(&goal) {
        Ok(response) => json_response(StatusCode::OK, response),
        Err(err) => engine_error_response(err),
    }
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        header::HeaderValue::from_static("no-store"),
    );
    response
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}

fn engine_error_response(err: EngineError) -> Response {
    warn!(%err, "request rejected");
    error_response(error_status(&err), &err.to_string())
}

fn error_status(err: &EngineError) -> StatusCode {
    match err {
        EngineError::Validation(_) => StatusCode::BAD_REQUEST,
        EngineError::Domain(_) => StatusCode::UNPROCESSABLE_ENTITY,
    }
}

fn projection_input_from_payload(payload: ProjectPayload) -> ProjectionInput {
    let mut args = default_project_args_for_api();

    if let Some(v) = payload.contribution {
        args.contribution = v;
    }
    if let Some(v) = payload.rate {
        args.rate = v;
    }
    if let Some(v) = payload.inflation {
        args.inflation = v;
    }
    if let Some(v) = payload.years {
        args.years = v;
    }
    if let Some(v) = payload.periods_per_year {
        args.periods_per_year = v;
    }
    if let Some(v) = payload.step_up {
        args.step_up = v;
    }
    if let Some(v) = payload.rate_convention {
        args.rate_convention = v.into();
    }
    if let Some(v) = payload.timing {
        args.timing = v.into();
    }

    args.to_input()
}

fn goal_input_from_payload(payload: GoalPayload) -> GoalInput {
    let mut args = default_goal_args_for_api();

    if let Some(v) = payload.target {
        args.target = v;
    }
    if let Some(v) = payload.years {
        args.years = v;
    }
    if let Some(v) = payload.rate {
        args.rate = v;
    }
    if let Some(v) = payload.inflation {
        args.inflation = v;
    }
    if let Some(v) = payload.periods_per_year {
        args.periods_per_year = v;
    }
    if let Some(v) = payload.rate_convention {
        args.rate_convention = v.into();
    }
    if let Some(v) = payload.timing {
        args.timing = v.into();
    }

    args.to_goal()
}

fn default_project_args_for_api() -> ProjectArgs {
    ProjectArgs {
        contribution: 10_000.0,
        rate: 12.0,
        inflation: 6.0,
        years: 10.0,
        periods_per_year: 12,
        step_up: 10.0,
        rate_convention: CliRateConvention::Nominal,
        timing: CliPaymentTiming::End,
    }
}

fn default_goal_args_for_api() -> GoalArgs {
    GoalArgs {
        target: 10_000_000.0,
        years: 15.0,
        rate: 12.0,
        inflation: 6.0,
        periods_per_year: 12,
        rate_convention: CliRateConvention::Nominal,
        timing: CliPaymentTiming::End,
    }
}
