use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        ws::WebSocketUpgrade,
        Path, Query, State,
    },
    http::StatusCode,
    response::Response,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use application::services::{
    CreateJobRequest, JobSearchRequest, JobService, LoginRequest, RegisterEmployerRequest,
    SalaryRangeInput, SubmitApplicationRequest, UpdateJobRequest,
};
use application::{ApplicationError, EmployerDto, JobApplicationDto, JobDto};
use domain::JobId;

use crate::{auth::BearerToken, error::ApiError, state::AppState, ws_connection::WebSocketConnection};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RegisterPayload {
    name: String,
    email: String,
    password: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct LoginPayload {
    email: String,
    password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
}

#[derive(Debug, Clone, Copy, Deserialize)]
struct SalaryRangePayload {
    min: Option<i64>,
    max: Option<i64>,
}

impl From<SalaryRangePayload> for SalaryRangeInput {
    fn from(value: SalaryRangePayload) -> Self {
        SalaryRangeInput {
            min: value.min,
            max: value.max,
        }
    }
}

/// 发布与更新共用同一个请求体，发布时缺失字段在服务层报告
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct JobPayload {
    title: Option<String>,
    description: Option<String>,
    location: Option<String>,
    salary_range: Option<SalaryRangePayload>,
}

impl From<JobPayload> for CreateJobRequest {
    fn from(value: JobPayload) -> Self {
        CreateJobRequest {
            title: value.title,
            description: value.description,
            location: value.location,
            salary_range: value.salary_range.map(Into::into),
        }
    }
}

impl From<JobPayload> for UpdateJobRequest {
    fn from(value: JobPayload) -> Self {
        UpdateJobRequest {
            title: value.title,
            description: value.description,
            location: value.location,
            salary_range: value.salary_range.map(Into::into),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct SearchQuery {
    title: Option<String>,
    location: Option<String>,
    min_salary: Option<String>,
    max_salary: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ApplyPayload {
    candidate_name: String,
    candidate_email: String,
}

#[derive(Debug, Serialize)]
struct MessageResponse {
    message: &'static str,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/ws", get(websocket_upgrade))
        .nest("/api", api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register_employer))
        .route("/auth/login", post(login_employer))
        .route("/jobs", post(create_job).get(search_jobs))
        .route("/jobs/{job_id}", get(get_job).put(update_job).delete(delete_job))
        .route("/jobs/{job_id}/applications", get(list_applications))
        .route("/applications/{job_id}/apply", post(apply_to_job))
}

async fn health() -> StatusCode {
    StatusCode::OK
}

async fn register_employer(
    State(state): State<AppState>,
    payload: Result<Json<RegisterPayload>, JsonRejection>,
) -> Result<(StatusCode, Json<EmployerDto>), ApiError> {
    let Json(payload) = payload?;
    let employer = state
        .auth_service
        .register(RegisterEmployerRequest {
            name: payload.name,
            email: payload.email,
            password: payload.password,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(EmployerDto::from(&employer))))
}

async fn login_employer(
    State(state): State<AppState>,
    payload: Result<Json<LoginPayload>, JsonRejection>,
) -> Result<Json<LoginResponse>, ApiError> {
    let Json(payload) = payload?;
    let outcome = state
        .auth_service
        .login(LoginRequest {
            email: payload.email,
            password: payload.password,
        })
        .await?;

    Ok(Json(LoginResponse {
        token: outcome.token.token,
    }))
}

async fn create_job(
    State(state): State<AppState>,
    bearer: BearerToken,
    payload: Result<Json<JobPayload>, JsonRejection>,
) -> Result<(StatusCode, Json<JobDto>), ApiError> {
    let Json(payload) = payload?;
    let draft = JobService::draft(payload.into())?;
    let identity = bearer.authenticate(&state.auth_service)?;

    let job = state.job_service.create_job(&identity, draft).await?;
    Ok((StatusCode::CREATED, Json(JobDto::from(&job))))
}

async fn search_jobs(
    State(state): State<AppState>,
    query: Result<Query<SearchQuery>, QueryRejection>,
) -> Result<Json<Vec<JobDto>>, ApiError> {
    let Query(query) = query?;
    let jobs = state
        .job_service
        .search_jobs(JobSearchRequest {
            title: query.title,
            location: query.location,
            min_salary: query.min_salary,
            max_salary: query.max_salary,
        })
        .await?;

    Ok(Json(jobs.iter().map(JobDto::from).collect()))
}

async fn get_job(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> Result<Json<JobDto>, ApiError> {
    let job = state.job_service.get_job(&job_id).await?;
    Ok(Json(JobDto::from(&job)))
}

async fn update_job(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
    bearer: BearerToken,
    payload: Result<Json<JobPayload>, JsonRejection>,
) -> Result<Json<JobDto>, ApiError> {
    let Json(payload) = payload?;
    let update = JobService::prepare_update(&job_id, payload.into())?;
    let identity = bearer.authenticate(&state.auth_service)?;

    let job = state.job_service.update_job(&identity, update).await?;
    Ok(Json(JobDto::from(&job)))
}

async fn delete_job(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
    bearer: BearerToken,
) -> Result<Json<MessageResponse>, ApiError> {
    let job_id = parse_job_id(&job_id)?;
    let identity = bearer.authenticate(&state.auth_service)?;

    state.job_service.delete_job(&identity, job_id).await?;
    Ok(Json(MessageResponse {
        message: "Job deleted",
    }))
}

async fn list_applications(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
    bearer: BearerToken,
) -> Result<Json<Vec<JobApplicationDto>>, ApiError> {
    let job_id = parse_job_id(&job_id)?;
    let identity = bearer.authenticate(&state.auth_service)?;

    let applications = state
        .job_service
        .list_applications(&identity, job_id)
        .await?;
    Ok(Json(
        applications.iter().map(JobApplicationDto::from).collect(),
    ))
}

async fn apply_to_job(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
    payload: Result<Json<ApplyPayload>, JsonRejection>,
) -> Result<(StatusCode, Json<JobApplicationDto>), ApiError> {
    let Json(payload) = payload?;
    let application = state
        .application_service
        .submit_application(SubmitApplicationRequest {
            job_id,
            candidate_name: payload.candidate_name,
            candidate_email: payload.candidate_email,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(JobApplicationDto::from(&application)),
    ))
}

async fn websocket_upgrade(State(state): State<AppState>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| WebSocketConnection::new(state).run(socket))
}

fn parse_job_id(raw: &str) -> Result<JobId, ApiError> {
    JobId::parse(raw).map_err(|err| ApiError::from(ApplicationError::from(err)))
}
