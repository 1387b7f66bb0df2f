use std::{net::SocketAddr, sync::Arc};

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::config::ScheduleConfig;
use crate::persistence::{StoreError, TaskStore};
use crate::schedule::{self, DayBucket, ScheduleError, render};
use crate::task::{Role, Task, TaskDraft, TaskListing, TaskStatus};

type SharedStore = Arc<dyn TaskStore + Send + Sync>;

/// Source of "today" for the schedule views.
#[derive(Debug, Clone, Copy)]
pub enum Clock {
    System,
    Fixed(NaiveDate),
}

impl Clock {
    pub fn today(&self) -> NaiveDate {
        match self {
            Clock::System => chrono::Local::now().date_naive(),
            Clock::Fixed(date) => *date,
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    store: SharedStore,
    schedule: ScheduleConfig,
    print: ScheduleConfig,
    clock: Clock,
}

impl AppState {
    pub fn new<S>(store: S) -> Self
    where
        S: TaskStore + Send + Sync + 'static,
    {
        Self::with_shared(Arc::new(store))
    }

    pub fn with_shared(store: SharedStore) -> Self {
        Self {
            store,
            schedule: ScheduleConfig::default(),
            print: ScheduleConfig::print_defaults(),
            clock: Clock::System,
        }
    }

    pub fn with_schedule_configs(mut self, schedule: ScheduleConfig, print: ScheduleConfig) -> Self {
        self.schedule = schedule;
        self.print = print;
        self
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Runs a store call on the blocking pool; the SQLite connection is synchronous.
    async fn with_store<T, F>(&self, f: F) -> Result<T, ApiError>
    where
        F: FnOnce(&dyn TaskStore) -> Result<T, ApiError> + Send + 'static,
        T: Send + 'static,
    {
        let store = self.store.clone();
        tokio::task::spawn_blocking(move || f(store.as_ref()))
            .await
            .map_err(|err| ApiError::internal(format!("store task failed: {err}")))?
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    message: String,
}

#[derive(Debug)]
enum ApiError {
    NotFound(String),
    Conflict(String),
    Invalid(String),
    DataIntegrity(String),
    Internal(String),
}

impl ApiError {
    fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    fn internal(message: impl Into<String>) -> Self {
        ApiError::Internal(message.into())
    }
}

impl From<StoreError> for ApiError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::NotFound(message) => ApiError::NotFound(message),
            StoreError::Conflict(message) => ApiError::Conflict(message),
            StoreError::InvalidData(message) => ApiError::Invalid(message),
            err @ StoreError::Corrupt(_) => {
                tracing::error!(error = %err, "stored row does not decode");
                ApiError::DataIntegrity(err.to_string())
            }
            other => {
                tracing::error!(error = %other, "task store failure");
                ApiError::Internal(other.to_string())
            }
        }
    }
}

impl From<ScheduleError> for ApiError {
    fn from(value: ScheduleError) -> Self {
        match value {
            ScheduleError::Store(err) => ApiError::from(err),
            err @ ScheduleError::DataIntegrity { .. } => ApiError::DataIntegrity(err.to_string()),
            ScheduleError::InvalidConfiguration(message) => ApiError::Invalid(message),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, message) = match self {
            ApiError::NotFound(message) => (StatusCode::NOT_FOUND, "not_found", message),
            ApiError::Conflict(message) => (StatusCode::CONFLICT, "conflict", message),
            ApiError::Invalid(message) => (StatusCode::BAD_REQUEST, "invalid_request", message),
            ApiError::DataIntegrity(message) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "data_integrity", message)
            }
            ApiError::Internal(message) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", message)
            }
        };
        (status, Json(ErrorBody { error, message })).into_response()
    }
}

#[derive(Debug, Deserialize)]
struct RolePayload {
    name: String,
}

#[derive(Debug, Serialize)]
struct RoleDetail {
    #[serde(flatten)]
    role: Role,
    tasks: Vec<Task>,
}

// Query values arrive as strings so that bad input gets the JSON error body
// rather than the extractor's plain-text rejection.
#[derive(Debug, Deserialize)]
struct ListTasksQuery {
    show: Option<String>,
}

impl ListTasksQuery {
    fn status(&self) -> Result<TaskStatus, ApiError> {
        match self.show.as_deref() {
            None => Ok(TaskStatus::default()),
            Some(raw) => raw.parse().map_err(ApiError::Invalid),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ScheduleQuery {
    max_lines: Option<String>,
    max_future_days: Option<String>,
    header_lines: Option<String>,
    include_overdue: Option<String>,
    format: Option<String>,
}

fn query_value<T: std::str::FromStr>(
    name: &str,
    raw: Option<&str>,
    fallback: T,
) -> Result<T, ApiError> {
    match raw {
        None => Ok(fallback),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ApiError::Invalid(format!("invalid value '{raw}' for {name}"))),
    }
}

impl ScheduleQuery {
    fn apply(&self, base: ScheduleConfig) -> Result<ScheduleConfig, ApiError> {
        Ok(ScheduleConfig {
            max_lines: query_value("max_lines", self.max_lines.as_deref(), base.max_lines)?,
            max_future_days: query_value(
                "max_future_days",
                self.max_future_days.as_deref(),
                base.max_future_days,
            )?,
            header_lines: query_value(
                "header_lines",
                self.header_lines.as_deref(),
                base.header_lines,
            )?,
            include_overdue: query_value(
                "include_overdue",
                self.include_overdue.as_deref(),
                base.include_overdue,
            )?,
        })
    }

    fn wants_text(&self) -> Result<bool, ApiError> {
        match self.format.as_deref() {
            None | Some("json") => Ok(false),
            Some("text") => Ok(true),
            Some(other) => Err(ApiError::Invalid(format!("unknown format '{other}'"))),
        }
    }
}

#[derive(Debug, Serialize)]
struct ScheduleResponse {
    today: NaiveDate,
    days: Vec<DayBucket>,
}

#[derive(Debug, Serialize)]
struct PrintResponse {
    today: NaiveDate,
    left: Vec<DayBucket>,
    right: Vec<DayBucket>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/roles", get(list_roles).post(create_role))
        .route(
            "/roles/:id",
            get(get_role).put(rename_role).delete(delete_role),
        )
        .route("/tasks", get(list_tasks).post(create_task))
        .route(
            "/tasks/:id",
            get(get_task).put(update_task).delete(delete_task),
        )
        .route("/tasks/:id/complete", post(complete_task))
        .route("/tasks/:id/reactivate", post(reactivate_task))
        .route("/schedule", get(view_schedule))
        .route("/schedule/print", get(print_schedule))
        .with_state(state)
}

pub async fn serve(addr: SocketAddr, state: AppState) -> std::io::Result<()> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "http api listening");
    axum::serve(listener, app).await
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

async fn list_roles(State(state): State<AppState>) -> Result<Json<Vec<Role>>, ApiError> {
    let roles = state
        .with_store(|store| Ok(store.list_roles()?))
        .await?;
    Ok(Json(roles))
}

async fn create_role(
    State(state): State<AppState>,
    Json(payload): Json<RolePayload>,
) -> Result<(StatusCode, Json<Role>), ApiError> {
    let role = state
        .with_store(move |store| Ok(store.create_role(&payload.name)?))
        .await?;
    Ok((StatusCode::CREATED, Json(role)))
}

async fn get_role(
    State(state): State<AppState>,
    Path(role_id): Path<i64>,
) -> Result<Json<RoleDetail>, ApiError> {
    let detail = state
        .with_store(move |store| {
            let role = store
                .find_role(role_id)?
                .ok_or_else(|| ApiError::not_found(format!("role {role_id} not found")))?;
            let tasks = store.tasks_for_role(role_id)?;
            Ok(RoleDetail { role, tasks })
        })
        .await?;
    Ok(Json(detail))
}

async fn rename_role(
    State(state): State<AppState>,
    Path(role_id): Path<i64>,
    Json(payload): Json<RolePayload>,
) -> Result<Json<Role>, ApiError> {
    let role = state
        .with_store(move |store| Ok(store.rename_role(role_id, &payload.name)?))
        .await?;
    Ok(Json(role))
}

async fn delete_role(
    State(state): State<AppState>,
    Path(role_id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state
        .with_store(move |store| Ok(store.delete_role(role_id)?))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn list_tasks(
    State(state): State<AppState>,
    Query(query): Query<ListTasksQuery>,
) -> Result<Json<Vec<TaskListing>>, ApiError> {
    let status = query.status()?;
    let tasks = state
        .with_store(move |store| Ok(store.list_tasks(status)?))
        .await?;
    Ok(Json(tasks))
}

async fn get_task(
    State(state): State<AppState>,
    Path(task_id): Path<i64>,
) -> Result<Json<Task>, ApiError> {
    let task = state
        .with_store(move |store| {
            store
                .find_task(task_id)?
                .ok_or_else(|| ApiError::not_found(format!("task {task_id} not found")))
        })
        .await?;
    Ok(Json(task))
}

async fn create_task(
    State(state): State<AppState>,
    Json(draft): Json<TaskDraft>,
) -> Result<(StatusCode, Json<Task>), ApiError> {
    let task = state
        .with_store(move |store| Ok(store.create_task(&draft)?))
        .await?;
    Ok((StatusCode::CREATED, Json(task)))
}

async fn update_task(
    State(state): State<AppState>,
    Path(task_id): Path<i64>,
    Json(draft): Json<TaskDraft>,
) -> Result<Json<Task>, ApiError> {
    let task = state
        .with_store(move |store| Ok(store.update_task(task_id, &draft)?))
        .await?;
    Ok(Json(task))
}

async fn delete_task(
    State(state): State<AppState>,
    Path(task_id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    let removed = state
        .with_store(move |store| Ok(store.delete_task(task_id)?))
        .await?;
    if !removed {
        return Err(ApiError::not_found(format!("task {task_id} not found")));
    }
    Ok(StatusCode::NO_CONTENT)
}

async fn complete_task(
    State(state): State<AppState>,
    Path(task_id): Path<i64>,
) -> Result<Json<Task>, ApiError> {
    let task = state
        .with_store(move |store| Ok(store.set_task_complete(task_id, true)?))
        .await?;
    Ok(Json(task))
}

async fn reactivate_task(
    State(state): State<AppState>,
    Path(task_id): Path<i64>,
) -> Result<Json<Task>, ApiError> {
    let task = state
        .with_store(move |store| Ok(store.set_task_complete(task_id, false)?))
        .await?;
    Ok(Json(task))
}

async fn view_schedule(
    State(state): State<AppState>,
    Query(query): Query<ScheduleQuery>,
) -> Result<Response, ApiError> {
    let as_text = query.wants_text()?;
    let config = query.apply(state.schedule)?;
    let today = state.clock.today();
    let days = state
        .with_store(move |store| Ok(schedule::schedule_view(store, today, &config)?))
        .await?;

    if as_text {
        let body = render::render_single_column(&days);
        return Ok(([(header::CONTENT_TYPE, "text/plain; charset=utf-8")], body).into_response());
    }
    Ok(Json(ScheduleResponse { today, days }).into_response())
}

async fn print_schedule(
    State(state): State<AppState>,
    Query(query): Query<ScheduleQuery>,
) -> Result<Response, ApiError> {
    let as_text = query.wants_text()?;
    let config = query.apply(state.print)?;
    let today = state.clock.today();
    let columns = state
        .with_store(move |store| Ok(schedule::print_view(store, today, &config)?))
        .await?;

    if as_text {
        let body = render::render_columns(&columns, render::DEFAULT_COLUMN_WIDTH);
        return Ok(([(header::CONTENT_TYPE, "text/plain; charset=utf-8")], body).into_response());
    }
    Ok(Json(PrintResponse {
        today,
        left: columns.left,
        right: columns.right,
    })
    .into_response())
}
