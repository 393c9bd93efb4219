use std::{net::SocketAddr, sync::Arc};

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::{Datelike, Local, NaiveDate, Weekday};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::{
    ClientScheduleRecord, Dashboard, DashboardError, NewClient, NewEvent, NewTask,
    PersistenceError, RecordStore, Window,
    calendar::weekday_name,
    format::format_time,
    messages::{self, ARCHIVED_CLIENTS, CURRENT_CLIENTS, EVENTS, TASKS},
};

type SharedStore = Arc<Mutex<Box<dyn RecordStore + Send>>>;

#[derive(Clone)]
pub struct AppState {
    store: SharedStore,
    today: Option<NaiveDate>,
}

impl AppState {
    pub fn new<S: RecordStore + Send + 'static>(store: S) -> Self {
        Self {
            store: Arc::new(Mutex::new(Box::new(store))),
            today: None,
        }
    }

    /// Pin the date every request treats as today.
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    /// Run `f` against a dashboard over the store. The lock is held for the
    /// whole call, so writers never interleave.
    fn with_dashboard<T>(&self, f: impl FnOnce(&Dashboard<&(dyn RecordStore + Send)>) -> T) -> T {
        let guard = self.store.lock();
        let today = self.today.unwrap_or_else(|| Local::now().date_naive());
        let dashboard = Dashboard::new(&**guard).with_today(today);
        f(&dashboard)
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    message: String,
}

#[derive(Debug)]
enum ApiError {
    Invalid(String),
    NotFound(String),
    Unprocessable(String),
    Internal(String),
}

impl ApiError {
    fn invalid(message: impl Into<String>) -> Self {
        ApiError::Invalid(message.into())
    }
}

impl From<PersistenceError> for ApiError {
    fn from(value: PersistenceError) -> Self {
        tracing::error!(error = %value, "store operation failed");
        ApiError::Internal(value.to_string())
    }
}

impl From<DashboardError> for ApiError {
    fn from(value: DashboardError) -> Self {
        match value {
            DashboardError::Validation(err) => ApiError::Unprocessable(err.message().to_string()),
            DashboardError::Record(err) => ApiError::Unprocessable(err.to_string()),
            DashboardError::Persistence(err) => ApiError::from(err),
            err @ DashboardError::UnknownClient { .. } => ApiError::NotFound(err.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, message) = match self {
            ApiError::Invalid(message) => (StatusCode::BAD_REQUEST, "invalid_request", message),
            ApiError::NotFound(message) => (StatusCode::NOT_FOUND, "not_found", message),
            ApiError::Unprocessable(message) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "validation_failed", message)
            }
            ApiError::Internal(message) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", message)
            }
        };
        (status, Json(ErrorBody { error, message })).into_response()
    }
}

#[derive(Debug, Deserialize)]
struct WindowQuery {
    window: Option<String>,
}

impl WindowQuery {
    fn window(&self) -> Result<Window, ApiError> {
        match self.window.as_deref() {
            None => Ok(Window::Week),
            Some(raw) => Window::parse(raw)
                .ok_or_else(|| ApiError::invalid(format!("unknown window '{raw}'"))),
        }
    }
}

#[derive(Debug, Deserialize)]
struct WeekQuery {
    start: Option<Weekday>,
}

#[derive(Debug, Deserialize)]
struct TaskRemoval {
    day: Weekday,
    title: String,
}

#[derive(Debug, Deserialize)]
struct DeleteTasksPayload {
    removals: Vec<TaskRemoval>,
}

#[derive(Debug, Deserialize)]
struct DeleteEventsPayload {
    titles: Vec<String>,
}

fn client_names(clients: &[ClientScheduleRecord]) -> Vec<Value> {
    clients
        .iter()
        .map(|client| json!({ "name": client.client_name, "key": client.directory_name() }))
        .collect()
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/agenda/today", get(today_agenda))
        .route("/agenda/week", get(week_agenda))
        .route("/birthdays", get(birthdays))
        .route("/events", get(events).post(create_event))
        .route("/events/descriptions", get(event_descriptions))
        .route("/events/delete", post(delete_events))
        .route("/upcoming", get(upcoming))
        .route("/tasks", post(create_task))
        .route("/tasks/delete", post(delete_tasks))
        .route("/clients", get(clients).post(create_client))
        .route("/clients/:name/edit", post(edit_client))
        .route("/clients/:name/archive", post(archive_client))
        .route("/clients/:name/restore", post(restore_client))
        .route("/clients/:name/delete", post(delete_client))
        .route("/sweep", post(sweep))
        .with_state(state)
}

pub async fn serve<S: RecordStore + Send + 'static>(addr: SocketAddr, store: S) -> std::io::Result<()> {
    let app = router(AppState::new(store));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "http api listening");
    axum::serve(listener, app).await
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

async fn today_agenda(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let (date, tasks, sessions) = state.with_dashboard(|dashboard| {
        let tasks = dashboard.today_agenda()?;
        let sessions = dashboard.todays_sessions()?;
        Ok::<_, PersistenceError>((dashboard.today(), tasks, sessions))
    })?;
    let sessions = sessions
        .into_iter()
        .map(|(time, client)| json!({ "time": format_time(time), "client": client }))
        .collect::<Vec<_>>();
    Ok(Json(json!({
        "date": date,
        "weekday": weekday_name(date.weekday()),
        "tasks": tasks,
        "sessions": sessions,
    })))
}

async fn week_agenda(
    State(state): State<AppState>,
    Query(query): Query<WeekQuery>,
) -> Result<Response, ApiError> {
    let agenda = state.with_dashboard(|dashboard| dashboard.week_agenda())?;
    let agenda = match query.start {
        Some(start) => agenda.starting_from(start),
        None => agenda,
    };
    Ok(Json(agenda).into_response())
}

async fn birthdays(
    State(state): State<AppState>,
    Query(query): Query<WindowQuery>,
) -> Result<Response, ApiError> {
    let window = query.window()?;
    let birthdays = state.with_dashboard(|dashboard| dashboard.birthdays_in_window(window))?;
    Ok(Json(birthdays).into_response())
}

async fn events(
    State(state): State<AppState>,
    Query(query): Query<WindowQuery>,
) -> Result<Json<Value>, ApiError> {
    let window = query.window()?;
    let upcoming = state.with_dashboard(|dashboard| dashboard.events_in_window(window))?;
    let errors = upcoming
        .errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>();
    Ok(Json(json!({ "entries": upcoming.entries, "errors": errors })))
}

async fn upcoming(
    State(state): State<AppState>,
    Query(query): Query<WindowQuery>,
) -> Result<Response, ApiError> {
    let window = query.window()?;
    let merged = state.with_dashboard(|dashboard| dashboard.upcoming(window))?;
    Ok(Json(merged).into_response())
}

async fn event_descriptions(State(state): State<AppState>) -> Result<Json<Vec<Value>>, ApiError> {
    let described = state.with_dashboard(|dashboard| dashboard.event_descriptions())?;
    let body = described
        .into_iter()
        .map(|(event, description)| match description {
            Ok(description) => json!({
                "title": event.title,
                "date": event.date,
                "frequency": event.frequency,
                "description": description,
            }),
            Err(err) => json!({
                "title": event.title,
                "date": event.date,
                "frequency": event.frequency,
                "error": err.to_string(),
            }),
        })
        .collect();
    Ok(Json(body))
}

async fn create_task(
    State(state): State<AppState>,
    Json(input): Json<NewTask>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let task = state.with_dashboard(|dashboard| dashboard.add_task(input))?;
    let message = messages::successful_add(&task.title, TASKS);
    Ok((
        StatusCode::CREATED,
        Json(json!({ "task": task, "message": message })),
    ))
}

async fn delete_tasks(
    State(state): State<AppState>,
    Json(payload): Json<DeleteTasksPayload>,
) -> Result<Json<Value>, ApiError> {
    let removals = payload
        .removals
        .into_iter()
        .map(|removal| (removal.day, removal.title))
        .collect::<Vec<_>>();
    let removed = state.with_dashboard(|dashboard| dashboard.remove_task_days(&removals))?;
    let message = messages::successful_delete(&removed, TASKS);
    Ok(Json(json!({ "removed": removed, "message": message })))
}

async fn create_event(
    State(state): State<AppState>,
    Json(input): Json<NewEvent>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let event = state.with_dashboard(|dashboard| dashboard.add_event(input))?;
    let message = messages::successful_add(&event.title, EVENTS);
    Ok((
        StatusCode::CREATED,
        Json(json!({ "event": event, "message": message })),
    ))
}

async fn delete_events(
    State(state): State<AppState>,
    Json(payload): Json<DeleteEventsPayload>,
) -> Result<Json<Value>, ApiError> {
    let removed = state.with_dashboard(|dashboard| dashboard.delete_events(&payload.titles))?;
    let message = messages::successful_delete(&payload.titles, EVENTS);
    Ok(Json(json!({ "removed": removed, "message": message })))
}

async fn create_client(
    State(state): State<AppState>,
    Json(input): Json<NewClient>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let client = state.with_dashboard(|dashboard| dashboard.add_client(input))?;
    let message = messages::successful_add(&client.client_name, CURRENT_CLIENTS);
    Ok((
        StatusCode::CREATED,
        Json(json!({ "client": client, "message": message })),
    ))
}

async fn clients(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let roster = state.with_dashboard(|dashboard| dashboard.clients())?;
    Ok(Json(json!({
        "current": client_names(&roster.current),
        "archived": client_names(&roster.archived),
    })))
}

async fn edit_client(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(input): Json<NewClient>,
) -> Result<Json<Value>, ApiError> {
    let client = state.with_dashboard(|dashboard| dashboard.edit_client(&name, input))?;
    let message = messages::successful_edit(&client.display_name());
    Ok(Json(json!({ "client": client, "message": message })))
}

async fn archive_client(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let client = state.with_dashboard(|dashboard| dashboard.archive_client(&name))?;
    let message = messages::successful_move(&client.display_name(), ARCHIVED_CLIENTS);
    Ok(Json(json!({ "client": client, "message": message })))
}

async fn restore_client(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let client = state.with_dashboard(|dashboard| dashboard.restore_client(&name))?;
    let message = messages::successful_move(&client.display_name(), CURRENT_CLIENTS);
    Ok(Json(json!({ "client": client, "message": message })))
}

async fn delete_client(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let client = state.with_dashboard(|dashboard| dashboard.delete_archived_client(&name))?;
    let message = messages::successful_delete(&[client.display_name()], ARCHIVED_CLIENTS);
    Ok(Json(json!({ "client": client, "message": message })))
}

async fn sweep(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let outcome = state.with_dashboard(|dashboard| dashboard.sweep())?;
    Ok(Json(json!({
        "tasks_removed": outcome.tasks_removed,
        "events_removed": outcome.events_removed,
    })))
}
