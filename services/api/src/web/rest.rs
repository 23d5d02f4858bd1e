//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the REST API endpoints and the master
//! definition for the OpenAPI specification.

use crate::config::{offset_from_minutes, Config};
use crate::web::state::AppState;
use axum::{
    extract::{Extension, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use chrono::{DateTime, FixedOffset, Utc};
use planner_core::{
    classes_today, ClassSchedule, ClassifiedEvent, Dashboard, Event, EventStatus, TimeWindows,
    User, WeekSummary,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error, warn};
use utoipa::{IntoParams, OpenApi, ToSchema};
use uuid::Uuid;

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        health_handler,
        dashboard_handler,
        classes_today_handler,
    ),
    components(
        schemas(DashboardResponse, ClassesTodayResponse, EventView, ClassView, WeekView)
    ),
    tags(
        (name = "Planner API", description = "Dashboard views over a student's events and class schedules.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// API Query, Response and Payload Structs
//=========================================================================================

/// Pins the reference time and the consumer's calendar for a request.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TimeQuery {
    /// RFC 3339 instant to classify against instead of the server clock.
    pub at: Option<String>,
    /// The consumer's offset from UTC in minutes (east positive).
    pub tz_offset_minutes: Option<i32>,
}

/// An event as shown on the dashboard. `status` is absent for completed events.
#[derive(Debug, Serialize, ToSchema)]
pub struct EventView {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub event_type: String,
    pub start_time: String,
    pub end_time: String,
    pub course_name: Option<String>,
    pub completed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl EventView {
    fn new(event: &Event, status: Option<EventStatus>) -> Self {
        Self {
            id: event.id,
            title: event.title.clone(),
            description: event.description.clone(),
            event_type: event.kind.as_str().to_string(),
            start_time: event.start_time.as_str().to_string(),
            end_time: event.end_time.as_str().to_string(),
            course_name: event.course_name.clone(),
            completed: event.completed,
            status: status.map(|s| s.as_str().to_string()),
        }
    }

    fn from_group(group: &[ClassifiedEvent]) -> Vec<Self> {
        group
            .iter()
            .map(|c| Self::new(&c.event, Some(c.status)))
            .collect()
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ClassView {
    pub id: Uuid,
    pub course_name: String,
    pub location: Option<String>,
    pub days_of_week: Vec<i32>,
    pub start_date: String,
    pub end_date: String,
    pub class_start_time: String,
    pub class_end_time: String,
}

impl From<&ClassSchedule> for ClassView {
    fn from(class: &ClassSchedule) -> Self {
        Self {
            id: class.id,
            course_name: class.course_name.clone(),
            location: class.location.clone(),
            days_of_week: class.days_of_week.clone().unwrap_or_default(),
            start_date: class.start_date.as_str().to_string(),
            end_date: class.end_date.as_str().to_string(),
            class_start_time: class.class_start_time.clone(),
            class_end_time: class.class_end_time.clone(),
        }
    }
}

/// "This week at a glance" counts.
#[derive(Debug, Serialize, ToSchema)]
pub struct WeekView {
    pub total: usize,
    pub assignments: usize,
    pub quizzes: usize,
    pub exams: usize,
    pub timeblocks: usize,
}

impl From<WeekSummary> for WeekView {
    fn from(summary: WeekSummary) -> Self {
        Self {
            total: summary.total,
            assignments: summary.assignments,
            quizzes: summary.quizzes,
            exams: summary.exams,
            timeblocks: summary.timeblocks,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DashboardResponse {
    pub display_name: String,
    pub now: String,
    pub start_of_today: String,
    pub end_of_today: String,
    pub start_of_week: String,
    pub end_of_week: String,
    pub today: Vec<EventView>,
    pub ongoing: Vec<EventView>,
    pub coming: Vec<EventView>,
    pub overdue: Vec<EventView>,
    pub completed: Vec<EventView>,
    pub this_week: WeekView,
    pub classes_today: Vec<ClassView>,
    /// Events listed under `coming` only because a timestamp could not be read.
    pub malformed_event_ids: Vec<Uuid>,
}

impl DashboardResponse {
    fn new(user: &User, dashboard: Dashboard) -> Self {
        let windows = &dashboard.windows;
        let local = |instant: DateTime<Utc>| instant.with_timezone(&windows.offset).to_rfc3339();
        Self {
            display_name: user.display_name().to_string(),
            now: local(windows.now),
            start_of_today: local(windows.start_of_today),
            end_of_today: local(windows.end_of_today),
            start_of_week: local(windows.start_of_week),
            end_of_week: local(windows.end_of_week),
            today: EventView::from_group(&dashboard.groups.today),
            ongoing: EventView::from_group(&dashboard.groups.ongoing),
            coming: EventView::from_group(&dashboard.groups.coming),
            overdue: EventView::from_group(&dashboard.groups.overdue),
            completed: dashboard
                .completed
                .iter()
                .map(|e| EventView::new(e, None))
                .collect(),
            this_week: dashboard.this_week.into(),
            classes_today: dashboard.classes_today.iter().map(ClassView::from).collect(),
            malformed_event_ids: dashboard.malformed,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ClassesTodayResponse {
    /// The consumer's calendar date, `YYYY-MM-DD`.
    pub date: String,
    /// 0 = Sunday ... 6 = Saturday.
    pub weekday: u32,
    pub classes: Vec<ClassView>,
}

//=========================================================================================
// Helpers
//=========================================================================================

/// Resolves "now" for a request: the pinned instant or the clock, read in the
/// requested offset or the configured default.
pub fn resolve_now(
    query: &TimeQuery,
    config: &Config,
) -> Result<DateTime<FixedOffset>, (StatusCode, String)> {
    let offset = match query.tz_offset_minutes {
        Some(minutes) => offset_from_minutes(minutes).ok_or_else(|| {
            (
                StatusCode::BAD_REQUEST,
                format!("tz_offset_minutes {} is out of range", minutes),
            )
        })?,
        None => config.default_utc_offset,
    };

    let instant = match query.at.as_deref() {
        Some(raw) => DateTime::parse_from_rfc3339(raw)
            .map_err(|e| {
                (
                    StatusCode::BAD_REQUEST,
                    format!("'at' must be an RFC 3339 instant: {}", e),
                )
            })?
            .with_timezone(&Utc),
        None => Utc::now(),
    };

    Ok(instant.with_timezone(&offset))
}

//=========================================================================================
// REST API Handlers
//=========================================================================================

/// Liveness check.
#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "The service is running", body = String)
    )
)]
pub async fn health_handler() -> &'static str {
    "Student planner API is running!"
}

/// The full dashboard for the requesting user.
///
/// Events are bucketed into today / ongoing / coming / overdue, completed events are
/// listed separately, and the week counts and today's classes are computed for the
/// same reference time.
#[utoipa::path(
    get,
    path = "/api/dashboard",
    responses(
        (status = 200, description = "Dashboard computed", body = DashboardResponse),
        (status = 400, description = "Invalid `at` or `tz_offset_minutes`"),
        (status = 401, description = "Missing or unknown user"),
        (status = 500, description = "Internal server error")
    ),
    params(
        TimeQuery,
        ("x-user-id" = Uuid, Header, description = "The unique ID of the user.")
    )
)]
pub async fn dashboard_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Query(query): Query<TimeQuery>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let now = resolve_now(&query, &app_state.config)?;

    let db = &app_state.db;
    let (events, classes) = tokio::try_join!(
        db.list_events_for_user(user.user_id),
        db.list_classes_for_user(user.user_id)
    )
    .map_err(|e| {
        error!("Failed to load records for user {}: {:?}", user.user_id, e);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to load planner records".to_string(),
        )
    })?;

    let dashboard = Dashboard::build(&now, &events, &classes);
    if !dashboard.malformed.is_empty() {
        warn!(
            "User {} has {} event(s) with unreadable timestamps",
            user.user_id,
            dashboard.malformed.len()
        );
    }
    debug!(
        "Dashboard for user {} at {}: {} active, {} completed, {} classes today",
        user.user_id,
        now,
        dashboard.groups.len(),
        dashboard.completed.len(),
        dashboard.classes_today.len()
    );

    Ok(Json(DashboardResponse::new(&user, dashboard)))
}

/// The class schedules meeting on the consumer's current date.
#[utoipa::path(
    get,
    path = "/api/classes/today",
    responses(
        (status = 200, description = "Today's classes", body = ClassesTodayResponse),
        (status = 400, description = "Invalid `at` or `tz_offset_minutes`"),
        (status = 401, description = "Missing or unknown user"),
        (status = 500, description = "Internal server error")
    ),
    params(
        TimeQuery,
        ("x-user-id" = Uuid, Header, description = "The unique ID of the user.")
    )
)]
pub async fn classes_today_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Query(query): Query<TimeQuery>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let now = resolve_now(&query, &app_state.config)?;

    let classes = app_state
        .db
        .list_classes_for_user(user.user_id)
        .await
        .map_err(|e| {
            error!("Failed to load classes for user {}: {:?}", user.user_id, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to load classes".to_string(),
            )
        })?;

    let windows = TimeWindows::at(&now);
    let meeting = classes_today(&classes, &windows);

    Ok(Json(ClassesTodayResponse {
        date: windows.today_key(),
        weekday: windows.weekday_index,
        classes: meeting.iter().map(ClassView::from).collect(),
    }))
}
