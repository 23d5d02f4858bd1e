//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the `DatabaseService` port from the `core` crate. It handles all interactions
//! with the PostgreSQL database using `sqlx`.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use planner_core::domain::{CalendarDay, ClassSchedule, Event, EventKind, Timestamp, User};
use planner_core::ports::{DatabaseService, PortError, PortResult};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `DatabaseService` port.
#[derive(Clone)]
pub struct DbAdapter {
    pool: PgPool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct UserRecord {
    id: Uuid,
    full_name: String,
    email: String,
}
impl UserRecord {
    fn to_domain(self) -> User {
        User {
            user_id: self.id,
            full_name: self.full_name,
            email: self.email,
        }
    }
}

#[derive(FromRow)]
struct EventRecord {
    id: Uuid,
    title: String,
    description: Option<String>,
    event_type: String,
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
    course_name: Option<String>,
    completed: bool,
}
impl EventRecord {
    fn to_domain(self) -> Event {
        Event {
            id: self.id,
            title: self.title,
            description: self.description,
            kind: EventKind::from_label(&self.event_type),
            start_time: Timestamp::from(self.start_time),
            end_time: Timestamp::from(self.end_time),
            course_name: self.course_name,
            completed: self.completed,
        }
    }
}

#[derive(FromRow)]
struct ClassScheduleRecord {
    id: Uuid,
    course_name: String,
    location: Option<String>,
    days_of_week: Vec<i32>,
    start_date: NaiveDate,
    end_date: NaiveDate,
    class_start_time: NaiveTime,
    class_end_time: NaiveTime,
}
impl ClassScheduleRecord {
    fn to_domain(self) -> ClassSchedule {
        ClassSchedule {
            id: self.id,
            course_name: self.course_name,
            location: self.location,
            days_of_week: Some(self.days_of_week),
            start_date: CalendarDay::new(self.start_date.format("%Y-%m-%d").to_string()),
            end_date: CalendarDay::new(self.end_date.format("%Y-%m-%d").to_string()),
            class_start_time: self.class_start_time.format("%H:%M:%S").to_string(),
            class_end_time: self.class_end_time.format("%H:%M:%S").to_string(),
        }
    }
}

//=========================================================================================
// `DatabaseService` Trait Implementation
//=========================================================================================

#[async_trait]
impl DatabaseService for DbAdapter {
    async fn find_user(&self, user_id: Uuid) -> PortResult<User> {
        let record = sqlx::query_as::<_, UserRecord>(
            "SELECT id, full_name, email FROM users WHERE id = $1",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => PortError::NotFound(format!("User {} not found", user_id)),
            _ => PortError::Unexpected(e.to_string()),
        })?;
        Ok(record.to_domain())
    }

    async fn list_events_for_user(&self, user_id: Uuid) -> PortResult<Vec<Event>> {
        let records = sqlx::query_as::<_, EventRecord>(
            "SELECT id, title, description, event_type, start_time, end_time, course_name, completed \
             FROM events WHERE user_id = $1 ORDER BY start_time",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| PortError::Unexpected(e.to_string()))?;

        let events = records.into_iter().map(|r| r.to_domain()).collect();
        Ok(events)
    }

    async fn list_classes_for_user(&self, user_id: Uuid) -> PortResult<Vec<ClassSchedule>> {
        let records = sqlx::query_as::<_, ClassScheduleRecord>(
            "SELECT id, course_name, location, days_of_week, start_date, end_date, \
             class_start_time, class_end_time \
             FROM class_schedules WHERE user_id = $1 ORDER BY course_name, start_date",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| PortError::Unexpected(e.to_string()))?;

        let classes = records.into_iter().map(|r| r.to_domain()).collect();
        Ok(classes)
    }
}
