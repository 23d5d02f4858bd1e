//! crates/planner_core/src/dashboard.rs
//!
//! Runs one complete classification pass over a user's records.

use chrono::{DateTime, TimeZone};
use serde::Serialize;
use uuid::Uuid;

use crate::classifier::{
    classes_today, completed_events, group_events, malformed_events, week_summary, EventGroups,
    WeekSummary,
};
use crate::domain::{ClassSchedule, Event};
use crate::window::TimeWindows;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    #[serde(skip)]
    pub windows: TimeWindows,
    pub groups: EventGroups,
    pub completed: Vec<Event>,
    pub this_week: WeekSummary,
    pub classes_today: Vec<ClassSchedule>,
    /// Active events placed in `coming` only because a timestamp could not be read.
    pub malformed: Vec<Uuid>,
}

impl Dashboard {
    /// Builds the dashboard for `now`, read in its own time zone.
    ///
    /// The inputs are only borrowed; running the pass twice with the same arguments
    /// yields equal dashboards.
    pub fn build<Tz: TimeZone>(
        now: &DateTime<Tz>,
        events: &[Event],
        classes: &[ClassSchedule],
    ) -> Self {
        let windows = TimeWindows::at(now);
        Self {
            groups: group_events(events, &windows),
            completed: completed_events(events, &windows),
            this_week: week_summary(events, &windows),
            classes_today: classes_today(classes, &windows),
            malformed: malformed_events(events, &windows),
            windows,
        }
    }
}
