//! crates/planner_core/src/classifier.rs
//!
//! Temporal classification of events and class schedules.
//!
//! Every function here is pure: it reads its inputs and a `TimeWindows` value and
//! returns fresh collections. Malformed records degrade to defaults instead of
//! failing the pass.

use std::cmp::Ordering;
use std::fmt;

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::domain::{ClassSchedule, Event, EventKind, Timestamp};
use crate::window::TimeWindows;

//=========================================================================================
// Event Status
//=========================================================================================

/// The dashboard bucket of an active event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    Today,
    Ongoing,
    Coming,
    Overdue,
}

impl EventStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Today => "today",
            Self::Ongoing => "ongoing",
            Self::Coming => "coming",
            Self::Overdue => "overdue",
        }
    }
}

impl fmt::Display for EventStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Assigns the status of a single event. First matching rule wins:
///
/// 1. unparseable start or end: `Coming`
/// 2. ends before today: `Overdue`
/// 3. ends during today: `Today`
/// 4. starts after today: `Coming`
/// 5. otherwise it spans past the end of today: `Ongoing`
pub fn classify_event(event: &Event, windows: &TimeWindows) -> EventStatus {
    let (Some(start), Some(end)) = (
        windows.instant(&event.start_time),
        windows.instant(&event.end_time),
    ) else {
        return EventStatus::Coming;
    };

    if end < windows.start_of_today {
        EventStatus::Overdue
    } else if end < windows.end_of_today {
        EventStatus::Today
    } else if start >= windows.end_of_today {
        EventStatus::Coming
    } else {
        EventStatus::Ongoing
    }
}

/// True when either timestamp of the event fails to parse.
pub fn is_malformed(event: &Event, windows: &TimeWindows) -> bool {
    windows.instant(&event.start_time).is_none() || windows.instant(&event.end_time).is_none()
}

//=========================================================================================
// Grouping
//=========================================================================================

/// An active event together with the bucket it landed in.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassifiedEvent {
    pub status: EventStatus,
    #[serde(flatten)]
    pub event: Event,
}

/// The four mutually exclusive buckets of the active event set, each ordered by start.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EventGroups {
    pub today: Vec<ClassifiedEvent>,
    pub ongoing: Vec<ClassifiedEvent>,
    pub coming: Vec<ClassifiedEvent>,
    pub overdue: Vec<ClassifiedEvent>,
}

impl EventGroups {
    pub fn get(&self, status: EventStatus) -> &[ClassifiedEvent] {
        match status {
            EventStatus::Today => &self.today,
            EventStatus::Ongoing => &self.ongoing,
            EventStatus::Coming => &self.coming,
            EventStatus::Overdue => &self.overdue,
        }
    }

    pub fn len(&self) -> usize {
        self.today.len() + self.ongoing.len() + self.coming.len() + self.overdue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn bucket_mut(&mut self, status: EventStatus) -> &mut Vec<ClassifiedEvent> {
        match status {
            EventStatus::Today => &mut self.today,
            EventStatus::Ongoing => &mut self.ongoing,
            EventStatus::Coming => &mut self.coming,
            EventStatus::Overdue => &mut self.overdue,
        }
    }
}

/// Partitions the events that are not completed into status groups.
pub fn group_events(events: &[Event], windows: &TimeWindows) -> EventGroups {
    let mut active: Vec<&Event> = events.iter().filter(|e| !e.completed).collect();
    active.sort_by(|a, b| by_instant(windows, &a.start_time, &b.start_time));

    let mut groups = EventGroups::default();
    for event in active {
        let status = classify_event(event, windows);
        groups.bucket_mut(status).push(ClassifiedEvent {
            status,
            event: event.clone(),
        });
    }
    groups
}

/// Completed events, ordered by when they ended. They never enter a status group.
pub fn completed_events(events: &[Event], windows: &TimeWindows) -> Vec<Event> {
    let mut done: Vec<Event> = events.iter().filter(|e| e.completed).cloned().collect();
    done.sort_by(|a, b| by_instant(windows, &a.end_time, &b.end_time));
    done
}

/// Ids of active events whose timestamps could not be read.
pub fn malformed_events(events: &[Event], windows: &TimeWindows) -> Vec<Uuid> {
    events
        .iter()
        .filter(|e| !e.completed && is_malformed(e, windows))
        .map(|e| e.id)
        .collect()
}

// Unparseable keys sort after every valid one; `sort_by` keeps ties in input order.
fn by_instant(windows: &TimeWindows, a: &Timestamp, b: &Timestamp) -> Ordering {
    match (windows.instant(a), windows.instant(b)) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

//=========================================================================================
// Weekly Aggregation
//=========================================================================================

/// "This week at a glance" counts over the active events.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct WeekSummary {
    pub total: usize,
    pub assignments: usize,
    pub quizzes: usize,
    pub exams: usize,
    pub timeblocks: usize,
}

impl WeekSummary {
    fn record(&mut self, kind: EventKind) {
        self.total += 1;
        match kind {
            EventKind::Assignment => self.assignments += 1,
            EventKind::Quiz => self.quizzes += 1,
            EventKind::Exam => self.exams += 1,
            EventKind::Timeblock => self.timeblocks += 1,
            EventKind::Other => {}
        }
    }
}

/// True when `[start, end]` touches `[start_of_week, end_of_week]`, bounds included.
///
/// This is looser than the half-open today window: an event ending exactly at the
/// start of the week, or starting exactly at its end, still counts.
pub fn touches_week(start: DateTime<Utc>, end: DateTime<Utc>, windows: &TimeWindows) -> bool {
    start <= windows.end_of_week && end >= windows.start_of_week
}

pub fn week_summary(events: &[Event], windows: &TimeWindows) -> WeekSummary {
    let mut summary = WeekSummary::default();
    for event in events.iter().filter(|e| !e.completed) {
        let (Some(start), Some(end)) = (
            windows.instant(&event.start_time),
            windows.instant(&event.end_time),
        ) else {
            continue;
        };
        if touches_week(start, end, windows) {
            summary.record(event.kind);
        }
    }
    summary
}

//=========================================================================================
// Class Occurrence
//=========================================================================================

/// Whether the class meets on `day`: its weekday is listed and the ISO date falls
/// inside `[start_date, end_date]`, compared as strings.
pub fn class_occurs_on(class: &ClassSchedule, day: NaiveDate) -> bool {
    let weekday = day.weekday().num_days_from_sunday() as i32;
    let day_key = day.format("%Y-%m-%d").to_string();
    occurs(class, weekday, &day_key)
}

fn occurs(class: &ClassSchedule, weekday: i32, day_key: &str) -> bool {
    let Some(days) = class.days_of_week.as_deref() else {
        return false;
    };
    if !days.contains(&weekday) {
        return false;
    }
    match (class.start_date.key(), class.end_date.key()) {
        (Some(start), Some(end)) => start <= day_key && day_key <= end,
        _ => false,
    }
}

/// The schedules meeting on the consumer's current date, in input order.
pub fn classes_today(classes: &[ClassSchedule], windows: &TimeWindows) -> Vec<ClassSchedule> {
    let weekday = windows.weekday_index as i32;
    let today = windows.today_key();
    classes
        .iter()
        .filter(|class| occurs(class, weekday, &today))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    // Wednesday 2025-03-12, 10:00 UTC.
    fn windows() -> TimeWindows {
        TimeWindows::at(&Utc.with_ymd_and_hms(2025, 3, 12, 10, 0, 0).unwrap())
    }

    fn event(kind: EventKind, start: DateTime<Utc>, end: DateTime<Utc>) -> Event {
        Event {
            id: Uuid::new_v4(),
            title: format!("{} {}", kind.as_str(), start),
            description: None,
            kind,
            start_time: start.into(),
            end_time: end.into(),
            course_name: None,
            completed: false,
        }
    }

    fn raw_event(start: &str, end: &str) -> Event {
        Event {
            start_time: Timestamp::new(start),
            end_time: Timestamp::new(end),
            ..event(EventKind::Quiz, Utc::now(), Utc::now())
        }
    }

    fn class(days: Option<Vec<i32>>, start: &str, end: &str) -> ClassSchedule {
        ClassSchedule {
            id: Uuid::new_v4(),
            course_name: "CS 101".to_string(),
            location: None,
            days_of_week: days,
            start_date: crate::domain::CalendarDay::new(start),
            end_date: crate::domain::CalendarDay::new(end),
            class_start_time: "09:00:00".to_string(),
            class_end_time: "10:15:00".to_string(),
        }
    }

    #[test]
    fn within_today_is_today() {
        let w = windows();
        let sod = w.start_of_today;
        let e = event(EventKind::Exam, sod + Duration::hours(2), sod + Duration::hours(4));
        assert_eq!(classify_event(&e, &w), EventStatus::Today);
    }

    #[test]
    fn spanning_today_is_ongoing() {
        let w = windows();
        let sod = w.start_of_today;
        let e = event(EventKind::Timeblock, sod - Duration::days(3), sod + Duration::days(3));
        assert_eq!(classify_event(&e, &w), EventStatus::Ongoing);
    }

    #[test]
    fn starting_after_today_is_coming() {
        let w = windows();
        let eod = w.end_of_today;
        let e = event(EventKind::Quiz, eod + Duration::hours(1), eod + Duration::hours(2));
        assert_eq!(classify_event(&e, &w), EventStatus::Coming);
    }

    #[test]
    fn ending_before_today_is_overdue_whatever_the_start() {
        let w = windows();
        let sod = w.start_of_today;
        let end = sod - Duration::seconds(1);
        for start in [sod - Duration::days(30), end - Duration::hours(1), end + Duration::days(5)] {
            assert_eq!(
                classify_event(&event(EventKind::Assignment, start, end), &w),
                EventStatus::Overdue
            );
        }
    }

    #[test]
    fn today_window_is_half_open() {
        let w = windows();
        let sod = w.start_of_today;
        let eod = w.end_of_today;
        let at_start = event(EventKind::Quiz, sod - Duration::hours(1), sod);
        assert_eq!(classify_event(&at_start, &w), EventStatus::Today);
        // Ending exactly at the exclusive upper bound while starting today.
        let at_end = event(EventKind::Quiz, sod + Duration::hours(20), eod);
        assert_eq!(classify_event(&at_end, &w), EventStatus::Ongoing);
        let starts_at_end = event(EventKind::Quiz, eod, eod + Duration::hours(1));
        assert_eq!(classify_event(&starts_at_end, &w), EventStatus::Coming);
    }

    #[test]
    fn started_today_ending_later_is_ongoing() {
        let w = windows();
        let sod = w.start_of_today;
        let e = event(EventKind::Assignment, sod + Duration::hours(9), sod + Duration::days(2));
        assert_eq!(classify_event(&e, &w), EventStatus::Ongoing);
    }

    #[test]
    fn unparseable_timestamps_fall_back_to_coming() {
        let w = windows();
        let broken = raw_event("not a date", "2025-03-01T00:00:00Z");
        assert_eq!(classify_event(&broken, &w), EventStatus::Coming);
        assert!(is_malformed(&broken, &w));
        let empty_end = raw_event("2025-03-01T00:00:00Z", "");
        assert_eq!(classify_event(&empty_end, &w), EventStatus::Coming);
    }

    #[test]
    fn date_only_deadline_in_the_past_is_overdue() {
        let w = windows();
        let e = raw_event("2025-03-09", "2025-03-10");
        assert_eq!(classify_event(&e, &w), EventStatus::Overdue);
        assert!(!is_malformed(&e, &w));
    }

    #[test]
    fn exactly_one_status_for_a_sweep_of_events() {
        let w = windows();
        let base = w.start_of_today - Duration::days(3);
        let events: Vec<Event> = (0..24)
            .flat_map(|i| {
                let start = base + Duration::hours(6 * i);
                (1..6).map(move |len| event(EventKind::Quiz, start, start + Duration::hours(7 * len)))
            })
            .collect();

        let groups = group_events(&events, &w);
        assert_eq!(groups.len(), events.len());
        for e in &events {
            let status = classify_event(e, &w);
            let hits = [
                EventStatus::Today,
                EventStatus::Ongoing,
                EventStatus::Coming,
                EventStatus::Overdue,
            ]
            .into_iter()
            .filter(|s| groups.get(*s).iter().any(|c| c.event.id == e.id))
            .collect::<Vec<_>>();
            assert_eq!(hits, vec![status]);
        }
    }

    #[test]
    fn groups_are_sorted_by_start() {
        let w = windows();
        let eod = w.end_of_today;
        let later = event(EventKind::Exam, eod + Duration::days(2), eod + Duration::days(3));
        let sooner = event(EventKind::Quiz, eod + Duration::hours(1), eod + Duration::hours(2));
        let broken = raw_event("??", "??");

        let groups = group_events(&[broken.clone(), later.clone(), sooner.clone()], &w);
        let ids: Vec<Uuid> = groups.coming.iter().map(|c| c.event.id).collect();
        assert_eq!(ids, vec![sooner.id, later.id, broken.id]);
        assert!(groups.coming.iter().all(|c| c.status == EventStatus::Coming));
    }

    #[test]
    fn completed_events_are_kept_out_of_groups() {
        let w = windows();
        let sod = w.start_of_today;
        let mut first = event(EventKind::Exam, sod - Duration::days(3), sod - Duration::days(2));
        let mut second = event(EventKind::Exam, sod - Duration::days(9), sod - Duration::days(8));
        first.completed = true;
        second.completed = true;

        let events = vec![first.clone(), second.clone()];
        assert!(group_events(&events, &w).is_empty());
        assert_eq!(week_summary(&events, &w), WeekSummary::default());
        let done: Vec<Uuid> = completed_events(&events, &w).iter().map(|e| e.id).collect();
        assert_eq!(done, vec![second.id, first.id]);

        // Reopening puts it back into exactly one group.
        first.completed = false;
        let groups = group_events(&[first.clone(), second], &w);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups.overdue[0].event.id, first.id);
    }

    #[test]
    fn week_overlap_includes_both_bounds() {
        let w = windows();
        let sow = w.start_of_week;
        let eow = w.end_of_week;
        let events = vec![
            event(EventKind::Assignment, sow, sow + Duration::hours(1)),
            event(EventKind::Quiz, sow - Duration::days(1), sow),
            event(EventKind::Exam, eow, eow + Duration::hours(2)),
            event(EventKind::Timeblock, sow - Duration::days(10), eow + Duration::days(10)),
            event(EventKind::Other, sow + Duration::days(2), sow + Duration::days(2)),
            // Entirely outside.
            event(EventKind::Exam, sow - Duration::days(3), sow - Duration::seconds(1)),
            event(EventKind::Exam, eow + Duration::seconds(1), eow + Duration::days(1)),
        ];

        let summary = week_summary(&events, &w);
        assert_eq!(
            summary,
            WeekSummary {
                total: 5,
                assignments: 1,
                quizzes: 1,
                exams: 1,
                timeblocks: 1,
            }
        );
    }

    #[test]
    fn week_summary_skips_unparseable_events() {
        let w = windows();
        assert_eq!(week_summary(&[raw_event("", "")], &w).total, 0);
    }

    #[test]
    fn class_meets_on_listed_days_within_range() {
        let mwf = class(Some(vec![1, 3, 5]), "2025-01-01", "2025-12-31");
        let wednesday = NaiveDate::from_ymd_opt(2025, 3, 12).unwrap();
        let tuesday = NaiveDate::from_ymd_opt(2025, 3, 11).unwrap();
        assert!(class_occurs_on(&mwf, wednesday));
        assert!(!class_occurs_on(&mwf, tuesday));
        assert!(!class_occurs_on(&mwf, NaiveDate::from_ymd_opt(2024, 12, 25).unwrap()));
        assert!(!class_occurs_on(&mwf, NaiveDate::from_ymd_opt(2026, 1, 7).unwrap()));
    }

    #[test]
    fn class_range_bounds_are_inclusive() {
        let single_day = class(Some(vec![3]), "2025-03-12", "2025-03-12T00:00:00.000Z");
        assert!(class_occurs_on(&single_day, NaiveDate::from_ymd_opt(2025, 3, 12).unwrap()));
    }

    #[test]
    fn classes_today_skips_incomplete_schedules() {
        let w = windows();
        let meets = class(Some(vec![3]), "2025-01-01", "2025-06-30");
        let no_days = class(None, "2025-01-01", "2025-06-30");
        let no_start = class(Some(vec![3]), "", "2025-06-30");
        let other_day = class(Some(vec![2, 4]), "2025-01-01", "2025-06-30");

        let today = classes_today(&[no_days, meets.clone(), no_start, other_day], &w);
        assert_eq!(today, vec![meets]);
    }

    #[test]
    fn classification_is_repeatable() {
        let w = windows();
        let sod = w.start_of_today;
        let events = vec![
            event(EventKind::Quiz, sod + Duration::hours(1), sod + Duration::hours(2)),
            event(EventKind::Exam, sod - Duration::days(2), sod - Duration::days(1)),
            raw_event("bad", "bad"),
        ];
        let snapshot = events.clone();

        assert_eq!(group_events(&events, &w), group_events(&events, &w));
        assert_eq!(week_summary(&events, &w), week_summary(&events, &w));
        assert_eq!(events, snapshot);
    }
}
