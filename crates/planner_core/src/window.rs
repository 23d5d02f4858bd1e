//! crates/planner_core/src/window.rs
//!
//! Calendar windows derived from an injected "now".
//!
//! All boundaries are local midnights of the consumer's calendar, stored as UTC
//! instants. Upper bounds are exclusive.

use chrono::{
    DateTime, Datelike, Duration, FixedOffset, NaiveDate, NaiveTime, Offset, TimeZone, Utc,
};

use crate::domain::Timestamp;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeWindows {
    pub now: DateTime<Utc>,
    /// The consumer's UTC offset at `now`, used to read zone-less timestamps.
    pub offset: FixedOffset,
    /// The consumer's local calendar date.
    pub today: NaiveDate,
    /// 0 = Sunday ... 6 = Saturday.
    pub weekday_index: u32,
    pub start_of_today: DateTime<Utc>,
    pub end_of_today: DateTime<Utc>,
    /// Monday 00:00 of the week containing `today`.
    pub start_of_week: DateTime<Utc>,
    pub end_of_week: DateTime<Utc>,
}

impl TimeWindows {
    /// Computes every window from `now`, read in its own time zone.
    pub fn at<Tz: TimeZone>(now: &DateTime<Tz>) -> Self {
        let tz = now.timezone();
        let today = now.date_naive();
        let weekday = today.weekday();
        let week_start_day = today - Duration::days(i64::from(weekday.num_days_from_monday()));

        Self {
            now: now.with_timezone(&Utc),
            offset: now.offset().fix(),
            today,
            weekday_index: weekday.num_days_from_sunday(),
            start_of_today: local_midnight(&tz, today),
            end_of_today: local_midnight(&tz, today + Duration::days(1)),
            start_of_week: local_midnight(&tz, week_start_day),
            end_of_week: local_midnight(&tz, week_start_day + Duration::days(7)),
        }
    }

    /// Today's date as the `YYYY-MM-DD` key used against `CalendarDay` values.
    pub fn today_key(&self) -> String {
        self.today.format("%Y-%m-%d").to_string()
    }

    /// Parses a record timestamp relative to the consumer's offset.
    pub fn instant(&self, timestamp: &Timestamp) -> Option<DateTime<Utc>> {
        timestamp.parse(&self.offset)
    }
}

fn local_midnight<Tz: TimeZone>(tz: &Tz, day: NaiveDate) -> DateTime<Utc> {
    let midnight = day.and_time(NaiveTime::MIN);
    tz.from_local_datetime(&midnight)
        .earliest()
        // Midnight skipped by a DST jump: the day begins at the first valid hour.
        .or_else(|| tz.from_local_datetime(&(midnight + Duration::hours(1))).earliest())
        .map(|instant| instant.with_timezone(&Utc))
        .unwrap_or_else(|| Utc.from_utc_datetime(&midnight))
}
