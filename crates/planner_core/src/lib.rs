pub mod classifier;
pub mod dashboard;
pub mod domain;
pub mod ports;
pub mod window;

pub use classifier::{
    class_occurs_on, classes_today, classify_event, completed_events, group_events,
    week_summary, ClassifiedEvent, EventGroups, EventStatus, WeekSummary,
};
pub use dashboard::Dashboard;
pub use domain::{CalendarDay, ClassSchedule, Event, EventKind, Timestamp, User};
pub use ports::{DatabaseService, PortError, PortResult};
pub use window::TimeWindows;
