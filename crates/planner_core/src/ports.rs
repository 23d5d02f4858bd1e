//! crates/planner_core/src/ports.rs
//!
//! Defines the service contracts (traits) the planner core depends on.
//! The classifier never performs I/O; these ports are how the service layer
//! obtains the records it hands to the classifier.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{ClassSchedule, Event, User};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., the database).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// Read access to a single owner's planner records.
#[async_trait]
pub trait DatabaseService: Send + Sync {
    async fn find_user(&self, user_id: Uuid) -> PortResult<User>;

    /// All events owned by `user_id`, completed ones included.
    async fn list_events_for_user(&self, user_id: Uuid) -> PortResult<Vec<Event>>;

    async fn list_classes_for_user(&self, user_id: Uuid) -> PortResult<Vec<ClassSchedule>>;
}
