//! services/api/src/lib.rs
//!
//! The planner HTTP service: configuration, the Postgres adapter, and the routes
//! that serve the classified dashboard.

pub mod adapters;
pub mod config;
pub mod error;
pub mod web;
