//! crates/goal_tracker_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of the concrete persistence layer.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Goal, GoalChanges, GoalListQuery, GoalPage, NewGoal};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., database).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Invalid input: {0}")]
    Invalid(String),
    /// A failure reported by the store, with its diagnostic code when it has one.
    #[error("Database error: {message}")]
    Database {
        code: Option<String>,
        message: String,
    },
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait GoalRepository: Send + Sync {
    /// The most recently updated goal in an open status, if any.
    async fn find_current(&self) -> PortResult<Option<Goal>>;

    /// A page of goals ordered by most recent update first.
    async fn list_goals(&self, query: &GoalListQuery) -> PortResult<GoalPage>;

    async fn get_goal_by_id(&self, goal_id: Uuid) -> PortResult<Goal>;

    async fn create_goal(&self, goal: NewGoal) -> PortResult<Goal>;

    /// Applies `changes` and refreshes `updated_at`. Fails with
    /// [`PortError::NotFound`] when the goal does not exist.
    async fn update_goal(&self, goal_id: Uuid, changes: GoalChanges) -> PortResult<Goal>;

    async fn delete_goal(&self, goal_id: Uuid) -> PortResult<()>;
}
