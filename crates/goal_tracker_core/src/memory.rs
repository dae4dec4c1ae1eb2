//! crates/goal_tracker_core/src/memory.rs
//!
//! An in-process implementation of the `GoalRepository` port. It backs the
//! router-level tests and local runs that have no database at hand.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

use crate::domain::{select_current, total_pages, Goal, GoalChanges, GoalListQuery, GoalPage, NewGoal};
use crate::ports::{GoalRepository, PortError, PortResult};

#[derive(Default)]
pub struct InMemoryGoalRepository {
    goals: Mutex<HashMap<Uuid, Goal>>,
}

impl InMemoryGoalRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a goal as-is, keeping its id and timestamps.
    pub fn insert(&self, goal: Goal) -> PortResult<()> {
        self.lock()?.insert(goal.id, goal);
        Ok(())
    }

    fn lock(&self) -> PortResult<MutexGuard<'_, HashMap<Uuid, Goal>>> {
        self.goals
            .lock()
            .map_err(|e| PortError::Unexpected(format!("goal store lock poisoned: {}", e)))
    }
}

fn not_found(goal_id: Uuid) -> PortError {
    PortError::NotFound(format!("Goal {} not found", goal_id))
}

#[async_trait]
impl GoalRepository for InMemoryGoalRepository {
    async fn find_current(&self) -> PortResult<Option<Goal>> {
        let goals = self.lock()?;
        Ok(select_current(goals.values()).cloned())
    }

    async fn list_goals(&self, query: &GoalListQuery) -> PortResult<GoalPage> {
        let goals = self.lock()?;
        let mut matching: Vec<&Goal> = goals.values().filter(|g| query.matches(g.status)).collect();
        matching.sort_by(|a, b| b.updated_at.cmp(&a.updated_at).then_with(|| b.id.cmp(&a.id)));

        let total = matching.len() as i64;
        let page = match query.offset() {
            Some(offset) => matching
                .into_iter()
                .skip(usize::try_from(offset).unwrap_or(usize::MAX))
                .take(usize::try_from(query.limit).unwrap_or(usize::MAX))
                .cloned()
                .collect(),
            None => Vec::new(),
        };

        Ok(GoalPage {
            goals: page,
            total,
            page: query.page,
            total_pages: total_pages(total, query.limit),
        })
    }

    async fn get_goal_by_id(&self, goal_id: Uuid) -> PortResult<Goal> {
        self.lock()?.get(&goal_id).cloned().ok_or_else(|| not_found(goal_id))
    }

    async fn create_goal(&self, goal: NewGoal) -> PortResult<Goal> {
        let goal = goal.into_goal(Uuid::new_v4(), Utc::now());
        self.lock()?.insert(goal.id, goal.clone());
        Ok(goal)
    }

    async fn update_goal(&self, goal_id: Uuid, changes: GoalChanges) -> PortResult<Goal> {
        let mut goals = self.lock()?;
        let goal = goals.get_mut(&goal_id).ok_or_else(|| not_found(goal_id))?;
        changes.apply(goal, Utc::now());
        Ok(goal.clone())
    }

    async fn delete_goal(&self, goal_id: Uuid) -> PortResult<()> {
        self.lock()?
            .remove(&goal_id)
            .map(|_| ())
            .ok_or_else(|| not_found(goal_id))
    }
}
