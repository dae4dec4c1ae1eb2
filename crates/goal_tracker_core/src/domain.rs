//! crates/goal_tracker_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any database or HTTP framework.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::ports::PortError;

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_LIMIT: i64 = 10;

//=========================================================================================
// Goal Status
//=========================================================================================

/// Lifecycle status of a goal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GoalStatus {
    Planning,
    Active,
    Paused,
    Completed,
    Abandoned,
}

impl GoalStatus {
    /// Statuses that make a goal eligible to be the current goal.
    pub const OPEN: [GoalStatus; 3] = [GoalStatus::Planning, GoalStatus::Active, GoalStatus::Paused];

    pub fn as_str(&self) -> &'static str {
        match self {
            GoalStatus::Planning => "planning",
            GoalStatus::Active => "active",
            GoalStatus::Paused => "paused",
            GoalStatus::Completed => "completed",
            GoalStatus::Abandoned => "abandoned",
        }
    }

    pub fn is_open(&self) -> bool {
        Self::OPEN.contains(self)
    }
}

impl Default for GoalStatus {
    fn default() -> Self {
        GoalStatus::Planning
    }
}

impl fmt::Display for GoalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GoalStatus {
    type Err = PortError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "planning" => Ok(GoalStatus::Planning),
            "active" => Ok(GoalStatus::Active),
            "paused" => Ok(GoalStatus::Paused),
            "completed" => Ok(GoalStatus::Completed),
            "abandoned" => Ok(GoalStatus::Abandoned),
            other => Err(PortError::Invalid(format!("Unknown goal status '{}'", other))),
        }
    }
}

//=========================================================================================
// Goal
//=========================================================================================

/// A tracked planning goal.
#[derive(Debug, Clone, PartialEq)]
pub struct Goal {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub category: Option<String>,
    pub priority: Option<String>,
    pub status: GoalStatus,
    pub progress: i32,
    pub duration: Option<String>,
    pub start_date: String,
    pub end_date: String,
    pub actual_start_date: Option<String>,
    pub paused_at: Option<String>,
    pub target_skills: Vec<String>,
    pub success_criteria: Vec<String>,
    pub milestones: Option<Value>,
    pub generated_data: Option<Value>,
    /// Cumulative paused time, in a unit chosen by the caller. Never negative.
    pub total_paused_duration: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A validated goal ready to be inserted. Defaults are already applied.
#[derive(Debug, Clone, PartialEq)]
pub struct NewGoal {
    pub title: String,
    pub description: String,
    pub category: Option<String>,
    pub priority: Option<String>,
    pub status: GoalStatus,
    pub progress: i32,
    pub duration: Option<String>,
    pub start_date: String,
    pub end_date: String,
    pub actual_start_date: Option<String>,
    pub paused_at: Option<String>,
    pub target_skills: Vec<String>,
    pub success_criteria: Vec<String>,
    pub milestones: Option<Value>,
    pub generated_data: Option<Value>,
    pub total_paused_duration: i64,
}

impl NewGoal {
    /// Builds a goal with only the required fields set.
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        start_date: impl Into<String>,
        end_date: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            category: None,
            priority: None,
            status: GoalStatus::default(),
            progress: 0,
            duration: None,
            start_date: start_date.into(),
            end_date: end_date.into(),
            actual_start_date: None,
            paused_at: None,
            target_skills: Vec::new(),
            success_criteria: Vec::new(),
            milestones: None,
            generated_data: None,
            total_paused_duration: 0,
        }
    }

    pub fn into_goal(self, id: Uuid, now: DateTime<Utc>) -> Goal {
        Goal {
            id,
            title: self.title,
            description: self.description,
            category: self.category,
            priority: self.priority,
            status: self.status,
            progress: self.progress,
            duration: self.duration,
            start_date: self.start_date,
            end_date: self.end_date,
            actual_start_date: self.actual_start_date,
            paused_at: self.paused_at,
            target_skills: self.target_skills,
            success_criteria: self.success_criteria,
            milestones: normalize_milestones(self.milestones),
            generated_data: self.generated_data,
            total_paused_duration: self.total_paused_duration,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Empty milestone arrays are stored as absent.
pub fn normalize_milestones(milestones: Option<Value>) -> Option<Value> {
    match milestones {
        Some(Value::Array(items)) if items.is_empty() => None,
        Some(Value::Null) => None,
        other => other,
    }
}

/// [`normalize_milestones`] for partial updates: writing an empty array clears the field.
pub fn normalize_milestone_patch(patch: Patch<Value>) -> Patch<Value> {
    match patch {
        Patch::Value(value) => match normalize_milestones(Some(value)) {
            Some(value) => Patch::Value(value),
            None => Patch::Null,
        },
        other => other,
    }
}

//=========================================================================================
// Patch:distinguishing "key missing" from "key present with null"
//=========================================================================================

/// A field in a partial update.
///
/// `Missing` leaves the stored value untouched, `Null` clears it and
/// `Value` replaces it. Use with `#[serde(default)]` so that an absent
/// key deserializes to `Missing`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Patch<T> {
    Missing,
    Null,
    Value(T),
}

impl<T> Default for Patch<T> {
    fn default() -> Self {
        Patch::Missing
    }
}

impl<T> Patch<T> {
    pub fn is_missing(&self) -> bool {
        matches!(self, Patch::Missing)
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Patch<U> {
        match self {
            Patch::Missing => Patch::Missing,
            Patch::Null => Patch::Null,
            Patch::Value(v) => Patch::Value(f(v)),
        }
    }

    /// Like [`Patch::map`] for conversions that can fail.
    pub fn try_map<U, E, F: FnOnce(T) -> Result<U, E>>(self, f: F) -> Result<Patch<U>, E> {
        Ok(match self {
            Patch::Missing => Patch::Missing,
            Patch::Null => Patch::Null,
            Patch::Value(v) => Patch::Value(f(v)?),
        })
    }

    /// Applies the patch to a nullable slot.
    pub fn apply_to(self, slot: &mut Option<T>) {
        match self {
            Patch::Missing => {}
            Patch::Null => *slot = None,
            Patch::Value(v) => *slot = Some(v),
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Patch<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Option::<T>::deserialize(deserializer)? {
            Some(value) => Patch::Value(value),
            None => Patch::Null,
        })
    }
}

//=========================================================================================
// GoalChanges: the set of field writes for one mutation
//=========================================================================================

/// Field writes applied by update, status-patch and progress-patch operations.
/// `updated_at` is always refreshed by the repository.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GoalChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Patch<String>,
    pub priority: Patch<String>,
    pub status: Option<GoalStatus>,
    pub progress: Option<i32>,
    pub duration: Patch<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub actual_start_date: Patch<String>,
    pub paused_at: Patch<String>,
    pub target_skills: Option<Vec<String>>,
    pub success_criteria: Option<Vec<String>>,
    pub milestones: Patch<Value>,
    pub generated_data: Patch<Value>,
    pub total_paused_duration: Option<i64>,
}

impl GoalChanges {
    /// Changes for a status transition. The optional fields are only written
    /// when present.
    pub fn status_transition(
        status: GoalStatus,
        actual_start_date: Patch<String>,
        paused_at: Patch<String>,
        total_paused_duration: Patch<i64>,
    ) -> Self {
        Self {
            status: Some(status),
            actual_start_date,
            paused_at,
            total_paused_duration: match total_paused_duration {
                Patch::Missing => None,
                Patch::Null => Some(0),
                Patch::Value(v) => Some(v),
            },
            ..Self::default()
        }
    }

    pub fn progress(progress: i32) -> Self {
        Self {
            progress: Some(progress),
            ..Self::default()
        }
    }

    /// Applies the changes to a goal in place and stamps `updated_at`.
    pub fn apply(self, goal: &mut Goal, now: DateTime<Utc>) {
        if let Some(title) = self.title {
            goal.title = title;
        }
        if let Some(description) = self.description {
            goal.description = description;
        }
        self.category.apply_to(&mut goal.category);
        self.priority.apply_to(&mut goal.priority);
        if let Some(status) = self.status {
            goal.status = status;
        }
        if let Some(progress) = self.progress {
            goal.progress = progress;
        }
        self.duration.apply_to(&mut goal.duration);
        if let Some(start_date) = self.start_date {
            goal.start_date = start_date;
        }
        if let Some(end_date) = self.end_date {
            goal.end_date = end_date;
        }
        self.actual_start_date.apply_to(&mut goal.actual_start_date);
        self.paused_at.apply_to(&mut goal.paused_at);
        if let Some(skills) = self.target_skills {
            goal.target_skills = skills;
        }
        if let Some(criteria) = self.success_criteria {
            goal.success_criteria = criteria;
        }
        normalize_milestone_patch(self.milestones).apply_to(&mut goal.milestones);
        self.generated_data.apply_to(&mut goal.generated_data);
        if let Some(total) = self.total_paused_duration {
            goal.total_paused_duration = total;
        }
        goal.updated_at = now;
    }
}

//=========================================================================================
// Listing
//=========================================================================================

/// Filter and page selection for listing goals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoalListQuery {
    /// `None` matches every status.
    pub statuses: Option<Vec<GoalStatus>>,
    pub page: i64,
    pub limit: i64,
}

impl Default for GoalListQuery {
    fn default() -> Self {
        Self {
            statuses: None,
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl GoalListQuery {
    pub fn matches(&self, status: GoalStatus) -> bool {
        match &self.statuses {
            Some(statuses) => statuses.contains(&status),
            None => true,
        }
    }

    /// Row offset of the requested page, or `None` when the page cannot
    /// contain any rows (`page <= 0` or `limit <= 0`).
    pub fn offset(&self) -> Option<i64> {
        if self.page <= 0 || self.limit <= 0 {
            return None;
        }
        (self.page - 1).checked_mul(self.limit)
    }
}

/// One page of goals plus the totals needed to page through the rest.
#[derive(Debug, Clone, PartialEq)]
pub struct GoalPage {
    pub goals: Vec<Goal>,
    pub total: i64,
    pub page: i64,
    pub total_pages: i64,
}

/// `ceil(total / limit)`, or 0 when `limit` is not positive.
pub fn total_pages(total: i64, limit: i64) -> i64 {
    if limit <= 0 || total <= 0 {
        return 0;
    }
    total / limit + i64::from(total % limit != 0)
}

/// Splits a comma-separated status list. Blank items are dropped; an input
/// with no items means "no filter".
pub fn parse_status_filter(raw: &str) -> Result<Option<Vec<GoalStatus>>, PortError> {
    let statuses = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(GoalStatus::from_str)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(if statuses.is_empty() { None } else { Some(statuses) })
}

/// Picks the current goal: the most recently updated goal with an open status.
pub fn select_current<'a, I>(goals: I) -> Option<&'a Goal>
where
    I: IntoIterator<Item = &'a Goal>,
{
    goals
        .into_iter()
        .filter(|g| g.status.is_open())
        .max_by(|a, b| a.updated_at.cmp(&b.updated_at).then_with(|| a.id.cmp(&b.id)))
}
