//! services/api/src/web/dto.rs
//!
//! Wire representations of goals: the request payloads accepted by the REST
//! handlers (with their coercion rules) and the serializer that turns domain
//! goals into JSON-safe response records.

use chrono::{DateTime, Utc};
use goal_tracker_core::domain::{
    normalize_milestone_patch, normalize_milestones, parse_status_filter, Goal, GoalChanges,
    GoalListQuery, GoalPage, GoalStatus, NewGoal, Patch, DEFAULT_LIMIT, DEFAULT_PAGE,
};
use goal_tracker_core::ports::PortError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

pub const MISSING_REQUIRED_FIELDS: &str =
    "Missing required fields: title, description, startDate, and endDate are required";

//=========================================================================================
// Numeric Coercion
//=========================================================================================

/// A numeric field that clients may send either as a JSON number or as a string.
#[derive(Debug, Clone, PartialEq, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum NumberOrString {
    Integer(i64),
    Float(f64),
    Text(String),
}

/// Reads the leading integer of a string (`"42%"` is 42), the way form input
/// usually arrives. Returns `None` when there are no leading digits.
pub fn parse_leading_int(raw: &str) -> Option<i64> {
    let trimmed = raw.trim_start();
    let (sign, digits) = match trimmed.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };
    let end = digits.find(|c: char| !c.is_ascii_digit()).unwrap_or(digits.len());
    if end == 0 {
        return None;
    }
    digits[..end].parse::<i64>().ok().map(|n| sign * n)
}

impl NumberOrString {
    /// Integer coercion for `progress`: fractions truncate, strings use their
    /// leading integer.
    fn to_progress(&self) -> Result<i32, PortError> {
        let invalid = || PortError::Invalid("progress must be an integer".to_string());
        let value = match self {
            NumberOrString::Integer(n) => *n,
            NumberOrString::Float(f) if f.is_finite() => f.trunc() as i64,
            NumberOrString::Float(_) => return Err(invalid()),
            NumberOrString::Text(s) => parse_leading_int(s).ok_or_else(invalid)?,
        };
        i32::try_from(value).map_err(|_| invalid())
    }

    /// Strict coercion for `totalPausedDuration`: a whole, non-negative
    /// integer that fits the stored 64-bit column.
    fn to_paused_duration(&self) -> Result<i64, PortError> {
        let invalid = || {
            PortError::Invalid(
                "totalPausedDuration must be a non-negative integer".to_string(),
            )
        };
        let value = match self {
            NumberOrString::Integer(n) => *n,
            NumberOrString::Float(_) => return Err(invalid()),
            NumberOrString::Text(s) => s.trim().parse::<i64>().map_err(|_| invalid())?,
        };
        if value < 0 {
            return Err(invalid());
        }
        Ok(value)
    }
}

/// Required text fields may be left out of an update but never blanked.
fn non_blank(field: &str, value: Option<String>) -> Result<Option<String>, PortError> {
    match value {
        Some(v) if v.is_empty() => Err(PortError::Invalid(format!("{} must not be empty", field))),
        other => Ok(other),
    }
}

fn parse_status(raw: &str) -> Result<GoalStatus, PortError> {
    raw.trim().parse::<GoalStatus>()
}

//=========================================================================================
// Request Payloads
//=========================================================================================

/// Payload for `POST /api/goals`. Unknown keys are ignored.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateGoalRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub category: Option<String>,
    pub priority: Option<String>,
    pub status: Option<String>,
    pub progress: Option<NumberOrString>,
    pub duration: Option<String>,
    pub actual_start_date: Option<String>,
    pub paused_at: Option<String>,
    pub target_skills: Option<Vec<String>>,
    pub success_criteria: Option<Vec<String>>,
    #[schema(value_type = Option<Object>)]
    pub milestones: Option<Value>,
    #[schema(value_type = Option<Object>)]
    pub generated_data: Option<Value>,
    pub total_paused_duration: Option<NumberOrString>,
}

impl CreateGoalRequest {
    /// Validates the required fields and applies creation defaults.
    pub fn into_new_goal(self) -> Result<NewGoal, PortError> {
        let present = |v: Option<String>| v.filter(|s| !s.is_empty());
        let (Some(title), Some(description), Some(start_date), Some(end_date)) = (
            present(self.title),
            present(self.description),
            present(self.start_date),
            present(self.end_date),
        ) else {
            return Err(PortError::Invalid(MISSING_REQUIRED_FIELDS.to_string()));
        };

        let mut goal = NewGoal::new(title, description, start_date, end_date);
        goal.category = self.category;
        goal.priority = self.priority;
        if let Some(status) = self.status {
            goal.status = parse_status(&status)?;
        }
        if let Some(progress) = self.progress {
            goal.progress = progress.to_progress()?;
        }
        goal.duration = self.duration;
        goal.actual_start_date = self.actual_start_date;
        goal.paused_at = self.paused_at;
        goal.target_skills = self.target_skills.unwrap_or_default();
        goal.success_criteria = self.success_criteria.unwrap_or_default();
        goal.milestones = normalize_milestones(self.milestones);
        goal.generated_data = self.generated_data;
        if let Some(total) = self.total_paused_duration {
            goal.total_paused_duration = total.to_paused_duration()?;
        }
        Ok(goal)
    }
}

/// Payload for `PUT /api/goals/{id}`. Absent keys leave fields untouched; `null`
/// clears nullable fields.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateGoalRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub category: Patch<String>,
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub priority: Patch<String>,
    pub status: Option<String>,
    pub progress: Option<NumberOrString>,
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub duration: Patch<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub actual_start_date: Patch<String>,
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub paused_at: Patch<String>,
    pub target_skills: Option<Vec<String>>,
    pub success_criteria: Option<Vec<String>>,
    #[serde(default)]
    #[schema(value_type = Option<Object>)]
    pub milestones: Patch<Value>,
    #[serde(default)]
    #[schema(value_type = Option<Object>)]
    pub generated_data: Patch<Value>,
    pub total_paused_duration: Option<NumberOrString>,
}

impl UpdateGoalRequest {
    pub fn into_changes(self) -> Result<GoalChanges, PortError> {
        Ok(GoalChanges {
            title: non_blank("title", self.title)?,
            description: non_blank("description", self.description)?,
            category: self.category,
            priority: self.priority,
            status: self.status.as_deref().map(parse_status).transpose()?,
            progress: self.progress.as_ref().map(NumberOrString::to_progress).transpose()?,
            duration: self.duration,
            start_date: non_blank("startDate", self.start_date)?,
            end_date: non_blank("endDate", self.end_date)?,
            actual_start_date: self.actual_start_date,
            paused_at: self.paused_at,
            target_skills: self.target_skills,
            success_criteria: self.success_criteria,
            milestones: normalize_milestone_patch(self.milestones),
            generated_data: self.generated_data,
            total_paused_duration: self
                .total_paused_duration
                .as_ref()
                .map(NumberOrString::to_paused_duration)
                .transpose()?,
        })
    }
}

/// Payload for `PATCH /api/goals/{id}/status`.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatusPatchRequest {
    pub status: Option<String>,
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub actual_start_date: Patch<String>,
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub paused_at: Patch<String>,
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub total_paused_duration: Patch<NumberOrString>,
}

impl StatusPatchRequest {
    pub fn into_changes(self) -> Result<GoalChanges, PortError> {
        let status = self
            .status
            .as_deref()
            .ok_or_else(|| PortError::Invalid("status is required".to_string()))
            .and_then(parse_status)?;
        let total_paused_duration = self
            .total_paused_duration
            .try_map(|raw| raw.to_paused_duration())?;
        Ok(GoalChanges::status_transition(
            status,
            self.actual_start_date,
            self.paused_at,
            total_paused_duration,
        ))
    }
}

/// Payload for `PATCH /api/goals/{id}/progress`.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct ProgressPatchRequest {
    pub progress: Option<NumberOrString>,
}

impl ProgressPatchRequest {
    pub fn into_changes(self) -> Result<GoalChanges, PortError> {
        let progress = self
            .progress
            .ok_or_else(|| PortError::Invalid("progress is required".to_string()))?
            .to_progress()?;
        Ok(GoalChanges::progress(progress))
    }
}

/// Query string of `GET /api/goals`.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListGoalsParams {
    /// Comma-separated statuses, e.g. `active,paused`.
    pub status: Option<String>,
    /// 1-based page number. Defaults to 1.
    pub page: Option<String>,
    /// Page size. Defaults to 10.
    pub limit: Option<String>,
}

impl ListGoalsParams {
    pub fn into_query(self) -> Result<GoalListQuery, PortError> {
        let statuses = match self.status.as_deref() {
            Some(raw) => parse_status_filter(raw)?,
            None => None,
        };
        let page = self.page.as_deref().and_then(parse_leading_int).unwrap_or(DEFAULT_PAGE);
        let limit = self.limit.as_deref().and_then(parse_leading_int).unwrap_or(DEFAULT_LIMIT);
        Ok(GoalListQuery { statuses, page, limit })
    }
}

//=========================================================================================
// Responses (the goal serializer)
//=========================================================================================

/// A goal as sent over the wire.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GoalResponse {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub category: Option<String>,
    pub priority: Option<String>,
    #[schema(value_type = String, example = "planning")]
    pub status: GoalStatus,
    pub progress: i32,
    pub duration: Option<String>,
    pub start_date: String,
    pub end_date: String,
    pub actual_start_date: Option<String>,
    pub paused_at: Option<String>,
    pub target_skills: Vec<String>,
    pub success_criteria: Vec<String>,
    #[schema(value_type = Option<Object>)]
    pub milestones: Option<Value>,
    #[schema(value_type = Option<Object>)]
    pub generated_data: Option<Value>,
    /// Decimal string, so values beyond 2^53 survive JavaScript clients.
    #[schema(example = "0")]
    pub total_paused_duration: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Renders the paused-duration counter as a decimal string (`"0"` when unset).
pub fn paused_duration_to_wire(value: i64) -> String {
    value.to_string()
}

impl From<Goal> for GoalResponse {
    fn from(goal: Goal) -> Self {
        Self {
            id: goal.id,
            title: goal.title,
            description: goal.description,
            category: goal.category,
            priority: goal.priority,
            status: goal.status,
            progress: goal.progress,
            duration: goal.duration,
            start_date: goal.start_date,
            end_date: goal.end_date,
            actual_start_date: goal.actual_start_date,
            paused_at: goal.paused_at,
            target_skills: goal.target_skills,
            success_criteria: goal.success_criteria,
            milestones: goal.milestones,
            generated_data: goal.generated_data,
            total_paused_duration: paused_duration_to_wire(goal.total_paused_duration),
            created_at: goal.created_at,
            updated_at: goal.updated_at,
        }
    }
}

pub fn serialize_goal(goal: Option<Goal>) -> Option<GoalResponse> {
    goal.map(GoalResponse::from)
}

pub fn serialize_goals(goals: Vec<Goal>) -> Vec<GoalResponse> {
    goals.into_iter().map(GoalResponse::from).collect()
}

/// The response payload of the paginated list endpoint.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GoalListResponse {
    pub goals: Vec<GoalResponse>,
    pub total: i64,
    pub page: i64,
    pub total_pages: i64,
}

impl From<GoalPage> for GoalListResponse {
    fn from(page: GoalPage) -> Self {
        Self {
            goals: serialize_goals(page.goals),
            total: page.total,
            page: page.page,
            total_pages: page.total_pages,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn create(body: Value) -> Result<NewGoal, PortError> {
        serde_json::from_value::<CreateGoalRequest>(body)
            .unwrap()
            .into_new_goal()
    }

    fn required() -> Value {
        json!({
            "title": "Learn Rust",
            "description": "Finish the book",
            "startDate": "2024-01-01",
            "endDate": "2024-06-30"
        })
    }

    #[test]
    fn create_requires_all_four_fields() {
        for field in ["title", "description", "startDate", "endDate"] {
            let mut body = required();
            body.as_object_mut().unwrap().remove(field);
            match create(body) {
                Err(PortError::Invalid(msg)) => assert_eq!(msg, MISSING_REQUIRED_FIELDS),
                other => panic!("expected validation error without {}, got {:?}", field, other),
            }
        }

        let mut body = required();
        body["title"] = json!("");
        assert!(matches!(create(body), Err(PortError::Invalid(_))));
    }

    #[test]
    fn create_applies_defaults() {
        let goal = create(required()).unwrap();
        assert_eq!(goal.status, GoalStatus::Planning);
        assert_eq!(goal.progress, 0);
        assert!(goal.target_skills.is_empty());
        assert!(goal.success_criteria.is_empty());
        assert_eq!(goal.total_paused_duration, 0);
        assert!(goal.milestones.is_none());
    }

    #[test]
    fn create_normalizes_empty_milestones_and_ignores_unknown_keys() {
        let mut body = required();
        body["milestones"] = json!([]);
        body["favouriteColour"] = json!("teal");
        let goal = create(body).unwrap();
        assert!(goal.milestones.is_none());
    }

    #[test]
    fn create_accepts_large_paused_duration_strings() {
        let mut body = required();
        body["totalPausedDuration"] = json!("18446744073709");
        let goal = create(body).unwrap();
        assert_eq!(goal.total_paused_duration, 18_446_744_073_709);
    }

    #[test]
    fn paused_duration_rejects_negative_and_fractional_values() {
        for bad in [json!("-1"), json!(-1), json!(1.5), json!("ten"), json!("18446744073709551615")] {
            let mut body = required();
            body["totalPausedDuration"] = bad.clone();
            assert!(matches!(create(body), Err(PortError::Invalid(_))), "accepted {}", bad);
        }
    }

    #[test]
    fn progress_coerces_numbers_and_strings() {
        let coerce = |v: Value| serde_json::from_value::<NumberOrString>(v).unwrap().to_progress();
        assert_eq!(coerce(json!(42)).unwrap(), 42);
        assert_eq!(coerce(json!(42.9)).unwrap(), 42);
        assert_eq!(coerce(json!("75")).unwrap(), 75);
        assert_eq!(coerce(json!("80%")).unwrap(), 80);
        assert_eq!(coerce(json!(250)).unwrap(), 250);
        assert_eq!(coerce(json!("-3")).unwrap(), -3);
        assert!(coerce(json!("abc")).is_err());
    }

    #[test]
    fn leading_int_parsing() {
        assert_eq!(parse_leading_int("12"), Some(12));
        assert_eq!(parse_leading_int("  7 items"), Some(7));
        assert_eq!(parse_leading_int("+4"), Some(4));
        assert_eq!(parse_leading_int("-2"), Some(-2));
        assert_eq!(parse_leading_int("x1"), None);
        assert_eq!(parse_leading_int(""), None);
    }

    #[test]
    fn status_patch_distinguishes_absent_from_null() {
        let only_status: StatusPatchRequest =
            serde_json::from_value(json!({"status": "paused"})).unwrap();
        let changes = only_status.into_changes().unwrap();
        assert_eq!(changes.status, Some(GoalStatus::Paused));
        assert!(changes.paused_at.is_missing());
        assert!(changes.actual_start_date.is_missing());
        assert_eq!(changes.total_paused_duration, None);

        let clearing: StatusPatchRequest = serde_json::from_value(json!({
            "status": "active",
            "pausedAt": null,
            "totalPausedDuration": "3600"
        }))
        .unwrap();
        let changes = clearing.into_changes().unwrap();
        assert_eq!(changes.paused_at, Patch::Null);
        assert_eq!(changes.total_paused_duration, Some(3600));
    }

    #[test]
    fn status_patch_requires_a_known_status() {
        let missing: StatusPatchRequest = serde_json::from_value(json!({})).unwrap();
        assert!(matches!(missing.into_changes(), Err(PortError::Invalid(_))));

        let unknown: StatusPatchRequest =
            serde_json::from_value(json!({"status": "finished"})).unwrap();
        assert!(matches!(unknown.into_changes(), Err(PortError::Invalid(_))));
    }

    #[test]
    fn update_keeps_absent_fields_untouched() {
        let request: UpdateGoalRequest = serde_json::from_value(json!({
            "title": "Renamed",
            "category": null,
            "milestones": []
        }))
        .unwrap();
        let changes = request.into_changes().unwrap();

        assert_eq!(changes.title.as_deref(), Some("Renamed"));
        assert_eq!(changes.category, Patch::Null);
        assert!(changes.priority.is_missing());
        assert_eq!(changes.milestones, Patch::Null);
        assert_eq!(changes.status, None);
    }

    #[test]
    fn update_rejects_blanking_required_fields() {
        for field in ["title", "description", "startDate", "endDate"] {
            let request: UpdateGoalRequest =
                serde_json::from_value(json!({ field: "" })).unwrap();
            match request.into_changes() {
                Err(PortError::Invalid(msg)) => assert!(msg.starts_with(field), "{}", msg),
                other => panic!("blank {} accepted: {:?}", field, other),
            }
        }
    }

    #[test]
    fn list_params_coerce_and_default() {
        let query = ListGoalsParams {
            status: Some("active, paused".into()),
            page: Some("2".into()),
            limit: Some("abc".into()),
        }
        .into_query()
        .unwrap();
        assert_eq!(query.statuses, Some(vec![GoalStatus::Active, GoalStatus::Paused]));
        assert_eq!(query.page, 2);
        assert_eq!(query.limit, DEFAULT_LIMIT);

        let defaults = ListGoalsParams::default().into_query().unwrap();
        assert_eq!(defaults, GoalListQuery::default());
    }

    #[test]
    fn serializer_renders_paused_duration_as_string() {
        let mut goal = NewGoal::new("t", "d", "s", "e").into_goal(Uuid::new_v4(), Utc::now());
        goal.total_paused_duration = 18_446_744_073_709;

        let wire = serde_json::to_value(GoalResponse::from(goal.clone())).unwrap();
        assert_eq!(wire["totalPausedDuration"], json!("18446744073709"));
        assert_eq!(wire["status"], json!("planning"));
        assert_eq!(wire["startDate"], json!("s"));

        goal.total_paused_duration = 0;
        let wire = serde_json::to_value(GoalResponse::from(goal)).unwrap();
        assert_eq!(wire["totalPausedDuration"], json!("0"));
    }

    #[test]
    fn serializer_passes_absence_through() {
        assert!(serialize_goal(None).is_none());
        assert!(serialize_goals(Vec::new()).is_empty());
    }
}
