//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the `GoalRepository` port from the `core` crate. It handles all interactions
//! with the PostgreSQL database using `sqlx`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use goal_tracker_core::domain::{
    normalize_milestone_patch, normalize_milestones, total_pages, Goal, GoalChanges,
    GoalListQuery, GoalPage, GoalStatus, NewGoal, Patch,
};
use goal_tracker_core::ports::{GoalRepository, PortError, PortResult};
use serde_json::Value;
use sqlx::migrate::MigrateError;
use sqlx::{Encode, FromRow, PgPool, Postgres, QueryBuilder, Type};
use uuid::Uuid;

/// Every column of `goals`, in the order `GoalRecord` expects.
const GOAL_COLUMNS: &str = "id, title, description, category, priority, status, progress, \
     duration, start_date, end_date, actual_start_date, paused_at, target_skills, \
     success_criteria, milestones, generated_data, total_paused_duration, created_at, updated_at";

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `GoalRepository` port.
#[derive(Clone)]
pub struct DbAdapter {
    pool: PgPool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Brings the `goals` table up to date. Called once at startup.
    pub async fn run_migrations(&self) -> Result<(), MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct GoalRecord {
    id: Uuid,
    title: String,
    description: String,
    category: Option<String>,
    priority: Option<String>,
    status: String,
    progress: i32,
    duration: Option<String>,
    start_date: String,
    end_date: String,
    actual_start_date: Option<String>,
    paused_at: Option<String>,
    target_skills: Vec<String>,
    success_criteria: Vec<String>,
    milestones: Option<Value>,
    generated_data: Option<Value>,
    total_paused_duration: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}
impl GoalRecord {
    fn to_domain(self) -> PortResult<Goal> {
        let status = self.status.parse::<GoalStatus>().map_err(|_| {
            PortError::Unexpected(format!("Goal {} has unknown status '{}'", self.id, self.status))
        })?;
        Ok(Goal {
            id: self.id,
            title: self.title,
            description: self.description,
            category: self.category,
            priority: self.priority,
            status,
            progress: self.progress,
            duration: self.duration,
            start_date: self.start_date,
            end_date: self.end_date,
            actual_start_date: self.actual_start_date,
            paused_at: self.paused_at,
            target_skills: self.target_skills,
            success_criteria: self.success_criteria,
            milestones: self.milestones,
            generated_data: self.generated_data,
            total_paused_duration: self.total_paused_duration,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

//=========================================================================================
// Error Mapping and Query Helpers
//=========================================================================================

/// Keeps the store's diagnostic code so callers can see why a write was rejected.
fn store_error(e: sqlx::Error) -> PortError {
    match e {
        sqlx::Error::Database(db) => PortError::Database {
            code: db.code().map(|c| c.into_owned()),
            message: db.message().to_string(),
        },
        other => PortError::Database {
            code: None,
            message: other.to_string(),
        },
    }
}

fn not_found(goal_id: Uuid) -> PortError {
    PortError::NotFound(format!("Goal {} not found", goal_id))
}

fn status_names(statuses: &[GoalStatus]) -> Vec<String> {
    statuses.iter().map(|s| s.as_str().to_string()).collect()
}

fn push_set<'args, T>(qb: &mut QueryBuilder<'args, Postgres>, column: &str, value: Option<T>)
where
    T: 'args + Encode<'args, Postgres> + Type<Postgres> + Send,
{
    if let Some(value) = value {
        qb.push(format_args!(", {} = ", column)).push_bind(value);
    }
}

fn push_patch<'args, T>(qb: &mut QueryBuilder<'args, Postgres>, column: &str, patch: Patch<T>)
where
    T: 'args + Encode<'args, Postgres> + Type<Postgres> + Send,
{
    match patch {
        Patch::Missing => {}
        Patch::Null => {
            qb.push(format_args!(", {} = NULL", column));
        }
        Patch::Value(value) => {
            qb.push(format_args!(", {} = ", column)).push_bind(value);
        }
    }
}

//=========================================================================================
// `GoalRepository` Trait Implementation
//=========================================================================================

#[async_trait]
impl GoalRepository for DbAdapter {
    async fn find_current(&self) -> PortResult<Option<Goal>> {
        let sql = format!(
            "SELECT {} FROM goals WHERE status = ANY($1) ORDER BY updated_at DESC, id DESC LIMIT 1",
            GOAL_COLUMNS
        );
        let record = sqlx::query_as::<_, GoalRecord>(&sql)
            .bind(status_names(&GoalStatus::OPEN))
            .fetch_optional(&self.pool)
            .await
            .map_err(store_error)?;

        record.map(GoalRecord::to_domain).transpose()
    }

    async fn list_goals(&self, query: &GoalListQuery) -> PortResult<GoalPage> {
        let statuses = query.statuses.as_deref().map(status_names);

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM goals WHERE ($1::text[] IS NULL OR status = ANY($1))",
        )
        .bind(statuses.clone())
        .fetch_one(&self.pool)
        .await
        .map_err(store_error)?;

        let goals = match query.offset() {
            Some(offset) => {
                let sql = format!(
                    "SELECT {} FROM goals WHERE ($1::text[] IS NULL OR status = ANY($1)) \
                     ORDER BY updated_at DESC, id DESC LIMIT $2 OFFSET $3",
                    GOAL_COLUMNS
                );
                sqlx::query_as::<_, GoalRecord>(&sql)
                    .bind(statuses)
                    .bind(query.limit)
                    .bind(offset)
                    .fetch_all(&self.pool)
                    .await
                    .map_err(store_error)?
                    .into_iter()
                    .map(GoalRecord::to_domain)
                    .collect::<PortResult<Vec<_>>>()?
            }
            None => Vec::new(),
        };

        Ok(GoalPage {
            goals,
            total,
            page: query.page,
            total_pages: total_pages(total, query.limit),
        })
    }

    async fn get_goal_by_id(&self, goal_id: Uuid) -> PortResult<Goal> {
        let sql = format!("SELECT {} FROM goals WHERE id = $1", GOAL_COLUMNS);
        sqlx::query_as::<_, GoalRecord>(&sql)
            .bind(goal_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(store_error)?
            .ok_or_else(|| not_found(goal_id))?
            .to_domain()
    }

    async fn create_goal(&self, goal: NewGoal) -> PortResult<Goal> {
        let now = Utc::now();
        let sql = format!(
            "INSERT INTO goals ({}) VALUES \
             ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19) \
             RETURNING {}",
            GOAL_COLUMNS, GOAL_COLUMNS
        );
        let record = sqlx::query_as::<_, GoalRecord>(&sql)
            .bind(Uuid::new_v4())
            .bind(goal.title)
            .bind(goal.description)
            .bind(goal.category)
            .bind(goal.priority)
            .bind(goal.status.as_str())
            .bind(goal.progress)
            .bind(goal.duration)
            .bind(goal.start_date)
            .bind(goal.end_date)
            .bind(goal.actual_start_date)
            .bind(goal.paused_at)
            .bind(goal.target_skills)
            .bind(goal.success_criteria)
            .bind(normalize_milestones(goal.milestones))
            .bind(goal.generated_data)
            .bind(goal.total_paused_duration)
            .bind(now)
            .bind(now)
            .fetch_one(&self.pool)
            .await
            .map_err(store_error)?;
        record.to_domain()
    }

    async fn update_goal(&self, goal_id: Uuid, changes: GoalChanges) -> PortResult<Goal> {
        let mut qb = QueryBuilder::<Postgres>::new("UPDATE goals SET updated_at = ");
        qb.push_bind(Utc::now());

        push_set(&mut qb, "title", changes.title);
        push_set(&mut qb, "description", changes.description);
        push_patch(&mut qb, "category", changes.category);
        push_patch(&mut qb, "priority", changes.priority);
        push_set(&mut qb, "status", changes.status.map(|s| s.as_str().to_string()));
        push_set(&mut qb, "progress", changes.progress);
        push_patch(&mut qb, "duration", changes.duration);
        push_set(&mut qb, "start_date", changes.start_date);
        push_set(&mut qb, "end_date", changes.end_date);
        push_patch(&mut qb, "actual_start_date", changes.actual_start_date);
        push_patch(&mut qb, "paused_at", changes.paused_at);
        push_set(&mut qb, "target_skills", changes.target_skills);
        push_set(&mut qb, "success_criteria", changes.success_criteria);
        push_patch(&mut qb, "milestones", normalize_milestone_patch(changes.milestones));
        push_patch(&mut qb, "generated_data", changes.generated_data);
        push_set(&mut qb, "total_paused_duration", changes.total_paused_duration);

        qb.push(" WHERE id = ").push_bind(goal_id);
        qb.push(format_args!(" RETURNING {}", GOAL_COLUMNS));

        qb.build_query_as::<GoalRecord>()
            .fetch_optional(&self.pool)
            .await
            .map_err(store_error)?
            .ok_or_else(|| not_found(goal_id))?
            .to_domain()
    }

    async fn delete_goal(&self, goal_id: Uuid) -> PortResult<()> {
        let result = sqlx::query("DELETE FROM goals WHERE id = $1")
            .bind(goal_id)
            .execute(&self.pool)
            .await
            .map_err(store_error)?;

        if result.rows_affected() == 0 {
            return Err(not_found(goal_id));
        }
        Ok(())
    }
}
