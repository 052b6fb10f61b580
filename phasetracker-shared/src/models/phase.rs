/// Phase model and lifecycle transitions
///
/// Phases are the ordered stages of a project. Each phase is in one of
/// three states, encoded by two flags:
///
/// ```text
/// pending   (is_active = false, is_completed = false)
///    │ activate
///    ▼
/// active    (is_active = true,  is_completed = false)
///    │ complete
///    ▼
/// completed (is_active = false, is_completed = true)
///    │ reopen
///    └──────────────────────────────────────────────▶ pending
/// ```
///
/// Invariant: within one project at most one phase has `is_active = true`,
/// observable before and after every operation. The invariant is enforced
/// here, by running every multi-row transition in a single transaction —
/// the schema does not enforce it.
///
/// Ordering: `position` is 1-based. New phases take max(position)+1.
/// Reorder renumbers exactly the supplied set contiguously; deletion leaves
/// gaps, which are only repaired by the next explicit reorder.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE phases (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     project_id UUID NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
///     name VARCHAR(255) NOT NULL,
///     description TEXT NOT NULL DEFAULT '',
///     position INTEGER NOT NULL,
///     is_active BOOLEAN NOT NULL DEFAULT FALSE,
///     is_completed BOOLEAN NOT NULL DEFAULT FALSE,
///     estimated_completion_at DATE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Derived phase state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PhaseState {
    /// Not started
    Pending,

    /// Currently in progress; at most one per project
    Active,

    /// Finished
    Completed,
}

impl PhaseState {
    /// Derives the state from the two storage flags
    ///
    /// `is_active` wins if both flags are somehow set; the engine never
    /// writes that combination.
    pub fn from_flags(is_active: bool, is_completed: bool) -> Self {
        if is_active {
            PhaseState::Active
        } else if is_completed {
            PhaseState::Completed
        } else {
            PhaseState::Pending
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PhaseState::Pending => "pending",
            PhaseState::Active => "active",
            PhaseState::Completed => "completed",
        }
    }
}

/// Phase model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Phase {
    /// Unique phase ID
    pub id: Uuid,

    /// Owning project
    pub project_id: Uuid,

    /// Display name
    pub name: String,

    /// Free-form description
    pub description: String,

    /// 1-based position within the project (`order` on the wire)
    #[serde(rename = "order")]
    pub position: i32,

    /// Whether this is the project's current phase
    pub is_active: bool,

    /// Whether this phase is finished
    pub is_completed: bool,

    /// Optional target date shown on the timeline
    pub estimated_completion_at: Option<NaiveDate>,

    /// When the phase was created
    pub created_at: DateTime<Utc>,

    /// When the phase was last updated
    pub updated_at: DateTime<Utc>,
}

impl Phase {
    /// Derived lifecycle state
    pub fn state(&self) -> PhaseState {
        PhaseState::from_flags(self.is_active, self.is_completed)
    }
}

/// Input for creating a phase
#[derive(Debug, Clone)]
pub struct CreatePhase {
    /// Display name (must be non-empty; validated by the service layer)
    pub name: String,

    /// Free-form description
    pub description: String,
}

/// Input for updating a phase
///
/// `estimated_completion_at` is tri-state: `None` leaves the stored value
/// untouched, `Some(None)` clears it, `Some(Some(date))` sets it.
#[derive(Debug, Clone, Default)]
pub struct UpdatePhase {
    /// New display name
    pub name: Option<String>,

    /// New description
    pub description: Option<String>,

    /// Target-date update (absent / clear / set)
    pub estimated_completion_at: Option<Option<NaiveDate>>,
}

impl Phase {
    /// Creates a phase at the end of the project's ordering
    ///
    /// The position is computed inside the INSERT so creation is a single
    /// statement: max(position)+1, or 1 for the project's first phase. New
    /// phases start pending.
    pub async fn create(
        pool: &PgPool,
        project_id: Uuid,
        data: CreatePhase,
    ) -> Result<Self, sqlx::Error> {
        let phase = sqlx::query_as::<_, Phase>(
            r#"
            INSERT INTO phases (project_id, name, description, position)
            VALUES (
                $1, $2, $3,
                (SELECT COALESCE(MAX(position), 0) + 1 FROM phases WHERE project_id = $1)
            )
            RETURNING id, project_id, name, description, position, is_active,
                      is_completed, estimated_completion_at, created_at, updated_at
            "#,
        )
        .bind(project_id)
        .bind(data.name)
        .bind(data.description)
        .fetch_one(pool)
        .await?;

        Ok(phase)
    }

    /// Finds a phase by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let phase = sqlx::query_as::<_, Phase>(
            r#"
            SELECT id, project_id, name, description, position, is_active,
                   is_completed, estimated_completion_at, created_at, updated_at
            FROM phases
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(phase)
    }

    /// Lists a project's phases in timeline order
    pub async fn list_by_project(
        pool: &PgPool,
        project_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let phases = sqlx::query_as::<_, Phase>(
            r#"
            SELECT id, project_id, name, description, position, is_active,
                   is_completed, estimated_completion_at, created_at, updated_at
            FROM phases
            WHERE project_id = $1
            ORDER BY position ASC
            "#,
        )
        .bind(project_id)
        .fetch_all(pool)
        .await?;

        Ok(phases)
    }

    /// IDs of all phases belonging to a project
    pub async fn ids_for_project(
        pool: &PgPool,
        project_id: Uuid,
    ) -> Result<Vec<Uuid>, sqlx::Error> {
        let ids: Vec<(Uuid,)> =
            sqlx::query_as("SELECT id FROM phases WHERE project_id = $1")
                .bind(project_id)
                .fetch_all(pool)
                .await?;

        Ok(ids.into_iter().map(|(id,)| id).collect())
    }

    /// Makes `target` the project's single active phase
    ///
    /// One transaction, three steps:
    /// 1. every phase before the target (position < target.position) is
    ///    forced completed — activating phase N means all earlier phases
    ///    are done;
    /// 2. every phase in the project is deactivated, clearing any stray
    ///    active flag on later phases as well;
    /// 3. the target becomes active and not-completed.
    ///
    /// Later phases keep their completion status but are guaranteed
    /// inactive. Any failure rolls the whole transition back, so the
    /// single-active invariant never observes a partial application.
    pub async fn activate(
        pool: &PgPool,
        project_id: Uuid,
        target: &Phase,
    ) -> Result<Phase, sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query(
            r#"
            UPDATE phases
            SET is_completed = TRUE,
                is_active = FALSE,
                updated_at = NOW()
            WHERE project_id = $1 AND position < $2
            "#,
        )
        .bind(project_id)
        .bind(target.position)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            UPDATE phases
            SET is_active = FALSE,
                updated_at = NOW()
            WHERE project_id = $1 AND is_active
            "#,
        )
        .bind(project_id)
        .execute(&mut *tx)
        .await?;

        let phase = sqlx::query_as::<_, Phase>(
            r#"
            UPDATE phases
            SET is_active = TRUE,
                is_completed = FALSE,
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, project_id, name, description, position, is_active,
                      is_completed, estimated_completion_at, created_at, updated_at
            "#,
        )
        .bind(target.id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(phase)
    }

    /// Marks a single phase completed (no cross-phase effects)
    pub async fn set_completed(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let phase = sqlx::query_as::<_, Phase>(
            r#"
            UPDATE phases
            SET is_active = FALSE,
                is_completed = TRUE,
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, project_id, name, description, position, is_active,
                      is_completed, estimated_completion_at, created_at, updated_at
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(phase)
    }

    /// Returns a phase to pending (the only backward transition)
    pub async fn reopen(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let phase = sqlx::query_as::<_, Phase>(
            r#"
            UPDATE phases
            SET is_active = FALSE,
                is_completed = FALSE,
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, project_id, name, description, position, is_active,
                      is_completed, estimated_completion_at, created_at, updated_at
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(phase)
    }

    /// Renumbers exactly the supplied phases to positions 1..N
    ///
    /// One transaction; either every phase gets its new position or none
    /// does. Callers validate the list (non-empty, no duplicates, all rows
    /// in one project) before calling.
    pub async fn apply_order(pool: &PgPool, ordered_ids: &[Uuid]) -> Result<(), sqlx::Error> {
        let mut tx = pool.begin().await?;

        for (index, id) in ordered_ids.iter().enumerate() {
            sqlx::query(
                r#"
                UPDATE phases
                SET position = $2,
                    updated_at = NOW()
                WHERE id = $1
                "#,
            )
            .bind(id)
            .bind((index + 1) as i32)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(())
    }

    /// Updates a phase; only fields present in `data` are touched
    ///
    /// `estimated_completion_at` follows the tri-state contract documented
    /// on [`UpdatePhase`].
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdatePhase,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut query = String::from("UPDATE phases SET updated_at = NOW()");
        let mut bind_count = 1;

        if data.name.is_some() {
            bind_count += 1;
            query.push_str(&format!(", name = ${}", bind_count));
        }
        if data.description.is_some() {
            bind_count += 1;
            query.push_str(&format!(", description = ${}", bind_count));
        }
        if data.estimated_completion_at.is_some() {
            bind_count += 1;
            query.push_str(&format!(", estimated_completion_at = ${}", bind_count));
        }

        query.push_str(
            " WHERE id = $1 RETURNING id, project_id, name, description, position, is_active, is_completed, estimated_completion_at, created_at, updated_at",
        );

        let mut q = sqlx::query_as::<_, Phase>(&query).bind(id);

        if let Some(name) = data.name {
            q = q.bind(name);
        }
        if let Some(description) = data.description {
            q = q.bind(description);
        }
        if let Some(date_or_clear) = data.estimated_completion_at {
            q = q.bind(date_or_clear);
        }

        let phase = q.fetch_optional(pool).await?;

        Ok(phase)
    }

    /// Deletes a phase
    ///
    /// Remaining phases keep their positions; gaps are repaired by the next
    /// explicit reorder, not here.
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM phases WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
