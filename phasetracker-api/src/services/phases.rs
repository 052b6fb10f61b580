/// Phase lifecycle engine
///
/// Validation and ownership checks in front of the storage transitions in
/// [`phasetracker_shared::models::phase`]. The engine holds no state of its
/// own — every operation reloads from the database, and the single-active
/// invariant is carried entirely by the transactions underneath.
///
/// Concurrency: two activations racing on one project resolve
/// last-writer-wins at the storage layer. That is the intended semantics —
/// no application-level locking is layered on top.

use std::collections::HashSet;

use chrono::NaiveDate;
use phasetracker_shared::models::phase::{CreatePhase, Phase, UpdatePhase};
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

/// Typed failure kinds for phase operations
#[derive(Debug, thiserror::Error)]
pub enum PhaseError {
    /// Bad input (empty name, malformed reorder list)
    #[error("{0}")]
    Validation(String),

    /// Referenced phase does not exist
    #[error("Phase not found")]
    NotFound,

    /// Phase exists but belongs to a different project
    #[error("Phase does not belong to this project")]
    NotInProject,

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Input for creating a phase
#[derive(Debug, Clone)]
pub struct NewPhase {
    pub name: String,
    pub description: String,
}

/// Input for updating a phase
///
/// `estimated_completion_at` is tri-state: absent leaves the stored date
/// untouched, explicit null clears it, a value sets it.
#[derive(Debug, Clone, Default)]
pub struct PhasePatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub estimated_completion_at: Option<Option<NaiveDate>>,
}

/// Loads a phase and checks it belongs to the given project
async fn load_owned(pool: &PgPool, project_id: Uuid, phase_id: Uuid) -> Result<Phase, PhaseError> {
    let phase = Phase::find_by_id(pool, phase_id)
        .await?
        .ok_or(PhaseError::NotFound)?;

    if phase.project_id != project_id {
        return Err(PhaseError::NotInProject);
    }

    Ok(phase)
}

/// Creates a phase at the end of the project's timeline
///
/// New phases start pending with position = max + 1.
pub async fn add_phase(
    pool: &PgPool,
    project_id: Uuid,
    input: NewPhase,
) -> Result<Phase, PhaseError> {
    let name = input.name.trim();
    if name.is_empty() {
        return Err(PhaseError::Validation("Phase name is required".to_string()));
    }

    let phase = Phase::create(
        pool,
        project_id,
        CreatePhase {
            name: name.to_string(),
            description: input.description,
        },
    )
    .await?;

    info!(phase_id = %phase.id, project_id = %project_id, "Phase created");

    Ok(phase)
}

/// Lists a project's phases in timeline order
pub async fn list_phases(pool: &PgPool, project_id: Uuid) -> Result<Vec<Phase>, PhaseError> {
    Ok(Phase::list_by_project(pool, project_id).await?)
}

/// Makes the target the project's single active phase
///
/// Activating phase N means all earlier phases are done: everything with a
/// smaller position is forced completed, every other phase is deactivated,
/// and the target becomes active — atomically. Later phases keep their
/// completion status.
pub async fn set_active_phase(
    pool: &PgPool,
    project_id: Uuid,
    phase_id: Uuid,
) -> Result<Phase, PhaseError> {
    let target = load_owned(pool, project_id, phase_id).await?;

    let phase = Phase::activate(pool, project_id, &target).await?;

    info!(phase_id = %phase.id, project_id = %project_id, "Phase activated");

    Ok(phase)
}

/// Marks one phase completed; no effect on any other phase
pub async fn set_phase_complete(
    pool: &PgPool,
    project_id: Uuid,
    phase_id: Uuid,
) -> Result<Phase, PhaseError> {
    load_owned(pool, project_id, phase_id).await?;

    Phase::set_completed(pool, phase_id)
        .await?
        .ok_or(PhaseError::NotFound)
}

/// Returns a completed phase to pending (the only backward transition)
pub async fn reopen_phase(
    pool: &PgPool,
    project_id: Uuid,
    phase_id: Uuid,
) -> Result<Phase, PhaseError> {
    load_owned(pool, project_id, phase_id).await?;

    Phase::reopen(pool, phase_id)
        .await?
        .ok_or(PhaseError::NotFound)
}

/// Replaces the ordering of exactly the supplied phases
///
/// The list must be non-empty, duplicate-free, and every id must belong to
/// `project_id` — ordering across projects was possible in an earlier
/// revision of this system and is rejected here. The supplied set is not
/// required to cover all of the project's phases; unsupplied phases keep
/// their positions. Assignment (position = index + 1) is atomic across the
/// whole list.
pub async fn reorder_phases(
    pool: &PgPool,
    project_id: Uuid,
    ordered_phase_ids: &[Uuid],
) -> Result<Vec<Phase>, PhaseError> {
    if ordered_phase_ids.is_empty() {
        return Err(PhaseError::Validation(
            "orderedPhaseIds must not be empty".to_string(),
        ));
    }

    let mut seen = HashSet::with_capacity(ordered_phase_ids.len());
    for id in ordered_phase_ids {
        if !seen.insert(id) {
            return Err(PhaseError::Validation(
                "orderedPhaseIds contains duplicate ids".to_string(),
            ));
        }
    }

    let known: HashSet<Uuid> = Phase::ids_for_project(pool, project_id)
        .await?
        .into_iter()
        .collect();

    for id in ordered_phase_ids {
        if !known.contains(id) {
            // distinguish a phase that doesn't exist from one in another project
            return match Phase::find_by_id(pool, *id).await? {
                None => Err(PhaseError::NotFound),
                Some(_) => Err(PhaseError::NotInProject),
            };
        }
    }

    Phase::apply_order(pool, ordered_phase_ids).await?;

    info!(project_id = %project_id, count = ordered_phase_ids.len(), "Phases reordered");

    Ok(Phase::list_by_project(pool, project_id).await?)
}

/// Updates a phase's name, description, and/or target date
pub async fn update_phase(
    pool: &PgPool,
    phase_id: Uuid,
    patch: PhasePatch,
) -> Result<Phase, PhaseError> {
    let name = match patch.name {
        Some(name) => {
            let trimmed = name.trim().to_string();
            if trimmed.is_empty() {
                return Err(PhaseError::Validation("Phase name is required".to_string()));
            }
            Some(trimmed)
        }
        None => None,
    };

    Phase::update(
        pool,
        phase_id,
        UpdatePhase {
            name,
            description: patch.description,
            estimated_completion_at: patch.estimated_completion_at,
        },
    )
    .await?
    .ok_or(PhaseError::NotFound)
}

/// Deletes a phase; remaining positions are left as-is (gaps allowed)
pub async fn delete_phase(pool: &PgPool, phase_id: Uuid) -> Result<(), PhaseError> {
    let deleted = Phase::delete(pool, phase_id).await?;

    if !deleted {
        return Err(PhaseError::NotFound);
    }

    Ok(())
}
