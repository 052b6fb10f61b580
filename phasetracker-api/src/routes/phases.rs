/// Phase lifecycle endpoints (admin)
///
/// # Endpoints
///
/// - `POST /projects/:projectId/phases` - append a phase (pending)
/// - `GET /projects/:projectId/phases` - timeline order
/// - `POST .../phases/:phaseId/set-active` - activation transition
/// - `POST .../phases/:phaseId/complete` - single-phase completion
/// - `POST .../phases/:phaseId/reopen` - back to pending
/// - `PUT .../phases/reorder` - replace ordering for the supplied set
/// - `PUT .../phases/:phaseId` - update name/description/target date
/// - `DELETE .../phases/:phaseId` - delete (positions keep their gaps)
///
/// All real rules live in `services::phases`; these handlers only decode
/// requests and encode responses. The `order` field in responses is the
/// phase's 1-based position.

use crate::{app::AppState, error::ApiResult, services::phases as phase_service};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use phasetracker_shared::models::phase::Phase;
use serde::{Deserialize, Deserializer};
use uuid::Uuid;

/// Create phase request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePhaseRequest {
    /// Display name; emptiness is rejected by the engine, not the DTO
    pub name: String,

    #[serde(default)]
    pub description: String,
}

/// Update phase request
///
/// `estimatedCompletionAt` distinguishes three inputs: key absent (leave
/// the stored date alone), explicit `null` (clear it), and a date (set it).
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePhaseRequest {
    pub name: Option<String>,

    pub description: Option<String>,

    #[serde(default, deserialize_with = "double_option")]
    pub estimated_completion_at: Option<Option<NaiveDate>>,
}

/// Reorder request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReorderRequest {
    /// Phase ids in their new order; index + 1 becomes the position
    pub ordered_phase_ids: Vec<Uuid>,
}

// Maps a present-but-null JSON value to Some(None), leaving an absent key
// as None via #[serde(default)].
fn double_option<'de, D>(deserializer: D) -> Result<Option<Option<NaiveDate>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<NaiveDate>::deserialize(deserializer).map(Some)
}

/// `POST /projects/:project_id/phases`
pub async fn create_phase(
    State(state): State<AppState>,
    Path(project_id): Path<Uuid>,
    Json(req): Json<CreatePhaseRequest>,
) -> ApiResult<(StatusCode, Json<Phase>)> {
    let phase = phase_service::add_phase(
        &state.db,
        project_id,
        phase_service::NewPhase {
            name: req.name,
            description: req.description,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(phase)))
}

/// `GET /projects/:project_id/phases`
pub async fn list_phases(
    State(state): State<AppState>,
    Path(project_id): Path<Uuid>,
) -> ApiResult<Json<Vec<Phase>>> {
    let phases = phase_service::list_phases(&state.db, project_id).await?;
    Ok(Json(phases))
}

/// `POST /projects/:project_id/phases/:phase_id/set-active`
pub async fn set_active_phase(
    State(state): State<AppState>,
    Path((project_id, phase_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<Json<Phase>> {
    let phase = phase_service::set_active_phase(&state.db, project_id, phase_id).await?;
    Ok(Json(phase))
}

/// `POST /projects/:project_id/phases/:phase_id/complete`
pub async fn complete_phase(
    State(state): State<AppState>,
    Path((project_id, phase_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<Json<Phase>> {
    let phase = phase_service::set_phase_complete(&state.db, project_id, phase_id).await?;
    Ok(Json(phase))
}

/// `POST /projects/:project_id/phases/:phase_id/reopen`
pub async fn reopen_phase(
    State(state): State<AppState>,
    Path((project_id, phase_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<Json<Phase>> {
    let phase = phase_service::reopen_phase(&state.db, project_id, phase_id).await?;
    Ok(Json(phase))
}

/// `PUT /projects/:project_id/phases/reorder`
pub async fn reorder_phases(
    State(state): State<AppState>,
    Path(project_id): Path<Uuid>,
    Json(req): Json<ReorderRequest>,
) -> ApiResult<Json<Vec<Phase>>> {
    let phases =
        phase_service::reorder_phases(&state.db, project_id, &req.ordered_phase_ids).await?;
    Ok(Json(phases))
}

/// `PUT /projects/:project_id/phases/:phase_id`
pub async fn update_phase(
    State(state): State<AppState>,
    Path((_project_id, phase_id)): Path<(Uuid, Uuid)>,
    Json(req): Json<UpdatePhaseRequest>,
) -> ApiResult<Json<Phase>> {
    let phase = phase_service::update_phase(
        &state.db,
        phase_id,
        phase_service::PhasePatch {
            name: req.name,
            description: req.description,
            estimated_completion_at: req.estimated_completion_at,
        },
    )
    .await?;

    Ok(Json(phase))
}

/// `DELETE /projects/:project_id/phases/:phase_id`
pub async fn delete_phase(
    State(state): State<AppState>,
    Path((_project_id, phase_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<StatusCode> {
    phase_service::delete_phase(&state.db, phase_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct Probe {
        #[serde(default, deserialize_with = "double_option")]
        estimated_completion_at: Option<Option<NaiveDate>>,
    }

    #[test]
    fn test_absent_key_means_untouched() {
        let probe: Probe = serde_json::from_str("{}").unwrap();
        assert_eq!(probe.estimated_completion_at, None);
    }

    #[test]
    fn test_null_means_clear() {
        let probe: Probe =
            serde_json::from_str(r#"{"estimatedCompletionAt": null}"#).unwrap();
        assert_eq!(probe.estimated_completion_at, Some(None));
    }

    #[test]
    fn test_value_means_set() {
        let probe: Probe =
            serde_json::from_str(r#"{"estimatedCompletionAt": "2026-03-01"}"#).unwrap();
        assert_eq!(
            probe.estimated_completion_at,
            Some(Some(NaiveDate::from_ymd_opt(2026, 3, 1).unwrap()))
        );
    }

    #[test]
    fn test_reorder_request_field_name() {
        let req: ReorderRequest = serde_json::from_str(
            r#"{"orderedPhaseIds": ["550e8400-e29b-41d4-a716-446655440000"]}"#,
        )
        .unwrap();
        assert_eq!(req.ordered_phase_ids.len(), 1);
    }
}
