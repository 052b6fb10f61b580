/// Client endpoints
///
/// Two audiences share this module:
///
/// - Admin management: `POST /clients`, `GET /clients`
/// - The client portal: `GET /client/projects` — the read-only timeline of
///   the authenticated client's assigned active projects

use crate::{
    app::AppState,
    error::{validation_failed, ApiResult},
};
use axum::{extract::State, http::StatusCode, Extension, Json};
use phasetracker_shared::{
    auth::middleware::AuthContext,
    models::{
        client::Client,
        phase::Phase,
        project::{Project, ProjectStatus},
        project_client::ProjectClient,
    },
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Create client request
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateClientRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
}

/// One project on the client timeline, phases in order
#[derive(Debug, Serialize)]
pub struct TimelineProject {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub status: ProjectStatus,
    pub phases: Vec<Phase>,
}

impl TimelineProject {
    fn new(project: Project, phases: Vec<Phase>) -> Self {
        Self {
            id: project.id,
            name: project.name,
            description: project.description,
            status: project.status,
            phases,
        }
    }
}

/// `POST /clients` (admin) — create (or return) a client by email
pub async fn create_client(
    State(state): State<AppState>,
    Json(req): Json<CreateClientRequest>,
) -> ApiResult<(StatusCode, Json<Client>)> {
    req.validate().map_err(validation_failed)?;

    let client = Client::find_or_create_by_email(&state.db, &req.email).await?;

    Ok((StatusCode::CREATED, Json(client)))
}

/// `GET /clients` (admin)
pub async fn list_clients(State(state): State<AppState>) -> ApiResult<Json<Vec<Client>>> {
    let clients = Client::list(&state.db).await?;
    Ok(Json(clients))
}

/// `GET /client/projects` (client) — the timeline read
///
/// Archived projects are filtered out; phases arrive in position order, so
/// the portal renders them as-is.
pub async fn my_projects(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<TimelineProject>>> {
    let projects = ProjectClient::list_active_projects(&state.db, auth.principal_id).await?;

    let mut timeline = Vec::with_capacity(projects.len());
    for project in projects {
        let phases = Phase::list_by_project(&state.db, project.id).await?;
        timeline.push(TimelineProject::new(project, phases));
    }

    Ok(Json(timeline))
}
