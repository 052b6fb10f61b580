/// Project endpoints (admin)
///
/// Plain data plumbing: project CRUD and client assignment. The phase
/// lifecycle endpoints live in `routes::phases`.

use crate::{
    app::AppState,
    error::{validation_failed, ApiError, ApiResult},
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use phasetracker_shared::{
    auth::middleware::AuthContext,
    models::{
        client::Client,
        project::{CreateProject, Project, ProjectStatus, UpdateProject},
        project_client::ProjectClient,
    },
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

/// Create project request
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateProjectRequest {
    #[validate(length(min = 1, max = 255, message = "Project name is required"))]
    pub name: String,

    #[serde(default)]
    pub description: String,
}

/// Update project request; omitted fields are left untouched
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProjectRequest {
    #[validate(length(min = 1, max = 255, message = "Project name must not be empty"))]
    pub name: Option<String>,

    pub description: Option<String>,

    pub status: Option<ProjectStatus>,
}

/// Client assignment request
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AssignClientRequest {
    /// Client email; the client record is created on first reference
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
}

/// `POST /projects`
pub async fn create_project(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateProjectRequest>,
) -> ApiResult<(StatusCode, Json<Project>)> {
    req.validate().map_err(validation_failed)?;

    let project = Project::create(
        &state.db,
        CreateProject {
            name: req.name,
            description: req.description,
            created_by: auth.principal_id,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(project)))
}

/// `GET /projects` — projects created by the authenticated admin
pub async fn list_projects(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<Project>>> {
    let projects = Project::list_by_admin(&state.db, auth.principal_id).await?;
    Ok(Json(projects))
}

/// `GET /projects/:project_id`
pub async fn get_project(
    State(state): State<AppState>,
    Path(project_id): Path<Uuid>,
) -> ApiResult<Json<Project>> {
    let project = Project::find_by_id(&state.db, project_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Project not found".to_string()))?;

    Ok(Json(project))
}

/// `PUT /projects/:project_id`
pub async fn update_project(
    State(state): State<AppState>,
    Path(project_id): Path<Uuid>,
    Json(req): Json<UpdateProjectRequest>,
) -> ApiResult<Json<Project>> {
    req.validate().map_err(validation_failed)?;

    let project = Project::update(
        &state.db,
        project_id,
        UpdateProject {
            name: req.name,
            description: req.description,
            status: req.status,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("Project not found".to_string()))?;

    Ok(Json(project))
}

/// `DELETE /projects/:project_id` — cascades to phases and assignments
pub async fn delete_project(
    State(state): State<AppState>,
    Path(project_id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    let deleted = Project::delete(&state.db, project_id).await?;

    if !deleted {
        return Err(ApiError::NotFound("Project not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}

/// `POST /projects/:project_id/clients` — assign a client by email
///
/// The client record is created lazily on first reference; assigning an
/// already-assigned client is a no-op.
pub async fn assign_client(
    State(state): State<AppState>,
    Path(project_id): Path<Uuid>,
    Json(req): Json<AssignClientRequest>,
) -> ApiResult<(StatusCode, Json<Client>)> {
    req.validate().map_err(validation_failed)?;

    if Project::find_by_id(&state.db, project_id).await?.is_none() {
        return Err(ApiError::NotFound("Project not found".to_string()));
    }

    let client = Client::find_or_create_by_email(&state.db, &req.email).await?;
    ProjectClient::assign(&state.db, project_id, client.id).await?;

    Ok((StatusCode::CREATED, Json(client)))
}

/// `GET /projects/:project_id/clients`
pub async fn list_project_clients(
    State(state): State<AppState>,
    Path(project_id): Path<Uuid>,
) -> ApiResult<Json<Vec<Client>>> {
    if Project::find_by_id(&state.db, project_id).await?.is_none() {
        return Err(ApiError::NotFound("Project not found".to_string()));
    }

    let clients = ProjectClient::list_clients(&state.db, project_id).await?;
    Ok(Json(clients))
}

/// `DELETE /projects/:project_id/clients/:client_id`
///
/// Removing an assignment that doesn't exist is still success.
pub async fn remove_client(
    State(state): State<AppState>,
    Path((project_id, client_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<StatusCode> {
    ProjectClient::remove(&state.db, project_id, client_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
