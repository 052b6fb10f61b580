/// Project/client assignment join table
///
/// Many-to-many between projects and clients. Assignment is idempotent
/// (inserting an existing pair is a no-op) and removal is unconditional
/// (removing an absent pair is still success) — both ends of the contract
/// let the admin UI retry freely.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE project_clients (
///     project_id UUID NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
///     client_id UUID NOT NULL REFERENCES clients(id) ON DELETE CASCADE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     PRIMARY KEY (project_id, client_id)
/// );
/// ```

use sqlx::PgPool;
use uuid::Uuid;

use super::client::Client;
use super::project::Project;

/// Assignment operations; the join rows themselves are never returned
pub struct ProjectClient;

impl ProjectClient {
    /// Assigns a client to a project (idempotent)
    pub async fn assign(
        pool: &PgPool,
        project_id: Uuid,
        client_id: Uuid,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO project_clients (project_id, client_id)
            VALUES ($1, $2)
            ON CONFLICT (project_id, client_id) DO NOTHING
            "#,
        )
        .bind(project_id)
        .bind(client_id)
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Removes a client from a project (absence is success)
    pub async fn remove(
        pool: &PgPool,
        project_id: Uuid,
        client_id: Uuid,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "DELETE FROM project_clients WHERE project_id = $1 AND client_id = $2",
        )
        .bind(project_id)
        .bind(client_id)
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Lists the clients assigned to a project
    pub async fn list_clients(
        pool: &PgPool,
        project_id: Uuid,
    ) -> Result<Vec<Client>, sqlx::Error> {
        let clients = sqlx::query_as::<_, Client>(
            r#"
            SELECT c.id, c.email, c.created_at
            FROM clients c
            JOIN project_clients pc ON pc.client_id = c.id
            WHERE pc.project_id = $1
            ORDER BY c.email ASC
            "#,
        )
        .bind(project_id)
        .fetch_all(pool)
        .await?;

        Ok(clients)
    }

    /// Lists a client's assigned projects that are currently active
    ///
    /// This is the client timeline read; archived projects are filtered out
    /// here rather than in the handler.
    pub async fn list_active_projects(
        pool: &PgPool,
        client_id: Uuid,
    ) -> Result<Vec<Project>, sqlx::Error> {
        let projects = sqlx::query_as::<_, Project>(
            r#"
            SELECT p.id, p.name, p.description, p.status, p.created_by,
                   p.created_at, p.updated_at
            FROM projects p
            JOIN project_clients pc ON pc.project_id = p.id
            WHERE pc.client_id = $1 AND p.status = 'active'
            ORDER BY p.created_at DESC
            "#,
        )
        .bind(client_id)
        .fetch_all(pool)
        .await?;

        Ok(projects)
    }
}

// Assignment behavior (idempotent insert, unconditional delete, active-only
// timeline) is covered by the integration tests in phasetracker-api/tests/.
