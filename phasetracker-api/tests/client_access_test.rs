/// Integration tests for client assignment and the client timeline
///
/// Covers the admin-side assignment contract (idempotent add, unconditional
/// remove), role separation between the two token kinds, and the read-only
/// timeline (active projects only, phases in order).

mod common;

use axum::http::StatusCode;
use common::TestContext;
use phasetracker_shared::models::project_client::ProjectClient;
use serde_json::json;

#[tokio::test]
async fn test_assignment_is_idempotent_and_removal_unconditional() {
    let ctx = TestContext::new().await.unwrap();
    let (admin, token) = ctx.seed_admin("pw123456").await.unwrap();
    let project = ctx.seed_project(admin.id, "Assignments").await.unwrap();
    let email = TestContext::unique_email("assignee");

    // Assigning by a brand-new email creates the client lazily
    let (status, body) = ctx
        .send(
            "POST",
            &format!("/projects/{}/clients", project.id),
            Some(&token),
            Some(json!({ "email": email })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let client_id = body.unwrap()["id"].as_str().unwrap().to_string();

    // Assigning the same client again is a no-op, not an error
    let (status, _) = ctx
        .send(
            "POST",
            &format!("/projects/{}/clients", project.id),
            Some(&token),
            Some(json!({ "email": email })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let assigned = ProjectClient::list_clients(&ctx.db, project.id).await.unwrap();
    assert_eq!(assigned.len(), 1);

    // Removal succeeds, and removing an absent assignment still succeeds
    for _ in 0..2 {
        let (status, _) = ctx
            .send(
                "DELETE",
                &format!("/projects/{}/clients/{}", project.id, client_id),
                Some(&token),
                None,
            )
            .await;
        assert_eq!(status, StatusCode::NO_CONTENT);
    }

    ctx.cleanup_project(project.id).await.unwrap();
}

#[tokio::test]
async fn test_client_timeline_shows_active_projects_in_phase_order() {
    let ctx = TestContext::new().await.unwrap();
    let (admin, admin_token) = ctx.seed_admin("pw123456").await.unwrap();
    let (client, client_token) = ctx.seed_client().await.unwrap();

    let active = ctx.seed_project(admin.id, "Visible").await.unwrap();
    let archived = ctx.seed_project(admin.id, "Hidden").await.unwrap();

    for name in ["Kickoff", "Build", "Launch"] {
        ctx.send(
            "POST",
            &format!("/projects/{}/phases", active.id),
            Some(&admin_token),
            Some(json!({ "name": name })),
        )
        .await;
    }

    // Assign the client to both projects, then archive one
    for project_id in [active.id, archived.id] {
        ctx.send(
            "POST",
            &format!("/projects/{}/clients", project_id),
            Some(&admin_token),
            Some(json!({ "email": client.email })),
        )
        .await;
    }
    ctx.send(
        "PUT",
        &format!("/projects/{}", archived.id),
        Some(&admin_token),
        Some(json!({ "status": "archived" })),
    )
    .await;

    let (status, body) = ctx
        .send("GET", "/client/projects", Some(&client_token), None)
        .await;
    assert_eq!(status, StatusCode::OK);

    let timeline = body.unwrap();
    let projects = timeline.as_array().unwrap();
    assert_eq!(projects.len(), 1);
    assert_eq!(projects[0]["name"], "Visible");

    let phases = projects[0]["phases"].as_array().unwrap();
    assert_eq!(phases.len(), 3);
    assert_eq!(phases[0]["name"], "Kickoff");
    assert_eq!(phases[0]["order"], 1);
    assert_eq!(phases[2]["name"], "Launch");
    assert_eq!(phases[2]["order"], 3);

    ctx.cleanup_project(active.id).await.unwrap();
    ctx.cleanup_project(archived.id).await.unwrap();
}

#[tokio::test]
async fn test_role_separation() {
    let ctx = TestContext::new().await.unwrap();
    let (_, admin_token) = ctx.seed_admin("pw123456").await.unwrap();
    let (_, client_token) = ctx.seed_client().await.unwrap();

    // No token at all
    let (status, _) = ctx.send("GET", "/projects", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // A client token cannot reach admin routes
    let (status, _) = ctx.send("GET", "/projects", Some(&client_token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // An admin token cannot reach the client portal
    let (status, _) = ctx
        .send("GET", "/client/projects", Some(&admin_token), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // The right roles get through
    let (status, _) = ctx.send("GET", "/projects", Some(&admin_token), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = ctx
        .send("GET", "/client/projects", Some(&client_token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_security_headers_present() {
    let ctx = TestContext::new().await.unwrap();

    // Inspect raw response headers through the full router stack
    use axum::body::Body;
    use axum::http::Request;
    use tower::Service as _;

    let response = ctx
        .app
        .clone()
        .call(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let headers = response.headers();
    assert_eq!(headers.get("X-Content-Type-Options").unwrap(), "nosniff");
    assert_eq!(headers.get("X-Frame-Options").unwrap(), "DENY");
    // HSTS only appears in production configurations
    assert!(headers.get("Strict-Transport-Security").is_none() || ctx.config.api.production);
}
