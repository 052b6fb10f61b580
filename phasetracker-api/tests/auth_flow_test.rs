/// Integration tests for the auth flows
///
/// Runs against a real Postgres database (DATABASE_URL) with migrations
/// applied. Covers:
/// - Admin signup → unverified login refusal → code verification → login
/// - Verification failure precedence (already-verified before code checks)
/// - Single-use and expired codes
/// - Anti-enumeration behavior for both principal kinds

mod common;

use axum::http::StatusCode;
use chrono::{Duration, Utc};
use common::TestContext;
use phasetracker_shared::models::admin::Admin;
use phasetracker_shared::models::client::Client;
use phasetracker_shared::models::verification_code::{CodeScope, VerificationCode};
use serde_json::json;

#[tokio::test]
async fn test_admin_signup_verify_login_flow() {
    let ctx = TestContext::new().await.unwrap();
    let email = TestContext::unique_email("signup");

    // Signup succeeds and the account starts unverified
    let (status, _) = ctx
        .send(
            "POST",
            "/auth/admin/signup",
            None,
            Some(json!({
                "email": email,
                "password": "pw123456",
                "firstName": "A",
                "lastName": "B"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let admin = Admin::find_by_email(&ctx.db, &email).await.unwrap().unwrap();
    assert!(!admin.is_verified);

    // The verification email went out with the code
    let sent = ctx.mailer.last_message().unwrap();
    assert_eq!(sent.to, email);

    // Login before verification is refused with 403
    let (status, _) = ctx
        .send(
            "POST",
            "/auth/admin/login",
            None,
            Some(json!({ "email": email, "password": "pw123456" })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Redeem the code
    let code = ctx.latest_code(CodeScope::Admin, admin.id).await.unwrap();
    assert!(sent.body.contains(&code.code));

    let (status, body) = ctx
        .send(
            "POST",
            "/auth/admin/verify-account",
            None,
            Some(json!({ "email": email, "code": code.code })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.unwrap()["token"].is_string());

    let admin = Admin::find_by_email(&ctx.db, &email).await.unwrap().unwrap();
    assert!(admin.is_verified);

    // Re-verifying with the same code fails — the already-verified check
    // runs before any code validity check
    let code = ctx.latest_code(CodeScope::Admin, admin.id).await.unwrap();
    let (status, body) = ctx
        .send(
            "POST",
            "/auth/admin/verify-account",
            None,
            Some(json!({ "email": email, "code": code.code })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body.unwrap()["message"], "Account already verified");

    // Login now succeeds
    let (status, body) = ctx
        .send(
            "POST",
            "/auth/admin/login",
            None,
            Some(json!({ "email": email, "password": "pw123456" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.unwrap()["token"].is_string());
}

#[tokio::test]
async fn test_signup_duplicate_email_conflicts() {
    let ctx = TestContext::new().await.unwrap();
    let email = TestContext::unique_email("dup");

    let payload = json!({
        "email": email,
        "password": "pw123456",
        "firstName": "A",
        "lastName": "B"
    });

    let (status, _) = ctx
        .send("POST", "/auth/admin/signup", None, Some(payload.clone()))
        .await;
    assert_eq!(status, StatusCode::CREATED);

    // Second signup with the same email conflicts, verified or not
    let (status, _) = ctx
        .send("POST", "/auth/admin/signup", None, Some(payload))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_signup_short_password_rejected() {
    let ctx = TestContext::new().await.unwrap();

    let (status, _) = ctx
        .send(
            "POST",
            "/auth/admin/signup",
            None,
            Some(json!({
                "email": TestContext::unique_email("short"),
                "password": "pw1",
                "firstName": "A",
                "lastName": "B"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_admin_login_does_not_reveal_which_credential_failed() {
    let ctx = TestContext::new().await.unwrap();
    let (admin, _) = ctx.seed_admin("pw123456").await.unwrap();

    // Wrong password for a real account
    let (status, body) = ctx
        .send(
            "POST",
            "/auth/admin/login",
            None,
            Some(json!({ "email": admin.email, "password": "wrong-password" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let wrong_password_message = body.unwrap()["message"].clone();

    // Unknown email entirely
    let (status, body) = ctx
        .send(
            "POST",
            "/auth/admin/login",
            None,
            Some(json!({
                "email": TestContext::unique_email("ghost"),
                "password": "pw123456"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Identical status and message in both cases
    assert_eq!(body.unwrap()["message"], wrong_password_message);
}

#[tokio::test]
async fn test_client_code_round_trip_is_single_use() {
    let ctx = TestContext::new().await.unwrap();
    let (client, _) = ctx.seed_client().await.unwrap();

    let (status, _) = ctx
        .send(
            "POST",
            "/auth/client/request-code",
            None,
            Some(json!({ "email": client.email })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let code = ctx.latest_code(CodeScope::Client, client.id).await.unwrap();
    assert!(ctx.mailer.last_message().unwrap().body.contains(&code.code));

    // First redemption succeeds
    let (status, body) = ctx
        .send(
            "POST",
            "/auth/client/verify-code",
            None,
            Some(json!({ "email": client.email, "code": code.code })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.unwrap()["token"].is_string());

    // Second redemption of the same code collapses to the generic error
    let (status, body) = ctx
        .send(
            "POST",
            "/auth/client/verify-code",
            None,
            Some(json!({ "email": client.email, "code": code.code })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body.unwrap()["message"], "Invalid verification code");
}

#[tokio::test]
async fn test_request_code_for_unknown_email_has_no_side_effects() {
    let ctx = TestContext::new().await.unwrap();
    let ghost_email = TestContext::unique_email("nobody");
    let sent_before = ctx.mailer.sent_count();

    let (status, body) = ctx
        .send(
            "POST",
            "/auth/client/request-code",
            None,
            Some(json!({ "email": ghost_email })),
        )
        .await;

    // Same generic success as for a real account
    assert_eq!(status, StatusCode::OK);
    assert!(body.unwrap()["message"]
        .as_str()
        .unwrap()
        .contains("If that email is registered"));

    // No client row created, no email dispatched
    assert!(Client::find_by_email(&ctx.db, &ghost_email)
        .await
        .unwrap()
        .is_none());
    assert_eq!(ctx.mailer.sent_count(), sent_before);
}

#[tokio::test]
async fn test_expired_client_code_gets_distinct_error() {
    let ctx = TestContext::new().await.unwrap();
    let (client, _) = ctx.seed_client().await.unwrap();

    // Plant a correct but already-expired code
    let expired = VerificationCode::create(
        &ctx.db,
        CodeScope::Client,
        client.id,
        "123456",
        Utc::now() - Duration::minutes(1),
    )
    .await
    .unwrap();
    assert!(expired.is_expired());

    let (status, body) = ctx
        .send(
            "POST",
            "/auth/client/verify-code",
            None,
            Some(json!({ "email": client.email, "code": "123456" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body.unwrap()["message"], "Verification code expired");
}

#[tokio::test]
async fn test_wrong_client_code_is_generic() {
    let ctx = TestContext::new().await.unwrap();
    let (client, _) = ctx.seed_client().await.unwrap();

    ctx.send(
        "POST",
        "/auth/client/request-code",
        None,
        Some(json!({ "email": client.email })),
    )
    .await;

    let (status, body) = ctx
        .send(
            "POST",
            "/auth/client/verify-code",
            None,
            Some(json!({ "email": client.email, "code": "000000" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body.unwrap()["message"], "Invalid verification code");
}
