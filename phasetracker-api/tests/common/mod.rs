/// Common test utilities for integration tests
///
/// Provides the shared infrastructure:
/// - Test database setup (migrations applied on connect)
/// - A recording mailer so tests can assert on dispatched email
/// - Seeded admin/client accounts with ready-made JWTs
/// - Request helpers driving the real router

use axum::body::Body;
use axum::http::{Request, StatusCode};
use phasetracker_api::app::{build_router, AppState};
use phasetracker_api::config::Config;
use phasetracker_shared::auth::jwt::{create_token, Claims};
use phasetracker_shared::auth::password::hash_password;
use phasetracker_shared::mailer::{EmailMessage, MailError, Mailer};
use phasetracker_shared::models::admin::{Admin, CreateAdmin};
use phasetracker_shared::models::client::Client;
use phasetracker_shared::models::project::{CreateProject, Project};
use phasetracker_shared::models::verification_code::{CodeScope, VerificationCode};
use sqlx::PgPool;
use std::sync::{Arc, Mutex};
use tower::Service as _;
use uuid::Uuid;

/// Mailer that records messages instead of sending them
#[derive(Default)]
pub struct RecordingMailer {
    messages: Mutex<Vec<EmailMessage>>,
}

#[async_trait::async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, message: EmailMessage) -> Result<(), MailError> {
        self.messages.lock().unwrap().push(message);
        Ok(())
    }
}

impl RecordingMailer {
    /// Number of messages dispatched so far
    pub fn sent_count(&self) -> usize {
        self.messages.lock().unwrap().len()
    }

    /// Last message dispatched, if any
    pub fn last_message(&self) -> Option<EmailMessage> {
        self.messages.lock().unwrap().last().cloned()
    }
}

/// Test context containing all necessary resources
pub struct TestContext {
    pub db: PgPool,
    pub app: axum::Router,
    pub config: Config,
    pub mailer: Arc<RecordingMailer>,
}

impl TestContext {
    /// Creates a new test context against the configured test database
    pub async fn new() -> anyhow::Result<Self> {
        let config = Config::from_env()?;

        let db = PgPool::connect(&config.database.url).await?;

        // Path relative to this crate's Cargo.toml
        sqlx::migrate!("../migrations").run(&db).await?;

        let mailer = Arc::new(RecordingMailer::default());
        let state = AppState::new(db.clone(), config.clone(), mailer.clone());
        let app = build_router(state);

        Ok(TestContext {
            db,
            app,
            config,
            mailer,
        })
    }

    /// Unique email for this test run
    pub fn unique_email(prefix: &str) -> String {
        format!("{}-{}@example.com", prefix, Uuid::new_v4())
    }

    /// Creates a verified admin with the given password and returns it with
    /// a ready-made session token
    pub async fn seed_admin(&self, password: &str) -> anyhow::Result<(Admin, String)> {
        let admin = Admin::create(
            &self.db,
            CreateAdmin {
                email: Self::unique_email("admin"),
                password_hash: hash_password(password)?,
                first_name: "Test".to_string(),
                last_name: "Admin".to_string(),
            },
        )
        .await?;

        sqlx::query("UPDATE admins SET is_verified = TRUE WHERE id = $1")
            .bind(admin.id)
            .execute(&self.db)
            .await?;

        let token = create_token(
            &Claims::admin(admin.id, &admin.email),
            &self.config.jwt.secret,
        )?;

        Ok((admin, token))
    }

    /// Creates a client and returns it with a ready-made session token
    pub async fn seed_client(&self) -> anyhow::Result<(Client, String)> {
        let client = Client::create(&self.db, &Self::unique_email("client")).await?;

        let token = create_token(&Claims::client(client.id), &self.config.jwt.secret)?;

        Ok((client, token))
    }

    /// Creates a project owned by the given admin
    pub async fn seed_project(&self, admin_id: Uuid, name: &str) -> anyhow::Result<Project> {
        let project = Project::create(
            &self.db,
            CreateProject {
                name: name.to_string(),
                description: String::new(),
                created_by: admin_id,
            },
        )
        .await?;

        Ok(project)
    }

    /// Fetches the most recent code issued to an owner, straight from the
    /// database (tests play the role of the email recipient)
    pub async fn latest_code(
        &self,
        scope: CodeScope,
        owner_id: Uuid,
    ) -> anyhow::Result<VerificationCode> {
        let query = format!(
            "SELECT id, {owner} AS owner_id, code, expires_at, used_at, created_at \
             FROM {table} WHERE {owner} = $1 ORDER BY created_at DESC LIMIT 1",
            table = scope.table(),
            owner = scope.owner_column(),
        );

        let code = sqlx::query_as::<_, VerificationCode>(&query)
            .bind(owner_id)
            .fetch_one(&self.db)
            .await?;

        Ok(code)
    }

    /// Sends a request through the real router, returning status and the
    /// parsed JSON body (None for empty bodies)
    pub async fn send(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<serde_json::Value>,
    ) -> (StatusCode, Option<serde_json::Value>) {
        let mut builder = Request::builder().method(method).uri(uri);

        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {}", token));
        }

        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.app.clone().call(request).await.unwrap();
        let status = response.status();

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();

        let json = if bytes.is_empty() {
            None
        } else {
            serde_json::from_slice(&bytes).ok()
        };

        (status, json)
    }

    /// Deletes a project (cascades to phases and assignments)
    pub async fn cleanup_project(&self, project_id: Uuid) -> anyhow::Result<()> {
        Project::delete(&self.db, project_id).await?;
        Ok(())
    }
}
