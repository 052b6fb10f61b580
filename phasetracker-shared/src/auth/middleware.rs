/// Request authentication context
///
/// The API server's auth layers validate the Bearer token and insert an
/// [`AuthContext`] into request extensions; handlers extract it with
/// Axum's `Extension` extractor.
///
/// # Example
///
/// ```
/// use axum::Extension;
/// use phasetracker_shared::auth::middleware::AuthContext;
///
/// async fn handler(Extension(auth): Extension<AuthContext>) -> String {
///     format!("Principal: {}", auth.principal_id)
/// }
/// ```

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::jwt::{Claims, Role};

/// Authenticated principal attached to a request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthContext {
    /// Admin or client ID from the token's `sub`
    pub principal_id: Uuid,

    /// Principal kind; route groups are role-gated before handlers run
    pub role: Role,

    /// Account email (admins only)
    pub email: Option<String>,
}

impl AuthContext {
    /// Builds the context from validated claims
    pub fn from_claims(claims: &Claims) -> Self {
        Self {
            principal_id: claims.sub,
            role: claims.role,
            email: claims.email.clone(),
        }
    }

    /// Whether the principal is an admin
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}
