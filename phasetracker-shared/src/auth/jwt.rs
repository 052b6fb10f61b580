/// JWT token generation and validation
///
/// Session tokens are signed with HS256 (HMAC-SHA256) and expire after
/// 8 hours. One claims shape is used for every issuing path — admin signup
/// verification, admin login, and client code login — distinguished by the
/// `role` claim; middleware rejects tokens whose role doesn't match the
/// route group.
///
/// # Example
///
/// ```
/// use phasetracker_shared::auth::jwt::{create_token, validate_token, Claims, Role};
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let claims = Claims::admin(Uuid::new_v4(), "ops@example.com");
/// let token = create_token(&claims, "secret-key-at-least-32-bytes-long!!")?;
///
/// let validated = validate_token(&token, "secret-key-at-least-32-bytes-long!!")?;
/// assert_eq!(validated.role, Role::Admin);
/// # Ok(())
/// # }
/// ```

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Token lifetime for every principal
pub const TOKEN_TTL_HOURS: i64 = 8;

/// Error type for JWT operations
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    /// Failed to create token
    #[error("Failed to create token: {0}")]
    CreateError(String),

    /// Failed to validate token
    #[error("Failed to validate token: {0}")]
    ValidationError(String),

    /// Token has expired
    #[error("Token has expired")]
    Expired,

    /// Token is valid but carries the wrong role for the route
    #[error("Token role not permitted here")]
    WrongRole,
}

/// Principal kind carried in the token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Project-managing operator
    Admin,

    /// Read-only timeline viewer
    Client,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Client => "client",
        }
    }
}

/// JWT claims
///
/// Standard claims (`sub`, `iss`, `iat`, `exp`, `nbf`) plus the
/// PhaseTracker `role` and, for admins, the account email.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - admin or client ID
    pub sub: Uuid,

    /// Issuer - always "phasetracker"
    pub iss: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Not before (Unix timestamp)
    pub nbf: i64,

    /// Principal kind
    pub role: Role,

    /// Account email (admins only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl Claims {
    fn new(sub: Uuid, role: Role, email: Option<String>) -> Self {
        let now = Utc::now();
        let expiration = now + Duration::hours(TOKEN_TTL_HOURS);

        Self {
            sub,
            iss: "phasetracker".to_string(),
            iat: now.timestamp(),
            exp: expiration.timestamp(),
            nbf: now.timestamp(),
            role,
            email,
        }
    }

    /// Claims for an admin session
    pub fn admin(admin_id: Uuid, email: &str) -> Self {
        Self::new(admin_id, Role::Admin, Some(email.to_string()))
    }

    /// Claims for a client session
    pub fn client(client_id: Uuid) -> Self {
        Self::new(client_id, Role::Client, None)
    }

    /// Checks if the token has expired
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }
}

/// Creates a signed JWT from claims
///
/// The secret should be at least 32 bytes and randomly generated; the
/// server refuses to boot with a shorter one.
pub fn create_token(claims: &Claims, secret: &str) -> Result<String, JwtError> {
    let header = Header::new(Algorithm::HS256);
    let key = EncodingKey::from_secret(secret.as_bytes());

    encode(&header, claims, &key)
        .map_err(|e| JwtError::CreateError(format!("Token encoding failed: {}", e)))
}

/// Validates a JWT and extracts its claims
///
/// Verifies signature, expiry, not-before, and the "phasetracker" issuer.
pub fn validate_token(token: &str, secret: &str) -> Result<Claims, JwtError> {
    let key = DecodingKey::from_secret(secret.as_bytes());

    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&["phasetracker"]);
    validation.validate_exp = true;
    validation.validate_nbf = true;

    let token_data = decode::<Claims>(token, &key, &validation).map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::Expired,
        _ => JwtError::ValidationError(format!("Token validation failed: {}", e)),
    })?;

    Ok(token_data.claims)
}

/// Validates a JWT and requires a specific role
pub fn validate_token_for_role(
    token: &str,
    secret: &str,
    role: Role,
) -> Result<Claims, JwtError> {
    let claims = validate_token(token, secret)?;

    if claims.role != role {
        return Err(JwtError::WrongRole);
    }

    Ok(claims)
}
