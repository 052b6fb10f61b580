/// Authentication flows
///
/// Orchestrates the two principal kinds:
///
/// - Admins: `unverified --(signup)--> unverified --(verify code)-->
///   verified`. Verified is terminal. Login requires a verified account
///   and an Argon2 password check.
/// - Clients: no persistent verified state; every login is a fresh
///   code-request/verify round trip.
///
/// Two deliberate anti-enumeration collapses live in this module and must
/// not be "improved":
///
/// - [`login_admin`] reports unknown email and wrong password identically.
/// - [`request_client_code`] succeeds silently for unknown emails, and
///   [`verify_client_code`] reports missing client, missing code, and used
///   code as the same invalid-code error. Only the expired case (real,
///   unused, too late) gets its own message, so a slow user knows to ask
///   for a new code.
///
/// Code redemption is single-use: the state flip and the code's `used_at`
/// commit in one transaction, and the used-guard on the UPDATE decides
/// races between concurrent redemptions.

use phasetracker_shared::{
    auth::{
        code::issue_code,
        jwt::{self, Claims, JwtError},
        password::{self, PasswordError},
    },
    mailer::{messages, MailError, Mailer},
    models::{
        admin::{Admin, CreateAdmin},
        client::Client,
        verification_code::{CodeScope, VerificationCode},
    },
};
use sqlx::PgPool;
use tracing::{debug, info};

/// Typed failure kinds for the auth flows
///
/// The transport layer maps these to status codes; no caller inspects
/// message strings.
#[derive(Debug, thiserror::Error)]
pub enum AuthFlowError {
    /// Signup email is already registered (any verification state)
    #[error("Email already registered")]
    EmailTaken,

    /// No admin matches the given email
    #[error("Account not found")]
    AccountNotFound,

    /// Admin is already verified; re-verification is not allowed
    #[error("Account already verified")]
    AlreadyVerified,

    /// Code missing or not redeemable (generic on purpose)
    #[error("Invalid verification code")]
    InvalidCode,

    /// Code exists and is unused but its expiry has passed
    #[error("Verification code expired")]
    ExpiredCode,

    /// Code was already redeemed
    #[error("Verification code already used")]
    CodeAlreadyUsed,

    /// Unknown email or wrong password (identical on purpose)
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// Password is correct but the account was never verified
    #[error("Account not verified")]
    AccountNotVerified,

    #[error(transparent)]
    Password(#[from] PasswordError),

    #[error(transparent)]
    Jwt(#[from] JwtError),

    #[error(transparent)]
    Mail(#[from] MailError),

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Input for admin signup
#[derive(Debug, Clone)]
pub struct SignupAdmin {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

/// Registers a new admin and dispatches the verification email
///
/// The account starts unverified; the code travels out-of-band, so this
/// returns nothing. Side effects: one admin row, one code row, one email.
pub async fn signup_admin(
    pool: &PgPool,
    mailer: &dyn Mailer,
    input: SignupAdmin,
) -> Result<(), AuthFlowError> {
    if Admin::find_by_email(pool, &input.email).await?.is_some() {
        return Err(AuthFlowError::EmailTaken);
    }

    let password_hash = password::hash_password(&input.password)?;

    let admin = Admin::create(
        pool,
        CreateAdmin {
            email: input.email,
            password_hash,
            first_name: input.first_name,
            last_name: input.last_name,
        },
    )
    .await?;

    let issued = issue_code();
    VerificationCode::create(
        pool,
        CodeScope::Admin,
        admin.id,
        &issued.code,
        issued.expires_at,
    )
    .await?;

    mailer
        .send(messages::admin_verification(
            &admin.email,
            &admin.first_name,
            &issued.code,
        ))
        .await?;

    info!(admin_id = %admin.id, "Admin signed up, verification code sent");

    Ok(())
}

/// Redeems an admin's signup verification code and issues a session token
///
/// Failure precedence is part of the contract and must stay in this exact
/// order: account missing → already verified → no matching code → expired
/// → already used.
pub async fn verify_admin_account(
    pool: &PgPool,
    jwt_secret: &str,
    email: &str,
    code: &str,
) -> Result<String, AuthFlowError> {
    let admin = Admin::find_by_email(pool, email)
        .await?
        .ok_or(AuthFlowError::AccountNotFound)?;

    if admin.is_verified {
        return Err(AuthFlowError::AlreadyVerified);
    }

    let row = VerificationCode::find_by_owner_and_code(pool, CodeScope::Admin, admin.id, code)
        .await?
        .ok_or(AuthFlowError::InvalidCode)?;

    if row.is_expired() {
        return Err(AuthFlowError::ExpiredCode);
    }

    if row.is_used() {
        return Err(AuthFlowError::CodeAlreadyUsed);
    }

    let mut tx = pool.begin().await?;

    Admin::mark_verified(&mut tx, admin.id).await?;

    let marked = VerificationCode::mark_used(&mut tx, CodeScope::Admin, row.id).await?;
    if !marked {
        // another redemption won the race between our read and this update
        tx.rollback().await?;
        return Err(AuthFlowError::CodeAlreadyUsed);
    }

    tx.commit().await?;

    info!(admin_id = %admin.id, "Admin account verified");

    let token = jwt::create_token(&Claims::admin(admin.id, &admin.email), jwt_secret)?;
    Ok(token)
}

/// Authenticates an admin with email + password
///
/// Unknown email and wrong password are indistinguishable to the caller.
/// The Argon2 verification is constant-time.
pub async fn login_admin(
    pool: &PgPool,
    jwt_secret: &str,
    email: &str,
    password_input: &str,
) -> Result<String, AuthFlowError> {
    let admin = Admin::find_by_email(pool, email)
        .await?
        .ok_or(AuthFlowError::InvalidCredentials)?;

    let valid = password::verify_password(password_input, &admin.password_hash)?;
    if !valid {
        return Err(AuthFlowError::InvalidCredentials);
    }

    if !admin.is_verified {
        return Err(AuthFlowError::AccountNotVerified);
    }

    debug!(admin_id = %admin.id, "Admin logged in");

    let token = jwt::create_token(&Claims::admin(admin.id, &admin.email), jwt_secret)?;
    Ok(token)
}

/// Issues a login code for a client, if the email is known
///
/// Unknown emails return success with no side effects — the response never
/// reveals whether an account exists. Clients are never created here.
pub async fn request_client_code(
    pool: &PgPool,
    mailer: &dyn Mailer,
    email: &str,
) -> Result<(), AuthFlowError> {
    let Some(client) = Client::find_by_email(pool, email).await? else {
        debug!("Login code requested for unknown email, ignoring");
        return Ok(());
    };

    let issued = issue_code();
    VerificationCode::create(
        pool,
        CodeScope::Client,
        client.id,
        &issued.code,
        issued.expires_at,
    )
    .await?;

    mailer
        .send(messages::client_login(&client.email, &issued.code))
        .await?;

    info!(client_id = %client.id, "Client login code sent");

    Ok(())
}

/// Redeems a client login code and issues a session token
///
/// Missing client, missing code, and already-used code all collapse to
/// [`AuthFlowError::InvalidCode`]; only a real-but-late code reports
/// [`AuthFlowError::ExpiredCode`].
pub async fn verify_client_code(
    pool: &PgPool,
    jwt_secret: &str,
    email: &str,
    code: &str,
) -> Result<String, AuthFlowError> {
    let client = Client::find_by_email(pool, email)
        .await?
        .ok_or(AuthFlowError::InvalidCode)?;

    let row = VerificationCode::find_by_owner_and_code(pool, CodeScope::Client, client.id, code)
        .await?
        .ok_or(AuthFlowError::InvalidCode)?;

    if row.is_used() {
        return Err(AuthFlowError::InvalidCode);
    }

    if row.is_expired() {
        return Err(AuthFlowError::ExpiredCode);
    }

    let mut tx = pool.begin().await?;

    let marked = VerificationCode::mark_used(&mut tx, CodeScope::Client, row.id).await?;
    if !marked {
        tx.rollback().await?;
        return Err(AuthFlowError::InvalidCode);
    }

    tx.commit().await?;

    debug!(client_id = %client.id, "Client logged in via code");

    let token = jwt::create_token(&Claims::client(client.id), jwt_secret)?;
    Ok(token)
}

// The flows are exercised end-to-end (including the precedence order and
// the anti-enumeration paths) by phasetracker-api/tests/auth_flow_test.rs.
