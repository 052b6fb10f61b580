/// One-time verification codes
///
/// Codes prove control of an email address. Admin signup verification and
/// client passwordless login use identically-shaped rows in separate tables
/// (`admin_codes` / `client_codes`); `CodeScope` selects the table.
///
/// A code row is written once and mutated at most once: `used_at` is set on
/// successful redemption. A code is valid iff `used_at IS NULL AND now() <
/// expires_at`. Multiple rows may exist per owner — older codes go stale on
/// their own expiry; redemption matches by exact code value, so only the
/// matching row is ever checked.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE admin_codes (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     admin_id UUID NOT NULL REFERENCES admins(id) ON DELETE CASCADE,
///     code VARCHAR(6) NOT NULL,
///     expires_at TIMESTAMPTZ NOT NULL,
///     used_at TIMESTAMPTZ,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// -- client_codes is identical with client_id in place of admin_id
/// ```

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

/// Which code table a query targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeScope {
    /// Admin signup verification codes (`admin_codes`)
    Admin,

    /// Client login codes (`client_codes`)
    Client,
}

impl CodeScope {
    /// Table holding this scope's codes
    pub fn table(&self) -> &'static str {
        match self {
            CodeScope::Admin => "admin_codes",
            CodeScope::Client => "client_codes",
        }
    }

    /// Owner foreign-key column of this scope's table
    pub fn owner_column(&self) -> &'static str {
        match self {
            CodeScope::Admin => "admin_id",
            CodeScope::Client => "client_id",
        }
    }
}

/// A persisted one-time code
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct VerificationCode {
    /// Unique code row ID
    pub id: Uuid,

    /// Owning admin or client ID (depending on scope)
    pub owner_id: Uuid,

    /// 6-digit decimal code
    pub code: String,

    /// Expiry instant; the code is dead afterwards even if unused
    pub expires_at: DateTime<Utc>,

    /// Set exactly once, on successful redemption
    pub used_at: Option<DateTime<Utc>>,

    /// When the code was issued
    pub created_at: DateTime<Utc>,
}

impl VerificationCode {
    /// Whether the expiry instant has passed
    pub fn is_expired(&self) -> bool {
        Utc::now() > self.expires_at
    }

    /// Whether the code has already been redeemed
    pub fn is_used(&self) -> bool {
        self.used_at.is_some()
    }

    /// Persists a freshly issued code for one owner
    pub async fn create(
        pool: &PgPool,
        scope: CodeScope,
        owner_id: Uuid,
        code: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<Self, sqlx::Error> {
        let query = format!(
            r#"
            INSERT INTO {table} ({owner}, code, expires_at)
            VALUES ($1, $2, $3)
            RETURNING id, {owner} AS owner_id, code, expires_at, used_at, created_at
            "#,
            table = scope.table(),
            owner = scope.owner_column(),
        );

        let row = sqlx::query_as::<_, VerificationCode>(&query)
            .bind(owner_id)
            .bind(code)
            .bind(expires_at)
            .fetch_one(pool)
            .await?;

        Ok(row)
    }

    /// Finds the most recent code row matching (owner, exact code value)
    pub async fn find_by_owner_and_code(
        pool: &PgPool,
        scope: CodeScope,
        owner_id: Uuid,
        code: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let query = format!(
            r#"
            SELECT id, {owner} AS owner_id, code, expires_at, used_at, created_at
            FROM {table}
            WHERE {owner} = $1 AND code = $2
            ORDER BY created_at DESC
            LIMIT 1
            "#,
            table = scope.table(),
            owner = scope.owner_column(),
        );

        let row = sqlx::query_as::<_, VerificationCode>(&query)
            .bind(owner_id)
            .bind(code)
            .fetch_optional(pool)
            .await?;

        Ok(row)
    }

    /// Marks a code as used, inside the caller's redemption transaction
    ///
    /// The `used_at IS NULL` guard makes redemption single-use even under
    /// concurrent attempts: only one transaction observes an affected row.
    pub async fn mark_used(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        scope: CodeScope,
        id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let query = format!(
            r#"
            UPDATE {table}
            SET used_at = NOW()
            WHERE id = $1 AND used_at IS NULL
            "#,
            table = scope.table(),
        );

        let result = sqlx::query(&query).bind(id).execute(&mut **tx).await?;

        Ok(result.rows_affected() > 0)
    }
}
