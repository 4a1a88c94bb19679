//! PostgreSQL Repository Implementations

use chrono::{DateTime, Utc};
use kernel::id::IdentityId;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::identity::{Identity, MediaSnapshot, ProfileUpdate};
use crate::domain::repository::{DocumentStore, IdentityRepository};
use crate::domain::value_object::{DisplayName, Email};
use crate::error::{AccountError, AccountResult};

/// PostgreSQL-backed identity repository
///
/// Also answers the Auth Gate's identity existence check.
#[derive(Clone)]
pub struct PgIdentityRepository {
    pool: PgPool,
}

impl PgIdentityRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const IDENTITY_COLUMNS: &str = r#"
    identity_id,
    email,
    display_name,
    bio,
    picture_url,
    payment_customer_id,
    created_at,
    updated_at
"#;

impl IdentityRepository for PgIdentityRepository {
    async fn find(&self, identity_id: &IdentityId) -> AccountResult<Option<Identity>> {
        let row = sqlx::query_as::<_, IdentityRow>(&format!(
            "SELECT {IDENTITY_COLUMNS} FROM identities WHERE identity_id = $1"
        ))
        .bind(identity_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(IdentityRow::into_identity))
    }

    async fn snapshot_media(&self, identity_id: &IdentityId) -> AccountResult<MediaSnapshot> {
        // Profile picture first, then authored content oldest first
        let urls = sqlx::query_scalar::<_, String>(
            r#"
            SELECT url FROM (
                SELECT picture_url AS url, 0 AS source, created_at
                FROM identities
                WHERE identity_id = $1 AND picture_url IS NOT NULL
                UNION ALL
                SELECT picture_url AS url, 1 AS source, created_at
                FROM posts
                WHERE author_id = $1 AND picture_url IS NOT NULL
            ) refs
            ORDER BY source, created_at
            "#,
        )
        .bind(identity_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        Ok(MediaSnapshot::new(urls))
    }

    async fn delete(&self, identity_id: &IdentityId) -> AccountResult<bool> {
        // Authored content goes with the row (ON DELETE CASCADE)
        let deleted = sqlx::query("DELETE FROM identities WHERE identity_id = $1")
            .bind(identity_id.as_uuid())
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(deleted > 0)
    }

    async fn update_profile(
        &self,
        identity_id: &IdentityId,
        update: &ProfileUpdate,
    ) -> AccountResult<Option<Identity>> {
        let row = sqlx::query_as::<_, IdentityRow>(&format!(
            r#"
            UPDATE identities SET
                display_name = COALESCE($2, display_name),
                bio = CASE WHEN $3::text IS NULL THEN bio ELSE NULLIF($3, '') END,
                updated_at = NOW()
            WHERE identity_id = $1
            RETURNING {IDENTITY_COLUMNS}
            "#
        ))
        .bind(identity_id.as_uuid())
        .bind(update.display_name.as_ref().map(DisplayName::as_str))
        .bind(update.bio.as_deref())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(IdentityRow::into_identity))
    }

    async fn set_picture(
        &self,
        identity_id: &IdentityId,
        url: &str,
    ) -> AccountResult<Option<Option<String>>> {
        // Row lock so two concurrent uploads each see the right predecessor
        let mut tx = self.pool.begin().await?;

        let previous = sqlx::query_scalar::<_, Option<String>>(
            "SELECT picture_url FROM identities WHERE identity_id = $1 FOR UPDATE",
        )
        .bind(identity_id.as_uuid())
        .fetch_optional(&mut *tx)
        .await?;

        let Some(previous) = previous else {
            return Ok(None);
        };

        sqlx::query(
            "UPDATE identities SET picture_url = $2, updated_at = NOW() WHERE identity_id = $1",
        )
        .bind(identity_id.as_uuid())
        .bind(url)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(Some(previous))
    }

    async fn set_payment_customer(
        &self,
        identity_id: &IdentityId,
        customer_id: &str,
    ) -> AccountResult<()> {
        let updated = sqlx::query(
            r#"
            UPDATE identities
            SET payment_customer_id = $2, updated_at = NOW()
            WHERE identity_id = $1
            "#,
        )
        .bind(identity_id.as_uuid())
        .bind(customer_id)
        .execute(&self.pool)
        .await?
        .rows_affected();

        if updated == 0 {
            return Err(AccountError::NotFound);
        }
        Ok(())
    }
}

impl auth::IdentityDirectory for PgIdentityRepository {
    async fn identity_exists(&self, identity_id: &IdentityId) -> auth::AuthResult<bool> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM identities WHERE identity_id = $1)",
        )
        .bind(identity_id.as_uuid())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match AccountError::from(e) {
            AccountError::UpstreamUnavailable { detail, .. } => {
                auth::AuthError::StoreUnavailable(detail)
            }
            other => auth::AuthError::Internal(other.to_string()),
        })
    }
}

// ============================================================================
// Derived document store
// ============================================================================

/// PostgreSQL-backed document store (JSONB documents keyed by identity)
///
/// Lives in its own database; only the bulk delete is needed here.
#[derive(Clone)]
pub struct PgDocumentStore {
    pool: PgPool,
}

impl PgDocumentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl DocumentStore for PgDocumentStore {
    async fn delete_all_for_identity(&self, identity_id: &IdentityId) -> AccountResult<u64> {
        let deleted = sqlx::query("DELETE FROM derived_documents WHERE identity_id = $1")
            .bind(identity_id.as_uuid())
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(deleted)
    }
}

// ============================================================================
// Row Types
// ============================================================================

#[derive(sqlx::FromRow)]
struct IdentityRow {
    identity_id: Uuid,
    email: String,
    display_name: String,
    bio: Option<String>,
    picture_url: Option<String>,
    payment_customer_id: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl IdentityRow {
    fn into_identity(self) -> Identity {
        Identity {
            identity_id: IdentityId::from_uuid(self.identity_id),
            email: Email::from_db(self.email),
            display_name: DisplayName::from_db(self.display_name),
            bio: self.bio,
            picture_url: self.picture_url,
            payment_customer_id: self.payment_customer_id,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}
