//! PostgreSQL implementation of the identity repository, including the
//! transactional guest reconciliation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::json;
use sqlx::PgPool;
use std::sync::Arc;
use tracing::info;

use crate::domain::entities::{Identity, IdentityKind, NewIdentity, StoredCredentials};
use crate::domain::reconciliation::{self, ReconcileAction, ReconciliationSummary};
use crate::domain::repositories::IdentityRepository;
use crate::error::AppError;
use crate::utils::slug::generate_slug;

#[derive(sqlx::FromRow)]
struct IdentityRow {
    id: i64,
    username: String,
    email: Option<String>,
    kind: String,
    is_active: bool,
    created_at: DateTime<Utc>,
}

impl From<IdentityRow> for Identity {
    fn from(r: IdentityRow) -> Self {
        Identity {
            id: r.id,
            username: r.username,
            email: r.email,
            kind: IdentityKind::from_tag(&r.kind),
            is_active: r.is_active,
            created_at: r.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct LinkUrlRow {
    id: i64,
    original_url: String,
}

const IDENTITY_COLUMNS: &str = "id, username, email, kind, is_active, created_at";

/// PostgreSQL repository for identities and profiles.
pub struct PgIdentityRepository {
    pool: Arc<PgPool>,
}

impl PgIdentityRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl IdentityRepository for PgIdentityRepository {
    async fn create_guest(&self) -> Result<Identity, AppError> {
        let username = format!("guest_{}", generate_slug(10).to_lowercase());

        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, IdentityRow>(&format!(
            r#"
            INSERT INTO identities (username, kind)
            VALUES ($1, 'guest')
            RETURNING {IDENTITY_COLUMNS}
            "#
        ))
        .bind(&username)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("INSERT INTO profiles (identity_id) VALUES ($1)")
            .bind(row.id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(row.into())
    }

    async fn create_registered(&self, new_identity: NewIdentity) -> Result<Identity, AppError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, IdentityRow>(&format!(
            r#"
            INSERT INTO identities (username, email, kind, password_hash)
            VALUES ($1, $2, 'free', $3)
            RETURNING {IDENTITY_COLUMNS}
            "#
        ))
        .bind(&new_identity.username)
        .bind(&new_identity.email)
        .bind(&new_identity.password_hash)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| match AppError::from(e) {
            AppError::Conflict { .. } => AppError::conflict(
                "Username or email already registered",
                json!({ "username": new_identity.username, "email": new_identity.email }),
            ),
            other => other,
        })?;

        sqlx::query("INSERT INTO profiles (identity_id) VALUES ($1)")
            .bind(row.id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(row.into())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Identity>, AppError> {
        let row = sqlx::query_as::<_, IdentityRow>(&format!(
            "SELECT {IDENTITY_COLUMNS} FROM identities WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(Into::into))
    }

    async fn find_credentials(&self, email: &str) -> Result<Option<StoredCredentials>, AppError> {
        #[derive(sqlx::FromRow)]
        struct CredentialsRow {
            id: i64,
            username: String,
            email: Option<String>,
            kind: String,
            is_active: bool,
            created_at: DateTime<Utc>,
            password_hash: Option<String>,
        }

        let row = sqlx::query_as::<_, CredentialsRow>(
            r#"
            SELECT id, username, email, kind, is_active, created_at, password_hash
            FROM identities WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(|r| StoredCredentials {
            identity: Identity {
                id: r.id,
                username: r.username,
                email: r.email,
                kind: IdentityKind::from_tag(&r.kind),
                is_active: r.is_active,
                created_at: r.created_at,
            },
            password_hash: r.password_hash,
        }))
    }

    async fn adopt_guest(
        &self,
        guest_id: i64,
        target_id: i64,
    ) -> Result<ReconciliationSummary, AppError> {
        let mut tx = self.pool.begin().await?;

        // Lock both owners' link rows for the duration of the migration so a
        // concurrent login with the same guest credential cannot interleave.
        let guest_links = sqlx::query_as::<_, LinkUrlRow>(
            "SELECT id, original_url FROM links WHERE owner_id = $1 ORDER BY id FOR UPDATE",
        )
        .bind(guest_id)
        .fetch_all(&mut *tx)
        .await?;

        let target_links = sqlx::query_as::<_, LinkUrlRow>(
            "SELECT id, original_url FROM links WHERE owner_id = $1 ORDER BY id FOR UPDATE",
        )
        .bind(target_id)
        .fetch_all(&mut *tx)
        .await?;

        let plan = reconciliation::plan(
            &rows_as_links(guest_links, guest_id),
            &rows_as_links(target_links, target_id),
        );

        let mut summary = ReconciliationSummary::default();

        for action in plan {
            match action {
                ReconcileAction::Merge {
                    from_link_id,
                    into_link_id,
                } => {
                    let rewritten = sqlx::query(
                        "UPDATE clicks SET link_id = $2, owner_id = $3 WHERE link_id = $1",
                    )
                    .bind(from_link_id)
                    .bind(into_link_id)
                    .bind(target_id)
                    .execute(&mut *tx)
                    .await?
                    .rows_affected();

                    sqlx::query("DELETE FROM links WHERE id = $1")
                        .bind(from_link_id)
                        .execute(&mut *tx)
                        .await?;

                    summary.links_merged += 1;
                    summary.clicks_rewritten += rewritten;
                }
                ReconcileAction::Transfer { link_id } => {
                    sqlx::query("UPDATE links SET owner_id = $2 WHERE id = $1")
                        .bind(link_id)
                        .bind(target_id)
                        .execute(&mut *tx)
                        .await?;

                    let rewritten =
                        sqlx::query("UPDATE clicks SET owner_id = $2 WHERE link_id = $1")
                            .bind(link_id)
                            .bind(target_id)
                            .execute(&mut *tx)
                            .await?
                            .rows_affected();

                    summary.links_transferred += 1;
                    summary.clicks_rewritten += rewritten;
                }
            }
        }

        // Profile rows cascade with the identity.
        let deleted = sqlx::query("DELETE FROM identities WHERE id = $1 AND kind = 'guest'")
            .bind(guest_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        if deleted == 0 {
            // Guest vanished mid-flight (e.g. a concurrent reconciliation won);
            // dropping the transaction rolls back everything above.
            return Err(AppError::conflict(
                "Guest identity no longer exists",
                json!({ "guest_id": guest_id }),
            ));
        }

        tx.commit().await?;

        info!(
            guest_id,
            target_id,
            transferred = summary.links_transferred,
            merged = summary.links_merged,
            clicks = summary.clicks_rewritten,
            "guest identity reconciled"
        );

        Ok(summary)
    }
}

/// Adapts the minimal locked rows into domain links for the planner. Only id
/// and destination matter for planning.
fn rows_as_links(rows: Vec<LinkUrlRow>, owner_id: i64) -> Vec<crate::domain::entities::Link> {
    rows.into_iter()
        .map(|r| crate::domain::entities::Link {
            id: r.id,
            owner_id: Some(owner_id),
            original_url: r.original_url,
            slug: String::new(),
            customized: false,
            is_active: true,
            expires_at: None,
            created_at: Utc::now(),
        })
        .collect()
}
