//! PostgreSQL implementation of the click repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::{Click, ClickDimensions, DimensionIds, NewClick};
use crate::domain::repositories::{ClickRepository, LinkAnalytics};
use crate::error::AppError;

#[derive(sqlx::FromRow)]
struct ClickRow {
    id: i64,
    link_id: i64,
    owner_id: Option<i64>,
    clicked_at: DateTime<Utc>,
    ip: String,
    redirected: bool,
}

impl From<ClickRow> for Click {
    fn from(r: ClickRow) -> Self {
        Click {
            id: r.id,
            link_id: r.link_id,
            owner_id: r.owner_id,
            clicked_at: r.clicked_at,
            ip: r.ip,
            redirected: r.redirected,
        }
    }
}

/// PostgreSQL repository for click tracking and analytics dimensions.
pub struct PgClickRepository {
    pool: Arc<PgPool>,
}

impl PgClickRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    /// Atomic get-or-create-then-increment for one dimension table.
    ///
    /// The `ON CONFLICT .. DO UPDATE` form makes the whole observation a single
    /// statement, so concurrent identical observations cannot race a
    /// read-modify-write pair or create duplicate rows.
    async fn observe(&self, table: DimensionTable, name: &str) -> Result<i64, AppError> {
        let sql = match table {
            DimensionTable::Countries => {
                r#"
                INSERT INTO countries (name, click_count) VALUES ($1, 1)
                ON CONFLICT (name) DO UPDATE SET click_count = countries.click_count + 1
                RETURNING id
                "#
            }
            DimensionTable::Browsers => {
                r#"
                INSERT INTO browsers (name, click_count) VALUES ($1, 1)
                ON CONFLICT (name) DO UPDATE SET click_count = browsers.click_count + 1
                RETURNING id
                "#
            }
            DimensionTable::Platforms => {
                r#"
                INSERT INTO platforms (name, click_count) VALUES ($1, 1)
                ON CONFLICT (name) DO UPDATE SET click_count = platforms.click_count + 1
                RETURNING id
                "#
            }
            DimensionTable::Devices => {
                r#"
                INSERT INTO devices (name, click_count) VALUES ($1, 1)
                ON CONFLICT (name) DO UPDATE SET click_count = devices.click_count + 1
                RETURNING id
                "#
            }
        };

        let id: i64 = sqlx::query_scalar(sql)
            .bind(name)
            .fetch_one(self.pool.as_ref())
            .await?;

        Ok(id)
    }

    async fn distinct_names(&self, table: DimensionTable, link_id: i64) -> Result<Vec<String>, AppError> {
        let sql = match table {
            DimensionTable::Countries => {
                r#"
                SELECT DISTINCT d.name FROM clicks c
                JOIN countries d ON d.id = c.country_id
                WHERE c.link_id = $1 ORDER BY d.name
                "#
            }
            DimensionTable::Browsers => {
                r#"
                SELECT DISTINCT d.name FROM clicks c
                JOIN browsers d ON d.id = c.browser_id
                WHERE c.link_id = $1 ORDER BY d.name
                "#
            }
            DimensionTable::Platforms => {
                r#"
                SELECT DISTINCT d.name FROM clicks c
                JOIN platforms d ON d.id = c.platform_id
                WHERE c.link_id = $1 ORDER BY d.name
                "#
            }
            DimensionTable::Devices => {
                r#"
                SELECT DISTINCT d.name FROM clicks c
                JOIN devices d ON d.id = c.device_id
                WHERE c.link_id = $1 ORDER BY d.name
                "#
            }
        };

        let names: Vec<String> = sqlx::query_scalar(sql)
            .bind(link_id)
            .fetch_all(self.pool.as_ref())
            .await?;

        Ok(names)
    }
}

#[derive(Clone, Copy)]
enum DimensionTable {
    Countries,
    Browsers,
    Platforms,
    Devices,
}

#[async_trait]
impl ClickRepository for PgClickRepository {
    async fn observe_dimensions(
        &self,
        dimensions: &ClickDimensions,
    ) -> Result<DimensionIds, AppError> {
        Ok(DimensionIds {
            country_id: self
                .observe(DimensionTable::Countries, &dimensions.country)
                .await?,
            browser_id: self
                .observe(DimensionTable::Browsers, &dimensions.browser)
                .await?,
            platform_id: self
                .observe(DimensionTable::Platforms, &dimensions.platform)
                .await?,
            device_id: self
                .observe(DimensionTable::Devices, &dimensions.device)
                .await?,
        })
    }

    async fn insert(&self, new_click: NewClick) -> Result<Click, AppError> {
        let row = sqlx::query_as::<_, ClickRow>(
            r#"
            INSERT INTO clicks (link_id, owner_id, ip, country_id, browser_id, platform_id, device_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, link_id, owner_id, clicked_at, ip, redirected
            "#,
        )
        .bind(new_click.link_id)
        .bind(new_click.owner_id)
        .bind(&new_click.ip)
        .bind(new_click.dimensions.country_id)
        .bind(new_click.dimensions.browser_id)
        .bind(new_click.dimensions.platform_id)
        .bind(new_click.dimensions.device_id)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(row.into())
    }

    async fn mark_redirected(&self, click_id: i64) -> Result<(), AppError> {
        sqlx::query("UPDATE clicks SET redirected = TRUE WHERE id = $1")
            .bind(click_id)
            .execute(self.pool.as_ref())
            .await?;

        Ok(())
    }

    async fn summarize(&self, link_id: i64) -> Result<LinkAnalytics, AppError> {
        let (total_clicks, successful_redirects): (i64, i64) = sqlx::query_as(
            r#"
            SELECT COUNT(*), COUNT(*) FILTER (WHERE redirected)
            FROM clicks WHERE link_id = $1
            "#,
        )
        .bind(link_id)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(LinkAnalytics {
            total_clicks,
            successful_redirects,
            failed_redirects: total_clicks - successful_redirects,
            countries: self.distinct_names(DimensionTable::Countries, link_id).await?,
            browsers: self.distinct_names(DimensionTable::Browsers, link_id).await?,
            platforms: self.distinct_names(DimensionTable::Platforms, link_id).await?,
            devices: self.distinct_names(DimensionTable::Devices, link_id).await?,
        })
    }
}
