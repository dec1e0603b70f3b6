//! PostgreSQL connection and alert queries

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::{Postgres, QueryBuilder};
use tracing::debug;
use uuid::Uuid;

use super::AlertStore;
use crate::config::DatabaseConfig;
use crate::error::{Error, Result};
use crate::models::{Alert, AlertFilter, AlertStatus, NewAlert, PageRequest};

/// PostgreSQL connection pool
#[derive(Clone)]
pub struct PostgresPool {
    pool: PgPool,
}

impl PostgresPool {
    /// Create a new PostgreSQL connection pool
    pub async fn new(config: &DatabaseConfig) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .connect(&config.url)
            .await?;

        Ok(Self { pool })
    }

    /// Run migrations
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("../../migrations").run(&self.pool).await?;
        Ok(())
    }

    /// Health check
    pub async fn health_check(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    /// Get the underlying pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Alert store backed by the `alerts` table
#[derive(Clone)]
pub struct PostgresAlertStore {
    pool: PgPool,
}

const ALERT_COLUMNS: &str = "id, country, city, visa_type, status, created_at, updated_at";

impl PostgresAlertStore {
    /// Create a new alert store
    pub fn new(pool: &PostgresPool) -> Self {
        Self {
            pool: pool.pool.clone(),
        }
    }

    fn push_filter(builder: &mut QueryBuilder<'_, Postgres>, filter: &AlertFilter) {
        builder.push(" WHERE 1=1");

        if let Some(country) = &filter.country {
            builder
                .push(" AND country ILIKE ")
                .push_bind(format!("%{}%", escape_like(country)))
                .push(" ESCAPE '\\'");
        }

        if let Some(status) = filter.status {
            builder.push(" AND status = ").push_bind(status.as_str());
        }
    }

    /// One page of matching alerts, newest first
    fn find_query(filter: &AlertFilter, page: PageRequest) -> QueryBuilder<'static, Postgres> {
        let mut builder = QueryBuilder::new(format!("SELECT {ALERT_COLUMNS} FROM alerts"));
        Self::push_filter(&mut builder, filter);
        builder
            .push(" ORDER BY created_at DESC, id DESC LIMIT ")
            .push_bind(i64::from(page.limit))
            .push(" OFFSET ")
            .push_bind(i64::try_from(page.offset()).unwrap_or(i64::MAX));
        builder
    }

    fn count_query(filter: &AlertFilter) -> QueryBuilder<'static, Postgres> {
        let mut builder = QueryBuilder::new("SELECT COUNT(*) FROM alerts");
        Self::push_filter(&mut builder, filter);
        builder
    }
}

/// Escape LIKE wildcards so user input is matched literally
fn escape_like(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

#[async_trait]
impl AlertStore for PostgresAlertStore {
    async fn insert(&self, alert: NewAlert) -> Result<Alert> {
        let alert = alert.into_alert(Utc::now());

        sqlx::query(
            r#"
            INSERT INTO alerts (id, country, city, visa_type, status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(alert.id)
        .bind(&alert.country)
        .bind(&alert.city)
        .bind(alert.visa_type.as_str())
        .bind(alert.status.as_str())
        .bind(alert.created_at)
        .bind(alert.updated_at)
        .execute(&self.pool)
        .await?;

        debug!(id = %alert.id, "inserted alert");
        Ok(alert)
    }

    async fn find(&self, filter: &AlertFilter, page: PageRequest) -> Result<Vec<Alert>> {
        let mut builder = Self::find_query(filter, page);
        let rows = builder
            .build_query_as::<AlertRow>()
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(Alert::try_from).collect()
    }

    async fn count(&self, filter: &AlertFilter) -> Result<u64> {
        let mut builder = Self::count_query(filter);
        let total = builder
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await?;

        Ok(u64::try_from(total).unwrap_or_default())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Alert>> {
        let row = sqlx::query_as::<_, AlertRow>(&format!(
            "SELECT {ALERT_COLUMNS} FROM alerts WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Alert::try_from).transpose()
    }

    async fn update_status(&self, id: Uuid, status: AlertStatus) -> Result<Option<Alert>> {
        let row = sqlx::query_as::<_, AlertRow>(&format!(
            r#"
            UPDATE alerts SET status = $2, updated_at = $3
            WHERE id = $1
            RETURNING {ALERT_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(status.as_str())
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Alert::try_from).transpose()
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM alerts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn health_check(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

// Database row type for mapping

#[derive(sqlx::FromRow)]
struct AlertRow {
    id: Uuid,
    country: String,
    city: String,
    visa_type: String,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<AlertRow> for Alert {
    type Error = Error;

    fn try_from(row: AlertRow) -> Result<Self> {
        let corrupt = |e: crate::models::UnknownVariant| {
            Error::internal(format!("alert {} has {e}", row.id))
        };

        Ok(Alert {
            id: row.id,
            visa_type: row.visa_type.parse().map_err(corrupt)?,
            status: row.status.parse().map_err(corrupt)?,
            country: row.country,
            city: row.city,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}
