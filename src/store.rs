//! Persistence boundary. The core only ever talks to [`DataStore`];
//! [`PgStore`] is the Postgres implementation behind it.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use thiserror::Error;

use crate::models::{
    HealthRisk, Report, ReportStatus, ReportType, User, UserPreferences, VitalKind, VitalSign,
};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[async_trait]
pub trait DataStore: Send + Sync {
    async fn get_user(&self, id: &str) -> Result<Option<User>, StoreError>;
    async fn get_all_users(&self) -> Result<Vec<User>, StoreError>;
    async fn get_vital_signs(
        &self,
        user_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<VitalSign>, StoreError>;
    async fn get_health_risks(
        &self,
        user_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<HealthRisk>, StoreError>;
    async fn save_report(&self, report: &Report) -> Result<(), StoreError>;
    async fn update_report(&self, report: &Report) -> Result<(), StoreError>;
    async fn get_report(&self, id: &str) -> Result<Option<Report>, StoreError>;
    async fn get_user_reports(
        &self,
        user_id: &str,
        kind: Option<ReportType>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Report>, StoreError>;
}

pub async fn init_db(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn row_to_user(row: &PgRow) -> Result<User, sqlx::Error> {
    Ok(User {
        id: row.try_get("id")?,
        email: row.try_get("email")?,
        first_name: row.try_get("first_name")?,
        last_name: row.try_get("last_name")?,
        preferences: UserPreferences {
            weekly_report: row.try_get("weekly_report")?,
            monthly_report: row.try_get("monthly_report")?,
            quarterly_report: row.try_get("quarterly_report")?,
            alert_emails: row.try_get("alert_emails")?,
            recommendation_emails: row.try_get("recommendation_emails")?,
            reminder_emails: row.try_get("reminder_emails")?,
        },
    })
}

fn row_to_report(row: &PgRow) -> Result<Report, sqlx::Error> {
    let kind: String = row.try_get("kind")?;
    let status: String = row.try_get("status")?;
    Ok(Report {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        title: row.try_get("title")?,
        date: row.try_get("report_date")?,
        // Unrecognized stored kinds fall back to weekly.
        kind: ReportType::from_str(&kind).unwrap_or(ReportType::Weekly),
        status: ReportStatus::from_str(&status).unwrap_or(ReportStatus::Scheduled),
        highlights: row.try_get("highlights")?,
        recommendations: row.try_get("recommendations")?,
        html_content: row.try_get("html_content")?,
        document_path: row.try_get("document_path")?,
    })
}

const USER_COLUMNS: &str = "id, email, first_name, last_name, weekly_report, monthly_report, \
     quarterly_report, alert_emails, recommendation_emails, reminder_emails";

const REPORT_COLUMNS: &str = "id, user_id, title, report_date, kind, status, highlights, \
     recommendations, html_content, document_path";

#[async_trait]
impl DataStore for PgStore {
    async fn get_user(&self, id: &str) -> Result<Option<User>, StoreError> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(row_to_user).transpose()?)
    }

    async fn get_all_users(&self) -> Result<Vec<User>, StoreError> {
        let rows = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users ORDER BY id"))
            .fetch_all(&self.pool)
            .await?;
        rows.iter()
            .map(|row| row_to_user(row).map_err(StoreError::from))
            .collect()
    }

    async fn get_vital_signs(
        &self,
        user_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<VitalSign>, StoreError> {
        let rows = sqlx::query(
            "SELECT user_id, kind, value, secondary_value, recorded_at, source \
             FROM vital_signs \
             WHERE user_id = $1 AND recorded_at >= $2 AND recorded_at < $3 \
             ORDER BY recorded_at ASC",
        )
        .bind(user_id)
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        let mut readings = Vec::with_capacity(rows.len());
        for row in &rows {
            let raw_kind: String = row.try_get("kind")?;
            // Rows with kinds the pipeline does not model are skipped.
            let Some(kind) = VitalKind::from_str(&raw_kind) else {
                continue;
            };
            readings.push(VitalSign {
                user_id: row.try_get("user_id")?,
                kind,
                value: row.try_get("value")?,
                secondary: row.try_get("secondary_value")?,
                recorded_at: row.try_get("recorded_at")?,
                source: row.try_get("source")?,
            });
        }
        Ok(readings)
    }

    async fn get_health_risks(
        &self,
        user_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<HealthRisk>, StoreError> {
        let rows = sqlx::query(
            "SELECT user_id, risk_type, risk_score, confidence, recorded_at \
             FROM health_risks \
             WHERE user_id = $1 AND recorded_at >= $2 AND recorded_at < $3 \
             ORDER BY recorded_at ASC",
        )
        .bind(user_id)
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        let mut risks = Vec::with_capacity(rows.len());
        for row in &rows {
            risks.push(HealthRisk {
                user_id: row.try_get("user_id")?,
                risk_type: row.try_get("risk_type")?,
                risk_score: row.try_get("risk_score")?,
                confidence: row.try_get("confidence")?,
                recorded_at: row.try_get("recorded_at")?,
            });
        }
        Ok(risks)
    }

    async fn save_report(&self, report: &Report) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO reports \
             (id, user_id, title, report_date, kind, status, highlights, recommendations, \
              html_content, document_path) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
             ON CONFLICT (id) DO NOTHING",
        )
        .bind(&report.id)
        .bind(&report.user_id)
        .bind(&report.title)
        .bind(report.date)
        .bind(report.kind.as_str())
        .bind(report.status.as_str())
        .bind(&report.highlights)
        .bind(&report.recommendations)
        .bind(&report.html_content)
        .bind(&report.document_path)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update_report(&self, report: &Report) -> Result<(), StoreError> {
        sqlx::query(
            "UPDATE reports SET \
             title = $2, report_date = $3, kind = $4, status = $5, highlights = $6, \
             recommendations = $7, html_content = $8, document_path = $9 \
             WHERE id = $1",
        )
        .bind(&report.id)
        .bind(&report.title)
        .bind(report.date)
        .bind(report.kind.as_str())
        .bind(report.status.as_str())
        .bind(&report.highlights)
        .bind(&report.recommendations)
        .bind(&report.html_content)
        .bind(&report.document_path)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_report(&self, id: &str) -> Result<Option<Report>, StoreError> {
        let row = sqlx::query(&format!("SELECT {REPORT_COLUMNS} FROM reports WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(row_to_report).transpose()?)
    }

    async fn get_user_reports(
        &self,
        user_id: &str,
        kind: Option<ReportType>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Report>, StoreError> {
        let rows = sqlx::query(&format!(
            "SELECT {REPORT_COLUMNS} FROM reports \
             WHERE user_id = $1 AND ($2::text IS NULL OR kind = $2) \
             ORDER BY report_date DESC \
             LIMIT $3 OFFSET $4"
        ))
        .bind(user_id)
        .bind(kind.map(|k| k.as_str()))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;
        rows.iter()
            .map(|row| row_to_report(row).map_err(StoreError::from))
            .collect()
    }
}
