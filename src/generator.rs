//! Report lifecycle: snapshot assembly, content synthesis, export,
//! persistence and notification. Each generation runs as an isolated
//! unit of work keyed by report id; the scheduled -> generated
//! transition is committed only after rendering and export succeed.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{Duration, Utc};
use tokio::task::JoinHandle;

use crate::email::Notifier;
use crate::error::ReportError;
use crate::export::DocumentExporter;
use crate::models::{
    HealthRisk, PeriodSnapshot, Report, ReportStatus, ReportType, VitalKind, VitalSign,
    VitalSignSeries,
};
use crate::narrative;
use crate::render;
use crate::store::DataStore;
use crate::trends;

/// Assigned when a period has no risk rows to derive a score from.
const DEFAULT_HEALTH_SCORE: i32 = 70;

pub struct ReportService {
    store: Arc<dyn DataStore>,
    exporter: Arc<dyn DocumentExporter>,
    notifier: Arc<Notifier>,
}

impl ReportService {
    pub fn new(
        store: Arc<dyn DataStore>,
        exporter: Arc<dyn DocumentExporter>,
        notifier: Arc<Notifier>,
    ) -> Self {
        Self {
            store,
            exporter,
            notifier,
        }
    }

    /// Aggregates the user's data for the window implied by the report
    /// kind, with the preceding window of equal length supplying the
    /// previous health score.
    pub async fn snapshot_for(
        &self,
        user_id: &str,
        kind: ReportType,
    ) -> Result<PeriodSnapshot, ReportError> {
        let end = Utc::now();
        let start = end - Duration::days(kind.period_days());
        let previous_start = start - Duration::days(kind.period_days());

        let readings = self.store.get_vital_signs(user_id, start, end).await?;
        let risks = self.store.get_health_risks(user_id, start, end).await?;
        let previous_risks = self
            .store
            .get_health_risks(user_id, previous_start, start)
            .await?;

        Ok(build_snapshot(start, end, &readings, &risks, &previous_risks))
    }

    /// Generates the report's content and commits the single
    /// scheduled -> generated transition. On any failure the stored
    /// report is left untouched in `scheduled` status.
    pub async fn generate(&self, report_id: &str) -> Result<Report, ReportError> {
        let report = self
            .store
            .get_report(report_id)
            .await?
            .ok_or_else(|| ReportError::NotFound(format!("report {report_id}")))?;
        let user = self
            .store
            .get_user(&report.user_id)
            .await?
            .ok_or_else(|| ReportError::NotFound(format!("user {}", report.user_id)))?;

        let snapshot = self.snapshot_for(&user.id, report.kind).await?;
        let highlights = narrative::compose_highlights(&snapshot);
        let recommendations = narrative::compose_recommendations(&snapshot);
        let html = render::render(report.kind, report.date, &snapshot, &highlights, &recommendations);

        let document_path = self
            .exporter
            .export(&report.id, &html)
            .await
            .map_err(|e| ReportError::Generation(e.to_string()))?;

        let mut generated = report;
        generated.status = ReportStatus::Generated;
        generated.highlights = Some(highlights);
        generated.recommendations = Some(recommendations);
        generated.html_content = Some(html);
        generated.document_path = Some(document_path);
        self.store.update_report(&generated).await?;
        tracing::info!("✅ generated report {}", generated.id);

        // Delivery failure never rolls back a generated report.
        if user.preferences.allows_report(generated.kind) {
            if let Err(err) = self.notifier.send_report_email(&user, &generated).await {
                tracing::error!("❌ report email for {} failed: {err}", generated.id);
            }
        }

        Ok(generated)
    }

    /// Hands a generation off to the runtime as an independent task.
    /// The handle lets callers observe completion; failures are logged.
    pub fn enqueue_generate(self: &Arc<Self>, report_id: String) -> JoinHandle<()> {
        let service = Arc::clone(self);
        tokio::spawn(async move {
            if let Err(err) = service.generate(&report_id).await {
                tracing::error!("❌ background generation of {report_id} failed: {err}");
            }
        })
    }

    /// Persists a freshly scheduled report and enqueues its generation.
    pub async fn enqueue(self: &Arc<Self>, report: &Report) -> Result<JoinHandle<()>, ReportError> {
        self.store.save_report(report).await?;
        Ok(self.enqueue_generate(report.id.clone()))
    }

    /// Validates the requested kind, creates a scheduled report and
    /// generates it in place, returning the finished report.
    pub async fn generate_on_demand(
        &self,
        user_id: &str,
        raw_kind: &str,
    ) -> Result<Report, ReportError> {
        let kind = ReportType::from_str(raw_kind)
            .ok_or_else(|| ReportError::Validation(raw_kind.to_string()))?;

        let now = Utc::now();
        let id = format!(
            "report-{}-{}-{}",
            kind.as_str(),
            user_id,
            now.to_rfc3339()
        );
        let report = Report::scheduled(
            id,
            user_id,
            &format!("{} Health Report", kind.display_name()),
            now,
            kind,
        );
        self.store.save_report(&report).await?;

        self.generate(&report.id).await
    }
}

fn build_snapshot(
    start: chrono::DateTime<Utc>,
    end: chrono::DateTime<Utc>,
    readings: &[VitalSign],
    risks: &[HealthRisk],
    previous_risks: &[HealthRisk],
) -> PeriodSnapshot {
    let mut vitals = BTreeMap::new();
    for kind in VitalKind::ALL {
        vitals.insert(kind, VitalSignSeries::from_readings(kind, readings, start, end));
    }

    let trends = vitals
        .iter()
        .map(|(kind, series)| (*kind, trends::classify(series)))
        .collect();

    let risk_scores = average_risks(risks);
    let previous_scores = average_risks(previous_risks);

    PeriodSnapshot {
        health_score: health_score_from(&risk_scores),
        previous_health_score: health_score_from(&previous_scores),
        vitals,
        risks: risk_scores,
        trends,
    }
}

fn average_risks(rows: &[HealthRisk]) -> BTreeMap<String, f64> {
    let mut sums: BTreeMap<String, (f64, usize)> = BTreeMap::new();
    for risk in rows {
        let entry = sums.entry(risk.risk_type.clone()).or_insert((0.0, 0));
        entry.0 += risk.risk_score;
        entry.1 += 1;
    }
    sums.into_iter()
        .map(|(risk_type, (total, count))| (risk_type, total / count as f64))
        .collect()
}

/// Score heuristic: 100 minus the mean risk percentage, clamped to
/// 0..=100. Periods without risk data score at the neutral baseline.
fn health_score_from(risks: &BTreeMap<String, f64>) -> i32 {
    if risks.is_empty() {
        return DEFAULT_HEALTH_SCORE;
    }
    let mean = risks.values().sum::<f64>() / risks.len() as f64;
    (100.0 - mean * 100.0).round().clamp(0.0, 100.0) as i32
}
