use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Vital-sign kinds covered by report synthesis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VitalKind {
    HeartRate,
    BloodPressure,
    RespiratoryRate,
    Stress,
}

impl VitalKind {
    pub const ALL: [VitalKind; 4] = [
        VitalKind::HeartRate,
        VitalKind::BloodPressure,
        VitalKind::RespiratoryRate,
        VitalKind::Stress,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            VitalKind::HeartRate => "heart_rate",
            VitalKind::BloodPressure => "blood_pressure",
            VitalKind::RespiratoryRate => "respiratory_rate",
            VitalKind::Stress => "stress",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "heart_rate" | "hr" | "pulse" => Some(VitalKind::HeartRate),
            "blood_pressure" | "bp" => Some(VitalKind::BloodPressure),
            "respiratory_rate" | "rr" => Some(VitalKind::RespiratoryRate),
            "stress" => Some(VitalKind::Stress),
            _ => None,
        }
    }
}

/// Qualitative classification of a vital sign's recent trajectory.
///
/// Heart rate uses {stable, improving, concerning}, blood pressure
/// {normal, slightly_elevated, elevated}, respiratory rate {normal} and
/// stress {improving, elevated}. Anything unclassifiable is `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendLabel {
    Stable,
    Improving,
    Concerning,
    Normal,
    SlightlyElevated,
    Elevated,
    Unknown,
}

/// A single stored vital-sign reading. Blood pressure carries the
/// diastolic component in `secondary`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VitalSign {
    pub user_id: String,
    pub kind: VitalKind,
    pub value: f64,
    pub secondary: Option<f64>,
    pub recorded_at: DateTime<Utc>,
    pub source: String, // manual, scan, pdf, device
}

/// An ordered sample window for one vital sign.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VitalSignSeries {
    pub kind: VitalKind,
    /// Chronological samples; systolic values for blood pressure.
    pub primary: Vec<f64>,
    /// Diastolic samples for blood pressure, empty for everything else.
    pub secondary: Vec<f64>,
    pub window_start: DateTime<Utc>,
    pub window_end: DateTime<Utc>,
}

impl VitalSignSeries {
    pub fn from_readings(
        kind: VitalKind,
        readings: &[VitalSign],
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
    ) -> Self {
        let mut matching: Vec<&VitalSign> =
            readings.iter().filter(|r| r.kind == kind).collect();
        matching.sort_by_key(|r| r.recorded_at);

        let primary = matching.iter().map(|r| r.value).collect();
        let secondary = matching.iter().filter_map(|r| r.secondary).collect();

        Self {
            kind,
            primary,
            secondary,
            window_start,
            window_end,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.primary.is_empty()
    }

    /// Arithmetic mean of the primary samples; `None` for an empty window.
    pub fn mean(&self) -> Option<f64> {
        mean_of(&self.primary)
    }

    pub fn secondary_mean(&self) -> Option<f64> {
        mean_of(&self.secondary)
    }
}

pub(crate) fn mean_of(samples: &[f64]) -> Option<f64> {
    if samples.is_empty() {
        None
    } else {
        Some(samples.iter().sum::<f64>() / samples.len() as f64)
    }
}

/// A named probability (0..=1) of a health condition, computed upstream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthRisk {
    pub user_id: String,
    pub risk_type: String,
    pub risk_score: f64,
    pub confidence: f64,
    pub recorded_at: DateTime<Utc>,
}

/// The full aggregated input for one report-generation run. Built fresh
/// per invocation, never persisted.
#[derive(Debug, Clone)]
pub struct PeriodSnapshot {
    pub vitals: BTreeMap<VitalKind, VitalSignSeries>,
    pub risks: BTreeMap<String, f64>,
    pub trends: BTreeMap<VitalKind, TrendLabel>,
    pub health_score: i32,
    pub previous_health_score: i32,
}

impl PeriodSnapshot {
    pub fn trend(&self, kind: VitalKind) -> TrendLabel {
        self.trends.get(&kind).copied().unwrap_or(TrendLabel::Unknown)
    }

    pub fn series(&self, kind: VitalKind) -> Option<&VitalSignSeries> {
        self.vitals.get(&kind)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportType {
    Weekly,
    Monthly,
    Quarterly,
}

impl ReportType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportType::Weekly => "weekly",
            ReportType::Monthly => "monthly",
            ReportType::Quarterly => "quarterly",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "weekly" => Some(ReportType::Weekly),
            "monthly" => Some(ReportType::Monthly),
            "quarterly" => Some(ReportType::Quarterly),
            _ => None,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ReportType::Weekly => "Weekly",
            ReportType::Monthly => "Monthly",
            ReportType::Quarterly => "Quarterly",
        }
    }

    /// Length of the reporting window, in days preceding generation.
    pub fn period_days(&self) -> i64 {
        match self {
            ReportType::Weekly => 7,
            ReportType::Monthly => 30,
            ReportType::Quarterly => 90,
        }
    }

    pub fn schedule_title(&self) -> &'static str {
        match self {
            ReportType::Weekly => "Weekly Health Summary",
            ReportType::Monthly => "Monthly Health Analysis",
            ReportType::Quarterly => "Quarterly Health Review",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    Scheduled,
    Generated,
}

impl ReportStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportStatus::Scheduled => "scheduled",
            ReportStatus::Generated => "generated",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "scheduled" => Some(ReportStatus::Scheduled),
            "generated" => Some(ReportStatus::Generated),
            _ => None,
        }
    }
}

/// A periodic health report. Created `scheduled` with no content, filled
/// and flipped to `generated` exactly once.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub date: DateTime<Utc>,
    #[serde(rename = "type")]
    pub kind: ReportType,
    pub status: ReportStatus,
    pub highlights: Option<Vec<String>>,
    pub recommendations: Option<Vec<String>>,
    pub html_content: Option<String>,
    pub document_path: Option<String>,
}

impl Report {
    pub fn scheduled(
        id: String,
        user_id: &str,
        title: &str,
        date: DateTime<Utc>,
        kind: ReportType,
    ) -> Self {
        Self {
            id,
            user_id: user_id.to_string(),
            title: title.to_string(),
            date,
            kind,
            status: ReportStatus::Scheduled,
            highlights: None,
            recommendations: None,
            html_content: None,
            document_path: None,
        }
    }

    /// Deterministic id for a calendar-scheduled report.
    pub fn scheduled_id(kind: ReportType, user_id: &str, date: NaiveDate) -> String {
        format!("report-{}-{}-{}", kind.as_str(), user_id, date)
    }
}

/// Per-user notification opt-outs. JSON keys follow the client's
/// camelCase convention.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserPreferences {
    pub weekly_report: bool,
    pub monthly_report: bool,
    pub quarterly_report: bool,
    pub alert_emails: bool,
    pub recommendation_emails: bool,
    pub reminder_emails: bool,
}

impl Default for UserPreferences {
    fn default() -> Self {
        Self {
            weekly_report: true,
            monthly_report: true,
            quarterly_report: true,
            alert_emails: true,
            recommendation_emails: false,
            reminder_emails: true,
        }
    }
}

impl UserPreferences {
    pub fn allows_report(&self, kind: ReportType) -> bool {
        match kind {
            ReportType::Weekly => self.weekly_report,
            ReportType::Monthly => self.monthly_report,
            ReportType::Quarterly => self.quarterly_report,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub preferences: UserPreferences,
}
