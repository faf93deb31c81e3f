//! Test doubles shared across module tests: an in-memory [`DataStore`]
//! plus mock mail and export collaborators.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::email::{MailError, Mailer};
use crate::export::{DocumentExporter, ExportError};
use crate::models::{HealthRisk, Report, ReportType, User, VitalSign};
use crate::store::{DataStore, StoreError};

#[derive(Default)]
pub struct MemoryStore {
    users: Mutex<HashMap<String, User>>,
    vitals: Mutex<Vec<VitalSign>>,
    risks: Mutex<Vec<HealthRisk>>,
    reports: Mutex<HashMap<String, Report>>,
}

impl MemoryStore {
    pub fn put_user(&self, user: User) {
        self.users.lock().unwrap().insert(user.id.clone(), user);
    }

    pub fn push_vital(&self, vital: VitalSign) {
        self.vitals.lock().unwrap().push(vital);
    }

    pub fn push_risk(&self, risk: HealthRisk) {
        self.risks.lock().unwrap().push(risk);
    }

    pub fn put_report(&self, report: Report) {
        self.reports.lock().unwrap().insert(report.id.clone(), report);
    }
}

#[async_trait]
impl DataStore for MemoryStore {
    async fn get_user(&self, id: &str) -> Result<Option<User>, StoreError> {
        Ok(self.users.lock().unwrap().get(id).cloned())
    }

    async fn get_all_users(&self) -> Result<Vec<User>, StoreError> {
        let mut users: Vec<User> = self.users.lock().unwrap().values().cloned().collect();
        users.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(users)
    }

    async fn get_vital_signs(
        &self,
        user_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<VitalSign>, StoreError> {
        Ok(self
            .vitals
            .lock()
            .unwrap()
            .iter()
            .filter(|v| v.user_id == user_id && v.recorded_at >= start && v.recorded_at < end)
            .cloned()
            .collect())
    }

    async fn get_health_risks(
        &self,
        user_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<HealthRisk>, StoreError> {
        Ok(self
            .risks
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.user_id == user_id && r.recorded_at >= start && r.recorded_at < end)
            .cloned()
            .collect())
    }

    async fn save_report(&self, report: &Report) -> Result<(), StoreError> {
        self.reports
            .lock()
            .unwrap()
            .entry(report.id.clone())
            .or_insert_with(|| report.clone());
        Ok(())
    }

    async fn update_report(&self, report: &Report) -> Result<(), StoreError> {
        self.reports
            .lock()
            .unwrap()
            .insert(report.id.clone(), report.clone());
        Ok(())
    }

    async fn get_report(&self, id: &str) -> Result<Option<Report>, StoreError> {
        Ok(self.reports.lock().unwrap().get(id).cloned())
    }

    async fn get_user_reports(
        &self,
        user_id: &str,
        kind: Option<ReportType>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Report>, StoreError> {
        let mut reports: Vec<Report> = self
            .reports
            .lock()
            .unwrap()
            .values()
            .filter(|r| r.user_id == user_id && kind.map_or(true, |k| r.kind == k))
            .cloned()
            .collect();
        reports.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(reports
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect())
    }
}

#[derive(Debug, Clone)]
pub struct SentEmail {
    pub to: String,
    pub subject: String,
    pub html: String,
    pub text: String,
}

#[derive(Default)]
pub struct MockMailer {
    sent: Mutex<Vec<SentEmail>>,
    fail: bool,
}

impl MockMailer {
    pub fn failing() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn outbox(&self) -> Vec<SentEmail> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Mailer for MockMailer {
    async fn send(
        &self,
        to: &str,
        subject: &str,
        html_body: &str,
        text_body: &str,
    ) -> Result<(), MailError> {
        if self.fail {
            return Err(MailError::Transport("mock transport down".into()));
        }
        self.sent.lock().unwrap().push(SentEmail {
            to: to.to_string(),
            subject: subject.to_string(),
            html: html_body.to_string(),
            text: text_body.to_string(),
        });
        Ok(())
    }
}

#[derive(Default)]
pub struct MockExporter {
    fail: bool,
}

impl MockExporter {
    pub fn failing() -> Self {
        Self { fail: true }
    }
}

#[async_trait]
impl DocumentExporter for MockExporter {
    async fn export(&self, report_id: &str, _html: &str) -> Result<String, ExportError> {
        if self.fail {
            return Err(ExportError::Io(std::io::Error::other("mock export down")));
        }
        Ok(format!("/tmp/reports/{report_id}.pdf"))
    }
}
