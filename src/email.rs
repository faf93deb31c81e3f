//! Email notification assembly and delivery. Templates are fixed
//! records filled by name; the transport behind [`Mailer`] only ever
//! sees a finished subject/html/text triple.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Datelike, Duration, NaiveDate, Utc};
use serde_json::json;
use thiserror::Error;

use crate::models::{Report, ReportType, User};

pub const FROM_ADDRESS: &str = "VitalSign Guardian <health@vitalsignguardian.com>";

#[derive(Debug, Error)]
pub enum MailError {
    #[error("mail transport error: {0}")]
    Transport(String),
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(
        &self,
        to: &str,
        subject: &str,
        html_body: &str,
        text_body: &str,
    ) -> Result<(), MailError>;
}

/// Delivery through the Resend HTTP API.
pub struct ResendMailer {
    client: reqwest::Client,
    api_key: String,
}

impl ResendMailer {
    pub fn new(api_key: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
        }
    }
}

#[async_trait]
impl Mailer for ResendMailer {
    async fn send(
        &self,
        to: &str,
        subject: &str,
        html_body: &str,
        text_body: &str,
    ) -> Result<(), MailError> {
        let payload = json!({
            "from": FROM_ADDRESS,
            "to": [to],
            "subject": subject,
            "html": html_body,
            "text": text_body,
        });

        let response = self
            .client
            .post("https://api.resend.com/emails")
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| MailError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(MailError::Transport(format!(
                "resend responded {}",
                response.status()
            )));
        }
        Ok(())
    }
}

/// The notification kinds with a template of their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmailKind {
    WeeklyReport,
    MonthlyReport,
    QuarterlyReport,
    HealthAlert,
    Recommendation,
    Reminder,
}

/// A named subject/html/text triple with `{placeholder}` tokens.
pub struct EmailTemplate {
    pub subject: &'static str,
    pub html_body: &'static str,
    pub text_body: &'static str,
}

pub fn template(kind: EmailKind) -> &'static EmailTemplate {
    match kind {
        EmailKind::WeeklyReport => &WEEKLY_REPORT,
        EmailKind::MonthlyReport => &MONTHLY_REPORT,
        EmailKind::QuarterlyReport => &QUARTERLY_REPORT,
        EmailKind::HealthAlert => &HEALTH_ALERT,
        EmailKind::Recommendation => &RECOMMENDATION,
        EmailKind::Reminder => &REMINDER,
    }
}

/// Report kinds without a template of their own fall back to weekly.
pub fn report_template(kind: ReportType) -> &'static EmailTemplate {
    match kind {
        ReportType::Monthly => template(EmailKind::MonthlyReport),
        ReportType::Quarterly => template(EmailKind::QuarterlyReport),
        _ => template(EmailKind::WeeklyReport),
    }
}

static WEEKLY_REPORT: EmailTemplate = EmailTemplate {
    subject: "Your Weekly Health Report is Ready",
    html_body: "<html>\n<body>\n<h1>Your Weekly Health Report</h1>\n\
<p>Hello {first_name},</p>\n\
<p>Your weekly health report for {date_range} is now available.</p>\n\
<p>Highlights:</p>\n<ul>\n{highlights}\n</ul>\n\
<p><a href=\"{report_url}\">View your full report</a></p>\n\
<p>Stay healthy!</p>\n<p>The VitalSign Guardian Team</p>\n</body>\n</html>\n",
    text_body: "Your Weekly Health Report\n\nHello {first_name},\n\n\
Your weekly health report for {date_range} is now available.\n\n\
Highlights:\n{text_highlights}\n\n\
View your full report: {report_url}\n\n\
Stay healthy!\nThe VitalSign Guardian Team\n",
};

static MONTHLY_REPORT: EmailTemplate = EmailTemplate {
    subject: "Your Monthly Health Analysis is Ready",
    html_body: "<html>\n<body>\n<h1>Your Monthly Health Analysis</h1>\n\
<p>Hello {first_name},</p>\n\
<p>Your monthly health analysis for {date_range} is now available.</p>\n\
<p>Highlights:</p>\n<ul>\n{highlights}\n</ul>\n\
<p><a href=\"{report_url}\">View your full report</a></p>\n\
<p>Stay healthy!</p>\n<p>The VitalSign Guardian Team</p>\n</body>\n</html>\n",
    text_body: "Your Monthly Health Analysis\n\nHello {first_name},\n\n\
Your monthly health analysis for {date_range} is now available.\n\n\
Highlights:\n{text_highlights}\n\n\
View your full report: {report_url}\n\n\
Stay healthy!\nThe VitalSign Guardian Team\n",
};

static QUARTERLY_REPORT: EmailTemplate = EmailTemplate {
    subject: "Your Quarterly Health Review is Ready",
    html_body: "<html>\n<body>\n<h1>Your Quarterly Health Review</h1>\n\
<p>Hello {first_name},</p>\n\
<p>Your quarterly health review for {date_range} is now available.</p>\n\
<p>Highlights:</p>\n<ul>\n{highlights}\n</ul>\n\
<p><a href=\"{report_url}\">View your full report</a></p>\n\
<p>Stay healthy!</p>\n<p>The VitalSign Guardian Team</p>\n</body>\n</html>\n",
    text_body: "Your Quarterly Health Review\n\nHello {first_name},\n\n\
Your quarterly health review for {date_range} is now available.\n\n\
Highlights:\n{text_highlights}\n\n\
View your full report: {report_url}\n\n\
Stay healthy!\nThe VitalSign Guardian Team\n",
};

static HEALTH_ALERT: EmailTemplate = EmailTemplate {
    subject: "Health Alert: Abnormal Pattern Detected",
    html_body: "<html>\n<body>\n<h1>Health Alert</h1>\n\
<p>Hello {first_name},</p>\n\
<p>We've detected an abnormal pattern in your health data that you should be aware of.</p>\n\
<p><strong>{alert_message}</strong></p>\n\
<p>Recommendations:</p>\n<ul>\n{recommendations}\n</ul>\n\
<p><a href=\"{dashboard_url}\">View your dashboard</a></p>\n\
<p>This is an automated alert. Please consult with a healthcare professional for medical advice.</p>\n\
<p>The VitalSign Guardian Team</p>\n</body>\n</html>\n",
    text_body: "Health Alert\n\nHello {first_name},\n\n\
We've detected an abnormal pattern in your health data that you should be aware of.\n\n\
{alert_message}\n\n\
Recommendations:\n{text_recommendations}\n\n\
View your dashboard: {dashboard_url}\n\n\
This is an automated alert. Please consult with a healthcare professional for medical advice.\n\n\
The VitalSign Guardian Team\n",
};

static RECOMMENDATION: EmailTemplate = EmailTemplate {
    subject: "Your Personalized Health Recommendations",
    html_body: "<html>\n<body>\n<h1>Your Personalized Health Recommendations</h1>\n\
<p>Hello {first_name},</p>\n\
<p>Based on your recent health data, we have some personalized recommendations for you:</p>\n\
<ul>\n{recommendations}\n</ul>\n\
<p><a href=\"{dashboard_url}\">View your dashboard</a></p>\n\
<p>Stay healthy!</p>\n<p>The VitalSign Guardian Team</p>\n</body>\n</html>\n",
    text_body: "Your Personalized Health Recommendations\n\nHello {first_name},\n\n\
Based on your recent health data, we have some personalized recommendations for you:\n\n\
{text_recommendations}\n\n\
View your dashboard: {dashboard_url}\n\n\
Stay healthy!\nThe VitalSign Guardian Team\n",
};

static REMINDER: EmailTemplate = EmailTemplate {
    subject: "We Miss You! Time for a Health Check-in",
    html_body: "<html>\n<body>\n<h1>Time for a Health Check-in</h1>\n\
<p>Hello {first_name},</p>\n\
<p>It's been a while since you last checked in with VitalSign Guardian. Regular monitoring is key to maintaining good health.</p>\n\
<p>Take a moment to log in and update your health data.</p>\n\
<p><a href=\"{login_url}\">Log in now</a></p>\n\
<p>Stay healthy!</p>\n<p>The VitalSign Guardian Team</p>\n</body>\n</html>\n",
    text_body: "Time for a Health Check-in\n\nHello {first_name},\n\n\
It's been a while since you last checked in with VitalSign Guardian. Regular monitoring is key to maintaining good health.\n\n\
Take a moment to log in and update your health data.\n\n\
Log in now: {login_url}\n\n\
Stay healthy!\nThe VitalSign Guardian Team\n",
};

/// Replaces `{name}` tokens. Unmatched tokens are left in place; a
/// missing field can never fault the send.
fn fill(template: &str, fields: &[(&str, &str)]) -> String {
    let mut out = template.to_string();
    for (key, value) in fields {
        out = out.replace(&format!("{{{key}}}"), value);
    }
    out
}

fn html_items(items: &[String]) -> String {
    items
        .iter()
        .map(|item| format!("<li>{item}</li>"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn text_items(items: &[String]) -> String {
    items
        .iter()
        .map(|item| format!("- {item}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Reporting window shown in report emails.
pub fn date_range_label(kind: ReportType, today: NaiveDate) -> String {
    match kind {
        ReportType::Weekly => format!(
            "{} - {}",
            (today - Duration::days(7)).format("%b %d"),
            today.format("%b %d, %Y")
        ),
        ReportType::Monthly => today.format("%B %Y").to_string(),
        ReportType::Quarterly => {
            let quarter = (today.month() - 1) / 3 + 1;
            format!("Q{quarter} {}", today.year())
        }
    }
}

/// Ad-hoc alert payload for health-alert notifications.
#[derive(Debug, Clone)]
pub struct HealthAlert {
    pub message: String,
    pub recommendations: Vec<String>,
}

/// Assembles notification content and hands it to the transport.
/// Alert, recommendation and reminder sends honor the user's opt-outs;
/// report emails are gated by the report pipeline itself.
pub struct Notifier {
    mailer: Arc<dyn Mailer>,
    base_url: String,
}

impl Notifier {
    pub fn new(mailer: Arc<dyn Mailer>, base_url: String) -> Self {
        Self { mailer, base_url }
    }

    pub async fn send_report_email(
        &self,
        user: &User,
        report: &Report,
    ) -> Result<bool, MailError> {
        let template = report_template(report.kind);
        let date_range = date_range_label(report.kind, Utc::now().date_naive());
        let highlights = report.highlights.clone().unwrap_or_default();
        let report_url = format!("{}/reports/{}", self.base_url, report.id);

        let html = fill(
            template.html_body,
            &[
                ("first_name", user.first_name.as_str()),
                ("date_range", date_range.as_str()),
                ("highlights", html_items(&highlights).as_str()),
                ("report_url", report_url.as_str()),
            ],
        );
        let text = fill(
            template.text_body,
            &[
                ("first_name", user.first_name.as_str()),
                ("date_range", date_range.as_str()),
                ("text_highlights", text_items(&highlights).as_str()),
                ("report_url", report_url.as_str()),
            ],
        );

        self.mailer
            .send(&user.email, template.subject, &html, &text)
            .await?;
        tracing::info!("📧 sent {} report email to {}", report.kind.as_str(), user.email);
        Ok(true)
    }

    pub async fn send_health_alert(
        &self,
        user: &User,
        alert: &HealthAlert,
    ) -> Result<bool, MailError> {
        if !user.preferences.alert_emails {
            return Ok(false);
        }
        let template = template(EmailKind::HealthAlert);
        let dashboard_url = format!("{}/dashboard", self.base_url);

        let html = fill(
            template.html_body,
            &[
                ("first_name", user.first_name.as_str()),
                ("alert_message", alert.message.as_str()),
                ("recommendations", html_items(&alert.recommendations).as_str()),
                ("dashboard_url", dashboard_url.as_str()),
            ],
        );
        let text = fill(
            template.text_body,
            &[
                ("first_name", user.first_name.as_str()),
                ("alert_message", alert.message.as_str()),
                ("text_recommendations", text_items(&alert.recommendations).as_str()),
                ("dashboard_url", dashboard_url.as_str()),
            ],
        );

        self.mailer
            .send(&user.email, template.subject, &html, &text)
            .await?;
        Ok(true)
    }

    pub async fn send_recommendation_email(
        &self,
        user: &User,
        recommendations: &[String],
    ) -> Result<bool, MailError> {
        if !user.preferences.recommendation_emails {
            return Ok(false);
        }
        let template = template(EmailKind::Recommendation);
        let dashboard_url = format!("{}/dashboard", self.base_url);

        let html = fill(
            template.html_body,
            &[
                ("first_name", user.first_name.as_str()),
                ("recommendations", html_items(recommendations).as_str()),
                ("dashboard_url", dashboard_url.as_str()),
            ],
        );
        let text = fill(
            template.text_body,
            &[
                ("first_name", user.first_name.as_str()),
                ("text_recommendations", text_items(recommendations).as_str()),
                ("dashboard_url", dashboard_url.as_str()),
            ],
        );

        self.mailer
            .send(&user.email, template.subject, &html, &text)
            .await?;
        Ok(true)
    }

    pub async fn send_reminder_email(&self, user: &User) -> Result<bool, MailError> {
        if !user.preferences.reminder_emails {
            return Ok(false);
        }
        let template = template(EmailKind::Reminder);
        let login_url = format!("{}/login", self.base_url);

        let html = fill(
            template.html_body,
            &[
                ("first_name", user.first_name.as_str()),
                ("login_url", login_url.as_str()),
            ],
        );
        let text = fill(
            template.text_body,
            &[
                ("first_name", user.first_name.as_str()),
                ("login_url", login_url.as_str()),
            ],
        );

        self.mailer
            .send(&user.email, template.subject, &html, &text)
            .await?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UserPreferences;
    use crate::testing::MockMailer;
    use chrono::TimeZone;

    fn user(prefs: UserPreferences) -> User {
        User {
            id: "u1".into(),
            email: "u1@example.com".into(),
            first_name: "John".into(),
            last_name: "Doe".into(),
            preferences: prefs,
        }
    }

    fn generated_report() -> Report {
        let mut report = Report::scheduled(
            "report-weekly-u1-2026-08-05".into(),
            "u1",
            "Weekly Health Summary",
            Utc.with_ymd_and_hms(2026, 8, 5, 8, 0, 0).unwrap(),
            ReportType::Weekly,
        );
        report.highlights = Some(vec![
            "Heart rate has remained stable within normal range".to_string(),
        ]);
        report
    }

    #[test]
    fn report_template_falls_back_to_weekly() {
        assert_eq!(
            report_template(ReportType::Weekly).subject,
            WEEKLY_REPORT.subject
        );
        assert_eq!(
            report_template(ReportType::Monthly).subject,
            MONTHLY_REPORT.subject
        );
        assert_eq!(
            report_template(ReportType::Quarterly).subject,
            QUARTERLY_REPORT.subject
        );
    }

    #[test]
    fn date_range_labels_per_kind() {
        let today = NaiveDate::from_ymd_opt(2026, 8, 6).unwrap();
        assert_eq!(
            date_range_label(ReportType::Weekly, today),
            "Jul 30 - Aug 06, 2026"
        );
        assert_eq!(date_range_label(ReportType::Monthly, today), "August 2026");
        assert_eq!(date_range_label(ReportType::Quarterly, today), "Q3 2026");
    }

    #[test]
    fn fill_replaces_every_named_token() {
        let out = fill(
            "Hello {first_name}, see {report_url}",
            &[("first_name", "Jane"), ("report_url", "https://x/reports/1")],
        );
        assert_eq!(out, "Hello Jane, see https://x/reports/1");
    }

    #[tokio::test]
    async fn report_email_carries_highlights_and_url() {
        let mailer = Arc::new(MockMailer::default());
        let notifier = Notifier::new(mailer.clone(), "https://vitalsignguardian.com".into());

        let sent = notifier
            .send_report_email(&user(UserPreferences::default()), &generated_report())
            .await
            .unwrap();
        assert!(sent);

        let outbox = mailer.outbox();
        assert_eq!(outbox.len(), 1);
        assert_eq!(outbox[0].to, "u1@example.com");
        assert_eq!(outbox[0].subject, "Your Weekly Health Report is Ready");
        assert!(outbox[0]
            .html
            .contains("<li>Heart rate has remained stable within normal range</li>"));
        assert!(outbox[0]
            .html
            .contains("https://vitalsignguardian.com/reports/report-weekly-u1-2026-08-05"));
        assert!(outbox[0]
            .text
            .contains("- Heart rate has remained stable within normal range"));
        assert!(!outbox[0].html.contains("{first_name}"));
    }

    #[tokio::test]
    async fn recommendation_email_honors_opt_out() {
        let mailer = Arc::new(MockMailer::default());
        let notifier = Notifier::new(mailer.clone(), "https://vitalsignguardian.com".into());

        // recommendation emails default to off
        let sent = notifier
            .send_recommendation_email(
                &user(UserPreferences::default()),
                &["Drink more water".to_string()],
            )
            .await
            .unwrap();
        assert!(!sent);
        assert!(mailer.outbox().is_empty());

        let mut prefs = UserPreferences::default();
        prefs.recommendation_emails = true;
        let sent = notifier
            .send_recommendation_email(&user(prefs), &["Drink more water".to_string()])
            .await
            .unwrap();
        assert!(sent);
        assert_eq!(mailer.outbox().len(), 1);
    }

    #[tokio::test]
    async fn reminder_email_uses_login_url() {
        let mailer = Arc::new(MockMailer::default());
        let notifier = Notifier::new(mailer.clone(), "https://vitalsignguardian.com".into());

        notifier
            .send_reminder_email(&user(UserPreferences::default()))
            .await
            .unwrap();
        let outbox = mailer.outbox();
        assert!(outbox[0].html.contains("https://vitalsignguardian.com/login"));
    }
}
