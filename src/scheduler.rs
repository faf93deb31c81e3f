//! Calendar-driven scheduling: which report kinds each user is owed on
//! a given date. Weekly reports anchor on Wednesday, monthly on the 1st,
//! quarterly on the 1st of January, April, July and October.

use std::sync::Arc;

use chrono::{Datelike, NaiveDate, NaiveTime, Weekday};

use crate::error::ReportError;
use crate::generator::ReportService;
use crate::models::{Report, ReportType, User};

const WEEKLY_ANCHOR: Weekday = Weekday::Wed;
const QUARTER_START_MONTHS: [u32; 4] = [1, 4, 7, 10];

/// The reports a single user is due on `date`, honoring opt-outs.
/// Pure decision logic; nothing is persisted here.
pub fn reports_due(user: &User, date: NaiveDate) -> Vec<Report> {
    let mut due = Vec::new();

    if user.preferences.weekly_report && date.weekday() == WEEKLY_ANCHOR {
        due.push(scheduled_report(ReportType::Weekly, user, date));
    }
    if user.preferences.monthly_report && date.day() == 1 {
        due.push(scheduled_report(ReportType::Monthly, user, date));
    }
    if user.preferences.quarterly_report
        && date.day() == 1
        && QUARTER_START_MONTHS.contains(&date.month())
    {
        due.push(scheduled_report(ReportType::Quarterly, user, date));
    }

    due
}

fn scheduled_report(kind: ReportType, user: &User, date: NaiveDate) -> Report {
    Report::scheduled(
        Report::scheduled_id(kind, &user.id, date),
        &user.id,
        kind.schedule_title(),
        date.and_time(NaiveTime::MIN).and_utc(),
        kind,
    )
}

/// Persists every due report and enqueues its generation, returning the
/// scheduled set without waiting for generation to finish.
pub async fn schedule_for_date(
    service: &Arc<ReportService>,
    users: &[User],
    date: NaiveDate,
) -> Result<Vec<Report>, ReportError> {
    let mut scheduled = Vec::new();
    for user in users {
        for report in reports_due(user, date) {
            service.enqueue(&report).await?;
            scheduled.push(report);
        }
    }
    tracing::info!("📅 scheduled {} report(s) for {date}", scheduled.len());
    Ok(scheduled)
}
