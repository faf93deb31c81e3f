use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Json,
    routing::post,
    Router,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::email::HealthAlert;
use crate::error::ReportError;
use crate::models::{Report, ReportStatus, ReportType, User, UserPreferences};
use crate::routes::error_response;
use crate::AppState;

#[derive(Deserialize)]
pub struct TestEmailQuery {
    email: String,
    email_type: String,
}

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/email/test", post(send_test_email))
        .with_state(state)
}

async fn send_test_email(
    State(state): State<AppState>,
    Query(query): Query<TestEmailQuery>,
) -> Result<Json<Value>, (StatusCode, String)> {
    let recipient = test_recipient(&query.email);

    let outcome = match query.email_type.as_str() {
        "report" => {
            state
                .notifier
                .send_report_email(&recipient, &test_report())
                .await
        }
        "alert" => {
            state
                .notifier
                .send_health_alert(&recipient, &test_alert())
                .await
        }
        "recommendation" => {
            state
                .notifier
                .send_recommendation_email(&recipient, &test_recommendations())
                .await
        }
        "reminder" => state.notifier.send_reminder_email(&recipient).await,
        other => {
            return Err((
                StatusCode::BAD_REQUEST,
                format!("Invalid email type: {other}"),
            ))
        }
    };

    outcome.map_err(|e| {
        tracing::error!("❌ test email to {} failed: {e}", query.email);
        error_response(ReportError::Delivery(e.to_string()))
    })?;

    Ok(Json(json!({ "status": "Test email sent successfully" })))
}

/// Test sends bypass stored preferences, so the synthetic recipient has
/// every notification kind enabled.
fn test_recipient(email: &str) -> User {
    User {
        id: "test-user".to_string(),
        email: email.to_string(),
        first_name: "John".to_string(),
        last_name: "Doe".to_string(),
        preferences: UserPreferences {
            weekly_report: true,
            monthly_report: true,
            quarterly_report: true,
            alert_emails: true,
            recommendation_emails: true,
            reminder_emails: true,
        },
    }
}

fn test_report() -> Report {
    Report {
        id: "test-report-123".to_string(),
        user_id: "test-user".to_string(),
        title: "Test Weekly Health Report".to_string(),
        date: Utc::now(),
        kind: ReportType::Weekly,
        status: ReportStatus::Generated,
        highlights: Some(vec![
            "This is a test highlight 1".to_string(),
            "This is a test highlight 2".to_string(),
            "This is a test highlight 3".to_string(),
        ]),
        recommendations: Some(vec![
            "This is a test recommendation 1".to_string(),
            "This is a test recommendation 2".to_string(),
        ]),
        html_content: None,
        document_path: None,
    }
}

fn test_alert() -> HealthAlert {
    HealthAlert {
        message: "Your blood pressure readings have been consistently elevated over the past week."
            .to_string(),
        recommendations: vec![
            "Monitor your blood pressure daily".to_string(),
            "Reduce sodium intake".to_string(),
            "Consider consulting with your healthcare provider".to_string(),
        ],
    }
}

fn test_recommendations() -> Vec<String> {
    vec![
        "Based on your recent activity, consider increasing your daily water intake".to_string(),
        "Your sleep patterns suggest you might benefit from a more consistent sleep schedule"
            .to_string(),
        "Consider adding more cardiovascular exercise to your routine".to_string(),
    ]
}
