use axum::http::StatusCode;

use crate::error::ReportError;

pub mod notifications;
pub mod reports;

pub(crate) fn error_response(err: ReportError) -> (StatusCode, String) {
    let status = match &err {
        ReportError::Validation(_) => StatusCode::BAD_REQUEST,
        ReportError::NotFound(_) => StatusCode::NOT_FOUND,
        ReportError::Generation(_) => StatusCode::INTERNAL_SERVER_ERROR,
        ReportError::Delivery(_) => StatusCode::BAD_GATEWAY,
    };
    (status, err.to_string())
}
