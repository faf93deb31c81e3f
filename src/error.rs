use thiserror::Error;

/// Failure taxonomy for the report pipeline.
///
/// `Validation` and `NotFound` reject before any side effect.
/// `Generation` leaves the report in `scheduled` status. `Delivery`
/// never rolls back a `generated` report.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("invalid report type: {0}")]
    Validation(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("report generation failed: {0}")]
    Generation(String),

    #[error("notification delivery failed: {0}")]
    Delivery(String),
}

impl From<crate::store::StoreError> for ReportError {
    fn from(err: crate::store::StoreError) -> Self {
        ReportError::Generation(err.to_string())
    }
}
