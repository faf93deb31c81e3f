//! Narrative synthesis: highlight and recommendation sentences derived
//! from a period snapshot. Both composers are total over well-formed
//! snapshots; unknown trends simply contribute nothing.

use crate::models::{PeriodSnapshot, TrendLabel, VitalKind};

/// Health score below this asks the user to book a check-up.
const CHECKUP_SCORE: i32 = 70;

/// Fixed rule table, evaluated heart rate -> blood pressure ->
/// respiratory rate -> stress -> score delta. May legitimately return
/// an empty list.
pub fn compose_highlights(snapshot: &PeriodSnapshot) -> Vec<String> {
    let mut highlights = Vec::new();

    match snapshot.trend(VitalKind::HeartRate) {
        TrendLabel::Stable => {
            highlights.push("Heart rate has remained stable within normal range".to_string())
        }
        TrendLabel::Improving => highlights.push("Heart rate has shown improvement".to_string()),
        TrendLabel::Concerning => {
            highlights.push("Heart rate shows some concerning patterns".to_string())
        }
        _ => {}
    }

    match snapshot.trend(VitalKind::BloodPressure) {
        TrendLabel::Normal => {
            highlights.push("Blood pressure is within healthy range".to_string())
        }
        TrendLabel::SlightlyElevated => {
            highlights.push("Blood pressure is slightly elevated".to_string())
        }
        TrendLabel::Elevated => {
            highlights.push("Blood pressure is elevated and requires attention".to_string())
        }
        _ => {}
    }

    if snapshot.trend(VitalKind::RespiratoryRate) == TrendLabel::Normal {
        highlights.push("Respiratory rate is within optimal range".to_string());
    }

    match snapshot.trend(VitalKind::Stress) {
        TrendLabel::Improving => highlights
            .push("Stress levels have decreased compared to previous period".to_string()),
        TrendLabel::Elevated => highlights.push("Stress levels are elevated".to_string()),
        _ => {}
    }

    if snapshot.health_score > snapshot.previous_health_score {
        let improvement = snapshot.health_score - snapshot.previous_health_score;
        highlights.push(format!("Overall health score improved by {improvement}%"));
    }

    highlights
}

/// Same fixed-order rule table; falls back to two default sentences so
/// the output is never empty.
pub fn compose_recommendations(snapshot: &PeriodSnapshot) -> Vec<String> {
    let mut recommendations = Vec::new();

    match snapshot.trend(VitalKind::BloodPressure) {
        TrendLabel::SlightlyElevated => {
            recommendations.push(
                "Consider reducing sodium intake to help manage blood pressure".to_string(),
            );
            recommendations.push("Maintain regular cardiovascular exercise".to_string());
        }
        TrendLabel::Elevated => {
            recommendations.push(
                "Consult with your healthcare provider about your blood pressure".to_string(),
            );
            recommendations.push("Monitor your blood pressure regularly".to_string());
        }
        _ => {}
    }

    match snapshot.trend(VitalKind::Stress) {
        TrendLabel::Elevated => {
            recommendations.push(
                "Consider incorporating stress management techniques like meditation".to_string(),
            );
            recommendations.push("Ensure you're getting adequate sleep".to_string());
        }
        TrendLabel::Improving => {
            recommendations
                .push("Continue with your current stress management techniques".to_string());
        }
        _ => {}
    }

    if snapshot.health_score < CHECKUP_SCORE {
        recommendations
            .push("Schedule a check-up with your primary care physician".to_string());
    }

    if recommendations.is_empty() {
        recommendations.push("Maintain your current health routine".to_string());
        recommendations
            .push("Stay hydrated and continue regular physical activity".to_string());
    }

    recommendations
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn snapshot_with(
        trends: &[(VitalKind, TrendLabel)],
        health_score: i32,
        previous_health_score: i32,
    ) -> PeriodSnapshot {
        PeriodSnapshot {
            vitals: BTreeMap::new(),
            risks: BTreeMap::new(),
            trends: trends.iter().copied().collect(),
            health_score,
            previous_health_score,
        }
    }

    #[test]
    fn all_unknown_and_no_improvement_yields_no_highlights() {
        let snapshot = snapshot_with(&[], 70, 70);
        assert!(compose_highlights(&snapshot).is_empty());

        let declined = snapshot_with(&[], 65, 70);
        assert!(compose_highlights(&declined).is_empty());
    }

    #[test]
    fn highlights_follow_vital_order() {
        let snapshot = snapshot_with(
            &[
                (VitalKind::HeartRate, TrendLabel::Stable),
                (VitalKind::BloodPressure, TrendLabel::SlightlyElevated),
                (VitalKind::RespiratoryRate, TrendLabel::Normal),
                (VitalKind::Stress, TrendLabel::Improving),
            ],
            78,
            72,
        );
        let highlights = compose_highlights(&snapshot);
        assert_eq!(
            highlights,
            vec![
                "Heart rate has remained stable within normal range",
                "Blood pressure is slightly elevated",
                "Respiratory rate is within optimal range",
                "Stress levels have decreased compared to previous period",
                "Overall health score improved by 6%",
            ]
        );
    }

    #[test]
    fn score_delta_highlight_only_on_improvement() {
        let improved = snapshot_with(&[], 80, 71);
        assert_eq!(
            compose_highlights(&improved),
            vec!["Overall health score improved by 9%"]
        );

        let flat = snapshot_with(&[], 71, 71);
        assert!(compose_highlights(&flat).is_empty());
    }

    #[test]
    fn recommendations_never_empty() {
        let snapshot = snapshot_with(&[], 85, 85);
        let recommendations = compose_recommendations(&snapshot);
        assert_eq!(
            recommendations,
            vec![
                "Maintain your current health routine",
                "Stay hydrated and continue regular physical activity",
            ]
        );
    }

    #[test]
    fn elevated_blood_pressure_asks_for_provider() {
        let snapshot = snapshot_with(&[(VitalKind::BloodPressure, TrendLabel::Elevated)], 85, 85);
        let recommendations = compose_recommendations(&snapshot);
        assert_eq!(
            recommendations,
            vec![
                "Consult with your healthcare provider about your blood pressure",
                "Monitor your blood pressure regularly",
            ]
        );
    }

    #[test]
    fn low_score_adds_checkup() {
        let snapshot = snapshot_with(&[(VitalKind::Stress, TrendLabel::Improving)], 64, 60);
        let recommendations = compose_recommendations(&snapshot);
        assert_eq!(
            recommendations,
            vec![
                "Continue with your current stress management techniques",
                "Schedule a check-up with your primary care physician",
            ]
        );
    }

    #[test]
    fn elevated_stress_gets_two_recommendations() {
        let snapshot = snapshot_with(&[(VitalKind::Stress, TrendLabel::Elevated)], 85, 85);
        let recommendations = compose_recommendations(&snapshot);
        assert_eq!(recommendations.len(), 2);
        assert!(recommendations[0].contains("meditation"));
        assert!(recommendations[1].contains("sleep"));
    }
}
