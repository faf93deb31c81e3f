use crate::models::{mean_of, TrendLabel, VitalKind, VitalSignSeries};

// Clinical thresholds. Systolic bands follow the common 120/130 mmHg
// cut-offs; resting heart rate 50-100 bpm; respiratory rate 12-20
// breaths/min; stress index above 60 counts as elevated.
const SYSTOLIC_ELEVATED: f64 = 130.0;
const SYSTOLIC_SLIGHTLY_ELEVATED: f64 = 120.0;
const HR_NORMAL_LOW: f64 = 50.0;
const HR_NORMAL_HIGH: f64 = 100.0;
const HR_SHIFT_TOLERANCE: f64 = 2.0;
const RESP_NORMAL_LOW: f64 = 12.0;
const RESP_NORMAL_HIGH: f64 = 20.0;
const STRESS_ELEVATED: f64 = 60.0;
const STRESS_SHIFT_TOLERANCE: f64 = 3.0;

/// Reduces a sample window to a qualitative trend label. Missing data
/// and ties classify as `Unknown`, never an error.
pub fn classify(series: &VitalSignSeries) -> TrendLabel {
    match series.kind {
        VitalKind::HeartRate => classify_heart_rate(series),
        VitalKind::BloodPressure => classify_blood_pressure(series),
        VitalKind::RespiratoryRate => classify_respiratory_rate(series),
        VitalKind::Stress => classify_stress(series),
    }
}

/// Mean of the leading and trailing half of the window. `None` when the
/// window is too short to split.
fn half_means(samples: &[f64]) -> Option<(f64, f64)> {
    if samples.len() < 2 {
        return None;
    }
    let mid = samples.len() / 2;
    let leading = mean_of(&samples[..mid])?;
    let trailing = mean_of(&samples[mid..])?;
    Some((leading, trailing))
}

fn classify_heart_rate(series: &VitalSignSeries) -> TrendLabel {
    let Some((leading, trailing)) = half_means(&series.primary) else {
        return TrendLabel::Unknown;
    };
    if trailing > HR_NORMAL_HIGH || trailing < HR_NORMAL_LOW {
        return TrendLabel::Concerning;
    }
    if trailing + HR_SHIFT_TOLERANCE < leading {
        return TrendLabel::Improving;
    }
    if trailing > leading + HR_SHIFT_TOLERANCE {
        return TrendLabel::Concerning;
    }
    TrendLabel::Stable
}

fn classify_blood_pressure(series: &VitalSignSeries) -> TrendLabel {
    let Some(systolic) = series.mean() else {
        return TrendLabel::Unknown;
    };
    if systolic > SYSTOLIC_ELEVATED {
        TrendLabel::Elevated
    } else if systolic >= SYSTOLIC_SLIGHTLY_ELEVATED {
        TrendLabel::SlightlyElevated
    } else {
        TrendLabel::Normal
    }
}

fn classify_respiratory_rate(series: &VitalSignSeries) -> TrendLabel {
    match series.mean() {
        Some(rate) if (RESP_NORMAL_LOW..=RESP_NORMAL_HIGH).contains(&rate) => {
            TrendLabel::Normal
        }
        _ => TrendLabel::Unknown,
    }
}

fn classify_stress(series: &VitalSignSeries) -> TrendLabel {
    let Some((leading, trailing)) = half_means(&series.primary) else {
        return match series.mean() {
            Some(level) if level >= STRESS_ELEVATED => TrendLabel::Elevated,
            _ => TrendLabel::Unknown,
        };
    };
    if trailing >= STRESS_ELEVATED {
        return TrendLabel::Elevated;
    }
    if trailing + STRESS_SHIFT_TOLERANCE < leading {
        return TrendLabel::Improving;
    }
    TrendLabel::Unknown
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn series(kind: VitalKind, primary: Vec<f64>) -> VitalSignSeries {
        VitalSignSeries {
            kind,
            primary,
            secondary: Vec::new(),
            window_start: Utc.with_ymd_and_hms(2026, 7, 30, 0, 0, 0).unwrap(),
            window_end: Utc.with_ymd_and_hms(2026, 8, 6, 0, 0, 0).unwrap(),
        }
    }

    #[test]
    fn empty_series_classifies_unknown() {
        for kind in VitalKind::ALL {
            assert_eq!(classify(&series(kind, vec![])), TrendLabel::Unknown);
        }
    }

    #[test]
    fn single_heart_rate_sample_is_unknown() {
        let s = series(VitalKind::HeartRate, vec![72.0]);
        assert_eq!(classify(&s), TrendLabel::Unknown);
    }

    #[test]
    fn steady_in_range_heart_rate_is_stable() {
        let s = series(VitalKind::HeartRate, vec![72.0, 75.0, 71.0, 74.0, 73.0, 70.0, 72.0]);
        assert_eq!(classify(&s), TrendLabel::Stable);
    }

    #[test]
    fn falling_heart_rate_is_improving() {
        let s = series(VitalKind::HeartRate, vec![88.0, 86.0, 84.0, 76.0, 74.0, 72.0]);
        assert_eq!(classify(&s), TrendLabel::Improving);
    }

    #[test]
    fn tachycardic_heart_rate_is_concerning() {
        let s = series(VitalKind::HeartRate, vec![98.0, 101.0, 104.0, 108.0]);
        assert_eq!(classify(&s), TrendLabel::Concerning);
    }

    #[test]
    fn rising_heart_rate_within_range_is_concerning() {
        let s = series(VitalKind::HeartRate, vec![70.0, 71.0, 80.0, 82.0]);
        assert_eq!(classify(&s), TrendLabel::Concerning);
    }

    #[test]
    fn blood_pressure_bands() {
        let normal = series(VitalKind::BloodPressure, vec![114.0, 116.0, 118.0]);
        assert_eq!(classify(&normal), TrendLabel::Normal);

        let slight = series(VitalKind::BloodPressure, vec![125.0, 128.0, 124.0, 130.0, 126.0, 122.0, 125.0]);
        assert_eq!(classify(&slight), TrendLabel::SlightlyElevated);

        let high = series(VitalKind::BloodPressure, vec![138.0, 142.0, 136.0]);
        assert_eq!(classify(&high), TrendLabel::Elevated);
    }

    #[test]
    fn respiratory_rate_in_range_is_normal() {
        let s = series(VitalKind::RespiratoryRate, vec![16.0, 15.0, 16.0, 17.0]);
        assert_eq!(classify(&s), TrendLabel::Normal);

        let out = series(VitalKind::RespiratoryRate, vec![24.0, 26.0]);
        assert_eq!(classify(&out), TrendLabel::Unknown);
    }

    #[test]
    fn falling_stress_is_improving() {
        let s = series(VitalKind::Stress, vec![45.0, 60.0, 40.0, 55.0, 35.0, 30.0, 42.0]);
        assert_eq!(classify(&s), TrendLabel::Improving);
    }

    #[test]
    fn high_stress_is_elevated() {
        let s = series(VitalKind::Stress, vec![55.0, 62.0, 68.0, 71.0]);
        assert_eq!(classify(&s), TrendLabel::Elevated);
    }

    #[test]
    fn flat_stress_is_unknown() {
        let s = series(VitalKind::Stress, vec![40.0, 40.0, 40.0, 40.0]);
        assert_eq!(classify(&s), TrendLabel::Unknown);
    }
}
