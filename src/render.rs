//! HTML assembly for generated reports. The output is a self-contained
//! document; binary export is the exporter's job.

use std::fmt::Write;

use chrono::{DateTime, Datelike, Utc};

use crate::models::{PeriodSnapshot, ReportType, VitalKind, VitalSignSeries};

const STYLE: &str = r#"
        body { font-family: Arial, sans-serif; line-height: 1.6; color: #333; }
        .container { max-width: 800px; margin: 0 auto; padding: 20px; }
        .header { text-align: center; margin-bottom: 30px; }
        .section { margin-bottom: 30px; }
        .highlight { background-color: #f8f9fa; padding: 15px; border-radius: 5px; margin-bottom: 10px; }
        .recommendation { background-color: #e8f4f8; padding: 15px; border-radius: 5px; margin-bottom: 10px; }
        .chart { background-color: #eee; height: 300px; margin: 20px 0; border-radius: 5px; display: flex; align-items: center; justify-content: center; }
        .footer { text-align: center; margin-top: 50px; font-size: 0.8em; color: #777; }
"#;

pub fn render(
    kind: ReportType,
    generated_at: DateTime<Utc>,
    snapshot: &PeriodSnapshot,
    highlights: &[String],
    recommendations: &[String],
) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "<!DOCTYPE html>");
    let _ = writeln!(out, "<html>");
    let _ = writeln!(out, "<head>");
    let _ = writeln!(out, "    <title>{} Health Report</title>", kind.display_name());
    let _ = writeln!(out, "    <style>{STYLE}    </style>");
    let _ = writeln!(out, "</head>");
    let _ = writeln!(out, "<body>");
    let _ = writeln!(out, "<div class=\"container\">");

    let _ = writeln!(out, "<div class=\"header\">");
    let _ = writeln!(out, "    <h1>{} Health Report</h1>", kind.display_name());
    let _ = writeln!(
        out,
        "    <p>Generated on {}</p>",
        generated_at.format("%B %d, %Y")
    );
    let _ = writeln!(out, "</div>");

    write_health_score(&mut out, snapshot);
    write_highlights(&mut out, highlights);
    write_vital_summary(&mut out, snapshot);
    write_risks(&mut out, snapshot);
    write_recommendations(&mut out, recommendations);
    write_footer(&mut out, generated_at.year());

    let _ = writeln!(out, "</div>");
    let _ = writeln!(out, "</body>");
    let _ = writeln!(out, "</html>");

    out
}

fn write_health_score(out: &mut String, snapshot: &PeriodSnapshot) {
    let delta = snapshot.health_score - snapshot.previous_health_score;
    let comparison = match delta {
        d if d > 0 => format!("{d} points higher than your previous score"),
        d if d < 0 => format!("{} points lower than your previous score", -d),
        _ => "unchanged from your previous score".to_string(),
    };

    let _ = writeln!(out, "<div class=\"section\">");
    let _ = writeln!(out, "    <h2>Health Score</h2>");
    let _ = writeln!(
        out,
        "    <p>Your current health score is <strong>{}</strong>, which is {comparison}.</p>",
        snapshot.health_score
    );
    let _ = writeln!(out, "    <div class=\"chart\">[Health Score Chart Visualization]</div>");
    let _ = writeln!(out, "</div>");
}

fn write_highlights(out: &mut String, highlights: &[String]) {
    let _ = writeln!(out, "<div class=\"section\">");
    let _ = writeln!(out, "    <h2>Highlights</h2>");
    for highlight in highlights {
        let _ = writeln!(out, "    <div class=\"highlight\">&bull; {highlight}</div>");
    }
    let _ = writeln!(out, "</div>");
}

fn write_vital_summary(out: &mut String, snapshot: &PeriodSnapshot) {
    let _ = writeln!(out, "<div class=\"section\">");
    let _ = writeln!(out, "    <h2>Vital Signs Summary</h2>");
    let _ = writeln!(out, "    <div class=\"chart\">[Vital Signs Chart]</div>");
    for kind in VitalKind::ALL {
        if let Some(line) = snapshot.series(kind).and_then(summary_line) {
            let _ = writeln!(out, "    <p>{line}</p>");
        }
    }
    let _ = writeln!(out, "</div>");
}

/// One mean sentence per vital sign; an empty sample window yields no
/// sentence rather than a division by zero.
fn summary_line(series: &VitalSignSeries) -> Option<String> {
    let mean = series.mean()?;
    Some(match series.kind {
        VitalKind::HeartRate => format!("Your heart rate has averaged {mean:.1} bpm."),
        VitalKind::BloodPressure => {
            let diastolic = series.secondary_mean()?;
            format!("Your blood pressure has averaged {mean:.1}/{diastolic:.1} mmHg.")
        }
        VitalKind::RespiratoryRate => {
            format!("Your respiratory rate has averaged {mean:.1} breaths/min.")
        }
        VitalKind::Stress => format!("Your stress level has averaged {mean:.1}."),
    })
}

fn write_risks(out: &mut String, snapshot: &PeriodSnapshot) {
    let _ = writeln!(out, "<div class=\"section\">");
    let _ = writeln!(out, "    <h2>Health Risk Assessment</h2>");
    let _ = writeln!(out, "    <div class=\"chart\">[Risk Assessment Chart]</div>");
    let _ = writeln!(
        out,
        "    <p>Based on your vital signs and health data, we've assessed the following risk factors:</p>"
    );
    let _ = writeln!(out, "    <ul>");
    for (risk, score) in &snapshot.risks {
        let _ = writeln!(
            out,
            "        <li><strong>{}</strong>: {:.1}% risk</li>",
            title_case(risk),
            score * 100.0
        );
    }
    let _ = writeln!(out, "    </ul>");
    let _ = writeln!(out, "</div>");
}

fn write_recommendations(out: &mut String, recommendations: &[String]) {
    let _ = writeln!(out, "<div class=\"section\">");
    let _ = writeln!(out, "    <h2>Recommendations</h2>");
    for recommendation in recommendations {
        let _ = writeln!(
            out,
            "    <div class=\"recommendation\">&bull; {recommendation}</div>"
        );
    }
    let _ = writeln!(out, "</div>");
}

fn write_footer(out: &mut String, year: i32) {
    let _ = writeln!(out, "<div class=\"footer\">");
    let _ = writeln!(
        out,
        "    <p>This report is generated based on your health data and is intended for informational purposes only.</p>"
    );
    let _ = writeln!(
        out,
        "    <p>It is not a substitute for professional medical advice. Please consult with your healthcare provider for medical advice.</p>"
    );
    let _ = writeln!(out, "    <p>&copy; {year} VitalSign Guardian</p>");
    let _ = writeln!(out, "</div>");
}

/// "heart_disease" -> "Heart Disease".
fn title_case(raw: &str) -> String {
    raw.split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
