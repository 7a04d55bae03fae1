use std::fmt::Write;
use std::path::Path;

use crate::knowledge::{DiseaseInfo, LookupOutcome};
use crate::models::{DiagnosisResult, HistoryEntry};
use crate::severity::SeverityBucket;

fn write_list(output: &mut String, heading: &str, items: &[&str]) {
    let _ = writeln!(output);
    let _ = writeln!(output, "## {heading}");
    for item in items {
        let _ = writeln!(output, "- {item}");
    }
}

pub fn build_diagnosis_report(
    result: &DiagnosisResult,
    bucket: SeverityBucket,
    info: &DiseaseInfo,
) -> String {
    let mut output = String::new();
    let disease = result.disease_name.as_deref().unwrap_or("Unknown");
    let crop = result.crop_type.as_deref().unwrap_or("Unknown crop");

    let _ = writeln!(output, "# LeafScan Diagnosis Report");
    let _ = writeln!(output, "{disease} on {crop}");
    if let Some(created_at) = result.created_at {
        let _ = writeln!(output, "Analyzed {}", created_at.format("%B %-d, %Y %H:%M"));
    }
    let _ = writeln!(output);
    let _ = writeln!(output, "## Summary");
    if let Some(confidence) = result.confidence {
        let _ = writeln!(output, "- Confidence: {:.1}%", confidence * 100.0);
    }
    let display = bucket.display();
    let _ = writeln!(output, "- Severity: {} ({})", display.label, display.color);
    if let Some(score) = &result.severity {
        let _ = writeln!(output, "- Severity score: {}/100 ({})", score.score, score.level);
        let _ = writeln!(output, "- Urgency: {}", score.urgency);
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## About");
    let _ = writeln!(output, "{}", info.desc);
    if let LookupOutcome::Matched { key, .. } = info.outcome {
        if !key.eq_ignore_ascii_case(disease) {
            let _ = writeln!(output, "(closest reference entry: {key})");
        }
    }
    let _ = writeln!(output);
    let _ = writeln!(output, "## How It Spreads");
    let _ = writeln!(output, "{}", info.spread);

    write_list(&mut output, "Organic Treatment", info.organic);
    write_list(&mut output, "Chemical Treatment", info.chemical);
    write_list(&mut output, "Prevention", info.prevention);

    if let Some(notes) = result.recommendations.as_deref().filter(|n| !n.trim().is_empty()) {
        let _ = writeln!(output);
        let _ = writeln!(output, "## Model Notes");
        let _ = writeln!(output, "{}", notes.trim());
    }

    output
}

pub fn export_history_csv(entries: &[&HistoryEntry], path: &Path) -> anyhow::Result<usize> {
    let mut writer = csv::Writer::from_path(path)?;
    for entry in entries {
        writer.serialize(entry)?;
    }
    writer.flush()?;
    Ok(entries.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::knowledge::lookup;
    use crate::models::SeverityScore;
    use crate::severity::severity_key;
    use chrono::NaiveDate;

    fn late_blight() -> DiagnosisResult {
        DiagnosisResult {
            id: Some(12),
            image_url: Some("/uploads/diagnosis/a.jpg".to_string()),
            disease_name: Some("Tomato Late Blight".to_string()),
            confidence: Some(0.934),
            crop_type: Some("Tomato".to_string()),
            recommendations: None,
            is_healthy: false,
            created_at: NaiveDate::from_ymd_opt(2026, 10, 18).and_then(|d| d.and_hms_opt(9, 5, 0)),
            severity: Some(SeverityScore {
                score: 88,
                level: "Critical".to_string(),
                color: "#f87171".to_string(),
                urgency: "CRITICAL — Immediate action required today".to_string(),
                description: "Severe infection.".to_string(),
            }),
        }
    }

    #[test]
    fn report_combines_severity_and_knowledge() {
        let result = late_blight();
        let info = lookup(result.disease_name.as_deref());
        let report = build_diagnosis_report(&result, severity_key(Some(&result)), &info);

        assert!(report.starts_with("# LeafScan Diagnosis Report\nTomato Late Blight on Tomato"));
        assert!(report.contains("Analyzed October 18, 2026 09:05"));
        assert!(report.contains("- Confidence: 93.4%"));
        assert!(report.contains("- Severity: Severe (#f87171)"));
        assert!(report.contains("- Severity score: 88/100 (Critical)"));
        assert!(report.contains("Caused by Phytophthora infestans"));
        assert!(report.contains("## Prevention\n- Use certified disease-free transplants"));
        assert!(!report.contains("closest reference entry"));
        assert!(!report.contains("## Model Notes"));
    }

    #[test]
    fn report_notes_approximate_reference_match() {
        let mut result = late_blight();
        result.disease_name = Some("Tomato Mosaic Virus".to_string());
        result.severity = None;
        let info = lookup(result.disease_name.as_deref());
        let report = build_diagnosis_report(&result, severity_key(Some(&result)), &info);

        assert!(report.contains("(closest reference entry: Tomato Late Blight)"));
        assert!(!report.contains("Severity score"));
    }

    #[test]
    fn exports_history_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.csv");
        let entry = HistoryEntry {
            id: 4,
            query: "Diagnosis: Rice Blast".to_string(),
            result_type: Some("diagnosis".to_string()),
            result_summary: Some("Rice — Rice Blast (91.0% confidence)".to_string()),
            image_url: None,
            created_at: NaiveDate::from_ymd_opt(2026, 10, 1)
                .and_then(|d| d.and_hms_opt(7, 0, 0))
                .unwrap(),
        };

        let written = export_history_csv(&[&entry], &path).unwrap();
        assert_eq!(written, 1);

        let contents = std::fs::read_to_string(&path).unwrap();
        let mut lines = contents.lines();
        assert_eq!(
            lines.next(),
            Some("id,query,result_type,result_summary,image_url,created_at")
        );
        assert!(lines.next().unwrap().starts_with("4,Diagnosis: Rice Blast,diagnosis,"));
    }
}
