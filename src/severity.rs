use serde::Serialize;

use crate::models::DiagnosisResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SeverityBucket {
    None,
    Moderate,
    High,
    Severe,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeverityDisplay {
    pub label: &'static str,
    pub color: &'static str,
    pub background: &'static str,
    pub border: &'static str,
    pub icon: &'static str,
}

impl SeverityBucket {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Moderate => "moderate",
            Self::High => "high",
            Self::Severe => "severe",
            Self::Unknown => "unknown",
        }
    }

    pub fn display(self) -> SeverityDisplay {
        match self {
            Self::None => SeverityDisplay {
                label: "Healthy",
                color: "#00FF87",
                background: "rgba(0,255,135,0.1)",
                border: "rgba(0,255,135,0.35)",
                icon: "CheckCircle",
            },
            Self::Moderate => SeverityDisplay {
                label: "Moderate",
                color: "#fbbf24",
                background: "rgba(251,191,36,0.1)",
                border: "rgba(251,191,36,0.35)",
                icon: "AlertTriangle",
            },
            Self::High => SeverityDisplay {
                label: "High",
                color: "#f97316",
                background: "rgba(249,115,22,0.1)",
                border: "rgba(249,115,22,0.35)",
                icon: "AlertTriangle",
            },
            Self::Severe => SeverityDisplay {
                label: "Severe",
                color: "#f87171",
                background: "rgba(248,113,113,0.1)",
                border: "rgba(248,113,113,0.35)",
                icon: "XCircle",
            },
            Self::Unknown => SeverityDisplay {
                label: "Unknown",
                color: "#94a3b8",
                background: "rgba(148,163,184,0.1)",
                border: "rgba(148,163,184,0.35)",
                icon: "Info",
            },
        }
    }
}

impl std::fmt::Display for SeverityBucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// Tiers are checked in order; a name hitting several tiers takes the first.
pub const SEVERITY_TIERS: &[(SeverityBucket, &[&str])] = &[
    (
        SeverityBucket::Severe,
        &[
            "late blight",
            "virus",
            "greening",
            "esca",
            "panama disease",
            "fusarium wilt",
            "bunchy top",
            "yellow rust",
            "stripe rust",
            "fusarium head blight",
            "berry disease",
            "red rot",
            "blast",
        ],
    ),
    (
        SeverityBucket::High,
        &[
            "blight",
            "rot",
            "rust",
            "sigatoka",
            "smut",
            "wilt",
            "canker",
            "anthracnose",
            "bacterial leaf blight",
            "sheath blight",
        ],
    ),
];

pub fn classify(is_healthy: bool, disease_name: Option<&str>) -> SeverityBucket {
    if is_healthy {
        return SeverityBucket::None;
    }

    let name = disease_name.unwrap_or_default().to_lowercase();
    SEVERITY_TIERS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|keyword| name.contains(keyword)))
        .map(|(bucket, _)| *bucket)
        .unwrap_or(SeverityBucket::Moderate)
}

pub fn severity_key(result: Option<&DiagnosisResult>) -> SeverityBucket {
    match result {
        Some(result) => classify(result.is_healthy, result.disease_name.as_deref()),
        None => SeverityBucket::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(is_healthy: bool, disease_name: Option<&str>) -> DiagnosisResult {
        DiagnosisResult {
            id: None,
            image_url: None,
            disease_name: disease_name.map(str::to_string),
            confidence: Some(0.9),
            crop_type: None,
            recommendations: None,
            is_healthy,
            created_at: None,
            severity: None,
        }
    }

    #[test]
    fn missing_result_is_unknown() {
        assert_eq!(severity_key(None), SeverityBucket::Unknown);
    }

    #[test]
    fn healthy_wins_over_any_name() {
        for name in [None, Some("Tomato Late Blight"), Some("Rice Blast"), Some("")] {
            assert_eq!(severity_key(Some(&result(true, name))), SeverityBucket::None);
        }
    }

    #[test]
    fn severe_tier_checked_before_high_tier() {
        assert_eq!(classify(false, Some("Late Blight")), SeverityBucket::Severe);
        assert_eq!(
            classify(false, Some("Root rot with late blight")),
            SeverityBucket::Severe
        );
        assert_eq!(classify(false, Some("Sugarcane Red Rot")), SeverityBucket::Severe);
    }

    #[test]
    fn high_tier_keywords() {
        assert_eq!(classify(false, Some("Tomato Early Blight")), SeverityBucket::High);
        assert_eq!(classify(false, Some("Mango Anthracnose")), SeverityBucket::High);
        assert_eq!(classify(false, Some("Corn Common Rust")), SeverityBucket::High);
    }

    #[test]
    fn unmatched_or_missing_name_is_moderate() {
        assert_eq!(
            classify(false, Some("Xyz Unknown Disease")),
            SeverityBucket::Moderate
        );
        assert_eq!(classify(false, None), SeverityBucket::Moderate);
    }

    #[test]
    fn matching_is_case_insensitive() {
        assert_eq!(classify(false, Some("RICE BLAST")), SeverityBucket::Severe);
    }

    #[test]
    fn scenario_tomato_late_blight_is_severe() {
        let diagnosis = result(false, Some("Tomato Late Blight"));
        assert_eq!(severity_key(Some(&diagnosis)), SeverityBucket::Severe);
        assert_eq!(severity_key(Some(&diagnosis)).display().label, "Severe");
    }

    #[test]
    fn every_bucket_has_a_display() {
        let unknown = SeverityBucket::Unknown.display();
        assert_eq!(unknown.icon, "Info");
        assert_eq!(SeverityBucket::None.display().color, "#00FF87");
    }
}
