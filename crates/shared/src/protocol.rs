use serde::{Deserialize, Serialize};

use crate::domain::RiskSeverity;

/// Classification returned by `POST /upload` on success.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "AnalysisResponseWire")]
pub struct AnalysisResult {
    pub tumor_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_level: Option<String>,
    pub probability: f64,
    #[serde(default)]
    pub processed_images: Vec<String>,
}

impl AnalysisResult {
    pub fn severity(&self) -> RiskSeverity {
        RiskSeverity::from_label(self.risk_level.as_deref())
    }

    pub fn risk_label(&self) -> &str {
        self.risk_level
            .as_deref()
            .map(str::trim)
            .filter(|label| !label.is_empty())
            .unwrap_or("Unknown")
    }

    pub fn probability_label(&self) -> String {
        format!("{}%", self.probability)
    }
}

// Older backends answer with a single absolute `processed_image` URL.
#[derive(Debug, Deserialize)]
struct AnalysisResponseWire {
    tumor_type: String,
    #[serde(default)]
    risk_level: Option<String>,
    probability: f64,
    #[serde(default)]
    processed_images: Option<Vec<String>>,
    #[serde(default)]
    processed_image: Option<String>,
}

impl From<AnalysisResponseWire> for AnalysisResult {
    fn from(wire: AnalysisResponseWire) -> Self {
        let processed_images = match (wire.processed_images, wire.processed_image) {
            (Some(images), _) => images,
            (None, Some(single)) => vec![single],
            (None, None) => Vec::new(),
        };
        Self {
            tumor_type: wire.tumor_type,
            risk_level: wire.risk_level,
            probability: wire.probability,
            processed_images,
        }
    }
}

/// Error body sent with non-2xx responses, when the service sends JSON at all.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceErrorBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}
