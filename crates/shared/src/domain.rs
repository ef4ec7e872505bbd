use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            Copy,
            Default,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            Serialize,
            Deserialize,
        )]
        pub struct $name(pub u64);
    };
}

// Identifies one submission; completions carrying any other ticket are stale.
id_newtype!(RequestTicket);

impl RequestTicket {
    pub fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

/// Visual severity class derived from the free-form `risk_level` string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskSeverity {
    Low,
    Moderate,
    High,
    Unknown,
}

impl RiskSeverity {
    /// Case-insensitive; absent or blank labels fall back to `Unknown`.
    pub fn from_label(label: Option<&str>) -> Self {
        let Some(label) = label.map(str::trim).filter(|label| !label.is_empty()) else {
            return Self::Unknown;
        };
        match label.to_ascii_lowercase().as_str() {
            "low" | "minimal" => Self::Low,
            "medium" | "moderate" => Self::Moderate,
            "high" | "severe" | "critical" => Self::High,
            _ => Self::Unknown,
        }
    }

    pub fn css_class(self) -> &'static str {
        match self {
            Self::Low => "risk-low",
            Self::Moderate => "risk-moderate",
            Self::High => "risk-high",
            Self::Unknown => "risk-unknown",
        }
    }
}
