use serde::{Serialize, Serializer};
use std::fmt;

/// Risk label derived from a final score, ordered from worst to best.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum RiskLevel {
    VeryHighRisk,
    HighRisk,
    MediumRisk,
    Safe,
    VerySafe,
}

impl RiskLevel {
    pub fn from_score(score: u8) -> Self {
        match score {
            90.. => RiskLevel::VerySafe,
            75..=89 => RiskLevel::Safe,
            60..=74 => RiskLevel::MediumRisk,
            40..=59 => RiskLevel::HighRisk,
            _ => RiskLevel::VeryHighRisk,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RiskLevel::VerySafe => "Very Safe",
            RiskLevel::Safe => "Safe",
            RiskLevel::MediumRisk => "Medium Risk",
            RiskLevel::HighRisk => "High Risk",
            RiskLevel::VeryHighRisk => "Very High Risk",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for RiskLevel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskAssessment {
    pub score: u8,
    pub warnings: Vec<String>,
    pub risk_level: RiskLevel,
}

impl RiskAssessment {
    pub fn joined_warnings(&self) -> String {
        self.warnings.join("; ")
    }
}
