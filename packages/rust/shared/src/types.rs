//! Core domain types for disruption-risk analyses.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{Result, UnsloppableError};
use crate::slug::ticker_slug;

/// Upper bound of the 0–10 vulnerability scale.
pub const MAX_SCORE: u8 = 10;

// ---------------------------------------------------------------------------
// AnalysisRecord
// ---------------------------------------------------------------------------

/// One company's disruption-risk analysis, the unit of rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisRecord {
    /// Short unique identifier (primary key within a build).
    pub ticker: String,
    /// Display name.
    pub company_name: String,
    /// Final classification, e.g. `Unsloppable + Beneficiary`.
    pub risk_category: String,
    /// AI software vulnerability score (0–10).
    #[serde(default)]
    pub risk_score: Option<u8>,
    /// Robotics vulnerability score (0–10).
    #[serde(default)]
    pub robotics_score: Option<u8>,
    /// Labelled attributes from the analysis overview.
    #[serde(default)]
    pub profile: RiskProfile,
    /// Short bullet-point takeaways.
    #[serde(default)]
    pub key_insights: Vec<String>,
    /// Ordered labelled text blocks.
    #[serde(default)]
    pub narrative_sections: Vec<NarrativeSection>,
    /// SEC filings the analysis was derived from.
    #[serde(default)]
    pub source_filings: Vec<SourceFiling>,
    /// Input file this record was loaded from.
    #[serde(skip)]
    pub source_path: Option<PathBuf>,
}

impl AnalysisRecord {
    /// Check the invariants every loaded record must satisfy.
    pub fn validate(&self) -> Result<()> {
        if self.ticker.trim().is_empty() {
            return Err(UnsloppableError::validation("ticker is empty"));
        }
        if ticker_slug(&self.ticker).is_empty() {
            return Err(UnsloppableError::validation(format!(
                "ticker {:?} has no filesystem-safe characters",
                self.ticker
            )));
        }
        if self.company_name.trim().is_empty() {
            return Err(UnsloppableError::validation("company_name is empty"));
        }
        if self.risk_category.trim().is_empty() {
            return Err(UnsloppableError::validation("risk_category is empty"));
        }
        for (name, score) in [
            ("risk_score", self.risk_score),
            ("robotics_score", self.robotics_score),
        ] {
            if let Some(value) = score {
                if value > MAX_SCORE {
                    return Err(UnsloppableError::validation(format!(
                        "{name} {value} is outside 0..={MAX_SCORE}"
                    )));
                }
            }
        }
        Ok(())
    }

    /// Human-readable origin for log lines: the source file or the ticker.
    pub fn origin(&self) -> String {
        self.source_path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| self.ticker.clone())
    }
}

/// Overview attributes that accompany the scores.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskProfile {
    #[serde(default)]
    pub ai_beneficiary: Option<String>,
    #[serde(default)]
    pub robotics_beneficiary: Option<String>,
    /// Value-chain position.
    #[serde(default)]
    pub value_chain: Option<String>,
    /// Macro contagion risk, e.g. `Low - diversified demand`.
    #[serde(default)]
    pub macro_risk: Option<String>,
    #[serde(default)]
    pub moat_sources: Option<String>,
}

/// A labelled block of narrative text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NarrativeSection {
    pub label: String,
    /// Paragraphs separated by blank lines.
    #[serde(default)]
    pub body: String,
}

impl NarrativeSection {
    /// Non-empty paragraphs of the body, trimmed.
    pub fn paragraphs(&self) -> Vec<&str> {
        self.body
            .split("\n\n")
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .collect()
    }
}

// ---------------------------------------------------------------------------
// SourceFiling
// ---------------------------------------------------------------------------

/// Reference to an SEC filing used by the analysis.
///
/// Deserializes from either a bare string or `{ "label": .., "url": .. }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "FilingRepr")]
pub struct SourceFiling {
    pub label: String,
    pub url: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum FilingRepr {
    Label(String),
    Full {
        label: String,
        #[serde(default)]
        url: Option<String>,
    },
}

impl From<FilingRepr> for SourceFiling {
    fn from(repr: FilingRepr) -> Self {
        match repr {
            FilingRepr::Label(label) => Self { label, url: None },
            FilingRepr::Full { label, url } => Self { label, url },
        }
    }
}

// ---------------------------------------------------------------------------
// Skipped records
// ---------------------------------------------------------------------------

/// Pipeline stage at which a record was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipStage {
    Parse,
    Render,
}

impl std::fmt::Display for SkipStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parse => f.write_str("parse"),
            Self::Render => f.write_str("render"),
        }
    }
}

/// A record dropped from the build, kept for the end-of-run summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedRecord {
    /// Input file path or ticker.
    pub source: String,
    pub stage: SkipStage,
    pub reason: String,
}
