//! Partially-populated record shared by the markdown and JSON readers.

use std::path::Path;

use serde::Deserialize;

use unsloppable_shared::{
    AnalysisRecord, NarrativeSection, Result, RiskProfile, SourceFiling, UnsloppableError,
};

/// Every field optional; [`RecordDraft::finish`] enforces the required set.
///
/// Doubles as the JSON input schema.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct RecordDraft {
    #[serde(default)]
    pub ticker: Option<String>,
    #[serde(default, alias = "name")]
    pub company_name: Option<String>,
    #[serde(default, alias = "final_classification")]
    pub risk_category: Option<String>,
    #[serde(default, alias = "ai_score")]
    pub risk_score: Option<u8>,
    #[serde(default)]
    pub robotics_score: Option<u8>,
    #[serde(default)]
    pub profile: RiskProfile,
    #[serde(default)]
    pub key_insights: Vec<String>,
    #[serde(default)]
    pub narrative_sections: Vec<NarrativeSection>,
    #[serde(default)]
    pub source_filings: Vec<SourceFiling>,
}

impl RecordDraft {
    /// Convert into a validated record, or a [`UnsloppableError::RecordParse`].
    pub fn finish(self, path: &Path) -> Result<AnalysisRecord> {
        let ticker = non_empty(self.ticker);
        let company_name = non_empty(self.company_name);
        let risk_category = non_empty(self.risk_category);

        let missing: Vec<&str> = [
            ("ticker", ticker.is_none()),
            ("company_name", company_name.is_none()),
            ("risk_category", risk_category.is_none()),
        ]
        .into_iter()
        .filter_map(|(name, absent)| absent.then_some(name))
        .collect();

        let (Some(ticker), Some(company_name), Some(risk_category)) =
            (ticker, company_name, risk_category)
        else {
            return Err(UnsloppableError::record_parse(
                path,
                format!("missing required field(s): {}", missing.join(", ")),
            ));
        };

        let record = AnalysisRecord {
            ticker,
            company_name,
            risk_category,
            risk_score: self.risk_score,
            robotics_score: self.robotics_score,
            profile: self.profile,
            key_insights: self.key_insights,
            narrative_sections: self.narrative_sections,
            source_filings: self.source_filings,
            source_path: Some(path.to_path_buf()),
        };

        record
            .validate()
            .map_err(|e| UnsloppableError::record_parse(path, e.to_string()))?;

        Ok(record)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lists_every_missing_field() {
        let draft = RecordDraft {
            ticker: Some("BAD".into()),
            ..Default::default()
        };
        let err = draft.finish(Path::new("BAD.json")).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("company_name, risk_category"), "{msg}");
        assert!(matches!(err, UnsloppableError::RecordParse { .. }));
    }

    #[test]
    fn blank_values_count_as_missing() {
        let draft = RecordDraft {
            ticker: Some("AAPL".into()),
            company_name: Some("Apple".into()),
            risk_category: Some("   ".into()),
            ..Default::default()
        };
        let err = draft.finish(Path::new("AAPL.md")).unwrap_err();
        assert!(err.to_string().contains("risk_category"));
    }

    #[test]
    fn trims_and_records_source() {
        let draft = RecordDraft {
            ticker: Some(" AAPL ".into()),
            company_name: Some("Apple Inc.".into()),
            risk_category: Some("High".into()),
            ..Default::default()
        };
        let record = draft.finish(Path::new("in/AAPL.json")).expect("finish");
        assert_eq!(record.ticker, "AAPL");
        assert_eq!(record.source_path.as_deref(), Some(Path::new("in/AAPL.json")));
    }

    #[test]
    fn validation_failures_become_parse_errors() {
        let draft = RecordDraft {
            ticker: Some("AAPL".into()),
            company_name: Some("Apple".into()),
            risk_category: Some("High".into()),
            risk_score: Some(42),
            ..Default::default()
        };
        let err = draft.finish(Path::new("AAPL.json")).unwrap_err();
        assert!(matches!(err, UnsloppableError::RecordParse { .. }));
        assert!(err.to_string().contains("risk_score 42"));
    }
}
