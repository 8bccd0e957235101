//! Reader for the markdown analysis format produced upstream.
//!
//! Layout:
//! - `# Company Name (TICKER)` title
//! - `- **Key**: value` lines for the scores and classification
//! - `## Moat Sources`, `## Key Insights`, `## Sources` with dedicated fields
//! - any other `##`/`###` section becomes a narrative section

use std::sync::LazyLock;

use regex::Regex;

use unsloppable_shared::{NarrativeSection, SourceFiling};

use crate::draft::RecordDraft;

// ---------------------------------------------------------------------------
// Regex patterns (compiled once)
// ---------------------------------------------------------------------------

/// Matches `# Company Name (TICKER)`.
static TITLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^#\s+([^(]+?)\s+\(([^)]+)\)").expect("title regex")
});

/// Matches `## Heading` through `###### Heading`.
static SUBHEADING_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^#{2,6}\s+(.+?)\s*#*$").expect("subheading regex")
});

/// Matches `[Label](url)` with optional trailing notes.
static LINK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\[([^\]]+)\]\(([^)\s]+)\)(?:\s*[:\-]?\s*(.+))?$").expect("link regex")
});

/// First run of digits in a score value (`7/10` → `7`).
static DIGITS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").expect("digits regex"));

// ---------------------------------------------------------------------------
// Section kinds
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
enum Block {
    /// Text before the first subheading, or directly under an H1.
    Preamble,
    MoatSources,
    KeyInsights,
    Sources,
    Narrative(String),
}

impl Block {
    fn from_heading(label: &str) -> Self {
        match label.to_lowercase().as_str() {
            "moat sources" => Self::MoatSources,
            "key insights" => Self::KeyInsights,
            "sources" | "source filings" | "sec filings" | "filings" => Self::Sources,
            _ => Self::Narrative(label.to_string()),
        }
    }
}

/// Overview keys mapped onto draft fields.
#[derive(Debug, Clone, Copy)]
enum OverviewKey {
    AiScore,
    RoboticsScore,
    AiBeneficiary,
    RoboticsBeneficiary,
    ValueChain,
    FinalClassification,
    MacroRisk,
}

impl OverviewKey {
    fn parse(key: &str) -> Option<Self> {
        let key = key.to_lowercase();
        Some(match key.as_str() {
            "ai software vulnerability score" => Self::AiScore,
            "robotics vulnerability score" => Self::RoboticsScore,
            "ai beneficiary" => Self::AiBeneficiary,
            "robotics beneficiary" => Self::RoboticsBeneficiary,
            "value chain position" => Self::ValueChain,
            "final classification" => Self::FinalClassification,
            "macro contagion risk" => Self::MacroRisk,
            _ => return None,
        })
    }

    fn apply(self, value: &str, draft: &mut RecordDraft) {
        let text = (!value.is_empty()).then(|| value.to_string());
        match self {
            Self::AiScore => draft.risk_score = parse_score(value),
            Self::RoboticsScore => draft.robotics_score = parse_score(value),
            Self::AiBeneficiary => draft.profile.ai_beneficiary = text,
            Self::RoboticsBeneficiary => draft.profile.robotics_beneficiary = text,
            Self::ValueChain => draft.profile.value_chain = text,
            Self::FinalClassification => draft.risk_category = text,
            Self::MacroRisk => draft.profile.macro_risk = text,
        }
    }
}

// ---------------------------------------------------------------------------
// Parser
// ---------------------------------------------------------------------------

/// Parse a markdown analysis document into a draft record.
pub(crate) fn parse_analysis(content: &str) -> RecordDraft {
    let mut draft = RecordDraft::default();
    let mut block = Block::Preamble;
    let mut buffer: Vec<&str> = Vec::new();
    let mut moat_parts: Vec<String> = Vec::new();

    for raw in content.lines() {
        let line = raw.trim();

        if line.starts_with("# ") || line == "#" {
            if draft.ticker.is_none() {
                if let Some(caps) = TITLE_RE.captures(line) {
                    draft.company_name = Some(caps[1].trim().to_string());
                    draft.ticker = Some(caps[2].trim().to_string());
                }
            }
            flush(&block, &buffer, &mut draft, &mut moat_parts);
            buffer.clear();
            block = Block::Preamble;
            continue;
        }

        if let Some(caps) = SUBHEADING_RE.captures(line) {
            flush(&block, &buffer, &mut draft, &mut moat_parts);
            buffer.clear();
            block = Block::from_heading(caps[1].trim());
            continue;
        }

        if let Some((key, value)) = split_key_value(line) {
            if let Some(known) = OverviewKey::parse(key) {
                known.apply(value, &mut draft);
                continue;
            }
        }

        buffer.push(line);
    }
    flush(&block, &buffer, &mut draft, &mut moat_parts);

    if !moat_parts.is_empty() {
        draft.profile.moat_sources = Some(moat_parts.join(" "));
    }

    draft
}

/// Move the buffered lines of a finished block into the draft.
fn flush(block: &Block, lines: &[&str], draft: &mut RecordDraft, moat_parts: &mut Vec<String>) {
    match block {
        Block::Preamble => {}
        Block::MoatSources => {
            moat_parts.extend(
                lines
                    .iter()
                    .filter(|l| !l.is_empty())
                    .map(|l| strip_bullet(l).unwrap_or(*l).to_string()),
            );
        }
        Block::KeyInsights => {
            draft.key_insights.extend(
                lines
                    .iter()
                    .filter_map(|l| strip_bullet(l))
                    .filter(|l| !l.is_empty())
                    .map(String::from),
            );
        }
        Block::Sources => {
            draft
                .source_filings
                .extend(lines.iter().filter_map(|l| parse_filing(l)));
        }
        Block::Narrative(label) => {
            let body = paragraphs(lines);
            if !body.is_empty() {
                draft.narrative_sections.push(NarrativeSection {
                    label: label.clone(),
                    body,
                });
            }
        }
    }
}

/// Join wrapped lines into paragraphs separated by blank lines.
///
/// Each bullet item becomes its own paragraph.
fn paragraphs(lines: &[&str]) -> String {
    let mut out: Vec<String> = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for &line in lines {
        if line.is_empty() {
            if !current.is_empty() {
                out.push(current.join(" "));
                current.clear();
            }
        } else if let Some(item) = strip_bullet(line) {
            if !current.is_empty() {
                out.push(current.join(" "));
                current.clear();
            }
            if !item.is_empty() {
                out.push(item.to_string());
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        out.push(current.join(" "));
    }

    out.join("\n\n")
}

/// Split `- **Key**: value` into `("Key", "value")`.
fn split_key_value(line: &str) -> Option<(&str, &str)> {
    let (key, value) = line.split_once(':')?;
    let key = key
        .trim()
        .trim_end_matches('*')
        .trim_matches(|c: char| c == '-' || c == '*' || c == ' ');
    let value = value.trim().trim_start_matches('*').trim();
    if key.is_empty() {
        return None;
    }
    Some((key, value))
}

fn strip_bullet(line: &str) -> Option<&str> {
    line.strip_prefix("- ")
        .or_else(|| line.strip_prefix("* "))
        .map(str::trim)
}

fn parse_score(value: &str) -> Option<u8> {
    let digits = DIGITS_RE.find(value)?;
    // Oversized values saturate so validation reports them instead of dropping them.
    let n: u64 = digits.as_str().parse().unwrap_or(u64::MAX);
    Some(u8::try_from(n).unwrap_or(u8::MAX))
}

fn parse_filing(line: &str) -> Option<SourceFiling> {
    let item = strip_bullet(line)?;
    if item.is_empty() {
        return None;
    }

    if let Some(caps) = LINK_RE.captures(item) {
        let label = caps[1].trim();
        let label = match caps.get(3) {
            Some(notes) => format!("{label} ({})", notes.as_str().trim()),
            None => label.to_string(),
        };
        return Some(SourceFiling {
            label,
            url: Some(caps[2].to_string()),
        });
    }

    Some(SourceFiling {
        label: item.to_string(),
        url: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SAMPLE: &str = "\
# Apple Inc. (AAPL)

## Overview
- **AI Software Vulnerability Score**: 4/10
- **Robotics Vulnerability Score**: 2/10
- **AI Beneficiary**: Yes - on-device inference
- **Final Classification**: Unsloppable + Beneficiary
- **Macro Contagion Risk**: Low - diversified demand

## Moat Sources
Ecosystem lock-in
and custom silicon.

## Key Insights
- Services grow with the installed base.
- Hardware margins are defended by vertical integration.

## Pressure Test
Could agents bypass the App Store?
Unlikely in the near term.

- Distribution is owned.

## Sources
- [10-K 2024](https://www.sec.gov/aapl-10k): annual report
- 10-Q Q1 2025
";

    #[test]
    fn parses_title_and_overview() {
        let draft = parse_analysis(SAMPLE);
        assert_eq!(draft.ticker.as_deref(), Some("AAPL"));
        assert_eq!(draft.company_name.as_deref(), Some("Apple Inc."));
        assert_eq!(draft.risk_category.as_deref(), Some("Unsloppable + Beneficiary"));
        assert_eq!(draft.risk_score, Some(4));
        assert_eq!(draft.robotics_score, Some(2));
        assert_eq!(
            draft.profile.ai_beneficiary.as_deref(),
            Some("Yes - on-device inference")
        );
        assert_eq!(
            draft.profile.macro_risk.as_deref(),
            Some("Low - diversified demand")
        );
        assert!(draft.profile.value_chain.is_none());
    }

    #[test]
    fn parses_moat_and_insights() {
        let draft = parse_analysis(SAMPLE);
        assert_eq!(
            draft.profile.moat_sources.as_deref(),
            Some("Ecosystem lock-in and custom silicon.")
        );
        assert_eq!(
            draft.key_insights,
            vec![
                "Services grow with the installed base.".to_string(),
                "Hardware margins are defended by vertical integration.".to_string(),
            ]
        );
    }

    #[test]
    fn overview_key_values_are_not_narrative() {
        let draft = parse_analysis(SAMPLE);
        let labels: Vec<&str> = draft
            .narrative_sections
            .iter()
            .map(|s| s.label.as_str())
            .collect();
        assert_eq!(labels, vec!["Pressure Test"]);
    }

    #[test]
    fn narrative_paragraphs_and_bullets() {
        let draft = parse_analysis(SAMPLE);
        assert_eq!(
            draft.narrative_sections[0].body,
            "Could agents bypass the App Store? Unlikely in the near term.\n\nDistribution is owned."
        );
    }

    #[test]
    fn parses_source_filings() {
        let draft = parse_analysis(SAMPLE);
        assert_eq!(
            draft.source_filings,
            vec![
                SourceFiling {
                    label: "10-K 2024 (annual report)".into(),
                    url: Some("https://www.sec.gov/aapl-10k".into()),
                },
                SourceFiling {
                    label: "10-Q Q1 2025".into(),
                    url: None,
                },
            ]
        );
    }

    #[test]
    fn missing_classification_leaves_category_empty() {
        let draft = parse_analysis("# Foo Corp (FOO)\n\n## Overview\n- **AI Beneficiary**: No\n");
        assert_eq!(draft.ticker.as_deref(), Some("FOO"));
        assert!(draft.risk_category.is_none());
    }

    #[test]
    fn title_without_ticker_is_ignored() {
        let draft = parse_analysis("# Just A Heading\n\nFinal Classification: High\n");
        assert!(draft.ticker.is_none());
        assert_eq!(draft.risk_category.as_deref(), Some("High"));
    }

    #[test]
    fn unknown_keys_stay_in_narrative() {
        let draft = parse_analysis("# A (A)\n\n## Notes\nNote: this is prose.\n");
        assert_eq!(draft.narrative_sections[0].body, "Note: this is prose.");
    }

    #[test]
    fn key_with_bold_colon_inside() {
        let draft = parse_analysis("# A (A)\n- **Value Chain Position:** Supplier\n");
        assert_eq!(draft.profile.value_chain.as_deref(), Some("Supplier"));
    }

    #[test]
    fn oversized_score_saturates() {
        let draft = parse_analysis("# A (A)\n- AI Software Vulnerability Score: 400\n");
        assert_eq!(draft.risk_score, Some(u8::MAX));
    }

    #[test]
    fn empty_sections_are_dropped() {
        let draft = parse_analysis("# A (A)\n\n## Empty\n\n## Also Empty\n");
        assert!(draft.narrative_sections.is_empty());
    }

    #[test]
    fn parses_fixture() {
        let content = std::fs::read_to_string("../../../fixtures/analyses/NVDA.md")
            .expect("read fixture");
        let draft = parse_analysis(&content);
        assert_eq!(draft.ticker.as_deref(), Some("NVDA"));
        assert_eq!(draft.risk_category.as_deref(), Some("Unsloppable + Beneficiary"));
        assert_eq!(draft.risk_score, Some(2));
        assert_eq!(draft.key_insights.len(), 3);
        assert_eq!(draft.source_filings.len(), 2);
    }
}
