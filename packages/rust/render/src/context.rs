//! Template contexts: records mapped into display-ready views.
//!
//! Views hold only strings, numbers, and lists so templates never see a
//! `null` where they expect text.

use serde::Serialize;

use unsloppable_shared::{AnalysisRecord, company_page_path};

use crate::style::{
    OTHER_CATEGORY_KEY, category_style, known_categories, macro_risk_class, macro_risk_headline,
    score_class, score_display,
};

/// Characters of moat text shown on an index card.
const MOAT_PREVIEW_CHARS: usize = 100;

// ---------------------------------------------------------------------------
// SiteContext
// ---------------------------------------------------------------------------

/// The ordered record set behind the index page.
///
/// Sorted by descending `risk_score` (unscored last), then ticker.
#[derive(Debug)]
pub struct SiteContext<'a> {
    records: Vec<&'a AnalysisRecord>,
}

impl<'a> SiteContext<'a> {
    pub fn new(records: impl IntoIterator<Item = &'a AnalysisRecord>) -> Self {
        let mut records: Vec<&AnalysisRecord> = records.into_iter().collect();
        records.sort_by(|a, b| {
            b.risk_score
                .cmp(&a.risk_score)
                .then_with(|| a.ticker.cmp(&b.ticker))
        });
        Self { records }
    }

    pub fn records(&self) -> &[&'a AnalysisRecord] {
        &self.records
    }

    /// Build the index template context.
    pub fn index_view(&self) -> IndexView {
        let rows: Vec<IndexRow> = self.records.iter().map(|r| IndexRow::from_record(r)).collect();

        let mut stats: Vec<CategoryStat> = known_categories()
            .map(|(key, label)| CategoryStat {
                key,
                label: label.to_string(),
                count: rows.iter().filter(|r| r.category_key == key).count(),
            })
            .collect();

        let other = rows
            .iter()
            .filter(|r| r.category_key == OTHER_CATEGORY_KEY)
            .count();
        if other > 0 {
            stats.push(CategoryStat {
                key: OTHER_CATEGORY_KEY,
                label: "Other".to_string(),
                count: other,
            });
        }

        IndexView {
            total: rows.len(),
            stats,
            rows,
        }
    }
}

// ---------------------------------------------------------------------------
// Index views
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct IndexView {
    pub total: usize,
    pub stats: Vec<CategoryStat>,
    pub rows: Vec<IndexRow>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryStat {
    pub key: &'static str,
    pub label: String,
    pub count: usize,
}

/// One company card on the index.
#[derive(Debug, Clone, Serialize)]
pub struct IndexRow {
    pub ticker: String,
    pub company_name: String,
    /// Relative link to the company page.
    pub href: String,
    pub category: String,
    pub category_key: &'static str,
    pub category_label: String,
    pub badge_class: &'static str,
    pub ai_score: String,
    pub ai_score_class: &'static str,
    pub robotics_score: String,
    pub robotics_score_class: &'static str,
    pub moat_preview: String,
}

impl IndexRow {
    pub fn from_record(record: &AnalysisRecord) -> Self {
        let style = category_style(&record.risk_category);
        Self {
            ticker: record.ticker.clone(),
            company_name: record.company_name.clone(),
            href: company_page_path(&record.ticker),
            category: record.risk_category.clone(),
            category_key: style.key,
            category_label: style.label,
            badge_class: style.badge_class,
            ai_score: score_display(record.risk_score),
            ai_score_class: score_class(record.risk_score),
            robotics_score: score_display(record.robotics_score),
            robotics_score_class: score_class(record.robotics_score),
            moat_preview: preview(record.profile.moat_sources.as_deref().unwrap_or_default()),
        }
    }
}

fn preview(text: &str) -> String {
    let text = text.trim();
    let mut chars = text.char_indices();
    match chars.nth(MOAT_PREVIEW_CHARS) {
        Some((cut, _)) => format!("{}...", text[..cut].trim_end()),
        None => text.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Company views
// ---------------------------------------------------------------------------

/// Context for one company page.
#[derive(Debug, Clone, Serialize)]
pub struct CompanyView {
    pub ticker: String,
    pub company_name: String,
    pub category: String,
    pub badge_class: &'static str,
    pub ai_score: String,
    pub ai_score_class: &'static str,
    pub robotics_score: String,
    pub robotics_score_class: &'static str,
    pub value_chain: String,
    pub macro_risk: String,
    pub macro_risk_class: &'static str,
    pub ai_beneficiary: String,
    pub robotics_beneficiary: String,
    pub moat_sources: String,
    pub key_insights: Vec<String>,
    pub sections: Vec<SectionView>,
    pub filings: Vec<FilingView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SectionView {
    pub label: String,
    pub paragraphs: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FilingView {
    pub label: String,
    pub url: Option<String>,
}

impl CompanyView {
    pub fn from_record(record: &AnalysisRecord) -> Self {
        let style = category_style(&record.risk_category);
        let profile = &record.profile;
        let macro_risk = profile.macro_risk.as_deref().unwrap_or_default();

        Self {
            ticker: record.ticker.clone(),
            company_name: record.company_name.clone(),
            category: record.risk_category.clone(),
            badge_class: style.badge_class,
            ai_score: score_display(record.risk_score),
            ai_score_class: score_class(record.risk_score),
            robotics_score: score_display(record.robotics_score),
            robotics_score_class: score_class(record.robotics_score),
            value_chain: or_placeholder(profile.value_chain.as_deref(), "Unknown"),
            macro_risk: or_placeholder(Some(macro_risk_headline(macro_risk)), "Unknown"),
            macro_risk_class: macro_risk_class(macro_risk),
            ai_beneficiary: or_placeholder(profile.ai_beneficiary.as_deref(), "N/A"),
            robotics_beneficiary: or_placeholder(profile.robotics_beneficiary.as_deref(), "N/A"),
            moat_sources: or_placeholder(profile.moat_sources.as_deref(), "N/A"),
            key_insights: record
                .key_insights
                .iter()
                .map(|i| i.trim())
                .filter(|i| !i.is_empty())
                .map(String::from)
                .collect(),
            sections: record
                .narrative_sections
                .iter()
                .filter_map(|s| {
                    let paragraphs: Vec<String> =
                        s.paragraphs().into_iter().map(String::from).collect();
                    (!paragraphs.is_empty()).then(|| SectionView {
                        label: s.label.clone(),
                        paragraphs,
                    })
                })
                .collect(),
            filings: record
                .source_filings
                .iter()
                .map(|f| FilingView {
                    label: f.label.clone(),
                    url: f.url.as_deref().and_then(web_url),
                })
                .collect(),
        }
    }
}

/// Keep only `http(s)` links; anything else renders as a plain label.
fn web_url(url: &str) -> Option<String> {
    let url = url.trim();
    let lower = url.to_ascii_lowercase();
    (lower.starts_with("https://") || lower.starts_with("http://")).then(|| url.to_string())
}

fn or_placeholder(value: Option<&str>, placeholder: &str) -> String {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => placeholder.to_string(),
    }
}
