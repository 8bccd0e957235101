//! HTML rendering for the analysis site.
//!
//! Maps [`AnalysisRecord`]s into template contexts and renders them with
//! Tera. Both templates are compiled into the binary, HTML-escape every
//! substituted value, and fail on any undefined variable.

mod context;
pub mod style;

use tera::{Context, Tera};
use tracing::{debug, instrument};

use unsloppable_shared::{AnalysisRecord, INDEX_PAGE, Result, UnsloppableError};

pub use context::{
    CategoryStat, CompanyView, FilingView, IndexRow, IndexView, SectionView, SiteContext,
};

const INDEX_TEMPLATE: &str = "index.html";
const COMPANY_TEMPLATE: &str = "company.html";

const INDEX_SOURCE: &str = include_str!("../templates/index.html");
const COMPANY_SOURCE: &str = include_str!("../templates/company.html");

/// Compiled site templates.
#[derive(Debug)]
pub struct Renderer {
    tera: Tera,
}

impl Renderer {
    /// Compile the built-in templates.
    pub fn new() -> Result<Self> {
        Self::with_templates(INDEX_SOURCE, COMPANY_SOURCE)
    }

    /// Compile custom index and company template sources.
    pub fn with_templates(index_source: &str, company_source: &str) -> Result<Self> {
        let mut tera = Tera::default();
        tera.autoescape_on(vec![".html"]);
        tera.add_raw_templates(vec![
            (INDEX_TEMPLATE, index_source),
            (COMPANY_TEMPLATE, company_source),
        ])
        .map_err(|e| UnsloppableError::Template(describe(&e)))?;

        Ok(Self { tera })
    }

    /// Render one company page.
    ///
    /// Fails with [`UnsloppableError::TemplateBinding`] for this record only.
    #[instrument(skip_all, fields(ticker = %record.ticker))]
    pub fn render_company(&self, record: &AnalysisRecord) -> Result<String> {
        let mut context = Context::new();
        context.insert("company", &CompanyView::from_record(record));
        context.insert("index_href", INDEX_PAGE);

        let html = self
            .tera
            .render(COMPANY_TEMPLATE, &context)
            .map_err(|e| UnsloppableError::template_binding(&record.ticker, describe(&e)))?;

        debug!(bytes = html.len(), "rendered company page");
        Ok(html)
    }

    /// Render the index listing for `records`, sorted per [`SiteContext`].
    #[instrument(skip_all)]
    pub fn render_index<'a>(
        &self,
        records: impl IntoIterator<Item = &'a AnalysisRecord>,
    ) -> Result<String> {
        let site = SiteContext::new(records);

        let mut context = Context::new();
        context.insert("site", &site.index_view());

        let html = self
            .tera
            .render(INDEX_TEMPLATE, &context)
            .map_err(|e| UnsloppableError::Template(format!("index: {}", describe(&e))))?;

        debug!(rows = site.records().len(), bytes = html.len(), "rendered index page");
        Ok(html)
    }
}

/// Flatten a Tera error and its causes into one line.
fn describe(err: &tera::Error) -> String {
    let mut message = err.to_string();
    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = std::error::Error::source(cause);
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use unsloppable_shared::{NarrativeSection, RiskProfile, SourceFiling};

    fn record(ticker: &str, score: Option<u8>) -> AnalysisRecord {
        AnalysisRecord {
            ticker: ticker.into(),
            company_name: format!("{ticker} Holdings"),
            risk_category: "High".into(),
            risk_score: score,
            robotics_score: Some(8),
            profile: RiskProfile {
                moat_sources: Some("Scale".into()),
                ..Default::default()
            },
            key_insights: vec!["Insight one".into()],
            narrative_sections: vec![NarrativeSection {
                label: "Summary".into(),
                body: "Plain summary.".into(),
            }],
            source_filings: vec![SourceFiling {
                label: "10-K".into(),
                url: Some("https://www.sec.gov/x".into()),
            }],
            source_path: None,
        }
    }

    fn hrefs(html: &str) -> Vec<&str> {
        html.split("href=\"")
            .skip(1)
            .filter_map(|rest| rest.split('"').next())
            .collect()
    }

    #[test]
    fn builtin_templates_compile() {
        assert!(Renderer::new().is_ok());
    }

    #[test]
    fn company_page_has_fields_and_back_link() {
        let renderer = Renderer::new().expect("renderer");
        let html = renderer.render_company(&record("AAPL", Some(4))).expect("render");

        assert!(html.contains("AAPL Holdings"));
        // Autoescape renders `/` as `&#x2F;`.
        assert!(html.contains("4&#x2F;10"));
        assert!(html.contains("8&#x2F;10"));
        assert!(html.contains("Insight one"));
        assert!(html.contains("Plain summary."));
        assert!(html.contains("href=\"index.html\""));
    }

    #[test]
    fn narrative_text_is_escaped() {
        let mut r = record("AAPL", None);
        r.narrative_sections[0].body = "<script>alert(1)</script> & more".into();
        r.company_name = "A<b>B</b>".into();

        let html = Renderer::new().expect("renderer").render_company(&r).expect("render");
        assert!(!html.contains("<script>alert(1)"));
        assert!(html.contains("&lt;script&gt;alert(1)"));
        assert!(html.contains("&amp; more"));
        assert!(!html.contains("<b>B</b>"));
    }

    #[test]
    fn empty_blocks_are_omitted() {
        let mut r = record("AAPL", None);
        r.narrative_sections[0].body = String::new();
        r.key_insights.clear();
        r.source_filings.clear();

        let html = Renderer::new().expect("renderer").render_company(&r).expect("render");
        assert!(!html.contains("Summary"));
        assert!(!html.contains("id=\"insights\""));
        assert!(!html.contains("id=\"filings\""));
    }

    #[test]
    fn non_web_filing_url_is_not_linked() {
        let mut r = record("AAPL", None);
        r.source_filings[0].url = Some("javascript:alert(1)".into());

        let html = Renderer::new().expect("renderer").render_company(&r).expect("render");
        assert!(!html.contains("javascript"));
        assert!(html.contains("10-K"));
    }

    #[test]
    fn index_rows_sorted_and_linked() {
        let records = vec![record("LOW", Some(1)), record("HIGH", Some(9)), record("NA", None)];
        let html = Renderer::new()
            .expect("renderer")
            .render_index(&records)
            .expect("render");

        assert_eq!(hrefs(&html), vec!["high.html", "low.html", "na.html"]);
    }

    #[test]
    fn index_render_is_deterministic() {
        let records = vec![record("B", Some(3)), record("A", Some(3))];
        let renderer = Renderer::new().expect("renderer");
        let first = renderer.render_index(&records).expect("render");
        let second = renderer.render_index(records.iter().rev()).expect("render");
        assert_eq!(first, second);
    }

    #[test]
    fn undefined_variable_is_binding_error() {
        let renderer = Renderer::with_templates(
            "{{ site.total }}",
            "<p>{{ company.nonexistent }}</p>",
        )
        .expect("compile");

        let err = renderer.render_company(&record("AAPL", None)).unwrap_err();
        match err {
            UnsloppableError::TemplateBinding { ticker, message } => {
                assert_eq!(ticker, "AAPL");
                assert!(message.contains("nonexistent"), "{message}");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn invalid_template_syntax_is_fatal() {
        let err = Renderer::with_templates("{% for %}", "").unwrap_err();
        assert!(matches!(err, UnsloppableError::Template(_)));
    }
}
