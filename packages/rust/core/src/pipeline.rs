//! End-to-end site build: input directory → records → pages → output directory.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use tracing::{info, instrument, warn};

use unsloppable_render::Renderer;
use unsloppable_shared::{
    AnalysisRecord, BuildConfig, INDEX_PAGE, Result, SkipStage, SkippedRecord, UnsloppableError,
    company_page_path, ticker_slug,
};

use crate::writer::{RenderedPage, SiteWriter};

/// Lifecycle of a [`SitePipeline`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildState {
    NotStarted,
    Running,
    Completed,
    Failed,
}

/// Result of a successful build.
#[derive(Debug, Clone)]
pub struct BuildReport {
    /// Records that parsed and validated.
    pub records_loaded: usize,
    /// Pages written, index included.
    pub pages_written: usize,
    /// Records dropped during parsing or rendering.
    pub skipped: Vec<SkippedRecord>,
    pub output_dir: PathBuf,
    pub elapsed: Duration,
}

impl BuildReport {
    /// Company pages written (everything but the index).
    pub fn company_pages(&self) -> usize {
        self.pages_written.saturating_sub(1)
    }
}

/// Progress callback for reporting build status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called for each input file as it is loaded.
    fn record_loaded(&self, path: &Path, current: usize, total: usize);
    /// Called after each company page is rendered.
    fn page_rendered(&self, ticker: &str, current: usize, total: usize);
    /// Called when the build completes.
    fn done(&self, report: &BuildReport);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn record_loaded(&self, _path: &Path, _current: usize, _total: usize) {}
    fn page_rendered(&self, _ticker: &str, _current: usize, _total: usize) {}
    fn done(&self, _report: &BuildReport) {}
}

/// One site build. Runs at most once.
#[derive(Debug)]
pub struct SitePipeline {
    config: BuildConfig,
    renderer: Option<Renderer>,
    state: BuildState,
}

impl SitePipeline {
    /// Pipeline using the built-in templates.
    pub fn new(config: BuildConfig) -> Self {
        Self {
            config,
            renderer: None,
            state: BuildState::NotStarted,
        }
    }

    /// Pipeline using an already compiled renderer.
    pub fn with_renderer(config: BuildConfig, renderer: Renderer) -> Self {
        Self {
            config,
            renderer: Some(renderer),
            state: BuildState::NotStarted,
        }
    }

    pub fn state(&self) -> BuildState {
        self.state
    }

    /// Run the build.
    ///
    /// 1. Load records
    /// 2. Check page slugs for collisions
    /// 3. Render company pages (binding failures are skipped)
    /// 4. Render the index from the pages that rendered
    /// 5. Write pages, index, and manifest
    ///
    /// Nothing is written unless at least one company page rendered.
    #[instrument(skip_all, fields(
        input_dir = %self.config.input_dir.display(),
        output_dir = %self.config.output_dir.display()
    ))]
    pub fn run(&mut self, progress: &dyn ProgressReporter) -> Result<BuildReport> {
        if self.state != BuildState::NotStarted {
            return Err(UnsloppableError::validation(format!(
                "pipeline cannot run from state {:?}",
                self.state
            )));
        }

        self.state = BuildState::Running;
        match self.execute(progress) {
            Ok(report) => {
                self.state = BuildState::Completed;
                progress.done(&report);
                Ok(report)
            }
            Err(e) => {
                self.state = BuildState::Failed;
                Err(e)
            }
        }
    }

    fn execute(&mut self, progress: &dyn ProgressReporter) -> Result<BuildReport> {
        let start = Instant::now();
        self.config.validate()?;

        // --- Phase 1: Load ---
        progress.phase("Loading analyses");
        let loaded = unsloppable_loader::load_records_with(
            &self.config.input_dir,
            |path, current, total| progress.record_loaded(path, current, total),
        )?;
        let records_loaded = loaded.records.len();
        let mut skipped = loaded.skipped;

        check_slug_collisions(&loaded.records)?;

        // --- Phase 2: Render company pages ---
        progress.phase("Rendering company pages");
        let renderer = match self.renderer.take() {
            Some(r) => r,
            None => Renderer::new()?,
        };

        let total = loaded.records.len();
        let mut rendered: Vec<&AnalysisRecord> = Vec::with_capacity(total);
        let mut pages: Vec<RenderedPage> = Vec::with_capacity(total + 1);

        for (i, record) in loaded.records.iter().enumerate() {
            match renderer.render_company(record) {
                Ok(html) => {
                    progress.page_rendered(&record.ticker, i + 1, total);
                    pages.push(RenderedPage {
                        path: company_page_path(&record.ticker),
                        ticker: Some(record.ticker.clone()),
                        html,
                    });
                    rendered.push(record);
                }
                Err(e) if e.is_recoverable() => {
                    warn!(ticker = %record.ticker, error = %e, "skipping company page");
                    skipped.push(SkippedRecord {
                        source: record.origin(),
                        stage: SkipStage::Render,
                        reason: e.to_string(),
                    });
                }
                Err(e) => return Err(e),
            }
        }

        if rendered.is_empty() {
            return Err(UnsloppableError::NoUsableRecords {
                input_dir: self.config.input_dir.clone(),
                skipped: skipped.len(),
            });
        }

        // --- Phase 3: Render index ---
        progress.phase("Rendering index");
        let index = RenderedPage {
            path: INDEX_PAGE.to_string(),
            ticker: None,
            html: renderer.render_index(rendered.iter().copied())?,
        };

        // --- Phase 4: Write ---
        progress.phase("Writing site");
        let writer = SiteWriter::new(&self.config.output_dir);
        writer.prepare()?;
        let mut metas = writer.write_pages(&pages)?;
        metas.push(writer.write_page(&index)?);
        let manifest = writer.write_manifest(metas)?;

        let report = BuildReport {
            records_loaded,
            pages_written: manifest.page_count,
            skipped,
            output_dir: self.config.output_dir.clone(),
            elapsed: start.elapsed(),
        };

        info!(
            records = report.records_loaded,
            pages = report.pages_written,
            skipped = report.skipped.len(),
            elapsed_ms = report.elapsed.as_millis() as u64,
            "site build complete"
        );

        Ok(report)
    }
}

/// Run a full build with the built-in templates.
pub fn build_site(config: BuildConfig, progress: &dyn ProgressReporter) -> Result<BuildReport> {
    SitePipeline::new(config).run(progress)
}

/// Fail if two records would be written to the same page.
///
/// Slugs are also checked against the index page name.
pub fn check_slug_collisions(records: &[AnalysisRecord]) -> Result<()> {
    let index_slug = INDEX_PAGE.trim_end_matches(".html");
    let mut seen: BTreeMap<String, &str> = BTreeMap::new();

    for record in records {
        let slug = ticker_slug(&record.ticker);
        if slug == index_slug {
            return Err(UnsloppableError::SlugCollision {
                slug,
                first: INDEX_PAGE.to_string(),
                second: record.ticker.clone(),
            });
        }
        if let Some(first) = seen.get(&slug) {
            return Err(UnsloppableError::SlugCollision {
                slug,
                first: (*first).to_string(),
                second: record.ticker.clone(),
            });
        }
        seen.insert(slug, &record.ticker);
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
