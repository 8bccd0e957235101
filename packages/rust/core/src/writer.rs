//! Site writer.
//!
//! Takes rendered pages and writes the output directory:
//! ```text
//! <output_dir>/
//! ├── index.html
//! ├── <slug>.html      (one per company)
//! └── manifest.json    (page checksums)
//! ```
//! Every failure here is fatal ([`UnsloppableError::OutputWrite`]).

use std::path::{Path, PathBuf};

use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::{debug, info, instrument};

use unsloppable_shared::{Result, UnsloppableError};

/// Name of the checksum manifest written next to the pages.
pub const MANIFEST_FILE: &str = "manifest.json";

/// A rendered page and its path relative to the output directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPage {
    /// Relative path, e.g. `aapl.html` or `index.html`.
    pub path: String,
    /// Ticker the page belongs to; `None` for the index.
    pub ticker: Option<String>,
    pub html: String,
}

/// Checksum entry for one written page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageMeta {
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ticker: Option<String>,
    pub sha256: String,
    pub size_bytes: usize,
}

/// `manifest.json` contents. No timestamps, so rebuilds stay byte-identical.
#[derive(Debug, Clone, Serialize)]
pub struct SiteManifest {
    pub generator: String,
    pub page_count: usize,
    pub pages: Vec<PageMeta>,
}

/// Writes rendered pages into one output directory.
#[derive(Debug, Clone)]
pub struct SiteWriter {
    output_dir: PathBuf,
}

impl SiteWriter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Create the output directory and clear pages from previous builds.
    ///
    /// Removes top-level `*.html` files, leftover temp files, and the
    /// manifest. Other files (assets, `CNAME`, ...) are left alone.
    #[instrument(skip_all, fields(output_dir = %self.output_dir.display()))]
    pub fn prepare(&self) -> Result<()> {
        std::fs::create_dir_all(&self.output_dir)
            .map_err(|e| UnsloppableError::output_write(&self.output_dir, e))?;

        let entries = std::fs::read_dir(&self.output_dir)
            .map_err(|e| UnsloppableError::output_write(&self.output_dir, e))?;

        let mut removed = 0usize;
        for entry in entries {
            let entry = entry.map_err(|e| UnsloppableError::output_write(&self.output_dir, e))?;
            let path = entry.path();
            if !path.is_file() || !is_generated(&path) {
                continue;
            }
            std::fs::remove_file(&path).map_err(|e| UnsloppableError::output_write(&path, e))?;
            removed += 1;
        }

        debug!(removed, "cleared previous build output");
        Ok(())
    }

    /// Write every page, creating parent directories as needed.
    #[instrument(skip_all, fields(output_dir = %self.output_dir.display(), pages = pages.len()))]
    pub fn write_pages(&self, pages: &[RenderedPage]) -> Result<Vec<PageMeta>> {
        let mut metas = Vec::with_capacity(pages.len());
        for page in pages {
            metas.push(self.write_page(page)?);
        }
        info!(count = metas.len(), "pages written");
        Ok(metas)
    }

    /// Write one page atomically (temp file, then rename).
    pub fn write_page(&self, page: &RenderedPage) -> Result<PageMeta> {
        let target = self.resolve(&page.path)?;

        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| UnsloppableError::output_write(parent, e))?;
        }

        write_atomic(&target, page.html.as_bytes())?;
        debug!(path = %target.display(), size = page.html.len(), "wrote page");

        Ok(PageMeta {
            path: page.path.clone(),
            ticker: page.ticker.clone(),
            sha256: sha256_hex(page.html.as_bytes()),
            size_bytes: page.html.len(),
        })
    }

    /// Write `manifest.json` for the given pages.
    pub fn write_manifest(&self, pages: Vec<PageMeta>) -> Result<SiteManifest> {
        let manifest = SiteManifest {
            generator: concat!("unsloppable/", env!("CARGO_PKG_VERSION")).to_string(),
            page_count: pages.len(),
            pages,
        };

        let json = serde_json::to_string_pretty(&manifest).map_err(|e| {
            UnsloppableError::validation(format!("JSON serialization failed: {e}"))
        })?;

        let path = self.output_dir.join(MANIFEST_FILE);
        write_atomic(&path, json.as_bytes())?;
        debug!(path = %path.display(), "wrote manifest");

        Ok(manifest)
    }

    /// Join a page path onto the output directory, rejecting escapes.
    fn resolve(&self, relative: &str) -> Result<PathBuf> {
        let rel = Path::new(relative);
        let escapes = rel.is_absolute()
            || rel
                .components()
                .any(|c| !matches!(c, std::path::Component::Normal(_)));
        if relative.is_empty() || escapes {
            return Err(UnsloppableError::validation(format!(
                "page path {relative:?} must be relative to the output directory"
            )));
        }
        Ok(self.output_dir.join(rel))
    }
}

/// Files owned by the generator: pages, temp files, and the manifest.
fn is_generated(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    name == MANIFEST_FILE
        || name.ends_with(".html")
        || (name.starts_with('.') && name.ends_with(".tmp"))
}

fn write_atomic(target: &Path, content: &[u8]) -> Result<()> {
    let file_name = target
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("page");
    let temp = target.with_file_name(format!(".{file_name}.tmp"));

    std::fs::write(&temp, content).map_err(|e| UnsloppableError::output_write(&temp, e))?;

    std::fs::rename(&temp, target).map_err(|e| {
        let _ = std::fs::remove_file(&temp);
        UnsloppableError::output_write(target, e)
    })
}

fn sha256_hex(content: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content);
    format!("{:x}", hasher.finalize())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
