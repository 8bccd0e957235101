//! Discovery and parsing of per-company analysis files.
//!
//! The loader turns a directory of `*.md` / `*.json` analyses into
//! [`AnalysisRecord`]s. Files that fail to parse or miss required fields are
//! skipped with a warning; only a missing input directory is fatal.

mod draft;
mod json;
mod markdown;

use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument, warn};

use unsloppable_shared::{AnalysisRecord, Result, SkipStage, SkippedRecord, UnsloppableError};

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// Supported analysis file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Markdown,
    Json,
}

impl InputFormat {
    /// Detect the format from a file extension. `None` means "not an analysis file".
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "md" | "markdown" => Some(Self::Markdown),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Records loaded from the input directory, plus everything that was skipped.
#[derive(Debug, Default)]
pub struct LoadOutcome {
    pub records: Vec<AnalysisRecord>,
    pub skipped: Vec<SkippedRecord>,
}

// ---------------------------------------------------------------------------
// Main entry points
// ---------------------------------------------------------------------------

/// Load every analysis file directly inside `input_dir`.
pub fn load_records(input_dir: &Path) -> Result<LoadOutcome> {
    load_records_with(input_dir, |_, _, _| {})
}

/// Like [`load_records`], calling `on_file(path, current, total)` per file.
#[instrument(skip_all, fields(input_dir = %input_dir.display()))]
pub fn load_records_with(
    input_dir: &Path,
    mut on_file: impl FnMut(&Path, usize, usize),
) -> Result<LoadOutcome> {
    let files = discover_files(input_dir)?;
    let total = files.len();
    let mut outcome = LoadOutcome::default();

    info!(files = total, "discovered analysis files");

    for (i, (path, format)) in files.iter().enumerate() {
        on_file(path, i + 1, total);

        match load_file(path, *format) {
            Ok(record) => {
                debug!(path = %path.display(), ticker = %record.ticker, "loaded record");
                outcome.records.push(record);
            }
            Err(e) if e.is_recoverable() => {
                warn!(path = %path.display(), error = %e, "skipping analysis file");
                outcome.skipped.push(SkippedRecord {
                    source: path.display().to_string(),
                    stage: SkipStage::Parse,
                    reason: e.to_string(),
                });
            }
            Err(e) => return Err(e),
        }
    }

    info!(
        loaded = outcome.records.len(),
        skipped = outcome.skipped.len(),
        "analysis files loaded"
    );

    Ok(outcome)
}

/// List analysis files directly inside `input_dir`, in path order.
///
/// Hidden files, subdirectories, and unknown extensions are ignored.
pub fn discover_files(input_dir: &Path) -> Result<Vec<(PathBuf, InputFormat)>> {
    if !input_dir.is_dir() {
        return Err(UnsloppableError::SourceUnavailable {
            path: input_dir.to_path_buf(),
        });
    }

    let entries = std::fs::read_dir(input_dir).map_err(|_| UnsloppableError::SourceUnavailable {
        path: input_dir.to_path_buf(),
    })?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| UnsloppableError::io(input_dir, e))?;
        let path = entry.path();

        let hidden = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with('.'));
        if hidden || !path.is_file() {
            continue;
        }

        match InputFormat::from_path(&path) {
            Some(format) => files.push((path, format)),
            None => debug!(path = %path.display(), "ignoring non-analysis file"),
        }
    }

    files.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(files)
}

/// Read and parse a single analysis file.
///
/// Every failure is reported as [`UnsloppableError::RecordParse`].
pub fn load_file(path: &Path, format: InputFormat) -> Result<AnalysisRecord> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| UnsloppableError::record_parse(path, format!("unreadable: {e}")))?;

    let draft = match format {
        InputFormat::Markdown => markdown::parse_analysis(&content),
        InputFormat::Json => json::parse_analysis(&content, path)?,
    };

    draft.finish(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    const AAPL_JSON: &str =
        r#"{"ticker": "AAPL", "company_name": "Apple Inc.", "risk_category": "High"}"#;

    fn write(dir: &Path, name: &str, content: &[u8]) {
        std::fs::write(dir.join(name), content).expect("write input");
    }

    #[test]
    fn format_from_extension() {
        assert_eq!(InputFormat::from_path(Path::new("a.md")), Some(InputFormat::Markdown));
        assert_eq!(InputFormat::from_path(Path::new("a.JSON")), Some(InputFormat::Json));
        assert_eq!(InputFormat::from_path(Path::new("a.txt")), None);
        assert_eq!(InputFormat::from_path(Path::new("README")), None);
    }

    #[test]
    fn missing_directory_is_source_unavailable() {
        let tmp = TempDir::new().expect("tempdir");
        let err = load_records(&tmp.path().join("nope")).unwrap_err();
        assert!(matches!(err, UnsloppableError::SourceUnavailable { .. }));
    }

    #[test]
    fn file_instead_of_directory_is_source_unavailable() {
        let tmp = TempDir::new().expect("tempdir");
        write(tmp.path(), "AAPL.json", AAPL_JSON.as_bytes());
        let err = load_records(&tmp.path().join("AAPL.json")).unwrap_err();
        assert!(matches!(err, UnsloppableError::SourceUnavailable { .. }));
    }

    #[test]
    fn valid_and_invalid_files() {
        let tmp = TempDir::new().expect("tempdir");
        write(tmp.path(), "AAPL.json", AAPL_JSON.as_bytes());
        write(tmp.path(), "BAD.json", br#"{"ticker": "BAD"}"#);

        let outcome = load_records(tmp.path()).expect("load");
        assert_eq!(outcome.records.len(), 1);
        assert_eq!(outcome.records[0].ticker, "AAPL");
        assert_eq!(outcome.skipped.len(), 1);
        assert_eq!(outcome.skipped[0].stage, SkipStage::Parse);
        assert!(outcome.skipped[0].source.ends_with("BAD.json"));
        assert!(outcome.skipped[0].reason.contains("risk_category"));
    }

    #[test]
    fn ignores_hidden_unknown_and_nested() {
        let tmp = TempDir::new().expect("tempdir");
        write(tmp.path(), ".draft.json", AAPL_JSON.as_bytes());
        write(tmp.path(), "notes.txt", b"not an analysis");
        std::fs::create_dir(tmp.path().join("nested.md")).expect("mkdir");

        let outcome = load_records(tmp.path()).expect("load");
        assert!(outcome.records.is_empty());
        assert!(outcome.skipped.is_empty());
    }

    #[test]
    fn non_utf8_file_is_skipped() {
        let tmp = TempDir::new().expect("tempdir");
        write(tmp.path(), "AAPL.json", AAPL_JSON.as_bytes());
        write(tmp.path(), "BIN.md", &[0xff, 0xfe, 0x00, 0x41]);

        let outcome = load_records(tmp.path()).expect("load");
        assert_eq!(outcome.records.len(), 1);
        assert_eq!(outcome.skipped.len(), 1);
        assert!(outcome.skipped[0].reason.contains("unreadable"));
    }

    #[test]
    fn progress_callback_sees_every_file() {
        let tmp = TempDir::new().expect("tempdir");
        write(tmp.path(), "A.json", AAPL_JSON.as_bytes());
        write(tmp.path(), "B.json", b"{}");

        let mut seen = Vec::new();
        load_records_with(tmp.path(), |path, current, total| {
            seen.push((path.file_name().unwrap().to_string_lossy().to_string(), current, total));
        })
        .expect("load");
        assert_eq!(
            seen,
            vec![("A.json".to_string(), 1, 2), ("B.json".to_string(), 2, 2)]
        );
    }

    #[test]
    fn loads_fixture_directory() {
        let outcome = load_records(Path::new("../../../fixtures/analyses")).expect("load");
        let mut tickers: Vec<&str> = outcome.records.iter().map(|r| r.ticker.as_str()).collect();
        tickers.sort_unstable();
        assert_eq!(tickers, vec!["AAPL", "NVDA", "UPS"]);
        assert_eq!(outcome.skipped.len(), 2);
    }
}
