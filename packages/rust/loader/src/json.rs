//! Reader for JSON analysis files.

use std::path::Path;

use unsloppable_shared::{Result, UnsloppableError};

use crate::draft::RecordDraft;

/// Parse a JSON analysis document into a draft record.
pub(crate) fn parse_analysis(content: &str, path: &Path) -> Result<RecordDraft> {
    serde_json::from_str(content)
        .map_err(|e| UnsloppableError::record_parse(path, format!("invalid JSON: {e}")))
}
