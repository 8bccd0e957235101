//! Shared types, error model, and configuration for Unsloppable.
//!
//! This crate is the foundation depended on by all other Unsloppable crates.
//! It provides:
//! - [`UnsloppableError`]: the unified error type
//! - Domain types ([`AnalysisRecord`], [`NarrativeSection`], [`SourceFiling`])
//! - The single ticker → filename mapping ([`ticker_slug`], [`company_page_path`])
//! - Configuration ([`AppConfig`], [`BuildConfig`], config loading)

pub mod config;
pub mod error;
pub mod slug;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, BuildConfig, INPUT_DIR_ENV, OUTPUT_DIR_ENV, PathsConfig, config_dir,
    config_file_path, expand_home, init_config, init_config_at, load_config, load_config_from,
};
pub use error::{Result, UnsloppableError};
pub use slug::{INDEX_PAGE, company_page_path, ticker_slug};
pub use types::{
    AnalysisRecord, MAX_SCORE, NarrativeSection, RiskProfile, SkipStage, SkippedRecord,
    SourceFiling,
};
