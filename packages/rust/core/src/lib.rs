//! Site build orchestration for Unsloppable.
//!
//! Ties the loader and renderer together and writes the generated site
//! (see [`pipeline::SitePipeline`] and [`writer::SiteWriter`]).

pub mod pipeline;
pub mod writer;

pub use pipeline::{
    BuildReport, BuildState, ProgressReporter, SilentProgress, SitePipeline, build_site,
    check_slug_collisions,
};
pub use writer::{MANIFEST_FILE, PageMeta, RenderedPage, SiteManifest, SiteWriter};
