//! Pipeline orchestration and the content synchronizers.
//!
//! This crate builds the link map, runs the per-family synchronizers (core
//! docs, guides, workflow docs, skill pages) into the content tree, and hands
//! the resulting manifest to the artifact generators (see [`pipeline::run`]).

pub mod assembler;
pub mod counts;
pub mod docs;
pub mod linkmap;
pub mod pipeline;
pub mod skills;
pub mod sync;
pub mod workflows;

pub use pipeline::{ProgressReporter, SilentProgress, StageReport, SyncSummary, run};
