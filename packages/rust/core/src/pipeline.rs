//! End-to-end sync: link map → clean → core → guides → workflows → skills → artifacts.

use std::path::Path;
use std::time::{Duration, Instant};

use tracing::{info, instrument, warn};

use skilldocs_markdown::LinkRewriter;
use skilldocs_shared::{PageManifest, Result, Skipped, SyncConfig, VersionInfo};

use crate::assembler;
use crate::counts;
use crate::docs;
use crate::linkmap::{build_link_map, site_sections};
use crate::skills::{self, SkillIndex};
use crate::sync::{SyncContext, SyncOutput};
use crate::workflows;

/// Per-stage counts for the console summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageReport {
    pub name: &'static str,
    pub processed: usize,
    pub written: usize,
    pub skipped: usize,
}

/// Result of a full sync run.
#[derive(Debug)]
pub struct SyncSummary {
    pub stages: Vec<StageReport>,
    /// Every generated page, in synchronization order.
    pub manifest: PageManifest,
    /// Every non-fatal omission, in the order it happened.
    pub skipped: Vec<Skipped>,
    pub version: VersionInfo,
    /// `version.json` counters that disagree with the tree.
    pub drift: usize,
    /// Page mirrors written under the public directory.
    pub mirrors: usize,
    pub elapsed: Duration,
}

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new stage.
    fn stage(&self, name: &str);
    /// Called after each normalized page is written.
    fn page_written(&self, site_url: &str);
    /// Called when the pipeline completes.
    fn done(&self, summary: &SyncSummary);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn stage(&self, _name: &str) {}
    fn page_written(&self, _site_url: &str) {}
    fn done(&self, _summary: &SyncSummary) {}
}

/// Run the full sync pipeline rooted at `root`.
///
/// Per-file problems become [`Skipped`] entries; only write failures and
/// manifest invariant violations abort the run.
#[instrument(skip_all, fields(root = %root.display()))]
pub fn run(root: &Path, config: &SyncConfig, progress: &dyn ProgressReporter) -> Result<SyncSummary> {
    let start = Instant::now();
    let mut summary = SyncSummary {
        stages: Vec::new(),
        manifest: PageManifest::new(),
        skipped: Vec::new(),
        version: VersionInfo::default(),
        drift: 0,
        mirrors: 0,
        elapsed: Duration::ZERO,
    };

    info!("starting content sync");

    // --- Link map ---
    progress.stage("Building link map");
    let map = build_link_map(root, config);
    let sections = site_sections(config);

    // --- Clean previous content ---
    progress.stage("Cleaning previous content");
    assembler::clean_content_tree(&root.join(&config.paths.content_dir), config)?;

    let ctx = SyncContext {
        root,
        config,
        rewriter: LinkRewriter::new(&map, &config.site.base, &sections),
        progress,
    };

    // --- Synchronizers ---
    progress.stage("Syncing core docs");
    record(&mut summary, "core docs", docs::sync_core_docs(&ctx)?)?;

    progress.stage("Syncing guides");
    record(&mut summary, "guides", docs::sync_guides(&ctx)?)?;

    progress.stage("Syncing workflow docs");
    record(&mut summary, "workflows", workflows::sync_workflows(&ctx)?)?;

    progress.stage("Building skill index");
    let loaded = skills::load_skills(root, config);
    let index = SkillIndex::build(&loaded.skills);
    summary.stages.push(StageReport {
        name: "skill index",
        processed: loaded.processed,
        written: 0,
        skipped: loaded.skipped.len(),
    });
    summary.skipped.extend(loaded.skipped.iter().cloned());

    progress.stage("Syncing skill pages");
    record(
        &mut summary,
        "skills",
        skills::sync_skill_pages(&ctx, &loaded.skills, &index)?,
    )?;

    // --- Project counters ---
    progress.stage("Reading version metadata");
    let (version, skipped) = counts::read_version_info(root, config);
    if let Some(skipped) = skipped {
        warn!("{skipped}");
        summary.skipped.push(skipped);
    }
    summary.drift = counts::check_drift(&version, &counts::count_actual(root, config));
    summary.version = version;

    // --- Derived artifacts ---
    progress.stage("Cleaning generated artifacts");
    skilldocs_artifacts::clean_generated(&root.join(&config.paths.public_dir))?;

    progress.stage("Generating mirrors and llms.txt");
    let report = skilldocs_artifacts::generate(root, config, &summary.manifest, &summary.version)?;
    summary.mirrors = report.mirrors;

    summary.elapsed = start.elapsed();
    progress.done(&summary);

    info!(
        pages = summary.manifest.len(),
        skipped = summary.skipped.len(),
        mirrors = summary.mirrors,
        elapsed_ms = summary.elapsed.as_millis(),
        "content sync complete"
    );

    Ok(summary)
}

/// Fold one synchronizer's output into the summary, in call order.
fn record(summary: &mut SyncSummary, name: &'static str, output: SyncOutput) -> Result<()> {
    summary.stages.push(StageReport {
        name,
        processed: output.processed,
        written: output.entries.len(),
        skipped: output.skipped.len(),
    });
    summary.skipped.extend(output.skipped);
    summary.manifest.merge(output.entries)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
