//! Project counters: `version.json` and the on-disk drift check.

use std::path::Path;

use tracing::{info, instrument, warn};

use skilldocs_shared::{Skipped, SyncConfig, VersionInfo};

use crate::skills::{SKILL_FILE_NAME, skill_dir_names};

/// Counters computed from the repository tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActualCounts {
    pub skills: u32,
    pub workflows: u32,
    pub reference_files: u32,
}

/// Read `version.json`; a missing or malformed file yields defaults and a skip.
#[instrument(skip_all, fields(file = %config.paths.version_file.display()))]
pub fn read_version_info(root: &Path, config: &SyncConfig) -> (VersionInfo, Option<Skipped>) {
    let relative = &config.paths.version_file;

    let text = match std::fs::read_to_string(root.join(relative)) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return (VersionInfo::default(), Some(Skipped::new(relative, "not found")));
        }
        Err(e) => {
            return (
                VersionInfo::default(),
                Some(Skipped::new(relative, format!("unreadable: {e}"))),
            );
        }
    };

    match serde_json::from_str::<VersionInfo>(&text) {
        Ok(info) => {
            info!(version = %info.version, skills = info.skill_count, "version metadata loaded");
            (info, None)
        }
        Err(e) => (
            VersionInfo::default(),
            Some(Skipped::new(relative, format!("malformed JSON: {e}"))),
        ),
    }
}

/// Count skills, workflow commands and reference files on disk.
pub fn count_actual(root: &Path, config: &SyncConfig) -> ActualCounts {
    let skills_dir = root.join(&config.paths.skills_dir);
    let mut counts = ActualCounts::default();

    for name in skill_dir_names(&skills_dir).unwrap_or_default() {
        let dir = skills_dir.join(&name);
        if dir.join(SKILL_FILE_NAME).is_file() {
            counts.skills += 1;
        }
        counts.reference_files += count_markdown(&dir.join("references"), false);
    }

    counts.workflows = count_markdown(&root.join(&config.paths.commands_dir), true);
    counts
}

fn count_markdown(dir: &Path, recursive: bool) -> u32 {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return 0;
    };

    let mut count = 0;
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            if recursive {
                count += count_markdown(&path, true);
            }
        } else if path.extension().is_some_and(|ext| ext == "md") {
            count += 1;
        }
    }
    count
}

/// Warn for every counter in `version.json` that disagrees with the tree.
///
/// Returns the number of mismatches. Output keeps using the declared values.
pub fn check_drift(declared: &VersionInfo, actual: &ActualCounts) -> usize {
    let pairs = [
        ("skillCount", declared.skill_count, actual.skills),
        ("workflowCount", declared.workflow_count, actual.workflows),
        (
            "referenceFileCount",
            declared.reference_file_count,
            actual.reference_files,
        ),
    ];

    let mut mismatches = 0;
    for (field, declared, actual) in pairs {
        if declared != actual {
            warn!(field, declared, actual, "version.json counter out of date");
            mismatches += 1;
        }
    }
    mismatches
}
