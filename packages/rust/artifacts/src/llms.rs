//! `llms.txt` and `llms-full.txt` rendering.
//!
//! Both files walk the same grouped view of the manifest: docs, guides,
//! skills by domain (domain table order), workflows, then project pages
//! under "Optional". Empty groups produce no heading.

use std::collections::{BTreeMap, HashMap};

use skilldocs_shared::{Category, PageManifestEntry, SyncConfig, VersionInfo};

use crate::mirrors::{MIRROR_FILE_NAME, Mirror};

/// Horizontal rule placed between pages in `llms-full.txt`.
const PAGE_SEPARATOR: &str = "\n---\n\n";

/// One heading's worth of manifest entries, in manifest order.
#[derive(Debug, Clone)]
pub struct Section<'a> {
    pub heading: String,
    pub entries: Vec<&'a PageManifestEntry>,
}

/// Group entries by category in the fixed section order.
pub fn group_sections<'a>(config: &SyncConfig, entries: &'a [PageManifestEntry]) -> Vec<Section<'a>> {
    let mut groups: BTreeMap<(u8, usize, String), Section<'a>> = BTreeMap::new();

    for entry in entries {
        let (key, heading) = match &entry.category {
            Category::Docs => ((0, 0, String::new()), "Docs".to_string()),
            Category::Guides => ((1, 0, String::new()), "Guides".to_string()),
            Category::Skills(domain) => {
                let (rank, id) = config.domain_rank(domain);
                (
                    (2, rank, id),
                    format!("Skills: {}", config.domain_label(domain)),
                )
            }
            Category::Workflows => ((3, 0, String::new()), "Workflows".to_string()),
            Category::Project => ((4, 0, String::new()), "Optional".to_string()),
        };

        groups
            .entry(key)
            .or_insert_with(|| Section {
                heading,
                entries: Vec::new(),
            })
            .entries
            .push(entry);
    }

    groups.into_values().collect()
}

fn header(config: &SyncConfig) -> String {
    format!("# {}\n\n> {}\n", config.site.project_name, config.site.tagline)
}

/// Grouped index, one line per page.
pub fn render_llms_txt(config: &SyncConfig, version: &VersionInfo, sections: &[Section<'_>]) -> String {
    let mut out = header(config);
    out.push_str(&format!(
        "\nVersion {}: {} skills, {} workflow commands, {} reference files.\n",
        version.version, version.skill_count, version.workflow_count, version.reference_file_count
    ));

    for section in sections {
        out.push_str(&format!("\n## {}\n\n", section.heading));
        for entry in &section.entries {
            let link = format!("{}{MIRROR_FILE_NAME}", entry.site_url);
            if entry.description.is_empty() {
                out.push_str(&format!("- [{}]({link})\n", entry.title));
            } else {
                out.push_str(&format!(
                    "- [{}]({link}): {}\n",
                    entry.title, entry.description
                ));
            }
        }
    }

    out
}

/// Every page's mirror text, concatenated in section order.
pub fn render_llms_full_txt(config: &SyncConfig, sections: &[Section<'_>], mirrors: &[Mirror]) -> String {
    let by_url: HashMap<&str, &str> = mirrors
        .iter()
        .map(|m| (m.site_url.as_str(), m.content.as_str()))
        .collect();

    let mut out = header(config);
    for section in sections {
        for entry in &section.entries {
            if let Some(content) = by_url.get(entry.site_url.as_str()) {
                out.push_str(PAGE_SEPARATOR);
                out.push_str(content);
            }
        }
    }
    out
}
