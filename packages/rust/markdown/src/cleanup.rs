//! Body cleanup passes for source Markdown.
//!
//! Each pass is a function `&str -> String` applied in sequence. Passes that
//! touch prose run only outside fenced code blocks.

use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;

use crate::links::LinkRewriter;

/// Longest description emitted into frontmatter.
const MAX_DESCRIPTION_CHARS: usize = 160;

/// Family-specific switches for [`run_pipeline`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanOptions {
    /// Drop `align="center"` HTML blocks (README badges and banners).
    pub strip_centered_blocks: bool,
}

/// Run the full cleanup pipeline on a source body.
pub(crate) fn run_pipeline(md: &str, rewriter: &LinkRewriter<'_>, opts: &CleanOptions) -> String {
    let mut result = crate::remove_first_heading(md);

    result = map_outside_code(&result, strip_count_tags);
    if opts.strip_centered_blocks {
        result = map_outside_code(&result, strip_centered_blocks);
    }
    result = rewriter.rewrite(&result);
    result = map_outside_code(&result, clean_blank_lines);

    result.trim().to_string()
}

// ---------------------------------------------------------------------------
// Code fence handling
// ---------------------------------------------------------------------------

fn is_fence(line: &str) -> bool {
    let trimmed = line.trim_start();
    trimmed.starts_with("```") || trimmed.starts_with("~~~")
}

/// Apply `f` to every run of lines outside fenced code blocks.
///
/// Fence lines and fenced content are copied through byte-for-byte.
pub(crate) fn map_outside_code(md: &str, mut f: impl FnMut(&str) -> String) -> String {
    let mut out = String::with_capacity(md.len());
    let mut prose = String::new();
    let mut in_code = false;

    for line in md.split_inclusive('\n') {
        if is_fence(line) {
            if !in_code {
                out.push_str(&f(&prose));
                prose.clear();
            }
            in_code = !in_code;
            out.push_str(line);
        } else if in_code {
            out.push_str(line);
        } else {
            prose.push_str(line);
        }
    }

    if !prose.is_empty() {
        out.push_str(&f(&prose));
    }
    out
}

/// Byte range of the first `# ` line (including its newline) and its text.
pub(crate) fn find_first_heading(md: &str) -> Option<(Range<usize>, &str)> {
    let mut offset = 0;
    let mut in_code = false;

    for line in md.split_inclusive('\n') {
        let start = offset;
        offset += line.len();

        if is_fence(line) {
            in_code = !in_code;
            continue;
        }
        if in_code {
            continue;
        }

        let content = line.trim_end_matches(['\r', '\n']);
        if let Some(text) = content.strip_prefix("# ") {
            return Some((start..offset, text.trim()));
        }
    }

    None
}

// ---------------------------------------------------------------------------
// Pass: counter tags
// ---------------------------------------------------------------------------

/// Collapse `<!-- TAG -->value<!-- /TAG -->` to `value`.
pub(crate) fn strip_count_tags(md: &str) -> String {
    static COUNT_TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"<!--\s*[A-Z0-9_]+\s*-->(.*?)<!--\s*/[A-Z0-9_]+\s*-->").expect("valid regex")
    });

    COUNT_TAG_RE.replace_all(md, "${1}").to_string()
}

// ---------------------------------------------------------------------------
// Pass: centered decoration blocks
// ---------------------------------------------------------------------------

/// Remove `<p align="center">` / `<div align="center">` / centered heading blocks.
fn strip_centered_blocks(md: &str) -> String {
    static CENTERED_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
        ["div", "p", "h1", "h2", "h3"]
            .iter()
            .map(|tag| {
                Regex::new(&format!(
                    r#"(?is)<{tag}\s[^>]*align\s*=\s*["']center["'][^>]*>.*?</{tag}\s*>[ \t]*\n?"#
                ))
                .expect("valid regex")
            })
            .collect()
    });

    let mut result = md.to_string();
    for re in CENTERED_RES.iter() {
        result = re.replace_all(&result, "").to_string();
    }
    result
}

// ---------------------------------------------------------------------------
// Pass: blank lines
// ---------------------------------------------------------------------------

/// Collapse runs of blank lines into a single blank line.
fn clean_blank_lines(md: &str) -> String {
    static MULTI_BLANK_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"\n[ \t]*\n(?:[ \t]*\n)+").expect("valid regex"));

    MULTI_BLANK_RE.replace_all(md, "\n\n").to_string()
}

// ---------------------------------------------------------------------------
// Descriptions
// ---------------------------------------------------------------------------

/// First prose paragraph: not a heading, table, list, quote, HTML or code.
///
/// Lines of the paragraph are joined with single spaces.
pub fn first_paragraph(md: &str) -> Option<String> {
    let mut lines: Vec<&str> = Vec::new();
    let mut in_code = false;

    for line in md.lines() {
        if is_fence(line) {
            if !lines.is_empty() {
                break;
            }
            in_code = !in_code;
            continue;
        }
        if in_code {
            continue;
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            if lines.is_empty() {
                continue;
            }
            break;
        }

        if is_structural(trimmed) {
            if lines.is_empty() {
                continue;
            }
            break;
        }

        lines.push(trimmed);
    }

    if lines.is_empty() {
        None
    } else {
        Some(lines.join(" "))
    }
}

fn is_structural(line: &str) -> bool {
    static ORDERED_ITEM_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"^\d+[.)]\s").expect("valid regex"));

    line.starts_with('#')
        || line.starts_with('|')
        || line.starts_with("- ")
        || line.starts_with("* ")
        || line.starts_with("+ ")
        || line.starts_with('>')
        || line.starts_with('<')
        || line == "---"
        || ORDERED_ITEM_RE.is_match(line)
}

/// Collapse whitespace runs (newlines included) to single spaces, then cut
/// to 160 characters, ending in `...` when shortened.
pub fn truncate_description(text: &str) -> String {
    let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if text.chars().count() <= MAX_DESCRIPTION_CHARS {
        return text;
    }

    let cut: String = text.chars().take(MAX_DESCRIPTION_CHARS - 3).collect();
    format!("{}...", cut.trim_end())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::links::LinkMap;

    #[test]
    fn map_outside_code_skips_fences() {
        let input = "a\n```\na\n```\na\n";
        let result = map_outside_code(input, |s| s.replace('a', "b"));
        assert_eq!(result, "b\n```\na\n```\nb\n");
    }

    #[test]
    fn map_outside_code_handles_unclosed_fence() {
        let input = "a\n~~~\na\n";
        let result = map_outside_code(input, |s| s.replace('a', "b"));
        assert_eq!(result, "b\n~~~\na\n");
    }

    #[test]
    fn centered_blocks_removed() {
        let input = "<p align=\"center\">\n  <img src=\"logo.png\">\n</p>\n\nReal text\n\n<div align='center'><a href=\"x\">badge</a></div>\nMore\n";
        let result = strip_centered_blocks(input);
        assert!(!result.contains("logo.png"));
        assert!(!result.contains("badge"));
        assert!(result.contains("Real text"));
        assert!(result.contains("More"));
    }

    #[test]
    fn uncentered_html_kept() {
        let input = "<p>keep me</p>\n<div class=\"note\">and me</div>\n";
        assert_eq!(strip_centered_blocks(input), input);
    }

    #[test]
    fn clean_blank_lines_collapses_runs() {
        assert_eq!(clean_blank_lines("a\n\n\n\nb"), "a\n\nb");
        assert_eq!(clean_blank_lines("a\n  \n\t\n\nb"), "a\n\nb");
        assert_eq!(clean_blank_lines("a\n\nb"), "a\n\nb");
    }

    #[test]
    fn first_paragraph_skips_structure() {
        let md = "## Overview\n\n| a | b |\n|---|---|\n\n- item\n1. step\n\nThe command plans\na feature end to end.\n\nSecond paragraph.";
        assert_eq!(
            first_paragraph(md).as_deref(),
            Some("The command plans a feature end to end.")
        );
    }

    #[test]
    fn first_paragraph_none_when_only_structure() {
        let md = "## Heading\n\n- a\n- b\n\n```\ncode\n```\n";
        assert_eq!(first_paragraph(md), None);
    }

    #[test]
    fn truncate_long_description() {
        let long = "word ".repeat(60);
        let result = truncate_description(&long);
        assert!(result.chars().count() <= 160);
        assert!(result.ends_with("..."));

        assert_eq!(truncate_description("  short  "), "short");
    }

    #[test]
    fn description_newlines_collapse_to_spaces() {
        assert_eq!(
            truncate_description("First line.\nSecond line.\n\n\tThird."),
            "First line. Second line. Third."
        );
        assert_eq!(truncate_description("a \r\n  b"), "a b");
        assert!(!truncate_description(&"line\n".repeat(60)).contains('\n'));
    }

    #[test]
    fn full_pipeline_cleans_markdown() {
        let map = LinkMap::new();
        let rewriter = LinkRewriter::new(&map, "", &[]);
        let input = "# Title\n\n<p align=\"center\"><img src=\"b.svg\"></p>\n\n\n\nWe ship <!-- SKILL_COUNT -->65<!-- /SKILL_COUNT --> skills.\n\n```md\n<!-- KEEP -->1<!-- /KEEP -->\n\n\n\n```\n";
        let result = run_pipeline(
            input,
            &rewriter,
            &CleanOptions {
                strip_centered_blocks: true,
            },
        );

        assert!(!result.contains("# Title"));
        assert!(!result.contains("b.svg"));
        assert!(result.starts_with("We ship 65 skills."));
        assert!(result.contains("<!-- KEEP -->1<!-- /KEEP -->\n\n\n\n```"));
    }
}
