//! Frontmatter parsing, body cleanup passes, and link rewriting.
//!
//! Every source family (core docs, guides, workflow docs, skills) goes through
//! the same steps here: split off the YAML frontmatter, drop the leading H1,
//! collapse counter tags, strip GitHub-only decoration, and rewrite links
//! through a [`LinkMap`]. Page and mirror rendering live here too so that the
//! content tree and the derived artifacts are produced by the same code.

mod cleanup;
mod links;

use serde::de::DeserializeOwned;

use skilldocs_shared::{Result, SkillDocsError};

pub use cleanup::{CleanOptions, first_paragraph, truncate_description};
pub use links::{LinkMap, LinkRewriter, link_reference_files};

// ---------------------------------------------------------------------------
// Frontmatter
// ---------------------------------------------------------------------------

/// A source file split into its raw frontmatter block and Markdown body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Document<'a> {
    /// YAML between the `---` delimiters, if the file has a valid block.
    pub frontmatter: Option<&'a str>,
    pub body: &'a str,
}

/// Split raw file text into frontmatter and body.
///
/// The text must start with a `---` line and contain a second `---` line
/// closing the block. Anything else is treated as body with no frontmatter.
pub fn split_frontmatter(text: &str) -> Document<'_> {
    let no_frontmatter = Document {
        frontmatter: None,
        body: text,
    };

    let Some(rest) = text
        .strip_prefix("---\n")
        .or_else(|| text.strip_prefix("---\r\n"))
    else {
        return no_frontmatter;
    };

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end_matches(['\r', '\n']) == "---" {
            return Document {
                frontmatter: Some(rest[..offset].trim_end_matches(['\r', '\n'])),
                body: &rest[offset + line.len()..],
            };
        }
        offset += line.len();
    }

    no_frontmatter
}

/// Split and deserialize frontmatter into a typed meta struct.
///
/// Missing or empty frontmatter yields `T::default()`. A block that is not
/// valid YAML for `T` is a parse error; callers attach the file path.
pub fn parse_frontmatter<T>(text: &str) -> Result<(T, &str)>
where
    T: DeserializeOwned + Default,
{
    let doc = split_frontmatter(text);

    let meta = match doc.frontmatter {
        None => T::default(),
        Some(yaml) if yaml.trim().is_empty() => T::default(),
        Some(yaml) => {
            let value: serde_yaml::Value = serde_yaml::from_str(yaml)
                .map_err(|e| SkillDocsError::parse(format!("invalid YAML: {e}")))?;
            if value.is_null() {
                T::default()
            } else {
                serde_yaml::from_value(value)
                    .map_err(|e| SkillDocsError::parse(format!("unexpected frontmatter: {e}")))?
            }
        }
    };

    Ok((meta, doc.body))
}

// ---------------------------------------------------------------------------
// Headings and counter tags
// ---------------------------------------------------------------------------

/// Text of the first `# ` heading outside code fences.
pub fn extract_first_heading(body: &str) -> Option<String> {
    cleanup::find_first_heading(body).map(|(_, text)| text.to_string())
}

/// Remove the first H1 line and the blank lines that follow it.
///
/// The site layout renders its own title from frontmatter, so keeping the H1
/// would duplicate it.
pub fn remove_first_heading(body: &str) -> String {
    let Some((range, _)) = cleanup::find_first_heading(body) else {
        return body.to_string();
    };

    let before = &body[..range.start];
    let after = body[range.end..].trim_start_matches(['\r', '\n']);

    if before.trim().is_empty() {
        after.to_string()
    } else {
        format!("{before}{after}")
    }
}

/// Collapse `<!-- TAG -->value<!-- /TAG -->` counters to their value.
pub fn strip_generated_count_tags(body: &str) -> String {
    cleanup::map_outside_code(body, cleanup::strip_count_tags)
}

/// Run the shared cleanup passes and rewrite links.
pub fn clean_body(body: &str, rewriter: &LinkRewriter<'_>, opts: &CleanOptions) -> String {
    cleanup::run_pipeline(body, rewriter, opts)
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

/// Frontmatter written on every normalized page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageFrontmatter {
    pub title: String,
    pub description: String,
    pub sidebar_label: Option<String>,
    pub sidebar_order: Option<u32>,
}

/// Build a YAML frontmatter block.
pub fn render_frontmatter(fm: &PageFrontmatter) -> String {
    let mut out = String::from("---\n");
    out.push_str(&format!("title: \"{}\"\n", escape_yaml_string(&fm.title)));
    out.push_str(&format!(
        "description: \"{}\"\n",
        escape_yaml_string(&fm.description)
    ));
    if fm.sidebar_label.is_some() || fm.sidebar_order.is_some() {
        out.push_str("sidebar:\n");
        if let Some(label) = &fm.sidebar_label {
            out.push_str(&format!("  label: \"{}\"\n", escape_yaml_string(label)));
        }
        if let Some(order) = fm.sidebar_order {
            out.push_str(&format!("  order: {order}\n"));
        }
    }
    out.push_str("---\n");
    out
}

/// A normalized page: frontmatter, blank line, trimmed body.
pub fn render_page(fm: &PageFrontmatter, body: &str) -> String {
    let body = body.trim();
    if body.is_empty() {
        render_frontmatter(fm)
    } else {
        format!("{}\n{body}\n", render_frontmatter(fm))
    }
}

/// A frontmatter-free mirror: injected H1, blank line, trimmed body.
pub fn render_mirror(title: &str, body: &str) -> String {
    let body = body.trim();
    if body.is_empty() {
        format!("# {title}\n")
    } else {
        format!("# {title}\n\n{body}\n")
    }
}

/// Escape special characters in a double-quoted YAML string value.
fn escape_yaml_string(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace(['\r', '\n'], " ")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
