//! Source-path to site-URL mapping and Markdown link rewriting.

use std::collections::{BTreeMap, BTreeSet};
use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::cleanup::map_outside_code;

// ---------------------------------------------------------------------------
// LinkMap
// ---------------------------------------------------------------------------

/// Mapping from the ways a source file may be linked to its site URL.
///
/// Keys come in two strengths. Primary keys (the relative path and its `./`
/// form) always win. Fallback keys (bare basenames) are dropped when two
/// different targets claim the same one, so every key that survives has
/// exactly one target.
#[derive(Debug, Clone, Default)]
pub struct LinkMap {
    targets: BTreeMap<String, String>,
    fallbacks: BTreeSet<String>,
    ambiguous: BTreeSet<String>,
}

impl LinkMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a primary key.
    pub fn register(&mut self, key: impl Into<String>, target: impl Into<String>) {
        let key = key.into();
        let target = target.into();

        if let Some(existing) = self.targets.get(&key) {
            if !self.fallbacks.contains(&key) {
                if *existing != target {
                    debug!(%key, %existing, %target, "primary link key already registered");
                }
                return;
            }
        }

        self.fallbacks.remove(&key);
        self.ambiguous.remove(&key);
        self.targets.insert(key, target);
    }

    /// Register a fallback key that never overrides a primary one.
    pub fn register_fallback(&mut self, key: impl Into<String>, target: impl Into<String>) {
        let key = key.into();
        let target = target.into();

        if self.ambiguous.contains(&key) {
            return;
        }

        match self.targets.get(&key) {
            None => {
                self.fallbacks.insert(key.clone());
                self.targets.insert(key, target);
            }
            Some(existing) if *existing == target => {}
            Some(_) if !self.fallbacks.contains(&key) => {}
            Some(existing) => {
                debug!(%key, %existing, %target, "ambiguous basename dropped from link map");
                self.targets.remove(&key);
                self.fallbacks.remove(&key);
                self.ambiguous.insert(key);
            }
        }
    }

    /// Register the relative path, its `./` form, and its basename.
    pub fn register_variants(&mut self, source_path: &str, target: &str) {
        let path = source_path.trim_start_matches("./");
        self.register(path, target);
        self.register(format!("./{path}"), target);
        if let Some((_, name)) = path.rsplit_once('/') {
            self.register_fallback(name, target);
        }
    }

    /// Exact key lookup.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.targets.get(key).map(String::as_str)
    }

    /// Look up a link path (no anchor), tolerating leading `./` and `../`.
    pub fn resolve(&self, path: &str) -> Option<&str> {
        if let Some(target) = self.get(path) {
            return Some(target);
        }

        let mut stripped = path;
        loop {
            if let Some(rest) = stripped.strip_prefix("./") {
                stripped = rest;
            } else if let Some(rest) = stripped.strip_prefix("../") {
                stripped = rest;
            } else {
                break;
            }
        }

        if stripped == path {
            None
        } else {
            self.get(stripped)
        }
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// All keys and targets in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.targets.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

// ---------------------------------------------------------------------------
// LinkRewriter
// ---------------------------------------------------------------------------

/// Rewrites Markdown links through a [`LinkMap`].
///
/// Unmapped absolute paths under a known site section get the base path
/// prepended; everything else is left untouched.
#[derive(Debug, Clone)]
pub struct LinkRewriter<'a> {
    map: &'a LinkMap,
    base: String,
    sections: Option<Regex>,
}

impl<'a> LinkRewriter<'a> {
    /// `sections` are the top-level URL segments the site serves.
    pub fn new(map: &'a LinkMap, base: &str, sections: &[String]) -> Self {
        let sections = if sections.is_empty() {
            None
        } else {
            let alternatives = sections
                .iter()
                .map(|s| regex::escape(s.trim_matches('/')))
                .collect::<Vec<_>>()
                .join("|");
            Some(Regex::new(&format!(r"^/(?:{alternatives})(?:/|$)")).expect("escaped alternation"))
        };

        Self {
            map,
            base: base.trim_end_matches('/').to_string(),
            sections,
        }
    }

    /// Rewrite every `[text](href)` outside code fences and inline code.
    pub fn rewrite(&self, md: &str) -> String {
        map_outside_code(md, |chunk| self.rewrite_chunk(chunk))
    }

    fn rewrite_chunk(&self, md: &str) -> String {
        static LINK_RE: LazyLock<Regex> = LazyLock::new(|| {
            // [text](url); image links are filtered in the replacement
            Regex::new(r"\[([^\]]*)\]\(([^)\s]+)((?:\s+[^)]*)?)\)").expect("valid regex")
        });

        let code_spans = inline_code_spans(md);

        LINK_RE
            .replace_all(md, |caps: &regex::Captures| {
                let whole = &caps[0];
                let start = caps.get(0).map_or(0, |m| m.start());
                if start > 0 && md.as_bytes()[start - 1] == b'!' {
                    return whole.to_string();
                }
                if code_spans.iter().any(|span| span.contains(&start)) {
                    return whole.to_string();
                }

                match self.rewrite_href(&caps[2]) {
                    Some(href) => format!("[{}]({href}{})", &caps[1], &caps[3]),
                    None => whole.to_string(),
                }
            })
            .to_string()
    }

    /// Resolve one href; `None` means leave it as written.
    pub fn rewrite_href(&self, href: &str) -> Option<String> {
        if href.starts_with('#') || href.starts_with("mailto:") || href.contains("://") {
            return None;
        }

        let (path, anchor) = match href.find('#') {
            Some(i) => href.split_at(i),
            None => (href, ""),
        };

        if let Some(target) = self.map.resolve(path) {
            return Some(format!("{target}{anchor}"));
        }

        if path.starts_with('/') && !self.is_site_prefixed(path) {
            if let Some(sections) = &self.sections {
                if sections.is_match(path) {
                    return Some(format!("{}{path}{anchor}", self.base));
                }
            }
        }

        None
    }

    fn is_site_prefixed(&self, path: &str) -> bool {
        if self.base.is_empty() {
            return false;
        }
        path == self.base
            || path
                .strip_prefix(&self.base)
                .is_some_and(|rest| rest.starts_with('/'))
    }
}

/// Byte ranges of inline code spans. A backtick run closes only on a run of
/// the same length; an unmatched run is literal text.
fn inline_code_spans(md: &str) -> Vec<Range<usize>> {
    let bytes = md.as_bytes();
    let run_end = |from: usize| from + bytes[from..].iter().take_while(|b| **b == b'`').count();

    let mut spans = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] != b'`' {
            i += 1;
            continue;
        }

        let open_end = run_end(i);
        let width = open_end - i;
        let mut j = open_end;
        let mut close = None;
        while j < bytes.len() {
            if bytes[j] != b'`' {
                j += 1;
                continue;
            }
            let end = run_end(j);
            if end - j == width {
                close = Some(end);
                break;
            }
            j = end;
        }

        match close {
            Some(end) => {
                spans.push(i..end);
                i = end;
            }
            None => i = open_end,
        }
    }
    spans
}

// ---------------------------------------------------------------------------
// Skill reference mentions
// ---------------------------------------------------------------------------

/// Turn `` `references/<name>.md` `` mentions into links under `blob_prefix`.
///
/// Reference files are not published on the site, so the link points at the
/// source repository.
pub fn link_reference_files(md: &str, blob_prefix: &str) -> String {
    static REFERENCE_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"`(references/[A-Za-z0-9._/-]+\.md)`").expect("valid regex")
    });

    let prefix = blob_prefix.trim_end_matches('/');

    map_outside_code(md, |chunk| {
        REFERENCE_RE
            .replace_all(chunk, |caps: &regex::Captures| {
                let start = caps.get(0).map_or(0, |m| m.start());
                if start > 0 && chunk.as_bytes()[start - 1] == b'[' {
                    return caps[0].to_string();
                }
                format!("[`{0}`]({prefix}/{0})", &caps[1])
            })
            .to_string()
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_map() -> LinkMap {
        let mut map = LinkMap::new();
        map.register_variants("QUICKSTART.md", "/site/getting-started/");
        map.register_variants("docs/WORKFLOW_COMMANDS.md", "/site/workflow-commands/");
        map
    }

    fn sections() -> Vec<String> {
        vec!["skills".into(), "guides".into(), "getting-started".into()]
    }

    #[test]
    fn variants_resolve_to_same_target() {
        let map = sample_map();
        for key in [
            "docs/WORKFLOW_COMMANDS.md",
            "./docs/WORKFLOW_COMMANDS.md",
            "WORKFLOW_COMMANDS.md",
        ] {
            assert_eq!(map.get(key), Some("/site/workflow-commands/"), "{key}");
        }
        assert_eq!(map.get("./QUICKSTART.md"), Some("/site/getting-started/"));
    }

    #[test]
    fn resolve_strips_parent_segments() {
        let map = sample_map();
        assert_eq!(
            map.resolve("../../QUICKSTART.md"),
            Some("/site/getting-started/")
        );
        assert_eq!(map.resolve("../missing.md"), None);
    }

    #[test]
    fn ambiguous_basenames_are_dropped() {
        let mut map = LinkMap::new();
        map.register_variants("docs/a/README.md", "/site/a/");
        map.register_variants("docs/b/README.md", "/site/b/");
        assert_eq!(map.get("README.md"), None);
        assert_eq!(map.get("docs/a/README.md"), Some("/site/a/"));

        // a third claimant does not resurrect the key
        map.register_variants("docs/c/README.md", "/site/c/");
        assert_eq!(map.get("README.md"), None);
    }

    #[test]
    fn primary_key_beats_fallback() {
        let mut map = LinkMap::new();
        map.register_variants("docs/guides/CHANGELOG.md", "/site/guides/changelog/");
        map.register_variants("CHANGELOG.md", "/site/changelog/");
        assert_eq!(map.get("CHANGELOG.md"), Some("/site/changelog/"));

        let mut map = LinkMap::new();
        map.register_variants("CHANGELOG.md", "/site/changelog/");
        map.register_variants("docs/guides/CHANGELOG.md", "/site/guides/changelog/");
        assert_eq!(map.get("CHANGELOG.md"), Some("/site/changelog/"));
    }

    #[test]
    fn rewrite_preserves_anchor() {
        let map = sample_map();
        let rw = LinkRewriter::new(&map, "/site", &sections());
        let result = rw.rewrite("See [commands](docs/WORKFLOW_COMMANDS.md#discovery-phase).");
        assert_eq!(
            result,
            "See [commands](/site/workflow-commands/#discovery-phase)."
        );
    }

    #[test]
    fn rewrite_prefixes_known_sections() {
        let map = sample_map();
        let rw = LinkRewriter::new(&map, "/site", &sections());
        assert_eq!(
            rw.rewrite("[s](/skills/language/python-pro/)"),
            "[s](/site/skills/language/python-pro/)"
        );
        assert_eq!(rw.rewrite("[g](/guides#top)"), "[g](/site/guides#top)");
        // already prefixed, unknown section, or lookalike prefix
        assert_eq!(rw.rewrite("[a](/site/skills/)"), "[a](/site/skills/)");
        assert_eq!(rw.rewrite("[b](/blog/post)"), "[b](/blog/post)");
        assert_eq!(rw.rewrite("[c](/skillset/x)"), "[c](/skillset/x)");
    }

    #[test]
    fn rewrite_leaves_external_images_and_code() {
        let map = sample_map();
        let rw = LinkRewriter::new(&map, "/site", &sections());
        let input = "[ext](https://example.com/QUICKSTART.md) ![img](QUICKSTART.md) [mail](mailto:a@b.c) [top](#top)\n```\n[code](QUICKSTART.md)\n```\n";
        assert_eq!(rw.rewrite(input), input);
    }

    #[test]
    fn rewrite_leaves_inline_code_spans() {
        let map = sample_map();
        let rw = LinkRewriter::new(&map, "/site", &sections());

        let input = "Write `[x](QUICKSTART.md)` or ``[y](QUICKSTART.md)`` literally.";
        assert_eq!(rw.rewrite(input), input);

        assert_eq!(
            rw.rewrite("[`QUICKSTART.md`](QUICKSTART.md) and `code` then [q](QUICKSTART.md)"),
            "[`QUICKSTART.md`](/site/getting-started/) and `code` then [q](/site/getting-started/)"
        );
        // an unmatched backtick does not open a span
        assert_eq!(
            rw.rewrite("a ` stray [q](QUICKSTART.md)"),
            "a ` stray [q](/site/getting-started/)"
        );
    }

    #[test]
    fn inline_code_span_ranges() {
        assert_eq!(inline_code_spans("a `b` c"), vec![2..5]);
        assert_eq!(inline_code_spans("``a ` b``"), vec![0..9]);
        assert_eq!(inline_code_spans("` open"), Vec::<Range<usize>>::new());
    }

    #[test]
    fn rewrite_keeps_link_title() {
        let map = sample_map();
        let rw = LinkRewriter::new(&map, "/site", &[]);
        assert_eq!(
            rw.rewrite("[q](QUICKSTART.md \"Quick\")"),
            "[q](/site/getting-started/ \"Quick\")"
        );
    }

    #[test]
    fn unresolved_links_untouched() {
        let map = sample_map();
        let rw = LinkRewriter::new(&map, "/site", &sections());
        let input = "[x](references/patterns.md) [y](./other.md#a)";
        assert_eq!(rw.rewrite(input), input);
    }

    #[test]
    fn reference_mentions_become_links() {
        let md = "Load `references/async-patterns.md` when needed.";
        let result = link_reference_files(md, "https://github.com/o/r/blob/main/skills/python-pro/");
        assert_eq!(
            result,
            "Load [`references/async-patterns.md`](https://github.com/o/r/blob/main/skills/python-pro/references/async-patterns.md) when needed."
        );
    }

    #[test]
    fn reference_mentions_already_linked_or_in_code_untouched() {
        let md = "[`references/a.md`](x)\n```\n`references/b.md`\n```\n`references/c.txt`\n";
        assert_eq!(link_reference_files(md, "https://x"), md);
    }
}
