//! Error types for skilldocs.
//!
//! Library crates use [`SkillDocsError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.
//!
//! Per-file problems that the pipeline recovers from (missing optional
//! sources, malformed frontmatter) are not errors at all; they are reported
//! as [`crate::Skipped`] values. Everything that reaches this enum aborts the run.

use std::path::PathBuf;

/// Top-level error type for all skilldocs operations.
#[derive(Debug, thiserror::Error)]
pub enum SkillDocsError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Content parsing error (YAML, JSON, regex input).
    #[error("parse error: {message}")]
    Parse { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Invariant violation (duplicate site URL, bad table entry, etc.).
    #[error("validation error: {message}")]
    Validation { message: String },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, SkillDocsError>;

impl SkillDocsError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a parse error from any displayable message.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse {
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// True when this is an I/O error for a file that does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Io { source, .. } if source.kind() == std::io::ErrorKind::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = SkillDocsError::config("base must start with '/'");
        assert_eq!(err.to_string(), "config error: base must start with '/'");

        let err = SkillDocsError::validation("duplicate site URL /x/");
        assert!(err.to_string().contains("duplicate site URL"));

        let err = SkillDocsError::io(
            "skills/a/SKILL.md",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(err.to_string().contains("skills/a/SKILL.md"));
        assert!(err.to_string().contains("denied"));
    }

    #[test]
    fn not_found_detection() {
        let err = SkillDocsError::io(
            "missing.md",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert!(err.is_not_found());

        let err = SkillDocsError::io(
            "locked.md",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "nope"),
        );
        assert!(!err.is_not_found());
        assert!(!SkillDocsError::parse("x").is_not_found());
    }
}
