//! Host document seam.
//!
//! Loaded fragments end up in a [`Document`]: the loader splices HTML into
//! elements addressed by id, records the current page in an attribute, and
//! appends script elements whose load it awaits. [`Icons`] is the hook for
//! the host's icon-replacement pass after each insertion.

pub mod memory;

use std::fmt;
use std::str::FromStr;

pub use memory::{CountingIcons, MemoryDocument};

/// Errors raised by a document host.
#[derive(Debug, Clone, thiserror::Error)]
pub enum DomError {
    #[error("element not found: #{0}")]
    ElementNotFound(String),

    #[error("script failed to load: {src} ({reason})")]
    ScriptFailed { src: String, reason: String },
}

/// How inserted HTML is placed relative to an element's existing content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InsertMode {
    #[default]
    Append,
    Prepend,
    InnerHtml,
}

#[derive(Debug, thiserror::Error)]
#[error("unknown insert mode: {0} (expected append, prepend or innerHTML)")]
pub struct ParseInsertModeError(String);

impl FromStr for InsertMode {
    type Err = ParseInsertModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "append" => Ok(Self::Append),
            "prepend" => Ok(Self::Prepend),
            "innerHTML" | "innerhtml" | "inner_html" => Ok(Self::InnerHtml),
            other => Err(ParseInsertModeError(other.to_string())),
        }
    }
}

impl fmt::Display for InsertMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Append => "append",
            Self::Prepend => "prepend",
            Self::InnerHtml => "innerHTML",
        })
    }
}

/// Document operations the loader needs from its host.
#[async_trait::async_trait]
pub trait Document: Send + Sync {
    async fn has_element(&self, id: &str) -> bool;

    /// Insert `html` into element `id` according to `mode`.
    async fn insert_html(&self, id: &str, mode: InsertMode, html: &str) -> Result<(), DomError>;

    async fn set_attribute(&self, id: &str, name: &str, value: &str) -> Result<(), DomError>;

    async fn attribute(&self, id: &str, name: &str) -> Option<String>;

    /// Whether a script element with exactly this `src` is already present.
    async fn has_script(&self, src: &str) -> bool;

    /// Append a script element for `src` and wait for its load event.
    async fn load_script(&self, src: &str) -> Result<(), DomError>;
}

/// Icon-replacement pass run after fragments are inserted.
pub trait Icons: Send + Sync {
    fn refresh(&self);
}

/// Host without an icon library.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoIcons;

impl Icons for NoIcons {
    fn refresh(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_mode_parse() {
        assert_eq!("append".parse::<InsertMode>().unwrap(), InsertMode::Append);
        assert_eq!("prepend".parse::<InsertMode>().unwrap(), InsertMode::Prepend);
        assert_eq!("innerHTML".parse::<InsertMode>().unwrap(), InsertMode::InnerHtml);
        assert!("outerHTML".parse::<InsertMode>().is_err());
    }

    #[test]
    fn test_insert_mode_display_round_trips() {
        for mode in [InsertMode::Append, InsertMode::Prepend, InsertMode::InnerHtml] {
            assert_eq!(mode.to_string().parse::<InsertMode>().unwrap(), mode);
        }
    }
}
