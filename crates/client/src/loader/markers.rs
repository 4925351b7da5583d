//! Include and script markers embedded in fragment HTML.
//!
//! Grammar: `<!-- include('name') -->` and `<!-- script('name') -->`, with
//! single or double quotes. The name is any run of non-quote characters.
//! Anything that doesn't match exactly is left in the text untouched.

use regex::Regex;
use std::sync::LazyLock;

static INCLUDE: LazyLock<Regex> = LazyLock::new(|| marker_pattern("include"));
static SCRIPT: LazyLock<Regex> = LazyLock::new(|| marker_pattern("script"));

fn marker_pattern(directive: &str) -> Regex {
    Regex::new(&format!(r#"<!--\s*{directive}\(\s*(?:'([^'"]+)'|"([^'"]+)")\s*\)\s*-->"#))
        .expect("marker pattern is valid")
}

/// A marker occurrence: its byte span and the referenced name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Marker {
    pub start: usize,
    pub end: usize,
    pub name: String,
}

fn find(pattern: &Regex, html: &str) -> Vec<Marker> {
    pattern
        .captures_iter(html)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let name = caps.get(1).or_else(|| caps.get(2))?;
            Some(Marker { start: whole.start(), end: whole.end(), name: name.as_str().to_string() })
        })
        .collect()
}

/// Include markers in document order.
pub fn find_includes(html: &str) -> Vec<Marker> {
    find(&INCLUDE, html)
}

/// Script markers in document order.
pub fn find_scripts(html: &str) -> Vec<Marker> {
    find(&SCRIPT, html)
}

/// Remove every script marker from `html`.
pub fn strip_scripts(html: &str) -> String {
    SCRIPT.replace_all(html, "").into_owned()
}
