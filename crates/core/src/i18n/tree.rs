//! Nested locale trees and locale file loading.

use crate::Error;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

/// Mapping from locale code (`en`, `fr`, ...) to its tree of strings.
pub type LocaleTable = HashMap<String, LocaleNode>;

/// A node in a locale tree: either a translated string or a nested group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LocaleNode {
    Leaf(String),
    Branch(BTreeMap<String, LocaleNode>),
}

impl LocaleNode {
    /// Walk a dotted path (`a.b.c`) down the tree.
    ///
    /// Returns the string only when every segment names a branch child and
    /// the final segment lands on a leaf.
    pub fn lookup(&self, dotted: &str) -> Option<&str> {
        let mut node = self;
        for segment in dotted.split('.') {
            match node {
                LocaleNode::Branch(children) => node = children.get(segment)?,
                LocaleNode::Leaf(_) => return None,
            }
        }

        match node {
            LocaleNode::Leaf(text) => Some(text),
            LocaleNode::Branch(_) => None,
        }
    }
}

impl From<&str> for LocaleNode {
    fn from(text: &str) -> Self {
        LocaleNode::Leaf(text.to_string())
    }
}

impl<K: Into<String>, V: Into<LocaleNode>> FromIterator<(K, V)> for LocaleNode {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        LocaleNode::Branch(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Read every `<code>.json` file in `dir` into a locale table.
///
/// Each file must hold a JSON object; its stem becomes the locale code.
pub async fn load_locale_dir(dir: impl AsRef<Path>) -> Result<LocaleTable, Error> {
    let dir = dir.as_ref();
    let mut table = LocaleTable::new();
    let mut entries = tokio::fs::read_dir(dir).await?;

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("json") {
            continue;
        }
        let Some(code) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };

        let text = tokio::fs::read_to_string(&path).await?;
        let node: LocaleNode =
            serde_json::from_str(&text).map_err(|e| Error::Locale(format!("{}: {e}", path.display())))?;
        if matches!(node, LocaleNode::Leaf(_)) {
            return Err(Error::Locale(format!("{}: expected a JSON object", path.display())));
        }

        tracing::debug!(locale = code, path = %path.display(), "loaded locale file");
        table.insert(code.to_lowercase(), node);
    }

    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> LocaleNode {
        serde_json::from_str(r#"{"nav": {"home": "Home", "settings": {"title": "Settings"}}, "greeting": "Hi"}"#)
            .unwrap()
    }

    #[test]
    fn test_lookup_leaf() {
        let tree = sample();
        assert_eq!(tree.lookup("greeting"), Some("Hi"));
        assert_eq!(tree.lookup("nav.home"), Some("Home"));
        assert_eq!(tree.lookup("nav.settings.title"), Some("Settings"));
    }

    #[test]
    fn test_lookup_missing_segment() {
        let tree = sample();
        assert_eq!(tree.lookup("nav.profile"), None);
        assert_eq!(tree.lookup("missing.key"), None);
    }

    #[test]
    fn test_lookup_stops_at_leaf_or_branch() {
        let tree = sample();
        assert_eq!(tree.lookup("greeting.extra"), None);
        assert_eq!(tree.lookup("nav"), None);
        assert_eq!(tree.lookup("nav.settings"), None);
    }

    #[test]
    fn test_from_iter_builds_branch() {
        let tree: LocaleNode = [("a", [("b", "Hi")].into_iter().collect::<LocaleNode>())].into_iter().collect();
        assert_eq!(tree.lookup("a.b"), Some("Hi"));
    }

    #[tokio::test]
    async fn test_load_locale_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("en.json"), r#"{"title": "Hello"}"#).unwrap();
        std::fs::write(dir.path().join("FR.json"), r#"{"title": "Bonjour"}"#).unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let table = load_locale_dir(dir.path()).await.unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table["en"].lookup("title"), Some("Hello"));
        assert_eq!(table["fr"].lookup("title"), Some("Bonjour"));
    }

    #[tokio::test]
    async fn test_load_locale_dir_rejects_bare_string() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("en.json"), r#""just text""#).unwrap();

        let result = load_locale_dir(dir.path()).await;
        assert!(matches!(result, Err(Error::Locale(_))));
    }
}
