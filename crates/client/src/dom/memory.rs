//! In-memory document used by the CLI and by tests.

use super::{Document, DomError, Icons, InsertMode};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::RwLock;

#[derive(Debug, Default, Clone)]
struct Element {
    html: String,
    attributes: BTreeMap<String, String>,
}

#[derive(Debug, Default)]
struct DocumentState {
    elements: HashMap<String, Element>,
    scripts: Vec<String>,
    failing_scripts: HashSet<String>,
}

/// Flat document of id-addressed elements plus an ordered script list.
///
/// Inserted HTML is stored as text and never parsed. Clones share state.
#[derive(Debug, Clone, Default)]
pub struct MemoryDocument {
    state: Arc<RwLock<DocumentState>>,
}

impl MemoryDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Document with a single empty element, e.g. the page root.
    pub fn with_element(id: &str) -> Self {
        let mut state = DocumentState::default();
        state.elements.insert(id.to_string(), Element::default());
        Self { state: Arc::new(RwLock::new(state)) }
    }

    pub async fn add_element(&self, id: &str, html: &str) {
        self.state
            .write()
            .await
            .elements
            .insert(id.to_string(), Element { html: html.to_string(), ..Element::default() });
    }

    pub async fn inner_html(&self, id: &str) -> Option<String> {
        self.state.read().await.elements.get(id).map(|e| e.html.clone())
    }

    /// Script sources in the order they were appended.
    pub async fn scripts(&self) -> Vec<String> {
        self.state.read().await.scripts.clone()
    }

    /// Make every later load of `src` fire an error instead of load.
    pub async fn fail_script(&self, src: &str) {
        self.state.write().await.failing_scripts.insert(src.to_string());
    }
}

#[async_trait::async_trait]
impl Document for MemoryDocument {
    async fn has_element(&self, id: &str) -> bool {
        self.state.read().await.elements.contains_key(id)
    }

    async fn insert_html(&self, id: &str, mode: InsertMode, html: &str) -> Result<(), DomError> {
        let mut state = self.state.write().await;
        let element = state
            .elements
            .get_mut(id)
            .ok_or_else(|| DomError::ElementNotFound(id.to_string()))?;

        match mode {
            InsertMode::Append => element.html.push_str(html),
            InsertMode::Prepend => element.html.insert_str(0, html),
            InsertMode::InnerHtml => element.html = html.to_string(),
        }
        Ok(())
    }

    async fn set_attribute(&self, id: &str, name: &str, value: &str) -> Result<(), DomError> {
        let mut state = self.state.write().await;
        let element = state
            .elements
            .get_mut(id)
            .ok_or_else(|| DomError::ElementNotFound(id.to_string()))?;
        element.attributes.insert(name.to_string(), value.to_string());
        Ok(())
    }

    async fn attribute(&self, id: &str, name: &str) -> Option<String> {
        self.state.read().await.elements.get(id)?.attributes.get(name).cloned()
    }

    async fn has_script(&self, src: &str) -> bool {
        self.state.read().await.scripts.iter().any(|s| s == src)
    }

    async fn load_script(&self, src: &str) -> Result<(), DomError> {
        let failing = {
            let mut state = self.state.write().await;
            state.scripts.push(src.to_string());
            state.failing_scripts.contains(src)
        };

        // Load events fire on a later tick.
        tokio::task::yield_now().await;

        if failing {
            return Err(DomError::ScriptFailed { src: src.to_string(), reason: "error event".into() });
        }
        Ok(())
    }
}

/// Icon hook that counts refreshes.
#[derive(Debug, Default)]
pub struct CountingIcons {
    refreshes: AtomicUsize,
}

impl CountingIcons {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> usize {
        self.refreshes.load(Ordering::SeqCst)
    }
}

impl Icons for CountingIcons {
    fn refresh(&self) {
        self.refreshes.fetch_add(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_insert_modes() {
        let doc = MemoryDocument::new();
        doc.add_element("list", "<li>b</li>").await;

        doc.insert_html("list", InsertMode::Append, "<li>c</li>").await.unwrap();
        doc.insert_html("list", InsertMode::Prepend, "<li>a</li>").await.unwrap();
        assert_eq!(doc.inner_html("list").await.unwrap(), "<li>a</li><li>b</li><li>c</li>");

        doc.insert_html("list", InsertMode::InnerHtml, "<li>z</li>").await.unwrap();
        assert_eq!(doc.inner_html("list").await.unwrap(), "<li>z</li>");
    }

    #[tokio::test]
    async fn test_missing_element() {
        let doc = MemoryDocument::new();
        let result = doc.insert_html("_root", InsertMode::InnerHtml, "x").await;
        assert!(matches!(result, Err(DomError::ElementNotFound(id)) if id == "_root"));
        assert!(doc.set_attribute("_root", "data-page", "home").await.is_err());
    }

    #[tokio::test]
    async fn test_attributes() {
        let doc = MemoryDocument::with_element("_root");
        assert!(doc.attribute("_root", "data-page").await.is_none());
        doc.set_attribute("_root", "data-page", "home").await.unwrap();
        assert_eq!(doc.attribute("_root", "data-page").await.as_deref(), Some("home"));
    }

    #[tokio::test]
    async fn test_script_loading() {
        let doc = MemoryDocument::new();
        doc.fail_script("bad.js").await;

        assert!(doc.load_script("good.js").await.is_ok());
        assert!(matches!(doc.load_script("bad.js").await, Err(DomError::ScriptFailed { .. })));
        assert!(doc.has_script("good.js").await);
        assert!(doc.has_script("bad.js").await);
        assert_eq!(doc.scripts().await, vec!["good.js", "bad.js"]);
    }

    #[test]
    fn test_counting_icons() {
        let icons = CountingIcons::new();
        icons.refresh();
        icons.refresh();
        assert_eq!(icons.count(), 2);
    }
}
