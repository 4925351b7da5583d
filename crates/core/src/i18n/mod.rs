//! Locale tables and `{{ locale.<key> }}` token translation.
//!
//! A [`Localizer`] owns the active locale table and the fallback locale
//! code. The active locale is the host's preferred two-letter language when
//! the table has it, otherwise the fallback.
//!
//! Unresolvable tokens are not errors: they are replaced with the literal
//! `locale.<key>` text and a warning is logged, so missing strings stay
//! visible on the page.

mod tree;

pub use tree::{LocaleNode, LocaleTable, load_locale_dir};

use regex::{Captures, Regex};
use std::sync::{Arc, LazyLock, PoisonError, RwLock};

static LOCALE_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{\s*locale\.([^\s{}]+)\s*\}\}").expect("locale token pattern is valid"));

#[derive(Debug, Default)]
struct LocaleState {
    table: LocaleTable,
    fallback: String,
}

/// Locale resolver shared by every fragment load.
///
/// Clones share the same table.
#[derive(Debug, Clone, Default)]
pub struct Localizer {
    state: Arc<RwLock<LocaleState>>,
    language: Option<String>,
}

impl Localizer {
    /// Create a resolver that follows the operating system language.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a resolver with a fixed preferred language (e.g. `fr-CA`).
    pub fn with_language(language: impl Into<String>) -> Self {
        Self { language: Some(language.into()), ..Self::default() }
    }

    /// Replace the locale table and fallback code in one step.
    pub fn register_locales(&self, table: LocaleTable, fallback: impl Into<String>) {
        let fallback = fallback.into();
        tracing::debug!(locales = table.len(), fallback = %fallback, "registering locales");
        *self.state.write().unwrap_or_else(PoisonError::into_inner) = LocaleState { table, fallback };
    }

    /// Two-letter code of the host's preferred language, lowercased.
    pub fn preferred_language(&self) -> Option<String> {
        self.language
            .clone()
            .or_else(sys_locale::get_locale)
            .and_then(|tag| primary_subtag(&tag))
    }

    /// The locale translations are read from.
    ///
    /// The preferred language when the table contains it, else the fallback.
    pub fn active_locale(&self) -> String {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        match self.preferred_language() {
            Some(code) if state.table.contains_key(&code) => code,
            _ => state.fallback.clone(),
        }
    }

    /// Resolve a dotted key against the active locale.
    pub fn resolve(&self, key: &str) -> Option<String> {
        let active = self.active_locale();
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        state.table.get(&active)?.lookup(key).map(str::to_string)
    }

    /// Replace every `{{ locale.<key> }}` token in `text`.
    pub fn apply_translations(&self, text: &str) -> String {
        LOCALE_TOKEN
            .replace_all(text, |caps: &Captures<'_>| {
                let key = &caps[1];
                self.resolve(key).unwrap_or_else(|| {
                    tracing::warn!(key, locale = %self.active_locale(), "missing translation");
                    format!("locale.{key}")
                })
            })
            .into_owned()
    }
}

fn primary_subtag(tag: &str) -> Option<String> {
    let primary = tag.split(['-', '_', '.', '@']).next()?.trim();
    if primary.len() < 2 || !primary.is_char_boundary(2) {
        return None;
    }
    Some(primary[..2].to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_log::CapturedLogs;

    fn table(json: &str) -> LocaleTable {
        serde_json::from_str(json).unwrap()
    }

    fn localizer(language: &str) -> Localizer {
        let localizer = Localizer::with_language(language);
        localizer.register_locales(
            table(r#"{"en": {"a": {"b": "Hi"}}, "fr": {"a": {"b": "Salut"}}}"#),
            "en",
        );
        localizer
    }

    #[test]
    fn test_primary_subtag() {
        assert_eq!(primary_subtag("en-US").as_deref(), Some("en"));
        assert_eq!(primary_subtag("fr_CA.UTF-8").as_deref(), Some("fr"));
        assert_eq!(primary_subtag("DE").as_deref(), Some("de"));
        assert_eq!(primary_subtag("x"), None);
        assert_eq!(primary_subtag(""), None);
    }

    #[test]
    fn test_active_locale_prefers_host_language() {
        assert_eq!(localizer("fr-FR").active_locale(), "fr");
    }

    #[test]
    fn test_active_locale_falls_back() {
        assert_eq!(localizer("ja-JP").active_locale(), "en");
    }

    #[test]
    fn test_resolve() {
        let l = localizer("en");
        assert_eq!(l.resolve("a.b").as_deref(), Some("Hi"));
        assert_eq!(l.resolve("a.c"), None);
        assert_eq!(l.resolve("a"), None);
    }

    #[test]
    fn test_apply_translations() {
        let l = localizer("en");
        assert_eq!(l.apply_translations("<h1>{{ locale.a.b }}</h1>"), "<h1>Hi</h1>");
        assert_eq!(l.apply_translations("<h1>{{locale.a.b}}</h1>"), "<h1>Hi</h1>");
    }

    #[test]
    fn test_apply_translations_missing_key_keeps_placeholder() {
        let l = localizer("en");
        assert_eq!(l.apply_translations("<h1>{{ locale.a.c }}</h1>"), "<h1>locale.a.c</h1>");
    }

    #[test]
    fn test_missing_translation_logs_warning() {
        let logs = CapturedLogs::default();
        let l = localizer("en");

        let html = tracing::subscriber::with_default(logs.subscriber(), || {
            l.apply_translations("<h1>{{ locale.a.c }}</h1><p>{{ locale.a.b }}</p>")
        });

        assert_eq!(html, "<h1>locale.a.c</h1><p>Hi</p>");
        let warnings = logs.lines("WARN", "missing translation");
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("a.c"));
    }

    #[test]
    fn test_apply_translations_multiple_tokens() {
        let l = localizer("fr");
        let out = l.apply_translations("{{ locale.a.b }} / {{ locale.x.y }} / {{ locale.a.b }}");
        assert_eq!(out, "Salut / locale.x.y / Salut");
    }

    #[test]
    fn test_non_locale_braces_untouched() {
        let l = localizer("en");
        let text = "{{ other.a.b }} {name} {{ locale. }}";
        assert_eq!(l.apply_translations(text), text);
    }

    #[test]
    fn test_register_locales_replaces_table() {
        let l = localizer("en");
        l.register_locales(table(r#"{"de": {"a": {"b": "Hallo"}}}"#), "de");
        assert_eq!(l.active_locale(), "de");
        assert_eq!(l.resolve("a.b").as_deref(), Some("Hallo"));
    }

    #[test]
    fn test_clones_share_table() {
        let l = Localizer::with_language("en");
        let other = l.clone();
        l.register_locales(table(r#"{"en": {"k": "v"}}"#), "en");
        assert_eq!(other.resolve("k").as_deref(), Some("v"));
    }
}
