//! Fragment loader: pages, includes and templates.
//!
//! ### Page pipeline
//! 1. Fetch `pages/<name>/index.html` through the session cache
//! 2. Translate `{{ locale.<key> }}` tokens
//! 3. Expand `<!-- include('<name>') -->` markers depth-first; each include
//!    is fetched, translated, expanded and has its scripts loaded under
//!    `includes/<name>`
//! 4. Load the page's scripts under `pages/<name>`
//! 5. Splice the result into the root element
//! 6. Run the page callback, then each include callback
//! 7. Refresh icons and record the current page on the root element
//!
//! Script markers are removed once their scripts are loaded, so a parent
//! never re-resolves an include's scripts against its own base path.
//!
//! `load_page` and `load_template` never fail to their caller: errors are
//! logged with the stage they happened in. The `try_` variants return them.

pub mod error;
pub mod markers;

pub use error::{LoadError, LoadStage};

use crate::dom::{Document, Icons, InsertMode, NoIcons};
use crate::fetch::CachedFetcher;
use futures_util::future::{BoxFuture, try_join_all};
use regex::{Captures, Regex};
use splice_core::{AppConfig, Callback, LocaleTable, Localizer, Registry};
use std::collections::BTreeMap;
use std::sync::{Arc, LazyLock};

/// Include nesting beyond this depth is treated as a cycle.
const MAX_INCLUDE_DEPTH: usize = 16;

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([^{}]+)\}").expect("placeholder pattern is valid"));

/// Where pages are spliced and how the current page is recorded.
#[derive(Debug, Clone)]
pub struct LoaderConfig {
    /// Id of the element pages are spliced into (default: `_root`).
    pub root_element_id: String,
    /// Attribute on the root element holding the current page (default: `data-page`).
    pub page_attribute: String,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self { root_element_id: "_root".to_string(), page_attribute: "data-page".to_string() }
    }
}

impl From<&AppConfig> for LoaderConfig {
    fn from(config: &AppConfig) -> Self {
        Self { root_element_id: config.root_element_id.clone(), page_attribute: config.page_attribute.clone() }
    }
}

/// Options for [`Framework::load_template`].
#[derive(Debug, Clone, Default)]
pub struct TemplateOptions {
    /// Id of the element receiving the template.
    pub element: String,
    pub mode: InsertMode,
    /// `{key}` → value literal substitutions.
    pub replacements: BTreeMap<String, String>,
}

impl TemplateOptions {
    pub fn new(element: impl Into<String>, mode: InsertMode) -> Self {
        Self { element: element.into(), mode, replacements: BTreeMap::new() }
    }

    pub fn replace(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.replacements.insert(key.into(), value.into());
        self
    }
}

/// Replace every `{key}` token whose key is in `replacements`.
///
/// One pass over the template: inserted values are never rescanned, so the
/// result does not depend on key order. Unknown `{...}` tokens stay as is.
pub fn apply_replacements(html: &str, replacements: &BTreeMap<String, String>) -> String {
    if replacements.is_empty() {
        return html.to_string();
    }

    PLACEHOLDER
        .replace_all(html, |caps: &Captures<'_>| match replacements.get(&caps[1]) {
            Some(value) => value.clone(),
            None => caps[0].to_string(),
        })
        .into_owned()
}

/// Fragment loader bound to a document host.
#[derive(Clone)]
pub struct Framework {
    registry: Registry,
    localizer: Localizer,
    fetcher: CachedFetcher,
    document: Arc<dyn Document>,
    icons: Arc<dyn Icons>,
    config: LoaderConfig,
}

impl Framework {
    pub fn new(fetcher: CachedFetcher, document: Arc<dyn Document>) -> Self {
        Self {
            registry: Registry::new(),
            localizer: Localizer::new(),
            fetcher,
            document,
            icons: Arc::new(NoIcons),
            config: LoaderConfig::default(),
        }
    }

    pub fn with_registry(mut self, registry: Registry) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_localizer(mut self, localizer: Localizer) -> Self {
        self.localizer = localizer;
        self
    }

    pub fn with_icons(mut self, icons: Arc<dyn Icons>) -> Self {
        self.icons = icons;
        self
    }

    pub fn with_config(mut self, config: LoaderConfig) -> Self {
        self.config = config;
        self
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn localizer(&self) -> &Localizer {
        &self.localizer
    }

    pub fn register(&self, key: impl Into<String>, callback: Callback) {
        self.registry.register(key, callback);
    }

    pub async fn execute(&self, key: &str) {
        self.registry.execute(key).await;
    }

    pub fn register_locales(&self, table: LocaleTable, fallback: impl Into<String>) {
        self.localizer.register_locales(table, fallback);
    }

    /// Name of the most recently loaded page, read from the root element.
    pub async fn current_page(&self) -> Option<String> {
        self.document
            .attribute(&self.config.root_element_id, &self.config.page_attribute)
            .await
    }

    /// Load page `name` into the root element, logging any failure.
    pub async fn load_page(&self, name: &str) {
        if let Err(e) = self.try_load_page(name).await {
            tracing::error!(page = name, stage = %e.stage(), error = %e, "failed to load page");
        }
    }

    /// Load page `name` into the root element.
    pub async fn try_load_page(&self, name: &str) -> Result<(), LoadError> {
        let key = format!("pages/{name}");

        tracing::trace!(page = name, stage = %LoadStage::Fetching, "entering stage");
        let html = self.fetch(&format!("{key}/index.html")).await?;

        tracing::trace!(page = name, stage = %LoadStage::Translating, "entering stage");
        let html = self.localizer.apply_translations(&html);

        tracing::trace!(page = name, stage = %LoadStage::Including, "entering stage");
        let mut includes = Vec::new();
        let html = self.expand_includes(html, &mut includes, 0).await?;

        tracing::trace!(page = name, stage = %LoadStage::ScriptLoading, "entering stage");
        let html = self.load_scripts(&html, &key).await?;

        tracing::trace!(page = name, stage = %LoadStage::Splicing, "entering stage");
        let root = &self.config.root_element_id;
        if !self.document.has_element(root).await {
            return Err(LoadError::MissingRoot(root.clone()));
        }
        self.document.insert_html(root, InsertMode::InnerHtml, &html).await?;

        tracing::trace!(page = name, stage = %LoadStage::CallbackDispatch, "entering stage");
        self.registry.execute(&key).await;
        for include in &includes {
            self.registry.execute(include).await;
        }

        tracing::trace!(page = name, stage = %LoadStage::IconRefresh, "entering stage");
        self.icons.refresh();
        self.document
            .set_attribute(root, &self.config.page_attribute, name)
            .await?;

        tracing::debug!(page = name, includes = includes.len(), stage = %LoadStage::Done, "page loaded");
        Ok(())
    }

    /// Load template `path` into `options.element`, logging any failure.
    pub async fn load_template(&self, path: &str, options: &TemplateOptions) {
        if let Err(e) = self.try_load_template(path, options).await {
            tracing::error!(template = path, stage = %e.stage(), error = %e, "failed to load template");
        }
    }

    /// Load template `path` into `options.element`.
    ///
    /// Scripts load first, then `{key}` replacements apply, then translations.
    /// The template callback only runs when one is registered.
    pub async fn try_load_template(&self, path: &str, options: &TemplateOptions) -> Result<(), LoadError> {
        let key = format!("templates/{path}");

        let html = self.fetch(&format!("{key}/index.html")).await?;
        let html = self.load_scripts(&html, &key).await?;
        let html = apply_replacements(&html, &options.replacements);
        let html = self.localizer.apply_translations(&html);

        if !self.document.has_element(&options.element).await {
            return Err(LoadError::MissingElement(options.element.clone()));
        }
        self.document
            .insert_html(&options.element, options.mode, &html)
            .await?;

        if self.registry.contains(&key) {
            self.registry.execute(&key).await;
        }

        self.icons.refresh();
        tracing::debug!(template = path, element = %options.element, mode = %options.mode, "template loaded");
        Ok(())
    }

    async fn fetch(&self, path: &str) -> Result<String, LoadError> {
        self.fetcher
            .fetch_with_cache(path)
            .await
            .map_err(|source| LoadError::Fetch { path: path.to_string(), source })
    }

    /// Replace include markers in `html` with their resolved fragments.
    ///
    /// Include keys are pushed once an include is fully resolved, so nested
    /// includes precede their parent and siblings keep document order.
    fn expand_includes<'a>(
        &'a self, html: String, keys: &'a mut Vec<String>, depth: usize,
    ) -> BoxFuture<'a, Result<String, LoadError>> {
        Box::pin(async move {
            let includes = markers::find_includes(&html);
            if includes.is_empty() {
                return Ok(html);
            }

            let mut out = String::with_capacity(html.len());
            let mut last = 0;
            for marker in includes {
                if depth >= MAX_INCLUDE_DEPTH {
                    return Err(LoadError::IncludeDepth { name: marker.name, limit: MAX_INCLUDE_DEPTH });
                }

                out.push_str(&html[last..marker.start]);

                let key = format!("includes/{}", marker.name);
                let fragment = self.fetch(&format!("{key}/index.html")).await?;
                let fragment = self.localizer.apply_translations(&fragment);
                let fragment = self.expand_includes(fragment, keys, depth + 1).await?;
                let fragment = self.load_scripts(&fragment, &key).await?;

                out.push_str(&fragment);
                keys.push(key);
                last = marker.end;
            }
            out.push_str(&html[last..]);

            Ok(out)
        })
    }

    /// Load every script marked in `html` from `<base>/<name>.js`.
    ///
    /// Scripts already present in the document are skipped. The rest load
    /// concurrently; all must finish before this returns.
    ///
    /// Returns `html` with the script marker comments removed, so spliced
    /// HTML never carries them and an enclosing page cannot resolve an
    /// include's scripts a second time against its own path.
    async fn load_scripts(&self, html: &str, base: &str) -> Result<String, LoadError> {
        let found = markers::find_scripts(html);
        if found.is_empty() {
            return Ok(html.to_string());
        }

        let mut sources: Vec<String> = Vec::with_capacity(found.len());
        for marker in &found {
            let src = self.fetcher.resolve(&format!("{base}/{}.js", marker.name));
            if !sources.contains(&src) {
                sources.push(src);
            }
        }

        try_join_all(sources.iter().map(|src| async move {
            if self.document.has_script(src).await {
                tracing::debug!(src = %src, "script already loaded");
                return Ok(());
            }
            self.document
                .load_script(src)
                .await
                .map_err(|source| LoadError::Script { src: src.clone(), source })
        }))
        .await?;

        tracing::debug!(base, scripts = sources.len(), "scripts loaded");
        Ok(markers::strip_scripts(html))
    }
}
