//! Command implementations.

use anyhow::{Context, Result};
use splice_client::{
    CachedFetcher, DirFetcher, Framework, HttpFetcher, InsertMode, LoaderConfig, MemoryDocument, RequestClient,
    RequestConfig, RequestOptions, ResourceFetcher, ReqwestTransport, TemplateOptions,
};
use splice_core::{AppConfig, KvStore, Localizer, MemoryStore, SqliteStore, i18n::load_locale_dir};
use std::sync::Arc;

/// Element templates are rendered into.
const TEMPLATE_TARGET: &str = "template-target";

async fn open_store(config: &AppConfig) -> Result<Arc<dyn KvStore>> {
    match &config.store_path {
        Some(path) => {
            let store = SqliteStore::open(path)
                .await
                .with_context(|| format!("opening session store {}", path.display()))?;
            Ok(Arc::new(store))
        }
        None => Ok(Arc::new(MemoryStore::new())),
    }
}

fn resource_fetcher(config: &AppConfig) -> Result<Arc<dyn ResourceFetcher>> {
    if config.resource_root_is_remote() {
        Ok(Arc::new(HttpFetcher::new(&config.resource_root, &config.user_agent)?))
    } else {
        Ok(Arc::new(DirFetcher::new(&config.resource_root)))
    }
}

async fn localizer(config: &AppConfig) -> Result<Localizer> {
    let localizer = match &config.language {
        Some(language) => Localizer::with_language(language),
        None => Localizer::new(),
    };

    if let Some(dir) = &config.locales_dir {
        let table = load_locale_dir(dir)
            .await
            .with_context(|| format!("loading locales from {}", dir.display()))?;
        localizer.register_locales(table, config.fallback_locale.clone());
    }

    Ok(localizer)
}

async fn framework(config: &AppConfig, document: &MemoryDocument) -> Result<Framework> {
    let fetcher = CachedFetcher::new(resource_fetcher(config)?, open_store(config).await?);
    Ok(Framework::new(fetcher, Arc::new(document.clone()))
        .with_localizer(localizer(config).await?)
        .with_config(LoaderConfig::from(config)))
}

/// Render page `name` and return the root element's HTML.
pub async fn render_page(config: &AppConfig, name: &str) -> Result<String> {
    let document = MemoryDocument::with_element(&config.root_element_id);
    let framework = framework(config, &document).await?;

    framework
        .try_load_page(name)
        .await
        .with_context(|| format!("loading page '{name}'"))?;

    for src in document.scripts().await {
        tracing::info!(src = %src, "script loaded");
    }

    Ok(document
        .inner_html(&config.root_element_id)
        .await
        .unwrap_or_default())
}

/// Render template `path` into an empty element and return its HTML.
pub async fn render_template(
    config: &AppConfig, path: &str, mode: InsertMode, replacements: Vec<(String, String)>,
) -> Result<String> {
    let document = MemoryDocument::with_element(TEMPLATE_TARGET);
    let framework = framework(config, &document).await?;

    let options = TemplateOptions {
        element: TEMPLATE_TARGET.to_string(),
        mode,
        replacements: replacements.into_iter().collect(),
    };
    framework
        .try_load_template(path, &options)
        .await
        .with_context(|| format!("loading template '{path}'"))?;

    Ok(document.inner_html(TEMPLATE_TARGET).await.unwrap_or_default())
}

/// GET `endpoint` relative to `base_url` and return the payload as JSON.
pub async fn get(
    config: &AppConfig, base_url: &str, endpoint: &str, headers: Vec<(String, String)>, reload: bool,
) -> Result<String> {
    let transport = Arc::new(ReqwestTransport::new(&config.user_agent)?);
    let client = RequestClient::new(RequestConfig::new("cli", base_url), open_store(config).await?, transport)?
        .with_ttl(config.request_cache_ttl());

    let mut options = RequestOptions::default();
    for (name, value) in headers {
        options = options.header(name, value);
    }
    if reload {
        options = options.no_cache();
    }

    let response = client.request(endpoint, options).await?;
    tracing::info!(url = %response.url, from_cache = response.from_cache, "request served");

    Ok(serde_json::to_string_pretty(&response.data)?)
}

/// Remove every entry from the persistent session store.
pub async fn clear_cache(config: &AppConfig) -> Result<String> {
    let path = config.require_store_path()?;
    let store = SqliteStore::open(path)
        .await
        .with_context(|| format!("opening session store {}", path.display()))?;
    let removed = store.clear().await?;
    tracing::info!(path = %path.display(), removed, "session cache cleared");
    Ok(format!("removed {removed} cached entries"))
}
