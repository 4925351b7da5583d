//! Client-side fragment framework for splice.
//!
//! This crate provides the host seams (resources, document, icons, HTTP),
//! the cached fragment fetcher, the page/template loader and the JSON
//! request helper.

pub mod dom;
pub mod fetch;
pub mod loader;
pub mod request;

pub use dom::{CountingIcons, Document, DomError, Icons, InsertMode, MemoryDocument, NoIcons};
pub use fetch::{CachedFetcher, DirFetcher, FetchError, HttpFetcher, MemoryFetcher, ResourceFetcher};
pub use loader::{Framework, LoadError, LoadStage, LoaderConfig, TemplateOptions};
pub use request::{
    RequestClient, RequestConfig, RequestError, RequestOptions, ReqwestTransport, Response, Transport,
};
