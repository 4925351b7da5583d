//! Fragment load stages and failures.

use crate::dom::DomError;
use crate::fetch::FetchError;
use std::fmt;

/// Stages a page or template load moves through, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStage {
    Fetching,
    Translating,
    Including,
    ScriptLoading,
    Splicing,
    CallbackDispatch,
    IconRefresh,
    Done,
}

impl fmt::Display for LoadStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Fetching => "fetching",
            Self::Translating => "translating",
            Self::Including => "including",
            Self::ScriptLoading => "script_loading",
            Self::Splicing => "splicing",
            Self::CallbackDispatch => "callback_dispatch",
            Self::IconRefresh => "icon_refresh",
            Self::Done => "done",
        })
    }
}

/// Why a page or template load failed.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to fetch {path}: {source}")]
    Fetch {
        path: String,
        #[source]
        source: FetchError,
    },

    #[error("root element #{0} not found")]
    MissingRoot(String),

    #[error("target element #{0} not found")]
    MissingElement(String),

    #[error("include depth limit {limit} exceeded at '{name}'")]
    IncludeDepth { name: String, limit: usize },

    #[error("script {src} failed: {source}")]
    Script {
        src: String,
        #[source]
        source: DomError,
    },

    #[error(transparent)]
    Dom(#[from] DomError),
}

impl LoadError {
    /// The stage the load was in when this error occurred.
    pub fn stage(&self) -> LoadStage {
        match self {
            Self::Fetch { path, .. } if path.starts_with("includes/") => LoadStage::Including,
            Self::Fetch { .. } => LoadStage::Fetching,
            Self::IncludeDepth { .. } => LoadStage::Including,
            Self::Script { .. } => LoadStage::ScriptLoading,
            Self::MissingRoot(_) | Self::MissingElement(_) | Self::Dom(_) => LoadStage::Splicing,
        }
    }
}
