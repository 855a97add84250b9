use std::sync::Arc;

use serde::de::DeserializeOwned;
use thiserror::Error;
use url::Url;

use super::types::{Collections, ContentBundle, PartnerItem};
use crate::net::{Fetch, FetchError};

pub const CONTENT_DOCUMENT: &str = "content.json";
pub const TV_DOCUMENT: &str = "tv.json";
pub const OTT_DOCUMENT: &str = "ott.json";

/// Shown in place of the whole screen when `content.json` cannot be loaded.
pub const FATAL_LOAD_MESSAGE: &str = "Error loading core application files. Please try again later.";

/// Shown in the content region when the partner collections cannot be loaded.
pub const PARTIAL_LOAD_MESSAGE: &str =
    "Could not load page data. Please check your connection and try again.";

// ============================================================================
// Errors
// ============================================================================

/// Why a single document could not be turned into data.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("{document}: {source}")]
    Fetch {
        document: &'static str,
        #[source]
        source: FetchError,
    },
    #[error("{document}: HTTP status {status}")]
    Status { document: &'static str, status: u16 },
    #[error("{document}: invalid JSON: {source}")]
    Json {
        document: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("{document}: cannot resolve against base URL: {source}")]
    Url {
        document: &'static str,
        #[source]
        source: url::ParseError,
    },
}

/// Load failures, split by how much of the screen they take down.
#[derive(Debug, Error)]
pub enum LoadError {
    /// `content.json` failed: nothing else can be shown.
    #[error("fatal: {0}")]
    Fatal(#[source] DocumentError),
    /// A partner collection failed: navigation chrome stays usable.
    #[error("page data: {0}")]
    Partial(#[source] DocumentError),
}

impl LoadError {
    /// The fixed message the UI shows for this failure.
    pub fn user_message(&self) -> &'static str {
        match self {
            LoadError::Fatal(_) => FATAL_LOAD_MESSAGE,
            LoadError::Partial(_) => PARTIAL_LOAD_MESSAGE,
        }
    }
}

// ============================================================================
// Loading
// ============================================================================

async fn fetch_json<T: DeserializeOwned>(
    fetch: &dyn Fetch,
    base: &Url,
    document: &'static str,
) -> Result<T, DocumentError> {
    let url = base
        .join(document)
        .map_err(|source| DocumentError::Url { document, source })?;

    let response = fetch
        .fetch(&url)
        .await
        .map_err(|source| DocumentError::Fetch { document, source })?;

    if !response.is_success() {
        return Err(DocumentError::Status {
            document,
            status: response.status,
        });
    }

    let value = serde_json::from_slice(&response.body)
        .map_err(|source| DocumentError::Json { document, source })?;

    tracing::debug!(
        document,
        bytes = response.body.len(),
        from_cache = response.from_cache,
        "Loaded document"
    );
    Ok(value)
}

/// Fetch and parse `content.json`. Any failure is fatal.
pub async fn load_bundle(fetch: &dyn Fetch, base: &Url) -> Result<ContentBundle, LoadError> {
    fetch_json(fetch, base, CONTENT_DOCUMENT)
        .await
        .map_err(LoadError::Fatal)
}

/// Fetch `tv.json` and `ott.json` concurrently.
///
/// Both must succeed; the first failure cancels the other fetch and the
/// caller gets no partial data.
pub async fn load_collections(fetch: &dyn Fetch, base: &Url) -> Result<Collections, LoadError> {
    let (tv, ott) = tokio::try_join!(
        fetch_json::<Vec<PartnerItem>>(fetch, base, TV_DOCUMENT),
        fetch_json::<Vec<PartnerItem>>(fetch, base, OTT_DOCUMENT),
    )
    .map_err(LoadError::Partial)?;

    tracing::info!(tv = tv.len(), ott = ott.len(), "Partner collections loaded");
    Ok(Collections {
        tv: Arc::new(tv),
        ott: Arc::new(ott),
    })
}
