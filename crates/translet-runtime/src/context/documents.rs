//! Secondary input documents for the `document()` function.
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};

use lru::LruCache;
use tracing::{debug, trace};
use url::Url;

use crate::error::{Error, ErrorCode};

/// Supplies parsed documents by absolute URI. `Ok(None)` means "not found".
pub trait DocumentCache<N>: Send + Sync {
    fn retrieve(&self, uri: &str) -> Result<Option<N>, Error>;
}

/// Parses documents; wrapped by [`CachingDocumentLoader`] to avoid repeated parsing.
pub trait DocumentLoader<N>: Send + Sync {
    fn load(&self, uri: &str) -> Result<Option<N>, Error>;
}

impl<N, F> DocumentLoader<N> for F
where
    F: Fn(&str) -> Result<Option<N>, Error> + Send + Sync,
{
    fn load(&self, uri: &str) -> Result<Option<N>, Error> {
        self(uri)
    }
}

/// Keeps the most recently used documents so that repeated `document()` calls with the
/// same URI yield the same tree.
pub struct CachingDocumentLoader<N, L> {
    loader: L,
    cache: Mutex<LruCache<String, N>>,
}

impl<N, L> CachingDocumentLoader<N, L> {
    pub const DEFAULT_CAPACITY: usize = 64;

    pub fn new(loader: L) -> Self {
        Self::with_capacity(loader, NonZeroUsize::new(Self::DEFAULT_CAPACITY).unwrap_or(NonZeroUsize::MIN))
    }

    pub fn with_capacity(loader: L, capacity: NonZeroUsize) -> Self {
        Self { loader, cache: Mutex::new(LruCache::new(capacity)) }
    }
}

impl<N, L> DocumentCache<N> for CachingDocumentLoader<N, L>
where
    N: Clone + Send + Sync,
    L: DocumentLoader<N>,
{
    fn retrieve(&self, uri: &str) -> Result<Option<N>, Error> {
        {
            let mut cache = self.cache.lock().map_err(|_| Error::internal("document cache"))?;
            if let Some(doc) = cache.get(uri) {
                trace!(uri, "document cache hit");
                return Ok(Some(doc.clone()));
            }
        }
        debug!(uri, "loading document");
        let loaded = self.loader.load(uri)?;
        if let Some(doc) = &loaded {
            let mut cache = self.cache.lock().map_err(|_| Error::internal("document cache"))?;
            cache.put(uri.to_string(), doc.clone());
        }
        Ok(loaded)
    }
}

/// Resolve `href` against `base`. Absolute references are returned unchanged; relative
/// ones without a base are passed through for the cache to interpret.
pub fn resolve_uri(href: &str, base: Option<&str>) -> Result<String, Error> {
    if let Ok(abs) = Url::parse(href) {
        return Ok(abs.to_string());
    }
    let Some(base) = base.filter(|b| !b.is_empty()) else {
        return Ok(href.to_string());
    };
    let unresolved = |e: url::ParseError| {
        Error::from_code(ErrorCode::CANT_RESOLVE_RELATIVE_URI_ERR, [href])
            .with_source(Some(Arc::new(e) as Arc<dyn std::error::Error + Send + Sync>))
    };
    let joined = Url::parse(base).and_then(|b| b.join(href)).map_err(unresolved)?;
    Ok(joined.to_string())
}
