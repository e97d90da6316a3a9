//! Two-tier resource resolution: content hash first, then materialization.

use std::sync::Arc;

use {
    async_trait::async_trait,
    tracing::{debug, warn},
};

use crate::{
    error::{Error, Result},
    source::Materializer,
    store::{ContentStore, MediaResource},
};

#[async_trait]
pub trait ResourceResolver: Send + Sync {
    /// Resolve `reference` (hash, path or URL) to a local file, falling back
    /// to `fallback_url` when the reference yields nothing.
    async fn resolve(&self, reference: &str, fallback_url: Option<&str>) -> Result<MediaResource>;
}

/// Reduce a file reference to its candidate content hash.
///
/// `{9A8B-...}.jpg` style references become `9a8b...`. The result is a hash
/// only if [`is_content_hash`] accepts it.
#[must_use]
pub fn content_hash_of(reference: &str) -> String {
    let stripped: String = reference
        .chars()
        .filter(|c| !matches!(c, '{' | '}' | '-' | ' '))
        .collect();
    let stem = stripped.split('.').next().unwrap_or_default();
    stem.to_ascii_lowercase()
}

#[must_use]
pub fn is_content_hash(candidate: &str) -> bool {
    candidate.len() == 32 && candidate.bytes().all(|b| b.is_ascii_hexdigit())
}

pub struct CachedResolver {
    store: Arc<ContentStore>,
    materializer: Arc<dyn Materializer>,
}

impl CachedResolver {
    pub fn new(store: Arc<ContentStore>, materializer: Arc<dyn Materializer>) -> Self {
        Self {
            store,
            materializer,
        }
    }

    async fn try_materialize(&self, reference: &str) -> Option<MediaResource> {
        match self.materializer.materialize(reference).await {
            Ok(found) => found,
            Err(e) => {
                warn!(reference, error = %e, "failed to materialize media");
                None
            },
        }
    }
}

#[async_trait]
impl ResourceResolver for CachedResolver {
    async fn resolve(&self, reference: &str, fallback_url: Option<&str>) -> Result<MediaResource> {
        let hash = content_hash_of(reference);
        let resolved = if is_content_hash(&hash) {
            debug!(reference, hash, "resolving by content hash");
            self.store.get(&hash).await
        } else {
            self.try_materialize(reference).await
        };

        if let Some(resource) = resolved {
            return Ok(resource);
        }

        if let Some(url) = fallback_url.filter(|u| !u.is_empty()) {
            debug!(reference, url, "falling back to url");
            if let Some(resource) = self.try_materialize(url).await {
                return Ok(resource);
            }
        }

        Err(Error::file_not_found(reference))
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {
        super::*,
        std::sync::atomic::{AtomicUsize, Ordering},
    };

    /// Materializer that stores a fixed payload and counts calls.
    struct CountingMaterializer {
        store: Arc<ContentStore>,
        calls: AtomicUsize,
        payload: Option<&'static [u8]>,
    }

    #[async_trait]
    impl Materializer for CountingMaterializer {
        async fn materialize(&self, _reference: &str) -> Result<Option<MediaResource>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.payload {
                Some(bytes) => self.store.put_bytes(bytes).await.map(Some),
                None => Ok(None),
            }
        }
    }

    struct FailingMaterializer;

    #[async_trait]
    impl Materializer for FailingMaterializer {
        async fn materialize(&self, _reference: &str) -> Result<Option<MediaResource>> {
            Err(Error::invalid_input("boom"))
        }
    }

    fn setup(payload: Option<&'static [u8]>) -> (tempfile::TempDir, Arc<CountingMaterializer>, CachedResolver) {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(ContentStore::open(dir.path()).unwrap());
        let materializer = Arc::new(CountingMaterializer {
            store: Arc::clone(&store),
            calls: AtomicUsize::new(0),
            payload,
        });
        let resolver = CachedResolver::new(store, materializer.clone());
        (dir, materializer, resolver)
    }

    #[test]
    fn test_content_hash_normalisation() {
        assert_eq!(
            content_hash_of("{5D41402A-BC4B-2A76-B971-9D911017C592}.jpg"),
            "5d41402abc4b2a76b9719d911017c592"
        );
        assert!(is_content_hash(&content_hash_of(
            "5d41402abc4b2a76b9719d911017c592.amr"
        )));
        assert!(!is_content_hash(&content_hash_of("/tmp/cat.png")));
        assert!(!is_content_hash(&content_hash_of("https://x.test/a.png")));
        assert!(!is_content_hash("zz41402abc4b2a76b9719d911017c592"));
    }

    #[tokio::test]
    async fn test_same_hash_twice_does_not_rematerialize() {
        let (_dir, materializer, resolver) = setup(Some(b"hello"));

        let first = resolver.resolve("/some/where/hello.txt", None).await.unwrap();
        assert_eq!(materializer.calls.load(Ordering::SeqCst), 1);

        let by_hash = format!("{}.txt", first.md5.to_uppercase());
        let second = resolver.resolve(&by_hash, None).await.unwrap();
        let third = resolver.resolve(&first.md5, None).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(first, third);
        assert_eq!(materializer.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_unknown_hash_without_fallback_is_not_found() {
        let (_dir, materializer, resolver) = setup(Some(b"hello"));
        let err = resolver
            .resolve("00000000000000000000000000000000", None)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::FileNotFound { reference } if reference == "00000000000000000000000000000000"));
        assert_eq!(materializer.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_unknown_hash_uses_fallback_url() {
        let (_dir, materializer, resolver) = setup(Some(b"hello"));
        let res = resolver
            .resolve("00000000000000000000000000000000", Some("https://x.test/a"))
            .await
            .unwrap();
        assert_eq!(res.md5, "5d41402abc4b2a76b9719d911017c592");
        assert_eq!(materializer.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_missing_everywhere() {
        let (_dir, materializer, resolver) = setup(None);
        let err = resolver
            .resolve("/nope.png", Some("https://x.test/nope.png"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::FileNotFound { .. }));
        assert_eq!(materializer.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_materialize_errors_degrade_to_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(ContentStore::open(dir.path()).unwrap());
        let resolver = CachedResolver::new(store, Arc::new(FailingMaterializer));
        let err = resolver.resolve("https://x.test/a.png", None).await.unwrap_err();
        assert!(matches!(err, Error::FileNotFound { .. }));
    }
}
