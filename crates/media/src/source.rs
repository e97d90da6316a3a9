//! Materialization of path, URL and inline references into the store.

use std::{
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use {
    async_trait::async_trait,
    base64::Engine,
    tokio::io::AsyncWriteExt,
    tracing::{debug, info},
};

use crate::{
    error::{Context, Error, Result},
    store::{ContentStore, MediaResource},
};

const BASE64_SCHEME: &str = "base64://";
const FILE_SCHEME: &str = "file://";

/// Turns a non-hash reference into a store entry.
#[async_trait]
pub trait Materializer: Send + Sync {
    /// `Ok(None)` means the reference points at nothing (e.g. a missing
    /// local path); errors are reserved for failed transfers.
    async fn materialize(&self, reference: &str) -> Result<Option<MediaResource>>;
}

/// HTTP settings for remote sources.
#[derive(Debug, Clone)]
pub struct FetchOptions {
    pub timeout: Duration,
    pub user_agent: Option<String>,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            user_agent: None,
        }
    }
}

/// Stream a response body into `dst`, returning the byte count.
async fn write_body(
    response: &mut reqwest::Response,
    dst: &Path,
    fetch_err: impl Fn(reqwest::Error) -> Error,
) -> Result<u64> {
    let mut file = tokio::fs::File::create(dst)
        .await
        .with_context(|| format!("create {}", dst.display()))?;
    let mut written = 0u64;
    while let Some(chunk) = response.chunk().await.map_err(&fetch_err)? {
        file.write_all(&chunk).await?;
        written += chunk.len() as u64;
    }
    file.flush().await?;
    Ok(written)
}

/// Default [`Materializer`]: `http(s)://`, `base64://`, `file://` and plain
/// local paths.
pub struct SourceFetcher {
    store: Arc<ContentStore>,
    client: reqwest::Client,
}

impl SourceFetcher {
    pub fn new(store: Arc<ContentStore>, options: &FetchOptions) -> Result<Self> {
        let mut builder = reqwest::Client::builder().timeout(options.timeout);
        if let Some(ua) = &options.user_agent {
            builder = builder.user_agent(ua.clone());
        }
        let client = builder.build().context("failed to build HTTP client")?;
        Ok(Self { store, client })
    }

    async fn download(&self, url: &str) -> Result<MediaResource> {
        let fetch_err = |source: reqwest::Error| Error::Fetch {
            url: url.to_string(),
            source,
        };

        let mut response = self
            .client
            .get(url)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(fetch_err)?;

        let scratch = self.store.scratch_path(None);
        let stored = match write_body(&mut response, &scratch, fetch_err).await {
            Ok(written) => {
                info!(url, bytes = written, "downloaded media");
                self.store.ingest(&scratch).await
            },
            Err(e) => Err(e),
        };
        if stored.is_err() {
            let _ = tokio::fs::remove_file(&scratch).await;
        }
        stored
    }

    async fn decode_inline(&self, payload: &str) -> Result<MediaResource> {
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(payload.trim())
            .map_err(|e| Error::invalid_input(format!("invalid base64 payload: {e}")))?;
        self.store.put_bytes(&bytes).await
    }

    async fn import_path(&self, path: &Path) -> Result<Option<MediaResource>> {
        if !tokio::fs::metadata(path).await.is_ok_and(|m| m.is_file()) {
            debug!(path = %path.display(), "local source does not exist");
            return Ok(None);
        }
        self.store.put_file(path).await.map(Some)
    }
}

#[async_trait]
impl Materializer for SourceFetcher {
    async fn materialize(&self, reference: &str) -> Result<Option<MediaResource>> {
        if reference.starts_with("http://") || reference.starts_with("https://") {
            return self.download(reference).await.map(Some);
        }
        if let Some(payload) = reference.strip_prefix(BASE64_SCHEME) {
            return self.decode_inline(payload).await.map(Some);
        }
        let path = reference
            .strip_prefix(FILE_SCHEME)
            .map_or_else(|| PathBuf::from(reference), PathBuf::from);
        self.import_path(&path).await
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {
        super::*,
        wiremock::{
            Mock, MockServer, ResponseTemplate,
            matchers::{header, method, path},
        },
    };

    fn fetcher(dir: &Path, options: &FetchOptions) -> (Arc<ContentStore>, SourceFetcher) {
        let store = Arc::new(ContentStore::open(dir.join("store")).unwrap());
        let fetcher = SourceFetcher::new(Arc::clone(&store), options).unwrap();
        (store, fetcher)
    }

    #[tokio::test]
    async fn test_downloads_http_source() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/cat.png"))
            .and(header("user-agent", "tessera-test"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"hello".to_vec()))
            .expect(1)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let options = FetchOptions {
            user_agent: Some("tessera-test".into()),
            ..FetchOptions::default()
        };
        let (store, fetcher) = fetcher(dir.path(), &options);

        let res = fetcher
            .materialize(&format!("{}/cat.png", server.uri()))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(res.md5, "5d41402abc4b2a76b9719d911017c592");
        assert_eq!(store.get(&res.md5).await, Some(res));
    }

    #[tokio::test]
    async fn test_http_error_status_is_fetch_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let (_store, fetcher) = fetcher(dir.path(), &FetchOptions::default());
        let err = fetcher
            .materialize(&format!("{}/missing.jpg", server.uri()))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Fetch { .. }));
    }

    #[tokio::test]
    async fn test_truncated_download_leaves_no_scratch_file() {
        use tokio::{
            io::{AsyncReadExt, AsyncWriteExt},
            net::TcpListener,
        };

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = [0u8; 1024];
            let _ = socket.read(&mut request).await.unwrap();
            socket
                .write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 100000\r\n\r\nhello")
                .await
                .unwrap();
            socket.shutdown().await.unwrap();
        });

        let dir = tempfile::tempdir().unwrap();
        let (store, fetcher) = fetcher(dir.path(), &FetchOptions::default());
        let err = fetcher
            .materialize(&format!("http://{addr}/clip.mp4"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Fetch { .. }));
        server.await.unwrap();

        let leftover = std::fs::read_dir(store.root().join(".tmp")).unwrap().count();
        assert_eq!(leftover, 0);
        assert!(store.get("5d41402abc4b2a76b9719d911017c592").await.is_none());
    }

    #[tokio::test]
    async fn test_base64_source() {
        let dir = tempfile::tempdir().unwrap();
        let (_store, fetcher) = fetcher(dir.path(), &FetchOptions::default());
        let res = fetcher
            .materialize("base64://aGVsbG8=")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(std::fs::read(&res.path).unwrap(), b"hello");

        let err = fetcher.materialize("base64://!!!").await.unwrap_err();
        assert!(matches!(err, Error::InvalidInput { .. }));
    }

    #[tokio::test]
    async fn test_local_and_file_url_sources() {
        let dir = tempfile::tempdir().unwrap();
        let (_store, fetcher) = fetcher(dir.path(), &FetchOptions::default());
        let src = dir.path().join("note.amr");
        std::fs::write(&src, b"#!AMR\n").unwrap();

        let plain = fetcher
            .materialize(src.to_str().unwrap())
            .await
            .unwrap()
            .unwrap();
        let url = fetcher
            .materialize(&format!("file://{}", src.display()))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(plain, url);

        let missing = dir.path().join("nope.amr");
        assert!(
            fetcher
                .materialize(missing.to_str().unwrap())
                .await
                .unwrap()
                .is_none()
        );
    }
}
