//! Resource fetching abstraction
//!
//! Trait-based fetching of image bytes so the resizer stays agnostic about
//! how the bytes arrive. The overlay click path goes through this seam,
//! which makes offline tests and host-specific transports straightforward:
//!
//! - [`HttpFetcher`]: default blocking implementation with timeouts
//! - Custom implementations for caching, mocking, offline mode, etc.
//!
//! # Example
//!
//! ```rust,ignore
//! use postfit::resource::{HttpFetcher, ResourceFetcher};
//!
//! let fetcher = HttpFetcher::new();
//! let resource = fetcher.fetch("https://example.com/image.png")?;
//! println!("Got {} bytes", resource.bytes.len());
//! ```

use crate::error::{Error, FetchError, Result};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Default User-Agent string used by [`HttpFetcher`]
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36 postfit/0.1";

/// Result of fetching an external resource
#[derive(Debug, Clone)]
pub struct FetchedResource {
    /// Raw bytes of the resource
    pub bytes: Vec<u8>,
    /// Content-Type header value, if available (e.g., "image/png")
    pub content_type: Option<String>,
}

impl FetchedResource {
    /// Create a new FetchedResource
    pub fn new(bytes: Vec<u8>, content_type: Option<String>) -> Self {
        Self { bytes, content_type }
    }

    /// Check if this resource appears to be an image based on content-type
    pub fn is_image(&self) -> bool {
        self.content_type
            .as_ref()
            .map(|ct| ct.starts_with("image/"))
            .unwrap_or(false)
    }
}

/// Trait for fetching external resources
///
/// URLs can be:
/// - `http://` or `https://` - fetch over network
/// - `file://` or a bare path - read from the filesystem
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`. The document tree is
/// single-threaded, but the fetch itself only needs the source URL, so a
/// host may run it off the UI thread.
pub trait ResourceFetcher: Send + Sync {
    /// Fetch a resource from the given URL
    ///
    /// Returns `Ok(FetchedResource)` with the bytes and optional
    /// content-type. Transport failures and non-2xx statuses are errors;
    /// the fail-open policy for overlay clicks lives in
    /// [`crate::viewer::fetch_as_data_url`], not here.
    fn fetch(&self, url: &str) -> Result<FetchedResource>;
}

// Allow Arc<dyn ResourceFetcher> to be used as ResourceFetcher
impl<T: ResourceFetcher + ?Sized> ResourceFetcher for Arc<T> {
    fn fetch(&self, url: &str) -> Result<FetchedResource> {
        (**self).fetch(url)
    }
}

/// Default HTTP resource fetcher
///
/// Fetches resources over HTTP/HTTPS with configurable timeout, user agent,
/// and response size limit. Also handles `file://` URLs and bare paths.
///
/// # Example
///
/// ```rust,ignore
/// use postfit::resource::HttpFetcher;
/// use std::time::Duration;
///
/// let fetcher = HttpFetcher::new()
///     .with_timeout(Duration::from_secs(60))
///     .with_user_agent("MyApp/1.0");
/// ```
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    timeout: Duration,
    user_agent: String,
    max_size: usize,
}

impl HttpFetcher {
    /// Create a new HttpFetcher with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the User-Agent header
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set the maximum response size in bytes
    pub fn with_max_size(mut self, max_size: usize) -> Self {
        self.max_size = max_size;
        self
    }

    /// Fetch from an HTTP/HTTPS URL
    fn fetch_http(&self, url: &str) -> Result<FetchedResource> {
        let config = ureq::Agent::config_builder()
            .timeout_global(Some(self.timeout))
            .build();
        let agent: ureq::Agent = config.into();

        let mut response = agent
            .get(url)
            .header("User-Agent", &self.user_agent)
            .call()
            .map_err(|e| {
                Error::Fetch(FetchError::RequestFailed {
                    url: url.to_string(),
                    reason: e.to_string(),
                })
            })?;

        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|h| h.to_str().ok())
            .map(|s| s.to_string());

        let bytes = response
            .body_mut()
            .with_config()
            .limit(self.max_size as u64)
            .read_to_vec()
            .map_err(|e| Error::Io(e.into_io()))?;

        Ok(FetchedResource::new(bytes, content_type))
    }

    /// Fetch from a file:// URL or bare path
    fn fetch_file(&self, url: &str) -> Result<FetchedResource> {
        let path = url.strip_prefix("file://").unwrap_or(url);
        let bytes = std::fs::read(path).map_err(|e| {
            Error::Fetch(FetchError::RequestFailed {
                url: url.to_string(),
                reason: e.to_string(),
            })
        })?;

        let content_type = guess_content_type_from_path(path);
        Ok(FetchedResource::new(bytes, content_type))
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            max_size: 50 * 1024 * 1024, // 50MB default limit
        }
    }
}

impl ResourceFetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<FetchedResource> {
        if url.starts_with("http://") || url.starts_with("https://") {
            self.fetch_http(url)
        } else {
            self.fetch_file(url)
        }
    }
}

/// Guess content-type from file path extension
pub(crate) fn guess_content_type_from_path(path: &str) -> Option<String> {
    let ext = Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())?;

    let mime = match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "ico" => "image/x-icon",
        "bmp" => "image/bmp",
        _ => return None,
    };

    Some(mime.to_string())
}
