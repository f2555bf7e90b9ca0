//! Fetch-to-data-URI bridge and the viewer collaborator seam
//!
//! When an overlay is activated, the original image bytes are fetched and
//! re-encoded as a base64 data URI, then handed to an [`ImageViewer`]. The
//! viewer is an injected collaborator: the host wires it to whatever
//! full-size display it provides.
//!
//! The conversion fails open. A transport failure or non-2xx status never
//! raises; the viewer receives an empty payload together with the attempted
//! URL and decides the fallback (typically opening the URL directly).

use crate::resource::ResourceFetcher;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

/// Content type used when the response does not declare one.
const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// Displays a full-size image on behalf of the resizer.
///
/// Exactly one of the arguments is meaningful per call: on success `data`
/// holds a complete `data:` URI and `fallback_url` is empty; on failure
/// `data` is empty and `fallback_url` holds the URL that could not be
/// fetched.
pub trait ImageViewer {
  fn view_image(&self, data: &str, fallback_url: &str);
}

/// Result of the single-shot fetch-and-encode conversion
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataUrlOutcome {
  /// The resource was fetched and encoded as a `data:` URI
  Decoded(String),
  /// The fetch failed; the attempted URL is carried for fallback display
  FetchFailed(String),
}

/// Fetches a resource and converts it to a base64 `data:` URI.
///
/// A `data:` URL passes through unchanged, its payload already being
/// inline. Every fetch failure maps to [`DataUrlOutcome::FetchFailed`];
/// this function never errors.
pub fn fetch_as_data_url(fetcher: &dyn ResourceFetcher, url: &str) -> DataUrlOutcome {
  if url.starts_with("data:") {
    return DataUrlOutcome::Decoded(url.to_string());
  }

  match fetcher.fetch(url) {
    Ok(resource) => {
      let media_type = resource
        .content_type
        .as_deref()
        .and_then(|ct| ct.split(';').next())
        .map(str::trim)
        .filter(|mt| !mt.is_empty())
        .unwrap_or(FALLBACK_CONTENT_TYPE)
        .to_string();
      let payload = BASE64.encode(&resource.bytes);
      DataUrlOutcome::Decoded(format!("data:{};base64,{}", media_type, payload))
    }
    Err(_) => DataUrlOutcome::FetchFailed(url.to_string()),
  }
}

/// Hands a conversion outcome to the viewer.
pub fn deliver(outcome: &DataUrlOutcome, viewer: &dyn ImageViewer) {
  match outcome {
    DataUrlOutcome::Decoded(data) => viewer.view_image(data, ""),
    DataUrlOutcome::FetchFailed(url) => viewer.view_image("", url),
  }
}

/// Fetches the original image at `src` and delivers it to the viewer.
///
/// Touches no document state; a host may call this off the UI thread with
/// the `src` string extracted from the clicked overlay's image.
pub fn view_original(src: &str, fetcher: &dyn ResourceFetcher, viewer: &dyn ImageViewer) {
  deliver(&fetch_as_data_url(fetcher, src), viewer);
}
