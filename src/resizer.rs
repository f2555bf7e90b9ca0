//! Scheduling, identity, and scaling for embedded post images
//!
//! [`ImageResizer`] is the page-wide manager. Handed an `<img>` element (or
//! its document id), it either processes the image immediately or defers it
//! until the page's load notification when the rendered dimensions are not
//! yet known. Processing captures the image's original dimensions once,
//! assigns a document-unique id, wraps the image in a positioned container,
//! attaches the click-to-enlarge overlay at the bottom-right corner, and
//! scales the displayed size into the post viewport.
//!
//! One manager per page; it lives as long as the page does and needs no
//! teardown.

use crate::dom;
use crate::error::{DomError, Result};
use crate::geometry;
use crate::geometry::Size;
use crate::resource::ResourceFetcher;
use crate::viewer::{view_original, ImageViewer};
use markup5ever_rcdom::Handle;

/// Prefix of the ids assigned to managed images
pub const ID_BASE: &str = "postfit_image_";

/// Suffix appended to a managed image's id to form its overlay's id
pub const OVERLAY_ID_SUFFIX: &str = "_overlay";

/// Class carried by every overlay element
pub const OVERLAY_CLASS: &str = "image_overlay";

/// Default icon shown in the overlay corner
pub const DEFAULT_OVERLAY_ICON: &str = "images/view-image.png";

/// Affordance text for images shown at their natural size
pub const PHRASE_CLICK_TO_ENLARGE: &str = "Click to view the full image.";

/// Affordance text for images the resizer has scaled down
pub const PHRASE_RESIZED_CLICK_TO_ENLARGE: &str =
  "This image has been resized. Click to view the full image.";

/// Affordance text for images currently shown at full size
pub const PHRASE_CLICK_TO_SHRINK: &str = "Click to view the small image.";

// Captured original dimensions ride on the element itself, so they survive
// re-processing and never depend on manager state.
const ORIGINAL_WIDTH_ATTR: &str = "data-original-width";
const ORIGINAL_HEIGHT_ATTR: &str = "data-original-height";

/// What `process` did with an image
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProcessOutcome {
  /// The image is managed; `display` is its new on-page size
  Resized { id: u32, display: Size },
  /// Both dimensions were under the small-image threshold; untouched
  SkippedSmall,
  /// Dimensions were not yet known; queued for the page-load retry
  /// (or dropped, when the retry itself still saw no dimensions)
  Deferred,
}

/// Page-wide resizer: pending queue plus the derived-id scheme.
pub struct ImageResizer {
  pending: Vec<Handle>,
  overlay_icon: String,
}

impl Default for ImageResizer {
  fn default() -> Self {
    Self::new()
  }
}

impl ImageResizer {
  /// Creates a manager with the default overlay icon.
  pub fn new() -> Self {
    Self {
      pending: Vec::new(),
      overlay_icon: DEFAULT_OVERLAY_ICON.to_string(),
    }
  }

  /// Replaces the overlay icon source URL.
  pub fn with_overlay_icon(mut self, src: impl Into<String>) -> Self {
    self.overlay_icon = src.into();
    self
  }

  /// Processes one image element.
  ///
  /// Images whose rendered dimensions are unknown (zero or absent
  /// width/height) are queued for the page-load retry. Images under the
  /// small-image threshold on both axes are skipped. Anything that is not
  /// an `<img>` element is a [`DomError::NotAnImage`] error; the caller
  /// decides whether to surface it as a blocking dialog.
  ///
  /// Re-invoking on an already managed image re-scales from the captured
  /// original dimensions and repositions the existing overlay. It never
  /// creates a second overlay, consumes a new id, or rewrites the captured
  /// originals.
  pub fn process(&mut self, doc: &Handle, img: &Handle) -> Result<ProcessOutcome> {
    self.process_inner(doc, img, false)
  }

  /// Processes the image carrying the given document id.
  pub fn process_by_id(&mut self, doc: &Handle, id: &str) -> Result<ProcessOutcome> {
    let img = dom::get_element_by_id(doc, id).ok_or_else(|| DomError::ElementNotFound {
      id: id.to_string(),
    })?;
    self.process_inner(doc, &img, false)
  }

  /// True while deferred images are queued; the host must arrange for
  /// [`page_loaded`](Self::page_loaded) to run once the page finishes
  /// loading.
  pub fn needs_load_notification(&self) -> bool {
    !self.pending.is_empty()
  }

  /// Number of images awaiting the page-load retry.
  pub fn pending_count(&self) -> usize {
    self.pending.len()
  }

  /// Retries every deferred image, in enqueue order.
  ///
  /// The queue is consumed exactly once: images whose dimensions are still
  /// unknown are dropped rather than requeued.
  pub fn page_loaded(&mut self, doc: &Handle) -> Result<Vec<ProcessOutcome>> {
    let pending = std::mem::take(&mut self.pending);
    let mut outcomes = Vec::with_capacity(pending.len());
    for img in &pending {
      outcomes.push(self.process_inner(doc, img, true)?);
    }
    Ok(outcomes)
  }

  fn process_inner(&mut self, doc: &Handle, img: &Handle, deferred_retry: bool) -> Result<ProcessOutcome> {
    match dom::tag_name(img) {
      Some(tag) if tag == "img" => {}
      Some(tag) => {
        return Err(
          DomError::NotAnImage {
            found: format!("<{}>", tag),
          }
          .into(),
        )
      }
      None => {
        return Err(
          DomError::NotAnImage {
            found: "a non-element node".to_string(),
          }
          .into(),
        )
      }
    }

    let width = dom::attr_f64(img, "width").unwrap_or(0.0);
    let height = dom::attr_f64(img, "height").unwrap_or(0.0);

    if width == 0.0 || height == 0.0 {
      if !deferred_retry {
        self.pending.push(img.clone());
      }
      return Ok(ProcessOutcome::Deferred);
    }

    if width < geometry::SMALL_IMAGE_MIN && height < geometry::SMALL_IMAGE_MIN {
      return Ok(ProcessOutcome::SkippedSmall);
    }

    if dom::get_attr(img, ORIGINAL_WIDTH_ATTR).is_none() {
      dom::set_attr(img, ORIGINAL_WIDTH_ATTR, &geometry::format_px(width));
    }
    if dom::get_attr(img, ORIGINAL_HEIGHT_ATTR).is_none() {
      dom::set_attr(img, ORIGINAL_HEIGHT_ATTR, &geometry::format_px(height));
    }

    // Re-entry: a managed image keeps its id and overlay; only the display
    // size and overlay position are refreshed.
    if let Some(id) = managed_id(img) {
      let image_id = format!("{}{}", ID_BASE, id);
      if let Some(overlay) = dom::get_element_by_id(doc, &overlay_id(&image_id)) {
        let display = scale(img, &overlay)?;
        return Ok(ProcessOutcome::Resized { id, display });
      }
    }

    let id = next_free_id(doc);
    let image_id = format!("{}{}", ID_BASE, id);
    dom::set_attr(img, "id", &image_id);

    let overlay = self.build_overlay(img, &image_id)?;
    let display = scale(img, &overlay)?;
    Ok(ProcessOutcome::Resized { id, display })
  }

  /// Wraps the image in a positioned container and appends the overlay.
  ///
  /// The container replaces the image at its old position; the image moves
  /// inside, followed by the overlay, so the image always precedes the
  /// overlay in document order.
  fn build_overlay(&self, img: &Handle, image_id: &str) -> Result<Handle> {
    let parent = dom::parent_of(img).ok_or_else(|| DomError::Detached {
      tag: "img".to_string(),
    })?;

    let container = dom::create_element("div");
    dom::set_attr(&container, "style", "position: relative;");

    let overlay = dom::create_element("img");
    dom::set_attr(&overlay, "id", &overlay_id(image_id));
    dom::set_attr(&overlay, "class", OVERLAY_CLASS);
    dom::set_attr(&overlay, "src", &self.overlay_icon);
    dom::set_attr(&overlay, "alt", PHRASE_RESIZED_CLICK_TO_ENLARGE);
    dom::set_attr(&overlay, "title", PHRASE_RESIZED_CLICK_TO_ENLARGE);

    dom::insert_before(&parent, &container, img);
    dom::detach(img);
    dom::append_child(&container, img);
    dom::append_child(&container, &overlay);
    Ok(overlay)
  }
}

/// Handles an overlay activation.
///
/// Derives the owning image from the overlay id, fetches the image's
/// original (never rewritten) `src`, and delivers the result to the viewer.
/// The click is always consumed: fetch failures reach the viewer as an
/// empty payload with the original URL, never as an error. Errors here mean
/// the overlay or its image could not be found in the document.
pub fn overlay_clicked(
  doc: &Handle,
  overlay_id: &str,
  fetcher: &dyn ResourceFetcher,
  viewer: &dyn ImageViewer,
) -> Result<()> {
  let image_id = image_id_for_overlay(overlay_id).ok_or_else(|| DomError::ElementNotFound {
    id: overlay_id.to_string(),
  })?;
  let img = dom::get_element_by_id(doc, image_id).ok_or_else(|| DomError::ElementNotFound {
    id: image_id.to_string(),
  })?;
  let src = dom::get_attr(&img, "src").ok_or_else(|| DomError::MissingAttribute {
    attribute: "src".to_string(),
  })?;

  view_original(&src, fetcher, viewer);
  Ok(())
}

/// Forms the overlay id for a managed image id.
pub fn overlay_id(image_id: &str) -> String {
  format!("{}{}", image_id, OVERLAY_ID_SUFFIX)
}

/// Recovers the owning image's id from an overlay id.
pub fn image_id_for_overlay(overlay_id: &str) -> Option<&str> {
  overlay_id.strip_suffix(OVERLAY_ID_SUFFIX)
}

fn managed_id(img: &Handle) -> Option<u32> {
  dom::get_attr(img, "id")?.strip_prefix(ID_BASE)?.parse().ok()
}

/// Scans from 1 for the first id with no document-wide collision.
///
/// O(n) per call in the number of managed images; forum pages carry few
/// enough images that no issued-id index is kept.
fn next_free_id(doc: &Handle) -> u32 {
  let mut id = 1;
  while dom::get_element_by_id(doc, &format!("{}{}", ID_BASE, id)).is_some() {
    id += 1;
  }
  id
}

/// Applies the viewport fit and repositions the overlay.
///
/// The display size is always recomputed from the captured originals, so
/// repeated scaling cannot compound.
fn scale(img: &Handle, overlay: &Handle) -> Result<Size> {
  let original = Size::new(
    dom::attr_f64(img, ORIGINAL_WIDTH_ATTR).ok_or_else(|| DomError::MissingAttribute {
      attribute: ORIGINAL_WIDTH_ATTR.to_string(),
    })?,
    dom::attr_f64(img, ORIGINAL_HEIGHT_ATTR).ok_or_else(|| DomError::MissingAttribute {
      attribute: ORIGINAL_HEIGHT_ATTR.to_string(),
    })?,
  );

  let display = geometry::fit_to_viewport(original);
  dom::set_attr(img, "width", &geometry::format_px(display.width));
  dom::set_attr(img, "height", &geometry::format_px(display.height));

  let position = geometry::overlay_position(display.width);
  dom::set_attr(
    overlay,
    "style",
    &format!(
      "position: absolute; bottom: {}px; left: {}px;",
      geometry::format_px(position.bottom),
      geometry::format_px(position.left),
    ),
  );

  Ok(display)
}
