//! Geometry for fitting images into the post viewport
//!
//! All units are CSS pixels. The viewport bounds and overlay insets are
//! fixed constants shared with the forum page's stylesheet.

/// Maximum displayed image width, in CSS pixels
pub const MAX_DISPLAY_WIDTH: f64 = 481.5;

/// Maximum displayed image height, in CSS pixels
pub const MAX_DISPLAY_HEIGHT: f64 = 479.7;

/// Images under this size on *both* axes are left untouched
pub const SMALL_IMAGE_MIN: f64 = 100.0;

/// Horizontal inset of the overlay from the image's right edge
pub const OVERLAY_LEFT_INSET: f64 = 34.0;

/// Vertical inset of the overlay from the image's bottom edge
pub const OVERLAY_BOTTOM_INSET: f64 = 2.0;

/// A 2D size in CSS pixel space
///
/// # Examples
///
/// ```
/// use postfit::Size;
///
/// let size = Size::new(640.0, 480.0);
/// assert_eq!(size.width, 640.0);
/// assert_eq!(size.height, 480.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Size {
  /// Width in CSS pixels
  pub width: f64,
  /// Height in CSS pixels
  pub height: f64,
}

impl Size {
  /// Creates a new size
  pub const fn new(width: f64, height: f64) -> Self {
    Self { width, height }
  }
}

/// Inline-style position of the overlay relative to its container
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayPosition {
  /// Offset from the container's left edge
  pub left: f64,
  /// Offset from the container's bottom edge
  pub bottom: f64,
}

/// Shrinks a size to fit the post viewport, preserving aspect ratio.
///
/// The clamps run in a fixed order: width first (rescaling height), then
/// height (rescaling width). An image over both limits is therefore
/// corrected in two passes, and its final width can settle strictly under
/// [`MAX_DISPLAY_WIDTH`]. Rendered output depends on this order; do not
/// collapse the passes into a single proportional fit.
///
/// # Examples
///
/// ```
/// use postfit::geometry::{fit_to_viewport, MAX_DISPLAY_WIDTH};
/// use postfit::Size;
///
/// let fitted = fit_to_viewport(Size::new(963.0, 300.0));
/// assert_eq!(fitted.width, MAX_DISPLAY_WIDTH);
/// assert_eq!(fitted.height, 150.0);
/// ```
pub fn fit_to_viewport(original: Size) -> Size {
  let mut size = original;

  if size.width > MAX_DISPLAY_WIDTH {
    size.height = (MAX_DISPLAY_WIDTH / size.width) * size.height;
    size.width = MAX_DISPLAY_WIDTH;
  }

  if size.height > MAX_DISPLAY_HEIGHT {
    size.width = (MAX_DISPLAY_HEIGHT / size.height) * size.width;
    size.height = MAX_DISPLAY_HEIGHT;
  }

  size
}

/// Computes the overlay's bottom-right corner placement for a display width.
pub fn overlay_position(display_width: f64) -> OverlayPosition {
  OverlayPosition {
    left: display_width - OVERLAY_LEFT_INSET,
    bottom: OVERLAY_BOTTOM_INSET,
  }
}

/// Formats a pixel value for an HTML attribute or inline style.
///
/// Whole values render without a fractional part so untouched dimensions
/// round-trip through attributes unchanged.
pub fn format_px(value: f64) -> String {
  if value.fract() == 0.0 {
    format!("{}", value as i64)
  } else {
    format!("{}", value)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  const EPSILON: f64 = 1e-9;

  #[test]
  fn fit_leaves_small_sizes_untouched() {
    let fitted = fit_to_viewport(Size::new(300.0, 200.0));
    assert_eq!(fitted, Size::new(300.0, 200.0));
  }

  #[test]
  fn fit_clamps_width_and_rescales_height() {
    let original = Size::new(963.0, 400.0);
    let fitted = fit_to_viewport(original);
    assert!((fitted.width - MAX_DISPLAY_WIDTH).abs() < EPSILON);
    let expected_height = 400.0 * MAX_DISPLAY_WIDTH / 963.0;
    assert!((fitted.height - expected_height).abs() < EPSILON);
  }

  #[test]
  fn fit_clamps_height_and_rescales_width() {
    let original = Size::new(400.0, 1000.0);
    let fitted = fit_to_viewport(original);
    assert!((fitted.height - MAX_DISPLAY_HEIGHT).abs() < EPSILON);
    let expected_width = 400.0 * MAX_DISPLAY_HEIGHT / 1000.0;
    assert!((fitted.width - expected_width).abs() < EPSILON);
  }

  #[test]
  fn fit_over_both_limits_runs_two_passes() {
    // Wide and tall: the width clamp rescales height first, then the height
    // clamp rescales the already-reduced width.
    let original = Size::new(1000.0, 4000.0);
    let after_pass_one = Size::new(MAX_DISPLAY_WIDTH, 4000.0 * MAX_DISPLAY_WIDTH / 1000.0);
    let expected_width = after_pass_one.width * MAX_DISPLAY_HEIGHT / after_pass_one.height;

    let fitted = fit_to_viewport(original);
    assert!((fitted.height - MAX_DISPLAY_HEIGHT).abs() < EPSILON);
    assert!((fitted.width - expected_width).abs() < EPSILON);
    // The two-pass order under-uses the width budget here.
    assert!(fitted.width < MAX_DISPLAY_WIDTH);
  }

  #[test]
  fn fit_at_exact_limits_is_a_no_op() {
    let fitted = fit_to_viewport(Size::new(MAX_DISPLAY_WIDTH, MAX_DISPLAY_HEIGHT));
    assert_eq!(fitted, Size::new(MAX_DISPLAY_WIDTH, MAX_DISPLAY_HEIGHT));
  }

  #[test]
  fn overlay_sits_inside_the_bottom_right_corner() {
    let position = overlay_position(481.5);
    assert!((position.left - 447.5).abs() < EPSILON);
    assert!((position.bottom - 2.0).abs() < EPSILON);
  }

  #[test]
  fn format_px_drops_trailing_fraction_on_whole_values() {
    assert_eq!(format_px(300.0), "300");
    assert_eq!(format_px(481.5), "481.5");
    assert_eq!(format_px(0.0), "0");
  }
}
