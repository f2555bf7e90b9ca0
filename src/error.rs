//! Error types for postfit
//!
//! This module provides error types for the two fallible subsystems:
//! - DOM errors (bad input elements, failed lookups)
//! - Fetch errors (image bytes could not be retrieved)
//!
//! All errors use the `thiserror` crate for minimal boilerplate and
//! proper error trait implementations.
//!
//! Note that a failed overlay-click fetch is deliberately *not* represented
//! here: that path fails open and reports through
//! [`DataUrlOutcome::FetchFailed`](crate::viewer::DataUrlOutcome) so the
//! viewer collaborator can fall back to the original URL.

use thiserror::Error;

/// Result type alias for postfit operations
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type for postfit
///
/// # Examples
///
/// ```
/// use postfit::{DomError, Error};
///
/// let err = Error::Dom(DomError::ElementNotFound {
///   id: "postfit_image_1".to_string(),
/// });
/// assert!(err.to_string().contains("postfit_image_1"));
/// ```
#[derive(Error, Debug)]
pub enum Error {
  /// Document-tree access or mutation error
  #[error("DOM error: {0}")]
  Dom(#[from] DomError),

  /// Resource fetching error
  #[error("Fetch error: {0}")]
  Fetch(#[from] FetchError),

  /// I/O error (HTML parsing input, file reading, etc.)
  #[error("I/O error: {0}")]
  Io(#[from] std::io::Error),
}

/// Errors raised while inspecting or mutating the document tree
///
/// The original host surfaced bad input as a blocking dialog; here it is an
/// explicit error value and the caller decides how loudly to complain.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomError {
  /// The node handed to the resizer is not an `<img>` element
  #[error("element is not an image: found {found}")]
  NotAnImage { found: String },

  /// No element with the given id exists anywhere in the document
  #[error("no element with id '{id}' in the document")]
  ElementNotFound { id: String },

  /// The element has no parent, so it cannot be wrapped in place
  #[error("<{tag}> element is not attached to a parent")]
  Detached { tag: String },

  /// A required attribute is absent
  #[error("element is missing required attribute '{attribute}'")]
  MissingAttribute { attribute: String },
}

/// Errors raised while fetching resource bytes
#[derive(Error, Debug, Clone)]
pub enum FetchError {
  /// The request failed outright: transport error or non-2xx status
  #[error("request for '{url}' failed: {reason}")]
  RequestFailed { url: String, reason: String },
}
