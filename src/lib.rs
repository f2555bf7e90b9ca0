pub mod dom;
pub mod error;
pub mod geometry;
pub mod resizer;
pub mod resource;
pub mod viewer;

pub use error::{DomError, Error, FetchError, Result};
pub use geometry::{OverlayPosition, Size};
pub use resizer::{ImageResizer, ProcessOutcome};
pub use resource::{FetchedResource, HttpFetcher, ResourceFetcher};
pub use viewer::{DataUrlOutcome, ImageViewer};
