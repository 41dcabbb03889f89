//! Progress-callback trait for per-page conversion events.
//!
//! Inject an [`Arc<dyn ConversionProgressCallback>`] via
//! [`crate::config::RenderConfigBuilder::progress_callback`] to be told when
//! each page starts, finishes or fails. The CLI uses this to drive its
//! progress bar; library callers can forward events wherever they like.
//!
//! # Example
//!
//! ```rust
//! use pdf2png::{ConversionProgressCallback, RenderConfig, RenderedPage};
//! use std::sync::Arc;
//!
//! struct Printer;
//!
//! impl ConversionProgressCallback for Printer {
//!     fn on_page_complete(&self, page_num: usize, total_pages: usize, page: &RenderedPage) {
//!         eprintln!("page {page_num}/{total_pages} → {}", page.path.display());
//!     }
//! }
//!
//! let config = RenderConfig::builder()
//!     .progress_callback(Arc::new(Printer))
//!     .build()
//!     .unwrap();
//! ```

use crate::output::RenderedPage;
use std::sync::Arc;

/// Called by the converter as it renders each page.
///
/// All methods have no-op defaults. The trait is `Send + Sync` so a config
/// carrying a callback can be moved onto a blocking thread by
/// [`crate::convert::convert_file_async`].
pub trait ConversionProgressCallback: Send + Sync {
    /// Called once before the first page is rendered.
    fn on_conversion_start(&self, total_pages: usize) {
        let _ = total_pages;
    }

    /// Called just before a page is rasterised.
    ///
    /// `page_num` is 1-indexed; `total_pages` counts the selected pages.
    fn on_page_start(&self, page_num: usize, total_pages: usize) {
        let _ = (page_num, total_pages);
    }

    /// Called after a page's PNG has been written.
    fn on_page_complete(&self, page_num: usize, total_pages: usize, page: &RenderedPage) {
        let _ = (page_num, total_pages, page);
    }

    /// Called when a page fails. Conversion stops after this event.
    fn on_page_error(&self, page_num: usize, total_pages: usize, error: &str) {
        let _ = (page_num, total_pages, error);
    }

    /// Called once after the last page has been attempted.
    fn on_conversion_complete(&self, total_pages: usize, success_count: usize) {
        let _ = (total_pages, success_count);
    }
}

/// A callback that ignores every event.
pub struct NoopProgressCallback;

impl ConversionProgressCallback for NoopProgressCallback {}

/// The callback type stored in [`crate::config::RenderConfig`].
pub type ProgressCallback = Arc<dyn ConversionProgressCallback>;
