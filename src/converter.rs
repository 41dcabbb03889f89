//! The PDF-to-PNG converter: one open document, rendered page by page.
//!
//! A [`PdfConverter`] is created by [`crate::Engine::open`] and holds the
//! open document until it is dropped. Each conversion call renders into a
//! bitmap and an encoded buffer that exist only for the duration of that
//! call; both are released whether the call succeeds or fails.
//!
//! ```rust,no_run
//! use pdf2png::{Engine, RenderConfig};
//!
//! # fn main() -> Result<(), pdf2png::Pdf2PngError> {
//! let engine = Engine::bind()?;
//! let config = RenderConfig::default();
//! let converter = engine.open("static/pdfs/test.pdf", &config)?;
//! let page = converter.convert_to_png("static/pngs/test.png")?;
//! println!("{}x{} px", page.width, page.height);
//! # Ok(())
//! # }
//! ```

use crate::config::{PageSelection, RenderConfig};
use crate::error::Pdf2PngError;
use crate::geometry::PageGeometry;
use crate::output::{DocumentMetadata, RenderedPage};
use crate::pipeline::input::ValidatedInput;
use crate::pipeline::{encode, render, write};
use image::DynamicImage;
use pdfium_render::prelude::PdfDocument;
use std::fmt;
use std::path::Path;
use tracing::{info, warn};

/// An open PDF document that can be rasterised to PNG.
pub struct PdfConverter<'a> {
    // Declared before `input` so the document closes before a staged temp
    // file is deleted.
    document: PdfDocument<'a>,
    input: ValidatedInput,
    config: RenderConfig,
}

impl fmt::Debug for PdfConverter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PdfConverter")
            .field("path", &self.input.path())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl<'a> PdfConverter<'a> {
    pub(crate) fn new(
        document: PdfDocument<'a>,
        input: ValidatedInput,
        config: RenderConfig,
    ) -> Self {
        Self {
            document,
            input,
            config,
        }
    }

    /// Path of the open PDF.
    pub fn path(&self) -> &Path {
        self.input.path()
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    pub fn page_count(&self) -> usize {
        render::page_count(&self.document)
    }

    pub fn metadata(&self) -> DocumentMetadata {
        render::extract_metadata(&self.document)
    }

    /// Geometry of a 1-indexed page at the configured resolution, without
    /// rendering it.
    pub fn page_geometry(&self, page_num: usize) -> Result<PageGeometry, Pdf2PngError> {
        let idx = self.page_index(page_num)?;
        render::page_geometry(&self.document, idx, &self.config)
    }

    /// Rasterise a 1-indexed page into memory.
    pub fn render_page(&self, page_num: usize) -> Result<DynamicImage, Pdf2PngError> {
        let idx = self.page_index(page_num)?;
        render::render_page(&self.document, idx, &self.config).map(|(image, _)| image)
    }

    /// Render the first selected page (by default page 1) and write it to
    /// `target` as PNG, replacing any existing file.
    pub fn convert_to_png(
        &self,
        target: impl AsRef<Path>,
    ) -> Result<RenderedPage, Pdf2PngError> {
        let indices = self.selected_indices()?;
        let mut pages = self.convert_indices(&indices[..1], target.as_ref())?;
        pages
            .pop()
            .ok_or_else(|| Pdf2PngError::Internal("no page was written".into()))
    }

    /// Render every selected page.
    ///
    /// One selected page is written to `target` itself; several are written
    /// beside it as `<stem>-<index>.png` with 0-based page indices. Stops at
    /// the first failing page.
    pub fn convert_pages(
        &self,
        target: impl AsRef<Path>,
    ) -> Result<Vec<RenderedPage>, Pdf2PngError> {
        let indices = self.selected_indices()?;
        self.convert_indices(&indices, target.as_ref())
    }

    fn convert_indices(
        &self,
        indices: &[usize],
        target: &Path,
    ) -> Result<Vec<RenderedPage>, Pdf2PngError> {
        let total = indices.len();
        let multi_page = total > 1;
        let cb = self.config.progress_callback.as_ref();

        if let Some(cb) = cb {
            cb.on_conversion_start(total);
        }

        let mut written = Vec::with_capacity(total);
        for &idx in indices {
            let page_num = idx + 1;
            if let Some(cb) = cb {
                cb.on_page_start(page_num, total);
            }

            let out_path = write::page_output_path(target, idx, multi_page);
            match self.write_page(idx, &out_path) {
                Ok(page) => {
                    if let Some(cb) = cb {
                        cb.on_page_complete(page_num, total, &page);
                    }
                    written.push(page);
                }
                Err(e) => {
                    warn!("Page {} failed: {}", page_num, e);
                    if let Some(cb) = cb {
                        cb.on_page_error(page_num, total, &e.to_string());
                        cb.on_conversion_complete(total, written.len());
                    }
                    return Err(e);
                }
            }
        }

        if let Some(cb) = cb {
            cb.on_conversion_complete(total, written.len());
        }
        Ok(written)
    }

    /// Render, encode and write one page. The bitmap, image and PNG buffer
    /// are all dropped when this returns.
    fn write_page(&self, idx: usize, out_path: &Path) -> Result<RenderedPage, Pdf2PngError> {
        let (image, geometry) = render::render_page(&self.document, idx, &self.config)?;
        let png = encode::encode_png(&image).map_err(|source| Pdf2PngError::EncodeFailed {
            page: idx + 1,
            source,
        })?;
        write::write_atomic(out_path, &png, self.config.create_dirs)?;

        info!(
            "Page {} → {} ({}x{} px)",
            idx + 1,
            out_path.display(),
            image.width(),
            image.height()
        );

        Ok(RenderedPage {
            page_num: idx + 1,
            path: out_path.to_path_buf(),
            width: image.width(),
            height: image.height(),
            geometry,
        })
    }

    fn selected_indices(&self) -> Result<Vec<usize>, Pdf2PngError> {
        select_indices(&self.config.pages, self.page_count())
    }

    fn page_index(&self, page_num: usize) -> Result<usize, Pdf2PngError> {
        page_index(page_num, self.page_count())
    }
}

/// Expand a selection against the document, failing when it names no page
/// that exists.
fn select_indices(pages: &PageSelection, total: usize) -> Result<Vec<usize>, Pdf2PngError> {
    let indices = pages.to_indices(total);
    if indices.is_empty() {
        return Err(Pdf2PngError::PageOutOfRange {
            page: pages.first_requested(),
            total,
        });
    }
    Ok(indices)
}

/// 1-indexed page number to 0-based index.
fn page_index(page_num: usize, total: usize) -> Result<usize, Pdf2PngError> {
    if page_num == 0 || page_num > total {
        return Err(Pdf2PngError::PageOutOfRange {
            page: page_num,
            total,
        });
    }
    Ok(page_num - 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_selection_is_first_page() {
        assert_eq!(select_indices(&PageSelection::default(), 4).unwrap(), vec![0]);
    }

    #[test]
    fn range_is_clipped_to_document() {
        let pages = PageSelection::Range(2, 9);
        assert_eq!(select_indices(&pages, 4).unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn selection_past_the_end_reports_requested_page() {
        match select_indices(&PageSelection::Single(5), 1).unwrap_err() {
            Pdf2PngError::PageOutOfRange { page, total } => assert_eq!((page, total), (5, 1)),
            other => panic!("unexpected error: {other}"),
        }
        let err = select_indices(&PageSelection::Set(vec![7, 9]), 3).unwrap_err();
        assert!(matches!(err, Pdf2PngError::PageOutOfRange { page: 7, total: 3 }));
    }

    #[test]
    fn empty_document_has_no_pages_to_select() {
        let err = select_indices(&PageSelection::All, 0).unwrap_err();
        assert!(matches!(err, Pdf2PngError::PageOutOfRange { page: 1, total: 0 }));
    }

    #[test]
    fn page_numbers_are_one_indexed() {
        assert_eq!(page_index(1, 3).unwrap(), 0);
        assert_eq!(page_index(3, 3).unwrap(), 2);
        assert!(matches!(
            page_index(0, 3).unwrap_err(),
            Pdf2PngError::PageOutOfRange { page: 0, total: 3 }
        ));
        assert!(matches!(
            page_index(4, 3).unwrap_err(),
            Pdf2PngError::PageOutOfRange { page: 4, total: 3 }
        ));
    }
}
