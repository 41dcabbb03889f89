//! PDF rasterisation via pdfium.
//!
//! Everything that touches a `PdfDocument` lives here. The bitmap PDFium
//! allocates for a page is dropped before [`render_page`] returns, on the
//! error path as much as the success path; only the converted
//! `DynamicImage` leaves this module.

use crate::config::RenderConfig;
use crate::error::Pdf2PngError;
use crate::geometry::{fit_scale, PageGeometry};
use crate::output::DocumentMetadata;
use image::DynamicImage;
use pdfium_render::prelude::*;
use std::path::Path;
use tracing::{debug, info};

/// Open a PDF with PDFium, classifying the failure when it cannot be opened.
pub fn open_document<'a>(
    pdfium: &'a Pdfium,
    pdf_path: &Path,
    password: Option<&'a str>,
) -> Result<PdfDocument<'a>, Pdf2PngError> {
    let document = pdfium
        .load_pdf_from_file(pdf_path, password)
        .map_err(|e| classify_open_error(pdf_path, &format!("{:?}", e), password.is_some()))?;

    info!(
        "PDF loaded: {} ({} pages)",
        pdf_path.display(),
        document.pages().len()
    );
    Ok(document)
}

/// Map PDFium's load failure onto a typed error.
///
/// PDFium reports a bad password with the same call whether none was given
/// or a wrong one was, so `password_given` decides between the two.
fn classify_open_error(pdf_path: &Path, detail: &str, password_given: bool) -> Pdf2PngError {
    let path = pdf_path.to_path_buf();
    if !detail.to_ascii_lowercase().contains("password") {
        return Pdf2PngError::CorruptPdf {
            path,
            detail: detail.to_string(),
        };
    }
    if password_given {
        Pdf2PngError::WrongPassword { path }
    } else {
        Pdf2PngError::PasswordRequired { path }
    }
}

/// Number of pages in an open document.
pub fn page_count(document: &PdfDocument<'_>) -> usize {
    document.pages().len() as usize
}

fn load_page<'a>(document: &PdfDocument<'a>, idx: usize) -> Result<PdfPage<'a>, Pdf2PngError> {
    let total = page_count(document);
    if idx >= total {
        return Err(Pdf2PngError::PageOutOfRange {
            page: idx + 1,
            total,
        });
    }

    document
        .pages()
        .get(idx as u16)
        .map_err(|e| Pdf2PngError::RasterisationFailed {
            page: idx + 1,
            detail: format!("{:?}", e),
        })
}

/// Predicted geometry of page `idx` (0-based) at the configured resolution,
/// without rendering it.
pub fn page_geometry(
    document: &PdfDocument<'_>,
    idx: usize,
    config: &RenderConfig,
) -> Result<PageGeometry, Pdf2PngError> {
    let page = load_page(document, idx)?;
    Ok(PageGeometry::for_scale(
        page.width().value,
        page.height().value,
        config.scale(),
        config.max_rendered_pixels,
    ))
}

/// Rasterise page `idx` (0-based).
///
/// The returned geometry describes the image actually produced, which can
/// differ from [`page_geometry`] by a pixel of rounding.
pub fn render_page(
    document: &PdfDocument<'_>,
    idx: usize,
    config: &RenderConfig,
) -> Result<(DynamicImage, PageGeometry), Pdf2PngError> {
    let page = load_page(document, idx)?;
    let width_pt = page.width().value;
    let height_pt = page.height().value;

    let scale = fit_scale(width_pt, height_pt, config.scale(), config.max_rendered_pixels);
    let render_config = PdfRenderConfig::new().scale_page_by_factor(scale);

    let image = {
        let bitmap = page.render_with_config(&render_config).map_err(|e| {
            Pdf2PngError::RasterisationFailed {
                page: idx + 1,
                detail: format!("{:?}", e),
            }
        })?;
        bitmap.as_image()
    };

    debug!(
        "Rendered page {} ({}x{} pt) → {}x{} px",
        idx + 1,
        width_pt,
        height_pt,
        image.width(),
        image.height()
    );

    let geometry = PageGeometry::new(width_pt, height_pt, image.width(), image.height());
    Ok((image, geometry))
}

/// Read document metadata from an open PDF.
pub fn extract_metadata(document: &PdfDocument<'_>) -> DocumentMetadata {
    let metadata = document.metadata();

    let get_meta = |tag: PdfDocumentMetadataTagType| -> Option<String> {
        metadata.get(tag).and_then(|t| {
            let v = t.value().trim().to_string();
            if v.is_empty() {
                None
            } else {
                Some(v)
            }
        })
    };

    DocumentMetadata {
        title: get_meta(PdfDocumentMetadataTagType::Title),
        author: get_meta(PdfDocumentMetadataTagType::Author),
        subject: get_meta(PdfDocumentMetadataTagType::Subject),
        creator: get_meta(PdfDocumentMetadataTagType::Creator),
        producer: get_meta(PdfDocumentMetadataTagType::Producer),
        creation_date: get_meta(PdfDocumentMetadataTagType::CreationDate),
        modification_date: get_meta(PdfDocumentMetadataTagType::ModificationDate),
        page_count: page_count(document),
        pdf_version: format!("{:?}", document.version()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PATH: &str = "static/pdfs/secret.pdf";

    #[test]
    fn password_error_without_password_requires_one() {
        let err = classify_open_error(
            Path::new(PATH),
            "PdfiumLibraryInternalError(PasswordError)",
            false,
        );
        assert!(matches!(err, Pdf2PngError::PasswordRequired { .. }), "got: {err}");
    }

    #[test]
    fn password_error_with_password_is_wrong_password() {
        let err = classify_open_error(
            Path::new(PATH),
            "PdfiumLibraryInternalError(PasswordError)",
            true,
        );
        match err {
            Pdf2PngError::WrongPassword { path } => assert_eq!(path, Path::new(PATH)),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn other_failures_are_corrupt() {
        let err = classify_open_error(
            Path::new(PATH),
            "PdfiumLibraryInternalError(FormatError)",
            true,
        );
        match err {
            Pdf2PngError::CorruptPdf { detail, .. } => assert!(detail.contains("FormatError")),
            other => panic!("unexpected error: {other}"),
        }
    }
}
