//! Error types for the pdf2png library.
//!
//! Every fallible operation returns [`Pdf2PngError`]. The variants fall into
//! three groups that mirror where a conversion can go wrong: the input file,
//! the PDF content handed to PDFium, and the PNG written to disk.

use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the pdf2png library.
#[derive(Debug, Error)]
pub enum Pdf2PngError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input path does not exist or is not a regular file.
    #[error("Input PDF not found: '{path}'")]
    FileNotFound { path: PathBuf },

    /// The input exists but cannot be opened for reading.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The input was readable but has no `%PDF` header.
    #[error("Not a PDF: '{path}' (starts with {magic:02x?})")]
    NotAPdf { path: PathBuf, magic: Vec<u8> },

    // ── PDF errors ────────────────────────────────────────────────────────
    /// PDFium could not parse the document.
    #[error("PDF '{path}' is corrupt: {detail}")]
    CorruptPdf { path: PathBuf, detail: String },

    /// The document is encrypted and no password was configured.
    #[error("PDF '{path}' is encrypted and requires a password.\nProvide it with --password <PASSWORD>.")]
    PasswordRequired { path: PathBuf },

    /// PDFium rejected the configured password.
    #[error("Wrong password for PDF '{path}'")]
    WrongPassword { path: PathBuf },

    /// The requested page does not exist, or the selection matched no page.
    #[error("Page {page} is out of range (document has {total} pages)")]
    PageOutOfRange { page: usize, total: usize },

    /// PDFium returned an error while rendering a page.
    #[error("Rasterisation failed for page {page}: {detail}")]
    RasterisationFailed { page: usize, detail: String },

    /// The rendered bitmap could not be encoded as PNG.
    #[error("PNG encoding failed for page {page}: {source}")]
    EncodeFailed {
        page: usize,
        #[source]
        source: image::ImageError,
    },

    // ── Output errors ─────────────────────────────────────────────────────
    /// Could not create or write the output PNG file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Rejected by [`crate::RenderConfigBuilder::build`] or page parsing.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Pdfium binding errors ─────────────────────────────────────────────
    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
PDFium could not be found. You can:\n\
  • Run pdf2png without --no-download to fetch it automatically.\n\
  • Set PDFIUM_LIB_PATH=/path/to/libpdfium to use an existing copy.\n\
  • Install libpdfium on the system library search path.\n"
    )]
    PdfiumBindingFailed(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// A failure that should not happen, such as a panicked worker task.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<pdfium_fetch::FetchError> for Pdf2PngError {
    fn from(e: pdfium_fetch::FetchError) -> Self {
        Pdf2PngError::PdfiumBindingFailed(e.to_string())
    }
}

impl Pdf2PngError {
    /// `true` for errors caused by the input file rather than the output or
    /// the environment.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Pdf2PngError::FileNotFound { .. }
                | Pdf2PngError::PermissionDenied { .. }
                | Pdf2PngError::NotAPdf { .. }
                | Pdf2PngError::CorruptPdf { .. }
                | Pdf2PngError::PasswordRequired { .. }
                | Pdf2PngError::WrongPassword { .. }
        )
    }
}
