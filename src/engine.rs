//! The bound PDFium library.
//!
//! `pdfium-render` needs a `Pdfium` value before it can open anything, and
//! every open document borrows from it. [`Engine`] owns that value, so the
//! borrow checker guarantees no document outlives the library it came from.

use crate::config::RenderConfig;
use crate::converter::PdfConverter;
use crate::error::Pdf2PngError;
use crate::pipeline::{input, render};
use pdfium_fetch::PdfiumCache;
use pdfium_render::prelude::Pdfium;
use std::fmt;
use std::path::Path;
use tracing::{debug, info};

/// A bound PDFium library, ready to open documents.
pub struct Engine {
    pdfium: Pdfium,
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine").finish_non_exhaustive()
    }
}

impl Engine {
    /// Bind to a PDFium library that is already present.
    ///
    /// Tries `PDFIUM_LIB_PATH`, then the pdfium-fetch cache, then the system
    /// library search path. Never touches the network.
    pub fn bind() -> Result<Self, Pdf2PngError> {
        if let Some(path) = pdfium_fetch::locate() {
            return Self::from_library(&path);
        }
        debug!("No cached PDFium; trying the system library");
        let pdfium = pdfium_fetch::bind_system_library()?;
        Ok(Self { pdfium })
    }

    /// Like [`Engine::bind`], but downloads PDFium into the cache when no
    /// library can be found.
    ///
    /// `on_progress` receives `(bytes_downloaded, total_bytes)` during the
    /// download.
    ///
    /// # Panics
    ///
    /// The download uses a blocking HTTP client, which panics when driven
    /// from inside a Tokio runtime. From async code, call this through
    /// `tokio::task::spawn_blocking`.
    pub fn bind_or_fetch(
        on_progress: Option<&dyn Fn(u64, Option<u64>)>,
    ) -> Result<Self, Pdf2PngError> {
        if let Some(path) = pdfium_fetch::locate() {
            return Self::from_library(&path);
        }
        if let Ok(pdfium) = pdfium_fetch::bind_system_library() {
            return Ok(Self { pdfium });
        }

        info!("PDFium not found locally; downloading");
        let path = PdfiumCache::from_env().ensure(on_progress)?;
        Self::from_library(&path)
    }

    /// Bind to the PDFium library at an explicit path.
    pub fn from_library(path: &Path) -> Result<Self, Pdf2PngError> {
        let pdfium = pdfium_fetch::bind_library(path)?;
        Ok(Self { pdfium })
    }

    /// Open a PDF for conversion.
    ///
    /// The file is validated before PDFium sees it: a missing file yields
    /// [`Pdf2PngError::FileNotFound`], a non-PDF yields
    /// [`Pdf2PngError::NotAPdf`], and content PDFium rejects yields
    /// [`Pdf2PngError::CorruptPdf`] or one of the password errors.
    ///
    /// PDFium keeps borrowing the password for as long as the document is
    /// open, so `config` must outlive the returned converter. Bind it to a
    /// local rather than passing `&RenderConfig::default()` inline.
    pub fn open<'a>(
        &'a self,
        path: impl AsRef<Path>,
        config: &'a RenderConfig,
    ) -> Result<PdfConverter<'a>, Pdf2PngError> {
        let validated = input::validate_pdf(path.as_ref())?;
        self.open_validated(validated, config)
    }

    /// Open PDF bytes held in memory.
    ///
    /// The bytes are staged in a temp file that lives exactly as long as the
    /// returned converter.
    pub fn open_bytes<'a>(
        &'a self,
        bytes: &[u8],
        config: &'a RenderConfig,
    ) -> Result<PdfConverter<'a>, Pdf2PngError> {
        let staged = input::stage_bytes(bytes)?;
        self.open_validated(staged, config)
    }

    // PDFium ties the password borrow to the document lifetime, hence the
    // shared `'a` on `config`.
    fn open_validated<'a>(
        &'a self,
        validated: input::ValidatedInput,
        config: &'a RenderConfig,
    ) -> Result<PdfConverter<'a>, Pdf2PngError> {
        let document =
            render::open_document(&self.pdfium, validated.path(), config.password.as_deref())?;
        Ok(PdfConverter::new(document, validated, config.clone()))
    }

    /// The underlying `pdfium-render` handle.
    pub fn pdfium(&self) -> &Pdfium {
        &self.pdfium
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_library_is_a_binding_failure() {
        let dir = tempfile::tempdir().unwrap();
        let err = Engine::from_library(&dir.path().join("libpdfium.so")).unwrap_err();
        match err {
            Pdf2PngError::PdfiumBindingFailed(msg) => {
                assert!(msg.contains("libpdfium.so"), "got: {msg}")
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn binding_failure_explains_how_to_fix_it() {
        let dir = tempfile::tempdir().unwrap();
        let err = Engine::from_library(&dir.path().join("missing")).unwrap_err();
        assert!(err.to_string().contains("PDFIUM_LIB_PATH"), "got: {err}");
    }
}
