//! Whole-file conversion entry points.
//!
//! These bind PDFium, open the input, write the selected pages and return a
//! [`ConversionReport`]. Use [`crate::Engine`] and [`crate::PdfConverter`]
//! directly to keep one engine across many files or to work page by page.

use crate::config::RenderConfig;
use crate::converter::PdfConverter;
use crate::engine::Engine;
use crate::error::Pdf2PngError;
use crate::output::{ConversionReport, DocumentMetadata};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::info;

/// Convert a PDF file to PNG.
///
/// Binds PDFium with [`Engine::bind`], so a library must already be
/// available. With the default config, page 1 is written to `output`.
///
/// # Example
/// ```rust,no_run
/// use pdf2png::{convert_file, RenderConfig};
///
/// let report = convert_file(
///     "static/pdfs/test.pdf",
///     "static/pngs/test.png",
///     &RenderConfig::default(),
/// )?;
/// assert_eq!(report.pages.len(), 1);
/// # Ok::<(), pdf2png::Pdf2PngError>(())
/// ```
pub fn convert_file(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    config: &RenderConfig,
) -> Result<ConversionReport, Pdf2PngError> {
    let engine = Engine::bind()?;
    convert_file_with(&engine, input, output, config)
}

/// [`convert_file`] with a caller-supplied engine.
pub fn convert_file_with(
    engine: &Engine,
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    config: &RenderConfig,
) -> Result<ConversionReport, Pdf2PngError> {
    let start = Instant::now();
    let input = input.as_ref();
    info!("Starting conversion: {}", input.display());

    let converter = engine.open(input, config)?;
    report(&converter, input.to_path_buf(), output.as_ref(), start)
}

/// Convert PDF bytes held in memory.
///
/// The bytes are staged in a managed temp file that is removed on return.
pub fn convert_bytes(
    bytes: &[u8],
    output: impl AsRef<Path>,
    config: &RenderConfig,
) -> Result<ConversionReport, Pdf2PngError> {
    let start = Instant::now();
    let engine = Engine::bind()?;
    let converter = engine.open_bytes(bytes, config)?;
    report(&converter, PathBuf::from("<memory>"), output.as_ref(), start)
}

/// Async wrapper around [`convert_file`].
///
/// PDFium calls block, so the work runs on Tokio's blocking pool rather
/// than a runtime worker thread.
pub async fn convert_file_async(
    input: impl Into<PathBuf>,
    output: impl Into<PathBuf>,
    config: RenderConfig,
) -> Result<ConversionReport, Pdf2PngError> {
    let input = input.into();
    let output = output.into();

    tokio::task::spawn_blocking(move || convert_file(&input, &output, &config))
        .await
        .map_err(|e| Pdf2PngError::Internal(format!("Conversion task panicked: {}", e)))?
}

/// Read PDF metadata without rendering anything.
pub fn inspect(
    input: impl AsRef<Path>,
    password: Option<&str>,
) -> Result<DocumentMetadata, Pdf2PngError> {
    let engine = Engine::bind()?;
    inspect_with(&engine, input, password)
}

/// [`inspect`] with a caller-supplied engine.
pub fn inspect_with(
    engine: &Engine,
    input: impl AsRef<Path>,
    password: Option<&str>,
) -> Result<DocumentMetadata, Pdf2PngError> {
    let mut config = RenderConfig::default();
    config.password = password.map(str::to_string);
    let converter = engine.open(input, &config)?;
    Ok(converter.metadata())
}

fn report(
    converter: &PdfConverter<'_>,
    input: PathBuf,
    output: &Path,
    start: Instant,
) -> Result<ConversionReport, Pdf2PngError> {
    let metadata = converter.metadata();
    let pages = converter.convert_pages(output)?;
    let duration_ms = start.elapsed().as_millis() as u64;

    info!(
        "Conversion complete: {} page(s) of {} in {}ms",
        pages.len(),
        metadata.page_count,
        duration_ms
    );

    Ok(ConversionReport {
        input,
        metadata,
        pages,
        duration_ms,
    })
}
