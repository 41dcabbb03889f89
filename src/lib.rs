//! # pdf2png
//!
//! Rasterise PDF documents to PNG images with PDFium.
//!
//! The library is a thin, typed layer over `pdfium-render`: it validates the
//! input, asks PDFium to render a page, encodes the bitmap as PNG and writes
//! it to disk atomically. PDFium itself is located (or downloaded on request)
//! by the companion `pdfium-fetch` crate.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF
//!  │
//!  ├─ 1. Input   validate path, permissions and %PDF header
//!  ├─ 2. Render  rasterise the selected page(s) via pdfium
//!  ├─ 3. Encode  DynamicImage → PNG bytes
//!  └─ 4. Write   temp file + rename over the target
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pdf2png::{Engine, RenderConfig};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let engine = Engine::bind()?;
//!     let config = RenderConfig::default(); // page 1 at 72 DPI
//!     let converter = engine.open("static/pdfs/test.pdf", &config)?;
//!     converter.convert_to_png("static/pngs/test.png")?;
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdf2png` binary (clap + anyhow + tracing-subscriber + indicatif) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod converter;
pub mod engine;
pub mod error;
pub mod geometry;
pub mod output;
pub mod pipeline;
pub mod progress;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{PageSelection, RenderConfig, RenderConfigBuilder};
pub use convert::{
    convert_bytes, convert_file, convert_file_async, convert_file_with, inspect, inspect_with,
};
pub use converter::PdfConverter;
pub use engine::Engine;
pub use error::Pdf2PngError;
pub use geometry::{PageGeometry, PdfPoint, PixelPoint};
pub use output::{ConversionReport, DocumentMetadata, RenderedPage};
pub use progress::{ConversionProgressCallback, NoopProgressCallback, ProgressCallback};
