//! Pipeline stages for PDF-to-PNG conversion.
//!
//! Each submodule implements exactly one step, so each can be tested on its
//! own and the PDFium-dependent step stays isolated from the rest.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ render ──▶ encode ──▶ write
//! (path)    (pdfium)   (PNG)      (atomic rename)
//! ```
//!
//! 1. [`input`]: check the path exists, is readable and starts like a PDF
//! 2. [`render`]: open the document and rasterise a page to `DynamicImage`
//! 3. [`encode`]: PNG-encode the image into memory
//! 4. [`write`]: place the bytes at the target path without ever exposing
//!    a half-written file

pub mod encode;
pub mod input;
pub mod render;
pub mod write;
