//! Image encoding: `DynamicImage` → PNG bytes in memory.
//!
//! Encoding into a buffer first, rather than straight into the output file,
//! keeps the write stage a single atomic step that never sees an encoder
//! failure halfway through.

use image::{DynamicImage, ImageFormat};
use std::io::Cursor;
use tracing::debug;

/// Encode a rasterised page as PNG.
pub fn encode_png(img: &DynamicImage) -> Result<Vec<u8>, image::ImageError> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)?;
    debug!(
        "Encoded {}x{} image → {} PNG bytes",
        img.width(),
        img.height(),
        buf.len()
    );
    Ok(buf)
}
