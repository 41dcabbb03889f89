//! Coordinate conversion between PDF user space and PNG pixel space.
//!
//! PDF user space measures in points (1/72 inch) with the origin at the
//! bottom-left corner and y growing upwards. A rendered PNG measures in
//! pixels with the origin at the top-left and y growing downwards. Anything
//! drawn over a rendered page (annotations, click targets, overlays) has to
//! map between the two.

use serde::{Deserialize, Serialize};

/// Pixels per point after applying an optional cap on the longest edge.
///
/// The cap only ever shrinks: a page already smaller than `max_pixels` keeps
/// `scale`.
pub fn fit_scale(width_pt: f32, height_pt: f32, scale: f32, max_pixels: Option<u32>) -> f32 {
    match max_pixels {
        Some(max) => {
            let longest = width_pt.max(height_pt) * scale;
            if longest > max as f32 {
                scale * max as f32 / longest
            } else {
                scale
            }
        }
        None => scale,
    }
}

/// A point in PDF user space, in points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PdfPoint {
    pub x: f32,
    pub y: f32,
}

/// A point in a rendered image, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PixelPoint {
    pub x: f32,
    pub y: f32,
}

/// A page's size in points and the pixel size it was (or will be) rendered at.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageGeometry {
    pub width_pt: f32,
    pub height_pt: f32,
    pub width_px: u32,
    pub height_px: u32,
}

impl PageGeometry {
    pub fn new(width_pt: f32, height_pt: f32, width_px: u32, height_px: u32) -> Self {
        Self {
            width_pt,
            height_pt,
            width_px,
            height_px,
        }
    }

    /// Geometry of a page rendered at `scale` pixels per point, optionally
    /// shrunk so neither side exceeds `max_pixels`.
    ///
    /// This is the sizing rule the renderer asks PDFium to apply.
    pub fn for_scale(width_pt: f32, height_pt: f32, scale: f32, max_pixels: Option<u32>) -> Self {
        let scale = fit_scale(width_pt, height_pt, scale, max_pixels);
        let px = |pt: f32| ((pt * scale).round() as u32).max(1);
        Self::new(width_pt, height_pt, px(width_pt), px(height_pt))
    }

    /// Horizontal pixels per point.
    pub fn scale_x(&self) -> f32 {
        self.width_px as f32 / self.width_pt
    }

    /// Vertical pixels per point.
    pub fn scale_y(&self) -> f32 {
        self.height_px as f32 / self.height_pt
    }

    pub fn pdf_to_pixel(&self, p: PdfPoint) -> PixelPoint {
        PixelPoint {
            x: p.x * self.scale_x(),
            y: (self.height_pt - p.y) * self.scale_y(),
        }
    }

    pub fn pixel_to_pdf(&self, p: PixelPoint) -> PdfPoint {
        PdfPoint {
            x: p.x / self.scale_x(),
            y: self.height_pt - p.y / self.scale_y(),
        }
    }

    /// Whether a pixel coordinate falls inside the rendered image.
    pub fn contains_pixel(&self, p: PixelPoint) -> bool {
        p.x >= 0.0 && p.y >= 0.0 && p.x < self.width_px as f32 && p.y < self.height_px as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LETTER: (f32, f32) = (612.0, 792.0);

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-3
    }

    #[test]
    fn native_resolution_is_one_pixel_per_point() {
        let g = PageGeometry::for_scale(LETTER.0, LETTER.1, 1.0, None);
        assert_eq!((g.width_px, g.height_px), (612, 792));
    }

    #[test]
    fn doubled_dpi_doubles_pixels() {
        let g = PageGeometry::for_scale(LETTER.0, LETTER.1, 2.0, None);
        assert_eq!((g.width_px, g.height_px), (1224, 1584));
    }

    #[test]
    fn max_pixels_caps_longest_edge() {
        let g = PageGeometry::for_scale(LETTER.0, LETTER.1, 4.0, Some(1000));
        assert_eq!(g.height_px, 1000);
        assert_eq!(g.width_px, 773);
    }

    #[test]
    fn max_pixels_never_upscales() {
        let g = PageGeometry::for_scale(100.0, 50.0, 1.0, Some(4000));
        assert_eq!((g.width_px, g.height_px), (100, 50));
    }

    #[test]
    fn origin_flips_between_spaces() {
        let g = PageGeometry::for_scale(LETTER.0, LETTER.1, 1.0, None);
        let top_left = g.pdf_to_pixel(PdfPoint { x: 0.0, y: 792.0 });
        assert_eq!(top_left, PixelPoint { x: 0.0, y: 0.0 });
        let bottom_left = g.pdf_to_pixel(PdfPoint { x: 0.0, y: 0.0 });
        assert_eq!(bottom_left, PixelPoint { x: 0.0, y: 792.0 });
    }

    #[test]
    fn pixel_and_pdf_conversions_are_inverse() {
        let g = PageGeometry::for_scale(595.0, 842.0, 150.0 / 72.0, None);
        let p = PdfPoint { x: 123.5, y: 456.25 };
        let back = g.pixel_to_pdf(g.pdf_to_pixel(p));
        assert!(close(back.x, p.x) && close(back.y, p.y), "got {back:?}");
    }

    #[test]
    fn contains_pixel_bounds() {
        let g = PageGeometry::new(10.0, 10.0, 10, 10);
        assert!(g.contains_pixel(PixelPoint { x: 0.0, y: 9.5 }));
        assert!(!g.contains_pixel(PixelPoint { x: 10.0, y: 0.0 }));
        assert!(!g.contains_pixel(PixelPoint { x: -0.1, y: 0.0 }));
    }
}
