//! Configuration types for PDF-to-PNG conversion.
//!
//! All rendering behaviour is controlled through [`RenderConfig`], built via
//! [`RenderConfigBuilder`]. The defaults reproduce a plain "first page at the
//! library's native resolution" conversion; every other knob is opt-in.

use crate::error::Pdf2PngError;
use crate::progress::ProgressCallback;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lowest accepted rendering resolution.
pub const MIN_DPI: u32 = 18;
/// Highest accepted rendering resolution.
pub const MAX_DPI: u32 = 600;
/// PDF user space resolution: one point is 1/72 inch.
pub const POINTS_PER_INCH: f32 = 72.0;

/// Configuration for a PDF-to-PNG conversion.
///
/// # Example
/// ```rust
/// use pdf2png::{PageSelection, RenderConfig};
///
/// let config = RenderConfig::builder()
///     .dpi(150)
///     .pages(PageSelection::Range(1, 3))
///     .build()
///     .unwrap();
/// assert_eq!(config.dpi, 150);
/// ```
#[derive(Clone)]
pub struct RenderConfig {
    /// Rendering resolution. Range: 18–600. Default: 72.
    ///
    /// At 72 DPI one PDF point maps to one pixel, so a US Letter page
    /// (612 × 792 pt) renders to 612 × 792 px.
    pub dpi: u32,

    /// Optional cap on the rendered width and height, in pixels. Default: none.
    ///
    /// When set, pages that would exceed the cap at `dpi` are scaled down
    /// proportionally.
    pub max_rendered_pixels: Option<u32>,

    /// Pages to render. Default: the first page.
    pub pages: PageSelection,

    /// PDF user password for encrypted documents.
    pub password: Option<String>,

    /// Create missing parent directories of the output path. Default: false.
    pub create_dirs: bool,

    /// Per-page progress events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            dpi: 72,
            max_rendered_pixels: None,
            pages: PageSelection::default(),
            password: None,
            create_dirs: false,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for RenderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderConfig")
            .field("dpi", &self.dpi)
            .field("max_rendered_pixels", &self.max_rendered_pixels)
            .field("pages", &self.pages)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("create_dirs", &self.create_dirs)
            .field(
                "progress_callback",
                &self
                    .progress_callback
                    .as_ref()
                    .map(|_| "<dyn ConversionProgressCallback>"),
            )
            .finish()
    }
}

impl RenderConfig {
    /// Create a new builder for `RenderConfig`.
    pub fn builder() -> RenderConfigBuilder {
        RenderConfigBuilder {
            config: Self::default(),
        }
    }

    /// Scale factor from PDF points to pixels at the configured resolution.
    pub fn scale(&self) -> f32 {
        self.dpi as f32 / POINTS_PER_INCH
    }
}

/// Builder for [`RenderConfig`].
#[derive(Debug)]
pub struct RenderConfigBuilder {
    config: RenderConfig,
}

impl RenderConfigBuilder {
    pub fn dpi(mut self, dpi: u32) -> Self {
        self.config.dpi = dpi.clamp(MIN_DPI, MAX_DPI);
        self
    }

    pub fn max_rendered_pixels(mut self, px: u32) -> Self {
        self.config.max_rendered_pixels = Some(px);
        self
    }

    pub fn pages(mut self, selection: PageSelection) -> Self {
        self.config.pages = selection;
        self
    }

    pub fn password(mut self, pwd: impl Into<String>) -> Self {
        self.config.password = Some(pwd.into());
        self
    }

    pub fn create_dirs(mut self, v: bool) -> Self {
        self.config.create_dirs = v;
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<RenderConfig, Pdf2PngError> {
        let c = &self.config;
        if c.dpi < MIN_DPI || c.dpi > MAX_DPI {
            return Err(Pdf2PngError::InvalidConfig(format!(
                "DPI must be {MIN_DPI}–{MAX_DPI}, got {}",
                c.dpi
            )));
        }
        if let Some(px) = c.max_rendered_pixels {
            if px < 16 {
                return Err(Pdf2PngError::InvalidConfig(format!(
                    "max rendered pixels must be ≥ 16, got {px}"
                )));
            }
        }
        c.pages.validate()?;
        Ok(self.config)
    }
}

// ── Page selection ───────────────────────────────────────────────────────

/// Specifies which pages of the PDF to render. Page numbers are 1-indexed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PageSelection {
    /// Render every page.
    All,
    /// Render a single page. `Single(1)` is the default.
    Single(usize),
    /// Render a contiguous range of pages (inclusive).
    Range(usize, usize),
    /// Render specific pages (deduplicated).
    Set(Vec<usize>),
}

impl Default for PageSelection {
    fn default() -> Self {
        PageSelection::Single(1)
    }
}

impl PageSelection {
    /// Expand the selection into a sorted, deduplicated list of 0-indexed
    /// page numbers. Pages beyond `total_pages` are dropped.
    pub fn to_indices(&self, total_pages: usize) -> Vec<usize> {
        let mut indices: Vec<usize> = match self {
            PageSelection::All => (0..total_pages).collect(),
            PageSelection::Single(p) => {
                if *p >= 1 && *p <= total_pages {
                    vec![p - 1]
                } else {
                    vec![]
                }
            }
            PageSelection::Range(start, end) => {
                let s = (*start).max(1) - 1;
                let e = (*end).min(total_pages);
                (s..e).collect()
            }
            PageSelection::Set(pages) => pages
                .iter()
                .filter(|&&p| p >= 1 && p <= total_pages)
                .map(|p| p - 1)
                .collect(),
        };
        indices.sort_unstable();
        indices.dedup();
        indices
    }

    /// The first page number the selection asks for, used when reporting an
    /// empty expansion.
    pub fn first_requested(&self) -> usize {
        match self {
            PageSelection::All => 1,
            PageSelection::Single(p) => *p,
            PageSelection::Range(start, _) => *start,
            PageSelection::Set(pages) => pages.iter().min().copied().unwrap_or(0),
        }
    }

    fn validate(&self) -> Result<(), Pdf2PngError> {
        let bad = |msg: String| Err(Pdf2PngError::InvalidConfig(msg));
        match self {
            PageSelection::All => Ok(()),
            PageSelection::Single(0) => bad("pages are 1-indexed, got 0".into()),
            PageSelection::Single(_) => Ok(()),
            PageSelection::Range(0, _) => bad("pages are 1-indexed, got 0".into()),
            PageSelection::Range(s, e) if s > e => {
                bad(format!("invalid page range {s}-{e}: start must be <= end"))
            }
            PageSelection::Range(..) => Ok(()),
            PageSelection::Set(pages) if pages.is_empty() => bad("empty page set".into()),
            PageSelection::Set(pages) if pages.contains(&0) => {
                bad("pages are 1-indexed, got 0".into())
            }
            PageSelection::Set(_) => Ok(()),
        }
    }
}

impl FromStr for PageSelection {
    type Err = Pdf2PngError;

    /// Parse `all`, `5`, `3-15` or `1,3,5`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_lowercase();
        let number = |p: &str| {
            let p = p.trim();
            p.parse::<usize>()
                .map_err(|_| Pdf2PngError::InvalidConfig(format!("invalid page number '{p}'")))
        };

        let selection = if s == "all" {
            PageSelection::All
        } else if let Some((start, end)) = s.split_once('-') {
            PageSelection::Range(number(start)?, number(end)?)
        } else if s.contains(',') {
            let pages = s.split(',').map(number).collect::<Result<Vec<_>, _>>()?;
            PageSelection::Set(pages)
        } else {
            PageSelection::Single(number(&s)?)
        };

        selection.validate()?;
        Ok(selection)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_render_first_page_at_72_dpi() {
        let c = RenderConfig::default();
        assert_eq!(c.dpi, 72);
        assert_eq!(c.pages, PageSelection::Single(1));
        assert_eq!(c.scale(), 1.0);
        assert!(!c.create_dirs);
    }

    #[test]
    fn builder_clamps_dpi() {
        let c = RenderConfig::builder().dpi(10_000).build().unwrap();
        assert_eq!(c.dpi, MAX_DPI);
        let c = RenderConfig::builder().dpi(1).build().unwrap();
        assert_eq!(c.dpi, MIN_DPI);
    }

    #[test]
    fn build_rejects_zero_page() {
        let err = RenderConfig::builder()
            .pages(PageSelection::Single(0))
            .build()
            .unwrap_err();
        assert!(matches!(err, Pdf2PngError::InvalidConfig(_)));
    }

    #[test]
    fn build_rejects_tiny_pixel_cap() {
        let tiny = RenderConfig::builder().max_rendered_pixels(4).build();
        assert!(tiny.is_err());
        let capped = RenderConfig::builder().max_rendered_pixels(1024).build();
        assert!(capped.is_ok());
    }

    #[test]
    fn debug_redacts_password() {
        let c = RenderConfig::builder()
            .password("hunter2")
            .build()
            .unwrap();
        let dbg = format!("{c:?}");
        assert!(!dbg.contains("hunter2"));
        assert!(dbg.contains("<redacted>"));
    }

    #[test]
    fn page_selection_to_indices() {
        assert_eq!(PageSelection::All.to_indices(3), vec![0, 1, 2]);
        assert_eq!(PageSelection::Single(1).to_indices(3), vec![0]);
        assert_eq!(PageSelection::Single(4).to_indices(3), Vec::<usize>::new());
        assert_eq!(PageSelection::Range(2, 10).to_indices(4), vec![1, 2, 3]);
        assert_eq!(PageSelection::Set(vec![3, 1, 3]).to_indices(5), vec![0, 2]);
    }

    #[test]
    fn parse_page_selection() {
        assert_eq!("all".parse::<PageSelection>().unwrap(), PageSelection::All);
        assert_eq!(" ALL ".parse::<PageSelection>().unwrap(), PageSelection::All);
        assert_eq!("5".parse::<PageSelection>().unwrap(), PageSelection::Single(5));
        assert_eq!("3-15".parse::<PageSelection>().unwrap(), PageSelection::Range(3, 15));
        assert_eq!(
            "1, 3,5".parse::<PageSelection>().unwrap(),
            PageSelection::Set(vec![1, 3, 5])
        );
    }

    #[test]
    fn parse_page_selection_errors() {
        assert!("0".parse::<PageSelection>().is_err());
        assert!("5-3".parse::<PageSelection>().is_err());
        assert!("1,x".parse::<PageSelection>().is_err());
        assert!("".parse::<PageSelection>().is_err());
    }

    #[test]
    fn first_requested_page() {
        assert_eq!(PageSelection::Set(vec![9, 4]).first_requested(), 4);
        assert_eq!(PageSelection::Range(7, 8).first_requested(), 7);
    }
}
