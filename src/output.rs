//! Result types returned by conversions.

use crate::geometry::PageGeometry;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Document-level metadata read from the PDF info dictionary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub title: Option<String>,
    pub author: Option<String>,
    pub subject: Option<String>,
    pub creator: Option<String>,
    pub producer: Option<String>,
    pub creation_date: Option<String>,
    pub modification_date: Option<String>,
    pub page_count: usize,
    pub pdf_version: String,
}

/// One page written to disk as PNG.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderedPage {
    /// 1-indexed page number in the source document.
    pub page_num: usize,
    /// Where the PNG was written.
    pub path: PathBuf,
    /// Pixel width of the written image.
    pub width: u32,
    /// Pixel height of the written image.
    pub height: u32,
    /// Mapping between PDF points and the written image's pixels.
    pub geometry: PageGeometry,
}

/// Everything a whole-file conversion produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversionReport {
    pub input: PathBuf,
    pub metadata: DocumentMetadata,
    pub pages: Vec<RenderedPage>,
    pub duration_ms: u64,
}

impl ConversionReport {
    /// Paths of every PNG written, in page order.
    pub fn outputs(&self) -> impl Iterator<Item = &std::path::Path> {
        self.pages.iter().map(|p| p.path.as_path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_serialises_to_json() {
        let report = ConversionReport {
            input: PathBuf::from("static/pdfs/test.pdf"),
            metadata: DocumentMetadata {
                title: Some("Test".into()),
                page_count: 1,
                pdf_version: "Pdf1_7".into(),
                ..Default::default()
            },
            pages: vec![RenderedPage {
                page_num: 1,
                path: PathBuf::from("static/pngs/test.png"),
                width: 612,
                height: 792,
                geometry: PageGeometry::new(612.0, 792.0, 612, 792),
            }],
            duration_ms: 12,
        };

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["metadata"]["title"], "Test");
        assert_eq!(json["pages"][0]["width"], 612);
        assert_eq!(json["pages"][0]["geometry"]["height_pt"], 792.0);
        assert_eq!(
            report.outputs().collect::<Vec<_>>(),
            vec![std::path::Path::new("static/pngs/test.png")]
        );
    }
}
