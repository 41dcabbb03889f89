//! Input validation: make sure a path names a readable PDF before PDFium
//! sees it.
//!
//! PDFium reports every open failure with the same opaque error code. Doing
//! the cheap checks here first turns "missing file", "no permission" and
//! "that's a PNG, not a PDF" into distinct, typed errors.

use crate::error::Pdf2PngError;
use std::io::Read;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

/// PDF readers accept the header anywhere in the first kilobyte.
const HEADER_SEARCH_LEN: usize = 1024;
const PDF_MAGIC: &[u8] = b"%PDF";

/// A validated PDF on disk: either the caller's file or bytes staged in a
/// temp file that is deleted when this value is dropped.
#[derive(Debug)]
pub enum ValidatedInput {
    Local(PathBuf),
    Staged(NamedTempFile),
}

impl ValidatedInput {
    /// Path to the PDF regardless of where it came from.
    pub fn path(&self) -> &Path {
        match self {
            ValidatedInput::Local(p) => p,
            ValidatedInput::Staged(f) => f.path(),
        }
    }
}

/// Validate a local file: it must exist, be readable, and carry the `%PDF`
/// header within its first kilobyte.
pub fn validate_pdf(path: &Path) -> Result<ValidatedInput, Pdf2PngError> {
    if !path.is_file() {
        return Err(Pdf2PngError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let mut file = match std::fs::File::open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(Pdf2PngError::PermissionDenied {
                path: path.to_path_buf(),
            });
        }
        Err(_) => {
            return Err(Pdf2PngError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
    };

    let mut head = Vec::with_capacity(HEADER_SEARCH_LEN);
    file.by_ref()
        .take(HEADER_SEARCH_LEN as u64)
        .read_to_end(&mut head)
        .map_err(|e| match e.kind() {
            std::io::ErrorKind::PermissionDenied => Pdf2PngError::PermissionDenied {
                path: path.to_path_buf(),
            },
            _ => Pdf2PngError::CorruptPdf {
                path: path.to_path_buf(),
                detail: e.to_string(),
            },
        })?;

    check_header(path, &head)?;

    debug!("Validated PDF input: {}", path.display());
    Ok(ValidatedInput::Local(path.to_path_buf()))
}

/// Stage in-memory PDF bytes in a temp file so PDFium can open them by path.
pub fn stage_bytes(bytes: &[u8]) -> Result<ValidatedInput, Pdf2PngError> {
    let head = &bytes[..bytes.len().min(HEADER_SEARCH_LEN)];
    check_header(Path::new("<memory>"), head)?;

    use std::io::Write;

    let mut tmp = tempfile::Builder::new()
        .prefix("pdf2png-")
        .suffix(".pdf")
        .tempfile()
        .map_err(|e| Pdf2PngError::Internal(format!("tempfile: {e}")))?;
    tmp.write_all(bytes)
        .and_then(|_| tmp.flush())
        .map_err(|e| Pdf2PngError::Internal(format!("tempfile write: {e}")))?;

    debug!("Staged {} PDF bytes at {}", bytes.len(), tmp.path().display());
    Ok(ValidatedInput::Staged(tmp))
}

fn check_header(path: &Path, head: &[u8]) -> Result<(), Pdf2PngError> {
    if head.windows(PDF_MAGIC.len()).any(|w| w == PDF_MAGIC) {
        return Ok(());
    }
    Err(Pdf2PngError::NotAPdf {
        path: path.to_path_buf(),
        magic: head.iter().take(4).copied().collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_not_found() {
        let err = validate_pdf(Path::new("/definitely/not/here.pdf")).unwrap_err();
        assert!(matches!(err, Pdf2PngError::FileNotFound { .. }), "got: {err}");
    }

    #[test]
    fn directory_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = validate_pdf(dir.path()).unwrap_err();
        assert!(matches!(err, Pdf2PngError::FileNotFound { .. }));
    }

    #[test]
    fn png_is_rejected_with_magic() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("picture.pdf");
        std::fs::write(&path, b"\x89PNG\r\n\x1a\n....").unwrap();

        match validate_pdf(&path).unwrap_err() {
            Pdf2PngError::NotAPdf { magic, .. } => assert_eq!(magic, b"\x89PNG".to_vec()),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn empty_file_is_not_a_pdf() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.pdf");
        std::fs::write(&path, b"").unwrap();
        assert!(matches!(
            validate_pdf(&path).unwrap_err(),
            Pdf2PngError::NotAPdf { .. }
        ));
    }

    #[test]
    fn header_after_leading_junk_is_accepted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("junk.pdf");
        std::fs::write(&path, b"\xef\xbb\xbfsome preamble\n%PDF-1.4\n").unwrap();

        let input = validate_pdf(&path).unwrap();
        assert_eq!(input.path(), path.as_path());
    }

    #[test]
    fn header_past_first_kilobyte_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("late.pdf");
        let mut bytes = vec![b' '; HEADER_SEARCH_LEN];
        bytes.extend_from_slice(b"%PDF-1.4\n");
        std::fs::write(&path, bytes).unwrap();

        match validate_pdf(&path).unwrap_err() {
            Pdf2PngError::NotAPdf { magic, .. } => assert_eq!(magic, b"    ".to_vec()),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn staged_bytes_keep_their_content() {
        let bytes = b"%PDF-1.4\n1 0 obj\n<< >>\nendobj\n%%EOF\n";
        let input = stage_bytes(bytes).unwrap();
        assert_eq!(std::fs::read(input.path()).unwrap(), bytes.to_vec());
    }

    #[test]
    fn staged_bytes_are_removed_on_drop() {
        let input = stage_bytes(b"%PDF-1.4\n%%EOF\n").unwrap();
        let path = input.path().to_path_buf();
        assert!(path.exists());
        assert_eq!(path.extension().unwrap(), "pdf");
        drop(input);
        assert!(!path.exists());
    }

    #[test]
    fn staging_rejects_non_pdf_bytes() {
        let err = stage_bytes(b"GIF89a").err().unwrap();
        assert!(matches!(err, Pdf2PngError::NotAPdf { .. }));
    }
}
