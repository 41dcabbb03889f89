//! Output placement: put PNG bytes at the target path.
//!
//! Bytes go to a temp file in the target's directory and are then renamed
//! over the target. A rename within one directory is atomic, so readers see
//! either the previous file or the complete new one, and a failed call
//! leaves nothing behind.

use crate::error::Pdf2PngError;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Write `bytes` to `target`, replacing any existing file.
///
/// With `create_dirs` the target's missing parent directories are created
/// first; otherwise a missing directory is an [`Pdf2PngError::OutputWriteFailed`].
pub fn write_atomic(target: &Path, bytes: &[u8], create_dirs: bool) -> Result<(), Pdf2PngError> {
    let fail = |source: std::io::Error| Pdf2PngError::OutputWriteFailed {
        path: target.to_path_buf(),
        source,
    };

    let dir = match target.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    if create_dirs {
        std::fs::create_dir_all(dir).map_err(fail)?;
    }

    let mut builder = tempfile::Builder::new();
    builder.prefix(".pdf2png-").suffix(".tmp");
    // Temp files default to 0600; the PNG should get ordinary file permissions.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(std::fs::Permissions::from_mode(0o644));
    }
    let mut staged = builder.tempfile_in(dir).map_err(fail)?;
    staged.write_all(bytes).map_err(fail)?;
    staged.as_file().sync_all().map_err(fail)?;
    staged.persist(target).map_err(|e| fail(e.error))?;

    debug!("Wrote {} bytes to {}", bytes.len(), target.display());
    Ok(())
}

/// Output path for one page of a conversion.
///
/// A single-page conversion writes exactly `target`. A multi-page conversion
/// writes `<stem>-<index>.<ext>` beside it, with the 0-based page index.
pub fn page_output_path(target: &Path, page_index: usize, multi_page: bool) -> PathBuf {
    if !multi_page {
        return target.to_path_buf();
    }

    let stem = target
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "page".to_string());
    let ext = target
        .extension()
        .map(|e| e.to_string_lossy().into_owned())
        .unwrap_or_else(|| "png".to_string());

    target.with_file_name(format!("{stem}-{page_index}.{ext}"))
}
