//! # pdfium-fetch
//!
//! Find a [PDFium](https://pdfium.googlesource.com/pdfium/) shared library for
//! `pdfium-render` to bind, downloading a prebuilt copy when none is present.
//!
//! ## Lookup order
//!
//! [`locate`] answers "is there a library I can bind right now?":
//!
//! 1. `PDFIUM_LIB_PATH`, when it names an existing file.
//! 2. The versioned cache directory ([`PdfiumCache::from_env`]).
//!
//! [`PdfiumCache::ensure`] additionally downloads the platform archive from
//! [bblanchon/pdfium-binaries](https://github.com/bblanchon/pdfium-binaries)
//! and extracts the library into the cache.
//!
//! ```rust,no_run
//! use pdfium_fetch::{bind_library, PdfiumCache};
//!
//! let cache = PdfiumCache::from_env();
//! let path = cache.ensure(None).expect("download failed");
//! let pdfium = bind_library(&path).expect("bind failed");
//! ```
//!
//! ## Environment variables
//!
//! - `PDFIUM_LIB_PATH`: an existing pdfium library; skips the cache.
//! - `PDFIUM_FETCH_CACHE_DIR`: root directory for the cache.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use pdfium_render::prelude::Pdfium;
use thiserror::Error;
use tracing::{debug, info, warn};

/// The pdfium-binaries release tag used for downloads.
pub const PDFIUM_VERSION: &str = "7690";

/// Environment variable naming an existing library file.
pub const LIB_PATH_ENV: &str = "PDFIUM_LIB_PATH";

/// Environment variable overriding the cache root.
pub const CACHE_DIR_ENV: &str = "PDFIUM_FETCH_CACHE_DIR";

const BASE_URL: &str = "https://github.com/bblanchon/pdfium-binaries/releases/download";

const CHUNK_SIZE: usize = 64 * 1024;

/// Serialises downloads within the process so two threads never extract
/// into the same cache file at once.
static DOWNLOAD_LOCK: Mutex<()> = Mutex::new(());

/// Errors returned by pdfium-fetch.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Unsupported platform: {os}/{arch}")]
    UnsupportedPlatform { os: String, arch: String },

    #[error("Cache directory '{path}' is unusable: {source}")]
    CacheDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Download failed: {0}")]
    Download(String),

    #[error("Archive extraction failed: {0}")]
    Extract(String),

    #[error("Failed to bind PDFium from '{path}': {reason}")]
    Bind { path: PathBuf, reason: String },

    #[error("No PDFium library found on the system search path: {0}")]
    SystemLibrary(String),
}

/// Where the library lives for one `(os, arch)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Platform {
    /// Release asset, e.g. `pdfium-linux-x64.tgz`.
    pub archive: &'static str,
    /// Member inside the archive, e.g. `lib/libpdfium.so`.
    pub member: &'static str,
    /// File name written into the cache.
    pub file_name: &'static str,
}

const fn mac(archive: &'static str) -> Platform {
    Platform {
        archive,
        member: "lib/libpdfium.dylib",
        file_name: "libpdfium.dylib",
    }
}

const fn linux(archive: &'static str) -> Platform {
    Platform {
        archive,
        member: "lib/libpdfium.so",
        file_name: "libpdfium.so",
    }
}

const fn windows(archive: &'static str) -> Platform {
    Platform {
        archive,
        member: "bin/pdfium.dll",
        file_name: "pdfium.dll",
    }
}

const PLATFORMS: &[(&str, &str, Platform)] = &[
    ("macos", "aarch64", mac("pdfium-mac-arm64.tgz")),
    ("macos", "x86_64", mac("pdfium-mac-x64.tgz")),
    ("linux", "x86_64", linux("pdfium-linux-x64.tgz")),
    ("linux", "aarch64", linux("pdfium-linux-arm64.tgz")),
    ("windows", "x86_64", windows("pdfium-win-x64.tgz")),
    ("windows", "aarch64", windows("pdfium-win-arm64.tgz")),
    ("windows", "x86", windows("pdfium-win-x86.tgz")),
];

impl Platform {
    /// Look up the platform entry for an `(os, arch)` pair as reported by
    /// [`std::env::consts`].
    pub fn lookup(os: &str, arch: &str) -> Result<Platform, FetchError> {
        PLATFORMS
            .iter()
            .find(|(o, a, _)| *o == os && *a == arch)
            .map(|(_, _, p)| *p)
            .ok_or_else(|| FetchError::UnsupportedPlatform {
                os: os.to_string(),
                arch: arch.to_string(),
            })
    }

    /// The platform this binary is running on.
    pub fn current() -> Result<Platform, FetchError> {
        Self::lookup(std::env::consts::OS, std::env::consts::ARCH)
    }

    /// Download URL of this platform's archive.
    pub fn url(&self) -> String {
        format!("{BASE_URL}/chromium%2F{PDFIUM_VERSION}/{}", self.archive)
    }
}

/// A versioned on-disk cache holding one pdfium library.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfiumCache {
    dir: PathBuf,
}

impl PdfiumCache {
    /// Cache rooted at `root`; the library lives in `root/pdfium-{VERSION}/`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            dir: root.into().join(format!("pdfium-{PDFIUM_VERSION}")),
        }
    }

    /// Cache rooted at `PDFIUM_FETCH_CACHE_DIR`, or the user cache directory.
    ///
    /// - **Linux**: `~/.cache/pdf2png/`
    /// - **macOS**: `~/Library/Caches/pdf2png/`
    /// - **Windows**: `%LOCALAPPDATA%\pdf2png\`
    pub fn from_env() -> Self {
        if let Ok(root) = std::env::var(CACHE_DIR_ENV) {
            if !root.is_empty() {
                return Self::new(root);
            }
        }

        let base = dirs::cache_dir()
            .or_else(|| dirs::home_dir().map(|h| h.join(".cache")))
            .unwrap_or_else(std::env::temp_dir);

        Self::new(base.join("pdf2png"))
    }

    /// The versioned directory holding the library.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Where the library for the current platform is (or would be) stored.
    pub fn library_path(&self) -> Result<PathBuf, FetchError> {
        Ok(self.dir.join(Platform::current()?.file_name))
    }

    /// The cached library, if it has already been downloaded.
    pub fn cached(&self) -> Option<PathBuf> {
        self.library_path().ok().filter(|p| p.is_file())
    }

    /// Return the cached library, downloading and extracting it first if needed.
    ///
    /// `on_progress` receives `(bytes_downloaded, total_bytes)` while the
    /// archive streams in.
    ///
    /// # Panics
    ///
    /// Downloads with `reqwest::blocking`, which panics on an async runtime
    /// thread. Call from synchronous code or inside `spawn_blocking`.
    pub fn ensure(
        &self,
        on_progress: Option<&dyn Fn(u64, Option<u64>)>,
    ) -> Result<PathBuf, FetchError> {
        let platform = Platform::current()?;
        let lib_path = self.dir.join(platform.file_name);

        if lib_path.is_file() {
            return Ok(lib_path);
        }

        let _guard = DOWNLOAD_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        // Another thread may have finished while we waited.
        if lib_path.is_file() {
            return Ok(lib_path);
        }

        std::fs::create_dir_all(&self.dir).map_err(|source| FetchError::CacheDir {
            path: self.dir.clone(),
            source,
        })?;

        let url = platform.url();
        info!("Downloading PDFium {} from {}", PDFIUM_VERSION, url);
        let archive = download(&url, on_progress)?;
        extract_member(&archive, platform.member, &lib_path)?;
        info!("PDFium cached at {}", lib_path.display());

        Ok(lib_path)
    }
}

/// A library that can be bound without touching the network.
///
/// Checks `PDFIUM_LIB_PATH` first, then the default cache.
pub fn locate() -> Option<PathBuf> {
    if let Ok(p) = std::env::var(LIB_PATH_ENV) {
        let path = PathBuf::from(p);
        if path.is_file() {
            return Some(path);
        }
        warn!(
            "{} points to '{}' which does not exist; ignoring",
            LIB_PATH_ENV,
            path.display()
        );
    }
    PdfiumCache::from_env().cached()
}

/// Bind `pdfium-render` to the library at `path`.
pub fn bind_library(path: &Path) -> Result<Pdfium, FetchError> {
    debug!("Binding PDFium from {}", path.display());
    Pdfium::bind_to_library(path)
        .map(Pdfium::new)
        .map_err(|e| FetchError::Bind {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
}

/// Bind `pdfium-render` to a library on the platform's default search path.
pub fn bind_system_library() -> Result<Pdfium, FetchError> {
    Pdfium::bind_to_system_library()
        .map(Pdfium::new)
        .map_err(|e| FetchError::SystemLibrary(e.to_string()))
}

fn download(
    url: &str,
    on_progress: Option<&dyn Fn(u64, Option<u64>)>,
) -> Result<Vec<u8>, FetchError> {
    let client = reqwest::blocking::Client::builder()
        .user_agent(concat!("pdfium-fetch/", env!("CARGO_PKG_VERSION")))
        .redirect(reqwest::redirect::Policy::limited(5))
        .build()
        .map_err(|e| FetchError::Download(e.to_string()))?;

    let mut response = client
        .get(url)
        .send()
        .map_err(|e| FetchError::Download(format!("GET {url}: {e}")))?;

    if !response.status().is_success() {
        return Err(FetchError::Download(format!(
            "HTTP {} for {url}",
            response.status()
        )));
    }

    let total = response.content_length();
    let mut buf = Vec::with_capacity(total.unwrap_or(0) as usize);
    let mut chunk = vec![0u8; CHUNK_SIZE];
    let mut received: u64 = 0;

    loop {
        match response.read(&mut chunk) {
            Ok(0) => break,
            Ok(n) => {
                buf.extend_from_slice(&chunk[..n]);
                received += n as u64;
                if let Some(cb) = on_progress {
                    cb(received, total);
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(FetchError::Download(format!("read error: {e}"))),
        }
    }

    Ok(buf)
}

/// Copy one member of a gzipped tarball to `dest`.
///
/// The member is written to a temp file beside `dest` and renamed into
/// place, so an interrupted extraction never leaves a truncated library.
pub fn extract_member(archive: &[u8], member: &str, dest: &Path) -> Result<(), FetchError> {
    use flate2::read::GzDecoder;
    use tar::Archive;

    let parent = dest
        .parent()
        .ok_or_else(|| FetchError::Extract(format!("'{}' has no parent", dest.display())))?;

    let mut tarball = Archive::new(GzDecoder::new(archive));
    let entries = tarball
        .entries()
        .map_err(|e| FetchError::Extract(e.to_string()))?;

    for entry in entries {
        let mut entry = entry.map_err(|e| FetchError::Extract(e.to_string()))?;
        let name = entry
            .path()
            .map_err(|e| FetchError::Extract(e.to_string()))?
            .to_string_lossy()
            .into_owned();

        if name.trim_start_matches("./") != member {
            continue;
        }

        let mut staged = tempfile::NamedTempFile::new_in(parent)
            .map_err(|e| FetchError::Extract(format!("temp file: {e}")))?;
        std::io::copy(&mut entry, staged.as_file_mut())
            .map_err(|e| FetchError::Extract(format!("copy {member}: {e}")))?;
        staged
            .persist(dest)
            .map_err(|e| FetchError::Extract(format!("persist: {}", e.error)))?;
        return Ok(());
    }

    Err(FetchError::Extract(format!(
        "'{member}' not found in archive"
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::{write::GzEncoder, Compression};

    fn tarball(entries: &[(&str, &[u8])]) -> Vec<u8> {
        let mut builder = tar::Builder::new(GzEncoder::new(Vec::new(), Compression::fast()));
        for (name, data) in entries {
            let mut header = tar::Header::new_gnu();
            header.set_size(data.len() as u64);
            header.set_mode(0o644);
            builder.append_data(&mut header, name, *data).unwrap();
        }
        builder.into_inner().unwrap().finish().unwrap()
    }

    #[test]
    fn current_platform_is_supported() {
        Platform::current().expect("current platform should be supported");
    }

    #[test]
    fn lookup_rejects_unknown_platform() {
        let err = Platform::lookup("plan9", "mips").unwrap_err();
        assert!(err.to_string().contains("plan9/mips"), "got: {err}");
    }

    #[test]
    fn url_contains_version_and_archive() {
        let p = Platform::lookup("linux", "x86_64").unwrap();
        let url = p.url();
        assert!(url.ends_with("/chromium%2F7690/pdfium-linux-x64.tgz"), "got: {url}");
    }

    #[test]
    fn cache_dir_is_versioned() {
        let cache = PdfiumCache::new("/tmp/pdf2png-cache");
        assert_eq!(
            cache.dir(),
            Path::new("/tmp/pdf2png-cache").join(format!("pdfium-{PDFIUM_VERSION}"))
        );
    }

    #[test]
    fn empty_cache_has_nothing_cached() {
        let root = tempfile::tempdir().unwrap();
        assert_eq!(PdfiumCache::new(root.path()).cached(), None);
    }

    #[test]
    fn cached_finds_existing_library() {
        let root = tempfile::tempdir().unwrap();
        let cache = PdfiumCache::new(root.path());
        let lib = cache.library_path().unwrap();
        std::fs::create_dir_all(lib.parent().unwrap()).unwrap();
        std::fs::write(&lib, b"not really a library").unwrap();

        assert_eq!(cache.cached(), Some(lib.clone()));
        // ensure() must not try to download when the file is present.
        assert_eq!(cache.ensure(None).unwrap(), lib);
    }

    #[test]
    fn extract_member_writes_only_the_requested_file() {
        let dir = tempfile::tempdir().unwrap();
        let archive = tarball(&[
            ("include/fpdfview.h", b"header"),
            ("lib/libpdfium.so", b"ELF-ish bytes"),
        ]);
        let dest = dir.path().join("libpdfium.so");

        extract_member(&archive, "lib/libpdfium.so", &dest).unwrap();

        assert_eq!(std::fs::read(&dest).unwrap(), b"ELF-ish bytes");
        let entries = std::fs::read_dir(dir.path()).unwrap();
        assert_eq!(entries.count(), 1);
    }

    #[test]
    fn extract_member_accepts_dot_slash_prefix() {
        let dir = tempfile::tempdir().unwrap();
        let archive = tarball(&[("./bin/pdfium.dll", b"dll")]);
        let dest = dir.path().join("pdfium.dll");

        extract_member(&archive, "bin/pdfium.dll", &dest).unwrap();
        assert_eq!(std::fs::read(&dest).unwrap(), b"dll");
    }

    #[test]
    fn extract_member_reports_missing_member() {
        let dir = tempfile::tempdir().unwrap();
        let archive = tarball(&[("README", b"hi")]);
        let dest = dir.path().join("libpdfium.so");

        let err = extract_member(&archive, "lib/libpdfium.so", &dest).unwrap_err();
        assert!(matches!(err, FetchError::Extract(_)));
        assert!(!dest.exists());
    }

    #[test]
    fn extract_member_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let err = extract_member(b"definitely not gzip", "lib/libpdfium.so", &dir.path().join("x"))
            .unwrap_err();
        assert!(matches!(err, FetchError::Extract(_)));
    }
}
