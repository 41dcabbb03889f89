//! CLI binary for pdf2png.
//!
//! A thin shim over the library crate that maps CLI flags to `RenderConfig`
//! and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use pdf2png::{
    convert_file_with, inspect_with, ConversionProgressCallback, ConversionReport, Engine,
    PageSelection, ProgressCallback, RenderConfig, RenderedPage,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Renders a progress bar across the selected pages and one log line per
/// written PNG.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        bar.set_style(
            ProgressStyle::with_template(
                "{spinner:.cyan} {prefix:.bold}  [{bar:42.green/238}] {pos:>3}/{len} pages  {msg}",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▉▊▋▌▍▎▏  ")
            .tick_strings(TICKS),
        );
        bar.set_prefix("Rendering");
        bar.enable_steady_tick(Duration::from_millis(80));
        Arc::new(Self { bar })
    }
}

impl ConversionProgressCallback for CliProgressCallback {
    fn on_conversion_start(&self, total_pages: usize) {
        self.bar.set_length(total_pages as u64);
    }

    fn on_page_start(&self, page_num: usize, _total: usize) {
        self.bar.set_message(format!("page {page_num}"));
    }

    fn on_page_complete(&self, page_num: usize, total: usize, page: &RenderedPage) {
        self.bar.println(format!(
            "  {} Page {:>3}/{:<3}  {}  {}",
            green("✓"),
            page_num,
            total,
            dim(&format!("{}x{} px", page.width, page.height)),
            page.path.display(),
        ));
        self.bar.inc(1);
    }

    fn on_page_error(&self, page_num: usize, total: usize, error: &str) {
        self.bar.println(format!(
            "  {} Page {:>3}/{:<3}  {}",
            red("✗"),
            page_num,
            total,
            red(error.lines().next().unwrap_or(error)),
        ));
    }

    fn on_conversion_complete(&self, _total_pages: usize, _success_count: usize) {
        self.bar.finish_and_clear();
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # First page to static/pngs/test.png
  pdf2png static/pdfs/test.pdf -o static/pngs/test.png

  # Output next to the input (test.pdf → test.png)
  pdf2png test.pdf

  # Every page at 150 DPI → scan-0.png, scan-1.png, …
  pdf2png --pages all --dpi 150 scan.pdf -o out/scan.png --create-dirs

  # Print metadata only
  pdf2png --inspect-only --json report.pdf

ENVIRONMENT VARIABLES:
  PDFIUM_LIB_PATH         Path to an existing libpdfium — skips lookup and download
  PDFIUM_FETCH_CACHE_DIR  Override the pdfium cache directory
  RUST_LOG                Log filter (overrides --verbose / --quiet)

SETUP:
  PDFium (~30 MB) is downloaded automatically on first run and cached in
  ~/.cache/pdf2png/pdfium-7690/. Pass --no-download to only use a library
  that is already installed.
"#;

/// Rasterise PDF pages to PNG images.
#[derive(Parser, Debug)]
#[command(
    name = "pdf2png",
    version,
    about = "Rasterise PDF pages to PNG images",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// PDF file to convert.
    input: PathBuf,

    /// PNG file to write. Default: the input path with a .png extension.
    #[arg(short, long, env = "PDF2PNG_OUTPUT")]
    output: Option<PathBuf>,

    /// Rendering DPI (18–600). 72 renders one pixel per PDF point.
    #[arg(long, env = "PDF2PNG_DPI", default_value_t = 72,
          value_parser = clap::value_parser!(u32).range(18..=600))]
    dpi: u32,

    /// Cap on the rendered width and height in pixels.
    #[arg(long, env = "PDF2PNG_MAX_PIXELS")]
    max_pixels: Option<u32>,

    /// Page selection: 1 (default), all, 3-15, or 1,3,5.
    #[arg(long, env = "PDF2PNG_PAGES", default_value = "1")]
    pages: String,

    /// PDF user password for encrypted documents.
    #[arg(long, env = "PDF2PNG_PASSWORD")]
    password: Option<String>,

    /// Create missing output directories.
    #[arg(long, env = "PDF2PNG_CREATE_DIRS")]
    create_dirs: bool,

    /// Print PDF metadata only, no conversion.
    #[arg(long)]
    inspect_only: bool,

    /// Print a JSON report (or JSON metadata with --inspect-only).
    #[arg(long, env = "PDF2PNG_JSON")]
    json: bool,

    /// Disable the progress bar.
    #[arg(long, env = "PDF2PNG_NO_PROGRESS")]
    no_progress: bool,

    /// Never download PDFium; fail if no library is installed.
    #[arg(long, env = "PDF2PNG_NO_DOWNLOAD")]
    no_download: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "PDF2PNG_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "PDF2PNG_QUIET")]
    quiet: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The progress bar replaces INFO logs unless --verbose asks for them.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json && !cli.inspect_only;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    // A missing or non-PDF input fails here, before PDFium is downloaded.
    check_input(&cli.input)?;
    let engine = bind_engine(&cli)?;

    // ── Inspect-only mode ────────────────────────────────────────────────
    if cli.inspect_only {
        let meta = inspect_with(&engine, &cli.input, cli.password.as_deref())
            .context("Failed to inspect PDF")?;

        if cli.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&meta).context("Failed to serialize metadata")?
            );
        } else {
            println!("File:         {}", cli.input.display());
            for (label, value) in [
                ("Title", &meta.title),
                ("Author", &meta.author),
                ("Subject", &meta.subject),
                ("Creator", &meta.creator),
                ("Producer", &meta.producer),
            ] {
                if let Some(v) = value {
                    println!("{:<14}{}", format!("{label}:"), v);
                }
            }
            println!("Pages:        {}", meta.page_count);
            println!("PDF Version:  {}", meta.pdf_version);
        }
        return Ok(());
    }

    // ── Run conversion ───────────────────────────────────────────────────
    let progress: Option<ProgressCallback> = if show_progress {
        Some(CliProgressCallback::new() as ProgressCallback)
    } else {
        None
    };
    let config = build_config(&cli, progress)?;
    let output = cli
        .output
        .clone()
        .unwrap_or_else(|| default_output(&cli.input));

    let report = convert_file_with(&engine, &cli.input, &output, &config)
        .context("Conversion failed")?;

    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("Failed to serialise report")?
        );
    } else if !cli.quiet {
        print_summary(&report);
    }

    Ok(())
}

fn check_input(input: &Path) -> Result<()> {
    pdf2png::pipeline::input::validate_pdf(input)
        .map(drop)
        .with_context(|| format!("Cannot read input '{}'", input.display()))
}

/// Bind PDFium, downloading it with a progress bar unless told not to.
fn bind_engine(cli: &Cli) -> Result<Engine> {
    if cli.no_download {
        return Engine::bind().context("PDFium is not installed");
    }
    if cli.quiet {
        return Engine::bind_or_fetch(None).context("Failed to load PDFium engine");
    }

    let bar = ProgressBar::hidden();
    let progress = |downloaded: u64, total: Option<u64>| {
        if bar.is_hidden() {
            bar.set_draw_target(indicatif::ProgressDrawTarget::stderr());
            bar.set_style(
                ProgressStyle::with_template(
                    "{spinner:.cyan} {prefix:.bold}  \
                     [{bar:42.green/238}] {bytes}/{total_bytes}  ETA {eta_precise}",
                )
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("█▉▊▋▌▍▎▏  ")
                .tick_strings(TICKS),
            );
            bar.set_prefix("PDF engine");
        }
        if let Some(t) = total {
            bar.set_length(t);
        }
        bar.set_position(downloaded);
    };

    let engine = Engine::bind_or_fetch(Some(&progress)).context("Failed to load PDFium engine")?;
    if !bar.is_hidden() {
        bar.finish_with_message("ready ✓");
    }
    Ok(engine)
}

/// Map CLI args to `RenderConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<RenderConfig> {
    let pages: PageSelection = cli
        .pages
        .parse()
        .with_context(|| format!("Invalid --pages value '{}'", cli.pages))?;

    let mut builder = RenderConfig::builder()
        .dpi(cli.dpi)
        .pages(pages)
        .create_dirs(cli.create_dirs);

    if let Some(px) = cli.max_pixels {
        builder = builder.max_rendered_pixels(px);
    }
    if let Some(ref pwd) = cli.password {
        builder = builder.password(pwd.clone());
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

fn default_output(input: &Path) -> PathBuf {
    input.with_extension("png")
}

fn print_summary(report: &ConversionReport) {
    for page in &report.pages {
        eprintln!(
            "{}  page {}  →  {}  {}",
            green("✔"),
            page.page_num,
            bold(&page.path.display().to_string()),
            dim(&format!("{}x{} px", page.width, page.height)),
        );
    }
    eprintln!(
        "   {} of {} page(s) in {}ms",
        report.pages.len(),
        report.metadata.page_count,
        report.duration_ms
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_output_swaps_extension() {
        assert_eq!(
            default_output(Path::new("static/pdfs/test.pdf")),
            PathBuf::from("static/pdfs/test.png")
        );
        assert_eq!(default_output(Path::new("scan")), PathBuf::from("scan.png"));
    }

    #[test]
    fn cli_parses_flags() {
        let cli = Cli::try_parse_from([
            "pdf2png", "in.pdf", "-o", "out.png", "--dpi", "150", "--pages", "all",
        ])
        .unwrap();
        assert_eq!(cli.dpi, 150);
        let config = build_config(&cli, None).unwrap();
        assert_eq!(config.pages, PageSelection::All);
        assert_eq!(config.dpi, 150);
    }

    #[test]
    fn cli_rejects_out_of_range_dpi() {
        assert!(Cli::try_parse_from(["pdf2png", "in.pdf", "--dpi", "5000"]).is_err());
    }

    #[test]
    fn bad_pages_value_is_reported() {
        let cli = Cli::try_parse_from(["pdf2png", "in.pdf", "--pages", "4-2"]).unwrap();
        let err = build_config(&cli, None).unwrap_err();
        assert!(format!("{err:#}").contains("4-2"), "got: {err:#}");
    }

    #[test]
    fn missing_input_fails_before_binding() {
        let dir = tempfile::tempdir().unwrap();
        let err = check_input(&dir.path().join("missing.pdf")).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<pdf2png::Pdf2PngError>(),
            Some(pdf2png::Pdf2PngError::FileNotFound { .. })
        ));
    }

    #[test]
    fn pdf_input_passes_check() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ok.pdf");
        std::fs::write(&path, b"%PDF-1.4\n%%EOF\n").unwrap();
        assert!(check_input(&path).is_ok());
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
