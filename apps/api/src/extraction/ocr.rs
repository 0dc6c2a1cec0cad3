//! OCR adapter: image bytes → text, PDF bytes → text via page rasterization.
//!
//! Both external tools (Tesseract and Poppler's `pdftoppm`) sit behind traits
//! so the extractor can be exercised without them installed.

use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use std::process::Output;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::config::Config;

#[derive(Debug, Error)]
pub enum OcrError {
    #[error("could not decode image: {0}")]
    Decode(String),

    #[error("OCR engine failed: {0}")]
    Engine(String),

    #[error("PDF rasterization failed: {0}")]
    Rasterize(String),

    #[error("{0} timed out after {1}s")]
    Timeout(&'static str, u64),

    #[error("OCR failed on page {page}: {source}")]
    Page {
        page: usize,
        #[source]
        source: Box<OcrError>,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// What to do when a single page of a scanned PDF cannot be recognised.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OcrPageFailurePolicy {
    /// Fail the whole document.
    #[default]
    Abort,
    /// Log the failure and continue with an empty page.
    Skip,
}

#[derive(Debug, Error)]
#[error("unknown OCR page failure policy '{0}' (expected 'abort' or 'skip')")]
pub struct UnknownPolicy(String);

impl FromStr for OcrPageFailurePolicy {
    type Err = UnknownPolicy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "abort" => Ok(Self::Abort),
            "skip" => Ok(Self::Skip),
            other => Err(UnknownPolicy(other.to_string())),
        }
    }
}

/// Recognises text in a single raster image.
#[async_trait]
pub trait OcrEngine: Send + Sync {
    async fn recognize(&self, image: &[u8]) -> Result<String, OcrError>;
}

/// Renders every page of a PDF to an image, in page order.
#[async_trait]
pub trait PageRasterizer: Send + Sync {
    async fn rasterize(&self, pdf: &[u8]) -> Result<Vec<Vec<u8>>, OcrError>;
}

// ────────────────────────────────────────────────────────────────────────────
// Tesseract (CLI)
// ────────────────────────────────────────────────────────────────────────────

/// Runs `tesseract <image> stdout -l <lang>` per image.
pub struct TesseractCli {
    binary: String,
    language: String,
    timeout: Duration,
}

impl TesseractCli {
    pub fn new(binary: impl Into<String>, language: impl Into<String>, timeout: Duration) -> Self {
        Self {
            binary: binary.into(),
            language: language.into(),
            timeout,
        }
    }
}

#[async_trait]
impl OcrEngine for TesseractCli {
    async fn recognize(&self, image: &[u8]) -> Result<String, OcrError> {
        let mut file = tempfile::Builder::new()
            .prefix("fitcheck-ocr-")
            .suffix(".png")
            .tempfile()?;
        file.write_all(image)?;
        file.flush()?;

        let mut command = Command::new(&self.binary);
        command
            .arg(file.path())
            .arg("stdout")
            .arg("-l")
            .arg(&self.language);

        let output = run_tool(command, &self.binary, "tesseract", self.timeout)
            .await
            .map_err(|e| match e {
                ToolError::Timeout(secs) => OcrError::Timeout("tesseract", secs),
                ToolError::Failed(msg) => OcrError::Engine(msg),
            })?;

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// pdftoppm (CLI)
// ────────────────────────────────────────────────────────────────────────────

/// Runs `pdftoppm -png -r <dpi>` into a temporary directory.
pub struct PdftoppmRasterizer {
    binary: String,
    dpi: u32,
    timeout: Duration,
}

impl PdftoppmRasterizer {
    pub fn new(binary: impl Into<String>, dpi: u32, timeout: Duration) -> Self {
        Self {
            binary: binary.into(),
            dpi,
            timeout,
        }
    }
}

#[async_trait]
impl PageRasterizer for PdftoppmRasterizer {
    async fn rasterize(&self, pdf: &[u8]) -> Result<Vec<Vec<u8>>, OcrError> {
        let dir = tempfile::Builder::new().prefix("fitcheck-pdf-").tempdir()?;
        let input = dir.path().join("input.pdf");
        tokio::fs::write(&input, pdf).await?;

        let mut command = Command::new(&self.binary);
        command
            .arg("-png")
            .arg("-r")
            .arg(self.dpi.to_string())
            .arg(&input)
            .arg(dir.path().join("page"));

        run_tool(command, &self.binary, "pdftoppm", self.timeout)
            .await
            .map_err(|e| match e {
                ToolError::Timeout(secs) => OcrError::Timeout("pdftoppm", secs),
                ToolError::Failed(msg) => OcrError::Rasterize(msg),
            })?;

        let mut pages = Vec::new();
        for path in page_images(dir.path()).await? {
            pages.push(tokio::fs::read(&path).await?);
        }
        debug!(pages = pages.len(), "Rasterized PDF");
        Ok(pages)
    }
}

/// Lists `page-<n>.png` files in `dir`, ordered by page number.
async fn page_images(dir: &Path) -> Result<Vec<PathBuf>, OcrError> {
    let mut numbered: Vec<(u32, PathBuf)> = Vec::new();
    let mut entries = tokio::fs::read_dir(dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if let Some(number) = page_number(name) {
            numbered.push((number, path));
        }
    }
    numbered.sort_by_key(|(n, _)| *n);
    Ok(numbered.into_iter().map(|(_, p)| p).collect())
}

/// `page-007.png` → 7. pdftoppm pads the number to the width of the page count.
fn page_number(file_name: &str) -> Option<u32> {
    file_name
        .strip_prefix("page-")?
        .strip_suffix(".png")?
        .parse()
        .ok()
}

enum ToolError {
    Timeout(u64),
    Failed(String),
}

async fn run_tool(
    mut command: Command,
    binary: &str,
    tool: &'static str,
    timeout: Duration,
) -> Result<Output, ToolError> {
    command.kill_on_drop(true);
    let output = tokio::time::timeout(timeout, command.output())
        .await
        .map_err(|_| ToolError::Timeout(timeout.as_secs()))?
        .map_err(|e| ToolError::Failed(format!("could not run {tool} ({binary}): {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(ToolError::Failed(format!(
            "{tool} exited with {}: {}",
            output.status,
            stderr.trim()
        )));
    }
    Ok(output)
}

// ────────────────────────────────────────────────────────────────────────────
// Adapter
// ────────────────────────────────────────────────────────────────────────────

/// Stateless OCR front door used by the extractor.
#[derive(Clone)]
pub struct OcrAdapter {
    engine: Arc<dyn OcrEngine>,
    rasterizer: Arc<dyn PageRasterizer>,
    policy: OcrPageFailurePolicy,
}

impl OcrAdapter {
    pub fn new(
        engine: Arc<dyn OcrEngine>,
        rasterizer: Arc<dyn PageRasterizer>,
        policy: OcrPageFailurePolicy,
    ) -> Self {
        Self {
            engine,
            rasterizer,
            policy,
        }
    }

    /// Tesseract + pdftoppm, configured from the environment.
    pub fn from_config(config: &Config) -> Self {
        let timeout = Duration::from_secs(config.ocr_timeout_secs);
        Self::new(
            Arc::new(TesseractCli::new(
                config.tesseract_path.clone(),
                config.ocr_language.clone(),
                timeout,
            )),
            Arc::new(PdftoppmRasterizer::new(
                config.pdftoppm_path.clone(),
                config.ocr_dpi,
                timeout,
            )),
            config.ocr_page_failure_policy,
        )
    }

    /// Decodes `bytes` as an image and returns the recognised text untrimmed.
    pub async fn ocr_image(&self, bytes: &[u8]) -> Result<String, OcrError> {
        let owned = bytes.to_vec();
        let png = tokio::task::spawn_blocking(move || normalize_to_png(&owned))
            .await
            .map_err(|e| OcrError::Decode(e.to_string()))??;
        self.engine.recognize(&png).await
    }

    /// OCRs every page of a PDF; each page's text is followed by a newline.
    pub async fn ocr_pdf(&self, bytes: &[u8]) -> Result<String, OcrError> {
        let pages = self.rasterizer.rasterize(bytes).await?;
        info!(pages = pages.len(), "Running OCR on rasterized PDF");

        let mut text = String::new();
        for (index, page) in pages.iter().enumerate() {
            match self.engine.recognize(page).await {
                Ok(page_text) => text.push_str(&page_text),
                Err(e) => match self.policy {
                    OcrPageFailurePolicy::Abort => {
                        return Err(OcrError::Page {
                            page: index + 1,
                            source: Box::new(e),
                        })
                    }
                    OcrPageFailurePolicy::Skip => {
                        warn!(page = index + 1, "Skipping page after OCR failure: {e}");
                    }
                },
            }
            text.push('\n');
        }
        Ok(text)
    }
}

/// Re-encodes any supported raster format as PNG for the OCR engine.
fn normalize_to_png(bytes: &[u8]) -> Result<Vec<u8>, OcrError> {
    let image = image::load_from_memory(bytes).map_err(|e| OcrError::Decode(e.to_string()))?;
    let mut png = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut png), image::ImageOutputFormat::Png)
        .map_err(|e| OcrError::Decode(e.to_string()))?;
    Ok(png)
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    /// Returns `"page <n> text"` for each call, failing on the listed calls.
    #[derive(Default)]
    pub struct FakeEngine {
        pub calls: AtomicUsize,
        pub fail_on: Vec<usize>,
    }

    impl FakeEngine {
        pub fn failing_on(calls: &[usize]) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail_on: calls.to_vec(),
            }
        }

        pub fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl OcrEngine for FakeEngine {
        async fn recognize(&self, image: &[u8]) -> Result<String, OcrError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if self.fail_on.contains(&call) {
                return Err(OcrError::Engine(format!("unreadable page {call}")));
            }
            Ok(format!("page {call} text ({} bytes)", image.len()))
        }
    }

    /// Produces a fixed number of fake page images.
    pub struct FakeRasterizer {
        pub pages: usize,
        pub calls: AtomicUsize,
    }

    impl FakeRasterizer {
        pub fn with_pages(pages: usize) -> Self {
            Self {
                pages,
                calls: AtomicUsize::new(0),
            }
        }

        pub fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl PageRasterizer for FakeRasterizer {
        async fn rasterize(&self, _pdf: &[u8]) -> Result<Vec<Vec<u8>>, OcrError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok((0..self.pages).map(|i| vec![0u8; i + 1]).collect())
        }
    }

    pub fn tiny_png() -> Vec<u8> {
        let image = image::RgbImage::from_pixel(4, 4, image::Rgb([255, 255, 255]));
        let mut png = Vec::new();
        image::DynamicImage::ImageRgb8(image)
            .write_to(&mut Cursor::new(&mut png), image::ImageOutputFormat::Png)
            .unwrap();
        png
    }
}
