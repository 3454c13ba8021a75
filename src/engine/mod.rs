pub mod poppler;
pub mod types;

use anyhow::Result;
use std::path::Path;

pub use types::ToolStatus;

/// Access to a PDF's pages: embedded text, rasterized images and OCR.
pub trait Engine {
    fn doctor(&self) -> Result<Vec<ToolStatus>>;
    fn page_count(&self, input: &Path) -> Result<u32>;
    /// Embedded text of a 1-based page.
    fn extract_text(&self, input: &Path, page: u32) -> Result<String>;
    /// PNG bytes of a 1-based page rendered at `dpi`.
    fn rasterize(&self, input: &Path, page: u32, dpi: u32) -> Result<Vec<u8>>;
    fn recognize(&self, png: &[u8], lang: &str) -> Result<String>;
}
