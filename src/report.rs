use crate::extract::PageText;
use crate::policy::{Reason, TextSource};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub started: String,
    pub finished: String,
    pub input_dir: String,
    pub output_path: String,
    pub config_hash: String,
    pub files: Vec<FileReport>,
    pub total_chunks: u64,
    pub failed_files: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileReport {
    pub source: String,
    #[serde(default)]
    pub sha256: Option<String>,
    pub file_bytes: u64,
    pub page_count: u32,
    pub pages_read: u32,
    pub ocr_pages: u32,
    pub chunks: u64,
    #[serde(default)]
    pub error: Option<String>,
}

impl FileReport {
    pub fn ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Per-page line of the `probe` command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageReport {
    pub page: u32,
    pub source: TextSource,
    pub reason: Reason,
    pub native_chars: usize,
    pub chars: usize,
    pub lines: usize,
}

impl From<&PageText> for PageReport {
    fn from(p: &PageText) -> Self {
        Self {
            page: p.page,
            source: p.decision.source,
            reason: p.decision.reason,
            native_chars: p.decision.native_chars,
            chars: p.text.trim().chars().count(),
            lines: p.text.lines().count(),
        }
    }
}
