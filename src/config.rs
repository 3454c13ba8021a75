use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub global: Global,
    #[serde(default)]
    pub paths: Paths,
    #[serde(default)]
    pub limits: Limits,
    #[serde(default)]
    pub tools: Tools,
    #[serde(default)]
    pub ocr: Ocr,
    #[serde(default)]
    pub chunking: Chunking,
    #[serde(default)]
    pub text: Text,
    #[serde(default)]
    pub output: Output,
    #[serde(default)]
    pub hashing: Hashing,
    #[serde(default)]
    pub logging: Logging,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config: {}", path.display()))?;
        let cfg: Config = toml::from_str(&raw).with_context(|| "parsing TOML")?;
        Ok(cfg)
    }

    /// A stable, normalization-friendly string for hashing.
    pub fn normalized_for_hash(&self) -> String {
        toml::to_string(self).unwrap_or_default()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Global {
    pub print_summary: bool,
}
impl Default for Global {
    fn default() -> Self {
        Self {
            print_summary: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Paths {
    pub input_dir: String,
    pub output_dir: String,
    pub output_filename: String,
}
impl Default for Paths {
    fn default() -> Self {
        Self {
            input_dir: "Data/input_pdfs".into(),
            output_dir: "Chunks".into(),
            output_filename: "megassis_chunks.jsonl".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Limits {
    pub max_input_file_bytes: u64,
    pub max_input_pages: u32,
    /// Read at most this many pages per file; 0 reads all of them.
    pub max_pages_per_file: u32,
}
impl Default for Limits {
    fn default() -> Self {
        Self {
            max_input_file_bytes: 2 * 1024 * 1024 * 1024,
            max_input_pages: 20000,
            max_pages_per_file: 0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Tools {
    pub pdfinfo: String,
    pub pdftotext: String,
    pub pdftoppm: String,
    pub tesseract: String,
    pub timeout_seconds: u64,
}
impl Default for Tools {
    fn default() -> Self {
        Self {
            pdfinfo: "pdfinfo".into(),
            pdftotext: "pdftotext".into(),
            pdftoppm: "pdftoppm".into(),
            tesseract: "tesseract".into(),
            timeout_seconds: 300,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Ocr {
    /// `auto`, `off` or `force`.
    pub mode: String,
    pub dpi: u32,
    pub lang: String,
    /// Pages whose trimmed native text is shorter than this are OCR'd in auto mode.
    pub min_text_chars: usize,
    pub abort_file_on_error: bool,
    pub extra_args: Vec<String>,
}
impl Default for Ocr {
    fn default() -> Self {
        Self {
            mode: "auto".into(),
            dpi: 150,
            lang: "eng".into(),
            min_text_chars: 10,
            abort_file_on_error: true,
            extra_args: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Chunking {
    pub boundary_pattern: String,
    pub case_insensitive: bool,
    pub min_chars_before_boundary: usize,
    pub max_chars: usize,
    pub keep_empty_chunks: bool,
}
impl Default for Chunking {
    fn default() -> Self {
        Self {
            boundary_pattern:
                r"(\\\[|\\\(|\$\$|\$|Exercise\s+\d+\.\d+|Question\s+\d+|Problem\s+\d+)".into(),
            case_insensitive: true,
            min_chars_before_boundary: 400,
            max_chars: 1200,
            keep_empty_chunks: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Text {
    pub normalize_newlines: bool,
    pub strip_form_feeds: bool,
    pub normalize_unicode: bool,
    pub control_chars_to_sanitize: Vec<u8>,
}
impl Default for Text {
    fn default() -> Self {
        let mut control_chars: Vec<u8> = (0u8..=8).collect();
        control_chars.push(11);
        control_chars.extend(14u8..=31);
        control_chars.push(127);
        Self {
            normalize_newlines: true,
            strip_form_feeds: true,
            normalize_unicode: false,
            control_chars_to_sanitize: control_chars,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Output {
    pub write_report_json: bool,
    pub report_filename: String,
}
impl Default for Output {
    fn default() -> Self {
        Self {
            write_report_json: false,
            report_filename: "megassis_chunks.report.json".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Hashing {
    /// `fast_2x16mb`, `full_sha256` or `none`.
    pub mode: String,
    pub fast_window_bytes: u64,
}
impl Default for Hashing {
    fn default() -> Self {
        Self {
            mode: "fast_2x16mb".into(),
            fast_window_bytes: 16 * 1024 * 1024,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Logging {
    pub level: String,
    pub json: bool,
    pub write_to_file: bool,
    pub file_path: String,
}
impl Default for Logging {
    fn default() -> Self {
        Self {
            level: "info".into(),
            json: false,
            write_to_file: false,
            file_path: "".into(),
        }
    }
}
