use crate::config::Config;
use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OcrMode {
    Auto,
    Off,
    Force,
}

impl OcrMode {
    pub fn from_config(cfg: &Config) -> Result<Self> {
        match cfg.ocr.mode.to_ascii_lowercase().as_str() {
            "auto" => Ok(OcrMode::Auto),
            "off" => Ok(OcrMode::Off),
            "force" => Ok(OcrMode::Force),
            other => bail!("unknown ocr.mode: {other} (expected auto, off or force)"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextSource {
    Native,
    Ocr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reason {
    NativeText,
    LowText,
    Forced,
    OcrDisabled,
    OcrFailed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageDecision {
    pub source: TextSource,
    pub reason: Reason,
    pub native_chars: usize,
}

/// True when the trimmed text has fewer than `min_chars` characters.
pub fn is_page_empty(text: &str, min_chars: usize) -> bool {
    text.trim().chars().count() < min_chars
}

pub fn decide(mode: OcrMode, min_chars: usize, native_text: &str) -> PageDecision {
    let empty = is_page_empty(native_text, min_chars);
    let native_chars = native_text.trim().chars().count();

    let (source, reason) = match mode {
        OcrMode::Force => (TextSource::Ocr, Reason::Forced),
        OcrMode::Auto if empty => (TextSource::Ocr, Reason::LowText),
        OcrMode::Off if empty => (TextSource::Native, Reason::OcrDisabled),
        OcrMode::Auto | OcrMode::Off => (TextSource::Native, Reason::NativeText),
    };

    PageDecision {
        source,
        reason,
        native_chars,
    }
}
