use crate::{
    config::Config,
    engine::Engine,
    policy::{self, OcrMode, PageDecision, Reason, TextSource},
    postprocess,
};
use anyhow::{Context, Result};
use serde::Serialize;
use std::path::Path;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Serialize)]
pub struct PageText {
    pub page: u32,
    pub text: String,
    pub decision: PageDecision,
}

impl PageText {
    pub fn used_ocr(&self) -> bool {
        self.decision.source == TextSource::Ocr
    }
}

/// Text of one 1-based page: embedded text, or OCR of the rendered page when
/// the policy asks for it.
pub fn read_page(
    cfg: &Config,
    mode: OcrMode,
    engine: &dyn Engine,
    input: &Path,
    page: u32,
) -> Result<PageText> {
    let native = engine
        .extract_text(input, page)
        .with_context(|| format!("extracting text of page {page}"))?;
    let native = postprocess::normalize_page(cfg, &native);

    let mut decision = policy::decide(mode, cfg.ocr.min_text_chars, &native);
    debug!(page, chars = decision.native_chars, reason = ?decision.reason, "page text");

    match decision.source {
        TextSource::Native => {
            if decision.reason == Reason::OcrDisabled {
                warn!(page, "page has almost no text and ocr.mode=off");
            }
            Ok(PageText {
                page,
                text: native,
                decision,
            })
        }
        TextSource::Ocr => match ocr_page(cfg, engine, input, page) {
            Ok(text) => {
                info!(page, chars = text.trim().chars().count(), "ocr fallback");
                Ok(PageText {
                    page,
                    text,
                    decision,
                })
            }
            Err(err) if !cfg.ocr.abort_file_on_error => {
                warn!(page, "ocr failed, keeping embedded text: {err:#}");
                decision.source = TextSource::Native;
                decision.reason = Reason::OcrFailed;
                Ok(PageText {
                    page,
                    text: native,
                    decision,
                })
            }
            Err(err) => Err(err),
        },
    }
}

fn ocr_page(cfg: &Config, engine: &dyn Engine, input: &Path, page: u32) -> Result<String> {
    let png = engine
        .rasterize(input, page, cfg.ocr.dpi)
        .with_context(|| format!("rendering page {page} at {} dpi", cfg.ocr.dpi))?;
    let text = engine
        .recognize(&png, &cfg.ocr.lang)
        .with_context(|| format!("ocr of page {page}"))?;
    Ok(postprocess::normalize_page(cfg, &text))
}
