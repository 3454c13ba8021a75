use crate::{config::Config, engine::Engine};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeResult {
    pub path: String,
    pub file_bytes: u64,
    pub page_count: u32,
    /// Pages the pipeline will read, after `limits.max_pages_per_file`.
    pub pages_to_read: u32,
}

pub fn probe_pdf(cfg: &Config, engine: &dyn Engine, input: &Path) -> Result<ProbeResult> {
    let meta = std::fs::metadata(input).with_context(|| "stat input")?;
    let file_bytes = meta.len();
    if file_bytes > cfg.limits.max_input_file_bytes {
        anyhow::bail!("input exceeds max_input_file_bytes: {}", file_bytes);
    }

    let page_count = engine
        .page_count(input)
        .with_context(|| "engine page_count failed")?;

    if page_count > cfg.limits.max_input_pages {
        anyhow::bail!("input exceeds max_input_pages: {}", page_count);
    }

    let pages_to_read = match cfg.limits.max_pages_per_file {
        0 => page_count,
        n => page_count.min(n),
    };

    Ok(ProbeResult {
        path: input.display().to_string(),
        file_bytes,
        page_count,
        pages_to_read,
    })
}
