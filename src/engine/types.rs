use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolStatus {
    pub name: String,
    pub exe: String,
    pub ok: bool,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Page count from `pdfinfo` output (the `Pages:` line).
pub fn parse_pdfinfo_pages(raw: &str) -> Result<u32> {
    for line in raw.lines() {
        if let Some(rest) = line.strip_prefix("Pages:") {
            let value = rest.trim();
            return value
                .parse::<u32>()
                .map_err(|e| anyhow!("bad Pages value {value:?}: {e}"));
        }
    }
    Err(anyhow!("pdfinfo output has no Pages line"))
}

/// First non-empty line of a `--version` style banner.
pub fn first_line(raw: &str) -> Option<String> {
    raw.lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .map(str::to_string)
}
