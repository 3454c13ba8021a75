use crate::config::Chunking;
use anyhow::{bail, Context, Result};
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

/// One output record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    pub content: String,
}

/// Compiled chunking rules, shared by every document of a run.
#[derive(Debug, Clone)]
pub struct ChunkRules {
    boundary: Regex,
    min_chars_before_boundary: usize,
    max_chars: usize,
    keep_empty: bool,
}

impl ChunkRules {
    pub fn from_config(cfg: &Chunking) -> Result<Self> {
        if cfg.max_chars == 0 {
            bail!("chunking.max_chars must be greater than zero");
        }
        let boundary = RegexBuilder::new(&cfg.boundary_pattern)
            .case_insensitive(cfg.case_insensitive)
            .build()
            .with_context(|| format!("compiling chunking.boundary_pattern: {}", cfg.boundary_pattern))?;
        Ok(Self {
            boundary,
            min_chars_before_boundary: cfg.min_chars_before_boundary,
            max_chars: cfg.max_chars,
            keep_empty: cfg.keep_empty_chunks,
        })
    }

    pub fn is_boundary(&self, line: &str) -> bool {
        self.boundary.is_match(line)
    }

    pub fn start(&self, source: impl Into<String>) -> DocumentChunker<'_> {
        DocumentChunker {
            rules: self,
            source: source.into(),
            current: String::new(),
            current_chars: 0,
            emitted: Vec::new(),
        }
    }
}

/// Running chunk state for one document. The buffer carries across pages.
#[derive(Debug)]
pub struct DocumentChunker<'a> {
    rules: &'a ChunkRules,
    source: String,
    current: String,
    current_chars: usize,
    emitted: Vec<Chunk>,
}

impl DocumentChunker<'_> {
    pub fn push_page(&mut self, page: u32, text: &str) {
        for line in text.split('\n') {
            if self.rules.is_boundary(line)
                && self.current_chars > self.rules.min_chars_before_boundary
            {
                self.emit(Some(page));
            }
            self.append_line(line);

            if self.current_chars > self.rules.max_chars {
                self.emit(Some(page));
            }
        }
    }

    /// Chunks closed so far, excluding the in-progress buffer.
    pub fn emitted(&self) -> &[Chunk] {
        &self.emitted
    }

    /// Gives up on the document: the in-progress buffer is dropped.
    pub fn abandon(self) -> Vec<Chunk> {
        self.emitted
    }

    /// Flushes the trailing buffer, without a page number.
    pub fn finish(mut self) -> Vec<Chunk> {
        if !self.current.is_empty() {
            self.emit(None);
        }
        self.emitted
    }

    fn append_line(&mut self, line: &str) {
        self.current.push_str(line);
        self.current.push('\n');
        self.current_chars += line.chars().count() + 1;
    }

    fn emit(&mut self, page: Option<u32>) {
        let content = self.current.trim().to_string();
        self.current.clear();
        self.current_chars = 0;
        if content.is_empty() && !self.rules.keep_empty {
            return;
        }
        self.emitted.push(Chunk {
            source: self.source.clone(),
            page,
            content,
        });
    }
}
