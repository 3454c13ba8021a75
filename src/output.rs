use crate::{chunker::Chunk, util::ensure_dir};
use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Appends chunks to a JSON-lines file, one compact object per line.
pub struct JsonlWriter<W: Write> {
    out: W,
    path: PathBuf,
    written: u64,
}

impl JsonlWriter<BufWriter<File>> {
    /// Creates (truncating) `path`, making its parent directory if needed.
    pub fn create(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            ensure_dir(parent)?;
        }
        let file =
            File::create(path).with_context(|| format!("create output: {}", path.display()))?;
        Ok(Self::new(BufWriter::new(file), path))
    }
}

impl<W: Write> JsonlWriter<W> {
    pub fn new(out: W, path: &Path) -> Self {
        Self {
            out,
            path: path.to_path_buf(),
            written: 0,
        }
    }

    pub fn write_chunk(&mut self, chunk: &Chunk) -> Result<()> {
        serde_json::to_writer(&mut self.out, chunk)
            .with_context(|| format!("writing chunk to {}", self.path.display()))?;
        self.out
            .write_all(b"\n")
            .with_context(|| format!("writing chunk to {}", self.path.display()))?;
        self.written += 1;
        Ok(())
    }

    pub fn write_all(&mut self, chunks: &[Chunk]) -> Result<()> {
        for chunk in chunks {
            self.write_chunk(chunk)?;
        }
        Ok(())
    }

    pub fn written(&self) -> u64 {
        self.written
    }

    pub fn finish(mut self) -> Result<()> {
        self.out
            .flush()
            .with_context(|| format!("flushing {}", self.path.display()))
    }
}
