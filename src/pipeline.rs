use crate::{
    chunker::{Chunk, ChunkRules, DocumentChunker},
    config::Config,
    engine::Engine,
    extract,
    output::JsonlWriter,
    policy::OcrMode,
    probe::{self, ProbeResult},
    report::{FileReport, PageReport, RunReport},
    util::{file_name, hash_file, list_pdfs, now_rfc3339, sha256_hex},
};
use anyhow::{anyhow, Context, Result};
use std::path::Path;
use std::time::Instant;
use tracing::{error, info, warn};

pub struct Pipeline<E: Engine> {
    cfg: Config,
    engine: E,
    rules: ChunkRules,
    mode: OcrMode,
}

/// Chunks of one PDF plus what happened while producing them. On failure the
/// chunks closed before the error are kept.
pub struct FileOutcome {
    pub chunks: Vec<Chunk>,
    pub report: FileReport,
}

impl<E: Engine> Pipeline<E> {
    pub fn new(cfg: &Config, engine: E) -> Result<Self> {
        let rules = ChunkRules::from_config(&cfg.chunking)?;
        let mode = OcrMode::from_config(cfg)?;
        Ok(Self {
            cfg: cfg.clone(),
            engine,
            rules,
            mode,
        })
    }

    pub fn run(&self, input_dir: &Path, output_path: &Path) -> Result<RunReport> {
        let started = now_rfc3339();
        let clock = Instant::now();

        if !input_dir.is_dir() {
            return Err(anyhow!(
                "input directory not found: {}",
                input_dir.display()
            ));
        }

        let pdfs = list_pdfs(input_dir)?;
        let mut report = RunReport {
            started,
            finished: String::new(),
            input_dir: input_dir.display().to_string(),
            output_path: output_path.display().to_string(),
            config_hash: sha256_hex(self.cfg.normalized_for_hash().as_bytes()),
            files: Vec::new(),
            total_chunks: 0,
            failed_files: 0,
        };

        if pdfs.is_empty() {
            warn!("no PDF files found in {}", input_dir.display());
            report.finished = now_rfc3339();
            return Ok(report);
        }

        let mut writer = JsonlWriter::create(output_path)?;
        info!(
            "chunking {} files into {}",
            pdfs.len(),
            output_path.display()
        );

        for (i, pdf) in pdfs.iter().enumerate() {
            let name = file_name(pdf);
            info!("[{}/{}] {}", i + 1, pdfs.len(), name);

            let outcome = self.chunk_pdf(pdf);
            writer.write_all(&outcome.chunks)?;

            if let Some(err) = &outcome.report.error {
                error!("error processing {name}: {err}");
                report.failed_files += 1;
            }
            report.total_chunks += outcome.report.chunks;
            report.files.push(outcome.report);
        }

        let written = writer.written();
        writer.finish()?;

        report.finished = now_rfc3339();
        info!(
            "done: {} chunks from {} files ({} failed) in {:.1}s -> {}",
            written,
            report.files.len(),
            report.failed_files,
            clock.elapsed().as_secs_f64(),
            output_path.display()
        );
        Ok(report)
    }

    pub fn chunk_pdf(&self, input: &Path) -> FileOutcome {
        let name = file_name(input);
        let mut report = FileReport {
            source: name.clone(),
            ..FileReport::default()
        };

        let mut chunker = self.rules.start(name);
        let chunks = match self.read_document(input, &mut chunker, &mut report) {
            Ok(()) => chunker.finish(),
            Err(err) => {
                report.error = Some(format!("{err:#}"));
                chunker.abandon()
            }
        };
        report.chunks = chunks.len() as u64;

        FileOutcome { chunks, report }
    }

    fn read_document(
        &self,
        input: &Path,
        chunker: &mut DocumentChunker<'_>,
        report: &mut FileReport,
    ) -> Result<()> {
        let probe = probe::probe_pdf(&self.cfg, &self.engine, input)?;
        report.file_bytes = probe.file_bytes;
        report.page_count = probe.page_count;

        match hash_file(&self.cfg, input) {
            Ok(sha) => report.sha256 = sha,
            Err(err) => warn!("hashing {}: {err:#}", report.source),
        }

        for page in 1..=probe.pages_to_read {
            let text = extract::read_page(&self.cfg, self.mode, &self.engine, input, page)
                .with_context(|| format!("page {page} of {}", input.display()))?;
            if text.used_ocr() {
                report.ocr_pages += 1;
            }
            chunker.push_page(page, &text.text);
            report.pages_read += 1;
        }
        Ok(())
    }

    /// Per-page extraction stats without chunking.
    pub fn probe_pages(&self, input: &Path) -> Result<(ProbeResult, Vec<PageReport>)> {
        let probe = probe::probe_pdf(&self.cfg, &self.engine, input)?;
        let mut pages = Vec::with_capacity(probe.pages_to_read as usize);
        for page in 1..=probe.pages_to_read {
            let text = extract::read_page(&self.cfg, self.mode, &self.engine, input, page)?;
            pages.push(PageReport::from(&text));
        }
        Ok((probe, pages))
    }
}
