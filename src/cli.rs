use crate::{
    config::Config,
    engine::{poppler::PopplerEngine, Engine},
    output::JsonlWriter,
    pipeline::Pipeline,
    policy::TextSource,
    util::{ensure_dir, file_name},
};
use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

const DEFAULT_CONFIG: &str = "pdf-chunker.toml";

#[derive(Parser, Debug)]
#[command(name = "pdf-chunker")]
#[command(about = "Chunk a folder of PDFs into JSONL (embedded text, OCR fallback)")]
pub struct Args {
    #[command(subcommand)]
    pub cmd: Command,

    /// Path to config TOML. If omitted, uses ./pdf-chunker.toml if present, else defaults.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Override log level (trace/debug/info/warn/error).
    #[arg(long)]
    pub log_level: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Report which external tools are available.
    Doctor {},
    /// Chunk every PDF in the input directory into one JSONL file.
    Run {
        #[arg(long)]
        input_dir: Option<PathBuf>,
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Print the chunks of a single PDF as JSONL on stdout.
    Chunk {
        #[arg(long)]
        input: PathBuf,
    },
    /// Print per-page extraction stats of a single PDF.
    Probe {
        #[arg(long)]
        input: PathBuf,
    },
}

pub fn dispatch(args: Args) -> Result<()> {
    let cfg = load_config(args.config.as_deref())?;

    match &args.cmd {
        Command::Doctor {} => {
            let _guard = init_logging(&args, &cfg, resolve_log_path(&cfg, None).as_deref())?;
            doctor(&cfg)
        }
        Command::Run { input_dir, output } => {
            let output_path = output
                .clone()
                .unwrap_or_else(|| Path::new(&cfg.paths.output_dir).join(&cfg.paths.output_filename));
            let log_path = resolve_log_path(&cfg, output_path.parent());
            let _guard = init_logging(&args, &cfg, log_path.as_deref())?;
            let input_dir = input_dir
                .clone()
                .unwrap_or_else(|| PathBuf::from(&cfg.paths.input_dir));
            run(&cfg, &input_dir, &output_path)
        }
        Command::Chunk { input } => {
            let _guard = init_logging(&args, &cfg, resolve_log_path(&cfg, None).as_deref())?;
            chunk(&cfg, input)
        }
        Command::Probe { input } => {
            let _guard = init_logging(&args, &cfg, resolve_log_path(&cfg, None).as_deref())?;
            probe(&cfg, input)
        }
    }
}

fn load_config(user: Option<&Path>) -> Result<Config> {
    if let Some(p) = user {
        return Config::load(p);
    }
    let default = Path::new(DEFAULT_CONFIG);
    if default.exists() {
        Config::load(default)
    } else {
        Ok(Config::default())
    }
}

fn init_logging(args: &Args, cfg: &Config, file_path: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let level = args
        .log_level
        .as_deref()
        .unwrap_or(cfg.logging.level.as_str());

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    // stdout carries command output (JSONL, JSON reports); logs go to stderr.
    let console_layer = if cfg.logging.json {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_target(true)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .boxed()
    };

    let (file_layer, guard) = if let Some(path) = file_path {
        let parent = path.parent().unwrap_or_else(|| Path::new("."));
        ensure_dir(parent)?;
        let file = std::fs::File::create(path)
            .with_context(|| format!("create log file: {}", path.display()))?;
        let (non_blocking, guard) = tracing_appender::non_blocking(file);
        let layer = tracing_subscriber::fmt::layer()
            .with_writer(non_blocking)
            .with_ansi(false)
            .with_target(true)
            .boxed();
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow!("failed to init logging: {e}"))?;

    Ok(guard)
}

fn doctor(cfg: &Config) -> Result<()> {
    let engine = PopplerEngine::new(cfg);
    let tools = engine.doctor()?;
    for t in tools.iter().filter(|t| !t.ok) {
        warn!("{} ({}) is not available", t.name, t.exe);
    }
    println!("{}", serde_json::to_string_pretty(&tools)?);
    Ok(())
}

fn run(cfg: &Config, input_dir: &Path, output_path: &Path) -> Result<()> {
    let pipeline = Pipeline::new(cfg, PopplerEngine::new(cfg))?;
    let report = pipeline.run(input_dir, output_path)?;

    if cfg.output.write_report_json && !report.files.is_empty() {
        let report_path = output_path
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .join(&cfg.output.report_filename);
        std::fs::write(&report_path, serde_json::to_string_pretty(&report)?)
            .with_context(|| format!("writing report: {}", report_path.display()))?;
        info!("report written to {}", report_path.display());
    }

    if cfg.global.print_summary {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "output": output_path,
                "files": report.files.len(),
                "failed_files": report.failed_files,
                "chunks": report.total_chunks,
                "status": "ok"
            }))?
        );
    }

    Ok(())
}

fn chunk(cfg: &Config, input: &Path) -> Result<()> {
    validate_input(input)?;
    let pipeline = Pipeline::new(cfg, PopplerEngine::new(cfg))?;
    let outcome = pipeline.chunk_pdf(input);

    let stdout = std::io::stdout();
    let mut writer = JsonlWriter::new(stdout.lock(), Path::new("<stdout>"));
    writer.write_all(&outcome.chunks)?;
    writer.finish()?;

    if let Some(err) = outcome.report.error {
        return Err(anyhow!("error processing {}: {err}", file_name(input)));
    }
    Ok(())
}

fn probe(cfg: &Config, input: &Path) -> Result<()> {
    validate_input(input)?;
    let pipeline = Pipeline::new(cfg, PopplerEngine::new(cfg))?;
    let (probe, pages) = pipeline.probe_pages(input)?;
    println!(
        "{}",
        serde_json::to_string_pretty(&serde_json::json!({
            "probe": probe,
            "ocr_pages": pages.iter().filter(|p| p.source == TextSource::Ocr).count(),
            "pages": pages,
        }))?
    );
    Ok(())
}

fn validate_input(input: &Path) -> Result<()> {
    if !input.is_file() {
        return Err(anyhow!("input does not exist: {}", input.display()));
    }

    if let Some(ext) = input.extension().and_then(|s| s.to_str()) {
        if !ext.eq_ignore_ascii_case("pdf") {
            return Err(anyhow!("input is not a PDF: {}", input.display()));
        }
    } else {
        warn!("input has no extension; assuming PDF: {}", input.display());
    }

    Ok(())
}

fn resolve_log_path(cfg: &Config, output_dir: Option<&Path>) -> Option<PathBuf> {
    if !cfg.logging.write_to_file {
        return None;
    }

    if !cfg.logging.file_path.is_empty() {
        return Some(PathBuf::from(&cfg.logging.file_path));
    }

    if let Some(dir) = output_dir.filter(|d| !d.as_os_str().is_empty()) {
        return Some(dir.join("pdf-chunker.log"));
    }

    Some(PathBuf::from(&cfg.paths.output_dir).join("pdf-chunker.log"))
}
