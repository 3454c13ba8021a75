use super::{
    types::{first_line, parse_pdfinfo_pages},
    Engine, ToolStatus,
};
use crate::config::Config;
use anyhow::{anyhow, Context, Result};
use std::ffi::OsStr;
use std::io::{Read, Write};
use std::path::Path;
use std::process::{Child, Command, Output, Stdio};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Poppler command line tools for text and rendering, tesseract for OCR.
pub struct PopplerEngine {
    cfg: Config,
}

impl PopplerEngine {
    pub fn new(cfg: &Config) -> Self {
        Self { cfg: cfg.clone() }
    }

    fn timeout(&self) -> Option<Duration> {
        if self.cfg.tools.timeout_seconds > 0 {
            Some(Duration::from_secs(self.cfg.tools.timeout_seconds))
        } else {
            None
        }
    }

    fn run<S: AsRef<OsStr>>(&self, exe: &str, args: &[S], stdin: Option<&[u8]>) -> Result<Output> {
        let output = run_tool(exe, args, stdin, self.timeout())?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(anyhow!(
                "{exe} exited with {}: {}",
                output.status,
                stderr.trim()
            ));
        }
        if !output.stderr.is_empty() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            debug!("{exe} stderr: {}", stderr.trim());
        }
        Ok(output)
    }

    fn probe_tool(&self, name: &str, exe: &str, version_flag: &str) -> ToolStatus {
        // poppler tools print the banner on stderr and some builds exit non-zero for -v.
        match run_tool(exe, &[version_flag], None, Some(Duration::from_secs(10))) {
            Ok(out) => {
                let stdout = String::from_utf8_lossy(&out.stdout);
                let stderr = String::from_utf8_lossy(&out.stderr);
                ToolStatus {
                    name: name.to_string(),
                    exe: exe.to_string(),
                    ok: true,
                    version: first_line(&stdout).or_else(|| first_line(&stderr)),
                    error: None,
                }
            }
            Err(err) => ToolStatus {
                name: name.to_string(),
                exe: exe.to_string(),
                ok: false,
                version: None,
                error: Some(format!("{err:#}")),
            },
        }
    }
}

impl Engine for PopplerEngine {
    fn doctor(&self) -> Result<Vec<ToolStatus>> {
        let tools = &self.cfg.tools;
        Ok(vec![
            self.probe_tool("pdfinfo", &tools.pdfinfo, "-v"),
            self.probe_tool("pdftotext", &tools.pdftotext, "-v"),
            self.probe_tool("pdftoppm", &tools.pdftoppm, "-v"),
            self.probe_tool("tesseract", &tools.tesseract, "--version"),
        ])
    }

    fn page_count(&self, input: &Path) -> Result<u32> {
        let out = self.run(&self.cfg.tools.pdfinfo, &[input.as_os_str()], None)?;
        let raw = String::from_utf8_lossy(&out.stdout);
        parse_pdfinfo_pages(&raw).with_context(|| format!("pdfinfo {}", input.display()))
    }

    fn extract_text(&self, input: &Path, page: u32) -> Result<String> {
        let page = page.to_string();
        let args: [&OsStr; 8] = [
            "-f".as_ref(),
            page.as_ref(),
            "-l".as_ref(),
            page.as_ref(),
            "-enc".as_ref(),
            "UTF-8".as_ref(),
            input.as_os_str(),
            "-".as_ref(),
        ];
        let out = self.run(&self.cfg.tools.pdftotext, &args, None)?;
        Ok(String::from_utf8_lossy(&out.stdout).into_owned())
    }

    fn rasterize(&self, input: &Path, page: u32, dpi: u32) -> Result<Vec<u8>> {
        let page = page.to_string();
        let dpi = dpi.to_string();
        let args: [&OsStr; 9] = [
            "-png".as_ref(),
            "-r".as_ref(),
            dpi.as_ref(),
            "-f".as_ref(),
            page.as_ref(),
            "-l".as_ref(),
            page.as_ref(),
            "-singlefile".as_ref(),
            input.as_os_str(),
        ];
        let out = self.run(&self.cfg.tools.pdftoppm, &args, None)?;
        if out.stdout.is_empty() {
            return Err(anyhow!("pdftoppm produced no image for page {page}"));
        }
        Ok(out.stdout)
    }

    fn recognize(&self, png: &[u8], lang: &str) -> Result<String> {
        let mut args: Vec<&str> = vec!["stdin", "stdout", "-l", lang];
        args.extend(self.cfg.ocr.extra_args.iter().map(String::as_str));
        let out = self.run(&self.cfg.tools.tesseract, args.as_slice(), Some(png))?;
        Ok(String::from_utf8_lossy(&out.stdout).into_owned())
    }
}

fn run_tool<S: AsRef<OsStr>>(
    exe: &str,
    args: &[S],
    stdin: Option<&[u8]>,
    timeout: Option<Duration>,
) -> Result<Output> {
    debug!("spawn {exe} timeout={:?}", timeout);
    let mut cmd = Command::new(exe);
    cmd.args(args);
    cmd.stdin(if stdin.is_some() {
        Stdio::piped()
    } else {
        Stdio::null()
    });
    cmd.stdout(Stdio::piped());
    cmd.stderr(Stdio::piped());

    let mut child = cmd.spawn().with_context(|| format!("spawning {exe}"))?;

    let writer = match stdin {
        Some(bytes) => {
            let mut pipe = child.stdin.take().ok_or_else(|| anyhow!("no stdin"))?;
            let bytes = bytes.to_vec();
            Some(std::thread::spawn(move || -> Result<()> {
                pipe.write_all(&bytes).with_context(|| "write stdin")?;
                pipe.flush().ok();
                Ok(())
            }))
        }
        None => None,
    };

    let output = wait_with_timeout(&mut child, timeout);

    if let Some(writer) = writer {
        let written = writer
            .join()
            .map_err(|_| anyhow!("stdin writer thread panicked"))?;
        // A child that exits early closes the pipe; its exit status tells the real story.
        if let Err(err) = written {
            debug!("{exe}: {err:#}");
        }
    }

    output.with_context(|| format!("running {exe}"))
}

fn wait_with_timeout(child: &mut Child, timeout: Option<Duration>) -> Result<Output> {
    // Drain pipes while waiting so a chatty child can't deadlock on a full buffer.
    let stdout_thread = drain(child.stdout.take(), "stdout");
    let stderr_thread = drain(child.stderr.take(), "stderr");

    let start = Instant::now();
    loop {
        if let Some(status) = child.try_wait().with_context(|| "try_wait")? {
            return Ok(Output {
                status,
                stdout: join_drain(stdout_thread)?,
                stderr: join_drain(stderr_thread)?,
            });
        }

        if let Some(limit) = timeout {
            if start.elapsed() > limit {
                warn!("process timed out after {:?}", limit);
                let _ = child.kill();
                child.wait().with_context(|| "wait after kill")?;
                let _ = join_drain(stdout_thread)?;
                let stderr = join_drain(stderr_thread)?;
                return Err(anyhow!(
                    "process exceeded timeout ({:?}); stderr: {}",
                    limit,
                    String::from_utf8_lossy(&stderr)
                ));
            }
        }

        std::thread::sleep(Duration::from_millis(20));
    }
}

fn drain<R: Read + Send + 'static>(
    reader: Option<R>,
    name: &'static str,
) -> JoinHandle<Result<Vec<u8>>> {
    std::thread::spawn(move || -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        if let Some(mut r) = reader {
            r.read_to_end(&mut buf)
                .with_context(|| format!("read {name}"))?;
        }
        Ok(buf)
    })
}

fn join_drain(handle: JoinHandle<Result<Vec<u8>>>) -> Result<Vec<u8>> {
    handle
        .join()
        .map_err(|_| anyhow!("pipe reader thread panicked"))?
}
