//! Rendering of the companion document through an export engine.
//!
//! The engine is opaque: it receives the raw Org text and a backend name and
//! hands back plain text. [`Renderer`] adds the process-wide backend choice
//! and file reading on top of an [`Exporter`].

use crate::document::read_text;
use crate::error::Error;
use anyhow::{Context, Result};
use log::debug;
use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::str::FromStr;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

/// Export backend identifier, e.g. `ascii` or `markdown`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Backend(String);

impl Backend {
    pub const DEFAULT: &'static str = "ascii";

    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }

    /// Name of the matching Org export backend symbol.
    fn org_symbol(&self) -> &str {
        match self.0.as_str() {
            "markdown" => "md",
            other => other,
        }
    }

    /// Name of the matching pandoc writer.
    fn pandoc_writer(&self) -> &str {
        match self.0.as_str() {
            "ascii" => "plain",
            "md" => "markdown",
            other => other,
        }
    }
}

impl Default for Backend {
    fn default() -> Self {
        Self::new(Self::DEFAULT)
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One export job handed to an [`Exporter`].
#[derive(Debug, Clone, Copy)]
pub struct ExportRequest<'a> {
    pub text: &'a str,
    pub backend: &'a Backend,
    /// Directory relative references in the document resolve against.
    pub base_dir: Option<&'a Path>,
}

/// An export engine turning Org text into rendered text.
#[allow(async_fn_in_trait)]
pub trait Exporter {
    async fn export(&self, request: ExportRequest<'_>) -> Result<String>;
}

/// Which export program to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Engine {
    /// Org's own exporter in a batch Emacs.
    #[default]
    Emacs,
    Pandoc,
    /// The document text, unrendered.
    Plain,
}

impl Engine {
    pub const NAMES: [&'static str; 3] = ["emacs", "pandoc", "plain"];
}

impl FromStr for Engine {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "emacs" => Ok(Self::Emacs),
            "pandoc" => Ok(Self::Pandoc),
            "plain" => Ok(Self::Plain),
            other => anyhow::bail!("Unknown export engine: {other}"),
        }
    }
}

/// Exporter dispatching on [`Engine`].
#[derive(Debug, Clone)]
pub struct CommandExporter {
    engine: Engine,
    program: String,
}

impl CommandExporter {
    pub fn new(engine: Engine) -> Self {
        let program = match engine {
            Engine::Emacs => "emacs",
            Engine::Pandoc => "pandoc",
            Engine::Plain => "",
        };
        Self {
            engine,
            program: program.to_string(),
        }
    }

    /// Overrides the executable, e.g. a specific Emacs build.
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    async fn export_with_emacs(&self, request: ExportRequest<'_>) -> Result<String> {
        // batch Emacs reads the document from a file
        let mut input = tempfile::Builder::new()
            .prefix("org2comment-")
            .suffix(".org")
            .tempfile()
            .context("Failed to create temporary file for export")?;
        input
            .write_all(request.text.as_bytes())
            .context("Failed to write temporary export input")?;
        input.flush()?;

        let form = emacs_export_form(input.path(), request.backend);
        debug!("Running {} with {}", self.program, form);

        let mut command = Command::new(&self.program);
        command.args(["--batch", "-Q", "--eval", form.as_str()]);
        if let Some(dir) = request.base_dir {
            command.current_dir(dir);
        }

        let output = command
            .stdin(Stdio::null())
            .output()
            .await
            .with_context(|| format!("Failed to start `{}`", self.program))?;

        self.collect(output)
    }

    async fn export_with_pandoc(&self, request: ExportRequest<'_>) -> Result<String> {
        let writer = request.backend.pandoc_writer();
        debug!("Running {} -f org -t {}", self.program, writer);

        let mut command = Command::new(&self.program);
        command.args(["-f", "org", "-t", writer]);
        if let Some(dir) = request.base_dir {
            command.current_dir(dir);
        }

        let mut child = command
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .with_context(|| format!("Failed to start `{}`", self.program))?;

        // feed stdin and drain stdout together
        let stdin = child.stdin.take();
        let text = request.text;
        let feed = async move {
            if let Some(mut stdin) = stdin {
                stdin.write_all(text.as_bytes()).await?;
            }
            Ok::<_, std::io::Error>(())
        };

        let (fed, output) = tokio::join!(feed, child.wait_with_output());
        fed.with_context(|| format!("Failed to write to `{}`", self.program))?;
        let output =
            output.with_context(|| format!("Failed to wait for `{}`", self.program))?;

        self.collect(output)
    }

    fn collect(&self, output: std::process::Output) -> Result<String> {
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::render(
                &self.program,
                format!("{} ({})", stderr.trim(), output.status),
            )
            .into());
        }

        String::from_utf8(output.stdout)
            .map_err(|_| Error::render(&self.program, "output is not valid UTF-8").into())
    }
}

impl Exporter for CommandExporter {
    async fn export(&self, request: ExportRequest<'_>) -> Result<String> {
        match self.engine {
            Engine::Emacs => self.export_with_emacs(request).await,
            Engine::Pandoc => self.export_with_pandoc(request).await,
            Engine::Plain => Ok(request.text.to_string()),
        }
    }
}

/// Elisp form that prints the export of the file at `input`.
fn emacs_export_form(input: &Path, backend: &Backend) -> String {
    let symbol = backend.org_symbol();
    format!(
        "(progn \
           (require 'ox) \
           (require 'ox-{symbol} nil t) \
           (setq coding-system-for-write 'utf-8) \
           (princ (org-export-string-as \
                    (with-temp-buffer \
                      (insert-file-contents {path}) \
                      (buffer-string)) \
                    '{symbol})))",
        path = elisp_string(&input.display().to_string()),
    )
}

fn elisp_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for ch in value.chars() {
        if ch == '"' || ch == '\\' {
            out.push('\\');
        }
        out.push(ch);
    }
    out.push('"');
    out
}

/// Where the companion text comes from.
#[derive(Debug, Clone, Copy)]
pub enum CompanionSource<'a> {
    /// Read the whole file first.
    File(&'a Path),
    /// Text of an already-open buffer.
    Text(&'a str),
}

/// Renders companion documents with a fixed backend.
#[derive(Debug, Clone)]
pub struct Renderer<E> {
    exporter: E,
    backend: Backend,
}

impl<E: Exporter> Renderer<E> {
    pub fn new(exporter: E, backend: Backend) -> Self {
        Self { exporter, backend }
    }

    pub async fn render(&self, source: CompanionSource<'_>) -> Result<String> {
        let (text, base_dir): (std::borrow::Cow<'_, str>, Option<PathBuf>) = match source {
            CompanionSource::File(path) => {
                let text = read_text(path)?;
                (text.into(), path.parent().map(Path::to_path_buf))
            }
            CompanionSource::Text(text) => (text.into(), None),
        };

        debug!(
            "Rendering {} bytes with backend {}",
            text.len(),
            self.backend
        );

        self.exporter
            .export(ExportRequest {
                text: &text,
                backend: &self.backend,
                base_dir: base_dir.as_deref().filter(|d| !d.as_os_str().is_empty()),
            })
            .await
    }
}
