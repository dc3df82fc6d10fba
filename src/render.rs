//! Rendering backends for composed documents
//!
//! The core never lays out pages itself. A [`Renderer`] takes the resolved
//! markup and produces the destination file, or fails without leaving a
//! partial file behind: output is written to a temporary file next to the
//! destination and only moved into place on success.

use crate::compose::StructuredDocument;
use crate::error::RenderError;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tempfile::NamedTempFile;
use tracing::debug;

/// Turns a composed document into a file at `destination`
pub trait Renderer {
    fn render(
        &self,
        document: &StructuredDocument,
        destination: &Path,
    ) -> Result<PathBuf, RenderError>;

    /// Extension for destinations derived by callers
    fn extension(&self) -> &'static str;
}

/// Writes the resolved HTML itself
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlRenderer;

impl Renderer for HtmlRenderer {
    fn render(
        &self,
        document: &StructuredDocument,
        destination: &Path,
    ) -> Result<PathBuf, RenderError> {
        let mut staged = staging_file(destination)?;
        staged.write_all(document.to_html().as_bytes())?;
        staged.flush()?;
        commit(staged, destination)
    }

    fn extension(&self) -> &'static str {
        "html"
    }
}

/// Delegates to an external HTML/CSS-to-PDF program
///
/// `{input}` and `{output}` in the argument list are replaced with the markup
/// file and the file the program must write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandRenderer {
    program: String,
    args: Vec<String>,
}

impl CommandRenderer {
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// `weasyprint --presentational-hints {input} {output}`
    #[must_use]
    pub fn weasyprint() -> Self {
        Self::new("weasyprint", ["--presentational-hints", "{input}", "{output}"])
    }

    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }
}

impl Default for CommandRenderer {
    fn default() -> Self {
        Self::weasyprint()
    }
}

impl Renderer for CommandRenderer {
    fn render(
        &self,
        document: &StructuredDocument,
        destination: &Path,
    ) -> Result<PathBuf, RenderError> {
        let mut markup = tempfile::Builder::new()
            .prefix("itinerary-")
            .suffix(".html")
            .tempfile()?;
        markup.write_all(document.to_html().as_bytes())?;
        markup.flush()?;

        let staged = staging_file(destination)?;
        let input = path_arg(markup.path())?;
        let output = path_arg(staged.path())?;

        let args: Vec<String> = self
            .args
            .iter()
            .map(|arg| arg.replace("{input}", input).replace("{output}", output))
            .collect();

        debug!("Running renderer {} {:?}", self.program, args);

        let result = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .output()
            .map_err(|source| RenderError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if !result.status.success() {
            return Err(RenderError::Backend {
                program: self.program.clone(),
                status: result.status,
                stderr: String::from_utf8_lossy(&result.stderr).trim().to_string(),
            });
        }

        // The program may replace the staged file, so check by path
        if std::fs::metadata(staged.path())?.len() == 0 {
            return Err(RenderError::Backend {
                program: self.program.clone(),
                status: result.status,
                stderr: "renderer produced no output".into(),
            });
        }

        commit(staged, destination)
    }

    fn extension(&self) -> &'static str {
        "pdf"
    }
}

/// Temporary file in the destination directory, so the final rename stays
/// on one filesystem
fn staging_file(destination: &Path) -> Result<NamedTempFile, RenderError> {
    let dir = match destination.parent() {
        Some(parent) if parent.as_os_str().is_empty() => Path::new("."),
        Some(parent) => parent,
        None => {
            return Err(RenderError::InvalidPath {
                path: destination.to_path_buf(),
                details: "no parent directory".into(),
            });
        }
    };

    Ok(tempfile::Builder::new()
        .prefix(".itinerary-")
        .suffix(".part")
        .tempfile_in(dir)?)
}

fn commit(staged: NamedTempFile, destination: &Path) -> Result<PathBuf, RenderError> {
    staged
        .persist(destination)
        .map_err(|e| RenderError::Io(e.error))?;
    Ok(destination.to_path_buf())
}

fn path_arg(path: &Path) -> Result<&str, RenderError> {
    path.to_str().ok_or_else(|| RenderError::InvalidPath {
        path: path.to_path_buf(),
        details: "not valid UTF-8".into(),
    })
}
