// WHY: the only module that knows about the .docx container; everything else sees
// documents as ordered paragraph strings

use docx_rs::{BreakType, Docx, DocumentChild, Paragraph, ParagraphChild, Run, RunChild};
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors raised while reading or writing a document
#[derive(Error, Debug)]
pub enum DocumentError {
    /// The file could not be opened, created or renamed
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not a readable word-processor document
    #[error("Malformed document {}: {message}", .path.display())]
    Format { path: PathBuf, message: String },

    /// The document could not be serialized
    #[error("Failed to write document {}: {message}", .path.display())]
    Write { path: PathBuf, message: String },

    /// The blocking I/O task panicked or was cancelled
    #[error("Document task failed: {0}")]
    Task(String),
}

impl DocumentError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io { path: path.to_path_buf(), source }
    }
}

/// Statistics for one document read or write
#[derive(Debug, Clone, Default)]
pub struct DocumentStats {
    pub file_path: String,
    pub paragraphs: u64,
    pub bytes: u64,
    pub duration_ms: u64,
}

/// Read the body paragraphs of a document in order
///
/// Tabs come back as `\t` and soft line breaks as `\n`. Tables and other
/// non-paragraph blocks are skipped.
pub fn read_paragraphs<P: AsRef<Path>>(
    path: P,
) -> Result<(Vec<String>, DocumentStats), DocumentError> {
    let path = path.as_ref();
    let start_time = std::time::Instant::now();

    debug!("Starting read of document: {}", path.display());

    let bytes = std::fs::read(path).map_err(|e| DocumentError::io(path, e))?;
    let docx = docx_rs::read_docx(&bytes).map_err(|e| DocumentError::Format {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let mut paragraphs = Vec::new();
    let mut skipped_blocks = 0u64;
    for child in &docx.document.children {
        match child {
            DocumentChild::Paragraph(paragraph) => paragraphs.push(paragraph_text(paragraph)),
            _ => skipped_blocks += 1,
        }
    }

    if skipped_blocks > 0 {
        warn!("Skipped {} non-paragraph blocks in {}", skipped_blocks, path.display());
    }

    let stats = DocumentStats {
        file_path: path.display().to_string(),
        paragraphs: paragraphs.len() as u64,
        bytes: bytes.len() as u64,
        duration_ms: start_time.elapsed().as_millis() as u64,
    };

    info!(
        "Read {}: {} paragraphs, {} bytes in {}ms",
        path.display(),
        stats.paragraphs,
        stats.bytes,
        stats.duration_ms
    );

    Ok((paragraphs, stats))
}

/// Flatten one paragraph into text
fn paragraph_text(paragraph: &Paragraph) -> String {
    let mut text = String::new();
    collect_children_text(&paragraph.children, &mut text);
    text
}

fn collect_children_text(children: &[ParagraphChild], text: &mut String) {
    for child in children {
        match child {
            ParagraphChild::Run(run) => collect_run_text(run, text),
            ParagraphChild::Hyperlink(link) => collect_children_text(&link.children, text),
            _ => {}
        }
    }
}

fn collect_run_text(run: &Run, text: &mut String) {
    for child in &run.children {
        match child {
            RunChild::Text(t) => text.push_str(&t.text),
            RunChild::Tab(_) => text.push('\t'),
            RunChild::Break(_) => text.push('\n'),
            _ => {}
        }
    }
}

/// Build a paragraph element, turning `\n` into line breaks and `\t` into tabs
fn build_paragraph(text: &str) -> Paragraph {
    let mut run = Run::new();
    for (line_index, line) in text.split('\n').enumerate() {
        if line_index > 0 {
            run = run.add_break(BreakType::TextWrapping);
        }
        for (segment_index, segment) in line.split('\t').enumerate() {
            if segment_index > 0 {
                run = run.add_tab();
            }
            if !segment.is_empty() {
                run = run.add_text(segment);
            }
        }
    }
    Paragraph::new().add_run(run)
}

/// Write paragraphs as a new document, one paragraph element per entry
///
/// The document is packed into a temporary file next to `path` and renamed over
/// it once complete, so a failed write never leaves a partial file behind.
pub fn write_paragraphs<P, S>(path: P, paragraphs: &[S]) -> Result<DocumentStats, DocumentError>
where
    P: AsRef<Path>,
    S: AsRef<str>,
{
    let path = path.as_ref();
    let start_time = std::time::Instant::now();

    debug!("Starting write of document: {}", path.display());

    let docx = paragraphs
        .iter()
        .fold(Docx::new(), |docx, text| docx.add_paragraph(build_paragraph(text.as_ref())));

    // WHY: same directory as the destination so the final rename stays on one filesystem
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut temp = tempfile::Builder::new()
        .prefix(".reflow-")
        .suffix(".docx.tmp")
        .tempfile_in(dir)
        .map_err(|e| DocumentError::io(path, e))?;

    docx.build()
        .pack(temp.as_file_mut())
        .map_err(|e| DocumentError::Write {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
    temp.as_file_mut().flush().map_err(|e| DocumentError::io(path, e))?;
    temp.as_file().sync_all().map_err(|e| DocumentError::io(path, e))?;

    let bytes = temp
        .as_file()
        .metadata()
        .map_err(|e| DocumentError::io(path, e))?
        .len();

    temp.persist(path).map_err(|e| DocumentError::io(path, e.error))?;

    let stats = DocumentStats {
        file_path: path.display().to_string(),
        paragraphs: paragraphs.len() as u64,
        bytes,
        duration_ms: start_time.elapsed().as_millis() as u64,
    };

    info!(
        "Wrote {}: {} paragraphs, {} bytes in {}ms",
        path.display(),
        stats.paragraphs,
        stats.bytes,
        stats.duration_ms
    );

    Ok(stats)
}

/// Read paragraphs on the blocking pool
/// WHY: docx parsing is synchronous; keep it off the async executor threads
pub async fn read_paragraphs_async<P: AsRef<Path>>(
    path: P,
) -> Result<(Vec<String>, DocumentStats), DocumentError> {
    let path = path.as_ref().to_path_buf();
    tokio::task::spawn_blocking(move || read_paragraphs(&path))
        .await
        .map_err(|e| DocumentError::Task(e.to_string()))?
}

/// Write paragraphs on the blocking pool
pub async fn write_paragraphs_async<P: AsRef<Path>>(
    path: P,
    paragraphs: Vec<String>,
) -> Result<DocumentStats, DocumentError> {
    let path = path.as_ref().to_path_buf();
    tokio::task::spawn_blocking(move || write_paragraphs(&path, &paragraphs))
        .await
        .map_err(|e| DocumentError::Task(e.to_string()))?
}
