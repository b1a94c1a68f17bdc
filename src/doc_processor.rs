use std::fs;
use std::panic;
use std::path::Path;

/// Kind of payload, decided from the file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Pdf,
    Text,
}

impl FileKind {
    pub fn from_filename(filename: &str) -> Self {
        if filename.to_lowercase().ends_with(".pdf") {
            FileKind::Pdf
        } else {
            FileKind::Text
        }
    }
}

/// Parsed document content
#[derive(Debug)]
pub struct ParsedDocument {
    pub content: String,
    pub kind: FileKind,
}

#[derive(Debug, thiserror::Error)]
pub enum DocError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("PDF parse error: {0}")]
    Pdf(String),
}

/// Parse an uploaded payload into plain text.
///
/// PDFs are extracted page by page and joined with newlines; a page with no
/// text layer contributes an empty line. Anything else is decoded as UTF-8,
/// replacing invalid sequences instead of failing.
pub fn parse_bytes(filename: &str, bytes: &[u8]) -> Result<ParsedDocument, DocError> {
    let kind = FileKind::from_filename(filename);
    let content = match kind {
        FileKind::Pdf => extract_pdf(bytes)?,
        FileKind::Text => String::from_utf8_lossy(bytes).into_owned(),
    };
    Ok(ParsedDocument { content, kind })
}

/// Parse a document file on disk into plain text
pub fn parse_file(path: &Path) -> Result<ParsedDocument, DocError> {
    let bytes = fs::read(path).map_err(|source| DocError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let filename = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("");
    parse_bytes(filename, &bytes)
}

/// Infallible extraction: any failure yields an empty string.
pub fn extract_text(filename: &str, bytes: &[u8]) -> String {
    match parse_bytes(filename, bytes) {
        Ok(parsed) => parsed.content,
        Err(e) => {
            tracing::warn!(file = filename, error = %e, "extraction failed, using empty text");
            String::new()
        }
    }
}

/// Run `f` with the panic hook swapped for a `debug` log line.
///
/// `extract_pdf` recovers from extractor panics, but the default hook would
/// still print a backtrace banner to stderr; interactive callers wrap
/// uploads in this. The hook is process-global, so only call it from the
/// single thread driving the session.
pub fn with_quiet_panics<T>(f: impl FnOnce() -> T) -> T {
    let previous = panic::take_hook();
    panic::set_hook(Box::new(|info| {
        tracing::debug!(%info, "suppressed panic");
    }));
    let out = f();
    panic::set_hook(previous);
    out
}

fn extract_pdf(bytes: &[u8]) -> Result<String, DocError> {
    // pdf-extract panics on some malformed inputs instead of returning Err.
    // The panic is caught here; the hook still fires unless the caller used
    // `with_quiet_panics`.
    let pages = panic::catch_unwind(|| pdf_extract::extract_text_from_mem_by_pages(bytes))
        .map_err(|_| DocError::Pdf("extractor panicked on malformed input".into()))?
        .map_err(|e| DocError::Pdf(e.to_string()))?;
    Ok(pages.join("\n"))
}
