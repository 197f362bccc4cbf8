#[cfg(test)]
mod tests;

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::{RagError, Result};

/// File extensions the extractor understands.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["pdf", "txt", "md"];

/// Whether a path points at a file type the pipeline can ingest.
#[inline]
pub fn is_supported(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            SUPPORTED_EXTENSIONS
                .iter()
                .any(|supported| ext.eq_ignore_ascii_case(supported))
        })
}

/// Extract the raw text of one document.
///
/// The returned text always ends with a newline so the last word of one
/// source can never merge with the first word of the next when texts are
/// processed back to back.
#[inline]
pub fn extract_text(path: &Path) -> Result<String> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    debug!("Extracting text from {:?} ({})", path, extension);

    let mut text = match extension.as_str() {
        "pdf" => pdf_extract::extract_text(path).map_err(|e| {
            RagError::Extraction(format!("Failed to read PDF {}: {e}", path.display()))
        })?,
        "txt" | "md" => fs::read_to_string(path).map_err(|e| {
            RagError::Extraction(format!("Failed to read {}: {e}", path.display()))
        })?,
        _ => {
            return Err(RagError::Extraction(format!(
                "Unsupported file type: {}",
                path.display()
            )));
        }
    };

    if !text.ends_with('\n') {
        text.push('\n');
    }

    Ok(text)
}
