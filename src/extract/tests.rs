use super::*;
use std::path::PathBuf;
use tempfile::TempDir;

#[test]
fn supported_extensions_are_case_insensitive() {
    assert!(is_supported(Path::new("report.pdf")));
    assert!(is_supported(Path::new("REPORT.PDF")));
    assert!(is_supported(Path::new("notes.txt")));
    assert!(is_supported(Path::new("readme.md")));
    assert!(!is_supported(Path::new("photo.png")));
    assert!(!is_supported(Path::new("archive.tar.gz")));
    assert!(!is_supported(Path::new("no_extension")));
}

#[test]
fn plain_text_is_read_verbatim_with_trailing_newline() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = dir.path().join("notes.txt");
    std::fs::write(&path, "line one\nline two").expect("Failed to write file");

    let text = extract_text(&path).expect("extract should succeed");
    assert_eq!(text, "line one\nline two\n");
}

#[test]
fn existing_trailing_newline_is_not_doubled() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = dir.path().join("notes.md");
    std::fs::write(&path, "# Title\n\nBody.\n").expect("Failed to write file");

    let text = extract_text(&path).expect("extract should succeed");
    assert_eq!(text, "# Title\n\nBody.\n");
}

#[test]
fn unsupported_extension_is_an_error() {
    let result = extract_text(&PathBuf::from("diagram.svg"));
    assert!(matches!(result, Err(RagError::Extraction(_))));
}

#[test]
fn missing_file_is_an_error_naming_the_file() {
    let result = extract_text(&PathBuf::from("/nonexistent/notes.txt"));
    let err = result.expect_err("missing file must fail");
    assert!(err.to_string().contains("notes.txt"));
}
