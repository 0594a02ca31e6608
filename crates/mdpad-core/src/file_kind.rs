//! File types the editor accepts, for pickers and drag-and-drop.

use std::path::Path;

/// A named extension allow-list for file pickers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FileFilter {
    pub name: &'static str,
    pub extensions: &'static [&'static str],
}

pub const TEXT_FILES: FileFilter = FileFilter {
    name: "Text Files",
    extensions: &["txt"],
};

pub const MARKDOWN_FILES: FileFilter = FileFilter {
    name: "Markdown Files",
    extensions: &["md", "markdown"],
};

pub const HTML_FILES: FileFilter = FileFilter {
    name: "HTML Files",
    extensions: &["html", "htm"],
};

/// Filters offered when opening a document.
pub const OPEN_FILTERS: &[FileFilter] = &[TEXT_FILES, MARKDOWN_FILES];

const SUPPORTED_MIME_TYPES: &[&str] = &["text/plain", "text/markdown"];

pub fn mime_is_supported(mime: &str) -> bool {
    SUPPORTED_MIME_TYPES.contains(&mime)
}

/// Best-effort MIME type from the extension, for platforms that report none.
pub fn mime_for_path(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "txt" => Some("text/plain"),
        "md" | "markdown" => Some("text/markdown"),
        "html" | "htm" => Some("text/html"),
        "pdf" => Some("application/pdf"),
        _ => None,
    }
}
