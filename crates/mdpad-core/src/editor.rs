//! Per-window document state: buffer, last known disk text, edited flag.

use std::{
    borrow::Cow,
    path::{Path, PathBuf},
};

use crate::markdown;

const APP_TITLE: &str = "Editor";

/// Which toolbar actions are currently available.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Controls {
    pub save_markdown: bool,
    pub revert: bool,
    pub save_html: bool,
}

/// What the native window should show for the current state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WindowChrome {
    pub title: String,
    pub document_edited: bool,
    pub controls: Controls,
}

#[derive(Debug, Default)]
pub struct EditorState {
    file_path: Option<PathBuf>,
    original_text: String,
    buffer: String,
    html: String,
    edited: bool,
}

impl EditorState {
    pub fn file_path(&self) -> Option<&Path> {
        self.file_path.as_deref()
    }

    pub fn original_text(&self) -> &str {
        &self.original_text
    }

    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    pub fn html(&self) -> &str {
        &self.html
    }

    pub const fn is_edited(&self) -> bool {
        self.edited
    }

    /// Replace everything with freshly loaded disk content.
    pub(crate) fn load(&mut self, path: PathBuf, text: String) {
        self.file_path = Some(path);
        self.buffer.clone_from(&text);
        self.original_text = text;
        self.render();
        self.edited = false;
    }

    /// Keystroke path. Returns whether the buffer now differs from disk.
    pub(crate) fn edit(&mut self, text: String) -> bool {
        self.buffer = text;
        self.render();
        self.buffer != self.original_text
    }

    pub(crate) fn revert(&mut self) {
        self.buffer.clone_from(&self.original_text);
        self.render();
    }

    pub(crate) const fn set_edited(&mut self, edited: bool) {
        self.edited = edited;
    }

    fn render(&mut self) {
        self.html = markdown::render_html(&self.buffer);
    }

    pub fn file_name(&self) -> Option<Cow<'_, str>> {
        self.file_path
            .as_ref()
            .and_then(|path| path.file_name())
            .map(|name| name.to_string_lossy())
    }

    pub fn title(&self) -> String {
        let mut title = match self.file_name() {
            Some(name) => format!("{name} - {APP_TITLE}"),
            None => APP_TITLE.to_owned(),
        };
        if self.edited {
            title.push_str(" (Unsaved)");
        }
        title
    }

    pub fn controls(&self) -> Controls {
        Controls {
            save_markdown: self.edited,
            revert: self.edited,
            save_html: !self.html.is_empty(),
        }
    }

    pub fn chrome(&self) -> WindowChrome {
        WindowChrome {
            title: self.title(),
            document_edited: self.edited,
            controls: self.controls(),
        }
    }
}
