//! Collaborators the controllers drive but do not implement.

use std::path::{Path, PathBuf};

use crate::{
    Result,
    bridge::{UiEndpoint, WindowId},
    file_kind::FileFilter,
};

/// Top-left corner of a window, in points.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    #[must_use]
    pub fn offset(self, by: f32) -> Self {
        Self {
            x: self.x + by,
            y: self.y + by,
        }
    }
}

pub trait WindowSystem {
    /// Create and show a window. Failure is fatal for the caller.
    fn open_window(
        &mut self,
        id: WindowId,
        position: Option<Position>,
        endpoint: UiEndpoint,
    ) -> Result<()>;

    fn focused_window(&self) -> Option<WindowId>;

    fn window_position(&self, id: WindowId) -> Option<Position>;

    /// Associate `path` with the window at the OS level. May be a no-op.
    fn set_represented_file(&mut self, id: WindowId, path: &Path);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PromptLevel {
    Info,
    Warning,
}

/// A modal message box.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Prompt {
    pub level: PromptLevel,
    pub title: &'static str,
    pub message: &'static str,
    pub buttons: &'static [&'static str],
    pub default_id: usize,
    pub cancel_id: usize,
}

/// Synchronous modals. Each call blocks the invoking window until dismissed.
pub trait Dialogs {
    fn pick_open_file(&mut self, window: WindowId, filters: &[FileFilter]) -> Option<PathBuf>;

    fn pick_save_file(
        &mut self,
        window: WindowId,
        filters: &[FileFilter],
        default_dir: Option<&Path>,
    ) -> Option<PathBuf>;

    /// Returns the index of the chosen button; dismissal yields `prompt.cancel_id`.
    fn confirm(&mut self, window: WindowId, prompt: &Prompt) -> usize;

    fn alert(&mut self, window: WindowId, prompt: &Prompt);
}

/// The OS recent-documents list. Append only.
pub trait RecentDocuments {
    fn note_recent(&mut self, path: &Path);
}

pub trait Platform: WindowSystem + Dialogs + RecentDocuments {}

impl<T: WindowSystem + Dialogs + RecentDocuments> Platform for T {}
