#![forbid(unsafe_code)]

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

use mdpad_core::{
    Result,
    bridge::{UiEndpoint, WindowId},
    file_kind::FileFilter,
    platform::{Dialogs, Position, Prompt, PromptLevel, RecentDocuments, WindowSystem},
};
use rfd::{MessageButtons, MessageDialogResult, MessageLevel};

const RECENT_LIMIT: usize = 10;

/// A window the host asked for that the app has not adopted yet.
pub(crate) struct OpenedWindow {
    pub(crate) endpoint: UiEndpoint,
    pub(crate) position: Option<Position>,
}

/// Native modals via `rfd`.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct RfdDialogs;

impl RfdDialogs {
    fn file_dialog(filters: &[FileFilter]) -> rfd::FileDialog {
        filters
            .iter()
            .fold(rfd::FileDialog::new(), |dialog, filter| {
                dialog.add_filter(filter.name, filter.extensions)
            })
    }

    fn message_dialog(prompt: &Prompt) -> rfd::MessageDialog {
        let level = match prompt.level {
            PromptLevel::Info => MessageLevel::Info,
            PromptLevel::Warning => MessageLevel::Warning,
        };
        let buttons = match prompt.buttons {
            [] => MessageButtons::Ok,
            [ok] => MessageButtons::OkCustom((*ok).to_owned()),
            [ok, cancel, ..] => MessageButtons::OkCancelCustom((*ok).to_owned(), (*cancel).to_owned()),
        };
        rfd::MessageDialog::new()
            .set_level(level)
            .set_title(prompt.title)
            .set_description(prompt.message)
            .set_buttons(buttons)
    }
}

fn button_index(prompt: &Prompt, result: &MessageDialogResult) -> usize {
    match result {
        MessageDialogResult::Custom(label) => prompt
            .buttons
            .iter()
            .position(|button| *button == label.as_str())
            .unwrap_or(prompt.cancel_id),
        MessageDialogResult::Ok | MessageDialogResult::Yes => prompt.default_id,
        _ => prompt.cancel_id,
    }
}

impl Dialogs for RfdDialogs {
    fn pick_open_file(&mut self, _window: WindowId, filters: &[FileFilter]) -> Option<PathBuf> {
        Self::file_dialog(filters).pick_file()
    }

    fn pick_save_file(
        &mut self,
        _window: WindowId,
        filters: &[FileFilter],
        default_dir: Option<&Path>,
    ) -> Option<PathBuf> {
        let dialog = Self::file_dialog(filters);
        match default_dir {
            Some(dir) => dialog.set_directory(dir),
            None => dialog,
        }
        .save_file()
    }

    fn confirm(&mut self, _window: WindowId, prompt: &Prompt) -> usize {
        let result = Self::message_dialog(prompt).show();
        button_index(prompt, &result)
    }

    fn alert(&mut self, _window: WindowId, prompt: &Prompt) {
        let _ = Self::message_dialog(prompt).show();
    }
}

/// Most recent first, without duplicates.
#[derive(Debug, Default)]
pub(crate) struct RecentList {
    entries: Vec<PathBuf>,
}

impl RecentList {
    pub(crate) fn entries(&self) -> &[PathBuf] {
        &self.entries
    }
}

impl RecentDocuments for RecentList {
    fn note_recent(&mut self, path: &Path) {
        self.entries.retain(|entry| entry != path);
        self.entries.insert(0, path.to_path_buf());
        self.entries.truncate(RECENT_LIMIT);
    }
}

/// Window bookkeeping for egui viewports, which the app creates lazily.
#[derive(Default)]
pub(crate) struct DesktopPlatform {
    opened: Vec<OpenedWindow>,
    focused: Option<WindowId>,
    positions: HashMap<WindowId, Position>,
    represented: HashMap<WindowId, PathBuf>,
    dialogs: RfdDialogs,
    recent: RecentList,
}

impl DesktopPlatform {
    pub(crate) fn take_opened(&mut self) -> Vec<OpenedWindow> {
        std::mem::take(&mut self.opened)
    }

    /// Record what the viewport reported this frame.
    pub(crate) fn track(&mut self, window: WindowId, focused: bool, position: Option<Position>) {
        if focused {
            self.focused = Some(window);
        } else if self.focused == Some(window) {
            self.focused = None;
        }
        if let Some(position) = position {
            self.positions.insert(window, position);
        }
    }

    pub(crate) fn forget(&mut self, window: WindowId) {
        if self.focused == Some(window) {
            self.focused = None;
        }
        self.positions.remove(&window);
        self.represented.remove(&window);
    }

    pub(crate) fn represented(&self, window: WindowId) -> Option<&Path> {
        self.represented.get(&window).map(PathBuf::as_path)
    }

    pub(crate) fn recent(&self) -> &[PathBuf] {
        self.recent.entries()
    }
}

impl WindowSystem for DesktopPlatform {
    fn open_window(
        &mut self,
        id: WindowId,
        position: Option<Position>,
        endpoint: UiEndpoint,
    ) -> Result<()> {
        log::debug!("{id}: queued for display");
        self.opened.push(OpenedWindow { endpoint, position });
        Ok(())
    }

    fn focused_window(&self) -> Option<WindowId> {
        self.focused
    }

    fn window_position(&self, id: WindowId) -> Option<Position> {
        self.positions.get(&id).copied()
    }

    fn set_represented_file(&mut self, id: WindowId, path: &Path) {
        self.represented.insert(id, path.to_path_buf());
    }
}

impl Dialogs for DesktopPlatform {
    fn pick_open_file(&mut self, window: WindowId, filters: &[FileFilter]) -> Option<PathBuf> {
        self.dialogs.pick_open_file(window, filters)
    }

    fn pick_save_file(
        &mut self,
        window: WindowId,
        filters: &[FileFilter],
        default_dir: Option<&Path>,
    ) -> Option<PathBuf> {
        self.dialogs.pick_save_file(window, filters, default_dir)
    }

    fn confirm(&mut self, window: WindowId, prompt: &Prompt) -> usize {
        self.dialogs.confirm(window, prompt)
    }

    fn alert(&mut self, window: WindowId, prompt: &Prompt) {
        self.dialogs.alert(window, prompt);
    }
}

impl RecentDocuments for DesktopPlatform {
    fn note_recent(&mut self, path: &Path) {
        self.recent.note_recent(path);
    }
}
