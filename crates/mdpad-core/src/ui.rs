//! The per-window side: editor state, rendering, and host notifications.

use std::{path::PathBuf, sync::mpsc};

use crate::{
    bridge::{HostCall, HostLink, UiEndpoint, UiNotification, WindowId},
    editor::{EditorState, WindowChrome},
    file_kind,
    platform::{Dialogs, Prompt, PromptLevel},
};

const OVERWRITE_PROMPT: Prompt = Prompt {
    level: PromptLevel::Warning,
    title: "Overwrite current unsaved changes?",
    message: "Opening a new file in this window will overwrite unsaved changes. \
              Open this file anyway?",
    buttons: &["Yes", "Cancel"],
    default_id: 0,
    cancel_id: 1,
};

const CHANGED_PROMPT: Prompt = Prompt {
    level: PromptLevel::Warning,
    title: "File is changed",
    message: "Another application has changed this file",
    buttons: &["OK"],
    default_id: 0,
    cancel_id: 0,
};

const UNSUPPORTED_PROMPT: Prompt = Prompt {
    level: PromptLevel::Info,
    title: "Unsupported file",
    message: "This file type is not supported",
    buttons: &["OK"],
    default_id: 0,
    cancel_id: 0,
};

/// A file dragged onto the editor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DroppedFile {
    pub path: PathBuf,
    /// As reported by the platform; often absent on desktop.
    pub mime: Option<String>,
}

impl DroppedFile {
    pub fn mime(&self) -> Option<&str> {
        self.mime
            .as_deref()
            .filter(|mime| !mime.is_empty())
            .or_else(|| file_kind::mime_for_path(&self.path))
    }

    pub fn is_supported(&self) -> bool {
        self.mime().is_some_and(file_kind::mime_is_supported)
    }
}

pub struct UiController {
    host: HostLink,
    mailbox: mpsc::Receiver<UiNotification>,
    state: EditorState,
    chrome: WindowChrome,
    reported_edited: bool,
}

impl UiController {
    pub fn new(endpoint: UiEndpoint) -> Self {
        let state = EditorState::default();
        let chrome = state.chrome();
        Self {
            host: endpoint.host,
            mailbox: endpoint.mailbox,
            state,
            chrome,
            reported_edited: false,
        }
    }

    pub const fn window(&self) -> WindowId {
        self.host.window()
    }

    pub const fn state(&self) -> &EditorState {
        &self.state
    }

    pub const fn chrome(&self) -> &WindowChrome {
        &self.chrome
    }

    /// Refresh title, edited indicator and controls, and tell the host when
    /// the edited flag flips so it can guard the close.
    pub fn update_ui(&mut self, is_edited: bool) {
        self.state.set_edited(is_edited);
        self.chrome = self.state.chrome();
        if self.reported_edited != is_edited {
            self.host.send(HostCall::SetEdited(is_edited));
            self.reported_edited = is_edited;
        }
    }

    /// Every change to the Markdown input lands here.
    pub fn edit(&mut self, text: String) {
        let edited = self.state.edit(text);
        self.update_ui(edited);
    }

    pub fn revert(&mut self) {
        self.state.revert();
        self.update_ui(false);
    }

    pub fn new_window(&self) {
        self.host.send(HostCall::CreateWindow);
    }

    pub fn open_file(&self) {
        self.host.send(HostCall::GetFile);
    }

    pub fn open_path(&self, path: PathBuf) {
        self.host.send(HostCall::OpenFile(path));
    }

    pub fn save_markdown(&self) {
        self.host.send(HostCall::SaveMarkdown {
            path: self.state.file_path().map(PathBuf::from),
            text: self.state.buffer().to_owned(),
        });
    }

    pub fn save_html(&self) {
        self.host.send(HostCall::SaveHtml(self.state.html().to_owned()));
    }

    /// Open a dropped file, or explain why not. Returns whether it was accepted.
    pub fn drop_file<D: Dialogs + ?Sized>(&self, file: &DroppedFile, dialogs: &mut D) -> bool {
        if file.is_supported() {
            self.open_path(file.path.clone());
            true
        } else {
            log::debug!(
                "{}: rejected drop of {} ({:?})",
                self.window(),
                file.path.display(),
                file.mime()
            );
            dialogs.alert(self.window(), &UNSUPPORTED_PROMPT);
            false
        }
    }

    /// Drain the mailbox. Returns how many notifications were handled.
    pub fn process_notifications<D: Dialogs + ?Sized>(&mut self, dialogs: &mut D) -> usize {
        let mut handled = 0;
        while let Ok(notification) = self.mailbox.try_recv() {
            self.dispatch(notification, dialogs);
            handled += 1;
        }
        handled
    }

    pub fn dispatch<D: Dialogs + ?Sized>(&mut self, notification: UiNotification, dialogs: &mut D) {
        log::debug!("{}: {}", self.window(), notification.tag());
        match notification {
            UiNotification::FileOpened { path, text } => self.file_opened(path, text, dialogs),
            UiNotification::FileChanged { path, text } => {
                self.file_changed(path, text, dialogs);
            }
        }
    }

    fn file_opened<D: Dialogs + ?Sized>(&mut self, path: PathBuf, text: String, dialogs: &mut D) {
        let edited = self.chrome.document_edited || self.state.is_edited();
        if edited && self.state.file_path() != Some(path.as_path()) {
            let choice = dialogs.confirm(self.window(), &OVERWRITE_PROMPT);
            if choice == OVERWRITE_PROMPT.cancel_id {
                log::debug!("{}: kept unsaved changes over {}", self.window(), path.display());
                return;
            }
        }
        self.render_file(path, text);
    }

    // External changes always win over local edits.
    fn file_changed<D: Dialogs + ?Sized>(&mut self, path: PathBuf, text: String, dialogs: &mut D) {
        dialogs.alert(self.window(), &CHANGED_PROMPT);
        self.render_file(path, text);
    }

    fn render_file(&mut self, path: PathBuf, text: String) {
        self.state.load(path, text);
        self.update_ui(false);
    }
}
