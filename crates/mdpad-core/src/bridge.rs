//! Typed messages between the host and the per-window UI controllers.
//!
//! Calls are fire-and-forget: the host answers, if at all, with a later
//! [`UiNotification`] on the window's mailbox.

use std::{fmt, path::PathBuf, sync::mpsc};

/// Handle of a live window. Allocated by the host, never reused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WindowId(pub(crate) u64);

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "window#{}", self.0)
    }
}

/// Identifies one watch; stale tokens mean the event belongs to a replaced watch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WatchToken(pub(crate) u64);

/// UI → host.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HostCall {
    CreateWindow,
    GetFile,
    OpenFile(PathBuf),
    SaveHtml(String),
    SaveMarkdown {
        path: Option<PathBuf>,
        text: String,
    },
    SetEdited(bool),
}

/// Host → UI.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UiNotification {
    FileOpened { path: PathBuf, text: String },
    FileChanged { path: PathBuf, text: String },
}

impl UiNotification {
    pub const fn tag(&self) -> &'static str {
        match self {
            Self::FileOpened { .. } => "file-opened",
            Self::FileChanged { .. } => "file-changed",
        }
    }
}

/// Everything the host loop consumes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HostMessage {
    Call { window: WindowId, call: HostCall },
    WatchFired { window: WindowId, token: WatchToken },
}

pub type HostSender = mpsc::Sender<HostMessage>;

/// A window-tagged sender into the host inbox.
#[derive(Clone, Debug)]
pub struct HostLink {
    window: WindowId,
    tx: HostSender,
}

impl HostLink {
    pub(crate) const fn new(window: WindowId, tx: HostSender) -> Self {
        Self { window, tx }
    }

    pub const fn window(&self) -> WindowId {
        self.window
    }

    /// Returns `false` when the host has gone away.
    pub fn send(&self, call: HostCall) -> bool {
        let sent = self
            .tx
            .send(HostMessage::Call {
                window: self.window,
                call,
            })
            .is_ok();
        if !sent {
            log::debug!("{}: host inbox closed, call dropped", self.window);
        }
        sent
    }
}

/// What a freshly created window needs to run its UI controller.
#[derive(Debug)]
pub struct UiEndpoint {
    pub(crate) host: HostLink,
    pub(crate) mailbox: mpsc::Receiver<UiNotification>,
}

impl UiEndpoint {
    pub const fn window(&self) -> WindowId {
        self.host.window
    }
}
