//! File watches that feed change events into the host inbox.

use std::{
    ffi::OsStr,
    path::{Path, PathBuf},
};

use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};

use crate::{
    Error, Result,
    bridge::{HostMessage, HostSender, WatchToken, WindowId},
};

/// Where a watch reports to.
#[derive(Clone, Debug)]
pub struct WatchTarget {
    pub(crate) window: WindowId,
    pub(crate) token: WatchToken,
    pub(crate) host: HostSender,
}

impl WatchTarget {
    pub const fn window(&self) -> WindowId {
        self.window
    }

    /// Queue a change event for the host loop. Returns `false` once the host is gone.
    pub fn fire(&self) -> bool {
        self.host
            .send(HostMessage::WatchFired {
                window: self.window,
                token: self.token,
            })
            .is_ok()
    }
}

/// Starts path-level change subscriptions. Dropping a handle stops its watch.
pub trait WatchService {
    type Handle;

    fn watch(&mut self, path: &Path, target: WatchTarget) -> Result<Self::Handle>;
}

/// Filesystem watches backed by `notify`.
#[derive(Clone, Copy, Debug, Default)]
pub struct NotifyWatchService;

impl WatchService for NotifyWatchService {
    type Handle = RecommendedWatcher;

    fn watch(&mut self, path: &Path, target: WatchTarget) -> Result<RecommendedWatcher> {
        let watch_err = |source| Error::Watch {
            path: path.to_path_buf(),
            source,
        };
        let name = path
            .file_name()
            .ok_or_else(|| watch_err(notify::Error::generic("path is missing a file name")))?
            .to_owned();

        // Watch the directory: editors that save by renaming replace the inode,
        // which would silently end a watch on the file itself.
        let dir = parent_dir(path);

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) if concerns(&event, &name) => {
                    if !target.fire() {
                        log::debug!("{}: host gone, change event dropped", target.window);
                    }
                }
                Ok(_) => {}
                Err(err) => log::warn!("{}: watch error: {err}", target.window),
            },
            Config::default(),
        )
        .map_err(watch_err)?;

        watcher
            .watch(&dir, RecursiveMode::NonRecursive)
            .map_err(watch_err)?;
        Ok(watcher)
    }
}

fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Reads (our own reloads included) must not count as changes.
fn concerns(event: &Event, name: &OsStr) -> bool {
    !matches!(event.kind, EventKind::Access(_))
        && event.paths.iter().any(|p| p.file_name() == Some(name))
}
