//! Hand-written fakes for the platform and watch seams.

use std::{
    cell::RefCell,
    collections::{HashMap, VecDeque},
    fs,
    path::{Path, PathBuf},
    rc::Rc,
    time::SystemTime,
};

use crate::{
    Error, Result,
    bridge::{UiEndpoint, WindowId},
    file_kind::FileFilter,
    platform::{Dialogs, Position, Prompt, RecentDocuments, WindowSystem},
    watch::{WatchService, WatchTarget},
};

pub(crate) fn make_temp_dir(name: &str) -> PathBuf {
    let mut dir = std::env::temp_dir();
    let nanos = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map_or(0, |d| d.as_nanos());
    dir.push(format!("{name}-{nanos}-{}", std::process::id()));
    let _ = fs::create_dir_all(&dir);
    dir
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum DialogCall {
    PickOpen(Vec<&'static str>),
    PickSave {
        filters: Vec<&'static str>,
        default_dir: Option<PathBuf>,
    },
    Confirm(&'static str),
    Alert(&'static str),
}

/// Dialogs that answer from scripted queues; an empty queue means the user cancelled.
#[derive(Debug, Default)]
pub(crate) struct FakeDialogs {
    pub(crate) open_answers: VecDeque<PathBuf>,
    pub(crate) save_answers: VecDeque<PathBuf>,
    pub(crate) confirm_answers: VecDeque<usize>,
    pub(crate) calls: Vec<DialogCall>,
}

fn filter_names(filters: &[FileFilter]) -> Vec<&'static str> {
    filters.iter().map(|f| f.name).collect()
}

impl Dialogs for FakeDialogs {
    fn pick_open_file(&mut self, _window: WindowId, filters: &[FileFilter]) -> Option<PathBuf> {
        self.calls.push(DialogCall::PickOpen(filter_names(filters)));
        self.open_answers.pop_front()
    }

    fn pick_save_file(
        &mut self,
        _window: WindowId,
        filters: &[FileFilter],
        default_dir: Option<&Path>,
    ) -> Option<PathBuf> {
        self.calls.push(DialogCall::PickSave {
            filters: filter_names(filters),
            default_dir: default_dir.map(Path::to_path_buf),
        });
        self.save_answers.pop_front()
    }

    fn confirm(&mut self, _window: WindowId, prompt: &Prompt) -> usize {
        self.calls.push(DialogCall::Confirm(prompt.title));
        self.confirm_answers.pop_front().unwrap_or(prompt.cancel_id)
    }

    fn alert(&mut self, _window: WindowId, prompt: &Prompt) {
        self.calls.push(DialogCall::Alert(prompt.title));
    }
}

#[derive(Debug, Default)]
pub(crate) struct FakePlatform {
    pub(crate) opened: Vec<(WindowId, Option<Position>)>,
    pub(crate) endpoints: Vec<UiEndpoint>,
    pub(crate) focused: Option<WindowId>,
    pub(crate) positions: HashMap<WindowId, Position>,
    pub(crate) represented: HashMap<WindowId, PathBuf>,
    pub(crate) recent: Vec<PathBuf>,
    pub(crate) dialogs: FakeDialogs,
    pub(crate) refuse_windows: bool,
}

impl FakePlatform {
    pub(crate) fn take_endpoint(&mut self, window: WindowId) -> Option<UiEndpoint> {
        let index = self.endpoints.iter().position(|e| e.window() == window)?;
        Some(self.endpoints.remove(index))
    }
}

impl WindowSystem for FakePlatform {
    fn open_window(
        &mut self,
        id: WindowId,
        position: Option<Position>,
        endpoint: UiEndpoint,
    ) -> Result<()> {
        if self.refuse_windows {
            return Err(Error::Window("no display".to_owned()));
        }
        self.opened.push((id, position));
        self.endpoints.push(endpoint);
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

impl Dialogs for FakePlatform {
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

impl RecentDocuments for FakePlatform {
    fn note_recent(&mut self, path: &Path) {
        self.recent.push(path.to_path_buf());
    }
}

#[derive(Debug, Default)]
pub(crate) struct WatchLog {
    pub(crate) events: Vec<String>,
    pub(crate) active: HashMap<WindowId, usize>,
    pub(crate) max_active: usize,
    pub(crate) targets: Vec<WatchTarget>,
}

/// Records watch starts and stops instead of touching the filesystem.
#[derive(Clone, Debug, Default)]
pub(crate) struct FakeWatches {
    pub(crate) log: Rc<RefCell<WatchLog>>,
}

impl FakeWatches {
    pub(crate) fn events(&self) -> Vec<String> {
        self.log.borrow().events.clone()
    }

    pub(crate) fn active(&self, window: WindowId) -> usize {
        self.log.borrow().active.get(&window).copied().unwrap_or(0)
    }

    pub(crate) fn max_active(&self) -> usize {
        self.log.borrow().max_active
    }

    /// Fire the most recently started watch.
    pub(crate) fn fire_latest(&self) -> bool {
        self.log
            .borrow()
            .targets
            .last()
            .is_some_and(WatchTarget::fire)
    }

    pub(crate) fn fire_nth(&self, n: usize) -> bool {
        self.log
            .borrow()
            .targets
            .get(n)
            .is_some_and(WatchTarget::fire)
    }
}

#[derive(Debug)]
pub(crate) struct FakeWatch {
    window: WindowId,
    path: PathBuf,
    log: Rc<RefCell<WatchLog>>,
}

impl Drop for FakeWatch {
    fn drop(&mut self) {
        let mut log = self.log.borrow_mut();
        if let Some(count) = log.active.get_mut(&self.window) {
            *count = count.saturating_sub(1);
        }
        let event = format!("stop {} {}", self.window, self.path.display());
        log.events.push(event);
    }
}

impl WatchService for FakeWatches {
    type Handle = FakeWatch;

    fn watch(&mut self, path: &Path, target: WatchTarget) -> Result<FakeWatch> {
        let mut log = self.log.borrow_mut();
        let window = target.window();
        let count = log.active.entry(window).or_insert(0);
        *count += 1;
        let count = *count;
        log.max_active = log.max_active.max(count);
        log.events
            .push(format!("start {window} {}", path.display()));
        log.targets.push(target);
        Ok(FakeWatch {
            window,
            path: path.to_path_buf(),
            log: Rc::clone(&self.log),
        })
    }
}
