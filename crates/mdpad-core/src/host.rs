//! The host side: live windows, their watches, and all file I/O.

use std::{
    collections::BTreeMap,
    io,
    path::{Path, PathBuf},
    sync::mpsc,
};

use crate::{
    Error, Result,
    bridge::{
        HostCall, HostLink, HostMessage, HostSender, UiEndpoint, UiNotification, WatchToken,
        WindowId,
    },
    config::Config,
    disk_io,
    file_kind::{HTML_FILES, MARKDOWN_FILES, OPEN_FILTERS},
    platform::{Platform, Prompt, PromptLevel},
    watch::{NotifyWatchService, WatchService, WatchTarget},
};

/// New windows cascade down and right from the focused one.
pub const WINDOW_OFFSET: f32 = 10.0;

const CLOSE_PROMPT: Prompt = Prompt {
    level: PromptLevel::Warning,
    title: "Close without saving?",
    message: "This window has unsaved changes. Close it and discard them?",
    buttons: &["Discard", "Cancel"],
    default_id: 0,
    cancel_id: 1,
};

struct ActiveWatch<H> {
    token: WatchToken,
    path: PathBuf,
    _handle: H,
}

struct WindowEntry<H> {
    mailbox: mpsc::Sender<UiNotification>,
    watch: Option<ActiveWatch<H>>,
    edited: bool,
    represented: Option<PathBuf>,
}

/// A host operation that failed, for the shell to surface.
#[derive(Debug)]
pub struct Failure {
    pub window: WindowId,
    pub error: Error,
}

pub struct HostController<P, S: WatchService = NotifyWatchService> {
    platform: P,
    watches: S,
    config: Config,
    windows: BTreeMap<WindowId, WindowEntry<S::Handle>>,
    inbox: mpsc::Receiver<HostMessage>,
    tx: HostSender,
    failures: Vec<Failure>,
    next_window: u64,
    next_token: u64,
}

impl<P: Platform> HostController<P> {
    pub fn new(platform: P, config: Config) -> Self {
        Self::with_watch_service(platform, config, NotifyWatchService)
    }
}

impl<P: Platform, S: WatchService> HostController<P, S> {
    pub fn with_watch_service(platform: P, config: Config, watches: S) -> Self {
        let (tx, inbox) = mpsc::channel();
        Self {
            platform,
            watches,
            config,
            windows: BTreeMap::new(),
            inbox,
            tx,
            failures: Vec::new(),
            next_window: 1,
            next_token: 1,
        }
    }

    pub const fn platform(&self) -> &P {
        &self.platform
    }

    pub const fn platform_mut(&mut self) -> &mut P {
        &mut self.platform
    }

    pub const fn config(&self) -> &Config {
        &self.config
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    pub fn contains(&self, window: WindowId) -> bool {
        self.windows.contains_key(&window)
    }

    pub fn window_ids(&self) -> impl Iterator<Item = WindowId> + '_ {
        self.windows.keys().copied()
    }

    /// The edited flag as last reported by the window's UI.
    pub fn is_edited(&self, window: WindowId) -> bool {
        self.windows.get(&window).is_some_and(|entry| entry.edited)
    }

    pub fn watched_path(&self, window: WindowId) -> Option<&Path> {
        let watch = self.windows.get(&window)?.watch.as_ref()?;
        Some(&watch.path)
    }

    pub fn represented_file(&self, window: WindowId) -> Option<&Path> {
        self.windows.get(&window)?.represented.as_deref()
    }

    /// Startup: one window, plus the file the app was launched with.
    pub fn launch(&mut self, path: Option<&Path>) -> Result<WindowId> {
        let window = self.create_window()?;
        if let Some(path) = path
            && let Err(error) = self.open_file(window, path)
        {
            self.fail(window, error);
        }
        Ok(window)
    }

    pub fn create_window(&mut self) -> Result<WindowId> {
        let position = self
            .platform
            .focused_window()
            .and_then(|focused| self.platform.window_position(focused))
            .map(|position| position.offset(WINDOW_OFFSET));

        let id = WindowId(self.next_window);
        self.next_window += 1;

        let (mailbox, rx) = mpsc::channel();
        let endpoint = UiEndpoint {
            host: HostLink::new(id, self.tx.clone()),
            mailbox: rx,
        };
        self.platform.open_window(id, position, endpoint)?;
        self.windows.insert(
            id,
            WindowEntry {
                mailbox,
                watch: None,
                edited: false,
                represented: None,
            },
        );
        log::debug!("{id}: created at {position:?}");
        Ok(id)
    }

    pub fn prompt_open_file(&mut self, window: WindowId) -> Result<()> {
        if !self.contains(window) {
            return Ok(());
        }
        let Some(path) = self.platform.pick_open_file(window, OPEN_FILTERS) else {
            log::debug!("{window}: open cancelled");
            return Ok(());
        };
        self.open_file(window, &path)
    }

    pub fn open_file(&mut self, window: WindowId, path: &Path) -> Result<()> {
        if !self.contains(window) {
            log::debug!("{window}: gone, not opening {}", path.display());
            return Ok(());
        }

        self.stop_watch(window);
        if self.config.watch_files
            && let Err(err) = self.start_watch(window, path)
        {
            log::warn!("{window}: {err}");
        }

        let text = match disk_io::read_document(path) {
            Ok(text) => text,
            Err(err) => {
                // The window keeps showing the old file, so it must not keep
                // a watch on the one that failed to load.
                self.stop_watch(window);
                return Err(err);
            }
        };

        if self.config.recent_documents {
            self.platform.note_recent(path);
        }
        self.platform.set_represented_file(window, path);
        if let Some(entry) = self.windows.get_mut(&window) {
            entry.represented = Some(path.to_path_buf());
        }

        log::info!("{window}: opened {}", path.display());
        self.notify(
            window,
            UiNotification::FileOpened {
                path: path.to_path_buf(),
                text,
            },
        );
        Ok(())
    }

    /// Replace the window's watch with one on `path`.
    pub fn start_watch(&mut self, window: WindowId, path: &Path) -> Result<()> {
        self.stop_watch(window);
        if !self.contains(window) {
            return Ok(());
        }

        let token = WatchToken(self.next_token);
        self.next_token += 1;
        let target = WatchTarget {
            window,
            token,
            host: self.tx.clone(),
        };
        let handle = self.watches.watch(path, target)?;

        if let Some(entry) = self.windows.get_mut(&window) {
            entry.watch = Some(ActiveWatch {
                token,
                path: path.to_path_buf(),
                _handle: handle,
            });
            log::debug!("{window}: watching {}", path.display());
        }
        Ok(())
    }

    pub fn stop_watch(&mut self, window: WindowId) {
        let stopped = self
            .windows
            .get_mut(&window)
            .and_then(|entry| entry.watch.take());
        if let Some(watch) = stopped {
            log::debug!("{window}: stopped watching {}", watch.path.display());
        }
    }

    fn watch_fired(&mut self, window: WindowId, token: WatchToken) -> Result<()> {
        let current = self
            .windows
            .get(&window)
            .and_then(|entry| entry.watch.as_ref())
            .filter(|watch| watch.token == token)
            .map(|watch| watch.path.clone());
        let Some(path) = current else {
            log::debug!("{window}: stale change event dropped");
            return Ok(());
        };

        let text = match disk_io::read_document(&path) {
            Ok(text) => text,
            // Rename-style saves briefly leave no file behind; the next event
            // carries the new content.
            Err(Error::Read { source, .. }) if source.kind() == io::ErrorKind::NotFound => {
                log::debug!("{window}: {} missing, waiting for next change", path.display());
                return Ok(());
            }
            Err(err) => return Err(err),
        };
        log::info!("{window}: {} changed on disk", path.display());
        self.notify(window, UiNotification::FileChanged { path, text });
        Ok(())
    }

    pub fn save_html(&mut self, window: WindowId, html: &str) -> Result<()> {
        if !self.contains(window) {
            return Ok(());
        }
        let documents = dirs::document_dir();
        let Some(path) = self
            .platform
            .pick_save_file(window, &[HTML_FILES], documents.as_deref())
        else {
            log::debug!("{window}: html export cancelled");
            return Ok(());
        };

        disk_io::write_document(&path, html)?;
        log::info!("{window}: exported html to {}", path.display());
        Ok(())
    }

    /// Write the buffer, then re-open the file so the window picks up the
    /// saved state and a fresh watch through the usual `file-opened` path.
    pub fn save_markdown(&mut self, window: WindowId, path: Option<&Path>, text: &str) -> Result<()> {
        if !self.contains(window) {
            return Ok(());
        }
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => {
                let documents = dirs::document_dir();
                let Some(path) =
                    self.platform
                        .pick_save_file(window, &[MARKDOWN_FILES], documents.as_deref())
                else {
                    log::debug!("{window}: save cancelled");
                    return Ok(());
                };
                path
            }
        };

        disk_io::write_document(&path, text)?;
        log::info!("{window}: saved {}", path.display());
        self.open_file(window, &path)
    }

    pub fn set_edited(&mut self, window: WindowId, edited: bool) {
        if let Some(entry) = self.windows.get_mut(&window) {
            entry.edited = edited;
        }
    }

    /// Whether a close request for `window` may go ahead.
    pub fn request_close(&mut self, window: WindowId) -> bool {
        if !(self.config.confirm_close && self.is_edited(window)) {
            return true;
        }
        self.platform.confirm(window, &CLOSE_PROMPT) == CLOSE_PROMPT.default_id
    }

    /// Teardown once the window is really gone. Drops its watch first so no
    /// further change events are read for it.
    pub fn window_closed(&mut self, window: WindowId) {
        self.stop_watch(window);
        if self.windows.remove(&window).is_some() {
            log::debug!("{window}: closed");
        }
    }

    pub fn handle(&mut self, window: WindowId, call: HostCall) -> Result<()> {
        match call {
            HostCall::CreateWindow => self.create_window().map(drop),
            HostCall::GetFile => self.prompt_open_file(window),
            HostCall::OpenFile(path) => self.open_file(window, &path),
            HostCall::SaveHtml(html) => self.save_html(window, &html),
            HostCall::SaveMarkdown { path, text } => {
                self.save_markdown(window, path.as_deref(), &text)
            }
            HostCall::SetEdited(edited) => {
                self.set_edited(window, edited);
                Ok(())
            }
        }
    }

    /// Run everything queued for the host loop. Returns what failed.
    pub fn pump(&mut self) -> Vec<Failure> {
        while let Ok(message) = self.inbox.try_recv() {
            let (window, result) = match message {
                HostMessage::Call { window, call } => (window, self.handle(window, call)),
                HostMessage::WatchFired { window, token } => {
                    (window, self.watch_fired(window, token))
                }
            };
            if let Err(error) = result {
                self.fail(window, error);
            }
        }
        std::mem::take(&mut self.failures)
    }

    fn fail(&mut self, window: WindowId, error: Error) {
        log::error!("{window}: {error}");
        self.failures.push(Failure { window, error });
    }

    fn notify(&self, window: WindowId, notification: UiNotification) {
        let Some(entry) = self.windows.get(&window) else {
            return;
        };
        let tag = notification.tag();
        if entry.mailbox.send(notification).is_err() {
            log::debug!("{window}: ui gone, {tag} dropped");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::{
        platform::Position,
        test_support::{DialogCall, FakePlatform, FakeWatches, make_temp_dir},
    };

    type TestHost = HostController<FakePlatform, FakeWatches>;

    fn host_with(config: Config) -> (TestHost, FakeWatches) {
        let watches = FakeWatches::default();
        let host = HostController::with_watch_service(
            FakePlatform::default(),
            config,
            watches.clone(),
        );
        (host, watches)
    }

    fn host() -> (TestHost, FakeWatches) {
        host_with(Config::default())
    }

    fn mailbox(host: &mut TestHost, window: WindowId) -> mpsc::Receiver<UiNotification> {
        match host.platform_mut().take_endpoint(window) {
            Some(endpoint) => endpoint.mailbox,
            None => mpsc::channel().1,
        }
    }

    #[test]
    fn first_window_has_no_position_and_later_ones_cascade() {
        let (mut host, _) = host();
        let first = host.create_window().ok();
        assert_eq!(host.platform().opened.first(), Some(&(WindowId(1), None)));

        let Some(first) = first else {
            return;
        };
        host.platform_mut().focused = Some(first);
        host.platform_mut()
            .positions
            .insert(first, Position { x: 100.0, y: 200.0 });

        assert!(host.create_window().is_ok());
        assert_eq!(
            host.platform().opened.get(1),
            Some(&(WindowId(2), Some(Position { x: 110.0, y: 210.0 })))
        );
        assert_eq!(host.window_ids().count(), 2);
    }

    #[test]
    fn window_system_failure_is_returned_and_nothing_registered() {
        let (mut host, _) = host();
        host.platform_mut().refuse_windows = true;
        assert!(matches!(host.create_window(), Err(Error::Window(_))));
        assert!(host.is_empty());
    }

    #[test]
    fn open_file_watches_reads_records_and_notifies() {
        let dir = make_temp_dir("mdpad-host-open-test");
        let path = dir.join("notes.md");
        fs::write(&path, "# Hi").ok();

        let (mut host, watches) = host();
        let Ok(window) = host.create_window() else {
            return;
        };
        let rx = mailbox(&mut host, window);

        assert!(host.open_file(window, &path).is_ok());
        assert_eq!(watches.events(), vec![format!("start {window} {}", path.display())]);
        assert_eq!(host.watched_path(window), Some(path.as_path()));
        assert_eq!(host.platform().recent, vec![path.clone()]);
        assert_eq!(host.platform().represented.get(&window), Some(&path));
        assert_eq!(host.represented_file(window), Some(path.as_path()));
        assert_eq!(
            rx.try_recv().ok(),
            Some(UiNotification::FileOpened {
                path: path.clone(),
                text: "# Hi".to_owned(),
            })
        );

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn open_file_read_failure_is_an_error_without_notification() {
        let dir = make_temp_dir("mdpad-host-open-missing-test");
        let (mut host, _) = host();
        let Ok(window) = host.create_window() else {
            return;
        };
        let rx = mailbox(&mut host, window);

        let result = host.open_file(window, &dir.join("absent.md"));
        assert!(matches!(result, Err(Error::Read { .. })));
        assert!(rx.try_recv().is_err());
        assert!(host.platform().recent.is_empty());

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn starting_a_watch_replaces_the_previous_one() {
        let dir = make_temp_dir("mdpad-host-watch-test");
        let a = dir.join("a.md");
        let b = dir.join("b.md");
        fs::write(&a, "a").ok();
        fs::write(&b, "b").ok();

        let (mut host, watches) = host();
        let Ok(window) = host.create_window() else {
            return;
        };

        assert!(host.open_file(window, &a).is_ok());
        assert!(host.open_file(window, &b).is_ok());
        assert!(host.start_watch(window, &a).is_ok());

        assert_eq!(watches.max_active(), 1);
        assert_eq!(watches.active(window), 1);
        assert_eq!(
            watches.events(),
            vec![
                format!("start {window} {}", a.display()),
                format!("stop {window} {}", a.display()),
                format!("start {window} {}", b.display()),
                format!("stop {window} {}", b.display()),
                format!("start {window} {}", a.display()),
            ]
        );

        host.stop_watch(window);
        assert_eq!(watches.active(window), 0);
        assert_eq!(host.watched_path(window), None);

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn watches_are_per_window() {
        let (mut host, watches) = host();
        let (Ok(one), Ok(two)) = (host.create_window(), host.create_window()) else {
            return;
        };
        assert!(host.start_watch(one, Path::new("/tmp/a.md")).is_ok());
        assert!(host.start_watch(two, Path::new("/tmp/a.md")).is_ok());
        assert_eq!(watches.active(one), 1);
        assert_eq!(watches.active(two), 1);
    }

    #[test]
    fn change_event_rereads_and_notifies_every_time() {
        let dir = make_temp_dir("mdpad-host-change-test");
        let path = dir.join("notes.md");
        fs::write(&path, "one").ok();

        let (mut host, watches) = host();
        let Ok(window) = host.create_window() else {
            return;
        };
        let rx = mailbox(&mut host, window);
        assert!(host.open_file(window, &path).is_ok());
        let _ = rx.try_recv();

        fs::write(&path, "two").ok();
        assert!(watches.fire_latest());
        assert!(watches.fire_latest());
        assert!(host.pump().is_empty());

        let changed = UiNotification::FileChanged {
            path: path.clone(),
            text: "two".to_owned(),
        };
        assert_eq!(rx.try_recv().ok(), Some(changed.clone()));
        assert_eq!(rx.try_recv().ok(), Some(changed));
        assert!(rx.try_recv().is_err());

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn failed_open_leaves_no_watch_behind() {
        let dir = make_temp_dir("mdpad-host-failed-open-test");
        let a = dir.join("a.md");
        let b = dir.join("b.md");
        fs::write(&a, "A").ok();

        let (mut host, watches) = host();
        let Ok(window) = host.create_window() else {
            return;
        };
        let rx = mailbox(&mut host, window);
        assert!(host.open_file(window, &a).is_ok());
        while rx.try_recv().is_ok() {}

        assert!(matches!(host.open_file(window, &b), Err(Error::Read { .. })));
        assert_eq!(host.watched_path(window), None);
        assert_eq!(watches.active(window), 0);
        assert_eq!(host.represented_file(window), Some(a.as_path()));

        fs::write(&b, "B appeared").ok();
        assert!(watches.fire_latest());
        assert!(host.pump().is_empty());
        assert!(rx.try_recv().is_err());

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn change_event_for_a_vanished_file_waits_for_the_next_one() {
        let dir = make_temp_dir("mdpad-host-vanished-test");
        let path = dir.join("notes.md");
        fs::write(&path, "one").ok();

        let (mut host, watches) = host();
        let Ok(window) = host.create_window() else {
            return;
        };
        let rx = mailbox(&mut host, window);
        assert!(host.open_file(window, &path).is_ok());
        while rx.try_recv().is_ok() {}

        fs::remove_file(&path).ok();
        assert!(watches.fire_latest());
        assert!(host.pump().is_empty());
        assert!(rx.try_recv().is_err());
        assert_eq!(host.watched_path(window), Some(path.as_path()));

        fs::write(&path, "two").ok();
        assert!(watches.fire_latest());
        assert!(host.pump().is_empty());
        assert_eq!(
            rx.try_recv().ok(),
            Some(UiNotification::FileChanged {
                path: path.clone(),
                text: "two".to_owned(),
            })
        );

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn events_from_a_replaced_watch_are_dropped() {
        let dir = make_temp_dir("mdpad-host-stale-test");
        let a = dir.join("a.md");
        let b = dir.join("b.md");
        fs::write(&a, "a").ok();
        fs::write(&b, "b").ok();

        let (mut host, watches) = host();
        let Ok(window) = host.create_window() else {
            return;
        };
        let rx = mailbox(&mut host, window);
        assert!(host.open_file(window, &a).is_ok());
        assert!(host.open_file(window, &b).is_ok());
        while rx.try_recv().is_ok() {}

        assert!(watches.fire_nth(0));
        assert!(host.pump().is_empty());
        assert!(rx.try_recv().is_err());

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn change_event_after_close_is_dropped() {
        let dir = make_temp_dir("mdpad-host-closed-test");
        let path = dir.join("notes.md");
        fs::write(&path, "x").ok();

        let (mut host, watches) = host();
        let Ok(window) = host.create_window() else {
            return;
        };
        assert!(host.open_file(window, &path).is_ok());

        host.window_closed(window);
        assert_eq!(watches.active(window), 0);
        assert!(!host.contains(window));

        assert!(watches.fire_latest());
        assert!(host.pump().is_empty());

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn disabled_capabilities_skip_watch_and_recent() {
        let dir = make_temp_dir("mdpad-host-caps-test");
        let path = dir.join("notes.md");
        fs::write(&path, "x").ok();

        let (mut host, watches) = host_with(Config {
            watch_files: false,
            recent_documents: false,
            confirm_close: true,
        });
        let Ok(window) = host.create_window() else {
            return;
        };
        assert!(host.open_file(window, &path).is_ok());
        assert!(watches.events().is_empty());
        assert!(host.platform().recent.is_empty());
        assert_eq!(host.represented_file(window), Some(path.as_path()));

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn prompt_open_file_uses_text_and_markdown_filters() {
        let dir = make_temp_dir("mdpad-host-prompt-test");
        let path = dir.join("todo.txt");
        fs::write(&path, "- milk").ok();

        let (mut host, _) = host();
        let Ok(window) = host.create_window() else {
            return;
        };
        let rx = mailbox(&mut host, window);

        assert!(host.prompt_open_file(window).is_ok());
        assert!(rx.try_recv().is_err());

        host.platform_mut().dialogs.open_answers.push_back(path.clone());
        assert!(host.prompt_open_file(window).is_ok());
        assert!(matches!(
            rx.try_recv(),
            Ok(UiNotification::FileOpened { path: opened, .. }) if opened == path
        ));

        let expected = DialogCall::PickOpen(vec!["Text Files", "Markdown Files"]);
        assert_eq!(host.platform().dialogs.calls, vec![expected.clone(), expected]);

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn save_html_writes_verbatim_or_does_nothing_on_cancel() {
        let dir = make_temp_dir("mdpad-host-html-test");
        let target = dir.join("out.html");
        fs::write(&target, "old").ok();

        let (mut host, _) = host();
        let Ok(window) = host.create_window() else {
            return;
        };

        assert!(host.save_html(window, "<h1>Hi</h1>\n").is_ok());
        assert_eq!(fs::read_to_string(&target).unwrap_or_default(), "old");

        host.platform_mut().dialogs.save_answers.push_back(target.clone());
        assert!(host.save_html(window, "<h1>Hi</h1>\n").is_ok());
        assert_eq!(fs::read_to_string(&target).unwrap_or_default(), "<h1>Hi</h1>\n");

        assert!(matches!(
            host.platform().dialogs.calls.first(),
            Some(DialogCall::PickSave { filters, .. }) if filters == &vec!["HTML Files"]
        ));

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn save_markdown_without_path_prompts_and_cancel_writes_nothing() {
        let dir = make_temp_dir("mdpad-host-save-cancel-test");
        let (mut host, watches) = host();
        let Ok(window) = host.create_window() else {
            return;
        };
        let rx = mailbox(&mut host, window);

        assert!(host.save_markdown(window, None, "# Draft").is_ok());
        assert!(matches!(
            host.platform().dialogs.calls.as_slice(),
            [DialogCall::PickSave { filters, .. }] if filters == &vec!["Markdown Files"]
        ));
        assert!(rx.try_recv().is_err());
        assert!(watches.events().is_empty());
        let entries = fs::read_dir(&dir).map(Iterator::count).unwrap_or_default();
        assert_eq!(entries, 0);

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn save_markdown_round_trips_through_open() {
        let dir = make_temp_dir("mdpad-host-save-test");
        let path = dir.join("notes.md");
        fs::write(&path, "old").ok();

        let (mut host, watches) = host();
        let Ok(window) = host.create_window() else {
            return;
        };
        let rx = mailbox(&mut host, window);

        host.handle(
            window,
            HostCall::SaveMarkdown {
                path: Some(path.clone()),
                text: "new".to_owned(),
            },
        )
        .ok();

        assert_eq!(fs::read_to_string(&path).unwrap_or_default(), "new");
        assert!(host.platform().dialogs.calls.is_empty());
        assert_eq!(watches.active(window), 1);
        assert_eq!(
            rx.try_recv().ok(),
            Some(UiNotification::FileOpened {
                path,
                text: "new".to_owned(),
            })
        );

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn close_asks_only_when_edited() {
        let (mut host, _) = host();
        let Ok(window) = host.create_window() else {
            return;
        };

        assert!(host.request_close(window));
        assert!(host.platform().dialogs.calls.is_empty());

        host.set_edited(window, true);
        assert!(!host.request_close(window));

        host.platform_mut().dialogs.confirm_answers.push_back(0);
        assert!(host.request_close(window));

        host.platform_mut().dialogs.confirm_answers.push_back(7);
        assert!(!host.request_close(window));

        assert_eq!(
            host.platform().dialogs.calls,
            vec![DialogCall::Confirm(CLOSE_PROMPT.title); 3]
        );
    }

    #[test]
    fn close_without_confirmation_when_disabled() {
        let (mut host, _) = host_with(Config {
            confirm_close: false,
            ..Config::default()
        });
        let Ok(window) = host.create_window() else {
            return;
        };
        host.set_edited(window, true);
        assert!(host.request_close(window));
        assert!(host.platform().dialogs.calls.is_empty());
    }

    #[test]
    fn pump_runs_ui_calls_and_collects_failures() {
        let dir = make_temp_dir("mdpad-host-pump-test");
        let (mut host, _) = host();
        let Ok(window) = host.create_window() else {
            return;
        };
        let Some(endpoint) = host.platform_mut().take_endpoint(window) else {
            return;
        };

        assert!(endpoint.host.send(HostCall::CreateWindow));
        assert!(endpoint.host.send(HostCall::SetEdited(true)));
        assert!(endpoint.host.send(HostCall::OpenFile(dir.join("absent.md"))));

        let failures = host.pump();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures.first().map(|f| f.window), Some(window));
        assert_eq!(host.window_ids().count(), 2);
        assert!(host.is_edited(window));

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn launch_opens_the_argument_in_the_first_window() {
        let dir = make_temp_dir("mdpad-host-launch-test");
        let path = dir.join("notes.md");
        fs::write(&path, "# Hi").ok();

        let (mut host, _) = host();
        let Ok(window) = host.launch(Some(&path)) else {
            return;
        };
        assert_eq!(host.represented_file(window), Some(path.as_path()));

        let Ok(other) = host.launch(Some(&dir.join("absent.md"))) else {
            return;
        };
        let failures = host.pump();
        assert_eq!(failures.first().map(|f| f.window), Some(other));

        let _ = fs::remove_dir_all(&dir);
    }
}
