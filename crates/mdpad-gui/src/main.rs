#![forbid(unsafe_code)]
#![cfg_attr(
    all(not(debug_assertions), target_os = "windows"),
    windows_subsystem = "windows"
)]

#[cfg(target_arch = "wasm32")]
compile_error!("mdpad is a native desktop app; web/wasm builds are not supported.");

use std::{ffi::OsString, path::PathBuf};

use eframe::egui;
use mdpad_core::{config::Config, host::HostController};

mod platform;
mod preview;
mod window;

use platform::{DesktopPlatform, RfdDialogs};
use window::{EditorWindow, Host, Mode};

#[derive(Clone, Debug, PartialEq, Eq)]
struct LaunchOptions {
    mode: Mode,
    path: Option<PathBuf>,
}

fn parse_launch_options<I, S>(args: I) -> LaunchOptions
where
    I: IntoIterator<Item = S>,
    S: Into<OsString>,
{
    let mut mode = Mode::SideBySide;
    let mut path = None;

    for arg in args {
        let arg = arg.into();
        if arg == "-e" {
            mode = Mode::Edit;
            continue;
        }
        if arg == "-p" {
            mode = Mode::Html;
            continue;
        }
        if arg == "-s" {
            mode = Mode::SideBySide;
            continue;
        }

        if path.is_none() {
            path = Some(PathBuf::from(arg));
        }
    }

    LaunchOptions { mode, path }
}

fn main() -> eframe::Result {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let launch_options = parse_launch_options(std::env::args_os().skip(1));
    let mut host = HostController::new(DesktopPlatform::default(), Config::load());
    if let Err(err) = host.launch(launch_options.path.as_deref()) {
        log::error!("{err}");
        return Err(eframe::Error::AppCreation(Box::new(err)));
    }
    let app = MdpadApp::new(host, launch_options.mode);

    // Viewport sizes are in points, so they scale with the OS DPI factor.
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Editor")
            .with_inner_size([1024.0, 768.0])
            .with_min_inner_size([480.0, 320.0])
            .with_drag_and_drop(true),
        ..Default::default()
    };
    eframe::run_native("mdpad", options, Box::new(move |_cc| Ok(Box::new(app))))
}

/// The root viewport shows the first window; every later one gets its own
/// immediate viewport.
struct MdpadApp {
    host: Host,
    dialogs: RfdDialogs,
    windows: Vec<EditorWindow>,
    mode: Mode,
}

impl MdpadApp {
    fn new(host: Host, mode: Mode) -> Self {
        let mut app = Self {
            host,
            dialogs: RfdDialogs,
            windows: Vec::new(),
            mode,
        };
        app.adopt_opened_windows();
        app
    }

    fn adopt_opened_windows(&mut self) {
        for opened in self.host.platform_mut().take_opened() {
            self.windows.push(EditorWindow::new(opened, self.mode));
        }
    }

    fn pump_host(&mut self) {
        self.adopt_opened_windows();
        for failure in self.host.pump() {
            if let Some(window) = self.windows.iter_mut().find(|w| w.id() == failure.window) {
                window.set_error(failure.error.to_string());
            }
        }
        self.adopt_opened_windows();
    }

    /// Closing the root viewport closes every window, each with its own
    /// unsaved-changes check. Returns whether the app may exit.
    fn close_all(&mut self) -> bool {
        let host = &mut self.host;
        if !self.windows.iter().all(|w| host.request_close(w.id())) {
            return false;
        }
        for window in self.windows.drain(..) {
            host.window_closed(window.id());
            host.platform_mut().forget(window.id());
        }
        true
    }
}

impl eframe::App for MdpadApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.pump_host();

        if ctx.input(|i| i.viewport().close_requested()) {
            if self.close_all() {
                return;
            }
            ctx.send_viewport_cmd(egui::ViewportCommand::CancelClose);
        }

        let Self {
            host,
            dialogs,
            windows,
            ..
        } = self;

        let mut closed = Vec::new();
        for (index, window) in windows.iter_mut().enumerate() {
            if index == 0 {
                window.show(ctx, host, dialogs);
                continue;
            }

            let keep_open = ctx.show_viewport_immediate(
                window.viewport_id(),
                window.viewport_builder(),
                |ctx, _class| {
                    if ctx.input(|i| i.viewport().close_requested()) {
                        if host.request_close(window.id()) {
                            return false;
                        }
                        ctx.send_viewport_cmd(egui::ViewportCommand::CancelClose);
                    }
                    window.show(ctx, host, dialogs);
                    true
                },
            );
            if !keep_open {
                closed.push(window.id());
            }
        }

        for id in closed {
            windows.retain(|w| w.id() != id);
            host.window_closed(id);
            host.platform_mut().forget(id);
        }

        if windows.is_empty() {
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
        }

        // File watches and other windows post work without any input event.
        ctx.request_repaint_after(std::time::Duration::from_millis(250));
    }
}
