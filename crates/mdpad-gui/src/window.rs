#![forbid(unsafe_code)]

use std::borrow::Cow;

use eframe::egui;
use mdpad_core::{
    bridge::WindowId,
    host::HostController,
    platform::Position,
    ui::{DroppedFile, UiController},
};

use crate::{
    platform::{DesktopPlatform, OpenedWindow, RfdDialogs},
    preview::Preview,
};

pub(crate) type Host = HostController<DesktopPlatform>;

const DEFAULT_SIZE: [f32; 2] = [1024.0, 768.0];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Mode {
    Edit,
    Html,
    SideBySide,
}

impl Mode {
    pub(crate) fn cycle(self) -> Self {
        [Self::Html, Self::SideBySide, Self::Edit][self as usize]
    }

    fn label(self) -> &'static str {
        ["Markdown", "HTML", "Side-by-side"][self as usize]
    }
}

/// One editor window: a `UiController` plus the widgets that drive it.
pub(crate) struct EditorWindow {
    controller: UiController,
    draft: String,
    mode: Mode,
    position: Option<Position>,
    error: Option<String>,
    shown_title: Option<String>,
    preview: Preview,
    previewed: Option<String>,
}

impl EditorWindow {
    pub(crate) fn new(opened: OpenedWindow, mode: Mode) -> Self {
        Self {
            controller: UiController::new(opened.endpoint),
            draft: String::new(),
            mode,
            position: opened.position,
            error: None,
            shown_title: None,
            preview: Preview::default(),
            previewed: None,
        }
    }

    pub(crate) fn id(&self) -> WindowId {
        self.controller.window()
    }

    pub(crate) fn set_error(&mut self, error: String) {
        self.error = Some(error);
    }

    pub(crate) fn viewport_id(&self) -> egui::ViewportId {
        egui::ViewportId::from_hash_of(("mdpad-window", self.id()))
    }

    pub(crate) fn viewport_builder(&self) -> egui::ViewportBuilder {
        let builder = egui::ViewportBuilder::default()
            .with_title(self.controller.chrome().title.clone())
            .with_inner_size(DEFAULT_SIZE)
            .with_min_inner_size([480.0, 320.0])
            .with_drag_and_drop(true);
        match self.position {
            Some(Position { x, y }) => builder.with_position([x, y]),
            None => builder,
        }
    }

    /// Draw the window into `ctx`, which belongs to its own viewport.
    pub(crate) fn show(&mut self, ctx: &egui::Context, host: &mut Host, dialogs: &mut RfdDialogs) {
        self.controller.process_notifications(dialogs);

        let id = self.id();
        let (focused, outer_rect, dropped) = ctx.input(|i| {
            let viewport = i.viewport();
            (
                viewport.focused.unwrap_or(false),
                viewport.outer_rect,
                i.raw.dropped_files.clone(),
            )
        });
        let position = outer_rect.map(|rect| Position {
            x: rect.min.x,
            y: rect.min.y,
        });
        host.platform_mut().track(id, focused, position);
        let host: &Host = host;

        if let Some(file) = first_dropped(&dropped) {
            self.controller.drop_file(&file, dialogs);
        }

        self.handle_shortcuts(ctx);

        if self.draft != self.controller.state().buffer() {
            self.draft = self.controller.state().buffer().to_owned();
        }
        if self.mode != Mode::Edit {
            self.refresh_preview();
        }

        egui::TopBottomPanel::top(egui::Id::new(("toolbar", id))).show(ctx, |ui| {
            ui.horizontal(|ui| self.show_toolbar(ui, host));
        });

        egui::TopBottomPanel::bottom(egui::Id::new(("status", id))).show(ctx, |ui| {
            self.show_status(ui, host);
        });

        if self.mode == Mode::SideBySide {
            egui::SidePanel::right(egui::Id::new(("html", id)))
                .resizable(true)
                .min_width(240.0)
                .default_width(420.0)
                .show(ctx, |ui| self.show_html(ui));
        }

        egui::CentralPanel::default().show(ctx, |ui| match self.mode {
            Mode::Edit | Mode::SideBySide => self.show_editor(ui),
            Mode::Html => self.show_html(ui),
        });

        self.update_title(ctx);
    }

    fn handle_shortcuts(&mut self, ctx: &egui::Context) {
        let (open, save, new_window, cycle_mode) = ctx.input(|i| {
            let cmd = i.modifiers.command;
            (
                cmd && i.key_pressed(egui::Key::O),
                cmd && i.key_pressed(egui::Key::S),
                cmd && i.key_pressed(egui::Key::N),
                cmd && i.key_pressed(egui::Key::Enter),
            )
        });

        if open {
            self.controller.open_file();
        }
        if save && self.controller.chrome().controls.save_markdown {
            self.controller.save_markdown();
        }
        if new_window {
            self.controller.new_window();
        }
        if cycle_mode {
            self.mode = self.mode.cycle();
        }
    }

    fn show_toolbar(&mut self, ui: &mut egui::Ui, host: &Host) {
        let controls = self.controller.chrome().controls;

        if ui.button("New Window").clicked() {
            self.controller.new_window();
        }
        if ui.button("Open File").clicked() {
            self.controller.open_file();
        }
        ui.menu_button("Recent", |ui| {
            if host.platform().recent().is_empty() {
                ui.label("No recent files");
            }
            for path in host.platform().recent() {
                if ui.button(path.display().to_string()).clicked() {
                    self.controller.open_path(path.clone());
                }
            }
        });

        ui.separator();

        if ui
            .add_enabled(controls.save_markdown, egui::Button::new("Save File"))
            .clicked()
        {
            self.controller.save_markdown();
        }
        if ui
            .add_enabled(controls.revert, egui::Button::new("Revert"))
            .clicked()
        {
            self.controller.revert();
            self.draft = self.controller.state().buffer().to_owned();
        }
        if ui
            .add_enabled(controls.save_html, egui::Button::new("Save HTML"))
            .clicked()
        {
            self.controller.save_html();
        }

        ui.separator();

        for mode in [Mode::Edit, Mode::Html, Mode::SideBySide] {
            if ui
                .selectable_label(self.mode == mode, mode.label())
                .clicked()
            {
                self.mode = mode;
            }
        }
    }

    fn show_status(&mut self, ui: &mut egui::Ui, host: &Host) {
        let mut clear_error = false;

        ui.horizontal(|ui| {
            let label: Cow<'_, str> = host
                .platform()
                .represented(self.id())
                .map_or(Cow::Borrowed("Untitled"), |path| path.to_string_lossy());
            ui.label(label.into_owned());

            if self.controller.chrome().document_edited {
                ui.separator();
                ui.colored_label(ui.visuals().warn_fg_color, "Modified");
            }

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if let Some(error) = self.error.as_deref() {
                    if ui.button("x").clicked() {
                        clear_error = true;
                    }
                    ui.colored_label(ui.visuals().error_fg_color, error);
                }
            });
        });

        if clear_error {
            self.error = None;
        }
    }

    fn show_editor(&mut self, ui: &mut egui::Ui) {
        let id = egui::Id::new(("editor", self.id()));
        let editor = egui::TextEdit::multiline(&mut self.draft)
            .desired_width(f32::INFINITY)
            .code_editor()
            .frame(false)
            .id(id);

        let response = ui.add_sized(ui.available_size(), editor);
        if response.changed() {
            self.controller.edit(self.draft.clone());
        }
    }

    fn refresh_preview(&mut self) {
        let buffer = self.controller.state().buffer();
        if self.previewed.as_deref() == Some(buffer) {
            return;
        }
        self.preview = Preview::parse(buffer);
        self.previewed = Some(buffer.to_owned());
    }

    fn show_html(&self, ui: &mut egui::Ui) {
        egui::ScrollArea::vertical()
            .id_salt(("html-scroll", self.id()))
            .auto_shrink([false; 2])
            .show(ui, |ui| self.preview.show(ui));
    }

    fn update_title(&mut self, ctx: &egui::Context) {
        let title = &self.controller.chrome().title;
        if self.shown_title.as_ref() == Some(title) {
            return;
        }
        ctx.send_viewport_cmd(egui::ViewportCommand::Title(title.clone()));
        self.shown_title = Some(title.clone());
    }
}

/// Only the first of several files dropped at once is opened.
fn first_dropped(files: &[egui::DroppedFile]) -> Option<DroppedFile> {
    let file = files.first()?;
    let path = file.path.clone()?;
    let mime = (!file.mime.is_empty()).then(|| file.mime.clone());
    Some(DroppedFile { path, mime })
}
