//! Main application state and GUI logic.
//!
//! `OrreryApp` owns all mutable session state: the body mapping, the
//! pan/zoom view, the animation clock, and the receiving end of the
//! watcher channel. The watcher thread never touches any of this; it
//! only sends parsed events, which are drained here at the start of
//! every frame in the order they were read from the file.

use std::sync::mpsc::{self, Receiver};
use std::time::{Duration, Instant};

use eframe::egui::{self, Rect};
use tracing::info;

use crate::core::config::AppSettings;
use crate::core::journal::JournalEvent;
use crate::core::system::SystemMap;
use crate::core::watcher::JournalWatcher;

use super::orrery::{OrreryRenderer, ViewState};
use super::tree::{TreeAction, TreeRenderer};

/// Animation speedup: one simulated day per wall-clock second, so a
/// year-long orbit completes in about six minutes.
const TIME_SCALE: f64 = 86_400.0;

/// Repaint tick while the animation runs (roughly 30 fps).
const ANIMATION_TICK: Duration = Duration::from_millis(33);

/// Kind of status message to display.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StatusKind {
    /// Informational message (shown in green)
    Success,
    /// Error message (shown in red)
    Error,
}

/// A transient status message shown in the toolbar.
#[derive(Debug, Clone)]
pub struct StatusMessage {
    pub text: String,
    pub kind: StatusKind,
    created_at: Instant,
}

impl StatusMessage {
    /// Duration to show status messages before auto-dismissing.
    const DISPLAY_DURATION: Duration = Duration::from_secs(5);

    pub fn new(text: impl Into<String>, kind: StatusKind) -> Self {
        Self {
            text: text.into(),
            kind,
            created_at: Instant::now(),
        }
    }

    pub fn is_visible(&self) -> bool {
        self.created_at.elapsed() < Self::DISPLAY_DURATION
    }
}

/// Main application state and GUI logic.
pub struct OrreryApp {
    settings: AppSettings,
    map: SystemMap,
    view: ViewState,
    selected: Option<u64>,
    animate: bool,
    /// Simulated seconds driving the orbital animation
    elapsed_secs: f64,
    last_tick: Instant,
    events: Receiver<JournalEvent>,
    watcher: JournalWatcher,
    status_message: Option<StatusMessage>,
    /// Canvas rect from the previous frame, for centring on selections
    canvas: Rect,
}

impl OrreryApp {
    /// Create the application and start watching the journal directory.
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        let settings = AppSettings::load();
        let journal_dir = settings.effective_journal_dir();
        let status_message = if journal_dir.is_dir() {
            None
        } else {
            // The watcher retries forever, but tell the user why the
            // view stays empty in the meantime.
            Some(StatusMessage::new(
                format!("Journal directory not found: {}", journal_dir.display()),
                StatusKind::Error,
            ))
        };
        let (sender, events) = mpsc::channel();
        let watcher = JournalWatcher::spawn(journal_dir, sender, cc.egui_ctx.clone());
        let view = ViewState {
            zoom: settings.get_zoom(),
            ..Default::default()
        };
        let animate = settings.animate;
        Self {
            settings,
            map: SystemMap::new(),
            view,
            selected: None,
            animate,
            elapsed_secs: 0.0,
            last_tick: Instant::now(),
            events,
            watcher,
            status_message,
            canvas: Rect::NOTHING,
        }
    }

    /// Drain journal events delivered by the watcher, in file order.
    fn drain_events(&mut self) {
        while let Ok(event) = self.events.try_recv() {
            if let JournalEvent::SystemChange(system) = &event
                && self.map.system_name() != Some(system.star_system.as_str())
            {
                self.selected = None;
                self.status_message = Some(StatusMessage::new(
                    format!("Entered {}", system.star_system),
                    StatusKind::Success,
                ));
            }
            self.map.apply(event);
        }
    }

    /// Advance the animation clock by the wall time since the last frame.
    fn tick_animation(&mut self) {
        let now = Instant::now();
        let dt = now.duration_since(self.last_tick);
        self.last_tick = now;
        if self.animate {
            self.elapsed_secs += dt.as_secs_f64() * TIME_SCALE;
        }
    }

    /// Switch to a different journal directory and restart the watcher.
    fn change_journal_dir(&mut self, ctx: &egui::Context, dir: std::path::PathBuf) {
        info!(directory = %dir.display(), "switching journal directory");
        self.settings.journal_dir = Some(dir.clone());
        let (sender, events) = mpsc::channel();
        self.events = events;
        self.watcher.stop();
        self.watcher = JournalWatcher::spawn(dir.clone(), sender, ctx.clone());
        self.status_message = Some(StatusMessage::new(
            format!("Watching {}", dir.display()),
            StatusKind::Success,
        ));
    }

    fn handle_keyboard_shortcuts(&mut self, ctx: &egui::Context) {
        ctx.input(|i| {
            if i.key_pressed(egui::Key::Space) {
                self.animate = !self.animate;
            }
            if i.key_pressed(egui::Key::Escape) {
                self.selected = None;
            }
        });
    }

    /// Render the top toolbar: system identity, animation toggle,
    /// journal directory picker, and transient status messages.
    fn render_toolbar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading("System Orrery");
                ui.separator();

                ui.label(self.map.system_name().unwrap_or("Waiting for system..."));
                ui.separator();
                ui.label(format!("{} bodies", self.map.len()));
                ui.separator();

                let animate_label = if self.animate {
                    "⏸ Pause"
                } else {
                    "▶ Animate"
                };
                if ui.button(animate_label).clicked() {
                    self.animate = !self.animate;
                }

                if ui.button("↺ Reset View").clicked() {
                    self.view = ViewState::default();
                    self.selected = None;
                }

                if ui.button("📂 Journal Folder").clicked()
                    && let Some(dir) = rfd::FileDialog::new()
                        .set_title("Select Journal Directory")
                        .set_directory(self.settings.effective_journal_dir())
                        .pick_folder()
                {
                    self.change_journal_dir(ctx, dir);
                }

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    self.render_status_message(ui);
                });
            });
        });
    }

    /// Render the status message if one is active.
    fn render_status_message(&mut self, ui: &mut egui::Ui) {
        let expired = self
            .status_message
            .as_ref()
            .is_some_and(|msg| !msg.is_visible());
        if expired {
            self.status_message = None;
            return;
        }

        let msg_info = self.status_message.as_ref().map(|msg| {
            let color = match msg.kind {
                StatusKind::Success => egui::Color32::from_rgb(76, 175, 80),
                StatusKind::Error => egui::Color32::from_rgb(244, 67, 54),
            };
            (color, msg.text.clone())
        });

        if let Some((color, text)) = msg_info {
            let mut dismiss_clicked = false;
            ui.horizontal(|ui| {
                if ui.small_button("✕").clicked() {
                    dismiss_clicked = true;
                }
                ui.colored_label(color, &text);
            });
            if dismiss_clicked {
                self.status_message = None;
            }
        }
    }

    /// Render the body selection tree in the left side panel.
    fn render_tree(&mut self, ctx: &egui::Context) {
        egui::SidePanel::left("body_tree")
            .default_width(260.0)
            .show(ctx, |ui| {
                ui.heading("Bodies");
                ui.separator();
                let renderer = TreeRenderer::new(&self.map, self.selected);
                if let Some(TreeAction::Focus(id)) = renderer.render(ui) {
                    self.selected = Some(id);
                    if self.canvas.is_positive() {
                        self.view
                            .center_on(&self.map, id, self.canvas, self.elapsed_secs);
                    }
                }
            });
    }

    /// Render the orrery canvas in the central panel.
    fn render_canvas(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                let renderer = OrreryRenderer::new(
                    &self.map,
                    &self.settings.colors,
                    self.selected,
                    self.elapsed_secs,
                );
                self.canvas = renderer.render(ui, &mut self.view);
            });
    }
}

impl eframe::App for OrreryApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.drain_events();
        self.tick_animation();
        self.handle_keyboard_shortcuts(ctx);

        self.render_toolbar(ctx);
        self.render_tree(ctx);
        self.render_canvas(ctx);

        if self.animate {
            ctx.request_repaint_after(ANIMATION_TICK);
        }
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.settings.animate = self.animate;
        self.settings.set_zoom(self.view.zoom);
        self.settings.save();
        self.watcher.stop();
    }
}
