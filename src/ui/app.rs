//! Main application struct and eframe integration
//!
//! This module contains the main VocalisApp that implements eframe::App.

use crate::ui::components::{ChatSidebar, DebugPanel, InputBar, MessageList};
use crate::ui::images::ImageCache;
use crate::ui::state::AppState;
use crate::ui::theme::Theme;
use egui::{self, CentralPanel, RichText, SidePanel, TopBottomPanel};
use std::time::{Duration, Instant};
use tracing::info;

/// Shown instead of the assistant when speech recognition is unavailable
pub const UNSUPPORTED_NOTICE: &str = "Speech recognition is not supported in this environment.";

const IDLE_REPAINT: Duration = Duration::from_millis(200);

pub struct VocalisApp {
    state: AppState,
    theme: Theme,
    images: ImageCache,
    last_frame_time: Instant,
}

impl VocalisApp {
    pub fn new(cc: &eframe::CreationContext<'_>, state: AppState) -> Self {
        let app = Self::from_state(state);
        app.theme.apply(&cc.egui_ctx);
        app
    }

    /// App over `state` without an eframe creation context
    pub fn from_state(state: AppState) -> Self {
        Self {
            state,
            theme: Theme::dark(),
            images: ImageCache::new(),
            last_frame_time: Instant::now(),
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut AppState {
        &mut self.state
    }

    /// Fold in collaborator events and render one frame
    pub fn show(&mut self, ctx: &egui::Context) {
        self.state.poll_events();

        if !self.state.speech_supported() {
            self.show_unsupported(ctx);
            return;
        }

        self.handle_dropped_files(ctx);

        self.show_header(ctx);
        self.show_sidebar(ctx);
        self.show_debug_panel(ctx);
        self.show_input_area(ctx);
        self.show_content(ctx);
    }

    fn show_unsupported(&self, ctx: &egui::Context) {
        CentralPanel::default()
            .frame(egui::Frame::none().fill(self.theme.bg_primary))
            .show(ctx, |ui| {
                ui.vertical_centered(|ui| {
                    ui.add_space(120.0);
                    let response = ui.label(
                        RichText::new(UNSUPPORTED_NOTICE)
                            .size(18.0)
                            .color(self.theme.text_primary),
                    );
                    response.widget_info(|| {
                        egui::WidgetInfo::labeled(egui::WidgetType::Label, true, UNSUPPORTED_NOTICE)
                    });
                });
            });
    }

    fn handle_dropped_files(&mut self, ctx: &egui::Context) {
        let dropped: Vec<_> = ctx.input(|i| {
            i.raw
                .dropped_files
                .iter()
                .filter_map(|file| file.path.clone())
                .collect()
        });
        for path in dropped {
            info!("File dropped: {:?}", path);
            self.state.request_image(path);
        }
    }

    fn show_header(&mut self, ctx: &egui::Context) {
        TopBottomPanel::top("header")
            .frame(egui::Frame::none().fill(self.theme.bg_secondary).inner_margin(12.0))
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    let menu = ui.button(RichText::new("☰").size(18.0));
                    menu.widget_info(|| {
                        egui::WidgetInfo::labeled(egui::WidgetType::Button, true, "Open chat history")
                    });
                    if menu.on_hover_text("Chat history").clicked() {
                        self.state.sidebar_open = !self.state.sidebar_open;
                    }

                    ui.label(
                        RichText::new("Vocalis")
                            .size(20.0)
                            .strong()
                            .color(self.theme.text_primary),
                    );
                    ui.label(
                        RichText::new("Voice Assistant")
                            .size(14.0)
                            .color(self.theme.text_muted),
                    );

                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        let debug = ui.button("🔍");
                        debug.widget_info(|| {
                            egui::WidgetInfo::labeled(egui::WidgetType::Button, true, "Toggle debug panel")
                        });
                        if debug.on_hover_text("Toggle Debug Panel").clicked() {
                            self.state.show_debug_panel = !self.state.show_debug_panel;
                        }

                        if self.state.is_listening() {
                            ui.label(RichText::new("● Listening").size(12.0).color(self.theme.listening));
                        }
                    });
                });
            });
    }

    fn show_sidebar(&mut self, ctx: &egui::Context) {
        if !self.state.sidebar_open {
            return;
        }

        SidePanel::left("chat_history_panel")
            .resizable(false)
            .exact_width(260.0)
            .frame(egui::Frame::none().fill(self.theme.bg_secondary).inner_margin(self.theme.spacing))
            .show(ctx, |ui| {
                ChatSidebar::new(&mut self.state, &self.theme).show(ui);
            });
    }

    fn show_debug_panel(&mut self, ctx: &egui::Context) {
        if !self.state.show_debug_panel {
            return;
        }

        SidePanel::right("debug_panel")
            .resizable(true)
            .default_width(300.0)
            .min_width(250.0)
            .max_width(500.0)
            .frame(egui::Frame::none().fill(self.theme.bg_primary).inner_margin(self.theme.spacing))
            .show(ctx, |ui| {
                DebugPanel::new(&self.state, &self.theme).show(ui);
            });
    }

    fn show_input_area(&mut self, ctx: &egui::Context) {
        TopBottomPanel::bottom("input_area")
            .frame(egui::Frame::none().fill(self.theme.bg_primary).inner_margin(self.theme.spacing))
            .show(ctx, |ui| {
                InputBar::new(&mut self.state, &self.theme).show(ui);
            });
    }

    fn show_content(&mut self, ctx: &egui::Context) {
        CentralPanel::default()
            .frame(egui::Frame::none().fill(self.theme.bg_primary))
            .show(ctx, |ui| {
                let copy = MessageList::new(&self.state, &self.theme, &mut self.images).show(ui);
                if let Some(code) = copy.and_then(|index| self.state.copy_code(index)) {
                    ctx.copy_text(code);
                }
            });
    }
}

impl eframe::App for VocalisApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now = Instant::now();
        let delta = now.duration_since(self.last_frame_time).as_secs_f64();
        self.last_frame_time = now;
        self.state.update_fps(delta);

        self.show(ctx);

        // Animations run while busy; otherwise wake up to poll the workers
        if self.state.is_awaiting_reply() || self.state.is_listening() {
            ctx.request_repaint();
        } else {
            ctx.request_repaint_after(IDLE_REPAINT);
        }
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        info!("Vocalis shutting down");
        self.state.shutdown();
    }
}
