//! Debug panel component
//!
//! Displays internal state information for debugging.

use crate::ui::state::{AppState, SendState};
use crate::ui::theme::Theme;
use egui::{self, RichText, ScrollArea};

pub struct DebugPanel<'a> {
    state: &'a AppState,
    theme: &'a Theme,
}

impl<'a> DebugPanel<'a> {
    pub fn new(state: &'a AppState, theme: &'a Theme) -> Self {
        Self { state, theme }
    }

    pub fn show(self, ui: &mut egui::Ui) {
        egui::Frame::none()
            .fill(self.theme.bg_secondary)
            .rounding(self.theme.card_rounding)
            .inner_margin(self.theme.spacing)
            .show(ui, |ui| {
                ui.vertical(|ui| {
                    ui.horizontal(|ui| {
                        ui.label(RichText::new("Debug Panel").strong().color(self.theme.text_primary));
                        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                            ui.label(
                                RichText::new(format!("{:.1} FPS", self.state.debug_info.fps))
                                    .size(12.0)
                                    .family(egui::FontFamily::Monospace)
                                    .color(self.theme.text_muted),
                            );
                        });
                    });

                    ui.separator();

                    egui::Grid::new("debug_stats")
                        .num_columns(2)
                        .spacing([20.0, 4.0])
                        .show(ui, |ui| {
                            self.stat_row(ui, "Request", &self.request_status());
                            self.stat_row(ui, "Messages", &self.state.messages().len().to_string());
                            self.stat_row(ui, "Archived chats", &self.state.archive().len().to_string());
                            self.stat_row(ui, "Listening", &self.state.is_listening().to_string());
                            self.stat_row(ui, "Transcript", self.state.transcript());
                            self.stat_row(ui, "Speaker", if self.state.speaker_on() { "on" } else { "off" });
                            self.stat_row(ui, "Model", &self.state.debug_info.model_stats);
                        });

                    if let Some(error) = &self.state.debug_info.last_error {
                        ui.add_space(self.theme.spacing_sm);
                        ui.horizontal(|ui| {
                            ui.label(RichText::new("⚠").color(self.theme.error));
                            ui.label(RichText::new(error).size(12.0).color(self.theme.error));
                        });
                    }

                    ui.add_space(self.theme.spacing_sm);
                    ui.separator();
                    ui.label(
                        RichText::new("Recent Logs")
                            .size(12.0)
                            .strong()
                            .color(self.theme.text_secondary),
                    );

                    ScrollArea::vertical()
                        .id_salt("debug_logs")
                        .max_height(120.0)
                        .auto_shrink([false, false])
                        .stick_to_bottom(true)
                        .show(ui, |ui| {
                            if self.state.debug_info.log_messages.is_empty() {
                                ui.label(
                                    RichText::new("No log messages")
                                        .size(11.0)
                                        .italics()
                                        .color(self.theme.text_muted),
                                );
                            }
                            for msg in &self.state.debug_info.log_messages {
                                ui.label(
                                    RichText::new(msg)
                                        .size(11.0)
                                        .family(egui::FontFamily::Monospace)
                                        .color(self.theme.text_muted),
                                );
                            }
                        });
                });
            });
    }

    fn request_status(&self) -> String {
        match self.state.send_state() {
            SendState::Idle => "idle".to_string(),
            SendState::AwaitingReply(id) => format!("awaiting {}", &id.to_string()[..8]),
        }
    }

    fn stat_row(&self, ui: &mut egui::Ui, label: &str, value: &str) {
        ui.label(RichText::new(label).size(12.0).color(self.theme.text_muted));
        ui.label(
            RichText::new(if value.is_empty() { "-" } else { value })
                .size(12.0)
                .family(egui::FontFamily::Monospace)
                .color(self.theme.text_secondary),
        );
        ui.end_row();
    }
}
