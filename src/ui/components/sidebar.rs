//! Chat history sidebar

use crate::session::preview_text;
use crate::ui::state::AppState;
use crate::ui::theme::Theme;
use egui::{self, RichText, ScrollArea, Vec2};

pub struct ChatSidebar<'a> {
    state: &'a mut AppState,
    theme: &'a Theme,
}

impl<'a> ChatSidebar<'a> {
    pub fn new(state: &'a mut AppState, theme: &'a Theme) -> Self {
        Self { state, theme }
    }

    pub fn show(self, ui: &mut egui::Ui) {
        ui.vertical(|ui| {
            ui.horizontal(|ui| {
                ui.label(
                    RichText::new("Chat History")
                        .size(16.0)
                        .strong()
                        .color(self.theme.text_primary),
                );
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    let close = ui.button("✖");
                    close.widget_info(|| {
                        egui::WidgetInfo::labeled(egui::WidgetType::Button, true, "Close chat history")
                    });
                    if close.clicked() {
                        self.state.sidebar_open = false;
                    }
                });
            });

            ui.add_space(self.theme.spacing_sm);

            let new_chat = ui.add(
                egui::Button::new(RichText::new("➕ New Chat").color(egui::Color32::WHITE))
                    .fill(self.theme.primary)
                    .rounding(self.theme.button_rounding)
                    .min_size(Vec2::new(ui.available_width(), 36.0)),
            );
            new_chat.widget_info(|| egui::WidgetInfo::labeled(egui::WidgetType::Button, true, "New chat"));
            if new_chat.clicked() {
                self.state.start_new_chat();
            }

            ui.add_space(self.theme.spacing_sm);
            ui.separator();

            let mut selected = None;
            ScrollArea::vertical()
                .id_salt("chat_history")
                .auto_shrink([false, false])
                .show(ui, |ui| {
                    if self.state.archive().is_empty() {
                        ui.label(
                            RichText::new("No saved chats yet")
                                .italics()
                                .color(self.theme.text_muted),
                        );
                    }

                    for (index, entry) in self.state.archive().iter().enumerate() {
                        let preview = preview_text(&entry.messages);
                        let button = egui::Button::new(RichText::new(&preview).color(self.theme.text_primary))
                            .fill(self.theme.bg_tertiary)
                            .rounding(self.theme.button_rounding)
                            .min_size(Vec2::new(ui.available_width(), 32.0));

                        let response = ui.add(button);
                        response.widget_info(|| {
                            egui::WidgetInfo::labeled(
                                egui::WidgetType::Button,
                                true,
                                format!("Open chat: {}", preview),
                            )
                        });
                        if response.on_hover_text(&entry.timestamp).clicked() {
                            selected = Some(index);
                        }
                        ui.label(
                            RichText::new(&entry.timestamp)
                                .size(11.0)
                                .color(self.theme.text_muted),
                        );
                        ui.add_space(self.theme.spacing_sm);
                    }
                });

            if let Some(index) = selected {
                self.state.load_chat(index);
            }
        });
    }
}
