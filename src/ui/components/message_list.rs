//! Message list component
//!
//! Displays the conversation with code markup, uploaded images, per-message
//! copy buttons and a typing indicator while a reply is pending.

use crate::messages::{contains_code, tokenize, Message, Segment};
use crate::ui::images::ImageCache;
use crate::ui::state::AppState;
use crate::ui::theme::Theme;
use egui::text::{LayoutJob, TextFormat};
use egui::{self, Align, Color32, FontId, RichText, Vec2};

const MAX_IMAGE_WIDTH: f32 = 240.0;

/// Message list component
pub struct MessageList<'a> {
    state: &'a AppState,
    theme: &'a Theme,
    images: &'a mut ImageCache,
}

impl<'a> MessageList<'a> {
    pub fn new(state: &'a AppState, theme: &'a Theme, images: &'a mut ImageCache) -> Self {
        Self { state, theme, images }
    }

    /// Returns the index of a message whose "Copy code" button was clicked
    pub fn show(mut self, ui: &mut egui::Ui) -> Option<usize> {
        let state = self.state;
        let mut copy_request = None;

        egui::ScrollArea::vertical()
            .id_salt("message_list")
            .auto_shrink([false, false])
            .stick_to_bottom(true)
            .show(ui, |ui| {
                ui.vertical(|ui| {
                    ui.add_space(self.theme.spacing);

                    let messages = state.messages();
                    if messages.is_empty() && !state.is_awaiting_reply() {
                        self.show_empty_state(ui);
                    } else {
                        for (index, message) in messages.iter().enumerate() {
                            ui.push_id(AppState::message_key(index, message), |ui| {
                                if self.show_message(ui, index, message) {
                                    copy_request = Some(index);
                                }
                            });
                            ui.add_space(self.theme.spacing_sm);
                        }

                        if state.is_awaiting_reply() {
                            self.show_typing_indicator(ui);
                        }
                    }

                    ui.add_space(self.theme.spacing);
                });
            });

        self.images.end_frame();
        copy_request
    }

    fn show_empty_state(&self, ui: &mut egui::Ui) {
        ui.vertical_centered(|ui| {
            ui.add_space(100.0);
            ui.label(
                RichText::new("Welcome to Vocalis")
                    .size(24.0)
                    .color(self.theme.text_primary),
            );
            ui.add_space(self.theme.spacing);
            ui.label(
                RichText::new("Type a message, press the microphone to speak, or attach an image.")
                    .size(14.0)
                    .color(self.theme.text_muted),
            );
        });
    }

    /// Renders one bubble; returns true when its copy button was clicked
    fn show_message(&mut self, ui: &mut egui::Ui, index: usize, message: &Message) -> bool {
        let is_user = message.is_user();
        let (bubble_color, text_color) = if is_user {
            (self.theme.user_bubble, Color32::WHITE)
        } else {
            (self.theme.assistant_bubble, self.theme.text_primary)
        };
        let align = if is_user { Align::RIGHT } else { Align::LEFT };
        let mut copy_clicked = false;

        ui.with_layout(egui::Layout::top_down(align), |ui| {
            ui.label(
                RichText::new(if is_user { "You" } else { "Assistant" })
                    .size(12.0)
                    .color(self.theme.text_muted),
            );
            ui.add_space(2.0);

            let max_width = ui.available_width() * 0.75;
            egui::Frame::none()
                .fill(bubble_color)
                .rounding(self.theme.bubble_rounding)
                .inner_margin(egui::Margin::symmetric(12.0, 8.0))
                .show(ui, |ui| {
                    ui.set_max_width(max_width);
                    ui.vertical(|ui| {
                        if let Some(data_uri) = &message.image {
                            let key = AppState::message_key(index, message);
                            self.show_image(ui, &key, data_uri, text_color);
                        }

                        let accessible = if is_user {
                            format!("User message: {}", message.content)
                        } else {
                            format!("Assistant response: {}", message.content)
                        };
                        let response = ui.label(self.layout_content(&message.content, text_color));
                        response.widget_info(|| {
                            egui::WidgetInfo::labeled(egui::WidgetType::Label, true, &accessible)
                        });
                    });
                });

            if !is_user && contains_code(&message.content) {
                copy_clicked = self.show_copy_button(ui, index);
            }
        });

        copy_clicked
    }

    fn layout_content(&self, content: &str, text_color: Color32) -> LayoutJob {
        let text = TextFormat {
            font_id: FontId::proportional(14.0),
            color: text_color,
            ..Default::default()
        };
        let code = TextFormat {
            font_id: FontId::monospace(13.0),
            color: self.theme.text_primary,
            background: self.theme.code_bg,
            ..Default::default()
        };

        let mut job = LayoutJob::default();
        for segment in tokenize(content) {
            match segment {
                Segment::Text(t) => job.append(t, 0.0, text.clone()),
                Segment::InlineCode(c) => job.append(c, 0.0, code.clone()),
                Segment::FencedCode(c) => {
                    job.append(&format!("\n{}\n", c.trim_matches('\n')), 0.0, code.clone())
                }
            }
        }
        job
    }

    fn show_image(&mut self, ui: &mut egui::Ui, key: &str, data_uri: &str, text_color: Color32) {
        match self.images.texture(ui.ctx(), key, data_uri) {
            Some(texture) => {
                let size = texture.size_vec2();
                let scale = (MAX_IMAGE_WIDTH / size.x).min(1.0);
                ui.add(
                    egui::Image::new(egui::load::SizedTexture::new(texture.id(), size * scale))
                        .rounding(self.theme.button_rounding),
                );
            }
            None => {
                ui.label(RichText::new("🖼 Image preview unavailable").color(text_color));
            }
        }
    }

    fn show_copy_button(&self, ui: &mut egui::Ui, index: usize) -> bool {
        let copied = self.state.is_copied(index);
        let (text, color) = if copied {
            ("✔ Copied", self.theme.success)
        } else {
            ("📋 Copy code", self.theme.text_secondary)
        };

        let button = egui::Button::new(RichText::new(text).size(12.0).color(color))
            .rounding(self.theme.button_rounding)
            .min_size(Vec2::new(0.0, 24.0));
        let response = ui.add(button);
        response.widget_info(|| {
            egui::WidgetInfo::labeled(
                egui::WidgetType::Button,
                true,
                if copied { "Copied" } else { "Copy code" },
            )
        });

        response.on_hover_text("Copy the code in this reply").clicked()
    }

    fn show_typing_indicator(&self, ui: &mut egui::Ui) {
        ui.with_layout(egui::Layout::top_down(Align::LEFT), |ui| {
            ui.label(
                RichText::new("Assistant")
                    .size(12.0)
                    .color(self.theme.text_muted),
            );
            ui.add_space(2.0);

            egui::Frame::none()
                .fill(self.theme.assistant_bubble)
                .rounding(self.theme.bubble_rounding)
                .inner_margin(egui::Margin::symmetric(12.0, 8.0))
                .show(ui, |ui| {
                    let t = ui.ctx().input(|i| i.time);
                    let dots = 1 + ((t * 3.0) as usize % 3);
                    let response = ui.label(
                        RichText::new("●".repeat(dots))
                            .size(10.0)
                            .color(self.theme.text_muted),
                    );
                    response.widget_info(|| {
                        egui::WidgetInfo::labeled(egui::WidgetType::Label, true, "Assistant is typing")
                    });
                });
        });
    }
}
