//! Input bar component
//!
//! Microphone and speaker toggles, the image attach field and the composer
//! with its send button.

use crate::ui::state::AppState;
use crate::ui::theme::Theme;
use egui::{self, Key, RichText, Vec2};

/// Input bar component for text and voice input
pub struct InputBar<'a> {
    state: &'a mut AppState,
    theme: &'a Theme,
}

impl<'a> InputBar<'a> {
    pub fn new(state: &'a mut AppState, theme: &'a Theme) -> Self {
        Self { state, theme }
    }

    pub fn show(mut self, ui: &mut egui::Ui) {
        egui::Frame::none()
            .fill(self.theme.bg_secondary)
            .rounding(self.theme.card_rounding)
            .inner_margin(self.theme.spacing)
            .show(ui, |ui| {
                ui.vertical(|ui| {
                    ui.horizontal(|ui| {
                        self.show_attach_field(ui);
                    });

                    ui.add_space(self.theme.spacing_sm);

                    ui.horizontal(|ui| {
                        self.show_mic_button(ui);
                        self.show_speaker_button(ui);
                        ui.add_space(self.theme.spacing_sm);
                        self.show_text_input(ui);
                        ui.add_space(self.theme.spacing_sm);
                        self.show_send_button(ui);
                    });
                });
            });
    }

    fn show_mic_button(&mut self, ui: &mut egui::Ui) {
        let listening = self.state.is_listening();
        let (icon, label, color) = if listening {
            ("⏹", "Stop listening", self.theme.listening)
        } else {
            ("🎤", "Start listening", self.theme.text_secondary)
        };

        let mut button = egui::Button::new(RichText::new(icon).size(20.0).color(color))
            .min_size(Vec2::splat(44.0))
            .rounding(self.theme.button_rounding);
        if listening {
            button = button.fill(self.theme.listening.gamma_multiply(0.2));
        }

        let response = ui.add(button);
        response.widget_info(|| egui::WidgetInfo::labeled(egui::WidgetType::Button, true, label));

        if listening {
            let t = ui.ctx().input(|i| i.time);
            let pulse = ((t * 3.0).sin() * 0.5 + 0.5) as f32;
            let rect = response.rect;
            ui.painter().circle_stroke(
                rect.center(),
                rect.width() / 2.0 + 2.0 + pulse * 3.0,
                egui::Stroke::new(2.0 * pulse, self.theme.listening.gamma_multiply(1.0 - pulse * 0.5)),
            );
        }

        if response.on_hover_text(label).clicked() {
            self.state.toggle_listening();
        }
    }

    fn show_speaker_button(&mut self, ui: &mut egui::Ui) {
        let on = self.state.speaker_on();
        let (icon, label) = if on {
            ("🔊", "Turn off text-to-speech")
        } else {
            ("🔇", "Turn on text-to-speech")
        };

        let button = egui::Button::new(RichText::new(icon).size(20.0).color(self.theme.text_secondary))
            .min_size(Vec2::splat(44.0))
            .rounding(self.theme.button_rounding);

        let response = ui.add(button);
        response.widget_info(|| egui::WidgetInfo::labeled(egui::WidgetType::Button, true, label));

        if response.on_hover_text(label).clicked() {
            self.state.toggle_speaker();
        }
    }

    fn show_attach_field(&mut self, ui: &mut egui::Ui) {
        let available_width = ui.available_width() - 60.0;

        let text_edit = egui::TextEdit::singleline(&mut self.state.attach_path)
            .hint_text("Image path (or drop a file on the window)")
            .desired_width(available_width)
            .font(egui::TextStyle::Small)
            .id(egui::Id::new("attach_path"));
        let response = ui.add(text_edit);
        response.widget_info(|| {
            egui::WidgetInfo::labeled(egui::WidgetType::TextEdit, true, "Image path")
        });

        let can_attach = !self.state.attach_path.trim().is_empty();
        let button = egui::Button::new(RichText::new("📎").size(16.0))
            .min_size(Vec2::new(44.0, 28.0))
            .rounding(self.theme.button_rounding);
        let attach = ui.add_enabled(can_attach, button);
        attach.widget_info(|| {
            egui::WidgetInfo::labeled(egui::WidgetType::Button, can_attach, "Attach image")
        });

        let submitted = response.lost_focus() && ui.input(|i| i.key_pressed(Key::Enter));
        if can_attach && (attach.on_hover_text("Attach image").clicked() || submitted) {
            let path = self.state.attach_path.trim().to_string();
            self.state.request_image(path);
            self.state.attach_path.clear();
        }
    }

    fn show_text_input(&mut self, ui: &mut egui::Ui) {
        let awaiting = self.state.is_awaiting_reply();

        // Leave room for the send button
        let available_width = ui.available_width() - 60.0;

        let text_edit = egui::TextEdit::singleline(&mut self.state.composer)
            .hint_text("Type your message...")
            .desired_width(available_width)
            .font(egui::TextStyle::Body)
            .margin(egui::Margin::symmetric(12.0, 8.0))
            .id(egui::Id::new("message_input"));

        let response = ui.add(text_edit);
        // Accessible name for the composer
        response.widget_info(|| {
            egui::WidgetInfo::labeled(egui::WidgetType::TextEdit, true, "Message input")
        });

        // Single-line edits give up focus when Enter is pressed
        if response.lost_focus() && ui.input(|i| i.key_pressed(Key::Enter)) && !awaiting {
            self.state.send_message();
            response.request_focus();
        }
    }

    fn show_send_button(&mut self, ui: &mut egui::Ui) {
        let can_send = !self.state.composer.trim().is_empty() && !self.state.is_awaiting_reply();

        let button_color = if can_send {
            self.theme.primary
        } else {
            self.theme.text_muted
        };

        let button = egui::Button::new(RichText::new("➤").size(18.0).color(egui::Color32::WHITE))
            .min_size(Vec2::splat(44.0))
            .rounding(self.theme.button_rounding)
            .fill(button_color);

        let response = ui.add_enabled(can_send, button);
        response.widget_info(|| {
            egui::WidgetInfo::labeled(egui::WidgetType::Button, can_send, "Send message")
        });

        if response.on_hover_text("Send message (Enter)").clicked() {
            self.state.send_message();
        }
    }
}
