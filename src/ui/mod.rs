//! GUI implementation with egui/eframe
//!
//! - **state**: the interaction controller driven by the widgets
//! - **app**: the eframe application and its panels
//! - **components**: message list, input bar, sidebar and debug panel

mod app;
mod components;
pub mod images;
pub mod state;
mod theme;

pub use app::{VocalisApp, UNSUPPORTED_NOTICE};
pub use images::ImageCache;
pub use state::{AppState, DebugInfo, SendState, APOLOGY, COPY_INDICATOR};
pub use theme::Theme;

/// Run the Vocalis window over a started [`AppState`]
pub fn run(state: AppState) -> eframe::Result<()> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([900.0, 700.0])
            .with_min_inner_size([600.0, 400.0])
            .with_drag_and_drop(true)
            .with_title("Vocalis"),
        ..Default::default()
    };

    eframe::run_native(
        "Vocalis",
        options,
        Box::new(|cc| Ok(Box::new(VocalisApp::new(cc, state)))),
    )
}
