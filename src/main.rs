use clap::Parser;
use rusty_tryon::generation::gemini::GeminiClient;
use rusty_tryon::{Settings, TryOnApp};
use std::sync::Arc;

/// Launch the native egui application.
fn main() -> eframe::Result<()> {
    env_logger::init();
    let settings = Settings::parse();

    let client = match GeminiClient::from_settings(&settings) {
        Ok(client) => client,
        Err(err) => {
            log::error!("could not set up the generation client: {err}");
            std::process::exit(1);
        }
    };
    if settings.api_key.is_none() {
        log::warn!("no API key configured; generation requests will fail");
    }

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default().with_inner_size([1280.0, 820.0]),
        ..Default::default()
    };
    eframe::run_native(
        "Rusty Try-On",
        options,
        Box::new(move |cc| Ok(Box::new(TryOnApp::new(cc, &settings, Arc::new(client))))),
    )
}
