use std::path::PathBuf;

use eframe::egui;
use pinboard::board::BoardConfig;
use pinboard::gui::BoardApp;
use pinboard::logging;
use pinboard::storage::Storage;

fn main() -> anyhow::Result<()> {
    let dir = config_dir();
    let board_path = dir.join("boxes.json");
    let config = BoardConfig::load(&board_path)?;
    logging::init(config.debug_logging);
    if !board_path.exists() {
        if let Err(err) = config.save(&board_path) {
            tracing::warn!("could not write default board to {}: {err}", board_path.display());
        }
    }

    let storage = Storage::open(dir.join("storage.json"));

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([960.0, 600.0])
            .with_min_inner_size([480.0, 320.0]),
        ..Default::default()
    };
    let _ = eframe::run_native(
        "Pinboard",
        native_options,
        Box::new(move |cc| Box::new(BoardApp::new(cc, &config, storage))),
    );
    Ok(())
}

fn config_dir() -> PathBuf {
    dirs_next::config_dir()
        .map(|dir| dir.join("pinboard"))
        .unwrap_or_else(|| PathBuf::from("."))
}
