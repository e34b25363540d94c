mod commands;
mod config;
mod credentials;
mod error;
mod gemini;
mod history;
mod huggingface;
mod prompts;

use std::sync::{Arc, Mutex};
use tauri::Manager;
use tracing::info;
use tracing_subscriber::EnvFilter;

use config::Config;

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Mêsversário Studio starting...");

    tauri::Builder::default()
        .plugin(tauri_plugin_dialog::init())
        .setup(|app| {
            // History is loaded once here and overwritten on every change.
            let history_path = Config::history_path()?;
            let history: commands::SharedHistory =
                Arc::new(Mutex::new(history::HistoryStore::open(history_path)));
            app.manage(history);

            info!("App setup complete");
            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            commands::generate_image,
            commands::edit_image,
            commands::animate_image,
            commands::get_history,
            commands::toggle_favorite,
            commands::clear_history,
            commands::get_settings,
            commands::set_settings,
            commands::loading_messages,
            commands::popular_themes,
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
