// Release builds run as a GUI application (no console window).
// Debug builds keep the console so that log output is visible.
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

use winapp::{app, config::AppConfig, logging};

fn main() {
    if let Err(e) = logging::init() {
        eprintln!("{e}");
    }
    std::process::exit(app::launch(AppConfig::hello_world()));
}
