mod backend_bridge;
mod controller;
mod ui;

use clap::Parser;
use client_core::{config::normalize_base_url, load_settings, ClientSettings};
use crossbeam_channel::bounded;
use eframe::egui;
use tracing_subscriber::EnvFilter;

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::UiEvent;
use crate::ui::PostboardApp;

#[derive(Parser, Debug)]
struct Args {
    /// Overrides `api_base_url` from postboard.toml and the environment.
    #[arg(long)]
    api_url: Option<String>,
}

fn main() -> eframe::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
    let args = Args::parse();

    let settings = match args.api_url {
        Some(api_base_url) => ClientSettings {
            api_base_url: normalize_base_url(&api_base_url),
        },
        None => load_settings(),
    };

    let (cmd_tx, cmd_rx) = bounded::<BackendCommand>(256);
    let (ui_tx, ui_rx) = bounded::<UiEvent>(1024);
    backend_bridge::runtime::launch(settings, cmd_rx, ui_tx);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Postboard")
            .with_inner_size([960.0, 720.0])
            .with_min_inner_size([640.0, 480.0]),
        ..Default::default()
    };
    eframe::run_native(
        "Postboard",
        options,
        Box::new(|_cc| Ok(Box::new(PostboardApp::new(cmd_tx, ui_rx)))),
    )
}
