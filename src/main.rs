// src/main.rs
use std::path::PathBuf;
use std::sync::mpsc::channel;
use anyhow::{anyhow, Context, Result};
use clap::Parser;
use eframe::egui;
use tlv_scope::config::ViewerConfig;
use tlv_scope::engine;
use tlv_scope::gui::ScopeApp;

#[derive(Parser)]
#[command(name = "tlv-scope")]
#[command(about = "Live scrolling viewer for the TLV scope back-end", long_about = None)]
struct Cli {
    /// JSON config file; unset keys keep their defaults
    #[arg(long)]
    config: Option<PathBuf>,
    /// Control API root, e.g. http://127.0.0.1:8000/api
    #[arg(long)]
    api_base: Option<String>,
    /// Push channel URL, e.g. ws://127.0.0.1:8000/ws
    #[arg(long)]
    stream_url: Option<String>,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let mut config = ViewerConfig::load(cli.config.as_deref())?;
    if let Some(api_base) = cli.api_base {
        config.api_base = api_base;
    }
    if let Some(stream_url) = cli.stream_url {
        config.stream_url = stream_url;
    }
    config.validate()?;

    let (tx, rx) = channel();
    let (tx_cmd, rx_cmd) = tokio::sync::mpsc::unbounded_channel();
    let _engine = engine::spawn_thread(config.clone(), tx, rx_cmd)
        .context("starting engine thread")?;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 800.0])
            .with_min_inner_size([900.0, 600.0])
            .with_title("TLV Scope"),
        ..Default::default()
    };
    eframe::run_native(
        "TLV Scope",
        options,
        Box::new(move |_cc| Box::new(ScopeApp::new(&config, rx, tx_cmd))),
    )
    .map_err(|e| anyhow!("viewer window failed: {e}"))
}
