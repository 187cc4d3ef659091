mod app;
mod backend;
mod config;
mod event;
mod session;
mod theme;
mod ui;

use app::SlmStudioApp;
use backend::dispatch::BackendClient;
use backend::http::HttpBackend;
use config::AppConfig;
use eframe::egui;
use std::sync::mpsc;
use std::sync::Arc;
use theme::Theme;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let config = AppConfig::from_env()?;
    info!(
        api_base_url = %config.api_base_url,
        carousel_interval_ms = config.carousel_interval.as_millis() as u64,
        "starting SLM Studio"
    );

    let (tx, rx) = mpsc::channel();
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("slm-studio-runtime")
        .build()?;

    let backend = HttpBackend::new(config.api_base_url.clone())?;
    info!(base_url = backend.base_url(), "backend client ready");
    let client = BackendClient::new(Arc::new(backend), tx, runtime.handle().clone());
    client.initialize();

    let theme = Theme::default();
    let app = SlmStudioApp::new(rx, client, config, theme.clone());
    let _runtime = runtime;

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("SLM Studio")
            .with_inner_size([1280.0, 820.0])
            .with_min_inner_size([960.0, 640.0])
            .with_drag_and_drop(true),
        ..Default::default()
    };

    eframe::run_native(
        "SLM Studio",
        native_options,
        Box::new(move |creation_context| {
            theme.apply_visuals(&creation_context.egui_ctx);
            Ok(Box::new(app))
        }),
    )?;

    Ok(())
}
