// src/main.rs
use gtk4::prelude::*;
use gtk4::Application;
use nameplate_core::constants::DEFAULT_ASSET_ROOT;
use nameplate_core::PlateConfig;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Minimum time the "loading fonts" state stays up, so it never flickers
const FONT_LOADING_FLOOR: Duration = Duration::from_millis(300);

fn app_config() -> PlateConfig {
    let asset_root = std::env::var("NAMEPLATE_ASSETS").unwrap_or_else(|_| DEFAULT_ASSET_ROOT.to_string());
    PlateConfig::default()
        .with_asset_root(asset_root)
        .with_font_loading_floor(FONT_LOADING_FLOOR)
}

fn main() -> glib::ExitCode {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            "nameplate=info,nameplate_core=info,nameplate_gtk4=info".into()
        }))
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    let app = Application::builder()
        .application_id("com.example.nameplate")
        .build();

    app.connect_activate(|app| {
        let config = app_config();
        info!("Starting nameplate with assets from {}", config.asset_root.display());

        match nameplate_gtk4::build_window(app, config) {
            Ok(window) => window.present(),
            Err(e) => {
                error!("Failed to create the nameplate window: {}", e);
                app.quit();
            }
        }
    });

    app.run()
}
