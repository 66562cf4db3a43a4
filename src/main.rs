use crm_dashboard::crm::api::{HttpRecordApi, RecordApi};
use crm_dashboard::gui::CrmDashboardApp;
use crm_dashboard::logging;
use crm_dashboard::settings::Settings;
use crm_dashboard::storage::JsonFileStore;

use eframe::egui;
use std::sync::Arc;

fn main() -> anyhow::Result<()> {
    let settings_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "settings.json".into());
    let settings = Settings::load(&settings_path)?;
    logging::init(settings.debug_logging, settings.log_file());
    tracing::info!(settings = %settings_path, "starting crm dashboard");

    let layout_path = settings.layout_path();
    if let Some(parent) = layout_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let store = match JsonFileStore::open(&layout_path) {
        Ok(store) => store,
        Err(e) => {
            let backup = layout_path.with_extension("json.corrupt");
            tracing::error!(
                error = %e,
                backup = %backup.display(),
                "layout file unreadable; starting fresh"
            );
            std::fs::rename(&layout_path, &backup)?;
            JsonFileStore::open(&layout_path)?
        }
    };

    let api: Option<Arc<dyn RecordApi>> =
        match HttpRecordApi::new(&settings.api_base_url, settings.api_timeout()) {
            Ok(api) => Some(Arc::new(api)),
            Err(e) => {
                tracing::error!(
                    error = %e,
                    url = %settings.api_base_url,
                    "failed to create api client"
                );
                None
            }
        };

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([480.0, 360.0]),
        ..Default::default()
    };
    eframe::run_native(
        "CRM Dashboard",
        native_options,
        Box::new(move |_cc| Box::new(CrmDashboardApp::new(&settings, Box::new(store), api))),
    )
    .map_err(|e| anyhow::anyhow!("{e}"))?;
    Ok(())
}
