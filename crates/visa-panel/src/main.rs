mod bootstrap;

use std::time::Duration;

use anyhow::Result;
use visa_core::settings::Settings;
use visa_data::analysis::build_dashboard;
use visa_data::export::export_selection;
use visa_runtime::data_manager::DataManager;
use visa_runtime::orchestrator::RefreshOrchestrator;
use visa_runtime::source::{DataSource, SourceFetcher};
use visa_ui::app::{App, ExportTarget};

#[tokio::main]
async fn main() -> Result<()> {
    let settings = Settings::load_with_last_used();

    bootstrap::ensure_directories()?;
    let log_file = settings
        .log_file
        .clone()
        .or_else(|| (settings.view == "dashboard").then(bootstrap::default_log_file));
    bootstrap::setup_logging(&settings.log_level, log_file.as_ref())?;

    tracing::info!("visa-panel v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        view = %settings.view,
        theme = %settings.theme,
        role = %settings.role,
        refresh_rate = settings.refresh_rate,
        cache_ttl = settings.cache_ttl,
        "settings loaded"
    );

    let identity = settings.identity()?;
    let selection = settings.filter_selection()?;
    let source = DataSource::parse(settings.require_source()?);
    let fetcher = SourceFetcher::new(source, Duration::from_secs(settings.fetch_timeout))?;
    let mut data_manager = DataManager::new(fetcher, settings.cache_ttl);

    match settings.view.as_str() {
        "dashboard" => {
            let orchestrator =
                RefreshOrchestrator::new(data_manager, u64::from(settings.refresh_rate));
            let (rx, handle) = orchestrator.start();

            let app = App::new(
                &settings.theme,
                identity,
                selection,
                settings.ranking_month.clone(),
                ExportTarget {
                    path: settings.output.clone(),
                    per_inspector: settings.per_inspector,
                },
            );

            // The TUI exits on 'q' / Ctrl+C; the OS-level Ctrl+C covers signals
            // received while the terminal is not in raw mode.
            tokio::select! {
                result = app.run_dashboard(rx) => {
                    handle.abort();
                    result?;
                }
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Ctrl+C received; stopping refresh task");
                    handle.abort();
                }
            }
        }

        "export" => {
            let snapshot = data_manager.get_snapshot(true).await?;
            let written = export_selection(
                &snapshot.table,
                &selection,
                &identity,
                &settings.output,
                settings.per_inspector,
            )?;
            for path in written {
                println!("{}", path.display());
            }
        }

        "report" => {
            let snapshot = data_manager.get_snapshot(true).await?;
            let report = build_dashboard(
                &snapshot.table,
                &selection,
                &identity,
                settings.ranking_month.as_deref(),
            );
            println!("{}", report.to_json()?);
        }

        unknown => {
            eprintln!("Unknown view mode: {}", unknown);
        }
    }

    Ok(())
}
