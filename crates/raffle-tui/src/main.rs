// Raffle entry point.
//
// Startup sequence:
// 1. Initialize tracing (log to file, not terminal)
// 2. Load config
// 3. Open database
// 4. Build app state (restores the saved draw duration)
// 5. Spawn app logic task (finishes interrupted draws first)
// 6. Run the TUI until the user quits
// 7. Cleanup on exit

use std::time::Duration;

use anyhow::Context;
use tokio::sync::mpsc;
use tracing::{error, info};

use raffle_core::config;
use raffle_core::store::Database;
use raffle_tui::{app, tui};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing()?;
    info!("Raffle starting up");

    let config = config::load_config().context("failed to load configuration")?;
    info!(
        "Config loaded: draw {}s at {}ms/frame, idle {}ms/frame",
        config.draw.duration_secs, config.draw.draw_interval_ms, config.draw.idle_interval_ms
    );

    if let Some(parent) = config.db_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let db_path = config.db_path.to_string_lossy().into_owned();
    let db = Database::open(&db_path).context("failed to open database")?;
    info!("Database opened at {}", db_path);

    let ui_config = config.ui.clone();
    let app_state = app::AppState::new(config, db).context("failed to initialize app state")?;

    let (cmd_tx, cmd_rx) = mpsc::channel(64);
    let (ui_tx, ui_rx) = mpsc::channel(256);

    let app_handle = tokio::spawn(async move {
        if let Err(e) = app::run(cmd_rx, ui_tx, app_state).await {
            error!("Application loop error: {:#}", e);
            return Err(e);
        }
        Ok(())
    });

    info!("Application ready");

    // Blocks until the user quits or the app loop ends.
    if let Err(e) = tui::run(ui_rx, cmd_tx, ui_config).await {
        error!("TUI error: {:#}", e);
    }

    let app_result = tokio::time::timeout(Duration::from_secs(5), app_handle)
        .await
        .context("app loop did not shut down in time")?
        .context("app loop panicked")?;

    info!("Raffle shut down");
    app_result
}

/// Initialize tracing to log to a file (not the terminal, which is used by the TUI).
fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let log_dir = std::env::current_dir()?.join("logs");
    std::fs::create_dir_all(&log_dir)?;

    let log_file = std::fs::File::create(log_dir.join("raffle.log"))?;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("raffle_core=info,raffle_tui=info,warn")),
        )
        .with_writer(log_file)
        .with_ansi(false)
        .with_target(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
