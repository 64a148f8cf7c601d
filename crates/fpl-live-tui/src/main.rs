// FPL live dashboard entry point.
//
// Startup sequence:
// 1. Initialize tracing (log to file, not terminal)
// 2. Load config
// 3. Open selection storage
// 4. Start the embedded relay, if enabled
// 5. Create mpsc channels and the application state
// 6. Spawn app logic task
// 7. Run the TUI until the user quits
// 8. Cleanup on exit

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use fpl_live_core::config;
use fpl_live_core::selection::SelectionStore;
use fpl_live_core::source::RelayClient;
use fpl_live_core::storage::{MemoryStorage, SelectionStorage, SqliteStorage};
use fpl_live_relay::{Relay, RelayServer};
use fpl_live_tui::{app, tui};
use tokio::sync::mpsc;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Initialize tracing
    init_tracing()?;
    info!("FPL live dashboard starting up");

    // 2. Load config
    let config = config::load_config().context("failed to load configuration")?;
    info!(
        "Config loaded: relay {}, polling every {}s",
        config.relay_endpoint(),
        config.dashboard.poll_interval_secs
    );

    // 3. Open selection storage. A broken database should not keep the
    //    dashboard from starting; selections then last for this run only.
    let db_path = config.db_path();
    let storage: Box<dyn SelectionStorage> = match SqliteStorage::open(&db_path) {
        Ok(db) => {
            info!("Selection database opened at {}", db_path.display());
            Box::new(db)
        }
        Err(e) => {
            warn!(
                "Failed to open selection database at {}: {e:#}; selections will not persist",
                db_path.display()
            );
            Box::new(MemoryStorage::new())
        }
    };
    let selection = SelectionStore::load(storage);

    // 4. Embedded relay
    let relay_handle = if config.dashboard.embedded_relay {
        let addr = format!("{}:{}", config.relay.bind, config.relay.port);
        let relay = Relay::from_config(&config).context("failed to build relay")?;
        match RelayServer::bind(&addr) {
            Ok(server) => Some(server.spawn(Arc::new(relay))),
            Err(e) => {
                warn!("Embedded relay not started ({e}); using {}", config.relay_endpoint());
                None
            }
        }
    } else {
        None
    };

    // 5. Channels and state
    let (event_tx, event_rx) = mpsc::channel(64);
    let (cmd_tx, cmd_rx) = mpsc::channel(64);
    let (ui_tx, ui_rx) = mpsc::channel(64);

    let source = RelayClient::new(
        config.relay_endpoint(),
        Duration::from_secs(config.upstream.timeout_secs),
    )
    .context("failed to build relay client")?;
    let app_state = app::AppState::new(config, Arc::new(source), selection, event_tx);

    // 6. Spawn app logic task
    let app_handle = tokio::spawn(async move {
        if let Err(e) = app::run(event_rx, cmd_rx, ui_tx, app_state).await {
            error!("Application loop error: {}", e);
        }
    });

    // 7. Run the TUI event loop (blocking until user quits)
    if let Err(e) = tui::run(ui_rx, cmd_tx).await {
        error!("TUI error: {:#}", e);
    }

    // 8. Cleanup: wait for app task to finish (with timeout)
    let _ = tokio::time::timeout(Duration::from_secs(5), async {
        let _ = app_handle.await;
    })
    .await;

    if let Some(handle) = relay_handle {
        handle.shutdown().await;
    }

    info!("FPL live dashboard shut down cleanly");
    Ok(())
}

/// Initialize tracing to log to a file (not the terminal, which is used by the TUI).
fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let log_dir = std::env::current_dir()?.join("logs");
    std::fs::create_dir_all(&log_dir)?;

    let log_file = std::fs::File::create(log_dir.join("fpl-live.log"))?;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("fpl_live=info,warn")),
        )
        .with_writer(log_file)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
