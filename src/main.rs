//! signage-kiosk: headless runner for the display reconciler.
//!
//! Wires the control loop to logging stand-ins for both panels so it can be
//! soak-tested against a real backend without a display: panel remounts,
//! overlay changes, and accepted config updates all land in the log. The
//! kiosk build replaces the stand-ins with the real browser view and video
//! surface through the same trait seams.

use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use signage_kiosk::{HttpConfigSource, LogPagePanel, LogVideoPanel, Settings, logging, reconciler};

#[tokio::main]
async fn main() -> Result<()> {
    let _log_guard = logging::init();

    let settings = Settings::default();
    println!("signage-kiosk v{}", env!("CARGO_PKG_VERSION"));
    println!("device {} polling {}", settings.device_id, settings.endpoint_base);

    let source = Arc::new(HttpConfigSource::new(&settings)?);
    let (handle, join) = reconciler::spawn(
        settings.clone(),
        source,
        Box::new(LogPagePanel),
        Box::new(LogVideoPanel),
    );

    // Stand-in view layer: log every published snapshot.
    let (width, height) = (settings.target_width, settings.target_height);
    let mut state_rx = handle.state();
    let view = tokio::spawn(async move {
        while state_rx.changed().await.is_ok() {
            let cfg = state_rx.borrow_and_update().clone();
            let geometry = cfg.geometry(width, height);
            info!(
                target: "view",
                layout = ?cfg.layout,
                ui_state = ?cfg.ui_state,
                reload_key = cfg.reload_key,
                video = ?geometry.video,
                page = ?geometry.page,
                "display state"
            );
        }
    });

    tokio::signal::ctrl_c().await?;
    info!(target: "view", "interrupt received");
    handle.shutdown();
    let _ = join.await;
    view.abort();

    Ok(())
}
