/*!
 * Banker Kernel - Main Entry Point
 *
 * Loads the initial allocation state and serves admission requests:
 * - `BANKER_CONFIG`: optional configuration file (`.json` or text)
 * - `BANKER_LISTEN_ADDR`: listen address, default 127.0.0.1:7878
 */

use banker_kernel::{init_tracing, start_server, AllocationEngine, Settings};
use tokio::time::{interval, Duration};
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> miette::Result<()> {
    init_tracing();

    info!("Banker kernel starting...");

    let settings = Settings::from_env()?;
    let state = settings.initial_state()?;
    let engine = AllocationEngine::new(state);

    match engine.check_safety() {
        Ok(report) if report.safe => {
            info!(sequence = ?report.sequence, "initial state is safe")
        }
        Ok(_) => warn!("initial state is unsafe; only releases can restore safety"),
        Err(e) => return Err(e.into()),
    }

    let server = start_server(settings.listen_addr, engine.clone());
    tokio::pin!(server);

    let mut ticker = interval(Duration::from_secs(30));
    loop {
        tokio::select! {
            result = &mut server => {
                if let Err(e) = &result {
                    error!(error = %e, "server stopped");
                }
                return result.map_err(Into::into);
            }
            _ = tokio::signal::ctrl_c() => {
                info!("shutdown requested");
                break;
            }
            _ = ticker.tick() => {
                let stats = engine.stats();
                info!(
                    granted = stats.granted,
                    rejected_unsafe = stats.rejected_unsafe,
                    rejected_invalid = stats.rejected_invalid,
                    released = stats.released,
                    generation = engine.snapshot().generation,
                    "kernel running"
                );
            }
        }
    }

    info!("Banker kernel stopped");
    Ok(())
}
