use std::future::Future;
use std::io;

use tracing::{error, info};

/// Resolves once SIGINT (ctrl-c) or, on unix, SIGTERM is received.
pub async fn shutdown_signal() {
    let ctrl_c = until_signal("ctrl-c", tokio::signal::ctrl_c());

    #[cfg(unix)]
    let terminate = until_signal("SIGTERM", async {
        let mut signal = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())?;
        signal.recv().await;
        Ok::<(), io::Error>(())
    });

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

/// Waits on a signal listener. A listener that cannot be installed never
/// resolves, so it cannot trigger a shutdown.
pub async fn until_signal<F>(name: &str, listener: F)
where
    F: Future<Output = io::Result<()>>,
{
    match listener.await {
        Ok(()) => info!("Received {}", name),
        Err(e) => {
            error!("Failed to listen for {}: {}", name, e);
            std::future::pending::<()>().await;
        }
    }
}
