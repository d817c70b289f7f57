//! Termination signals for the binaries.

use tracing::{info, warn};

/// Resolve on SIGINT, or SIGTERM on unix. `service` names the process in logs.
///
/// A signal that cannot be installed is logged and never fires.
pub async fn signal(service: &'static str) {
    let interrupt = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(service, error = %e, "Cannot listen for SIGINT");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!(service, error = %e, "Cannot listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    let received = tokio::select! {
        _ = interrupt => "SIGINT",
        _ = terminate => "SIGTERM",
    };
    info!(service, signal = received, "Shutdown requested");
}
