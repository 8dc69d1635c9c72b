use std::future::pending;

use tokio::select;

use crate::prelude::*;

/// Resolve on `Ctrl+C` or `SIGTERM`.
///
/// A handler that cannot be installed is logged and never fires.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(error) = tokio::signal::ctrl_c().await {
            error!("failed to install Ctrl+C handler: {error:#}");
            pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(error) => {
                error!("failed to install SIGTERM handler: {error:#}");
                pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = pending::<()>();

    select! {
        () = ctrl_c => info!("interrupted"),
        () = terminate => info!("terminated"),
    }
}
