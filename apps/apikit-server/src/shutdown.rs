use anyhow::Result;
use tokio_util::sync::CancellationToken;

/// Resolve on SIGTERM/SIGINT (Unix) or Ctrl+C.
pub async fn wait_for_shutdown() -> Result<()> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigterm = signal(SignalKind::terminate())?;
        let mut sigint = signal(SignalKind::interrupt())?;
        tokio::select! {
            _ = sigterm.recv() => {},
            _ = sigint.recv() => {},
        }
        Ok(())
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await?;
        Ok(())
    }
}

/// Cancel `token` once a shutdown signal arrives.
pub fn cancel_on_signal(token: CancellationToken) {
    tokio::spawn(async move {
        if let Err(e) = wait_for_shutdown().await {
            tracing::warn!(error = %e, "signal handler failed; falling back to ctrl_c()");
            let _ = tokio::signal::ctrl_c().await;
        }
        tracing::info!("shutdown: signal received");
        token.cancel();
    });
}
