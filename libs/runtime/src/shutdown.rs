use anyhow::Result;

/// Resolve once the process is asked to stop (Ctrl+C / SIGTERM).
pub async fn wait_for_shutdown() -> Result<()> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigterm = signal(SignalKind::terminate())?;
        let mut sigint = signal(SignalKind::interrupt())?;
        tokio::select! {
            _ = sigterm.recv() => {},
            _ = sigint.recv()  => {},
            _ = tokio::signal::ctrl_c() => {},
        }
        Ok(())
    }

    #[cfg(windows)]
    {
        use tokio::signal::windows::{ctrl_break, ctrl_c, ctrl_close, ctrl_shutdown};

        let mut c = ctrl_c()?;
        let mut br = ctrl_break()?;
        let mut cl = ctrl_close()?;
        let mut sh = ctrl_shutdown()?;
        tokio::select! {
            _ = c.recv()  => {},
            _ = br.recv() => {},
            _ = cl.recv() => {},
            _ = sh.recv() => {},
        }
        Ok(())
    }
}
