use std::future::Future;

use anyhow::Result;
use tokio::signal::unix;

pub const TERMINATION_SIGNALS: [libc::c_int; 3] = [libc::SIGINT, libc::SIGTERM, libc::SIGQUIT];

/// Drives `f` until it completes or a termination signal arrives.
pub async fn run_or_terminate<F>(f: F) -> Result<()>
where
    F: Future<Output = Result<()>> + Send + 'static,
{
    let task = tokio::spawn(f);
    let stop = any_signal(TERMINATION_SIGNALS);
    tokio::select! {
        res = task => res?,
        // A closed receiver means no signal could be subscribed on.
        Ok(signal) = stop => {
            tracing::info!(?signal, "received termination signal");
            Ok(())
        }
    }
}

pub fn any_signal<I, T>(signals: I) -> tokio::sync::oneshot::Receiver<unix::SignalKind>
where
    I: IntoIterator<Item = T>,
    T: Into<unix::SignalKind> + Send + 'static,
{
    let (tx, rx) = tokio::sync::oneshot::channel();

    let listeners = signals
        .into_iter()
        .map(|signal| {
            let signal = signal.into();
            unix::signal(signal).map(|mut stream| {
                Box::pin(async move {
                    stream.recv().await;
                    signal
                })
            })
        })
        .collect::<std::io::Result<Vec<_>>>();

    match listeners {
        Ok(listeners) if !listeners.is_empty() => {
            tokio::spawn(async move {
                let (signal, ..) = futures_util::future::select_all(listeners).await;
                tx.send(signal).ok();
            });
        }
        Ok(_) => {}
        Err(e) => tracing::error!("failed subscribing on unix signals: {e}"),
    }

    rx
}
