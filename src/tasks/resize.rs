use anyhow::{Context, Result};
use tokio::select;
use tokio::sync::mpsc::{Receiver, Sender};
use tokio::time::{Instant, sleep};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::events::ResizeRequest;
use crate::resize::{ResizeMonitor, ResizeOptions, Size};

/// Turns image-area measurements into debounced resize requests.
///
/// Rules:
/// - Each measurement is fed to a [`ResizeMonitor`].
/// - If another pass is needed, a request goes out after the cooling period.
/// - A newer measurement replaces any pending timer; the latest verdict wins.
/// - When the measurement stream ends, a pending request is still delivered
///   once its cooling period is over.
pub async fn run(
    mut measurements: Receiver<Size>,
    requests: Sender<ResizeRequest>,
    options: ResizeOptions,
    cancel: CancellationToken,
) -> Result<()> {
    let mut monitor = ResizeMonitor::new(options);
    let cooldown = sleep(options.cooling_period);
    tokio::pin!(cooldown);
    let mut armed = false;

    loop {
        select! {
            _ = cancel.cancelled() => break,

            received = measurements.recv() => {
                let Some(size) = received else {
                    // No more measurements, but a pass is still owed.
                    if armed {
                        select! {
                            _ = cancel.cancelled() => {}
                            () = &mut cooldown => request_resize(&requests).await?,
                        }
                    }
                    break;
                };
                armed = monitor.record(size);
                if armed {
                    cooldown.as_mut().reset(Instant::now() + options.cooling_period);
                }
            }

            () = &mut cooldown, if armed => {
                armed = false;
                request_resize(&requests).await?;
            }
        }
    }
    Ok(())
}

async fn request_resize(requests: &Sender<ResizeRequest>) -> Result<()> {
    debug!("layout not settled; requesting another resize");
    requests
        .send(ResizeRequest)
        .await
        .context("resize request receiver dropped")
}
