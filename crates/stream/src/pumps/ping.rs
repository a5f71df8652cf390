//! Ping pump: keepalive pings on a fixed period.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tokio_tungstenite::tungstenite;
use tokio_util::sync::CancellationToken;

/// Pings the server every `period`. A paused session produces no results,
/// so these pongs are what keeps the read deadline from expiring.
///
/// Ticks missed while the write channel was full are skipped, not bunched.
pub(crate) async fn ping_pump(
    write_tx: mpsc::Sender<tungstenite::Message>,
    period: Duration,
    cancel: CancellationToken,
) {
    let mut ticks = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
    ticks.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let mut sent: u64 = 0;
    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = ticks.tick() => {
                if write_tx.send(tungstenite::Message::Ping(Vec::new().into())).await.is_err() {
                    break;
                }
                sent += 1;
            }
        }
    }
    tracing::trace!(sent, "ping pump stopped");
}
