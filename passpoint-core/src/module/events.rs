///! Event types and the single-consumer event loop
use crate::mac::MacAddress;
use crate::module::anqp::AnqpElements;
use crate::module::manager::PasspointManager;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// WNM (wireless network management) notifications relayed from a connected
/// AP.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WnmNotice {
    /// The AP will deauthenticate us shortly; `ess` scopes the blackout to
    /// the whole ESS rather than the single BSS.
    DeauthImminent {
        bssid: MacAddress,
        ess: bool,
        delay_secs: u32,
        url: String,
    },
    /// The operator wants the subscription remediated at `url`.
    SubscriptionRemediation {
        bssid: MacAddress,
        server_method: u8,
        url: String,
    },
}

/// Everything the manager ingests asynchronously. Producers live on other
/// tasks; the manager itself is driven from exactly one loop.
#[derive(Debug, Clone)]
pub enum PasspointEvent {
    /// ANQP query outcome for an AP. `None` means the query failed.
    AnqpResponse {
        bssid: MacAddress,
        elements: Option<AnqpElements>,
    },
    /// Icon file download outcome. `None` means the download failed.
    IconResponse {
        bssid: MacAddress,
        file_name: String,
        data: Option<Vec<u8>>,
    },
    WnmNotice(WnmNotice),
    /// Periodic tick evicting expired ANQP cache entries.
    SweepCache,
}

pub fn event_channel() -> (
    mpsc::UnboundedSender<PasspointEvent>,
    mpsc::UnboundedReceiver<PasspointEvent>,
) {
    mpsc::unbounded_channel()
}

/// Drain events into the manager until every sender is dropped.
pub async fn run_event_loop(
    manager: &mut PasspointManager,
    rx: &mut mpsc::UnboundedReceiver<PasspointEvent>,
) {
    while let Some(event) = rx.recv().await {
        manager.handle_event(event);
    }
    tracing::info!("Passpoint event channel closed, stopping event loop");
}

/// Spawn the periodic cache sweep ticker. The task ends on its own once the
/// receiving side of the channel is gone.
pub fn start_cache_sweep_task(
    tx: mpsc::UnboundedSender<PasspointEvent>,
    interval: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        // The first tick fires immediately; skip it so a fresh cache is not
        // swept at startup.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            if tx.send(PasspointEvent::SweepCache).is_err() {
                tracing::info!("Event receiver dropped, stopping cache sweep task");
                break;
            }
        }
    })
}
