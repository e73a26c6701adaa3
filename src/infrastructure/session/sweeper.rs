//! Background task that deletes expired refresh sessions

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info};

use super::service::SessionPurger;

/// Spawn the sweeper
///
/// Runs `purge_expired` every `interval` until `shutdown` flips to `true` or its
/// sender is dropped. Failures are logged and the next tick retries.
pub fn spawn_session_sweeper(
    purger: Arc<dyn SessionPurger>,
    interval: Duration,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(interval_secs = interval.as_secs(), "Session sweeper started");

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    match purger.purge_expired().await {
                        Ok(0) => {}
                        Ok(purged) => {
                            debug!(purged, "Purged expired refresh sessions");
                            metrics::counter!("sessions_purged_total").increment(purged);
                        }
                        Err(e) => error!(error = %e, "Failed to purge expired refresh sessions"),
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        info!("Session sweeper stopped");
    })
}
