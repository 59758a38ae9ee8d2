use log::*;
use sms_broker_engine::session::SessionStore;
use tokio::task::JoinHandle;

/// Starts the idle session sweeper. Do not await the returned JoinHandle, as it will run indefinitely.
///
/// Expired sessions are already invisible to the dialog; the sweep only reclaims their memory.
pub fn start_session_sweeper(sessions: SessionStore, period: std::time::Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut timer = tokio::time::interval(period);
        info!("🕰️ Idle session sweeper started. Sessions expire after {} minutes", sessions.idle_timeout().num_minutes());
        loop {
            timer.tick().await;
            let evicted = sessions.evict_idle();
            if evicted > 0 {
                debug!("🕰️ Evicted {evicted} idle sessions. {} remain", sessions.len());
            } else {
                trace!("🕰️ No idle sessions to evict");
            }
        }
    })
}
