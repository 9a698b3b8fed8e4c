//! Idle Session Sweep
//!
//! Background task that periodically closes sessions nobody has used for a
//! while, so abandoned sessions do not accumulate for the life of the process.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::session::SessionRegistry;

/// Spawns a background task that closes idle sessions.
///
/// The task sleeps for `interval` between sweeps and runs until aborted.
///
/// # Arguments
/// * `sessions` - Registry to sweep
/// * `idle_timeout` - Sessions unused for this long are closed
/// * `interval` - Time between sweeps
///
/// # Returns
/// A JoinHandle for the spawned task, to abort it during graceful shutdown.
pub fn spawn_session_sweeper(
    sessions: Arc<SessionRegistry>,
    idle_timeout: Duration,
    interval: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(
            "Starting session sweeper: idle timeout {:?}, interval {:?}",
            idle_timeout, interval
        );

        loop {
            tokio::time::sleep(interval).await;

            let closed = sessions.sweep_idle(idle_timeout).await;
            if closed > 0 {
                info!("Session sweep: closed {} idle sessions", closed);
            } else {
                debug!("Session sweep: no idle sessions");
            }
        }
    })
}
