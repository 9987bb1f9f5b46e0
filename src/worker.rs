//! Sync worker: pushes changed key colors to the device
//!
//! HID writes to the keypad are slow enough to stall a render loop, so they
//! run on a dedicated thread. The worker sleeps on the shared condition
//! variable until `update()` publishes a change, writes only the keys whose
//! color differs from what was last sent, and exits when a stop is
//! requested.

use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use simpad_transport::BoxedTransport;
use tracing::{debug, trace, warn};

use crate::color::LinearColor;
use crate::encoder;
use crate::error::LedError;
use crate::state::SyncState;

/// Spawn the worker thread, handing it ownership of the transport
pub fn spawn(
    transport: BoxedTransport,
    state: Arc<SyncState>,
    retry_interval: Duration,
) -> Result<JoinHandle<()>, LedError> {
    let handle = std::thread::Builder::new()
        .name("simpad-led-sync".into())
        .spawn(move || run_sync_loop(transport, state, retry_interval))?;
    Ok(handle)
}

/// Worker main loop; returns (dropping the transport) once stopped
pub fn run_sync_loop(
    mut transport: BoxedTransport,
    state: Arc<SyncState>,
    retry_interval: Duration,
) {
    debug!(
        "LED sync worker started for {}",
        transport.device_info().path
    );

    let mut retry = None;
    while let Some(pending) = state.wait_for_changes(retry) {
        retry = if sync_pass(&mut transport, &state, &pending) {
            None
        } else {
            Some(retry_interval)
        };
    }

    debug!("LED sync worker stopped");
}

/// Write each pending key color once
///
/// Returns false if any write failed. Failed keys keep their old
/// `last_sent` value so the next pass retries them.
pub fn sync_pass(
    transport: &mut BoxedTransport,
    state: &SyncState,
    pending: &[(usize, LinearColor)],
) -> bool {
    let mut all_ok = true;

    for &(key, color) in pending {
        let Some(report) = encoder::encode_report(key, color) else {
            warn!("Key {} has no LED number, skipping", key);
            continue;
        };
        match transport.write_report(&report) {
            Ok(_) => {
                trace!("Key {} -> {:?}", key, color);
                state.mark_sent(key, color);
            }
            Err(source) => {
                warn!("{}", LedError::WriteFailed { key, source });
                all_ok = false;
            }
        }
    }

    all_ok
}
