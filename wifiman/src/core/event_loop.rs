//! Supplicant event loop.
//!
//! Drains the controller's event stream for the lifetime of the manager and
//! republishes the events that carry a connection state:
//!
//! - `CTRL-EVENT-DISCONNECTED` → `disconnected`
//! - `CTRL-EVENT-CONNECTED` → `connected`
//! - `CTRL-EVENT-SSID-TEMP-DISABLED` → `invalid_key`
//!
//! Everything else is logged and dropped. When the loop stops, the
//! broadcaster is closed so anyone still waiting for a state sees the end.

use futures::{FutureExt, StreamExt, select};
use log::{debug, info, warn};
use std::pin::pin;
use tokio_util::sync::CancellationToken;

use crate::api::models::ConnectionState;
use crate::controller::EventStream;
use crate::core::broadcaster::StateBroadcaster;

/// Runs until the event stream ends or `cancel` fires.
///
/// Cancellation is also observed while a publish is blocked on a full
/// subscriber queue.
pub(crate) async fn run_event_loop(
    mut events: EventStream,
    broadcaster: StateBroadcaster,
    cancel: CancellationToken,
) {
    let mut cancelled = pin!(cancel.cancelled().fuse());

    loop {
        let event = select! {
            _ = cancelled => {
                debug!("Event loop cancelled");
                break;
            }
            event_opt = events.next().fuse() => match event_opt {
                Some(event) => event,
                None => {
                    warn!("Controller event stream ended, stopping event loop");
                    break;
                }
            },
        };

        info!("Controller event: {event}");
        let Some(state) = ConnectionState::from_event(&event) else {
            debug!("Ignoring event {}", event.name);
            continue;
        };

        select! {
            _ = cancelled => {
                debug!("Event loop cancelled while publishing {state}");
                break;
            }
            _ = broadcaster.publish(state).fuse() => {}
        }
    }

    broadcaster.close();
}
