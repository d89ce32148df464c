//! Applying credentials and waiting for the outcome.
//!
//! The flow:
//! 1. Validate the credentials and mark an acknowledgment as pending
//! 2. Write the interface definition for the managed interface
//! 3. Subscribe to state changes before touching the supplicant
//! 4. Add, select and save a WPA-PSK profile for the new network
//! 5. Reload the supplicant configuration to force a fresh attempt
//! 6. Wait for `connected` or `invalid_key`; `disconnected` is not terminal
//!
//! Anything other than a successful connection clears the pending
//! acknowledgment, since there is nothing for the other side to confirm.
//! This includes the caller dropping the future half way.

use futures::{FutureExt, future, select};
use futures_timer::Delay;
use log::{debug, info, warn};
use std::pin::pin;
use std::time::Duration;

use crate::Result;
use crate::api::models::{ConnectionError, ConnectionState, Credentials, ManagerConfig};
use crate::controller::Controller;
use crate::core::ack_gate::AckGate;
use crate::core::broadcaster::{StateBroadcaster, Subscriber, SubscriberId};
use crate::core::interfaces_file::write_interfaces_file;
use crate::core::network_store::add_standard_network;

/// Undoes the bookkeeping of an attempt when it goes out of scope.
///
/// Unsubscribes the private subscription and clears the pending
/// acknowledgment unless the attempt connected.
struct Attempt<'a> {
    broadcaster: &'a StateBroadcaster,
    ack: &'a AckGate,
    subscription: Option<SubscriberId>,
    connected: bool,
}

impl<'a> Attempt<'a> {
    fn start(broadcaster: &'a StateBroadcaster, ack: &'a AckGate) -> Self {
        ack.arm();
        Self {
            broadcaster,
            ack,
            subscription: None,
            connected: false,
        }
    }

    fn subscribe(&mut self) -> Subscriber {
        let states = self.broadcaster.subscribe();
        self.subscription = Some(states.id());
        states
    }
}

impl Drop for Attempt<'_> {
    fn drop(&mut self) {
        if let Some(id) = self.subscription.take() {
            self.broadcaster.unsubscribe(id);
        }
        if !self.connected {
            self.ack.disarm();
        }
    }
}

/// Applies `creds` and waits for a terminal state.
///
/// Returns `Ok(true)` once connected and `Ok(false)` if the key was
/// rejected. The caller must make sure no other credential change runs
/// concurrently against the same gate and controller.
pub(crate) async fn set_credentials(
    ctl: &dyn Controller,
    broadcaster: &StateBroadcaster,
    ack: &AckGate,
    config: &ManagerConfig,
    creds: &Credentials,
) -> Result<bool> {
    creds.validate()?;
    info!(
        "Setting credentials. ssid: {} - key length: {}",
        creds.ssid,
        creds.key.len()
    );

    let mut attempt = Attempt::start(broadcaster, ack);

    if let Some(path) = &config.interfaces_file {
        write_interfaces_file(path, &config.interface).await?;
    }

    let mut states = attempt.subscribe();
    let outcome = apply_and_wait(ctl, &mut states, config.credential_timeout, creds).await;
    attempt.connected = matches!(outcome, Ok(true));
    debug!("Credential change for '{}' finished: {outcome:?}", creds.ssid);

    outcome
}

async fn apply_and_wait(
    ctl: &dyn Controller,
    states: &mut Subscriber,
    timeout: Option<Duration>,
    creds: &Credentials,
) -> Result<bool> {
    add_standard_network(ctl, &creds.ssid, &creds.key).await?;
    ctl.reload_configuration().await?;
    debug!("Supplicant configuration reloaded, waiting for outcome");

    wait_for_outcome(states, timeout).await
}

/// Waits on `states` for a terminal state.
///
/// With no timeout this waits for as long as the stream stays open.
pub(crate) async fn wait_for_outcome(
    states: &mut Subscriber,
    timeout: Option<Duration>,
) -> Result<bool> {
    let deadline = async {
        match timeout {
            Some(t) => Delay::new(t).await,
            None => future::pending::<()>().await,
        }
    };
    let mut deadline = pin!(deadline.fuse());

    loop {
        select! {
            _ = deadline => {
                warn!("No connection outcome after {timeout:?}");
                return Err(ConnectionError::Timeout);
            }
            state_opt = states.recv().fuse() => {
                match state_opt {
                    Some(ConnectionState::Connected) => {
                        info!("Network state: connected");
                        return Ok(true);
                    }
                    Some(ConnectionState::InvalidKey) => {
                        info!("Network state: invalid_key");
                        return Ok(false);
                    }
                    Some(state) => {
                        debug!("Network state: {state}, still waiting");
                    }
                    None => {
                        return Err(ConnectionError::EventStreamClosed);
                    }
                }
            }
        }
    }
}
