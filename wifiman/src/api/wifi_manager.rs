use log::{debug, info};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio_util::sync::{CancellationToken, DropGuard};

use crate::Result;
use crate::api::models::{ConnectionError, Credentials, ManagerConfig, NetworkId, NetworkProfile};
use crate::controller::Controller;
use crate::core::ack_gate::AckGate;
use crate::core::broadcaster::{StateBroadcaster, Subscriber, SubscriberId};
use crate::core::credentials::set_credentials;
use crate::core::event_loop::run_event_loop;
use crate::core::network_store::{
    add_standard_network, disable_all_networks, is_any_network_enabled, list_configured_networks,
};

/// Connection-state manager for a single wpa_supplicant controlled interface.
///
/// This is the main entry point of the crate. It owns the supplicant
/// [`Controller`], runs the event loop that turns supplicant events into
/// [`ConnectionState`](crate::ConnectionState) changes, and applies new
/// credentials.
///
/// # Creating an Instance
///
/// ```ignore
/// use wifiman::WifiManager;
///
/// # async fn example(ctl: impl wifiman::Controller) -> wifiman::Result<()> {
/// let manager = WifiManager::new(ctl)?;
/// # Ok(())
/// # }
/// ```
///
/// # Examples
///
/// ## Watching State Changes
///
/// ```ignore
/// let mut states = manager.subscribe();
/// while let Some(state) = states.recv().await {
///     println!("wifi is now {state}");
/// }
/// ```
///
/// ## Applying Credentials
///
/// ```ignore
/// use wifiman::Credentials;
///
/// let connected = manager
///     .set_credentials(&Credentials::new("Home", "secretpw"))
///     .await?;
///
/// if connected {
///     // Tear the fallback access point down once the app confirms it
///     // received the new credentials.
///     manager.on_acknowledgment(|| stop_access_point());
/// }
/// ```
///
/// # Thread Safety
///
/// `WifiManager` is `Clone` and can be shared across tasks. Clones share the
/// controller, the subscriber set and the acknowledgment state. The event
/// loop stops when [`cleanup`](Self::cleanup) is called or the last clone is
/// dropped.
#[derive(Clone)]
pub struct WifiManager {
    controller: Arc<dyn Controller>,
    broadcaster: StateBroadcaster,
    ack: AckGate,
    workflow: Arc<Mutex<()>>,
    config: ManagerConfig,
    cancel: CancellationToken,
    _event_loop: Arc<DropGuard>,
}

impl WifiManager {
    /// Creates a manager with the default [`ManagerConfig`].
    ///
    /// Must be called from within a Tokio runtime; the event loop is spawned
    /// onto it.
    ///
    /// # Errors
    ///
    /// Returns `ConnectionError::NoEventStream` if the controller's event
    /// stream was already taken.
    pub fn new<C: Controller>(controller: C) -> Result<Self> {
        Self::with_config(controller, ManagerConfig::default())
    }

    /// Creates a manager with a custom configuration.
    pub fn with_config<C: Controller>(mut controller: C, config: ManagerConfig) -> Result<Self> {
        let events = controller
            .take_event_stream()
            .ok_or(ConnectionError::NoEventStream)?;

        let broadcaster = StateBroadcaster::new(config.subscriber_capacity);
        let cancel = CancellationToken::new();
        tokio::spawn(run_event_loop(events, broadcaster.clone(), cancel.clone()));
        info!("Managing wireless interface {}", config.interface);

        Ok(Self {
            controller: Arc::new(controller),
            broadcaster,
            ack: AckGate::new(),
            workflow: Arc::new(Mutex::new(())),
            _event_loop: Arc::new(cancel.clone().drop_guard()),
            cancel,
            config,
        })
    }

    /// Returns the configuration this manager was created with.
    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    /// Subscribes to connection state changes.
    ///
    /// Each subscriber has a bounded queue. A subscriber that stops reading
    /// eventually blocks state delivery for everyone, so unsubscribe (or drop)
    /// handles that are no longer read.
    pub fn subscribe(&self) -> Subscriber {
        self.broadcaster.subscribe()
    }

    /// Stops delivering states to a subscriber. Unknown ids are ignored.
    pub fn unsubscribe(&self, id: SubscriberId) {
        self.broadcaster.unsubscribe(id);
    }

    /// Applies new credentials and waits for the outcome.
    ///
    /// Writes the interface definition, adds and selects a WPA-PSK profile
    /// for the network, reloads the supplicant and waits for it to report
    /// `connected` (returns `true`) or `invalid_key` (returns `false`).
    /// An acknowledgment stays pending after a successful connection until
    /// [`acknowledge`](Self::acknowledge) is called.
    ///
    /// # Errors
    ///
    /// - `ConnectionError::WorkflowInProgress` if another call is in flight
    /// - `ConnectionError::InvalidSsid` for an empty SSID
    /// - `ConnectionError::Timeout` if no outcome arrives within
    ///   [`ManagerConfig::credential_timeout`]
    /// - `ConnectionError::EventStreamClosed` if the event loop stops first
    /// - `ConnectionError::ProfileSetup`, `Controller` or `Io` if the new
    ///   configuration could not be applied
    pub async fn set_credentials(&self, creds: &Credentials) -> Result<bool> {
        let _guard = self
            .workflow
            .try_lock()
            .map_err(|_| ConnectionError::WorkflowInProgress)?;

        set_credentials(
            self.controller.as_ref(),
            &self.broadcaster,
            &self.ack,
            &self.config,
            creds,
        )
        .await
    }

    /// Lists the configured network profiles.
    pub async fn list_configured_networks(&self) -> Result<Vec<NetworkProfile>> {
        list_configured_networks(self.controller.as_ref()).await
    }

    /// Returns true if at least one configured network is enabled.
    ///
    /// Settings that cannot be read count as enabled.
    pub async fn is_any_network_enabled(&self) -> Result<bool> {
        is_any_network_enabled(self.controller.as_ref()).await
    }

    /// Disables every configured network.
    ///
    /// Only a failure to list networks is reported; individual disable
    /// failures are logged.
    pub async fn disable_all_networks(&self) -> Result<()> {
        disable_all_networks(self.controller.as_ref()).await
    }

    /// Adds a WPA-PSK profile, selects it and saves the configuration.
    ///
    /// Does not reload the supplicant or wait for a connection; use
    /// [`set_credentials`](Self::set_credentials) for that.
    pub async fn add_standard_network(&self, ssid: &str, key: &str) -> Result<NetworkId> {
        add_standard_network(self.controller.as_ref(), ssid, key).await
    }

    /// Runs `callback` once the pending credentials are acknowledged, or
    /// immediately if no acknowledgment is pending.
    ///
    /// Only the most recently registered callback is kept.
    pub fn on_acknowledgment<F>(&self, callback: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.ack.on_acknowledgment(callback);
    }

    /// Confirms that the new credentials were received, running the
    /// registered callback. Does nothing if no acknowledgment is pending.
    pub fn acknowledge(&self) {
        self.ack.acknowledge();
    }

    /// Returns true while a credential change awaits acknowledgment.
    pub fn is_ack_pending(&self) -> bool {
        self.ack.is_pending()
    }

    /// Stops the event loop and releases the controller.
    ///
    /// Every subscription ends, and a credential change still waiting for
    /// an outcome fails with `ConnectionError::EventStreamClosed`.
    pub async fn cleanup(&self) -> Result<()> {
        debug!("Cleaning up wifi manager");
        self.cancel.cancel();
        self.controller.cleanup().await
    }
}
