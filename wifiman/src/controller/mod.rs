//! Supplicant controller interface.
//!
//! The manager never speaks the wpa_supplicant control protocol itself. It
//! drives a [`Controller`] which wraps the control socket (or a fake in
//! tests) and exposes network CRUD, configuration persistence and the
//! stream of unsolicited events.
//!
//! # Events
//!
//! The controller hands out its event stream exactly once, when the
//! manager is constructed. The manager's event loop drains it for the rest
//! of its life:
//!
//! ```ignore
//! let mut events = controller.take_event_stream().ok_or(ConnectionError::NoEventStream)?;
//! while let Some(event) = events.next().await {
//!     println!("{}", event.name);
//! }
//! ```

use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::Result;
use crate::api::models::{ControllerEvent, NetworkId, NetworkProfile};

/// Stream of unsolicited supplicant events.
pub type EventStream = BoxStream<'static, ControllerEvent>;

/// Abstraction over the supplicant control interface.
///
/// Implementations map their transport failures into
/// [`ConnectionError::Controller`](crate::ConnectionError::Controller).
/// Delivery of events is assumed reliable and FIFO.
#[async_trait]
pub trait Controller: Send + Sync + 'static {
    /// Hands out the event stream. Returns `None` once it has been taken.
    fn take_event_stream(&mut self) -> Option<EventStream>;

    /// Lists the configured network profiles.
    async fn list_networks(&self) -> Result<Vec<NetworkProfile>>;

    /// Reads a single setting of a network profile.
    async fn get_network_setting(&self, id: NetworkId, key: &str) -> Result<String>;

    /// Writes a setting as a quoted string (`ssid`, `psk`).
    async fn set_network_setting_string(&self, id: NetworkId, key: &str, value: &str)
    -> Result<()>;

    /// Writes a setting verbatim (`key_mgmt`, `scan_ssid`).
    async fn set_network_setting_raw(&self, id: NetworkId, key: &str, value: &str) -> Result<()>;

    /// Creates an empty, disabled network profile.
    async fn add_network(&self) -> Result<NetworkId>;

    async fn remove_network(&self, id: NetworkId) -> Result<()>;

    /// Selects a network, enabling it and disabling every other one.
    async fn select_network(&self, id: NetworkId) -> Result<()>;

    async fn enable_network(&self, id: NetworkId) -> Result<()>;

    async fn disable_network(&self, id: NetworkId) -> Result<()>;

    /// Persists the running configuration to the supplicant's config file.
    async fn save_configuration(&self) -> Result<()>;

    /// Makes the supplicant re-read its configuration file, forcing a fresh
    /// connection attempt.
    async fn reload_configuration(&self) -> Result<()>;

    /// Releases the control connection.
    async fn cleanup(&self) -> Result<()>;
}
