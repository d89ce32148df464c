use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Display, Formatter};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

use crate::types::constants::{defaults, events};

/// Connection state of the managed wireless interface.
///
/// Represents the most recently observed outcome, not a history. The
/// textual form (`Display`, `FromStr` and serde) is the wire form sent to
/// subscribers: `disconnected`, `connected` or `invalid_key`.
///
/// # Example
///
/// ```rust
/// use wifiman::ConnectionState;
///
/// let state: ConnectionState = "invalid_key".parse().unwrap();
/// assert_eq!(state, ConnectionState::InvalidKey);
/// assert!(state.is_terminal());
/// assert_eq!(state.to_string(), "invalid_key");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionState {
    /// The interface lost (or has not yet gained) its association.
    Disconnected,
    /// The interface is associated and authenticated.
    Connected,
    /// The supplicant temporarily disabled the network, usually because
    /// the pre-shared key was rejected.
    InvalidKey,
}

impl ConnectionState {
    /// Maps a supplicant event to the state it signals.
    ///
    /// Returns `None` for events that carry no connection state.
    pub fn from_event(event: &ControllerEvent) -> Option<Self> {
        match event.name.as_str() {
            events::DISCONNECTED => Some(Self::Disconnected),
            events::CONNECTED => Some(Self::Connected),
            events::SSID_TEMP_DISABLED => Some(Self::InvalidKey),
            _ => None,
        }
    }

    /// Returns true if this state ends a credential workflow's wait.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Connected | Self::InvalidKey)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Disconnected => "disconnected",
            Self::Connected => "connected",
            Self::InvalidKey => "invalid_key",
        }
    }
}

impl Display for ConnectionState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConnectionState {
    type Err = ConnectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "disconnected" => Ok(Self::Disconnected),
            "connected" => Ok(Self::Connected),
            "invalid_key" => Ok(Self::InvalidKey),
            other => Err(ConnectionError::UnknownState(other.to_string())),
        }
    }
}

/// An asynchronous event emitted by the supplicant.
///
/// `name` is the event identifier (e.g. `CTRL-EVENT-CONNECTED`), `args`
/// holds whatever followed it on the event line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerEvent {
    pub name: String,
    pub args: String,
}

impl ControllerEvent {
    /// Creates an event with no arguments.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: String::new(),
        }
    }

    /// Parses a raw control interface event line.
    ///
    /// Unsolicited messages look like
    /// `<3>CTRL-EVENT-CONNECTED - Connection to 00:11:22:33:44:55 completed`.
    /// The leading `<N>` priority marker is optional. Returns `None` for
    /// blank lines.
    pub fn parse(line: &str) -> Option<Self> {
        let mut rest = line.trim();
        if rest.starts_with('<') {
            if let Some(end) = rest.find('>') {
                rest = &rest[end + 1..];
            }
        }

        let mut parts = rest.splitn(2, char::is_whitespace);
        let name = parts.next().filter(|n| !n.is_empty())?;
        let args = parts.next().unwrap_or("").trim();

        Some(Self {
            name: name.to_string(),
            args: args.to_string(),
        })
    }
}

impl Display for ControllerEvent {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.args.is_empty() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{} {}", self.name, self.args)
        }
    }
}

/// Supplicant-assigned network profile id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NetworkId(pub u32);

impl Display for NetworkId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for NetworkId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

/// A configured network profile as listed by the supplicant.
///
/// Profiles are owned by the controller. The manager never caches them:
/// every query re-reads the live list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkProfile {
    /// Profile id used for all per-network operations
    pub id: NetworkId,
    /// SSID as reported in the network list
    pub ssid: String,
    /// BSSID restriction, `any` when unrestricted
    pub bssid: String,
    /// Flags column, e.g. `[CURRENT]` or `[DISABLED]`
    pub flags: String,
}

/// Credentials for the network the device should join.
///
/// An empty `key` describes an open network. Whether that is acceptable is
/// the caller's policy; the manager does not validate it.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub ssid: String,
    pub key: String,
}

impl Credentials {
    pub fn new(ssid: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            ssid: ssid.into(),
            key: key.into(),
        }
    }

    /// Rejects credentials that could never produce a usable profile.
    pub fn validate(&self) -> crate::Result<()> {
        if self.ssid.is_empty() {
            return Err(ConnectionError::InvalidSsid);
        }
        Ok(())
    }
}

impl Debug for Credentials {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("ssid", &self.ssid)
            .field("key_len", &self.key.len())
            .finish()
    }
}

/// Manager configuration.
///
/// # Examples
///
/// ```rust
/// use std::time::Duration;
/// use wifiman::ManagerConfig;
///
/// // Defaults: wlan0, /etc/network/interfaces.d/wlan0, 128 slots, 60s
/// let config = ManagerConfig::default();
/// assert_eq!(config.interface, "wlan0");
///
/// // Slow access points get a longer window
/// let config = ManagerConfig::new()
///     .with_credential_timeout(Duration::from_secs(120))
///     .with_subscriber_capacity(16);
/// assert_eq!(config.credential_timeout, Some(Duration::from_secs(120)));
/// ```
#[derive(Debug, Clone)]
pub struct ManagerConfig {
    /// Name of the managed wireless interface.
    pub interface: String,
    /// Where the interface definition is written before each credential
    /// change. `None` skips the write.
    pub interfaces_file: Option<PathBuf>,
    /// Slots in each subscriber's delivery queue.
    pub subscriber_capacity: usize,
    /// How long a credential change waits for a terminal state.
    /// `None` waits until one arrives.
    pub credential_timeout: Option<Duration>,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            interface: defaults::INTERFACE.to_string(),
            interfaces_file: Some(Path::new(defaults::INTERFACES_DIR).join(defaults::INTERFACE)),
            subscriber_capacity: defaults::SUBSCRIBER_CAPACITY,
            credential_timeout: Some(defaults::credential_timeout()),
        }
    }
}

impl ManagerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Manages `interface` and points the interface definition at
    /// `/etc/network/interfaces.d/<interface>`.
    #[must_use]
    pub fn with_interface(mut self, interface: impl Into<String>) -> Self {
        let interface = interface.into();
        self.interfaces_file = Some(Path::new(defaults::INTERFACES_DIR).join(&interface));
        self.interface = interface;
        self
    }

    #[must_use]
    pub fn with_interfaces_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.interfaces_file = Some(path.into());
        self
    }

    /// Skips writing the interface definition.
    #[must_use]
    pub fn without_interfaces_file(mut self) -> Self {
        self.interfaces_file = None;
        self
    }

    /// Sets the subscriber queue capacity. Zero is bumped to one.
    #[must_use]
    pub fn with_subscriber_capacity(mut self, capacity: usize) -> Self {
        self.subscriber_capacity = capacity.max(1);
        self
    }

    #[must_use]
    pub fn with_credential_timeout(mut self, timeout: Duration) -> Self {
        self.credential_timeout = Some(timeout);
        self
    }

    /// Waits for a terminal state without a deadline.
    ///
    /// If the supplicant never reports one, `set_credentials` never returns.
    #[must_use]
    pub fn without_credential_timeout(mut self) -> Self {
        self.credential_timeout = None;
        self
    }
}

/// Errors that can occur during manager operations.
///
/// # Example
///
/// ```rust
/// use wifiman::{ConnectionError, Credentials};
///
/// let creds = Credentials::new("", "secret");
/// match creds.validate() {
///     Err(ConnectionError::InvalidSsid) => {}
///     other => panic!("unexpected: {other:?}"),
/// }
/// ```
#[derive(Debug, Error)]
pub enum ConnectionError {
    /// The controller rejected or failed a request.
    #[error("controller error: {0}")]
    Controller(String),

    /// The controller's event stream was already taken or is unavailable.
    #[error("controller event stream unavailable")]
    NoEventStream,

    /// The controller's event stream ended, or the manager was cleaned up,
    /// while waiting for a state.
    #[error("controller event stream closed")]
    EventStreamClosed,

    /// The SSID is empty.
    #[error("SSID must not be empty")]
    InvalidSsid,

    /// One or more settings could not be written to a new profile.
    #[error("failed to configure network {id}: {settings}")]
    ProfileSetup { id: NetworkId, settings: String },

    /// Another credential change is already in flight.
    #[error("a credential change is already in progress")]
    WorkflowInProgress,

    /// No terminal state arrived before the credential timeout.
    #[error("no connection outcome before timeout")]
    Timeout,

    /// A state string that is not one of the known states.
    #[error("unknown connection state: {0}")]
    UnknownState(String),

    /// Writing the interface definition failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
