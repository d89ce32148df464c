//! Constants for wpa_supplicant control interface values.
//!
//! These constants correspond to the event names and network setting keys
//! used by wpa_supplicant's control protocol, plus the defaults the manager
//! falls back to when no configuration is given.

/// Control interface event names.
pub mod events {
    pub const DISCONNECTED: &str = "CTRL-EVENT-DISCONNECTED";
    pub const CONNECTED: &str = "CTRL-EVENT-CONNECTED";
    pub const SSID_TEMP_DISABLED: &str = "CTRL-EVENT-SSID-TEMP-DISABLED";
    // pub const SCAN_RESULTS: &str = "CTRL-EVENT-SCAN-RESULTS";
    // pub const TERMINATING: &str = "CTRL-EVENT-TERMINATING";
}

/// Per-network setting keys.
pub mod settings {
    pub const SSID: &str = "ssid";
    pub const PSK: &str = "psk";
    pub const KEY_MGMT: &str = "key_mgmt";
    pub const SCAN_SSID: &str = "scan_ssid";
    pub const DISABLED: &str = "disabled";
}

/// Raw setting values written by the manager.
pub mod values {
    /// Value of the `disabled` setting for a disabled network.
    pub const DISABLED: &str = "1";
    pub const SCAN_SSID_ENABLED: &str = "1";
    pub const KEY_MGMT_WPA_PSK: &str = "WPA-PSK";
}

/// Defaults used by [`ManagerConfig`](crate::ManagerConfig).
pub mod defaults {
    use std::time::Duration;

    /// Managed wireless interface.
    pub const INTERFACE: &str = "wlan0";

    /// Directory holding per-interface definitions for ifupdown.
    pub const INTERFACES_DIR: &str = "/etc/network/interfaces.d";

    /// Supplicant configuration referenced from the interface definition.
    pub const WPA_SUPPLICANT_CONF: &str = "/etc/wpa_supplicant/wpa_supplicant.conf";

    /// Slots in each subscriber's delivery queue.
    pub const SUBSCRIBER_CAPACITY: usize = 128;

    /// Maximum time to wait for a terminal state after applying credentials (60 seconds).
    const CREDENTIAL_TIMEOUT_SECS: u64 = 60;

    /// Returns the credential outcome timeout.
    pub fn credential_timeout() -> Duration {
        Duration::from_secs(CREDENTIAL_TIMEOUT_SECS)
    }
}
