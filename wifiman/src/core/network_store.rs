//! Configured network profile management.
//!
//! Provides functions for enumerating, disabling and adding network
//! profiles through the supplicant controller. Profiles live in the
//! supplicant; nothing here caches them.

use log::{debug, warn};

use crate::Result;
use crate::api::models::{ConnectionError, NetworkId, NetworkProfile};
use crate::controller::Controller;
use crate::types::constants::{settings, values};

/// Lists the configured network profiles.
pub(crate) async fn list_configured_networks(ctl: &dyn Controller) -> Result<Vec<NetworkProfile>> {
    ctl.list_networks().await
}

/// Checks whether at least one configured network is enabled.
///
/// A network counts as enabled unless its `disabled` setting reads `"1"`.
/// A setting that cannot be read counts as enabled. An empty list is
/// `false`.
pub(crate) async fn is_any_network_enabled(ctl: &dyn Controller) -> Result<bool> {
    let networks = ctl.list_networks().await?;

    for network in &networks {
        match ctl.get_network_setting(network.id, settings::DISABLED).await {
            Ok(disabled) if disabled == values::DISABLED => continue,
            Ok(_) => return Ok(true),
            Err(e) => {
                warn!(
                    "Failed to read '{}' for network {}, assuming enabled: {e}",
                    settings::DISABLED,
                    network.id
                );
                return Ok(true);
            }
        }
    }

    Ok(false)
}

/// Disables every configured network.
///
/// Fails only if the network list cannot be read. Per-network failures are
/// logged and skipped.
pub(crate) async fn disable_all_networks(ctl: &dyn Controller) -> Result<()> {
    let networks = ctl.list_networks().await?;

    for network in &networks {
        if let Err(e) = ctl.disable_network(network.id).await {
            warn!("Failed to disable network {} ('{}'): {e}", network.id, network.ssid);
        }
    }

    debug!("Disabled {} network(s)", networks.len());
    Ok(())
}

/// Adds a WPA-PSK profile for `ssid`, selects it and saves the configuration.
///
/// Every setting is attempted. If any write fails, the half-configured
/// profile is removed and [`ConnectionError::ProfileSetup`] names the
/// settings that failed.
pub(crate) async fn add_standard_network(
    ctl: &dyn Controller,
    ssid: &str,
    key: &str,
) -> Result<NetworkId> {
    let id = ctl.add_network().await?;
    debug!("Created network {id} for '{ssid}'");

    let results = [
        (
            settings::SSID,
            ctl.set_network_setting_string(id, settings::SSID, ssid).await,
        ),
        (
            settings::PSK,
            ctl.set_network_setting_string(id, settings::PSK, key).await,
        ),
        (
            settings::SCAN_SSID,
            ctl.set_network_setting_raw(id, settings::SCAN_SSID, values::SCAN_SSID_ENABLED)
                .await,
        ),
        (
            settings::KEY_MGMT,
            ctl.set_network_setting_raw(id, settings::KEY_MGMT, values::KEY_MGMT_WPA_PSK)
                .await,
        ),
    ];

    let mut failed = Vec::new();
    for (setting, result) in results {
        if let Err(e) = result {
            warn!("Failed to set '{setting}' on network {id}: {e}");
            failed.push(setting);
        }
    }

    if !failed.is_empty() {
        if let Err(e) = ctl.remove_network(id).await {
            warn!("Failed to remove half-configured network {id}: {e}");
        }
        return Err(ConnectionError::ProfileSetup {
            id,
            settings: failed.join(", "),
        });
    }

    ctl.select_network(id).await?;
    ctl.save_configuration().await?;
    debug!("Selected and saved network {id}");

    Ok(id)
}
