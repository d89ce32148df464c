//! Interface definition for the managed wireless interface.
//!
//! ifupdown only brings the interface up under wpa_supplicant's roaming
//! mode when a definition exists for it. The definition is rewritten before
//! every credential change so a missing or stale file never blocks the
//! reload.

use log::debug;
use std::path::Path;

use crate::Result;
use crate::types::constants::defaults;

/// Renders the interface definition for `interface`.
pub(crate) fn render_interfaces_file(interface: &str) -> String {
    format!(
        "allow-hotplug {interface}\n\
         iface {interface} inet manual\n\
         wpa-roam {conf}\n\
         \n\
         iface default inet dhcp\n",
        conf = defaults::WPA_SUPPLICANT_CONF,
    )
}

/// Writes the interface definition to `path`, replacing any existing file.
pub(crate) async fn write_interfaces_file(path: &Path, interface: &str) -> Result<()> {
    tokio::fs::write(path, render_interfaces_file(interface)).await?;
    debug!("Wrote interface definition for {interface} to {}", path.display());
    Ok(())
}
