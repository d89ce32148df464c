//! A Rust library for managing a wpa_supplicant controlled Wi-Fi interface.
//!
//! This crate tracks the connection state of a single wireless interface on
//! an embedded device and applies new credentials to it:
//!
//! - Broadcasting connection state changes to any number of subscribers
//! - Applying credentials and waiting for the supplicant's verdict
//! - Gating follow-up work on an external acknowledgment
//! - Listing, disabling and adding network profiles
//!
//! # Example
//!
//! ```ignore
//! use wifiman::{Credentials, WifiManager};
//!
//! # async fn example(ctl: impl wifiman::Controller) -> wifiman::Result<()> {
//! let manager = WifiManager::new(ctl)?;
//!
//! if !manager.is_any_network_enabled().await? {
//!     let connected = manager
//!         .set_credentials(&Credentials::new("Home", "secretpw"))
//!         .await?;
//!     println!("connected: {connected}");
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Controller
//!
//! The supplicant control protocol itself lives behind the [`Controller`]
//! trait. The manager takes ownership of a controller, drains its event
//! stream on a background task and issues every network operation through
//! it.
//!
//! # Error Handling
//!
//! All fallible operations return `Result<T, ConnectionError>`. The error
//! type distinguishes controller failures, profile setup failures, a
//! credential change that is already running and a missing outcome.
//!
//! # Logging
//!
//! This crate uses the [`log`](https://docs.rs/log) facade for logging. To see
//! log output, add a logging implementation like `env_logger`. For example:
//!
//! ```no_run,ignore
//! env_logger::init();
//! // ...
//! ```

// Internal implementation modules
mod core;
mod types;

// Public API modules
pub mod api;
pub mod controller;

// Re-exported public API
pub use api::models::{
    ConnectionError, ConnectionState, ControllerEvent, Credentials, ManagerConfig, NetworkId,
    NetworkProfile,
};
pub use api::wifi_manager::WifiManager;
pub use controller::{Controller, EventStream};
pub use crate::core::broadcaster::{StateBroadcaster, Subscriber, SubscriberId};

/// A specialized `Result` type for manager operations.
pub type Result<T> = std::result::Result<T, ConnectionError>;
