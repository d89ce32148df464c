//! Public API module.
//!
//! This module contains the high-level user-facing API for the `wifiman` crate.

pub mod models;
pub mod wifi_manager;
