//! Core internal logic for connection-state management.
//!
//! This module contains the internal implementation details for the state
//! broadcaster, the supplicant event loop, the credential workflow and
//! network profile management.

pub(crate) mod ack_gate;
pub(crate) mod broadcaster;
pub(crate) mod credentials;
pub(crate) mod event_loop;
pub(crate) mod interfaces_file;
pub(crate) mod network_store;
