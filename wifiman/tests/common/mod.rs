//! In-memory supplicant controller for integration tests.
//!
//! Mimics wpa_supplicant's network list semantics closely enough for the
//! manager: new networks start disabled, selecting a network enables it and
//! disables the rest, and `reload_configuration` replays a scripted list of
//! events.

#![allow(dead_code)]

use async_trait::async_trait;
use futures::StreamExt;
use futures::channel::mpsc;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use wifiman::{
    ConnectionError, Controller, ControllerEvent, EventStream, NetworkId, NetworkProfile, Result,
};

#[derive(Debug, Clone, Default)]
pub struct FakeNetwork {
    pub settings: HashMap<String, String>,
    pub disabled: bool,
}

#[derive(Debug, Default)]
pub struct FakeState {
    pub networks: BTreeMap<u32, FakeNetwork>,
    pub next_id: u32,
    pub selected: Option<NetworkId>,
    pub saves: usize,
    pub reloads: usize,
    pub cleaned_up: bool,
    /// Events sent on every reload.
    pub on_reload: Vec<&'static str>,
    pub fail_list: bool,
    pub fail_add: bool,
    pub fail_reads: bool,
    pub fail_settings: HashSet<String>,
    pub fail_disable: HashSet<u32>,
}

/// Test-side view of a [`FakeController`] after it was handed to a manager.
#[derive(Clone)]
pub struct FakeHandle {
    state: Arc<Mutex<FakeState>>,
    events: mpsc::UnboundedSender<ControllerEvent>,
}

impl FakeHandle {
    pub fn state(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap()
    }

    pub fn emit(&self, name: &str) {
        self.events
            .unbounded_send(ControllerEvent::new(name))
            .unwrap();
    }

    pub fn close_events(&self) {
        self.events.close_channel();
    }

    /// Adds a network directly, bypassing the manager.
    pub fn seed_network(&self, ssid: &str, disabled: bool) -> NetworkId {
        let mut state = self.state();
        let id = state.next_id;
        state.next_id += 1;
        let mut settings = HashMap::new();
        settings.insert("ssid".to_string(), ssid.to_string());
        state.networks.insert(id, FakeNetwork { settings, disabled });
        NetworkId(id)
    }

    pub fn setting(&self, id: NetworkId, key: &str) -> Option<String> {
        self.state()
            .networks
            .get(&id.0)
            .and_then(|n| n.settings.get(key).cloned())
    }

    /// Polls until `check` holds, panicking after a second.
    pub async fn wait_until(&self, check: impl Fn(&FakeState) -> bool) {
        for _ in 0..200 {
            if check(&*self.state()) {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("condition not reached: {:?}", self.state());
    }
}

pub struct FakeController {
    state: Arc<Mutex<FakeState>>,
    tx: mpsc::UnboundedSender<ControllerEvent>,
    rx: Option<mpsc::UnboundedReceiver<ControllerEvent>>,
}

impl FakeController {
    pub fn new() -> (Self, FakeHandle) {
        let (tx, rx) = mpsc::unbounded();
        let state = Arc::new(Mutex::new(FakeState::default()));
        let handle = FakeHandle {
            state: state.clone(),
            events: tx.clone(),
        };
        (
            Self {
                state,
                tx,
                rx: Some(rx),
            },
            handle,
        )
    }

    fn lock(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap()
    }

    fn network_mut<'a>(state: &'a mut FakeState, id: NetworkId) -> Result<&'a mut FakeNetwork> {
        state
            .networks
            .get_mut(&id.0)
            .ok_or_else(|| ConnectionError::Controller(format!("no network {id}")))
    }

    fn set_setting(&self, id: NetworkId, key: &str, value: &str) -> Result<()> {
        let mut state = self.lock();
        if state.fail_settings.contains(key) {
            return Err(ConnectionError::Controller(format!("SET_NETWORK {key} FAIL")));
        }
        Self::network_mut(&mut state, id)?
            .settings
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[async_trait]
impl Controller for FakeController {
    fn take_event_stream(&mut self) -> Option<EventStream> {
        self.rx.take().map(|rx| rx.boxed())
    }

    async fn list_networks(&self) -> Result<Vec<NetworkProfile>> {
        let state = self.lock();
        if state.fail_list {
            return Err(ConnectionError::Controller("LIST_NETWORKS FAIL".into()));
        }
        Ok(state
            .networks
            .iter()
            .map(|(id, net)| NetworkProfile {
                id: NetworkId(*id),
                ssid: net.settings.get("ssid").cloned().unwrap_or_default(),
                bssid: "any".into(),
                flags: if state.selected == Some(NetworkId(*id)) {
                    "[CURRENT]".into()
                } else if net.disabled {
                    "[DISABLED]".into()
                } else {
                    String::new()
                },
            })
            .collect())
    }

    async fn get_network_setting(&self, id: NetworkId, key: &str) -> Result<String> {
        let mut state = self.lock();
        if state.fail_reads {
            return Err(ConnectionError::Controller(format!("GET_NETWORK {key} FAIL")));
        }
        let net = Self::network_mut(&mut state, id)?;
        if key == "disabled" {
            return Ok(if net.disabled { "1" } else { "0" }.to_string());
        }
        net.settings
            .get(key)
            .cloned()
            .ok_or_else(|| ConnectionError::Controller(format!("GET_NETWORK {key} FAIL")))
    }

    async fn set_network_setting_string(
        &self,
        id: NetworkId,
        key: &str,
        value: &str,
    ) -> Result<()> {
        self.set_setting(id, key, value)
    }

    async fn set_network_setting_raw(&self, id: NetworkId, key: &str, value: &str) -> Result<()> {
        self.set_setting(id, key, value)
    }

    async fn add_network(&self) -> Result<NetworkId> {
        let mut state = self.lock();
        if state.fail_add {
            return Err(ConnectionError::Controller("ADD_NETWORK FAIL".into()));
        }
        let id = state.next_id;
        state.next_id += 1;
        state.networks.insert(
            id,
            FakeNetwork {
                settings: HashMap::new(),
                disabled: true,
            },
        );
        Ok(NetworkId(id))
    }

    async fn remove_network(&self, id: NetworkId) -> Result<()> {
        let mut state = self.lock();
        state
            .networks
            .remove(&id.0)
            .map(|_| ())
            .ok_or_else(|| ConnectionError::Controller(format!("no network {id}")))
    }

    async fn select_network(&self, id: NetworkId) -> Result<()> {
        let mut state = self.lock();
        Self::network_mut(&mut state, id)?;
        for (other, net) in state.networks.iter_mut() {
            net.disabled = *other != id.0;
        }
        state.selected = Some(id);
        Ok(())
    }

    async fn enable_network(&self, id: NetworkId) -> Result<()> {
        let mut state = self.lock();
        Self::network_mut(&mut state, id)?.disabled = false;
        Ok(())
    }

    async fn disable_network(&self, id: NetworkId) -> Result<()> {
        let mut state = self.lock();
        if state.fail_disable.contains(&id.0) {
            return Err(ConnectionError::Controller(format!("DISABLE_NETWORK {id} FAIL")));
        }
        Self::network_mut(&mut state, id)?.disabled = true;
        Ok(())
    }

    async fn save_configuration(&self) -> Result<()> {
        self.lock().saves += 1;
        Ok(())
    }

    async fn reload_configuration(&self) -> Result<()> {
        let script = {
            let mut state = self.lock();
            state.reloads += 1;
            state.on_reload.clone()
        };
        for name in script {
            self.tx
                .unbounded_send(ControllerEvent::new(name))
                .map_err(|e| ConnectionError::Controller(e.to_string()))?;
        }
        Ok(())
    }

    async fn cleanup(&self) -> Result<()> {
        self.lock().cleaned_up = true;
        Ok(())
    }
}
