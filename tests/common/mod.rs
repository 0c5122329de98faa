// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! In-memory device used by the integration tests.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use screenbar_lib::error::TransportError;
use screenbar_lib::protocol::{Connection, Connector, GET_PROP};
use screenbar_lib::types::PropertyValue;
use serde_json::json;
use tokio::time::Instant;

/// A scripted device shared between a test and the connector it hands out.
#[derive(Clone, Debug, Default)]
pub struct MockDevice {
    state: Arc<MockState>,
}

#[derive(Debug, Default)]
struct MockState {
    connect_failures: AtomicUsize,
    connect_attempts: Mutex<Vec<Instant>>,
    properties: Mutex<HashMap<String, PropertyValue>>,
    calls: Mutex<Vec<(String, Vec<PropertyValue>)>>,
    replies: Mutex<HashMap<String, VecDeque<Result<Vec<PropertyValue>, TransportError>>>>,
    delays: Mutex<HashMap<String, Duration>>,
}

impl MockDevice {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connector(&self) -> MockConnector {
        MockConnector {
            device: self.clone(),
        }
    }

    /// Makes the next `count` connection attempts fail.
    pub fn fail_connects(&self, count: usize) {
        self.state.connect_failures.store(count, Ordering::SeqCst);
    }

    pub fn connect_attempts(&self) -> Vec<Instant> {
        self.state.connect_attempts.lock().clone()
    }

    /// Sets the value `get_prop` returns for `key`.
    pub fn set_property(&self, key: &str, value: impl Into<PropertyValue>) {
        self.state
            .properties
            .lock()
            .insert(key.to_string(), value.into());
    }

    pub fn remove_property(&self, key: &str) {
        self.state.properties.lock().remove(key);
    }

    /// Queues a reply for the next call of `method`. Unscripted calls answer
    /// `["ok"]`.
    pub fn script_reply(&self, method: &str, reply: Result<Vec<PropertyValue>, TransportError>) {
        self.state
            .replies
            .lock()
            .entry(method.to_string())
            .or_default()
            .push_back(reply);
    }

    /// Makes every call of `method` take `delay`.
    pub fn delay(&self, method: &str, delay: Duration) {
        self.state.delays.lock().insert(method.to_string(), delay);
    }

    /// All calls received, in order.
    pub fn calls(&self) -> Vec<(String, Vec<PropertyValue>)> {
        self.state.calls.lock().clone()
    }

    /// Arguments of every call of `method`.
    pub fn calls_to(&self, method: &str) -> Vec<Vec<PropertyValue>> {
        self.state
            .calls
            .lock()
            .iter()
            .filter(|(m, _)| m == method)
            .map(|(_, params)| params.clone())
            .collect()
    }

    fn answer(&self, method: &str, params: &[PropertyValue]) -> Result<Vec<PropertyValue>, TransportError> {
        if let Some(reply) = self
            .state
            .replies
            .lock()
            .get_mut(method)
            .and_then(VecDeque::pop_front)
        {
            return reply;
        }

        if method == GET_PROP {
            let properties = self.state.properties.lock();
            return Ok(params
                .iter()
                .map(|key| {
                    key.as_str()
                        .and_then(|k| properties.get(k))
                        .cloned()
                        .unwrap_or(PropertyValue::Null)
                })
                .collect());
        }

        Ok(vec![json!("ok")])
    }
}

pub struct MockConnector {
    device: MockDevice,
}

impl Connector for MockConnector {
    type Connection = MockConnection;

    async fn connect(&self, _address: &str, _token: &str) -> Result<MockConnection, TransportError> {
        let state = &self.device.state;
        state.connect_attempts.lock().push(Instant::now());

        let failed = state
            .connect_failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failed {
            return Err(TransportError::ConnectionFailed("device unreachable".to_string()));
        }

        Ok(MockConnection {
            device: self.device.clone(),
        })
    }
}

#[derive(Debug)]
pub struct MockConnection {
    device: MockDevice,
}

impl Connection for MockConnection {
    async fn call(
        &self,
        method: &str,
        params: Vec<PropertyValue>,
    ) -> Result<Vec<PropertyValue>, TransportError> {
        self.device
            .state
            .calls
            .lock()
            .push((method.to_string(), params.clone()));

        let delay = self.device.state.delays.lock().get(method).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        self.device.answer(method, &params)
    }
}

/// Lets spawned tasks run without moving the clock meaningfully.
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(1)).await;
}
