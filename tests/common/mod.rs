#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use lead_scan_rs::backend::LeadBackend;
use lead_scan_rs::error::TransportError;
use serde_json::Value;
use tokio::sync::Notify;

/// In-memory backend that replays canned bodies in order and records every call.
#[derive(Default)]
pub struct ScriptedBackend {
    replies: Mutex<VecDeque<Result<String, u16>>>,
    calls: Mutex<Vec<(String, Value)>>,
    gate: Option<Arc<Notify>>,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hold every call until the returned `Notify` is signalled once per call.
    pub fn gated() -> (Self, Arc<Notify>) {
        let gate = Arc::new(Notify::new());
        let backend = Self {
            gate: Some(gate.clone()),
            ..Self::default()
        };
        (backend, gate)
    }

    pub fn reply(self, body: &str) -> Self {
        self.replies.lock().unwrap().push_back(Ok(body.to_string()));
        self
    }

    pub fn fail_with_status(self, status: u16) -> Self {
        self.replies.lock().unwrap().push_back(Err(status));
        self
    }

    pub fn calls(&self) -> Vec<(String, Value)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl LeadBackend for ScriptedBackend {
    async fn post_json(&self, path: &str, body: &Value) -> Result<Vec<u8>, TransportError> {
        self.calls
            .lock()
            .unwrap()
            .push((path.to_string(), body.clone()));
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        let next = self.replies.lock().unwrap().pop_front();
        match next {
            Some(Ok(body)) => Ok(body.into_bytes()),
            Some(Err(status)) => Err(TransportError::Status {
                status,
                body: String::new(),
            }),
            None => Err(TransportError::Status {
                status: 599,
                body: "no scripted reply".into(),
            }),
        }
    }
}
