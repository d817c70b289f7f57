//! In-process provider double for unit tests.

use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use crate::provider::{ProviderError, WalletProvider};

/// Answers each method with a fixed result and records every request.
/// One-shot answers queued with [`ScriptedProvider::respond_once`] come first.
#[derive(Default)]
pub struct ScriptedProvider {
    responses: HashMap<String, Result<Value, ProviderError>>,
    queued: Mutex<HashMap<String, VecDeque<Result<Value, ProviderError>>>>,
    calls: Mutex<Vec<(String, Value)>>,
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(mut self, method: &str, result: Result<Value, ProviderError>) -> Self {
        self.responses.insert(method.to_string(), result);
        self
    }

    pub fn respond_once(self, method: &str, result: Result<Value, ProviderError>) -> Self {
        self.queued
            .lock()
            .unwrap()
            .entry(method.to_string())
            .or_default()
            .push_back(result);
        self
    }

    pub fn calls(&self) -> Vec<(String, Value)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn methods(&self) -> Vec<String> {
        self.calls().into_iter().map(|(m, _)| m).collect()
    }
}

impl WalletProvider for ScriptedProvider {
    async fn request(&self, method: &str, params: Value) -> Result<Value, ProviderError> {
        self.calls.lock().unwrap().push((method.to_string(), params));
        if let Some(next) = self.queued.lock().unwrap().get_mut(method).and_then(VecDeque::pop_front) {
            return next;
        }
        self.responses.get(method).cloned().unwrap_or_else(|| {
            Err(ProviderError::Rpc {
                code: -32601,
                message: format!("method {method} not scripted"),
                data: None,
            })
        })
    }
}
