//! JSON-RPC over HTTP with primary → fallback failover and circuit breaker.

use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use tracing::{debug, info, warn};

use super::{ProviderError, WalletProvider};
use crate::config::Config;
use crate::metrics::METRICS;

const CIRCUIT_BREAKER_THRESHOLD: u64 = 5;
const CIRCUIT_BREAKER_WINDOW_MS: u64 = 30_000;

struct CircuitState {
    failures: u64,
    last_failure_ms: u64,
    open: bool,
}

#[derive(Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcErrorObject>,
}

#[derive(Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
    #[serde(default)]
    data: Option<Value>,
}

/// Wallet provider backed by a node that manages the accounts it signs for.
pub struct HttpProvider {
    http: reqwest::Client,
    primary_url: String,
    fallback_url: Option<String>,
    circuit: Mutex<CircuitState>,
    next_id: AtomicU64,
}

impl HttpProvider {
    pub fn new(primary_url: &str, fallback_url: Option<&str>) -> Self {
        info!(
            primary = primary_url,
            fallback = fallback_url.unwrap_or("-"),
            "Wallet provider initialized"
        );
        Self {
            http: reqwest::Client::new(),
            primary_url: primary_url.to_string(),
            fallback_url: fallback_url.map(str::to_string),
            circuit: Mutex::new(CircuitState {
                failures: 0,
                last_failure_ms: 0,
                open: false,
            }),
            next_id: AtomicU64::new(1),
        }
    }

    /// Detect the configured provider. An empty RPC URL means no wallet.
    pub fn detect(config: &Config) -> Result<Self, crate::Error> {
        if config.rpc_url.trim().is_empty() {
            return Err(crate::Error::WalletUnavailable);
        }
        let fallback = config
            .fallback_rpc_url
            .as_deref()
            .filter(|url| !url.trim().is_empty());
        Ok(Self::new(&config.rpc_url, fallback))
    }

    async fn post(&self, url: &str, body: &Value) -> Result<Value, ProviderError> {
        let response = self
            .http
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        let parsed: RpcResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Transport(format!("invalid JSON-RPC response: {e}")))?;

        match parsed.error {
            Some(err) => Err(ProviderError::Rpc {
                code: err.code,
                message: err.message,
                data: err.data,
            }),
            None => Ok(parsed.result.unwrap_or(Value::Null)),
        }
    }

    // --- Failover / circuit breaker ---

    fn active_url(&self) -> &str {
        match &self.fallback_url {
            Some(fallback) if self.is_circuit_open() => fallback,
            _ => &self.primary_url,
        }
    }

    /// Only an answer from the primary closes the circuit.
    fn record_success(&self, url: &str) {
        if url != self.primary_url {
            return;
        }
        let mut circuit = self.circuit.lock().unwrap_or_else(|e| e.into_inner());
        if circuit.failures > 0 {
            info!(primary = %self.primary_url, "Primary RPC recovered");
            circuit.failures = 0;
            circuit.open = false;
        }
    }

    fn record_failure(&self) {
        METRICS.rpc_errors.fetch_add(1, Ordering::Relaxed);
        let mut circuit = self.circuit.lock().unwrap_or_else(|e| e.into_inner());
        circuit.failures += 1;
        circuit.last_failure_ms = now_ms();
        if circuit.failures >= CIRCUIT_BREAKER_THRESHOLD && !circuit.open {
            circuit.open = true;
            METRICS.rpc_failovers.fetch_add(1, Ordering::Relaxed);
            warn!(
                failures = circuit.failures,
                fallback = ?self.fallback_url,
                "Circuit breaker opened, routing to fallback"
            );
        }
    }

    pub fn is_circuit_open(&self) -> bool {
        let mut circuit = self.circuit.lock().unwrap_or_else(|e| e.into_inner());
        if !circuit.open {
            return false;
        }
        if now_ms().saturating_sub(circuit.last_failure_ms) > CIRCUIT_BREAKER_WINDOW_MS {
            circuit.open = false;
            circuit.failures = 0;
            info!(primary = %self.primary_url, "Circuit breaker half-open, retrying primary");
            return false;
        }
        true
    }
}

impl WalletProvider for HttpProvider {
    async fn request(&self, method: &str, params: Value) -> Result<Value, ProviderError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });
        debug!(id, method, "JSON-RPC request");

        let url = self.active_url();
        match self.post(url, &body).await {
            Ok(result) => {
                self.record_success(url);
                Ok(result)
            }
            // JSON-RPC error objects are answers, not outages.
            Err(e @ ProviderError::Rpc { .. }) => {
                self.record_success(url);
                Err(e)
            }
            // The circuit is already open and the fallback is down too.
            Err(ProviderError::Transport(e)) if url != self.primary_url => {
                warn!(error = %e, method, "Fallback RPC failed");
                Err(ProviderError::Transport(e))
            }
            Err(ProviderError::Transport(e)) => {
                self.record_failure();
                let Some(fallback) = self.fallback_url.as_deref() else {
                    return Err(ProviderError::Transport(e));
                };
                warn!(error = %e, method, "Primary RPC failed, trying fallback");
                self.post(fallback, &body).await.map_err(|e2| match e2 {
                    ProviderError::Transport(e2) => ProviderError::Transport(format!(
                        "{method} failed: primary={e}, fallback={e2}"
                    )),
                    rpc => rpc,
                })
            }
        }
    }
}

fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
