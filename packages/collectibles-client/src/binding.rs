//! Contract bindings: an address and interface paired with the session's
//! signing identity.

use alloy_dyn_abi::{DynSolValue, FunctionExt, JsonAbiExt};
use alloy_primitives::{hex, Address, U256};
use collectibles_types::parse_address;
use serde_json::{json, Map, Value};
use std::fmt;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::abi::InterfaceDescriptor;
use crate::config::Deployment;
use crate::decode::CallOutput;
use crate::metrics::METRICS;
use crate::provider::{parse_quantity, parse_quantity_u64, to_quantity, ProviderError, WalletProvider};
use crate::session::Session;
use crate::Error;

/// A verified contract handle. Only [`ContractBinding::bind`] creates one.
pub struct ContractBinding<P> {
    provider: Arc<P>,
    address: Address,
    interface: InterfaceDescriptor,
    from: Address,
}

impl<P> Clone for ContractBinding<P> {
    fn clone(&self) -> Self {
        Self {
            provider: Arc::clone(&self.provider),
            address: self.address,
            interface: self.interface.clone(),
            from: self.from,
        }
    }
}

impl<P: WalletProvider> ContractBinding<P> {
    /// Confirm code exists at the deployment address, then bind.
    ///
    /// Issues no contract calls when the check fails.
    pub async fn bind(
        provider: Arc<P>,
        session: &Session,
        deployment: &Deployment,
        interface: InterfaceDescriptor,
    ) -> Result<Self, Error> {
        let address = parse_address(deployment.address.trim()).map_err(|e| {
            Error::Config(format!("bad contract address {}: {e}", deployment.address))
        })?;

        if let Some(expected) = deployment.chain_id {
            if session.chain_id_u64() != Some(expected) {
                return Err(Error::WrongNetwork {
                    expected,
                    actual: session.chain_id.clone().unwrap_or_else(|| "unknown".into()),
                });
            }
        }

        let code = provider
            .request("eth_getCode", json!([address.to_checksum(None), "latest"]))
            .await?;
        let code = code
            .as_str()
            .ok_or_else(|| Error::Decode(format!("eth_getCode returned {code}")))?;
        if code.is_empty() || code == "0x" {
            warn!(address = %address, "No contract code at address");
            return Err(Error::ContractNotFound(address));
        }

        info!(
            contract = %address,
            from = %session.address,
            code_bytes = code.trim_start_matches("0x").len() / 2,
            "Contract bound"
        );
        Ok(Self {
            provider,
            address,
            interface,
            from: session.address,
        })
    }

    pub fn address(&self) -> Address {
        self.address
    }

    /// The session account transactions are sent from.
    pub fn sender(&self) -> Address {
        self.from
    }

    fn encode(&self, method: &str, args: &[DynSolValue]) -> Result<String, Error> {
        let function = self.interface.function(method, args.len())?;
        let data = function
            .abi_encode_input(args)
            .map_err(|e| Error::Interface(format!("cannot encode {method} arguments: {e}")))?;
        Ok(hex::encode_prefixed(data))
    }

    /// Read-only call.
    pub async fn call(&self, method: &str, args: &[DynSolValue]) -> Result<CallOutput, Error> {
        let data = self.encode(method, args)?;
        debug!(contract = %self.address, method, "eth_call");
        let result = self
            .provider
            .request(
                "eth_call",
                json!([{
                    "from": self.from.to_checksum(None),
                    "to": self.address.to_checksum(None),
                    "data": data,
                }, "latest"]),
            )
            .await?;

        let raw = result
            .as_str()
            .ok_or_else(|| Error::Decode(format!("{method}: eth_call returned {result}")))?;
        let bytes = hex::decode(raw)
            .map_err(|e| Error::Decode(format!("{method}: result is not hex: {e}")))?;
        let function = self.interface.function(method, args.len())?;
        let values = function
            .abi_decode_output(&bytes, true)
            .map_err(|e| Error::Decode(format!("{method}: {e}")))?;
        Ok(CallOutput::new(function.outputs.clone(), values))
    }

    /// State-changing call, optionally carrying a value transfer.
    pub async fn send(
        &self,
        method: &str,
        args: &[DynSolValue],
        value: Option<U256>,
    ) -> Result<PendingTransaction<P>, Error> {
        let data = self.encode(method, args)?;
        let mut tx = Map::new();
        tx.insert("from".into(), json!(self.from.to_checksum(None)));
        tx.insert("to".into(), json!(self.address.to_checksum(None)));
        tx.insert("data".into(), json!(data));
        if let Some(value) = value {
            tx.insert("value".into(), json!(to_quantity(value)));
        }

        let hash = self
            .provider
            .request("eth_sendTransaction", json!([Value::Object(tx)]))
            .await
            .map_err(|e| {
                METRICS.tx_failed.fetch_add(1, Ordering::Relaxed);
                warn!(contract = %self.address, method, error = %e, "Transaction rejected");
                send_error(e)
            })?;
        let hash = hash
            .as_str()
            .ok_or_else(|| Error::Decode(format!("{method}: expected tx hash, got {hash}")))?
            .to_string();

        METRICS.tx_submitted.fetch_add(1, Ordering::Relaxed);
        info!(
            contract = %self.address,
            method,
            tx_hash = %hash,
            value = %value.unwrap_or_default(),
            "Transaction submitted"
        );
        Ok(PendingTransaction {
            provider: Arc::clone(&self.provider),
            hash,
        })
    }
}

fn send_error(e: ProviderError) -> Error {
    match &e {
        ProviderError::Rpc { code, message, .. } if *code == crate::provider::codes::USER_REJECTED => {
            Error::TransactionFailed(format!("rejected in wallet: {message}"))
        }
        ProviderError::Rpc { message, .. } => Error::TransactionFailed(message.clone()),
        ProviderError::Transport(message) => Error::TransactionFailed(format!("network error: {message}")),
    }
}

/// How long and how often to wait for inclusion.
#[derive(Debug, Clone)]
pub struct ConfirmOptions {
    /// `None` waits without bound.
    pub timeout: Option<Duration>,
    pub poll_interval: Duration,
    pub cancel: CancellationToken,
}

impl Default for ConfirmOptions {
    fn default() -> Self {
        Self {
            timeout: Some(Duration::from_secs(120)),
            poll_interval: Duration::from_secs(1),
            cancel: CancellationToken::new(),
        }
    }
}

/// Inclusion receipt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    pub transaction_hash: String,
    pub block_number: u64,
    pub gas_used: U256,
}

/// A submitted transaction awaiting inclusion.
pub struct PendingTransaction<P> {
    provider: Arc<P>,
    hash: String,
}

impl<P> fmt::Debug for PendingTransaction<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingTransaction").field("hash", &self.hash).finish()
    }
}

impl<P: WalletProvider> PendingTransaction<P> {
    pub fn hash(&self) -> &str {
        &self.hash
    }

    /// Poll for the receipt until included, timed out or cancelled.
    pub async fn wait(&self, options: &ConfirmOptions) -> Result<Receipt, Error> {
        let start = Instant::now();
        let polling = self.poll_receipt(options.poll_interval);
        let bounded = async {
            match options.timeout {
                Some(limit) => tokio::time::timeout(limit, polling).await.unwrap_or_else(|_| {
                    METRICS.tx_timeouts.fetch_add(1, Ordering::Relaxed);
                    warn!(tx_hash = %self.hash, timeout_secs = limit.as_secs(), "Confirmation timed out");
                    Err(Error::Timeout(self.hash.clone()))
                }),
                None => polling.await,
            }
        };

        let result = tokio::select! {
            _ = options.cancel.cancelled() => {
                info!(tx_hash = %self.hash, "Confirmation wait cancelled");
                Err(Error::Cancelled)
            }
            result = bounded => result,
        };

        METRICS.record_confirm_duration(start);
        match &result {
            Ok(receipt) => {
                METRICS.tx_confirmed.fetch_add(1, Ordering::Relaxed);
                info!(tx_hash = %self.hash, block = receipt.block_number, "Transaction confirmed");
            }
            Err(Error::TransactionFailed(_)) => {
                METRICS.tx_failed.fetch_add(1, Ordering::Relaxed);
            }
            Err(_) => {}
        }
        result
    }

    /// Transport failures are retried; the deadline in [`Self::wait`] bounds them.
    async fn poll_receipt(&self, interval: Duration) -> Result<Receipt, Error> {
        loop {
            match self
                .provider
                .request("eth_getTransactionReceipt", json!([self.hash]))
                .await
            {
                Ok(receipt) if !receipt.is_null() => return parse_receipt(&self.hash, &receipt),
                Ok(_) => debug!(tx_hash = %self.hash, "Receipt not available yet"),
                Err(ProviderError::Transport(e)) => {
                    warn!(tx_hash = %self.hash, error = %e, "Receipt poll failed, retrying");
                }
                Err(e) => return Err(e.into()),
            }
            tokio::time::sleep(interval).await;
        }
    }
}

fn parse_receipt(hash: &str, receipt: &Value) -> Result<Receipt, Error> {
    let field = |name: &str| {
        receipt
            .get(name)
            .ok_or_else(|| Error::Decode(format!("receipt for {hash} has no {name}")))
    };
    let status = parse_quantity_u64(field("status")?)?;
    if status != 1 {
        warn!(tx_hash = %hash, status, "Transaction reverted");
        return Err(Error::TransactionFailed("transaction reverted".into()));
    }
    Ok(Receipt {
        transaction_hash: hash.to_string(),
        block_number: parse_quantity_u64(field("blockNumber")?)?,
        gas_used: receipt
            .get("gasUsed")
            .map(parse_quantity)
            .transpose()?
            .unwrap_or_default(),
    })
}
