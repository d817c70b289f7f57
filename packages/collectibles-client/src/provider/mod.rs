//! Wallet provider boundary.
//!
//! The client never holds keys. Every account, read and signing request is
//! an EIP-1193 style `request(method, params)` against a provider.

mod http;

pub use http::HttpProvider;

use alloy_primitives::U256;
use serde_json::Value;
use std::future::Future;

/// Provider error codes that need distinct handling.
pub mod codes {
    /// EIP-1193: the user rejected the request.
    pub const USER_REJECTED: i64 = 4001;
    /// EIP-1193: the account or method is not authorized.
    pub const UNAUTHORIZED: i64 = 4100;
    /// A permission request is already awaiting the user.
    pub const REQUEST_PENDING: i64 = -32002;
    pub const METHOD_NOT_FOUND: i64 = -32601;
}

/// Failure reported by a wallet provider.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ProviderError {
    /// The provider answered with a JSON-RPC error object.
    #[error("provider error {code}: {message}")]
    Rpc {
        code: i64,
        message: String,
        data: Option<Value>,
    },
    /// The provider could not be reached.
    #[error("transport error: {0}")]
    Transport(String),
}

impl ProviderError {
    pub fn code(&self) -> Option<i64> {
        match self {
            Self::Rpc { code, .. } => Some(*code),
            Self::Transport(_) => None,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Rpc { message, .. } => message,
            Self::Transport(message) => message,
        }
    }
}

/// An injected-wallet style JSON-RPC provider.
pub trait WalletProvider: Send + Sync {
    fn request(
        &self,
        method: &str,
        params: Value,
    ) -> impl Future<Output = Result<Value, ProviderError>> + Send;
}

impl<P: WalletProvider> WalletProvider for std::sync::Arc<P> {
    fn request(
        &self,
        method: &str,
        params: Value,
    ) -> impl Future<Output = Result<Value, ProviderError>> + Send {
        (**self).request(method, params)
    }
}

/// Hex quantity encoding (`0x0`, `0x1bc16d674ec80000`).
pub fn to_quantity(value: U256) -> String {
    format!("0x{value:x}")
}

pub fn parse_quantity(value: &Value) -> Result<U256, crate::Error> {
    let raw = value
        .as_str()
        .ok_or_else(|| crate::Error::Decode(format!("expected hex quantity, got {value}")))?;
    let digits = raw
        .strip_prefix("0x")
        .ok_or_else(|| crate::Error::Decode(format!("quantity missing 0x prefix: {raw}")))?;
    if digits.is_empty() {
        return Ok(U256::ZERO);
    }
    U256::from_str_radix(digits, 16)
        .map_err(|e| crate::Error::Decode(format!("invalid quantity {raw}: {e}")))
}

pub fn parse_quantity_u64(value: &Value) -> Result<u64, crate::Error> {
    let wide = parse_quantity(value)?;
    u64::try_from(wide).map_err(|_| crate::Error::Decode(format!("quantity too large: {wide}")))
}
