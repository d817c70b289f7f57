//! Error types for the collectibles client.

use alloy_primitives::Address;
use collectibles_types::{amount_message, AmountError, FieldErrors};

use crate::provider::ProviderError;

/// Client error type.
///
/// Nothing here is fatal: every variant leaves the caller able to retry.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No wallet provider is reachable.
    #[error("wallet provider unavailable")]
    WalletUnavailable,
    #[error("wallet permission denied: {0}")]
    PermissionDenied(String),
    /// An earlier connection request is still awaiting the user.
    #[error("wallet connection request already pending")]
    RequestPending,
    #[error("no session: connect a wallet first")]
    NotConnected,
    #[error("session is on chain {actual}, deployment expects {expected}")]
    WrongNetwork { expected: u64, actual: String },
    /// `eth_getCode` returned no bytecode at the target address.
    #[error("no contract deployed at {0}")]
    ContractNotFound(Address),
    #[error("interface error: {0}")]
    Interface(String),
    #[error("invalid input: {0}")]
    Validation(FieldErrors),
    #[error("invalid amount: {0}")]
    InvalidAmount(#[from] AmountError),
    #[error("transaction failed: {0}")]
    TransactionFailed(String),
    #[error("timed out waiting for transaction {0}")]
    Timeout(String),
    #[error("operation cancelled")]
    Cancelled,
    /// A contract result did not match the expected view-model shape.
    #[error("decode error: {0}")]
    Decode(String),
    #[error("rpc error: {0}")]
    Rpc(#[from] ProviderError),
    #[error("config error: {0}")]
    Config(String),
    #[error("storage error: {0}")]
    Storage(String),
}

impl Error {
    /// Single-line notification text for the user.
    pub fn user_message(&self) -> String {
        match self {
            Self::WalletUnavailable => "No wallet found. Install a wallet and try again.".into(),
            Self::RequestPending => {
                "Please check your wallet for a pending connection request.".into()
            }
            Self::PermissionDenied(_) => "Wallet access was not granted.".into(),
            Self::NotConnected => "Wallet not connected.".into(),
            Self::WrongNetwork { expected, .. } => {
                format!("Switch your wallet to chain {expected} and try again.")
            }
            Self::ContractNotFound(address) => {
                format!("No contract found at {address} on this network.")
            }
            Self::Validation(_) => "Please fix the form errors.".into(),
            Self::InvalidAmount(e) => format!("{}.", amount_message(e)),
            Self::TransactionFailed(reason) => format!("Transaction failed: {reason}."),
            Self::Timeout(hash) => {
                format!("Transaction {hash} is still pending. Check your wallet before retrying.")
            }
            Self::Cancelled => "Operation cancelled.".into(),
            Self::Interface(_) | Self::Decode(_) | Self::Rpc(_) | Self::Config(_) => {
                "Something went wrong talking to the contract. Please try again.".into()
            }
            Self::Storage(_) => "Could not update local records.".into(),
        }
    }

    /// Field-level messages, if this is a validation failure.
    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            Self::Validation(errors) => Some(errors),
            _ => None,
        }
    }
}

impl From<FieldErrors> for Error {
    fn from(errors: FieldErrors) -> Self {
        Self::Validation(errors)
    }
}
