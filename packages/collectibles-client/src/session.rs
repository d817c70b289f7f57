//! Wallet session: connect, describe the account, cache between runs.

use alloy_primitives::Address;
use collectibles_types::{format_ether, parse_address};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use crate::provider::{codes, parse_quantity, parse_quantity_u64, ProviderError, WalletProvider};
use crate::store::KeyValueStore;
use crate::Error;

/// Key-value slot holding the cached session.
pub const SESSION_KEY: &str = "walletData";

/// Connected account identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub address: Address,
    /// Native balance in decimal ether.
    pub balance: String,
    #[serde(default)]
    pub chain_id: Option<String>,
    #[serde(default)]
    pub network: Option<String>,
}

impl Session {
    pub fn chain_id_u64(&self) -> Option<u64> {
        self.chain_id.as_deref().and_then(|id| id.parse().ok())
    }
}

/// Request account access and describe the active account.
pub async fn connect<P: WalletProvider>(provider: &P) -> Result<Session, Error> {
    match provider
        .request("wallet_requestPermissions", json!([{ "eth_accounts": {} }]))
        .await
    {
        Ok(_) => {}
        Err(e) if e.code() == Some(codes::METHOD_NOT_FOUND) => {
            debug!("Provider has no permission system, requesting accounts directly");
        }
        Err(e) => return Err(access_error(e)),
    }

    let accounts = provider
        .request("eth_requestAccounts", json!([]))
        .await
        .map_err(access_error)?;
    let address = first_account(&accounts)?;
    let address_hex = address.to_checksum(None);

    let balance = provider
        .request("eth_getBalance", json!([address_hex, "latest"]))
        .await?;
    let balance = format_ether(parse_quantity(&balance)?);

    let chain_id = parse_quantity_u64(&provider.request("eth_chainId", json!([])).await?)?;

    let session = Session {
        address,
        balance,
        chain_id: Some(chain_id.to_string()),
        network: Some(network_name(chain_id).to_string()),
    };
    info!(
        address = %address_hex,
        chain_id,
        balance = %session.balance,
        "Wallet connected"
    );
    Ok(session)
}

fn first_account(accounts: &Value) -> Result<Address, Error> {
    let raw = accounts
        .as_array()
        .and_then(|list| list.first())
        .and_then(Value::as_str)
        .ok_or_else(|| Error::PermissionDenied("no accounts authorized".into()))?;
    parse_address(raw).map_err(|e| Error::Decode(format!("wallet returned bad account {raw}: {e}")))
}

/// Map failures of the permission and account requests.
fn access_error(e: ProviderError) -> Error {
    match e.code() {
        None => {
            warn!(error = %e, "Wallet provider unreachable");
            Error::WalletUnavailable
        }
        Some(codes::REQUEST_PENDING) => Error::RequestPending,
        Some(codes::USER_REJECTED) | Some(codes::UNAUTHORIZED) => {
            Error::PermissionDenied(e.message().to_string())
        }
        Some(_) => Error::Rpc(e),
    }
}

/// Well-known chain names; anything else is `unknown`.
pub fn network_name(chain_id: u64) -> &'static str {
    match chain_id {
        1 => "mainnet",
        5 => "goerli",
        10 => "optimism",
        137 => "matic",
        8453 => "base",
        17000 => "holesky",
        42161 => "arbitrum",
        80002 => "matic-amoy",
        84532 => "base-sepolia",
        11155111 => "sepolia",
        _ => "unknown",
    }
}

// --- Cache ---

pub fn save_session<S: KeyValueStore + ?Sized>(store: &S, session: &Session) -> Result<(), Error> {
    let blob = serde_json::to_string(session)
        .map_err(|e| Error::Storage(format!("failed to serialize session: {e}")))?;
    store.set(SESSION_KEY, &blob)
}

/// Cached session, if any. A corrupted entry reads as absent.
pub fn load_session<S: KeyValueStore + ?Sized>(store: &S) -> Result<Option<Session>, Error> {
    let Some(blob) = store.get(SESSION_KEY)? else {
        return Ok(None);
    };
    match serde_json::from_str(&blob) {
        Ok(session) => Ok(Some(session)),
        Err(e) => {
            warn!(error = %e, "Cached session is corrupted, ignoring");
            Ok(None)
        }
    }
}

pub fn clear_session<S: KeyValueStore + ?Sized>(store: &S) -> Result<(), Error> {
    store.remove(SESSION_KEY)
}
