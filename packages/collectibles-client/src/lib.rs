//! # Collectibles Client
//!
//! Wallet session, contract binding and local records for the collectibles
//! marketplace and crowdfunding contracts.
//!
//! ## Flow
//! 1. [`Client::connect`] asks the wallet provider for an account.
//! 2. [`Client::binding`] checks that code is deployed before binding.
//! 3. Reads decode contract tuples into [`CollectibleItem`] and [`Campaign`].
//! 4. Writes validate first, wait for inclusion, then append a
//!    [`PersistedRecord`] to the local store.
//!
//! ## Binaries
//! - `collectibles`: command-line front end
//! - `collectibles-upload`: image upload endpoint (`POST /upload`)

pub mod abi;
pub mod actions;
pub mod binding;
pub mod catalog;
mod client;
pub mod config;
pub mod decode;
mod error;
pub mod metrics;
mod middleware;
pub mod models;
pub mod provider;
pub mod session;
pub mod shutdown;
pub mod store;
pub mod upload;

#[cfg(test)]
mod testing;

pub use actions::{Confirmed, CreateNftForm};
pub use binding::{ConfirmOptions, ContractBinding, PendingTransaction, Receipt};
pub use client::Client;
pub use config::{Config, ContractKind, Deployment, MethodNames};
pub use error::Error;
pub use models::{Campaign, CollectibleItem, PersistedRecord};
pub use provider::{HttpProvider, ProviderError, WalletProvider};
pub use session::Session;
pub use store::{FileKeyValueStore, KeyValueStore, MemoryKeyValueStore, RecordRepository};
