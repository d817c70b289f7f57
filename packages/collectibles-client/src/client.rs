//! Client facade: one session, lazily bound contracts, local records.

use alloy_primitives::U256;
use collectibles_types::{parse_ether, to_checksum, validate_create_nft};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::abi::InterfaceDescriptor;
use crate::actions::{self, Confirmed, CreateNftForm};
use crate::binding::{ConfirmOptions, ContractBinding};
use crate::catalog;
use crate::config::{Config, ContractKind};
use crate::models::{Campaign, CollectibleItem, PersistedRecord};
use crate::provider::WalletProvider;
use crate::session::{self, Session};
use crate::store::{Collection, KeyValueStore, RecordRepository};
use crate::Error;

pub struct Client<P, S> {
    config: Config,
    provider: Arc<P>,
    store: Arc<S>,
    session: Option<Session>,
    /// Dropped whenever the session changes.
    bindings: Mutex<HashMap<ContractKind, ContractBinding<P>>>,
    created: RecordRepository<S>,
    purchased: RecordRepository<S>,
    shutdown: CancellationToken,
}

impl<P: WalletProvider, S: KeyValueStore> Client<P, S> {
    pub fn new(config: Config, provider: Arc<P>, store: Arc<S>) -> Self {
        Self {
            created: RecordRepository::new(Arc::clone(&store), Collection::Created),
            purchased: RecordRepository::new(Arc::clone(&store), Collection::Purchased),
            config,
            provider,
            store,
            session: None,
            bindings: Mutex::new(HashMap::new()),
            shutdown: CancellationToken::new(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    fn require_session(&self) -> Result<&Session, Error> {
        self.session.as_ref().ok_or(Error::NotConnected)
    }

    // --- Session lifecycle ---

    /// Ask the wallet for access and cache the resulting session.
    pub async fn connect(&mut self) -> Result<&Session, Error> {
        let session = session::connect(&*self.provider).await?;
        if let Err(e) = session::save_session(&*self.store, &session) {
            warn!(error = %e, "Failed to cache session");
        }
        self.replace_session(Some(session));
        self.require_session()
    }

    /// Reuse a session cached by an earlier run.
    pub fn restore_session(&mut self) -> Result<Option<&Session>, Error> {
        let cached = session::load_session(&*self.store)?;
        if let Some(session) = &cached {
            debug!(address = %session.address, "Restored cached session");
        }
        Ok(self.replace_session(cached))
    }

    pub fn disconnect(&mut self) -> Result<(), Error> {
        if let Some(session) = &self.session {
            info!(address = %session.address, "Wallet disconnected");
        }
        self.replace_session(None);
        session::clear_session(&*self.store)
    }

    fn replace_session(&mut self, session: Option<Session>) -> Option<&Session> {
        self.bindings
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clear();
        self.session = session;
        self.session.as_ref()
    }

    // --- Bindings ---

    /// Binding for `kind`, bound on first use under the current session.
    pub async fn binding(&self, kind: ContractKind) -> Result<ContractBinding<P>, Error> {
        let session = self.require_session()?;
        let cached = self
            .bindings
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(&kind)
            .cloned();
        if let Some(binding) = cached {
            return Ok(binding);
        }

        let deployment = self.config.deployment(kind);
        let interface = InterfaceDescriptor::for_deployment(kind, deployment)?;
        let binding =
            ContractBinding::bind(Arc::clone(&self.provider), session, deployment, interface)
                .await?;
        debug!(kind = %kind, address = %binding.address(), "Binding cached");
        self.bindings
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(kind, binding.clone());
        Ok(binding)
    }

    /// Options for the next confirmation wait. Cancelled by [`Client::shutdown`].
    pub fn confirm_options(&self) -> ConfirmOptions {
        ConfirmOptions {
            timeout: self.config.confirmation_timeout(),
            poll_interval: self.config.poll_interval(),
            cancel: self.shutdown.child_token(),
        }
    }

    /// Abort every pending confirmation wait.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }

    // --- Read path ---

    pub async fn items(&self) -> Result<Vec<CollectibleItem>, Error> {
        let binding = self.binding(ContractKind::Marketplace).await?;
        catalog::load_items(&binding, &self.config.methods).await
    }

    /// Listings the session account has not already minted.
    pub async fn available_items(&self) -> Result<Vec<CollectibleItem>, Error> {
        let owner = to_checksum(&self.require_session()?.address);
        let items = self.items().await?;
        self.purchased.filter_available(items, &owner)
    }

    pub async fn campaigns(&self) -> Result<Vec<Campaign>, Error> {
        let binding = self.binding(ContractKind::Crowdfunding).await?;
        catalog::load_campaigns(&binding, &self.config.methods).await
    }

    pub async fn mint_price(&self) -> Result<U256, Error> {
        let binding = self.binding(ContractKind::Marketplace).await?;
        catalog::mint_price(&binding, &self.config.methods).await
    }

    // --- Write path ---

    /// Form errors are reported before the contract is bound or called.
    pub async fn create_nft(&self, form: &mut CreateNftForm) -> Result<Confirmed, Error> {
        let session = self.require_session()?;
        validate_create_nft(&form.input())?;
        let binding = self.binding(ContractKind::Nft).await?;
        actions::create_nft(
            form,
            &binding,
            &self.created,
            session,
            &self.config.methods,
            &self.confirm_options(),
        )
        .await
    }

    pub async fn mint(&self, item: &CollectibleItem) -> Result<Confirmed, Error> {
        let session = self.require_session()?;
        let binding = self.binding(ContractKind::Marketplace).await?;
        actions::mint(
            item,
            &binding,
            &self.purchased,
            session,
            &self.config.methods,
            &self.confirm_options(),
        )
        .await
    }

    pub async fn contribute(&self, campaign_id: u64, amount: &str) -> Result<Vec<Campaign>, Error> {
        self.require_session()?;
        parse_ether(amount)?;
        let binding = self.binding(ContractKind::Crowdfunding).await?;
        actions::contribute(
            campaign_id,
            amount,
            &binding,
            &self.config.methods,
            &self.confirm_options(),
        )
        .await
    }

    // --- Local records ---

    /// Collectibles the session account minted.
    pub fn owned(&self) -> Result<Vec<PersistedRecord>, Error> {
        let owner = to_checksum(&self.require_session()?.address);
        self.purchased.get(&owner)
    }

    /// Collectibles created from this client by the session account.
    pub fn created(&self) -> Result<Vec<PersistedRecord>, Error> {
        let owner = to_checksum(&self.require_session()?.address);
        self.created.get(&owner)
    }
}
