//! Write path: validate, submit, wait for inclusion, remember.

use alloy_dyn_abi::DynSolValue;
use alloy_primitives::U256;
use collectibles_types::{
    format_ether, parse_ether, to_checksum, validate_create_nft, CreateNftInput,
};
use serde::Serialize;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use tracing::{info, warn};

use crate::binding::{ConfirmOptions, ContractBinding, Receipt};
use crate::catalog;
use crate::config::MethodNames;
use crate::models::{Campaign, CollectibleItem, PersistedRecord};
use crate::provider::WalletProvider;
use crate::session::Session;
use crate::store::{KeyValueStore, RecordRepository};
use crate::Error;

/// Create-NFT form state. Left intact on failure so the user can retry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateNftForm {
    pub name: String,
    pub owner: String,
    /// Decimal ether.
    pub price: String,
    pub description: String,
    /// Data URL or uploaded path.
    pub image_data: String,
}

impl CreateNftForm {
    pub fn input(&self) -> CreateNftInput<'_> {
        CreateNftInput {
            name: &self.name,
            owner: &self.owner,
            price: &self.price,
            image_data: &self.image_data,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// A confirmed write and the record it left behind.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Confirmed {
    pub tx_hash: String,
    pub block_number: u64,
    pub record: PersistedRecord,
}

/// Create a collectible from the form.
///
/// Validation failures return before any provider request. On success the
/// created record is appended under the form's owner and the form is reset.
pub async fn create_nft<P, S>(
    form: &mut CreateNftForm,
    binding: &ContractBinding<P>,
    created: &RecordRepository<S>,
    session: &Session,
    methods: &MethodNames,
    options: &ConfirmOptions,
) -> Result<Confirmed, Error>
where
    P: WalletProvider,
    S: KeyValueStore,
{
    let valid = validate_create_nft(&form.input())?;

    let pending = binding
        .send(
            &methods.create_nft,
            &[
                DynSolValue::String(valid.name.clone()),
                DynSolValue::Uint(valid.price, 256),
            ],
            None,
        )
        .await?;
    let receipt = pending.wait(options).await?;

    let description = form.description.trim();
    let record = PersistedRecord {
        token_id: None,
        title: valid.name,
        image: form.image_data.clone(),
        creator: to_checksum(&session.address),
        price: format_ether(valid.price),
        purchase_date: now_rfc3339(),
        owner: to_checksum(&valid.owner),
        metadata_uri: None,
        description: (!description.is_empty()).then(|| description.to_string()),
        tx_hash: Some(receipt.transaction_hash.clone()),
    };
    remember(created, &record);
    form.reset();

    info!(title = %record.title, tx_hash = %receipt.transaction_hash, "Collectible created");
    Ok(confirmed(receipt, record))
}

/// Mint `item` to the session account at the contract's current mint price.
pub async fn mint<P, S>(
    item: &CollectibleItem,
    binding: &ContractBinding<P>,
    purchased: &RecordRepository<S>,
    session: &Session,
    methods: &MethodNames,
    options: &ConfirmOptions,
) -> Result<Confirmed, Error>
where
    P: WalletProvider,
    S: KeyValueStore,
{
    let price = catalog::mint_price(binding, methods).await?;
    let pending = binding
        .send(
            &methods.mint,
            &[
                DynSolValue::Uint(U256::from(item.token_id), 256),
                DynSolValue::Address(session.address),
            ],
            Some(price),
        )
        .await?;
    let receipt = pending.wait(options).await?;

    let record = PersistedRecord {
        token_id: Some(item.token_id),
        title: item.title.clone(),
        image: item.image.clone(),
        creator: to_checksum(&item.creator),
        price: format_ether(price),
        purchase_date: now_rfc3339(),
        owner: to_checksum(&session.address),
        metadata_uri: Some(item.title.clone()),
        description: None,
        tx_hash: Some(receipt.transaction_hash.clone()),
    };
    remember(purchased, &record);

    info!(token_id = item.token_id, tx_hash = %receipt.transaction_hash, "Collectible minted");
    Ok(confirmed(receipt, record))
}

/// Contribute `amount` ether to a campaign and return the refreshed list.
///
/// Contributions are not remembered locally.
pub async fn contribute<P: WalletProvider>(
    campaign_id: u64,
    amount: &str,
    binding: &ContractBinding<P>,
    methods: &MethodNames,
    options: &ConfirmOptions,
) -> Result<Vec<Campaign>, Error> {
    let value = parse_ether(amount)?;
    let pending = binding
        .send(
            &methods.contribute,
            &[DynSolValue::Uint(U256::from(campaign_id), 256)],
            Some(value),
        )
        .await?;
    let receipt = pending.wait(options).await?;
    info!(
        campaign_id,
        amount = %format_ether(value),
        tx_hash = %receipt.transaction_hash,
        "Contribution confirmed"
    );

    catalog::load_campaigns(binding, methods).await
}

fn confirmed(receipt: Receipt, record: PersistedRecord) -> Confirmed {
    Confirmed {
        tx_hash: receipt.transaction_hash,
        block_number: receipt.block_number,
        record,
    }
}

/// The chain already holds the result, so a failed local write only warns.
fn remember<S: KeyValueStore>(repo: &RecordRepository<S>, record: &PersistedRecord) {
    if let Err(e) = repo.append(record.clone()) {
        warn!(
            collection = repo.collection().key(),
            title = %record.title,
            error = %e,
            "Failed to persist record"
        );
    }
}

fn now_rfc3339() -> String {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_else(|_| OffsetDateTime::now_utc().unix_timestamp().to_string())
}
