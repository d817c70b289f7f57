//! Read path: enumerate listings and campaigns through a binding.

use alloy_primitives::U256;
use tracing::debug;

use crate::binding::ContractBinding;
use crate::config::MethodNames;
use crate::models::{Campaign, CollectibleItem};
use crate::provider::WalletProvider;
use crate::Error;

/// Every marketplace listing. Empty when nothing has been created.
pub async fn load_items<P: WalletProvider>(
    binding: &ContractBinding<P>,
    methods: &MethodNames,
) -> Result<Vec<CollectibleItem>, Error> {
    let items: Vec<CollectibleItem> = binding.call(&methods.all_items, &[]).await?.list()?;
    debug!(contract = %binding.address(), count = items.len(), "Loaded items");
    Ok(items)
}

pub async fn load_campaigns<P: WalletProvider>(
    binding: &ContractBinding<P>,
    methods: &MethodNames,
) -> Result<Vec<Campaign>, Error> {
    let campaigns: Vec<Campaign> = binding.call(&methods.all_campaigns, &[]).await?.list()?;
    debug!(contract = %binding.address(), count = campaigns.len(), "Loaded campaigns");
    Ok(campaigns)
}

/// Current mint price in base units.
pub async fn mint_price<P: WalletProvider>(
    binding: &ContractBinding<P>,
    methods: &MethodNames,
) -> Result<U256, Error> {
    binding.call(&methods.mint_price, &[]).await?.uint(0)
}
