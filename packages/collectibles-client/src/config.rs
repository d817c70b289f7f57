//! Client configuration.

use serde::Deserialize;
use std::time::Duration;

/// Which deployed contract a binding targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContractKind {
    /// Token contract used by the create form.
    Nft,
    /// Listing + mint contract.
    Marketplace,
    Crowdfunding,
}

impl ContractKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Nft => "nft",
            Self::Marketplace => "marketplace",
            Self::Crowdfunding => "crowdfunding",
        }
    }
}

impl std::fmt::Display for ContractKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// One deployed contract: address, interface descriptor source and chain.
#[derive(Debug, Clone, Deserialize)]
pub struct Deployment {
    pub address: String,

    /// Hardhat artifact or bare ABI file. Bundled ABI when unset.
    #[serde(default)]
    pub abi_path: Option<String>,

    /// Refuse to bind when the session is on another chain.
    #[serde(default)]
    pub chain_id: Option<u64>,
}

/// Contract method names. Revisions of the contracts renamed these.
#[derive(Debug, Clone, Deserialize)]
pub struct MethodNames {
    #[serde(default = "defaults::create_nft")]
    pub create_nft: String,
    #[serde(default = "defaults::mint")]
    pub mint: String,
    #[serde(default = "defaults::mint_price")]
    pub mint_price: String,
    #[serde(default = "defaults::all_items")]
    pub all_items: String,
    #[serde(default = "defaults::all_campaigns")]
    pub all_campaigns: String,
    #[serde(default = "defaults::contribute")]
    pub contribute: String,
}

impl Default for MethodNames {
    fn default() -> Self {
        Self {
            create_nft: defaults::create_nft(),
            mint: defaults::mint(),
            mint_price: defaults::mint_price(),
            all_items: defaults::all_items(),
            all_campaigns: defaults::all_campaigns(),
            contribute: defaults::contribute(),
        }
    }
}

/// Configuration for the collectibles client and upload endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Wallet JSON-RPC endpoint. Empty means no wallet is available.
    #[serde(default = "defaults::rpc_url")]
    pub rpc_url: String,

    #[serde(default)]
    pub fallback_rpc_url: Option<String>,

    #[serde(default = "defaults::store_path")]
    pub store_path: String,

    /// 0 waits for confirmation without bound.
    #[serde(default = "defaults::confirmation_timeout_secs")]
    pub confirmation_timeout_secs: u64,

    #[serde(default = "defaults::poll_interval_ms")]
    pub poll_interval_ms: u64,

    #[serde(default = "defaults::nft")]
    pub nft: Deployment,

    #[serde(default = "defaults::marketplace")]
    pub marketplace: Deployment,

    #[serde(default = "defaults::crowdfunding")]
    pub crowdfunding: Deployment,

    #[serde(default)]
    pub methods: MethodNames,

    #[serde(default = "defaults::upload_dir")]
    pub upload_dir: String,

    #[serde(default = "defaults::max_upload_bytes")]
    pub max_upload_bytes: usize,

    #[serde(default = "defaults::bind_address")]
    pub bind_address: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rpc_url: defaults::rpc_url(),
            fallback_rpc_url: None,
            store_path: defaults::store_path(),
            confirmation_timeout_secs: defaults::confirmation_timeout_secs(),
            poll_interval_ms: defaults::poll_interval_ms(),
            nft: defaults::nft(),
            marketplace: defaults::marketplace(),
            crowdfunding: defaults::crowdfunding(),
            methods: MethodNames::default(),
            upload_dir: defaults::upload_dir(),
            max_upload_bytes: defaults::max_upload_bytes(),
            bind_address: defaults::bind_address(),
        }
    }
}

impl Config {
    /// Load from `collectibles.{toml,yaml,json}` and `COLLECTIBLES_*` env vars.
    ///
    /// Nested keys use `__`, e.g. `COLLECTIBLES_MARKETPLACE__ADDRESS`.
    pub fn load() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::File::with_name("collectibles").required(false))
            .add_source(
                config::Environment::with_prefix("COLLECTIBLES")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()
    }

    pub fn deployment(&self, kind: ContractKind) -> &Deployment {
        match kind {
            ContractKind::Nft => &self.nft,
            ContractKind::Marketplace => &self.marketplace,
            ContractKind::Crowdfunding => &self.crowdfunding,
        }
    }

    /// `None` when confirmation waits are unbounded.
    pub fn confirmation_timeout(&self) -> Option<Duration> {
        (self.confirmation_timeout_secs > 0)
            .then(|| Duration::from_secs(self.confirmation_timeout_secs))
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }
}

mod defaults {
    use super::Deployment;

    fn deployment(address: &str) -> Deployment {
        Deployment {
            address: address.into(),
            abi_path: None,
            chain_id: None,
        }
    }

    pub fn rpc_url() -> String {
        std::env::var("ETH_RPC_URL").unwrap_or_else(|_| "http://127.0.0.1:8545".into())
    }

    pub fn store_path() -> String {
        "./.collectibles".into()
    }

    pub fn confirmation_timeout_secs() -> u64 {
        120
    }

    pub fn poll_interval_ms() -> u64 {
        1_000
    }

    pub fn nft() -> Deployment {
        deployment("0x5AaA1c838039a4dD3C8E4fc86BB9c5b4387f40Ee")
    }

    pub fn marketplace() -> Deployment {
        deployment("0xd8D343348C86b7f1Ec9e213e86ca9A1212045151")
    }

    pub fn crowdfunding() -> Deployment {
        deployment("0x3Bd1a89cd6D97f381035B80CdD3c2CCb1D1d7519")
    }

    pub fn create_nft() -> String {
        "createNFT".into()
    }

    pub fn mint() -> String {
        "mintNFT".into()
    }

    pub fn mint_price() -> String {
        "mintPrice".into()
    }

    pub fn all_items() -> String {
        "getAllNFTs".into()
    }

    pub fn all_campaigns() -> String {
        "getAllCampaigns".into()
    }

    pub fn contribute() -> String {
        "contribute".into()
    }

    pub fn upload_dir() -> String {
        "public/uploads".into()
    }

    pub fn max_upload_bytes() -> usize {
        10 * 1024 * 1024
    }

    pub fn bind_address() -> String {
        "0.0.0.0:3050".into()
    }
}
