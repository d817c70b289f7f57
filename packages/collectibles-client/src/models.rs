//! View-models derived from contract results, and the persisted record.

use alloy_primitives::{Address, U256};
use collectibles_types::format_ether;
use serde::{Deserialize, Serialize};

const SECONDS_PER_DAY: i64 = 86_400;

/// Anything listed by title; titles identify items across listing and storage.
pub trait Titled {
    fn title(&self) -> &str;
}

/// A collectible as listed by the marketplace contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectibleItem {
    pub token_id: u64,
    pub title: String,
    pub image: String,
    pub creator: Address,
    pub price: U256,
    pub owner: Address,
    pub created_at: u64,
}

impl CollectibleItem {
    pub fn price_display(&self) -> String {
        format_ether(self.price)
    }
}

impl Titled for CollectibleItem {
    fn title(&self) -> &str {
        &self.title
    }
}

/// A crowdfunding campaign.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Campaign {
    pub id: u64,
    pub title: String,
    pub description: String,
    #[serde(rename = "imageURI")]
    pub image_uri: String,
    pub goal: U256,
    pub starts_at: u64,
    pub ends_at: u64,
    pub status: u8,
    pub total_contributions: U256,
    pub contributors: Vec<Address>,
    pub contribution_amounts: Vec<U256>,
}

impl Campaign {
    /// Funded share of the goal, 0..=100.
    pub fn progress_percent(&self) -> u8 {
        if self.goal.is_zero() {
            return 0;
        }
        let pct = self.total_contributions.saturating_mul(U256::from(100u8)) / self.goal;
        u8::try_from(pct.min(U256::from(100u8))).unwrap_or(100)
    }

    /// Whole days until `ends_at`; negative once the campaign has ended.
    pub fn days_left(&self, now_secs: u64) -> i64 {
        let days = (i128::from(self.ends_at) - i128::from(now_secs)).div_euclid(i128::from(SECONDS_PER_DAY));
        days.clamp(i128::from(i64::MIN), i128::from(i64::MAX)) as i64
    }

    pub fn patrons(&self) -> usize {
        self.contributors.len()
    }

    pub fn raised_display(&self) -> String {
        format_ether(self.total_contributions)
    }

    pub fn goal_display(&self) -> String {
        format_ether(self.goal)
    }
}

impl Titled for Campaign {
    fn title(&self) -> &str {
        &self.title
    }
}

/// A created or purchased collectible, remembered locally per owner.
///
/// Field names match the browser-era storage layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_id: Option<u64>,
    pub title: String,
    #[serde(alias = "imageData")]
    pub image: String,
    pub creator: String,
    /// Decimal ether.
    pub price: String,
    pub purchase_date: String,
    pub owner: String,
    #[serde(
        default,
        rename = "metadataURI",
        skip_serializing_if = "Option::is_none"
    )]
    pub metadata_uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tx_hash: Option<String>,
}

impl Titled for PersistedRecord {
    fn title(&self) -> &str {
        &self.title
    }
}
