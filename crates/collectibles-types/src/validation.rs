//! Field-level validation for the write-path forms.

use alloy_primitives::{Address, U256};
use serde::Serialize;

use crate::{AmountError, parse_address, parse_ether};

/// Per-field messages, rendered next to the offending input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FieldErrors {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl FieldErrors {
    pub fn is_empty(&self) -> bool {
        self.fields().next().is_none()
    }

    /// `(field, message)` pairs in form order.
    pub fn fields(&self) -> impl Iterator<Item = (&'static str, &str)> {
        [
            ("name", &self.name),
            ("owner", &self.owner),
            ("price", &self.price),
            ("image", &self.image),
        ]
        .into_iter()
        .filter_map(|(field, msg)| msg.as_deref().map(|m| (field, m)))
    }
}

impl std::fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for (field, msg) in self.fields() {
            if !first {
                write!(f, "; ")?;
            }
            write!(f, "{field}: {msg}")?;
            first = false;
        }
        Ok(())
    }
}

impl std::error::Error for FieldErrors {}

/// Raw create-NFT form contents.
#[derive(Debug, Clone, Copy)]
pub struct CreateNftInput<'a> {
    pub name: &'a str,
    pub owner: &'a str,
    pub price: &'a str,
    pub image_data: &'a str,
}

/// Create-NFT input that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedCreateNft {
    pub name: String,
    pub owner: Address,
    pub price: U256,
}

pub fn validate_create_nft(input: &CreateNftInput<'_>) -> Result<ValidatedCreateNft, FieldErrors> {
    let mut errors = FieldErrors::default();

    let name = input.name.trim();
    if name.is_empty() {
        errors.name = Some("Name is required".into());
    }

    let owner = input.owner.trim();
    let owner = if owner.is_empty() {
        errors.owner = Some("Owner address is required".into());
        None
    } else {
        match parse_address(owner) {
            Ok(address) => Some(address),
            Err(_) => {
                errors.owner = Some("Invalid Ethereum address".into());
                None
            }
        }
    };

    let price = match parse_ether(input.price) {
        Ok(value) => Some(value),
        Err(e) => {
            errors.price = Some(price_message(&e, "Price").into());
            None
        }
    };

    if input.image_data.is_empty() {
        errors.image = Some("Image is required".into());
    }

    match (owner, price) {
        (Some(owner), Some(price)) if errors.is_empty() => Ok(ValidatedCreateNft {
            name: name.to_string(),
            owner,
            price,
        }),
        _ => Err(errors),
    }
}

/// Message shown for a rejected payable amount such as a contribution.
pub fn amount_message(error: &AmountError) -> String {
    price_message(error, "Amount")
}

fn price_message(error: &AmountError, label: &str) -> String {
    match error {
        AmountError::Empty => format!("{label} is required"),
        AmountError::TooManyDecimals { max } => {
            format!("{label} supports at most {max} decimal places")
        }
        AmountError::NotNumeric(_) | AmountError::NotPositive | AmountError::Overflow => {
            format!("{label} must be a positive number")
        }
    }
}
