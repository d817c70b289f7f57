//! Shared types and pure-logic utilities for the collectibles client.
//! No network or storage access, so any front end can use it.

mod address;
mod error;
mod units;
mod validation;

pub use address::{is_valid_address, parse_address, to_checksum};
pub use error::{AddressError, AmountError};
pub use units::{BASE_UNIT_DECIMALS, format_ether, format_units, parse_ether, parse_units};
pub use validation::{
    CreateNftInput, FieldErrors, ValidatedCreateNft, amount_message, validate_create_nft,
};

pub use alloy_primitives::{Address, U256};
