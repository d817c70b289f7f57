//! Hex account addresses with EIP-55 checksum handling.

use alloy_primitives::Address;

use crate::AddressError;

/// Parse a `0x`-prefixed, 40-hex-digit address.
///
/// All-lowercase and all-uppercase bodies are accepted as-is; mixed case
/// must be a valid EIP-55 checksum.
pub fn parse_address(input: &str) -> Result<Address, AddressError> {
    if input.is_empty() {
        return Err(AddressError::Empty);
    }
    let body = input
        .strip_prefix("0x")
        .ok_or(AddressError::MissingPrefix)?;
    if body.len() != 40 {
        return Err(AddressError::BadLength(body.len()));
    }
    if !body.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(AddressError::NotHex);
    }

    let has_lower = body.bytes().any(|b| b.is_ascii_lowercase());
    let has_upper = body.bytes().any(|b| b.is_ascii_uppercase());
    if has_lower && has_upper {
        return Address::parse_checksummed(input, None).map_err(|_| AddressError::BadChecksum);
    }
    input.parse::<Address>().map_err(|_| AddressError::NotHex)
}

pub fn is_valid_address(input: &str) -> bool {
    parse_address(input).is_ok()
}

/// EIP-55 mixed-case rendering.
pub fn to_checksum(address: &Address) -> String {
    address.to_checksum(None)
}
