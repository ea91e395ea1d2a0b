//! Syntactic checks for client configuration values.

use alloy_primitives::Address;
use url::Url;

/// Whether `url` parses as an absolute URL.
#[must_use]
pub fn is_valid_url(url: &str) -> bool {
    Url::parse(url).is_ok()
}

/// Whether `address` is a well-formed EVM account address.
///
/// Accepts 40 hex digits with an optional `0x` prefix. All-lowercase and
/// all-uppercase addresses are accepted as is; mixed-case addresses must carry
/// a valid EIP-55 checksum.
#[must_use]
pub fn is_valid_address(address: &str) -> bool {
    parse_address(address).is_some()
}

pub(crate) fn parse_address(address: &str) -> Option<Address> {
    let hex = address.strip_prefix("0x").unwrap_or(address);
    if hex.len() != 40 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let mixed_case =
        hex.chars().any(|c| c.is_ascii_lowercase()) && hex.chars().any(|c| c.is_ascii_uppercase());
    if mixed_case {
        Address::parse_checksummed(format!("0x{hex}"), None).ok()
    } else {
        hex.parse().ok()
    }
}
