//! Signature Version 2 (HmacSHA256).
//!
//! string-to-sign = METHOD "\n" host "\n" path "\n" canonical-query
//!
//! The canonical query is every parameter sorted by byte order of the key,
//! with keys and values percent-encoded per RFC 3986 (`~` unreserved, space as
//! `%20`).

use std::collections::BTreeMap;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use hmac::{Hmac, Mac};
use mws_orders::OrdersError;
use sha2::Sha256;

pub const SIGNATURE_METHOD: &str = "HmacSHA256";
pub const SIGNATURE_VERSION: &str = "2";

type HmacSha256 = Hmac<Sha256>;

pub fn canonical_query(params: &BTreeMap<String, String>) -> String {
    params
        .iter()
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

pub fn string_to_sign(method: &str, host: &str, path: &str, canonical: &str) -> String {
    let path = if path.is_empty() { "/" } else { path };
    format!("{method}\n{host}\n{path}\n{canonical}")
}

/// Base64 of HMAC-SHA256(secret, data).
pub fn sign(secret: &str, data: &str) -> Result<String, OrdersError> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| OrdersError::Config(format!("invalid signing key: {e}")))?;
    mac.update(data.as_bytes());
    Ok(STANDARD.encode(mac.finalize().into_bytes()))
}
