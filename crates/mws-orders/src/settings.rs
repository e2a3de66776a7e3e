//! Host settings bag and the credentials extracted from it.

use std::collections::BTreeMap;

use crate::error::OrdersError;

pub const KEY_ENDPOINT: &str = "wsdl_url";
pub const KEY_ACCESS_KEY_ID: &str = "aws_access_key_id";
pub const KEY_SECRET_ACCESS_KEY: &str = "aws_secret_access_key";
pub const KEY_MERCHANT_ID: &str = "merchant_id";
pub const KEY_MARKETPLACE_ID: &str = "marketplace_id";

/// String-keyed settings as stored by the host for one transport.
///
/// **Values are redacted in `Debug` output.**
#[derive(Clone, Default, PartialEq, Eq)]
pub struct SettingsBag {
    values: BTreeMap<String, String>,
}

impl SettingsBag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Non-blank value for `key`, or a config error naming the key.
    fn require(&self, key: &str) -> Result<String, OrdersError> {
        match self.get(key).map(str::trim) {
            Some(v) if !v.is_empty() => Ok(v.to_string()),
            _ => Err(OrdersError::Config(format!(
                "transport setting '{key}' is missing or empty"
            ))),
        }
    }
}

impl std::fmt::Debug for SettingsBag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map()
            .entries(self.values.keys().map(|k| (k, "<REDACTED>")))
            .finish()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for SettingsBag {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut bag = SettingsBag::new();
        for (k, v) in iter {
            bag.insert(k, v);
        }
        bag
    }
}

/// Everything a client factory needs to build a client.
///
/// **The secret key is redacted in `Debug` output.**
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub endpoint: String,
    pub access_key_id: String,
    pub secret_access_key: String,
    pub merchant_id: String,
    pub marketplace_id: String,
}

impl Credentials {
    pub fn from_settings_bag(bag: &SettingsBag) -> Result<Self, OrdersError> {
        Ok(Self {
            endpoint: bag.require(KEY_ENDPOINT)?,
            access_key_id: bag.require(KEY_ACCESS_KEY_ID)?,
            secret_access_key: bag.require(KEY_SECRET_ACCESS_KEY)?,
            merchant_id: bag.require(KEY_MERCHANT_ID)?,
            marketplace_id: bag.require(KEY_MARKETPLACE_ID)?,
        })
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("endpoint", &self.endpoint)
            .field("access_key_id", &"<REDACTED>")
            .field("secret_access_key", &"<REDACTED>")
            .field("merchant_id", &self.merchant_id)
            .field("marketplace_id", &self.marketplace_id)
            .finish()
    }
}
