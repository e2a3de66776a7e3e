//! Runtime secret resolution.
//!
//! # Contract
//! - Config YAML stores only **env var NAMES** (e.g. `"MWS_ACCESS_KEY_ID"`).
//! - Callers invoke [`resolve_secrets`] once at startup and pass the result
//!   on; `std::env::var` is not read anywhere else.
//! - `Debug` redacts values. Errors name the env var, never its value.

use anyhow::{bail, Result};
use serde_json::Value;

use crate::read_str_at;

pub const DEFAULT_ACCESS_KEY_ID_VAR: &str = "MWS_ACCESS_KEY_ID";
pub const DEFAULT_SECRET_ACCESS_KEY_VAR: &str = "MWS_SECRET_ACCESS_KEY";

/// MWS keys resolved from the environment.
///
/// **Values are redacted in `Debug` output.**
#[derive(Clone)]
pub struct ResolvedSecrets {
    pub access_key_id: String,
    pub secret_access_key: String,
}

impl std::fmt::Debug for ResolvedSecrets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedSecrets")
            .field("access_key_id", &"<REDACTED>")
            .field("secret_access_key", &"<REDACTED>")
            .finish()
    }
}

/// Env var names from the config, falling back to the defaults above.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecretEnvNames {
    pub access_key_id_var: String,
    pub secret_access_key_var: String,
}

impl SecretEnvNames {
    pub fn from_config_json(config_json: &Value) -> Self {
        Self {
            access_key_id_var: read_str_at(config_json, "/mws/keys_env/access_key_id")
                .unwrap_or_else(|| DEFAULT_ACCESS_KEY_ID_VAR.to_string()),
            secret_access_key_var: read_str_at(config_json, "/mws/keys_env/secret_access_key")
                .unwrap_or_else(|| DEFAULT_SECRET_ACCESS_KEY_VAR.to_string()),
        }
    }
}

/// Unset and blank both read as absent.
fn resolve_env(var_name: &str) -> Option<String> {
    match std::env::var(var_name) {
        Ok(v) if !v.trim().is_empty() => Some(v),
        _ => None,
    }
}

/// Resolve both keys. Both are required.
///
/// # Errors
/// Returns `Err` naming the first missing env var.
pub fn resolve_secrets(config_json: &Value) -> Result<ResolvedSecrets> {
    let names = SecretEnvNames::from_config_json(config_json);

    let Some(access_key_id) = resolve_env(&names.access_key_id_var) else {
        bail!(
            "SECRETS_MISSING: required env var '{}' (access key id) is not set or empty",
            names.access_key_id_var
        );
    };
    let Some(secret_access_key) = resolve_env(&names.secret_access_key_var) else {
        bail!(
            "SECRETS_MISSING: required env var '{}' (secret access key) is not set or empty",
            names.secret_access_key_var
        );
    };

    Ok(ResolvedSecrets {
        access_key_id,
        secret_access_key,
    })
}
