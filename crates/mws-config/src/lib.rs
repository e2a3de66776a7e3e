//! mws-config
//!
//! Layered YAML configuration for the order sync.
//!
//! - Documents are deep-merged in order: earlier docs are base, later docs
//!   override.
//! - The merged tree is hashed over its canonical JSON so a run can record
//!   exactly which configuration it used.
//! - Literal secrets are rejected. YAML holds env var NAMES only; see
//!   [`secrets`].
//! - [`report_unused_keys`] flags leaves no consumer reads.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::collections::BTreeSet;
use std::fs;
use std::time::Duration;

use mws_orders::settings::{
    KEY_ACCESS_KEY_ID, KEY_ENDPOINT, KEY_MARKETPLACE_ID, KEY_MERCHANT_ID, KEY_SECRET_ACCESS_KEY,
};
use mws_orders::window::MIN_CLOCK_SKEW_BUFFER_SECS;
use mws_orders::{SettingsBag, TimeWindow, CLOCK_SKEW_BUFFER_SECS};

pub mod secrets;

pub use secrets::{resolve_secrets, ResolvedSecrets};

/// Known secret-like prefixes. A leaf string starting with one of these aborts
/// the load with CONFIG_SECRET_DETECTED.
const SECRET_PREFIXES: &[&str] = &[
    "AKIA",       // AWS access key ID
    "ASIA",       // AWS temporary access key ID
    "amzn.mws.",  // MWS auth token
    "-----BEGIN", // PEM private keys
    "sk-",
    "ghp_",
    "xoxb-",
];

pub const DEFAULT_ENDPOINT: &str = "https://mws.amazonservices.com";
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// JSON-pointer prefixes read by [`MwsConfig::from_config_json`] and
/// [`secrets::resolve_secrets`]. Keep in step with those readers.
pub const CONSUMED_POINTERS: &[&str] = &[
    "/mws/endpoint",
    "/mws/merchant_id",
    "/mws/marketplace_id",
    "/mws/keys_env/access_key_id",
    "/mws/keys_env/secret_access_key",
    "/http/timeout_secs",
    "/sync/clock_skew_buffer_secs",
];

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config_hash: String,
    pub canonical_json: String,
    pub config_json: Value,
}

pub fn load_layered_yaml(paths: &[&str]) -> Result<LoadedConfig> {
    let mut docs: Vec<String> = Vec::new();
    for p in paths {
        let raw =
            fs::read_to_string(p).with_context(|| format!("failed to read yaml path: {p}"))?;
        docs.push(raw);
    }

    let doc_refs: Vec<&str> = docs.iter().map(|s| s.as_str()).collect();
    load_layered_yaml_from_strings(&doc_refs)
}

pub fn load_layered_yaml_from_strings(yaml_docs: &[&str]) -> Result<LoadedConfig> {
    let mut merged = serde_json::json!({});
    for raw in yaml_docs {
        let v_yaml: serde_yaml::Value = serde_yaml::from_str(raw).context("invalid yaml")?;
        let v_json = serde_json::to_value(v_yaml).context("yaml->json conversion failed")?;
        // An empty document parses as null; it must not wipe the layers below.
        if v_json.is_null() {
            continue;
        }
        merged = deep_merge(merged, v_json);
    }

    enforce_no_secret_literals(&merged)?;

    // serde_json's default Map is ordered by key, so this is canonical.
    let canonical_json = serde_json::to_string(&merged).context("canonical json serialize failed")?;
    let config_hash = sha256_hex(canonical_json.as_bytes());
    Ok(LoadedConfig {
        config_hash,
        canonical_json,
        config_json: merged,
    })
}

fn deep_merge(a: Value, b: Value) -> Value {
    match (a, b) {
        (Value::Object(mut a_map), Value::Object(b_map)) => {
            for (k, b_val) in b_map {
                let a_val = a_map.remove(&k).unwrap_or(Value::Null);
                a_map.insert(k, deep_merge(a_val, b_val));
            }
            Value::Object(a_map)
        }
        (_, b_other) => b_other,
    }
}

fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

fn enforce_no_secret_literals(v: &Value) -> Result<()> {
    let mut leaves = Vec::new();
    collect_leaf_pointers(v, "", &mut leaves);

    for ptr in leaves {
        if let Some(s) = v.pointer(&ptr).and_then(Value::as_str) {
            if looks_like_secret(s) {
                bail!("CONFIG_SECRET_DETECTED leaf={} value=REDACTED", ptr);
            }
        }
    }
    Ok(())
}

fn looks_like_secret(s: &str) -> bool {
    let t = s.trim();
    if t.len() < 8 {
        return false;
    }
    SECRET_PREFIXES.iter().any(|p| t.starts_with(p))
}

// ---------------------------------------------------------------------------
// Typed view
// ---------------------------------------------------------------------------

/// The settings the sync reads, validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MwsConfig {
    pub endpoint: String,
    pub merchant_id: String,
    pub marketplace_id: String,
    pub http_timeout: Duration,
    pub clock_skew_buffer_secs: i64,
}

impl MwsConfig {
    pub fn from_config_json(config: &Value) -> Result<Self> {
        let endpoint = read_str_at(config, "/mws/endpoint")
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());
        let merchant_id = read_str_at(config, "/mws/merchant_id")
            .context("CONFIG_MISSING: /mws/merchant_id is required")?;
        let marketplace_id = read_str_at(config, "/mws/marketplace_id")
            .context("CONFIG_MISSING: /mws/marketplace_id is required")?;

        let timeout_secs = read_u64_at(config, "/http/timeout_secs")?
            .unwrap_or(DEFAULT_HTTP_TIMEOUT_SECS);
        if timeout_secs == 0 {
            bail!("CONFIG_INVALID: /http/timeout_secs must be > 0");
        }

        let buffer = match read_u64_at(config, "/sync/clock_skew_buffer_secs")? {
            Some(v) => i64::try_from(v)
                .context("CONFIG_INVALID: /sync/clock_skew_buffer_secs out of range")?,
            None => CLOCK_SKEW_BUFFER_SECS,
        };
        if buffer < MIN_CLOCK_SKEW_BUFFER_SECS {
            bail!(
                "CONFIG_INVALID: /sync/clock_skew_buffer_secs={} is below the minimum of {}",
                buffer,
                MIN_CLOCK_SKEW_BUFFER_SECS
            );
        }

        Ok(Self {
            endpoint,
            merchant_id,
            marketplace_id,
            http_timeout: Duration::from_secs(timeout_secs),
            clock_skew_buffer_secs: buffer,
        })
    }

    pub fn time_window(&self) -> Result<TimeWindow> {
        TimeWindow::with_buffer_secs(self.clock_skew_buffer_secs).map_err(anyhow::Error::from)
    }

    /// Host settings bag for `Transport::init`.
    pub fn to_settings_bag(&self, secrets: &ResolvedSecrets) -> SettingsBag {
        [
            (KEY_ENDPOINT, self.endpoint.as_str()),
            (KEY_ACCESS_KEY_ID, secrets.access_key_id.as_str()),
            (KEY_SECRET_ACCESS_KEY, secrets.secret_access_key.as_str()),
            (KEY_MERCHANT_ID, self.merchant_id.as_str()),
            (KEY_MARKETPLACE_ID, self.marketplace_id.as_str()),
        ]
        .into_iter()
        .collect()
    }
}

/// Non-blank string at `pointer`, trimmed.
pub(crate) fn read_str_at(config: &Value, pointer: &str) -> Option<String> {
    let s = config.pointer(pointer)?.as_str()?;
    let trimmed = s.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn read_u64_at(config: &Value, pointer: &str) -> Result<Option<u64>> {
    match config.pointer(pointer) {
        None | Some(Value::Null) => Ok(None),
        Some(v) => match v.as_u64() {
            Some(n) => Ok(Some(n)),
            None => bail!("CONFIG_INVALID: {} must be a non-negative integer", pointer),
        },
    }
}

// ---------------------------------------------------------------------------
// Unused-key report
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnusedKeyPolicy {
    Warn,
    Fail,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnusedKeyReport {
    /// Consumed JSON-pointer prefixes used for this analysis (sorted, unique)
    pub consumed_prefixes: Vec<String>,
    /// Unused leaf pointers (sorted)
    pub unused_leaf_pointers: Vec<String>,
}

impl UnusedKeyReport {
    pub fn is_clean(&self) -> bool {
        self.unused_leaf_pointers.is_empty()
    }
}

/// Leaves of `config_json` not under any of [`CONSUMED_POINTERS`].
/// With `Fail`, a non-clean report is an error.
pub fn report_unused_keys(config_json: &Value, policy: UnusedKeyPolicy) -> Result<UnusedKeyReport> {
    let consumed_prefixes: Vec<String> = CONSUMED_POINTERS
        .iter()
        .map(|p| normalize_pointer(p))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let mut leaves: Vec<String> = Vec::new();
    collect_leaf_pointers(config_json, "", &mut leaves);

    let mut unused: Vec<String> = leaves
        .into_iter()
        .filter(|lp| !consumed_prefixes.iter().any(|cp| is_prefix_pointer(cp, lp)))
        .collect();
    unused.sort();
    unused.dedup();

    let report = UnusedKeyReport {
        consumed_prefixes,
        unused_leaf_pointers: unused,
    };

    if policy == UnusedKeyPolicy::Fail && !report.is_clean() {
        bail!(
            "CONFIG_UNUSED_KEYS: {} unused config leaf key(s) detected. \
            Remove them or update the consumed registry. First few: {}",
            report.unused_leaf_pointers.len(),
            preview_list(&report.unused_leaf_pointers, 12)
        );
    }

    Ok(report)
}

/// Must begin with "/"; no trailing "/" unless it is just "/".
fn normalize_pointer(p: &str) -> String {
    let mut s = p.trim().to_string();
    if s.is_empty() {
        return "/".to_string();
    }
    if !s.starts_with('/') {
        s.insert(0, '/');
    }
    while s.ends_with('/') && s.len() > 1 {
        s.pop();
    }
    s
}

/// "/a/b" consumes "/a/b" and "/a/b/c" but not "/a/bc".
fn is_prefix_pointer(prefix: &str, leaf: &str) -> bool {
    if prefix == "/" || leaf == prefix {
        return true;
    }
    leaf.strip_prefix(prefix)
        .map(|rest| rest.starts_with('/'))
        .unwrap_or(false)
}

fn collect_leaf_pointers(v: &Value, prefix: &str, out: &mut Vec<String>) {
    match v {
        Value::Object(map) => {
            for (k, vv) in map.iter() {
                let next = format!("{}/{}", prefix, escape_pointer_token(k));
                collect_leaf_pointers(vv, &next, out);
            }
        }
        Value::Array(arr) => {
            for (i, vv) in arr.iter().enumerate() {
                let next = format!("{}/{}", prefix, i);
                collect_leaf_pointers(vv, &next, out);
            }
        }
        _ => {
            let p = if prefix.is_empty() {
                "/".to_string()
            } else {
                prefix.to_string()
            };
            out.push(p);
        }
    }
}

fn escape_pointer_token(s: &str) -> String {
    s.replace('~', "~0").replace('/', "~1")
}

fn preview_list(items: &[String], n: usize) -> String {
    let take = items.iter().take(n).cloned().collect::<Vec<_>>();
    format!("{:?}", take)
}
