//! Scenario: unused-key report.
//!
//! GREEN when:
//! - leaves nothing reads are reported in Warn without erroring
//! - the same config errors in Fail
//! - a config made only of read keys is clean
//! - unused pointers come back sorted

use mws_config::{load_layered_yaml_from_strings, report_unused_keys, UnusedKeyPolicy};

const READ_ONLY_YAML: &str = r#"
mws:
  endpoint: "https://mws.amazonservices.com"
  merchant_id: "A2MERCHANT"
  marketplace_id: "ATVPDKIKX0DER"
  keys_env:
    access_key_id: "MWS_ACCESS_KEY_ID"
    secret_access_key: "MWS_SECRET_ACCESS_KEY"
http:
  timeout_secs: 30
sync:
  clock_skew_buffer_secs: 180
"#;

const EXTRA_YAML: &str = r#"
mws:
  region: "us-east-1"
sync:
  page_size: 100
legacy:
  wsdl: "x"
"#;

#[test]
fn read_keys_only_is_clean() {
    let loaded = load_layered_yaml_from_strings(&[READ_ONLY_YAML]).unwrap();
    let report = report_unused_keys(&loaded.config_json, UnusedKeyPolicy::Fail).unwrap();
    assert!(report.is_clean(), "{:?}", report.unused_leaf_pointers);
}

#[test]
fn warn_reports_unused_keys_sorted() {
    let loaded = load_layered_yaml_from_strings(&[READ_ONLY_YAML, EXTRA_YAML]).unwrap();
    let report = report_unused_keys(&loaded.config_json, UnusedKeyPolicy::Warn).unwrap();
    assert_eq!(
        report.unused_leaf_pointers,
        vec![
            "/legacy/wsdl".to_string(),
            "/mws/region".to_string(),
            "/sync/page_size".to_string(),
        ]
    );
}

#[test]
fn fail_errors_on_unused_keys() {
    let loaded = load_layered_yaml_from_strings(&[READ_ONLY_YAML, EXTRA_YAML]).unwrap();
    let msg = report_unused_keys(&loaded.config_json, UnusedKeyPolicy::Fail)
        .unwrap_err()
        .to_string();
    assert!(msg.contains("CONFIG_UNUSED_KEYS"), "got: {msg}");
    assert!(msg.contains("3 unused"), "got: {msg}");
}
