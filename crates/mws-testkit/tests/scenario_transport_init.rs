//! Scenario: transport initialisation from the host settings bag.

use mws_orders::settings::{KEY_ENDPOINT, KEY_SECRET_ACCESS_KEY};
use mws_orders::{OrdersError, SettingsBag, Transport};
use mws_testkit::{settings_bag, ScriptedClient, ScriptedFactory, TEST_NAMESPACE};

#[test]
fn namespace_is_endpoint_plus_client_version() {
    let factory = ScriptedFactory::new(ScriptedClient::new());
    let t = Transport::init(&settings_bag(), &factory).unwrap();
    assert_eq!(t.namespace(), TEST_NAMESPACE);

    let created = factory.created_with();
    assert_eq!(created.len(), 1);
    assert_eq!(created[0].merchant_id, "A2MERCHANT");
    assert_eq!(created[0].marketplace_id, "ATVPDKIKX0DER");
}

#[test]
fn trailing_slash_on_endpoint_is_ignored() {
    let mut bag = settings_bag();
    bag.insert(KEY_ENDPOINT, "https://mws.amazonservices.com/");
    let t = Transport::init(&bag, &ScriptedFactory::new(ScriptedClient::new())).unwrap();
    assert_eq!(t.namespace(), TEST_NAMESPACE);
}

#[test]
fn incomplete_settings_fail_before_the_factory_is_called() {
    let mut bag = settings_bag();
    bag.insert(KEY_SECRET_ACCESS_KEY, "");
    let factory = ScriptedFactory::new(ScriptedClient::new());

    let err = Transport::init(&bag, &factory).unwrap_err();
    assert!(err.is_config());
    assert!(err.to_string().contains("aws_secret_access_key"));
    assert!(factory.created_with().is_empty());
}

#[test]
fn empty_bag_is_a_config_error() {
    let err = Transport::init(&SettingsBag::new(), &ScriptedFactory::default()).unwrap_err();
    assert!(matches!(err, OrdersError::Config(_)));
}
