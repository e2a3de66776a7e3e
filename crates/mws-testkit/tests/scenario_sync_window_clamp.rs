//! Scenario: sync windows end one buffer before wall-clock now, and a start
//! that is not strictly earlier than that end is pulled back one more buffer.
//!
//! GREEN when:
//! - `from = now` produces a window `[now - 6m, now - 3m)`.
//! - A start well in the past is sent unchanged.
//! - Modification syncs send `LastUpdated*`, backfills send `Created*`.
//! - A clock with sub-second precision never yields `After == Before` on
//!   the wire.

use chrono::{Duration, TimeZone, Utc};
use mws_orders::{Action, Transport};
use mws_testkit::{fixtures, settings_bag, FixedClock, ScriptedClient, ScriptedFactory};

fn wall() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2014, 3, 10, 12, 0, 0).unwrap()
}

fn transport(client: &ScriptedClient) -> Transport {
    Transport::init(&settings_bag(), &ScriptedFactory::new(client.clone()))
        .unwrap()
        .with_clock(FixedClock(wall()))
}

#[test]
fn from_equal_to_now_is_clamped_six_minutes_back() {
    let client = ScriptedClient::new();
    client.push_body(fixtures::orders_page("ListOrders", &[], None));
    let t = transport(&client);

    assert_eq!(t.get_mod_orders(wall()).count(), 0);

    let req = &client.requests()[0];
    assert_eq!(req.action(), Action::ListOrders);
    assert_eq!(req.params()["LastUpdatedAfter"], "2014-03-10T11:54:00Z");
    assert_eq!(req.params()["LastUpdatedBefore"], "2014-03-10T11:57:00Z");
}

#[test]
fn from_inside_the_buffer_is_clamped_too() {
    let client = ScriptedClient::new();
    client.push_body(fixtures::orders_page("ListOrders", &[], None));
    let t = transport(&client);

    // One minute ago is after now - 3m.
    let _ = t.get_mod_orders(wall() - Duration::minutes(1)).count();
    assert_eq!(
        client.requests()[0].params()["LastUpdatedAfter"],
        "2014-03-10T11:54:00Z"
    );
}

#[test]
fn earlier_from_is_sent_unchanged_for_backfill() {
    let client = ScriptedClient::new();
    client.push_body(fixtures::orders_page("ListOrders", &[], None));
    let t = transport(&client);

    let from = wall() - Duration::days(30);
    let _ = t.get_initial_orders(from).count();

    let req = &client.requests()[0];
    assert_eq!(req.params()["CreatedAfter"], "2014-02-08T12:00:00Z");
    assert_eq!(req.params()["CreatedBefore"], "2014-03-10T11:57:00Z");
    assert!(!req.params().contains_key("LastUpdatedAfter"));
}

#[test]
fn wider_buffer_moves_both_ends() {
    let client = ScriptedClient::new();
    client.push_body(fixtures::orders_page("ListOrders", &[], None));
    let t = transport(&client)
        .with_window(mws_orders::TimeWindow::with_buffer_secs(600).unwrap());

    let _ = t.get_mod_orders(wall()).count();
    let req = &client.requests()[0];
    assert_eq!(req.params()["LastUpdatedAfter"], "2014-03-10T11:40:00Z");
    assert_eq!(req.params()["LastUpdatedBefore"], "2014-03-10T11:50:00Z");
}

#[test]
fn millisecond_clock_never_sends_an_empty_window() {
    let client = ScriptedClient::new();
    client.push_body(fixtures::orders_page("ListOrders", &[], None));
    let t = Transport::init(&settings_bag(), &ScriptedFactory::new(client.clone()))
        .unwrap()
        .with_clock(FixedClock(wall() + Duration::milliseconds(900)));

    // Earlier than now - 3m by 500ms, but inside the same wire second.
    let from = wall() - Duration::minutes(3) + Duration::milliseconds(400);
    let _ = t.get_mod_orders(from).count();

    let req = &client.requests()[0];
    let after = &req.params()["LastUpdatedAfter"];
    let before = &req.params()["LastUpdatedBefore"];
    assert!(after < before, "{after} !< {before}");
    assert_eq!(after, "2014-03-10T11:54:00Z");
    assert_eq!(before, "2014-03-10T11:57:00Z");
}
