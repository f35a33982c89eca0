// SPDX-License-Identifier: MIT

use super::*;
use std::collections::HashMap;

// --- define_id! macro tests ---

crate::define_id! {
    /// Test ID type for macro verification.
    pub struct TestId("test");
}

#[test]
fn define_id_new_carries_prefix() {
    let id = TestId::new();
    assert!(id.as_str().starts_with("test"));
    assert_eq!(id.as_str().len(), ID_MAX_LEN);
}

#[test]
fn define_id_new_generates_unique_ids() {
    let a = TestId::new();
    let b = TestId::new();
    assert_ne!(a, b);
}

#[test]
fn define_id_from_string_round_trips() {
    let id = TestId::from_string("test-abc123");
    assert_eq!(id.as_str(), "test-abc123");
}

#[test]
fn define_id_hash_map_lookup() {
    let mut map = HashMap::new();
    let id = TestId::from_string("test-k");
    map.insert(id, 42);
    assert_eq!(map.get("test-k"), Some(&42));
}

// --- short()/suffix() tests ---

#[test]
fn define_id_short_truncates_suffix() {
    let id = TestId::from_string("testabcdefghijklmnop");
    assert_eq!(id.short(4), "abcd");
}

#[test]
fn define_id_short_returns_full_suffix_when_shorter() {
    let id = TestId::from_string("testabc");
    assert_eq!(id.short(8), "abc");
}

#[test]
fn define_id_suffix_strips_prefix() {
    let id = TestId::from_string("testabc123");
    assert_eq!(id.suffix(), "abc123");
}

#[test]
fn define_id_is_empty() {
    assert!(TestId::from_string("").is_empty());
    assert!(!TestId::new().is_empty());
}

#[test]
fn define_id_display_matches_as_str() {
    let id = TestId::from_string("test-display");
    assert_eq!(id.to_string(), "test-display");
}

#[test]
fn short_fn_on_str() {
    let s = "abcdefghijklmnop";
    assert_eq!(short(s, 8), "abcdefgh");
    assert_eq!(short(s, 100), s);
    assert_eq!(short("abc", 8), "abc");
}
