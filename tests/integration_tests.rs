//! Integration tests for the QuartzKV client
//!
//! End-to-end properties of the execution pipeline against the in-memory
//! server double: store preconditions, format fidelity across a round trip
//! and CAS assignment.

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{InMemoryNode, MockPool};
use quartzkv_client::operations::{Add, Delete, Get, GetK, Replace, Set};
use quartzkv_client::protocol::ResponseStatus;
use quartzkv_client::transcoder::{DataFormat, DefaultTranscoder, Transcoder, Value};
use quartzkv_client::{MultiplexIoService, PoolConfig, VBucket};

const TIMEOUT: Duration = Duration::from_millis(2500);

fn transcoder() -> Arc<dyn Transcoder> {
    Arc::new(DefaultTranscoder)
}

fn service() -> Arc<MultiplexIoService> {
    MockPool::service(Box::new(InMemoryNode::new()), PoolConfig::default())
}

// =============================================================================
// Store Precondition Tests
// =============================================================================

#[test]
fn test_delete_add_get_round_trip() {
    let service = service();

    let mut delete = Delete::new("k", VBucket::default(), TIMEOUT);
    service.execute(&mut delete); // key may not exist; outcome irrelevant

    let mut add = Add::new("k", "stored value", VBucket::default(), transcoder(), TIMEOUT);
    assert!(service.execute(&mut add).success);

    let mut get = Get::new("k", VBucket::default(), transcoder(), TIMEOUT);
    let result = service.execute(&mut get);

    assert!(result.success);
    assert_eq!(result.value, Some(Value::Text("stored value".to_string())));
}

#[test]
fn test_add_existing_key_reports_key_exists() {
    let service = service();

    let mut first = Add::new("dup", "a", VBucket::default(), transcoder(), TIMEOUT);
    assert!(service.execute(&mut first).success);

    let mut second = Add::new("dup", "b", VBucket::default(), transcoder(), TIMEOUT);
    let result = service.execute(&mut second);

    assert!(!result.success);
    assert_eq!(result.status, ResponseStatus::KeyExists);
}

#[test]
fn test_replace_missing_key_reports_key_not_found() {
    let service = service();

    let mut replace = Replace::new("ghost", "v", VBucket::default(), transcoder(), TIMEOUT);
    let result = service.execute(&mut replace);

    assert!(!result.success);
    assert_eq!(result.status, ResponseStatus::KeyNotFound);
}

#[test]
fn test_replace_overwrites_existing_value() {
    let service = service();

    let mut set = Set::new("k", "old", VBucket::default(), transcoder(), TIMEOUT);
    assert!(service.execute(&mut set).success);

    let mut replace = Replace::new("k", "new", VBucket::default(), transcoder(), TIMEOUT);
    assert!(service.execute(&mut replace).success);

    let mut get = Get::new("k", VBucket::default(), transcoder(), TIMEOUT);
    let result = service.execute(&mut get);
    assert_eq!(result.value, Some(Value::Text("new".to_string())));
}

#[test]
fn test_set_overwrites_unconditionally() {
    let service = service();

    for value in ["one", "two", "three"] {
        let mut set = Set::new("k", value, VBucket::default(), transcoder(), TIMEOUT);
        assert!(service.execute(&mut set).success);
    }

    let mut get = Get::new("k", VBucket::default(), transcoder(), TIMEOUT);
    let result = service.execute(&mut get);
    assert_eq!(result.value, Some(Value::Text("three".to_string())));
}

#[test]
fn test_delete_missing_key_reports_key_not_found() {
    let service = service();

    let mut delete = Delete::new("never-stored", VBucket::default(), TIMEOUT);
    let result = service.execute(&mut delete);

    assert!(!result.success);
    assert_eq!(result.status, ResponseStatus::KeyNotFound);
}

#[test]
fn test_get_after_delete_reports_key_not_found() {
    let service = service();

    let mut set = Set::new("k", "v", VBucket::default(), transcoder(), TIMEOUT);
    assert!(service.execute(&mut set).success);

    let mut delete = Delete::new("k", VBucket::default(), TIMEOUT);
    assert!(service.execute(&mut delete).success);

    let mut get = Get::new("k", VBucket::default(), transcoder(), TIMEOUT);
    let result = service.execute(&mut get);

    assert!(!result.success);
    assert_eq!(result.status, ResponseStatus::KeyNotFound);
}

// =============================================================================
// Format Fidelity Tests
// =============================================================================

#[test]
fn test_getk_reports_originally_stored_format() {
    let service = service();
    let cases: Vec<(&str, Value, DataFormat)> = vec![
        ("bin", Value::from(vec![0u8, 1, 2, 0xff]), DataFormat::Binary),
        ("txt", Value::from("plain text"), DataFormat::String),
        (
            "doc",
            Value::from(serde_json::json!({"kind": "json"})),
            DataFormat::Json,
        ),
    ];

    for (key, value, expected_format) in cases {
        let mut set = Set::new(key, value.clone(), VBucket::default(), transcoder(), TIMEOUT);
        assert_eq!(set.format(), expected_format);
        assert!(service.execute(&mut set).success);

        let mut getk = GetK::new(key, VBucket::default(), transcoder(), TIMEOUT);
        let result = service.execute(&mut getk);

        assert!(result.success);
        assert_eq!(getk.format(), expected_format);
        assert_eq!(getk.returned_key(), Some(key));
        assert_eq!(result.value, Some(value));
    }
}

#[test]
fn test_binary_value_survives_round_trip_byte_exact() {
    let service = service();
    let payload: Vec<u8> = (0..=255).collect();

    let mut set = Set::new(
        "blob",
        payload.clone(),
        VBucket::default(),
        transcoder(),
        TIMEOUT,
    );
    assert!(service.execute(&mut set).success);

    let mut get = Get::new("blob", VBucket::default(), transcoder(), TIMEOUT);
    let result = service.execute(&mut get);

    assert_eq!(get.format(), DataFormat::Binary);
    assert_eq!(result.value, Some(Value::Bytes(payload)));
}

// =============================================================================
// CAS Tests
// =============================================================================

#[test]
fn test_cas_assigned_on_store_and_changes_per_mutation() {
    let service = service();

    let mut first = Set::new("k", "a", VBucket::default(), transcoder(), TIMEOUT);
    let first_result = service.execute(&mut first);
    assert!(first_result.cas > 0);

    let mut second = Set::new("k", "b", VBucket::default(), transcoder(), TIMEOUT);
    let second_result = service.execute(&mut second);
    assert_ne!(second_result.cas, first_result.cas);

    // The read reports the latest stored version
    let mut get = Get::new("k", VBucket::default(), transcoder(), TIMEOUT);
    let read = service.execute(&mut get);
    assert_eq!(read.cas, second_result.cas);
}
