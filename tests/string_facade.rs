//! String facade against the in-process store

mod common;

use redis_collections::{CollectionError, Ttl};

#[tokio::test]
async fn test_set_and_get() {
    let keyspace = common::keyspace();
    let greeting = keyspace.string("greeting");

    assert_eq!(greeting.get().await.unwrap(), "");
    assert_eq!(greeting.set("hello", None).await.unwrap(), "hello");
    assert_eq!(greeting.get().await.unwrap(), "hello");
    assert_eq!(greeting.length().await.unwrap(), 5);
    assert!(greeting.exists().await.unwrap());
}

#[tokio::test]
async fn test_slice_negative_and_clamped() {
    let keyspace = common::keyspace();
    let s = keyspace.string("s");
    s.set("hello", None).await.unwrap();

    assert_eq!(s.slice(-3, None).await.unwrap(), "llo");
    assert_eq!(s.slice(1, Some(-1)).await.unwrap(), "ell");
    assert_eq!(s.slice(0, Some(100)).await.unwrap(), "hello");
    assert_eq!(s.slice(10, None).await.unwrap(), "");
    assert_eq!(s.slice(3, Some(1)).await.unwrap(), "");
}

#[tokio::test]
async fn test_slice_counts_characters() {
    let keyspace = common::keyspace();
    let s = keyspace.string("s");
    s.set("héllo", None).await.unwrap();

    assert_eq!(s.slice(1, Some(2)).await.unwrap(), "é");
    assert_eq!(s.length().await.unwrap(), 6);
}

#[tokio::test]
async fn test_prefix_and_suffix() {
    let keyspace = common::keyspace();
    let s = keyspace.string("s");
    s.set("redis-collections", None).await.unwrap();

    assert!(s.starts_with("redis").await.unwrap());
    assert!(s.ends_with("tions").await.unwrap());
    assert!(!s.starts_with("tions").await.unwrap());
}

#[tokio::test]
async fn test_append_returns_full_value() {
    let keyspace = common::keyspace();
    let s = keyspace.string("s");

    assert_eq!(s.append("foo").await.unwrap(), "foo");
    assert_eq!(s.append("bar").await.unwrap(), "foobar");
}

#[tokio::test]
async fn test_counters() {
    let keyspace = common::keyspace();
    let counter = keyspace.string("counter");

    assert_eq!(counter.increase(5).await.unwrap(), 5);
    assert_eq!(counter.decrease(2).await.unwrap(), 3);
    assert_eq!(counter.increase_float(0.5).await.unwrap(), 3.5);
    assert_eq!(counter.decrease_float(1.5).await.unwrap(), 2.0);
    assert_eq!(counter.get().await.unwrap(), "2");
}

#[tokio::test]
async fn test_float_amounts_use_store_spelling() {
    let (keyspace, client) = common::recorded();
    let counter = keyspace.string("counter");

    counter.increase_float(0.5).await.unwrap();
    assert!(counter.increase_float(f64::NEG_INFINITY).await.is_err());
    assert!(counter.decrease_float(f64::NEG_INFINITY).await.is_err());
    assert_eq!(counter.get().await.unwrap(), "0.5");

    let sent = client.sent();
    assert_eq!(sent[0], "INCRBYFLOAT counter 0.5");
    assert_eq!(sent[1], "INCRBYFLOAT counter -inf");
    assert_eq!(sent[2], "INCRBYFLOAT counter +inf");
}

#[tokio::test]
async fn test_increase_non_numeric_fails() {
    let keyspace = common::keyspace();
    let s = keyspace.string("s");
    s.set("abc", None).await.unwrap();

    assert!(matches!(s.increase(1).await, Err(CollectionError::NotANumber(_))));
    assert!(matches!(s.increase_float(1.0).await, Err(CollectionError::NotANumber(_))));
    assert_eq!(s.get().await.unwrap(), "abc");
}

#[tokio::test]
async fn test_set_with_ttl() {
    let keyspace = common::keyspace();
    let s = keyspace.string("session");

    s.set("token", Some(60)).await.unwrap();
    match s.ttl().await.unwrap() {
        Ttl::Expires(secs) => assert!(secs > 0 && secs <= 60),
        other => panic!("expected an expiry, got {:?}", other),
    }

    assert!(s.persist().await.unwrap());
    assert_eq!(s.ttl().await.unwrap(), Ttl::Persistent);
    assert!(s.clear().await.unwrap());
    assert_eq!(s.ttl().await.unwrap(), Ttl::Missing);
    assert!(!s.clear().await.unwrap());
}

#[tokio::test]
async fn test_wrong_type() {
    let keyspace = common::keyspace();
    keyspace.list("l").push(["a"]).await.unwrap();
    let s = keyspace.string("l");

    assert!(matches!(s.get().await, Err(CollectionError::WrongType)));
    assert!(matches!(s.append("x").await, Err(CollectionError::WrongType)));
    assert!(!s.exists().await.unwrap());
}
