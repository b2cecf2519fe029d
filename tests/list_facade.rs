//! List facade against the in-process store

mod common;

use std::sync::Arc;

use redis_collections::{Command, CollectionError, MemoryStore, Ttl};

#[tokio::test]
async fn test_push_pop_shift() {
    let keyspace = common::keyspace();
    let list = keyspace.list("l");

    assert_eq!(list.push(["b", "c"]).await.unwrap(), 2);
    assert_eq!(list.unshift(["x", "a"]).await.unwrap(), 4);
    assert_eq!(list.values().await.unwrap(), vec!["x", "a", "b", "c"]);

    assert_eq!(list.pop().await.unwrap().as_deref(), Some("c"));
    assert_eq!(list.shift().await.unwrap().as_deref(), Some("x"));
    assert_eq!(list.length().await.unwrap(), 2);

    let empty: [&str; 0] = [];
    assert_eq!(list.push(empty).await.unwrap(), 2);
}

#[tokio::test]
async fn test_pop_empty_is_none() {
    let keyspace = common::keyspace();
    let list = keyspace.list("l");

    assert_eq!(list.pop().await.unwrap(), None);
    assert_eq!(list.shift().await.unwrap(), None);
}

#[tokio::test]
async fn test_get_agrees_with_slice() {
    let keyspace = common::keyspace();
    let list = keyspace.list("l");
    list.push(["a", "b", "c", "d", "e"]).await.unwrap();

    let all = list.slice(0, None).await.unwrap();
    for (i, expected) in all.iter().enumerate() {
        assert_eq!(&list.get(i as i64).await.unwrap(), expected);
    }

    let last = list.get(-1).await.unwrap();
    assert_eq!(last, "e");
    assert_eq!(list.slice(-1, None).await.unwrap()[0], last);
}

#[tokio::test]
async fn test_slice_bounds() {
    let keyspace = common::keyspace();
    let list = keyspace.list("l");
    list.push(["a", "b", "c", "d"]).await.unwrap();

    assert_eq!(list.slice(1, Some(3)).await.unwrap(), vec!["b", "c"]);
    assert_eq!(list.slice(-2, None).await.unwrap(), vec!["c", "d"]);
    assert_eq!(list.slice(0, Some(-1)).await.unwrap(), vec!["a", "b", "c"]);
    assert_eq!(list.slice(-100, Some(100)).await.unwrap(), vec!["a", "b", "c", "d"]);
    assert!(list.slice(2, Some(0)).await.unwrap().is_empty());
    assert!(list.slice(3, Some(1)).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_positional_access_out_of_range() {
    let keyspace = common::keyspace();
    let list = keyspace.list("l");
    list.push(["a", "b"]).await.unwrap();

    assert!(matches!(
        list.get(5).await,
        Err(CollectionError::IndexOutOfRange { index: 5 })
    ));
    assert!(matches!(
        list.get(-3).await,
        Err(CollectionError::IndexOutOfRange { index: -3 })
    ));
    assert!(matches!(
        list.set(2, "z").await,
        Err(CollectionError::IndexOutOfRange { index: 2 })
    ));
    assert!(matches!(
        keyspace.list("missing").set(0, "z").await,
        Err(CollectionError::IndexOutOfRange { index: 0 })
    ));

    assert_eq!(list.set(-1, "z").await.unwrap(), "z");
    assert_eq!(list.values().await.unwrap(), vec!["a", "z"]);
}

#[tokio::test]
async fn test_delete_removes_every_occurrence() {
    let keyspace = common::keyspace();
    let list = keyspace.list("l");
    list.push(["a", "b", "a", "c", "a", "b"]).await.unwrap();

    assert!(list.delete(["a", "b"]).await.unwrap());
    assert_eq!(list.values().await.unwrap(), vec!["c"]);
    assert!(!list.delete(["zzz"]).await.unwrap());
}

#[tokio::test]
async fn test_index_of_and_includes() {
    let keyspace = common::keyspace();
    let list = keyspace.list("l");
    list.push(["a", "b", "b"]).await.unwrap();

    assert_eq!(list.index_of("b").await.unwrap(), Some(1));
    assert_eq!(list.index_of("z").await.unwrap(), None);
    assert!(list.includes("a").await.unwrap());
    assert!(!list.includes("z").await.unwrap());
}

#[tokio::test]
async fn test_splice_replaces_window() {
    let keyspace = common::keyspace();
    let list = keyspace.list("l");
    list.push(["a", "b", "c", "d"]).await.unwrap();

    let removed = list.splice(1, 2, ["x"]).await.unwrap();
    assert_eq!(removed, vec!["b", "c"]);
    assert_eq!(list.values().await.unwrap(), vec!["a", "x", "d"]);
}

#[tokio::test]
async fn test_splice_insert_only() {
    let keyspace = common::keyspace();
    let list = keyspace.list("l");
    list.push(["a", "b"]).await.unwrap();

    assert!(list.splice(1, 0, ["x", "y"]).await.unwrap().is_empty());
    assert_eq!(list.values().await.unwrap(), vec!["a", "x", "y", "b"]);
}

#[tokio::test]
async fn test_splice_negative_start() {
    let keyspace = common::keyspace();
    let list = keyspace.list("l");
    list.push(["a", "b", "c", "d"]).await.unwrap();

    let none: [&str; 0] = [];
    assert_eq!(list.splice(-2, 1, none).await.unwrap(), vec!["c"]);
    assert_eq!(list.values().await.unwrap(), vec!["a", "b", "d"]);
}

#[tokio::test]
async fn test_splice_from_head_keeps_ttl() {
    let keyspace = common::keyspace();
    let list = keyspace.list("l");
    list.push(["a", "b", "c"]).await.unwrap();
    list.set_ttl(100).await.unwrap();

    assert_eq!(list.splice(0, 1, ["z"]).await.unwrap(), vec!["a"]);
    assert_eq!(list.values().await.unwrap(), vec!["z", "b", "c"]);
    assert!(matches!(list.ttl().await.unwrap(), Ttl::Expires(_)));
}

#[tokio::test]
async fn test_splice_everything_removes_key() {
    let keyspace = common::keyspace();
    let list = keyspace.list("l");
    list.push(["a", "b"]).await.unwrap();

    let none: [&str; 0] = [];
    assert_eq!(list.splice(0, 10, none).await.unwrap(), vec!["a", "b"]);
    assert!(!list.exists().await.unwrap());
}

#[tokio::test]
async fn test_sort_numeric_descending() {
    let keyspace = common::keyspace();
    let list = keyspace.list("l");
    list.push(["3", "1", "2"]).await.unwrap();

    assert_eq!(list.sort(-1).await.unwrap(), vec!["3", "2", "1"]);
    assert_eq!(list.values().await.unwrap(), vec!["3", "2", "1"]);
}

#[tokio::test]
async fn test_sort_numeric_is_not_lexicographic() {
    let keyspace = common::keyspace();
    let list = keyspace.list("l");
    list.push(["10", "9", "-1.5", "2"]).await.unwrap();

    assert_eq!(list.sort(1).await.unwrap(), vec!["-1.5", "2", "9", "10"]);
}

#[tokio::test]
async fn test_sort_mixed_falls_back_to_bytes() {
    let keyspace = common::keyspace();
    let list = keyspace.list("l");
    list.push(["b", "10", "a", "9"]).await.unwrap();

    assert_eq!(list.sort(1).await.unwrap(), vec!["10", "9", "a", "b"]);
}

#[tokio::test]
async fn test_reverse_and_for_each() {
    let keyspace = common::keyspace();
    let list = keyspace.list("l");
    list.push(["a", "b", "c"]).await.unwrap();

    assert_eq!(list.reverse().await.unwrap(), vec!["c", "b", "a"]);

    let mut seen = Vec::new();
    list.for_each(|value, index| seen.push(format!("{}:{}", index, value)))
        .await
        .unwrap();
    assert_eq!(seen, vec!["0:c", "1:b", "2:a"]);
}

#[tokio::test]
async fn test_sort_on_wrong_type() {
    let keyspace = common::keyspace();
    keyspace.string("s").set("v", None).await.unwrap();

    assert!(matches!(keyspace.list("s").sort(1).await, Err(CollectionError::WrongType)));
    assert!(matches!(
        keyspace.list("s").splice(0, 1, ["x"]).await,
        Err(CollectionError::WrongType)
    ));
    assert_eq!(keyspace.string("s").get().await.unwrap(), "v");
}

#[tokio::test]
async fn test_splice_keeps_concurrent_push() {
    let (keyspace, client) = common::interleaved(Arc::new(MemoryStore::new()));
    let list = keyspace.list("l");
    list.push(["a", "b", "c", "d"]).await.unwrap();

    client.interleave(Command::new("RPUSH").args(["l", "concurrent"]));
    assert_eq!(list.splice(1, 2, ["x"]).await.unwrap(), vec!["b", "c"]);
    assert_eq!(client.pending(), 0);
    assert_eq!(list.values().await.unwrap(), vec!["a", "x", "d", "concurrent"]);
}

#[tokio::test]
async fn test_sort_and_reverse_keep_concurrent_push() {
    let (keyspace, client) = common::interleaved(Arc::new(MemoryStore::new()));
    let list = keyspace.list("l");
    list.push(["3", "1", "2"]).await.unwrap();

    client.interleave(Command::new("RPUSH").args(["l", "0"]));
    assert_eq!(list.sort(1).await.unwrap(), vec!["0", "1", "2", "3"]);

    client.interleave(Command::new("LPUSH").args(["l", "9"]));
    assert_eq!(list.reverse().await.unwrap(), vec!["3", "2", "1", "0", "9"]);
    assert_eq!(list.values().await.unwrap(), vec!["3", "2", "1", "0", "9"]);
}

#[tokio::test]
async fn test_unrelated_writes_do_not_force_a_retry() {
    let (keyspace, client) = common::interleaved(Arc::new(MemoryStore::new()));
    let list = keyspace.list("l");
    list.push(["b", "a"]).await.unwrap();

    client.interleave(Command::new("SET").args(["other", "v"]));
    client.interleave(Command::new("RPUSH").args(["l", "c"]));
    assert_eq!(list.sort(1).await.unwrap(), vec!["a", "b"]);
    // the second writer was left for the next watched call
    assert_eq!(client.pending(), 1);
    assert_eq!(keyspace.string("other").get().await.unwrap(), "v");
}

#[tokio::test]
async fn test_contended_list_gives_up() {
    let (keyspace, client) = common::interleaved(Arc::new(MemoryStore::new()));
    let list = keyspace.list("l");
    list.push(["a"]).await.unwrap();

    for _ in 0..redis_collections::executor::WATCH_ATTEMPTS {
        client.interleave(Command::new("RPUSH").args(["l", "more"]));
    }
    let err = list.reverse().await.unwrap_err();
    assert!(matches!(err, CollectionError::Contended(ref key) if key == "l"));
    assert_eq!(list.length().await.unwrap(), 1 + redis_collections::executor::WATCH_ATTEMPTS);
}
