//! TcpClient against an in-test RESP server backed by MemoryStore

mod common;

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use redis_collections::client::memory::Session;
use redis_collections::protocol::{serialize_to_vec, RespParser};
use redis_collections::{
    ClientConfig, CollectionError, Command, Keyspace, MemoryStore, Reply, Result, StoreClient,
    TcpClient,
};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// Client names registered by connections, in arrival order
type Names = Arc<Mutex<Vec<String>>>;

async fn serve(store: Arc<MemoryStore>) -> (SocketAddr, Names) {
    common::init_tracing();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let names: Names = Arc::new(Mutex::new(Vec::new()));

    let registered = names.clone();
    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let store = store.clone();
            let registered = registered.clone();
            tokio::spawn(async move {
                let mut parser = RespParser::new();
                let mut session = Session::new();
                let mut buf = vec![0u8; 4096];
                loop {
                    let n = match socket.read(&mut buf).await {
                        Ok(0) | Err(_) => return,
                        Ok(n) => n,
                    };
                    parser.feed(&buf[..n]);
                    while let Ok(Some(frame)) = parser.parse() {
                        let had_name = session.name().is_some();
                        let reply = store.dispatch_frame(&mut session, &frame);
                        if let (false, Some(name)) = (had_name, session.name()) {
                            registered.lock().unwrap().push(name.to_string());
                        }
                        let bytes = serialize_to_vec(&reply).unwrap();
                        if socket.write_all(&bytes).await.is_err() {
                            return;
                        }
                    }
                }
            });
        }
    });

    (addr, names)
}

fn config_for(addr: SocketAddr) -> ClientConfig {
    ClientConfig::builder()
        .host(addr.ip().to_string())
        .port(addr.port())
        .build()
}

#[tokio::test]
async fn test_facades_over_tcp() {
    let store = Arc::new(MemoryStore::new());
    let (addr, _) = serve(store.clone()).await;
    let keyspace = Keyspace::connect(config_for(addr)).await.unwrap();

    let list = keyspace.list("l");
    list.push(["a", "b", "c", "d"]).await.unwrap();
    assert_eq!(list.splice(1, 2, ["x"]).await.unwrap(), vec!["b", "c"]);
    assert_eq!(list.values().await.unwrap(), vec!["a", "x", "d"]);

    let zset = keyspace.sorted_set("z");
    zset.add("m", Some(5.0)).await.unwrap();
    assert_eq!(zset.score_of("m").await.unwrap(), Some(5.0));
    assert_eq!(zset.pop_with_score().await.unwrap(), Some(("m".to_string(), 5.0)));

    let hash = keyspace.hash("h");
    assert_eq!(hash.increase("k", 5).await.unwrap(), 5);
    assert_eq!(hash.get("k").await.unwrap().as_deref(), Some("5"));

    keyspace.ping().await.unwrap();
    assert_eq!(store.len(), 2);
}

#[tokio::test]
async fn test_handshake_auth_select_and_name() {
    let store = Arc::new(MemoryStore::with_password("secret"));
    let (addr, names) = serve(store.clone()).await;

    let config = ClientConfig::builder()
        .host(addr.ip().to_string())
        .port(addr.port())
        .password("secret")
        .db(1)
        .client_name("collections-test")
        .build();
    let keyspace = Keyspace::connect(config).await.unwrap();

    keyspace.string("s").set("v", None).await.unwrap();
    assert_eq!(keyspace.string("s").get().await.unwrap(), "v");
    assert_eq!(*names.lock().unwrap(), vec!["collections-test".to_string()]);
}

#[tokio::test]
async fn test_wrong_password_is_rejected() {
    let store = Arc::new(MemoryStore::with_password("secret"));
    let (addr, _) = serve(store).await;

    let config = ClientConfig::builder()
        .host(addr.ip().to_string())
        .port(addr.port())
        .password("nope")
        .build();
    assert!(matches!(
        TcpClient::connect(config).await,
        Err(CollectionError::Connection(_))
    ));
}

#[tokio::test]
async fn test_missing_auth_surfaces_store_error() {
    let store = Arc::new(MemoryStore::with_password("secret"));
    let (addr, _) = serve(store).await;

    let client = TcpClient::connect(config_for(addr)).await.unwrap();
    let err = client.execute(Command::new("GET").arg("k")).await.unwrap_err();
    assert!(matches!(err, CollectionError::Command(_)));
}

#[tokio::test]
async fn test_transaction_errors() {
    let store = Arc::new(MemoryStore::new());
    let (addr, _) = serve(store.clone()).await;
    let client = TcpClient::connect(config_for(addr)).await.unwrap();

    let replies = client
        .execute_transaction(vec![
            Command::new("SET").args(["k", "1"]),
            Command::new("INCR").arg("k"),
        ])
        .await
        .unwrap();
    assert_eq!(replies.len(), 2);

    // runtime failure: earlier commands keep their effect
    let err = client
        .execute_transaction(vec![
            Command::new("SET").args(["k", "text"]),
            Command::new("INCR").arg("k"),
        ])
        .await
        .unwrap_err();
    assert!(matches!(err, CollectionError::Transaction { index: 1, .. }));

    // queue-time rejection: nothing runs
    let err = client
        .execute_transaction(vec![
            Command::new("SET").args(["k", "other"]),
            Command::new("BOGUS"),
        ])
        .await
        .unwrap_err();
    assert!(matches!(err, CollectionError::Transaction { index: 1, .. }));

    let value = client.execute(Command::new("GET").arg("k")).await.unwrap();
    assert_eq!(value.into_string().unwrap(), "text");
}

#[tokio::test]
async fn test_connection_stays_usable_after_errors() {
    let store = Arc::new(MemoryStore::new());
    let (addr, _) = serve(store).await;
    let keyspace = Keyspace::connect(config_for(addr)).await.unwrap();

    keyspace.string("s").set("v", None).await.unwrap();
    assert!(matches!(
        keyspace.list("s").sort(1).await,
        Err(CollectionError::WrongType)
    ));
    assert_eq!(keyspace.string("s").get().await.unwrap(), "v");
}

#[tokio::test]
async fn test_watched_transaction_over_tcp() {
    let store = Arc::new(MemoryStore::new());
    let (addr, _) = serve(store.clone()).await;
    let client = TcpClient::connect(config_for(addr)).await.unwrap();
    client
        .execute(Command::new("RPUSH").args(["l", "a", "b"]))
        .await
        .unwrap();

    let keys = vec!["l".to_string()];
    let reads = vec![Command::new("LLEN").arg("l")];

    // another connection writes between the reads and EXEC
    let mut raced = |replies: Vec<Reply>| -> Result<Vec<Command>> {
        assert_eq!(replies, vec![Reply::Integer(2)]);
        store.run(&Command::new("RPUSH").args(["l", "c"])).unwrap();
        Ok(vec![Command::new("DEL").arg("l")])
    };
    let outcome = client
        .execute_watched(keys.clone(), reads.clone(), &mut raced)
        .await
        .unwrap();
    assert_eq!(outcome, None);

    let mut clear =
        |_: Vec<Reply>| -> Result<Vec<Command>> { Ok(vec![Command::new("DEL").arg("l")]) };
    let outcome = client
        .execute_watched(keys.clone(), reads.clone(), &mut clear)
        .await
        .unwrap();
    assert_eq!(outcome, Some(vec![Reply::Integer(1)]));
    assert!(store.is_empty());

    // nothing to write: the watch is dropped and the connection stays usable
    let mut nothing = |_: Vec<Reply>| -> Result<Vec<Command>> { Ok(Vec::new()) };
    let outcome = client.execute_watched(keys, reads, &mut nothing).await.unwrap();
    assert_eq!(outcome, Some(Vec::new()));
    client.execute(Command::new("SET").args(["k", "v"])).await.unwrap();
    assert_eq!(store.len(), 1);
}

#[tokio::test]
async fn test_list_rewrites_over_tcp() {
    let store = Arc::new(MemoryStore::new());
    let (addr, _) = serve(store).await;
    let keyspace = Keyspace::connect(config_for(addr)).await.unwrap();

    let list = keyspace.list("l");
    list.push(["2", "3", "1"]).await.unwrap();
    assert_eq!(list.sort(1).await.unwrap(), vec!["1", "2", "3"]);
    assert_eq!(list.reverse().await.unwrap(), vec!["3", "2", "1"]);

    let s = keyspace.string("s");
    s.set("v", None).await.unwrap();
    assert!(matches!(
        keyspace.list("s").splice(0, 1, ["x"]).await,
        Err(CollectionError::WrongType)
    ));
    assert_eq!(s.get().await.unwrap(), "v");
}
