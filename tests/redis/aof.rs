use std::{sync::Arc, time::Duration};

use bytes::Bytes;
use redis_lite::{
    aof::{Aof, ReplaySummary},
    resp::RespValue,
    store::Store,
};
use tempfile::tempdir;

use crate::test_utils::{TestEnv, TestUtils};

fn write_commands() -> Vec<RespValue> {
    vec![
        TestUtils::set_command("grape", "5"),
        TestUtils::incr_command("grape"),
        TestUtils::incr_command("counter"),
        TestUtils::set_command("apple", "red"),
        TestUtils::set_command_with_expiration("mango", "ripe", "100"),
        TestUtils::hset_command("fruits", &[("grape", "purple"), ("banana", "yellow")]),
        TestUtils::hset_command("fruits", &[("grape", "green")]),
        TestUtils::set_command("apple", "green"),
        TestUtils::del_command(&["counter"]),
    ]
}

#[tokio::test]
async fn test_replay_rebuilds_store() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("database.aof");

    let (env, _aof) = TestEnv::with_aof(&path).await;
    for command in write_commands() {
        env.exec_command(command).await;
    }

    let direct_env = TestEnv::new();
    for command in write_commands() {
        direct_env.exec_command(command).await;
    }

    let replayed = Store::new();
    let aof = Aof::open(&path).await.unwrap();
    let summary = aof.replay(&replayed).await.unwrap();

    assert_eq!(
        summary,
        ReplaySummary {
            applied: write_commands().len(),
            rejected: 0,
            truncated_bytes: 0,
        }
    );
    assert_eq!(replayed.string_snapshot().await, direct_env.store.string_snapshot().await);
    assert_eq!(replayed.hash_snapshot().await, direct_env.store.hash_snapshot().await);
    assert_eq!(replayed.get(b"grape").await, Some(Bytes::from("6")));
    assert_eq!(replayed.get(b"counter").await, None);
}

#[tokio::test]
async fn test_only_write_commands_are_logged() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("database.aof");

    let (env, _aof) = TestEnv::with_aof(&path).await;

    let commands = vec![
        TestUtils::ping_command(),
        TestUtils::set_command("grape", "5"),
        TestUtils::get_command("grape"),
        TestUtils::exists_command(&["grape"]),
        TestUtils::hget_command("fruits", "grape"),
        TestUtils::echo_command("hello"),
        TestUtils::invalid_command(&["FLUSHALL"]),
        TestUtils::invalid_command(&["SET", "grape"]),
        TestUtils::incr_command("grape"),
    ];
    for command in commands {
        env.exec_command(command).await;
    }

    let mut expected = TestUtils::set_command("grape", "5").encode().to_vec();
    expected.extend_from_slice(&TestUtils::incr_command("grape").encode());

    assert_eq!(std::fs::read(&path).unwrap(), expected);
}

#[tokio::test]
async fn test_replay_does_not_append() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("database.aof");

    {
        let (env, _aof) = TestEnv::with_aof(&path).await;
        env.exec_command(TestUtils::set_command("grape", "5")).await;
    }
    let length = std::fs::metadata(&path).unwrap().len();

    let aof = Aof::open(&path).await.unwrap();
    aof.replay(&Store::new()).await.unwrap();
    aof.replay(&Store::new()).await.unwrap();

    assert_eq!(std::fs::metadata(&path).unwrap().len(), length);
}

#[tokio::test]
async fn test_replay_truncates_unreadable_tail() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("database.aof");

    let mut contents = TestUtils::set_command("grape", "5").encode().to_vec();
    contents.extend_from_slice(&TestUtils::hset_command("fruits", &[("grape", "purple")]).encode());
    let valid_length = contents.len() as u64;
    contents.extend_from_slice(b"*3\r\n$3\r\nSET\r\n$5\r\nap");
    std::fs::write(&path, &contents).unwrap();

    let store = Store::new();
    let aof = Aof::open(&path).await.unwrap();
    let summary = aof.replay(&store).await.unwrap();

    assert_eq!(summary.applied, 2);
    assert_eq!(summary.truncated_bytes, contents.len() as u64 - valid_length);
    assert_eq!(std::fs::metadata(&path).unwrap().len(), valid_length);

    aof.append(&TestUtils::set_command("apple", "red")).await.unwrap();
    drop(aof);

    let store = Store::new();
    let summary = Aof::open(&path).await.unwrap().replay(&store).await.unwrap();
    assert_eq!(summary.applied, 3);
    assert_eq!(store.get(b"apple").await, Some(Bytes::from("red")));
    assert_eq!(store.hget(b"fruits", b"grape").await, Some(Bytes::from("purple")));
}

#[tokio::test]
async fn test_replay_skips_records_that_are_not_commands() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("database.aof");

    let mut contents = RespValue::bulk_string("stray").encode().to_vec();
    contents.extend_from_slice(&TestUtils::invalid_command(&["FLUSHALL"]).encode());
    contents.extend_from_slice(&TestUtils::set_command("grape", "abc").encode());
    contents.extend_from_slice(&TestUtils::incr_command("grape").encode());
    contents.extend_from_slice(&TestUtils::set_command("apple", "red").encode());
    std::fs::write(&path, &contents).unwrap();

    let store = Store::new();
    let summary = Aof::open(&path).await.unwrap().replay(&store).await.unwrap();

    assert_eq!(
        summary,
        ReplaySummary {
            applied: 2,
            rejected: 3,
            truncated_bytes: 0,
        }
    );
    assert_eq!(store.get(b"grape").await, Some(Bytes::from("abc")));
    assert_eq!(store.get(b"apple").await, Some(Bytes::from("red")));
}

#[tokio::test]
async fn test_open_creates_missing_directories() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("data").join("redis-lite").join("database.aof");

    let aof = Aof::open(&path).await.unwrap();
    assert_eq!(aof.path(), path.as_path());
    assert!(path.exists());

    let summary = aof.replay(&Store::new()).await.unwrap();
    assert_eq!(summary, ReplaySummary::default());
}

#[tokio::test]
async fn test_fsync_task_runs_alongside_appends() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("database.aof");

    let aof = Arc::new(Aof::open(&path).await.unwrap());
    let handle = Arc::clone(&aof).spawn_fsync_task(Duration::from_millis(10));

    for i in 0..20 {
        aof.append(&TestUtils::set_command("counter", &i.to_string()))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(2)).await;
    }

    handle.abort();

    let store = Store::new();
    let summary = aof.replay(&store).await.unwrap();
    assert_eq!(summary.applied, 20);
    assert_eq!(store.get(b"counter").await, Some(Bytes::from("19")));
}
