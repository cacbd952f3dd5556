use std::time::Duration;

use redis_lite::commands::CommandError;

use crate::test_utils::{TestEnv, TestUtils};

#[tokio::test]
async fn test_handle_exists_and_del_commands() {
    let env = TestEnv::new();

    for key in ["a", "b"] {
        env.exec_command_ok(
            TestUtils::set_command(key, "value"),
            &TestUtils::expected_simple_string("OK"),
        )
        .await;
    }

    let test_cases = vec![
        (
            TestUtils::exists_command(&["a", "b"]),
            TestUtils::expected_integer(2),
        ),
        (
            TestUtils::exists_command(&["a", "a", "missing"]),
            TestUtils::expected_integer(2),
        ),
        (
            TestUtils::del_command(&["a", "b"]),
            TestUtils::expected_integer(2),
        ),
        (
            TestUtils::exists_command(&["a", "b"]),
            TestUtils::expected_integer(0),
        ),
        (
            TestUtils::del_command(&["a", "b"]),
            TestUtils::expected_integer(0),
        ),
    ];

    for (command, expected) in test_cases {
        env.exec_command_ok(command, &expected).await;
    }
}

#[tokio::test(start_paused = true)]
async fn test_handle_exists_and_del_commands_with_expired_keys() {
    let env = TestEnv::new();

    env.exec_command_ok(
        TestUtils::set_command_with_expiration("grape", "mango", "1"),
        &TestUtils::expected_simple_string("OK"),
    )
    .await;
    env.exec_command_ok(
        TestUtils::set_command("apple", "pear"),
        &TestUtils::expected_simple_string("OK"),
    )
    .await;

    tokio::time::advance(Duration::from_secs(2)).await;

    env.exec_command_ok(
        TestUtils::exists_command(&["grape", "apple"]),
        &TestUtils::expected_integer(1),
    )
    .await;

    // EXISTS leaves the expired key in place, and DEL still counts it.
    assert!(env.store.string_entry(b"grape").await.is_some());
    env.exec_command_ok(
        TestUtils::del_command(&["grape", "apple"]),
        &TestUtils::expected_integer(2),
    )
    .await;
}

#[tokio::test]
async fn test_handle_exists_and_del_commands_invalid() {
    let env = TestEnv::new();

    env.exec_command_err(
        TestUtils::invalid_command(&["EXISTS"]),
        CommandError::WrongNumberOfArguments("EXISTS"),
    )
    .await;
    env.exec_command_err(
        TestUtils::invalid_command(&["DEL"]),
        CommandError::WrongNumberOfArguments("DEL"),
    )
    .await;
}
