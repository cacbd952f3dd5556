use crate::test_utils::{TestEnv, TestUtils};

#[tokio::test]
async fn test_handle_ping_command() {
    let env = TestEnv::new();

    let test_cases = vec![
        (
            TestUtils::ping_command(),
            TestUtils::expected_simple_string("PONG"),
        ),
        (
            TestUtils::invalid_command(&["PING", "hello"]),
            TestUtils::expected_bulk_string("hello"),
        ),
        (
            TestUtils::invalid_command(&["ping"]),
            TestUtils::expected_simple_string("PONG"),
        ),
    ];

    for (command, expected) in test_cases {
        env.exec_command_ok(command, &expected).await;
    }
}

#[tokio::test]
async fn test_handle_command_command() {
    let env = TestEnv::new();

    env.exec_command_ok(
        TestUtils::invalid_command(&["COMMAND", "DOCS"]),
        &TestUtils::expected_bulk_string_array(&[
            "PING", "ECHO", "COMMAND", "SET", "GET", "EXISTS", "DEL", "INCR", "HSET", "HGET",
            "HGETALL",
        ]),
    )
    .await;
}
