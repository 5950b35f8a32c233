use chatload::prelude::*;
use chatload_tests::*;
use mock_service::MockConfig;
use std::sync::Arc;

const USERS: [(&str, &str); 4] = [
    ("user1", "pass123"),
    ("user2", "pass123"),
    ("user3", "pass123"),
    ("user4", "pass123"),
];

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[ntest::timeout(30_000)]
async fn all_users_complete() {
    let base_url = start_mock(MockConfig::with_default_users()).await.unwrap();
    let config = quick_config(&base_url, &USERS, 10);
    let service = HttpChatService::new(&config.base_url, config.request_timeout).unwrap();
    let recorder = LatencyRecorder::new();

    let summary = chatload::orchestrator::run(&config, Arc::new(service), &recorder).await;

    assert_eq!(summary.completed(), 4);
    assert_eq!(summary.total_messages(), 40);
    assert_eq!(recorder.len(), 4 * 11);
    assert_eq!(accepted_messages(&base_url, "11").await.unwrap(), 40);

    let report = Report::generate(&recorder.snapshot());
    let stats = report.summary().expect("samples were recorded");
    assert_eq!(stats.count, 44);
    assert!(stats.min <= stats.p95 && stats.p95 <= stats.p99 && stats.p99 <= stats.max);
    assert!(report.to_string().starts_with("Total requests: 44\n"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[ntest::timeout(30_000)]
async fn one_bad_password_does_not_stop_others() {
    let base_url = start_mock(MockConfig::with_default_users()).await.unwrap();
    let users = [USERS[0], USERS[1], ("user3", "wrong"), USERS[3]];
    let config = quick_config(&base_url, &users, 5);
    let service = HttpChatService::new(&config.base_url, config.request_timeout).unwrap();
    let recorder = LatencyRecorder::new();

    let summary = chatload::orchestrator::run(&config, Arc::new(service), &recorder).await;

    assert_eq!(summary.completed(), 3);
    assert_eq!(summary.outcomes[2].state, WorkflowState::Failed);
    assert_eq!(summary.outcomes[2].messages_sent, 0);
    // Three full users plus the single failed login.
    assert_eq!(recorder.len(), 3 * 6 + 1);
    assert_eq!(accepted_messages(&base_url, "11").await.unwrap(), 15);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[ntest::timeout(30_000)]
async fn failed_post_keeps_partial_samples() {
    let base_url = start_mock(MockConfig::with_default_users().fail_after("user4", 2)).await.unwrap();
    let config = quick_config(&base_url, &USERS, 6);
    let service = HttpChatService::new(&config.base_url, config.request_timeout).unwrap();
    let recorder = LatencyRecorder::new();

    let summary = chatload::orchestrator::run(&config, Arc::new(service), &recorder).await;

    assert_eq!(summary.completed(), 3);
    assert_eq!(summary.outcomes[3].state, WorkflowState::Failed);
    assert_eq!(summary.outcomes[3].messages_sent, 2);
    // user4: login, 2 accepted posts, 1 rejected post.
    assert_eq!(recorder.len(), 3 * 7 + 4);
    assert_eq!(accepted_messages(&base_url, "11").await.unwrap(), 3 * 6 + 2);
}

#[tokio::test]
#[ntest::timeout(30_000)]
async fn unreachable_service_gives_empty_report() {
    init();
    // Bind then drop a listener to get a port nothing listens on.
    let port = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();
    let base_url = format!("http://127.0.0.1:{port}");
    let config = quick_config(&base_url, &USERS[..2], 3);
    let service = HttpChatService::new(&config.base_url, config.request_timeout).unwrap();
    let recorder = LatencyRecorder::new();

    let summary = chatload::orchestrator::run(&config, Arc::new(service), &recorder).await;

    assert_eq!(summary.failed(), 2);
    // Failed logins are still timed.
    assert_eq!(recorder.len(), 2);

    recorder.reset();
    assert_eq!(Report::generate(&recorder.snapshot()), Report::Empty);
}
