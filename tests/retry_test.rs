//! Retry invoker tests through the real HTTP client.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use gitlab_provisioner::gitlab::{AccessLevel, Connection, GitlabError, GroupId, UserId};
use gitlab_provisioner::provisioning::{
    CreateGroup, FindGroup, FindUser, ListGroupMembers, RemoveUser, UpdateUserRole,
};
use gitlab_provisioner::resilience::{
    InvokeError, RetryInvoker, RetryObserver, RetryOutcome, RetryPolicy,
};

mod common;
use common::{group_json, member_json, message_json, user_json, MockGitlab};

/// Observer that keeps the text of every absorbed failure.
#[derive(Default)]
struct Recorder {
    lines: Mutex<Vec<String>>,
}

impl Recorder {
    fn lines(&self) -> Vec<String> {
        self.lines.lock().unwrap().clone()
    }
}

impl RetryObserver for Recorder {
    fn on_classified_failure(&self, operation: &str, attempt: u32, _budget: u32, error: &GitlabError) {
        self.lines
            .lock()
            .unwrap()
            .push(format!("{}#{}: {}", operation, attempt, error));
    }

    fn on_empty_result(&self, operation: &str, attempt: u32, _budget: u32) {
        self.lines
            .lock()
            .unwrap()
            .push(format!("{}#{}: empty", operation, attempt));
    }
}

#[tokio::test]
async fn test_remove_missing_user_logs_each_attempt() {
    let server = MockGitlab::start(|_| (404, message_json("404 User Not Found"))).await;
    let client = server.client();
    let api: &Connection = &client;
    let invoker = RetryInvoker::with_observer(RetryPolicy::retrying(2), Recorder::default());

    let outcome = invoker
        .invoke(&RemoveUser { user: UserId(93) }, api)
        .await
        .unwrap();

    assert_eq!(outcome.into_parts(), (false, None));
    assert_eq!(server.count("DELETE", "/api/v4/users/93"), 2);
    assert_eq!(
        invoker.observer().lines(),
        vec![
            "remove_user#1: delete failed (404): 404 User Not Found".to_string(),
            "remove_user#2: delete failed (404): 404 User Not Found".to_string(),
        ]
    );
}

#[tokio::test]
async fn test_create_group_recovers_on_third_attempt() {
    let calls = Arc::new(AtomicU32::new(0));
    let counter = calls.clone();
    let server = MockGitlab::start(move |_| {
        if counter.fetch_add(1, Ordering::SeqCst) < 2 {
            (500, message_json("500 Internal Server Error"))
        } else {
            (201, group_json(42, "tg8"))
        }
    })
    .await;
    let client = server.client();
    let api: &Connection = &client;
    let invoker = RetryInvoker::with_observer(RetryPolicy::retrying(3), Recorder::default());

    let op = CreateGroup {
        name: "tg8".into(),
        path: "tg8".into(),
    };
    let outcome = invoker.invoke(&op, api).await.unwrap();

    assert_eq!(outcome, RetryOutcome::succeeded(GroupId(42)));
    assert_eq!(calls.load(Ordering::SeqCst), 3);
    assert_eq!(invoker.observer().lines().len(), 2);
}

#[tokio::test]
async fn test_single_attempt_mode_does_not_retry() {
    let server = MockGitlab::start(|_| (500, message_json("500 Internal Server Error"))).await;
    let client = server.client();
    let api: &Connection = &client;
    let invoker = RetryInvoker::with_observer(
        RetryPolicy {
            enabled: false,
            max_attempts: 1,
        },
        Recorder::default(),
    );

    let op = CreateGroup {
        name: "tg8".into(),
        path: "tg8".into(),
    };
    let outcome = invoker.invoke(&op, api).await.unwrap();

    assert_eq!(outcome.into_parts(), (false, None));
    assert_eq!(server.requests().len(), 1);
}

#[tokio::test]
async fn test_missing_user_role_update_never_reaches_put() {
    let server = MockGitlab::start(|_| (404, message_json("404 User Not Found"))).await;
    let client = server.client();
    let api: &Connection = &client;
    let invoker = RetryInvoker::with_observer(RetryPolicy::retrying(3), Recorder::default());

    let op = UpdateUserRole {
        user: UserId(89),
        admin: true,
    };
    let outcome = invoker.invoke(&op, api).await.unwrap();

    assert!(!outcome.is_success());
    assert_eq!(server.count("GET", "/api/v4/users/89"), 3);
    assert_eq!(server.count("PUT", "/api/v4/users/89"), 0);
}

#[tokio::test]
async fn test_not_found_username_counts_as_empty_attempts() {
    let server = MockGitlab::start(|_| (200, "[]".to_string())).await;
    let client = server.client();
    let api: &Connection = &client;
    let invoker = RetryInvoker::with_observer(RetryPolicy::retrying(2), Recorder::default());

    let outcome = invoker
        .invoke(
            &FindUser {
                username: "ghost".into(),
            },
            api,
        )
        .await
        .unwrap();

    assert_eq!(outcome, RetryOutcome::failed(Some(None)));
    assert_eq!(
        invoker.observer().lines(),
        vec!["find_user#1: empty".to_string(), "find_user#2: empty".to_string()]
    );
}

#[tokio::test]
async fn test_found_username_succeeds() {
    let server = MockGitlab::start(|_| (200, format!("[{}]", user_json(12, "alice")))).await;
    let client = server.client();
    let api: &Connection = &client;
    let invoker = RetryInvoker::new(RetryPolicy::retrying(2));

    let outcome = invoker
        .invoke(
            &FindUser {
                username: "alice".into(),
            },
            api,
        )
        .await
        .unwrap();

    assert_eq!(outcome, RetryOutcome::succeeded(Some(UserId(12))));
}

#[tokio::test]
async fn test_group_members_include_planners_across_pages() {
    let server = MockGitlab::start_with_headers(|req| {
        if req.query() == Some("per_page=100&page=1") {
            (
                200,
                vec![("X-Next-Page", "2".to_string())],
                format!("[{}]", member_json(4, "dev", 30)),
            )
        } else {
            (
                200,
                Vec::new(),
                r#"[{"id":5,"username":"p","access_level":15}]"#.to_string(),
            )
        }
    })
    .await;
    let client = server.client();
    let api: &Connection = &client;
    let invoker = RetryInvoker::new(RetryPolicy::retrying(3));

    let members = invoker
        .invoke(&ListGroupMembers { group: GroupId(1) }, api)
        .await
        .unwrap()
        .into_success()
        .unwrap();

    assert_eq!(members.len(), 2);
    assert_eq!(members[1].access_level, AccessLevel::Planner);
    assert_eq!(server.requests().len(), 2);
}

#[tokio::test]
async fn test_find_group_by_path() {
    let server = MockGitlab::start(|_| {
        (
            200,
            format!("[{},{}]", group_json(8, "tg8-archive"), group_json(7, "tg8")),
        )
    })
    .await;
    let client = server.client();
    let api: &Connection = &client;
    let invoker = RetryInvoker::new(RetryPolicy::retrying(2));

    let outcome = invoker
        .invoke(&FindGroup { path: "tg8".into() }, api)
        .await
        .unwrap();

    assert_eq!(outcome, RetryOutcome::succeeded(Some(GroupId(7))));
    assert_eq!(
        server.requests()[0].query(),
        Some("search=tg8&per_page=100&page=1")
    );
}

#[tokio::test]
async fn test_transport_failure_aborts_without_retry() {
    let mut config = MockGitlab::start(|_| (200, String::new())).await.config();
    config.url = common::closed_port_url().await;
    let client = gitlab_provisioner::GitlabClient::new(&config).unwrap();
    let api: &Connection = &client;
    let invoker = RetryInvoker::with_observer(RetryPolicy::retrying(5), Recorder::default());

    let err = invoker
        .invoke(&RemoveUser { user: UserId(93) }, api)
        .await
        .unwrap_err();

    assert!(matches!(err, InvokeError::Unclassified(GitlabError::Transport(_))));
    assert!(invoker.observer().lines().is_empty());
}

#[tokio::test]
async fn test_zero_bound_makes_no_request() {
    let server = MockGitlab::start(|_| (204, String::new())).await;
    let client = server.client();
    let api: &Connection = &client;
    let invoker = RetryInvoker::new(RetryPolicy::retrying(0));

    let err = invoker
        .invoke(&RemoveUser { user: UserId(93) }, api)
        .await
        .unwrap_err();

    assert!(matches!(err, InvokeError::InvalidAttemptBound(0)));
    assert!(server.requests().is_empty());
}
