// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::support::{closed_port, start_test_server, ServerState};
use jobsieve::engines::captcha_detector::{CaptchaDetector, CaptchaKind};
use jobsieve::engines::proxy_pool::{ProxyEndpoint, ProxyPool, ProxyPoolConfig};
use jobsieve::engines::reqwest_engine::ReqwestEngine;
use jobsieve::engines::resilience::{FetchOutcome, FetchResilienceLayer, ResilienceConfig, Shutdown};
use jobsieve::engines::traits::FetchRequest;
use jobsieve::engines::user_agents::UserAgentRotator;
use jobsieve::utils::retry_policy::RetryPolicy;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

fn fast_layer(pool: Arc<ProxyPool>) -> FetchResilienceLayer {
    FetchResilienceLayer::new(
        pool,
        Arc::new(CaptchaDetector::default()),
        RetryPolicy {
            base_delay: Duration::from_millis(10),
            max_delay: Duration::from_millis(50),
            jitter_fraction: 0.0,
            ..RetryPolicy::default()
        },
        ResilienceConfig {
            random_delay_min: Duration::ZERO,
            random_delay_max: Duration::ZERO,
            request_timeout: Duration::from_secs(5),
        },
    )
}

#[tokio::test]
async fn test_transient_errors_are_retried_until_success() {
    let state = Arc::new(ServerState {
        flaky_failures: 2,
        ..ServerState::default()
    });
    let base = start_test_server(state.clone()).await;
    let layer = fast_layer(Arc::new(ProxyPool::default()));

    let outcome = layer
        .fetch(
            &ReqwestEngine,
            FetchRequest::new(format!("{}/flaky", base)),
            Shutdown::never(),
        )
        .await;

    let FetchOutcome::Success(response) = outcome else {
        panic!("expected success, got {:?}", outcome);
    };
    assert!(response.body.contains("Senior Product Designer"));
    assert_eq!(state.flaky_hits.load(Ordering::SeqCst), 3);

    let user_agents = state.user_agents.lock().unwrap();
    assert_eq!(user_agents.len(), 3);
    assert!(user_agents.iter().all(|(ua, _)| ua.starts_with("Mozilla/5.0")));
}

#[tokio::test]
async fn test_retried_requests_carry_headers_matching_their_user_agent() {
    let chrome = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/121.0.0.0 Safari/537.36";
    let firefox = "Mozilla/5.0 (X11; Ubuntu; Linux x86_64; rv:121.0) Gecko/20100101 Firefox/121.0";
    let state = Arc::new(ServerState {
        flaky_failures: 8,
        ..ServerState::default()
    });
    let base = start_test_server(state.clone()).await;
    let layer = FetchResilienceLayer::new(
        Arc::new(ProxyPool::default()),
        Arc::new(CaptchaDetector::default()),
        RetryPolicy {
            max_attempts: 8,
            base_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(5),
            jitter_fraction: 0.0,
            ..RetryPolicy::default()
        },
        ResilienceConfig {
            random_delay_min: Duration::ZERO,
            random_delay_max: Duration::ZERO,
            request_timeout: Duration::from_secs(5),
        },
    )
    .with_user_agents(UserAgentRotator::new(vec![
        chrome.to_string(),
        firefox.to_string(),
    ]));

    let outcome = layer
        .fetch(
            &ReqwestEngine,
            FetchRequest::new(format!("{}/flaky", base)),
            Shutdown::never(),
        )
        .await;
    assert!(outcome.is_success(), "{:?}", outcome);

    let requests = state.user_agents.lock().unwrap();
    assert_eq!(requests.len(), 9);
    for (ua, client_hints) in requests.iter() {
        let is_chromium = ua == chrome;
        assert!(is_chromium || ua == firefox, "unexpected user agent {}", ua);
        assert_eq!(*client_hints, is_chromium, "inconsistent headers for {}", ua);
    }
}

#[tokio::test]
async fn test_retry_ceiling_gives_up_with_last_response() {
    let state = Arc::new(ServerState::default());
    let base = start_test_server(state).await;
    let layer = fast_layer(Arc::new(ProxyPool::default()));

    let outcome = layer
        .fetch(
            &ReqwestEngine,
            FetchRequest::new(format!("{}/busy", base)),
            Shutdown::never(),
        )
        .await;

    match outcome {
        FetchOutcome::Failed {
            response: Some(response),
            reason,
        } => {
            assert_eq!(response.status_code, 429);
            assert_eq!(reason, "HTTP 429");
        }
        other => panic!("expected failure, got {:?}", other),
    }
}

#[tokio::test]
async fn test_captcha_page_is_blocked_without_retry() {
    let state = Arc::new(ServerState::default());
    let base = start_test_server(state.clone()).await;
    let layer = fast_layer(Arc::new(ProxyPool::default()));

    let outcome = layer
        .fetch(
            &ReqwestEngine,
            FetchRequest::new(format!("{}/captcha", base)),
            Shutdown::never(),
        )
        .await;

    let FetchOutcome::Blocked { verdict, .. } = outcome else {
        panic!("expected blocked, got {:?}", outcome);
    };
    assert_eq!(verdict.kind, CaptchaKind::RecaptchaV2);
    assert_eq!(verdict.site_key.as_deref(), Some("6LdTestKey"));
    assert_eq!(state.captcha_hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_dead_proxy_is_evicted_and_request_falls_back_to_direct() {
    let state = Arc::new(ServerState::default());
    let base = start_test_server(state).await;

    let pool = Arc::new(ProxyPool::new(ProxyPoolConfig {
        failure_threshold: 3,
        ..ProxyPoolConfig::default()
    }));
    pool.add(ProxyEndpoint::new("127.0.0.1", closed_port().await));
    let layer = fast_layer(pool.clone());

    let outcome = layer
        .fetch(
            &ReqwestEngine,
            FetchRequest::new(format!("{}/jobs", base)),
            Shutdown::never(),
        )
        .await;

    assert!(outcome.is_success(), "{:?}", outcome);
    assert!(pool.is_empty());
}

#[tokio::test]
async fn test_fetch_all_over_http() {
    let state = Arc::new(ServerState::default());
    let base = start_test_server(state).await;
    let layer = fast_layer(Arc::new(ProxyPool::default()));

    let urls = vec![
        format!("{}/jobs", base),
        format!("{}/captcha", base),
        format!("{}/busy", base),
    ];
    let outcomes = layer
        .fetch_all(&ReqwestEngine, urls, 2, Shutdown::never())
        .await;

    assert_eq!(outcomes.len(), 3);
    for (url, outcome) in &outcomes {
        if url.ends_with("/jobs") {
            assert!(outcome.is_success());
        } else if url.ends_with("/captcha") {
            assert!(matches!(outcome, FetchOutcome::Blocked { .. }));
        } else {
            assert!(matches!(outcome, FetchOutcome::Failed { .. }));
        }
    }
}

#[tokio::test]
async fn test_shutdown_before_start_abandons() {
    let (trigger, shutdown) = Shutdown::channel();
    trigger.trigger();

    let layer = fast_layer(Arc::new(ProxyPool::default()));
    let outcome = layer
        .fetch(
            &ReqwestEngine,
            FetchRequest::new("http://127.0.0.1:9/never"),
            shutdown,
        )
        .await;
    assert!(matches!(outcome, FetchOutcome::Abandoned { .. }));
}
