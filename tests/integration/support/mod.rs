// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::get,
    Router,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

pub const JOB_PAGE: &str =
    "<html><body><h1>Senior Product Designer</h1><p>Remote - Anywhere</p></body></html>";

pub const CAPTCHA_PAGE: &str = r#"<html><body>
<div class="g-recaptcha" data-sitekey="6LdTestKey"></div>
</body></html>"#;

/// 测试服务器的共享状态
#[derive(Default)]
pub struct ServerState {
    /// /flaky 在返回200之前先返回几次503
    pub flaky_failures: usize,
    pub flaky_hits: AtomicUsize,
    pub captcha_hits: AtomicUsize,
    /// /flaky 收到的每个请求：(User-Agent, 是否携带 Chromium 客户端提示)
    pub user_agents: Mutex<Vec<(String, bool)>>,
}

async fn jobs() -> &'static str {
    JOB_PAGE
}

async fn flaky(State(state): State<Arc<ServerState>>, headers: HeaderMap) -> impl IntoResponse {
    if let Some(ua) = headers.get("user-agent").and_then(|v| v.to_str().ok()) {
        let client_hints = headers.contains_key("sec-ch-ua")
            || headers.contains_key("sec-ch-ua-platform")
            || headers.contains_key("sec-fetch-mode");
        state
            .user_agents
            .lock()
            .unwrap()
            .push((ua.to_string(), client_hints));
    }
    let hit = state.flaky_hits.fetch_add(1, Ordering::SeqCst);
    if hit < state.flaky_failures {
        StatusCode::SERVICE_UNAVAILABLE.into_response()
    } else {
        JOB_PAGE.into_response()
    }
}

async fn captcha(State(state): State<Arc<ServerState>>) -> &'static str {
    state.captcha_hits.fetch_add(1, Ordering::SeqCst);
    CAPTCHA_PAGE
}

async fn always_busy() -> StatusCode {
    StatusCode::TOO_MANY_REQUESTS
}

/// 启动测试服务器，返回基础URL
pub async fn start_test_server(state: Arc<ServerState>) -> String {
    let app = Router::new()
        .route("/jobs", get(jobs))
        .route("/flaky", get(flaky))
        .route("/captcha", get(captcha))
        .route("/busy", get(always_busy))
        .with_state(state);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}", addr)
}

/// 一个没有进程监听的本地端口
pub async fn closed_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    port
}
