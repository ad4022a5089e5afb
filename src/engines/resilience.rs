// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use futures::stream::{self, StreamExt};
use metrics::counter;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::engines::captcha_detector::{CaptchaDetector, CaptchaVerdict};
use crate::engines::proxy_pool::ProxyPool;
use crate::engines::traits::{EngineError, FetchEngine, FetchRequest, FetchResponse};
use crate::engines::user_agents::UserAgentRotator;
use crate::utils::retry_policy::{is_retryable_error, RetryPolicy};

/// 随机延迟配置
#[derive(Debug, Clone)]
pub struct ResilienceConfig {
    /// 最小随机延迟
    pub random_delay_min: Duration,
    /// 最大随机延迟
    pub random_delay_max: Duration,
    /// 单次请求超时
    pub request_timeout: Duration,
}

impl Default for ResilienceConfig {
    fn default() -> Self {
        Self {
            random_delay_min: Duration::from_secs(1),
            random_delay_max: Duration::from_secs(3),
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// 响应处理结果
#[derive(Debug)]
pub enum ResponseAction {
    /// 正常响应，交给下游
    Pass(FetchResponse),
    /// 需要在延迟后重新发出请求
    Retry {
        request: FetchRequest,
        delay: Duration,
        reason: String,
    },
    /// 检测到验证码，不会自动重试
    Blocked {
        verdict: CaptchaVerdict,
        response: FetchResponse,
    },
    /// 重试次数用尽
    GiveUp {
        response: FetchResponse,
        reason: String,
    },
}

/// 异常处理结果
#[derive(Debug)]
pub enum ExceptionAction {
    Retry {
        request: FetchRequest,
        delay: Duration,
        reason: String,
    },
    GiveUp {
        reason: String,
    },
}

/// 一次完整抓取（含重试）的最终结果
#[derive(Debug)]
pub enum FetchOutcome {
    Success(FetchResponse),
    Blocked {
        verdict: CaptchaVerdict,
        response: FetchResponse,
    },
    Failed {
        reason: String,
        response: Option<FetchResponse>,
    },
    /// 停机时放弃的请求
    Abandoned {
        reason: String,
    },
}

impl FetchOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, FetchOutcome::Success(_))
    }
}

/// 停机信号
///
/// 触发后不再发出新请求，尚未完成的重试被放弃
#[derive(Debug, Clone)]
pub struct Shutdown {
    rx: watch::Receiver<bool>,
}

/// 停机触发器
#[derive(Debug)]
pub struct ShutdownTrigger {
    tx: watch::Sender<bool>,
}

impl ShutdownTrigger {
    pub fn trigger(&self) {
        // send_replace works even when every receiver is gone
        self.tx.send_replace(true);
    }
}

impl Shutdown {
    pub fn channel() -> (ShutdownTrigger, Shutdown) {
        let (tx, rx) = watch::channel(false);
        (ShutdownTrigger { tx }, Shutdown { rx })
    }

    /// 永远不会触发的停机信号
    pub fn never() -> Shutdown {
        let (_, shutdown) = Self::channel();
        shutdown
    }

    pub fn is_triggered(&self) -> bool {
        *self.rx.borrow()
    }

    /// 等待停机信号；触发器被丢弃后永远挂起
    pub async fn wait(&mut self) {
        loop {
            if *self.rx.borrow_and_update() {
                return;
            }
            if self.rx.changed().await.is_err() {
                std::future::pending::<()>().await;
            }
        }
    }

    /// 非阻塞地等待一段时间
    ///
    /// # 返回值
    ///
    /// 等待完成返回true，期间收到停机信号返回false
    pub async fn sleep(&mut self, duration: Duration) -> bool {
        if self.is_triggered() {
            return false;
        }
        tokio::select! {
            _ = tokio::time::sleep(duration) => true,
            _ = self.wait() => false,
        }
    }
}

/// 抓取韧性层
///
/// 出站请求：轮换 User-Agent、分配代理、注入随机延迟；
/// 入站响应/异常：验证码检测、代理健康回报和重试调度
pub struct FetchResilienceLayer {
    proxy_pool: Arc<ProxyPool>,
    captcha_detector: Arc<CaptchaDetector>,
    retry_policy: RetryPolicy,
    user_agents: UserAgentRotator,
    config: ResilienceConfig,
}

impl FetchResilienceLayer {
    pub fn new(
        proxy_pool: Arc<ProxyPool>,
        captcha_detector: Arc<CaptchaDetector>,
        retry_policy: RetryPolicy,
        config: ResilienceConfig,
    ) -> Self {
        Self {
            proxy_pool,
            captcha_detector,
            retry_policy,
            user_agents: UserAgentRotator::default(),
            config,
        }
    }

    pub fn with_user_agents(mut self, user_agents: UserAgentRotator) -> Self {
        self.user_agents = user_agents;
        self
    }

    pub fn proxy_pool(&self) -> &Arc<ProxyPool> {
        &self.proxy_pool
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry_policy
    }

    /// 处理出站请求
    pub fn process_request(&self, request: &mut FetchRequest) {
        self.user_agents.apply_to(&mut request.headers);
        debug!(
            "Using User-Agent: {}",
            request.user_agent().unwrap_or_default()
        );

        if !request.dont_proxy {
            // An empty pool means the request goes out directly
            request.proxy = self.proxy_pool.select(request.proxy_country.as_deref());
            if let Some(lease) = &request.proxy {
                debug!("Using proxy: {}", lease.label());
            }
        }

        request.delay = if request.dont_delay {
            None
        } else {
            let delay = self.random_delay();
            debug!("Adding random delay: {:.2}s", delay.as_secs_f64());
            Some(delay)
        };
    }

    fn random_delay(&self) -> Duration {
        let min = self.config.random_delay_min.as_secs_f64();
        let max = self.config.random_delay_max.as_secs_f64();
        if max <= min {
            return self.config.random_delay_min;
        }
        Duration::try_from_secs_f64(rand::random_range(min..=max))
            .unwrap_or(self.config.random_delay_max)
    }

    /// 处理入站响应
    pub fn process_response(&self, request: FetchRequest, response: FetchResponse) -> ResponseAction {
        if let Some(lease) = &request.proxy {
            self.proxy_pool.report_success(lease);
        }

        let verdict = self.captcha_detector.classify(&response.body);
        if verdict.detected {
            warn!("Captcha detected ({}) on {}", verdict.kind, request.url);
            self.captcha_detector.solve(&verdict, &request.url);
            return ResponseAction::Blocked { verdict, response };
        }

        if self.retry_policy.is_retryable_status(response.status_code) {
            let reason = format!("HTTP {}", response.status_code);
            return match self.retry(request, &reason) {
                Some((request, delay)) => ResponseAction::Retry {
                    request,
                    delay,
                    reason,
                },
                None => ResponseAction::GiveUp { response, reason },
            };
        }

        ResponseAction::Pass(response)
    }

    /// 处理请求异常
    pub fn process_exception(&self, request: FetchRequest, error: &EngineError) -> ExceptionAction {
        if let Some(lease) = &request.proxy {
            warn!("Proxy failed: {}", lease.label());
            self.proxy_pool.report_failure(lease);
        }

        let reason = error.to_string();
        if !is_retryable_error(error) {
            debug!("Not retrying {}: {}", request.url, reason);
            return ExceptionAction::GiveUp { reason };
        }

        match self.retry(request, &reason) {
            Some((request, delay)) => ExceptionAction::Retry {
                request,
                delay,
                reason,
            },
            None => ExceptionAction::GiveUp { reason },
        }
    }

    /// 构造重试请求
    ///
    /// 重试请求携带新的 User-Agent，且必须绕过上游请求去重
    fn retry(&self, request: FetchRequest, reason: &str) -> Option<(FetchRequest, Duration)> {
        let mut state = self.retry_policy.resume(request.retry_count);
        let Some(delay) = state.advance() else {
            error!("Max retries reached for {}", request.url);
            counter!("fetch_retries_exhausted_total").increment(1);
            return None;
        };

        warn!(
            "Retrying {} (attempt {}/{}) after {:.2}s - Reason: {}",
            request.url,
            state.attempt(),
            state.max_attempts(),
            delay.as_secs_f64(),
            reason
        );
        counter!("fetch_retries_total").increment(1);

        let mut retry_request = request;
        retry_request.retry_count = state.attempt();
        retry_request.dont_filter = true;
        retry_request.proxy = None;
        self.user_agents.apply_to(&mut retry_request.headers);
        Some((retry_request, delay))
    }

    /// 执行一次完整抓取，包括随机延迟、重试和停机处理
    ///
    /// 所有等待都是异步的，不会阻塞其它进行中的请求
    pub async fn fetch(
        &self,
        engine: &dyn FetchEngine,
        mut request: FetchRequest,
        mut shutdown: Shutdown,
    ) -> FetchOutcome {
        loop {
            if shutdown.is_triggered() {
                return self.abandon(&request);
            }

            self.process_request(&mut request);
            if let Some(delay) = request.delay {
                if !shutdown.sleep(delay).await {
                    return self.abandon(&request);
                }
            }

            let (next, delay) = match engine.fetch(&request).await {
                Ok(response) => match self.process_response(request, response) {
                    ResponseAction::Pass(response) => return FetchOutcome::Success(response),
                    ResponseAction::Blocked { verdict, response } => {
                        counter!("fetch_failures_total", "reason" => "captcha").increment(1);
                        return FetchOutcome::Blocked { verdict, response };
                    }
                    ResponseAction::GiveUp { response, reason } => {
                        counter!("fetch_failures_total", "reason" => "status").increment(1);
                        return FetchOutcome::Failed {
                            reason,
                            response: Some(response),
                        };
                    }
                    ResponseAction::Retry { request, delay, .. } => (request, delay),
                },
                Err(error) => match self.process_exception(request, &error) {
                    ExceptionAction::GiveUp { reason } => {
                        counter!("fetch_failures_total", "reason" => "exception").increment(1);
                        return FetchOutcome::Failed {
                            reason,
                            response: None,
                        };
                    }
                    ExceptionAction::Retry { request, delay, .. } => (request, delay),
                },
            };

            if !shutdown.sleep(delay).await {
                return self.abandon(&next);
            }
            request = next;
        }
    }

    fn abandon(&self, request: &FetchRequest) -> FetchOutcome {
        warn!(
            "Shutdown requested, abandoning {} after {} retries",
            request.url, request.retry_count
        );
        FetchOutcome::Abandoned {
            reason: "shutdown".to_string(),
        }
    }

    /// 并发抓取多个URL
    pub async fn fetch_all(
        &self,
        engine: &dyn FetchEngine,
        urls: Vec<String>,
        concurrency: usize,
        shutdown: Shutdown,
    ) -> Vec<(String, FetchOutcome)> {
        info!("Fetching {} urls with concurrency {}", urls.len(), concurrency);
        stream::iter(urls)
            .map(|url| {
                let shutdown = shutdown.clone();
                async move {
                    let mut request = FetchRequest::new(url.clone());
                    request.timeout = self.config.request_timeout;
                    let outcome = self.fetch(engine, request, shutdown).await;
                    (url, outcome)
                }
            })
            .buffer_unordered(concurrency.max(1))
            .collect()
            .await
    }
}
