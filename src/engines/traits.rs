// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;

use crate::engines::proxy_pool::ProxyLease;

/// 抓取错误类型
#[derive(Error, Debug)]
pub enum EngineError {
    /// 请求失败
    #[error("Request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),
    /// 超时
    #[error("Timeout")]
    Timeout,
    /// 连接失败
    #[error("Connection failed: {0}")]
    Connection(String),
    /// 代理配置无效
    #[error("Invalid proxy: {0}")]
    InvalidProxy(String),
    /// 其他错误
    #[error("Other error: {0}")]
    Other(String),
}

impl EngineError {
    /// 判断错误是否属于网络层错误（可重试）
    ///
    /// # 返回值
    ///
    /// 如果错误是可重试的则返回true，否则返回false
    pub fn is_network_error(&self) -> bool {
        match self {
            EngineError::RequestFailed(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            EngineError::Timeout | EngineError::Connection(_) => true,
            // Configuration and validation problems never heal on retry
            EngineError::InvalidProxy(_) | EngineError::Other(_) => false,
        }
    }
}

/// 出站请求
///
/// 由抓取引擎提供、可由中间件修改请求头、代理和延迟的请求对象
#[derive(Debug, Clone)]
pub struct FetchRequest {
    /// 目标URL
    pub url: String,
    /// 请求头
    pub headers: HashMap<String, String>,
    /// 超时时间
    pub timeout: Duration,
    /// 本次请求租用的代理
    pub proxy: Option<ProxyLease>,
    /// 代理国家过滤
    pub proxy_country: Option<String>,
    /// 发送前等待的随机延迟
    pub delay: Option<Duration>,
    /// 已重试次数
    pub retry_count: u32,
    /// 是否绕过上游请求去重
    pub dont_filter: bool,
    /// 是否跳过代理
    pub dont_proxy: bool,
    /// 是否跳过随机延迟
    pub dont_delay: bool,
}

impl FetchRequest {
    /// 创建新的请求
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            headers: HashMap::new(),
            timeout: Duration::from_secs(30),
            proxy: None,
            proxy_country: None,
            delay: None,
            retry_count: 0,
            dont_filter: false,
            dont_proxy: false,
            dont_delay: false,
        }
    }

    /// 当前设置的 User-Agent
    pub fn user_agent(&self) -> Option<&str> {
        self.headers.get("User-Agent").map(String::as_str)
    }

    /// 代理URL（如果已分配）
    pub fn proxy_url(&self) -> Option<&str> {
        self.proxy.as_ref().map(|lease| lease.url())
    }
}

/// 入站响应
#[derive(Debug, Clone)]
pub struct FetchResponse {
    /// HTTP状态码
    pub status_code: u16,
    /// 响应内容
    pub body: String,
    /// 响应头
    pub headers: HashMap<String, String>,
    /// 响应时间（毫秒）
    pub response_time_ms: u64,
}

/// 抓取引擎特质
///
/// 真正发送网络请求的外部协作者
#[async_trait]
pub trait FetchEngine: Send + Sync {
    /// 执行抓取
    async fn fetch(&self, request: &FetchRequest) -> Result<FetchResponse, EngineError>;

    /// 引擎名称
    fn name(&self) -> &'static str;
}
