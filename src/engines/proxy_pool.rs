// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use metrics::{counter, gauge};
use parking_lot::Mutex;
use rand::seq::IndexedRandom;
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

/// 代理池错误类型
#[derive(Error, Debug)]
pub enum ProxyError {
    /// 代理列表读取失败
    #[error("failed to read proxy list {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// 代理协议
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProxyProtocol {
    #[default]
    Http,
    Https,
    Socks4,
    Socks5,
}

impl ProxyProtocol {
    /// URL scheme
    pub fn scheme(&self) -> &'static str {
        match self {
            ProxyProtocol::Http => "http",
            ProxyProtocol::Https => "https",
            ProxyProtocol::Socks4 => "socks4",
            ProxyProtocol::Socks5 => "socks5",
        }
    }
}

/// 代理端点
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyEndpoint {
    /// 主机
    pub host: String,
    /// 端口
    pub port: u16,
    /// 协议
    pub protocol: ProxyProtocol,
    /// 用户名
    pub username: Option<String>,
    /// 密码
    pub password: Option<String>,
    /// 国家标签
    pub country: Option<String>,
    /// 连续失败次数
    failures: u32,
}

impl ProxyEndpoint {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            protocol: ProxyProtocol::Http,
            username: None,
            password: None,
            country: None,
            failures: 0,
        }
    }

    pub fn with_protocol(mut self, protocol: ProxyProtocol) -> Self {
        self.protocol = protocol;
        self
    }

    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.country = Some(country.into());
        self
    }

    /// 连续失败次数
    pub fn failures(&self) -> u32 {
        self.failures
    }

    /// 转换为请求可用的代理URL
    ///
    /// 只有同时提供用户名和密码时才会带上认证信息
    pub fn to_url(&self) -> String {
        let auth = match (&self.username, &self.password) {
            (Some(user), Some(pass)) => format!("{}:{}@", user, pass),
            _ => String::new(),
        };
        format!("{}://{}{}:{}", self.protocol.scheme(), auth, self.host, self.port)
    }

    /// 解析代理列表中的一行
    ///
    /// 支持 `host:port` 和 `host:port:user:pass` 两种格式，其它格式返回 `None`
    pub fn parse_line(line: &str) -> Option<Self> {
        let parts: Vec<&str> = line.split(':').map(str::trim).collect();
        let (host, port) = match parts.as_slice() {
            [host, port] | [host, port, _, _] => (*host, port.parse::<u16>().ok()?),
            _ => return None,
        };
        if host.is_empty() || port == 0 {
            return None;
        }

        let endpoint = ProxyEndpoint::new(host, port);
        match parts.as_slice() {
            [_, _, user, pass] if !user.is_empty() && !pass.is_empty() => {
                Some(endpoint.with_credentials(*user, *pass))
            }
            [_, _, _, _] => None,
            _ => Some(endpoint),
        }
    }
}

impl fmt::Display for ProxyEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// 代理租约
///
/// 附着在进行中的请求上，用于之后回报成功或失败
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyLease {
    id: u64,
    url: String,
    label: String,
}

impl ProxyLease {
    pub fn url(&self) -> &str {
        &self.url
    }

    /// `host:port`，用于日志
    pub fn label(&self) -> &str {
        &self.label
    }
}

/// 代理选择策略
///
/// 轮询会改变代理在各数据源之间的使用分布，需要显式开启
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionStrategy {
    /// 均匀随机
    #[default]
    Random,
    /// 轮询
    RoundRobin,
}

/// 代理池配置
#[derive(Debug, Clone)]
pub struct ProxyPoolConfig {
    /// 驱逐阈值（连续失败次数）
    pub failure_threshold: u32,
    /// 选择策略
    pub strategy: SelectionStrategy,
}

impl Default for ProxyPoolConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 3,
            strategy: SelectionStrategy::Random,
        }
    }
}

#[derive(Debug)]
struct PoolEntry {
    id: u64,
    endpoint: ProxyEndpoint,
}

#[derive(Debug, Default)]
struct PoolState {
    entries: Vec<PoolEntry>,
    next_id: u64,
    enabled: bool,
    cursor: usize,
}

/// 代理池
///
/// 持有代理端点，为每个请求选择一个代理，并驱逐连续失败的代理
#[derive(Debug)]
pub struct ProxyPool {
    state: Mutex<PoolState>,
    config: ProxyPoolConfig,
}

impl Default for ProxyPool {
    fn default() -> Self {
        Self::new(ProxyPoolConfig::default())
    }
}

impl ProxyPool {
    /// 创建空的代理池（在添加代理之前处于禁用状态）
    pub fn new(config: ProxyPoolConfig) -> Self {
        Self {
            state: Mutex::new(PoolState::default()),
            config: ProxyPoolConfig {
                failure_threshold: config.failure_threshold.max(1),
                ..config
            },
        }
    }

    /// 添加代理并启用代理池
    pub fn add(&self, endpoint: ProxyEndpoint) {
        let mut state = self.state.lock();
        let id = state.next_id;
        state.next_id += 1;
        info!("Added proxy: {}", endpoint);
        state.entries.push(PoolEntry { id, endpoint });
        state.enabled = true;
        gauge!("proxy_pool_size").set(state.entries.len() as f64);
    }

    /// 从文本加载代理列表
    ///
    /// 空行和 `#` 开头的行被忽略，格式错误的行被静默跳过
    ///
    /// # 返回值
    ///
    /// 成功添加的代理数量
    pub fn load_from_source(&self, source: &str) -> usize {
        let mut added = 0;
        for line in source.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            match ProxyEndpoint::parse_line(line) {
                Some(endpoint) => {
                    self.add(endpoint);
                    added += 1;
                }
                None => debug!("Skipping malformed proxy line: {}", line),
            }
        }
        added
    }

    /// 从文件加载代理列表
    pub fn load_from_file(&self, path: impl AsRef<Path>) -> Result<usize, ProxyError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ProxyError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let added = self.load_from_source(&content);
        info!("Loaded {} proxies from {}", added, path.display());
        Ok(added)
    }

    /// 选择代理
    ///
    /// # 参数
    ///
    /// * `country` - 可选的国家过滤
    ///
    /// # 返回值
    ///
    /// 代理池为空、未启用或没有匹配的代理时返回 `None`
    pub fn select(&self, country: Option<&str>) -> Option<ProxyLease> {
        let mut state = self.state.lock();
        if !state.enabled || state.entries.is_empty() {
            return None;
        }

        let candidates: Vec<&PoolEntry> = state
            .entries
            .iter()
            .filter(|entry| match country {
                Some(wanted) => entry
                    .endpoint
                    .country
                    .as_deref()
                    .is_some_and(|c| c.eq_ignore_ascii_case(wanted)),
                None => true,
            })
            .collect();

        let chosen = match self.config.strategy {
            SelectionStrategy::Random => candidates.choose(&mut rand::rng()).copied(),
            SelectionStrategy::RoundRobin if !candidates.is_empty() => {
                Some(candidates[state.cursor % candidates.len()])
            }
            SelectionStrategy::RoundRobin => None,
        }?;

        let lease = ProxyLease {
            id: chosen.id,
            url: chosen.endpoint.to_url(),
            label: chosen.endpoint.to_string(),
        };
        state.cursor = state.cursor.wrapping_add(1);

        counter!("proxy_selections_total").increment(1);
        Some(lease)
    }

    /// 回报成功，重置连续失败计数
    pub fn report_success(&self, lease: &ProxyLease) {
        let mut state = self.state.lock();
        if let Some(entry) = state.entries.iter_mut().find(|e| e.id == lease.id) {
            entry.endpoint.failures = 0;
        }
    }

    /// 回报失败
    ///
    /// 连续失败次数达到阈值时将代理移出代理池
    ///
    /// # 返回值
    ///
    /// 如果代理被驱逐则返回true
    pub fn report_failure(&self, lease: &ProxyLease) -> bool {
        let mut state = self.state.lock();
        let Some(index) = state.entries.iter().position(|e| e.id == lease.id) else {
            return false;
        };

        counter!("proxy_failures_total").increment(1);
        let entry = &mut state.entries[index];
        entry.endpoint.failures += 1;
        if entry.endpoint.failures < self.config.failure_threshold {
            return false;
        }

        let removed = state.entries.remove(index);
        warn!(
            "Removed failed proxy: {} after {} consecutive failures",
            removed.endpoint, removed.endpoint.failures
        );
        counter!("proxy_evictions_total").increment(1);
        gauge!("proxy_pool_size").set(state.entries.len() as f64);
        true
    }

    /// 代理数量
    pub fn len(&self) -> usize {
        self.state.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 是否已启用（至少添加过一个代理）
    pub fn is_enabled(&self) -> bool {
        self.state.lock().enabled
    }

    /// 当前代理快照
    pub fn snapshot(&self) -> Vec<ProxyEndpoint> {
        self.state
            .lock()
            .entries
            .iter()
            .map(|e| e.endpoint.clone())
            .collect()
    }

    pub fn failure_threshold(&self) -> u32 {
        self.config.failure_threshold
    }
}
