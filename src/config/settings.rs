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

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use crate::engines::captcha_detector::CaptchaSolverConfig;
use crate::engines::proxy_pool::{ProxyPoolConfig, SelectionStrategy};
use crate::engines::resilience::ResilienceConfig;
use crate::utils::retry_policy::{saturating_secs, RetryPolicy};
use crate::utils::telemetry::LogFormat;

/// 应用程序配置设置
#[derive(Debug, Deserialize)]
pub struct Settings {
    /// 抓取配置
    pub fetch: FetchSettings,
    /// 重试配置
    pub retry: RetrySettings,
    /// 代理配置
    pub proxy: ProxySettings,
    /// 验证码求解配置
    #[serde(default)]
    pub captcha: CaptchaSettings,
    /// 指标配置
    #[serde(default)]
    pub metrics: MetricsSettings,
    /// 日志配置
    #[serde(default)]
    pub log: LogSettings,
    /// 单次运行的输入
    #[serde(default)]
    pub run: RunSettings,
}

/// 抓取配置设置（时间单位：秒）
#[derive(Debug, Deserialize)]
pub struct FetchSettings {
    /// 请求前随机延迟下限
    pub random_delay_min: f64,
    /// 请求前随机延迟上限
    pub random_delay_max: f64,
    /// 单次请求超时
    pub timeout: f64,
    /// 并发请求数
    pub concurrency: usize,
}

/// 重试配置设置（时间单位：秒）
#[derive(Debug, Deserialize)]
pub struct RetrySettings {
    pub max_attempts: u32,
    pub base_delay: f64,
    pub max_delay: f64,
    pub jitter_fraction: f64,
    pub retryable_status_codes: Vec<u16>,
}

/// 代理配置设置
#[derive(Debug, Deserialize)]
pub struct ProxySettings {
    /// 代理列表文件路径，未设置时不使用代理
    pub list_source: Option<String>,
    /// 连续失败多少次后驱逐
    pub failure_threshold: u32,
    pub strategy: SelectionStrategy,
}

/// 验证码求解配置设置
#[derive(Debug, Default, Deserialize)]
pub struct CaptchaSettings {
    pub service_name: Option<String>,
    pub api_key: Option<String>,
}

/// 指标配置设置
#[derive(Debug, Default, Deserialize)]
pub struct MetricsSettings {
    /// Prometheus 监听地址，例如 `0.0.0.0:9000`
    pub listen_addr: Option<String>,
}

/// 日志配置设置
#[derive(Debug, Default, Deserialize)]
pub struct LogSettings {
    pub format: LogFormat,
}

/// 运行输入设置
#[derive(Debug, Default, Deserialize)]
pub struct RunSettings {
    /// 需要抓取的入口URL
    #[serde(default)]
    pub seed_urls: Vec<String>,
    /// 原始职位记录（JSON数组）文件路径
    pub input_path: Option<String>,
}

impl Settings {
    /// 创建新的配置实例
    ///
    /// 依次加载内置默认值、`config/default`、`config/{APP_ENVIRONMENT}`
    /// 和 `JOBSIEVE__` 前缀的环境变量
    ///
    /// # Returns
    ///
    /// * `Ok(Settings)` - 成功加载的配置
    /// * `Err(ConfigError)` - 配置加载失败
    pub fn new() -> Result<Self, ConfigError> {
        Self::load_from("config")
    }

    /// 从指定目录加载配置文件
    pub fn load_from(config_dir: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let config_dir = config_dir.as_ref();
        let env = std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "default".to_string());
        let builder = Config::builder()
            // Fetch defaults
            .set_default("fetch.random_delay_min", 1.0)?
            .set_default("fetch.random_delay_max", 3.0)?
            .set_default("fetch.timeout", 30.0)?
            .set_default("fetch.concurrency", 4)?
            // Retry defaults
            .set_default("retry.max_attempts", 3)?
            .set_default("retry.base_delay", 1.0)?
            .set_default("retry.max_delay", 60.0)?
            .set_default("retry.jitter_fraction", 0.5)?
            .set_default(
                "retry.retryable_status_codes",
                vec![403i64, 429, 500, 502, 503, 504],
            )?
            // Proxy defaults
            .set_default("proxy.failure_threshold", 3)?
            .set_default("proxy.strategy", "random")?
            .add_source(
                File::with_name(&config_dir.join("default").to_string_lossy()).required(false),
            )
            .add_source(File::with_name(&config_dir.join(&env).to_string_lossy()).required(false))
            .add_source(
                Environment::with_prefix("JOBSIEVE")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("run.seed_urls")
                    .with_list_parse_key("retry.retryable_status_codes")
                    .try_parsing(true),
            );

        builder.build()?.try_deserialize()
    }
}

impl FetchSettings {
    pub fn timeout(&self) -> Duration {
        saturating_secs(self.timeout)
    }
}

impl MetricsSettings {
    /// 解析监听地址；未配置时返回 `None`
    pub fn socket_addr(&self) -> Result<Option<SocketAddr>, ConfigError> {
        self.listen_addr
            .as_deref()
            .map(|addr| {
                addr.parse().map_err(|e| {
                    ConfigError::Message(format!("invalid metrics.listen_addr {}: {}", addr, e))
                })
            })
            .transpose()
    }
}

impl From<&FetchSettings> for ResilienceConfig {
    fn from(settings: &FetchSettings) -> Self {
        let min = saturating_secs(settings.random_delay_min);
        Self {
            random_delay_min: min,
            random_delay_max: saturating_secs(settings.random_delay_max).max(min),
            request_timeout: settings.timeout(),
        }
    }
}

impl From<&RetrySettings> for RetryPolicy {
    fn from(settings: &RetrySettings) -> Self {
        Self {
            max_attempts: settings.max_attempts,
            base_delay: saturating_secs(settings.base_delay),
            max_delay: saturating_secs(settings.max_delay),
            jitter_fraction: settings.jitter_fraction.clamp(0.0, 1.0),
            retryable_status_codes: settings.retryable_status_codes.iter().copied().collect(),
        }
    }
}

impl From<&ProxySettings> for ProxyPoolConfig {
    fn from(settings: &ProxySettings) -> Self {
        Self {
            failure_threshold: settings.failure_threshold,
            strategy: settings.strategy,
        }
    }
}

impl From<&CaptchaSettings> for CaptchaSolverConfig {
    fn from(settings: &CaptchaSettings) -> Self {
        Self {
            service_name: settings.service_name.clone(),
            api_key: settings.api_key.clone(),
        }
    }
}

#[cfg(test)]
#[path = "settings_test.rs"]
mod tests;
