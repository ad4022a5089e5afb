// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::collections::BTreeSet;
use std::time::Duration;

use crate::engines::traits::EngineError;

/// 最小退避时间，避免零或负延迟
pub const MIN_DELAY: Duration = Duration::from_millis(100);

/// 默认可重试状态码
pub const DEFAULT_RETRYABLE_STATUS_CODES: [u16; 6] = [403, 429, 500, 502, 503, 504];

/// 秒数转换为 `Duration`
///
/// 非有限值或非正数视为零，超出 `Duration` 表示范围时饱和为 `Duration::MAX`
pub fn saturating_secs(secs: f64) -> Duration {
    if !secs.is_finite() || secs <= 0.0 {
        return Duration::ZERO;
    }
    Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX)
}

/// 重试策略配置
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// 最大重试次数
    pub max_attempts: u32,
    /// 初始退避时间
    pub base_delay: Duration,
    /// 最大退避时间
    pub max_delay: Duration,
    /// 抖动因子 (0.0-1.0)
    pub jitter_fraction: f64,
    /// 可重试的HTTP状态码
    pub retryable_status_codes: BTreeSet<u16>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(60),
            jitter_fraction: 0.5,
            retryable_status_codes: DEFAULT_RETRYABLE_STATUS_CODES.into_iter().collect(),
        }
    }
}

impl RetryPolicy {
    /// 创建标准重试策略
    pub fn standard() -> Self {
        Self::default()
    }

    /// 创建慢速重试策略（更长的退避时间，适合反爬严格的站点）
    pub fn slow() -> Self {
        Self {
            max_attempts: 5,
            base_delay: Duration::from_secs(2),
            max_delay: Duration::from_secs(60),
            jitter_fraction: 0.3,
            ..Self::default()
        }
    }

    /// 指数退避的基准值（抖动前）
    ///
    /// `min(base * 2^attempt, max)`
    pub fn base_delay_for(attempt: u32, base_delay: Duration, max_delay: Duration) -> Duration {
        let exponent = attempt.min(63) as i32;
        let backoff_secs = base_delay.as_secs_f64() * 2f64.powi(exponent);
        saturating_secs(backoff_secs.min(max_delay.as_secs_f64()))
    }

    /// 计算带抖动的退避时间
    ///
    /// 抖动范围为基准值的 `±jitter_fraction`，结果不小于 [`MIN_DELAY`]
    pub fn compute_delay_with(
        attempt: u32,
        base_delay: Duration,
        max_delay: Duration,
        jitter_fraction: f64,
    ) -> Duration {
        let capped = Self::base_delay_for(attempt, base_delay, max_delay).as_secs_f64();
        let jitter_range = capped * jitter_fraction.clamp(0.0, 1.0);

        let jittered = if jitter_range > 0.0 {
            capped + rand::random_range(-jitter_range..=jitter_range)
        } else {
            capped
        };

        saturating_secs(jittered.max(MIN_DELAY.as_secs_f64()))
    }

    /// 计算下次重试的退避时间
    pub fn compute_delay(&self, attempt: u32) -> Duration {
        Self::compute_delay_with(
            attempt,
            self.base_delay,
            self.max_delay,
            self.jitter_fraction,
        )
    }

    /// 是否应该重试
    pub fn should_retry(&self, attempt: u32) -> bool {
        attempt < self.max_attempts
    }

    /// 状态码是否在可重试列表中
    pub fn is_retryable_status(&self, status_code: u16) -> bool {
        self.retryable_status_codes.contains(&status_code)
    }

    /// 根据错误类型判断是否应该重试
    pub fn should_retry_with_error(&self, attempt: u32, error: &EngineError) -> bool {
        self.should_retry(attempt) && is_retryable_error(error)
    }

    /// 为新请求创建重试状态
    pub fn begin(&self) -> RetryState {
        self.resume(0)
    }

    /// 从请求上记录的重试次数恢复重试状态
    pub fn resume(&self, attempt: u32) -> RetryState {
        RetryState {
            attempt,
            max_attempts: self.max_attempts,
            base_delay: self.base_delay,
            max_delay: self.max_delay,
            jitter_fraction: self.jitter_fraction,
        }
    }
}

/// 单个请求的重试状态
///
/// 成功或超过重试上限后丢弃
#[derive(Debug, Clone)]
pub struct RetryState {
    attempt: u32,
    max_attempts: u32,
    base_delay: Duration,
    max_delay: Duration,
    jitter_fraction: f64,
}

impl RetryState {
    /// 已经进行的重试次数
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// 推进到下一次重试
    ///
    /// # 返回值
    ///
    /// 还有重试机会时返回本次应等待的退避时间，否则返回 `None`
    pub fn advance(&mut self) -> Option<Duration> {
        if self.attempt >= self.max_attempts {
            return None;
        }
        let delay = RetryPolicy::compute_delay_with(
            self.attempt,
            self.base_delay,
            self.max_delay,
            self.jitter_fraction,
        );
        self.attempt += 1;
        Some(delay)
    }
}

/// 判断错误是否可重试
///
/// 只有网络层错误（超时、连接失败等）会被重试，其它错误原样传递
pub fn is_retryable_error(error: &EngineError) -> bool {
    error.is_network_error()
}
