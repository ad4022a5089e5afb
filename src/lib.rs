// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 配置模块
///
/// 处理应用程序的配置设置和环境变量
pub mod config;

/// 领域模块
///
/// 职位记录、相关性评分和分类
pub mod domain;

/// 引擎模块
///
/// HTTP抓取引擎以及代理、重试、验证码检测组成的韧性层
pub mod engines;

/// 基础设施模块
///
/// 指标导出
pub mod infrastructure;

/// 记录处理管道模块
pub mod pipeline;

/// 原始记录加载
pub mod records;

/// 工具模块
///
/// 错误类型、重试策略和日志初始化
pub mod utils;
