// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 配置模块
///
/// 加载抓取、重试、代理、验证码、指标和运行输入等配置
pub mod settings;
