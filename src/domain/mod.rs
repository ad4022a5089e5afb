// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域层模块
///
/// - 领域模型（models）：职位记录
/// - 服务（services）：相关性评分和职位分类
///
/// 不依赖网络或存储，只包含纯粹的业务规则。
pub mod models;
pub mod services;
