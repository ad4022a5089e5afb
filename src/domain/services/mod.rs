// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域服务模块
///
/// 包含的服务：
/// - 候选人画像（profile）：评分用的模式表
/// - 相关性评分（relevance_scorer）：为职位打 0-100 分
/// - 职位分类（categorizer）：按雇佣类型和地区分桶
pub mod categorizer;
pub mod profile;
pub mod relevance_scorer;
