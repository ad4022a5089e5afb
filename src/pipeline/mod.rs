// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

//! 记录处理管道
//!
//! 提取出的职位记录依次经过 清洗 → 去重 → 评分 → 分类，
//! 任何一个阶段都可以丢弃记录。

pub mod cleaning;
pub mod dedup;
pub mod enrich;

use metrics::counter;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

use crate::domain::models::job_record::JobRecord;
use crate::domain::services::categorizer::Categorizer;
use crate::domain::services::relevance_scorer::RelevanceScorer;

use cleaning::CleaningStage;
use dedup::DedupStage;
use enrich::{CategorizingStage, ScoringStage};

/// 丢弃原因
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DropReason {
    /// 本次运行中已经见过该链接
    Duplicate,
    /// 标题命中否决模式
    Vetoed,
    /// 没有任何匹配，得分为0
    Irrelevant,
}

impl DropReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            DropReason::Duplicate => "duplicate",
            DropReason::Vetoed => "vetoed",
            DropReason::Irrelevant => "irrelevant",
        }
    }
}

impl fmt::Display for DropReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 单个阶段的处理结果
#[derive(Debug, Clone, PartialEq)]
pub enum ItemOutcome {
    Keep(JobRecord),
    Drop(DropReason),
}

/// 管道阶段
pub trait ItemStage: Send + Sync {
    fn process_item(&self, record: JobRecord) -> ItemOutcome;

    fn name(&self) -> &'static str;

    /// 开始新的一次运行
    fn reset(&self) {}
}

/// 批处理统计
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PipelineStats {
    pub seen: usize,
    pub kept: usize,
    pub dropped: BTreeMap<DropReason, usize>,
}

impl PipelineStats {
    pub fn dropped(&self, reason: DropReason) -> usize {
        self.dropped.get(&reason).copied().unwrap_or(0)
    }

    pub fn total_dropped(&self) -> usize {
        self.dropped.values().sum()
    }
}

/// 记录处理管道
#[derive(Default)]
pub struct ItemPipeline {
    stages: Vec<Box<dyn ItemStage>>,
}

impl ItemPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加一个阶段
    pub fn with_stage(mut self, stage: impl ItemStage + 'static) -> Self {
        self.stages.push(Box::new(stage));
        self
    }

    /// 标准管道：清洗 → 去重 → 评分（丢弃0分） → 分类
    pub fn standard(scorer: Arc<RelevanceScorer>, categorizer: Arc<Categorizer>) -> Self {
        Self::new()
            .with_stage(CleaningStage)
            .with_stage(DedupStage::new())
            .with_stage(ScoringStage::new(scorer))
            .with_stage(CategorizingStage::new(categorizer))
    }

    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    /// 让记录依次通过所有阶段
    pub fn process_item(&self, record: JobRecord) -> ItemOutcome {
        let mut current = record;
        for stage in &self.stages {
            let link = current.link.clone();
            match stage.process_item(current) {
                ItemOutcome::Keep(next) => current = next,
                ItemOutcome::Drop(reason) => {
                    debug!(stage = stage.name(), %reason, "Dropped item {}", link);
                    counter!("pipeline_dropped_total", "reason" => reason.as_str()).increment(1);
                    return ItemOutcome::Drop(reason);
                }
            }
        }
        ItemOutcome::Keep(current)
    }

    /// 批量处理，返回保留的记录和统计
    pub fn process_batch(&self, records: Vec<JobRecord>) -> (Vec<JobRecord>, PipelineStats) {
        let mut stats = PipelineStats::default();
        let mut kept = Vec::with_capacity(records.len());

        for record in records {
            stats.seen += 1;
            match self.process_item(record) {
                ItemOutcome::Keep(record) => kept.push(record),
                ItemOutcome::Drop(reason) => *stats.dropped.entry(reason).or_default() += 1,
            }
        }
        stats.kept = kept.len();

        info!(
            "Pipeline processed {} items: {} kept, {} dropped",
            stats.seen,
            stats.kept,
            stats.total_dropped()
        );
        (kept, stats)
    }

    /// 重置所有阶段的运行状态
    pub fn reset(&self) {
        for stage in &self.stages {
            stage.reset();
        }
    }
}
