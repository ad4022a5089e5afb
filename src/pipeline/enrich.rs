// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::sync::Arc;

use super::{DropReason, ItemOutcome, ItemStage};
use crate::domain::models::job_record::JobRecord;
use crate::domain::services::categorizer::Categorizer;
use crate::domain::services::relevance_scorer::RelevanceScorer;

/// 评分阶段，0分的记录不会进入下游
pub struct ScoringStage {
    scorer: Arc<RelevanceScorer>,
}

impl ScoringStage {
    pub fn new(scorer: Arc<RelevanceScorer>) -> Self {
        Self { scorer }
    }
}

impl ItemStage for ScoringStage {
    fn process_item(&self, mut record: JobRecord) -> ItemOutcome {
        if self.scorer.is_vetoed(&record.title) {
            return ItemOutcome::Drop(DropReason::Vetoed);
        }

        let score = self.scorer.score_record(&record);
        if score == 0 {
            return ItemOutcome::Drop(DropReason::Irrelevant);
        }
        record.relevance_score = Some(score);
        ItemOutcome::Keep(record)
    }

    fn name(&self) -> &'static str {
        "scoring"
    }
}

/// 分类阶段
pub struct CategorizingStage {
    categorizer: Arc<Categorizer>,
}

impl CategorizingStage {
    pub fn new(categorizer: Arc<Categorizer>) -> Self {
        Self { categorizer }
    }
}

impl ItemStage for CategorizingStage {
    fn process_item(&self, record: JobRecord) -> ItemOutcome {
        ItemOutcome::Keep(self.categorizer.categorize(record))
    }

    fn name(&self) -> &'static str {
        "categorizing"
    }
}
