// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use dashmap::DashSet;

use super::{DropReason, ItemOutcome, ItemStage};
use crate::domain::models::job_record::JobRecord;

/// 去重阶段
///
/// 以 `link` 为记录身份，同一次运行中每个链接只放行一次。
/// 没有链接的记录无法判断身份，直接放行
#[derive(Debug, Default)]
pub struct DedupStage {
    seen_links: DashSet<String>,
}

impl DedupStage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dedup(&self, record: JobRecord) -> Option<JobRecord> {
        if record.link.is_empty() || self.seen_links.insert(record.link.clone()) {
            Some(record)
        } else {
            None
        }
    }

    pub fn seen_count(&self) -> usize {
        self.seen_links.len()
    }

    pub fn clear(&self) {
        self.seen_links.clear();
    }
}

impl ItemStage for DedupStage {
    fn process_item(&self, record: JobRecord) -> ItemOutcome {
        match self.dedup(record) {
            Some(record) => ItemOutcome::Keep(record),
            None => ItemOutcome::Drop(DropReason::Duplicate),
        }
    }

    fn name(&self) -> &'static str {
        "dedup"
    }

    fn reset(&self) {
        self.clear();
    }
}
