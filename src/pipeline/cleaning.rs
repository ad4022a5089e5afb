// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde_json::Value;

use super::{ItemOutcome, ItemStage};
use crate::domain::models::job_record::JobRecord;

/// 清洗阶段：去掉所有字符串字段首尾的空白
///
/// 幂等，重复清洗结果不变
#[derive(Debug, Clone, Copy, Default)]
pub struct CleaningStage;

impl CleaningStage {
    pub fn clean(&self, mut record: JobRecord) -> JobRecord {
        for field in record.string_fields_mut() {
            trim_in_place(field);
        }
        for value in record.extras.values_mut() {
            trim_value(value);
        }
        record
    }
}

impl ItemStage for CleaningStage {
    fn process_item(&self, record: JobRecord) -> ItemOutcome {
        ItemOutcome::Keep(self.clean(record))
    }

    fn name(&self) -> &'static str {
        "cleaning"
    }
}

fn trim_in_place(s: &mut String) {
    let trimmed = s.trim();
    if trimmed.len() != s.len() {
        *s = trimmed.to_string();
    }
}

fn trim_value(value: &mut Value) {
    match value {
        Value::String(s) => trim_in_place(s),
        Value::Array(items) => items.iter_mut().for_each(trim_value),
        Value::Object(map) => map.values_mut().for_each(trim_value),
        _ => {}
    }
}
