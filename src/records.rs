// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

//! Loading raw job records produced by the site extractors.

use serde_json::Value;
use std::path::Path;
use tracing::{debug, warn};

use crate::domain::models::job_record::JobRecord;
use crate::utils::errors::RecordError;

/// 解析记录数组
///
/// 接受一个或多个首尾相接的JSON数组（例如 `[...][...]`，
/// 多次追加写入同一文件时会出现）。单条记录格式错误时记录警告并跳过
pub fn parse_records(text: &str) -> Result<Vec<JobRecord>, RecordError> {
    let mut records = Vec::new();
    let mut skipped = 0usize;

    for chunk in serde_json::Deserializer::from_str(text).into_iter::<Value>() {
        let Value::Array(items) = chunk? else {
            return Err(RecordError::NotAnArray);
        };
        for (index, item) in items.into_iter().enumerate() {
            match serde_json::from_value::<JobRecord>(item) {
                Ok(record) => records.push(record),
                Err(e) => {
                    skipped += 1;
                    warn!("Skipping malformed record #{}: {}", index, e);
                }
            }
        }
    }

    debug!("Parsed {} records, skipped {}", records.len(), skipped);
    Ok(records)
}

/// 从文件加载记录
pub fn load_records(path: impl AsRef<Path>) -> Result<Vec<JobRecord>, RecordError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| RecordError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse_records(&text)
}

/// 加载记录，失败时记录警告并返回空列表
///
/// 用于批处理入口：输入文件缺失或损坏不应中断已完成的抓取
pub fn load_records_or_empty(path: impl AsRef<Path>) -> Vec<JobRecord> {
    let path = path.as_ref();
    load_records(path).unwrap_or_else(|e| {
        warn!("Failed to load records from {}: {}", path.display(), e);
        Vec::new()
    })
}
