// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use thiserror::Error;

/// 原始记录解析错误
#[derive(Error, Debug)]
pub enum RecordError {
    #[error("无法读取记录文件 {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("记录数据不是有效的JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("记录数据的顶层必须是数组")]
    NotAnArray,
}
