// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tracing::debug;

use crate::domain::models::job_record::JobRecord;
use crate::domain::services::relevance_scorer::{PatternSet, ProfileError};

/// 桶外记录的名称
pub const OTHER_BUCKET: &str = "other";

/// 雇佣类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobType {
    Remote,
    Freelance,
    FullTime,
    Hybrid,
}

impl JobType {
    pub const ALL: [JobType; 4] = [
        JobType::Remote,
        JobType::Freelance,
        JobType::FullTime,
        JobType::Hybrid,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            JobType::Remote => "remote",
            JobType::Freelance => "freelance",
            JobType::FullTime => "fulltime",
            JobType::Hybrid => "hybrid",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            JobType::Remote => "🏠",
            JobType::Freelance => "💼",
            JobType::FullTime => "🏢",
            JobType::Hybrid => "🔄",
        }
    }

    /// 远程和自由职业都视为可远程
    pub fn is_remote(&self) -> bool {
        matches!(self, JobType::Remote | JobType::Freelance)
    }
}

impl fmt::Display for JobType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 地区
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Region {
    Egypt,
    Uae,
    Europe,
    Global,
    Unknown,
}

impl Region {
    pub fn as_str(&self) -> &'static str {
        match self {
            Region::Egypt => "egypt",
            Region::Uae => "uae",
            Region::Europe => "europe",
            Region::Global => "global",
            Region::Unknown => "unknown",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Region::Egypt => "🇪🇬",
            Region::Uae => "🇦🇪",
            Region::Europe => "🇪🇺",
            Region::Global => "🌍",
            Region::Unknown => "📍",
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// 分类用的模式表
#[derive(Debug, Clone)]
pub struct CategoryTables {
    pub remote: Vec<String>,
    pub freelance: Vec<String>,
    pub hybrid: Vec<String>,
    pub fulltime: Vec<String>,
    pub egypt: Vec<String>,
    pub uae: Vec<String>,
    pub europe: Vec<String>,
    /// 自由职业平台名称，按子串匹配来源标签（小写）
    pub freelance_platforms: Vec<String>,
}

impl Default for CategoryTables {
    fn default() -> Self {
        Self {
            remote: owned(&[
                r"\bremote\b",
                r"\bwork\s*from\s*home\b",
                r"\bwfh\b",
                r"\bdistributed\b",
                r"\banywhere\b",
                r"\bfully\s*remote\b",
                r"\b100%\s*remote\b",
            ]),
            freelance: owned(&[
                r"\bfreelance\b",
                r"\bcontract\b",
                r"\bproject[-\s]based\b",
                r"\bgig\b",
                r"\bhourly\b",
                r"\bper\s*project\b",
                r"\bshort[-\s]term\b",
            ]),
            hybrid: owned(&[
                r"\bhybrid\b",
                r"\bflexible\s*(?:work|location)\b",
                r"\b\d+\s*days?\s*(?:in\s*)?office\b",
                r"\b\d+\s*days?\s*remote\b",
                r"\bpartially\s*remote\b",
            ]),
            fulltime: owned(&[
                r"\bfull[-\s]?time\b",
                r"\bpermanent\b",
                r"\bemployee\b",
                r"\bsalaried\b",
                r"\bfte\b",
            ]),
            egypt: owned(&[
                r"\begypt\b",
                r"\bcairo\b",
                r"\balexandria\b",
                r"\bgiza\b",
                r"\bmaadi\b",
                r"\bnasr\s*city\b",
                r"\bnew\s*cairo\b",
            ]),
            uae: owned(&[
                r"\buae\b",
                r"\bdubai\b",
                r"\babu\s*dhabi\b",
                r"\bsharjah\b",
                r"\bajman\b",
                r"\bunited\s*arab\s*emirates\b",
                r"\bemirati\b",
            ]),
            europe: owned(&[
                r"\bgermany\b",
                r"\buk\b",
                r"\bunited\s*kingdom\b",
                r"\bfrance\b",
                r"\bnetherlands\b",
                r"\bspain\b",
                r"\bitaly\b",
                r"\beurope\b",
                r"\beu\b",
                r"\bberlin\b",
                r"\blondon\b",
                r"\bparis\b",
                r"\bamsterdam\b",
            ]),
            freelance_platforms: owned(&[
                "upwork",
                "fiverr",
                "mostaql",
                "khamsat",
                "toptal",
                "freelancer",
                "peopleperhour",
                "guru",
                "99designs",
            ]),
        }
    }
}

/// 职位分类器
///
/// 每条记录恰好得到一个雇佣类型和一个地区
#[derive(Debug, Clone)]
pub struct Categorizer {
    remote: PatternSet,
    freelance: PatternSet,
    hybrid: PatternSet,
    fulltime: PatternSet,
    egypt: PatternSet,
    uae: PatternSet,
    europe: PatternSet,
    freelance_platforms: Vec<String>,
}

impl Categorizer {
    pub fn new(tables: CategoryTables) -> Result<Self, ProfileError> {
        Ok(Self {
            remote: PatternSet::compile("remote", &tables.remote, false)?,
            freelance: PatternSet::compile("freelance", &tables.freelance, false)?,
            hybrid: PatternSet::compile("hybrid", &tables.hybrid, false)?,
            fulltime: PatternSet::compile("fulltime", &tables.fulltime, false)?,
            egypt: PatternSet::compile("egypt", &tables.egypt, false)?,
            uae: PatternSet::compile("uae", &tables.uae, false)?,
            europe: PatternSet::compile("europe", &tables.europe, false)?,
            freelance_platforms: tables
                .freelance_platforms
                .into_iter()
                .map(|p| p.to_lowercase())
                .collect(),
        })
    }

    pub fn with_default_tables() -> Result<Self, ProfileError> {
        Self::new(CategoryTables::default())
    }

    /// 判断雇佣类型
    ///
    /// 来源是自由职业平台时直接判为自由职业，否则按
    /// 自由职业 → 混合 → 远程 → 全职 的顺序匹配，都不命中时默认全职
    pub fn classify_type(
        &self,
        title: &str,
        location: &str,
        job_type: &str,
        source: &str,
        company: &str,
    ) -> JobType {
        let source = source.to_lowercase();
        if self
            .freelance_platforms
            .iter()
            .any(|platform| source.contains(platform.as_str()))
        {
            return JobType::Freelance;
        }

        let text = [title, location, job_type, company]
            .into_iter()
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" ");

        if self.freelance.is_match(&text) {
            JobType::Freelance
        } else if self.hybrid.is_match(&text) {
            JobType::Hybrid
        } else if self.remote.is_match(&text) {
            JobType::Remote
        } else {
            if !self.fulltime.is_match(&text) {
                debug!(title, "No employment type signal, defaulting to fulltime");
            }
            JobType::FullTime
        }
    }

    /// 判断地区
    pub fn classify_region(&self, location: &str, region_hint: &str) -> Region {
        let text = format!("{} {}", location, region_hint);

        if self.egypt.is_match(&text) {
            return Region::Egypt;
        }
        if self.uae.is_match(&text) {
            return Region::Uae;
        }
        if self.europe.is_match(&text) {
            return Region::Europe;
        }

        let lowered = text.to_lowercase();
        if lowered.contains("remote") || lowered.contains("global") {
            Region::Global
        } else {
            Region::Unknown
        }
    }

    /// 为记录填写分类字段
    pub fn categorize(&self, mut record: JobRecord) -> JobRecord {
        let job_type = self.classify_type(
            &record.title,
            &record.location,
            &record.job_type,
            &record.source,
            &record.company,
        );
        let region = self.classify_region(&record.location, record.region.as_deref().unwrap_or(""));

        record.job_category = Some(job_type.as_str().to_string());
        record.job_category_icon = Some(job_type.icon().to_string());
        record.region_category = Some(region.as_str().to_string());
        record.region_icon = Some(region.icon().to_string());
        record.is_remote = Some(job_type.is_remote());
        record
    }
}

pub fn filter_by_category(records: &[JobRecord], category: JobType) -> Vec<JobRecord> {
    records
        .iter()
        .filter(|r| r.job_category.as_deref() == Some(category.as_str()))
        .cloned()
        .collect()
}

pub fn filter_by_region(records: &[JobRecord], region: Region) -> Vec<JobRecord> {
    records
        .iter()
        .filter(|r| r.region_category.as_deref() == Some(region.as_str()))
        .cloned()
        .collect()
}

pub fn filter_remote_only(records: &[JobRecord]) -> Vec<JobRecord> {
    records
        .iter()
        .filter(|r| r.is_remote.unwrap_or(false))
        .cloned()
        .collect()
}

/// 按类型和地区分组的结果
#[derive(Debug, Default)]
pub struct Buckets {
    pub by_type: BTreeMap<String, Vec<JobRecord>>,
    pub by_region: BTreeMap<String, Vec<JobRecord>>,
}

/// 将已分类的记录分桶
///
/// 类型桶为 remote/freelance/fulltime/hybrid，地区桶为 egypt/uae/europe/global，
/// 其余（包括未分类的记录）归入 `other`
pub fn bucket(records: &[JobRecord]) -> Buckets {
    const TYPE_BUCKETS: [&str; 4] = ["remote", "freelance", "fulltime", "hybrid"];
    const REGION_BUCKETS: [&str; 4] = ["egypt", "uae", "europe", "global"];

    let mut buckets = Buckets::default();
    for record in records {
        let type_key = match record.job_category.as_deref() {
            Some(c) if TYPE_BUCKETS.contains(&c) => c,
            _ => OTHER_BUCKET,
        };
        buckets
            .by_type
            .entry(type_key.to_string())
            .or_default()
            .push(record.clone());

        let region_key = match record.region_category.as_deref() {
            Some(r) if REGION_BUCKETS.contains(&r) => r,
            _ => OTHER_BUCKET,
        };
        buckets
            .by_region
            .entry(region_key.to_string())
            .or_default()
            .push(record.clone());
    }
    buckets
}
