// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use regex::{Regex, RegexBuilder};
use std::collections::HashSet;
use thiserror::Error;

use crate::domain::models::job_record::JobRecord;
use crate::domain::services::profile::ScoringProfile;

/// 最高分
pub const MAX_SCORE: u8 = 100;

const TITLE_PATTERN_BONUS: u32 = 35;
const TITLE_KEYWORD_POINTS: u32 = 8;
const TITLE_KEYWORD_CAP: u32 = 24;
const DESCRIPTION_KEYWORD_POINTS: u32 = 2;
const DESCRIPTION_KEYWORD_CAP: u32 = 10;
const SECONDARY_LANGUAGE_BONUS: u32 = 5;
const TOOL_POINTS: u32 = 5;
const TOOL_CAP: u32 = 15;
const MIN_SOCIAL_TEXT_CHARS: usize = 15;

/// 模式表错误
#[derive(Error, Debug)]
pub enum ProfileError {
    #[error("invalid {table} pattern: {source}")]
    InvalidPattern {
        table: &'static str,
        #[source]
        source: regex::Error,
    },
}

/// 编译后的一组忽略大小写的备选模式；空表永不匹配
#[derive(Debug, Clone)]
pub(crate) struct PatternSet {
    regex: Option<Regex>,
}

impl PatternSet {
    pub(crate) fn compile(
        table: &'static str,
        patterns: &[String],
        word_bounded: bool,
    ) -> Result<Self, ProfileError> {
        if patterns.is_empty() {
            return Ok(Self { regex: None });
        }

        let body = patterns.join("|");
        let source = if word_bounded {
            format!(r"\b(?:{})\b", body)
        } else {
            format!("(?:{})", body)
        };
        let regex = RegexBuilder::new(&source)
            .case_insensitive(true)
            .build()
            .map_err(|source| ProfileError::InvalidPattern { table, source })?;
        Ok(Self { regex: Some(regex) })
    }

    pub(crate) fn is_match(&self, text: &str) -> bool {
        self.regex.as_ref().is_some_and(|re| re.is_match(text))
    }

    /// 不同匹配项的数量（忽略大小写）
    pub(crate) fn distinct_matches(&self, text: &str) -> usize {
        let Some(re) = &self.regex else {
            return 0;
        };
        re.find_iter(text)
            .map(|m| m.as_str().to_lowercase())
            .collect::<HashSet<_>>()
            .len()
    }
}

/// 各评分项的明细
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScoreBreakdown {
    pub vetoed: bool,
    pub title_pattern: u32,
    pub title_keywords: u32,
    pub description_keywords: u32,
    pub secondary_language: u32,
    pub tools: u32,
    pub location: u32,
}

impl ScoreBreakdown {
    /// 总分，限制在 [0,100]；被否决时恒为0
    pub fn total(&self) -> u8 {
        if self.vetoed {
            return 0;
        }
        let sum = self.title_pattern
            + self.title_keywords
            + self.description_keywords
            + self.secondary_language
            + self.tools
            + self.location;
        sum.min(MAX_SCORE as u32) as u8
    }
}

/// 相关性评分器
///
/// 根据固定的候选人画像为职位打 0-100 分。标题命中否决模式时直接得 0 分
#[derive(Debug, Clone)]
pub struct RelevanceScorer {
    title: PatternSet,
    broad: PatternSet,
    secondary: PatternSet,
    negative: PatternSet,
    tools: PatternSet,
    narrow: PatternSet,
    hiring: PatternSet,
    freelance_broad: PatternSet,
    location_scores: Vec<(String, u8)>,
}

impl RelevanceScorer {
    /// 编译模式表
    pub fn new(profile: ScoringProfile) -> Result<Self, ProfileError> {
        let freelance_keywords: Vec<String> = profile
            .broad_keywords
            .iter()
            .chain(&profile.freelance_extra_keywords)
            .cloned()
            .collect();

        Ok(Self {
            title: PatternSet::compile("title", &profile.title_patterns, false)?,
            broad: PatternSet::compile("broad keyword", &profile.broad_keywords, true)?,
            secondary: PatternSet::compile(
                "secondary language",
                &profile.secondary_keywords,
                false,
            )?,
            negative: PatternSet::compile("negative", &profile.negative_patterns, false)?,
            tools: PatternSet::compile("tool", &profile.tool_keywords, true)?,
            narrow: PatternSet::compile("narrow keyword", &profile.narrow_keywords, true)?,
            hiring: PatternSet::compile("hiring indicator", &profile.hiring_indicators, true)?,
            freelance_broad: PatternSet::compile("freelance keyword", &freelance_keywords, true)?,
            location_scores: profile
                .location_scores
                .into_iter()
                .map(|(keyword, bonus)| (keyword.to_lowercase(), bonus))
                .collect(),
        })
    }

    /// 使用内置画像创建评分器
    pub fn with_default_profile() -> Result<Self, ProfileError> {
        Self::new(ScoringProfile::default())
    }

    /// 标题是否命中否决模式
    pub fn is_vetoed(&self, title: &str) -> bool {
        self.negative.is_match(title)
    }

    /// 计算评分明细
    pub fn breakdown(
        &self,
        title: &str,
        description: &str,
        location: &str,
        job_type: &str,
    ) -> ScoreBreakdown {
        if self.is_vetoed(title) {
            return ScoreBreakdown {
                vetoed: true,
                ..ScoreBreakdown::default()
            };
        }

        let text = format!("{} {}", title, description);
        let title_pattern = if self.title.is_match(title) {
            TITLE_PATTERN_BONUS
        } else {
            0
        };
        let title_keywords =
            (self.broad.distinct_matches(title) as u32 * TITLE_KEYWORD_POINTS).min(TITLE_KEYWORD_CAP);
        let description_keywords = (self.broad.distinct_matches(description) as u32
            * DESCRIPTION_KEYWORD_POINTS)
            .min(DESCRIPTION_KEYWORD_CAP);
        let secondary_language = if self.secondary.is_match(&text) {
            SECONDARY_LANGUAGE_BONUS
        } else {
            0
        };
        let tools = (self.tools.distinct_matches(&text) as u32 * TOOL_POINTS).min(TOOL_CAP);

        ScoreBreakdown {
            vetoed: false,
            title_pattern,
            title_keywords,
            description_keywords,
            secondary_language,
            tools,
            location: self.location_bonus(location, job_type),
        }
    }

    /// 计算相关性分数 (0-100)
    ///
    /// 0 = 不相关（否决），1-29 弱匹配，30-59 良好，60-100 优秀
    pub fn score(&self, title: &str, description: &str, location: &str, job_type: &str) -> u8 {
        self.breakdown(title, description, location, job_type)
            .total()
    }

    /// 为记录打分
    pub fn score_record(&self, record: &JobRecord) -> u8 {
        self.score(
            &record.title,
            record.description_text(),
            &record.location,
            &record.job_type,
        )
    }

    /// 地点加分：所有命中地点关键词中的最大单项加分
    fn location_bonus(&self, location: &str, job_type: &str) -> u32 {
        let location_text = format!("{} {}", location, job_type).to_lowercase();
        self.location_scores
            .iter()
            .filter(|(keyword, _)| location_text.contains(keyword.as_str()))
            .map(|(_, bonus)| *bonus as u32)
            .max()
            .unwrap_or(0)
    }

    /// 快速判断职位是否与画像相关
    pub fn is_relevant(&self, title: &str, description: &str) -> bool {
        if self.is_vetoed(title) {
            return false;
        }
        if self.broad.is_match(title) || self.broad.is_match(description) {
            return true;
        }
        self.secondary
            .is_match(&format!("{} {}", title, description))
    }

    /// 自由职业平台的相关性判断，关键词范围更宽
    pub fn is_relevant_freelance(&self, title: &str, description: &str) -> bool {
        if self.is_vetoed(title) {
            return false;
        }
        if self.freelance_broad.is_match(title) || self.freelance_broad.is_match(description) {
            return true;
        }
        self.secondary
            .is_match(&format!("{} {}", title, description))
    }

    /// 社交媒体帖子的相关性判断
    ///
    /// 需要命中窄关键词，或者宽泛关键词加招聘指示词，
    /// 用来过滤只是提到宽泛关键词的推广内容
    pub fn is_relevant_social(&self, text: &str) -> bool {
        if text.chars().count() < MIN_SOCIAL_TEXT_CHARS {
            return false;
        }
        if self.secondary.is_match(text) || self.narrow.is_match(text) {
            return true;
        }
        self.broad.is_match(text) && self.hiring.is_match(text)
    }
}
