// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// 职位记录
///
/// 站点提取逻辑产生的原始记录，以及评分器和分类器补充的字段。
/// 各来源特有的字段保存在 `extras` 中并原样透传
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct JobRecord {
    pub title: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub location: String,
    /// 雇佣类型原始文本
    #[serde(default, rename = "type")]
    pub job_type: String,
    /// 身份键
    #[serde(default)]
    pub link: String,
    /// 来源标签
    #[serde(default)]
    pub source: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub salary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_posted: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keyword_searched: Option<String>,
    /// 来源提供的地区提示
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,

    // Assigned by the scorer and categorizer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relevance_score: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_category_icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region_category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region_icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_remote: Option<bool>,

    /// 来源特有字段
    #[serde(flatten)]
    pub extras: BTreeMap<String, Value>,
}

impl JobRecord {
    pub fn new(title: impl Into<String>, link: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            link: link.into(),
            source: source.into(),
            ..Self::default()
        }
    }

    pub fn with_company(mut self, company: impl Into<String>) -> Self {
        self.company = company.into();
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    pub fn with_job_type(mut self, job_type: impl Into<String>) -> Self {
        self.job_type = job_type.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extras.insert(key.into(), value.into());
        self
    }

    pub fn description_text(&self) -> &str {
        self.description.as_deref().unwrap_or_default()
    }

    /// 所有固定的字符串字段（含已设置的可选字段）
    pub fn string_fields_mut(&mut self) -> Vec<&mut String> {
        let mut fields = vec![
            &mut self.title,
            &mut self.company,
            &mut self.location,
            &mut self.job_type,
            &mut self.link,
            &mut self.source,
        ];
        fields.extend(
            [
                &mut self.description,
                &mut self.budget,
                &mut self.salary,
                &mut self.date_posted,
                &mut self.keyword_searched,
                &mut self.region,
                &mut self.job_category,
                &mut self.job_category_icon,
                &mut self.region_category,
                &mut self.region_icon,
            ]
            .into_iter()
            .flatten(),
        );
        fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_with_extras() {
        let raw = r#"{
            "title": "3D Artist",
            "company": "Studio",
            "location": "Dubai, UAE",
            "type": "Contract",
            "link": "https://jobs.example.com/1",
            "source": "Career Page",
            "followers": 1200,
            "channel": "design_jobs"
        }"#;

        let record: JobRecord = serde_json::from_str(raw).unwrap();
        assert_eq!(record.job_type, "Contract");
        assert_eq!(record.extras.get("followers"), Some(&Value::from(1200)));
        assert_eq!(record.extras.get("channel"), Some(&Value::from("design_jobs")));

        let back = serde_json::to_value(&record).unwrap();
        assert_eq!(back["type"], "Contract");
        assert_eq!(back["channel"], "design_jobs");
        assert!(back.get("relevance_score").is_none());
    }

    #[test]
    fn test_missing_title_is_rejected() {
        assert!(serde_json::from_str::<JobRecord>(r#"{"link": "x"}"#).is_err());
    }

    #[test]
    fn test_string_fields_skip_unset_options() {
        let mut record = JobRecord::new("t", "l", "s").with_description("d");
        assert_eq!(record.string_fields_mut().len(), 7);
    }
}
