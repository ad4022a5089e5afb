// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use jobsieve::domain::services::categorizer::{
    bucket, filter_by_region, filter_remote_only, Categorizer, Region, OTHER_BUCKET,
};
use jobsieve::domain::services::relevance_scorer::RelevanceScorer;
use jobsieve::pipeline::{DropReason, ItemPipeline};
use jobsieve::records::{load_records, parse_records};
use std::sync::Arc;

const RAW_RECORDS: &str = r#"[
  {"title": " Senior Product Designer ", "company": "Remote-First Startup",
   "location": "Remote - Anywhere", "type": "Full Time",
   "link": "https://jobs.example.com/1", "source": "LinkedIn"},
  {"title": "3D Artist - Contract", "company": "Game Studio", "location": "Dubai, UAE",
   "type": "Contract", "link": "https://jobs.example.com/2", "source": "Career Page",
   "salary": "AED 15k"}
][
  {"title": "Senior Product Designer", "location": "Remote - Anywhere",
   "link": "https://jobs.example.com/1", "source": "LinkedIn"},
  {"title": "Waiter needed urgently", "location": "Cairo, Egypt",
   "link": "https://jobs.example.com/3", "source": "Wuzzuf"},
  {"company": "missing title"},
  {"title": "مطلوب مصمم جرافيك في القاهرة", "location": "القاهرة", "link": "",
   "source": "Telegram", "channel": "design_jobs_eg", "views": 1200},
  {"title": "Motion Graphics Project", "location": "Remote", "type": "Freelance",
   "link": "https://upwork.com/jobs/9", "source": "Upwork", "budget": "$500"}
]"#;

fn pipeline() -> ItemPipeline {
    ItemPipeline::standard(
        Arc::new(RelevanceScorer::with_default_profile().unwrap()),
        Arc::new(Categorizer::with_default_tables().unwrap()),
    )
}

#[test]
fn test_end_to_end_batch() {
    let raw = parse_records(RAW_RECORDS).unwrap();
    assert_eq!(raw.len(), 6);

    let (kept, stats) = pipeline().process_batch(raw);
    assert_eq!(stats.seen, 6);
    assert_eq!(stats.kept, 4);
    assert_eq!(stats.dropped(DropReason::Duplicate), 1);
    assert_eq!(stats.dropped(DropReason::Vetoed), 1);

    for record in &kept {
        let score = record.relevance_score.unwrap();
        assert!((1..=100).contains(&score));
        assert!(record.job_category.is_some());
        assert!(record.region_category.is_some());
        assert!(record.is_remote.is_some());
    }

    let designer = &kept[0];
    assert_eq!(designer.title, "Senior Product Designer");
    assert_eq!(designer.job_category.as_deref(), Some("remote"));

    let artist = kept.iter().find(|r| r.link.ends_with("/2")).unwrap();
    assert_eq!(artist.job_category.as_deref(), Some("freelance"));
    assert_eq!(artist.region_category.as_deref(), Some("uae"));
    assert_eq!(artist.salary.as_deref(), Some("AED 15k"));

    let post = kept.iter().find(|r| r.source == "Telegram").unwrap();
    assert_eq!(post.extras["channel"], "design_jobs_eg");
    assert_eq!(post.extras["views"], 1200);

    let gig = kept.iter().find(|r| r.source == "Upwork").unwrap();
    assert_eq!(gig.job_category.as_deref(), Some("freelance"));
    assert_eq!(gig.is_remote, Some(true));

    assert_eq!(filter_remote_only(&kept).len(), 3);
    assert_eq!(filter_by_region(&kept, Region::Uae).len(), 1);

    let buckets = bucket(&kept);
    assert_eq!(buckets.by_type["freelance"].len(), 2);
    assert_eq!(buckets.by_region["global"].len(), 2);
    // arabic-only locations match no region table and land in the other bucket
    assert!(!buckets.by_region.contains_key("unknown"));
    assert_eq!(buckets.by_region[OTHER_BUCKET].len(), 1);
}

#[test]
fn test_output_shape_round_trips_extras() {
    let raw = parse_records(RAW_RECORDS).unwrap();
    let (kept, _) = pipeline().process_batch(raw);

    let post = kept.iter().find(|r| r.source == "Telegram").unwrap();
    let json = serde_json::to_value(post).unwrap();
    assert_eq!(json["channel"], "design_jobs_eg");
    assert_eq!(json["job_category"], "fulltime");
    assert_eq!(json["region_icon"], "📍");
    assert!(json["relevance_score"].as_u64().unwrap() > 0);
}

#[test]
fn test_load_records_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("by_source.json");
    std::fs::write(&path, RAW_RECORDS).unwrap();

    let records = load_records(&path).unwrap();
    assert_eq!(records.len(), 6);
}
