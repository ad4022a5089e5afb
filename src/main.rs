// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use jobsieve::config::settings::Settings;
use jobsieve::domain::services::categorizer::{bucket, Categorizer};
use jobsieve::domain::services::relevance_scorer::RelevanceScorer;
use jobsieve::engines::captcha_detector::{CaptchaDetector, CaptchaSolverConfig};
use jobsieve::engines::proxy_pool::{ProxyPool, ProxyPoolConfig};
use jobsieve::engines::reqwest_engine::ReqwestEngine;
use jobsieve::engines::resilience::{FetchOutcome, FetchResilienceLayer, ResilienceConfig, Shutdown};
use jobsieve::pipeline::ItemPipeline;
use jobsieve::records;
use jobsieve::utils::retry_policy::RetryPolicy;
use jobsieve::utils::telemetry;
use std::sync::Arc;
use tracing::{info, warn};

/// 主函数
///
/// 抓取配置的入口URL，然后让原始记录通过处理管道，
/// 保留的记录以每行一个JSON对象的形式输出到标准输出
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Load configuration
    let settings = Settings::new()?;

    // 2. Initialize logging
    telemetry::init_telemetry(settings.log.format);
    info!("Starting jobsieve...");

    if let Some(addr) = settings.metrics.socket_addr()? {
        jobsieve::infrastructure::metrics::init_metrics(addr);
    }

    // 3. Build services
    let proxy_pool = Arc::new(ProxyPool::new(ProxyPoolConfig::from(&settings.proxy)));
    if let Some(path) = &settings.proxy.list_source {
        if let Err(e) = proxy_pool.load_from_file(path) {
            warn!("{}; continuing without proxies", e);
        }
    }

    let captcha_detector = Arc::new(CaptchaDetector::new(CaptchaSolverConfig::from(
        &settings.captcha,
    )));
    let layer = FetchResilienceLayer::new(
        proxy_pool,
        captcha_detector,
        RetryPolicy::from(&settings.retry),
        ResilienceConfig::from(&settings.fetch),
    );

    let scorer = Arc::new(RelevanceScorer::with_default_profile()?);
    let categorizer = Arc::new(Categorizer::with_default_tables()?);
    let pipeline = ItemPipeline::standard(scorer, categorizer);
    info!("Services initialized");

    // 4. Wire shutdown to Ctrl-C
    let (trigger, shutdown) = Shutdown::channel();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Ctrl-C received, shutting down");
            trigger.trigger();
        }
    });

    // 5. Fetch seed urls
    if !settings.run.seed_urls.is_empty() {
        let outcomes = layer
            .fetch_all(
                &ReqwestEngine,
                settings.run.seed_urls.clone(),
                settings.fetch.concurrency,
                shutdown,
            )
            .await;

        for (url, outcome) in &outcomes {
            match outcome {
                FetchOutcome::Success(response) => info!(
                    "Fetched {} ({} bytes in {}ms)",
                    url,
                    response.body.len(),
                    response.response_time_ms
                ),
                FetchOutcome::Blocked { verdict, .. } => {
                    warn!("Blocked by {} captcha: {}", verdict.kind, url)
                }
                FetchOutcome::Failed { reason, .. } => warn!("Failed to fetch {}: {}", url, reason),
                FetchOutcome::Abandoned { reason } => warn!("Abandoned {}: {}", url, reason),
            }
        }
        let succeeded = outcomes.iter().filter(|(_, o)| o.is_success()).count();
        info!("Fetched {}/{} seed urls", succeeded, outcomes.len());
    }

    // 6. Process extracted records
    if let Some(path) = &settings.run.input_path {
        let raw = records::load_records_or_empty(path);
        let (kept, stats) = pipeline.process_batch(raw);

        let buckets = bucket(&kept);
        for (category, items) in &buckets.by_type {
            info!("Category {}: {} jobs", category, items.len());
        }
        for (region, items) in &buckets.by_region {
            info!("Region {}: {} jobs", region, items.len());
        }
        info!("{} of {} records kept", stats.kept, stats.seen);

        for record in &kept {
            println!("{}", serde_json::to_string(record)?);
        }
    }

    info!("jobsieve finished");
    Ok(())
}
