// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use tracing::{info, warn};

/// 启动 Prometheus 指标导出器
///
/// 安装失败（例如端口已被占用）只记录警告，不影响运行
pub fn init_metrics(addr: SocketAddr) -> bool {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => {
            info!("Metrics exporter listening on {}", addr);
            true
        }
        Err(e) => {
            warn!(
                "Failed to install Prometheus recorder: {}. This might happen if the port is already in use.",
                e
            );
            false
        }
    }
}
