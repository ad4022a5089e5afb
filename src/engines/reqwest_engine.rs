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

use crate::engines::traits::{EngineError, FetchEngine, FetchRequest, FetchResponse};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use std::collections::HashMap;
use std::time::Instant;

/// 抓取引擎
///
/// 基于reqwest实现的基本HTTP抓取引擎
pub struct ReqwestEngine;

#[async_trait]
impl FetchEngine for ReqwestEngine {
    /// 执行HTTP抓取
    ///
    /// # 参数
    ///
    /// * `request` - 已经过韧性层处理的请求
    ///
    /// # 返回值
    ///
    /// * `Ok(FetchResponse)` - 任意状态码的响应
    /// * `Err(EngineError)` - 网络层错误
    async fn fetch(&self, request: &FetchRequest) -> Result<FetchResponse, EngineError> {
        url::Url::parse(&request.url)
            .map_err(|e| EngineError::Other(format!("Invalid url {}: {}", request.url, e)))?;

        // Build headers
        let mut headers = HeaderMap::new();
        for (k, v) in &request.headers {
            if let (Ok(k), Ok(v)) = (
                HeaderName::from_bytes(k.as_bytes()),
                HeaderValue::from_str(v),
            ) {
                headers.insert(k, v);
            }
        }

        // Each request gets a fresh client for cookie and proxy isolation
        let mut builder = reqwest::Client::builder()
            .timeout(request.timeout)
            .cookie_store(true);

        if let Some(proxy_url) = request.proxy_url() {
            let proxy = reqwest::Proxy::all(proxy_url)
                .map_err(|e| EngineError::InvalidProxy(e.to_string()))?;
            builder = builder.proxy(proxy);
        } else {
            builder = builder.no_proxy();
        }

        let client = builder.build()?;

        let start = Instant::now();
        let response = client
            .get(&request.url)
            .headers(headers)
            .send()
            .await
            .map_err(map_send_error)?;

        let status_code = response.status().as_u16();
        let mut response_headers = HashMap::new();
        for (k, v) in response.headers() {
            if let Ok(v_str) = v.to_str() {
                response_headers.insert(k.as_str().to_string(), v_str.to_string());
            }
        }

        let body = response.text().await?;

        Ok(FetchResponse {
            status_code,
            body,
            headers: response_headers,
            response_time_ms: start.elapsed().as_millis() as u64,
        })
    }

    fn name(&self) -> &'static str {
        "reqwest"
    }
}

fn map_send_error(error: reqwest::Error) -> EngineError {
    if error.is_timeout() {
        EngineError::Timeout
    } else if error.is_connect() {
        EngineError::Connection(error.to_string())
    } else {
        EngineError::RequestFailed(error)
    }
}

#[cfg(test)]
#[path = "reqwest_engine_test.rs"]
mod tests;
