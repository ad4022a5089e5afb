// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use rand::seq::IndexedRandom;
use std::collections::HashMap;

const DEFAULT_USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/121.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36 Edg/120.0.0.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/121.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.2 Safari/605.1.15",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/121.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:122.0) Gecko/20100101 Firefox/122.0",
    "Mozilla/5.0 (X11; Ubuntu; Linux x86_64; rv:121.0) Gecko/20100101 Firefox/121.0",
];

/// 轮换器负责的全部请求头，换 User-Agent 时整组替换
pub const MANAGED_HEADERS: &[&str] = &[
    "User-Agent",
    "Accept",
    "Accept-Language",
    "DNT",
    "Upgrade-Insecure-Requests",
    "Sec-CH-UA",
    "Sec-CH-UA-Mobile",
    "Sec-CH-UA-Platform",
    "Sec-Fetch-Dest",
    "Sec-Fetch-Mode",
    "Sec-Fetch-Site",
];

/// 浏览器家族，用于生成与 User-Agent 一致的请求头
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrowserFamily {
    Chrome,
    Edge,
    Firefox,
    Safari,
}

impl BrowserFamily {
    pub fn from_user_agent(user_agent: &str) -> Self {
        if user_agent.contains("Edg/") {
            BrowserFamily::Edge
        } else if user_agent.contains("Firefox/") {
            BrowserFamily::Firefox
        } else if user_agent.contains("Chrome/") {
            BrowserFamily::Chrome
        } else {
            BrowserFamily::Safari
        }
    }
}

/// User-Agent 轮换器
#[derive(Debug, Clone)]
pub struct UserAgentRotator {
    user_agents: Vec<String>,
}

impl Default for UserAgentRotator {
    fn default() -> Self {
        Self::new(DEFAULT_USER_AGENTS.iter().map(|ua| ua.to_string()).collect())
    }
}

impl UserAgentRotator {
    /// 使用自定义列表创建轮换器，空列表回退到内置列表
    pub fn new(user_agents: Vec<String>) -> Self {
        if user_agents.is_empty() {
            return Self::default();
        }
        Self { user_agents }
    }

    /// 随机 User-Agent
    pub fn random_user_agent(&self) -> &str {
        self.user_agents
            .choose(&mut rand::rng())
            .map(String::as_str)
            .unwrap_or(DEFAULT_USER_AGENTS[0])
    }

    /// 生成一套完整的反检测请求头（随机 User-Agent 及其匹配的头部）
    pub fn full_headers(&self) -> HashMap<String, String> {
        let user_agent = self.random_user_agent().to_string();
        let mut headers = matching_headers(&user_agent);
        headers.insert("User-Agent".to_string(), user_agent);
        headers
    }

    /// 用一套新的请求头替换请求上已有的轮换头部
    ///
    /// 旧 User-Agent 留下的客户端提示（如 `Sec-CH-UA`）会先被移除，
    /// 其它调用方设置的头部保持不变
    pub fn apply_to(&self, headers: &mut HashMap<String, String>) {
        headers.retain(|name, _| {
            !MANAGED_HEADERS
                .iter()
                .any(|managed| managed.eq_ignore_ascii_case(name))
        });
        headers.extend(self.full_headers());
    }
}

/// 与 User-Agent 浏览器家族一致的请求头
pub fn matching_headers(user_agent: &str) -> HashMap<String, String> {
    let mut headers = HashMap::new();
    headers.insert(
        "Accept".to_string(),
        "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8"
            .to_string(),
    );
    headers.insert(
        "Accept-Language".to_string(),
        "en-US,en;q=0.9,ar;q=0.8".to_string(),
    );
    headers.insert("DNT".to_string(), "1".to_string());
    headers.insert("Upgrade-Insecure-Requests".to_string(), "1".to_string());

    let (brand, platform) = match BrowserFamily::from_user_agent(user_agent) {
        BrowserFamily::Chrome => (Some(r#""Chromium";v="121", "Google Chrome";v="121""#), true),
        BrowserFamily::Edge => (Some(r#""Chromium";v="120", "Microsoft Edge";v="120""#), true),
        BrowserFamily::Firefox | BrowserFamily::Safari => (None, false),
    };

    if let Some(brand) = brand {
        headers.insert("Sec-CH-UA".to_string(), brand.to_string());
        headers.insert("Sec-CH-UA-Mobile".to_string(), "?0".to_string());
    }
    if platform {
        let os = if user_agent.contains("Windows") {
            "\"Windows\""
        } else if user_agent.contains("Mac OS X") {
            "\"macOS\""
        } else {
            "\"Linux\""
        };
        headers.insert("Sec-CH-UA-Platform".to_string(), os.to_string());
        headers.insert("Sec-Fetch-Dest".to_string(), "document".to_string());
        headers.insert("Sec-Fetch-Mode".to_string(), "navigate".to_string());
        headers.insert("Sec-Fetch-Site".to_string(), "none".to_string());
    }
    headers
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_headers_contains_user_agent_from_pool() {
        let rotator = UserAgentRotator::default();
        let headers = rotator.full_headers();
        let ua = headers.get("User-Agent").unwrap();
        assert!(DEFAULT_USER_AGENTS.contains(&ua.as_str()));
        assert!(headers.contains_key("Accept-Language"));
    }

    #[test]
    fn test_firefox_gets_no_client_hints() {
        let headers = matching_headers(DEFAULT_USER_AGENTS[5]);
        assert!(!headers.contains_key("Sec-CH-UA"));

        let chrome = matching_headers(DEFAULT_USER_AGENTS[0]);
        assert_eq!(chrome.get("Sec-CH-UA-Platform").unwrap(), "\"Windows\"");
    }

    #[test]
    fn test_apply_to_drops_stale_client_hints() {
        let chrome = UserAgentRotator::new(vec![DEFAULT_USER_AGENTS[0].to_string()]);
        let firefox = UserAgentRotator::new(vec![DEFAULT_USER_AGENTS[5].to_string()]);

        let mut headers = HashMap::new();
        headers.insert("Referer".to_string(), "https://jobs.example.com".to_string());
        headers.insert("sec-ch-ua".to_string(), "\"Old\";v=\"1\"".to_string());

        chrome.apply_to(&mut headers);
        assert!(headers.contains_key("Sec-CH-UA"));
        assert!(!headers.contains_key("sec-ch-ua"));

        firefox.apply_to(&mut headers);
        assert_eq!(headers.get("User-Agent").unwrap(), DEFAULT_USER_AGENTS[5]);
        for name in ["Sec-CH-UA", "Sec-CH-UA-Mobile", "Sec-CH-UA-Platform", "Sec-Fetch-Mode"] {
            assert!(!headers.contains_key(name), "{} left behind", name);
        }
        assert_eq!(headers.get("Referer").unwrap(), "https://jobs.example.com");
    }

    #[test]
    fn test_empty_custom_list_falls_back() {
        let rotator = UserAgentRotator::new(Vec::new());
        assert!(!rotator.random_user_agent().is_empty());
    }

    #[test]
    fn test_browser_family_detection() {
        assert_eq!(
            BrowserFamily::from_user_agent(DEFAULT_USER_AGENTS[1]),
            BrowserFamily::Edge
        );
        assert_eq!(
            BrowserFamily::from_user_agent(DEFAULT_USER_AGENTS[3]),
            BrowserFamily::Safari
        );
    }
}
