// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use metrics::counter;
use regex::Regex;
use std::fmt;
use tracing::{info, warn};

/// 验证码类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CaptchaKind {
    RecaptchaV2,
    RecaptchaV3,
    HCaptcha,
    CloudflareChallenge,
    GenericImage,
    Unknown,
}

impl CaptchaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CaptchaKind::RecaptchaV2 => "recaptcha_v2",
            CaptchaKind::RecaptchaV3 => "recaptcha_v3",
            CaptchaKind::HCaptcha => "hcaptcha",
            CaptchaKind::CloudflareChallenge => "cloudflare",
            CaptchaKind::GenericImage => "image",
            CaptchaKind::Unknown => "unknown",
        }
    }
}

impl fmt::Display for CaptchaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 验证码检测结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptchaVerdict {
    /// 是否检测到验证码
    pub detected: bool,
    /// 验证码类型
    pub kind: CaptchaKind,
    /// reCAPTCHA sitekey（如果能提取）
    pub site_key: Option<String>,
}

impl CaptchaVerdict {
    /// 未检测到验证码
    pub fn clear() -> Self {
        Self {
            detected: false,
            kind: CaptchaKind::Unknown,
            site_key: None,
        }
    }

    fn found(kind: CaptchaKind) -> Self {
        Self {
            detected: true,
            kind,
            site_key: None,
        }
    }
}

/// 验证码求解服务配置
///
/// 只用于切换"已启用求解"标志，本身不实现任何求解
#[derive(Debug, Clone, Default)]
pub struct CaptchaSolverConfig {
    pub service_name: Option<String>,
    pub api_key: Option<String>,
}

/// 验证码检测器
///
/// 按固定顺序检查响应内容中的特征，第一个匹配的结果生效。
/// 具体的特征必须排在宽泛的启发式规则之前
pub struct CaptchaDetector {
    sitekey_patterns: Vec<Regex>,
    solver: CaptchaSolverConfig,
}

impl Default for CaptchaDetector {
    fn default() -> Self {
        Self::new(CaptchaSolverConfig::default())
    }
}

impl CaptchaDetector {
    pub fn new(solver: CaptchaSolverConfig) -> Self {
        let sitekey_patterns = [
            r#"data-sitekey=["']([^"']+)["']"#,
            r#"grecaptcha\.render\([^,]+,\s*\{[^}]*sitekey["']?\s*:\s*["']([^"']+)["']"#,
        ]
        .iter()
        .filter_map(|p| Regex::new(p).ok())
        .collect();

        if let (Some(service), Some(_)) = (&solver.service_name, &solver.api_key) {
            info!("Captcha solving configured with {}", service);
        }

        Self {
            sitekey_patterns,
            solver,
        }
    }

    /// 是否配置了求解服务
    pub fn solving_enabled(&self) -> bool {
        self.solver
            .api_key
            .as_deref()
            .is_some_and(|key| !key.is_empty())
            && self.solver.service_name.is_some()
    }

    /// 对响应内容进行分类
    pub fn classify(&self, body: &str) -> CaptchaVerdict {
        let verdict = self.scan(body);
        if verdict.detected {
            counter!("captcha_detected_total", "kind" => verdict.kind.as_str()).increment(1);
        }
        verdict
    }

    fn scan(&self, body: &str) -> CaptchaVerdict {
        if body.contains("g-recaptcha") || body.contains("grecaptcha") {
            let site_key = self.extract_sitekey(body);
            if let Some(key) = &site_key {
                info!("Detected reCAPTCHA v2, sitekey: {}", key);
            }
            return CaptchaVerdict {
                site_key,
                ..CaptchaVerdict::found(CaptchaKind::RecaptchaV2)
            };
        }

        if body.contains("recaptcha/api.js?render=") {
            return CaptchaVerdict::found(CaptchaKind::RecaptchaV3);
        }

        if body.contains("hcaptcha") || body.contains("h-captcha") {
            return CaptchaVerdict::found(CaptchaKind::HCaptcha);
        }

        if body.contains("cf-browser-verification") || body.contains("Checking your browser") {
            return CaptchaVerdict::found(CaptchaKind::CloudflareChallenge);
        }

        if body.to_lowercase().contains("captcha")
            && (body.contains("<img") || body.contains("data:image"))
        {
            return CaptchaVerdict::found(CaptchaKind::GenericImage);
        }

        CaptchaVerdict::clear()
    }

    fn extract_sitekey(&self, html: &str) -> Option<String> {
        self.sitekey_patterns
            .iter()
            .find_map(|re| re.captures(html))
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
    }

    /// 尝试求解验证码
    ///
    /// 只做检测：总是返回 `None`，并根据配置记录警告
    pub fn solve(&self, verdict: &CaptchaVerdict, url: &str) -> Option<String> {
        if !verdict.detected {
            return None;
        }
        if self.solving_enabled() {
            warn!(
                "Captcha solving is enabled but no solver backend exists; skipping {} on {}",
                verdict.kind, url
            );
        } else {
            warn!(
                "Captcha solving not configured ({} on {}). Set captcha.service_name and captcha.api_key.",
                verdict.kind, url
            );
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recaptcha_v2_with_sitekey() {
        let detector = CaptchaDetector::default();
        let body = r#"<div class="g-recaptcha" data-sitekey="6LcABC"></div>"#;
        let verdict = detector.classify(body);
        assert!(verdict.detected);
        assert_eq!(verdict.kind, CaptchaKind::RecaptchaV2);
        assert_eq!(verdict.site_key.as_deref(), Some("6LcABC"));
    }

    #[test]
    fn test_recaptcha_v2_without_sitekey() {
        let detector = CaptchaDetector::default();
        let verdict = detector.classify("<script>grecaptcha.ready()</script>");
        assert_eq!(verdict.kind, CaptchaKind::RecaptchaV2);
        assert!(verdict.site_key.is_none());
    }

    #[test]
    fn test_recaptcha_render_sitekey() {
        let detector = CaptchaDetector::default();
        let body = r#"grecaptcha.render('box', { 'sitekey': 'KEY-123' })"#;
        assert_eq!(
            detector.classify(body).site_key.as_deref(),
            Some("KEY-123")
        );
    }

    #[test]
    fn test_signature_order() {
        let detector = CaptchaDetector::default();

        let v3 = r#"<script src="https://www.google.com/recaptcha/api.js?render=abc"></script>"#;
        assert_eq!(detector.classify(v3).kind, CaptchaKind::RecaptchaV3);

        // hCaptcha markup also carries an image and the word captcha
        let h = r#"<div class="h-captcha"><img src="x.png"></div>"#;
        assert_eq!(detector.classify(h).kind, CaptchaKind::HCaptcha);

        let cf = "<title>Just a moment...</title>Checking your browser before accessing";
        assert_eq!(detector.classify(cf).kind, CaptchaKind::CloudflareChallenge);

        let generic = r#"<p>Enter the CAPTCHA below</p><img src="/captcha.png">"#;
        assert_eq!(detector.classify(generic).kind, CaptchaKind::GenericImage);
    }

    #[test]
    fn test_clean_page() {
        let detector = CaptchaDetector::default();
        let verdict = detector.classify("<html><body>Senior Product Designer</body></html>");
        assert_eq!(verdict, CaptchaVerdict::clear());

        // the word alone without an image is not enough
        assert!(!detector.classify("no captcha here").detected);
    }

    #[test]
    fn test_solve_is_noop() {
        let detector = CaptchaDetector::new(CaptchaSolverConfig {
            service_name: Some("2captcha".into()),
            api_key: Some("key".into()),
        });
        assert!(detector.solving_enabled());
        let verdict = detector.classify(r#"<div class="h-captcha"></div>"#);
        assert!(detector.solve(&verdict, "https://example.com").is_none());

        assert!(!CaptchaDetector::default().solving_enabled());
    }
}
