// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

//! Candidate profile pattern tables used by the relevance scorer.

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// 评分用的模式表
///
/// 纯数据；由 [`RelevanceScorer`](super::relevance_scorer::RelevanceScorer) 在构造时编译一次
#[derive(Debug, Clone)]
pub struct ScoringProfile {
    /// 高精度职位名模式（+35）
    pub title_patterns: Vec<String>,
    /// 宽泛关键词（按单词边界匹配）
    pub broad_keywords: Vec<String>,
    /// 第二语言关键词（阿拉伯语，不要求单词边界）
    pub secondary_keywords: Vec<String>,
    /// 否决模式，只检查标题
    pub negative_patterns: Vec<String>,
    /// 工具/技能关键词
    pub tool_keywords: Vec<String>,
    /// 地点关键词及其加分（取最大值，不累加）
    pub location_scores: Vec<(String, u8)>,
    /// 社交媒体上无需招聘指示词即可判定相关的窄关键词
    pub narrow_keywords: Vec<String>,
    /// 招聘指示词
    pub hiring_indicators: Vec<String>,
    /// 自由职业平台额外的宽泛关键词
    pub freelance_extra_keywords: Vec<String>,
}

impl Default for ScoringProfile {
    fn default() -> Self {
        Self {
            title_patterns: owned(&[
                r"(?:Senior\s+)?Product\s+Designer",
                r"(?:Senior\s+)?3D\s+Artist",
                r"(?:Senior\s+)?CGI\s+Artist",
                r"(?:Senior\s+)?UI/?UX\s+Designer",
                r"(?:Senior\s+)?Motion\s+(?:Graphics?\s+)?Designer",
                r"(?:Senior\s+)?Art\s+Director",
                r"(?:Senior\s+)?Creative\s+Director",
                r"(?:Senior\s+)?Visual\s+Designer",
                r"(?:Senior\s+)?Digital\s+(?:Product\s+)?Designer",
                r"(?:Senior\s+)?Graphic\s+Designer",
                r"Generative\s+AI\s+Designer",
                r"VFX\s+Artist",
                r"3D\s+Visualizer",
                r"Blender\s+Artist",
                r"Unreal\s+(?:Engine\s+)?(?:Artist|Developer|Designer)",
                r"مصمم\s+منتجات",
                r"مصمم\s+جرافيك",
                r"مصمم\s+ثلاثي",
                r"فنان\s+CGI",
                r"مدير\s+فني",
                r"مدير\s+ابداعي",
            ]),
            broad_keywords: owned(&[
                "Designer",
                "Artist",
                "Art Director",
                "Creative Director",
                "3D",
                "CGI",
                "VFX",
                "Visualizer",
                "Product",
                "UI",
                "UX",
                "Motion",
                "Animation",
                "Unreal",
                "Blender",
                "Figma",
                "Generative",
                "AI",
                "Graphic",
                "Creative",
                "Frontend",
                "Web",
                "Digital",
                "DOOH",
                "Anamorphic",
            ]),
            secondary_keywords: owned(&[
                "مصمم",
                "ديزاينر",
                "فنان",
                "مدير فني",
                "مدير ابداعي",
                "ثلاثي",
                "ثري دي",
                "جرافيك",
                "موشن",
                "تصميم",
                "واجهة",
                "رندر",
                "بلندر",
                "انريل",
                "فيجما",
                "مونتاج",
                "انيميشن",
                "VFX",
                "CGI",
            ]),
            negative_patterns: owned(&[
                r"\bWaiter\b",
                r"\bWaitress\b",
                r"\bChef\b",
                r"\bCook\b",
                r"\bDriver\b",
                r"\bCleaner\b",
                r"\bSecurity\s+Guard\b",
                r"\bAccountant\b",
                r"\bNurse\b",
                r"\bDoctor\b",
                r"\bPharmacist\b",
                r"\bTeacher\b",
                r"\bProfessor\b",
                r"\bLecturer\b",
                r"\bMechanic\b",
                r"\bElectrician\b",
                r"\bPlumber\b",
                r"\bSales\s+(?:Rep|Executive|Agent)\b",
                r"\bCall\s+Center\b",
                r"\bCustomer\s+Service\b",
                r"\bData\s+Entry\b",
                r"\bReceptionist\b",
                r"\bHR\s+(?:Manager|Specialist|Officer)\b",
                r"\bLawyer\b",
                r"\bLegal\b",
                r"\bSustainability\b",
                // press releases and company news, not listings
                r"\bannounces\b",
                r"\blaunches\b",
                r"\bwins\s+award\b",
                r"\bpartners\s+with\b",
                r"\bquarterly\s+results\b",
                r"\bpress\s+release\b",
                r"\bour\s+journey\b",
                r"\bwe\s+are\s+proud\b",
                r"\bin\s+the\s+news\b",
                r"\bcompany\s+update\b",
                r"\breported\s+revenue\b",
                r"\bacquires\b",
                r"\braises\s+\$",
                r"\bIPO\b",
            ]),
            tool_keywords: owned(&[
                r"Blender",
                r"Unreal\s*Engine",
                r"Figma",
                r"Cinema\s*4D",
                r"C4D",
                r"After\s*Effects",
                r"Photoshop",
                r"Illustrator",
                r"Premiere",
                r"Substance",
                r"ZBrush",
                r"Maya",
                r"Houdini",
                r"Midjourney",
                r"Stable\s*Diffusion",
                r"DALL[-\s]?E",
                r"ComfyUI",
                r"Three\.?js",
                r"WebGL",
                r"React",
                r"Next\.?js",
                r"DaVinci",
                r"Nuke",
            ]),
            location_scores: [
                ("remote", 20),
                ("egypt", 15),
                ("cairo", 15),
                ("alexandria", 10),
                ("saudi", 15),
                ("riyadh", 15),
                ("jeddah", 12),
                ("neom", 18),
                ("ksa", 15),
                ("uae", 12),
                ("dubai", 12),
                ("abu dhabi", 10),
                ("qatar", 8),
                ("doha", 8),
                ("kuwait", 8),
                ("germany", 10),
                ("berlin", 10),
                ("europe", 8),
                ("uk", 8),
                ("netherlands", 8),
                ("عن بعد", 20),
                ("ريموت", 20),
                ("مصر", 15),
                ("القاهرة", 15),
                ("السعودية", 15),
                ("الرياض", 15),
                ("جدة", 12),
                ("الامارات", 12),
                ("دبي", 12),
            ]
            .iter()
            .map(|(k, v)| (k.to_string(), *v))
            .collect(),
            narrow_keywords: owned(&[
                "Designer",
                "Artist",
                "3D",
                "CGI",
                "VFX",
                "Blender",
                "Unreal",
                "Figma",
                "Art Director",
                "Creative Director",
                "Motion Graphics",
                "UI/?UX",
                "DOOH",
                "Anamorphic",
                "Generative AI",
            ]),
            hiring_indicators: owned(&[
                "hiring",
                "looking for",
                "seeking",
                "wanted",
                "job",
                "position",
                "opening",
                "role",
                "apply",
                "join",
                "opportunity",
                "remote",
                "freelance",
                "مطلوب",
                "وظيفة",
                "توظيف",
                "نبحث",
            ]),
            freelance_extra_keywords: owned(&["Logo", "Video", "Render", "Model"]),
        }
    }
}
