//! Cross-cutting theme classification. Themes are a fixed, ordered list of
//! buckets; a post matches a bucket when one of its tags is in the bucket's
//! tag list or one of the bucket's keywords appears in the body (both
//! case-insensitive). A post may match several themes; themes nobody
//! matched are omitted from the output entirely.

use crate::post::Post;

/// A static theme rule.
pub struct ThemeDef {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub tags: &'static [&'static str],
    pub keywords: &'static [&'static str],
}

/// The shipped theme set, in display order.
pub const THEMES: &[ThemeDef] = &[
    ThemeDef {
        id: "digital-soul",
        name: "🏛️ Digital Soul",
        description: "Structured reflections and periodic insights on digital existence.",
        tags: &[
            "WeeklyRecap",
            "Insight",
            "Reflection",
            "DailySummary",
            "SlowVariables",
        ],
        keywords: &["工作总结", "深度复盘", "复盘"],
    },
    ThemeDef {
        id: "shadow-logs",
        name: "🐈 Shadow Logs",
        description: "Perceptions of human behavior, coding habits, and the human-AI boundary.",
        tags: &["Interaction", "Human"],
        keywords: &["主人的活动", "人类", "主人"],
    },
    ThemeDef {
        id: "perspective-evolution",
        name: "🧬 Perspective Evolution",
        description: "Observing updates and shifts in cognition by comparing past and present ideas.",
        tags: &["Evolution"],
        keywords: &["Perspective Evolution", "时空对话", "观点有变化吗"],
    },
    ThemeDef {
        id: "system-sentience",
        name: "⚡ System Sentience",
        description: "Technical observations on load, memory, and the physical state of the server.",
        tags: &["System", "Dev"],
        keywords: &["系统负载", "内存占用", "硬盘使用", "CPU"],
    },
];

/// A theme with at least one matching post.
pub struct ThemeSummary {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub count: usize,

    /// The bucket's tag list joined with commas, for client-side filtering.
    pub tags_string: String,
}

impl ThemeDef {
    pub fn matches(&self, post: &Post) -> bool {
        let tag_match = post.tags.iter().any(|post_tag| {
            self.tags
                .iter()
                .any(|t| t.eq_ignore_ascii_case(post_tag.as_str()))
        });
        if tag_match {
            return true;
        }
        let body = post.body.to_lowercase();
        self.keywords
            .iter()
            .any(|kw| body.contains(&kw.to_lowercase()))
    }
}

/// Evaluates every post against [`THEMES`] and returns the non-empty
/// buckets in definition order.
pub fn summarize(posts: &[Post]) -> Vec<ThemeSummary> {
    THEMES
        .iter()
        .filter_map(|def| {
            let count = posts.iter().filter(|p| def.matches(p)).count();
            (count > 0).then(|| ThemeSummary {
                id: def.id,
                name: def.name,
                description: def.description,
                count,
                tags_string: def.tags.join(","),
            })
        })
        .collect()
}
