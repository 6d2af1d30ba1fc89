//! Turn classification and importance scoring.
//!
//! Rules are evaluated in a fixed order. The last matching rule decides the
//! kind, while every match contributes its weight and tag.

use crate::item::{MemoryKind, clamp_unit};

pub const BASE_IMPORTANCE: f64 = 0.5;
/// Turns this close to either end of a conversation get [`BOUNDARY_BONUS`].
pub const BOUNDARY_WINDOW: usize = 3;
pub const BOUNDARY_BONUS: f64 = 0.2;
/// Content longer than this many characters gets [`LENGTH_BONUS`].
pub const LONG_CONTENT_CHARS: usize = 100;
pub const LENGTH_BONUS: f64 = 0.1;

/// One keyword category.
#[derive(Debug)]
pub struct Rule {
    pub kind: MemoryKind,
    pub weight: f64,
    pub keywords: &'static [&'static str],
}

impl Rule {
    fn matches(&self, content_lower: &str) -> bool {
        self.keywords.iter().any(|k| content_lower.contains(k))
    }
}

/// Priority order: later rules override the kind chosen by earlier ones.
pub const RULES: [Rule; 4] = [
    Rule {
        kind: MemoryKind::Fact,
        weight: 0.2,
        keywords: &[
            "知道", "了解", "记得", "事实", "信息", "数据",
            "know", "remember", "fact", "information", "data",
        ],
    },
    Rule {
        kind: MemoryKind::Preference,
        weight: 0.3,
        keywords: &[
            "喜欢", "不喜欢", "偏好", "习惯", "爱好", "兴趣",
            "like", "prefer", "favorite", "favourite", "habit", "hobby", "interest",
        ],
    },
    Rule {
        kind: MemoryKind::Emotion,
        weight: 0.2,
        keywords: &[
            "开心", "难过", "生气", "兴奋", "担心", "害怕", "爱", "恨",
            "happy", "sad", "angry", "excited", "worried", "afraid", "love", "hate",
        ],
    },
    Rule {
        kind: MemoryKind::Context,
        weight: 0.1,
        keywords: &[
            "之前", "刚才", "昨天", "明天", "计划", "安排",
            "before", "earlier", "yesterday", "tomorrow", "plan", "schedule",
        ],
    },
];

/// Result of scoring one turn.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub kind: MemoryKind,
    /// Clamped to [0, 1].
    pub importance: f64,
    pub tags: Vec<String>,
}

/// Score the turn at `position` in a conversation of `total` turns.
pub fn classify(content: &str, position: usize, total: usize) -> Classification {
    let content_lower = content.to_lowercase();
    let mut importance = BASE_IMPORTANCE;

    if is_boundary(position, total) {
        importance += BOUNDARY_BONUS;
    }
    if content.chars().count() > LONG_CONTENT_CHARS {
        importance += LENGTH_BONUS;
    }

    let mut kind = MemoryKind::Conversation;
    let mut tags = Vec::new();
    for rule in &RULES {
        if rule.matches(&content_lower) {
            kind = rule.kind;
            importance += rule.weight;
            tags.push(rule.kind.as_str().to_string());
        }
    }

    Classification {
        kind,
        importance: clamp_unit(importance),
        tags,
    }
}

/// Within the first or last [`BOUNDARY_WINDOW`] positions.
fn is_boundary(position: usize, total: usize) -> bool {
    position < BOUNDARY_WINDOW || position + BOUNDARY_WINDOW >= total
}
