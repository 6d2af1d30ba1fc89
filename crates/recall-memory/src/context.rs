//! Query derivation from live turns and prompt rendering of retrieved memories.

use recall_core::Turn;

use crate::item::MemoryItem;

/// How many trailing turns feed a contextual query.
pub const CONTEXT_WINDOW: usize = 10;
/// Keywords taken from each turn.
pub const KEYWORDS_PER_TURN: usize = 3;
/// Words shorter than this (in characters) are never keywords.
const MIN_KEYWORD_CHARS: usize = 3;

const STOP_WORDS: &[&str] = &[
    "的", "了", "是", "在", "有", "和", "与", "或",
    "the", "and", "for", "are", "but", "not", "you", "with", "this", "that", "was", "have",
];

/// Up to three keywords from each of the last ten non-metadata turns,
/// deduplicated in first-seen order.
pub fn extract_keywords(turns: &[Turn]) -> Vec<String> {
    let recent: Vec<&Turn> = turns.iter().filter(|t| !t.is_metadata()).collect();
    let start = recent.len().saturating_sub(CONTEXT_WINDOW);

    let mut keywords: Vec<String> = Vec::new();
    for turn in &recent[start..] {
        let picked = turn
            .content
            .split_whitespace()
            .filter(|w| w.chars().count() >= MIN_KEYWORD_CHARS)
            .filter(|w| !STOP_WORDS.contains(&w.to_lowercase().as_str()))
            .take(KEYWORDS_PER_TURN);
        for word in picked {
            if !keywords.iter().any(|k| k == word) {
                keywords.push(word.to_string());
            }
        }
    }
    keywords
}

/// Render memories as prompt context, one `<Kind> memory: <content>` line each.
pub fn format_memory_context(memories: &[MemoryItem]) -> String {
    memories
        .iter()
        .map(|m| format!("{}: {}", m.kind.label(), m.content))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn takes_three_keywords_per_turn() {
        let turns = vec![Turn::user("alpha beta gamma delta epsilon")];
        assert_eq!(extract_keywords(&turns), vec!["alpha", "beta", "gamma"]);
    }

    #[test]
    fn skips_short_and_stop_words() {
        let turns = vec![Turn::user("I do the running with The dog")];
        assert_eq!(extract_keywords(&turns), vec!["running", "dog"]);
    }

    #[test]
    fn skips_metadata_and_dedups() {
        let turns = vec![
            Turn::user("running shoes"),
            Turn::metadata("ignored metadata payload"),
            Turn::assistant("running again"),
        ];
        assert_eq!(extract_keywords(&turns), vec!["running", "shoes", "again"]);
    }

    #[test]
    fn only_last_ten_turns_count() {
        let mut turns: Vec<Turn> = (0..12).map(|i| Turn::user(format!("word{i:02}"))).collect();
        turns.push(Turn::metadata("meta"));
        let keywords = extract_keywords(&turns);
        assert_eq!(keywords.len(), 10);
        assert_eq!(keywords[0], "word02");
    }
}
