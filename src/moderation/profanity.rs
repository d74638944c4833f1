use std::sync::LazyLock;

use regex::{Regex, RegexBuilder};

/// Words screened in every check.
pub const BASE_WORDS: &[&str] = &[
    "damn", "crap", "idiot", "stupid", "moron", "jerk", "loser", "bastard", "screw you",
];

/// Additional words screened only by strict checks.
pub const STRICT_EXTRA_WORDS: &[&str] = &[
    "hell", "dumb", "sucks", "suck", "trash", "garbage", "pathetic", "worthless", "ugly",
    "shut up",
];

static DEFAULT_FILTER: LazyLock<ProfanityFilter> =
    LazyLock::new(|| ProfanityFilter::new(BASE_WORDS, STRICT_EXTRA_WORDS));

/// Case-insensitive whole-word matcher with a base and a strict tier.
///
/// The strict tier is always a superset of the base tier.
#[derive(Debug, Clone)]
pub struct ProfanityFilter {
    base: Option<Regex>,
    strict: Option<Regex>,
}

impl ProfanityFilter {
    /// # Panics
    ///
    /// Panics if the combined word list is too large to compile.
    pub fn new(base: &[&str], extra: &[&str]) -> Self {
        let strict_words: Vec<&str> = base.iter().chain(extra.iter()).copied().collect();
        Self {
            base: compile(base),
            strict: compile(&strict_words),
        }
    }

    /// True if any listed word occurs in `text` as a whole word.
    pub fn contains_profanity(&self, text: &str, strict: bool) -> bool {
        let matcher = if strict { &self.strict } else { &self.base };
        matcher.as_ref().is_some_and(|re| re.is_match(text))
    }
}

impl Default for ProfanityFilter {
    fn default() -> Self {
        DEFAULT_FILTER.clone()
    }
}

/// Check `text` against the built-in word lists.
pub fn contains_profanity(text: &str, strict: bool) -> bool {
    DEFAULT_FILTER.contains_profanity(text, strict)
}

fn compile(words: &[&str]) -> Option<Regex> {
    let alternation = words
        .iter()
        .map(|w| w.trim())
        .filter(|w| !w.is_empty())
        .map(|w| regex::escape(w).replace(' ', r"\s+"))
        .collect::<Vec<_>>()
        .join("|");

    if alternation.is_empty() {
        return None;
    }

    let re = RegexBuilder::new(&format!(r"\b(?:{alternation})\b"))
        .case_insensitive(true)
        .build()
        .expect("profanity word list compiles");
    Some(re)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_lists_never_match() {
        let filter = ProfanityFilter::new(&[], &[]);
        assert!(!filter.contains_profanity("anything at all", true));
    }

    #[test]
    fn multi_word_entries_tolerate_extra_spaces() {
        assert!(contains_profanity("oh SCREW   you", false));
    }
}
