//! Ordered fallback rules for field extraction
//!
//! Every extracted field is resolved by a [`RuleChain`]: an ordered list of
//! [`Rule`]s tried first-match-wins. Early rules are strict, later ones are
//! looser fallbacks for older or sloppier vendor layouts. Keeping the rules
//! as data lets each one be tested on its own.

use regex::{Captures, Regex};
use tracing::debug;

/// Turns the captures of a successful match into a field value.
/// Returning `None` rejects the match and lets the search continue.
pub type Transform<T> = fn(&Captures<'_>) -> Option<T>;

/// One pattern plus the transform that reads its captures
pub struct Rule<T> {
    pattern: Regex,
    transform: Transform<T>,
}

impl<T> Rule<T> {
    /// Build a rule from a constant pattern
    ///
    /// # Panics
    ///
    /// Panics if `pattern` is not a valid regex. Patterns are compile-time
    /// constants, so this only fires on a programming error.
    #[must_use]
    pub fn new(pattern: &str, transform: Transform<T>) -> Self {
        Self {
            pattern: Regex::new(pattern).expect("rule pattern must be valid"),
            transform,
        }
    }

    /// Value from the first match the transform accepts
    pub fn apply(&self, text: &str) -> Option<T> {
        self.pattern
            .captures_iter(text)
            .find_map(|caps| (self.transform)(&caps))
    }

    #[must_use]
    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }
}

impl Rule<String> {
    /// Rule yielding the trimmed first capture group
    #[must_use]
    pub fn first_group(pattern: &str) -> Self {
        Self::new(pattern, first_group)
    }
}

/// Named, ordered list of rules for one field
pub struct RuleChain<T> {
    field: &'static str,
    rules: Vec<Rule<T>>,
}

impl<T> RuleChain<T> {
    #[must_use]
    pub const fn new(field: &'static str, rules: Vec<Rule<T>>) -> Self {
        Self { field, rules }
    }

    /// Resolve the field: first rule that yields a value wins
    pub fn resolve(&self, text: &str) -> Option<T> {
        let hit = self
            .rules
            .iter()
            .enumerate()
            .find_map(|(idx, rule)| rule.apply(text).map(|value| (idx, value)));

        match hit {
            Some((idx, value)) => {
                debug!("Resolved {} with rule {}", self.field, idx);
                Some(value)
            }
            None => {
                debug!("No rule matched for {}", self.field);
                None
            }
        }
    }

    #[must_use]
    pub const fn field(&self) -> &'static str {
        self.field
    }

    #[must_use]
    pub fn rules(&self) -> &[Rule<T>] {
        &self.rules
    }
}

/// Trimmed first capture, rejected when blank
pub fn first_group(caps: &Captures<'_>) -> Option<String> {
    group(caps, 1)
}

/// Trimmed capture `idx`, rejected when blank or absent
pub fn group(caps: &Captures<'_>, idx: usize) -> Option<String> {
    caps.get(idx)
        .map(|m| m.as_str().trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Trimmed named capture, rejected when blank or absent
pub fn named(caps: &Captures<'_>, name: &str) -> Option<String> {
    caps.name(name)
        .map(|m| m.as_str().trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Collapse runs of whitespace to single spaces
#[must_use]
pub fn squash_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain() -> RuleChain<String> {
        RuleChain::new(
            "reference",
            vec![
                Rule::first_group(r"STRICT:\s*([A-Z]+)"),
                Rule::first_group(r"LOOSE:\s*([A-Z]+)"),
            ],
        )
    }

    #[test]
    fn test_first_rule_wins() {
        let value = chain().resolve("LOOSE: BBB\nSTRICT: AAA");
        assert_eq!(value.as_deref(), Some("AAA"));
    }

    #[test]
    fn test_fallback_rule() {
        assert_eq!(chain().resolve("LOOSE: BBB").as_deref(), Some("BBB"));
        assert_eq!(chain().resolve("nothing here"), None);
    }

    #[test]
    fn test_rejected_match_continues_search() {
        let rule: Rule<String> = Rule::new(r"(\d+)", |caps| {
            first_group(caps).filter(|v| v.len() > 2)
        });
        assert_eq!(rule.apply("12 then 345").as_deref(), Some("345"));
    }
}
