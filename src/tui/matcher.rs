//! Filter matching for the session list
//!
//! A matcher decides which sessions survive a filter query. Results always come
//! back in list order (newest first), so the "first match" is the newest session
//! that matches, never the best-scoring one.

use nucleo::pattern::{CaseMatching, Normalization, Pattern};
use nucleo::{Config, Matcher, Utf32Str};

/// Which matcher the browser filters with
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MatchPolicy {
    #[default]
    Fuzzy,
    Substring,
}

impl MatchPolicy {
    pub fn matcher(self) -> Box<dyn SessionMatcher> {
        match self {
            MatchPolicy::Fuzzy => Box::new(FuzzyMatcher::new()),
            MatchPolicy::Substring => Box::new(SubstringMatcher),
        }
    }
}

pub trait SessionMatcher: Send {
    /// Indices into `haystacks` that match `query`, ascending.
    /// An empty (or all-whitespace) query matches everything.
    fn filter(&mut self, query: &str, haystacks: &[String]) -> Vec<usize>;
}

/// Smart-case fuzzy matching via nucleo
pub struct FuzzyMatcher {
    matcher: Matcher,
    buf: Vec<char>,
}

impl FuzzyMatcher {
    pub fn new() -> Self {
        Self { matcher: Matcher::new(Config::DEFAULT), buf: Vec::new() }
    }
}

impl Default for FuzzyMatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionMatcher for FuzzyMatcher {
    fn filter(&mut self, query: &str, haystacks: &[String]) -> Vec<usize> {
        if query.trim().is_empty() {
            return (0..haystacks.len()).collect();
        }
        let pattern = Pattern::parse(query, CaseMatching::Smart, Normalization::Smart);
        haystacks
            .iter()
            .enumerate()
            .filter_map(|(idx, haystack)| {
                let text = Utf32Str::new(haystack, &mut self.buf);
                pattern.score(text, &mut self.matcher).map(|_| idx)
            })
            .collect()
    }
}

/// Case-insensitive substring matching on every whitespace-separated term
#[derive(Debug, Clone, Copy, Default)]
pub struct SubstringMatcher;

impl SessionMatcher for SubstringMatcher {
    fn filter(&mut self, query: &str, haystacks: &[String]) -> Vec<usize> {
        let terms: Vec<String> = query.split_whitespace().map(str::to_lowercase).collect();
        haystacks
            .iter()
            .enumerate()
            .filter(|(_, haystack)| {
                let haystack = haystack.to_lowercase();
                terms.iter().all(|term| haystack.contains(term.as_str()))
            })
            .map(|(idx, _)| idx)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn haystacks() -> Vec<String> {
        vec![
            "work/api 1111 Fix login redirect main".to_string(),
            "work/cli 2222 Add export command dev".to_string(),
            "home/notes 3333 Refactor the login form".to_string(),
        ]
    }

    #[test]
    fn test_empty_query_matches_all() {
        let haystacks = haystacks();
        assert_eq!(FuzzyMatcher::new().filter("", &haystacks), vec![0, 1, 2]);
        assert_eq!(SubstringMatcher.filter("  ", &haystacks), vec![0, 1, 2]);
    }

    #[test]
    fn test_fuzzy_keeps_list_order() {
        let haystacks = haystacks();
        // "login" scores higher in entry 2, but order is by list position
        assert_eq!(FuzzyMatcher::new().filter("login", &haystacks), vec![0, 2]);
    }

    #[test]
    fn test_fuzzy_matches_scattered_letters() {
        let haystacks = haystacks();
        assert_eq!(FuzzyMatcher::new().filter("expcmd", &haystacks), vec![1]);
    }

    #[test]
    fn test_fuzzy_smart_case() {
        let haystacks = haystacks();
        assert_eq!(FuzzyMatcher::new().filter("fix", &haystacks), vec![0]);
        assert!(FuzzyMatcher::new().filter("FIX", &haystacks).is_empty());
    }

    #[test]
    fn test_substring_requires_every_term() {
        let haystacks = haystacks();
        let mut matcher = SubstringMatcher;
        assert_eq!(matcher.filter("LOGIN", &haystacks), vec![0, 2]);
        assert_eq!(matcher.filter("login form", &haystacks), vec![2]);
        assert!(matcher.filter("expcmd", &haystacks).is_empty());
    }

    #[test]
    fn test_policy_builds_matcher() {
        let haystacks = haystacks();
        let mut matcher = MatchPolicy::Substring.matcher();
        assert_eq!(matcher.filter("cli", &haystacks), vec![1]);
        assert_eq!(MatchPolicy::default(), MatchPolicy::Fuzzy);
    }
}
