//! Keyword matching over a compiled multi-pattern set.

use std::collections::HashMap;

use regex::RegexSet;

use lore_core::split_args;

use crate::error::EngineResult;

/// One keyword entry: terms that must all occur and terms that must not.
/// Indices point into the compiled set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Clause {
    required: Vec<usize>,
    forbidden: Vec<usize>,
}

/// Matches messages against a keyword list.
///
/// The list is split with the same quote-aware rules as macro arguments.
/// With logic enabled, an entry such as `sword&~broken` requires `sword` and
/// forbids `broken`. Without logic, every entry is a plain literal and any
/// occurrence matches.
#[derive(Debug, Clone)]
pub struct KeywordMatcher {
    set: RegexSet,
    clauses: Vec<Clause>,
}

impl KeywordMatcher {
    /// Compile a keyword list.
    pub fn new(list: &str, use_logic: bool) -> EngineResult<Self> {
        let mut terms: Vec<String> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();
        let mut intern = |term: &str| -> usize {
            *index.entry(term.to_string()).or_insert_with(|| {
                terms.push(term.to_string());
                terms.len() - 1
            })
        };

        let mut clauses = Vec::new();
        for entry in split_args(list) {
            if entry.is_empty() {
                continue;
            }
            let mut clause = Clause::default();
            if use_logic {
                for term in entry.split('&').map(str::trim).filter(|t| !t.is_empty()) {
                    match term.strip_prefix('~').map(str::trim) {
                        Some(negated) if !negated.is_empty() => {
                            clause.forbidden.push(intern(negated));
                        }
                        Some(_) => {}
                        None => clause.required.push(intern(term)),
                    }
                }
            } else {
                clause.required.push(intern(&entry));
            }
            if !clause.required.is_empty() || !clause.forbidden.is_empty() {
                clauses.push(clause);
            }
        }

        let set = RegexSet::new(terms.iter().map(|t| regex::escape(t)))?;
        Ok(Self { set, clauses })
    }

    /// Returns true if any entry matches `message`.
    pub fn is_match(&self, message: &str) -> bool {
        if self.clauses.is_empty() {
            return false;
        }
        let hits = self.set.matches(message);
        self.clauses.iter().any(|clause| {
            clause.required.iter().all(|&i| hits.matched(i))
                && !clause.forbidden.iter().any(|&i| hits.matched(i))
        })
    }

    /// Number of distinct terms compiled.
    pub fn term_count(&self) -> usize {
        self.set.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn any_keyword() {
        let m = KeywordMatcher::new("hello, goodbye", false).unwrap();
        assert!(m.is_match("hello world"));
        assert!(m.is_match("well, goodbye then"));
        assert!(!m.is_match("Hello world"));
        assert!(!m.is_match("nothing here"));
    }

    #[test]
    fn literals_are_escaped() {
        let m = KeywordMatcher::new("a.b, (x)", false).unwrap();
        assert!(m.is_match("see a.b"));
        assert!(!m.is_match("see axb"));
        assert!(m.is_match("call (x)"));
    }

    #[test]
    fn quoted_keyword_with_comma() {
        let m = KeywordMatcher::new(r#""well, well", orc"#, true).unwrap();
        assert!(m.is_match("well, well, what is this"));
        assert!(!m.is_match("well well"));
        assert!(m.is_match("an orc"));
    }

    #[test]
    fn conjunction_and_negation() {
        let m = KeywordMatcher::new("sword&~broken, shield", true).unwrap();
        assert!(m.is_match("a sharp sword"));
        assert!(!m.is_match("a broken sword"));
        assert!(m.is_match("a broken shield"));

        let m = KeywordMatcher::new("dragon & gold", true).unwrap();
        assert!(m.is_match("the dragon sleeps on gold"));
        assert!(!m.is_match("the dragon sleeps"));
    }

    #[test]
    fn negation_only_entry() {
        let m = KeywordMatcher::new("~quiet", true).unwrap();
        assert!(m.is_match("loud noises"));
        assert!(!m.is_match("be quiet"));
    }

    #[test]
    fn ampersand_is_literal_without_logic() {
        let m = KeywordMatcher::new("salt&pepper", false).unwrap();
        assert!(m.is_match("pass the salt&pepper"));
        assert!(!m.is_match("salt and pepper"));
    }

    #[test]
    fn empty_list_never_matches() {
        let m = KeywordMatcher::new("", true).unwrap();
        assert!(!m.is_match("anything"));
        assert_eq!(m.term_count(), 0);
    }

    #[test]
    fn shared_terms_compile_once() {
        let m = KeywordMatcher::new("a&b, b&c", true).unwrap();
        assert_eq!(m.term_count(), 3);
    }
}
