//! Dispatch resolver - finds every handler whose pattern matches an event
//!
//! Resolution is a fan-out: a single text may match zero, one or many
//! patterns in the same category, and every match is yielded in
//! registration order. There is no first-match-wins short-circuit. When
//! nothing matches, exactly one [`Resolved::NoMatch`] sentinel is yielded
//! so callers can apply a fallback without special-casing emptiness.

use std::slice;

use crate::domain::entities::EventCategory;
use crate::plugins::registry::{Entry, Handler, Registry};

/// One resolution result.
pub enum Resolved {
    /// A pattern searched successfully in the text.
    Match {
        /// Name the handler was registered under
        name: String,
        handler: Handler,
        /// Captured groups, `None` for groups that did not participate
        captures: Vec<Option<String>>,
    },
    /// Nothing in the category matched. Yielded exactly once, and never
    /// alongside real matches.
    NoMatch,
}

impl Resolved {
    pub fn is_match(&self) -> bool {
        matches!(self, Resolved::Match { .. })
    }
}

/// Lazy iterator over the matches for one (category, text) pair.
pub struct Resolve<'r> {
    entries: slice::Iter<'r, Entry>,
    text: &'r str,
    matched_any: bool,
    done: bool,
}

impl<'r> Iterator for Resolve<'r> {
    type Item = Resolved;

    fn next(&mut self) -> Option<Resolved> {
        if self.done {
            return None;
        }

        for entry in self.entries.by_ref() {
            // Unanchored search, not a full-string match
            if let Some(caps) = entry.matcher().regex().captures(self.text) {
                self.matched_any = true;
                let captures = caps
                    .iter()
                    .skip(1)
                    .map(|group| group.map(|m| m.as_str().to_string()))
                    .collect();
                return Some(Resolved::Match {
                    name: entry.name().to_string(),
                    handler: entry.handler(),
                    captures,
                });
            }
        }

        self.done = true;
        if self.matched_any {
            None
        } else {
            Some(Resolved::NoMatch)
        }
    }
}

/// Resolve `text` against every matcher registered under `category`.
///
/// An empty category behaves exactly like a non-matching one: the
/// sentinel is yielded.
pub fn resolve<'r>(registry: &'r Registry, category: EventCategory, text: &'r str) -> Resolve<'r> {
    Resolve {
        entries: registry.entries(category).iter(),
        text,
        matched_any: false,
        done: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugins::registry::{Handler, HandlerContext, PatternFlags};
    use std::sync::Arc;

    fn named(reply: &str) -> Handler {
        let reply = reply.to_string();
        Arc::new(move |_ctx: &HandlerContext| Ok(Some(reply.clone())))
    }

    fn registry_with(patterns: &[(&str, &str)]) -> Registry {
        let mut registry = Registry::new();
        for (pattern, name) in patterns {
            registry
                .register(EventCategory::RespondTo, pattern, PatternFlags::default(), name, named(name))
                .unwrap();
        }
        registry
    }

    fn names(registry: &Registry, text: &str) -> Vec<Option<String>> {
        resolve(registry, EventCategory::RespondTo, text)
            .map(|r| match r {
                Resolved::Match { name, .. } => Some(name),
                Resolved::NoMatch => None,
            })
            .collect()
    }

    #[test]
    fn fan_out_in_registration_order() {
        let registry = registry_with(&[("^hello", "h1"), ("hello", "h2")]);
        assert_eq!(
            names(&registry, "hello world"),
            vec![Some("h1".to_string()), Some("h2".to_string())]
        );
    }

    #[test]
    fn no_match_yields_single_sentinel() {
        let registry = registry_with(&[("^hello", "h1"), ("hello", "h2")]);
        assert_eq!(names(&registry, "goodbye"), vec![None]);
    }

    #[test]
    fn empty_category_yields_single_sentinel() {
        let registry = Registry::new();
        assert_eq!(names(&registry, "anything"), vec![None]);
    }

    #[test]
    fn sentinel_never_mixed_with_matches() {
        let registry = registry_with(&[("hello", "h")]);
        let results: Vec<_> = resolve(&registry, EventCategory::RespondTo, "hello").collect();
        assert_eq!(results.len(), 1);
        assert!(results[0].is_match());
    }

    #[test]
    fn captures_are_propagated() {
        let registry = registry_with(&[(r"^order (\d+)$", "h3")]);
        let results: Vec<_> = resolve(&registry, EventCategory::RespondTo, "order 42").collect();
        match &results[..] {
            [Resolved::Match { name, captures, .. }] => {
                assert_eq!(name, "h3");
                assert_eq!(captures, &vec![Some("42".to_string())]);
            }
            _ => panic!("expected exactly one match"),
        }
    }

    #[test]
    fn pattern_without_groups_yields_empty_captures() {
        let registry = registry_with(&[("^ping$", "ping")]);
        let results: Vec<_> = resolve(&registry, EventCategory::RespondTo, "ping").collect();
        match &results[..] {
            [Resolved::Match { captures, .. }] => assert!(captures.is_empty()),
            _ => panic!("expected exactly one match"),
        }
    }

    #[test]
    fn non_participating_group_is_none() {
        let registry = registry_with(&[(r"^(a)|(b)$", "alt")]);
        let results: Vec<_> = resolve(&registry, EventCategory::RespondTo, "a").collect();
        match &results[..] {
            [Resolved::Match { captures, .. }] => {
                assert_eq!(captures, &vec![Some("a".to_string()), None]);
            }
            _ => panic!("expected exactly one match"),
        }
    }

    #[test]
    fn search_is_unanchored() {
        let registry = registry_with(&[("needle", "n")]);
        assert_eq!(
            names(&registry, "hay needle stack"),
            vec![Some("n".to_string())]
        );
    }

    #[test]
    fn duplicate_pattern_text_fans_out_to_both_handlers() {
        let registry = registry_with(&[("ping", "first"), ("ping", "second")]);
        assert_eq!(
            names(&registry, "ping"),
            vec![Some("first".to_string()), Some("second".to_string())]
        );
    }
}
