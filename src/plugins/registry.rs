//! Handler registry - maps registered patterns to handler functions
//!
//! The registry is populated once during plugin loading and read-only
//! afterwards. It is owned by the bot runtime and passed by reference to
//! the loader and the resolver; there is no process-global state.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use regex_lite::{Regex, RegexBuilder};
use tracing::info;

use crate::application::errors::{BotError, PluginError};
use crate::domain::entities::{ChatEvent, EventCategory};
use crate::domain::traits::ChatClient;

static NEXT_MATCHER_ID: AtomicU64 = AtomicU64::new(1);

/// Regex options applied at registration time.
#[derive(Debug, Clone, Copy, Default)]
pub struct PatternFlags {
    pub case_insensitive: bool,
    pub multi_line: bool,
    pub dot_matches_new_line: bool,
}

impl PatternFlags {
    pub fn case_insensitive() -> Self {
        Self {
            case_insensitive: true,
            ..Self::default()
        }
    }
}

/// A registry key wrapping one compiled pattern.
///
/// Identity is per-instance: two matchers built from identical pattern
/// text are distinct keys, which is what lets several handlers share the
/// same textual pattern.
#[derive(Debug)]
pub struct Matcher {
    id: u64,
    regex: Regex,
}

impl Matcher {
    fn compile(pattern: &str, flags: PatternFlags) -> Result<Self, PluginError> {
        let regex = RegexBuilder::new(pattern)
            .case_insensitive(flags.case_insensitive)
            .multi_line(flags.multi_line)
            .dot_matches_new_line(flags.dot_matches_new_line)
            .build()
            .map_err(|source| PluginError::Pattern {
                pattern: pattern.to_string(),
                source,
            })?;

        Ok(Self {
            id: NEXT_MATCHER_ID.fetch_add(1, Ordering::Relaxed),
            regex,
        })
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn pattern(&self) -> &str {
        self.regex.as_str()
    }

    pub fn regex(&self) -> &Regex {
        &self.regex
    }
}

/// What a handler returns: an optional reply to send back on the
/// event's channel.
pub type HandlerReply = Result<Option<String>, BotError>;

/// A registered handler function. The registry stores these opaquely and
/// never inspects them.
pub type Handler = Arc<dyn Fn(&HandlerContext) -> HandlerReply + Send + Sync>;

/// A hook invoked once at startup with the connected transport client.
pub type StartHook = Arc<dyn Fn(Arc<dyn ChatClient>) -> Result<(), BotError> + Send + Sync>;

/// Arguments passed to a handler on dispatch.
#[derive(Debug, Clone)]
pub struct HandlerContext {
    pub event: ChatEvent,
    /// Captured groups from the matching search, in pattern order.
    /// Empty when the pattern defines no groups; `None` for groups that
    /// did not participate in the match.
    pub captures: Vec<Option<String>>,
}

impl HandlerContext {
    /// Get capture group `index` (0-based, excluding the whole match)
    pub fn capture(&self, index: usize) -> Option<&str> {
        self.captures.get(index).and_then(|c| c.as_deref())
    }
}

/// One registered (matcher, handler) pair.
pub struct Entry {
    pub(crate) matcher: Matcher,
    pub(crate) name: String,
    pub(crate) handler: Handler,
}

impl Entry {
    pub fn matcher(&self) -> &Matcher {
        &self.matcher
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn handler(&self) -> Handler {
        Arc::clone(&self.handler)
    }
}

/// Registry of pattern-to-handler mappings, partitioned by event category,
/// plus the ordered at-start hook list.
///
/// Insertion order within a category is preserved and defines evaluation
/// order at dispatch time.
#[derive(Default)]
pub struct Registry {
    commands: HashMap<EventCategory, Vec<Entry>>,
    at_start: Vec<StartHook>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler under `category` for `pattern`.
    ///
    /// The pattern is compiled immediately; a compilation failure
    /// propagates to the caller and registers nothing. `name` identifies
    /// the handler in logs.
    pub fn register(
        &mut self,
        category: EventCategory,
        pattern: &str,
        flags: PatternFlags,
        name: &str,
        handler: Handler,
    ) -> Result<(), PluginError> {
        let matcher = Matcher::compile(pattern, flags)?;
        info!(
            "registered {} handler \"{}\" to \"{}\"",
            category.as_str(),
            name,
            pattern
        );
        self.commands.entry(category).or_default().push(Entry {
            matcher,
            name: name.to_string(),
            handler,
        });
        Ok(())
    }

    /// Append a hook to the at-start list. At-start hooks have no
    /// category and no pattern.
    pub fn at_start(&mut self, name: &str, hook: StartHook) {
        info!("registered at_start hook \"{}\"", name);
        self.at_start.push(hook);
    }

    /// Registered entries for a category, in registration order.
    pub fn entries(&self, category: EventCategory) -> &[Entry] {
        self.commands.get(&category).map(Vec::as_slice).unwrap_or(&[])
    }

    /// At-start hooks in registration order.
    pub fn at_start_hooks(&self) -> &[StartHook] {
        &self.at_start
    }

    /// Merge another registry into this one, appending its entries after
    /// the existing ones. Used by the loader to commit one plugin
    /// module's registrations atomically.
    pub fn absorb(&mut self, other: Registry) {
        for (category, entries) in other.commands {
            self.commands.entry(category).or_default().extend(entries);
        }
        self.at_start.extend(other.at_start);
    }

    /// Total number of registered handlers across all categories.
    pub fn len(&self) -> usize {
        self.commands.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
