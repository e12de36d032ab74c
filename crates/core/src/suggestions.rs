//! Advisory suggestions. They never change the score.
//!
//! A [`SuggestionRule`] names up to three checks: a matcher that must be
//! missing, a matcher that must be present, and a predicate referenced by id.
//! Predicates live in a [`PredicateRegistry`] on the evaluating side, so rules
//! stay plain data and survive serialization intact.

use std::collections::HashMap;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::matcher::Matcher;
use crate::parse::Element;

/// Outcome of a predicate; errors count as "not triggered".
pub type PredicateResult = std::result::Result<bool, Box<dyn std::error::Error + Send + Sync>>;

/// A heuristic run against the analysis root.
pub type Predicate = Arc<dyn Fn(Element<'_>) -> PredicateResult + Send + Sync>;

/// Paragraph length (characters) that reads as a wall of text.
pub const WALL_OF_TEXT_CHARS: usize = 600;

/// Paragraphs allowed before the first heading.
pub const MAX_INTRO_PARAGRAPHS: usize = 3;

/// Paragraph count from which a document without lists is flagged.
pub const LONG_DOCUMENT_PARAGRAPHS: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionRule {
    pub id: String,
    pub name: String,
    pub description: String,
    /// Triggers when nothing under the root matches.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub missing_matcher: Option<Matcher>,
    /// Triggers when anything under the root matches.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub present_matcher: Option<Matcher>,
    /// Id of a predicate in the evaluating side's [`PredicateRegistry`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub predicate: Option<String>,
}

/// One check of a rule, in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SuggestionCheck<'r> {
    MissingMatcher(&'r Matcher),
    PresentMatcher(&'r Matcher),
    NamedPredicate(&'r str),
}

impl SuggestionRule {
    fn bare(id: &str, name: &str, description: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            missing_matcher: None,
            present_matcher: None,
            predicate: None,
        }
    }

    /// Rule triggered when `selector` matches nothing.
    pub fn missing(id: &str, name: &str, description: &str, selector: &str) -> Self {
        Self { missing_matcher: Some(Matcher::new(selector)), ..Self::bare(id, name, description) }
    }

    /// Rule triggered when `selector` matches something.
    pub fn present(id: &str, name: &str, description: &str, selector: &str) -> Self {
        Self { present_matcher: Some(Matcher::new(selector)), ..Self::bare(id, name, description) }
    }

    /// Rule triggered by the registered predicate `predicate_id`.
    pub fn predicate(id: &str, name: &str, description: &str, predicate_id: &str) -> Self {
        Self { predicate: Some(predicate_id.to_string()), ..Self::bare(id, name, description) }
    }

    /// The configured checks in precedence order: missing, present, predicate.
    pub fn checks(&self) -> impl Iterator<Item = SuggestionCheck<'_>> {
        self.missing_matcher
            .iter()
            .map(SuggestionCheck::MissingMatcher)
            .chain(self.present_matcher.iter().map(SuggestionCheck::PresentMatcher))
            .chain(self.predicate.as_deref().map(SuggestionCheck::NamedPredicate))
    }
}

/// A rule that fired, without its checks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggeredSuggestion {
    pub id: String,
    pub name: String,
    pub description: String,
}

impl From<&SuggestionRule> for TriggeredSuggestion {
    fn from(rule: &SuggestionRule) -> Self {
        Self { id: rule.id.clone(), name: rule.name.clone(), description: rule.description.clone() }
    }
}

/// Local table of suggestion predicates keyed by id.
#[derive(Clone)]
pub struct PredicateRegistry {
    predicates: HashMap<String, Predicate>,
}

impl PredicateRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self { predicates: HashMap::new() }
    }

    /// A registry holding the built-in predicates.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register("wall-of-text", wall_of_text);
        registry.register("long-intro", long_intro);
        registry.register("no-lists-long-doc", no_lists_long_doc);
        registry
    }

    /// Registers `predicate` under `id`, replacing any previous entry.
    pub fn register<F>(&mut self, id: impl Into<String>, predicate: F)
    where
        F: Fn(Element<'_>) -> PredicateResult + Send + Sync + 'static,
    {
        self.predicates.insert(id.into(), Arc::new(predicate));
    }

    pub fn get(&self, id: &str) -> Option<&Predicate> {
        self.predicates.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.predicates.contains_key(id)
    }

    /// Registered ids, sorted.
    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.predicates.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    /// Runs predicate `id` against `root`. Unknown ids, errors and panics are all `false`.
    pub fn run(&self, id: &str, root: Element<'_>) -> bool {
        let Some(predicate) = self.get(id) else {
            tracing::debug!(predicate = id, "unknown suggestion predicate");
            return false;
        };

        match panic::catch_unwind(AssertUnwindSafe(|| predicate.as_ref()(root))) {
            Ok(Ok(triggered)) => triggered,
            Ok(Err(e)) => {
                tracing::debug!(predicate = id, error = %e, "suggestion predicate failed");
                false
            }
            Err(_) => {
                tracing::warn!(predicate = id, "suggestion predicate panicked");
                false
            }
        }
    }
}

impl Default for PredicateRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl fmt::Debug for PredicateRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PredicateRegistry").field("ids", &self.ids()).finish()
    }
}

/// Evaluates `rules` against `root`, returning those that trigger, in rule order.
pub fn evaluate_suggestions(
    root: Element<'_>, rules: &[SuggestionRule], registry: &PredicateRegistry,
) -> Vec<TriggeredSuggestion> {
    rules
        .iter()
        .filter(|rule| is_triggered(rule, root, registry))
        .map(TriggeredSuggestion::from)
        .collect()
}

fn is_triggered(rule: &SuggestionRule, root: Element<'_>, registry: &PredicateRegistry) -> bool {
    rule.checks().any(|check| match check {
        SuggestionCheck::MissingMatcher(matcher) => matcher.is_valid() && !matcher.any_under(root),
        SuggestionCheck::PresentMatcher(matcher) => matcher.any_under(root),
        SuggestionCheck::NamedPredicate(id) => registry.run(id, root),
    })
}

fn is_heading(tag: &str) -> bool {
    matches!(tag, "h1" | "h2" | "h3" | "h4" | "h5" | "h6")
}

fn wall_of_text(root: Element<'_>) -> PredicateResult {
    Ok(root
        .descendants()
        .filter(|el| el.tag_name() == "p")
        .any(|p| p.normalized_text().chars().count() > WALL_OF_TEXT_CHARS))
}

fn long_intro(root: Element<'_>) -> PredicateResult {
    let mut paragraphs = 0;
    for el in root.descendants() {
        let tag = el.tag_name();
        if is_heading(&tag) {
            break;
        }
        if tag == "p" {
            paragraphs += 1;
        }
    }
    Ok(paragraphs > MAX_INTRO_PARAGRAPHS)
}

fn no_lists_long_doc(root: Element<'_>) -> PredicateResult {
    let mut paragraphs = 0;
    for el in root.descendants() {
        match el.tag_name().as_str() {
            "ul" | "ol" => return Ok(false),
            "p" => paragraphs += 1,
            _ => {}
        }
    }
    Ok(paragraphs >= LONG_DOCUMENT_PARAGRAPHS)
}
