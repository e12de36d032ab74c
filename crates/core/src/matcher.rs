//! Node predicates used to assign elements to analysis categories.
//!
//! A [`Matcher`] is a CSS selector compiled once. Compilation failure is not
//! an error on the analysis path: an invalid matcher simply matches nothing,
//! so one bad selector in a preset zeroes its own category and nothing else.

use std::fmt;

use scraper::Selector;
use serde::{Deserialize, Serialize};

use crate::parse::Element;
use crate::{Result, ScanwiseError};

/// A compiled CSS selector that never fails at match time.
///
/// Matchers serialize as their selector source, so presets round-trip
/// through JSON without losing anything.
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Matcher {
    source: String,
    selector: Option<Selector>,
}

impl Matcher {
    /// Compiles `source`, logging and degrading to an empty matcher on failure.
    pub fn new(source: impl Into<String>) -> Self {
        let source = source.into();
        if source.trim().is_empty() {
            return Self { source, selector: None };
        }

        let selector = match Selector::parse(&source) {
            Ok(selector) => Some(selector),
            Err(e) => {
                tracing::warn!(selector = %source, error = %e, "invalid selector, matcher will match nothing");
                None
            }
        };
        Self { source, selector }
    }

    /// Compiles `source`, returning an error for invalid syntax.
    pub fn try_new(source: impl Into<String>) -> Result<Self> {
        let source = source.into();
        let selector = Selector::parse(&source)
            .map_err(|e| ScanwiseError::InvalidSelector { selector: source.clone(), reason: e.to_string() })?;
        Ok(Self { source, selector: Some(selector) })
    }

    /// The selector text this matcher was built from.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// True when no selector text was given.
    pub fn is_blank(&self) -> bool {
        self.source.trim().is_empty()
    }

    /// True when the selector compiled.
    pub fn is_valid(&self) -> bool {
        self.selector.is_some()
    }

    pub fn matches(&self, element: &Element<'_>) -> bool {
        self.selector
            .as_ref()
            .is_some_and(|selector| selector.matches(element.as_element_ref()))
    }

    /// True if `element` or any of its ancestors matches.
    pub fn matches_self_or_ancestor(&self, element: &Element<'_>) -> bool {
        if self.selector.is_none() {
            return false;
        }
        self.matches(element) || element.ancestors().any(|ancestor| self.matches(&ancestor))
    }

    /// All descendants of `root` that match, in document order.
    pub fn find_all<'a>(&self, root: Element<'a>) -> Vec<Element<'a>> {
        if self.selector.is_none() {
            return Vec::new();
        }
        root.descendants().filter(|el| self.matches(el)).collect()
    }

    /// First descendant of `root` that matches, in document order.
    pub fn find_first<'a>(&self, root: Element<'a>) -> Option<Element<'a>> {
        if self.selector.is_none() {
            return None;
        }
        root.descendants().find(|el| self.matches(el))
    }

    /// True if any descendant of `root` matches.
    pub fn any_under(&self, root: Element<'_>) -> bool {
        self.find_first(root).is_some()
    }
}

/// True if `element` sits under (or is) a node matched by any of `ignore`.
pub fn is_ignored(element: &Element<'_>, ignore: &[Matcher]) -> bool {
    ignore.iter().any(|matcher| matcher.matches_self_or_ancestor(element))
}

impl PartialEq for Matcher {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl fmt::Debug for Matcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Matcher")
            .field("source", &self.source)
            .field("valid", &self.is_valid())
            .finish()
    }
}

impl fmt::Display for Matcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

impl From<String> for Matcher {
    fn from(source: String) -> Self {
        Self::new(source)
    }
}

impl From<&str> for Matcher {
    fn from(source: &str) -> Self {
        Self::new(source)
    }
}

impl From<Matcher> for String {
    fn from(matcher: Matcher) -> Self {
        matcher.source
    }
}
