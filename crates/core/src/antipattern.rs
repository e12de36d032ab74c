//! Detection of technical content written as plain prose.
//!
//! Each text block outside code formatting is tested against the preset's
//! ordered anti-pattern rules. The first rule that matches wins, so a block
//! yields at most one finding.

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::classify::content_area;
use crate::matcher::{Matcher, is_ignored};
use crate::parse::{Element, normalize_whitespace};
use crate::preset::{AntiPatternRule, Preset};

/// Blocks with less stripped text than this are not tested.
pub const MIN_BLOCK_CHARS: usize = 10;

/// Maximum length of the snippet recorded with a finding.
pub const SNIPPET_CHARS: usize = 100;

/// Class or id tokens of syntax highlighters and in-page code editors.
const EDITOR_WIDGET_TOKENS: [&str; 7] =
    ["hljs", "highlight", "codemirror", "monaco-editor", "ace_editor", "prism-code", "cm-editor"];

/// Token prefixes of the same widgets and of language-tagged code.
const EDITOR_WIDGET_PREFIXES: [&str; 7] = ["language-", "lang-", "hljs-", "codemirror-", "monaco-", "ace_", "cm-"];

/// One text block that looks like unformatted technical content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AntiPatternMatch {
    #[serde(rename = "type")]
    pub kind: String,
    pub description: String,
    /// Leading text of the block, at most [`SNIPPET_CHARS`] characters.
    pub snippet: String,
}

#[derive(Debug)]
struct CompiledRule {
    regex: Regex,
    kind: String,
    description: String,
}

/// Anti-pattern rules compiled once, in declaration order.
#[derive(Debug, Default)]
pub struct AntiPatternDetector {
    rules: Vec<CompiledRule>,
}

impl AntiPatternDetector {
    /// Compiles `rules`; patterns that fail to compile are dropped.
    pub fn new(rules: &[AntiPatternRule]) -> Self {
        let rules = rules
            .iter()
            .filter_map(|rule| match Regex::new(&rule.pattern) {
                Ok(regex) => Some(CompiledRule { regex, kind: rule.kind.clone(), description: rule.description.clone() }),
                Err(e) => {
                    tracing::warn!(kind = %rule.kind, pattern = %rule.pattern, error = %e, "skipping invalid anti-pattern");
                    None
                }
            })
            .collect();

        Self { rules }
    }

    /// Number of usable rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// The first rule matching `text`, as `(kind, description)`.
    pub fn first_match(&self, text: &str) -> Option<(&str, &str)> {
        self.rules
            .iter()
            .find(|rule| rule.regex.is_match(text))
            .map(|rule| (rule.kind.as_str(), rule.description.as_str()))
    }

    /// Scans every text block under the preset's content area.
    pub fn detect(
        &self, root: Element<'_>, preset: &Preset, text_blocks: &Matcher, ignore: &[Matcher],
    ) -> Vec<AntiPatternMatch> {
        if self.rules.is_empty() {
            return Vec::new();
        }

        let area = content_area(root, &preset.matchers.content_area);
        let anchors = &preset.matchers.anchors;
        let is_formatted =
            |el: &Element<'_>| anchors.code_blocks.matches(el) || anchors.inline_code.matches(el) || is_editor_widget(el);

        let mut findings = Vec::new();

        for block in text_blocks.find_all(area) {
            if is_formatted(&block) || block.ancestors().any(|a| is_formatted(&a)) {
                continue;
            }
            if is_ignored(&block, ignore) {
                continue;
            }

            let text = normalize_whitespace(&block.text_excluding(|el| is_formatted(el)));
            if text.chars().count() < MIN_BLOCK_CHARS {
                continue;
            }

            if let Some((kind, description)) = self.first_match(&text) {
                tracing::debug!(kind, "unformatted technical content");
                findings.push(AntiPatternMatch {
                    kind: kind.to_string(),
                    description: description.to_string(),
                    snippet: text.chars().take(SNIPPET_CHARS).collect(),
                });
            }
        }

        findings
    }
}

/// Runs the preset's anti-patterns over its text blocks.
pub fn detect(root: Element<'_>, preset: &Preset, text_blocks: &Matcher, ignore: &[Matcher]) -> Vec<AntiPatternMatch> {
    AntiPatternDetector::new(&preset.analysis.anti_patterns).detect(root, preset, text_blocks, ignore)
}

/// True for syntax-highlighter and code-editor containers.
pub fn is_editor_widget(element: &Element<'_>) -> bool {
    let id = element.attr("id").map(str::to_lowercase);
    let classes = element.classes().map(str::to_lowercase);

    id.into_iter().chain(classes).any(|name| {
        EDITOR_WIDGET_TOKENS.contains(&name.as_str())
            || EDITOR_WIDGET_PREFIXES.iter().any(|prefix| name.starts_with(prefix))
    })
}
