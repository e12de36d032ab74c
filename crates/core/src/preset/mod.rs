//! Platform presets: matchers, weights, anti-patterns and suggestions.
//!
//! A [`Preset`] is always complete. Platform-specific tuning is written as a
//! [`PartialPreset`] and folded onto a base with [`merge_preset`]; the result
//! is normalized so every field reads as defined.

pub mod builtin;
pub mod loader;
pub mod merge;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::matcher::Matcher;
use crate::suggestions::SuggestionRule;

pub use builtin::{BUILTIN_PRESET_IDS, base_preset, builtin_override, builtin_preset};
pub use loader::{PresetLoader, PresetLoaderBuilder};
pub use merge::{merge_preset, normalize_preset};

/// Weight keys of the standard anchor categories.
pub mod category {
    pub const HEADINGS: &str = "headings";
    pub const EMPHASIS: &str = "emphasis";
    pub const CODE_BLOCKS: &str = "codeBlocks";
    pub const INLINE_CODE: &str = "inlineCode";
    pub const LISTS: &str = "lists";
    pub const IMAGES: &str = "images";
    pub const STANDALONE_LINKS: &str = "standaloneLinks";
    pub const INLINE_LINKS: &str = "inlineLinks";

    /// All standard keys, in breakdown order.
    pub const STANDARD: [&str; 8] =
        [HEADINGS, EMPHASIS, CODE_BLOCKS, INLINE_CODE, LISTS, IMAGES, STANDALONE_LINKS, INLINE_LINKS];

    /// Weight used for a standard category absent from every preset layer.
    pub fn default_weight(key: &str) -> f64 {
        match key {
            HEADINGS | CODE_BLOCKS | LISTS | IMAGES => 1.0,
            STANDALONE_LINKS => 0.75,
            EMPHASIS | INLINE_CODE => 0.5,
            INLINE_LINKS => 0.25,
            _ => 0.0,
        }
    }
}

/// A named bundle of matchers and analysis rules tuned for one platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preset {
    pub id: String,
    pub name: String,
    pub description: String,
    /// Hostnames this preset applies to (exact or as a dot-suffix).
    pub domain_rules: Vec<String>,
    pub matchers: PresetMatchers,
    pub analysis: AnalysisRules,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresetMatchers {
    /// Region of the page that is analysed; the document root when nothing matches.
    pub content_area: Matcher,
    /// Prose blocks (paragraph-like elements).
    pub text_blocks: Matcher,
    pub anchors: AnchorMatchers,
    /// Extra anchor categories keyed by name; weighted via [`Weights::platform_weight`].
    pub platform_anchors: BTreeMap<String, Matcher>,
    /// Subtrees excluded from every count.
    pub ignore_matchers: Vec<Matcher>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnchorMatchers {
    pub headings: Matcher,
    pub emphasis: Matcher,
    pub code_blocks: Matcher,
    pub inline_code: Matcher,
    pub links: Matcher,
    pub images: Matcher,
    pub lists: Matcher,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRules {
    /// Ordered; the first matching rule wins for a text block.
    pub anti_patterns: Vec<AntiPatternRule>,
    pub weights: Weights,
    pub suggestions: Vec<SuggestionRule>,
}

/// A signature of technical content that should have been formatted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AntiPatternRule {
    /// Regular expression (Rust `regex` syntax) tested against block text.
    pub pattern: String,
    /// Finding type, e.g. `command`, `json`, `header`, `code`.
    #[serde(rename = "type")]
    pub kind: String,
    pub description: String,
}

impl AntiPatternRule {
    pub fn new(kind: &str, pattern: &str, description: &str) -> Self {
        Self { pattern: pattern.to_string(), kind: kind.to_string(), description: description.to_string() }
    }
}

/// Per-category anchor weights.
///
/// Standard categories use the keys in [`category`]; any other key weights a
/// platform anchor of the same name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Weights {
    /// Weight for platform anchors without an explicit entry.
    pub default_platform_weight: f64,
    #[serde(flatten)]
    pub categories: BTreeMap<String, f64>,
}

impl Weights {
    pub fn get(&self, key: &str) -> Option<f64> {
        self.categories.get(key).copied()
    }

    /// Weight of a standard category, falling back to its built-in default.
    ///
    /// Negative and NaN values read as 0.
    pub fn standard(&self, key: &str) -> f64 {
        self.get(key).unwrap_or_else(|| category::default_weight(key)).max(0.0)
    }

    /// Weight of a platform anchor, falling back to `default_platform_weight`.
    ///
    /// Negative and NaN values read as 0.
    pub fn platform_weight(&self, name: &str) -> f64 {
        self.get(name).unwrap_or(self.default_platform_weight).max(0.0)
    }
}

/// Override layer for a [`Preset`]; every field is optional.
///
/// Lists are appended to the base lists, maps merge key-wise, scalars replace.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PartialPreset {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub domain_rules: Vec<String>,
    pub matchers: PartialMatchers,
    pub analysis: PartialAnalysisRules,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PartialMatchers {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_area: Option<Matcher>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_blocks: Option<Matcher>,
    pub anchors: PartialAnchorMatchers,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub platform_anchors: BTreeMap<String, Matcher>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ignore_matchers: Vec<Matcher>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PartialAnchorMatchers {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headings: Option<Matcher>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emphasis: Option<Matcher>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code_blocks: Option<Matcher>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inline_code: Option<Matcher>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub links: Option<Matcher>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub images: Option<Matcher>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lists: Option<Matcher>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PartialAnalysisRules {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub anti_patterns: Vec<AntiPatternRule>,
    pub weights: PartialWeights,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<SuggestionRule>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PartialWeights {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_platform_weight: Option<f64>,
    #[serde(flatten)]
    pub categories: BTreeMap<String, f64>,
}

impl PartialPreset {
    /// Parses an override layer from JSON.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}
