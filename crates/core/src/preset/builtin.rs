//! Presets shipped with the crate.
//!
//! `base` works on arbitrary HTML. The platform presets are override layers
//! merged onto it, so they only spell out what differs.

use std::collections::BTreeMap;

use crate::matcher::Matcher;
use crate::preset::{
    AnalysisRules, AnchorMatchers, AntiPatternRule, PartialAnalysisRules, PartialAnchorMatchers, PartialMatchers,
    PartialPreset, PartialWeights, Preset, PresetMatchers, Weights, category, merge_preset,
};
use crate::suggestions::SuggestionRule;

/// Ids of all built-in presets, `base` first.
pub const BUILTIN_PRESET_IDS: [&str; 4] = ["base", "github", "confluence", "chat"];

/// Default platform-anchor weight of the base preset.
pub const DEFAULT_PLATFORM_WEIGHT: f64 = 0.75;

/// The preset every other preset is merged onto.
pub fn base_preset() -> Preset {
    Preset {
        id: "base".to_string(),
        name: "Generic web page".to_string(),
        description: "Works on any HTML document; analyses the main content region".to_string(),
        domain_rules: Vec::new(),
        matchers: PresetMatchers {
            content_area: Matcher::new("main, article, [role='main']"),
            text_blocks: Matcher::new("p"),
            anchors: AnchorMatchers {
                headings: Matcher::new("h1, h2, h3, h4, h5, h6"),
                emphasis: Matcher::new("strong, b, em, mark"),
                code_blocks: Matcher::new("pre"),
                inline_code: Matcher::new("code, kbd, samp"),
                links: Matcher::new("a[href]"),
                images: Matcher::new("img, video"),
                lists: Matcher::new("ul, ol"),
            },
            platform_anchors: BTreeMap::from([
                ("tables".to_string(), Matcher::new("table")),
                ("callouts".to_string(), Matcher::new("aside, [role='note'], blockquote")),
            ]),
            ignore_matchers: vec![
                Matcher::new("nav"),
                Matcher::new("footer"),
                Matcher::new("[aria-hidden='true']"),
                Matcher::new("[hidden]"),
            ],
        },
        analysis: AnalysisRules {
            anti_patterns: base_anti_patterns(),
            weights: Weights {
                default_platform_weight: DEFAULT_PLATFORM_WEIGHT,
                categories: category::STANDARD
                    .iter()
                    .map(|key| (key.to_string(), category::default_weight(key)))
                    .chain([("tables".to_string(), 1.0)])
                    .collect(),
            },
            suggestions: vec![
                SuggestionRule::missing(
                    "add-headings",
                    "Add headings",
                    "The content has no headings; readers cannot jump between sections",
                    "h1, h2, h3, h4, h5, h6",
                ),
                SuggestionRule::predicate(
                    "wall-of-text",
                    "Split long paragraphs",
                    "At least one paragraph is long enough to read as a wall of text",
                    "wall-of-text",
                ),
                SuggestionRule::predicate(
                    "long-intro",
                    "Shorten the introduction",
                    "Several paragraphs appear before the first heading",
                    "long-intro",
                ),
                SuggestionRule::predicate(
                    "use-lists",
                    "Use lists",
                    "A long document without a single list; enumerations are easier to scan as bullets",
                    "no-lists-long-doc",
                ),
            ],
        },
    }
}

fn base_anti_patterns() -> Vec<AntiPatternRule> {
    vec![
        AntiPatternRule::new(
            "command",
            r#"(?i)\b(?:curl|wget)\s+(?:-{1,2}[a-z]|['"]?https?://)"#,
            "HTTP client invocation written as prose",
        ),
        AntiPatternRule::new(
            "command",
            r"\b(?:npm|npx|yarn|pnpm)\s+(?:install|i|add|run|exec|create|init)\b|\b(?:pip3?|cargo|brew|gem|apt-get)\s+(?:install|add|remove|build)\s+\S",
            "Package manager command written as prose",
        ),
        AntiPatternRule::new(
            "command",
            r"\b(?:sudo\s+[a-z][\w-]*\s|docker\s+(?:run|build|compose|exec|pull)\s|kubectl\s+(?:apply|get|describe|delete)\s|git\s+(?:clone|checkout|commit|push|pull|rebase)\s+\S)",
            "Shell command written as prose",
        ),
        AntiPatternRule::new(
            "json",
            r#"\{\s*"[\w\-]+"\s*:\s*(?:"|\d|\{|\[|true|false|null)"#,
            "JSON literal outside a code block",
        ),
        AntiPatternRule::new(
            "header",
            r"(?i)\b(?:authorization\s*:\s*(?:bearer|basic|token)\s+\S+|bearer\s+[a-z0-9\-_.~+/]{20,}=*|content-type\s*:\s*[a-z]+/[a-z0-9.+\-]+|x-api-key\s*:\s*\S+)",
            "HTTP header or bearer token outside a code block",
        ),
        AntiPatternRule::new(
            "code",
            r"\bfunction\s+[A-Za-z_$][\w$]*\s*\(|\b(?:const|let|var)\s+[A-Za-z_$][\w$]*\s*=\s*(?:async\s*)?(?:\([^)]*\)|[A-Za-z_$][\w$]*)\s*=>|\bdef\s+\w+\s*\([^)]*\)\s*:",
            "Function definition outside a code block",
        ),
        AntiPatternRule::new(
            "code",
            r#"\bimport\s+(?:[\w*{}\s,]+\s+from\s+)?['"][^'"]+['"]|\bexport\s+(?:default|const|function|class|async)\b|\bfrom\s+[\w.]+\s+import\s+\w+"#,
            "Import or export statement outside a code block",
        ),
    ]
}

/// Override layer for a built-in platform preset.
pub fn builtin_override(id: &str) -> Option<PartialPreset> {
    match id {
        "github" => Some(github_override()),
        "confluence" => Some(confluence_override()),
        "chat" => Some(chat_override()),
        _ => None,
    }
}

/// A built-in preset by id, fully merged onto [`base_preset`].
pub fn builtin_preset(id: &str) -> Option<Preset> {
    if id == "base" {
        return Some(base_preset());
    }
    builtin_override(id).map(|overlay| merge_preset(&base_preset(), &overlay))
}

fn github_override() -> PartialPreset {
    PartialPreset {
        id: Some("github".to_string()),
        name: Some("GitHub".to_string()),
        description: Some("READMEs, issues and pull request descriptions rendered by GitHub".to_string()),
        domain_rules: vec!["github.com".to_string()],
        matchers: PartialMatchers {
            content_area: Some(Matcher::new(".markdown-body")),
            anchors: PartialAnchorMatchers { code_blocks: Some(Matcher::new("pre, .highlight")), ..Default::default() },
            platform_anchors: BTreeMap::from([
                ("alerts".to_string(), Matcher::new(".markdown-alert")),
                ("taskLists".to_string(), Matcher::new(".contains-task-list")),
            ]),
            ignore_matchers: vec![Matcher::new(".js-header-wrapper"), Matcher::new(".file-navigation")],
            ..Default::default()
        },
        analysis: PartialAnalysisRules {
            anti_patterns: vec![AntiPatternRule::new(
                "command",
                r"\bgh\s+(?:pr|issue|repo|release|run)\s+[a-z]+",
                "GitHub CLI command written as prose",
            )],
            weights: PartialWeights {
                default_platform_weight: None,
                categories: BTreeMap::from([("alerts".to_string(), 1.0)]),
            },
            suggestions: vec![SuggestionRule::present(
                "unlabelled-code",
                "Label code blocks",
                "Code blocks without a language lose syntax highlighting",
                "pre:not([lang]) > code:not([class])",
            )],
        },
    }
}

fn confluence_override() -> PartialPreset {
    PartialPreset {
        id: Some("confluence".to_string()),
        name: Some("Confluence".to_string()),
        description: Some("Confluence wiki pages".to_string()),
        domain_rules: vec!["atlassian.net".to_string()],
        matchers: PartialMatchers {
            content_area: Some(Matcher::new("#main-content, .wiki-content")),
            anchors: PartialAnchorMatchers {
                code_blocks: Some(Matcher::new("pre, .code-block, .codeContent")),
                ..Default::default()
            },
            platform_anchors: BTreeMap::from([
                ("panels".to_string(), Matcher::new(".confluence-information-macro, .panel")),
                ("expands".to_string(), Matcher::new(".expand-container")),
            ]),
            ignore_matchers: vec![Matcher::new(".page-metadata"), Matcher::new("#likes-and-labels-container")],
            ..Default::default()
        },
        analysis: PartialAnalysisRules {
            weights: PartialWeights {
                default_platform_weight: None,
                categories: BTreeMap::from([("panels".to_string(), 1.0), ("expands".to_string(), 0.5)]),
            },
            suggestions: vec![SuggestionRule::present(
                "empty-panels",
                "Fill or remove empty panels",
                "An info panel has no body text",
                ".confluence-information-macro-body:empty",
            )],
            ..Default::default()
        },
    }
}

fn chat_override() -> PartialPreset {
    PartialPreset {
        id: Some("chat".to_string()),
        name: Some("Chat transcript".to_string()),
        description: Some("Assistant answers in web chat interfaces".to_string()),
        domain_rules: vec!["chatgpt.com".to_string(), "chat.openai.com".to_string(), "claude.ai".to_string()],
        matchers: PartialMatchers {
            content_area: Some(Matcher::new("main")),
            platform_anchors: BTreeMap::from([("messages".to_string(), Matcher::new("[data-message-author-role]"))]),
            ignore_matchers: vec![Matcher::new("form"), Matcher::new("[data-testid='composer']")],
            ..Default::default()
        },
        analysis: PartialAnalysisRules {
            anti_patterns: vec![AntiPatternRule::new(
                "command",
                r"\bpython3?\s+(?:-m\s+\w+|[\w/.-]+\.py)\b",
                "Python invocation written as prose",
            )],
            weights: PartialWeights {
                default_platform_weight: None,
                categories: BTreeMap::from([("messages".to_string(), 0.0)]),
            },
            suggestions: vec![SuggestionRule::present(
                "code-without-language",
                "Tag code blocks with a language",
                "A code block has no language class",
                "pre > code:not([class*='language-'])",
            )],
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use regex::Regex;

    #[test]
    fn test_base_preset_is_valid() {
        let base = base_preset();
        let m = &base.matchers;

        for matcher in [
            &m.content_area,
            &m.text_blocks,
            &m.anchors.headings,
            &m.anchors.emphasis,
            &m.anchors.code_blocks,
            &m.anchors.inline_code,
            &m.anchors.links,
            &m.anchors.images,
            &m.anchors.lists,
        ] {
            assert!(matcher.is_valid(), "invalid matcher {}", matcher);
        }
        for key in category::STANDARD {
            assert!(base.analysis.weights.get(key).is_some(), "missing weight {}", key);
        }
    }

    #[test]
    fn test_builtin_patterns_compile() {
        for id in BUILTIN_PRESET_IDS {
            let preset = builtin_preset(id).unwrap();
            for rule in &preset.analysis.anti_patterns {
                assert!(Regex::new(&rule.pattern).is_ok(), "{} pattern fails: {}", id, rule.pattern);
            }
            for rule in &preset.analysis.suggestions {
                for matcher in [&rule.missing_matcher, &rule.present_matcher].into_iter().flatten() {
                    assert!(matcher.is_valid(), "{} suggestion {} has invalid matcher", id, rule.id);
                }
            }
        }
    }

    #[test]
    fn test_builtin_presets_extend_base() {
        let base = base_preset();
        let github = builtin_preset("github").unwrap();

        assert_eq!(github.id, "github");
        assert_eq!(github.matchers.content_area.source(), ".markdown-body");
        assert_eq!(github.matchers.text_blocks, base.matchers.text_blocks);
        assert!(github.analysis.anti_patterns.starts_with(&base.analysis.anti_patterns));
        assert_eq!(github.analysis.anti_patterns.len(), base.analysis.anti_patterns.len() + 1);
        assert!(github.matchers.platform_anchors.contains_key("tables"));
        assert!(github.matchers.platform_anchors.contains_key("alerts"));
    }

    #[test]
    fn test_unknown_builtin() {
        assert!(builtin_preset("wiki").is_none());
        assert!(builtin_override("base").is_none());
    }
}
