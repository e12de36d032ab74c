//! Scannability analysis for rendered documents.
//!
//! Scanwise measures how easy a page is to skim: how many structural
//! anchors (headings, emphasis, code, lists, images, links and
//! platform-specific blocks) support its prose, how many paragraphs are
//! dense walls of text, and how much technical content was written as
//! plain prose instead of code.
//!
//! # Example
//!
//! ```rust
//! use scanwise_core::{Analyzer, PresetLoader};
//!
//! let preset = PresetLoader::new().load("github").unwrap();
//! let mut analyzer = Analyzer::with_preset(preset);
//!
//! let html = r#"<div class="markdown-body"><h1>Install</h1><p>Use <code>cargo</code>.</p></div>"#;
//! let result = analyzer.analyze_html(html, false).unwrap();
//! println!("{} / 100", result.score);
//! ```

pub mod analyzer;
pub mod antipattern;
pub mod cache;
pub mod classify;
pub mod error;
pub mod fetch;
pub mod layout;
pub mod matcher;
pub mod parse;
pub mod preprocess;
pub mod preset;
pub mod report;
pub mod scoring;
pub mod suggestions;

#[cfg(feature = "fetch")]
pub use analyzer::fetch_and_analyze;
pub use analyzer::{Analyzer, AnalyzerConfig, AnalyzerConfigBuilder, analyze_html, analyze_html_with_preset};
pub use antipattern::{AntiPatternDetector, AntiPatternMatch, detect};
pub use cache::{AnalysisCache, DEFAULT_CACHE_TTL, Fingerprint};
pub use classify::{AnchorBreakdown, CategoryCount, classify};
pub use error::{Result, ScanwiseError};
pub use fetch::{FetchConfig, InputSource, fetch_file, fetch_stdin};
#[cfg(feature = "fetch")]
pub use fetch::{fetch_input, fetch_url};
pub use layout::{Layout, LayoutEstimator, LayoutMetrics};
pub use matcher::Matcher;
pub use parse::{Document, Element};
#[doc(hidden)]
pub use preprocess::PreprocessConfig;
pub use preprocess::preprocess_html;
pub use preset::{
    AnalysisRules, AnchorMatchers, AntiPatternRule, PartialPreset, Preset, PresetLoader, PresetLoaderBuilder,
    PresetMatchers, Weights, base_preset, builtin_preset, merge_preset,
};
pub use report::{Rating, ReportFormat, TextReportConfig};
pub use scoring::{
    AnalysisResult, Breakdown, Problem, ProblemKind, ScoreConfig, ScoreConfigBuilder, ScoreOptions, score,
    score_document, score_with_defaults,
};
pub use suggestions::{
    PredicateRegistry, PredicateResult, SuggestionCheck, SuggestionRule, TriggeredSuggestion, evaluate_suggestions,
};
