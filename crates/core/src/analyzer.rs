//! Main analysis API.
//!
//! An [`Analyzer`] is one long-lived analysis session. It owns the active
//! preset, the predicate registry, the layout source, the scoring constants
//! and the single-slot result cache. Nothing is held at module scope, so
//! independent sessions never observe each other.
//!
//! # Example
//!
//! ```rust
//! use scanwise_core::Analyzer;
//!
//! let mut analyzer = Analyzer::new();
//! let html = "<main><h1>Title</h1><p>Some <strong>text</strong>.</p></main>";
//! let result = analyzer.analyze_html(html, false).unwrap();
//! assert!(result.score <= 100);
//! ```

use std::time::Duration;

use crate::cache::{AnalysisCache, DEFAULT_CACHE_TTL, Fingerprint};
use crate::classify::content_area;
use crate::layout::{Layout, LayoutEstimator};
use crate::parse::Document;
use crate::preprocess::PreprocessConfig;
use crate::preset::{Preset, base_preset};
use crate::scoring::{AnalysisResult, ScoreConfig, ScoreOptions, score_document};
use crate::suggestions::{PredicateRegistry, TriggeredSuggestion, evaluate_suggestions};
use crate::{Result, ScanwiseError};

/// Configuration for an [`Analyzer`].
///
/// # Example
///
/// ```rust
/// use scanwise_core::AnalyzerConfig;
/// use std::time::Duration;
///
/// let config = AnalyzerConfig::builder()
///     .cache_ttl(Duration::from_millis(250))
///     .line_threshold(8)
///     .build();
/// assert_eq!(config.score.line_threshold, 8);
/// ```
#[derive(Debug, Clone)]
pub struct AnalyzerConfig {
    /// How long a cached result is reused (default: 1000 ms).
    pub cache_ttl: Duration,

    /// Whether to strip scripts, styles and comments before parsing (default: true).
    pub preprocess: bool,

    /// What preprocessing removes.
    pub preprocess_config: PreprocessConfig,

    /// Scoring constants.
    pub score: ScoreConfig,

    /// Whether to skip suggestion evaluation (default: false).
    pub skip_suggestions: bool,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            cache_ttl: DEFAULT_CACHE_TTL,
            preprocess: true,
            preprocess_config: PreprocessConfig::default(),
            score: ScoreConfig::default(),
            skip_suggestions: false,
        }
    }
}

impl AnalyzerConfig {
    /// Creates a new builder for AnalyzerConfig.
    pub fn builder() -> AnalyzerConfigBuilder {
        AnalyzerConfigBuilder::new()
    }
}

/// Builder for AnalyzerConfig.
pub struct AnalyzerConfigBuilder {
    config: AnalyzerConfig,
}

impl AnalyzerConfigBuilder {
    /// Creates a new builder with default values.
    pub fn new() -> Self {
        Self { config: AnalyzerConfig::default() }
    }

    /// Sets the cache TTL.
    pub fn cache_ttl(mut self, value: Duration) -> Self {
        self.config.cache_ttl = value;
        self
    }

    /// Sets whether to preprocess HTML before parsing.
    pub fn preprocess(mut self, value: bool) -> Self {
        self.config.preprocess = value;
        self
    }

    /// Sets the preprocessing options.
    pub fn preprocess_config(mut self, value: PreprocessConfig) -> Self {
        self.config.preprocess_config = value;
        self
    }

    /// Sets all scoring constants at once.
    pub fn score(mut self, value: ScoreConfig) -> Self {
        self.config.score = value;
        self
    }

    /// Sets the dense-paragraph line threshold.
    pub fn line_threshold(mut self, value: usize) -> Self {
        self.config.score.line_threshold = value;
        self
    }

    /// Sets whether to skip suggestions.
    pub fn skip_suggestions(mut self, value: bool) -> Self {
        self.config.skip_suggestions = value;
        self
    }

    /// Builds the config.
    pub fn build(self) -> AnalyzerConfig {
        self.config
    }
}

impl Default for AnalyzerConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// One analysis session.
pub struct Analyzer {
    config: AnalyzerConfig,
    preset: Preset,
    predicates: PredicateRegistry,
    layout: Box<dyn Layout + Send + Sync>,
    cache: AnalysisCache,
}

impl Analyzer {
    /// A session on the base preset with default settings.
    pub fn new() -> Self {
        Self::with_preset(base_preset())
    }

    /// A session on `preset` with default settings.
    pub fn with_preset(preset: Preset) -> Self {
        Self::with_config(preset, AnalyzerConfig::default())
    }

    /// A session on `preset` with a custom configuration.
    pub fn with_config(preset: Preset, config: AnalyzerConfig) -> Self {
        Self {
            cache: AnalysisCache::with_ttl(config.cache_ttl),
            config,
            preset,
            predicates: PredicateRegistry::default(),
            layout: Box::new(LayoutEstimator::default()),
        }
    }

    /// Replaces the layout source.
    pub fn layout<L: Layout + Send + Sync + 'static>(mut self, layout: L) -> Self {
        self.layout = Box::new(layout);
        self.cache.invalidate();
        self
    }

    /// Replaces the predicate registry.
    pub fn predicates(mut self, predicates: PredicateRegistry) -> Self {
        self.predicates = predicates;
        self.cache.invalidate();
        self
    }

    pub fn preset(&self) -> &Preset {
        &self.preset
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Mutable access to the registry, e.g. to register host predicates.
    pub fn predicate_registry_mut(&mut self) -> &mut PredicateRegistry {
        self.cache.invalidate();
        &mut self.predicates
    }

    /// Switches to `preset`, dropping the cached result first if it differs.
    ///
    /// Returns whether the cache was invalidated.
    pub fn set_preset(&mut self, preset: Preset) -> bool {
        let changed = self.preset.id != preset.id || self.preset != preset;
        if changed {
            tracing::debug!(from = %self.preset.id, to = %preset.id, "preset changed");
            self.cache.invalidate();
        }
        self.preset = preset;
        changed
    }

    /// Drops any cached result.
    pub fn invalidate(&mut self) {
        self.cache.invalidate();
    }

    /// Scores `doc`, reusing the cached result when still valid.
    pub fn analyze(&mut self, doc: &Document, force_refresh: bool) -> AnalysisResult {
        let root = doc.root();
        let area = content_area(root, &self.preset.matchers.content_area);
        let fingerprint = Fingerprint::of(area, &self.preset.id);

        let options = ScoreOptions {
            config: &self.config.score,
            layout: self.layout.as_ref(),
            predicates: &self.predicates,
            skip_suggestions: self.config.skip_suggestions,
        };
        let preset = &self.preset;

        self.cache
            .get_or_compute(fingerprint, || score_document(root, preset, options), force_refresh)
    }

    /// Parses and scores `html`.
    ///
    /// # Errors
    ///
    /// Returns [`ScanwiseError::EmptyDocument`] for blank input.
    pub fn analyze_html(&mut self, html: &str, force_refresh: bool) -> Result<AnalysisResult> {
        if html.trim().is_empty() {
            return Err(ScanwiseError::EmptyDocument);
        }

        let doc = if self.config.preprocess {
            Document::parse_with_preprocessing(html, &self.config.preprocess_config)?
        } else {
            Document::parse(html)?
        };

        Ok(self.analyze(&doc, force_refresh))
    }

    /// Evaluates the active preset's suggestions on their own.
    pub fn suggestions(&self, doc: &Document) -> Vec<TriggeredSuggestion> {
        evaluate_suggestions(doc.root(), &self.preset.analysis.suggestions, &self.predicates)
    }
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::new()
    }
}

/// Scores `html` with the base preset and default settings.
///
/// # Example
///
/// ```rust
/// use scanwise_core::analyze_html;
///
/// let result = analyze_html("<main><p>Hello</p></main>").unwrap();
/// assert_eq!(result.preset_id, "base");
/// ```
pub fn analyze_html(html: &str) -> Result<AnalysisResult> {
    Analyzer::new().analyze_html(html, true)
}

/// Scores `html` with `preset` and default settings.
pub fn analyze_html_with_preset(html: &str, preset: Preset) -> Result<AnalysisResult> {
    Analyzer::with_preset(preset).analyze_html(html, true)
}

/// Fetches `url`, picks a preset by its domain and scores the page.
///
/// # Example
///
/// ```no_run
/// use scanwise_core::fetch_and_analyze;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let result = fetch_and_analyze("https://github.com/rust-lang/rust").await?;
///     println!("{} ({})", result.score, result.preset_id);
///     Ok(())
/// }
/// ```
#[cfg(feature = "fetch")]
pub async fn fetch_and_analyze(url: &str) -> Result<AnalysisResult> {
    let preset = crate::preset::PresetLoader::default().load_for_url(url)?;
    let html = crate::fetch::fetch_url(url, &crate::fetch::FetchConfig::default()).await?;
    analyze_html_with_preset(&html, preset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::LayoutMetrics;
    use crate::parse::Element;
    use crate::preset::builtin_preset;

    const ARTICLE: &str = "<main><h1>Title</h1><p>Intro with <em>emphasis</em>.</p><p>Plain prose.</p></main>";

    struct TallBlocks;

    impl Layout for TallBlocks {
        fn metrics(&self, _element: &Element<'_>) -> Option<LayoutMetrics> {
            Some(LayoutMetrics { content_height: 400.0, line_height: Some(20.0), font_size: None })
        }
    }

    #[test]
    fn test_analyze_html() {
        let mut analyzer = Analyzer::new();
        let result = analyzer.analyze_html(ARTICLE, false).unwrap();

        assert_eq!(result.preset_id, "base");
        assert_eq!(result.total_text_blocks, 2);
        assert_eq!(result.breakdown.anchors.headings.count, 1);
    }

    #[test]
    fn test_empty_input_is_an_error() {
        let mut analyzer = Analyzer::new();
        assert!(matches!(analyzer.analyze_html("  \n", false), Err(ScanwiseError::EmptyDocument)));
    }

    #[test]
    fn test_cached_result_is_reused() {
        let mut analyzer = Analyzer::new();
        let doc = Document::parse(ARTICLE).unwrap();

        let first = analyzer.analyze(&doc, false);
        let second = analyzer.analyze(&doc, false);
        assert_eq!(first, second);

        let forced = analyzer.analyze(&doc, true);
        assert!(forced.same_analysis(&first));
    }

    #[test]
    fn test_set_preset_invalidates_before_swap() {
        let mut analyzer = Analyzer::new();
        let doc = Document::parse(ARTICLE).unwrap();
        analyzer.analyze(&doc, false);

        assert!(!analyzer.set_preset(base_preset()));
        assert!(analyzer.set_preset(builtin_preset("chat").unwrap()));

        let result = analyzer.analyze(&doc, false);
        assert_eq!(result.preset_id, "chat");
    }

    #[test]
    fn test_custom_layout() {
        let mut analyzer = Analyzer::new().layout(TallBlocks);
        let result = analyzer.analyze_html(ARTICLE, false).unwrap();

        assert_eq!(result.breakdown.problem_blocks, 1);
    }

    #[test]
    fn test_host_predicates() {
        let mut preset = base_preset();
        preset.analysis.suggestions =
            vec![crate::suggestions::SuggestionRule::predicate("host", "Host check", "from the host", "host-check")];

        let mut analyzer = Analyzer::with_preset(preset);
        let doc = Document::parse(ARTICLE).unwrap();
        assert!(analyzer.suggestions(&doc).is_empty());

        analyzer.predicate_registry_mut().register("host-check", |_root| Ok(true));
        assert_eq!(analyzer.analyze(&doc, false).suggestions[0].id, "host");
    }

    #[test]
    fn test_preprocessing_drops_script_text() {
        let html = r#"<main><p>Call the API first.<script>var cmd = "curl -X POST https://api.example.com/items";</script></p></main>"#;

        let cleaned = Analyzer::new().analyze_html(html, false).unwrap();
        let raw = Analyzer::with_config(base_preset(), AnalyzerConfig::builder().preprocess(false).build())
            .analyze_html(html, false)
            .unwrap();

        assert_eq!(cleaned.total_text_blocks, 1);
        assert!(cleaned.breakdown.unformatted_matches.is_empty());
        assert_eq!(raw.breakdown.unformatted_count, 1);
        assert_eq!(raw.breakdown.unformatted_matches[0].kind, "command");
    }

    #[test]
    fn test_convenience_function() {
        let result = analyze_html("<p>Hello</p>").unwrap();
        assert_eq!(result.preset_id, "base");
        assert!(result.score <= 100);
    }
}
