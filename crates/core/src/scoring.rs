//! Scannability scoring.
//!
//! The score rewards structural anchors relative to the amount of prose and
//! penalizes dense paragraphs and technical content written as plain text:
//!
//! ```text
//! ratioScore = min(70, (weightedAnchors / textBlocks) / 1.5 × 70)
//! score      = clamp(ratioScore − problemPenalty − unformattedPenalty
//!                    + headingBonus + imageBonus + codeBonus, 0, 100)
//! ```
//!
//! Every constant lives on [`ScoreConfig`]. Scoring never fails: selectors that
//! don't compile and predicates that error contribute nothing.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::antipattern::{AntiPatternDetector, AntiPatternMatch};
use crate::classify::{AnchorBreakdown, classify, content_area};
use crate::layout::{Layout, LayoutEstimator};
use crate::matcher::{Matcher, is_ignored};
use crate::parse::Element;
use crate::preset::Preset;
use crate::suggestions::{PredicateRegistry, TriggeredSuggestion, evaluate_suggestions};

/// Weighted anchors per text block that earns the full ratio score.
pub const IDEAL_ANCHOR_RATIO: f64 = 1.5;
pub const MAX_RATIO_SCORE: f64 = 70.0;
pub const MAX_PROBLEM_PENALTY: f64 = 30.0;
/// Penalty when every text block is a problem block, before the cap.
pub const PROBLEM_PENALTY_SCALE: f64 = 50.0;
pub const MAX_UNFORMATTED_PENALTY: f64 = 25.0;
pub const UNFORMATTED_PENALTY_PER_MATCH: f64 = 5.0;
pub const MAX_HEADING_BONUS: f64 = 15.0;
pub const HEADING_BONUS_PER_WEIGHT: f64 = 3.0;
pub const MAX_IMAGE_BONUS: f64 = 15.0;
pub const IMAGE_BONUS_PER_WEIGHT: f64 = 5.0;
pub const MAX_CODE_BONUS: f64 = 10.0;
pub const CODE_BONUS_PER_WEIGHT: f64 = 2.0;
/// Lines a text block may span before it counts as dense.
pub const DEFAULT_LINE_THRESHOLD: usize = 5;

/// Tuning constants for the scoring formula.
///
/// # Example
///
/// ```rust
/// use scanwise_core::ScoreConfig;
///
/// let config = ScoreConfig::builder().line_threshold(8).ideal_ratio(2.0).build();
/// assert_eq!(config.line_threshold, 8);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreConfig {
    /// Text blocks spanning more lines than this are dense (default: 5).
    pub line_threshold: usize,
    /// Ideal weighted anchors per text block (default: 1.5).
    pub ideal_ratio: f64,
    /// Cap of the ratio component (default: 70).
    pub max_ratio_score: f64,
    /// Cap of the dense-paragraph penalty (default: 30).
    pub max_problem_penalty: f64,
    /// Dense-paragraph penalty at a problem share of 1.0 (default: 50).
    pub problem_penalty_scale: f64,
    /// Cap of the unformatted-code penalty (default: 25).
    pub max_unformatted_penalty: f64,
    /// Penalty per unformatted finding (default: 5).
    pub unformatted_penalty_per_match: f64,
    /// Cap and rate of the heading bonus (default: 15, 3 per weight).
    pub max_heading_bonus: f64,
    pub heading_bonus_per_weight: f64,
    /// Cap and rate of the image bonus (default: 15, 5 per weight).
    pub max_image_bonus: f64,
    pub image_bonus_per_weight: f64,
    /// Cap and rate of the code-block bonus (default: 10, 2 per weight).
    pub max_code_bonus: f64,
    pub code_bonus_per_weight: f64,
}

impl Default for ScoreConfig {
    fn default() -> Self {
        Self {
            line_threshold: DEFAULT_LINE_THRESHOLD,
            ideal_ratio: IDEAL_ANCHOR_RATIO,
            max_ratio_score: MAX_RATIO_SCORE,
            max_problem_penalty: MAX_PROBLEM_PENALTY,
            problem_penalty_scale: PROBLEM_PENALTY_SCALE,
            max_unformatted_penalty: MAX_UNFORMATTED_PENALTY,
            unformatted_penalty_per_match: UNFORMATTED_PENALTY_PER_MATCH,
            max_heading_bonus: MAX_HEADING_BONUS,
            heading_bonus_per_weight: HEADING_BONUS_PER_WEIGHT,
            max_image_bonus: MAX_IMAGE_BONUS,
            image_bonus_per_weight: IMAGE_BONUS_PER_WEIGHT,
            max_code_bonus: MAX_CODE_BONUS,
            code_bonus_per_weight: CODE_BONUS_PER_WEIGHT,
        }
    }
}

impl ScoreConfig {
    /// Creates a new builder for ScoreConfig.
    pub fn builder() -> ScoreConfigBuilder {
        ScoreConfigBuilder::new()
    }
}

/// Builder for ScoreConfig.
pub struct ScoreConfigBuilder {
    config: ScoreConfig,
}

impl ScoreConfigBuilder {
    /// Creates a new builder with default values.
    pub fn new() -> Self {
        Self { config: ScoreConfig::default() }
    }

    /// Sets the dense-paragraph line threshold.
    pub fn line_threshold(mut self, value: usize) -> Self {
        self.config.line_threshold = value;
        self
    }

    /// Sets the ideal anchor ratio.
    pub fn ideal_ratio(mut self, value: f64) -> Self {
        self.config.ideal_ratio = value;
        self
    }

    /// Sets the ratio component cap.
    pub fn max_ratio_score(mut self, value: f64) -> Self {
        self.config.max_ratio_score = value;
        self
    }

    /// Sets the dense-paragraph penalty cap and scale.
    pub fn problem_penalty(mut self, max: f64, scale: f64) -> Self {
        self.config.max_problem_penalty = max;
        self.config.problem_penalty_scale = scale;
        self
    }

    /// Sets the unformatted-code penalty cap and per-finding rate.
    pub fn unformatted_penalty(mut self, max: f64, per_match: f64) -> Self {
        self.config.max_unformatted_penalty = max;
        self.config.unformatted_penalty_per_match = per_match;
        self
    }

    /// Sets the heading bonus cap and rate.
    pub fn heading_bonus(mut self, max: f64, per_weight: f64) -> Self {
        self.config.max_heading_bonus = max;
        self.config.heading_bonus_per_weight = per_weight;
        self
    }

    /// Sets the image bonus cap and rate.
    pub fn image_bonus(mut self, max: f64, per_weight: f64) -> Self {
        self.config.max_image_bonus = max;
        self.config.image_bonus_per_weight = per_weight;
        self
    }

    /// Sets the code-block bonus cap and rate.
    pub fn code_bonus(mut self, max: f64, per_weight: f64) -> Self {
        self.config.max_code_bonus = max;
        self.config.code_bonus_per_weight = per_weight;
        self
    }

    /// Builds the config.
    pub fn build(self) -> ScoreConfig {
        self.config
    }
}

impl Default for ScoreConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Collaborators a scoring pass needs besides the document and preset.
#[derive(Clone, Copy)]
pub struct ScoreOptions<'a> {
    pub config: &'a ScoreConfig,
    pub layout: &'a dyn Layout,
    pub predicates: &'a PredicateRegistry,
    /// Skip suggestion evaluation entirely.
    pub skip_suggestions: bool,
}

impl<'a> ScoreOptions<'a> {
    pub fn new(config: &'a ScoreConfig, layout: &'a dyn Layout, predicates: &'a PredicateRegistry) -> Self {
        Self { config, layout, predicates, skip_suggestions: false }
    }
}

/// What a penalty was charged for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProblemKind {
    /// Long text blocks without any inline anchor.
    DenseParagraph,
    /// Technical content outside code formatting.
    UnformattedCode,
}

impl ProblemKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::DenseParagraph => "Dense paragraphs",
            Self::UnformattedCode => "Unformatted code",
        }
    }
}

/// A penalty source with its share of the deduction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Problem {
    #[serde(rename = "type")]
    pub kind: ProblemKind,
    pub count: usize,
    pub penalty: f64,
}

/// Individual score components.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Breakdown {
    pub anchors: AnchorBreakdown,
    pub anchor_ratio: f64,
    pub ratio_score: f64,
    pub problem_blocks: usize,
    pub problem_penalty: f64,
    pub unformatted_count: usize,
    pub unformatted_penalty: f64,
    pub heading_bonus: f64,
    pub image_bonus: f64,
    pub code_bonus: f64,
    pub unformatted_matches: Vec<AntiPatternMatch>,
}

/// Result of one scoring pass. Plain data; safe to serialize.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    /// 0 to 100.
    pub score: u32,
    pub total_text_blocks: usize,
    pub total_anchors_raw: usize,
    pub weighted_total: f64,
    pub breakdown: Breakdown,
    pub problems: Vec<Problem>,
    pub suggestions: Vec<TriggeredSuggestion>,
    /// Milliseconds since the Unix epoch.
    pub timestamp: u64,
    pub preset_id: String,
}

impl AnalysisResult {
    /// Equal in everything but the timestamp.
    pub fn same_analysis(&self, other: &Self) -> bool {
        Self { timestamp: other.timestamp, ..self.clone() } == *other
    }
}

/// Scores `root` with explicit text-block, code-block and ignore matchers.
pub fn score(
    root: Element<'_>, preset: &Preset, text_blocks: &Matcher, code_blocks: &Matcher, ignore: &[Matcher],
    options: ScoreOptions<'_>,
) -> AnalysisResult {
    let config = options.config;
    let anchors = classify(root, preset, ignore);

    let area = content_area(root, &preset.matchers.content_area);
    let blocks: Vec<Element<'_>> =
        text_blocks.find_all(area).into_iter().filter(|el| !is_ignored(el, ignore)).collect();
    let total_text_blocks = blocks.len();

    let problem_blocks = blocks
        .iter()
        .filter(|block| !has_inline_anchor(block, preset, code_blocks))
        .filter(|block| options.layout.line_count(block) > config.line_threshold)
        .count();

    let unformatted_matches =
        AntiPatternDetector::new(&preset.analysis.anti_patterns).detect(root, preset, text_blocks, ignore);

    let mut breakdown = Breakdown {
        problem_blocks,
        unformatted_count: unformatted_matches.len(),
        unformatted_matches,
        ..Default::default()
    };

    let score = if total_text_blocks == 0 {
        100
    } else {
        let blocks = total_text_blocks as f64;

        breakdown.anchor_ratio = anchors.weighted_total / blocks;
        breakdown.ratio_score =
            ((breakdown.anchor_ratio / config.ideal_ratio) * config.max_ratio_score).min(config.max_ratio_score);
        breakdown.problem_penalty =
            ((problem_blocks as f64 / blocks) * config.problem_penalty_scale).min(config.max_problem_penalty).round();
        breakdown.unformatted_penalty = (breakdown.unformatted_count as f64 * config.unformatted_penalty_per_match)
            .min(config.max_unformatted_penalty);
        breakdown.heading_bonus =
            (anchors.headings.weight * config.heading_bonus_per_weight).min(config.max_heading_bonus);
        breakdown.image_bonus = (anchors.images.weight * config.image_bonus_per_weight).min(config.max_image_bonus);
        breakdown.code_bonus =
            (anchors.code_blocks.weight * config.code_bonus_per_weight).min(config.max_code_bonus);

        let raw = breakdown.ratio_score - breakdown.problem_penalty - breakdown.unformatted_penalty
            + breakdown.heading_bonus
            + breakdown.image_bonus
            + breakdown.code_bonus;

        if raw.is_finite() { raw.clamp(0.0, 100.0).round() as u32 } else { 0 }
    };

    let problems = if total_text_blocks == 0 {
        Vec::new()
    } else {
        [
            Problem { kind: ProblemKind::DenseParagraph, count: problem_blocks, penalty: breakdown.problem_penalty },
            Problem {
                kind: ProblemKind::UnformattedCode,
                count: breakdown.unformatted_count,
                penalty: breakdown.unformatted_penalty,
            },
        ]
        .into_iter()
        .filter(|problem| problem.penalty > 0.0)
        .collect()
    };

    let suggestions = if options.skip_suggestions {
        Vec::new()
    } else {
        evaluate_suggestions(root, &preset.analysis.suggestions, options.predicates)
    };

    tracing::debug!(
        preset = %preset.id,
        score,
        text_blocks = total_text_blocks,
        problem_blocks,
        unformatted = breakdown.unformatted_count,
        suggestions = suggestions.len(),
        "scored document"
    );

    AnalysisResult {
        score,
        total_text_blocks,
        total_anchors_raw: anchors.total_raw,
        weighted_total: anchors.weighted_total,
        breakdown: Breakdown { anchors, ..breakdown },
        problems,
        suggestions,
        timestamp: now_millis(),
        preset_id: preset.id.clone(),
    }
}

/// Scores `root` with the preset's own matchers.
pub fn score_document(root: Element<'_>, preset: &Preset, options: ScoreOptions<'_>) -> AnalysisResult {
    let matchers = &preset.matchers;
    score(root, preset, &matchers.text_blocks, &matchers.anchors.code_blocks, &matchers.ignore_matchers, options)
}

/// Scores `root` with default tuning, the headless layout estimator and the built-in predicates.
pub fn score_with_defaults(root: Element<'_>, preset: &Preset) -> AnalysisResult {
    let config = ScoreConfig::default();
    let layout = LayoutEstimator::default();
    let predicates = PredicateRegistry::default();
    score_document(root, preset, ScoreOptions::new(&config, &layout, &predicates))
}

/// True when a block holds emphasis, code, a link or an image.
fn has_inline_anchor(block: &Element<'_>, preset: &Preset, code_blocks: &Matcher) -> bool {
    let anchors = &preset.matchers.anchors;
    let qualifying = [&anchors.emphasis, &anchors.inline_code, code_blocks, &anchors.links, &anchors.images];
    qualifying.iter().any(|matcher| matcher.any_under(*block))
}

fn now_millis() -> u64 {
    u64::try_from(OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000).unwrap_or_default()
}
