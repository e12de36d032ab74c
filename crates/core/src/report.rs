//! Rendering of analysis results for people and programs.

use std::fmt::Write as _;

use serde::Serialize;

use crate::Result;
use crate::classify::CategoryCount;
use crate::scoring::AnalysisResult;

/// Output format for a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportFormat {
    /// Plain-text summary
    #[default]
    Text,
    /// Pretty-printed JSON
    Json,
    /// Single-line JSON
    JsonCompact,
}

/// Qualitative band of a score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum Rating {
    Poor,
    Fair,
    Good,
    Excellent,
}

impl Rating {
    pub fn from_score(score: u32) -> Self {
        match score {
            80.. => Self::Excellent,
            60..=79 => Self::Good,
            40..=59 => Self::Fair,
            _ => Self::Poor,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Excellent => "Excellent",
            Self::Good => "Good",
            Self::Fair => "Fair",
            Self::Poor => "Poor",
        }
    }
}

/// Options for the text report.
#[derive(Debug, Clone)]
pub struct TextReportConfig {
    /// Include the per-category anchor table
    pub include_anchors: bool,
    /// Include snippets of unformatted content
    pub include_findings: bool,
    /// Include triggered suggestions
    pub include_suggestions: bool,
}

impl Default for TextReportConfig {
    fn default() -> Self {
        Self { include_anchors: true, include_findings: true, include_suggestions: true }
    }
}

/// Renders `result` in `format`.
pub fn render(result: &AnalysisResult, format: ReportFormat) -> Result<String> {
    match format {
        ReportFormat::Text => Ok(to_text(result, &TextReportConfig::default())),
        ReportFormat::Json => to_json(result, true),
        ReportFormat::JsonCompact => to_json(result, false),
    }
}

/// Serializes `result` as JSON.
pub fn to_json(result: &AnalysisResult, pretty: bool) -> Result<String> {
    let json = if pretty { serde_json::to_string_pretty(result)? } else { serde_json::to_string(result)? };
    Ok(json)
}

/// Renders a plain-text summary of `result`.
pub fn to_text(result: &AnalysisResult, config: &TextReportConfig) -> String {
    let mut out = String::new();
    let rating = Rating::from_score(result.score);
    let breakdown = &result.breakdown;

    let _ = writeln!(out, "Scannability: {}/100 ({})", result.score, rating.label());
    let _ = writeln!(out, "Preset: {}", result.preset_id);
    let _ = writeln!(
        out,
        "Text blocks: {}  Anchors: {} (weighted {:.2})",
        result.total_text_blocks, result.total_anchors_raw, result.weighted_total
    );

    if result.total_text_blocks > 0 {
        let _ = writeln!(
            out,
            "Components: ratio {:.1}, headings +{:.1}, images +{:.1}, code +{:.1}, dense -{:.0}, unformatted -{:.0}",
            breakdown.ratio_score,
            breakdown.heading_bonus,
            breakdown.image_bonus,
            breakdown.code_bonus,
            breakdown.problem_penalty,
            breakdown.unformatted_penalty
        );
    }

    if config.include_anchors {
        let anchors = &breakdown.anchors;
        let rows: Vec<(&str, &CategoryCount)> = vec![
            ("headings", &anchors.headings),
            ("emphasis", &anchors.emphasis),
            ("code blocks", &anchors.code_blocks),
            ("inline code", &anchors.inline_code),
            ("lists", &anchors.lists),
            ("images", &anchors.images),
            ("standalone links", &anchors.standalone_links),
            ("inline links", &anchors.inline_links),
        ];

        out.push_str("\nAnchors\n");
        for (name, count) in rows.into_iter().chain(anchors.platform.iter().map(|(k, v)| (k.as_str(), v))) {
            if count.count > 0 {
                let _ = writeln!(out, "  {:<18} {:>4}  {:>6.2}", name, count.count, count.weight);
            }
        }
    }

    if !result.problems.is_empty() {
        out.push_str("\nProblems\n");
        for problem in &result.problems {
            let _ = writeln!(out, "  - {}: {} (-{:.0})", problem.kind.label(), problem.count, problem.penalty);
        }
    }

    if config.include_findings && !breakdown.unformatted_matches.is_empty() {
        out.push_str("\nUnformatted content\n");
        for finding in &breakdown.unformatted_matches {
            let _ = writeln!(out, "  - [{}] {}", finding.kind, finding.snippet);
        }
    }

    if config.include_suggestions && !result.suggestions.is_empty() {
        out.push_str("\nSuggestions\n");
        for suggestion in &result.suggestions {
            let _ = writeln!(out, "  - {}: {}", suggestion.name, suggestion.description);
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyze_html;
    use rstest::rstest;

    #[rstest]
    #[case(100, Rating::Excellent)]
    #[case(80, Rating::Excellent)]
    #[case(79, Rating::Good)]
    #[case(60, Rating::Good)]
    #[case(59, Rating::Fair)]
    #[case(40, Rating::Fair)]
    #[case(39, Rating::Poor)]
    #[case(0, Rating::Poor)]
    fn test_rating_bands(#[case] score: u32, #[case] rating: Rating) {
        assert_eq!(Rating::from_score(score), rating);
    }

    #[test]
    fn test_text_report_sections() {
        let result = analyze_html(
            "<main><h1>Setup</h1><p>Run curl -X POST https://api.example.com/v1/items to begin.</p></main>",
        )
        .unwrap();
        let text = to_text(&result, &TextReportConfig::default());

        assert!(text.starts_with(&format!("Scannability: {}/100", result.score)));
        assert!(text.contains("Preset: base"));
        assert!(text.contains("headings"));
        assert!(text.contains("Unformatted content"));
        assert!(text.contains("[command] Run curl"));
    }

    #[test]
    fn test_text_report_without_extras() {
        let result = analyze_html("<main><p>Hello there, plain words.</p></main>").unwrap();
        let config = TextReportConfig { include_anchors: false, include_findings: false, include_suggestions: false };
        let text = to_text(&result, &config);

        assert!(!text.contains("Anchors\n"));
        assert!(!text.contains("Suggestions"));
    }

    #[test]
    fn test_json_output() {
        let result = analyze_html("<main><h2>A</h2><p>b</p></main>").unwrap();

        let pretty = render(&result, ReportFormat::Json).unwrap();
        let compact = render(&result, ReportFormat::JsonCompact).unwrap();
        assert!(pretty.contains('\n'));
        assert!(!compact.contains('\n'));

        let parsed: serde_json::Value = serde_json::from_str(&compact).unwrap();
        assert_eq!(parsed["score"], result.score);
        assert_eq!(parsed["breakdown"]["anchors"]["headings"]["count"], 1);
        assert_eq!(parsed["presetId"], "base");
    }
}
