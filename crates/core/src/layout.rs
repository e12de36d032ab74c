//! Line-count estimation for text blocks.
//!
//! The engine never computes layout. A host that renders the document
//! implements [`Layout`] and reports real metrics; [`LayoutEstimator`] is the
//! fallback for headless use. It honours metrics the host declared as
//! `data-content-height`, `data-line-height` and `data-font-size` attributes
//! and otherwise estimates height from text length.

use crate::parse::Element;

/// Default font size in pixels used when nothing else is known.
pub const DEFAULT_FONT_SIZE: f64 = 16.0;

/// Multiplier applied to the font size when line height is `normal`.
pub const NORMAL_LINE_HEIGHT_FACTOR: f64 = 1.2;

/// Average characters per rendered line used by the text-length estimate.
pub const DEFAULT_CHARS_PER_LINE: usize = 80;

/// Rendered box metrics for one element, in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutMetrics {
    /// Height of the content box.
    pub content_height: f64,
    /// Computed line height, if the host resolved one.
    pub line_height: Option<f64>,
    /// Computed font size, if known.
    pub font_size: Option<f64>,
}

impl LayoutMetrics {
    /// Line height after resolution: explicit value, else `font_size × 1.2`, else `fallback`.
    pub fn resolved_line_height(&self, fallback: f64) -> f64 {
        self.line_height
            .filter(|lh| lh.is_finite() && *lh > 0.0)
            .or_else(|| {
                self.font_size
                    .filter(|fs| fs.is_finite() && *fs > 0.0)
                    .map(|fs| fs * NORMAL_LINE_HEIGHT_FACTOR)
            })
            .unwrap_or(fallback)
    }

    /// `max(1, round(content_height / line_height))`.
    pub fn line_count(&self, fallback_line_height: f64) -> usize {
        let line_height = self.resolved_line_height(fallback_line_height);
        if !self.content_height.is_finite() || line_height <= 0.0 {
            return 1;
        }
        ((self.content_height / line_height).round() as usize).max(1)
    }
}

/// Source of layout metrics for elements of the content tree.
pub trait Layout {
    /// Metrics for `element`, or `None` when they cannot be determined.
    fn metrics(&self, element: &Element<'_>) -> Option<LayoutMetrics>;

    /// Line height used when the metrics don't resolve one.
    fn fallback_line_height(&self) -> f64 {
        DEFAULT_FONT_SIZE * NORMAL_LINE_HEIGHT_FACTOR
    }

    /// Estimated number of rendered lines; at least 1.
    fn line_count(&self, element: &Element<'_>) -> usize {
        self.metrics(element)
            .map(|m| m.line_count(self.fallback_line_height()))
            .unwrap_or(1)
    }
}

/// Headless [`Layout`]: declared attributes first, text length otherwise.
#[derive(Debug, Clone)]
pub struct LayoutEstimator {
    /// Characters that fit on one line.
    pub chars_per_line: usize,
    /// Font size assumed for undeclared elements.
    pub font_size: f64,
}

impl Default for LayoutEstimator {
    fn default() -> Self {
        Self { chars_per_line: DEFAULT_CHARS_PER_LINE, font_size: DEFAULT_FONT_SIZE }
    }
}

impl LayoutEstimator {
    pub fn with_chars_per_line(chars_per_line: usize) -> Self {
        Self { chars_per_line, ..Default::default() }
    }

    fn declared(element: &Element<'_>) -> Option<LayoutMetrics> {
        let content_height = parse_px(element.attr("data-content-height")?)?;
        Some(LayoutMetrics {
            content_height,
            line_height: element.attr("data-line-height").and_then(parse_px),
            font_size: element.attr("data-font-size").and_then(parse_px),
        })
    }

    fn estimated(&self, element: &Element<'_>) -> LayoutMetrics {
        let chars = element.normalized_text().chars().count();
        let per_line = self.chars_per_line.max(1);
        let lines = chars.div_ceil(per_line).max(1);
        let line_height = self.font_size * NORMAL_LINE_HEIGHT_FACTOR;

        LayoutMetrics { content_height: lines as f64 * line_height, line_height: Some(line_height), font_size: Some(self.font_size) }
    }
}

impl Layout for LayoutEstimator {
    fn metrics(&self, element: &Element<'_>) -> Option<LayoutMetrics> {
        Some(Self::declared(element).unwrap_or_else(|| self.estimated(element)))
    }

    fn fallback_line_height(&self) -> f64 {
        self.font_size * NORMAL_LINE_HEIGHT_FACTOR
    }
}

/// Parses `"24"`, `"24.5"` or `"24px"`.
pub(crate) fn parse_px(value: &str) -> Option<f64> {
    let value = value.trim();
    let number = value.strip_suffix("px").unwrap_or(value).trim();
    number.parse::<f64>().ok().filter(|n| n.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::Document;
    use rstest::rstest;

    #[rstest]
    #[case(Some(20.0), None, 120.0, 6)]
    #[case(None, Some(10.0), 120.0, 10)]
    #[case(None, None, 96.0, 5)]
    #[case(Some(20.0), None, 5.0, 1)]
    #[case(Some(20.0), None, 0.0, 1)]
    fn test_line_count(
        #[case] line_height: Option<f64>, #[case] font_size: Option<f64>, #[case] height: f64, #[case] expected: usize,
    ) {
        let metrics = LayoutMetrics { content_height: height, line_height, font_size };
        assert_eq!(metrics.line_count(19.2), expected);
    }

    #[test]
    fn test_declared_metrics_take_priority() {
        let doc = Document::parse(r#"<p data-content-height="200px" data-line-height="20">short</p>"#).unwrap();
        let p = doc.select("p").unwrap()[0];

        assert_eq!(LayoutEstimator::default().line_count(&p), 10);
    }

    #[test]
    fn test_estimate_from_text_length() {
        let html = format!("<p>{}</p>", "word ".repeat(100));
        let doc = Document::parse(&html).unwrap();
        let p = doc.select("p").unwrap()[0];

        // 499 characters at 80 per line
        assert_eq!(LayoutEstimator::default().line_count(&p), 7);
        assert_eq!(LayoutEstimator::with_chars_per_line(500).line_count(&p), 1);
    }

    #[test]
    fn test_empty_element_is_one_line() {
        let doc = Document::parse("<p></p>").unwrap();
        let p = doc.select("p").unwrap()[0];
        assert_eq!(LayoutEstimator::default().line_count(&p), 1);
    }

    #[test]
    fn test_parse_px() {
        assert_eq!(parse_px("24px"), Some(24.0));
        assert_eq!(parse_px(" 12.5 "), Some(12.5));
        assert_eq!(parse_px("auto"), None);
    }
}
