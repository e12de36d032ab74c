//! Structural anchor classification.
//!
//! Counts headings, emphasis, code, lists, images, links and platform
//! anchors inside the content area and scales each count by its preset
//! weight. Ignored subtrees, decorative images and inline code inside code
//! blocks are left out.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::matcher::{Matcher, is_ignored};
use crate::parse::Element;
use crate::preset::{Preset, category};

/// Declared width or height below which an image is treated as decorative.
pub const MIN_CONTENT_IMAGE_SIZE: f64 = 32.0;

/// Extra characters a parent may hold beyond its link text for the link to stay standalone.
pub const STANDALONE_LINK_SLACK: usize = 10;

/// Same as [`STANDALONE_LINK_SLACK`] when the parent is a list item.
pub const LIST_ITEM_LINK_SLACK: usize = 15;

/// Name fragments that mark an image as decoration rather than content.
const DECORATIVE_IMAGE_MARKERS: [&str; 5] = ["avatar", "emoji", "favicon", "gravatar", "spacer"];

/// Count and weighted contribution of one category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryCount {
    pub count: usize,
    /// `count × per-item weight`.
    pub weight: f64,
}

impl CategoryCount {
    fn new(count: usize, unit_weight: f64) -> Self {
        Self { count, weight: count as f64 * unit_weight }
    }
}

/// Per-category anchor counts with their weighted totals.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnchorBreakdown {
    pub headings: CategoryCount,
    pub emphasis: CategoryCount,
    pub code_blocks: CategoryCount,
    pub inline_code: CategoryCount,
    pub lists: CategoryCount,
    pub images: CategoryCount,
    pub standalone_links: CategoryCount,
    pub inline_links: CategoryCount,
    /// Platform anchors by name.
    pub platform: BTreeMap<String, CategoryCount>,
    /// Σ count over every category.
    pub total_raw: usize,
    /// Σ weight over every category.
    pub weighted_total: f64,
}

impl AnchorBreakdown {
    /// Standalone and inline links combined.
    pub fn links(&self) -> CategoryCount {
        CategoryCount {
            count: self.standalone_links.count + self.inline_links.count,
            weight: self.standalone_links.weight + self.inline_links.weight,
        }
    }

    fn standard(&self) -> [&CategoryCount; 8] {
        [
            &self.headings,
            &self.emphasis,
            &self.code_blocks,
            &self.inline_code,
            &self.lists,
            &self.images,
            &self.standalone_links,
            &self.inline_links,
        ]
    }

    fn compute_totals(&mut self) {
        let all: Vec<CategoryCount> = self.standard().into_iter().chain(self.platform.values()).copied().collect();
        self.total_raw = all.iter().map(|c| c.count).sum();
        self.weighted_total = all.iter().map(|c| c.weight).sum();
    }
}

/// The region of `root` that is analysed: the first content-area match, or
/// `root` itself when it matches or nothing does.
pub fn content_area<'a>(root: Element<'a>, matcher: &Matcher) -> Element<'a> {
    if matcher.matches(&root) {
        return root;
    }
    matcher.find_first(root).unwrap_or(root)
}

/// Classifies the anchors under the preset's content area.
pub fn classify(root: Element<'_>, preset: &Preset, ignore: &[Matcher]) -> AnchorBreakdown {
    let area = content_area(root, &preset.matchers.content_area);
    let anchors = &preset.matchers.anchors;
    let weights = &preset.analysis.weights;

    let counted = |matcher: &Matcher| {
        let found: Vec<Element<'_>> = matcher.find_all(area).into_iter().filter(|el| !is_ignored(el, ignore)).collect();
        found
    };

    // Only the outermost block counts when code-block matches nest.
    let code_blocks: Vec<Element<'_>> = counted(&anchors.code_blocks)
        .into_iter()
        .filter(|el| !el.ancestors().any(|a| anchors.code_blocks.matches(&a)))
        .collect();

    let inline_code = counted(&anchors.inline_code)
        .into_iter()
        .filter(|el| !el.ancestors().any(|a| anchors.code_blocks.matches(&a)) && !anchors.code_blocks.matches(el))
        .count();

    let images = counted(&anchors.images).into_iter().filter(|el| !is_decorative_image(el)).count();

    let (standalone, inline): (Vec<Element<'_>>, Vec<Element<'_>>) =
        counted(&anchors.links).into_iter().partition(|el| is_standalone_link(el));

    let mut breakdown = AnchorBreakdown {
        headings: CategoryCount::new(counted(&anchors.headings).len(), weights.standard(category::HEADINGS)),
        emphasis: CategoryCount::new(counted(&anchors.emphasis).len(), weights.standard(category::EMPHASIS)),
        code_blocks: CategoryCount::new(code_blocks.len(), weights.standard(category::CODE_BLOCKS)),
        inline_code: CategoryCount::new(inline_code, weights.standard(category::INLINE_CODE)),
        lists: CategoryCount::new(counted(&anchors.lists).len(), weights.standard(category::LISTS)),
        images: CategoryCount::new(images, weights.standard(category::IMAGES)),
        standalone_links: CategoryCount::new(standalone.len(), weights.standard(category::STANDALONE_LINKS)),
        inline_links: CategoryCount::new(inline.len(), weights.standard(category::INLINE_LINKS)),
        platform: preset
            .matchers
            .platform_anchors
            .iter()
            .map(|(name, matcher)| {
                (name.clone(), CategoryCount::new(counted(matcher).len(), weights.platform_weight(name)))
            })
            .collect(),
        ..Default::default()
    };
    breakdown.compute_totals();

    tracing::debug!(
        headings = breakdown.headings.count,
        code_blocks = breakdown.code_blocks.count,
        images = breakdown.images.count,
        standalone_links = breakdown.standalone_links.count,
        inline_links = breakdown.inline_links.count,
        total_raw = breakdown.total_raw,
        weighted_total = breakdown.weighted_total,
        "classified anchors"
    );

    breakdown
}

/// True for avatars, emoji, favicons and images declared smaller than
/// [`MIN_CONTENT_IMAGE_SIZE`] in either dimension.
pub fn is_decorative_image(element: &Element<'_>) -> bool {
    let named_decorative = ["src", "class", "alt", "id"]
        .iter()
        .filter_map(|name| element.attr(name))
        .map(str::to_lowercase)
        .any(|value| DECORATIVE_IMAGE_MARKERS.iter().any(|marker| value.contains(marker)));

    if named_decorative {
        return true;
    }

    ["width", "height"]
        .iter()
        .filter_map(|name| element.attr(name))
        .filter_map(crate::layout::parse_px)
        .any(|size| size < MIN_CONTENT_IMAGE_SIZE)
}

/// A link is standalone when it makes up (nearly) all of its parent's text.
pub fn is_standalone_link(element: &Element<'_>) -> bool {
    let Some(parent) = element.parent() else {
        return true;
    };

    let link_len = element.normalized_text().chars().count();
    let parent_len = parent.normalized_text().chars().count();
    let slack = if parent.tag_name() == "li" { LIST_ITEM_LINK_SLACK } else { STANDALONE_LINK_SLACK };

    parent_len <= link_len + slack
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::Document;
    use crate::preset::base_preset;
    use rstest::rstest;

    fn classify_html(html: &str) -> AnchorBreakdown {
        let doc = Document::parse(html).unwrap();
        let preset = base_preset();
        classify(doc.root(), &preset, &preset.matchers.ignore_matchers)
    }

    fn first<'a>(doc: &'a Document, selector: &str) -> Element<'a> {
        doc.select(selector).unwrap()[0]
    }

    #[test]
    fn test_counts_standard_categories() {
        let breakdown = classify_html(
            r#"<main>
                <h1>Title</h1><h2>Section</h2>
                <p>Some <strong>bold</strong> and <em>italic</em> text with <code>x</code>.</p>
                <ul><li>one</li></ul>
                <pre><code>let a = 1;</code></pre>
            </main>"#,
        );

        assert_eq!(breakdown.headings.count, 2);
        assert_eq!(breakdown.emphasis.count, 2);
        assert_eq!(breakdown.inline_code.count, 1);
        assert_eq!(breakdown.code_blocks.count, 1);
        assert_eq!(breakdown.lists.count, 1);
        assert_eq!(breakdown.total_raw, 7);
    }

    #[test]
    fn test_inline_code_inside_code_block_not_double_counted() {
        let breakdown = classify_html("<main><pre><code>a</code><code>b</code></pre><p><code>c</code></p></main>");
        assert_eq!(breakdown.code_blocks.count, 1);
        assert_eq!(breakdown.inline_code.count, 1);
    }

    #[test]
    fn test_only_content_area_is_counted() {
        let breakdown = classify_html("<div><h1>Site</h1></div><main><h2>Article</h2></main>");
        assert_eq!(breakdown.headings.count, 1);
    }

    #[test]
    fn test_whole_document_without_content_area() {
        let breakdown = classify_html("<div><h1>Site</h1></div><section><h2>Article</h2></section>");
        assert_eq!(breakdown.headings.count, 2);
    }

    #[test]
    fn test_ignored_subtrees_excluded() {
        let breakdown = classify_html(
            r#"<main><nav><a href="/a">A</a><h2>Menu</h2></nav><div aria-hidden="true"><h2>Hidden</h2></div><h2>Real</h2></main>"#,
        );
        assert_eq!(breakdown.headings.count, 1);
        assert_eq!(breakdown.links().count, 0);
    }

    #[rstest]
    #[case(r#"<img src="/photos/diagram.png" alt="Architecture">"#, false)]
    #[case(r#"<img src="/u/123/avatar.png" alt="">"#, true)]
    #[case(r#"<img src="/x.png" class="Emoji">"#, true)]
    #[case(r#"<img src="/favicon.ico">"#, true)]
    #[case(r#"<img src="/x.png" width="16" height="400">"#, true)]
    #[case(r#"<img src="/x.png" width="640px" height="480px">"#, false)]
    #[case(r#"<img src="/x.png" height="31">"#, true)]
    fn test_decorative_images(#[case] html: &str, #[case] decorative: bool) {
        let doc = Document::parse(html).unwrap();
        assert_eq!(is_decorative_image(&first(&doc, "img")), decorative);
    }

    #[test]
    fn test_decorative_images_not_counted() {
        let breakdown = classify_html(
            r#"<main><img src="/chart.png"><img src="/avatar.png"><img src="/dot.gif" width="1" height="1"></main>"#,
        );
        assert_eq!(breakdown.images.count, 1);
    }

    #[test]
    fn test_link_alone_in_paragraph_is_standalone() {
        let doc = Document::parse(r#"<p><a href="/docs">Read the documentation</a></p>"#).unwrap();
        assert!(is_standalone_link(&first(&doc, "a")));
    }

    #[test]
    fn test_link_in_long_paragraph_is_inline() {
        let prose = "This paragraph talks about many things at length and only mentions the documentation in \
                     passing, surrounded by a lot of ordinary prose that has nothing to do with the link itself. ";
        let html = format!(r#"<p>{}<a href="/docs">Read the documentation</a> and more.</p>"#, prose);
        let doc = Document::parse(&html).unwrap();

        assert!(first(&doc, "p").normalized_text().chars().count() >= 200);
        assert!(!is_standalone_link(&first(&doc, "a")));
    }

    #[test]
    fn test_list_item_slack_is_wider() {
        // 12 extra characters: within the list-item slack, beyond the paragraph slack
        let doc = Document::parse(r#"<ul><li><a href="/x">Guide</a> (PDF, 2 MB)</li></ul><p><a href="/x">Guide</a> (PDF, 2 MB)</p>"#)
            .unwrap();
        let links = doc.select("a").unwrap();

        assert!(is_standalone_link(&links[0]));
        assert!(!is_standalone_link(&links[1]));
    }

    #[test]
    fn test_platform_anchors_weighted() {
        let doc = Document::parse("<main><table></table><aside>note</aside><blockquote>q</blockquote></main>").unwrap();
        let mut preset = base_preset();
        preset.matchers.platform_anchors.insert("broken".to_string(), Matcher::new("div[[["));

        let breakdown = classify(doc.root(), &preset, &[]);

        assert_eq!(breakdown.platform["tables"], CategoryCount { count: 1, weight: 1.0 });
        assert_eq!(breakdown.platform["callouts"].count, 2);
        assert_eq!(breakdown.platform["callouts"].weight, 2.0 * preset.analysis.weights.default_platform_weight);
        assert_eq!(breakdown.platform["broken"].count, 0);
    }

    #[test]
    fn test_weighted_total_is_sum_of_weights() {
        let breakdown = classify_html(r#"<main><h1>T</h1><p><a href="/a">only link</a></p><ul><li>x</li></ul></main>"#);
        let expected = breakdown.headings.weight + breakdown.standalone_links.weight + breakdown.lists.weight;

        assert_eq!(breakdown.total_raw, 3);
        assert!((breakdown.weighted_total - expected).abs() < 1e-9);
    }

    #[test]
    fn test_invalid_category_matcher_yields_zero() {
        let doc = Document::parse("<main><h1>T</h1><ul><li>x</li></ul></main>").unwrap();
        let mut preset = base_preset();
        preset.matchers.anchors.headings = Matcher::new("h1[[[");

        let breakdown = classify(doc.root(), &preset, &[]);
        assert_eq!(breakdown.headings.count, 0);
        assert_eq!(breakdown.lists.count, 1);
    }
}
