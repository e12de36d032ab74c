use crate::matcher::Matcher;
use crate::preset::{
    AnalysisRules, AnchorMatchers, PartialAnalysisRules, PartialAnchorMatchers, PartialMatchers, PartialPreset,
    PartialWeights, Preset, PresetMatchers, Weights,
};

/// Fold `overlay` onto `base` and normalize the result.
///
/// - scalars: the overlay value when present, else the base value
/// - lists: base entries followed by overlay entries
/// - maps: merged key-wise, overlay entries winning
///
/// Never fails; the returned preset is fully populated.
pub fn merge_preset(base: &Preset, overlay: &PartialPreset) -> Preset {
    let merged = Preset {
        id: pick(&base.id, &overlay.id),
        name: pick(&base.name, &overlay.name),
        description: pick(&base.description, &overlay.description),
        domain_rules: concat(&base.domain_rules, &overlay.domain_rules),
        matchers: merge_matchers(&base.matchers, &overlay.matchers),
        analysis: merge_analysis(&base.analysis, &overlay.analysis),
    };

    normalize_preset(merged, base)
}

/// Repair anything a merge could leave unusable, using `base` as the fallback.
///
/// Blank matchers and negative or non-finite weights are replaced with the
/// base's values, so `normalize_preset(base.clone(), base) == base` for any
/// well-formed base.
pub fn normalize_preset(mut preset: Preset, base: &Preset) -> Preset {
    if preset.id.trim().is_empty() {
        preset.id = base.id.clone();
    }
    if preset.name.trim().is_empty() {
        preset.name = base.name.clone();
    }

    let m = &mut preset.matchers;
    let b = &base.matchers;
    fill_blank(&mut m.content_area, &b.content_area);
    fill_blank(&mut m.text_blocks, &b.text_blocks);
    fill_blank(&mut m.anchors.headings, &b.anchors.headings);
    fill_blank(&mut m.anchors.emphasis, &b.anchors.emphasis);
    fill_blank(&mut m.anchors.code_blocks, &b.anchors.code_blocks);
    fill_blank(&mut m.anchors.inline_code, &b.anchors.inline_code);
    fill_blank(&mut m.anchors.links, &b.anchors.links);
    fill_blank(&mut m.anchors.images, &b.anchors.images);
    fill_blank(&mut m.anchors.lists, &b.anchors.lists);
    m.platform_anchors.retain(|name, matcher| {
        let keep = !matcher.is_blank();
        if !keep {
            tracing::debug!(anchor = %name, "dropping platform anchor with blank matcher");
        }
        keep
    });
    m.ignore_matchers.retain(|matcher| !matcher.is_blank());

    let weights = &mut preset.analysis.weights;
    if !is_valid_weight(weights.default_platform_weight) {
        weights.default_platform_weight = base.analysis.weights.default_platform_weight.max(0.0);
    }
    for (key, value) in weights.categories.iter_mut() {
        if !is_valid_weight(*value) {
            let fallback = base.analysis.weights.get(key).filter(|w| is_valid_weight(*w)).unwrap_or(0.0);
            tracing::warn!(category = %key, weight = *value, fallback, "invalid weight replaced");
            *value = fallback;
        }
    }

    preset
}

fn merge_matchers(base: &PresetMatchers, overlay: &PartialMatchers) -> PresetMatchers {
    let mut platform_anchors = base.platform_anchors.clone();
    platform_anchors.extend(overlay.platform_anchors.iter().map(|(k, v)| (k.clone(), v.clone())));

    PresetMatchers {
        content_area: pick(&base.content_area, &overlay.content_area),
        text_blocks: pick(&base.text_blocks, &overlay.text_blocks),
        anchors: merge_anchors(&base.anchors, &overlay.anchors),
        platform_anchors,
        ignore_matchers: concat(&base.ignore_matchers, &overlay.ignore_matchers),
    }
}

fn merge_anchors(base: &AnchorMatchers, overlay: &PartialAnchorMatchers) -> AnchorMatchers {
    AnchorMatchers {
        headings: pick(&base.headings, &overlay.headings),
        emphasis: pick(&base.emphasis, &overlay.emphasis),
        code_blocks: pick(&base.code_blocks, &overlay.code_blocks),
        inline_code: pick(&base.inline_code, &overlay.inline_code),
        links: pick(&base.links, &overlay.links),
        images: pick(&base.images, &overlay.images),
        lists: pick(&base.lists, &overlay.lists),
    }
}

fn merge_analysis(base: &AnalysisRules, overlay: &PartialAnalysisRules) -> AnalysisRules {
    AnalysisRules {
        anti_patterns: concat(&base.anti_patterns, &overlay.anti_patterns),
        weights: merge_weights(&base.weights, &overlay.weights),
        suggestions: concat(&base.suggestions, &overlay.suggestions),
    }
}

fn merge_weights(base: &Weights, overlay: &PartialWeights) -> Weights {
    let mut categories = base.categories.clone();
    categories.extend(overlay.categories.iter().map(|(k, v)| (k.clone(), *v)));

    Weights { default_platform_weight: overlay.default_platform_weight.unwrap_or(base.default_platform_weight), categories }
}

fn pick<T: Clone>(base: &T, overlay: &Option<T>) -> T {
    overlay.as_ref().unwrap_or(base).clone()
}

fn concat<T: Clone>(base: &[T], overlay: &[T]) -> Vec<T> {
    base.iter().chain(overlay).cloned().collect()
}

fn fill_blank(target: &mut Matcher, fallback: &Matcher) {
    if target.is_blank() {
        *target = fallback.clone();
    }
}

fn is_valid_weight(weight: f64) -> bool {
    weight.is_finite() && weight >= 0.0
}
