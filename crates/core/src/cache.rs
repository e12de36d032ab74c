//! Single-slot analysis cache.
//!
//! One document is analysed at a time, so only the latest result is kept. It
//! is reused while the document's [`Fingerprint`] is unchanged and the entry
//! is younger than the TTL.

use std::time::{Duration, Instant};

use crate::parse::Element;
use crate::scoring::AnalysisResult;

/// How long a cached result stays valid.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_millis(1000);

/// Coarse structural identity of an analysed region.
///
/// Same-length edits that keep the child count go unnoticed; the TTL bounds
/// how long such a stale result can be served.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint {
    pub child_count: usize,
    pub text_length: usize,
    pub preset_id: String,
}

impl Fingerprint {
    pub fn of(area: Element<'_>, preset_id: &str) -> Self {
        Self {
            child_count: area.child_elements().count(),
            text_length: area.normalized_text().chars().count(),
            preset_id: preset_id.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    fingerprint: Fingerprint,
    result: AnalysisResult,
    stored_at: Instant,
}

/// Holds at most one [`AnalysisResult`].
///
/// Reads and writes go through `&mut self`; share it across threads behind a
/// `Mutex` so compare-and-store stays atomic.
#[derive(Debug, Clone)]
pub struct AnalysisCache {
    ttl: Duration,
    entry: Option<CacheEntry>,
}

impl AnalysisCache {
    pub fn new() -> Self {
        Self::with_ttl(DEFAULT_CACHE_TTL)
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self { ttl, entry: None }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// The cached result if it is still valid for `fingerprint`.
    pub fn get(&self, fingerprint: &Fingerprint) -> Option<&AnalysisResult> {
        self.get_at(fingerprint, Instant::now())
    }

    fn get_at(&self, fingerprint: &Fingerprint, now: Instant) -> Option<&AnalysisResult> {
        self.entry
            .as_ref()
            .filter(|entry| entry.fingerprint == *fingerprint)
            .filter(|entry| now.saturating_duration_since(entry.stored_at) < self.ttl)
            .map(|entry| &entry.result)
    }

    /// Returns the cached result, or runs `compute` and caches its output.
    pub fn get_or_compute<F>(&mut self, fingerprint: Fingerprint, compute: F, force_refresh: bool) -> AnalysisResult
    where
        F: FnOnce() -> AnalysisResult,
    {
        self.get_or_compute_at(fingerprint, compute, force_refresh, Instant::now())
    }

    /// [`AnalysisCache::get_or_compute`] with an explicit clock reading.
    pub fn get_or_compute_at<F>(
        &mut self, fingerprint: Fingerprint, compute: F, force_refresh: bool, now: Instant,
    ) -> AnalysisResult
    where
        F: FnOnce() -> AnalysisResult,
    {
        if !force_refresh && let Some(result) = self.get_at(&fingerprint, now) {
            tracing::debug!(preset = %fingerprint.preset_id, "analysis cache hit");
            return result.clone();
        }

        tracing::debug!(preset = %fingerprint.preset_id, force_refresh, "analysis cache miss");
        let result = compute();
        self.entry = Some(CacheEntry { fingerprint, result: result.clone(), stored_at: now });
        result
    }

    pub fn invalidate(&mut self) {
        self.entry = None;
    }

    pub fn is_empty(&self) -> bool {
        self.entry.is_none()
    }
}

impl Default for AnalysisCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::Document;
    use crate::preset::base_preset;
    use crate::scoring::score_with_defaults;
    use std::cell::Cell;

    fn fingerprint(text_length: usize) -> Fingerprint {
        Fingerprint { child_count: 3, text_length, preset_id: "base".to_string() }
    }

    fn result(score: u32) -> AnalysisResult {
        let doc = Document::parse("<main><p>text</p></main>").unwrap();
        AnalysisResult { score, ..score_with_defaults(doc.root(), &base_preset()) }
    }

    #[test]
    fn test_hit_within_ttl() {
        let mut cache = AnalysisCache::new();
        let start = Instant::now();
        let calls = Cell::new(0);
        let compute = || {
            calls.set(calls.get() + 1);
            result(42)
        };

        cache.get_or_compute_at(fingerprint(10), compute, false, start);
        let second = cache.get_or_compute_at(fingerprint(10), compute, false, start + Duration::from_millis(999));

        assert_eq!(calls.get(), 1);
        assert_eq!(second.score, 42);
    }

    #[test]
    fn test_miss_after_ttl() {
        let mut cache = AnalysisCache::new();
        let start = Instant::now();

        cache.get_or_compute_at(fingerprint(10), || result(1), false, start);
        let later = cache.get_or_compute_at(fingerprint(10), || result(2), false, start + DEFAULT_CACHE_TTL);

        assert_eq!(later.score, 2);
    }

    #[test]
    fn test_miss_on_fingerprint_change() {
        let mut cache = AnalysisCache::new();
        let start = Instant::now();

        cache.get_or_compute_at(fingerprint(10), || result(1), false, start);
        assert_eq!(cache.get_or_compute_at(fingerprint(11), || result(2), false, start).score, 2);

        let other_preset = Fingerprint { preset_id: "github".to_string(), ..fingerprint(11) };
        assert_eq!(cache.get_or_compute_at(other_preset, || result(3), false, start).score, 3);
    }

    #[test]
    fn test_force_refresh_recomputes() {
        let mut cache = AnalysisCache::new();
        let start = Instant::now();

        cache.get_or_compute_at(fingerprint(10), || result(1), false, start);
        assert_eq!(cache.get_or_compute_at(fingerprint(10), || result(2), true, start).score, 2);
        assert_eq!(cache.get_or_compute_at(fingerprint(10), || result(3), false, start).score, 2);
    }

    #[test]
    fn test_invalidate_clears_slot() {
        let mut cache = AnalysisCache::new();
        cache.get_or_compute(fingerprint(10), || result(1), false);
        assert!(!cache.is_empty());

        cache.invalidate();
        assert!(cache.is_empty());
        assert!(cache.get(&fingerprint(10)).is_none());
    }

    #[test]
    fn test_fingerprint_of_area() {
        let doc = Document::parse("<main><p>Hello   world</p>\n<ul><li>x</li></ul></main>").unwrap();
        let main = doc.select("main").unwrap()[0];

        let fp = Fingerprint::of(main, "base");
        assert_eq!(fp.child_count, 2);
        assert_eq!(fp.text_length, "Hello world x".len());
        assert_eq!(fp.preset_id, "base");
    }
}
