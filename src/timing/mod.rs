//! Slide timing model.
//!
//! Turns the fractional `in`/`out` timestamps of the slide manifest into whole
//! second windows and pins the final window to the end of the recording.
//! Pure functions, no I/O.

use crate::error::{Error, Result};
use crate::session::ManifestEntry;

/// One slide's visible window, in whole seconds, and the image it shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlideSegment {
    time_in: u64,
    time_out: u64,
    source: String,
}

impl SlideSegment {
    pub fn new(time_in: u64, time_out: u64, source: impl Into<String>) -> Self {
        Self {
            time_in,
            time_out,
            source: source.into(),
        }
    }

    /// Build a segment from a raw manifest entry, rounding both bounds up.
    pub fn from_entry(entry: &ManifestEntry) -> Result<Self> {
        Ok(Self {
            time_in: ceil_seconds(entry.time_in)?,
            time_out: ceil_seconds(entry.time_out)?,
            source: entry.href.clone(),
        })
    }

    pub fn time_in(&self) -> u64 {
        self.time_in
    }

    pub fn time_out(&self) -> u64 {
        self.time_out
    }

    /// Image path relative to the presentation root.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Clip length in seconds. Zero when the manifest has the bounds reversed.
    pub fn duration_secs(&self) -> u64 {
        self.time_out.saturating_sub(self.time_in)
    }
}

/// Round a fractional timestamp up to the next whole second.
pub fn ceil_seconds(raw: f64) -> Result<u64> {
    if !raw.is_finite() || raw < 0.0 {
        return Err(Error::InvalidManifest(format!(
            "timestamp {raw} is not a non-negative number of seconds"
        )));
    }
    Ok(raw.ceil() as u64)
}

/// Whole seconds covered by a millisecond duration, rounded up.
pub fn duration_ms_to_secs(duration_ms: u64) -> u64 {
    duration_ms.div_ceil(1000)
}

/// Build segments from manifest entries in presentation order.
pub fn build_segments(entries: &[ManifestEntry]) -> Result<Vec<SlideSegment>> {
    entries.iter().map(SlideSegment::from_entry).collect()
}

/// Pin the last segment's end to the session duration.
///
/// The manifest's final `out` is often a presentation-level value rather than
/// the end of the recording, so it is replaced by `ceil(total_duration_ms / 1000)`.
/// All other segments are returned untouched, in the same order.
pub fn correct_segments(
    mut segments: Vec<SlideSegment>,
    total_duration_ms: u64,
) -> Result<Vec<SlideSegment>> {
    let last = segments
        .last_mut()
        .ok_or_else(|| Error::InvalidManifest("manifest contains no slides".to_string()))?;
    last.time_out = duration_ms_to_secs(total_duration_ms);
    Ok(segments)
}

/// Sum of all clip durations, i.e. the length of the merged video.
pub fn total_duration_secs(segments: &[SlideSegment]) -> u64 {
    segments.iter().map(SlideSegment::duration_secs).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn entry(time_in: f64, time_out: f64, href: &str) -> ManifestEntry {
        ManifestEntry {
            time_in,
            time_out,
            href: href.to_string(),
        }
    }

    #[test]
    fn test_two_slide_scenario() {
        let entries = vec![
            entry(0.2, 5.6, "presentation/a/slide-1.png"),
            entry(5.6, 12.1, "presentation/a/slide-2.png"),
        ];
        let segments = correct_segments(build_segments(&entries).unwrap(), 15000).unwrap();

        assert_eq!(
            segments,
            vec![
                SlideSegment::new(0, 6, "presentation/a/slide-1.png"),
                SlideSegment::new(6, 15, "presentation/a/slide-2.png"),
            ]
        );
    }

    #[test]
    fn test_single_slide_is_still_corrected() {
        let segments = vec![SlideSegment::new(0, 3, "slide-1.png")];
        let corrected = correct_segments(segments, 42_001).unwrap();
        assert_eq!(corrected[0].time_out(), 43);
        assert_eq!(corrected[0].time_in(), 0);
    }

    #[test]
    fn test_empty_manifest_is_rejected() {
        let err = correct_segments(Vec::new(), 1000).unwrap_err();
        assert!(matches!(err, Error::InvalidManifest(_)));
    }

    #[test]
    fn test_ceil_keeps_whole_seconds() {
        assert_eq!(ceil_seconds(0.0).unwrap(), 0);
        assert_eq!(ceil_seconds(7.0).unwrap(), 7);
        assert_eq!(ceil_seconds(7.0001).unwrap(), 8);
    }

    #[test]
    fn test_ceil_rejects_negative_and_nan() {
        assert!(ceil_seconds(-1.5).is_err());
        assert!(ceil_seconds(f64::NAN).is_err());
        assert!(ceil_seconds(f64::INFINITY).is_err());
    }

    #[test]
    fn test_duration_ms_rounds_up() {
        assert_eq!(duration_ms_to_secs(0), 0);
        assert_eq!(duration_ms_to_secs(1), 1);
        assert_eq!(duration_ms_to_secs(15000), 15);
        assert_eq!(duration_ms_to_secs(15001), 16);
    }

    #[test]
    fn test_reversed_bounds_give_zero_duration() {
        let segment = SlideSegment::new(10, 4, "slide.png");
        assert_eq!(segment.duration_secs(), 0);
    }

    #[test]
    fn test_total_duration() {
        let segments = vec![
            SlideSegment::new(0, 6, "a.png"),
            SlideSegment::new(6, 15, "b.png"),
        ];
        assert_eq!(total_duration_secs(&segments), 15);
    }

    proptest! {
        #[test]
        fn prop_ceil_is_smallest_integer_not_below(raw in 0.0f64..1.0e9) {
            let secs = ceil_seconds(raw).unwrap();
            prop_assert!(secs as f64 >= raw);
            prop_assert!((secs as f64) - raw < 1.0);
        }

        #[test]
        fn prop_only_last_segment_changes(
            bounds in prop::collection::vec((0u64..10_000, 0u64..10_000), 1..40),
            total_ms in 0u64..100_000_000,
        ) {
            let segments: Vec<SlideSegment> = bounds
                .iter()
                .enumerate()
                .map(|(i, (a, b))| SlideSegment::new(*a, *b, format!("slide-{i}.png")))
                .collect();
            let corrected = correct_segments(segments.clone(), total_ms).unwrap();

            prop_assert_eq!(corrected.len(), segments.len());
            let last = corrected.len() - 1;
            prop_assert_eq!(corrected[last].time_out(), total_ms.div_ceil(1000));
            prop_assert_eq!(corrected[last].time_in(), segments[last].time_in());
            prop_assert_eq!(&corrected[..last], &segments[..last]);
        }
    }
}
