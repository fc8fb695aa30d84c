use layerwalk_protocol::{Anchor, Directive};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, trace};

/// Display payload of a commentary interval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Commentary {
    /// Lines of text, shown joined by single spaces.
    pub text: Vec<String>,
    #[serde(default, alias = "position")]
    pub anchor: Anchor,
}

impl Commentary {
    pub fn joined_text(&self) -> String {
        self.text.join(" ")
    }
}

/// What a timed interval is for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IntervalKind {
    /// A span of animation with nothing to say.
    Phase,
    Commentary(Commentary),
}

/// A span of the walkthrough clock. `start == end` marks a point in time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeInterval {
    pub start: f64,
    pub end: f64,
    #[serde(flatten)]
    pub kind: IntervalKind,
}

impl TimeInterval {
    pub fn phase(start: f64, end: f64) -> Self {
        Self {
            start,
            end,
            kind: IntervalKind::Phase,
        }
    }

    pub fn commentary<S: Into<String>>(
        start: f64,
        end: f64,
        text: impl IntoIterator<Item = S>,
        anchor: Anchor,
    ) -> Self {
        Self {
            start,
            end,
            kind: IntervalKind::Commentary(Commentary {
                text: text.into_iter().map(Into::into).collect(),
                anchor,
            }),
        }
    }

    pub fn commentary_payload(&self) -> Option<&Commentary> {
        match &self.kind {
            IntervalKind::Commentary(c) => Some(c),
            IntervalKind::Phase => None,
        }
    }

    pub fn is_commentary(&self) -> bool {
        matches!(self.kind, IntervalKind::Commentary(_))
    }

    /// The popup directive for this interval, `None` for plain phases.
    pub fn directive(&self) -> Option<Directive> {
        self.commentary_payload()
            .map(|c| Directive::commentary(c.joined_text(), c.anchor, self.start))
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum TimelineError {
    #[error("phase length {0} must be finite and non-negative")]
    InvalidPhaseLength(f64),
    #[error("interval {index} has non-finite bounds")]
    NonFinite { index: usize },
    #[error("interval {index} starts at {start}, before zero")]
    NegativeStart { index: usize, start: f64 },
    #[error("interval {index} ends at {end}, before its start at {start}")]
    Inverted { index: usize, start: f64, end: f64 },
    #[error("interval {index} starts at {start}, before the previous interval at {previous}")]
    Unsorted {
        index: usize,
        start: f64,
        previous: f64,
    },
    #[error("commentary interval {index} has no text")]
    EmptyCommentary { index: usize },
}

/// Check the invariants the navigation searches rely on.
pub fn validate_times(times: &[TimeInterval]) -> Result<(), TimelineError> {
    let mut previous = f64::NEG_INFINITY;
    for (index, interval) in times.iter().enumerate() {
        let TimeInterval { start, end, .. } = *interval;
        if !start.is_finite() || !end.is_finite() {
            return Err(TimelineError::NonFinite { index });
        }
        if start < 0.0 {
            return Err(TimelineError::NegativeStart { index, start });
        }
        if end < start {
            return Err(TimelineError::Inverted { index, start, end });
        }
        if start < previous {
            return Err(TimelineError::Unsorted {
                index,
                start,
                previous,
            });
        }
        if interval
            .commentary_payload()
            .is_some_and(|c| c.text.is_empty())
        {
            return Err(TimelineError::EmptyCommentary { index });
        }
        previous = start;
    }
    Ok(())
}

/// First commentary interval starting at or after `time`.
///
/// `times` must be sorted by `start`.
pub fn query_active_commentary(times: &[TimeInterval], time: f64) -> Option<&TimeInterval> {
    let first = times.partition_point(|t| t.start < time);
    times[first..].iter().find(|t| t.is_commentary())
}

/// Start of the second-most-recent commentary interval strictly before
/// `time`, or `0.0` when fewer than two exist.
///
/// The most recent match is the commentary the clock is in (or has just
/// shown); skipping it makes "previous" move backwards even when sitting
/// right after a boundary.
pub fn previous_commentary_start(times: &[TimeInterval], time: f64) -> f64 {
    let before = times.partition_point(|t| t.start < time);
    times[..before]
        .iter()
        .rev()
        .filter(|t| t.is_commentary())
        .nth(1)
        .map_or(0.0, |t| t.start)
}

/// Directive for the commentary at or after `time`, falling back to the
/// "no commentary" directive.
pub fn directive_at(times: &[TimeInterval], time: f64) -> Directive {
    query_active_commentary(times, time)
        .and_then(TimeInterval::directive)
        .unwrap_or_else(Directive::fallback)
}

/// Playback state of a walkthrough: the timed intervals, the clock and the
/// play/pause flag.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Walkthrough {
    times: Vec<TimeInterval>,
    time: f64,
    phase_length: f64,
    running: bool,
}

impl Walkthrough {
    /// Build a paused walkthrough at time zero. Fails on unsorted or
    /// malformed intervals.
    pub fn new(times: Vec<TimeInterval>, phase_length: f64) -> Result<Self, TimelineError> {
        if !phase_length.is_finite() || phase_length < 0.0 {
            return Err(TimelineError::InvalidPhaseLength(phase_length));
        }
        validate_times(&times)?;
        Ok(Self {
            times,
            time: 0.0,
            phase_length,
            running: false,
        })
    }

    /// Intervals in ascending `start` order.
    pub fn times(&self) -> &[TimeInterval] {
        &self.times
    }

    /// Current clock position.
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Where autonomous playback stops.
    pub fn phase_length(&self) -> f64 {
        self.phase_length
    }

    /// Whether the per-frame tick advances the clock.
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Whether the clock has reached the end of the phase.
    pub fn is_at_end(&self) -> bool {
        self.time >= self.phase_length
    }

    /// Clock position as a fraction of the phase, for a timeline bar.
    pub fn progress(&self) -> f64 {
        if self.phase_length > 0.0 {
            (self.time / self.phase_length).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    /// Flip between playing and paused.
    pub fn toggle_running(&mut self) {
        self.running = !self.running;
        debug!(running = self.running, time = self.time, "toggled playback");
    }

    /// Play or pause explicitly.
    pub fn set_running(&mut self, running: bool) {
        self.running = running;
    }

    /// Move the clock to `time`, clamped to the phase. Non-finite values are
    /// ignored. Returns whether the clock moved.
    pub fn seek(&mut self, time: f64) -> bool {
        if !time.is_finite() {
            return false;
        }
        let before = self.time;
        self.time = time.clamp(0.0, self.phase_length);
        debug!(time = self.time, "seek");
        self.time != before
    }

    /// Advance the clock by `elapsed` while running.
    ///
    /// The clock never goes below zero. Reaching the end of the phase pins
    /// the clock there and pauses playback. Returns whether the clock moved.
    pub fn tick(&mut self, elapsed: f64) -> bool {
        if !self.running || !elapsed.is_finite() || elapsed == 0.0 {
            return false;
        }
        let before = self.time;
        self.time = (self.time + elapsed).max(0.0);
        if self.time >= self.phase_length {
            self.time = self.phase_length;
            self.running = false;
            debug!(time = self.time, "reached end of phase");
        }
        trace!(elapsed, time = self.time, "tick");
        self.time != before
    }

    /// Commentary at or after the current clock.
    pub fn active_commentary(&self) -> Option<&TimeInterval> {
        query_active_commentary(&self.times, self.time)
    }

    pub fn current_directive(&self) -> Directive {
        directive_at(&self.times, self.time)
    }

    pub(crate) fn set_time_unclamped(&mut self, time: f64) {
        self.time = time;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use layerwalk_protocol::NO_COMMENTARY_TEXT;

    fn abc() -> Vec<TimeInterval> {
        vec![
            TimeInterval::commentary(0.0, 5.0, ["A"], Anchor::TopLeft),
            TimeInterval::phase(5.0, 10.0),
            TimeInterval::commentary(10.0, 15.0, ["B"], Anchor::TopRight),
            TimeInterval::commentary(20.0, 25.0, ["C", "continued"], Anchor::BottomLeft),
        ]
    }

    #[test]
    fn query_finds_first_commentary_at_or_after() {
        let times = abc();
        let hit = query_active_commentary(&times, 12.0).and_then(TimeInterval::directive);
        assert_eq!(hit.map(|d| d.text), Some("C continued".to_string()));

        let exact = query_active_commentary(&times, 10.0).map(|t| t.start);
        assert_eq!(exact, Some(10.0));

        // Phase intervals are skipped.
        let after_a = query_active_commentary(&times, 1.0).map(|t| t.start);
        assert_eq!(after_a, Some(10.0));

        assert!(query_active_commentary(&times, 21.0).is_none());
    }

    #[test]
    fn query_is_idempotent() {
        let times = abc();
        assert_eq!(
            query_active_commentary(&times, 3.0),
            query_active_commentary(&times, 3.0)
        );
    }

    #[test]
    fn previous_commentary_skips_the_current_one() {
        let times = abc();
        assert!((previous_commentary_start(&times, 22.0) - 10.0).abs() < f64::EPSILON);
        assert!((previous_commentary_start(&times, 12.0) - 0.0).abs() < f64::EPSILON);
        // Strictly before: at t=20, C does not count.
        assert!((previous_commentary_start(&times, 20.0) - 0.0).abs() < f64::EPSILON);
        assert!((previous_commentary_start(&[], 50.0) - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn directive_falls_back() {
        let d = directive_at(&[], 0.0);
        assert!(d.is_fallback());
        assert_eq!(d.text, NO_COMMENTARY_TEXT);
        assert_eq!(d.anchor, Anchor::TopLeft);
    }

    #[test]
    fn rejects_unsorted_times() {
        let times = vec![TimeInterval::phase(5.0, 6.0), TimeInterval::phase(1.0, 2.0)];
        assert_eq!(
            Walkthrough::new(times, 10.0),
            Err(TimelineError::Unsorted {
                index: 1,
                start: 1.0,
                previous: 5.0
            })
        );
    }

    #[test]
    fn rejects_malformed_intervals() {
        assert!(matches!(
            validate_times(&[TimeInterval::phase(3.0, 1.0)]),
            Err(TimelineError::Inverted { index: 0, .. })
        ));
        assert!(matches!(
            validate_times(&[TimeInterval::phase(f64::NAN, 1.0)]),
            Err(TimelineError::NonFinite { index: 0 })
        ));
        let empty: [&str; 0] = [];
        assert!(matches!(
            validate_times(&[TimeInterval::commentary(0.0, 1.0, empty, Anchor::TopLeft)]),
            Err(TimelineError::EmptyCommentary { index: 0 })
        ));
        assert!(matches!(
            Walkthrough::new(vec![], -1.0),
            Err(TimelineError::InvalidPhaseLength(_))
        ));
    }

    #[test]
    fn point_markers_are_allowed() {
        let times = vec![
            TimeInterval::commentary(4.0, 4.0, ["mark"], Anchor::TopLeft),
            TimeInterval::phase(4.0, 8.0),
        ];
        assert!(Walkthrough::new(times, 10.0).is_ok());
    }

    #[test]
    fn tick_only_while_running() {
        let mut wt = Walkthrough::new(abc(), 30.0).unwrap();
        assert!(!wt.tick(1.0));
        wt.toggle_running();
        assert!(wt.tick(1.5));
        assert!((wt.time() - 1.5).abs() < f64::EPSILON);
    }

    #[test]
    fn tick_clamps_at_both_ends() {
        let mut wt = Walkthrough::new(abc(), 30.0).unwrap();
        wt.set_running(true);
        wt.tick(-5.0);
        assert_eq!(wt.time(), 0.0);
        wt.tick(100.0);
        assert_eq!(wt.time(), 30.0);
        assert!(!wt.is_running());
        assert!(wt.is_at_end());
    }

    #[test]
    fn seek_clamps_to_phase() {
        let mut wt = Walkthrough::new(abc(), 30.0).unwrap();
        assert!(wt.seek(45.0));
        assert_eq!(wt.time(), 30.0);
        assert!(wt.seek(-1.0));
        assert_eq!(wt.time(), 0.0);
        assert!(!wt.seek(f64::NAN));
        assert!(!wt.seek(0.0));
        assert_eq!(wt.time(), 0.0);
        assert!(wt.seek(15.0));
        assert!((wt.progress() - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn deserializes_tagged_intervals() {
        let json = r#"[
            { "start": 0, "end": 5, "kind": "commentary", "text": ["Hi"], "anchor": "bottom-right" },
            { "start": 5, "end": 9, "kind": "phase" },
            { "start": 9, "end": 9, "kind": "commentary", "text": ["There"], "position": "top-right" },
            { "start": 10, "end": 12, "kind": "commentary", "text": ["Default"] }
        ]"#;
        let times: Vec<TimeInterval> = serde_json::from_str(json).unwrap();
        assert_eq!(times.len(), 4);
        assert_eq!(
            times[0].commentary_payload().map(|c| c.anchor),
            Some(Anchor::BottomRight)
        );
        assert_eq!(times[1].kind, IntervalKind::Phase);
        assert_eq!(
            times[2].commentary_payload().map(|c| c.anchor),
            Some(Anchor::TopRight)
        );
        assert_eq!(
            times[3].commentary_payload().map(|c| c.anchor),
            Some(Anchor::TopLeft)
        );
    }
}
