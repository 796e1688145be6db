//! Crossing detection between two playback times.

/// Direction of travel through a clip during one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackDirection {
    Forward,
    Reverse,
}

impl PlaybackDirection {
    /// Signed speed wins when nonzero, otherwise the sign of `curr - prev`.
    #[must_use]
    pub fn infer(prev: f32, curr: f32, speed: f32) -> Self {
        if speed > 0.0 {
            Self::Forward
        } else if speed < 0.0 {
            Self::Reverse
        } else if curr >= prev {
            Self::Forward
        } else {
            Self::Reverse
        }
    }
}

/// The time window swept by one tick of playback.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeWindow {
    pub prev: f32,
    pub curr: f32,
    pub duration: f32,
    pub looping: bool,
    pub direction: PlaybackDirection,
}

impl TimeWindow {
    /// Whether `trigger` was passed when going from `prev` to `curr`.
    ///
    /// Forward windows are open at `prev` and closed at `curr`; reverse
    /// windows mirror that. A looping window that wrapped is split into the
    /// tail of the old pass and the head of the new one.
    #[must_use]
    pub fn crossed(&self, trigger: f32) -> bool {
        let Self {
            prev,
            curr,
            duration,
            looping,
            direction,
        } = *self;

        match direction {
            PlaybackDirection::Forward => {
                if looping && curr < prev {
                    (prev < trigger && trigger <= duration) || (0.0 <= trigger && trigger <= curr)
                } else {
                    prev < trigger && trigger <= curr
                }
            }
            PlaybackDirection::Reverse => {
                if looping && curr > prev {
                    (0.0 <= trigger && trigger < prev) || (curr <= trigger && trigger <= duration)
                } else {
                    prev > trigger && trigger >= curr
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn forward(prev: f32, curr: f32, looping: bool) -> TimeWindow {
        TimeWindow {
            prev,
            curr,
            duration: 1.2,
            looping,
            direction: PlaybackDirection::Forward,
        }
    }

    fn reverse(prev: f32, curr: f32, looping: bool) -> TimeWindow {
        TimeWindow {
            direction: PlaybackDirection::Reverse,
            ..forward(prev, curr, looping)
        }
    }

    #[test]
    fn forward_window_is_half_open() {
        let w = forward(0.5, 0.58, true);
        assert!(w.crossed(0.55));
        assert!(w.crossed(0.58));
        assert!(!w.crossed(0.5));
        assert!(!w.crossed(0.6));
    }

    #[test]
    fn forward_wrap_covers_tail_and_head() {
        let w = forward(1.15, 0.05, true);
        assert!(w.crossed(1.18));
        assert!(w.crossed(0.0));
        assert!(w.crossed(0.05));
        assert!(!w.crossed(0.55));
        assert!(!w.crossed(1.15));
    }

    #[test]
    fn reverse_window_mirrors_forward() {
        let w = reverse(0.6, 0.5, false);
        assert!(w.crossed(0.55));
        assert!(w.crossed(0.5));
        assert!(!w.crossed(0.6));
    }

    #[test]
    fn reverse_wrap_covers_head_and_tail() {
        let w = reverse(0.05, 1.15, true);
        assert!(w.crossed(0.02));
        assert!(w.crossed(1.18));
        assert!(w.crossed(1.15));
        assert!(!w.crossed(0.05));
        assert!(!w.crossed(0.55));
    }

    #[test]
    fn non_looping_never_wraps() {
        // a clamped one-shot cannot go backwards while playing forward
        let w = forward(1.0, 0.2, false);
        assert!(!w.crossed(0.5));
        assert!(!w.crossed(1.1));
    }

    #[test]
    fn direction_prefers_speed_sign() {
        assert_eq!(PlaybackDirection::infer(0.2, 0.1, 1.0), PlaybackDirection::Forward);
        assert_eq!(PlaybackDirection::infer(0.1, 0.2, -1.0), PlaybackDirection::Reverse);
        assert_eq!(PlaybackDirection::infer(0.1, 0.1, 0.0), PlaybackDirection::Forward);
        assert_eq!(PlaybackDirection::infer(0.2, 0.1, 0.0), PlaybackDirection::Reverse);
    }
}
