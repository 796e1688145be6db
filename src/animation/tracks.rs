use serde::{Deserialize, Serialize};

use crate::animation::values::Interpolatable;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum InterpolationMode {
    #[default]
    Linear,
    Step,
}

/// How far the cursor scans linearly before falling back to binary search.
const MAX_SCAN_OFFSET: usize = 3;

/// Last bracketing key index of one track, reused across ticks.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyframeCursor {
    pub last_index: usize,
}

/// Time-ordered keys for one channel. Times are in clip ticks.
///
/// A track may be empty: sampling then yields `None` and the caller falls
/// back to the bind pose for that channel.
#[derive(Debug, Clone, Default)]
pub struct KeyframeTrack<T: Interpolatable> {
    pub times: Vec<f32>,
    pub values: Vec<T>,
    pub interpolation: InterpolationMode,
}

impl<T: Interpolatable> KeyframeTrack<T> {
    #[must_use]
    pub fn new(times: Vec<f32>, values: Vec<T>, interpolation: InterpolationMode) -> Self {
        Self {
            times,
            values,
            interpolation,
        }
    }

    #[must_use]
    pub fn empty() -> Self {
        Self {
            times: Vec::new(),
            values: Vec::new(),
            interpolation: InterpolationMode::Linear,
        }
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.times.is_empty() || self.values.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.times.len().min(self.values.len())
    }

    #[must_use]
    pub fn last_time(&self) -> Option<f32> {
        self.times.last().copied()
    }

    /// Stateless sampling through binary search.
    #[must_use]
    pub fn sample(&self, time: f32) -> Option<T> {
        if self.is_empty() {
            return None;
        }
        let next_idx = self.times[..self.len()].partition_point(|&t| t <= time);
        let idx = next_idx.saturating_sub(1);
        Some(self.sample_at_frame(idx, time))
    }

    /// Sampling that starts from the cursor's last key and scans a few
    /// keys in the direction of travel. Sequential playback is O(1);
    /// large jumps fall back to binary search.
    pub fn sample_with_cursor(&self, time: f32, cursor: &mut KeyframeCursor) -> Option<T> {
        if self.is_empty() {
            return None;
        }

        let len = self.len();
        if len == 1 {
            return Some(self.values[0]);
        }

        let times = &self.times[..len];
        let i = cursor.last_index.min(len - 1);

        let found = if time >= times[i] {
            let mut res = None;
            for offset in 0..=MAX_SCAN_OFFSET {
                let idx = i + offset;
                if idx >= len - 1 {
                    if time >= times[len - 1] {
                        res = Some(len - 1);
                    }
                    break;
                }
                if time < times[idx + 1] {
                    res = Some(idx);
                    break;
                }
            }
            res
        } else {
            let mut res = None;
            for offset in 1..=MAX_SCAN_OFFSET {
                if i < offset {
                    break;
                }
                let idx = i - offset;
                if time >= times[idx] {
                    res = Some(idx);
                    break;
                }
            }
            res
        };

        let index = found.unwrap_or_else(|| times.partition_point(|&t| t <= time).saturating_sub(1));
        cursor.last_index = index;

        Some(self.sample_at_frame(index, time))
    }

    fn sample_at_frame(&self, index: usize, time: f32) -> T {
        let len = self.len();
        if index >= len - 1 {
            return self.values[len - 1];
        }

        let next_idx = index + 1;
        let t0 = self.times[index];
        let t1 = self.times[next_idx];
        let dt = t1 - t0;

        let t = if dt > 1e-6 { (time - t0) / dt } else { 0.0 };
        let t = t.clamp(0.0, 1.0);

        match self.interpolation {
            InterpolationMode::Step => self.values[index],
            InterpolationMode::Linear => {
                T::interpolate_linear(self.values[index], self.values[next_idx], t)
            }
        }
    }
}
