//! A single named range of negative error codes.

use serde::Serialize;

/// Named, strictly descending range of negative codes `[end, start]`.
///
/// Ranges count away from zero: `start` is the code closest to zero and
/// `end` the farthest. Bounds are not checked here; a `Registry` validates
/// its categories as a whole.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Category {
    name: &'static str,
    description: &'static str,
    start: i32,
    end: i32,
}

impl Category {
    pub const fn new(name: &'static str, description: &'static str, start: i32, end: i32) -> Self {
        Self {
            name,
            description,
            start,
            end,
        }
    }

    pub const fn name(&self) -> &'static str {
        self.name
    }

    pub const fn description(&self) -> &'static str {
        self.description
    }

    /// First code of the range (closest to zero).
    pub const fn start(&self) -> i32 {
        self.start
    }

    /// Last code of the range (farthest from zero).
    pub const fn end(&self) -> i32 {
        self.end
    }

    /// Whether `code` falls inside `[end, start]`.
    pub fn contains(&self, code: i32) -> bool {
        self.end <= code && code <= self.start
    }

    /// Number of codes owned by the category; zero when `end > start`.
    pub fn len(&self) -> u64 {
        if self.end > self.start {
            0
        } else {
            u64::from(self.start.abs_diff(self.end)) + 1
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The code `offset` steps below `start`, or `None` once past `end`.
    pub fn code_at(&self, offset: u32) -> Option<i32> {
        if u64::from(offset) >= self.len() {
            return None;
        }
        i32::try_from(i64::from(self.start) - i64::from(offset)).ok()
    }

    /// Codes in iteration order, from `start` down to `end`.
    pub fn codes(&self) -> impl Iterator<Item = i32> + use<> {
        (self.end..=self.start).rev()
    }

    /// Codes shared with `other`, as `(high, low)`, if the ranges intersect.
    pub(crate) fn shared_span(&self, other: &Category) -> Option<(i32, i32)> {
        if self.is_empty() || other.is_empty() {
            return None;
        }
        let high = self.start.min(other.start);
        let low = self.end.max(other.end);
        (low <= high).then_some((high, low))
    }
}
