//! Byte ranges into SQL source text.

use serde::{Deserialize, Serialize};

/// A half-open byte range `[start, end)` into the source text.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct Span {
    /// First byte of the range.
    pub start: usize,
    /// One past the last byte.
    pub end: usize,
}

impl Span {
    #[must_use]
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// An empty span located at `at`.
    #[must_use]
    pub const fn point(at: usize) -> Self {
        Self { start: at, end: at }
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// The smallest span covering both `self` and `other`.
    #[must_use]
    pub fn merge(self, other: Self) -> Self {
        Self {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    /// Whether `other` lies inside `self` (bounds inclusive).
    #[must_use]
    pub const fn contains(&self, other: Self) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// Whether `other` lies inside `self` and is not equal to it.
    #[must_use]
    pub const fn strictly_contains(&self, other: Self) -> bool {
        self.contains(other) && (self.start != other.start || self.end != other.end)
    }

    /// The text this span covers in `source`, or `""` when out of bounds.
    #[must_use]
    pub fn text<'s>(&self, source: &'s str) -> &'s str {
        source.get(self.start..self.end).unwrap_or("")
    }
}

impl std::fmt::Display for Span {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_covers_both() {
        let a = Span::new(4, 9);
        let b = Span::new(1, 6);
        assert_eq!(a.merge(b), Span::new(1, 9));
        assert_eq!(b.merge(a), Span::new(1, 9));
    }

    #[test]
    fn containment() {
        let outer = Span::new(10, 20);
        assert!(outer.contains(outer));
        assert!(!outer.strictly_contains(outer));
        assert!(outer.strictly_contains(Span::new(11, 20)));
        assert!(!outer.contains(Span::new(9, 12)));
    }

    #[test]
    fn text_slices_source() {
        let sql = "SELECT id FROM users";
        assert_eq!(Span::new(7, 9).text(sql), "id");
        assert_eq!(Span::new(40, 50).text(sql), "");
        assert!(Span::point(3).is_empty());
        assert_eq!(Span::new(2, 5).len(), 3);
    }
}
