//! Time-slot columns and spans.
//!
//! A day has a fixed number of ordered columns. Column spans are
//! half-open: `[start, start + len)`. Column 4 is the reserved break;
//! it is never assignable but takes part in span arithmetic like any
//! other column.
//!
//! # Shared label table
//! Conflict messages and printed layouts both turn column indices into
//! clock ranges. They must use the same [`TimeSlotTable`], otherwise a
//! message can name a time that disagrees with the printed grid.

use serde::{Deserialize, Serialize};

/// Number of time-slot columns per day.
pub const SLOT_COUNT: usize = 8;

/// Index of the reserved break column.
pub const BREAK_COLUMN: usize = 4;

/// A half-open column interval `[start, start + len)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SlotSpan {
    /// First covered column.
    pub start: usize,
    /// Number of covered columns (at least 1 for real cells).
    pub len: usize,
}

impl SlotSpan {
    /// Creates a new span.
    pub fn new(start: usize, len: usize) -> Self {
        Self { start, len }
    }

    /// A single-column span.
    pub fn single(column: usize) -> Self {
        Self::new(column, 1)
    }

    /// One past the last covered column.
    #[inline]
    pub fn end(&self) -> usize {
        self.start.saturating_add(self.len)
    }

    /// Last covered column.
    #[inline]
    pub fn last(&self) -> usize {
        self.end().saturating_sub(1)
    }

    /// Whether a column falls within this span.
    #[inline]
    pub fn contains(&self, column: usize) -> bool {
        column >= self.start && column < self.end()
    }

    /// Whether two spans share at least one column.
    pub fn overlaps(&self, other: &Self) -> bool {
        self.start < other.end() && other.start < self.end()
    }
}

/// Ordered clock labels for the columns of a day.
///
/// Each label is `"HH:MM-HH:MM"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSlotTable {
    /// One label per column.
    pub labels: Vec<String>,
    /// Column rendered as the non-interactive break.
    pub break_column: usize,
}

impl Default for TimeSlotTable {
    fn default() -> Self {
        Self {
            labels: [
                "09:00-09:50",
                "10:00-10:50",
                "11:00-11:50",
                "12:00-12:50",
                "01:00-02:00",
                "02:00-02:50",
                "03:00-03:50",
                "04:00-04:50",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            break_column: BREAK_COLUMN,
        }
    }
}

impl TimeSlotTable {
    /// Creates a table from custom labels.
    pub fn new(labels: Vec<String>, break_column: usize) -> Self {
        Self {
            labels,
            break_column,
        }
    }

    /// Number of columns described by this table.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Whether the table has no columns.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Label of a single column.
    pub fn label(&self, column: usize) -> Option<&str> {
        self.labels.get(column).map(String::as_str)
    }

    /// Whether a column is the reserved break.
    pub fn is_break(&self, column: usize) -> bool {
        column == self.break_column
    }

    /// Clock range covered by a span.
    ///
    /// Runs from the start time of the first column to the end time of the
    /// last column. An endpoint outside the table is written as `slot N`
    /// (1-based).
    pub fn range_label(&self, span: SlotSpan) -> String {
        let start = self
            .label(span.start)
            .and_then(|l| l.split('-').next())
            .map(String::from)
            .unwrap_or_else(|| format!("slot {}", span.start + 1));
        let last = span.last();
        let end = self
            .label(last)
            .and_then(|l| l.split('-').nth(1))
            .map(String::from)
            .unwrap_or_else(|| format!("slot {}", last + 1));
        format!("{start}-{end}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_bounds() {
        let s = SlotSpan::new(2, 3);
        assert_eq!(s.end(), 5);
        assert_eq!(s.last(), 4);
        assert!(s.contains(2));
        assert!(s.contains(4));
        assert!(!s.contains(5)); // exclusive end
        assert!(!s.contains(1));
    }

    #[test]
    fn test_span_overlap() {
        let a = SlotSpan::new(0, 2);
        let b = SlotSpan::single(1);
        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));

        let c = SlotSpan::single(2); // adjacent, not overlapping
        assert!(!a.overlaps(&c));
        assert!(!c.overlaps(&a));
    }

    #[test]
    fn test_default_table() {
        let t = TimeSlotTable::default();
        assert_eq!(t.len(), SLOT_COUNT);
        assert!(t.is_break(4));
        assert!(!t.is_break(3));
        assert_eq!(t.label(0), Some("09:00-09:50"));
        assert_eq!(t.label(8), None);
    }

    #[test]
    fn test_range_label() {
        let t = TimeSlotTable::default();
        assert_eq!(t.range_label(SlotSpan::single(0)), "09:00-09:50");
        assert_eq!(t.range_label(SlotSpan::new(0, 2)), "09:00-10:50");
        assert_eq!(t.range_label(SlotSpan::new(5, 2)), "02:00-03:50");
    }

    #[test]
    fn test_range_label_outside_table() {
        let t = TimeSlotTable::default();
        assert_eq!(t.range_label(SlotSpan::new(7, 2)), "04:00-slot 9");
        assert_eq!(t.range_label(SlotSpan::single(10)), "slot 11-slot 11");
    }
}
