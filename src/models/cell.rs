//! Grid cell model.
//!
//! A cell is keyed by (day, batch row, column) and holds an optional
//! course, teacher and room, plus an optional merge descriptor.
//!
//! # Merge roles
//! - No descriptor: a single-column cell.
//! - Descriptor with `start_col == column`: the anchor of a merged block.
//! - Descriptor with `start_col < column`: a continuation absorbed into the
//!   block anchored earlier in the row. Continuations carry no data of
//!   their own; any leftover values are shadowed by the anchor.

use serde::{Deserialize, Serialize};

use super::{Day, SlotSpan};

/// Horizontal merge descriptor shared by an anchor and its continuations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeSpan {
    /// Column of the anchor cell.
    pub start_col: usize,
    /// Number of columns in the block.
    pub colspan: usize,
}

impl MergeSpan {
    /// Creates a new descriptor.
    pub fn new(start_col: usize, colspan: usize) -> Self {
        Self { start_col, colspan }
    }

    /// Columns covered by the block.
    pub fn span(&self) -> SlotSpan {
        SlotSpan::new(self.start_col, self.colspan)
    }
}

/// A cell of the weekly grid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cell {
    /// Scheduled course code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub course_code: Option<String>,
    /// Teacher short code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub teacher_short: Option<String>,
    /// Room name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room: Option<String>,
    /// Merge descriptor, if part of a merged block.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merged: Option<MergeSpan>,
}

/// Position of a cell relative to merged blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellRole {
    /// Not part of a merged block.
    Single,
    /// First column of a merged block.
    Anchor { colspan: usize },
    /// Absorbed into the block anchored at `start_col`.
    Continuation { start_col: usize },
}

/// Grid coordinates of a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellAddress {
    pub day: Day,
    pub row: usize,
    pub column: usize,
}

impl CellAddress {
    /// Creates a new address.
    pub fn new(day: Day, row: usize, column: usize) -> Self {
        Self { day, row, column }
    }
}

impl Cell {
    /// Creates an empty cell.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the course code.
    pub fn with_course(mut self, code: impl Into<String>) -> Self {
        self.course_code = Some(code.into());
        self
    }

    /// Sets the teacher short code.
    pub fn with_teacher(mut self, short: impl Into<String>) -> Self {
        self.teacher_short = Some(short.into());
        self
    }

    /// Sets the room.
    pub fn with_room(mut self, room: impl Into<String>) -> Self {
        self.room = Some(room.into());
        self
    }

    /// Sets the merge descriptor.
    pub fn with_merge(mut self, merge: MergeSpan) -> Self {
        self.merged = Some(merge);
        self
    }

    /// Whether the cell carries a course, teacher or room.
    pub fn has_content(&self) -> bool {
        self.course_code.is_some() || self.teacher_short.is_some() || self.room.is_some()
    }

    /// Whether the cell carries no data and no merge descriptor.
    pub fn is_empty(&self) -> bool {
        !self.has_content() && self.merged.is_none()
    }

    /// Role of this cell when stored at `column`.
    pub fn role(&self, column: usize) -> CellRole {
        match self.merged {
            None => CellRole::Single,
            Some(m) if m.start_col == column => CellRole::Anchor { colspan: m.colspan },
            Some(m) => CellRole::Continuation {
                start_col: m.start_col,
            },
        }
    }

    /// Columns this cell occupies when stored at `column`.
    ///
    /// An anchor and its continuations report the same span.
    pub fn effective_span(&self, column: usize) -> SlotSpan {
        match self.merged {
            Some(m) => m.span(),
            None => SlotSpan::single(column),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_builder() {
        let c = Cell::new()
            .with_course("CS101")
            .with_teacher("T1")
            .with_room("R1");
        assert_eq!(c.course_code.as_deref(), Some("CS101"));
        assert_eq!(c.teacher_short.as_deref(), Some("T1"));
        assert_eq!(c.room.as_deref(), Some("R1"));
        assert!(c.has_content());
        assert!(!c.is_empty());
    }

    #[test]
    fn test_empty_predicate() {
        assert!(Cell::new().is_empty());
        // A bare continuation has no content but is not empty.
        let cont = Cell::new().with_merge(MergeSpan::new(0, 2));
        assert!(!cont.has_content());
        assert!(!cont.is_empty());
    }

    #[test]
    fn test_roles() {
        let m = MergeSpan::new(2, 2);
        let anchor = Cell::new().with_course("X").with_merge(m);
        let cont = Cell::new().with_merge(m);
        assert_eq!(anchor.role(2), CellRole::Anchor { colspan: 2 });
        assert_eq!(cont.role(3), CellRole::Continuation { start_col: 2 });
        assert_eq!(Cell::new().role(5), CellRole::Single);
    }

    #[test]
    fn test_effective_span() {
        let m = MergeSpan::new(0, 2);
        let cont = Cell::new().with_merge(m);
        assert_eq!(cont.effective_span(1), SlotSpan::new(0, 2));
        assert_eq!(Cell::new().effective_span(6), SlotSpan::single(6));
    }

    #[test]
    fn test_serde_shape() {
        assert_eq!(serde_json::to_string(&Cell::new()).unwrap(), "{}");

        let c = Cell::new()
            .with_course("CS101")
            .with_merge(MergeSpan::new(0, 2));
        let json = serde_json::to_string(&c).unwrap();
        assert_eq!(
            json,
            r#"{"courseCode":"CS101","merged":{"startCol":0,"colspan":2}}"#
        );

        // Stored documents may carry an explicit null descriptor.
        let parsed: Cell = serde_json::from_str(r#"{"room":"R1","merged":null}"#).unwrap();
        assert_eq!(parsed, Cell::new().with_room("R1"));
    }
}
