//! Teacher and room conflict detection.
//!
//! Answers one question: would a tentative assignment at a target span
//! collide with anything already on the grid for that day? The scan is
//! pure and never mutates the grid.
//!
//! # Algorithm
//! For every row of the day and every column of the row:
//! 1. Resolve the cell's data (continuations take their anchor's data)
//!    and skip it if it has no course, teacher or room.
//! 2. Take the effective span: the merge descriptor if present, else the
//!    single column.
//! 3. Skip the cell being edited: same row and same effective start.
//! 4. On overlap with the target span, compare teacher and room.
//!
//! An anchor and its continuations yield identical messages; messages are
//! de-duplicated by text, keeping first-seen order.
//!
//! # Complexity
//! O(r * c) for r rows and c columns of the day.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::{is_teacher_code, Day, Grid, SlotSpan, TimeSlotTable};

/// Teacher and room a write would occupy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tentative {
    /// Teacher short code of record.
    pub teacher_short: Option<String>,
    /// Room name.
    pub room: Option<String>,
}

impl Tentative {
    /// Creates an assignment with neither teacher nor room.
    pub fn new() -> Self {
        Self::default()
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

    /// Teacher to match, ignoring blank codes and the not-specific marker.
    pub fn teacher(&self) -> Option<&str> {
        self.teacher_short.as_deref().filter(|s| is_teacher_code(s))
    }

    /// Room to match, ignoring blank names.
    pub fn room(&self) -> Option<&str> {
        self.room.as_deref().filter(|s| !s.is_empty())
    }

    /// Whether there is nothing that could conflict.
    pub fn is_empty(&self) -> bool {
        self.teacher().is_none() && self.room().is_none()
    }
}

/// Human-readable conflicts, split by resource.
///
/// An empty report means the write is safe.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConflictReport {
    pub teacher_conflicts: Vec<String>,
    pub room_conflicts: Vec<String>,
}

impl ConflictReport {
    /// Whether no conflicts were found.
    pub fn is_empty(&self) -> bool {
        self.teacher_conflicts.is_empty() && self.room_conflicts.is_empty()
    }

    /// Total number of messages.
    pub fn len(&self) -> usize {
        self.teacher_conflicts.len() + self.room_conflicts.len()
    }

    /// Teacher messages followed by room messages.
    pub fn messages(&self) -> impl Iterator<Item = &str> {
        self.teacher_conflicts
            .iter()
            .chain(&self.room_conflicts)
            .map(String::as_str)
    }
}

impl fmt::Display for ConflictReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Conflicts detected:")?;
        for msg in self.messages() {
            write!(f, "\n{msg}")?;
        }
        Ok(())
    }
}

/// Conflict scanner bound to a time-slot label table.
///
/// The table only affects message text; it must be the same table the
/// grid is rendered with.
#[derive(Debug, Clone, Copy)]
pub struct ConflictDetector<'a> {
    slots: &'a TimeSlotTable,
}

impl<'a> ConflictDetector<'a> {
    /// Creates a detector using the given label table.
    pub fn new(slots: &'a TimeSlotTable) -> Self {
        Self { slots }
    }

    /// Scans `day` for cells colliding with `tentative` placed at
    /// (`row`, `target`).
    pub fn check(
        &self,
        grid: &Grid,
        day: Day,
        row: usize,
        target: SlotSpan,
        tentative: &Tentative,
    ) -> ConflictReport {
        let mut report = ConflictReport::default();
        let (teacher, room) = (tentative.teacher(), tentative.room());
        if teacher.is_none() && room.is_none() {
            return report;
        }

        for (row_idx, cells) in grid.rows(day).iter().enumerate() {
            for (column, cell) in cells.iter().enumerate() {
                let Some(data) = grid.resolve(day, row_idx, column) else {
                    continue;
                };
                if !data.has_content() {
                    continue;
                }

                let span = cell.effective_span(column);
                // Identity is by coordinates: edits always target the anchor.
                if row_idx == row && span.start == target.start {
                    continue;
                }
                if !target.overlaps(&span) {
                    continue;
                }

                let batch = row_idx + 1;
                let time = self.slots.range_label(span);
                if let Some(t) = teacher {
                    if data.teacher_short.as_deref() == Some(t) {
                        push_unique(
                            &mut report.teacher_conflicts,
                            format!("Teacher {t} is already assigned to Batch {batch} at {day}, {time}"),
                        );
                    }
                }
                if let Some(r) = room {
                    if data.room.as_deref() == Some(r) {
                        push_unique(
                            &mut report.room_conflicts,
                            format!("Room {r} is already occupied by Batch {batch} at {day}, {time}"),
                        );
                    }
                }
            }
        }

        report
    }
}

/// Checks a tentative assignment using the reference label table.
///
/// Convenience over [`ConflictDetector::check`] for callers that do not
/// configure time slots.
pub fn check_conflicts(
    grid: &Grid,
    day: Day,
    row: usize,
    start_col: usize,
    colspan: usize,
    tentative: &Tentative,
) -> ConflictReport {
    let slots = TimeSlotTable::default();
    ConflictDetector::new(&slots).check(grid, day, row, SlotSpan::new(start_col, colspan), tentative)
}

fn push_unique(list: &mut Vec<String>, msg: String) {
    if !list.contains(&msg) {
        list.push(msg);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Cell, CellAddress, CellChange, Course, MergeSpan, NOT_SPECIFIC};

    fn courses() -> Vec<Course> {
        vec![
            Course::new("Batch 1", "CS101", "Programming").with_teacher("T1"),
            Course::new("Batch 2", "MA102", "Calculus").with_teacher("T9"),
            Course::new("Batch 2", "PH102", "Physics").with_teacher("T2"),
        ]
    }

    /// Saturday: row 0 has CS101/T1/R1 merged over columns 0-1;
    /// row 1 has MA102/T9/R9 at column 2.
    fn sample_grid() -> Grid {
        let slots = TimeSlotTable::default();
        let detector = ConflictDetector::new(&slots);
        let courses = courses();
        let mut g = Grid::with_rows(2);
        g.apply_cell_change(
            CellChange::new(
                CellAddress::new(Day::Saturday, 0, 0),
                Cell::new().with_course("CS101").with_teacher("T1").with_room("R1"),
            )
            .with_merge(),
            &courses,
            &detector,
        )
        .unwrap();
        g.apply_cell_change(
            CellChange::new(
                CellAddress::new(Day::Saturday, 1, 2),
                Cell::new().with_course("MA102").with_teacher("T9").with_room("R9"),
            ),
            &courses,
            &detector,
        )
        .unwrap();
        g
    }

    #[test]
    fn test_merged_block_conflict() {
        let g = sample_grid();
        let r = check_conflicts(&g, Day::Saturday, 1, 0, 1, &Tentative::new().with_teacher("T1"));
        assert_eq!(
            r.teacher_conflicts,
            vec!["Teacher T1 is already assigned to Batch 1 at saturday, 09:00-10:50"]
        );
        assert!(r.room_conflicts.is_empty());
    }

    #[test]
    fn test_overlap_on_continuation_column() {
        let g = sample_grid();
        let r = check_conflicts(&g, Day::Saturday, 1, 1, 1, &Tentative::new().with_room("R1"));
        assert!(r.teacher_conflicts.is_empty());
        assert_eq!(
            r.room_conflicts,
            vec!["Room R1 is already occupied by Batch 1 at saturday, 09:00-10:50"]
        );
    }

    #[test]
    fn test_teacher_and_room_together() {
        let g = sample_grid();
        let t = Tentative::new().with_teacher("T1").with_room("R1");
        let r = check_conflicts(&g, Day::Saturday, 1, 0, 2, &t);
        assert_eq!(r.teacher_conflicts.len(), 1);
        assert_eq!(r.room_conflicts.len(), 1);
        assert_eq!(r.len(), 2);
        assert_eq!(
            r.to_string(),
            "Conflicts detected:\n\
             Teacher T1 is already assigned to Batch 1 at saturday, 09:00-10:50\n\
             Room R1 is already occupied by Batch 1 at saturday, 09:00-10:50"
        );
    }

    #[test]
    fn test_self_edit_is_excluded() {
        let g = sample_grid();
        let t = Tentative::new().with_teacher("T9").with_room("R9");
        let r = check_conflicts(&g, Day::Saturday, 1, 2, 1, &t);
        assert!(r.is_empty());

        // Re-checking the merged anchor against its own content.
        let t = Tentative::new().with_teacher("T1").with_room("R1");
        assert!(check_conflicts(&g, Day::Saturday, 0, 0, 2, &t).is_empty());
        assert!(check_conflicts(&g, Day::Saturday, 0, 0, 1, &t).is_empty());
    }

    #[test]
    fn test_distinct_resources() {
        let g = sample_grid();
        let t = Tentative::new().with_teacher("T15").with_room("R15");
        assert!(check_conflicts(&g, Day::Saturday, 0, 2, 1, &t).is_empty());
    }

    #[test]
    fn test_no_overlap_when_adjacent() {
        let g = sample_grid();
        let t = Tentative::new().with_teacher("T1");
        assert!(check_conflicts(&g, Day::Saturday, 1, 2, 1, &t).is_empty());
    }

    #[test]
    fn test_other_day_is_ignored() {
        let g = sample_grid();
        let t = Tentative::new().with_teacher("T1").with_room("R1");
        assert!(check_conflicts(&g, Day::Sunday, 1, 0, 1, &t).is_empty());
    }

    #[test]
    fn test_not_specific_is_not_a_teacher() {
        let mut g = Grid::with_rows(2);
        let slots = TimeSlotTable::default();
        g.apply_cell_change(
            CellChange::new(
                CellAddress::new(Day::Monday, 0, 0),
                Cell::new().with_course("CS101").with_teacher(NOT_SPECIFIC),
            ),
            &courses(),
            &ConflictDetector::new(&slots),
        )
        .unwrap();
        let tentative = Tentative::new().with_teacher(NOT_SPECIFIC);
        assert_eq!(tentative.teacher(), None);
        assert!(tentative.is_empty());
        let report = check_conflicts(&g, Day::Monday, 1, 0, 1, &tentative);
        assert!(report.is_empty());
    }

    #[test]
    fn test_empty_tentative_short_circuits() {
        let g = sample_grid();
        for start in 0..8 {
            let r = check_conflicts(&g, Day::Saturday, 1, start, 1, &Tentative::new());
            assert!(r.is_empty());
        }
        let blank = Tentative::new().with_teacher("").with_room("");
        assert!(blank.is_empty());
        assert!(check_conflicts(&g, Day::Saturday, 1, 0, 1, &blank).is_empty());
    }

    #[test]
    fn test_symmetry() {
        let g = sample_grid();
        // A: T9 at row 0 columns 1-2 collides with B (row 1, column 2).
        let a = check_conflicts(&g, Day::Saturday, 0, 1, 2, &Tentative::new().with_teacher("T9"));
        assert_eq!(
            a.teacher_conflicts,
            vec!["Teacher T9 is already assigned to Batch 2 at saturday, 11:00-11:50"]
        );

        // Place A, then check B against it.
        let slots = TimeSlotTable::default();
        let detector = ConflictDetector::new(&slots);
        let mut g2 = Grid::with_rows(2);
        let mut courses = courses();
        courses.push(Course::new("Batch 1", "MA101", "Algebra").with_teacher("T9"));
        g2.apply_cell_change(
            CellChange::new(
                CellAddress::new(Day::Saturday, 0, 1),
                Cell::new().with_course("MA101").with_teacher("T9"),
            )
            .with_merge(),
            &courses,
            &detector,
        )
        .unwrap();
        let b = check_conflicts(&g2, Day::Saturday, 1, 2, 1, &Tentative::new().with_teacher("T9"));
        assert_eq!(
            b.teacher_conflicts,
            vec!["Teacher T9 is already assigned to Batch 1 at saturday, 10:00-11:50"]
        );
    }

    #[test]
    fn test_duplicate_messages_collapse() {
        // Continuation carries its own copy of the anchor's data.
        let mut g: Grid = serde_json::from_str(
            r#"{"grid":{"saturday":[[
                {"courseCode":"CS101","teacherShort":"T1","room":"R1","merged":{"startCol":0,"colspan":2}},
                {"courseCode":"CS101","teacherShort":"T1","room":"R1","merged":{"startCol":0,"colspan":2}}
            ],[]]},"mergedRanges":[{"day":"saturday","row":0,"startCol":0,"colspan":2}]}"#,
        )
        .unwrap();
        g.normalize(2);
        let t = Tentative::new().with_teacher("T1").with_room("R1");
        let r = check_conflicts(&g, Day::Saturday, 1, 0, 2, &t);
        assert_eq!(r.teacher_conflicts.len(), 1);
        assert_eq!(r.room_conflicts.len(), 1);
    }

    #[test]
    fn test_orphaned_continuation_data_is_shadowed() {
        let mut g: Grid = serde_json::from_str(
            r#"{"grid":{"saturday":[[
                {"courseCode":"CS101","teacherShort":"T1","merged":{"startCol":0,"colspan":2}},
                {"courseCode":"PH102","teacherShort":"T2","merged":{"startCol":0,"colspan":2}}
            ]]},"mergedRanges":[{"day":"saturday","row":0,"startCol":0,"colspan":2}]}"#,
        )
        .unwrap();
        g.normalize(2);
        assert_eq!(
            g.cell(Day::Saturday, 0, 1).unwrap().merged,
            Some(MergeSpan::new(0, 2))
        );
        let r = check_conflicts(&g, Day::Saturday, 1, 1, 1, &Tentative::new().with_teacher("T2"));
        assert!(r.is_empty());
    }

    #[test]
    fn test_custom_label_table() {
        let g = sample_grid();
        let slots = TimeSlotTable::new(
            (0..8).map(|i| format!("{:02}:00-{:02}:45", 8 + i, 8 + i)).collect(),
            4,
        );
        let r = ConflictDetector::new(&slots).check(
            &g,
            Day::Saturday,
            1,
            SlotSpan::single(0),
            &Tentative::new().with_teacher("T1"),
        );
        assert_eq!(
            r.teacher_conflicts,
            vec!["Teacher T1 is already assigned to Batch 1 at saturday, 08:00-09:45"]
        );
    }
}
