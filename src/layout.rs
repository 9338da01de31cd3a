//! Read-only projection of a timetable for renderers.
//!
//! Turns the grid into the table a printer or screen draws: one block per
//! schedulable day with at least one active batch, one row per active
//! batch, and one [`SlotView`] per column. Positions stay aligned with
//! column indices; columns a renderer must not draw are [`SlotView::Covered`].
//!
//! The break column is emitted once, on the first body row, as a
//! [`SlotView::Break`] spanning every body row of the week.

use chrono::NaiveDate;
use serde::Serialize;

use crate::models::{is_teacher_code, Cell, CellRole, Day, SLOT_COUNT};
use crate::timetable::Timetable;

/// Text printed in the break column.
pub const BREAK_TEXT: &str = "Prayer & Lunch Break";

/// The projected week.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimetableView {
    pub university_name: String,
    pub department_name: String,
    pub effective_from: NaiveDate,
    /// Column header labels.
    pub headers: Vec<String>,
    pub days: Vec<DayView>,
    /// Body rows across all days.
    pub body_rows: usize,
}

/// One day block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayView {
    pub day: Day,
    /// Short label, e.g. `SAT`.
    pub label: String,
    pub rows: Vec<RowView>,
}

/// One batch row of a day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RowView {
    pub batch_index: usize,
    pub batch_name: String,
    /// Exactly [`SLOT_COUNT`] entries.
    pub slots: Vec<SlotView>,
}

/// What to draw at one column of a row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum SlotView {
    /// The break cell, spanning `row_span` body rows.
    Break { row_span: usize },
    /// Drawn by an earlier cell (merge continuation or break).
    Covered,
    /// A drawable cell.
    Cell {
        column: usize,
        colspan: usize,
        course_code: Option<String>,
        teacher_short: Option<String>,
        room: Option<String>,
        /// Compact text, see [`compact_text`].
        text: String,
        /// Taught by the highlighted teacher.
        highlighted: bool,
    },
}

impl SlotView {
    /// Whether a renderer draws anything for this slot.
    pub fn is_drawn(&self) -> bool {
        !matches!(self, SlotView::Covered)
    }
}

/// Projects a timetable with no highlight.
pub fn project(timetable: &Timetable) -> TimetableView {
    project_with_highlight(timetable, None)
}

/// Projects a timetable, flagging cells taught by `teacher`.
pub fn project_with_highlight(timetable: &Timetable, teacher: Option<&str>) -> TimetableView {
    let slots = timetable.time_slots();
    let active: Vec<(Day, Vec<usize>)> = Day::SCHEDULABLE
        .into_iter()
        .map(|day| (day, timetable.active_rows(day)))
        .filter(|(_, rows)| !rows.is_empty())
        .collect();
    let body_rows = active.iter().map(|(_, rows)| rows.len()).sum();

    let empty = Cell::new();
    let mut break_drawn = false;
    let mut days = Vec::with_capacity(active.len());
    for (day, rows) in active {
        let grid_rows = timetable.grid().rows(day);
        let mut row_views = Vec::with_capacity(rows.len());
        for row in rows {
            let cells = grid_rows.get(row);
            let mut out = Vec::with_capacity(SLOT_COUNT);
            for column in 0..SLOT_COUNT {
                if slots.is_break(column) {
                    if break_drawn {
                        out.push(SlotView::Covered);
                    } else {
                        break_drawn = true;
                        out.push(SlotView::Break { row_span: body_rows });
                    }
                    continue;
                }
                let cell = cells.and_then(|r| r.get(column)).unwrap_or(&empty);
                let colspan = match cell.role(column) {
                    CellRole::Continuation { .. } => {
                        out.push(SlotView::Covered);
                        continue;
                    }
                    CellRole::Anchor { colspan } => colspan.clamp(1, SLOT_COUNT - column),
                    CellRole::Single => 1,
                };
                let highlighted = teacher.is_some_and(|t| {
                    is_teacher_code(t) && cell.teacher_short.as_deref() == Some(t)
                });
                out.push(SlotView::Cell {
                    column,
                    colspan,
                    course_code: cell.course_code.clone(),
                    teacher_short: cell.teacher_short.clone(),
                    room: cell.room.clone(),
                    text: compact_text(cell),
                    highlighted,
                });
            }
            row_views.push(RowView {
                batch_index: row,
                batch_name: timetable
                    .batches()
                    .get(row)
                    .map(|b| b.name.clone())
                    .unwrap_or_default(),
                slots: out,
            });
        }
        days.push(DayView {
            day,
            label: day.abbreviation().to_string(),
            rows: row_views,
        });
    }

    TimetableView {
        university_name: timetable.university_name.clone(),
        department_name: timetable.department_name.clone(),
        effective_from: timetable.effective_from,
        headers: (0..SLOT_COUNT)
            .map(|c| slots.label(c).unwrap_or_default().to_string())
            .collect(),
        days,
        body_rows,
    }
}

/// `CODE (ROOM) SHORT`, with absent parts left out.
///
/// Empty when the cell has no course.
pub fn compact_text(cell: &Cell) -> String {
    let Some(code) = cell.course_code.as_deref().filter(|c| !c.is_empty()) else {
        return String::new();
    };
    let mut text = code.to_string();
    if let Some(room) = cell.room.as_deref().filter(|r| !r.is_empty()) {
        text.push_str(&format!(" ({room})"));
    }
    if let Some(short) = cell.teacher_short.as_deref().filter(|t| !t.is_empty()) {
        text.push(' ');
        text.push_str(short);
    }
    text
}

/// Course, teacher and room on separate lines.
pub fn full_text(cell: &Cell) -> Vec<String> {
    [&cell.course_code, &cell.teacher_short, &cell.room]
        .into_iter()
        .flatten()
        .filter(|s| !s.is_empty())
        .cloned()
        .collect()
}
