//! Editor session state.
//!
//! A [`Timetable`] owns everything one editing session works on: the
//! printed header, the reference lists collected during setup, the grid,
//! and the optional per-day selection of active batches. It is also the
//! unit of persistence; its JSON form is the stored document:
//!
//! ```text
//! { universityName, departmentName, effectiveFrom,
//!   batches, teachers, rooms, courses,
//!   grid, mergedRanges, activeBatchIndicesByDay? }
//! ```
//!
//! # Example
//!
//! ```
//! use chrono::NaiveDate;
//! use routine_grid::models::{Batch, CellAddress, CellChange, Course, Day, Room, Teacher};
//! use routine_grid::Timetable;
//!
//! let mut tt = Timetable::new("Test University", "CSE", NaiveDate::from_ymd_opt(2025, 1, 1).unwrap())
//!     .with_batches(vec![Batch::new("1st Year", 5), Batch::new("2nd Year", 5)])
//!     .with_teachers(vec![Teacher::new("DT", "Dr. Test")])
//!     .with_rooms(vec![Room::new("R1")])
//!     .with_courses(vec![Course::new("1st Year", "CSE101", "Programming").with_teacher("DT")]);
//!
//! let at = CellAddress::new(Day::Saturday, 0, 0);
//! let cell = tt.assignment(Some("CSE101"), Some("R1")).unwrap();
//! tt.apply_cell_change(CellChange::new(at, cell).with_merge()).unwrap();
//! assert_eq!(tt.grid().merged_ranges().len(), 1);
//! ```

use chrono::NaiveDate;
use log::info;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::conflict::{ConflictDetector, ConflictReport, Tentative};
use crate::error::{GridError, Result};
use crate::models::{
    find_course, Batch, Cell, CellAddress, CellChange, Course, Day, Grid, ResizeTarget, Room,
    SlotSpan, Teacher, TimeSlotTable, SLOT_COUNT,
};

/// The complete state of one weekly timetable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Timetable {
    /// University name for the printed header.
    #[serde(default)]
    pub university_name: String,
    /// Department name for the printed header.
    #[serde(default)]
    pub department_name: String,
    /// Date the timetable takes effect.
    pub effective_from: NaiveDate,
    /// Ordered batches; position is the row index.
    #[serde(default)]
    batches: Vec<Batch>,
    /// Teachers.
    #[serde(default)]
    pub teachers: Vec<Teacher>,
    /// Rooms.
    #[serde(default)]
    pub rooms: Vec<Room>,
    /// Courses.
    #[serde(default)]
    pub courses: Vec<Course>,
    #[serde(flatten)]
    grid: Grid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    active_batch_indices_by_day: Option<BTreeMap<Day, Vec<usize>>>,
    #[serde(skip)]
    slots: TimeSlotTable,
}

impl Timetable {
    /// Creates a timetable with no batches and an empty grid.
    pub fn new(
        university_name: impl Into<String>,
        department_name: impl Into<String>,
        effective_from: NaiveDate,
    ) -> Self {
        Self {
            university_name: university_name.into(),
            department_name: department_name.into(),
            effective_from,
            batches: Vec::new(),
            teachers: Vec::new(),
            rooms: Vec::new(),
            courses: Vec::new(),
            grid: Grid::with_rows(0),
            active_batch_indices_by_day: None,
            slots: TimeSlotTable::default(),
        }
    }

    /// Sets the batches and sizes the grid to match.
    pub fn with_batches(mut self, batches: Vec<Batch>) -> Self {
        self.set_batches(batches);
        self
    }

    /// Sets the teachers.
    pub fn with_teachers(mut self, teachers: Vec<Teacher>) -> Self {
        self.teachers = teachers;
        self
    }

    /// Sets the rooms.
    pub fn with_rooms(mut self, rooms: Vec<Room>) -> Self {
        self.rooms = rooms;
        self
    }

    /// Sets the courses.
    pub fn with_courses(mut self, courses: Vec<Course>) -> Self {
        self.courses = courses;
        self
    }

    /// Selects the active batches of a day.
    pub fn with_active_rows(mut self, day: Day, rows: Vec<usize>) -> Self {
        self.set_active_rows(day, rows);
        self
    }

    /// Replaces the time-slot label table shared by conflict messages and
    /// layouts.
    pub fn with_time_slots(mut self, slots: TimeSlotTable) -> Self {
        self.slots = slots;
        self
    }

    /// Ordered batch list.
    pub fn batches(&self) -> &[Batch] {
        &self.batches
    }

    /// The grid.
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// The time-slot label table.
    pub fn time_slots(&self) -> &TimeSlotTable {
        &self.slots
    }

    /// Replaces the batch list and resizes every schedulable day.
    ///
    /// Cells on surviving rows are kept; active selections are clamped.
    pub fn set_batches(&mut self, batches: Vec<Batch>) {
        self.batches = batches;
        self.grid.resize(ResizeTarget::All, self.batches.len());
        self.clamp_active_rows();
    }

    /// Active batch rows of a day, ascending.
    ///
    /// Defaults to every batch when no selection is stored for the day.
    /// Non-schedulable days have none.
    pub fn active_rows(&self, day: Day) -> Vec<usize> {
        if !day.is_schedulable() {
            return Vec::new();
        }
        match self
            .active_batch_indices_by_day
            .as_ref()
            .and_then(|m| m.get(&day))
        {
            Some(rows) => rows.clone(),
            None => (0..self.batches.len()).collect(),
        }
    }

    /// Stores the active batch rows of a day.
    ///
    /// Indices are sorted and de-duplicated; unknown rows are dropped.
    pub fn set_active_rows(&mut self, day: Day, rows: Vec<usize>) {
        let rows = sanitize_rows(rows, self.batches.len());
        self.active_batch_indices_by_day
            .get_or_insert_with(BTreeMap::new)
            .insert(day, rows);
    }

    /// Whether a column may be merged with the next one.
    ///
    /// The last column, the break column and the column before the break
    /// cannot start a merge.
    pub fn can_merge(&self, column: usize) -> bool {
        column + 1 < SLOT_COUNT && !self.slots.is_break(column) && !self.slots.is_break(column + 1)
    }

    /// Courses offered to the batch at `row`.
    pub fn courses_for_row(&self, row: usize) -> Vec<&Course> {
        let Some(batch) = self.batches.get(row) else {
            return Vec::new();
        };
        self.courses
            .iter()
            .filter(|c| c.batch_name == batch.name)
            .collect()
    }

    /// Builds cell content for a course and room choice.
    ///
    /// The teacher is copied from the course. Blank inputs are treated as
    /// not chosen.
    pub fn assignment(&self, course_code: Option<&str>, room: Option<&str>) -> Result<Cell> {
        let mut cell = Cell::new();
        if let Some(code) = course_code.filter(|c| !c.is_empty()) {
            let course = find_course(&self.courses, code)
                .ok_or_else(|| GridError::UnknownCourse(code.to_string()))?;
            cell.course_code = Some(course.course_code.clone());
            cell.teacher_short = course.teacher.cell_text();
        }
        cell.room = room.filter(|r| !r.is_empty()).map(String::from);
        Ok(cell)
    }

    /// Checks a tentative assignment without writing anything.
    pub fn check_conflicts(
        &self,
        day: Day,
        row: usize,
        target: SlotSpan,
        tentative: &Tentative,
    ) -> ConflictReport {
        ConflictDetector::new(&self.slots).check(&self.grid, day, row, target, tentative)
    }

    /// Writes a cell; see [`Grid::apply_cell_change`].
    ///
    /// On `Err(GridError::Conflicts)` nothing changed. To override after
    /// confirmation, retry the same change with [`CellChange::forced`].
    pub fn apply_cell_change(&mut self, change: CellChange) -> Result<()> {
        let detector = ConflictDetector::new(&self.slots);
        self.grid
            .apply_cell_change(change, &self.courses, &detector)
    }

    /// Empties a cell, dissolving any merge it belongs to.
    pub fn clear_cell(&mut self, address: CellAddress) -> Result<()> {
        self.apply_cell_change(CellChange::new(address, Cell::new()))
    }

    /// Anchor and single cells taught by a teacher.
    pub fn teacher_cells(&self, short: &str) -> Vec<CellAddress> {
        self.grid.cells_with_teacher(short)
    }

    /// Repairs state loaded from storage; see [`Grid::normalize`].
    ///
    /// Returns the number of repairs made.
    pub fn normalize(&mut self) -> usize {
        let repairs = self.grid.normalize(self.batches.len());
        self.clamp_active_rows();
        if repairs > 0 {
            info!("normalized timetable with {repairs} repair(s)");
        }
        repairs
    }

    /// Compact JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Indented JSON.
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Parses a stored document and repairs its grid.
    ///
    /// Malformed cells, rows and days degrade to empty ones; only text that
    /// is not a JSON object with the header fields fails.
    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        let mut tt: Timetable = serde_json::from_str(text)?;
        tt.normalize();
        Ok(tt)
    }

    fn clamp_active_rows(&mut self) {
        let n = self.batches.len();
        if let Some(map) = self.active_batch_indices_by_day.as_mut() {
            for rows in map.values_mut() {
                *rows = sanitize_rows(std::mem::take(rows), n);
            }
        }
    }
}

fn sanitize_rows(mut rows: Vec<usize>, n: usize) -> Vec<usize> {
    rows.retain(|&r| r < n);
    rows.sort_unstable();
    rows.dedup();
    rows
}
