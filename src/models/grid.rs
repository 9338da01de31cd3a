//! Weekly grid aggregate.
//!
//! Holds the day → batch row → column cell matrix together with the flat
//! list of merged ranges. The list is a materialized index over the
//! per-cell merge descriptors:
//!
//! - every range has exactly one anchor cell at `(day, row, start_col)`
//!   carrying `{start_col, colspan}`, followed by `colspan - 1`
//!   continuation cells carrying the same descriptor;
//! - no other cell carries a descriptor.
//!
//! [`Grid::apply_cell_change`] is the only mutation that creates or
//! removes ranges, and it updates cells and list together. Range lookups
//! are a linear scan of the list, not of the cells.

use log::{debug, info, warn};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use super::{find_course, is_teacher_code, Cell, CellAddress, CellRole, Course, Day, MergeSpan, SlotSpan, SLOT_COUNT};
use crate::conflict::{ConflictDetector, Tentative};
use crate::error::{GridError, Result};

/// Rows of one day; each row has [`SLOT_COUNT`] cells.
pub type DayRows = Vec<Vec<Cell>>;

/// Index entry for a merged block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergedRange {
    pub day: Day,
    pub row: usize,
    pub start_col: usize,
    pub colspan: usize,
}

impl MergedRange {
    /// Creates a new entry.
    pub fn new(day: Day, row: usize, start_col: usize, colspan: usize) -> Self {
        Self {
            day,
            row,
            start_col,
            colspan,
        }
    }

    /// Columns covered by the block.
    pub fn span(&self) -> SlotSpan {
        SlotSpan::new(self.start_col, self.colspan)
    }

    /// Descriptor carried by the block's cells.
    pub fn descriptor(&self) -> MergeSpan {
        MergeSpan::new(self.start_col, self.colspan)
    }

    /// Whether the block covers a cell.
    pub fn contains(&self, day: Day, row: usize, column: usize) -> bool {
        self.day == day && self.row == row && self.span().contains(column)
    }
}

/// Days affected by a resize.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeTarget {
    /// Every schedulable day.
    All,
    /// A single day.
    Day(Day),
}

/// A requested write to one cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellChange {
    /// Target cell.
    pub address: CellAddress,
    /// New course/teacher/room. Any merge descriptor on it is ignored.
    pub content: Cell,
    /// Absorb the following column into a block of 2.
    pub merge_with_next: bool,
    /// Skip the conflict check.
    pub force_override: bool,
}

impl CellChange {
    /// Creates a single-column write.
    pub fn new(address: CellAddress, content: Cell) -> Self {
        Self {
            address,
            content,
            merge_with_next: false,
            force_override: false,
        }
    }

    /// Requests a merge with the next column.
    pub fn with_merge(mut self) -> Self {
        self.merge_with_next = true;
        self
    }

    /// Sets whether to merge with the next column.
    pub fn merge(mut self, merge_with_next: bool) -> Self {
        self.merge_with_next = merge_with_next;
        self
    }

    /// Skips the conflict check (confirmed override).
    pub fn forced(mut self) -> Self {
        self.force_override = true;
        self
    }

    /// Columns the written cell will occupy.
    pub fn target_span(&self) -> SlotSpan {
        let len = if self.merge_with_next { 2 } else { 1 };
        SlotSpan::new(self.address.column, len)
    }
}

/// The week's cell matrix and merged-range index.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    #[serde(rename = "grid", default, deserialize_with = "lenient_days")]
    days: BTreeMap<Day, DayRows>,
    #[serde(rename = "mergedRanges", default, deserialize_with = "lenient_ranges")]
    merged_ranges: Vec<MergedRange>,
}

impl Grid {
    /// Creates a grid with no days.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty grid with `rows` rows on every schedulable day.
    ///
    /// Non-schedulable days are present with no rows.
    pub fn with_rows(rows: usize) -> Self {
        let days = Day::ALL
            .into_iter()
            .map(|day| {
                let n = if day.is_schedulable() { rows } else { 0 };
                (day, reshape(Vec::new(), n))
            })
            .collect();
        Self {
            days,
            merged_ranges: Vec::new(),
        }
    }

    /// Number of rows stored for a day.
    pub fn row_count(&self, day: Day) -> usize {
        self.days.get(&day).map_or(0, Vec::len)
    }

    /// Rows of a day (empty if the day is absent).
    pub fn rows(&self, day: Day) -> &[Vec<Cell>] {
        self.days.get(&day).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Days present in the grid, in week order.
    pub fn days(&self) -> impl Iterator<Item = (Day, &DayRows)> {
        self.days.iter().map(|(d, rows)| (*d, rows))
    }

    /// The cell stored at a position.
    pub fn cell(&self, day: Day, row: usize, column: usize) -> Option<&Cell> {
        self.days.get(&day)?.get(row)?.get(column)
    }

    /// The cell stored at an address.
    pub fn cell_at(&self, address: CellAddress) -> Option<&Cell> {
        self.cell(address.day, address.row, address.column)
    }

    fn cell_mut(&mut self, day: Day, row: usize, column: usize) -> Option<&mut Cell> {
        self.days.get_mut(&day)?.get_mut(row)?.get_mut(column)
    }

    /// The cell whose course/teacher/room apply at a position.
    ///
    /// A continuation resolves to its anchor when the anchor carries the
    /// same descriptor; anything else resolves to itself.
    pub fn resolve(&self, day: Day, row: usize, column: usize) -> Option<&Cell> {
        let cell = self.cell(day, row, column)?;
        if let CellRole::Continuation { start_col } = cell.role(column) {
            if let Some(anchor) = self.cell(day, row, start_col) {
                if anchor.merged == cell.merged {
                    return Some(anchor);
                }
            }
        }
        Some(cell)
    }

    /// All merged-range entries.
    pub fn merged_ranges(&self) -> &[MergedRange] {
        &self.merged_ranges
    }

    /// The merged range covering a cell, if any.
    pub fn merged_range_at(&self, day: Day, row: usize, column: usize) -> Option<&MergedRange> {
        self.merged_ranges
            .iter()
            .find(|r| r.contains(day, row, column))
    }

    /// Anchor and single cells taught by a teacher.
    ///
    /// Empty for codes that are not teacher identities (see
    /// [`is_teacher_code`]).
    pub fn cells_with_teacher(&self, short: &str) -> Vec<CellAddress> {
        let mut found = Vec::new();
        if !is_teacher_code(short) {
            return found;
        }
        for (day, rows) in self.days() {
            for (row, cells) in rows.iter().enumerate() {
                for (column, cell) in cells.iter().enumerate() {
                    if matches!(cell.role(column), CellRole::Continuation { .. }) {
                        continue;
                    }
                    if cell.teacher_short.as_deref() == Some(short) {
                        found.push(CellAddress::new(day, row, column));
                    }
                }
            }
        }
        found
    }

    /// Writes a cell, optionally merging it with the next column.
    ///
    /// # Steps
    /// 1. Unless forced, checks the write against the day's cells. The
    ///    tentative teacher is the teacher bound to the course named in
    ///    `content`, never the teacher field of `content` itself.
    /// 2. Clears any merged block covering the target (and, when merging,
    ///    the next column), removing its index entry.
    /// 3. Stores `content`. When merging, the next cell acquires the
    ///    descriptor and a range entry is appended.
    ///
    /// # Errors
    /// `Conflicts` leaves the grid untouched. Out-of-range positions and
    /// unknown course codes are rejected before anything is checked.
    pub fn apply_cell_change(
        &mut self,
        change: CellChange,
        courses: &[Course],
        detector: &ConflictDetector<'_>,
    ) -> Result<()> {
        let columns = self.check_address(change.address)?;
        let CellAddress { day, row, column } = change.address;
        if change.merge_with_next && column + 1 >= columns {
            warn!("rejected merge at {day} row {row} column {column}: no following column");
            return Err(GridError::MergeOutOfRange { column });
        }

        let tentative = tentative_for(&change.content, courses)?;
        if !change.force_override {
            let report = detector.check(self, day, row, change.target_span(), &tentative);
            if !report.is_empty() {
                warn!(
                    "rejected write at {day} row {row} column {column}: {} conflict(s)",
                    report.len()
                );
                return Err(GridError::Conflicts(report));
            }
        }

        self.unmerge_at(day, row, column);
        if change.merge_with_next {
            self.unmerge_at(day, row, column + 1);
        }

        let mut content = change.content;
        content.merged = None;
        if change.merge_with_next {
            let descriptor = MergeSpan::new(column, 2);
            content.merged = Some(descriptor);
            if let Some(next) = self.cell_mut(day, row, column + 1) {
                next.merged = Some(descriptor);
            }
            self.merged_ranges
                .push(MergedRange::new(day, row, column, 2));
            debug!("merged {day} row {row} columns {column}-{}", column + 1);
        }
        if let Some(target) = self.cell_mut(day, row, column) {
            *target = content;
        }
        debug!(
            "wrote {day} row {row} column {column}{}",
            if change.force_override { " (override)" } else { "" }
        );
        Ok(())
    }

    /// Rebuilds the row dimension of the affected days.
    ///
    /// Cells whose `[row][column]` address survives are kept; new cells
    /// are empty. Range entries on dropped rows are pruned. Days without
    /// schedulable rows are left as they are.
    pub fn resize(&mut self, target: ResizeTarget, rows: usize) {
        let affected: Vec<Day> = match target {
            ResizeTarget::All => Day::SCHEDULABLE.to_vec(),
            ResizeTarget::Day(day) if day.is_schedulable() => vec![day],
            ResizeTarget::Day(day) => {
                warn!("ignored resize of {day}: not a schedulable day");
                return;
            }
        };
        for day in &affected {
            let existing = self.days.remove(day).unwrap_or_default();
            self.days.insert(*day, reshape(existing, rows));
        }
        for day in Day::ALL {
            self.days.entry(day).or_default();
        }

        let before = self.merged_ranges.len();
        self.merged_ranges
            .retain(|r| !(affected.contains(&r.day) && r.row >= rows));
        let pruned = before - self.merged_ranges.len();
        if pruned > 0 {
            warn!("pruned {pruned} merged range(s) on rows >= {rows}");
        }
        info!("resized {} day(s) to {rows} row(s)", affected.len());
    }

    /// Repairs a grid loaded from storage.
    ///
    /// Every schedulable day gets exactly `rows` rows of [`SLOT_COUNT`]
    /// cells; other days get none. The range index is then reconciled
    /// with the cells: entries without a well-formed block are dropped,
    /// well-formed blocks missing from the index are added, and stray
    /// descriptors are removed. Never fails.
    ///
    /// Returns the number of repairs made.
    pub fn normalize(&mut self, rows: usize) -> usize {
        let mut repairs = 0;
        for day in Day::ALL {
            let n = if day.is_schedulable() { rows } else { 0 };
            let existing = self.days.remove(&day).unwrap_or_default();
            let well_formed = existing.len() == n && existing.iter().all(|r| r.len() == SLOT_COUNT);
            if !well_formed {
                warn!(
                    "repaired {day} grid dimensions ({} row(s) -> {n})",
                    existing.len()
                );
                repairs += 1;
            }
            self.days.insert(day, reshape(existing, n));
        }
        repairs + self.reconcile_merges()
    }

    /// Describes every broken merge invariant (empty when consistent).
    pub fn invariant_violations(&self) -> Vec<String> {
        let mut problems = Vec::new();
        for (i, range) in self.merged_ranges.iter().enumerate() {
            let d = Some(range.descriptor());
            if self.merged_ranges[..i].contains(range) {
                problems.push(format!("duplicate range entry {range:?}"));
            }
            if range.colspan > SLOT_COUNT {
                problems.push(format!("{range:?} is wider than a row"));
                continue;
            }
            for column in range.span().start..range.span().end() {
                match self.cell(range.day, range.row, column) {
                    Some(cell) if cell.merged == d => {}
                    _ => problems.push(format!(
                        "{} row {} column {column} does not carry {range:?}",
                        range.day, range.row
                    )),
                }
            }
        }
        for (day, rows) in self.days() {
            for (row, cells) in rows.iter().enumerate() {
                for (column, cell) in cells.iter().enumerate() {
                    let Some(m) = cell.merged else { continue };
                    let indexed = self
                        .merged_ranges
                        .iter()
                        .any(|r| r.descriptor() == m && r.contains(day, row, column));
                    if !indexed {
                        problems.push(format!(
                            "{day} row {row} column {column} carries unindexed {m:?}"
                        ));
                    }
                }
            }
        }
        problems
    }

    /// Clears the block covering a cell and removes its entry.
    fn unmerge_at(&mut self, day: Day, row: usize, column: usize) -> bool {
        let Some(range) = self.merged_range_at(day, row, column).copied() else {
            return false;
        };
        self.merged_ranges.retain(|r| *r != range);
        for col in range.span().start..range.span().end().min(SLOT_COUNT) {
            if let Some(cell) = self.cell_mut(day, row, col) {
                *cell = Cell::default();
            }
        }
        debug!(
            "unmerged {day} row {row} columns {}-{}",
            range.start_col,
            range.span().last()
        );
        true
    }

    /// Returns the row's column count if the address exists.
    fn check_address(&self, address: CellAddress) -> Result<usize> {
        let CellAddress { day, row, column } = address;
        let rows = self.row_count(day);
        if row >= rows {
            warn!("rejected write at {day} row {row}: only {rows} row(s)");
            return Err(GridError::RowOutOfRange { day, row, rows });
        }
        let columns = self.rows(day)[row].len();
        if column >= columns {
            warn!("rejected write at {day} row {row} column {column}: only {columns} column(s)");
            return Err(GridError::ColumnOutOfRange { column, columns });
        }
        Ok(columns)
    }

    fn reconcile_merges(&mut self) -> usize {
        let mut derived = Vec::new();
        for (day, rows) in self.days() {
            for (row, cells) in rows.iter().enumerate() {
                for (column, cell) in cells.iter().enumerate() {
                    let Some(m) = cell.merged else { continue };
                    if m.start_col != column || m.colspan < 2 || m.colspan > cells.len() - column {
                        continue;
                    }
                    if cells[column + 1..column + m.colspan]
                        .iter()
                        .all(|c| c.merged == Some(m))
                    {
                        derived.push(MergedRange::new(day, row, column, m.colspan));
                    }
                }
            }
        }

        let mut kept: Vec<MergedRange> = Vec::with_capacity(derived.len());
        for range in &self.merged_ranges {
            if derived.contains(range) && !kept.contains(range) {
                kept.push(*range);
            }
        }
        let dropped = self.merged_ranges.len() - kept.len();
        let mut added = 0;
        for range in derived {
            if !kept.contains(&range) {
                kept.push(range);
                added += 1;
            }
        }

        let mut stripped = 0;
        for (day, rows) in self.days.iter_mut() {
            for (row, cells) in rows.iter_mut().enumerate() {
                for (column, cell) in cells.iter_mut().enumerate() {
                    let Some(m) = cell.merged else { continue };
                    let indexed = kept
                        .iter()
                        .any(|r| r.descriptor() == m && r.contains(*day, row, column));
                    if !indexed {
                        cell.merged = None;
                        stripped += 1;
                    }
                }
            }
        }

        if dropped + added + stripped > 0 {
            warn!(
                "reconciled merges: dropped {dropped} entry(ies), added {added}, stripped {stripped} stray descriptor(s)"
            );
        }
        self.merged_ranges = kept;
        dropped + added + stripped
    }
}

/// Tentative teacher/room for a write.
fn tentative_for(content: &Cell, courses: &[Course]) -> Result<Tentative> {
    let teacher = match content.course_code.as_deref() {
        Some(code) => find_course(courses, code)
            .ok_or_else(|| {
                warn!("rejected write: unknown course code {code:?}");
                GridError::UnknownCourse(code.to_string())
            })?
            .teacher
            .short_code()
            .map(String::from),
        None => None,
    };
    Ok(Tentative {
        teacher_short: teacher,
        room: content.room.clone(),
    })
}

fn empty_row() -> Vec<Cell> {
    vec![Cell::default(); SLOT_COUNT]
}

/// Truncates or pads to `rows` rows of exactly [`SLOT_COUNT`] cells.
fn reshape(mut existing: DayRows, rows: usize) -> DayRows {
    existing.truncate(rows);
    for row in existing.iter_mut() {
        row.resize(SLOT_COUNT, Cell::default());
    }
    existing.resize_with(rows, empty_row);
    existing
}

fn lenient_days<'de, D>(deserializer: D) -> std::result::Result<BTreeMap<Day, DayRows>, D::Error>
where
    D: Deserializer<'de>,
{
    let mut days = BTreeMap::new();
    let map = match Value::deserialize(deserializer)? {
        Value::Object(map) => map,
        Value::Null => return Ok(days),
        _ => {
            warn!("ignoring stored grid: not an object");
            return Ok(days);
        }
    };
    for (key, value) in map {
        let Some(day) = Day::from_key(&key) else {
            warn!("ignoring unknown day key {key:?}");
            continue;
        };
        match value {
            Value::Array(rows) => {
                days.insert(day, rows.into_iter().map(lenient_row).collect());
            }
            _ => warn!("ignoring stored {day} grid: not an array"),
        }
    }
    Ok(days)
}

fn lenient_row(value: Value) -> Vec<Cell> {
    match value {
        Value::Array(cells) => cells
            .into_iter()
            .map(|c| {
                serde_json::from_value(c).unwrap_or_else(|e| {
                    warn!("replacing malformed cell with an empty one: {e}");
                    Cell::default()
                })
            })
            .collect(),
        _ => {
            warn!("replacing malformed row with an empty one");
            Vec::new()
        }
    }
}

fn lenient_ranges<'de, D>(deserializer: D) -> std::result::Result<Vec<MergedRange>, D::Error>
where
    D: Deserializer<'de>,
{
    let Value::Array(items) = Value::deserialize(deserializer)? else {
        return Ok(Vec::new());
    };
    Ok(items
        .into_iter()
        .filter_map(|item| match serde_json::from_value(item) {
            Ok(range) => Some(range),
            Err(e) => {
                warn!("dropping malformed merged range: {e}");
                None
            }
        })
        .collect())
}
