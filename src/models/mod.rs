//! Timetable domain models.
//!
//! Provides the data types for one weekly class timetable: days, time-slot
//! columns, cells with horizontal merges, the grid aggregate, and the
//! reference lists (batches, courses, teachers, rooms) that cells join to.
//!
//! # Join keys
//!
//! | Cell field | Joins to |
//! |------------|----------|
//! | `course_code` | `Course::course_code` |
//! | `teacher_short` | `Teacher::short_name` |
//! | `room` | `Room::name` |
//! | row index | position in the batch list |

mod cell;
mod course;
mod day;
mod grid;
mod resource;
mod slot;

pub use cell::{Cell, CellAddress, CellRole, MergeSpan};
pub use course::{find_course, is_teacher_code, Batch, Course, CourseTeacher, NOT_SPECIFIC};
pub use day::Day;
pub use grid::{CellChange, DayRows, Grid, MergedRange, ResizeTarget};
pub use resource::{find_teacher, Room, Teacher};
pub use slot::{SlotSpan, TimeSlotTable, BREAK_COLUMN, SLOT_COUNT};
