//! Weekly class timetable model with merged slots and conflict detection.
//!
//! Provides the grid of (day, batch, time slot) cells behind a university
//! routine editor, the horizontal merges that let one class cover two
//! consecutive slots, and the check that keeps a teacher or room from
//! being booked twice at overlapping times.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `Day`, `SlotSpan`, `TimeSlotTable`, `Cell`,
//!   `Grid`, `MergedRange`, `Batch`, `Course`, `Teacher`, `Room`
//! - **`conflict`**: Teacher and room double-booking detection
//! - **`timetable`**: The editor session state and its JSON document
//! - **`layout`**: Read-only projection for printers and screens
//! - **`snapshot`**: Named snapshots, export and import
//! - **`validation`**: Setup checks on the reference lists
//! - **`error`**: `GridError`, `SnapshotError`
//!
//! # Logging
//!
//! Uses the `log` facade. No logger is installed by this crate.

pub mod conflict;
pub mod error;
pub mod layout;
pub mod models;
pub mod snapshot;
pub mod timetable;
pub mod validation;

pub use conflict::{check_conflicts, ConflictDetector, ConflictReport, Tentative};
pub use error::{GridError, SnapshotError};
pub use timetable::Timetable;
