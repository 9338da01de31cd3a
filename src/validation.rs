//! Setup validation for a timetable's reference data.
//!
//! Checks the header and reference lists collected before any cell is
//! edited. Detects:
//! - Missing names and codes
//! - List sizes outside [`SetupLimits`]
//! - Duplicate teacher short codes, room names and course codes
//! - Courses pointing at unknown batches or teachers
//!
//! All findings are collected; nothing stops at the first one.
//! Courses without a teacher are not errors; see [`unassigned_courses`].

use std::collections::HashSet;
use thiserror::Error;

use crate::models::{find_teacher, Course, CourseTeacher};
use crate::timetable::Timetable;

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// A required text field is blank.
    MissingField,
    /// Two entries share the same key.
    DuplicateId,
    /// A list has too few or too many entries.
    CountOutOfRange,
    /// A batch takes no courses.
    InvalidCourseCount,
    /// A course names a batch that doesn't exist.
    InvalidBatchReference,
    /// A course names a teacher that doesn't exist.
    InvalidTeacherReference,
}

impl ValidationError {
    fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Upper bounds on reference list sizes. Each list needs at least one entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetupLimits {
    pub max_batches: usize,
    pub max_teachers: usize,
    pub max_rooms: usize,
}

impl Default for SetupLimits {
    fn default() -> Self {
        Self {
            max_batches: 20,
            max_teachers: 50,
            max_rooms: 30,
        }
    }
}

/// Validates with [`SetupLimits::default`].
pub fn validate_setup(timetable: &Timetable) -> ValidationResult {
    validate_setup_with(timetable, &SetupLimits::default())
}

/// Validates the header and reference lists of a timetable.
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_setup_with(timetable: &Timetable, limits: &SetupLimits) -> ValidationResult {
    let mut errors = Vec::new();

    if blank(&timetable.university_name) {
        errors.push(ValidationError::new(
            ValidationErrorKind::MissingField,
            "University name is required",
        ));
    }
    if blank(&timetable.department_name) {
        errors.push(ValidationError::new(
            ValidationErrorKind::MissingField,
            "Department name is required",
        ));
    }

    check_count(&mut errors, "batches", timetable.batches().len(), limits.max_batches);
    check_count(&mut errors, "teachers", timetable.teachers.len(), limits.max_teachers);
    check_count(&mut errors, "rooms", timetable.rooms.len(), limits.max_rooms);

    // Batches
    let mut batch_names = HashSet::new();
    for (i, batch) in timetable.batches().iter().enumerate() {
        if blank(&batch.name) {
            errors.push(ValidationError::new(
                ValidationErrorKind::MissingField,
                format!("Batch {} has no name", i + 1),
            ));
        } else if !batch_names.insert(batch.name.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate batch name: {}", batch.name),
            ));
        }
        if batch.num_courses == 0 {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidCourseCount,
                format!("Batch {} must take at least one course", i + 1),
            ));
        }
    }

    // Teachers
    let mut teacher_shorts = HashSet::new();
    for (i, teacher) in timetable.teachers.iter().enumerate() {
        if blank(&teacher.full_name) || blank(&teacher.short_name) || blank(&teacher.department) {
            errors.push(ValidationError::new(
                ValidationErrorKind::MissingField,
                format!("Teacher {} has missing details", i + 1),
            ));
        }
        if !blank(&teacher.short_name) && !teacher_shorts.insert(teacher.short_name.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate teacher short name: {}", teacher.short_name),
            ));
        }
    }

    // Rooms
    let mut room_names = HashSet::new();
    for (i, room) in timetable.rooms.iter().enumerate() {
        if blank(&room.name) {
            errors.push(ValidationError::new(
                ValidationErrorKind::MissingField,
                format!("Room {} has no name", i + 1),
            ));
        } else if !room_names.insert(room.name.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate room name: {}", room.name),
            ));
        }
    }

    // Courses
    let mut course_codes = HashSet::new();
    for course in &timetable.courses {
        if blank(&course.course_code) || blank(&course.course_name) {
            errors.push(ValidationError::new(
                ValidationErrorKind::MissingField,
                format!("Course in batch '{}' needs a code and a name", course.batch_name),
            ));
        }
        if !blank(&course.course_code) && !course_codes.insert(course.course_code.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate course code: {}", course.course_code),
            ));
        }
        if !batch_names.contains(course.batch_name.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidBatchReference,
                format!(
                    "Course '{}' references unknown batch '{}'",
                    course.course_code, course.batch_name
                ),
            ));
        }
        if let CourseTeacher::Assigned(short) = &course.teacher {
            if find_teacher(&timetable.teachers, short).is_none() {
                errors.push(ValidationError::new(
                    ValidationErrorKind::InvalidTeacherReference,
                    format!(
                        "Course '{}' references unknown teacher '{}'",
                        course.course_code, short
                    ),
                ));
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Courses still waiting for a teacher.
pub fn unassigned_courses(courses: &[Course]) -> Vec<&Course> {
    courses.iter().filter(|c| c.is_unassigned()).collect()
}

fn blank(s: &str) -> bool {
    s.trim().is_empty()
}

fn check_count(errors: &mut Vec<ValidationError>, what: &str, count: usize, max: usize) {
    if count == 0 || count > max {
        errors.push(ValidationError::new(
            ValidationErrorKind::CountOutOfRange,
            format!("Number of {what} must be between 1 and {max}, got {count}"),
        ));
    }
}
