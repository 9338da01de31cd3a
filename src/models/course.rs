//! Batch and course models.
//!
//! A batch is a named student group; its position in the batch list is
//! its row index in every day's sub-grid. A course belongs to exactly one
//! batch and may be bound to a teacher.

use serde::{Deserialize, Serialize};

/// Marker stored for courses taught by no specific teacher.
pub const NOT_SPECIFIC: &str = "Not Specific";

/// Whether a cell's teacher text names a real teacher.
///
/// Blank text and [`NOT_SPECIFIC`] do not.
pub fn is_teacher_code(short: &str) -> bool {
    !short.trim().is_empty() && short != NOT_SPECIFIC
}

/// A student group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Batch {
    /// Batch name. Join key into courses.
    pub name: String,
    /// Number of courses this batch takes.
    pub num_courses: u32,
}

/// The teacher bound to a course.
///
/// Stored as a plain string: `""` is unassigned, [`NOT_SPECIFIC`] is the
/// explicit marker, anything else is a teacher short code.
///
/// The marker is copied into cells so it prints, but it never identifies a
/// teacher: conflict checks, teacher lookups and highlighting skip it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum CourseTeacher {
    /// No teacher chosen yet.
    #[default]
    Unassigned,
    /// Deliberately taught by no specific teacher.
    NotSpecific,
    /// Taught by the teacher with this short code.
    Assigned(String),
}

/// A course offered to one batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    /// Owning batch name.
    pub batch_name: String,
    /// Course code, unique across the dataset.
    pub course_code: String,
    /// Display name.
    pub course_name: String,
    /// Teacher of record.
    #[serde(rename = "teacherShort", default)]
    pub teacher: CourseTeacher,
}

impl From<String> for CourseTeacher {
    fn from(s: String) -> Self {
        match s.as_str() {
            "" => CourseTeacher::Unassigned,
            NOT_SPECIFIC => CourseTeacher::NotSpecific,
            _ => CourseTeacher::Assigned(s),
        }
    }
}

impl From<CourseTeacher> for String {
    fn from(t: CourseTeacher) -> Self {
        match t {
            CourseTeacher::Unassigned => String::new(),
            CourseTeacher::NotSpecific => NOT_SPECIFIC.to_string(),
            CourseTeacher::Assigned(s) => s,
        }
    }
}

impl CourseTeacher {
    /// Short code of an assigned teacher.
    pub fn short_code(&self) -> Option<&str> {
        match self {
            CourseTeacher::Assigned(s) => Some(s),
            _ => None,
        }
    }

    /// Text written into a cell for this teacher, if any.
    pub fn cell_text(&self) -> Option<String> {
        match self {
            CourseTeacher::Unassigned => None,
            other => Some(String::from(other.clone())),
        }
    }
}

impl Batch {
    /// Creates a batch.
    pub fn new(name: impl Into<String>, num_courses: u32) -> Self {
        Self {
            name: name.into(),
            num_courses,
        }
    }
}

impl Course {
    /// Creates an unassigned course.
    pub fn new(
        batch_name: impl Into<String>,
        course_code: impl Into<String>,
        course_name: impl Into<String>,
    ) -> Self {
        Self {
            batch_name: batch_name.into(),
            course_code: course_code.into(),
            course_name: course_name.into(),
            teacher: CourseTeacher::Unassigned,
        }
    }

    /// Binds the course to a teacher short code.
    pub fn with_teacher(mut self, short: impl Into<String>) -> Self {
        self.teacher = CourseTeacher::Assigned(short.into());
        self
    }

    /// Marks the course as taught by no specific teacher.
    pub fn not_specific(mut self) -> Self {
        self.teacher = CourseTeacher::NotSpecific;
        self
    }

    /// Whether no teacher has been chosen.
    pub fn is_unassigned(&self) -> bool {
        self.teacher == CourseTeacher::Unassigned
    }
}

/// Finds a course by code.
pub fn find_course<'a>(courses: &'a [Course], code: &str) -> Option<&'a Course> {
    courses.iter().find(|c| c.course_code == code)
}
