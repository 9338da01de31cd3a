//! Teacher and room models.
//!
//! Teachers and rooms are the resources a cell occupies. Both are joined
//! into cells by a unique key: the teacher short code and the room name.

use serde::{Deserialize, Serialize};

/// A teacher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Teacher {
    /// Full display name.
    pub full_name: String,
    /// Short code, unique across teachers. Join key into cells and courses.
    pub short_name: String,
    /// Free-text designation and department.
    pub department: String,
}

/// A room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    /// Unique room name. Join key into cells.
    pub name: String,
}

impl Teacher {
    /// Creates a teacher with an empty designation.
    pub fn new(short_name: impl Into<String>, full_name: impl Into<String>) -> Self {
        Self {
            full_name: full_name.into(),
            short_name: short_name.into(),
            department: String::new(),
        }
    }

    /// Sets the designation/department text.
    pub fn with_department(mut self, department: impl Into<String>) -> Self {
        self.department = department.into();
        self
    }
}

impl Room {
    /// Creates a room.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Finds a teacher by short code.
pub fn find_teacher<'a>(teachers: &'a [Teacher], short: &str) -> Option<&'a Teacher> {
    teachers.iter().find(|t| t.short_name == short)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_teacher_builder() {
        let t = Teacher::new("DT", "Dr. Test").with_department("Professor, CSE");
        assert_eq!(t.short_name, "DT");
        assert_eq!(t.full_name, "Dr. Test");
        assert_eq!(t.department, "Professor, CSE");
    }

    #[test]
    fn test_find_teacher() {
        let teachers = vec![Teacher::new("A", "Alpha"), Teacher::new("B", "Beta")];
        assert_eq!(find_teacher(&teachers, "B").map(|t| t.full_name.as_str()), Some("Beta"));
        assert!(find_teacher(&teachers, "C").is_none());
    }

    #[test]
    fn test_teacher_serde_shape() {
        let t = Teacher::new("DT", "Dr. Test").with_department("CS");
        let json = serde_json::to_string(&t).unwrap();
        assert_eq!(json, r#"{"fullName":"Dr. Test","shortName":"DT","department":"CS"}"#);
        let room: Room = serde_json::from_str(r#"{"name":"Lab 1"}"#).unwrap();
        assert_eq!(room, Room::new("Lab 1"));
    }
}
