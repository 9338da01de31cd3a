//! Named snapshots of a timetable.
//!
//! A [`SnapshotStore`] keeps saved copies of a [`Timetable`] in insertion
//! order. Ids are the save time in milliseconds, bumped when two saves
//! land in the same millisecond, so they increase strictly.
//!
//! The store serializes as a plain JSON array of snapshots, so a caller
//! can keep it wherever it keeps the current timetable.

use chrono::{DateTime, Utc};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::SnapshotError;
use crate::timetable::Timetable;

/// Result type for snapshot operations.
pub type Result<T> = std::result::Result<T, SnapshotError>;

/// A saved copy of a timetable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub id: String,
    pub name: String,
    pub date: DateTime<Utc>,
    pub app_state: Timetable,
}

/// In-memory snapshot list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SnapshotStore {
    snapshots: Vec<Snapshot>,
}

impl SnapshotStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Saves a copy of `timetable` stamped with the current time.
    pub fn save(&mut self, name: impl Into<String>, timetable: &Timetable) -> &Snapshot {
        self.save_at(name, timetable, Utc::now())
    }

    /// Saves a copy of `timetable` stamped with `date`.
    pub fn save_at(
        &mut self,
        name: impl Into<String>,
        timetable: &Timetable,
        date: DateTime<Utc>,
    ) -> &Snapshot {
        let mut id = date.timestamp_millis();
        if let Some(last) = self.last_id() {
            id = id.max(last + 1);
        }
        let snapshot = Snapshot {
            id: id.to_string(),
            name: name.into(),
            date,
            app_state: timetable.clone(),
        };
        info!("saved snapshot {} ({})", snapshot.id, snapshot.name);
        let index = self.snapshots.len();
        self.snapshots.push(snapshot);
        &self.snapshots[index]
    }

    /// All snapshots, oldest first.
    pub fn list(&self) -> &[Snapshot] {
        &self.snapshots
    }

    /// Number of snapshots.
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// The snapshot with `id`.
    pub fn get(&self, id: &str) -> Option<&Snapshot> {
        self.snapshots.iter().find(|s| s.id == id)
    }

    /// A repaired copy of the timetable saved under `id`.
    pub fn load(&self, id: &str) -> Result<Timetable> {
        let snapshot = self
            .get(id)
            .ok_or_else(|| SnapshotError::NotFound(id.to_string()))?;
        let mut timetable = snapshot.app_state.clone();
        timetable.normalize();
        Ok(timetable)
    }

    /// Removes and returns the snapshot with `id`.
    pub fn delete(&mut self, id: &str) -> Result<Snapshot> {
        let index = self
            .snapshots
            .iter()
            .position(|s| s.id == id)
            .ok_or_else(|| SnapshotError::NotFound(id.to_string()))?;
        let removed = self.snapshots.remove(index);
        info!("deleted snapshot {} ({})", removed.id, removed.name);
        Ok(removed)
    }

    /// JSON array of all snapshots.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parses a store written by [`SnapshotStore::to_json`].
    ///
    /// Every snapshot's timetable is repaired on the way in.
    pub fn from_json(text: &str) -> Result<Self> {
        let mut store: SnapshotStore = serde_json::from_str(text)?;
        for snapshot in &mut store.snapshots {
            snapshot.app_state.normalize();
        }
        Ok(store)
    }

    fn last_id(&self) -> Option<i64> {
        self.snapshots.iter().filter_map(|s| s.id.parse().ok()).max()
    }
}

/// Indented JSON of a snapshot's timetable, for download.
pub fn export_json(snapshot: &Snapshot) -> Result<String> {
    Ok(serde_json::to_string_pretty(&snapshot.app_state)?)
}

/// Download file name: `routine-<name>-<YYYY-MM-DD>.json`.
///
/// Whitespace in the name becomes `-`.
pub fn export_file_name(snapshot: &Snapshot) -> String {
    let name: String = snapshot
        .name
        .chars()
        .map(|c| if c.is_whitespace() { '-' } else { c })
        .collect();
    format!("routine-{}-{}.json", name, snapshot.date.format("%Y-%m-%d"))
}

/// Parses an exported timetable.
///
/// # Errors
/// `Json` when the text is not JSON or does not fit the timetable shape;
/// `InvalidStructure` when the university name is blank or the batch or
/// teacher list is missing.
pub fn import_json(text: &str) -> Result<Timetable> {
    let value: Value = serde_json::from_str(text)?;
    let has_university = value
        .get("universityName")
        .and_then(Value::as_str)
        .is_some_and(|s| !s.is_empty());
    if !has_university {
        warn!("rejected import: missing university name");
        return Err(SnapshotError::InvalidStructure(
            "missing university name".into(),
        ));
    }
    for key in ["batches", "teachers"] {
        if !value.get(key).is_some_and(Value::is_array) {
            warn!("rejected import: missing {key}");
            return Err(SnapshotError::InvalidStructure(format!("missing {key}")));
        }
    }
    let mut timetable: Timetable = serde_json::from_value(value)?;
    timetable.normalize();
    Ok(timetable)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Batch, CellAddress, CellChange, Course, Day, Room, Teacher};
    use chrono::{NaiveDate, TimeZone};

    fn sample() -> Timetable {
        let mut tt = Timetable::new("Test Uni", "CSE", NaiveDate::from_ymd_opt(2025, 1, 1).unwrap())
            .with_batches(vec![Batch::new("1st", 2)])
            .with_teachers(vec![Teacher::new("DT", "Dr. Test").with_department("CSE")])
            .with_rooms(vec![Room::new("R1")])
            .with_courses(vec![Course::new("1st", "C101", "One").with_teacher("DT")]);
        let cell = tt.assignment(Some("C101"), Some("R1")).unwrap();
        tt.apply_cell_change(
            CellChange::new(CellAddress::new(Day::Saturday, 0, 0), cell).with_merge(),
        )
        .unwrap();
        tt
    }

    fn at(ms: i64) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(ms).unwrap()
    }

    #[test]
    fn test_save_list_load() {
        let mut store = SnapshotStore::new();
        let tt = sample();
        let id = store.save_at("Spring", &tt, at(1_700_000_000_000)).id.clone();
        assert_eq!(id, "1700000000000");
        assert_eq!(store.len(), 1);
        assert_eq!(store.list()[0].name, "Spring");
        assert_eq!(store.load(&id).unwrap(), tt);
    }

    #[test]
    fn test_ids_increase() {
        let mut store = SnapshotStore::new();
        let tt = sample();
        store.save_at("a", &tt, at(5_000));
        store.save_at("b", &tt, at(5_000));
        store.save_at("c", &tt, at(4_000));
        let ids: Vec<&str> = store.list().iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["5000", "5001", "5002"]);
    }

    #[test]
    fn test_delete() {
        let mut store = SnapshotStore::new();
        let tt = sample();
        store.save_at("a", &tt, at(1_000));
        store.save_at("b", &tt, at(2_000));
        let removed = store.delete("1000").unwrap();
        assert_eq!(removed.name, "a");
        assert_eq!(store.len(), 1);
        assert!(matches!(store.delete("1000"), Err(SnapshotError::NotFound(_))));
        assert!(matches!(store.load("1000"), Err(SnapshotError::NotFound(_))));
    }

    #[test]
    fn test_store_round_trip() {
        let mut store = SnapshotStore::new();
        store.save_at("Fall term", &sample(), at(1_736_000_000_000));
        let json = store.to_json().unwrap();
        let value: Value = serde_json::from_str(&json).unwrap();
        assert!(value.is_array());
        assert!(value[0]["appState"]["mergedRanges"].is_array());
        assert_eq!(SnapshotStore::from_json(&json).unwrap(), store);
    }

    #[test]
    fn test_export_file_name() {
        let mut store = SnapshotStore::new();
        let snapshot = store
            .save_at("Fall term  v2", &sample(), at(1_736_000_000_000))
            .clone();
        assert_eq!(export_file_name(&snapshot), "routine-Fall-term--v2-2025-01-04.json");
    }

    #[test]
    fn test_export_import() {
        let mut store = SnapshotStore::new();
        let tt = sample();
        let snapshot = store.save_at("x", &tt, at(1_000)).clone();
        let text = export_json(&snapshot).unwrap();
        assert!(text.contains('\n'));
        assert_eq!(import_json(&text).unwrap(), tt);
    }

    #[test]
    fn test_import_rejects() {
        assert!(matches!(import_json("{"), Err(SnapshotError::Json(_))));
        assert!(matches!(
            import_json(r#"{"universityName": "", "batches": [], "teachers": []}"#),
            Err(SnapshotError::InvalidStructure(_))
        ));
        assert!(matches!(
            import_json(r#"{"universityName": "U", "teachers": []}"#),
            Err(SnapshotError::InvalidStructure(_))
        ));
        assert!(matches!(
            import_json(r#"{"universityName": "U", "batches": [], "teachers": []}"#),
            Err(SnapshotError::Json(_))
        ));
    }

    #[test]
    fn test_import_repairs_grid() {
        let text = r#"{
            "universityName": "U",
            "departmentName": "D",
            "effectiveFrom": "2025-01-01",
            "batches": [{"name": "1st", "numCourses": 1}],
            "teachers": [],
            "grid": {"saturday": [[{"courseCode": "C1"}, 7]]},
            "mergedRanges": [{"day": "sunday", "row": 0, "startCol": 0, "colspan": 2}]
        }"#;
        let tt = import_json(text).unwrap();
        assert_eq!(tt.grid().row_count(Day::Saturday), 1);
        assert_eq!(tt.grid().rows(Day::Saturday)[0].len(), 8);
        assert_eq!(
            tt.grid().cell(Day::Saturday, 0, 0).unwrap().course_code.as_deref(),
            Some("C1")
        );
        assert!(tt.grid().cell(Day::Saturday, 0, 1).unwrap().is_empty());
        assert!(tt.grid().merged_ranges().is_empty());
    }
}
