//! Days of the weekly template.
//!
//! The week starts on Saturday. Only Saturday through Wednesday carry
//! schedulable rows; Thursday and Friday exist as keys so that stored
//! documents keep their shape, but they never hold cells.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A day of the weekly template.
///
/// Declaration order is the iteration and display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Day {
    Saturday,
    Sunday,
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
}

impl Day {
    /// Every day key, in week order.
    pub const ALL: [Day; 7] = [
        Day::Saturday,
        Day::Sunday,
        Day::Monday,
        Day::Tuesday,
        Day::Wednesday,
        Day::Thursday,
        Day::Friday,
    ];

    /// Days that carry rows in the reference layout.
    pub const SCHEDULABLE: [Day; 5] = [
        Day::Saturday,
        Day::Sunday,
        Day::Monday,
        Day::Tuesday,
        Day::Wednesday,
    ];

    /// Whether this day carries schedulable rows.
    pub fn is_schedulable(self) -> bool {
        !matches!(self, Day::Thursday | Day::Friday)
    }

    /// Lowercase key, as used in stored documents and conflict messages.
    pub fn as_str(self) -> &'static str {
        match self {
            Day::Saturday => "saturday",
            Day::Sunday => "sunday",
            Day::Monday => "monday",
            Day::Tuesday => "tuesday",
            Day::Wednesday => "wednesday",
            Day::Thursday => "thursday",
            Day::Friday => "friday",
        }
    }

    /// Three-letter uppercase label for printed layouts.
    pub fn abbreviation(self) -> &'static str {
        match self {
            Day::Saturday => "SAT",
            Day::Sunday => "SUN",
            Day::Monday => "MON",
            Day::Tuesday => "TUE",
            Day::Wednesday => "WED",
            Day::Thursday => "THU",
            Day::Friday => "FRI",
        }
    }

    /// Parses a lowercase day key.
    pub fn from_key(key: &str) -> Option<Self> {
        Day::ALL.into_iter().find(|d| d.as_str() == key)
    }
}

impl fmt::Display for Day {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_week_order() {
        assert!(Day::Saturday < Day::Sunday);
        assert!(Day::Wednesday < Day::Thursday);
        let mut shuffled = vec![Day::Monday, Day::Saturday, Day::Friday, Day::Sunday];
        shuffled.sort();
        assert_eq!(
            shuffled,
            vec![Day::Saturday, Day::Sunday, Day::Monday, Day::Friday]
        );
    }

    #[test]
    fn test_schedulable_days() {
        assert!(Day::SCHEDULABLE.iter().all(|d| d.is_schedulable()));
        assert!(!Day::Thursday.is_schedulable());
        assert!(!Day::Friday.is_schedulable());
    }

    #[test]
    fn test_keys_and_labels() {
        assert_eq!(Day::Saturday.to_string(), "saturday");
        assert_eq!(Day::Tuesday.abbreviation(), "TUE");
        assert_eq!(Day::from_key("wednesday"), Some(Day::Wednesday));
        assert_eq!(Day::from_key("Wednesday"), None);
    }

    #[test]
    fn test_serde_key() {
        let json = serde_json::to_string(&Day::Sunday).unwrap();
        assert_eq!(json, "\"sunday\"");
        let back: Day = serde_json::from_str("\"monday\"").unwrap();
        assert_eq!(back, Day::Monday);
    }
}
