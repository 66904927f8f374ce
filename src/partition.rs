//! Partition keys addressing the persistence unit a document belongs to.
//!
//! A partition is either one calendar date or one project; the whole node
//! list for a partition is read and written atomically. Callers compute
//! destination keys abstractly (today, the current key plus one day, or a
//! user-chosen key) instead of wiring a separate operation per variant.

use chrono::{Local, NaiveDate};

/// Identifies one document partition: a calendar date or a project.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PartitionKey {
    /// The daily document for one calendar date.
    Date(NaiveDate),
    /// The document owned by one project.
    Project(String),
}

impl PartitionKey {
    /// The date partition for the current local day.
    #[must_use]
    pub fn today() -> Self {
        Self::Date(Local::now().date_naive())
    }

    /// The date partition one day after this one.
    ///
    /// `None` for project partitions (and for a date at the calendar's
    /// representable edge).
    #[must_use]
    pub fn next_day(&self) -> Option<Self> {
        match self {
            Self::Date(date) => date.succ_opt().map(Self::Date),
            Self::Project(_) => None,
        }
    }

    /// The date partition one day before this one.
    ///
    /// `None` for project partitions (and for a date at the calendar's
    /// representable edge).
    #[must_use]
    pub fn previous_day(&self) -> Option<Self> {
        match self {
            Self::Date(date) => date.pred_opt().map(Self::Date),
            Self::Project(_) => None,
        }
    }

    /// Check if this is a date partition.
    #[must_use]
    pub const fn is_date(&self) -> bool {
        matches!(self, Self::Date(_))
    }

    /// The canonical storage key: `date:<ISO date>` or `project:<id>`.
    #[must_use]
    pub fn storage_key(&self) -> String {
        self.to_string()
    }
}

impl std::fmt::Display for PartitionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Date(date) => write!(f, "date:{date}"),
            Self::Project(id) => write!(f, "project:{id}"),
        }
    }
}

impl std::str::FromStr for PartitionKey {
    type Err = InvalidPartitionKey;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(date) = s.strip_prefix("date:") {
            let parsed = NaiveDate::parse_from_str(date, "%Y-%m-%d")
                .map_err(|_| InvalidPartitionKey(s.to_string()))?;
            return Ok(Self::Date(parsed));
        }
        if let Some(id) = s.strip_prefix("project:") {
            if id.is_empty() {
                return Err(InvalidPartitionKey(s.to_string()));
            }
            return Ok(Self::Project(id.to_string()));
        }
        Err(InvalidPartitionKey(s.to_string()))
    }
}

/// Error when a storage key string is not a valid partition key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidPartitionKey(pub String);

impl std::fmt::Display for InvalidPartitionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "invalid partition key: '{}' (expected 'date:YYYY-MM-DD' or 'project:<id>')",
            self.0
        )
    }
}

impl std::error::Error for InvalidPartitionKey {}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> PartitionKey {
        PartitionKey::Date(NaiveDate::from_ymd_opt(y, m, d).unwrap())
    }

    #[test]
    fn test_display_format() {
        assert_eq!(date(2026, 8, 7).to_string(), "date:2026-08-07");
        assert_eq!(
            PartitionKey::Project("website-redesign-0a1b".to_string()).to_string(),
            "project:website-redesign-0a1b"
        );
    }

    #[test]
    fn test_parse_roundtrip() {
        for key in [date(2026, 8, 7), PartitionKey::Project("p-1".to_string())] {
            let parsed: PartitionKey = key.storage_key().parse().unwrap();
            assert_eq!(parsed, key);
        }
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!("2026-08-07".parse::<PartitionKey>().is_err());
        assert!("date:yesterday".parse::<PartitionKey>().is_err());
        assert!("project:".parse::<PartitionKey>().is_err());
        assert!("".parse::<PartitionKey>().is_err());
    }

    #[test]
    fn test_next_and_previous_day() {
        let key = date(2026, 8, 31);
        assert_eq!(key.next_day(), Some(date(2026, 9, 1)));
        assert_eq!(key.previous_day(), Some(date(2026, 8, 30)));
    }

    #[test]
    fn test_project_has_no_adjacent_days() {
        let key = PartitionKey::Project("p-1".to_string());
        assert_eq!(key.next_day(), None);
        assert_eq!(key.previous_day(), None);
    }

    #[test]
    fn test_today_is_a_date() {
        assert!(PartitionKey::today().is_date());
    }
}
