//! The task model and its due-date derivations.
//!
//! # Design
//! Dates are kept exactly as the API sends them (`YYYY-MM-DD` or
//! `YYYY-MM-DDThh:mm:ss`). Comparisons are lexicographic on the 10-character
//! date prefix, which matches calendar order for zero-padded ISO dates. No
//! timezone is modelled: `now` and `due_date` are assumed to share the
//! device's local calendar.

use chrono::{Days, NaiveDate, NaiveDateTime};

/// Length of the `YYYY-MM-DD` prefix.
const DATE_LEN: usize = 10;

/// Urgency, highest first. The upstream API numbers these the other way
/// round (4 is most urgent).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Priority {
    P1,
    P2,
    P3,
    #[default]
    P4,
}

impl Priority {
    /// Map the upstream 1..=4 scale. Anything else is `P4`.
    pub fn from_upstream(value: i64) -> Self {
        match value {
            4 => Priority::P1,
            3 => Priority::P2,
            2 => Priority::P3,
            _ => Priority::P4,
        }
    }

    /// Inverse of [`Priority::from_upstream`].
    pub fn upstream(self) -> i64 {
        match self {
            Priority::P1 => 4,
            Priority::P2 => 3,
            Priority::P3 => 2,
            Priority::P4 => 1,
        }
    }

    /// Display color as `0xRRGGBB`.
    pub fn color(self) -> u32 {
        match self {
            Priority::P1 => 0xFF2B2B,
            Priority::P2 => 0xFB8C00,
            Priority::P3 => 0x4073FF,
            Priority::P4 => 0x808080,
        }
    }
}

/// One remote task as known locally. Immutable once decoded.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Task {
    pub id: String,
    pub content: String,
    pub description: String,
    pub project_id: Option<String>,
    pub section_id: Option<String>,
    pub parent_id: Option<String>,
    pub due_date: Option<String>,
    pub due_string: Option<String>,
    pub priority: Priority,
    pub is_completed: bool,
    pub is_deleted: bool,
}

impl Task {
    /// The `YYYY-MM-DD` part of `due_date`, or `None` when there is no due
    /// date. A due date shorter than ten characters is returned whole.
    pub fn date_portion(&self) -> Option<&str> {
        let due = self.due_date.as_deref().filter(|d| !d.is_empty())?;
        Some(due.get(..DATE_LEN).unwrap_or(due))
    }

    pub fn is_overdue(&self, now: NaiveDateTime) -> bool {
        self.date_portion()
            .is_some_and(|date| date < date_key(now.date()).as_str())
    }

    pub fn is_due_today(&self, now: NaiveDateTime) -> bool {
        self.date_portion()
            .is_some_and(|date| date == date_key(now.date()))
    }

    pub fn is_due_tomorrow(&self, now: NaiveDateTime) -> bool {
        let Some(tomorrow) = now.date().checked_add_days(Days::new(1)) else {
            return false;
        };
        self.date_portion()
            .is_some_and(|date| date == date_key(tomorrow))
    }

    /// `hh:mm` from a `YYYY-MM-DDThh:mm:ss` due date, empty otherwise.
    pub fn due_time(&self) -> &str {
        match self.due_date.as_deref() {
            Some(due) if due.len() > DATE_LEN => due.get(11..16).unwrap_or(""),
            _ => "",
        }
    }

    pub fn priority_color(&self) -> u32 {
        self.priority.color()
    }
}

fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}
