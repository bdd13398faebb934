use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

/// One raw terminal observation, as yielded by a device gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PunchEvent {
    /// Identifier as reported by the terminal; padding is not normalized.
    pub employee_external_id: String,
    pub timestamp: NaiveDateTime,
    /// Firmware-dependent hint, see `StatusCodes`.
    pub status_code: i32,
}

impl PunchEvent {
    pub fn new(employee_external_id: impl Into<String>, timestamp: NaiveDateTime, status_code: i32) -> Self {
        Self {
            employee_external_id: employee_external_id.into(),
            timestamp,
            status_code,
        }
    }
}

/// Time-of-day part of a punch once the date has been fixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PunchMark {
    pub time: NaiveTime,
    pub status_code: i32,
}

/// All punches of one employee on the target date, chronologically ordered.
///
/// Never empty: `new` refuses an empty list, so the resolver can rely on a
/// first and last punch existing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailyPunchSet {
    employee_external_id: String,
    target_date: NaiveDate,
    ordered_times: Vec<PunchMark>,
}

impl DailyPunchSet {
    pub fn new(
        employee_external_id: impl Into<String>,
        target_date: NaiveDate,
        mut marks: Vec<PunchMark>,
    ) -> Option<Self> {
        if marks.is_empty() {
            return None;
        }
        // stable: equal times keep arrival order
        marks.sort_by_key(|m| m.time);

        Some(Self {
            employee_external_id: employee_external_id.into(),
            target_date,
            ordered_times: marks,
        })
    }

    pub fn employee_external_id(&self) -> &str {
        &self.employee_external_id
    }

    pub fn target_date(&self) -> NaiveDate {
        self.target_date
    }

    pub fn ordered_times(&self) -> &[PunchMark] {
        &self.ordered_times
    }

    pub fn first(&self) -> PunchMark {
        self.ordered_times[0]
    }

    pub fn last(&self) -> PunchMark {
        self.ordered_times[self.ordered_times.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.ordered_times.len()
    }
}
