use chrono::NaiveTime;
use strum_macros::Display;

use crate::model::punch::DailyPunchSet;

/// Status codes the terminals use for "in" and "out".
///
/// Firmware does not agree on these, so they come from configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusCodes {
    pub in_codes: Vec<i32>,
    pub out_codes: Vec<i32>,
}

impl Default for StatusCodes {
    fn default() -> Self {
        Self {
            in_codes: vec![0, 1],
            out_codes: vec![2, 4, 5, 15],
        }
    }
}

impl StatusCodes {
    fn is_in(&self, status_code: i32) -> bool {
        self.in_codes.contains(&status_code)
    }

    fn is_out(&self, status_code: i32) -> bool {
        self.out_codes.contains(&status_code)
    }
}

/// How much of a resolution came from status codes rather than position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum Confidence {
    /// Both an in-like and an out-like status matched.
    Explicit,
    /// Only one side matched a status.
    Partial,
    /// No status matched; first and last punch were used.
    Positional,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub check_in: NaiveTime,
    pub check_out: Option<NaiveTime>,
    pub confidence: Confidence,
}

/// Reduces one employee's day to a check-in and an optional check-out.
///
/// Best-effort reconciliation of noisy status codes:
/// - check-in is the earliest in-like punch, else the first punch;
/// - check-out is the latest out-like punch, else the last punch when there
///   is more than one;
/// - a single punch never yields a check-out, and a positional check-out
///   equal to the check-in is dropped, so a lone or duplicated punch reads as
///   "in, not yet out".
///
/// Pure: the same set always gives the same answer.
pub fn resolve(punches: &DailyPunchSet, codes: &StatusCodes) -> Resolution {
    let marks = punches.ordered_times();

    let earliest_in = marks
        .iter()
        .filter(|m| codes.is_in(m.status_code))
        .map(|m| m.time)
        .min();
    let latest_out = marks
        .iter()
        .filter(|m| codes.is_out(m.status_code))
        .map(|m| m.time)
        .max();

    let check_in = earliest_in.unwrap_or_else(|| punches.first().time);

    let check_out = match latest_out {
        // a lone punch is "in, not yet out" whatever its status
        Some(_) if marks.len() == 1 => None,
        Some(time) => Some(time),
        None if marks.len() > 1 => Some(punches.last().time).filter(|out| *out != check_in),
        None => None,
    };

    let confidence = match (earliest_in.is_some(), latest_out.is_some()) {
        (true, true) => Confidence::Explicit,
        (false, false) => Confidence::Positional,
        _ => Confidence::Partial,
    };

    Resolution {
        check_in,
        check_out,
        confidence,
    }
}
