use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::model::punch::{PunchEvent, PunchMark};

/// Terminal id → that id's punches on one date, in time order.
pub type PunchMap = BTreeMap<String, Vec<PunchMark>>;

/// Keeps the events of `target_date`, groups them by terminal id and sorts
/// each group by time.
///
/// Terminals hand back their whole rolling history, so events from other
/// dates are dropped without comment. Ids are used verbatim.
pub fn normalize<I>(events: I, target_date: NaiveDate) -> PunchMap
where
    I: IntoIterator<Item = PunchEvent>,
{
    let mut grouped = PunchMap::new();

    for event in events {
        if event.timestamp.date() != target_date {
            continue;
        }
        grouped
            .entry(event.employee_external_id)
            .or_default()
            .push(PunchMark {
                time: event.timestamp.time(),
                status_code: event.status_code,
            });
    }

    for marks in grouped.values_mut() {
        marks.sort_by_key(|m| m.time);
    }

    grouped
}

/// Folds one device's map into the run-wide map.
///
/// An employee may badge in on one terminal and out on another, so groups
/// with the same id are concatenated and re-sorted.
pub fn merge_into(target: &mut PunchMap, device_punches: PunchMap) {
    for (id, marks) in device_punches {
        let entry = target.entry(id).or_default();
        entry.extend(marks);
        entry.sort_by_key(|m| m.time);
    }
}
