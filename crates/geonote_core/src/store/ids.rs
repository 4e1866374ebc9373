//! Marker id allocation.
//!
//! Ids track the wall clock in epoch milliseconds but are bumped past every
//! id already seen, so two creates in the same tick (or after the clock
//! stepped back) still get distinct, increasing ids.

use crate::model::marker::MarkerId;
use std::time::{SystemTime, UNIX_EPOCH};

/// Current wall-clock time in Unix epoch milliseconds.
pub fn system_clock_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}

/// Picks the next id given the clock reading and every id already in use.
///
/// Returns `None` when an id of `i64::MAX` is already taken, since no larger
/// id exists.
pub(crate) fn next_marker_id(
    now_ms: i64,
    last_issued: Option<MarkerId>,
    existing: impl IntoIterator<Item = MarkerId>,
) -> Option<MarkerId> {
    let floor = match existing.into_iter().chain(last_issued).max() {
        Some(highest) => highest.checked_add(1)?,
        None => i64::MIN,
    };
    Some(now_ms.max(floor))
}

#[cfg(test)]
mod tests {
    use super::next_marker_id;

    #[test]
    fn uses_clock_when_ahead_of_existing_ids() {
        assert_eq!(next_marker_id(1_000, Some(10), [5, 9]), Some(1_000));
    }

    #[test]
    fn bumps_past_highest_id_when_clock_stalls() {
        assert_eq!(next_marker_id(1_000, None, [1_000]), Some(1_001));
        assert_eq!(
            next_marker_id(1_000, Some(1_004), [1_000, 1_002]),
            Some(1_005)
        );
    }

    #[test]
    fn remembers_issued_ids_after_they_leave_the_collection() {
        assert_eq!(next_marker_id(500, Some(900), std::iter::empty()), Some(901));
    }

    #[test]
    fn exhausted_when_max_id_is_taken() {
        assert_eq!(next_marker_id(1_000, None, [i64::MAX]), None);
        assert_eq!(next_marker_id(1_000, Some(i64::MAX), [1]), None);
        assert_eq!(next_marker_id(i64::MAX, None, [7]), Some(i64::MAX));
    }
}
