///! Station filtering and ordering for launch records.

use super::types::LaunchRecord;

/// Select the records for one station, newest first.
///
/// Matching is exact string equality on `short_name`. Ordering compares the
/// raw ISO-8601 date strings, which sort chronologically as long as the feed
/// uses a fixed offset; a record without a date carries an empty string and
/// therefore sorts last. The sort is stable, so equal dates keep their feed
/// order.
pub fn select_station(records: Vec<LaunchRecord>, short_name: &str) -> Vec<LaunchRecord> {
    let mut matched: Vec<LaunchRecord> = records
        .into_iter()
        .filter(|record| record.short_name == short_name)
        .collect();

    matched.sort_by(|a, b| b.launch_date.cmp(&a.launch_date));
    matched
}
