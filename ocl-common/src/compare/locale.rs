//! Locale sequence canonicalization

use crate::models::LocaleRecord;

/// Priority group of a locale record; lower sorts first
fn group(record: &LocaleRecord) -> u8 {
    match (record.is_fully_specified(), record.locale_preferred) {
        (true, true) => 0,
        (false, true) => 1,
        (true, false) => 2,
        (false, false) => 3,
    }
}

/// Order locale records as: fully specified + preferred, other preferred,
/// fully specified non-preferred, everything else.
///
/// The sort is stable, so relative order inside each group is kept and
/// the function is idempotent. Both sides of a comparison go through
/// this so equivalent locales tend to land on the same row.
pub fn canonicalize_locales(records: Vec<LocaleRecord>) -> Vec<LocaleRecord> {
    let mut records = records;
    records.sort_by_key(group);
    records
}
