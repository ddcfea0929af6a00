//! Local-time helpers

use chrono::{DateTime, FixedOffset, NaiveDate, Offset, Utc};

/// Fixed offset from a minute count, falling back to UTC when out of range.
pub fn offset_from_minutes(minutes: i32) -> FixedOffset {
    FixedOffset::east_opt(minutes.saturating_mul(60)).unwrap_or_else(|| Utc.fix())
}

/// Calendar date of `now` as seen in the restaurant's local offset.
pub fn local_date(now: DateTime<Utc>, offset: FixedOffset) -> NaiveDate {
    now.with_timezone(&offset).date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn local_date_crosses_midnight() {
        let ist = offset_from_minutes(330);
        // 20:00 UTC is 01:30 the next day in IST
        let now = Utc.with_ymd_and_hms(2025, 7, 27, 20, 0, 0).unwrap();
        assert_eq!(
            local_date(now, ist),
            NaiveDate::from_ymd_opt(2025, 7, 28).unwrap()
        );
        assert_eq!(
            local_date(now, offset_from_minutes(0)),
            NaiveDate::from_ymd_opt(2025, 7, 27).unwrap()
        );
    }

    #[test]
    fn out_of_range_offset_falls_back_to_utc() {
        assert_eq!(offset_from_minutes(100_000).local_minus_utc(), 0);
    }
}
