//! Date formats accepted in content metadata, plus HTTP-date handling.

use time::{
    Date, OffsetDateTime, PrimitiveDateTime, UtcOffset, format_description::BorrowedFormatItem,
    format_description::well_known::Rfc3339, macros::format_description,
};

const LONG_DATE: &[BorrowedFormatItem<'static>] =
    format_description!("[day padding:none] [month repr:long case_sensitive:false] [year]");
const SHORT_DATE: &[BorrowedFormatItem<'static>] =
    format_description!("[day padding:none] [month repr:short case_sensitive:false] [year]");
const ISO_DATE: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");
const ISO_DATETIME: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");
const CTIME_WITH_OFFSET: &[BorrowedFormatItem<'static>] = format_description!(
    "[weekday repr:short] [month repr:short] [day padding:none] [hour]:[minute]:[second] [offset_hour sign:mandatory][offset_minute] [year]"
);
const HTTP_DATE: &[BorrowedFormatItem<'static>] = format_description!(
    "[weekday repr:short], [day] [month repr:short] [year] [hour]:[minute]:[second] GMT"
);
const COMPACT_STAMP: &[BorrowedFormatItem<'static>] =
    format_description!("[year][month][day]-[hour][minute][second]");

// Serde adapter writing dates as `YYYY-MM-DD`.
time::serde::format_description!(pub iso_date_format, Date, "[year]-[month]-[day]");

/// Parse a calendar date from a `date` metadata value.
///
/// Accepts `29 December 2008`, `29 Dec 2008`, `2008-12-29`, and any of the
/// timestamp forms understood by [`parse_timestamp`].
pub fn parse_date(value: &str) -> Option<Date> {
    let value = value.trim();
    Date::parse(value, LONG_DATE)
        .or_else(|_| Date::parse(value, SHORT_DATE))
        .or_else(|_| Date::parse(value, ISO_DATE))
        .ok()
        .or_else(|| parse_timestamp(value).map(|stamp| stamp.date()))
}

/// Parse a point in time, e.g. `Sun Nov 23 13:15:47 +0000 2008` or RFC 3339.
///
/// Forms without an offset are taken as UTC.
pub fn parse_timestamp(value: &str) -> Option<OffsetDateTime> {
    let value = value.trim();
    OffsetDateTime::parse(value, CTIME_WITH_OFFSET)
        .or_else(|_| OffsetDateTime::parse(value, &Rfc3339))
        .ok()
        .or_else(|| {
            PrimitiveDateTime::parse(value, ISO_DATETIME)
                .ok()
                .map(PrimitiveDateTime::assume_utc)
        })
}

/// `YYYY-MM-DD`, as used in tag URIs.
pub fn iso_date(date: Date) -> String {
    date.format(ISO_DATE).unwrap_or_default()
}

/// `YYYYMMDD-HHMMSS` in UTC, as used in comment file names.
pub fn compact_stamp(stamp: OffsetDateTime) -> String {
    stamp
        .to_offset(UtcOffset::UTC)
        .format(COMPACT_STAMP)
        .unwrap_or_default()
}

/// Format an instant as an IMF-fixdate (`Sun, 06 Nov 1994 08:49:37 GMT`).
pub fn http_date(stamp: OffsetDateTime) -> String {
    stamp
        .to_offset(UtcOffset::UTC)
        .format(HTTP_DATE)
        .unwrap_or_default()
}

pub fn parse_http_date(value: &str) -> Option<OffsetDateTime> {
    PrimitiveDateTime::parse(value.trim(), HTTP_DATE)
        .ok()
        .map(PrimitiveDateTime::assume_utc)
}

#[cfg(test)]
mod tests {
    use time::macros::{date, datetime};

    use super::*;

    #[test]
    fn long_dates_with_and_without_padding() {
        assert_eq!(parse_date("01 January 2020"), Some(date!(2020 - 01 - 01)));
        assert_eq!(parse_date("29 December 2008"), Some(date!(2008 - 12 - 29)));
        assert_eq!(parse_date("3 march 2011"), Some(date!(2011 - 03 - 03)));
    }

    #[test]
    fn short_and_iso_dates() {
        assert_eq!(parse_date("2 Feb 2010"), Some(date!(2010 - 02 - 02)));
        assert_eq!(parse_date("2010-02-02"), Some(date!(2010 - 02 - 02)));
    }

    #[test]
    fn dates_fall_back_to_timestamps() {
        assert_eq!(
            parse_date("Sun Nov 23 13:15:47 +0000 2008"),
            Some(date!(2008 - 11 - 23))
        );
    }

    #[test]
    fn unparseable_dates_are_absent() {
        assert_eq!(parse_date("yesterday"), None);
        assert_eq!(parse_date(""), None);
    }

    #[test]
    fn ctime_timestamp_with_offset() {
        assert_eq!(
            parse_timestamp("Sun Nov 23 13:15:47 +0000 2008"),
            Some(datetime!(2008-11-23 13:15:47 UTC))
        );
        assert_eq!(
            parse_timestamp("2008-11-23 13:15:47"),
            Some(datetime!(2008-11-23 13:15:47 UTC))
        );
    }

    #[test]
    fn compact_stamp_is_utc() {
        let stamp = datetime!(2008-11-23 14:15:47 +01:00);
        assert_eq!(compact_stamp(stamp), "20081123-131547");
    }

    #[test]
    fn http_date_round_trip() {
        let stamp = datetime!(1994-11-06 08:49:37 UTC);
        let formatted = http_date(stamp);
        assert_eq!(formatted, "Sun, 06 Nov 1994 08:49:37 GMT");
        assert_eq!(parse_http_date(&formatted), Some(stamp));
    }
}
