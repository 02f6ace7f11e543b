use chrono::{DateTime, Datelike, FixedOffset, NaiveDateTime, Timelike};

use super::i18n::Locale;

const THAI_MONTHS: [&str; 12] = [
    "ม.ค.", "ก.พ.", "มี.ค.", "เม.ย.", "พ.ค.", "มิ.ย.", "ก.ค.", "ส.ค.", "ก.ย.", "ต.ค.", "พ.ย.", "ธ.ค.",
];

/// Buddhist-era offset used by Thai calendar years.
const BUDDHIST_ERA_OFFSET: i32 = 543;

/// How table cells show timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateStyle {
    pub locale: Locale,
    /// Zone to show zoned timestamps in. `None` keeps the zone they were
    /// sent with.
    pub offset: Option<FixedOffset>,
}

impl DateStyle {
    pub fn new(locale: Locale, offset: Option<FixedOffset>) -> Self {
        Self { locale, offset }
    }
}

impl From<Locale> for DateStyle {
    fn from(locale: Locale) -> Self {
        Self::new(locale, None)
    }
}

/// Timestamps without a zone are shown as received.
fn parse(raw: &str, offset: Option<FixedOffset>) -> Option<NaiveDateTime> {
    DateTime::<FixedOffset>::parse_from_rfc3339(raw)
        .map(|dt| match offset {
            Some(offset) => dt.with_timezone(&offset).naive_local(),
            None => dt.naive_local(),
        })
        .ok()
        .or_else(|| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f").ok())
        .or_else(|| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f").ok())
}

/// Short date and time for table cells: "5 ม.ค. 2567 14:30" or
/// "5 Jan 2024 14:30". Unparseable values are shown as received.
pub fn timestamp(raw: Option<&str>, style: impl Into<DateStyle>) -> String {
    let style = style.into();

    let Some(raw) = raw.filter(|s| !s.is_empty()) else {
        return "-".to_string();
    };

    let Some(at) = parse(raw, style.offset) else {
        return raw.to_string();
    };

    match style.locale {
        Locale::Th => format!(
            "{} {} {} {:02}:{:02}",
            at.day(),
            THAI_MONTHS[at.month0() as usize],
            at.year() + BUDDHIST_ERA_OFFSET,
            at.hour(),
            at.minute()
        ),
        Locale::En => at.format("%-d %b %Y %H:%M").to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thai_dates_use_buddhist_years() {
        assert_eq!(
            timestamp(Some("2024-01-05T14:30:00Z"), Locale::Th),
            "5 ม.ค. 2567 14:30"
        );
    }

    #[test]
    fn english_dates() {
        assert_eq!(
            timestamp(Some("2024-12-25T08:05:00.123+07:00"), Locale::En),
            "25 Dec 2024 08:05"
        );
        assert_eq!(
            timestamp(Some("2024-03-01T09:00:00"), Locale::En),
            "1 Mar 2024 09:00"
        );
    }

    #[test]
    fn zoned_stamps_shift_to_the_display_offset() {
        let bangkok = DateStyle::new(Locale::Th, FixedOffset::east_opt(7 * 3600));
        assert_eq!(
            timestamp(Some("2024-01-05T14:30:00Z"), bangkok),
            "5 ม.ค. 2567 21:30"
        );
        assert_eq!(
            timestamp(Some("2024-12-31T20:00:00Z"), bangkok),
            "1 ม.ค. 2568 03:00"
        );

        let utc = DateStyle::new(Locale::En, FixedOffset::east_opt(0));
        assert_eq!(
            timestamp(Some("2024-12-25T08:05:00+07:00"), utc),
            "25 Dec 2024 01:05"
        );
        // No zone to convert from
        assert_eq!(
            timestamp(Some("2024-03-01T09:00:00"), utc),
            "1 Mar 2024 09:00"
        );
    }

    #[test]
    fn missing_and_garbage_values() {
        assert_eq!(timestamp(None, Locale::Th), "-");
        assert_eq!(timestamp(Some(""), Locale::En), "-");
        assert_eq!(timestamp(Some("yesterday"), Locale::En), "yesterday");
    }
}
