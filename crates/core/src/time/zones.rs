use chrono::{DateTime, FixedOffset, Local, NaiveDate, NaiveDateTime, TimeZone};
use chrono_tz::Tz;

// Scrapers stamp rows with a naive `datetime.now()`; pandas writes it with
// microseconds when present.
const TIMESTAMP_FORMATS: [&str; 7] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
    "%Y/%m/%d %Hh%Mmin",
    "%d/%m/%Y %Hh%Mmin",
];

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%d/%m/%Y", "%Y/%m/%d"];

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SourceZone {
    Local,
    Named(Tz),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoneSettings {
    pub source: SourceZone,
    pub reference: Tz,
}

impl ZoneSettings {
    pub fn new(source: Option<Tz>, reference: Tz) -> Self {
        Self {
            source: source.map(SourceZone::Named).unwrap_or(SourceZone::Local),
            reference,
        }
    }

    /// Ambiguous wall-clock times (DST fall-back) resolve to the earlier instant;
    /// times inside a DST gap have no instant and yield `None`.
    pub fn localize(&self, naive: NaiveDateTime) -> Option<DateTime<FixedOffset>> {
        let utc = match self.source {
            SourceZone::Local => Local
                .from_local_datetime(&naive)
                .earliest()?
                .with_timezone(&chrono::Utc),
            SourceZone::Named(tz) => tz
                .from_local_datetime(&naive)
                .earliest()?
                .with_timezone(&chrono::Utc),
        };
        Some(utc.with_timezone(&self.reference).fixed_offset())
    }

    pub fn localize_raw(&self, raw: &str) -> Option<DateTime<FixedOffset>> {
        self.localize(parse_naive_timestamp(raw)?)
    }
}

impl Default for ZoneSettings {
    fn default() -> Self {
        Self::new(None, crate::config::DEFAULT_REFERENCE_TZ)
    }
}

pub fn parse_naive_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let t = raw.trim();
    if t.is_empty() {
        return None;
    }

    for fmt in TIMESTAMP_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(t, fmt) {
            return Some(dt);
        }
    }

    // Date-only cells are midnight.
    parse_naive_date(t).and_then(|d| d.and_hms_opt(0, 0, 0))
}

pub fn parse_naive_date(raw: &str) -> Option<NaiveDate> {
    let t = raw.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(t, fmt).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    fn naive(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    #[test]
    fn parses_pandas_timestamps() {
        let dt = parse_naive_timestamp("2024-01-15 10:30:12.345678").unwrap();
        assert_eq!(dt.date(), NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
        assert_eq!((dt.hour(), dt.minute(), dt.second()), (10, 30, 12));

        assert_eq!(
            parse_naive_timestamp("2024-01-15 10:30:00"),
            Some(naive(2024, 1, 15, 10, 30))
        );
        assert_eq!(
            parse_naive_timestamp("15/01/2024 10:30"),
            Some(naive(2024, 1, 15, 10, 30))
        );
        assert_eq!(
            parse_naive_timestamp("2024-01-15"),
            Some(naive(2024, 1, 15, 0, 0))
        );
        assert_eq!(parse_naive_timestamp("ontem"), None);
    }

    #[test]
    fn converts_utc_source_into_sao_paulo() {
        let zones = ZoneSettings::new(Some(chrono_tz::UTC), chrono_tz::America::Sao_Paulo);
        let dt = zones.localize(naive(2024, 1, 15, 10, 30)).unwrap();
        assert_eq!(dt.to_rfc3339(), "2024-01-15T07:30:00-03:00");
    }

    #[test]
    fn same_zone_keeps_wall_clock() {
        let zones = ZoneSettings::new(
            Some(chrono_tz::America::Sao_Paulo),
            chrono_tz::America::Sao_Paulo,
        );
        let dt = zones.localize(naive(2024, 6, 1, 9, 0)).unwrap();
        assert_eq!(dt.naive_local(), naive(2024, 6, 1, 9, 0));
    }

    #[test]
    fn dst_gap_has_no_instant() {
        // 2024-03-10 02:30 does not exist in New York.
        let zones = ZoneSettings::new(Some(chrono_tz::America::New_York), chrono_tz::UTC);
        assert!(zones.localize(naive(2024, 3, 10, 2, 30)).is_none());
    }
}
