pub mod calendar;
pub mod zones;

pub use calendar::{end_of_month, last_update_summary, month_name_pt};
pub use zones::{parse_naive_date, parse_naive_timestamp, SourceZone, ZoneSettings};
