use chrono::{DateTime, Datelike, FixedOffset, NaiveDate};

pub const LAST_UPDATE_FORMAT: &str = "%d/%m/%Y %Hh%Mmin";

const MONTHS_PT: [&str; 12] = [
    "Janeiro",
    "Fevereiro",
    "Março",
    "Abril",
    "Maio",
    "Junho",
    "Julho",
    "Agosto",
    "Setembro",
    "Outubro",
    "Novembro",
    "Dezembro",
];

pub fn end_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    if !(1..=12).contains(&month) {
        return None;
    }
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)?.pred_opt()
}

pub fn month_name_pt(date: NaiveDate) -> &'static str {
    MONTHS_PT[date.month0() as usize]
}

pub fn last_update_summary(
    funds_min: Option<DateTime<FixedOffset>>,
    communications_min: Option<DateTime<FixedOffset>>,
) -> String {
    match (funds_min, communications_min) {
        (Some(a), Some(b)) => a.min(b).format(LAST_UPDATE_FORMAT).to_string(),
        _ => "-".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn end_of_month_handles_february_and_december() {
        assert_eq!(end_of_month(2024, 2), NaiveDate::from_ymd_opt(2024, 2, 29));
        assert_eq!(end_of_month(2023, 2), NaiveDate::from_ymd_opt(2023, 2, 28));
        assert_eq!(end_of_month(2023, 12), NaiveDate::from_ymd_opt(2023, 12, 31));
        assert_eq!(end_of_month(2023, 13), None);
        assert_eq!(end_of_month(2023, 0), None);
    }

    #[test]
    fn portuguese_month_names() {
        let d = NaiveDate::from_ymd_opt(2024, 3, 31).unwrap();
        assert_eq!(month_name_pt(d), "Março");
    }

    #[test]
    fn summary_takes_the_older_timestamp() {
        let tz = FixedOffset::west_opt(3 * 3600).unwrap();
        let funds = tz.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap();
        let comms = tz.with_ymd_and_hms(2024, 1, 14, 10, 30, 0).unwrap();
        assert_eq!(
            last_update_summary(Some(funds), Some(comms)),
            "14/01/2024 10h30min"
        );
    }

    #[test]
    fn summary_is_dash_when_a_side_is_empty() {
        let tz = FixedOffset::west_opt(3 * 3600).unwrap();
        let funds = tz.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap();
        assert_eq!(last_update_summary(Some(funds), None), "-");
        assert_eq!(last_update_summary(None, None), "-");
    }
}
