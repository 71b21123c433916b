//! Daily index page address.

use chrono::NaiveDate;

/// Index page for `date`: `<base>/<YYYY><MM><DD>/`.
pub fn entrypoint_for(base_url: &str, date: NaiveDate) -> String {
    format!("{}/{}/", base_url.trim_end_matches('/'), date.format("%Y%m%d"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    #[test]
    fn test_entrypoint_zero_pads_month_and_day() {
        let date = NaiveDate::from_ymd_opt(2022, 5, 1).unwrap();
        assert_eq!(entrypoint_for("https://ria.ru", date), "https://ria.ru/20220501/");
    }

    #[test]
    fn test_entrypoint_tolerates_trailing_slash() {
        let date = NaiveDate::from_ymd_opt(2023, 12, 31).unwrap();
        assert_eq!(entrypoint_for("https://ria.ru/", date), "https://ria.ru/20231231/");
    }

    #[test]
    fn test_entrypoint_segment_for_every_day_of_a_leap_year() {
        let mut date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        while date.year() == 2024 {
            let url = entrypoint_for("https://ria.ru", date);
            let segment = url
                .trim_start_matches("https://ria.ru/")
                .trim_end_matches('/');
            let expected = format!("{:04}{:02}{:02}", date.year(), date.month(), date.day());
            assert_eq!(segment, expected);
            date = date.succ_opt().unwrap();
        }
    }
}
