//! Date parsing for tax plates.

use chrono::NaiveDate;

use super::patterns::DATE_DMY;

/// Parse a single date value such as `15.01.2020`, `1/5/2020` or `15-01-2020`.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    let caps = DATE_DMY.captures(value)?;
    if caps.get(0)?.as_str().len() != value.len() {
        return None;
    }
    let day: u32 = caps[1].parse().ok()?;
    let month: u32 = caps[2].parse().ok()?;
    let year: i32 = caps[3].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_date_separators() {
        let expected = NaiveDate::from_ymd_opt(2020, 1, 15);
        assert_eq!(parse_date("15.01.2020"), expected);
        assert_eq!(parse_date("15/01/2020"), expected);
        assert_eq!(parse_date("15-01-2020"), expected);
        assert_eq!(parse_date("5.1.2020"), NaiveDate::from_ymd_opt(2020, 1, 5));
    }

    #[test]
    fn test_parse_date_rejects_invalid() {
        assert_eq!(parse_date("31.02.2020"), None);
        assert_eq!(parse_date("tarih yok"), None);
        assert_eq!(parse_date("15.01.2020 ek"), None);
    }
}
