use chrono::{DateTime, Local};

/// Timestamp layout used when printing readings.
pub fn pretty_ts(ts: &DateTime<Local>) -> String {
    ts.format("%Y-%m-%d %H:%M:%S%.3f").to_string()
}

/// Joins a reading and its unit, leaving out the unit for empty readings.
pub fn with_unit(text: &str, unit: &str) -> String {
    if text.is_empty() {
        String::new()
    } else {
        format!("{} {}", text, unit)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn formats_milliseconds() {
        let ts = Local
            .with_ymd_and_hms(2024, 3, 1, 12, 30, 5)
            .single()
            .expect("unambiguous local time");
        assert_eq!(pretty_ts(&ts), "2024-03-01 12:30:05.000");
    }

    #[test]
    fn unit_is_appended() {
        assert_eq!(with_unit("1.5", "V"), "1.5 V");
        assert_eq!(with_unit("", "V"), "");
    }
}
