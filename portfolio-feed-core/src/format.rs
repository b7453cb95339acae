use chrono::{DateTime, Utc};

pub const WORDS_PER_MINUTE: usize = 200;

/// Long English date, e.g. `March 15, 2024`.
pub fn format_date(timestamp: Option<DateTime<Utc>>) -> String {
    match timestamp {
        Some(ts) => ts.format("%B %-d, %Y").to_string(),
        None => "Date not available".to_string(),
    }
}

/// Estimated reading time, rounded up to whole minutes.
pub fn reading_time(content: &str) -> String {
    let words = content.split_whitespace().count();
    format!("{} min", words.div_ceil(WORDS_PER_MINUTE))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn dates_are_long_form() {
        let ts = Utc.with_ymd_and_hms(2024, 3, 5, 10, 0, 0).unwrap();
        assert_eq!(format_date(Some(ts)), "March 5, 2024");
        assert_eq!(format_date(None), "Date not available");
    }

    #[test]
    fn reading_time_rounds_up() {
        assert_eq!(reading_time(""), "0 min");
        assert_eq!(reading_time("one two three"), "1 min");
        let long = "word ".repeat(401);
        assert_eq!(reading_time(&long), "3 min");
    }
}
