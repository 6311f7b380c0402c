use chrono::{DateTime, Utc};

/// Get current UTC timestamp
pub fn now_utc() -> DateTime<Utc> {
    Utc::now()
}

/// Convert timestamp to human readable format
pub fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

/// Calculate time difference in hours
pub fn time_diff_hours(start: DateTime<Utc>, end: DateTime<Utc>) -> i64 {
    (end - start).num_hours()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_time_diff_hours() {
        let start = Utc::now();
        let end = start + Duration::hours(19);
        assert_eq!(time_diff_hours(start, end), 19);
    }

    #[test]
    fn test_format_timestamp() {
        let formatted = format_timestamp(Utc::now());
        assert!(formatted.ends_with("UTC"));
    }
}
