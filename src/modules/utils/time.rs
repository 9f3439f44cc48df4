use chrono::{DateTime, Local, TimeZone};
use std::time::{SystemTime, UNIX_EPOCH};

/// Format a detection time the way it appears in notification bodies
pub fn format_detection_time<Tz: TimeZone>(time: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    time.format("%Y-%m-%d %H:%M:%S %:z").to_string()
}

/// Current local time
pub fn now() -> DateTime<Local> {
    Local::now()
}

/// Get current Unix timestamp
pub fn get_current_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

/// Format duration in seconds to human readable string
pub fn format_duration(seconds: u64) -> String {
    if seconds < 60 {
        format!("{} seconds", seconds)
    } else if seconds < 3600 {
        format!("{} minutes", seconds / 60)
    } else if seconds < 86400 {
        format!("{} hours", seconds / 3600)
    } else {
        format!("{} days", seconds / 86400)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_detection_time_formatting() {
        let time = Utc.with_ymd_and_hms(2021, 1, 1, 9, 30, 0).unwrap();
        assert_eq!(format_detection_time(&time), "2021-01-01 09:30:00 +00:00");
    }

    #[test]
    fn test_current_timestamp() {
        let timestamp = get_current_timestamp();
        assert!(timestamp > 0);
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs();
        assert!(now - timestamp < 60);
    }

    #[test]
    fn test_duration_formatting() {
        assert_eq!(format_duration(30), "30 seconds");
        assert_eq!(format_duration(90), "1 minutes");
        assert_eq!(format_duration(3600), "1 hours");
        assert_eq!(format_duration(86400), "1 days");
    }
}
