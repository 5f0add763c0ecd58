use chrono::{DateTime, Local, Utc};

/// 当前时间（Unix 纪元秒，带毫秒小数）
pub fn unix_seconds_now() -> f64 {
    Utc::now().timestamp_millis() as f64 / 1000.0
}

/// 将本地时间格式化为 YYYY-MM-DD HH:MM:SS.mmm
pub fn format_timestamp(time: &DateTime<Local>) -> String {
    time.format("%Y-%m-%d %H:%M:%S%.3f").to_string()
}

/// 把秒数格式化为紧凑文本：整数不带小数点，其余保留一位小数
pub fn format_seconds(seconds: f64) -> String {
    if seconds.fract() == 0.0 && seconds.abs() < 1e15 {
        format!("{}", seconds as i64)
    } else {
        format!("{:.1}", seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn timestamp_has_millisecond_precision() {
        let time = Local.with_ymd_and_hms(2024, 3, 9, 7, 5, 1).unwrap();
        assert_eq!(format_timestamp(&time), "2024-03-09 07:05:01.000");
    }

    #[test]
    fn whole_seconds_print_without_fraction() {
        assert_eq!(format_seconds(12.0), "12");
        assert_eq!(format_seconds(0.0), "0");
        assert_eq!(format_seconds(3.5), "3.5");
    }

    #[test]
    fn now_is_after_2020() {
        assert!(unix_seconds_now() > 1_577_836_800.0);
    }
}
