use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};

/// One finished game. Never modified after it is created.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameRecord {
    pub id: u64,
    pub size: usize,
    /// Seconds from first tick to the winning move.
    pub time: f64,
    pub date: DateTime<Utc>,
}

impl GameRecord {
    pub fn new(size: usize, time: f64) -> Self {
        Self {
            id: rand::random(),
            size,
            time,
            date: Utc::now(),
        }
    }

    pub fn formatted_time(&self) -> String {
        format_time(self.time, 2, false)
    }

    pub fn formatted_date(&self) -> String {
        self.date
            .with_timezone(&Local)
            .format("%b %-d, %Y %H:%M")
            .to_string()
    }
}

/// Formats seconds as `M:SS`, `M:SS.d` or `M:SS.dd`.
///
/// Fractions are truncated. `decimals` above 2 is treated as 2.
pub fn format_time(secs: f64, decimals: u8, pad_minutes: bool) -> String {
    let secs = secs.max(0.0);
    let whole = secs.trunc() as u64;
    let minutes = whole / 60;
    let seconds = whole % 60;
    let minutes = if pad_minutes {
        format!("{:02}", minutes)
    } else {
        minutes.to_string()
    };

    match decimals {
        0 => format!("{}:{:02}", minutes, seconds),
        1 => {
            let tenths = (secs.fract() * 10.0) as u64;
            format!("{}:{:02}.{}", minutes, seconds, tenths)
        }
        _ => {
            let hundredths = (secs.fract() * 100.0) as u64;
            format!("{}:{:02}.{:02}", minutes, seconds, hundredths)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn leaderboard_format() {
        let record = GameRecord::new(8, 65.42);
        assert_eq!(record.formatted_time(), "1:05.42");
        assert_eq!(GameRecord::new(10, 0.0).formatted_time(), "0:00.00");
        assert_eq!(GameRecord::new(6, 12.5).formatted_time(), "0:12.50");
    }

    #[test]
    fn timer_formats() {
        assert_eq!(format_time(125.75, 1, true), "02:05.7");
        assert_eq!(format_time(0.0, 1, true), "00:00.0");
        assert_eq!(format_time(59.99, 0, true), "00:59");
        assert_eq!(format_time(600.25, 2, true), "10:00.25");
    }

    #[test]
    fn new_records_get_distinct_ids() {
        let a = GameRecord::new(8, 1.0);
        let b = GameRecord::new(8, 1.0);
        assert_ne!(a.id, b.id);
    }
}
