use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// `Mon Jan 01 2024`, the shape the progress record has always used.
pub const DAY_FMT: &str = "%a %b %d %Y";

/// Completed focus sessions for one calendar day.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct DailyProgress {
    #[serde(with = "day_string")]
    pub date: NaiveDate,
    pub count: u32,
}

impl DailyProgress {
    pub fn new(today: NaiveDate) -> Self {
        Self { date: today, count: 0 }
    }

    /// The count that applies on `today`: a record from any other day is empty.
    pub fn for_day(self, today: NaiveDate) -> Self {
        if self.date == today {
            self
        } else {
            Self::new(today)
        }
    }

    /// Counts one finished focus session and returns the new total.
    pub fn record(&mut self, today: NaiveDate) -> u32 {
        *self = self.for_day(today);
        self.count += 1;
        self.count
    }
}

mod day_string {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    use super::DAY_FMT;

    pub fn serialize<S: Serializer>(date: &NaiveDate, s: S) -> Result<S::Ok, S::Error> {
        s.collect_str(&date.format(DAY_FMT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(d)?;
        NaiveDate::parse_from_str(&raw, DAY_FMT).map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_serializes_as_day_string() {
        let progress = DailyProgress { date: day(2024, 1, 1), count: 2 };

        assert_eq!(
            serde_json::to_string(&progress).unwrap(),
            r#"{"date":"Mon Jan 01 2024","count":2}"#
        );
    }

    #[test]
    fn test_parses_day_string() {
        let progress: DailyProgress =
            serde_json::from_str(r#"{"date":"Fri Mar 15 2024","count":7}"#).unwrap();

        assert_eq!(progress.date, day(2024, 3, 15));
        assert_eq!(progress.count, 7);
    }

    #[test]
    fn test_for_day() {
        let progress = DailyProgress { date: day(2024, 1, 1), count: 2 };

        assert_eq!(progress.for_day(day(2024, 1, 1)).count, 2);
        assert_eq!(progress.for_day(day(2024, 1, 2)).count, 0);
    }

    #[test]
    fn test_record_rolls_over_at_midnight() {
        let mut progress = DailyProgress { date: day(2024, 1, 1), count: 5 };

        assert_eq!(progress.record(day(2024, 1, 1)), 6);
        assert_eq!(progress.record(day(2024, 1, 2)), 1);
        assert_eq!(progress.date, day(2024, 1, 2));
    }
}
