use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};

#[derive(Default, Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StatisticsPeriod {
    Daily,
    Monthly,
    Yearly,
    #[default]
    All,
}

impl StatisticsPeriod {
    /// Inclusive lower bound on `created_at` for the period containing `now` (UTC calendar).
    pub fn since(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let date = now.date_naive();
        let start = match self {
            StatisticsPeriod::Daily => date,
            StatisticsPeriod::Monthly => NaiveDate::from_ymd_opt(date.year(), date.month(), 1)?,
            StatisticsPeriod::Yearly => NaiveDate::from_ymd_opt(date.year(), 1, 1)?,
            StatisticsPeriod::All => return None,
        };
        Some(Utc.from_utc_datetime(&start.and_hms_opt(0, 0, 0)?))
    }
}
