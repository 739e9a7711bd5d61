use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::LedgerError;

/// Format used for day labels, both on disk and when rendering
pub const DAY_LABEL_FORMAT: &str = "%d/%m/%Y";

/// One calendar day's score entries for a single game
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayRecord {
    #[serde(with = "day_label")]
    pub date: NaiveDate,
    #[serde(default)]
    pub positions: BTreeMap<String, u32>,
}

impl DayRecord {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            positions: BTreeMap::new(),
        }
    }

    pub fn label(&self) -> String {
        self.date.format(DAY_LABEL_FORMAT).to_string()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn points_for(&self, user: &str) -> Option<u32> {
        self.positions.get(user).copied()
    }

    /// Positions sorted by points descending, ties broken by handle
    pub fn ranked(&self) -> Vec<(&str, u32)> {
        let mut ranked: Vec<(&str, u32)> = self
            .positions
            .iter()
            .map(|(user, points)| (user.as_str(), *points))
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        ranked
    }
}

/// Adds `amount` to `user`'s entry, creating it when missing
pub fn add_points(mut record: DayRecord, user: &str, amount: u32) -> DayRecord {
    *record.positions.entry(user.to_string()).or_insert(0) += amount;
    record
}

/// Day records for one (chat, game), most recent first with strictly decreasing dates
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<DayRecord>", into = "Vec<DayRecord>")]
pub struct ResultLedger {
    days: Vec<DayRecord>,
}

impl ResultLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn days(&self) -> &[DayRecord] {
        &self.days
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    pub fn latest_date(&self) -> Option<NaiveDate> {
        self.days.first().map(|day| day.date)
    }

    pub fn day(&self, date: NaiveDate) -> Option<&DayRecord> {
        self.days.iter().find(|day| day.date == date)
    }

    /// Prepends a day newer than every recorded one
    pub(crate) fn push_latest(&mut self, record: DayRecord) {
        debug_assert!(self.latest_date().map_or(true, |latest| record.date > latest));
        self.days.insert(0, record);
    }

    /// Credits `user` on `date`, returning their new total for that day.
    ///
    /// The matching record is taken out, updated and put back where it belongs, so the
    /// ordering holds even if the date was never materialized.
    pub fn credit(&mut self, date: NaiveDate, user: &str, amount: u32) -> u32 {
        let record = match self.days.iter().position(|day| day.date == date) {
            Some(index) => self.days.remove(index),
            None => DayRecord::new(date),
        };

        let record = add_points(record, user, amount);
        let total = record.points_for(user).unwrap_or_default();

        let index = self
            .days
            .iter()
            .position(|day| day.date < date)
            .unwrap_or(self.days.len());
        self.days.insert(index, record);

        total
    }
}

impl TryFrom<Vec<DayRecord>> for ResultLedger {
    type Error = LedgerError;

    fn try_from(days: Vec<DayRecord>) -> Result<Self, Self::Error> {
        for pair in days.windows(2) {
            if pair[0].date <= pair[1].date {
                return Err(LedgerError::OutOfOrder {
                    earlier: pair[0].date,
                    later: pair[1].date,
                });
            }
        }
        Ok(Self { days })
    }
}

impl From<ResultLedger> for Vec<DayRecord> {
    fn from(ledger: ResultLedger) -> Self {
        ledger.days
    }
}

mod day_label {
    use super::DAY_LABEL_FORMAT;
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&date.format(DAY_LABEL_FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveDate::parse_from_str(&raw, DAY_LABEL_FORMAT).map_err(serde::de::Error::custom)
    }
}
