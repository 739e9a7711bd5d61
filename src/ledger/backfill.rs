use chrono::NaiveDate;
use tracing::debug;

use super::{DayRecord, GameDescriptor, ResultLedger};

/// Materializes an empty record for every live day after the latest recorded one, up to
/// and including `today`. Existing records are never touched.
///
/// An empty ledger only gains `today`, and only when the game is live today. Returns the
/// number of inserted records; a second call with the same `today` inserts nothing.
pub fn backfill(ledger: &mut ResultLedger, game: &GameDescriptor, today: NaiveDate) -> usize {
    let Some(latest) = ledger.latest_date() else {
        if game.is_valid_day(today) {
            ledger.push_latest(DayRecord::new(today));
            debug!(prefix = game.prefix, %today, "Started ledger");
            return 1;
        }
        return 0;
    };

    let mut inserted = 0;
    let mut candidate = latest.succ_opt();
    while let Some(date) = candidate.filter(|date| *date <= today) {
        if game.is_valid_day(date) {
            ledger.push_latest(DayRecord::new(date));
            inserted += 1;
        }
        candidate = date.succ_opt();
    }

    if inserted > 0 {
        debug!(prefix = game.prefix, %latest, %today, inserted, "Backfilled ledger");
    }

    inserted
}
