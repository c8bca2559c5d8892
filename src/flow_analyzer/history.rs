// history.rs

use crate::global_variables::RETENTION_DAYS;
use crate::models::TrafficObservation;
use crate::shared_data::lock_guard;
use chrono::{DateTime, Duration, Local};
use std::collections::VecDeque;
use std::sync::Mutex;

/// Time-bounded log of traffic observations, oldest first.
///
/// Entries are kept sorted by timestamp. Observations normally arrive in
/// timestamp order, so insertion lands at the back and expiry pops from the
/// front. Append and prune happen under one lock.
#[derive(Debug)]
pub struct HistoryStore {
    retention: Duration,
    observations: Mutex<VecDeque<TrafficObservation>>,
}

impl Default for HistoryStore {
    fn default() -> Self {
        Self::new(Duration::days(RETENTION_DAYS))
    }
}

impl HistoryStore {
    pub fn new(retention: Duration) -> Self {
        Self {
            retention,
            observations: Mutex::new(VecDeque::new()),
        }
    }

    pub fn retention(&self) -> Duration {
        self.retention
    }

    /// Inserts `observation`, then drops everything older than the retention window.
    pub fn append(&self, observation: TrafficObservation) {
        self.append_all(std::iter::once(observation));
    }

    /// Inserts every observation and prunes once, all under one lock.
    pub fn append_all(&self, observations: impl IntoIterator<Item = TrafficObservation>) {
        let mut log = lock_guard(&self.observations);
        for observation in observations {
            let at = log.partition_point(|o| o.timestamp <= observation.timestamp);
            log.insert(at, observation);
        }
        if let Some(cutoff) = Local::now().checked_sub_signed(self.retention) {
            prune_before(&mut log, cutoff);
        }
    }

    /// Observations for `intersection_id` newer than `lookback_hours` ago, oldest first.
    ///
    /// A non-positive lookback matches nothing. A lookback reaching past the
    /// representable range matches every retained observation for the id.
    pub fn query(&self, intersection_id: &str, lookback_hours: i64) -> Vec<TrafficObservation> {
        if lookback_hours <= 0 {
            return Vec::new();
        }
        let cutoff = Duration::try_hours(lookback_hours)
            .and_then(|lookback| Local::now().checked_sub_signed(lookback));
        lock_guard(&self.observations)
            .iter()
            .filter(|o| o.intersection_id == intersection_id)
            .filter(|o| cutoff.map_or(true, |cutoff| o.timestamp > cutoff))
            .cloned()
            .collect()
    }

    /// Every retained observation, oldest first.
    pub fn snapshot(&self) -> Vec<TrafficObservation> {
        lock_guard(&self.observations).iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        lock_guard(&self.observations).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// False once a writer panicked while holding the log.
    pub fn is_healthy(&self) -> bool {
        !self.observations.is_poisoned()
    }
}

fn prune_before(log: &mut VecDeque<TrafficObservation>, cutoff: DateTime<Local>) {
    while log.front().is_some_and(|o| o.timestamp <= cutoff) {
        log.pop_front();
    }
}
