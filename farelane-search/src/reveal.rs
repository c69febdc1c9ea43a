use std::collections::{BTreeMap, BTreeSet};

use farelane_shared::FlightRecord;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RevealConfig {
    pub skeleton_window_ms: u64,
    pub group_interval_ms: u64,
}

impl Default for RevealConfig {
    fn default() -> Self {
        Self {
            skeleton_window_ms: 600,
            group_interval_ms: 250,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RevealPhase {
    /// No search observed yet, everything is visible.
    Idle,
    Skeleton { until_ms: i64 },
    Revealing { next_at_ms: i64 },
    Done,
}

/// Skeleton window followed by one airline group per interval.
///
/// The controller is timer-free: callers feed it the current time through
/// [`ProgressiveReveal::advance`] and use [`ProgressiveReveal::next_deadline`]
/// to decide when to call again.
#[derive(Debug, Clone)]
pub struct ProgressiveReveal {
    config: RevealConfig,
    search_id: Option<u64>,
    phase: RevealPhase,
    revealed: BTreeSet<String>,
}

impl ProgressiveReveal {
    pub fn new(config: RevealConfig) -> Self {
        Self {
            config,
            search_id: None,
            phase: RevealPhase::Idle,
            revealed: BTreeSet::new(),
        }
    }

    pub fn phase(&self) -> &RevealPhase {
        &self.phase
    }

    pub fn search_id(&self) -> Option<u64> {
        self.search_id
    }

    /// Register the search whose results are on screen.
    ///
    /// A repeat notification for the same id is ignored. A new id drops any
    /// pending reveal and starts over at the skeleton, unless that id was
    /// already revealed once (e.g. before a reload). Returns whether the
    /// reveal restarted.
    pub fn observe(&mut self, search_id: u64, started_at_ms: i64, now_ms: i64, already_applied: bool) -> bool {
        if self.search_id == Some(search_id) {
            return false;
        }

        self.search_id = Some(search_id);
        self.revealed.clear();

        if already_applied {
            debug!("Search #{} was already revealed, showing everything", search_id);
            self.phase = RevealPhase::Done;
            return true;
        }

        let elapsed = now_ms.saturating_sub(started_at_ms).max(0);
        let remaining = (self.config.skeleton_window_ms as i64 - elapsed).max(0);
        self.phase = RevealPhase::Skeleton {
            until_ms: now_ms + remaining,
        };
        debug!("Search #{} in skeleton for {}ms", search_id, remaining);
        true
    }

    /// Forget the current search; everything becomes visible again.
    pub fn reset(&mut self) {
        self.search_id = None;
        self.phase = RevealPhase::Idle;
        self.revealed.clear();
    }

    /// Move the reveal forward to `now_ms`. Returns the search id once the
    /// last pending group has been shown, so the caller can persist the
    /// marker.
    pub fn advance(&mut self, now_ms: i64, flights: &[FlightRecord]) -> Option<u64> {
        if let RevealPhase::Skeleton { until_ms } = self.phase {
            if now_ms < until_ms {
                return None;
            }
            self.phase = RevealPhase::Revealing { next_at_ms: until_ms };
        }

        let RevealPhase::Revealing { mut next_at_ms } = self.phase else {
            return None;
        };

        let mut pending = self.pending_groups(flights).into_iter();
        let mut next = pending.next();
        while let Some(airline) = next.take() {
            if now_ms < next_at_ms {
                next = Some(airline);
                break;
            }
            debug!("Revealing airline group {:?}", airline);
            self.revealed.insert(airline);
            next_at_ms += self.config.group_interval_ms as i64;
            next = pending.next();
        }

        if next.is_none() {
            self.phase = RevealPhase::Done;
            if let Some(id) = self.search_id {
                info!("Progressive reveal finished for search #{}", id);
            }
            return self.search_id;
        }

        self.phase = RevealPhase::Revealing { next_at_ms };
        None
    }

    /// What the traveller may see right now.
    pub fn visible(&self, flights: &[FlightRecord]) -> Vec<FlightRecord> {
        match self.phase {
            RevealPhase::Idle | RevealPhase::Done => flights.to_vec(),
            RevealPhase::Skeleton { .. } => Vec::new(),
            RevealPhase::Revealing { .. } => flights
                .iter()
                .filter(|f| self.revealed.contains(&f.airline_name))
                .cloned()
                .collect(),
        }
    }

    pub fn is_skeleton(&self) -> bool {
        matches!(self.phase, RevealPhase::Skeleton { .. })
    }

    pub fn is_revealing(&self) -> bool {
        matches!(self.phase, RevealPhase::Skeleton { .. } | RevealPhase::Revealing { .. })
    }

    /// When the next call to `advance` can change anything.
    pub fn next_deadline(&self) -> Option<i64> {
        match self.phase {
            RevealPhase::Skeleton { until_ms } => Some(until_ms),
            RevealPhase::Revealing { next_at_ms } => Some(next_at_ms),
            _ => None,
        }
    }

    fn pending_groups(&self, flights: &[FlightRecord]) -> Vec<String> {
        reveal_groups(flights)
            .into_keys()
            .filter(|name| !self.revealed.contains(name))
            .collect()
    }
}

/// Flights grouped by airline name, in ascending name order.
pub fn reveal_groups(flights: &[FlightRecord]) -> BTreeMap<String, Vec<FlightRecord>> {
    let mut groups: BTreeMap<String, Vec<FlightRecord>> = BTreeMap::new();
    for flight in flights {
        groups.entry(flight.airline_name.clone()).or_default().push(flight.clone());
    }
    groups
}
