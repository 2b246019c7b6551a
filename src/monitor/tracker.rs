//! Hysteresis tracking for the primary endpoint.

use arc_swap::ArcSwapOption;
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Owns the two timestamps the hysteresis windows are measured against:
/// when the primary was first observed down, and when it was first observed
/// back up. The two are mutually exclusive - folding in an observation that
/// sets one clears the other.
///
/// `down_since` marks the *start* of a downtime episode: it is written with
/// compare-and-set-if-absent semantics so later DOWN observations (including
/// ones from an overlapping poll) cannot move it. There is no equivalent
/// tracker for the secondary - losing the actively-serving secondary is
/// reported immediately rather than waited out.
#[derive(Default)]
pub struct HysteresisTracker {
    down_since: ArcSwapOption<DateTime<Utc>>,
    up_since: ArcSwapOption<DateTime<Utc>>,
}

impl HysteresisTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one primary health observation into the tracker.
    pub fn observe(&self, primary_up: bool, now: DateTime<Utc>) {
        if primary_up {
            if let Some(went_down) = self.down_since.swap(None) {
                let downtime = now.signed_duration_since(*went_down);
                tracing::info!("Primary endpoint back up at {} after {}s down", now, downtime.num_seconds());
            }
            self.up_since.compare_and_swap(&None::<Arc<DateTime<Utc>>>, Some(Arc::new(now)));
        } else {
            let previous = self
                .down_since
                .compare_and_swap(&None::<Arc<DateTime<Utc>>>, Some(Arc::new(now)));
            if previous.is_none() {
                tracing::info!("Primary endpoint went down at {}", now);
            }
            self.up_since.store(None);
        }
    }

    pub fn down_since(&self) -> Option<DateTime<Utc>> {
        self.down_since.load_full().map(|ts| *ts)
    }

    pub fn up_since(&self) -> Option<DateTime<Utc>> {
        self.up_since.load_full().map(|ts| *ts)
    }

    /// Drop both stamps. Used by manual switches and administrative resets,
    /// which invalidate any in-progress hysteresis window.
    pub fn clear(&self) {
        self.down_since.store(None);
        self.up_since.store(None);
    }
}
