//! Bounded decision history for diagnostics.
//!
//! Records are kept in FIFO order. When the buffer grows past its capacity it
//! is compacted down to the compaction target, discarding the oldest records
//! first. History is never consulted when making decisions.

use std::collections::{BTreeMap, VecDeque};
use std::fmt;
use std::time::Instant;

use crate::action::{Action, ActionKind};
use crate::decision::ActionScore;

/// One recorded decision.
#[derive(Clone, Debug, PartialEq)]
pub struct DecisionRecord {
    /// Monotonic per-history counter, starting at 0.
    pub sequence: u64,
    pub action: Action,
    pub score: ActionScore,
    pub fallback: bool,
    pub recorded_at: Instant,
}

#[derive(Clone, Debug)]
pub struct DecisionHistory {
    records: VecDeque<DecisionRecord>,
    capacity: usize,
    compaction: usize,
    next_sequence: u64,
}

impl DecisionHistory {
    /// `compaction` is clamped to at most `capacity`.
    pub fn new(capacity: usize, compaction: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            records: VecDeque::with_capacity(capacity + 1),
            capacity,
            compaction: compaction.min(capacity),
            next_sequence: 0,
        }
    }

    pub fn push(&mut self, action: Action, score: ActionScore, fallback: bool) -> u64 {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        self.records.push_back(DecisionRecord {
            sequence,
            action,
            score,
            fallback,
            recorded_at: Instant::now(),
        });

        if self.records.len() > self.capacity {
            let evicted = self.records.len() - self.compaction;
            self.records.drain(..evicted);
            tracing::trace!(evicted, kept = self.records.len(), "compacted decision history");
        }
        sequence
    }

    /// All retained records, oldest first.
    pub fn records(&self) -> impl DoubleEndedIterator<Item = &DecisionRecord> + ExactSizeIterator {
        self.records.iter()
    }

    /// The `n` most recent records, oldest first.
    pub fn recent(&self, n: usize) -> impl Iterator<Item = &DecisionRecord> {
        let skip = self.records.len().saturating_sub(n);
        self.records.iter().skip(skip)
    }

    pub fn last(&self) -> Option<&DecisionRecord> {
        self.records.back()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Total decisions ever recorded, including evicted ones.
    pub fn total_recorded(&self) -> u64 {
        self.next_sequence
    }

    /// Aggregates the `n` most recent records.
    pub fn summary(&self, n: usize) -> HistorySummary {
        let mut summary = HistorySummary::default();
        let mut total_score = 0.0;
        for record in self.recent(n) {
            summary.window += 1;
            if record.fallback {
                summary.fallbacks += 1;
            }
            *summary.counts.entry(record.action.kind()).or_default() += 1;
            total_score += record.score.weighted_score();
        }
        if summary.window > 0 {
            summary.mean_weighted_score = total_score / summary.window as f32;
        }
        summary
    }
}

impl Default for DecisionHistory {
    fn default() -> Self {
        Self::new(
            crate::config::DecisionConfig::DEFAULT_HISTORY_CAPACITY,
            crate::config::DecisionConfig::DEFAULT_HISTORY_COMPACTION,
        )
    }
}

/// Aggregate view over a window of recent decisions.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct HistorySummary {
    pub window: usize,
    pub fallbacks: usize,
    pub counts: BTreeMap<ActionKind, usize>,
    pub mean_weighted_score: f32,
}

impl HistorySummary {
    /// Most frequent action kind; earlier-declared kinds win ties.
    pub fn dominant(&self) -> Option<ActionKind> {
        let mut best: Option<(ActionKind, usize)> = None;
        for (kind, count) in &self.counts {
            if best.is_none_or(|(_, c)| *count > c) {
                best = Some((*kind, *count));
            }
        }
        best.map(|(kind, _)| kind)
    }
}

impl fmt::Display for HistorySummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} decisions, {} fallback(s), mean score {:.2}",
            self.window, self.fallbacks, self.mean_weighted_score
        )?;
        for (kind, count) in &self.counts {
            write!(f, ", {kind}={count}")?;
        }
        Ok(())
    }
}
