// Movement failure memory.
//
// A time-windowed ledger of recently failed movements, keyed by the
// movement's source position and kind. Each record counts attempts and
// remembers when the last one failed. Future searches read a frozen
// `FailureSnapshot` of the ledger and multiply each candidate's cost by
// `penalty_for`, so repeatedly failing transitions drift out of plans
// without the provider knowing anything about failures.
//
// Growth is bounded by expiry rather than eviction: records older than the
// memory duration read as absent immediately and are physically removed by
// `cleanup()`, which the orchestrator calls every few hundred ticks.
//
// All methods take `now` explicitly so tests can control time.
//
// See also: `executor.rs` (records failures), `context.rs` (carries the
// snapshot into the search), `provider.rs` (applies the penalty).

use crate::config::PathingConfig;
use crate::costs::COST_INF;
use crate::movement::MovementKind;
use crate::types::BlockPos;
use rustc_hash::FxHashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// The failure-memory parameters, extracted from `PathingConfig`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FailureParams {
    pub enabled: bool,
    pub multiplier: f64,
    pub max_penalty: f64,
    pub max_attempts: u32,
    pub duration: Duration,
}

impl FailureParams {
    pub fn from_config(config: &PathingConfig) -> Self {
        Self {
            enabled: config.failure_memory_enabled,
            multiplier: config.failure_multiplier,
            max_penalty: config.failure_max_penalty,
            max_attempts: config.failure_max_attempts,
            duration: Duration::from_millis(config.failure_memory_duration_ms),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FailureRecord {
    pub attempts: u32,
    pub last_failure: Instant,
}

type FailureKey = (BlockPos, MovementKind);

fn penalty(params: &FailureParams, record: Option<&FailureRecord>, now: Instant) -> f64 {
    let Some(record) = record else {
        return 1.0;
    };
    if !params.enabled || now.saturating_duration_since(record.last_failure) > params.duration {
        return 1.0;
    }
    if record.attempts >= params.max_attempts {
        return COST_INF;
    }
    let exponent = i32::try_from(record.attempts).unwrap_or(i32::MAX);
    params.multiplier.powi(exponent).min(params.max_penalty)
}

/// The live ledger, owned by the orchestrator.
#[derive(Debug)]
pub struct FailureMemory {
    params: FailureParams,
    records: FxHashMap<FailureKey, FailureRecord>,
}

impl FailureMemory {
    pub fn new(params: FailureParams) -> Self {
        Self {
            params,
            records: FxHashMap::default(),
        }
    }

    pub fn params(&self) -> FailureParams {
        self.params
    }

    /// Replace the parameters. Existing records are kept.
    pub fn set_params(&mut self, params: FailureParams) {
        self.params = params;
    }

    /// Count one more failure of `kind` from `pos`. An expired record starts
    /// over from one attempt.
    pub fn record_failure(&mut self, pos: BlockPos, kind: MovementKind, now: Instant) {
        if !self.params.enabled {
            return;
        }
        let duration = self.params.duration;
        let record = self.records.entry((pos, kind)).or_insert(FailureRecord {
            attempts: 0,
            last_failure: now,
        });
        if now.saturating_duration_since(record.last_failure) > duration {
            record.attempts = 0;
        }
        record.attempts = record.attempts.saturating_add(1);
        record.last_failure = now;
    }

    /// Cost multiplier for `kind` from `pos`: 1.0 when there is no live
    /// record, `COST_INF` once the attempt limit is reached, otherwise
    /// `multiplier ^ attempts` capped at the maximum penalty.
    pub fn penalty_for(&self, pos: BlockPos, kind: MovementKind, now: Instant) -> f64 {
        penalty(&self.params, self.records.get(&(pos, kind)), now)
    }

    pub fn record(&self, pos: BlockPos, kind: MovementKind) -> Option<&FailureRecord> {
        self.records.get(&(pos, kind))
    }

    /// Remove every expired record. Returns how many were removed.
    pub fn cleanup(&mut self, now: Instant) -> usize {
        let duration = self.params.duration;
        let before = self.records.len();
        self.records
            .retain(|_, r| now.saturating_duration_since(r.last_failure) <= duration);
        before - self.records.len()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    /// Freeze the current records for a search. Penalties are evaluated
    /// against `taken_at` so a search sees one consistent picture.
    pub fn snapshot(&self, taken_at: Instant) -> FailureSnapshot {
        let live: FxHashMap<FailureKey, FailureRecord> = if self.params.enabled {
            self.records
                .iter()
                .filter(|(_, r)| {
                    taken_at.saturating_duration_since(r.last_failure) <= self.params.duration
                })
                .map(|(k, r)| (*k, *r))
                .collect()
        } else {
            FxHashMap::default()
        };
        FailureSnapshot {
            params: self.params,
            records: Arc::new(live),
            taken_at,
        }
    }
}

/// Immutable view of the ledger handed to one search.
#[derive(Clone, Debug)]
pub struct FailureSnapshot {
    params: FailureParams,
    records: Arc<FxHashMap<FailureKey, FailureRecord>>,
    taken_at: Instant,
}

impl FailureSnapshot {
    /// A snapshot with no records; every penalty is 1.0.
    pub fn empty() -> Self {
        Self {
            params: FailureParams::from_config(&PathingConfig::default()),
            records: Arc::new(FxHashMap::default()),
            taken_at: Instant::now(),
        }
    }

    pub fn penalty_for(&self, pos: BlockPos, kind: MovementKind) -> f64 {
        if self.records.is_empty() {
            return 1.0;
        }
        penalty(&self.params, self.records.get(&(pos, kind)), self.taken_at)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
