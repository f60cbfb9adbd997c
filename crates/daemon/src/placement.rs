// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Placement engine (spec §4.4).
//!
//! Grounded on `other_examples/30c9eba5_..cluster.rs` (RisingWave's
//! `ClusterManager`): snapshot the registry, filter by liveness and capacity, score
//! the survivors, and take the best — the registry's own lock is never held across
//! this decision (spec §3 invariant 6, §5).

use corral_core::{ResourceSample, WorkerId, WorkerRecord};

/// Score a candidate's resource sample (spec §4.4).
///
/// Free capacity dominates utilization only weakly: a heavily packed but otherwise
/// idle node still loses to an equally-loaded node with headroom.
pub fn score(sample: &ResourceSample) -> f64 {
    let headroom = if sample.capacity == 0 {
        0.0
    } else {
        1.0 - (sample.container_count as f64 / sample.capacity as f64)
    };
    0.30 * (100.0 - sample.cpu_pct)
        + 0.30 * (100.0 - sample.mem_pct)
        + 0.20 * (100.0 - sample.disk_pct)
        + 0.20 * 100.0 * headroom
}

/// Choose a worker for a new container from a registry snapshot (spec §4.4).
///
/// Filters to `Connected` workers whose last heartbeat is within
/// `liveness_window_ms` and which have spare capacity, then picks the highest
/// score. Ties break toward the earliest-registered worker (stable snapshot
/// order); returns `None` ("no candidate") if nothing survives the filter.
pub fn select(snapshot: &[WorkerRecord], now_ms: u64, liveness_window_ms: u64) -> Option<WorkerId> {
    let mut best: Option<(&WorkerRecord, f64)> = None;
    for worker in snapshot {
        if !worker.is_eligible(now_ms, liveness_window_ms) {
            continue;
        }
        let candidate_score = score(&worker.sample);
        best = match best {
            None => Some((worker, candidate_score)),
            Some((incumbent, incumbent_score)) => {
                if candidate_score > incumbent_score
                    || (candidate_score == incumbent_score
                        && worker.registered_at_ms < incumbent.registered_at_ms)
                {
                    Some((worker, candidate_score))
                } else {
                    Some((incumbent, incumbent_score))
                }
            }
        };
    }
    best.map(|(worker, _)| worker.id.clone())
}

#[cfg(test)]
#[path = "placement_tests.rs"]
mod tests;
