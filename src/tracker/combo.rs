//! Per-pair bookkeeping carried from one pass to the next.
use super::options::PassOptions;
use crate::linear::PointInfoList;
use serde::Serialize;
use std::collections::BTreeMap;

/// Unordered endpoint pair, stored with `first < second`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct PairKey {
    pub first: usize,
    pub second: usize,
}

impl PairKey {
    pub fn new(a: usize, b: usize) -> Self {
        Self {
            first: a.min(b),
            second: a.max(b),
        }
    }
}

/// What a straight trace said about a pair.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComboInfo {
    pub goodstart: f32,
    pub goodend: f32,
    pub frac_good: f32,
    pub frac_majcharge: f32,
    pub track_made: bool,
    pub pass: usize,
}

impl ComboInfo {
    pub fn from_trace(trace: &PointInfoList, end_window_fraction: f32, pass: usize) -> Self {
        let (goodstart, goodend) = trace.end_goodness(end_window_fraction);
        Self {
            goodstart,
            goodend,
            frac_good: trace.fraction_good(),
            frac_majcharge: trace.fraction_has_charge_on_majority_of_planes(),
            track_made: false,
            pass,
        }
    }
}

/// Whether the lattice search should run for a pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum AStarGate {
    Run,
    AlreadyConnected,
    /// One end of the straight trace saw too little charge.
    WeakEnds,
    /// The straight trace as a whole saw too little charge.
    WeakTrace,
}

impl AStarGate {
    /// Gate from the latest straight-trace record; open without one.
    pub fn evaluate(info: Option<&ComboInfo>, pass: &PassOptions) -> Self {
        let Some(info) = info else {
            return AStarGate::Run;
        };
        if info.track_made {
            AStarGate::AlreadyConnected
        } else if info.goodstart < pass.min_end_goodness || info.goodend < pass.min_end_goodness {
            AStarGate::WeakEnds
        } else if info.frac_good < pass.astar3d_min_goodfrac || info.frac_majcharge < pass.astar3d_min_majfrac {
            AStarGate::WeakTrace
        } else {
            AStarGate::Run
        }
    }
}

/// One record per pair, the latest pass winning.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ComboTable {
    records: BTreeMap<PairKey, ComboInfo>,
}

impl ComboTable {
    pub fn get(&self, key: PairKey) -> Option<&ComboInfo> {
        self.records.get(&key)
    }

    pub fn record(&mut self, key: PairKey, info: ComboInfo) {
        self.records.insert(key, info);
    }

    /// Keep the trace fractions but flag the pair as connected.
    pub fn mark_connected(&mut self, key: PairKey, pass: usize) {
        let entry = self.records.entry(key).or_default();
        entry.track_made = true;
        entry.pass = pass;
    }

    pub fn is_connected(&self, key: PairKey) -> bool {
        self.records.get(&key).is_some_and(|c| c.track_made)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&PairKey, &ComboInfo)> {
        self.records.iter()
    }
}
