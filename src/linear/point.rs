//! Samples emitted by the linear tracer and their running quality tallies.
use serde::Serialize;

/// One sample of a straight 3D line and what the images show around it.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PointInfo {
    /// `[x, y, z]` in cm.
    pub xyz: [f32; 3],
    pub tick: f32,
    pub row: usize,
    pub cols: Vec<usize>,
    pub plane_has_charge: Vec<bool>,
    pub plane_has_badch: Vec<bool>,
    pub planes_with_charge: usize,
    /// Every plane has charge or a bad channel near the sample.
    pub good: bool,
}

impl PointInfo {
    pub fn same_pixel(&self, row: usize, cols: &[usize]) -> bool {
        self.row == row && self.cols == cols
    }

    pub fn num_planes(&self) -> usize {
        self.cols.len()
    }

    pub fn has_charge_on_all_planes(&self) -> bool {
        self.planes_with_charge == self.num_planes()
    }

    pub fn has_charge_on_majority(&self) -> bool {
        self.planes_with_charge * 2 > self.num_planes()
    }

    pub fn is_empty(&self) -> bool {
        self.planes_with_charge == 0 && !self.plane_has_badch.iter().any(|&b| b)
    }
}

/// Ordered samples plus the tallies the orchestrator's acceptance tests use.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PointInfoList {
    pub points: Vec<PointInfo>,
    pub num_all_charge: usize,
    pub num_all_badch: usize,
    pub num_all_empty: usize,
    pub num_good: usize,
    pub num_majority: usize,
}

impl PointInfoList {
    pub fn push(&mut self, pt: PointInfo) {
        if pt.has_charge_on_all_planes() {
            self.num_all_charge += 1;
        }
        if pt.planes_with_charge == 0 && pt.good {
            self.num_all_badch += 1;
        }
        if pt.is_empty() {
            self.num_all_empty += 1;
        }
        if pt.good {
            self.num_good += 1;
        }
        if pt.has_charge_on_majority() {
            self.num_majority += 1;
        }
        self.points.push(pt);
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn last(&self) -> Option<&PointInfo> {
        self.points.last()
    }

    fn fraction(&self, count: usize) -> f32 {
        if self.points.is_empty() {
            0.0
        } else {
            count as f32 / self.points.len() as f32
        }
    }

    pub fn fraction_good(&self) -> f32 {
        self.fraction(self.num_good)
    }

    pub fn fraction_has_charge_with_all_planes(&self) -> f32 {
        self.fraction(self.num_all_charge)
    }

    pub fn fraction_has_badch_on_all_planes(&self) -> f32 {
        self.fraction(self.num_all_badch)
    }

    pub fn fraction_empty(&self) -> f32 {
        self.fraction(self.num_all_empty)
    }

    pub fn fraction_has_charge_on_majority_of_planes(&self) -> f32 {
        self.fraction(self.num_majority)
    }

    /// Fraction of points with charge on at least two planes inside the
    /// first and last `window_fraction` of the trace.
    ///
    /// The window holds at least one point on non-empty traces, so a trace
    /// shorter than `1 / window_fraction` points is scored on its first and
    /// last point instead of scoring zero.
    pub fn end_goodness(&self, window_fraction: f32) -> (f32, f32) {
        let len = self.points.len();
        if len == 0 {
            return (0.0, 0.0);
        }
        let n = ((len as f32 * window_fraction.clamp(0.0, 1.0)).floor() as usize).clamp(1, len);
        let charged = |pts: &[PointInfo]| {
            pts.iter()
                .filter(|p| p.planes_with_charge >= p.num_planes().min(2))
                .count() as f32
                / n as f32
        };
        (charged(&self.points[..n]), charged(&self.points[len - n..]))
    }
}
