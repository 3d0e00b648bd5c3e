use serde::Deserialize;

/// Parameters of the 3D lattice search.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct AStarOptions {
    /// Per-plane threshold on the compressed charge image.
    pub threshold: Vec<f32>,
    /// Per-plane neighbor cube radius (lattice steps); the largest is used.
    pub neighborhood: Vec<usize>,
    /// Lattice steps around the start node admitted regardless of charge.
    pub start_padding: usize,
    /// Lattice steps around the goal node admitted regardless of charge.
    pub end_padding: usize,
    /// Lattice steps added around the start/goal bounding box.
    pub lattice_padding: usize,
    /// Allow nodes covered by bad channels instead of charge.
    pub accept_badch_nodes: bool,
    /// Planes that must see charge (or a bad channel) for a node to be usable.
    pub min_nplanes_w_hitpixel: usize,
    pub restrict_path: bool,
    /// Largest distance (cm) from the start→goal line when `restrict_path`.
    pub path_restriction_radius: f32,
    /// Node expansions before the search gives up.
    pub max_expansions: usize,
    /// Paths with a larger share of bad-channel nodes are rejected.
    pub max_badch_fraction: f32,
    /// Extra edge cost per fully tagged node, see [`super::finder`].
    pub tagged_cost_penalty: f32,
}

impl Default for AStarOptions {
    fn default() -> Self {
        Self {
            threshold: vec![50.0, 50.0, 100.0],
            neighborhood: vec![5, 5, 5],
            start_padding: 3,
            end_padding: 3,
            lattice_padding: 10,
            accept_badch_nodes: true,
            min_nplanes_w_hitpixel: 3,
            restrict_path: true,
            path_restriction_radius: 30.0,
            max_expansions: 200_000,
            max_badch_fraction: 0.5,
            tagged_cost_penalty: 1.0,
        }
    }
}
