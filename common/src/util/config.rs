use serde::Deserialize;

/// Stage-1/stage-2/KLAT routing parameters (spec.md §6 "Routing parameters").
#[derive(Debug, Clone, Deserialize)]
pub struct RoutingParams {
    /// `iteration_p2`: maximum number of stage-2 rip-up/reroute iterations.
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,

    /// `init_box_size_p2`: side length (tiles) of a range-router window at
    /// iteration 0.
    #[serde(default = "default_init_box_size")]
    pub init_box_size: u32,

    /// `box_size_inc_p2`: growth of the window side length per iteration.
    #[serde(default = "default_box_size_inc")]
    pub box_size_inc: u32,

    /// Stage 2 stops once `maxOverflow() <= overflow_threshold`.
    #[serde(default = "default_overflow_threshold")]
    pub overflow_threshold: u32,

    /// Enable monotonic preprocessing before pattern routing.
    #[serde(default)]
    pub monotonic_en: bool,

    /// `IBM_CASE`: no wire spacing, use full per-layer capacity instead of
    /// half. A runtime flag rather than a build-time `cfg` switch (spec.md
    /// §9 Open Questions — see DESIGN.md).
    #[serde(default)]
    pub ibm_case: bool,

    /// Weight applied to the Manhattan heuristic in the maze router.
    #[serde(default = "default_heuristic_weight")]
    pub heuristic_weight: f64,

    /// How much `CongestionEdge2D::history` grows each time `maxOverflow`
    /// observes an edge in overflow. Spec.md describes history as simply
    /// "incremented"; this is exposed as a parameter instead of a hardcoded
    /// `+1` so the cooling schedule can be tuned without recompiling.
    #[serde(default = "default_history_increment")]
    pub history_increment: u32,

    /// Additional range-router/maze-router passes run after stage 2
    /// terminates (spec.md §4.9 post-processing).
    #[serde(default = "default_postprocess_passes")]
    pub postprocess_passes: usize,

    /// Window-size growth applied once per post-processing pass, on top of
    /// wherever stage 2 left `BOXSIZE_INC`.
    #[serde(default = "default_postprocess_box_growth")]
    pub postprocess_box_growth: u32,

    /// Default via-cost weight for layer assignment when the caller does
    /// not derive one from the stage-2 iteration schedule.
    #[serde(default = "default_via_cost_weight")]
    pub via_cost_weight: u32,

    /// Maximum number of distinct nets allowed to stack a via at one
    /// `(x,y)` tile (spec.md §4.8 `viasOverflowing`), independent of
    /// `via_cost_weight` — one is a per-unit-distance cost, the other a
    /// physical stacking limit.
    #[serde(default = "default_via_capacity")]
    pub via_capacity: u32,

    /// Hard cap on maze-router node expansions per search, independent of
    /// the window bound (a safety valve against pathological windows).
    #[serde(default = "default_max_expansions")]
    pub max_expansions: u32,
}

impl Default for RoutingParams {
    fn default() -> Self {
        Self {
            max_iterations: default_max_iterations(),
            init_box_size: default_init_box_size(),
            box_size_inc: default_box_size_inc(),
            overflow_threshold: default_overflow_threshold(),
            monotonic_en: false,
            ibm_case: false,
            heuristic_weight: default_heuristic_weight(),
            history_increment: default_history_increment(),
            postprocess_passes: default_postprocess_passes(),
            postprocess_box_growth: default_postprocess_box_growth(),
            via_cost_weight: default_via_cost_weight(),
            via_capacity: default_via_capacity(),
            max_expansions: default_max_expansions(),
        }
    }
}

fn default_max_iterations() -> usize {
    50
}
fn default_init_box_size() -> u32 {
    10
}
fn default_box_size_inc() -> u32 {
    5
}
fn default_overflow_threshold() -> u32 {
    0
}
fn default_heuristic_weight() -> f64 {
    1.0
}
fn default_history_increment() -> u32 {
    1
}
fn default_postprocess_passes() -> usize {
    3
}
fn default_postprocess_box_growth() -> u32 {
    10
}
fn default_via_cost_weight() -> u32 {
    1
}
fn default_via_capacity() -> u32 {
    4
}
fn default_max_expansions() -> u32 {
    200_000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let p = RoutingParams::default();
        assert!(p.max_iterations > 0);
        assert!(p.init_box_size > 0);
    }

    #[test]
    fn deserializes_from_partial_toml() {
        let toml_str = "max_iterations = 10\nibm_case = true\n";
        let p: RoutingParams = toml::from_str(toml_str).expect("parse");
        assert_eq!(p.max_iterations, 10);
        assert!(p.ibm_case);
        assert_eq!(p.box_size_inc, default_box_size_inc());
    }
}
