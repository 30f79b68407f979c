use groute_common::util::RoutingParams;

use crate::congestion::{CongestionMap2D, HistoryCost};
use crate::route::range_router;
use crate::twopin::TwoPinElement2D;

/// Post-processing (spec.md §4.9): after stage 2 stops improving, run a
/// handful of extra range-router passes with a widened window and a
/// relaxed history weight, to mop up any overflow stage 2's cooling
/// schedule left behind. Reuses stage 2's primitives directly — spec.md
/// names no new routing mechanism for this phase.
pub fn run(
    elements: &mut [TwoPinElement2D],
    map: &mut CongestionMap2D,
    params: &RoutingParams,
    stage2_box_size: u32,
) -> u32 {
    let mut box_size = stage2_box_size;
    let model = HistoryCost {
        congestion_penalty: 1.0,
        history_weight: 0.5,
        k: 1.0,
    };

    let mut overflow = map.max_overflow(params.history_increment);

    for _ in 0..params.postprocess_passes {
        if overflow == 0 {
            break;
        }
        map.pre_evaluate_all(&model);
        range_router::run_one_iteration(
            elements,
            map,
            &model,
            box_size,
            params.heuristic_weight,
            params.max_expansions,
        );
        overflow = map.max_overflow(params.history_increment);
        box_size += params.postprocess_box_growth;
    }

    overflow
}
