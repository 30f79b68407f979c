use groute_common::util::RoutingParams;

use crate::congestion::{CongestionMap2D, HistoryCost};
use crate::route::range_router;
use crate::twopin::TwoPinElement2D;

pub struct Stage2Report {
    pub iterations_run: usize,
    pub final_overflow: u32,
}

/// Stage-2 rip-up/reroute (spec.md §4.7): the cooling schedule below follows
/// the pseudocode literally — `factor` shallow early, `adjust` (the history
/// exponent `k`) rising with iteration, `via_cost` computed here for layer
/// assignment to default to if the caller doesn't override it.
pub fn run(
    elements: &mut [TwoPinElement2D],
    map: &mut CongestionMap2D,
    params: &RoutingParams,
) -> Stage2Report {
    let mut box_size = params.init_box_size;
    let mut final_overflow = map.total_overflow().min(u32::MAX as u64) as u32;
    let mut iterations_run = 0;

    for iter in 1..=params.max_iterations {
        let factor = 1.0 - (-5.0 * (-0.1 * iter as f64).exp()).exp();
        let adjust = iter as f64 * (1.25 + 3.0 * factor);

        let model = HistoryCost {
            congestion_penalty: 1.0,
            history_weight: 1.0,
            k: adjust,
        };

        map.pre_evaluate_all(&model);
        range_router::run_one_iteration(
            elements,
            map,
            &model,
            box_size,
            params.heuristic_weight,
            params.max_expansions,
        );

        let overflow = map.max_overflow(params.history_increment);
        iterations_run = iter;
        final_overflow = overflow;

        if overflow == 0 || overflow <= params.overflow_threshold {
            break;
        }
        box_size += params.box_size_inc;
    }

    Stage2Report {
        iterations_run,
        final_overflow,
    }
}

/// The `via_cost` term from spec.md §4.7's iteration schedule, as a default
/// fed to layer assignment when the caller doesn't supply one directly.
pub fn default_via_cost_weight(iteration: usize) -> u32 {
    let factor = 1.0 - (-5.0 * (-0.1 * iteration as f64).exp()).exp();
    (4.0 * factor).floor() as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use groute_common::db::NetId;
    use groute_common::geom::Coordinate2D;
    use groute_common::model::{RoutingRegion, UniformCapacity};

    #[test]
    fn stage2_drives_overflow_to_zero_on_s3() {
        // S3: 5x5 grid, cap 1 everywhere, two straight nets sharing a row.
        let region = RoutingRegion::new(5, 5, 1, Box::new(UniformCapacity::new(vec![2])));
        let mut map = CongestionMap2D::from_region(&region, false);
        let mut elements = vec![
            TwoPinElement2D {
                net: NetId::new(0),
                pin1: Coordinate2D::new(0, 2),
                pin2: Coordinate2D::new(4, 2),
                path: (0..=4).map(|x| Coordinate2D::new(x, 2)).collect(),
            },
            TwoPinElement2D {
                net: NetId::new(1),
                pin1: Coordinate2D::new(0, 2),
                pin2: Coordinate2D::new(4, 2),
                path: (0..=4).map(|x| Coordinate2D::new(x, 2)).collect(),
            },
        ];
        for e in &elements {
            map.insert_path(
                &e.path.iter().map(|c| (c.x, c.y)).collect::<Vec<_>>(),
                e.net,
            );
        }

        let params = RoutingParams {
            max_iterations: 30,
            init_box_size: 5,
            box_size_inc: 2,
            overflow_threshold: 0,
            ..RoutingParams::default()
        };

        let report = run(&mut elements, &mut map, &params);
        assert_eq!(report.final_overflow, 0);
    }

    #[test]
    fn default_via_cost_weight_is_monotone_in_early_iterations() {
        assert!(default_via_cost_weight(1) <= default_via_cost_weight(20));
    }
}
