use groute_common::db::NetId;
use groute_common::geom::Coordinate2D;
use groute_common::model::{Net, RoutingRegion};
use groute_common::util::RoutingParams;

use crate::congestion::CongestionMap2D;
use crate::error::{ConfigError, RoutingError};
use crate::layer_assign::{self, CongestionMap3D, NetOrderingInput};
use crate::route::{postprocess, stage1, stage2};
use crate::steiner::RsmtOracle;

/// One segment of a net's final 3-D route (spec.md §6 Outputs): either a
/// planar run on a single layer, or a via stack bridging `[z_min, z_max]`
/// at one tile.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Segment3D {
    Wire {
        layer: u8,
        from: Coordinate2D,
        to: Coordinate2D,
    },
    Via {
        at: Coordinate2D,
        z_min: u8,
        z_max: u8,
    },
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct RoutingOutput {
    pub nets: Vec<(NetId, Vec<Segment3D>)>,
    pub stage2_iterations: usize,
    pub final_overflow: u32,
}

fn validate(region: &RoutingRegion, params: &RoutingParams, nets: &[Net]) -> Result<(), ConfigError> {
    if region.width == 0 || region.height == 0 {
        return Err(ConfigError::EmptyRegion {
            width: region.width,
            height: region.height,
        });
    }
    if region.layers == 0 {
        return Err(ConfigError::NoLayers);
    }
    if params.max_iterations == 0 {
        return Err(ConfigError::ZeroIterations);
    }
    for net in nets {
        for pin in &net.pins {
            if !region.contains(pin.x, pin.y) {
                return Err(ConfigError::PinOutOfBounds(net.id));
            }
        }
    }
    Ok(())
}

/// The engine's single entry point (spec.md §1): stage 1 initial routing,
/// stage 2 rip-up/reroute, post-processing, then KLAT layer assignment,
/// in that order. The congestion map, trees, and two-pin elements are all
/// owned locally and released when this call returns (spec.md §5 resource
/// cleanup).
pub fn route(
    region: &RoutingRegion,
    nets: &[Net],
    oracle: &dyn RsmtOracle,
    params: &RoutingParams,
) -> Result<RoutingOutput, RoutingError> {
    validate(region, params, nets)?;

    let mut map2d = CongestionMap2D::from_region(region, params.ibm_case);
    let stage1_out = stage1::run(nets, oracle, &mut map2d, params.monotonic_en)?;
    let mut elements = stage1_out.elements;

    let stage2_report = stage2::run(&mut elements, &mut map2d, params);

    let box_size = params.init_box_size
        + params.box_size_inc * stage2_report.iterations_run as u32;
    let final_overflow = postprocess::run(&mut elements, &mut map2d, params, box_size);

    let mut map3d = CongestionMap3D::from_region(region, params.via_capacity.max(1));

    let overflow_by_net = overflow_contribution_per_net(&elements, &map2d);
    let ordering_input: Vec<NetOrderingInput> = nets
        .iter()
        .map(|net| NetOrderingInput {
            net_id: net.id,
            degree: net.pin_count(),
            bbox: net.bbox_size(),
            overflow_contribution: overflow_by_net.get(&net.id).copied().unwrap_or(0),
        })
        .collect();
    let net_order = layer_assign::sort_net_order(ordering_input);

    let tree_by_net: std::collections::HashMap<NetId, &crate::steiner::SteinerTree> = nets
        .iter()
        .map(|n| n.id)
        .zip(stage1_out.trees.iter())
        .collect();

    let mut per_net_segments: Vec<(NetId, Vec<Segment3D>)> = Vec::with_capacity(nets.len());
    for ordered in &net_order {
        let tree = tree_by_net[&ordered.net_id];

        let chosen_layers =
            layer_assign::assign_layers(tree, ordered.net_id, region.layers, &mut map3d, params.via_cost_weight)?;

        let mut segments = Vec::new();
        for (i, branch) in tree.branch.iter().enumerate() {
            if i == tree.root {
                continue;
            }
            let parent = branch.parent;
            let layer = chosen_layers[i];
            map3d.commit_path(layer, &[branch.coord, tree.branch[parent].coord], ordered.net_id);
            segments.push(Segment3D::Wire {
                layer,
                from: branch.coord,
                to: tree.branch[parent].coord,
            });
        }
        for i in 0..tree.branch.len() {
            if i == tree.root {
                continue;
            }
            let parent = tree.branch[i].parent;
            let (lo, hi) = (chosen_layers[i].min(chosen_layers[parent]), chosen_layers[i].max(chosen_layers[parent]));
            if lo != hi {
                segments.push(Segment3D::Via {
                    at: tree.branch[i].coord,
                    z_min: lo,
                    z_max: hi,
                });
            }
        }

        per_net_segments.push((ordered.net_id, segments));
    }

    Ok(RoutingOutput {
        nets: per_net_segments,
        stage2_iterations: stage2_report.iterations_run,
        final_overflow,
    })
}

fn overflow_contribution_per_net(
    elements: &[crate::twopin::TwoPinElement2D],
    map: &CongestionMap2D,
) -> std::collections::HashMap<NetId, u64> {
    let mut totals = std::collections::HashMap::new();
    for element in elements {
        let mut sum = 0u64;
        for w in element.path.windows(2) {
            sum += map.edge(w[0].x, w[0].y, w[1].x, w[1].y).overflow() as u64;
        }
        *totals.entry(element.net).or_insert(0u64) += sum;
    }
    totals
}

#[cfg(test)]
mod tests {
    use super::*;
    use groute_common::model::UniformCapacity;

    use crate::steiner::HananMstOracle;

    #[test]
    fn routes_a_single_straight_net_end_to_end() {
        let region = RoutingRegion::new(6, 1, 1, Box::new(UniformCapacity::new(vec![2])));
        let nets = vec![Net::new(
            NetId::new(0),
            vec![Coordinate2D::new(0, 0), Coordinate2D::new(5, 0)],
        )];
        let oracle = HananMstOracle;
        let params = RoutingParams::default();
        let output = route(&region, &nets, &oracle, &params).unwrap();
        assert_eq!(output.nets.len(), 1);
        assert_eq!(output.final_overflow, 0);
    }

    #[test]
    fn identical_inputs_produce_identical_output() {
        // spec.md S6: no rand/rayon inside the engine itself, so running
        // the whole pipeline twice on the same region/nets/params must
        // yield bit-identical output.
        let region = RoutingRegion::new(10, 10, 2, Box::new(UniformCapacity::new(vec![2, 2])));
        let nets = vec![
            Net::new(NetId::new(0), vec![Coordinate2D::new(0, 0), Coordinate2D::new(9, 0)]),
            Net::new(NetId::new(1), vec![Coordinate2D::new(0, 1), Coordinate2D::new(9, 1)]),
            Net::new(
                NetId::new(2),
                vec![Coordinate2D::new(0, 0), Coordinate2D::new(9, 9), Coordinate2D::new(0, 9)],
            ),
        ];
        let oracle = HananMstOracle;
        let params = RoutingParams::default();

        let first = route(&region, &nets, &oracle, &params).unwrap();
        let second = route(&region, &nets, &oracle, &params).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn rejects_out_of_bounds_pins() {
        let region = RoutingRegion::new(4, 4, 1, Box::new(UniformCapacity::new(vec![2])));
        let nets = vec![Net::new(
            NetId::new(0),
            vec![Coordinate2D::new(0, 0), Coordinate2D::new(10, 0)],
        )];
        let oracle = HananMstOracle;
        let params = RoutingParams::default();
        let err = route(&region, &nets, &oracle, &params).unwrap_err();
        assert!(matches!(err, RoutingError::Config(ConfigError::PinOutOfBounds(_))));
    }
}
