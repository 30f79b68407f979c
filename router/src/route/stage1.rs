use groute_common::model::Net;

use crate::congestion::{CongestionMap2D, FastRouteCost};
use crate::error::RoutingError;
use crate::route::edge_shift::VertexFlute;
use crate::route::lshape;
use crate::steiner::{RsmtOracle, SteinerTree};
use crate::twopin::{self, TwoPinElement2D};

/// Stage 1's output: one Steiner tree per net, plus every net's two-pin
/// elements (already routed and committed into the congestion map).
pub struct Stage1Output {
    pub trees: Vec<SteinerTree>,
    pub elements: Vec<TwoPinElement2D>,
}

/// Stage-1 initial 2-D routing (spec.md §1): for every net, get a Steiner
/// tree from the oracle, optionally edge-shift it, decompose it into
/// two-pin elements, then L-route and commit each one. Nets are processed
/// in input order — the only order that keeps stage 1 itself deterministic
/// without depending on anything stage 2 computes.
pub fn run(
    nets: &[Net],
    oracle: &dyn RsmtOracle,
    map: &mut CongestionMap2D,
    monotonic_en: bool,
) -> Result<Stage1Output, RoutingError> {
    let mut trees = Vec::with_capacity(nets.len());
    let mut elements = Vec::new();
    let model = FastRouteCost {
        congestion_penalty: 1.0,
    };

    for net in nets {
        let mut tree = oracle.solve(&net.pins)?;
        tree.validate(net.id)?;

        if monotonic_en && tree.branch.len() > tree.deg {
            let mut flute = VertexFlute::from_tree(&tree);
            flute.shift_edges(net.id, map, &model);
            tree = flute.to_tree(net.id, tree.deg)?;
        }

        let mut net_elements = twopin::decompose(&tree, net.id);
        for element in &mut net_elements {
            lshape::route_and_commit(element, map, &model);
        }

        elements.extend(net_elements);
        trees.push(tree);
    }

    Ok(Stage1Output { trees, elements })
}
