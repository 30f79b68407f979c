use groute_common::db::NetId;

/// One net's standing for `sort_net_order` (spec.md §4.8): degree, 2-D
/// bounding-box size, and how much overflow it contributed during stage 2.
#[derive(Clone, Debug)]
pub struct NetOrderingInput {
    pub net_id: NetId,
    pub degree: usize,
    pub bbox: i64,
    pub overflow_contribution: u64,
}

/// Order nets for layer assignment: highest degree first, then largest
/// bounding box, then largest overflow contribution, each net committing
/// to `cur_map_3d` before the next is assigned (spec.md §4.8). Ties break
/// on `net_id` for a total order independent of input order.
pub fn sort_net_order(mut nets: Vec<NetOrderingInput>) -> Vec<NetOrderingInput> {
    nets.sort_by(|a, b| {
        b.degree
            .cmp(&a.degree)
            .then_with(|| b.bbox.cmp(&a.bbox))
            .then_with(|| b.overflow_contribution.cmp(&a.overflow_contribution))
            .then_with(|| a.net_id.index().cmp(&b.net_id.index()))
    });
    nets
}
