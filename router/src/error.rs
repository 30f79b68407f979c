use groute_common::db::NetId;
use thiserror::Error;

/// Malformed or contradictory `RoutingParams` / `RoutingRegion` input.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("region has zero width or height ({width}x{height})")]
    EmptyRegion { width: u32, height: u32 },

    #[error("region has zero layers")]
    NoLayers,

    #[error("max_iterations must be nonzero")]
    ZeroIterations,

    #[error("net {0:?} has a pin outside the routing region")]
    PinOutOfBounds(NetId),
}

/// A precondition the engine assumes internally was violated; these indicate
/// a bug in the router itself rather than bad input.
#[derive(Debug, Error)]
pub enum InternalInvariant {
    #[error("edge plane index out of range: layer={layer} ({x1},{y1})-({x2},{y2})")]
    EdgeIndexOutOfRange {
        layer: u8,
        x1: i32,
        y1: i32,
        x2: i32,
        y2: i32,
    },

    #[error("coordinates ({x1},{y1}) and ({x2},{y2}) are not grid-adjacent")]
    NonAdjacentEndpoints { x1: i32, y1: i32, x2: i32, y2: i32 },

    #[error("steiner tree for net {0:?} is disconnected")]
    DisconnectedTree(NetId),

    #[error("vertex handle {0} is a tombstone")]
    DeadHandle(usize),
}

/// The RSMT oracle failed to produce a tree for a net.
#[derive(Debug, Error)]
pub enum OracleError {
    #[error("net {0:?} has no pins")]
    EmptyNet(NetId),

    #[error("oracle returned a tree with {returned} branches for {expected} pins")]
    MalformedTree { expected: usize, returned: usize },
}

/// Stage 2 rip-up/reroute failed to drive overflow to the configured
/// threshold within `max_iterations`.
#[derive(Debug, Error)]
pub enum RoutingFailure {
    #[error(
        "stage 2 did not converge after {iterations} iterations (remaining overflow {overflow})"
    )]
    DidNotConverge { iterations: usize, overflow: u32 },

    #[error("net {0:?} could not be routed within the search budget")]
    Unroutable(NetId),
}

#[derive(Debug, Error)]
pub enum RoutingError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Oracle(#[from] OracleError),

    #[error(transparent)]
    Internal(#[from] InternalInvariant),

    #[error(transparent)]
    Failure(#[from] RoutingFailure),
}
