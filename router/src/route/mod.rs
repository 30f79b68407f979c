pub mod edge_shift;
pub mod lshape;
pub mod maze;
pub mod postprocess;
pub mod range_router;
pub mod stage1;
pub mod stage2;
