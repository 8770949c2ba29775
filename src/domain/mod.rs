// Domain layer: the student record, run results, and the ports the pipeline talks through.

pub mod model;
pub mod ports;
