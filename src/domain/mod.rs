// Domain layer: client records, field rules and the ports the pipeline is built on.

pub mod fields;
pub mod model;
pub mod ports;
