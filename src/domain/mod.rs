// Domain layer: records, regions and the derived aggregates, plus the ports the core depends on.

pub mod model;
pub mod ports;
