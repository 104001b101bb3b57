// Domain layer: value types and the ports the poller talks through.

pub mod model;
pub mod ports;
