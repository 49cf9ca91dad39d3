// Domain layer: models and ports. Adapters and components depend on this, never the reverse.

pub mod model;
pub mod ports;
