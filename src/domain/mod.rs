// Domain layer: plan model and the ports the engine drives. No process or network code here.

pub mod model;
pub mod ports;
