// Domain layer: response-shape models and ports (interfaces) toward the transport, host source and sockets.

pub mod model;
pub mod ports;
