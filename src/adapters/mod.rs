// Adapters layer: concrete implementations of the domain ports (reqwest transport, host sources).

pub mod host;
pub mod reqwest_transport;

pub use host::StaticHost;
pub use reqwest_transport::{ReqwestResponse, ReqwestTransport, TransportSettings};
