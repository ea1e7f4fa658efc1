pub mod connector;
pub mod request;

pub use crate::domain::model::{Model, Paginated};
pub use crate::domain::ports::{AmbientHost, SocketProvider, Transport, TransportResponse};
pub use crate::utils::error::Result;
